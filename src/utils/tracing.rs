//! Tracing utilities and helper macros for observability
//!
//! Spans are never created against the process-wide subscriber. Components
//! hold a [`Tracer`] (a cloneable [`Dispatch`]) handed to them at construction
//! and open their spans through it, so tests can inject a recording
//! subscriber and `Tracer::noop()` turns instrumentation off entirely.
//!
//! The active request span is the implicit context: a repository span opened
//! while a handler span is entered becomes its child, and dropping the
//! instrumented future cancels the work under it.

use std::fmt::Display;
use std::future::Future;

use tracing::instrument::{Instrumented, WithDispatch, WithSubscriber};
use tracing::{Dispatch, Instrument, Span};

/// Scope of every span opened by a person repository.
pub const REPOSITORY_TRACER: &str = "person-repository";

/// Scope of every span opened by a person handler.
pub const HANDLER_TRACER: &str = "person-handler";

/// Injected span factory.
#[derive(Clone)]
pub struct Tracer {
    dispatch: Dispatch,
}

impl Tracer {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// A tracer whose spans are all disabled.
    pub fn noop() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Builds a span against this tracer's subscriber.
    pub fn span(&self, make: impl FnOnce() -> Span) -> Span {
        tracing::dispatcher::with_default(&self.dispatch, make)
    }

    /// Runs `fut` inside `span`, with this tracer's subscriber as the default
    /// for anything the future creates.
    pub fn in_span<F: Future>(&self, span: Span, fut: F) -> WithDispatch<Instrumented<F>> {
        fut.instrument(span).with_subscriber(self.dispatch.clone())
    }

    /// Like [`Tracer::in_span`], then marks the span `OK` or `ERROR` from the
    /// outcome. The span closes once the caller drops its last handle.
    pub async fn trace<T, E, F>(&self, span: Span, fut: F) -> Result<T, E>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        let result = self.in_span(span.clone(), fut).await;
        match &result {
            Ok(_) => record_success(&span),
            Err(e) => record_error(&span, &e.to_string()),
        }
        result
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Create a span for a repository operation with database semantic conventions
///
/// # Example
/// ```ignore
/// let span = self.tracer.span(|| repository_span!("FindById", "postgresql", self.table.as_str()));
/// ```
#[macro_export]
macro_rules! repository_span {
    ($operation:literal, $system:expr, $table:expr) => {
        ::tracing::info_span!(
            target: $crate::utils::tracing::REPOSITORY_TRACER,
            $operation,
            db.system = $system,
            db.operation = $operation,
            db.sql.table = $table,
            otel.kind = "client",
            otel.status_code = ::tracing::field::Empty,
            error.message = ::tracing::field::Empty
        )
    };
}

/// Create a span for an HTTP handler with server semantic conventions
///
/// `http.status_code` starts at 200 and is overwritten with the status
/// actually returned.
#[macro_export]
macro_rules! handler_span {
    ($name:literal, $meta:expr) => {
        ::tracing::info_span!(
            target: $crate::utils::tracing::HANDLER_TRACER,
            $name,
            http.handler = $name,
            http.method = %$meta.method,
            http.url = %$meta.url,
            http.path = %$meta.path,
            http.host = %$meta.host,
            http.status_code = 200u16,
            otel.kind = "server",
            otel.status_code = ::tracing::field::Empty,
            error.message = ::tracing::field::Empty
        )
    };
}

/// Record a successful operation on a span
pub fn record_success(span: &Span) {
    span.record("otel.status_code", "OK");
}

/// Record a failed operation on a span with an error message
pub fn record_error(span: &Span, message: &str) {
    span.record("otel.status_code", "ERROR");
    span.record("error.message", message);
}

/// Record HTTP status code on a span
pub fn record_http_status(span: &Span, status: u16) {
    span.record("http.status_code", status);
    if status >= 400 {
        span.record("otel.status_code", "ERROR");
    } else {
        span.record("otel.status_code", "OK");
    }
}

/// In-memory subscriber that keeps every span it sees, for assertions.
#[cfg(any(test, feature = "test-utils"))]
pub mod recording {
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, MutexGuard};

    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Dispatch, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    use super::Tracer;

    #[derive(Debug, Clone)]
    pub struct RecordedSpan {
        pub name: &'static str,
        pub target: &'static str,
        pub parent: Option<&'static str>,
        pub fields: HashMap<String, String>,
        pub closed: bool,
    }

    impl RecordedSpan {
        pub fn field(&self, key: &str) -> Option<&str> {
            self.fields.get(key).map(String::as_str)
        }
    }

    /// Test handle: one shared subscriber plus the spans it has recorded.
    #[derive(Clone)]
    pub struct SpanRecorder {
        spans: Arc<Mutex<Vec<RecordedSpan>>>,
        dispatch: Dispatch,
    }

    struct RecordingLayer {
        spans: Arc<Mutex<Vec<RecordedSpan>>>,
    }

    struct SpanIndex(usize);

    #[derive(Default)]
    struct FieldMap(HashMap<String, String>);

    impl Visit for FieldMap {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    fn lock(spans: &Mutex<Vec<RecordedSpan>>) -> MutexGuard<'_, Vec<RecordedSpan>> {
        spans.lock().unwrap_or_else(|e| e.into_inner())
    }

    impl SpanRecorder {
        pub fn new() -> Self {
            let spans = Arc::new(Mutex::new(Vec::new()));
            let layer = RecordingLayer {
                spans: Arc::clone(&spans),
            };
            Self {
                spans,
                dispatch: Dispatch::new(tracing_subscriber::registry().with(layer)),
            }
        }

        /// Every tracer handed out shares one subscriber, so spans opened
        /// through different clones still nest.
        pub fn tracer(&self) -> Tracer {
            Tracer::new(self.dispatch.clone())
        }

        /// The most recently opened span with this name.
        pub fn find(&self, name: &str) -> Option<RecordedSpan> {
            lock(&self.spans).iter().rev().find(|s| s.name == name).cloned()
        }

        pub fn clear(&self) {
            lock(&self.spans).clear();
        }
    }

    impl Default for SpanRecorder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut fields = FieldMap::default();
            attrs.record(&mut fields);

            let mut spans = lock(&self.spans);
            spans.push(RecordedSpan {
                name: attrs.metadata().name(),
                target: attrs.metadata().target(),
                parent: span.parent().map(|p| p.name()),
                fields: fields.0,
                closed: false,
            });
            span.extensions_mut().insert(SpanIndex(spans.len() - 1));
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let extensions = span.extensions();
            let Some(SpanIndex(index)) = extensions.get::<SpanIndex>() else {
                return;
            };
            let mut fields = FieldMap::default();
            values.record(&mut fields);
            if let Some(recorded) = lock(&self.spans).get_mut(*index) {
                recorded.fields.extend(fields.0);
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let extensions = span.extensions();
            if let Some(SpanIndex(index)) = extensions.get::<SpanIndex>()
                && let Some(recorded) = lock(&self.spans).get_mut(*index)
            {
                recorded.closed = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::recording::SpanRecorder;
    use super::*;

    #[test]
    fn test_noop_tracer_disables_spans() {
        let span = Tracer::noop().span(|| repository_span!("Count", "memory", "users"));
        assert!(span.is_disabled());
        // Recording on a disabled span is a no-op
        record_http_status(&span, 500);
    }

    #[tokio::test]
    async fn test_trace_marks_success() {
        let recorder = SpanRecorder::new();
        let tracer = recorder.tracer();

        let span = tracer.span(|| repository_span!("Count", "memory", "users"));
        let result: Result<i64, String> = tracer.trace(span, async { Ok(3) }).await;
        assert_eq!(result, Ok(3));

        let recorded = recorder.find("Count").unwrap();
        assert_eq!(recorded.target, REPOSITORY_TRACER);
        assert_eq!(recorded.field("db.system"), Some("memory"));
        assert_eq!(recorded.field("db.sql.table"), Some("users"));
        assert_eq!(recorded.field("otel.status_code"), Some("OK"));
        assert!(recorded.closed);
    }

    #[tokio::test]
    async fn test_trace_marks_error() {
        let recorder = SpanRecorder::new();
        let tracer = recorder.tracer();

        let span = tracer.span(|| repository_span!("FindById", "memory", "users"));
        let result: Result<(), String> = tracer
            .trace(span, async { Err("person 7 not found".to_string()) })
            .await;
        assert!(result.is_err());

        let recorded = recorder.find("FindById").unwrap();
        assert_eq!(recorded.field("otel.status_code"), Some("ERROR"));
        assert_eq!(recorded.field("error.message"), Some("person 7 not found"));
    }

    #[tokio::test]
    async fn test_spans_nest_under_the_active_span() {
        let recorder = SpanRecorder::new();
        let tracer = recorder.tracer();

        let outer = tracer.span(|| tracing::info_span!("outer"));
        let inner_tracer = tracer.clone();
        tracer
            .in_span(outer, async move {
                let inner = inner_tracer.span(|| repository_span!("FindAll", "memory", "users"));
                let _: Result<(), String> = inner_tracer.trace(inner, async { Ok(()) }).await;
            })
            .await;

        let inner = recorder.find("FindAll").unwrap();
        assert_eq!(inner.parent, Some("outer"));
    }

    #[test]
    fn test_record_http_status_overwrites_provisional_value() {
        let recorder = SpanRecorder::new();
        let tracer = recorder.tracer();
        let span = tracer.span(|| tracing::info_span!("h", http.status_code = 200u16, otel.status_code = tracing::field::Empty));

        record_http_status(&span, 404);
        drop(span);

        let recorded = recorder.find("h").unwrap();
        assert_eq!(recorded.field("http.status_code"), Some("404"));
        assert_eq!(recorded.field("otel.status_code"), Some("ERROR"));
    }
}
