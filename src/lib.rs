//! # Census API
//!
//! A single "person" resource over HTTP with CRUD semantics, stored in
//! PostgreSQL, gated by JWT bearer tokens and traced end to end.
//!
//! ## Request lifecycle
//!
//! ```text
//! router ─▶ auth gate ─▶ handler ─▶ PersonRepository ─▶ store
//!            (401/500)    span        span
//! ```
//!
//! Every handler opens a span under the `person-handler` scope and every
//! repository operation opens a child span under `person-repository`. Spans
//! go through the [`utils::tracing::Tracer`] injected into [`state::AppState`]
//! and the repository, never through a process-wide lookup.
//!
//! ## Layout
//!
//! ```text
//! src/
//! ├── cli/              # CLI helpers (token minting, seeding)
//! ├── middleware/       # Bearer-token gate, request metadata extractor
//! ├── modules/
//! │   └── persons/     # model, repository trait, Postgres + in-memory stores,
//! │                    # handlers, routes
//! └── utils/           # Tracer, span macros, recording subscriber
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/persons/` | list |
//! | POST | `/persons/` | create |
//! | GET | `/persons/count` | count |
//! | GET | `/persons/{id}` | get |
//! | PUT | `/persons/{id}` | update |
//! | DELETE | `/persons/{id}` | delete |
//! | GET | `/api-docs/openapi.json` | OpenAPI document (no auth) |
//!
//! ## Configuration
//!
//! See [`census_config`]. `JWT_SECRET` may be absent at startup, in which case
//! every person request fails with 500 until it is set.

pub mod cli;
pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;

// Re-export workspace crates for convenience
pub use census_auth;
pub use census_config;
pub use census_core;
pub use census_db;
