use serde::{Deserialize, Serialize};

/// JWT claims for access tokens.
///
/// Only the registered temporal claims are interpreted: `exp` is required and
/// `nbf` is honoured when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject the token was issued to
    pub sub: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
    /// Not-before timestamp (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<usize>,
}
