//! SQL identifier for the person table.
//!
//! Table names cannot be bound as query parameters, so they are interpolated
//! into statement text. A [`TableName`] can only be built from a plain
//! identifier, which keeps that interpolation safe.

use std::fmt;

/// PostgreSQL truncates identifiers longer than this many bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableNameError {
    #[error("table name must not be empty")]
    Empty,

    #[error("table name `{0}` exceeds 63 bytes")]
    TooLong(String),

    #[error("table name `{0}` must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidCharacters(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> Result<Self, TableNameError> {
        let mut chars = raw.chars();
        let Some(first) = chars.next() else {
            return Err(TableNameError::Empty);
        };
        if raw.len() > MAX_IDENTIFIER_LEN {
            return Err(TableNameError::TooLong(raw.to_string()));
        }
        let valid_first = first.is_ascii_alphabetic() || first == '_';
        if !valid_first || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TableNameError::InvalidCharacters(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(census_config::database::DEFAULT_TABLE.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
