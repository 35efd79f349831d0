use std::path::PathBuf;
use thiserror::Error;

use crate::taxonomy::ParseError;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Malformed taxonomy: {0}")]
    Parse(#[from] ParseError),

    #[error("Node not found: {name}")]
    NodeNotFound { name: String },

    #[error("Node already exists: {name}")]
    DuplicateNode { name: String },

    #[error("JSON error: {message}")]
    JsonParseError { message: String },

    #[error("Taxonomy is {depth} levels deep; JSON output supports at most {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("Key '{key}' not found or not a string in {path}")]
    JsonKeyNotFound { key: String, path: PathBuf },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidConfigValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TaxonomyError>;

impl TaxonomyError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parse(_) => 2,
            Self::NodeNotFound { .. } => 3,
            Self::JsonParseError { .. }
            | Self::JsonKeyNotFound { .. }
            | Self::TooDeep { .. } => 4,
            Self::ConfigParse { .. }
            | Self::ConfigKeyNotFound { .. }
            | Self::InvalidConfigValue { .. } => 5,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_converts_and_maps_exit_code() {
        let err: TaxonomyError = ParseError::Unbalanced {
            opening: 2,
            closing: 1,
        }
        .into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("Malformed taxonomy"));
    }

    #[test]
    fn test_io_error_is_generic_failure() {
        let err: TaxonomyError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.exit_code(), 1);
    }
}
