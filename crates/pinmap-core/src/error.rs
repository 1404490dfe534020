use crate::resolver::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pinmap operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to resolve {path}: {source}")]
    Resolve {
        path: String,
        #[source]
        source: ResolveError,
    },

    #[error("Unable to import from {path}: {message}")]
    InvalidDeclaration { path: PathBuf, message: String },

    #[error("Watcher failed: {0}")]
    Watch(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::codes;

    #[test]
    fn test_resolve_error_display_names_path() {
        let err = Error::Resolve {
            path: "application.js".to_string(),
            source: ResolveError::new(codes::ASSET_RESOLVER_FAILED, "boom"),
        };
        let msg = err.to_string();
        assert!(msg.contains("application.js"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_invalid_declaration_display() {
        let err = Error::InvalidDeclaration {
            path: PathBuf::from("config/importmap.json"),
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to import from config/importmap.json: expected value"
        );
    }
}
