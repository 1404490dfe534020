//! Asset resolver contract.
//!
//! The map never computes URLs itself. A host supplies an [`AssetResolver`]
//! that turns a logical asset path (`components/Clock.js`) into whatever the
//! browser should fetch (`/assets/components/Clock-3f2a9c1e.js`).

use std::fmt;

/// Resolver error codes.
pub mod codes {
    pub const ASSET_NOT_FOUND: &str = "ASSET_NOT_FOUND";
    pub const ASSET_NOT_PRECOMPILED: &str = "ASSET_NOT_PRECOMPILED";
    pub const ASSET_RESOLVER_FAILED: &str = "ASSET_RESOLVER_FAILED";
}

/// Failure reported by an [`AssetResolver`].
///
/// Whether it is tolerated depends on the map's configured recoverable codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    code: &'static str,
    message: String,
}

impl ResolveError {
    /// Create a new error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create an asset not found error.
    #[must_use]
    pub fn not_found(path: &str) -> Self {
        Self::new(codes::ASSET_NOT_FOUND, format!("Asset not found: {path}"))
    }

    /// Create a resolver failure error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::new(codes::ASSET_RESOLVER_FAILED, msg)
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ResolveError {}

/// Turns a logical asset path into a servable URL.
pub trait AssetResolver: Send + Sync {
    /// Resolve `logical_path`, or fail with a coded [`ResolveError`].
    fn resolve(&self, logical_path: &str) -> Result<String, ResolveError>;
}

impl<F> AssetResolver for F
where
    F: Fn(&str) -> Result<String, ResolveError> + Send + Sync,
{
    fn resolve(&self, logical_path: &str) -> Result<String, ResolveError> {
        self(logical_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        let err = ResolveError::not_found("application.js");
        assert_eq!(err.code(), codes::ASSET_NOT_FOUND);
        assert_eq!(err.to_string(), "ASSET_NOT_FOUND: Asset not found: application.js");
    }

    #[test]
    fn test_error_codes_uppercase() {
        for code in [
            codes::ASSET_NOT_FOUND,
            codes::ASSET_NOT_PRECOMPILED,
            codes::ASSET_RESOLVER_FAILED,
        ] {
            assert!(
                code.chars().all(|c| c.is_uppercase() || c == '_'),
                "Error code '{code}' should be SCREAMING_SNAKE_CASE"
            );
        }
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |path: &str| Ok::<_, ResolveError>(format!("/assets/{path}"));
        assert_eq!(resolver.resolve("a.js").unwrap(), "/assets/a.js");
    }
}
