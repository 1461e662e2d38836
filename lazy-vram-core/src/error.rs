//! Error types for avatar texture optimization

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lazy_vram operations
pub type Result<T> = std::result::Result<T, LazyVramError>;

/// Main error type for loading Unity assets and optimizing textures
///
/// Every variant renders as a single human-readable message; the
/// operation that produced it is aborted before anything is written.
#[derive(Error, Debug)]
pub enum LazyVramError {
    /// IO errors when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// YAML could not be parsed
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Unity-specific structure is missing or malformed
    #[error("Unity format error: {message}")]
    UnityFormat { message: String },

    /// No avatar root selected, or the root is unusable
    #[error("Missing avatar: {reason}")]
    MissingAvatar { reason: String },

    /// A custom texture size outside the supported set
    #[error(
        "Invalid custom texture size: main {main}, other {other} (supported sizes: 32, 64, 128, 256, 512, 1024, 2048, 4096)"
    )]
    InvalidSize { main: u32, other: u32 },

    /// Unknown preset name
    #[error("Unknown preset '{name}'")]
    UnknownPreset { name: String },

    /// A GUID that has no asset in the project
    #[error("No asset with GUID {guid} found in project")]
    AssetNotFound { guid: String },

    /// An asset exists but is not usable for the operation
    #[error("Unsupported asset {}: {message}", path.display())]
    UnsupportedAsset { path: PathBuf, message: String },

    /// Configuration file problems
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl LazyVramError {
    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a Unity format error
    pub fn unity_format<S: Into<String>>(message: S) -> Self {
        Self::UnityFormat {
            message: message.into(),
        }
    }

    /// Create a missing avatar error
    pub fn missing_avatar<S: Into<String>>(reason: S) -> Self {
        Self::MissingAvatar {
            reason: reason.into(),
        }
    }

    /// Create an invalid size error
    pub fn invalid_size(main: u32, other: u32) -> Self {
        Self::InvalidSize { main, other }
    }

    /// Create an unknown preset error
    pub fn unknown_preset<S: Into<String>>(name: S) -> Self {
        Self::UnknownPreset { name: name.into() }
    }

    /// Create an asset not found error
    pub fn asset_not_found<S: Into<String>>(guid: S) -> Self {
        Self::AssetNotFound { guid: guid.into() }
    }

    /// Create an unsupported asset error
    pub fn unsupported_asset<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::UnsupportedAsset {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this is one of the user-facing validation failures
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingAvatar { .. } | Self::InvalidSize { .. } | Self::UnknownPreset { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LazyVramError::missing_avatar("avatar is not active");
        assert!(matches!(err, LazyVramError::MissingAvatar { .. }));
        assert!(err.is_validation());

        let err = LazyVramError::parse("bad indentation");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = LazyVramError::invalid_size(300, 1024);
        let msg = format!("{}", err);
        assert!(msg.contains("300"));
        assert!(msg.contains("1024"));

        let err = LazyVramError::unsupported_asset("Assets/Body.fbx", "embedded material");
        let msg = err.to_string();
        assert!(msg.contains("Assets/Body.fbx"));
        assert!(msg.contains("embedded material"));
    }

    #[test]
    fn test_into_anyhow() -> anyhow::Result<()> {
        let err: anyhow::Error = LazyVramError::asset_not_found("ab12cd34").into();
        assert_eq!(err.to_string(), "No asset with GUID ab12cd34 found in project");
        assert!(err.downcast_ref::<LazyVramError>().is_some());

        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = LazyVramError::from(io);
        assert!(matches!(err, LazyVramError::Io(_)));
        Ok(())
    }
}
