//! Domain errors surfaced to transports.

use thiserror::Error;

/// Failures a caller can act on. Everything else travels as `anyhow::Error`.
#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("no image uploaded")]
    NoImage,

    #[error("detection token {given} does not match the current image")]
    StaleDetections { given: String },

    #[error("unknown action: {0} (expected blur_selected or cloak)")]
    UnknownAction(String),

    #[error("invalid index: {0:?}")]
    InvalidIndex(String),

    #[error("invalid noise parameters: {0}")]
    NoiseParameters(String),
}

impl ShieldError {
    /// Returns true for errors caused by a malformed request.
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        matches!(self, Self::UnknownAction(_) | Self::InvalidIndex(_))
    }

    /// Returns true for errors caused by session state.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::NoImage | Self::StaleDetections { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(ShieldError::UnknownAction("x".into()).is_request_error());
        assert!(ShieldError::InvalidIndex("x".into()).is_request_error());
        assert!(ShieldError::NoImage.is_conflict());

        let noise = ShieldError::NoiseParameters("stddev -1".into());
        assert!(!noise.is_request_error());
        assert!(!noise.is_conflict());
    }
}
