//! Protect requests.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DetectionToken;
use crate::error::ShieldError;

/// What to do to the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectAction {
    /// Redact the selected detections.
    BlurSelected,
    /// Add recognition-defeating noise to every face.
    Cloak,
}

impl FromStr for ProtectAction {
    type Err = ShieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "blur_selected" | "blur-selected" => Ok(Self::BlurSelected),
            "cloak" => Ok(Self::Cloak),
            other => Err(ShieldError::UnknownAction(other.to_string())),
        }
    }
}

/// A parsed protect request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectRequest {
    pub action: ProtectAction,
    /// Requested stable indices. Ignored by [`ProtectAction::Cloak`].
    pub indices: Vec<i64>,
    /// Token from a previous scan of the same image.
    pub token: Option<DetectionToken>,
}

impl ProtectRequest {
    /// Parses the raw transport fields.
    ///
    /// # Errors
    ///
    /// Returns [`ShieldError::UnknownAction`] or [`ShieldError::InvalidIndex`].
    pub fn parse(action: &str, indices: &str, token: Option<&str>) -> Result<Self, ShieldError> {
        let action: ProtectAction = action.parse()?;
        let indices = match action {
            ProtectAction::BlurSelected => parse_indices(indices)?,
            ProtectAction::Cloak => Vec::new(),
        };
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(DetectionToken::from_client);

        Ok(Self {
            action,
            indices,
            token,
        })
    }
}

/// Parses a comma-separated index list such as `"0, 2,5"`.
///
/// Empty entries are skipped. Order and duplicates are kept. Range checks
/// happen later against the detection set.
///
/// # Errors
///
/// Returns [`ShieldError::InvalidIndex`] for an entry that is not an integer.
pub fn parse_indices(raw: &str) -> Result<Vec<i64>, ShieldError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ShieldError::InvalidIndex(s.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indices() {
        assert_eq!(parse_indices("0,2, 5").ok(), Some(vec![0, 2, 5]));
        assert_eq!(parse_indices("").ok(), Some(vec![]));
        assert_eq!(parse_indices("3,,3,-1").ok(), Some(vec![3, 3, -1]));
    }

    #[test]
    fn test_parse_indices_rejects_text() {
        let err = parse_indices("0,abc").unwrap_err();
        assert!(matches!(err, ShieldError::InvalidIndex(s) if s == "abc"));
        assert!(parse_indices("1.5").is_err());
    }

    #[test]
    fn test_unknown_action() {
        let err = ProtectRequest::parse("delete", "0", None).unwrap_err();
        assert!(matches!(err, ShieldError::UnknownAction(_)));
    }

    #[test]
    fn test_cloak_ignores_indices() {
        let req = ProtectRequest::parse("cloak", "not,numbers", Some(" ")).unwrap();
        assert_eq!(req.action, ProtectAction::Cloak);
        assert!(req.indices.is_empty());
        assert!(req.token.is_none());
    }

    #[test]
    fn test_blur_request_keeps_token() {
        let req = ProtectRequest::parse("blur_selected", "1", Some("abc")).unwrap();
        assert_eq!(req.indices, vec![1]);
        assert_eq!(req.token.as_ref().map(DetectionToken::as_str), Some("abc"));
    }
}
