//! Error types.
//!
//! The geometry and ordering engine itself is total and never returns these.
//! They cover application-level placement policy and the JSON boundary.

use thiserror::Error;

use crate::panel::{PanelId, PanelKind};

/// Why a panel may not be added to a workspace.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("a {0:?} panel already exists and only one is allowed")]
    SingletonExists(PanelKind),

    #[error("panel id {0} is already in use")]
    DuplicateId(PanelId),

    #[error("panel {id} size {width}x{height} is outside its size limits")]
    SizeOutOfLimits { id: PanelId, width: f64, height: f64 },

    #[error("panel {id} would overlap {} other panel(s)", .others.len())]
    Collides { id: PanelId, others: Vec<PanelId> },
}

/// Input arriving over the wasm boundary that could not be decoded.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("invalid {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown layer '{0}'")]
    UnknownLayer(String),
}

impl BindingError {
    pub fn json(what: &'static str, source: serde_json::Error) -> Self {
        BindingError::Json { what, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = PlacementError::Collides { id: PanelId::from("a"), others: vec![PanelId::from("b"), PanelId::from("c")] };
        assert_eq!(err.to_string(), "panel a would overlap 2 other panel(s)");

        let err = PlacementError::SingletonExists(PanelKind::Settings);
        assert_eq!(err.to_string(), "a Settings panel already exists and only one is allowed");

        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = BindingError::json("panels", bad);
        assert!(err.to_string().starts_with("invalid panels JSON:"));
    }
}
