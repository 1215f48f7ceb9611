//! Output types for JavaScript consumption.
//!
//! These structs are serialized to JSON and handed back across the wasm
//! boundary. Plain engine results (`CollisionResult`, `ResizeValidation`,
//! ...) are serialized as they are; the types here only wrap what needs extra
//! context for the caller's store.

use serde::Serialize;

use crate::panel::{Panel, PanelId};

/// Error payload, `{"error": {"message": ...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    pub error: ErrorInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// A new panel collection plus the ids whose records changed, so the store
/// only has to persist those.
#[derive(Debug, Clone, Serialize)]
pub struct PanelsOutput {
    pub panels: Vec<Panel>,
    pub changed: Vec<PanelId>,
}

impl PanelsOutput {
    /// Both collections must be in the same order, which every engine
    /// operation guarantees.
    pub fn diff(before: &[Panel], after: Vec<Panel>) -> Self {
        let changed = after
            .iter()
            .zip(before)
            .filter(|(new, old)| new != old)
            .map(|(new, _)| new.id.clone())
            .collect();
        Self { panels: after, changed }
    }
}

/// Answer to "may this panel be added?".
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionOutput {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn error_json(message: &str) -> String {
    let output = ErrorOutput { error: ErrorInfo { message: message.to_string() } };
    serde_json::to_string(&output)
        .unwrap_or_else(|_| String::from(r#"{"error":{"message":"failed to encode error"}}"#))
}

pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("failed to encode output: {}", e);
        error_json(&e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Point, Size};

    #[test]
    fn test_error_shape() {
        let json: serde_json::Value = serde_json::from_str(&error_json("bad input")).unwrap();
        assert_eq!(json["error"]["message"], "bad input");
    }

    #[test]
    fn test_diff_reports_changed_ids() {
        let before = vec![
            Panel::new("a", Point::new(0.0, 0.0), Size::new(10.0, 10.0)),
            Panel::new("b", Point::new(0.0, 0.0), Size::new(10.0, 10.0)),
        ];
        let mut after = before.clone();
        after[1].z_index = 2010;

        let output = PanelsOutput::diff(&before, after);
        assert_eq!(output.changed, vec![PanelId::from("b")]);
        assert_eq!(output.panels.len(), 2);
    }

    #[test]
    fn test_admission_omits_empty_reason() {
        let json = to_json(&AdmissionOutput { allowed: true, reason: None });
        assert_eq!(json, r#"{"allowed":true}"#);
    }
}
