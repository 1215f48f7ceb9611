//! Panel snapshots as seen by the layout engine.
//!
//! Panels are owned by the caller's store. The engine only ever reads them and
//! hands back new positions, sizes or z-indices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::{Point, Rect, Size};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(pub String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        PanelId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(s: &str) -> Self {
        PanelId(s.to_string())
    }
}

/// What a panel shows. Only used by application-level placement policy,
/// never by the geometry code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelKind {
    #[default]
    Generic,
    Chart,
    Table,
    Notes,
    Terminal,
    Settings,
    Custom(String),
}

/// Size limits a panel carries with it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSizeLimits {
    pub min_size: Option<Size>,
    pub max_size: Option<Size>,
}

impl PanelSizeLimits {
    pub fn admits(&self, size: Size) -> bool {
        if let Some(min) = self.min_size {
            if size.width < min.width || size.height < min.height {
                return false;
            }
        }
        if let Some(max) = self.max_size {
            if size.width > max.width || size.height > max.height {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: PanelId,
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub kind: PanelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<PanelSizeLimits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Panel {
    pub fn new(id: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id: PanelId::new(id),
            position,
            size,
            z_index: 0,
            kind: PanelKind::default(),
            constraints: None,
            metadata: None,
        }
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_kind(mut self, kind: PanelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_constraints(mut self, constraints: PanelSizeLimits) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }
}

/// Look up a panel snapshot by id.
pub fn find_panel<'a>(panels: &'a [Panel], id: &PanelId) -> Option<&'a Panel> {
    panels.iter().find(|p| &p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_deserializes_from_store_json() {
        let json = r#"{
            "id": "p1",
            "position": {"x": 10, "y": 20},
            "size": {"width": 300, "height": 200},
            "zIndex": 2010,
            "kind": "chart",
            "constraints": {"minSize": {"width": 100, "height": 80}}
        }"#;
        let panel: Panel = serde_json::from_str(json).unwrap();
        assert_eq!(panel.id, PanelId::from("p1"));
        assert_eq!(panel.z_index, 2010);
        assert_eq!(panel.kind, PanelKind::Chart);
        assert_eq!(panel.rect(), Rect::new(10.0, 20.0, 300.0, 200.0));
        assert!(panel.constraints.unwrap().max_size.is_none());
    }

    #[test]
    fn test_limits_admit() {
        let limits = PanelSizeLimits {
            min_size: Some(Size::new(100.0, 100.0)),
            max_size: Some(Size::new(400.0, 400.0)),
        };
        assert!(limits.admits(Size::new(100.0, 400.0)));
        assert!(!limits.admits(Size::new(99.0, 200.0)));
        assert!(!limits.admits(Size::new(200.0, 401.0)));
    }
}
