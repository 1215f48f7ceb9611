//! Named z-index bands.
//!
//! A panel's layer is never stored. It is derived from its numeric z-index:
//! the highest band whose base is not above the value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width of every band.
pub const LAYER_SPAN: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZIndexLayer {
    Background,
    Base,
    Panel,
    Group,
    Modal,
    Tooltip,
    Debug,
}

impl ZIndexLayer {
    /// All layers, bottom to top.
    pub const ALL: [ZIndexLayer; 7] = [
        ZIndexLayer::Background,
        ZIndexLayer::Base,
        ZIndexLayer::Panel,
        ZIndexLayer::Group,
        ZIndexLayer::Modal,
        ZIndexLayer::Tooltip,
        ZIndexLayer::Debug,
    ];

    pub const fn base(self) -> i64 {
        match self {
            ZIndexLayer::Background => 0,
            ZIndexLayer::Base => 1000,
            ZIndexLayer::Panel => 2000,
            ZIndexLayer::Group => 3000,
            ZIndexLayer::Modal => 4000,
            ZIndexLayer::Tooltip => 5000,
            ZIndexLayer::Debug => 6000,
        }
    }

    /// Exclusive upper end of the band.
    pub const fn ceiling(self) -> i64 {
        self.base() + LAYER_SPAN
    }

    pub fn contains(self, z_index: i64) -> bool {
        z_index >= self.base() && z_index < self.ceiling()
    }

    /// Scans from Debug down; values below every base land in Background.
    pub fn for_z_index(z_index: i64) -> ZIndexLayer {
        Self::ALL
            .iter()
            .rev()
            .find(|layer| layer.base() <= z_index)
            .copied()
            .unwrap_or(ZIndexLayer::Background)
    }

    pub fn name(self) -> &'static str {
        match self {
            ZIndexLayer::Background => "background",
            ZIndexLayer::Base => "base",
            ZIndexLayer::Panel => "panel",
            ZIndexLayer::Group => "group",
            ZIndexLayer::Modal => "modal",
            ZIndexLayer::Tooltip => "tooltip",
            ZIndexLayer::Debug => "debug",
        }
    }

    pub fn from_name(name: &str) -> Option<ZIndexLayer> {
        Self::ALL.iter().copied().find(|layer| layer.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ZIndexLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
