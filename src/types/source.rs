//! Knowledge sources the assistant may consult, and the tools behind them.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Upstream knowledge provider.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Source {
    Wikipedia,
    Snl,
    Riksantikvaren,
}

/// Human-readable description of a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: &'static str,
    pub description: &'static str,
}

impl Source {
    /// Every provider, in display order.
    pub fn all() -> Vec<Source> {
        Source::iter().collect()
    }

    pub fn info(self) -> SourceInfo {
        match self {
            Source::Wikipedia => SourceInfo {
                name: "Wikipedia",
                description: "Encyclopedic articles",
            },
            Source::Snl => SourceInfo {
                name: "SNL",
                description: "Store norske leksikon",
            },
            Source::Riksantikvaren => SourceInfo {
                name: "Riksantikvaren",
                description: "Kulturminnedatabasen",
            },
        }
    }
}

const TOOL_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("wikipedia-search", "Wikipedia Search"),
    ("wikipedia-summary", "Wikipedia Summary"),
    ("wikipedia-geosearch", "Wikipedia Geosearch"),
    ("snl-search", "SNL Search"),
    ("snl-article", "SNL Article"),
    ("riksantikvaren-datasets", "Riksantikvaren Datasets"),
    ("riksantikvaren-collections", "Riksantikvaren Collections"),
    ("riksantikvaren-features", "Riksantikvaren Features"),
    ("riksantikvaren-nearby", "Riksantikvaren Nearby"),
    ("arcgis-services", "ArcGIS Services"),
    ("arcgis-query", "ArcGIS Query"),
    ("arcgis-nearby", "ArcGIS Nearby"),
];

/// Friendly label for a tool name. Unknown tools are returned unchanged.
pub fn tool_display_name(tool: &str) -> &str {
    TOOL_DISPLAY_NAMES
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, display)| *display)
        .unwrap_or(tool)
}

/// The provider a tool belongs to, inferred from its name prefix.
///
/// Anything that is neither `wikipedia-*` nor `snl-*` (including the
/// ArcGIS tools) is attributed to Riksantikvaren.
pub fn tool_provider(tool: &str) -> Source {
    if tool.starts_with("wikipedia-") {
        Source::Wikipedia
    } else if tool.starts_with("snl-") {
        Source::Snl
    } else {
        Source::Riksantikvaren
    }
}
