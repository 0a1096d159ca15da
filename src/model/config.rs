use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::options::{SortColumn, SortDirection};
use super::timeframe::Timeframe;

/// Configuration from workspace.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub workspace: WorkspaceInfo,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub expand: ExpandConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub name: String,
}

/// Row density for the text renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Default,
    /// No rollup column
    Compact,
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Density::Default => f.write_str("default"),
            Density::Compact => f.write_str("compact"),
        }
    }
}

impl FromStr for Density {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Density::Default),
            "compact" => Ok(Density::Compact),
            _ => Err(format!("unknown density '{}' (expected: default, compact)", s)),
        }
    }
}

/// Timeframe filter a view starts with, resolved against today's date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultTimeframe {
    #[default]
    CurrentYear,
    CurrentQuarter,
    /// No timeframe filter
    All,
}

impl DefaultTimeframe {
    pub fn resolve(self, today: NaiveDate) -> Option<Timeframe> {
        match self {
            DefaultTimeframe::CurrentYear => Some(Timeframe::current_year(today)),
            DefaultTimeframe::CurrentQuarter => Some(Timeframe::current_quarter(today)),
            DefaultTimeframe::All => None,
        }
    }
}

/// Default view settings. Stored preferences override these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub sort_column: SortColumn,
    #[serde(default)]
    pub sort_direction: SortDirection,
    /// Default: see WORKSPACE_TOML_TEMPLATE in cli/handlers/init.rs
    #[serde(default = "default_true")]
    pub show_active: bool,
    #[serde(default)]
    pub show_paused: bool,
    #[serde(default)]
    pub show_completed: bool,
    #[serde(default)]
    pub timeframe: DefaultTimeframe,
    #[serde(default)]
    pub density: Density,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            sort_column: SortColumn::default(),
            sort_direction: SortDirection::default(),
            show_active: true,
            show_paused: false,
            show_completed: false,
            timeframe: DefaultTimeframe::default(),
            density: Density::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandConfig {
    /// Nodes at or above this depth start expanded (roots are depth 0)
    #[serde(default = "default_expand_depth")]
    pub default_depth: usize,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        ExpandConfig {
            default_depth: default_expand_depth(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_expand_depth() -> usize {
    1
}
