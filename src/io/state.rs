use chrono::NaiveDate;

use crate::io::prefs::{self, DisplayCodec, JsonCodec, PreferenceStore, PrefsError};
use crate::model::{Density, SortColumn, SortDirection, Timeframe, TreeOptions, ViewConfig};
use crate::ops::expand::{ExpandPolicy, ExpandableState};

/// Namespace for view preferences
pub const VIEW_NS: &str = "view";
/// Namespace for tree state
pub const TREE_NS: &str = "tree";
pub const EXPANDED_KEY: &str = "expanded";

const VIEW_KEYS: [&str; 7] = [
    "sort_column",
    "sort_direction",
    "show_active",
    "show_paused",
    "show_completed",
    "timeframe",
    "density",
];

/// User view preferences: the persisted subset of `TreeOptions` plus
/// presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPrefs {
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
    pub show_active: bool,
    pub show_paused: bool,
    pub show_completed: bool,
    pub timeframe: Option<Timeframe>,
    pub density: Density,
}

/// Stored in place of a timeframe to mean "no filter", so an explicit
/// choice of all time survives a non-empty config default
const ALL_TIME: &str = "all";

impl ViewPrefs {
    /// Preferences as configured in workspace.toml, before any stored overrides.
    /// The default timeframe is resolved against `today`.
    pub fn from_config(view: &ViewConfig, today: NaiveDate) -> Self {
        ViewPrefs {
            sort_column: view.sort_column,
            sort_direction: view.sort_direction,
            show_active: view.show_active,
            show_paused: view.show_paused,
            show_completed: view.show_completed,
            timeframe: view.timeframe.resolve(today),
            density: view.density,
        }
    }

    /// Stored preferences layered over the config defaults
    pub fn load<S: PreferenceStore + ?Sized>(
        store: &S,
        defaults: &ViewConfig,
        today: NaiveDate,
    ) -> Self {
        let base = ViewPrefs::from_config(defaults, today);
        ViewPrefs {
            sort_column: prefs::get(
                store,
                VIEW_NS,
                "sort_column",
                base.sort_column,
                &DisplayCodec::new(),
            ),
            sort_direction: prefs::get(
                store,
                VIEW_NS,
                "sort_direction",
                base.sort_direction,
                &DisplayCodec::new(),
            ),
            show_active: prefs::get(
                store,
                VIEW_NS,
                "show_active",
                base.show_active,
                &DisplayCodec::new(),
            ),
            show_paused: prefs::get(
                store,
                VIEW_NS,
                "show_paused",
                base.show_paused,
                &DisplayCodec::new(),
            ),
            show_completed: prefs::get(
                store,
                VIEW_NS,
                "show_completed",
                base.show_completed,
                &DisplayCodec::new(),
            ),
            timeframe: match store.get_raw(VIEW_NS, "timeframe").as_deref() {
                None => base.timeframe,
                Some(ALL_TIME) => None,
                Some(raw) => raw.parse().ok().or(base.timeframe),
            },
            density: prefs::get(store, VIEW_NS, "density", base.density, &DisplayCodec::new()),
        }
    }

    pub fn save<S: PreferenceStore + ?Sized>(&self, store: &mut S) -> Result<(), PrefsError> {
        prefs::set(store, VIEW_NS, "sort_column", &self.sort_column, &DisplayCodec::new())?;
        prefs::set(store, VIEW_NS, "sort_direction", &self.sort_direction, &DisplayCodec::new())?;
        prefs::set(store, VIEW_NS, "show_active", &self.show_active, &DisplayCodec::new())?;
        prefs::set(store, VIEW_NS, "show_paused", &self.show_paused, &DisplayCodec::new())?;
        prefs::set(store, VIEW_NS, "show_completed", &self.show_completed, &DisplayCodec::new())?;
        match &self.timeframe {
            Some(tf) => prefs::set(store, VIEW_NS, "timeframe", tf, &DisplayCodec::new())?,
            None => store.set_raw(VIEW_NS, "timeframe", ALL_TIME.to_string())?,
        }
        prefs::set(store, VIEW_NS, "density", &self.density, &DisplayCodec::new())
    }

    /// Remove every stored view preference, reverting to config defaults
    pub fn clear<S: PreferenceStore + ?Sized>(store: &mut S) -> Result<(), PrefsError> {
        for key in VIEW_KEYS {
            store.remove(VIEW_NS, key)?;
        }
        Ok(())
    }

    /// Copy the sort, status and timeframe settings into `options`
    pub fn apply(&self, options: &mut TreeOptions) {
        options.sort_column = self.sort_column;
        options.sort_direction = self.sort_direction;
        options.show_active = self.show_active;
        options.show_paused = self.show_paused;
        options.show_completed = self.show_completed;
        options.timeframe = self.timeframe;
    }
}

/// Load persisted expand state. The policy always comes from the caller
/// (workspace config), not from what was stored.
pub fn load_expand_state<S: PreferenceStore + ?Sized>(
    store: &S,
    policy: ExpandPolicy,
) -> ExpandableState {
    let mut state = prefs::get(
        store,
        TREE_NS,
        EXPANDED_KEY,
        ExpandableState::new(policy),
        &JsonCodec::new(),
    );
    state.set_policy(policy);
    state
}

pub fn save_expand_state<S: PreferenceStore + ?Sized>(
    store: &mut S,
    state: &ExpandableState,
) -> Result<(), PrefsError> {
    prefs::set(store, TREE_NS, EXPANDED_KEY, state, &JsonCodec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::prefs::{JsonFileStore, MemoryStore};
    use crate::model::{DefaultTimeframe, NodeId};
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn load_falls_back_to_config() {
        let store = MemoryStore::new();
        let config = ViewConfig {
            sort_column: SortColumn::Timeframe,
            show_completed: true,
            ..Default::default()
        };
        let prefs = ViewPrefs::load(&store, &config, today());
        assert_eq!(prefs, ViewPrefs::from_config(&config, today()));
        assert_eq!(prefs.sort_column, SortColumn::Timeframe);
        assert!(prefs.show_completed);
        assert!(!prefs.show_paused);
        assert_eq!(prefs.timeframe, Timeframe::year(2026));
    }

    #[test]
    fn default_view_hides_paused_completed_and_other_years() {
        let prefs = ViewPrefs::from_config(&ViewConfig::default(), today());
        assert!(prefs.show_active);
        assert!(!prefs.show_paused);
        assert!(!prefs.show_completed);
        assert_eq!(prefs.timeframe, Timeframe::year(2026));

        let config = ViewConfig {
            timeframe: DefaultTimeframe::All,
            ..Default::default()
        };
        assert!(ViewPrefs::from_config(&config, today()).timeframe.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut store = MemoryStore::new();
        let prefs = ViewPrefs {
            sort_column: SortColumn::Progress,
            sort_direction: SortDirection::Desc,
            show_active: true,
            show_paused: false,
            show_completed: false,
            timeframe: Timeframe::half(2026, 2),
            density: Density::Compact,
        };
        prefs.save(&mut store).unwrap();
        assert_eq!(store.get_raw(VIEW_NS, "timeframe").as_deref(), Some("2026-H2"));
        assert_eq!(ViewPrefs::load(&store, &ViewConfig::default(), today()), prefs);
    }

    #[test]
    fn cleared_timeframe_overrides_config_default() {
        let mut store = MemoryStore::new();
        let mut prefs = ViewPrefs::from_config(&ViewConfig::default(), today());
        prefs.timeframe = None;
        prefs.save(&mut store).unwrap();
        assert_eq!(store.get_raw(VIEW_NS, "timeframe").as_deref(), Some("all"));
        let loaded = ViewPrefs::load(&store, &ViewConfig::default(), today());
        assert!(loaded.timeframe.is_none());
    }

    #[test]
    fn unreadable_timeframe_falls_back_to_config() {
        let mut store = MemoryStore::new();
        store
            .set_raw(VIEW_NS, "timeframe", "someday".to_string())
            .unwrap();
        let loaded = ViewPrefs::load(&store, &ViewConfig::default(), today());
        assert_eq!(loaded.timeframe, Timeframe::year(2026));
    }

    #[test]
    fn clear_reverts_to_defaults() {
        let mut store = MemoryStore::new();
        let mut prefs = ViewPrefs::from_config(&ViewConfig::default(), today());
        prefs.sort_direction = SortDirection::Desc;
        prefs.timeframe = None;
        prefs.save(&mut store).unwrap();
        ViewPrefs::clear(&mut store).unwrap();
        let loaded = ViewPrefs::load(&store, &ViewConfig::default(), today());
        assert_eq!(loaded.sort_direction, SortDirection::Asc);
        assert_eq!(loaded.timeframe, Timeframe::year(2026));
    }

    #[test]
    fn apply_sets_tree_options() {
        let mut prefs = ViewPrefs::from_config(&ViewConfig::default(), today());
        prefs.sort_column = SortColumn::Status;
        prefs.show_completed = false;
        prefs.timeframe = Timeframe::quarter(2026, 1);
        let mut opts = TreeOptions::default().with_space("eng");
        prefs.apply(&mut opts);
        assert_eq!(opts.sort_column, SortColumn::Status);
        assert!(!opts.show_completed);
        assert!(!opts.show_paused);
        assert_eq!(opts.timeframe, Timeframe::quarter(2026, 1));
        assert_eq!(opts.space_id.as_deref(), Some("eng"));
    }

    #[test]
    fn expand_state_persists_in_file_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".prefs.json");
        let mut state = ExpandableState::default();
        state.set(&NodeId::goal("1"), false);
        {
            let mut store = JsonFileStore::open(&path);
            save_expand_state(&mut store, &state).unwrap();
        }
        let store = JsonFileStore::open(&path);
        let policy = ExpandPolicy { default_depth: 3 };
        let loaded = load_expand_state(&store, policy);
        assert!(!loaded.is_expanded(&NodeId::goal("1"), 0));
        assert!(loaded.is_expanded(&NodeId::goal("9"), 3));
        assert_eq!(loaded.policy(), policy);
    }
}
