//! State for the tabs tray.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::store::State;

/// Identifier of a browser tab.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabId(String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A local browser tab as shown in the tray.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub private: bool,
}

impl Tab {
    /// New normal tab with a random id.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: TabId::random(),
            url: url.into(),
            title: title.into(),
            private: false,
        }
    }

    pub fn with_id(mut self, id: TabId) -> Self {
        self.id = id;
        self
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }
}

/// A tab open on another device, delivered by sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedTab {
    pub device: String,
    pub title: String,
    pub url: String,
}

/// Pager positions in the tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    PrivateTabs,
    #[default]
    NormalTabs,
    SyncedTabs,
}

impl Page {
    /// Map a pager position to its page; anything past 1 is the synced page.
    pub fn from_position(position: usize) -> Self {
        match position {
            0 => Page::PrivateTabs,
            1 => Page::NormalTabs,
            _ => Page::SyncedTabs,
        }
    }

    pub fn position(self) -> usize {
        match self {
            Page::PrivateTabs => 0,
            Page::NormalTabs => 1,
            Page::SyncedTabs => 2,
        }
    }
}

/// Whether the tab list is in multi-select mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Normal,

    /// Multi-select with the selected tabs keyed by id, in the order the
    /// user picked them. May be empty right after entering the mode.
    /// Equality ignores that order.
    Select(IndexMap<TabId, Tab>),
}

impl Mode {
    /// Selected tabs, in selection order. Always empty in `Normal`.
    pub fn selected_tabs(&self) -> impl Iterator<Item = &Tab> {
        let selection = match self {
            Mode::Normal => None,
            Mode::Select(selection) => Some(selection.values()),
        };
        selection.into_iter().flatten()
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Mode::Select(_))
    }

    pub fn is_selected(&self, id: &TabId) -> bool {
        match self {
            Mode::Normal => false,
            Mode::Select(selection) => selection.contains_key(id),
        }
    }

    pub fn selection_len(&self) -> usize {
        match self {
            Mode::Normal => 0,
            Mode::Select(selection) => selection.len(),
        }
    }
}

/// Complete state of the tabs tray.
///
/// List fields are shared slices, so a reduction that touches one field
/// leaves the others pointing at the same allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrayState {
    pub selected_page: Page,
    pub mode: Mode,
    pub inactive_tabs: Arc<[Tab]>,
    /// Whether the inactive tabs section is expanded when the tray opens.
    pub inactive_tabs_expanded: bool,
    pub normal_tabs: Arc<[Tab]>,
    pub private_tabs: Arc<[Tab]>,
    pub synced_tabs: Arc<[SyncedTab]>,
    /// A sync with paired devices is in flight.
    pub syncing: bool,
    pub selected_tab_id: Option<TabId>,
}

impl Default for TrayState {
    fn default() -> Self {
        Self {
            selected_page: Page::default(),
            mode: Mode::default(),
            inactive_tabs: Arc::from(Vec::new()),
            inactive_tabs_expanded: false,
            normal_tabs: Arc::from(Vec::new()),
            private_tabs: Arc::from(Vec::new()),
            synced_tabs: Arc::from(Vec::new()),
            syncing: false,
            selected_tab_id: None,
        }
    }
}

impl State for TrayState {}

impl TrayState {
    /// Look up a local tab in any of the tab lists.
    pub fn find_tab(&self, id: &TabId) -> Option<&Tab> {
        self.normal_tabs
            .iter()
            .chain(self.private_tabs.iter())
            .chain(self.inactive_tabs.iter())
            .find(|tab| &tab.id == id)
    }
}
