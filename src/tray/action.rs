//! Actions for the tabs tray.

use crate::store::Action;

use super::state::{Page, SyncedTab, Tab, TabId};

/// Actions that can be dispatched to the tray store.
#[derive(Debug, Clone, PartialEq)]
pub enum TrayAction {
    /// Entered multi-select mode.
    EnterSelectMode,

    /// Exited multi-select mode; the selection is discarded.
    ExitSelectMode,

    /// Added a tab to the selection.
    AddSelectTab(Tab),

    /// Removed a tab (matched by id) from the selection.
    RemoveSelectTab(Tab),

    /// The page now in focus.
    PageSelected(Page),

    /// Request to fetch the latest tabs from paired devices.
    SyncNow,

    /// A sync finished. May follow `SyncNow` immediately when no sync could
    /// be performed.
    SyncCompleted,

    UpdateInactiveExpanded(bool),
    UpdateInactiveTabs(Vec<Tab>),
    UpdateNormalTabs(Vec<Tab>),
    UpdatePrivateTabs(Vec<Tab>),
    UpdateSyncedTabs(Vec<SyncedTab>),
    UpdateSelectedTabId(Option<TabId>),

    // Handled by middleware and outside collaborators; no state change.
    TabAutoCloseDialogShown,
    ShareAllNormalTabs,
    ShareAllPrivateTabs,
    CloseAllNormalTabs,
    CloseAllPrivateTabs,
}

impl Action for TrayAction {}

impl TrayAction {
    /// Whether the reducer leaves the state untouched for this action.
    pub fn is_state_neutral(&self) -> bool {
        matches!(
            self,
            TrayAction::TabAutoCloseDialogShown
                | TrayAction::ShareAllNormalTabs
                | TrayAction::ShareAllPrivateTabs
                | TrayAction::CloseAllNormalTabs
                | TrayAction::CloseAllPrivateTabs
        )
    }
}
