//! Reducer for the tabs tray.

use indexmap::IndexMap;

use crate::store::{Reducer, ReducerError};

use super::action::TrayAction;
use super::state::{Mode, TrayState};

/// Reducer for tray state transitions.
///
/// Pure. Sharing and closing tabs are side effects left to middleware and
/// the caller; their actions pass through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrayReducer;

impl TrayReducer {
    pub fn reduce(state: &TrayState, action: TrayAction) -> TrayState {
        match action {
            TrayAction::EnterSelectMode => TrayState {
                mode: Mode::Select(IndexMap::new()),
                ..state.clone()
            },

            TrayAction::ExitSelectMode => TrayState {
                mode: Mode::Normal,
                ..state.clone()
            },

            TrayAction::AddSelectTab(tab) => {
                let mut selection: IndexMap<_, _> = state
                    .mode
                    .selected_tabs()
                    .map(|t| (t.id.clone(), t.clone()))
                    .collect();
                // A re-added tab keeps its original position.
                selection.insert(tab.id.clone(), tab);
                TrayState {
                    mode: Mode::Select(selection),
                    ..state.clone()
                }
            }

            TrayAction::RemoveSelectTab(tab) => {
                let selection: IndexMap<_, _> = state
                    .mode
                    .selected_tabs()
                    .filter(|t| t.id != tab.id)
                    .map(|t| (t.id.clone(), t.clone()))
                    .collect();
                let mode = if selection.is_empty() {
                    Mode::Normal
                } else {
                    Mode::Select(selection)
                };
                TrayState {
                    mode,
                    ..state.clone()
                }
            }

            TrayAction::PageSelected(page) => TrayState {
                selected_page: page,
                ..state.clone()
            },

            TrayAction::SyncNow => TrayState {
                syncing: true,
                ..state.clone()
            },

            TrayAction::SyncCompleted => TrayState {
                syncing: false,
                ..state.clone()
            },

            TrayAction::UpdateInactiveExpanded(expanded) => TrayState {
                inactive_tabs_expanded: expanded,
                ..state.clone()
            },

            TrayAction::UpdateInactiveTabs(tabs) => TrayState {
                inactive_tabs: tabs.into(),
                ..state.clone()
            },

            TrayAction::UpdateNormalTabs(tabs) => TrayState {
                normal_tabs: tabs.into(),
                ..state.clone()
            },

            TrayAction::UpdatePrivateTabs(tabs) => TrayState {
                private_tabs: tabs.into(),
                ..state.clone()
            },

            TrayAction::UpdateSyncedTabs(tabs) => TrayState {
                synced_tabs: tabs.into(),
                ..state.clone()
            },

            TrayAction::UpdateSelectedTabId(tab_id) => TrayState {
                selected_tab_id: tab_id,
                ..state.clone()
            },

            TrayAction::TabAutoCloseDialogShown
            | TrayAction::ShareAllNormalTabs
            | TrayAction::ShareAllPrivateTabs
            | TrayAction::CloseAllNormalTabs
            | TrayAction::CloseAllPrivateTabs => state.clone(),
        }
    }
}

impl Reducer<TrayState, TrayAction> for TrayReducer {
    fn reduce(&self, state: &TrayState, action: TrayAction) -> Result<TrayState, ReducerError> {
        Ok(TrayReducer::reduce(state, action))
    }
}
