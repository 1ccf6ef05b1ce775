use crossterm::event::KeyCode;
use std::path::PathBuf;

use crate::api::identity::SessionToken;
use crate::services::images::MutationReport;
use crate::services::inventory::{InventoryRecord, InventoryView};
use crate::tui::resource::Resource;
use crate::tui::widgets::{ListState, TextInputField};

/// What a path prompt will do once submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadIntent {
    Upload,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Search,
    PathPrompt(UploadIntent),
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Default)]
pub struct State {
    pub inventory: Resource<InventoryView>,
    pub list_state: ListState,
    pub search: TextInputField,
    pub path: TextInputField,
    pub mode: Mode,
    pub status: Option<Status>,
    pub session: Option<SessionToken>,
    /// Record the open prompt or confirmation acts on
    pub target: Option<InventoryRecord>,
    /// A mutation is running; keys are ignored until it finishes
    pub busy: bool,
}

impl State {
    pub fn new(session: Option<SessionToken>) -> Self {
        let status = if session.is_none() {
            Some(Status::new(
                StatusKind::Warning,
                "Not signed in; run `inventory-cli auth login` to change images",
            ))
        } else {
            None
        };
        Self {
            list_state: ListState::with_selection(),
            session,
            status,
            ..Default::default()
        }
    }

    pub fn view(&self) -> Option<&InventoryView> {
        self.inventory.as_ref()
    }

    /// Record under the cursor in the filtered view
    pub fn selected_record(&self) -> Option<&InventoryRecord> {
        let view = self.view()?;
        view.get(self.list_state.selected()?)
    }

    pub fn visible_len(&self) -> usize {
        self.view().map(InventoryView::visible_len).unwrap_or(0)
    }

    /// Re-validate the cursor after the filtered view changed
    pub fn sync_selection(&mut self) {
        let len = self.visible_len();
        self.list_state.clamp(len);
    }
}

#[derive(Debug, Clone)]
pub enum Msg {
    Loaded(Vec<InventoryRecord>),
    Navigate(KeyCode),

    // Filtering
    StartSearch,
    SearchKey(KeyCode),
    /// Leave search mode; `keep` preserves the current input
    EndSearch { keep: bool },
    ToggleMissing,
    ResetFilter,

    // Mutations
    RequestUpload,
    RequestReplace,
    RequestDelete,
    PathKey(KeyCode),
    SubmitPath,
    ConfirmDelete,
    Cancel,
    MutationDone(Result<MutationReport, String>),

    Refresh,
    Quit,
}

/// Side effects requested by `update`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    None,
    LoadInventory,
    /// Re-run the query after the view was invalidated
    Refetch,
    Upload {
        intent: UploadIntent,
        record: InventoryRecord,
        path: PathBuf,
    },
    Delete {
        record: InventoryRecord,
    },
    Quit,
}
