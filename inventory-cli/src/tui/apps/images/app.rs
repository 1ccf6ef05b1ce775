use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::sync::Arc;
use std::time::Duration;

use super::state::{Command, Mode, Msg, State, Status, StatusKind, UploadIntent};
use super::view;
use crate::services::images::routes::content_type_for;
use crate::services::images::{ImageService, ImageSource, MutationReport, Outcome, UploadRoute};
use crate::services::inventory::{
    ActiveFilter, Audience, InventoryQueryService, InventoryRecord, InventoryView, RowIndex,
};
use crate::tui::Theme;
use crate::tui::resource::Resource;

/// Rows moved by PageUp/PageDown before the first render reports the real height
const DEFAULT_PAGE: usize = 20;

const MAX_PATH_LEN: usize = 4096;

/// Services the app talks to
pub struct Context {
    pub query: InventoryQueryService,
    pub images: Arc<ImageService>,
}

/// Translate a key press into a message for the current mode
pub fn key_to_msg(state: &State, key: KeyEvent) -> Option<Msg> {
    if key.kind != KeyEventKind::Press || state.busy {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Msg::Quit);
    }

    match state.mode {
        Mode::Browse => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Msg::Quit),
            KeyCode::Up
            | KeyCode::Down
            | KeyCode::PageUp
            | KeyCode::PageDown
            | KeyCode::Home
            | KeyCode::End => Some(Msg::Navigate(key.code)),
            KeyCode::Char('k') => Some(Msg::Navigate(KeyCode::Up)),
            KeyCode::Char('j') => Some(Msg::Navigate(KeyCode::Down)),
            KeyCode::Char('/') => Some(Msg::StartSearch),
            KeyCode::Char('m') => Some(Msg::ToggleMissing),
            KeyCode::Char('a') => Some(Msg::ResetFilter),
            KeyCode::Char('u') => Some(Msg::RequestUpload),
            KeyCode::Char('e') => Some(Msg::RequestReplace),
            KeyCode::Char('d') | KeyCode::Delete => Some(Msg::RequestDelete),
            KeyCode::Char('r') | KeyCode::F(5) => Some(Msg::Refresh),
            _ => None,
        },
        Mode::Search => match key.code {
            KeyCode::Esc => Some(Msg::EndSearch { keep: false }),
            KeyCode::Enter => Some(Msg::EndSearch { keep: true }),
            KeyCode::Up | KeyCode::Down => Some(Msg::Navigate(key.code)),
            code => Some(Msg::SearchKey(code)),
        },
        Mode::PathPrompt(_) => match key.code {
            KeyCode::Esc => Some(Msg::Cancel),
            KeyCode::Enter => Some(Msg::SubmitPath),
            code => Some(Msg::PathKey(code)),
        },
        Mode::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Msg::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Msg::Cancel),
            _ => None,
        },
    }
}

pub fn update(state: &mut State, msg: Msg) -> Command {
    match msg {
        Msg::Loaded(records) => {
            log::info!("Loaded {} inventory records", records.len());
            match state.inventory.as_mut() {
                Some(view) => view.replace_result(records),
                None => state.inventory = Resource::Success(InventoryView::new(records)),
            }
            state.search.clear();
            state.sync_selection();
            Command::None
        }

        Msg::Navigate(key) => {
            let len = state.visible_len();
            state.list_state.handle_key(key, len, DEFAULT_PAGE);
            Command::None
        }

        Msg::StartSearch => {
            state.mode = Mode::Search;
            Command::None
        }

        Msg::SearchKey(key) => {
            if state.search.handle_key(key, None) {
                if let Some(view) = state.inventory.as_mut() {
                    view.search(state.search.value());
                }
                state.sync_selection();
            }
            Command::None
        }

        Msg::EndSearch { keep } => {
            state.mode = Mode::Browse;
            if !keep {
                state.search.clear();
                if let Some(view) = state.inventory.as_mut() {
                    view.search("");
                }
                state.sync_selection();
            }
            Command::None
        }

        Msg::ToggleMissing => {
            if let Some(view) = state.inventory.as_mut() {
                if *view.filter() == ActiveFilter::MissingImage {
                    view.reset();
                } else {
                    view.filter_missing_image();
                }
            }
            state.search.clear();
            state.sync_selection();
            Command::None
        }

        Msg::ResetFilter => {
            if let Some(view) = state.inventory.as_mut() {
                view.reset();
            }
            state.search.clear();
            state.sync_selection();
            Command::None
        }

        Msg::RequestUpload => request_path(state, UploadIntent::Upload),
        Msg::RequestReplace => request_path(state, UploadIntent::Replace),

        Msg::RequestDelete => {
            let Some(record) = state.selected_record().cloned() else {
                return Command::None;
            };
            if !record.has_image() {
                state.status = Some(Status::new(
                    StatusKind::Warning,
                    format!("{} has no image to delete", record.name),
                ));
                return Command::None;
            }
            state.target = Some(record);
            state.mode = Mode::ConfirmDelete;
            Command::None
        }

        Msg::PathKey(key) => {
            state.path.handle_key(key, Some(MAX_PATH_LEN));
            Command::None
        }

        Msg::SubmitPath => {
            let Mode::PathPrompt(intent) = state.mode else {
                return Command::None;
            };
            let path = state.path.value().trim().to_string();
            if path.is_empty() {
                return Command::None;
            }
            let Some(record) = state.target.take() else {
                state.mode = Mode::Browse;
                return Command::None;
            };
            state.mode = Mode::Browse;
            state.path.clear();
            state.busy = true;
            state.status = Some(Status::new(
                StatusKind::Info,
                format!("Uploading image for {}...", record.name),
            ));
            Command::Upload {
                intent,
                record,
                path: expand_home(&path),
            }
        }

        Msg::ConfirmDelete => {
            state.mode = Mode::Browse;
            let Some(record) = state.target.take() else {
                return Command::None;
            };
            state.busy = true;
            state.status = Some(Status::new(
                StatusKind::Info,
                format!("Deleting image of {}...", record.name),
            ));
            Command::Delete { record }
        }

        Msg::Cancel => {
            state.mode = Mode::Browse;
            state.target = None;
            state.path.clear();
            Command::None
        }

        Msg::MutationDone(result) => {
            state.busy = false;
            match result {
                Ok(report) => {
                    state.status = Some(report_status(&report));
                    if report.changed_sheet() {
                        if let Some(view) = state.inventory.as_mut() {
                            view.invalidate();
                        }
                        return Command::Refetch;
                    }
                    Command::None
                }
                Err(e) => {
                    state.status = Some(Status::new(StatusKind::Error, e));
                    Command::None
                }
            }
        }

        Msg::Refresh => match state.inventory.as_mut() {
            Some(view) => {
                view.invalidate();
                Command::Refetch
            }
            None => Command::LoadInventory,
        },

        Msg::Quit => Command::Quit,
    }
}

fn request_path(state: &mut State, intent: UploadIntent) -> Command {
    let Some(record) = state.selected_record().cloned() else {
        return Command::None;
    };
    match (intent, record.has_image()) {
        (UploadIntent::Upload, true) => {
            state.status = Some(Status::new(
                StatusKind::Warning,
                format!("{} already has an image; press e to replace it", record.name),
            ));
            return Command::None;
        }
        (UploadIntent::Replace, false) => {
            state.status = Some(Status::new(
                StatusKind::Warning,
                format!("{} has no image yet; press u to upload one", record.name),
            ));
            return Command::None;
        }
        _ => {}
    }
    state.target = Some(record);
    state.path.clear();
    state.mode = Mode::PathPrompt(intent);
    Command::None
}

fn report_status(report: &MutationReport) -> Status {
    let mut text = match report.outcome() {
        Outcome::Succeeded => format!("Image {} succeeded (row {})", report.kind, report.row),
        outcome => {
            let errors: Vec<String> = report
                .failed
                .iter()
                .map(|f| format!("{}: {}", f.step, f.error))
                .collect();
            format!("Image {} {}: {}", report.kind, outcome, errors.join("; "))
        }
    };
    if let Some(mismatch) = &report.filename_mismatch {
        text.push_str(&format!(
            " (stored as {}, expected {})",
            mismatch.actual, mismatch.expected
        ));
    }
    let kind = match report.outcome() {
        Outcome::Succeeded if report.filename_mismatch.is_some() => StatusKind::Warning,
        Outcome::Succeeded => StatusKind::Success,
        Outcome::PartiallySucceeded => StatusKind::Warning,
        Outcome::Failed => StatusKind::Error,
    };
    Status::new(kind, text)
}

fn expand_home(path: &str) -> std::path::PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    std::path::PathBuf::from(path)
}

/// Run a mutation command to completion and turn its result into a message
async fn perform_mutation(ctx: &Context, state: &State, command: Command) -> Msg {
    let session = state.session.as_ref();
    let result = match command {
        Command::Upload {
            intent,
            record,
            path,
        } => upload(ctx, session, intent, &record, &path).await,
        Command::Delete { record } => delete(ctx, session, &record).await,
        _ => return Msg::MutationDone(Err("nothing to do".to_string())),
    };
    Msg::MutationDone(result.map_err(|e| format!("{:#}", e)))
}

async fn upload(
    ctx: &Context,
    session: Option<&crate::api::identity::SessionToken>,
    intent: UploadIntent,
    record: &InventoryRecord,
    path: &std::path::Path,
) -> Result<MutationReport> {
    let content_type = content_type_for(path)
        .ok_or_else(|| anyhow::anyhow!("Cannot tell the image type of {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let source = ImageSource {
        content_type: content_type.to_string(),
        bytes,
    };
    let route = match intent {
        UploadIntent::Upload => UploadRoute::ImageUploader,
        UploadIntent::Replace => UploadRoute::UpdateImage {
            previous_key: record
                .image_key()
                .ok_or_else(|| anyhow::anyhow!("{} has no image to replace", record.name))?
                .to_string(),
        },
    };
    Ok(ctx.images.upload_image(session, route, record, source).await?)
}

async fn delete(
    ctx: &Context,
    session: Option<&crate::api::identity::SessionToken>,
    record: &InventoryRecord,
) -> Result<MutationReport> {
    let url = record
        .image
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("{} has no image", record.name))?;
    let row = RowIndex::from_position(record.position)
        .ok_or_else(|| anyhow::anyhow!("Invalid position {}", record.position))?;
    Ok(ctx.images.delete(session, row, url).await?)
}

/// Event loop: draw, read one key, update, run the resulting command
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, ctx: Context, mut state: State) -> Result<()> {
    let theme = Theme::default();
    let mut pending = Command::LoadInventory;

    loop {
        terminal.draw(|frame| view::render(frame, &mut state, &theme))?;

        let next = match std::mem::replace(&mut pending, Command::None) {
            Command::None => None,
            Command::Quit => return Ok(()),
            Command::LoadInventory => Some(Msg::Loaded(ctx.query.get_all(Audience::Admin).await)),
            Command::Refetch => {
                if let Some(view) = state.inventory.as_mut() {
                    if view.is_stale() {
                        view.refetch(&ctx.query).await;
                    }
                }
                state.search.clear();
                state.sync_selection();
                None
            }
            command @ (Command::Upload { .. } | Command::Delete { .. }) => {
                Some(perform_mutation(&ctx, &state, command).await)
            }
        };

        if let Some(msg) = next {
            pending = update(&mut state, msg);
            continue;
        }

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if let Some(msg) = key_to_msg(&state, key) {
                    pending = update(&mut state, msg);
                }
            }
        }
    }
}
