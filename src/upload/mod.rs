use std::future::Future;

use js_sys::Uint8Array;
use leptos::{create_rw_signal, RwSignal, SignalGetUntracked, SignalSet};
use thiserror::Error;
use tracing::debug;
use wasm_bindgen_futures::JsFuture;

use crate::config::MAX_UPLOAD_BYTES;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Dataset;

mod components;

pub use components::FileUpload;

pub const UPLOAD_FALLBACK: &str = "Error uploading file. Please try again.";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadError {
    #[error("Please select a file first")]
    NoFile,
    #[error("Please select a CSV file")]
    NotCsv,
    #[error("File size must be less than 10MB")]
    TooLarge { size: u64 },
    #[error("file could not be read: {0}")]
    Read(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl UploadError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(UPLOAD_FALLBACK),
            Self::Read(_) => UPLOAD_FALLBACK.to_string(),
            Self::NoFile | Self::NotCsv | Self::TooLarge { .. } => self.to_string(),
        }
    }
}

/// The one check both the file picker and drag-and-drop go through.
pub fn validate_upload(name: &str, size: u64) -> Result<(), UploadError> {
    if !name.ends_with(".csv") {
        return Err(UploadError::NotCsv);
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }

    Ok(())
}

/// Validates, then hands over to `send`. Nothing is sent for a rejected file.
pub async fn upload_with<S, Fut>(name: &str, size: u64, send: S) -> Result<Dataset, UploadError>
where
    S: FnOnce() -> Fut,
    Fut: Future<Output = Result<Dataset, UploadError>>,
{
    validate_upload(name, size)?;

    let dataset = send().await?;

    debug!(id = dataset.id, name, "upload accepted");

    Ok(dataset)
}

pub async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, UploadError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|err| UploadError::Read(format!("{err:?}")))?;

    Ok(Uint8Array::new(&buffer).to_vec())
}

/// State owned by one upload control. The control can unmount while its
/// request is in flight, so writes made after the request go through `try_set`
/// and the shared workspace is updated first.
pub struct UploadSlots<F: 'static> {
    pub selected: RwSignal<Option<F>>,
    pub error_message: RwSignal<Option<String>>,
    pub is_uploading: RwSignal<bool>,
}

impl<F: 'static> Clone for UploadSlots<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: 'static> Copy for UploadSlots<F> {}

pub fn create_upload_slots<F: Clone + 'static>() -> UploadSlots<F> {
    UploadSlots {
        selected: create_rw_signal(None),
        error_message: create_rw_signal(None),
        is_uploading: create_rw_signal(false),
    }
}

impl<F: Clone + 'static> UploadSlots<F> {
    pub fn select(&self, file: F) {
        self.error_message.set(None);
        self.selected.set(Some(file));
    }

    pub fn reject(&self, err: &UploadError) {
        self.error_message.set(Some(err.user_message()));
    }

    pub fn clear(&self) {
        self.selected.set(None);
    }

    /// Marks an upload as in flight and hands out the selected file. Returns
    /// `None` while another upload runs or when nothing is selected.
    pub fn begin(&self) -> Option<F> {
        if self.is_uploading.get_untracked() {
            return None;
        }

        let Some(file) = self.selected.get_untracked() else {
            self.reject(&UploadError::NoFile);
            return None;
        };

        self.is_uploading.set(true);
        self.error_message.set(None);

        Some(file)
    }

    pub fn finish(&self, state: AppState, result: Result<Dataset, UploadError>) {
        let unmounted = match result {
            Ok(dataset) => {
                state.update(|workspace| workspace.upload_succeeded(dataset));
                self.selected.try_set(None).is_some()
            }
            Err(err) => self.error_message.try_set(Some(err.user_message())).is_some(),
        };

        if unmounted || self.is_uploading.try_set(false).is_some() {
            debug!("upload finished after its control unmounted");
        }
    }
}

#[expect(clippy::cast_precision_loss)]
pub fn display_size(size: u64) -> String {
    format!("{:.2} KB", size as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;
    use leptos::{as_child_of_current_owner, create_runtime};

    use crate::state::{Tab, Workspace};

    use crate::types::fixtures::{full, record};

    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn only_csv_names_are_accepted() {
        assert_eq!(validate_upload("data.txt", 10), Err(UploadError::NotCsv));
        assert_eq!(validate_upload("data.CSV", 10), Err(UploadError::NotCsv));
        assert_eq!(validate_upload("data.csv", 10), Ok(()));
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert_eq!(validate_upload("data.csv", 10 * MIB), Ok(()));
        assert_eq!(
            validate_upload("data.csv", 10 * MIB + 1),
            Err(UploadError::TooLarge { size: 10 * MIB + 1 })
        );
    }

    #[test]
    fn rejected_files_are_never_sent() {
        let calls = Cell::new(0);
        let send = || {
            calls.set(calls.get() + 1);
            async { Ok::<_, UploadError>(full(1, Vec::new())) }
        };

        let wrong_type = block_on(upload_with("data.txt", 2048, send));
        assert_eq!(wrong_type, Err(UploadError::NotCsv));

        let too_large = block_on(upload_with("data.csv", 11 * MIB, send));
        assert_eq!(too_large, Err(UploadError::TooLarge { size: 11 * MIB }));

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn valid_file_returns_the_dataset() {
        let dataset = full(9, vec![record(1, "Pump", 10.0, 2.0, 30.0)]);
        let expected = dataset.clone();

        let result = block_on(upload_with("plant.csv", 512, move || async move {
            Ok::<_, UploadError>(dataset)
        }));

        assert_eq!(result, Ok(expected));
    }

    #[test]
    fn server_rejection_keeps_its_message() {
        let result = block_on(upload_with("plant.csv", 512, || async {
            Err::<Dataset, _>(UploadError::from(ApiError::Validation(
                "Missing required columns: Pressure".to_string(),
            )))
        }));

        assert_eq!(
            result.map_err(|err| err.user_message()),
            Err("Missing required columns: Pressure".to_string())
        );
    }

    #[test]
    fn network_failure_uses_the_fallback() {
        let err = UploadError::from(ApiError::Network("offline".to_string()));

        assert_eq!(err.user_message(), UPLOAD_FALLBACK);
        assert_eq!(UploadError::NotCsv.user_message(), "Please select a CSV file");
    }

    fn workspace_state() -> AppState {
        AppState {
            workspace: create_rw_signal(Workspace::default()),
        }
    }

    #[test]
    fn only_one_upload_runs_at_a_time() {
        let runtime = create_runtime();
        let slots = create_upload_slots();
        slots.select("plant.csv".to_string());

        assert_eq!(slots.begin(), Some("plant.csv".to_string()));
        assert_eq!(slots.begin(), None);
        assert!(slots.is_uploading.get_untracked());

        runtime.dispose();
    }

    #[test]
    fn upload_without_selection_asks_for_a_file() {
        let runtime = create_runtime();
        let slots = create_upload_slots::<String>();

        assert_eq!(slots.begin(), None);
        assert!(!slots.is_uploading.get_untracked());
        assert_eq!(
            slots.error_message.get_untracked(),
            Some("Please select a file first".to_string())
        );

        runtime.dispose();
    }

    #[test]
    fn failed_upload_keeps_the_selection() {
        let runtime = create_runtime();
        let state = workspace_state();
        let slots = create_upload_slots();
        slots.select("plant.csv".to_string());
        slots.begin();

        slots.finish(
            state,
            Err(UploadError::from(ApiError::Validation(
                "Missing required columns: Pressure".to_string(),
            ))),
        );

        assert_eq!(slots.selected.get_untracked(), Some("plant.csv".to_string()));
        assert_eq!(
            slots.error_message.get_untracked(),
            Some("Missing required columns: Pressure".to_string())
        );
        assert!(!slots.is_uploading.get_untracked());
        assert_eq!(state.with(Clone::clone), Workspace::default());

        runtime.dispose();
    }

    #[test]
    fn successful_upload_selects_the_dataset() {
        let runtime = create_runtime();
        let state = workspace_state();
        let slots = create_upload_slots();
        slots.select("plant.csv".to_string());
        slots.begin();

        slots.finish(state, Ok(full(4, vec![record(1, "Pump", 10.0, 2.0, 30.0)])));

        assert_eq!(slots.selected.get_untracked(), None);
        assert!(!slots.is_uploading.get_untracked());
        state.with(|workspace| {
            assert_eq!(workspace.current_dataset.as_ref().map(|dataset| dataset.id), Some(4));
            assert_eq!(workspace.active_tab, Tab::Analysis);
            assert_eq!(workspace.history_refresh, 1);
        });

        runtime.dispose();
    }

    #[test]
    fn upload_finishing_after_unmount_still_selects_the_dataset() {
        let runtime = create_runtime();
        let state = workspace_state();
        let mount = as_child_of_current_owner(|()| {
            let slots = create_upload_slots();
            slots.select("plant.csv".to_string());
            slots.begin();
            slots
        });

        let (slots, disposer) = mount(());
        // Switching tabs disposes the control's scope
        drop(disposer);

        slots.finish(state, Ok(full(4, vec![record(1, "Pump", 10.0, 2.0, 30.0)])));

        state.with(|workspace| {
            assert_eq!(workspace.current_dataset.as_ref().map(|dataset| dataset.id), Some(4));
            assert_eq!(workspace.active_tab, Tab::Analysis);
            assert_eq!(workspace.history_refresh, 1);
        });

        runtime.dispose();
    }

    #[test]
    fn failure_after_unmount_is_dropped_quietly() {
        let runtime = create_runtime();
        let state = workspace_state();
        let mount = as_child_of_current_owner(|()| {
            let slots = create_upload_slots();
            slots.select("plant.csv".to_string());
            slots.begin();
            slots
        });

        let (slots, disposer) = mount(());
        drop(disposer);

        slots.finish(state, Err(UploadError::from(ApiError::Network("offline".to_string()))));

        assert_eq!(state.with(Clone::clone), Workspace::default());

        runtime.dispose();
    }

    #[test]
    fn sizes_are_shown_in_kilobytes() {
        assert_eq!(display_size(1536), "1.50 KB");
    }
}
