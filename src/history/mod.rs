use std::future::Future;

use tracing::warn;

use crate::error::ApiError;
use crate::types::Dataset;

mod components;

pub use components::History;

/// Fetches the full version of a history entry. A failed fetch still
/// reopens the entry, with the summary standing in for the full dataset.
pub async fn reopen_dataset<F, Fut>(summary: Dataset, fetch: F) -> Dataset
where
    F: FnOnce(u64) -> Fut,
    Fut: Future<Output = Result<Dataset, ApiError>>,
{
    match fetch(summary.id).await {
        Ok(dataset) => dataset,
        Err(err) => {
            warn!(id = summary.id, "full dataset unavailable, showing summary: {err}");
            summary
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use crate::state::{Tab, Workspace};
    use crate::types::fixtures::{full, record, summary};

    use super::*;

    #[test]
    fn full_dataset_replaces_summary() {
        let entry = summary(3, &[("Pump", 1)]);
        let complete = full(3, vec![record(1, "Pump", 10.0, 2.0, 30.0)]);
        let expected = complete.clone();

        let reopened = block_on(reopen_dataset(entry, move |id| async move {
            assert_eq!(id, 3);
            Ok::<_, ApiError>(complete)
        }));

        assert_eq!(reopened, expected);
    }

    #[test]
    fn failed_fetch_falls_back_to_summary() {
        let entry = summary(3, &[("Pump", 2), ("Valve", 1)]);
        let mut workspace = Workspace::default();

        let reopened = block_on(reopen_dataset(entry.clone(), |_| async {
            Err::<Dataset, _>(ApiError::NotFound("Not found.".to_string()))
        }));
        workspace.dataset_selected(reopened);

        assert_eq!(workspace.current_dataset, Some(entry));
        assert_eq!(workspace.active_tab, Tab::Analysis);
        assert!(workspace
            .current_dataset
            .as_ref()
            .is_some_and(|dataset| dataset.records().is_empty()));
    }
}
