use leptos::{
    component, create_local_resource, create_memo, spawn_local, view, Callable, Callback, For,
    IntoView, SignalGet,
};
use tracing::error;

use crate::components::{ErrorAlert, Spinner};
use crate::datetime::display_datetime_short;
use crate::state::{use_api_client, use_app_state};
use crate::types::Dataset;

use super::reopen_dataset;

#[component]
pub fn History() -> impl IntoView {
    let state = use_app_state();
    let client = use_api_client();

    let refresh = create_memo(move |_| state.with(|workspace| workspace.history_refresh));

    let history = {
        let client = client.clone();
        create_local_resource(
            move || refresh.get(),
            move |_| {
                let client = client.clone();
                async move { client.dataset_history().await }
            },
        )
    };

    let handle_select = Callback::new(move |summary: Dataset| {
        let client = client.clone();
        spawn_local(async move {
            let dataset = reopen_dataset(summary, |id| async move { client.dataset(id).await }).await;
            state.update(|workspace| workspace.dataset_selected(dataset));
        });
    });

    move || {
        if history.loading().get() {
            return view! { <Spinner label="Loading history..." /> }.into_view();
        }

        match history.get() {
            None => view! { <Spinner label="Loading history..." /> }.into_view(),
            Some(Err(err)) => {
                error!("history request failed: {err}");
                view! { <ErrorAlert message="Failed to load history" /> }.into_view()
            }
            Some(Ok(datasets)) if datasets.is_empty() => view! {
                <article class="history-empty">
                    <div class="empty-icon">"📭"</div>
                    <h3>"No Upload History"</h3>
                    <p>"Upload your first dataset to see it here!"</p>
                </article>
            }
            .into_view(),
            Some(Ok(datasets)) => {
                let count = datasets.len();
                view! {
                    <section class="history-container">
                        <header class="history-header">
                            <h2>"📜 Upload History"</h2>
                            <p>{format!("Your last {count} uploaded datasets")}</p>
                        </header>
                        <div class="history-grid">
                            <For
                                each=move || datasets.clone().into_iter().enumerate()
                                key=|(_, dataset)| dataset.id
                                children=move |(index, dataset)| {
                                    view! {
                                        <HistoryCard
                                            index
                                            dataset
                                            on_select=handle_select
                                        />
                                    }
                                }
                            />
                        </div>
                    </section>
                }
                .into_view()
            }
        }
    }
}

#[component]
fn HistoryCard(index: usize, dataset: Dataset, on_select: Callback<Dataset>) -> impl IntoView {
    let uploaded_at = display_datetime_short(dataset.uploaded_at);
    let uploaded_by = dataset
        .uploaded_by
        .as_ref()
        .map(|identity| format!("by {}", identity.username));
    let types = dataset
        .equipment_distribution
        .types()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let filename = dataset.filename.clone();
    let total_count = dataset.total_count;
    let flowrate = format!("{:.1} m³/h", dataset.avg_flowrate);
    let pressure = format!("{:.1} bar", dataset.avg_pressure);
    let temperature = format!("{:.1} °C", dataset.avg_temperature);

    view! {
        <article class="history-card" on:click=move |_| on_select.call(dataset.clone())>
            <header class="history-card-header">
                <div class="history-number">{index + 1}</div>
                <div class="history-info">
                    <h4 class="history-filename">{filename}</h4>
                    <p class="history-date">{uploaded_at}</p>
                    {uploaded_by.map(|uploaded_by| view! { <p class="history-user">{uploaded_by}</p> })}
                </div>
            </header>

            <div class="history-stats">
                <span class="history-stat">"📦 " {total_count} " records"</span>
                <span class="history-stat">"💨 " {flowrate}</span>
                <span class="history-stat">"🔧 " {pressure}</span>
                <span class="history-stat">"🌡️ " {temperature}</span>
            </div>

            <div class="history-types">
                {types
                    .into_iter()
                    .map(|equipment_type| view! { <span class="type-tag">{equipment_type}</span> })
                    .collect::<Vec<_>>()}
            </div>

            <footer class="view-details">"Click to view details →"</footer>
        </article>
    }
}
