use leptos::ev::MouseEvent;
use leptos::{
    component, create_memo, create_signal, spawn_local, view, Callback, For, IntoView, Signal, SignalGet,
    SignalGetUntracked, SignalSet,
};
use tracing::{error, warn};

use crate::components::ErrorAlert;
use crate::datetime::display_datetime;
use crate::state::{use_api_client, use_app_state};
use crate::types::{Dataset, EquipmentRecord};

use super::canvas::{get_color, Chart};
use super::derive::{distribution_series, parameter_series, DistributionSlice};
use super::report::save_report;
use super::use_chart_canvas::{use_chart_canvas, UseChartCanvasReturn};
use super::{display_measure, display_record_count, REPORT_FALLBACK};

#[component]
pub fn Analysis() -> impl IntoView {
    let state = use_app_state();
    let dataset = create_memo(move |_| state.with(|workspace| workspace.current_dataset.clone()));

    move || match dataset.get() {
        Some(dataset) => view! { <DatasetAnalysis dataset /> }.into_view(),
        None => view! {
            <article class="analysis-empty">
                <p>"Upload a file or pick one from the history to see its analysis."</p>
            </article>
        }
        .into_view(),
    }
}

#[component]
fn DatasetAnalysis(dataset: Dataset) -> impl IntoView {
    let slices = distribution_series(&dataset.equipment_distribution, dataset.total_count);
    let series = parameter_series(dataset.records());
    let records = dataset.records().to_vec();
    let is_full = dataset.is_full();
    let has_distribution = !dataset.equipment_distribution.is_empty();

    if !dataset.distribution_matches_total() {
        warn!(
            id = dataset.id,
            total_count = dataset.total_count,
            distributed = dataset.equipment_distribution.total(),
            "distribution does not add up to the record count"
        );
    }

    view! {
        <section class="analysis-container">
            <SummaryHeader dataset=dataset.clone() />

            <div class="stats-grid">
                <StatCard icon="📦" label="Total Equipment" value=dataset.total_count.to_string() />
                <StatCard
                    icon="💨"
                    label="Avg Flowrate"
                    value=display_measure(dataset.avg_flowrate, "m³/h")
                />
                <StatCard
                    icon="🔧"
                    label="Avg Pressure"
                    value=display_measure(dataset.avg_pressure, "bar")
                />
                <StatCard
                    icon="🌡️"
                    label="Avg Temperature"
                    value=display_measure(dataset.avg_temperature, "°C")
                />
            </div>

            {has_distribution.then(|| view! { <DistributionList slices=slices.clone() /> })}

            {(!is_full)
                .then(|| {
                    view! {
                        <p class="records-unavailable">
                            "Per-record data is unavailable for this dataset, only the summary is shown."
                        </p>
                    }
                })}

            <div class="charts-grid">
                <ChartCard title="Equipment Type Distribution" chart=Chart::Distribution(slices) />
                <ChartCard
                    title="Average Flowrate & Pressure by Type"
                    chart=Chart::Parameters(series.clone())
                />
                <ChartCard title="Average Temperature by Type" chart=Chart::Temperature(series) />
            </div>

            <DataTable records />
        </section>
    }
}

#[component]
fn SummaryHeader(dataset: Dataset) -> impl IntoView {
    let client = use_api_client();

    let (is_downloading, set_downloading) = create_signal(false);
    let (download_error, set_download_error) = create_signal::<Option<String>>(None);

    let id = dataset.id;
    let filename = dataset.report_filename();

    let handle_download = move |_evt: MouseEvent| {
        if is_downloading.get_untracked() {
            return;
        }

        set_downloading.set(true);
        set_download_error.set(None);

        let client = client.clone();
        let filename = filename.clone();
        spawn_local(async move {
            let result = match client.download_pdf(id).await {
                Ok(bytes) => save_report(&bytes, &filename).map_err(|err| {
                    error!(id, "report could not be saved: {err:#}");
                    REPORT_FALLBACK.to_string()
                }),
                Err(err) => {
                    error!(id, "report download failed: {err}");
                    Err(err.user_message(REPORT_FALLBACK))
                }
            };

            set_downloading.set(false);
            set_download_error.set(result.err());
        });
    };

    let dismiss = Callback::new(move |()| set_download_error.set(None));

    view! {
        <header class="analysis-header">
            <div>
                <h2>{format!("📊 {}", dataset.filename)}</h2>
                <p class="upload-date">
                    {format!("Uploaded on {}", display_datetime(dataset.uploaded_at))}
                    {dataset
                        .uploaded_by
                        .map(|identity| format!(" by {}", identity.username))}
                </p>
            </div>
            <button
                class="download-button"
                on:click=handle_download
                disabled=move || is_downloading.get()
                aria-busy=move || is_downloading.get().to_string()
            >
                {move || if is_downloading.get() { "Preparing PDF..." } else { "📄 Download PDF Report" }}
            </button>
        </header>

        {move || {
            download_error
                .get()
                .map(|message| view! { <ErrorAlert message on_dismiss=dismiss /> })
        }}
    }
}

#[component]
fn StatCard(
    icon: &'static str,
    label: &'static str,
    #[prop(into)] value: String,
) -> impl IntoView {
    view! {
        <article class="stat-card">
            <span class="stat-icon">{icon}</span>
            <div>
                <p class="stat-label">{label}</p>
                <p class="stat-value">{value}</p>
            </div>
        </article>
    }
}

#[component]
fn DistributionList(slices: Vec<DistributionSlice>) -> impl IntoView {
    view! {
        <article class="distribution-card">
            <h3>"Equipment Type Distribution"</h3>
            <ul class="distribution-list">
                {slices
                    .into_iter()
                    .enumerate()
                    .map(|(index, slice)| {
                        view! {
                            <li class="distribution-item">
                                <span class="distribution-type">{slice.equipment_type}</span>
                                <span class="distribution-count">
                                    {format!("{} ({:.1}%)", slice.count, slice.percentage)}
                                </span>
                                <div class="distribution-bar">
                                    <div
                                        class="distribution-fill"
                                        style:width=format!("{:.1}%", slice.percentage)
                                        style:background-color=get_color(index)
                                    ></div>
                                </div>
                            </li>
                        }
                    })
                    .collect::<Vec<_>>()}
            </ul>
        </article>
    }
}

#[component]
fn ChartCard(title: &'static str, chart: Chart) -> impl IntoView {
    let UseChartCanvasReturn {
        node_ref,
        actual_width,
        actual_height,
    } = use_chart_canvas(Signal::derive(move || chart.clone()));

    view! {
        <article class="chart-card">
            <h3>{title}</h3>
            <canvas
                node_ref=node_ref
                width=actual_width
                height=actual_height
                style:width="100%"
                style:height="320px"
            />
        </article>
    }
}

#[component]
fn DataTable(records: Vec<EquipmentRecord>) -> impl IntoView {
    let count = records.len();

    view! {
        <article class="table-card">
            <header class="table-header">
                <h3>"📋 Equipment Records"</h3>
                <p>{display_record_count(count)}</p>
            </header>
            <div class="table-wrapper">
                <table class="striped">
                    <thead>
                        <tr>
                            <th>"#"</th>
                            <th>"Equipment Name"</th>
                            <th>"Type"</th>
                            <th>"Flowrate (m³/h)"</th>
                            <th>"Pressure (bar)"</th>
                            <th>"Temperature (°C)"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || records.clone().into_iter().enumerate()
                            key=|(index, record)| (*index, record.id)
                            children=move |(index, record)| {
                                view! {
                                    <tr>
                                        <td>{index + 1}</td>
                                        <td>{record.equipment_name}</td>
                                        <td>
                                            <span class="type-badge">{record.equipment_type}</span>
                                        </td>
                                        <td>{format!("{:.2}", record.flowrate)}</td>
                                        <td>{format!("{:.2}", record.pressure)}</td>
                                        <td>{format!("{:.2}", record.temperature)}</td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
        </article>
    }
}
