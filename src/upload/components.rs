use leptos::ev::{DragEvent, Event, MouseEvent};
use leptos::html::Input;
use leptos::{
    component, create_node_ref, create_signal, event_target, spawn_local, view, IntoView,
    SignalGet, SignalGetUntracked, SignalSet,
};
use tracing::{debug, error};
use web_sys::{File, HtmlInputElement};

use crate::components::ErrorAlert;
use crate::state::{use_api_client, use_app_state};

use super::{
    create_upload_slots, display_size, read_file, upload_with, validate_upload, UploadError,
};

#[component]
pub fn FileUpload() -> impl IntoView {
    let state = use_app_state();
    let client = use_api_client();
    let input_ref = create_node_ref::<Input>();

    let slots = create_upload_slots::<File>();
    let (is_drag_active, set_drag_active) = create_signal(false);

    let select_file = move |file: Option<File>| {
        slots.error_message.set(None);

        let Some(file) = file else {
            return;
        };

        let size = file_size(&file);

        match validate_upload(&file.name(), size) {
            Ok(()) => slots.select(file),
            Err(err) => {
                debug!(name = %file.name(), size, "file rejected: {err}");
                slots.reject(&err);
            }
        }
    };

    let handle_change = move |evt: Event| {
        let input = event_target::<HtmlInputElement>(&evt);
        select_file(input.files().and_then(|files| files.get(0)));
        // The picked file is held by the selection, so the same file can be picked again
        input.set_value("");
    };

    let handle_drag = move |evt: DragEvent| {
        evt.prevent_default();
        evt.stop_propagation();
        match evt.type_().as_str() {
            "dragenter" | "dragover" => set_drag_active.set(true),
            "dragleave" => set_drag_active.set(false),
            _ => {}
        }
    };

    let handle_drop = move |evt: DragEvent| {
        evt.prevent_default();
        evt.stop_propagation();
        set_drag_active.set(false);

        let file = evt
            .data_transfer()
            .and_then(|data_transfer| data_transfer.files())
            .and_then(|files| files.get(0));
        select_file(file);
    };

    let handle_browse = move |_evt: MouseEvent| {
        if let Some(input) = input_ref.get_untracked() {
            input.click();
        }
    };

    let handle_clear = move |evt: MouseEvent| {
        evt.stop_propagation();
        slots.clear();
    };

    let handle_upload = move |_evt: MouseEvent| {
        let Some(file) = slots.begin() else {
            return;
        };

        let client = client.clone();
        spawn_local(async move {
            let name = file.name();

            let result = upload_with(&name, file_size(&file), || async {
                let bytes = read_file(&file).await?;
                Ok::<_, UploadError>(client.upload_csv(&name, bytes).await?)
            })
            .await;

            if let Err(err) = &result {
                error!(%name, "upload failed: {err}");
            }

            slots.finish(state, result);
        });
    };

    view! {
        <section class="upload-section">
            <header>
                <h2>"📁 Upload Equipment Data"</h2>
                <p>
                    "Upload a CSV file containing equipment parameters"
                    <small>"(Equipment Name, Type, Flowrate, Pressure, Temperature)"</small>
                </p>
            </header>

            {move || slots.error_message.get().map(|message| view! { <ErrorAlert message /> })}

            <div
                class="drop-zone"
                class:drag-active=is_drag_active
                class:has-file=move || slots.selected.get().is_some()
                on:dragenter=handle_drag
                on:dragover=handle_drag
                on:dragleave=handle_drag
                on:drop=handle_drop
                on:click=handle_browse
            >
                <input
                    id="file-input"
                    type="file"
                    accept=".csv"
                    class="hidden"
                    node_ref=input_ref
                    on:change=handle_change
                />
                {move || match slots.selected.get() {
                    Some(file) => view! {
                        <div class="selected-file">
                            <span class="file-icon">"📄"</span>
                            <div>
                                <p class="file-name">{file.name()}</p>
                                <p class="file-size">{display_size(file_size(&file))}</p>
                            </div>
                            <button class="clear-file" on:click=handle_clear>"✕"</button>
                        </div>
                    }
                    .into_view(),
                    None => view! {
                        <div class="drop-prompt">
                            <span class="upload-icon">"📤"</span>
                            <p><strong>"Click to browse"</strong> " or drag and drop"</p>
                            <small>"CSV files only (max 10MB)"</small>
                        </div>
                    }
                    .into_view(),
                }}
            </div>

            <button
                class="upload-button"
                on:click=handle_upload
                disabled=move || slots.selected.get().is_none() || slots.is_uploading.get()
                aria-busy=move || slots.is_uploading.get().to_string()
            >
                {move || if slots.is_uploading.get() { "Uploading & Processing..." } else { "⚡ Upload & Analyze" }}
            </button>

            <p class="sample-format">
                <strong>"Sample Format:"</strong>
                " see " <code>"sample_equipment_data.csv"</code> " for the expected columns."
            </p>
        </section>
    }
}

// Browser file sizes are whole, non-negative byte counts
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn file_size(file: &File) -> u64 {
    file.size() as u64
}
