use leptos::{component, view, Callable, Callback, IntoView};

#[component]
pub fn Spinner(#[prop(optional, into)] label: Option<String>) -> impl IntoView {
    view! {
        <div class="loading-container">
            <div class="spinner" aria-busy="true"></div>
            {label.map(|label| view! { <p>{label}</p> })}
        </div>
    }
}

#[component]
pub fn ErrorAlert(
    #[prop(into)] message: String,
    #[prop(optional, into)] on_dismiss: Option<Callback<()>>,
) -> impl IntoView {
    view! {
        <div class="alert alert-error" role="alert">
            <span>"⚠️"</span>
            <span>{message}</span>
            {on_dismiss
                .map(|on_dismiss| {
                    view! {
                        <button class="alert-dismiss" on:click=move |_| on_dismiss.call(())>
                            "✕"
                        </button>
                    }
                })}
        </div>
    }
}

#[component]
pub fn SuccessAlert(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="alert alert-success" role="status">
            <span>"✅"</span>
            <span>{message}</span>
        </div>
    }
}
