#![deny(clippy::all, clippy::pedantic)]
#![allow(non_snake_case, clippy::module_name_repetitions)]

use leptos::{component, create_memo, spawn_local, view, IntoView, SignalGet};
use tracing::{debug, error};
use wasm_tracing::WASMLayerConfigBuilder;

use crate::analysis::Analysis;
use crate::components::Spinner;
use crate::config::AppConfig;
use crate::history::History;
use crate::request::ApiClient;
use crate::session::{check_session, AuthForm, SessionState, UserBadge};
use crate::state::{provide_app_state, use_api_client, use_app_state, Tab, Workspace};
use crate::upload::FileUpload;

mod analysis;
mod components;
mod config;
mod datetime;
mod error;
mod history;
mod request;
mod session;
mod state;
mod types;
mod upload;

fn main() {
    console_error_panic_hook::set_once();
    wasm_tracing::set_as_global_default_with_config(
        WASMLayerConfigBuilder::new()
            .set_max_level(config::log_level())
            .build(),
    );

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!("configuration failed: {err}");
            leptos::mount_to_body(|| {
                view! {
                    <main class="container">
                        <h1>"Configuration error"</h1>
                        <p>"The dashboard could not find its API. Check the deployment settings."</p>
                    </main>
                }
            });
            return;
        }
    };
    debug!(api_base = %config.api_base, level = %config.log_level, "configuration loaded");

    let client = ApiClient::new(config.api_base);
    leptos::mount_to_body(move || view! { <App client /> });
}

#[component]
fn App(client: ApiClient) -> impl IntoView {
    provide_app_state(client);

    let state = use_app_state();
    let client = use_api_client();
    spawn_local(async move {
        let session = check_session(|| async move { client.current_user().await }).await;
        state.update(|workspace| workspace.session_checked(session));
    });

    let session = create_memo(move |_| state.with(|workspace| workspace.session.clone()));

    view! {
        <div class="app">
            <header class="app-header">
                <div class="header-content">
                    <div class="logo">
                        <span class="logo-icon">"⚗️"</span>
                        <div>
                            <h1>"Chemical Equipment Visualizer"</h1>
                            <p class="subtitle">"Parameter analysis dashboard"</p>
                        </div>
                    </div>
                    {move || (!session.get().is_checking()).then(|| view! { <UserBadge /> })}
                </div>
            </header>

            <main class="app-main">
                {move || match session.get() {
                    SessionState::Checking => view! { <Spinner label="Loading..." /> }.into_view(),
                    SessionState::Anonymous => view! { <AuthForm /> }.into_view(),
                    SessionState::Authenticated(_) => view! { <Dashboard /> }.into_view(),
                }}
            </main>

            <footer class="app-footer">
                <p>"Chemical Equipment Parameter Visualizer"</p>
            </footer>
        </div>
    }
}

#[component]
fn Dashboard() -> impl IntoView {
    let state = use_app_state();
    let active_tab = create_memo(move |_| state.with(|workspace| workspace.active_tab));

    view! {
        <nav class="tab-navigation">
            <TabButton tab=Tab::Upload label="📁 Upload" />
            <TabButton tab=Tab::Analysis label="📊 Analysis" />
            <TabButton tab=Tab::History label="📜 History" />
        </nav>

        <div class="tab-content">
            {move || match active_tab.get() {
                Tab::Upload => view! { <FileUpload /> }.into_view(),
                Tab::Analysis => view! { <Analysis /> }.into_view(),
                Tab::History => view! { <History /> }.into_view(),
            }}
        </div>
    }
}

#[component]
fn TabButton(tab: Tab, label: &'static str) -> impl IntoView {
    let state = use_app_state();
    let is_active = create_memo(move |_| state.with(|workspace| workspace.active_tab == tab));
    let is_enabled = create_memo(move |_| state.with(|workspace| workspace.tab_enabled(tab)));

    view! {
        <button
            class="tab"
            class:active=move || is_active.get()
            disabled=move || !is_enabled.get()
            on:click=move |_| state.update(|workspace: &mut Workspace| workspace.select_tab(tab))
        >
            {label}
        </button>
    }
}
