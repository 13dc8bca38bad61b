use leptos::{
    create_rw_signal, expect_context, provide_context, RwSignal, SignalUpdate, SignalWith,
};
use tracing::debug;

use crate::request::ApiClient;
use crate::session::SessionState;
use crate::types::{Dataset, Identity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Upload,
    Analysis,
    History,
}

/// Everything the views share. Only the handlers below write to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    pub session: SessionState,
    pub current_dataset: Option<Dataset>,
    pub active_tab: Tab,
    pub history_refresh: u32,
}

impl Workspace {
    pub fn session_checked(&mut self, session: SessionState) {
        self.session = session;
    }

    pub fn login_succeeded(&mut self, identity: Identity) {
        self.session.login(identity);
    }

    pub fn logged_out(&mut self) {
        self.session.logout();
        self.current_dataset = None;
        self.active_tab = Tab::Upload;
    }

    pub fn upload_succeeded(&mut self, dataset: Dataset) {
        self.current_dataset = Some(dataset);
        self.history_refresh = self.history_refresh.wrapping_add(1);
        self.active_tab = Tab::Analysis;
    }

    pub fn dataset_selected(&mut self, dataset: Dataset) {
        self.current_dataset = Some(dataset);
        self.active_tab = Tab::Analysis;
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if self.tab_enabled(tab) {
            self.active_tab = tab;
        }
    }

    pub fn tab_enabled(&self, tab: Tab) -> bool {
        tab != Tab::Analysis || self.current_dataset.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AppState {
    pub workspace: RwSignal<Workspace>,
}

impl AppState {
    pub fn update(&self, handler: impl FnOnce(&mut Workspace)) {
        self.workspace.update(|workspace| {
            handler(workspace);
            debug!(
                session = ?workspace.session,
                tab = ?workspace.active_tab,
                dataset = ?workspace.current_dataset.as_ref().map(|dataset| dataset.id),
                "workspace updated"
            );
        });
    }

    pub fn with<T>(&self, read: impl FnOnce(&Workspace) -> T) -> T {
        self.workspace.with(read)
    }
}

pub fn provide_app_state(client: ApiClient) {
    provide_context(AppState {
        workspace: create_rw_signal(Workspace::default()),
    });
    provide_context(client);
}

pub fn use_app_state() -> AppState {
    expect_context::<AppState>()
}

pub fn use_api_client() -> ApiClient {
    expect_context::<ApiClient>()
}
