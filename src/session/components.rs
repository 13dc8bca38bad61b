use leptos::ev::{MouseEvent, SubmitEvent};
use leptos::{
    component, create_signal, event_target_value, spawn_local, view, IntoView, Show, SignalGet,
    SignalGetUntracked, SignalSet,
};
use tracing::{error, warn};

use crate::components::{ErrorAlert, SuccessAlert};
use crate::error::TRY_AGAIN;
use crate::state::{use_api_client, use_app_state, Workspace};

use super::{credentials, registration, AuthMode};

#[component]
pub fn AuthForm() -> impl IntoView {
    let state = use_app_state();
    let client = use_api_client();

    let (mode, set_mode) = create_signal(AuthMode::SignIn);
    let (username, set_username) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (error_message, set_error_message) = create_signal::<Option<String>>(None);
    let (success_message, set_success_message) = create_signal::<Option<String>>(None);
    let (is_loading, set_loading) = create_signal(false);

    let handle_submit = move |evt: SubmitEvent| {
        evt.prevent_default();

        if is_loading.get_untracked() {
            return;
        }

        set_error_message.set(None);
        set_success_message.set(None);

        let client = client.clone();
        let username = username.get_untracked();
        let password = password.get_untracked();

        match mode.get_untracked() {
            AuthMode::SignIn => {
                let credentials = match credentials(&username, &password) {
                    Ok(credentials) => credentials,
                    Err(err) => {
                        set_error_message.set(Some(err.to_string()));
                        return;
                    }
                };

                set_loading.set(true);
                spawn_local(async move {
                    let result = client.login(&credentials).await;
                    set_loading.set(false);

                    match result {
                        Ok(identity) => {
                            set_success_message.set(Some("Login successful!".to_string()));
                            state.update(|workspace| workspace.login_succeeded(identity));
                        }
                        Err(err) => {
                            warn!("login failed: {err}");
                            set_error_message.set(Some(err.user_message(TRY_AGAIN)));
                        }
                    }
                });
            }
            AuthMode::Register => {
                let registration = match registration(&username, &password, &email.get_untracked()) {
                    Ok(registration) => registration,
                    Err(err) => {
                        set_error_message.set(Some(err.to_string()));
                        return;
                    }
                };

                set_loading.set(true);
                spawn_local(async move {
                    let result = client.register(&registration).await;
                    set_loading.set(false);

                    match result {
                        Ok(()) => {
                            set_success_message
                                .set(Some("Registration successful! Please login.".to_string()));
                            set_mode.set(AuthMode::SignIn);
                            set_password.set(String::new());
                        }
                        Err(err) => {
                            error!("registration failed: {err}");
                            set_error_message.set(Some(err.user_message(TRY_AGAIN)));
                        }
                    }
                });
            }
        }
    };

    let handle_toggle = move |_evt: MouseEvent| {
        set_mode.set(mode.get_untracked().toggled());
        set_error_message.set(None);
        set_success_message.set(None);
    };

    let is_sign_in = move || mode.get() == AuthMode::SignIn;

    view! {
        <article class="auth-card">
            <header class="auth-header">
                <div class="auth-icon">{move || if is_sign_in() { "🔐" } else { "✨" }}</div>
                <h2>{move || if is_sign_in() { "Sign In" } else { "Create Account" }}</h2>
                <p>
                    {move || {
                        if is_sign_in() {
                            "Welcome back! Sign in to access your equipment data."
                        } else {
                            "Join us to start analyzing your equipment parameters."
                        }
                    }}
                </p>
            </header>

            {move || error_message.get().map(|message| view! { <ErrorAlert message /> })}
            {move || success_message.get().map(|message| view! { <SuccessAlert message /> })}

            <form on:submit=handle_submit>
                <label for="username">"Username"</label>
                <input
                    id="username"
                    type="text"
                    placeholder="Enter your username"
                    required
                    prop:value=username
                    on:input=move |evt| set_username.set(event_target_value(&evt))
                />

                <Show when=move || !is_sign_in()>
                    <label for="email">"Email (Optional)"</label>
                    <input
                        id="email"
                        type="email"
                        placeholder="Enter your email"
                        prop:value=email
                        on:input=move |evt| set_email.set(event_target_value(&evt))
                    />
                </Show>

                <label for="password">"Password"</label>
                <input
                    id="password"
                    type="password"
                    placeholder="Enter your password"
                    required
                    prop:value=password
                    on:input=move |evt| set_password.set(event_target_value(&evt))
                />

                <button type="submit" disabled=move || is_loading.get() aria-busy=move || is_loading.get().to_string()>
                    {move || match (is_loading.get(), is_sign_in()) {
                        (true, _) => "Processing...",
                        (false, true) => "Sign In",
                        (false, false) => "Create Account",
                    }}
                </button>
            </form>

            <footer class="auth-footer">
                {move || if is_sign_in() { "Don't have an account? " } else { "Already have an account? " }}
                <button type="button" class="link" on:click=handle_toggle>
                    {move || if is_sign_in() { "Sign Up" } else { "Sign In" }}
                </button>
            </footer>
        </article>
    }
}

/// Signed in user and logout button, or a sign in prompt.
#[component]
pub fn UserBadge() -> impl IntoView {
    let state = use_app_state();
    let client = use_api_client();

    let handle_logout = move |_evt: MouseEvent| {
        let client = client.clone();
        spawn_local(async move {
            // The local session ends whatever the backend answers
            if let Err(err) = client.logout().await {
                warn!("logout request failed: {err}");
            }
            state.update(Workspace::logged_out);
        });
    };

    let username = move || {
        state.with(|workspace| {
            workspace
                .session
                .identity()
                .map(|identity| identity.username.clone())
        })
    };

    move || match username() {
        Some(username) => view! {
            <div class="user-section">
                <span class="user-info">"👤 " <span class="username">{username}</span></span>
                <button class="btn btn-secondary" on:click=handle_logout.clone()>
                    "Logout"
                </button>
            </div>
        }
        .into_view(),
        None => view! {
            <div class="auth-prompt">
                <span class="auth-text">"Sign in for full access"</span>
            </div>
        }
        .into_view(),
    }
}
