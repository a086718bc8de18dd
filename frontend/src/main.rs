use gloo_net::http::Request;
use serde::Deserialize;
use wasm_bindgen_futures::spawn_local;
use web_sys::RequestCredentials;
use yew::prelude::*;

/// Current user as returned by `/auth/me`
#[derive(Clone, PartialEq, Debug, Deserialize)]
struct User {
    id: String,
    email: String,
    name: Option<String>,
    #[serde(rename = "avatarUrl")]
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct MeResponse {
    user: User,
}

fn api_url() -> &'static str {
    option_env!("API_URL").unwrap_or("http://localhost:8080")
}

/// Resolve the session cookie against the API.
///
/// The cookie is HttpOnly, so presence of a session can only be established
/// by asking the server; any failure simply means "no user".
async fn fetch_current_user() -> Option<User> {
    let response = Request::get(&format!("{}/auth/me", api_url()))
        .credentials(RequestCredentials::Include)
        .send()
        .await
        .ok()?;

    if !response.ok() {
        return None;
    }

    response.json::<MeResponse>().await.ok().map(|r| r.user)
}

#[function_component(App)]
fn app() -> Html {
    let user = use_state(|| None::<User>);
    let loading = use_state(|| true);

    // Session bootstrap on first render
    {
        let user = user.clone();
        let loading = loading.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                user.set(fetch_current_user().await);
                loading.set(false);
            });
            || ()
        });
    }

    // Full-page navigation: the flow has to leave the app to reach Google
    let sign_in = Callback::from(|_| {
        if let Some(window) = web_sys::window() {
            let _ = window
                .location()
                .set_href(&format!("{}/auth/google", api_url()));
        }
    });

    let sign_out = {
        let user = user.clone();
        Callback::from(move |_| {
            let user = user.clone();
            spawn_local(async move {
                // Local state is cleared regardless of whether the server
                // call succeeds
                let _ = Request::post(&format!("{}/auth/logout", api_url()))
                    .credentials(RequestCredentials::Include)
                    .send()
                    .await;
                user.set(None);
            });
        })
    };

    html! {
        <div class="app">
            <header>
                <h1>{"Web App Boilerplate"}</h1>
            </header>
            <main>
                {if *loading {
                    html! { <p class="loading">{"Loading..."}</p> }
                } else {
                    match &*user {
                        Some(u) => html! {
                            <div class="profile-card">
                                {if let Some(avatar) = &u.avatar_url {
                                    html! { <img class="avatar" src={avatar.clone()} alt="avatar" /> }
                                } else {
                                    html! {}
                                }}
                                <h2>{u.name.clone().unwrap_or_else(|| u.email.clone())}</h2>
                                <p class="email">{u.email.clone()}</p>
                                <button class="btn" onclick={sign_out}>
                                    {"Sign out"}
                                </button>
                            </div>
                        },
                        None => html! {
                            <div class="signin-card">
                                <p>{"Sign in to continue"}</p>
                                <button class="btn btn-primary" onclick={sign_in}>
                                    {"Sign in with Google"}
                                </button>
                            </div>
                        },
                    }
                }}
            </main>
        </div>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
