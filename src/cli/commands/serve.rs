//! Web host: serves the page over HTTP, one session per visitor.

use crate::agent::{AgentFactory, ArxivAgentFactory};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::page::{render_page, HtmlPage, PageContext, API_KEY_FIELD};
use crate::session::{QueryHandler, SessionStore};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    sessions: SessionStore,
    factory: Arc<dyn AgentFactory>,
    handler: QueryHandler,
    settings: Settings,
}

/// Run the web server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
    let factory = Arc::new(ArxivAgentFactory::new(settings.clone(), prompts.clone())?);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let session_ttl = settings.server.session_ttl();
    let state = Arc::new(AppState {
        sessions: SessionStore::with_idle_ttl(session_ttl),
        factory,
        handler: QueryHandler::new(prompts),
        settings,
    });

    if let Some(ttl) = session_ttl {
        spawn_reaper(state.clone(), ttl);
    }

    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("ArXiv QA Bot");
    println!();
    Output::success(&format!("Open http://{} in your browser", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Page", "GET  /");
    Output::kv("Session", "GET  /session/{id}, POST /session/{id}");
    Output::kv("Transcript", "GET  /session/{id}/transcript");
    Output::kv("End session", "POST /session/{id}/end");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drop idle sessions so abandoned credentials do not linger.
fn spawn_reaper(state: Arc<AppState>, ttl: Duration) {
    let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.sessions.reap_expired().await;
        }
    });
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(new_session))
        .route("/health", get(health))
        .route("/session/{id}", get(show_session).post(submit_session))
        .route("/session/{id}/transcript", get(download_transcript))
        .route("/session/{id}/end", post(end_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.len().await,
    }))
}

async fn new_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let id = state.sessions.create().await;
    Redirect::to(&format!("/session/{}", id))
}

async fn show_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    render_session(&state, id, HashMap::new()).await
}

async fn submit_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Form(values): Form<HashMap<String, String>>,
) -> Response {
    render_session(&state, id, values).await
}

async fn download_transcript(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let session = match state.sessions.get(&id).await {
        Ok(session) => session,
        Err(e) => return (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    };

    let session = session.lock().await;
    match session.transcript().export() {
        Some(download) => (
            [
                (header::CONTENT_TYPE, format!("{}; charset=utf-8", download.mime)),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", download.file_name),
                ),
            ],
            download.content,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Transcript is empty").into_response(),
    }
}

async fn end_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    if state.sessions.end(&id).await {
        Redirect::to("/").into_response()
    } else {
        (StatusCode::NOT_FOUND, format!("Session not found: {}", id)).into_response()
    }
}

/// Run one render cycle for a session and turn it into an HTML response.
async fn render_session(state: &AppState, id: Uuid, mut values: HashMap<String, String>) -> Response {
    let session = match state.sessions.get(&id).await {
        Ok(session) => session,
        Err(e) => return (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    };
    let mut session = session.lock().await;

    // A blank credential field keeps the one already entered in this session.
    let submitted = values
        .get(API_KEY_FIELD.key)
        .is_some_and(|v| !v.is_empty());
    if !submitted {
        if let Some(credential) = session.credential() {
            values.insert(API_KEY_FIELD.key.to_string(), credential.expose().to_string());
        }
    }
    let credential_saved = submitted || session.credential().is_some();

    let mut page = HtmlPage::new(id, values, credential_saved);
    let ctx = PageContext {
        factory: state.factory.as_ref(),
        handler: &state.handler,
    };

    match render_page(&mut page, &mut session, &ctx).await {
        Ok(_) => Html(page.finish()).into_response(),
        Err(e) => {
            error!("Session {} render failed: {}", id, e);
            page.render_error(&e.to_string());
            (StatusCode::BAD_GATEWAY, Html(page.finish())).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::CountingFactory;

    fn state(factory: CountingFactory) -> Arc<AppState> {
        Arc::new(AppState {
            sessions: SessionStore::new(),
            factory: Arc::new(factory),
            handler: QueryHandler::default(),
            settings: Settings::default(),
        })
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form(pairs: &[(&str, &str)]) -> Form<HashMap<String, String>> {
        Form(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let state = state(CountingFactory::default());
        let response = show_session(State(state), Path(Uuid::new_v4())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_page_without_credential_stops_at_key_field() {
        let state = state(CountingFactory::answering(&["unused"]));
        let id = state.sessions.create().await;

        let response = submit_session(
            State(state.clone()),
            Path(id),
            form(&[("api_key", ""), ("query", "What is attention?")]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("name=\"api_key\""));
        assert!(!html.contains("name=\"query\""));
    }

    #[tokio::test]
    async fn test_round_trip_then_download() {
        let state = state(CountingFactory::answering(&["Attention is..."]));
        let id = state.sessions.create().await;

        let response = submit_session(
            State(state.clone()),
            Path(id),
            form(&[("api_key", "sk-secret"), ("query", "What is attention?")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Attention is..."));
        assert!(html.contains("/transcript"));
        assert!(!html.contains("sk-secret"));

        let download = download_transcript(State(state.clone()), Path(id)).await;
        assert_eq!(download.status(), StatusCode::OK);
        assert_eq!(
            download.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"arxiv-qa-transcript.txt\""
        );
        assert_eq!(
            body_text(download).await,
            "Query: What is attention?\nResponse: Attention is...\n\n"
        );
    }

    #[tokio::test]
    async fn test_credential_remembered_between_cycles() {
        let factory = CountingFactory::answering(&["R1", "R2"]);
        let state = state(factory);
        let id = state.sessions.create().await;

        submit_session(
            State(state.clone()),
            Path(id),
            form(&[("api_key", "sk-secret"), ("query", "Q1")]),
        )
        .await;
        let response = submit_session(
            State(state.clone()),
            Path(id),
            form(&[("api_key", ""), ("query", "Q2")]),
        )
        .await;

        assert!(body_text(response).await.contains("R2"));
        let session = state.sessions.get(&id).await.unwrap();
        assert_eq!(session.lock().await.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_transcript_has_no_download() {
        let state = state(CountingFactory::default());
        let id = state.sessions.create().await;

        let response = download_transcript(State(state), Path(id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_round_trip_is_bad_gateway() {
        struct FailingFactory;
        impl AgentFactory for FailingFactory {
            fn create(
                &self,
                _credential: &crate::credential::Credential,
            ) -> crate::error::Result<Arc<dyn crate::agent::QueryAgent>> {
                Ok(Arc::new(crate::session::ScriptedAgent::failing()))
            }
        }

        let state = Arc::new(AppState {
            sessions: SessionStore::new(),
            factory: Arc::new(FailingFactory),
            handler: QueryHandler::default(),
            settings: Settings::default(),
        });
        let id = state.sessions.create().await;

        let response = submit_session(
            State(state.clone()),
            Path(id),
            form(&[("api_key", "sk-bad"), ("query", "Q1")]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("Something went wrong"));
        let session = state.sessions.get(&id).await.unwrap();
        assert!(session.lock().await.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_end_session_drops_state() {
        let state = state(CountingFactory::default());
        let id = state.sessions.create().await;

        let response = end_session(State(state.clone()), Path(id)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_abandoned_sessions_are_reclaimed() {
        let state = Arc::new(AppState {
            sessions: SessionStore::with_idle_ttl(Some(Duration::from_millis(20))),
            factory: Arc::new(CountingFactory::default()),
            handler: QueryHandler::default(),
            settings: Settings::default(),
        });

        for _ in 0..100 {
            let _ = new_session(State(state.clone())).await;
        }
        assert_eq!(state.sessions.len().await, 100);

        tokio::time::sleep(Duration::from_millis(60)).await;
        let _ = new_session(State(state.clone())).await;
        assert_eq!(state.sessions.len().await, 1);
    }

    #[test]
    fn test_router_builds() {
        let _ = router(state(CountingFactory::default()));
    }
}
