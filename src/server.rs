use crate::agent::Agent;
use crate::protocol::{ChatEvent, ChatRequest, EMPTY_MESSAGE_REPLY, Trailer, ValidationReply};
use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};

// No auth, no rate limiting; any origin may call the endpoint.
pub fn router(agent: Arc<Agent>) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .route("/api/chat", post(chat))
        .layer(cors)
        .with_state(agent)
}

async fn chat(State(agent): State<Arc<Agent>>, Json(request): Json<ChatRequest>) -> Response {
    tracing::info!(
        message = %request.message,
        session_id = request.session_id.as_deref(),
        "chat request"
    );

    if request.message.trim().is_empty() {
        return Json(ValidationReply {
            response: EMPTY_MESSAGE_REPLY,
        })
        .into_response();
    }

    let session = match agent.resolve_session(request.session_id).await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(error = %err, "failed to resolve conversation session");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to open conversation session",
            )
                .into_response();
        }
    };

    let (events, receiver) = mpsc::channel::<ChatEvent>(64);
    let message = request.message;
    tokio::spawn(async move {
        let session_id = session.id().to_string();
        match agent.run_streamed(&session, &message, &events).await {
            Ok(final_output) => {
                tracing::info!(session_id = %session_id, response = %final_output, "chat response");
                let _ = events.send(ChatEvent::Done { session_id }).await;
            }
            Err(err) => {
                tracing::error!(session_id = %session_id, error = %err, "agent run failed");
                let _ = events
                    .send(ChatEvent::Error {
                        message: err.to_string(),
                    })
                    .await;
            }
        }
    });

    let body = Body::from_stream(
        ReceiverStream::new(receiver).map(|event| Ok::<_, Infallible>(event_bytes(event))),
    );

    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

fn event_bytes(event: ChatEvent) -> Bytes {
    match event {
        ChatEvent::Delta(text) => Bytes::from(text),
        ChatEvent::Done { session_id } => Bytes::from(Trailer::Done { session_id }.to_line()),
        ChatEvent::Error { message } => Bytes::from(Trailer::Error { message }.to_line()),
    }
}
