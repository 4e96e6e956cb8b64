//! HTTP JSON API served with warp.
//!
//! Each path accepts any method and dispatches on it, so a known path with an
//! unsupported method answers 405 rather than falling through to 404.

use crate::error::{Error, ErrorKind, Result};
use crate::service::{HabitService, NewTask, NoteInput, TaskPatch};
use crate::tasks::Action;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

type Query = HashMap<String, String>;

/// Body of `POST /api/tasks/actions`.
#[derive(Debug, Deserialize)]
struct ActionRequest {
    id: Option<i64>,
    action: Option<String>,
}

/// Body of a successful `POST /api/setup`.
#[derive(Debug, Serialize)]
struct SetupResponse {
    message: &'static str,
    seeded: usize,
}

/// Build the API routes.
pub fn routes(
    service: HabitService,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let with_service = warp::any().map(move || service.clone());
    let request = warp::method()
        .and(warp::query::<Query>())
        .and(warp::body::bytes())
        .and(with_service);

    let tasks = warp::path!("api" / "tasks").and(request.clone()).and_then(handle_tasks);
    let actions =
        warp::path!("api" / "tasks" / "actions").and(request.clone()).and_then(handle_actions);
    let notes = warp::path!("api" / "notes").and(request.clone()).and_then(handle_notes);
    let stats = warp::path!("api" / "stats").and(request.clone()).and_then(handle_stats);
    let setup = warp::path!("api" / "setup").and(request).and_then(handle_setup);

    tasks
        .or(actions)
        .or(notes)
        .or(stats)
        .or(setup)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

/// Serve the API on `addr` until the process exits.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn serve(service: HabitService, addr: SocketAddr) -> Result<()> {
    let (bound, server) = warp::serve(routes(service))
        .try_bind_ephemeral(addr)
        .map_err(|e| Error::Config(format!("cannot listen on {addr}: {e}")))?;
    tracing::info!(addr = %bound, "HTTP API listening");
    server.await;
    Ok(())
}

async fn handle_tasks(
    method: Method,
    query: Query,
    body: Bytes,
    service: HabitService,
) -> std::result::Result<Response, Infallible> {
    let result = match method {
        Method::GET => blocking(service, |s| s.list_tasks()).await.map(|t| ok(&t)),
        Method::POST => match parse_body::<NewTask>(&body) {
            Ok(input) => blocking(service, move |s| s.create_task(&input))
                .await
                .map(|task| reply(StatusCode::CREATED, &task)),
            Err(e) => Err(e),
        },
        Method::PUT => match parse_body::<TaskPatch>(&body) {
            Ok(patch) => blocking(service, move |s| s.update_task(&patch)).await.map(|t| ok(&t)),
            Err(e) => Err(e),
        },
        Method::DELETE => match query_id(&query) {
            Ok(id) => blocking(service, move |s| s.delete_task(id))
                .await
                .map(|()| ok(&json!({ "message": "Task deleted successfully" }))),
            Err(e) => Err(e),
        },
        _ => return Ok(method_not_allowed()),
    };
    Ok(result.unwrap_or_else(|e| error_response(&e)))
}

async fn handle_actions(
    method: Method,
    _query: Query,
    body: Bytes,
    service: HabitService,
) -> std::result::Result<Response, Infallible> {
    if method != Method::POST {
        return Ok(method_not_allowed());
    }
    let result = match parse_action(&body) {
        Ok((id, action)) => {
            blocking(service, move |s| s.apply_action(id, action)).await.map(|t| ok(&t))
        }
        Err(e) => Err(e),
    };
    Ok(result.unwrap_or_else(|e| error_response(&e)))
}

async fn handle_notes(
    method: Method,
    query: Query,
    body: Bytes,
    service: HabitService,
) -> std::result::Result<Response, Infallible> {
    let result = match method {
        Method::GET => {
            let date = query.get("date").cloned();
            blocking(service, move |s| s.get_note(date.as_deref())).await.map(|n| ok(&n))
        }
        Method::POST => match parse_body::<NoteInput>(&body) {
            Ok(input) => blocking(service, move |s| s.save_note(&input)).await.map(|n| ok(&n)),
            Err(e) => Err(e),
        },
        _ => return Ok(method_not_allowed()),
    };
    Ok(result.unwrap_or_else(|e| error_response(&e)))
}

async fn handle_stats(
    method: Method,
    _query: Query,
    _body: Bytes,
    service: HabitService,
) -> std::result::Result<Response, Infallible> {
    if method != Method::GET {
        return Ok(method_not_allowed());
    }
    let result = blocking(service, |s| s.stats()).await.map(|stats| ok(&stats));
    Ok(result.unwrap_or_else(|e| error_response(&e)))
}

async fn handle_setup(
    method: Method,
    _query: Query,
    _body: Bytes,
    service: HabitService,
) -> std::result::Result<Response, Infallible> {
    if method != Method::POST {
        return Ok(method_not_allowed());
    }
    let result = blocking(service, |s| s.setup()).await.map(|seeded| {
        ok(&SetupResponse { message: "Database setup complete", seeded })
    });
    Ok(result.unwrap_or_else(|e| error_response(&e)))
}

async fn handle_rejection(rejection: Rejection) -> std::result::Result<Response, Infallible> {
    if rejection.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not found"));
    }
    tracing::warn!(?rejection, "request rejected");
    Ok(error_reply(StatusCode::BAD_REQUEST, "Bad request"))
}

/// Run a service call on the blocking thread pool.
async fn blocking<T, F>(service: HabitService, f: F) -> Result<T>
where
    F: FnOnce(&HabitService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::invalid("Request body is required"));
    }
    serde_json::from_slice(body).map_err(|e| Error::invalid(format!("Invalid JSON body: {e}")))
}

fn parse_action(body: &[u8]) -> Result<(i64, Action)> {
    let request: ActionRequest = parse_body(body)?;
    let id = request.id.ok_or_else(|| Error::invalid("Task ID required"))?;
    let action = request.action.ok_or_else(|| Error::invalid("Action is required"))?;
    let action = Action::from_str(&action).map_err(|e| Error::invalid(e.to_string()))?;
    Ok((id, action))
}

fn query_id(query: &Query) -> Result<Option<i64>> {
    query
        .get("id")
        .map(|raw| raw.parse().map_err(|_| Error::invalid(format!("Invalid task ID '{raw}'"))))
        .transpose()
}

fn reply<T: Serialize>(status: StatusCode, value: &T) -> Response {
    warp::reply::with_status(warp::reply::json(value), status).into_response()
}

fn ok<T: Serialize>(value: &T) -> Response {
    reply(StatusCode::OK, value)
}

fn error_reply(status: StatusCode, message: &str) -> Response {
    reply(status, &json!({ "error": message }))
}

fn method_not_allowed() -> Response {
    error_reply(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn error_response(err: &Error) -> Response {
    match err.kind() {
        ErrorKind::InvalidInput => error_reply(StatusCode::BAD_REQUEST, &err.to_string()),
        ErrorKind::NotFound => error_reply(StatusCode::NOT_FOUND, &err.to_string()),
        ErrorKind::StoreFailure => {
            tracing::error!(error = %err, "request failed");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
