use lambda_http::{http::StatusCode, Body, Error, Request, RequestExt, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::response::response;
use crate::store::{ItemStore, StoreError};
use crate::todo::{CreateTodo, TodoItem, UpdateTodo, CREATED_AT};

type Reply = (StatusCode, Value);

/// Why an operation did not produce its success reply.
#[derive(Debug, Error)]
pub(crate) enum TodoError {
    #[error("Todo item not found")]
    NotFound,

    #[error("No updatable fields provided")]
    NoUpdatableFields,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed or incomplete request bodies.
    #[error("{0}")]
    Unclassified(String),
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unclassified(err.to_string())
    }
}

impl TodoError {
    fn into_reply(self) -> Reply {
        if matches!(self, TodoError::NotFound | TodoError::NoUpdatableFields) {
            tracing::debug!(reason = %self, "todo request rejected");
        }
        match self {
            TodoError::NotFound => (StatusCode::NOT_FOUND, json!({ "message": self.to_string() })),
            TodoError::NoUpdatableFields => {
                (StatusCode::BAD_REQUEST, json!({ "message": self.to_string() }))
            }
            TodoError::Store(_) | TodoError::Unclassified(_) => {
                tracing::error!(error = %self, "todo request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string() }),
                )
            }
        }
    }
}

/// What a request path names, independent of the method.
#[derive(Debug, PartialEq)]
enum Target<'a> {
    /// `/todos`
    Collection,
    /// `/todos/{id}`
    Item(&'a str),
}

/// Matches `/todos` and `/todos/{id}` on whole segments, allowing a stage
/// prefix such as `/Prod`. A mapped `id` path parameter wins over the raw
/// segment.
fn target<'a>(path: &'a str, path_id: Option<&'a str>) -> Option<Target<'a>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., "todos"] => Some(Target::Collection),
        [.., "todos", id] => Some(Target::Item(path_id.unwrap_or(*id))),
        _ => None,
    }
}

#[derive(Debug, PartialEq)]
enum Route<'a> {
    List,
    Create,
    Update(&'a str),
    Delete(&'a str),
}

fn route<'a>(method: &str, target: Target<'a>) -> Option<Route<'a>> {
    match (method, target) {
        ("GET", Target::Collection) => Some(Route::List),
        ("POST", Target::Collection) => Some(Route::Create),
        ("PUT", Target::Item(id)) => Some(Route::Update(id)),
        ("DELETE", Target::Item(id)) => Some(Route::Delete(id)),
        _ => None,
    }
}

fn parse_body<T: DeserializeOwned>(body: &Body) -> Result<T, TodoError> {
    let raw: &[u8] = body.as_ref();
    if raw.is_empty() {
        return Err(TodoError::Unclassified(
            "request body is required".to_string(),
        ));
    }
    Ok(serde_json::from_slice(raw)?)
}

#[tracing::instrument(skip_all)]
async fn list_todos(store: &dyn ItemStore) -> Result<Reply, TodoError> {
    let items = store.scan_all().await?;
    tracing::info!(count = items.len(), "listed todo items");

    Ok((
        StatusCode::OK,
        Value::Array(items.into_iter().map(Value::Object).collect()),
    ))
}

#[tracing::instrument(skip_all)]
async fn create_todo(store: &dyn ItemStore, input: CreateTodo) -> Result<Reply, TodoError> {
    let todo = TodoItem::new(input.text);
    let record = todo.to_record()?;

    store.put_item(record.clone()).await?;
    tracing::info!(id = %todo.id, "created todo item");

    // reply with the item as built, not the store's acknowledgement
    Ok((StatusCode::CREATED, Value::Object(record)))
}

#[tracing::instrument(skip(store, input))]
async fn update_todo(
    store: &dyn ItemStore,
    todo_id: &str,
    input: UpdateTodo,
) -> Result<Reply, TodoError> {
    // checked first so an update never creates the item
    let existing = store.get_item(todo_id).await?.ok_or(TodoError::NotFound)?;

    let changes = input.changes();
    if changes.is_empty() {
        return Err(TodoError::NoUpdatableFields);
    }
    let fields: Vec<&str> = changes.keys().map(String::as_str).collect();
    tracing::debug!(?fields, "applying partial update");

    let mut updated = store.update_item(todo_id, changes).await?;
    if let Some(created_at) = existing.get(CREATED_AT) {
        updated.insert(CREATED_AT.to_string(), created_at.clone());
    }
    tracing::info!("updated todo item");

    Ok((StatusCode::OK, Value::Object(updated)))
}

#[tracing::instrument(skip(store))]
async fn delete_todo(store: &dyn ItemStore, todo_id: &str) -> Result<Reply, TodoError> {
    if store.get_item(todo_id).await?.is_none() {
        return Err(TodoError::NotFound);
    }

    store.delete_item(todo_id).await?;
    tracing::info!("deleted todo item");

    Ok((
        StatusCode::OK,
        json!({ "message": "Todo item deleted successfully" }),
    ))
}

async fn dispatch(store: &dyn ItemStore, route: Route<'_>, body: &Body) -> Result<Reply, TodoError> {
    match route {
        Route::List => list_todos(store).await,
        Route::Create => create_todo(store, parse_body(body)?).await,
        Route::Update(id) => update_todo(store, id, parse_body(body)?).await,
        Route::Delete(id) => delete_todo(store, id).await,
    }
}

pub(crate) async fn function_handler(
    store: &dyn ItemStore,
    event: Request,
) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();
    let params = event.path_parameters();
    let path_id = params.first("id").filter(|id| !id.is_empty());

    let (status, body) = match target(path, path_id).and_then(|target| route(method, target)) {
        Some(route) => dispatch(store, route, event.body())
            .await
            .unwrap_or_else(TodoError::into_reply),
        None => {
            tracing::debug!(method, path, "no route");
            (StatusCode::NOT_FOUND, json!({ "message": "Invalid request" }))
        }
    };

    response(status, body)
}
