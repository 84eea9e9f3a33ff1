use lambda_http::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
        StatusCode,
    },
    Body, Error, Response,
};
use serde_json::Value;

use crate::todo::{normalize_timestamp, CREATED_AT};

/// Wraps a JSON body in the response every route returns: CORS open to any
/// origin, JSON content type, and `createdAt` rendered as millisecond UTC.
pub(crate) fn response(status: StatusCode, mut body: Value) -> Result<Response<Body>, Error> {
    if let Value::Array(items) = &mut body {
        items.iter_mut().for_each(normalize_created_at);
    } else {
        normalize_created_at(&mut body);
    }

    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE, OPTIONS")
        .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
        .body(Body::Text(serde_json::to_string(&body)?))?)
}

// best effort: anything unparseable goes out as stored
fn normalize_created_at(value: &mut Value) {
    let Some(created_at) = value.get_mut(CREATED_AT) else {
        return;
    };
    if let Some(normalized) = created_at.as_str().and_then(normalize_timestamp) {
        *created_at = Value::String(normalized);
    }
}
