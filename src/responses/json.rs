// responses/json.rs
use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use serde::Serialize;

/// Serialize `value` as a 200 JSON response readable from `cors_origin`
pub fn json_response<T: Serialize + ?Sized>(value: &T, cors_origin: &str) -> ResultResp {
    let body = serde_json::to_string(value).map_err(|e| {
        log::error!("Failed to serialize response: {e}");
        ServerError::InternalError
    })?;

    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", cors_origin)
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}
