use crate::errors::ServerError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};

pub type ResultResp = Result<Response, ServerError>;

fn public_message(err: &ServerError) -> String {
    match err {
        ServerError::NotFound => "Not Found".to_string(),
        ServerError::InternalError => "Internal Server Error".to_string(),
        other => other.to_string(),
    }
}

/// Render a ServerError as an HTML error page
pub fn html_error_response(err: &ServerError) -> Response {
    let status = err.status();
    let html = error_page(status, &public_message(err)).into_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(html.clone()))
        .unwrap_or_else(|_| Response::new(Body::from(html)))
}

/// Render a ServerError as `{"error": ...}` for API callers
pub fn json_error_response(err: &ServerError, cors_origin: &str) -> Response {
    let status = err.status();
    let body = serde_json::json!({ "error": public_message(err) }).to_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", cors_origin)
        .body(Body::from(body.clone()))
        .unwrap_or_else(|_| Response::new(Body::from(body)))
}
