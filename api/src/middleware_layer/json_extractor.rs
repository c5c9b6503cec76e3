use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::core::http::response_envelope::ApiResponse;

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn hint_from_serde_msg(msg: &str) -> Option<String> {
    if msg.contains("missing field `query`") {
        Some("Send the user query as a string: { \"query\": \"...\" }.".into())
    } else if msg.contains("unknown variant") {
        Some("History roles are \"user\" or \"chatbot\".".into())
    } else if msg.contains("expected a sequence") {
        Some("`history` is an array of { \"role\": ..., \"text\": ... } objects.".into())
    } else if msg.contains("Content-Type") {
        Some("Set `Content-Type: application/json`.".into())
    } else {
        None
    }
}

/// Rewrites plain-text JSON extractor rejections (400/415/422) into the
/// [`ApiResponse`] error envelope. Responses that already are JSON pass through.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    let mapped = [
        StatusCode::BAD_REQUEST,
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        StatusCode::UNPROCESSABLE_ENTITY,
    ];
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !mapped.contains(&status) || is_json {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);

    let code = match status {
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        _ => "BAD_REQUEST",
    };
    let envelope = ApiResponse::error(code, original.trim(), hint_from_serde_msg(&original));

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}
