use axum::http::StatusCode;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Empty 200 at `/` for probes that only check the server is up.
pub async fn root() -> StatusCode {
    StatusCode::OK
}
