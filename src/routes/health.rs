use axum::http::StatusCode;

/// Liveness probe
///
/// Returns 200 OK while the process is serving HTTP. The store is not consulted.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is alive"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
