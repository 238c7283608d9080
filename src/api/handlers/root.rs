use axum::response::IntoResponse;

// Undocumented banner route; load balancers and humans hit this to see what runs here.
pub async fn root() -> impl IntoResponse {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}
