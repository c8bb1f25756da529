pub mod health;
pub mod webhooks;

#[tracing::instrument(level = "debug", skip_all)]
pub fn router() -> axum::Router {
    axum::Router::new().merge(webhooks::router())
}
