use crate::api::routes;
use crate::config::SharedConfig;
use crate::explore::SharedExplorer;
use axum::Router;
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub explorer: SharedExplorer,
}

/// The API's routes, serving explorations with `explorer`.
#[must_use]
pub fn router(explorer: SharedExplorer) -> Router {
    let config = explorer.config().clone();
    routes::new(AppState { config, explorer })
}

pub fn new(explorer: SharedExplorer) -> impl Future<Output = hyper::Result<()>> {
    let bind_addr = explorer.config().api_bind_addr;
    axum::Server::bind(&bind_addr).serve(router(explorer).into_make_service())
}
