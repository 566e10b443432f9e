//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{build_http_state, seed_demo_account};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::Trace;
use crate::inbound::http::routes::{configure, route_not_found};
use crate::inbound::http::state::HttpState;

/// Upper bound for JSON request bodies; listing images may be inline data URIs.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the application: trace middleware, `/api/v1` tree and the
/// JSON 404 fallback.
pub fn build_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let tokens = state.tokens.clone();
    App::new()
        .app_data(state)
        .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .wrap(Trace)
        .configure(|cfg| configure(cfg, &tokens))
        .default_service(web::to(route_not_found))
}

/// Construct an Actix HTTP server from validated configuration.
///
/// The demo account, when configured, is seeded before the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when seeding, binding the socket or starting
/// the server fails.
pub async fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let state = build_http_state(&config);
    if let Some(demo) = &config.demo {
        seed_demo_account(state.users.as_ref(), demo)
            .await
            .map_err(|err| std::io::Error::other(format!("demo account seeding failed: {err}")))?;
    }
    let state = web::Data::new(state);
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || build_app(state.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "listening");
    Ok(server)
}
