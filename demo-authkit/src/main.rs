mod handlers;
mod server;

use axum::{Router, middleware::from_fn_with_state, routing::get};
use dotenvy::dotenv;

use authkit_session_axum::{AuthKitConfig, AuthState, WorkosClient, authkit_router, require_session};

use handlers::{account, index};
use server::{init_tracing, port_from_env, spawn_http_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_authkit");

    let config = match AuthKitConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let client = WorkosClient::new(&config)?;
    let state = AuthState::new(client, config);

    let app = Router::new()
        .route(
            "/account",
            get(account).route_layer(from_fn_with_state(state.clone(), require_session)),
        )
        .route("/", get(index))
        .with_state(state.clone())
        .merge(authkit_router(state));

    let server = spawn_http_server(port_from_env(), app);
    server.await?;
    Ok(())
}
