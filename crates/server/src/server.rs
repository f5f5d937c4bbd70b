use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{
    deletes, imports, lookups, movements,
    session::{self, SessionStore},
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub sessions: SessionStore,
}

async fn auth(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(bearer)) = bearer else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let Some(session) = state.sessions.get(bearer.token()) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Builds the application router; login is the only route outside the
/// bearer-token middleware.
pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route(
            "/session",
            get(session::current_user).delete(session::logout),
        )
        .route("/lookups", get(lookups::get))
        .route(
            "/movements/{kind}",
            post(movements::create).get(movements::report),
        )
        .route("/movements/{kind}/export", get(movements::export))
        .route("/movements/{kind}/import", post(imports::import))
        .route("/movements/{kind}/delete", post(deletes::stage))
        .route("/movements/{kind}/delete/confirm", post(deletes::confirm))
        .route("/movements/{kind}/delete/cancel", post(deletes::cancel))
        .route(
            "/movements/{kind}/{id}",
            get(movements::find).patch(movements::update),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/session", post(session::login))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        sessions: SessionStore::default(),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
