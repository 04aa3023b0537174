use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, header::AUTHORIZATION},
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use axum_extra::headers::{Error as AxumError, Header, HeaderMapExt};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, entries, report, session};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the session token.
///
/// Clients send `Authorization: Bearer <token>`; older clients send the bare
/// token, which is accepted as well.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl Header for SessionToken {
    fn name() -> &'static HeaderName {
        &AUTHORIZATION
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };

        let value = value.trim();
        let token = match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
            Some(_) => return Err(AxumError::invalid()),
            // A scheme with nothing after it was trimmed down to the bare name.
            None if value.eq_ignore_ascii_case("bearer") => return Err(AxumError::invalid()),
            None => value,
        };
        if token.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(SessionToken(token.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&format!("Bearer {}", self.0)) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode authorization header"),
        }
    }
}

async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    // Missing and undecodable headers both count as no token.
    let Some(token) = request.headers().typed_get::<SessionToken>() else {
        return Err(EngineError::Unauthorized.into());
    };

    state.engine.verify_token(&token.0).await?;

    request.extensions_mut().insert(token);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/createEntry", post(entries::entry_new))
        .route("/getEntries", post(entries::entry_list))
        .route("/updateEntry", post(entries::entry_update))
        .route("/deleteEntry", post(entries::entry_delete))
        .route("/getMonthlyReport", post(report::monthly_report))
        .route("/logout", post(session::logout))
        .route("/clearTokens", post(session::clear_tokens))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await.inspect_err(|err| {
        tracing::error!("failed to bind server listener on {addr}: {err}");
    })?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
