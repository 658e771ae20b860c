//! WebSocket inbound adapter for live notifications.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list, bearer token)
//! - join the socket to its user's room in the [`hub::ConnectionHub`]
//! - run the per-connection session loop

use actix_web::http::header::{HeaderMap, ORIGIN};
use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::{error, info};

use crate::domain::Error;
use crate::inbound::http::auth::bearer_token;

mod session;

pub mod hub;
pub mod messages;
pub mod origin;
pub mod state;

/// Token from `?token=` or, failing that, the `Authorization` header.
fn socket_token(query: &str, headers: &HeaderMap) -> Result<String, Error> {
    let from_query = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.trim().to_owned());
    match from_query {
        Some(token) if token.is_empty() => Err(Error::unauthorized("Invalid token.")),
        Some(token) => Ok(token),
        None => bearer_token(headers)?.ok_or_else(|| Error::unauthorized("Authentication required.")),
    }
}

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }
    state.origins.validate(origin_header)?;

    let token = socket_token(req.query_string(), req.headers())?;
    let actor = state.accounts.authenticate(&token).await?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;
    info!(user_id = %actor.id, "notification socket opened");

    actix_web::rt::spawn(session::handle_ws_session(
        state.get_ref().clone(),
        actor,
        session,
        messages,
    ));

    Ok(response)
}
