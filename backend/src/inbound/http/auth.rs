//! Bearer-token extractors for HTTP handlers.
//!
//! Handlers take [`Authenticated`] (token required) or
//! [`MaybeAuthenticated`] (anonymous allowed) and receive the caller as a
//! domain [`Actor`]. Token verification is delegated to the
//! [`AccountQuery`](crate::domain::ports::AccountQuery) port.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Actor, Error};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Read the bearer token from an `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent and `401` when it is present
/// but not a bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, Error> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| Error::unauthorized("Invalid token."))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("Invalid token."))?;
    Ok(Some(token.to_owned()))
}

fn http_state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))
}

async fn resolve(state: web::Data<HttpState>, token: Option<String>) -> Result<Option<Actor>, Error> {
    match token {
        Some(token) => state
            .accounts_query
            .authenticate(&token)
            .await
            .map(Some),
        None => Ok(None),
    }
}

/// The authenticated caller. Rejects the request with `401` when no valid
/// token is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub Actor);

impl Authenticated {
    pub fn actor(&self) -> &Actor {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let prepared = http_state(req).and_then(|state| Ok((state, bearer_token(req.headers())?)));
        Box::pin(async move {
            let (state, token) = prepared?;
            let token = token.ok_or_else(|| Error::unauthorized("Authentication required."))?;
            let actor = resolve(state, Some(token))
                .await?
                .ok_or_else(|| Error::unauthorized("Authentication required."))?;
            Ok(Self(actor))
        })
    }
}

/// The caller when a token is supplied, otherwise anonymous.
///
/// A token that is present but invalid is still rejected with `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeAuthenticated(pub Option<Actor>);

impl FromRequest for MaybeAuthenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let prepared = http_state(req).and_then(|state| Ok((state, bearer_token(req.headers())?)));
        Box::pin(async move {
            let (state, token) = prepared?;
            Ok(Self(resolve(state, token).await?))
        })
    }
}
