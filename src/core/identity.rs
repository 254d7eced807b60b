//! Identity - Identità verificata della richiesta
//!
//! L'autenticazione vera e propria (sessioni, token, credenziali) vive nel
//! perimetro esterno dell'applicazione: quando una richiesta arriva qui,
//! l'identità numerica è già stata verificata ed è esposta nell'header
//! `x-user-id`. Questo middleware la estrae e la rende disponibile come
//! `Extension<Identity>` a route HTTP e upgrade WebSocket.

use crate::core::AppError;
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use tracing::warn;

/// Header popolato dal layer di autenticazione a monte.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Identità numerica verificata dell'utente connesso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub i32);

fn parse_identity(headers: &HeaderMap) -> Option<Identity> {
    headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .parse::<i32>()
        .ok()
        .map(Identity)
}

/// Middleware di identità: header assente o non parsabile => 401.
///
/// Il tentativo di connessione viene rifiutato qui, prima dell'upgrade
/// WebSocket o dell'handler REST.
pub async fn identity_middleware(mut req: Request, next: Next) -> Result<Response, AppError> {
    let identity = parse_identity(req.headers()).ok_or_else(|| {
        warn!("Request without a verifiable identity");
        AppError::unauthorized("Missing or invalid user identity")
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_numeric_identity() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("42"));
        assert_eq!(parse_identity(&headers), Some(Identity(42)));
    }

    #[test]
    fn rejects_missing_or_garbage_identity() {
        assert_eq!(parse_identity(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-number"));
        assert_eq!(parse_identity(&headers), None);
    }
}
