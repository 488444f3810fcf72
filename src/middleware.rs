use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{
    error::{ErrorMessage, HttpError},
    models::accountmodel::{PartyRole, Principal},
    service::error::ServiceError,
    AppState,
};

pub const SESSION_COOKIE: &str = "token";

/// Request-scoped identity inserted by [`auth`].
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    pub principal: Principal,
}

impl SessionContext {
    pub fn require_worker(&self) -> Result<Uuid, HttpError> {
        self.principal
            .worker_id()
            .ok_or_else(|| ServiceError::RoleRequired(PartyRole::Worker).into())
    }

    pub fn require_client(&self) -> Result<Uuid, HttpError> {
        self.principal
            .client_id()
            .ok_or_else(|| ServiceError::RoleRequired(PartyRole::Client).into())
    }
}

/// Session cookie first, then `Authorization: Bearer`.
pub fn session_token(cookie_jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    cookie_jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_owned())
                .filter(|token| !token.is_empty())
        })
}

pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = session_token(&cookie_jar, req.headers())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let principal = app_state
        .auth_service
        .resolve_session(&token)
        .await
        .map_err(|e| match e {
            ServiceError::Unauthenticated => {
                HttpError::unauthorized(ErrorMessage::InvalidToken.to_string())
            }
            other => HttpError::from(other),
        })?;

    req.extensions_mut().insert(SessionContext { principal });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn cookie_wins_over_bearer_header() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(session_token(&jar, &headers).as_deref(), Some("from-cookie"));
        assert_eq!(session_token(&CookieJar::new(), &headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn missing_or_malformed_carriers_yield_nothing() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&CookieJar::new(), &headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(session_token(&CookieJar::new(), &headers).is_none());

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));
        assert!(session_token(&jar, &HeaderMap::new()).is_none());
    }

    #[test]
    fn role_guards() {
        let worker_id = Uuid::new_v4();
        let ctx = SessionContext {
            principal: Principal::Worker(worker_id),
        };

        assert_eq!(ctx.require_worker().unwrap(), worker_id);
        let err = ctx.require_client().unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.message, "Only client accounts can perform this action");
    }
}
