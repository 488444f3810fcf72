use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar},
    WithRejection,
};
use validator::Validate;

use crate::{
    dtos::userdtos::*,
    error::{ErrorMessage, HttpError},
    middleware::{auth, session_token, SessionContext, SESSION_COOKIE},
    service::auth_service::IssuedSession,
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/signup/worker", post(signup_worker))
        .route("/signup/client", post(signup_client))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me).layer(middleware::from_fn(auth)))
}

fn session_cookie(token: String, max_age_minutes: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .max_age(time::Duration::minutes(max_age_minutes))
        .http_only(true)
        .secure(secure)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .build()
}

fn set_cookie_headers(cookie: Cookie<'static>) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error(ErrorMessage::ServerError.to_string()))?,
    );
    Ok(headers)
}

fn session_response(
    app_state: &AppState,
    issued: IssuedSession,
) -> Result<impl IntoResponse, HttpError> {
    let cookie = session_cookie(issued.token, app_state.env.jwt_maxage, app_state.env.cookie_secure);
    let headers = set_cookie_headers(cookie)?;

    Ok((StatusCode::OK, headers, Json(issued.identity)))
}

pub async fn signup_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterWorkerDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let issued = app_state.auth_service.register_worker(body).await?;

    session_response(&app_state, issued)
}

pub async fn signup_client(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterClientDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let issued = app_state.auth_service.register_client(body).await?;

    session_response(&app_state, issued)
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<LoginUserDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let issued = app_state.auth_service.login(body).await?;

    session_response(&app_state, issued)
}

pub async fn logout(
    Extension(app_state): Extension<Arc<AppState>>,
    cookie_jar: CookieJar,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let token = session_token(&cookie_jar, &headers);

    app_state
        .auth_service
        .logout(token.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("logout failed: {}", e);
            HttpError::server_error(ErrorMessage::LogoutFailed.to_string())
        })?;

    let cookie = session_cookie(String::new(), 0, app_state.env.cookie_secure);
    let headers = set_cookie_headers(cookie)?;

    let response = Json(Response {
        status: "success",
        message: "Logged out successfully".to_string(),
    });

    Ok((StatusCode::OK, headers, response))
}

pub async fn me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let identity = app_state
        .auth_service
        .current_identity(session.principal)
        .await?;

    Ok(Json(identity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_scoped_to_root() {
        let cookie = session_cookie("abc".to_string(), 60, true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::minutes(60)));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cookie = session_cookie(String::new(), 0, false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));

        let headers = set_cookie_headers(cookie).unwrap();
        let value = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with("token=;"));
        assert!(value.contains("Max-Age=0"));
    }
}
