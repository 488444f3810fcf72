// service/auth_service.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    db::{
        accountdb::{AccountExt, NewClient, NewWorker},
        db::DBClient,
        is_unique_violation,
    },
    dtos::userdtos::*,
    models::accountmodel::{PartyRole, Principal},
    service::error::ServiceError,
    utils::{password, token},
};

/// A freshly issued session: the signed cookie value and who it is for.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub identity: IdentityResponseDto,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    db_client: Arc<DBClient>,
    jwt_secret: String,
    jwt_maxage: i64,
}

impl AuthService {
    pub fn new(db_client: Arc<DBClient>, jwt_secret: String, jwt_maxage: i64) -> Self {
        Self {
            db_client,
            jwt_secret,
            jwt_maxage,
        }
    }

    async fn issue_session(
        &self,
        principal: Principal,
        identity: IdentityResponseDto,
    ) -> Result<IssuedSession, ServiceError> {
        let expires_at = Utc::now() + Duration::minutes(self.jwt_maxage);
        let session = self.db_client.create_session(principal, expires_at).await?;

        let token = token::create_token(
            &session.id.to_string(),
            self.jwt_secret.as_bytes(),
            self.jwt_maxage,
        )
        .map_err(|e| ServiceError::Other(format!("token signing failed: {}", e)))?;

        Ok(IssuedSession { token, identity })
    }

    pub async fn register_worker(&self, body: RegisterWorkerDto) -> Result<IssuedSession, ServiceError> {
        let email = body.email.trim().to_lowercase();

        if self.db_client.get_worker_by_email(&email).await?.is_some() {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let password_hash = password::hash(&body.password)?;

        let saved = self
            .db_client
            .save_worker(NewWorker {
                first_name: body.first_name.trim(),
                last_name: body.last_name.trim(),
                age: body.age,
                email: &email,
                password_hash: &password_hash,
                phone: body.phone.as_deref(),
                photo_url: body.photo_url.as_deref(),
                bio: body.bio.as_deref(),
                location_lat: body.location_lat,
                location_lng: body.location_lng,
                skills: &body.skills,
            })
            .await;

        let worker = match saved {
            Ok(worker) => worker,
            Err(e) if is_unique_violation(&e) => return Err(ServiceError::EmailAlreadyRegistered),
            Err(e) => return Err(e.into()),
        };

        tracing::info!("worker {} registered", worker.id);

        self.issue_session(
            Principal::Worker(worker.id),
            IdentityResponseDto::User(FilterWorkerDto::filter_worker(&worker)),
        )
        .await
    }

    pub async fn register_client(&self, body: RegisterClientDto) -> Result<IssuedSession, ServiceError> {
        let email = body.email.trim().to_lowercase();

        if self.db_client.get_client_by_email(&email).await?.is_some() {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let password_hash = password::hash(&body.password)?;

        let saved = self
            .db_client
            .save_client(NewClient {
                user_type: body.user_type,
                company_name: body.company_name.as_deref().map(str::trim).filter(|n| !n.is_empty()),
                email: &email,
                password_hash: &password_hash,
                phone: body.phone.as_deref(),
                photo_url: body.photo_url.as_deref(),
                billing_info: body.billing_info,
            })
            .await;

        let client = match saved {
            Ok(client) => client,
            Err(e) if is_unique_violation(&e) => return Err(ServiceError::EmailAlreadyRegistered),
            Err(e) => return Err(e.into()),
        };

        tracing::info!("client {} registered", client.id);

        self.issue_session(
            Principal::Client(client.id),
            IdentityResponseDto::Client(FilterClientDto::filter_client(&client)),
        )
        .await
    }

    pub async fn login(&self, body: LoginUserDto) -> Result<IssuedSession, ServiceError> {
        let email = body.email.trim().to_lowercase();

        let (principal, password_hash, identity) = match body.role {
            PartyRole::Worker => {
                let worker = self
                    .db_client
                    .get_worker_by_email(&email)
                    .await?
                    .ok_or(ServiceError::InvalidCredentials)?;
                (
                    Principal::Worker(worker.id),
                    worker.password_hash.clone(),
                    IdentityResponseDto::User(FilterWorkerDto::filter_worker(&worker)),
                )
            }
            PartyRole::Client => {
                let client = self
                    .db_client
                    .get_client_by_email(&email)
                    .await?
                    .ok_or(ServiceError::InvalidCredentials)?;
                (
                    Principal::Client(client.id),
                    client.password_hash.clone(),
                    IdentityResponseDto::Client(FilterClientDto::filter_client(&client)),
                )
            }
        };

        let password_matches = password::compare(&body.password, &password_hash)
            .map_err(|_| ServiceError::InvalidCredentials)?;

        if !password_matches {
            tracing::warn!("failed {} login for {}", body.role.to_str(), principal.id());
            return Err(ServiceError::InvalidCredentials);
        }

        tracing::info!("{} {} logged in", body.role.to_str(), principal.id());

        self.issue_session(principal, identity).await
    }

    /// Cookie value → live session → principal. Every failure is plain
    /// `Unauthenticated` except store errors.
    pub async fn resolve_session(&self, token: &str) -> Result<Principal, ServiceError> {
        let subject = token::decode_token(token, self.jwt_secret.as_bytes())
            .map_err(|_| ServiceError::Unauthenticated)?;

        let session_id = Uuid::parse_str(&subject).map_err(|_| ServiceError::Unauthenticated)?;

        let session = self
            .db_client
            .get_session(session_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        if session.is_expired(Utc::now()) {
            return Err(ServiceError::Unauthenticated);
        }

        session.principal().ok_or_else(|| {
            tracing::warn!("session {} carries an inconsistent identity", session.id);
            ServiceError::Unauthenticated
        })
    }

    /// Ends the session behind `token` if there is one. An unreadable or
    /// unknown token is not an error.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), ServiceError> {
        let Some(token) = token else {
            return Ok(());
        };

        let Ok(subject) = token::decode_token(token, self.jwt_secret.as_bytes()) else {
            return Ok(());
        };

        let Ok(session_id) = Uuid::parse_str(&subject) else {
            return Ok(());
        };

        let removed = self.db_client.delete_session(session_id).await?;
        if removed > 0 {
            tracing::info!("session {} ended", session_id);
        }

        Ok(())
    }

    /// The account behind a session, or `None` when it has since been removed.
    pub async fn current_identity(
        &self,
        principal: Principal,
    ) -> Result<Option<IdentityResponseDto>, ServiceError> {
        let identity = match principal {
            Principal::Worker(id) => self
                .db_client
                .get_worker(id)
                .await?
                .map(|worker| IdentityResponseDto::User(FilterWorkerDto::filter_worker(&worker))),
            Principal::Client(id) => self
                .db_client
                .get_client(id)
                .await?
                .map(|client| IdentityResponseDto::Client(FilterClientDto::filter_client(&client))),
        };

        Ok(identity)
    }
}
