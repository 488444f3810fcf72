// db/accountdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::{
    accountmodel::{BillingInfo, Client, ClientType, Principal, Worker},
    sessionmodel::Session,
};

pub struct NewWorker<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub age: i32,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub skills: &'a [String],
}

pub struct NewClient<'a> {
    pub user_type: ClientType,
    pub company_name: Option<&'a str>,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub billing_info: Option<BillingInfo>,
}

#[async_trait]
pub trait AccountExt {
    async fn get_worker(&self, worker_id: Uuid) -> Result<Option<Worker>, sqlx::Error>;

    async fn get_worker_by_email(&self, email: &str) -> Result<Option<Worker>, sqlx::Error>;

    async fn save_worker(&self, worker: NewWorker<'_>) -> Result<Worker, sqlx::Error>;

    async fn get_client(&self, client_id: Uuid) -> Result<Option<Client>, sqlx::Error>;

    async fn get_client_by_email(&self, email: &str) -> Result<Option<Client>, sqlx::Error>;

    async fn save_client(&self, client: NewClient<'_>) -> Result<Client, sqlx::Error>;

    async fn create_session(
        &self,
        principal: Principal,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, sqlx::Error>;

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, sqlx::Error>;

    async fn delete_session(&self, session_id: Uuid) -> Result<u64, sqlx::Error>;

    async fn delete_expired_sessions(&self) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl AccountExt for DBClient {
    async fn get_worker(&self, worker_id: Uuid) -> Result<Option<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>("SELECT * FROM workers WHERE id = $1")
            .bind(worker_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_worker_by_email(&self, email: &str) -> Result<Option<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>("SELECT * FROM workers WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn save_worker(&self, worker: NewWorker<'_>) -> Result<Worker, sqlx::Error> {
        sqlx::query_as::<_, Worker>(
            r#"
            INSERT INTO workers
            (first_name, last_name, age, email, password_hash, phone, photo_url, bio,
             location_lat, location_lng, skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(worker.first_name)
        .bind(worker.last_name)
        .bind(worker.age)
        .bind(worker.email)
        .bind(worker.password_hash)
        .bind(worker.phone)
        .bind(worker.photo_url)
        .bind(worker.bio)
        .bind(worker.location_lat)
        .bind(worker.location_lng)
        .bind(worker.skills)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_client(&self, client_id: Uuid) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_client_by_email(&self, email: &str) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn save_client(&self, client: NewClient<'_>) -> Result<Client, sqlx::Error> {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients
            (user_type, company_name, email, password_hash, phone, photo_url, billing_info)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(client.user_type)
        .bind(client.company_name)
        .bind(client.email)
        .bind(client.password_hash)
        .bind(client.phone)
        .bind(client.photo_url)
        .bind(client.billing_info.map(Json))
        .fetch_one(&self.pool)
        .await
    }

    async fn create_session(
        &self,
        principal: Principal,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (worker_id, client_id, role, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(principal.worker_id())
        .bind(principal.client_id())
        .bind(principal.role())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_sessions(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
