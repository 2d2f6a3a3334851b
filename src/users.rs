use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::{domain::NewUser, DbPool};

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub email_verified: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a partial update; absent fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.name.is_none() && self.avatar.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InsertUserError {
    #[error("A user with this email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Unexpected(#[from] sqlx::Error),
}

const USER_COLUMNS: &str = "id, username, email, name, avatar, email_verified, \
     is_active, last_login, created_at, updated_at";

#[tracing::instrument(name = "Fetching a user by email", skip(pool))]
pub async fn find_by_email(pool: &DbPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "select {USER_COLUMNS} from users where email = $1;"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(log_query_error)
}

#[tracing::instrument(name = "Fetching a user by id", skip(pool))]
pub async fn find_by_id(pool: &DbPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("select {USER_COLUMNS} from users where id = $1;"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(log_query_error)
}

#[tracing::instrument(name = "Listing all users", skip(pool))]
pub async fn list_all(pool: &DbPool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!(
        "select {USER_COLUMNS} from users order by created_at desc;"
    ))
    .fetch_all(pool)
    .await
    .map_err(log_query_error)
}

/// Inserts a new account. A unique-constraint violation on the email
/// column surfaces as `DuplicateEmail` so that callers can answer with a
/// conflict instead of a generic failure.
#[tracing::instrument(name = "Inserting a new user", skip(pool, new_user), fields(email = %new_user.email))]
pub async fn insert(pool: &DbPool, new_user: &NewUser) -> Result<User, InsertUserError> {
    let avatar = new_user.avatar.clone().unwrap_or_else(|| {
        format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
            new_user.username.as_ref()
        )
    });
    sqlx::query_as::<_, User>(&format!(
        "insert into users \
             (id, username, email, name, avatar, email_verified, is_active, created_at, updated_at) \
         values ($1, $2, $3, $4, $5, $6, true, now(), now()) \
         returning {USER_COLUMNS};"
    ))
    .bind(Uuid::new_v4())
    .bind(new_user.username.as_ref())
    .bind(new_user.email.as_ref())
    .bind(new_user.name.as_deref())
    .bind(avatar)
    .bind(new_user.email_verified)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some("23505") {
                return InsertUserError::DuplicateEmail;
            }
        }
        InsertUserError::Unexpected(log_query_error(e))
    })
}

/// Applies a partial update. An empty patch returns the current record
/// unchanged; a missing id returns `None`.
#[tracing::instrument(name = "Updating a user", skip(pool, patch))]
pub async fn update(pool: &DbPool, id: Uuid, patch: &UserPatch) -> sqlx::Result<Option<User>> {
    if patch.is_empty() {
        return find_by_id(pool, id).await;
    }
    sqlx::query_as::<_, User>(&format!(
        "update users set \
             username = coalesce($2, username), \
             name = coalesce($3, name), \
             avatar = coalesce($4, avatar), \
             updated_at = now() \
         where id = $1 \
         returning {USER_COLUMNS};"
    ))
    .bind(id)
    .bind(patch.username.as_deref())
    .bind(patch.name.as_deref())
    .bind(patch.avatar.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(log_query_error)
}

#[tracing::instrument(name = "Deleting a user", skip(pool))]
pub async fn delete(pool: &DbPool, id: Uuid) -> sqlx::Result<bool> {
    sqlx::query("delete from users where id = $1;")
        .bind(id)
        .execute(pool)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(log_query_error)
}

#[tracing::instrument(name = "Recording a login", skip(pool))]
pub async fn record_login(pool: &DbPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("update users set last_login = now() where id = $1;")
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(log_query_error)
}

fn log_query_error(e: sqlx::Error) -> sqlx::Error {
    error!("Failed to execute query: {:?}", e);
    e
}
