use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::{domain::UserEmail, routes::ApiResponse, users, verification::CodeStore, DbPool};

#[derive(Clone, Debug, Deserialize)]
pub struct BodyData {
    email: UserEmail,
    #[serde(rename = "verificationCode")]
    verification_code: String,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
    user_id: Uuid,
    email: String,
    username: String,
    login_time: DateTime<Utc>,
    login_method: &'static str,
}

#[tracing::instrument(
    name = "Logging in with a verification code",
    skip(body, code_store, pool),
    fields(email = %body.email, user_id = tracing::field::Empty)
)]
pub async fn login_with_code(
    Json(body): Json<BodyData>,
    code_store: Data<CodeStore>,
    pool: Data<DbPool>,
) -> Result<HttpResponse, AuthError> {
    code_store.verify(body.email.as_ref(), &body.verification_code)?;
    let user = users::find_by_email(&pool, body.email.as_ref())
        .await
        .context("Failed to look up the user")?
        .ok_or(AuthError::UserNotFound)?;
    tracing::Span::current().record("user_id", &tracing::field::display(&user.id));
    users::record_login(&pool, user.id)
        .await
        .context("Failed to record the login")?;
    let session = SessionData {
        user_id: user.id,
        email: user.email,
        username: user.username,
        login_time: Utc::now(),
        login_method: "verification_code",
    };
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(session, "Logged in successfully")))
}
