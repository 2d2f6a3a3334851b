use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::{
    domain::{NewUser, UserEmail, Username},
    routes::ApiResponse,
    users::{self, InsertUserError},
    verification::CodeStore,
    DbPool,
};

#[derive(Clone, Debug, Deserialize)]
pub struct BodyData {
    email: UserEmail,
    #[serde(rename = "verificationCode")]
    verification_code: String,
    username: Username,
}

#[derive(Debug, Serialize)]
pub struct RegisteredData {
    user: users::User,
}

/// Accounts created here are passwordless; the verified code is the proof
/// of ownership and the email starts out verified.
#[tracing::instrument(
    name = "Registering with a verification code",
    skip(body, code_store, pool),
    fields(email = %body.email, username = %body.username)
)]
pub async fn register_with_code(
    Json(body): Json<BodyData>,
    code_store: Data<CodeStore>,
    pool: Data<DbPool>,
) -> Result<HttpResponse, AuthError> {
    code_store.verify(body.email.as_ref(), &body.verification_code)?;
    if users::find_by_email(&pool, body.email.as_ref())
        .await
        .context("Failed to look up the user")?
        .is_some()
    {
        return Err(AuthError::EmailTaken);
    }
    let new_user = NewUser {
        name: Some(body.username.as_ref().to_owned()),
        username: body.username,
        email: body.email,
        avatar: None,
        email_verified: true,
    };
    let user = users::insert(&pool, &new_user).await.map_err(|e| match e {
        // Lost the race against a concurrent registration.
        InsertUserError::DuplicateEmail => AuthError::EmailTaken,
        InsertUserError::Unexpected(e) => {
            AuthError::Unexpected(anyhow::Error::from(e).context("Failed to insert the user"))
        }
    })?;
    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        RegisteredData { user },
        "Registered successfully, email verified",
    )))
}
