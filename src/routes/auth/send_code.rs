use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use serde::Deserialize;

use super::AuthError;
use crate::{domain::UserEmail, routes::ApiResponse, verification::CodeStore, EmailClient};

#[derive(Clone, Debug, Deserialize)]
pub struct BodyData {
    email: UserEmail,
}

#[tracing::instrument(
    name = "Sending a verification code",
    skip(body, code_store, email_client),
    fields(email = %body.email)
)]
pub async fn send_verification_code(
    Json(body): Json<BodyData>,
    code_store: Data<CodeStore>,
    email_client: Data<EmailClient>,
) -> Result<HttpResponse, AuthError> {
    let code = code_store.issue(body.email.as_ref());
    if let Err(e) = send_code_email(&email_client, &body.email, &code).await {
        // An undelivered code must not stay usable.
        code_store.revoke(body.email.as_ref());
        return Err(AuthError::Delivery(e.into()));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message(format!(
        "Verification code sent to {}",
        body.email
    ))))
}

async fn send_code_email(
    email_client: &EmailClient,
    recipient: &UserEmail,
    code: &str,
) -> reqwest::Result<()> {
    email_client
        .send_email(
            recipient,
            "Your login verification code",
            &format!(
                r#"
        <p>Use this code to sign in:</p>
        <h1 style="letter-spacing: 8px;">{}</h1>
        <p>The code expires in 5 minutes. Do not share it with anyone.
        If you did not request it, ignore this email.</p>
        "#,
                code
            ),
            &format!(
                r#"
        Use this code to sign in: {}
        The code expires in 5 minutes. Do not share it with anyone.
        If you did not request it, ignore this email.
        "#,
                code
            ),
        )
        .await
}
