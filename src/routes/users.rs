use actix_web::{
    http::StatusCode,
    web::{Data, Json, Path},
    HttpResponse, ResponseError,
};
use anyhow::Context;
use serde::Deserialize;
use uuid::Uuid;

use super::{error_body, ApiResponse};
use crate::{
    domain::{NewUser, UserEmail, Username},
    users::{self, InsertUserError, UserPatch},
    DbPool,
};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,
    #[error("A user with this email already exists")]
    EmailTaken,
    #[error("Something went wrong")]
    Unexpected(#[from] anyhow::Error),
}

impl ResponseError for UserError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(error_body(self.status_code(), self))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateBody {
    email: UserEmail,
    username: Username,
    name: Option<String>,
    avatar: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdateBody {
    username: Option<Username>,
    name: Option<String>,
    avatar: Option<String>,
}

#[tracing::instrument(name = "Listing users", skip_all)]
pub async fn list_users(pool: Data<DbPool>) -> Result<HttpResponse, UserError> {
    let users = users::list_all(&pool)
        .await
        .context("Failed to list users")?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        users,
        "Users retrieved successfully",
    )))
}

#[tracing::instrument(name = "Fetching a user", skip(pool))]
pub async fn get_user(id: Path<Uuid>, pool: Data<DbPool>) -> Result<HttpResponse, UserError> {
    let id = id.into_inner();
    let user = users::find_by_id(&pool, id)
        .await
        .context("Failed to fetch the user")?
        .ok_or(UserError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(user)))
}

/// Accounts created by an operator start out unverified; verification
/// happens through the code flow.
#[tracing::instrument(name = "Creating a user", skip(body, pool), fields(email = %body.email))]
pub async fn create_user(
    Json(body): Json<CreateBody>,
    pool: Data<DbPool>,
) -> Result<HttpResponse, UserError> {
    let new_user = NewUser {
        username: body.username,
        email: body.email,
        name: body.name,
        avatar: body.avatar,
        email_verified: false,
    };
    let user = users::insert(&pool, &new_user).await.map_err(|e| match e {
        InsertUserError::DuplicateEmail => UserError::EmailTaken,
        InsertUserError::Unexpected(e) => {
            UserError::Unexpected(anyhow::Error::from(e).context("Failed to insert the user"))
        }
    })?;
    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        user,
        "User created successfully",
    )))
}

#[tracing::instrument(name = "Updating a user", skip(body, pool))]
pub async fn update_user(
    id: Path<Uuid>,
    Json(body): Json<UpdateBody>,
    pool: Data<DbPool>,
) -> Result<HttpResponse, UserError> {
    let id = id.into_inner();
    let patch = UserPatch {
        username: body.username.map(String::from),
        name: body.name,
        avatar: body.avatar,
    };
    let user = users::update(&pool, id, &patch)
        .await
        .context("Failed to update the user")?
        .ok_or(UserError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        user,
        "User updated successfully",
    )))
}

#[tracing::instrument(name = "Deleting a user", skip(pool))]
pub async fn delete_user(id: Path<Uuid>, pool: Data<DbPool>) -> Result<HttpResponse, UserError> {
    let id = id.into_inner();
    let deleted = users::delete(&pool, id)
        .await
        .context("Failed to delete the user")?;
    if !deleted {
        return Err(UserError::NotFound);
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted successfully")))
}
