use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use deadpool_redis::{redis::RedisError, CreatePoolError, PoolError};
use std::borrow::Cow;

use crate::ENV;

/// Errors surfaced to HTTP clients.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(Cow<'static, str>),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn payload_too_large(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    fn message(&self) -> Cow<'static, str> {
        match self {
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::PayloadTooLarge(msg) => msg.clone(),
            Error::InternalServer => "Internal Server Error".into(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(("Access-Control-Allow-Origin", ENV.frontend_url.as_str()))
            .insert_header(("Access-Control-Allow-Credentials", "true"))
            .json(ErrorBody { message: self.message() })
    }
}

/// Errors raised inside services, repositories and stores.
#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // jwt errors
    #[error("JWT Error")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    // sqlx errors
    #[error("Database Error : {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("Migration Error")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    // serde errors
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    // redis errors
    #[error(transparent)]
    PoolInit(#[from] CreatePoolError),
    #[error("Redis pool error: {0}")]
    PoolGet(#[from] PoolError),
    #[error("Redis error")]
    RedisError(#[from] RedisError),
    // file transport errors
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    // catalog errors
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Cycle: {0}")]
    Cycle(Cow<'static, str>),
    #[error("Too Large: {0}")]
    TooLarge(Cow<'static, str>),
    #[error("Database Conflict: {0:?}")]
    Conflict(Option<DbErrorMeta>),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    pub constraint: Option<String>,
    pub message: String,
}

/// Client-facing text for a uniqueness violation, keyed by the index in `migrations/`.
fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let Some(meta) = meta else {
        return "Duplicate value".into();
    };
    match meta.constraint.as_deref() {
        Some("folders_sibling_name_key") => "A folder with this name already exists here".into(),
        Some("tags_name_key") => "Tag already exists".into(),
        Some("filter_categories_name_key") => "Filter category already exists".into(),
        Some("filter_values_value_key") => "Filter value already exists in this category".into(),
        Some("asset_versions_asset_id_version_number_key") => {
            "Version number is already taken".into()
        }
        Some(_) => "Duplicate value".into(),
        None if !meta.message.is_empty() => meta.message.clone().into(),
        None => "Duplicate value".into(),
    }
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::Unauthorized(msg) => Error::Unauthorized(msg),
            SystemError::Forbidden(msg) => Error::Forbidden(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::Cycle(msg) => Error::Conflict(msg),
            SystemError::TooLarge(msg) => Error::PayloadTooLarge(msg),
            SystemError::Conflict(meta) => Error::Conflict(conflict_message(&meta)),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            log::error!("{:?}", err);
            return SystemError::InternalError(Box::new(err));
        };
        match db_err.code().as_deref() {
            // unique_violation
            Some("23505") => SystemError::Conflict(Some(DbErrorMeta {
                code: db_err.code().map(|s| s.to_string()),
                constraint: db_err.constraint().map(|s| s.to_string()),
                message: db_err.message().to_string(),
            })),
            // foreign_key_violation
            Some("23503") => SystemError::NotFound("Referenced resource not found".into()),
            _ => {
                log::error!("Unhandled DB error: {:?}", db_err);
                SystemError::DatabaseError(db_err.message().to_string().into())
            }
        }
    }
}

impl From<validator::ValidationErrors> for SystemError {
    fn from(err: validator::ValidationErrors) -> Self {
        SystemError::BadRequest(err.to_string().into())
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn cycle(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Cycle(msg.into())
    }

    pub fn too_large(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::TooLarge(msg.into())
    }

    /// Conflict detected by the service layer rather than a database index.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(Some(DbErrorMeta { code: None, constraint: None, message: msg.into() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_violation(constraint: &str) -> SystemError {
        SystemError::Conflict(Some(DbErrorMeta {
            code: Some("23505".into()),
            constraint: Some(constraint.into()),
            message: "duplicate key value violates unique constraint".into(),
        }))
    }

    #[test]
    fn conflicts_map_to_catalog_messages() {
        let err: Error = unique_violation("tags_name_key").into();
        assert!(matches!(err, Error::Conflict(ref m) if m == "Tag already exists"));

        let err: Error = SystemError::conflict("Folder 'a' already exists").into();
        assert!(matches!(err, Error::Conflict(ref m) if m == "Folder 'a' already exists"));

        let err: Error = SystemError::cycle("into itself").into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn oversized_upload_is_413() {
        let err: Error = SystemError::too_large("File too big").into();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
