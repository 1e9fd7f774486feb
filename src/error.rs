use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::SqlErr;
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("constraint violated on `{}`", .field.as_deref().unwrap_or("unknown"))]
    ConstraintViolation { field: Option<String> },

    #[error("row is still referenced by dependent rows")]
    ReferentialIntegrity,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

// Column names that can appear in Postgres constraint names
// (users_email_key, fk_carts_user_id, ...). Used to tag violations.
const CONSTRAINED_FIELDS: [&str; 9] = [
    "user_id",
    "coupon_id",
    "brand_id",
    "category_id",
    "cart_id",
    "product_id",
    "email",
    "code",
    "name",
];

fn violated_field(detail: &str) -> Option<String> {
    CONSTRAINED_FIELDS
        .iter()
        .find(|field| detail.contains(*field))
        .map(|field| (*field).to_string())
}

impl AppError {
    /// Map a SeaORM error raised by an insert or update. Uniqueness,
    /// foreign-key and not-null rejections become `ConstraintViolation`
    /// tagged with the field where it can be read off the constraint name.
    pub fn on_write(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail))
            | Some(SqlErr::ForeignKeyConstraintViolation(detail)) => AppError::ConstraintViolation {
                field: violated_field(&detail),
            },
            _ => AppError::OrmError(err),
        }
    }

    /// Map a SeaORM error raised by a delete. A foreign-key rejection here
    /// means dependents still reference the row.
    pub fn on_delete(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::ReferentialIntegrity,
            _ => AppError::OrmError(err),
        }
    }

    /// sqlx counterpart of [`AppError::on_write`] for the raw-query paths.
    pub fn on_write_sqlx(err: sqlx::Error) -> Self {
        match constraint_code(&err) {
            Some((code, detail)) if code == "23502" || code == "23503" || code == "23505" => {
                AppError::ConstraintViolation {
                    field: violated_field(&detail),
                }
            }
            _ => AppError::DbError(err),
        }
    }

    /// sqlx counterpart of [`AppError::on_delete`].
    pub fn on_delete_sqlx(err: sqlx::Error) -> Self {
        match constraint_code(&err) {
            Some((code, _)) if code == "23503" => AppError::ReferentialIntegrity,
            _ => AppError::DbError(err),
        }
    }
}

fn constraint_code(err: &sqlx::Error) -> Option<(String, String)> {
    let db_err = err.as_database_error()?;
    let code = db_err.code()?.to_string();
    let mut detail = db_err.message().to_string();
    if let Some(constraint) = db_err.constraint() {
        detail.push(' ');
        detail.push_str(constraint);
    }
    Some((code, detail))
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ConstraintViolation { .. } => StatusCode::CONFLICT,
            AppError::ReferentialIntegrity => StatusCode::CONFLICT,
            AppError::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_the_violated_field_from_the_constraint_name() {
        assert_eq!(
            violated_field("duplicate key value violates unique constraint \"users_email_key\""),
            Some("email".to_string())
        );
        assert_eq!(
            violated_field("insert or update on table \"carts\" violates foreign key constraint \"fk_carts_user_id\""),
            Some("user_id".to_string())
        );
        assert_eq!(violated_field("deadlock detected"), None);
    }

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (
                AppError::Validation("name must not be empty".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::ConstraintViolation {
                    field: Some("email".into()),
                },
                StatusCode::CONFLICT,
            ),
            (AppError::ReferentialIntegrity, StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
