//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`) so handlers can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (logged, mapped to a generic DatabaseError)
/// - `App`: Business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::with_message(ErrorCode::DatabaseError, "A database error occurred")
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Turns a unique-constraint violation into `on_conflict`, anything else into `Db`
pub fn unique_violation_as(err: sqlx::Error, on_conflict: AppError) -> ServiceError {
    if matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation()) {
        return ServiceError::App(on_conflict);
    }
    ServiceError::Db(err.into())
}

/// Turns a foreign-key violation into `on_violation`, anything else into `Db`
pub fn foreign_key_violation_as(err: sqlx::Error, on_violation: AppError) -> ServiceError {
    if matches!(&err, sqlx::Error::Database(db) if db.is_foreign_key_violation()) {
        return ServiceError::App(on_violation);
    }
    ServiceError::Db(err.into())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::fmt;

    #[derive(Debug, Clone, Copy)]
    pub enum FakeKind {
        Unique,
        ForeignKey,
        Check,
    }

    #[derive(Debug)]
    pub struct FakeDbError(pub FakeKind);

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake database error: {:?}", self.0)
        }
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                FakeKind::Unique => ErrorKind::UniqueViolation,
                FakeKind::ForeignKey => ErrorKind::ForeignKeyViolation,
                FakeKind::Check => ErrorKind::CheckViolation,
            }
        }
    }

    pub fn db_error(kind: FakeKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError(kind)))
    }

    #[test]
    fn duplicate_email_maps_to_conflict_not_500() {
        let err = unique_violation_as(
            db_error(FakeKind::Unique),
            AppError::new(ErrorCode::EmailAlreadyRegistered),
        );
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::EmailAlreadyRegistered);
        assert_eq!(app.http_status(), http::StatusCode::CONFLICT);
    }

    #[test]
    fn other_db_errors_stay_generic() {
        let err = unique_violation_as(
            db_error(FakeKind::Check),
            AppError::new(ErrorCode::EmailAlreadyRegistered),
        );
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::DatabaseError);
        assert_eq!(app.message, "A database error occurred");
        assert_eq!(app.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);

        let app: AppError = ServiceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(app.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn foreign_key_violation_maps_to_given_error() {
        let err = foreign_key_violation_as(
            db_error(FakeKind::ForeignKey),
            AppError::business_rule("in use"),
        );
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::BusinessRuleViolation);
    }
}
