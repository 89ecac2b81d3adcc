use sqlx::error::ErrorKind;

use crate::domain::errors::AppError;
use crate::domain::errors::FieldError;

/// Extract the column from a `<table>_<column>_key` unique constraint name.
fn constraint_field(constraint: &str) -> Option<&str> {
    constraint
        .strip_prefix("users_")
        .and_then(|rest| rest.strip_suffix("_key"))
        .filter(|field| !field.is_empty())
}

/// Classify a sqlx error into an application error.
///
/// * `RowNotFound` becomes `NOT_FOUND`
/// * unique violations become `CONFLICT`, naming the offending field
/// * foreign key, not-null and check violations become `VALIDATION`
/// * anything else is `INTERNAL`
pub fn map_sqlx_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::RowNotFound = err {
        return AppError::not_found("record not found");
    }

    let Some(db_err) = err.as_database_error() else {
        return AppError::internal("database error").with_source(err);
    };

    match db_err.kind() {
        ErrorKind::UniqueViolation => {
            let field = db_err
                .constraint()
                .and_then(constraint_field)
                .unwrap_or("value")
                .to_string();
            AppError::conflict(
                "conflicting values",
                vec![FieldError::taken(field)],
            )
            .with_source(err)
        }
        ErrorKind::ForeignKeyViolation => {
            AppError::validation("referenced record does not exist").with_source(err)
        }
        ErrorKind::NotNullViolation => {
            AppError::validation("a required field is missing").with_source(err)
        }
        ErrorKind::CheckViolation => {
            AppError::validation("a field has an invalid value").with_source(err)
        }
        _ => AppError::internal("database error").with_source(err),
    }
}
