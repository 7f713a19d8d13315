use crate::error::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Maps Diesel errors onto [`AppError`] variants.
///
/// The dispatcher only ever reads the user directory, so the interesting cases
/// are "row missing" and "connection gone"; everything else is an opaque
/// database failure tagged with the operation that produced it.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                AppError::ConnectionPool {
                    source: anyhow::Error::msg(format!(
                        "Connection closed during {}: {}",
                        operation,
                        info.message()
                    )),
                }
            }
            DieselError::DatabaseError(_, info) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("Database error: {}", info.message())),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: String,
    }

    impl diesel::result::DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            None
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find user");
        assert!(matches!(result, AppError::NotFound { .. }));
    }

    #[test]
    fn test_convert_closed_connection() {
        let info = MockDatabaseErrorInfo {
            message: "server closed the connection unexpectedly".to_string(),
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, Box::new(info));

        let result = DatabaseErrorConverter::convert_diesel_error(error, "load recipients");
        assert!(matches!(result, AppError::ConnectionPool { .. }));
    }

    #[test]
    fn test_convert_other_database_error_keeps_operation() {
        let info = MockDatabaseErrorInfo {
            message: "relation \"users\" does not exist".to_string(),
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::Unknown, Box::new(info));

        match DatabaseErrorConverter::convert_diesel_error(error, "load recipients") {
            AppError::Database { operation, source } => {
                assert_eq!(operation, "load recipients");
                assert!(source.to_string().contains("does not exist"));
            }
            other => panic!("Expected Database error, got: {:?}", other),
        }
    }
}
