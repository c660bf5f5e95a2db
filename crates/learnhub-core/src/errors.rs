//! Application error type shared by every service.
//!
//! [`AppError`] pairs an [`ErrorKind`] with an [`anyhow::Error`] carrying the
//! human readable message and its context chain. Callers branch on the kind;
//! the message is for operators and logs.

use std::fmt;

use anyhow::Error;
use validator::ValidationErrors;

/// Category of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field is missing or a value is malformed.
    ValidationFailure,
    /// The write would duplicate a value or tuple declared unique.
    UniquenessConflict,
    /// A reference points at a parent row that does not exist.
    ReferentialIntegrityViolation,
    /// The addressed row does not exist.
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationFailure => "validation_failure",
            ErrorKind::UniquenessConflict => "uniqueness_conflict",
            ErrorKind::ReferentialIntegrityViolation => "referential_integrity_violation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::ValidationFailure, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::UniquenessConflict, err)
    }

    pub fn reference<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::ReferentialIntegrityViolation, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    /// Wraps `validator` output into a [`ErrorKind::ValidationFailure`].
    pub fn invalid(errors: ValidationErrors) -> Self {
        Self::validation(anyhow::anyhow!("Validation failed: {}", errors))
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::ValidationFailure
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::UniquenessConflict
    }

    pub fn is_reference(&self) -> bool {
        self.kind == ErrorKind::ReferentialIntegrityViolation
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.kind, self.error)
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_constructors_set_kind() {
        assert!(AppError::validation(anyhow::anyhow!("x")).is_validation());
        assert!(AppError::conflict(anyhow::anyhow!("x")).is_conflict());
        assert!(AppError::reference(anyhow::anyhow!("x")).is_reference());
        assert!(AppError::not_found(anyhow::anyhow!("x")).is_not_found());
        assert_eq!(
            AppError::internal(anyhow::anyhow!("x")).kind,
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_from_defaults_to_internal() {
        let err: AppError = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_invalid_wraps_validator_errors() {
        let errors = Named {
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        let err = AppError::invalid(errors);
        assert!(err.is_validation());
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::conflict(anyhow::anyhow!("email taken"));
        assert_eq!(err.to_string(), "uniqueness_conflict: email taken");
    }
}
