//! Student profiles.
//!
//! A student belongs to exactly one user account (its guardian) and is
//! removed together with it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::choices::{AdhdType, SchoolYear};
use crate::ids::{StudentId, UserId};
use learnhub_core::PaginationParams;
use learnhub_core::serde::deserialize_nullable;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
    pub public_id: Uuid,
    pub user_id: UserId,
    pub nickname: String,
    pub birth_date: Option<NaiveDate>,
    pub school_year: SchoolYear,
    pub adhd_type: AdhdType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student joined with the owning account's email, as admin listings show it.
#[derive(Serialize, FromRow, Debug, Clone)]
pub struct StudentWithUser {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub student: Student,
    pub user_email: String,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 300))]
    pub nickname: String,
    pub birth_date: Option<NaiveDate>,
    pub school_year: SchoolYear,
    /// Defaults to [`AdhdType::NotInformed`].
    #[serde(default)]
    pub adhd_type: Option<AdhdType>,
}

/// Partial update; only provided fields change. An explicit `null`
/// birth date clears it.
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 300))]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub birth_date: Option<Option<NaiveDate>>,
    pub school_year: Option<SchoolYear>,
    pub adhd_type: Option<AdhdType>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct StudentFilterParams {
    pub user_id: Option<UserId>,
    pub school_year: Option<SchoolYear>,
    /// Case-insensitive substring of the nickname or the owner's email
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_student_dto_validation() {
        let dto = CreateStudentDto {
            nickname: "Ana".into(),
            birth_date: NaiveDate::from_ymd_opt(2016, 3, 9),
            school_year: SchoolYear::Year3,
            adhd_type: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_student_dto_empty_nickname() {
        let dto = CreateStudentDto {
            nickname: String::new(),
            birth_date: None,
            school_year: SchoolYear::Year1,
            adhd_type: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_student_dto_from_json_defaults_adhd_type() {
        let dto: CreateStudentDto =
            serde_json::from_str(r#"{"nickname":"Leo","birth_date":null,"school_year":"year_5"}"#)
                .unwrap();
        assert_eq!(dto.adhd_type, None);
        assert_eq!(dto.school_year, SchoolYear::Year5);
    }

    #[test]
    fn test_update_student_dto_long_nickname() {
        let dto = UpdateStudentDto {
            nickname: Some("x".repeat(301)),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_student_dto_null_differs_from_missing() {
        let missing: UpdateStudentDto = serde_json::from_str(r#"{"nickname":"Leo"}"#).unwrap();
        assert_eq!(missing.birth_date, None);

        let cleared: UpdateStudentDto = serde_json::from_str(r#"{"birth_date":null}"#).unwrap();
        assert_eq!(cleared.birth_date, Some(None));

        let set: UpdateStudentDto =
            serde_json::from_str(r#"{"birth_date":"2015-03-01"}"#).unwrap();
        assert_eq!(set.birth_date, NaiveDate::from_ymd_opt(2015, 3, 1).map(Some));
    }
}
