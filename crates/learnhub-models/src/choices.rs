//! Categorical column values.
//!
//! Each enum is stored as its snake_case string in a `VARCHAR` column guarded
//! by a `CHECK` constraint, and serialized to JSON with the same string.
//! `label()` gives the human readable name shown by admin listings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_choices {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => ($value:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $value ),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}::{}", stringify!($name), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $value => Ok($name::$variant), )+
                    other => Err(UnknownChoice {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<$name>()?)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <String as PgHasArrayType>::array_type_info()
            }
        }
    };
}

text_choices!(
    /// Account role. The single source of truth for the permission flags.
    Role {
        Guardian => ("guardian", "Guardian"),
        Admin => ("admin", "Admin"),
        Superuser => ("superuser", "Superuser"),
    }
);

impl Default for Role {
    fn default() -> Self {
        Role::Guardian
    }
}

/// Permission flags implied by a [`Role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleFlags {
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Role {
    /// guardian → (false, false), admin → (true, false), superuser → (true, true).
    pub const fn flags(self) -> RoleFlags {
        match self {
            Role::Guardian => RoleFlags {
                is_staff: false,
                is_superuser: false,
            },
            Role::Admin => RoleFlags {
                is_staff: true,
                is_superuser: false,
            },
            Role::Superuser => RoleFlags {
                is_staff: true,
                is_superuser: true,
            },
        }
    }
}

text_choices!(
    /// School year of a student (1st to 9th year of elementary school).
    SchoolYear {
        Year1 => ("year_1", "1st Year"),
        Year2 => ("year_2", "2nd Year"),
        Year3 => ("year_3", "3rd Year"),
        Year4 => ("year_4", "4th Year"),
        Year5 => ("year_5", "5th Year"),
        Year6 => ("year_6", "6th Year"),
        Year7 => ("year_7", "7th Year"),
        Year8 => ("year_8", "8th Year"),
        Year9 => ("year_9", "9th Year"),
    }
);

text_choices!(
    /// ADHD presentation reported for a student.
    AdhdType {
        Inattentive => ("inattentive", "Inattentive"),
        HyperactiveImpulsive => ("hyperactive_impulsive", "Hyperactive/Impulsive"),
        Combined => ("combined", "Combined"),
        NotInformed => ("not_informed", "Not Informed"),
    }
);

impl Default for AdhdType {
    fn default() -> Self {
        AdhdType::NotInformed
    }
}

text_choices!(
    /// Intended audience of a course. Kept for older course rows.
    CourseAudience {
        Student => ("student", "Student"),
        Guardian => ("guardian", "Guardian"),
    }
);

impl Default for CourseAudience {
    fn default() -> Self {
        CourseAudience::Student
    }
}

text_choices!(
    LessonType {
        Video => ("video", "Video"),
        Text => ("text", "Text"),
        Quiz => ("quiz", "Quiz"),
    }
);

impl Default for LessonType {
    fn default() -> Self {
        LessonType::Video
    }
}

text_choices!(
    /// Support ticket status. Any transition between the three is allowed.
    TicketStatus {
        New => ("new", "New"),
        InProgress => ("in_progress", "In Progress"),
        Resolved => ("resolved", "Resolved"),
    }
);

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::New
    }
}
