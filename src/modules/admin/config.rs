//! Declarative admin configuration.
//!
//! One [`ModelAdmin`] per entity describes what an admin list page shows and
//! how it may be searched, filtered and ordered. Field names follow the
//! related-lookup convention (`user__email` is the email of the row's user);
//! each one carries the SQL expression it resolves to over the entity's
//! `FROM` clause.

use std::fmt;
use std::str::FromStr;

use learnhub_core::AppError;

/// Entities that have an admin declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminEntity {
    Student,
    User,
    Course,
    Module,
    Lesson,
    Enrollment,
    LessonProgress,
    SupportTicket,
}

impl AdminEntity {
    pub const ALL: &'static [AdminEntity] = &[
        AdminEntity::Student,
        AdminEntity::User,
        AdminEntity::Course,
        AdminEntity::Module,
        AdminEntity::Lesson,
        AdminEntity::Enrollment,
        AdminEntity::LessonProgress,
        AdminEntity::SupportTicket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminEntity::Student => "student",
            AdminEntity::User => "user",
            AdminEntity::Course => "course",
            AdminEntity::Module => "module",
            AdminEntity::Lesson => "lesson",
            AdminEntity::Enrollment => "enrollment",
            AdminEntity::LessonProgress => "lesson_progress",
            AdminEntity::SupportTicket => "support_ticket",
        }
    }

    pub fn admin(&self) -> &'static ModelAdmin {
        match self {
            AdminEntity::Student => &STUDENT_ADMIN,
            AdminEntity::User => &USER_ADMIN,
            AdminEntity::Course => &COURSE_ADMIN,
            AdminEntity::Module => &MODULE_ADMIN,
            AdminEntity::Lesson => &LESSON_ADMIN,
            AdminEntity::Enrollment => &ENROLLMENT_ADMIN,
            AdminEntity::LessonProgress => &LESSON_PROGRESS_ADMIN,
            AdminEntity::SupportTicket => &SUPPORT_TICKET_ADMIN,
        }
    }
}

impl fmt::Display for AdminEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminEntity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        AdminEntity::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == normalized)
            .ok_or_else(|| AppError::validation(anyhow::anyhow!("Unknown admin entity '{}'", s)))
    }
}

/// A declared field and the SQL expression it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub sql: &'static str,
}

const fn field(name: &'static str, sql: &'static str) -> Field {
    Field { name, sql }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Exact match on the value's text form.
    Exact,
    /// Relative date ranges such as `today` or `this_month`.
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub field: Field,
    pub kind: FilterKind,
}

const fn exact(name: &'static str, sql: &'static str) -> ListFilter {
    ListFilter {
        field: field(name, sql),
        kind: FilterKind::Exact,
    }
}

const fn by_date(name: &'static str, sql: &'static str) -> ListFilter {
    ListFilter {
        field: field(name, sql),
        kind: FilterKind::Date,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStyle {
    Stacked,
    Tabular,
}

/// Child rows edited on the parent's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineAdmin {
    pub entity: &'static str,
    pub style: InlineStyle,
    /// Blank child forms offered on the page
    pub extra: u8,
    pub inlines: &'static [InlineAdmin],
}

pub const LESSON_INLINE: InlineAdmin = InlineAdmin {
    entity: "lessons",
    style: InlineStyle::Tabular,
    extra: 1,
    inlines: &[],
};

pub const MODULE_INLINE: InlineAdmin = InlineAdmin {
    entity: "modules",
    style: InlineStyle::Stacked,
    extra: 1,
    inlines: &[LESSON_INLINE],
};

pub const MATERIAL_INLINE: InlineAdmin = InlineAdmin {
    entity: "materials",
    style: InlineStyle::Tabular,
    extra: 1,
    inlines: &[],
};

pub const SUBTITLE_INLINE: InlineAdmin = InlineAdmin {
    entity: "subtitles",
    style: InlineStyle::Tabular,
    extra: 1,
    inlines: &[],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelAdmin {
    pub entity: AdminEntity,
    /// `FROM` clause, including joins for related lookups.
    pub from: &'static str,
    /// Alias of the entity's own table inside `from`.
    pub alias: &'static str,
    pub list_display: &'static [Field],
    pub search_fields: &'static [Field],
    pub list_filter: &'static [ListFilter],
    pub readonly_fields: &'static [&'static str],
    /// The entity's default ordering; a `-` name prefix means descending.
    /// The primary key, newest first, always breaks ties.
    pub ordering: &'static [Field],
    pub inlines: &'static [InlineAdmin],
    /// Fields hidden from the edit form.
    pub exclude: &'static [&'static str],
}

impl ModelAdmin {
    pub fn filter(&self, name: &str) -> Option<&ListFilter> {
        self.list_filter.iter().find(|f| f.field.name == name)
    }

    pub fn is_readonly(&self, name: &str) -> bool {
        self.readonly_fields.contains(&name)
    }

    /// Whether an edit form may change `name`.
    pub fn is_editable(&self, name: &str) -> bool {
        !self.is_readonly(name) && !self.exclude.contains(&name)
    }
}

pub static STUDENT_ADMIN: ModelAdmin = ModelAdmin {
    entity: AdminEntity::Student,
    from: "students s JOIN users u ON u.id = s.user_id",
    alias: "s",
    list_display: &[
        field("nickname", "s.nickname"),
        field("user", "u.email"),
        field("school_year", "s.school_year"),
    ],
    search_fields: &[field("nickname", "s.nickname"), field("user__email", "u.email")],
    list_filter: &[],
    readonly_fields: &["public_id"],
    ordering: &[],
    inlines: &[],
    exclude: &[],
};

/// Shared by the guardian, admin and superuser views.
pub static USER_ADMIN: ModelAdmin = ModelAdmin {
    entity: AdminEntity::User,
    from: "users u",
    alias: "u",
    list_display: &[
        field("email", "u.email"),
        field("full_name", "u.full_name"),
        field("role", "u.role"),
        field("is_staff", "u.is_staff"),
        field("is_superuser", "u.is_superuser"),
    ],
    search_fields: &[field("email", "u.email"), field("full_name", "u.full_name")],
    list_filter: &[],
    readonly_fields: &["public_id"],
    ordering: &[field("email", "u.email")],
    inlines: &[],
    exclude: &["is_staff", "is_superuser"],
};

pub static COURSE_ADMIN: ModelAdmin = ModelAdmin {
    entity: AdminEntity::Course,
    from: "courses c",
    alias: "c",
    list_display: &[
        field("title", "c.title"),
        field("audience", "c.audience"),
        field("published_at", "c.published_at"),
        field("created_at", "c.created_at"),
    ],
    search_fields: &[field("title", "c.title"), field("description", "c.description")],
    list_filter: &[exact("audience", "c.audience"), by_date("published_at", "c.published_at")],
    readonly_fields: &["public_id"],
    ordering: &[],
    inlines: &[MODULE_INLINE],
    exclude: &[],
};

pub static MODULE_ADMIN: ModelAdmin = ModelAdmin {
    entity: AdminEntity::Module,
    from: "modules m JOIN courses c ON c.id = m.course_id",
    alias: "m",
    list_display: &[
        field("title", "m.title"),
        field("course", "c.title"),
        field("module_order", "m.module_order"),
    ],
    search_fields: &[field("title", "m.title")],
    list_filter: &[exact("course", "m.course_id")],
    readonly_fields: &["public_id"],
    ordering: &[field("course", "m.course_id"), field("module_order", "m.module_order")],
    inlines: &[LESSON_INLINE],
    exclude: &[],
};

pub static LESSON_ADMIN: ModelAdmin = ModelAdmin {
    entity: AdminEntity::Lesson,
    from: "lessons l JOIN modules m ON m.id = l.module_id",
    alias: "l",
    list_display: &[
        field("title", "l.title"),
        field("module", "m.title"),
        field("lesson_type", "l.lesson_type"),
        field("lesson_order", "l.lesson_order"),
    ],
    search_fields: &[field("title", "l.title"), field("content", "l.content")],
    list_filter: &[
        exact("module__course", "m.course_id"),
        exact("lesson_type", "l.lesson_type"),
    ],
    readonly_fields: &["public_id"],
    ordering: &[field("module", "l.module_id"), field("lesson_order", "l.lesson_order")],
    inlines: &[MATERIAL_INLINE, SUBTITLE_INLINE],
    exclude: &[],
};

pub static ENROLLMENT_ADMIN: ModelAdmin = ModelAdmin {
    entity: AdminEntity::Enrollment,
    from: "enrollments e \
           JOIN students s ON s.id = e.student_id \
           JOIN courses c ON c.id = e.course_id",
    alias: "e",
    list_display: &[
        field("student", "s.nickname"),
        field("course", "c.title"),
        field("enrolled_at", "e.enrolled_at"),
        field("completed_at", "e.completed_at"),
    ],
    search_fields: &[
        field("student__nickname", "s.nickname"),
        field("course__title", "c.title"),
    ],
    list_filter: &[exact("course", "e.course_id")],
    readonly_fields: &["public_id", "enrolled_at"],
    ordering: &[],
    inlines: &[],
    exclude: &[],
};

pub static LESSON_PROGRESS_ADMIN: ModelAdmin = ModelAdmin {
    entity: AdminEntity::LessonProgress,
    from: "lesson_progress lp \
           JOIN students s ON s.id = lp.student_id \
           JOIN lessons l ON l.id = lp.lesson_id \
           JOIN modules m ON m.id = l.module_id",
    alias: "lp",
    list_display: &[
        field("student", "s.nickname"),
        field("lesson", "l.title"),
        field("completed_at", "lp.completed_at"),
    ],
    search_fields: &[
        field("student__nickname", "s.nickname"),
        field("lesson__title", "l.title"),
    ],
    list_filter: &[exact("lesson__module__course", "m.course_id")],
    readonly_fields: &["public_id", "completed_at"],
    ordering: &[],
    inlines: &[],
    exclude: &[],
};

pub static SUPPORT_TICKET_ADMIN: ModelAdmin = ModelAdmin {
    entity: AdminEntity::SupportTicket,
    from: "support_tickets t LEFT JOIN users u ON u.id = t.user_id",
    alias: "t",
    list_display: &[
        field("subject", "t.subject"),
        field("user", "u.email"),
        field("status", "t.status"),
        field("created_at", "t.created_at"),
    ],
    search_fields: &[
        field("subject", "t.subject"),
        field("message", "t.message"),
        field("user__email", "u.email"),
    ],
    list_filter: &[exact("status", "t.status"), by_date("created_at", "t.created_at")],
    readonly_fields: &["public_id", "created_at", "resolved_at"],
    ordering: &[field("-created_at", "t.created_at")],
    inlines: &[],
    exclude: &[],
};

pub fn registry() -> impl Iterator<Item = &'static ModelAdmin> {
    AdminEntity::ALL.iter().map(|e| e.admin())
}
