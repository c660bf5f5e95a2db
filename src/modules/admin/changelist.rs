//! Change-list queries: execute a [`ModelAdmin`] declaration.
//!
//! Search splits the input on whitespace. Every term must match at least one
//! search field (case-insensitive substring); terms combine with AND.
//! Filters must name a declared list filter.

use learnhub_core::{AppError, Page, PaginationParams};
use learnhub_db::{contains_pattern, map_db_error};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{instrument, warn};

use crate::modules::admin::config::{FilterKind, ModelAdmin};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeListQuery {
    pub search: Option<String>,
    /// `(field, value)` pairs, e.g. `("status", "resolved")`
    #[serde(default)]
    pub filters: Vec<(String, String)>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl ChangeListQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }
}

/// Relative ranges accepted by date filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    Past7Days,
    ThisMonth,
    ThisYear,
    HasDate,
    NoDate,
}

impl DateRange {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "today" => Some(DateRange::Today),
            "past_7_days" => Some(DateRange::Past7Days),
            "this_month" => Some(DateRange::ThisMonth),
            "this_year" => Some(DateRange::ThisYear),
            "has_date" => Some(DateRange::HasDate),
            "no_date" => Some(DateRange::NoDate),
            _ => None,
        }
    }

    fn condition(&self, expr: &str) -> String {
        let window = |start: &str, step: &str| {
            format!("({expr} >= {start} AND {expr} < {start} + INTERVAL '{step}')")
        };
        match self {
            DateRange::Today => window("date_trunc('day', NOW())", "1 day"),
            DateRange::Past7Days => format!(
                "({expr} >= date_trunc('day', NOW()) - INTERVAL '7 days' \
                 AND {expr} < date_trunc('day', NOW()) + INTERVAL '1 day')"
            ),
            DateRange::ThisMonth => window("date_trunc('month', NOW())", "1 month"),
            DateRange::ThisYear => window("date_trunc('year', NOW())", "1 year"),
            DateRange::HasDate => format!("{expr} IS NOT NULL"),
            DateRange::NoDate => format!("{expr} IS NULL"),
        }
    }
}

/// SQL for one change-list page. `binds` are text parameters `$1..$n`,
/// shared by both statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeListSql {
    pub count_sql: String,
    pub data_sql: String,
    pub binds: Vec<String>,
}

pub fn build(admin: &ModelAdmin, query: &ChangeListQuery) -> Result<ChangeListSql, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(search) = query.search.as_deref()
        && !admin.search_fields.is_empty()
    {
        for term in search.split_whitespace() {
            binds.push(contains_pattern(term));
            let n = binds.len();
            let any_field = admin
                .search_fields
                .iter()
                .map(|f| format!("{}::TEXT ILIKE ${n}", f.sql))
                .collect::<Vec<_>>()
                .join(" OR ");
            conditions.push(format!("({any_field})"));
        }
    }

    for (name, value) in &query.filters {
        let Some(filter) = admin.filter(name) else {
            warn!(entity = %admin.entity, filter = %name, "Rejected undeclared filter");
            return Err(AppError::validation(anyhow::anyhow!(
                "'{}' is not a filter of {}",
                name,
                admin.entity
            )));
        };

        match filter.kind {
            FilterKind::Exact => {
                binds.push(value.trim().to_string());
                conditions.push(format!("{}::TEXT = ${}", filter.field.sql, binds.len()));
            }
            FilterKind::Date => {
                let range = DateRange::parse(value).ok_or_else(|| {
                    AppError::validation(anyhow::anyhow!(
                        "'{}' is not a date range for {}",
                        value,
                        name
                    ))
                })?;
                conditions.push(range.condition(filter.field.sql));
            }
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let alias = admin.alias;
    let mut columns = vec![
        format!("'id', {alias}.id"),
        format!("'public_id', {alias}.public_id"),
    ];
    columns.extend(
        admin
            .list_display
            .iter()
            .map(|f| format!("'{}', {}", f.name, f.sql)),
    );

    let mut order: Vec<String> = admin
        .ordering
        .iter()
        .map(|f| match f.name.strip_prefix('-') {
            Some(_) => format!("{} DESC", f.sql),
            None => format!("{} ASC", f.sql),
        })
        .collect();
    order.push(format!("{alias}.id DESC"));

    let count_sql = format!("SELECT COUNT(*) FROM {}{}", admin.from, where_clause);
    let data_sql = format!(
        "SELECT json_build_object({})::TEXT FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        columns.join(", "),
        admin.from,
        where_clause,
        order.join(", "),
        query.pagination.limit(),
        query.pagination.offset()
    );

    Ok(ChangeListSql {
        count_sql,
        data_sql,
        binds,
    })
}

/// Runs a change-list query. Each row is a JSON object holding `id`,
/// `public_id` and the declared `list_display` fields.
#[instrument(skip(db, admin), fields(entity = %admin.entity))]
pub async fn changelist(
    db: &PgPool,
    admin: &ModelAdmin,
    query: &ChangeListQuery,
) -> Result<Page<Value>, AppError> {
    let sql = build(admin, query)?;

    let mut count_query = sqlx::query_scalar::<_, i64>(&sql.count_sql);
    for bind in &sql.binds {
        count_query = count_query.bind(bind);
    }
    let total = count_query.fetch_one(db).await.map_err(map_db_error)?;

    let mut data_query = sqlx::query_scalar::<_, String>(&sql.data_sql);
    for bind in &sql.binds {
        data_query = data_query.bind(bind);
    }
    let rows = data_query
        .fetch_all(db)
        .await
        .map_err(map_db_error)?
        .iter()
        .map(|raw| serde_json::from_str::<Value>(raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::internal(anyhow::anyhow!("Malformed change-list row: {}", e)))?;

    Ok(Page::new(rows, &query.pagination, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::admin::config::{
        COURSE_ADMIN, LESSON_ADMIN, MODULE_ADMIN, STUDENT_ADMIN, SUPPORT_TICKET_ADMIN, USER_ADMIN,
    };

    #[test]
    fn test_no_search_no_where() {
        let sql = build(&COURSE_ADMIN, &ChangeListQuery::default()).unwrap();
        assert_eq!(sql.count_sql, "SELECT COUNT(*) FROM courses c");
        assert!(sql.binds.is_empty());
        assert!(sql.data_sql.contains("ORDER BY c.id DESC LIMIT 25 OFFSET 0"));
    }

    #[test]
    fn test_each_search_term_ors_fields() {
        let sql = build(&STUDENT_ADMIN, &ChangeListQuery::search("ana  example")).unwrap();
        assert_eq!(sql.binds, vec!["%ana%", "%example%"]);
        assert!(sql.count_sql.ends_with(
            " WHERE (s.nickname::TEXT ILIKE $1 OR u.email::TEXT ILIKE $1) \
             AND (s.nickname::TEXT ILIKE $2 OR u.email::TEXT ILIKE $2)"
        ));
    }

    #[test]
    fn test_search_escapes_like_wildcards() {
        let sql = build(&USER_ADMIN, &ChangeListQuery::search("50%_off")).unwrap();
        assert_eq!(sql.binds, vec!["%50\\%\\_off%"]);
    }

    #[test]
    fn test_declared_ordering() {
        let sql = build(&USER_ADMIN, &ChangeListQuery::default()).unwrap();
        assert!(sql.data_sql.contains("ORDER BY u.email ASC, u.id DESC"));
    }

    #[test]
    fn test_default_ordering_precedes_key() {
        let sql = build(&MODULE_ADMIN, &ChangeListQuery::default()).unwrap();
        assert!(sql.data_sql.contains("ORDER BY m.course_id ASC, m.module_order ASC, m.id DESC"));

        let sql = build(&SUPPORT_TICKET_ADMIN, &ChangeListQuery::default()).unwrap();
        assert!(sql.data_sql.contains("ORDER BY t.created_at DESC, t.id DESC"));
    }

    #[test]
    fn test_display_columns_are_selected() {
        let sql = build(&SUPPORT_TICKET_ADMIN, &ChangeListQuery::default()).unwrap();
        assert!(sql.data_sql.starts_with(
            "SELECT json_build_object('id', t.id, 'public_id', t.public_id, \
             'subject', t.subject, 'user', u.email, 'status', t.status, \
             'created_at', t.created_at)::TEXT"
        ));
    }

    #[test]
    fn test_exact_filter_binds_value() {
        let query = ChangeListQuery::default().filter("lesson_type", "quiz");
        let sql = build(&LESSON_ADMIN, &query).unwrap();
        assert_eq!(sql.binds, vec!["quiz"]);
        assert!(sql.count_sql.ends_with(" WHERE l.lesson_type::TEXT = $1"));
    }

    #[test]
    fn test_search_and_filter_number_params_in_order() {
        let query = ChangeListQuery::search("intro").filter("module__course", "7");
        let sql = build(&LESSON_ADMIN, &query).unwrap();
        assert_eq!(sql.binds, vec!["%intro%", "7"]);
        assert!(sql.count_sql.contains("m.course_id::TEXT = $2"));
    }

    #[test]
    fn test_date_filter() {
        let query = ChangeListQuery::default().filter("published_at", "no_date");
        let sql = build(&COURSE_ADMIN, &query).unwrap();
        assert!(sql.binds.is_empty());
        assert!(sql.count_sql.ends_with(" WHERE c.published_at IS NULL"));

        let query = ChangeListQuery::default().filter("created_at", "this_month");
        let sql = build(&SUPPORT_TICKET_ADMIN, &query).unwrap();
        assert!(sql.count_sql.contains("t.created_at >= date_trunc('month', NOW())"));
    }

    #[test]
    fn test_unknown_date_range_is_rejected() {
        let query = ChangeListQuery::default().filter("published_at", "yesterday");
        assert!(build(&COURSE_ADMIN, &query).unwrap_err().is_validation());
    }

    #[test]
    fn test_undeclared_filter_is_rejected() {
        let query = ChangeListQuery::default().filter("title", "x");
        assert!(build(&COURSE_ADMIN, &query).unwrap_err().is_validation());

        // Users declare no filters at all
        let query = ChangeListQuery::default().filter("role", "admin");
        assert!(build(&USER_ADMIN, &query).unwrap_err().is_validation());
    }

    #[test]
    fn test_pagination_window() {
        let query = ChangeListQuery {
            pagination: PaginationParams::paged(3, 10),
            ..Default::default()
        };
        let sql = build(&COURSE_ADMIN, &query).unwrap();
        assert!(sql.data_sql.ends_with("LIMIT 10 OFFSET 20"));
    }

    #[test]
    fn test_date_range_parse() {
        assert_eq!(DateRange::parse("past_7_days"), Some(DateRange::Past7Days));
        assert_eq!(DateRange::parse("has_date"), Some(DateRange::HasDate));
        assert_eq!(DateRange::parse("tomorrow"), None);
    }
}
