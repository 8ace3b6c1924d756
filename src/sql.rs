// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

use itertools::Itertools as _;

/// Column of the base relation that identifies a track.
pub(crate) const TRACK_ID_COLUMN: &str = r#""Track"."id""#;

/// Quotes an identifier for literal use in SQL text.
///
/// View names are arbitrary user text and must always be quoted.
#[must_use]
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a text value as a SQL string literal.
#[must_use]
pub(crate) fn quote_text_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Escapes `LIKE` wildcards in a user-entered value.
///
/// The compiled pattern must be used together with [`LIKE_ESCAPE_CLAUSE`].
#[must_use]
pub(crate) fn escape_like_pattern(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub(crate) const LIKE_ESCAPE_CLAUSE: &str = r"ESCAPE '\'";

/// Value-equality descriptor of an additional relation that must be joined
/// to the base relation to evaluate a rule or sort order.
///
/// Two rules that need the same join must produce *equal* templates so
/// that they collapse to a single join when deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinTemplate {
    /// Unquoted name of the joined table or view.
    joined: String,
    /// Key column within the joined relation.
    joined_key: String,
    /// Column of `Track` the key is matched against.
    track_column: String,
}

impl JoinTemplate {
    #[must_use]
    pub fn new(
        joined: impl Into<String>,
        joined_key: impl Into<String>,
        track_column: impl Into<String>,
    ) -> Self {
        Self {
            joined: joined.into(),
            joined_key: joined_key.into(),
            track_column: track_column.into(),
        }
    }

    #[must_use]
    pub fn joined(&self) -> &str {
        &self.joined
    }

    /// Renders the join clause.
    ///
    /// A `LEFT JOIN` keeps unmatched tracks visible to negated predicates.
    #[must_use]
    pub(crate) fn to_sql(&self) -> String {
        let joined = quote_identifier(&self.joined);
        let joined_key = quote_identifier(&self.joined_key);
        let track_column = quote_identifier(&self.track_column);
        format!(r#"LEFT JOIN {joined} ON {joined}.{joined_key} = "Track".{track_column}"#)
    }
}

/// Reusable description of a compiled smart playlist query.
///
/// Rendered as literal SQL text: views cannot carry bind parameters, so
/// all operand values are baked in as properly escaped literals and the
/// same text is valid both for direct execution and as a view body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub(crate) joins: Vec<JoinTemplate>,
    pub(crate) predicate: String,
    pub(crate) order_by: Option<String>,
    pub(crate) limit: Option<i64>,
}

impl SelectQuery {
    /// Distinct joins in application order.
    #[must_use]
    pub fn joins(&self) -> &[JoinTemplate] {
        &self.joins
    }

    #[must_use]
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Renders the query as a single `SELECT` statement.
    ///
    /// Rows are grouped by track ID in case a join fans out rows.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = format!(r#"SELECT {TRACK_ID_COLUMN} AS "id" FROM "Track""#);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }
        sql.push_str(" WHERE ");
        sql.push_str(&self.predicate);
        sql.push_str(&format!(" GROUP BY {TRACK_ID_COLUMN}"));
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }

    /// Wraps the query as a named view definition.
    #[must_use]
    pub fn to_view_sql(&self, view_name: &str) -> String {
        format!(
            "CREATE VIEW {view_name} AS {select}",
            view_name = quote_identifier(view_name),
            select = self.to_sql()
        )
    }
}

/// Joins predicates with the given separator, parenthesizing each one.
#[must_use]
pub(crate) fn fold_predicates(
    predicates: impl IntoIterator<Item = String>,
    separator: &str,
) -> String {
    predicates
        .into_iter()
        .map(|predicate| format!("({predicate})"))
        .join(separator)
}
