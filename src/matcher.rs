// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

use std::fmt;

use sqlx::types::time::OffsetDateTime;

use crate::{
    Operand,
    sql::{
        JoinTemplate, LIKE_ESCAPE_CLAUSE, TRACK_ID_COLUMN, escape_like_pattern, quote_identifier,
        quote_text_literal,
    },
};

/// Inclusive rating domain, in percent.
pub const RATING_MIN: i64 = 0;
pub const RATING_MAX: i64 = 100;

/// Smallest meaningful rating increment (half a star out of five).
pub const RATING_STEP: i64 = 10;

/// Half-second tolerance around duration comparisons.
///
/// Users enter whole seconds but track lengths are stored in milliseconds,
/// so naive equality would never match. The window is chosen such that the
/// point operators partition the domain without gaps or overlaps.
pub const DURATION_TOLERANCE_MILLIS: i64 = 499;

/// Upper bound for the unit count of relative date matchers.
// TODO: Confirm whether this cap was meant to be 365 (days in a year).
pub const DATE_UNIT_COUNT_MAX: i64 = 356;

/// Largest representable timestamp, 9999-12-31T23:59:59.999Z.
pub const TIMESTAMP_MILLIS_MAX: i64 = 253_402_300_799_999;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Unit of the relative date matchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateUnit {
    Days,
    Weeks,
    Months,
}

impl DateUnit {
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 2,
            Self::Months => 3,
        }
    }

    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Days),
            2 => Some(Self::Weeks),
            3 => Some(Self::Months),
            _ => None,
        }
    }

    /// SQLite date/time modifier for "count units before now".
    ///
    /// Weeks are expressed as days, months as calendar months.
    #[must_use]
    fn sqlite_modifier(self, count: i64) -> String {
        match self {
            Self::Days => format!("-{count} days"),
            Self::Weeks => format!("-{days} days", days = count * 7),
            Self::Months => format!("-{count} months"),
        }
    }
}

/// Comparison operators for text-valued columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextMatcher {
    Contains,
    DoesNotContain,
    Is,
    IsNot,
    BeginsWith,
    EndsWith,
}

impl TextMatcher {
    const fn ordinal(self) -> i64 {
        match self {
            Self::Contains => 0,
            Self::DoesNotContain => 1,
            Self::Is => 2,
            Self::IsNot => 3,
            Self::BeginsWith => 4,
            Self::EndsWith => 5,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::DoesNotContain => "does not contain",
            Self::Is => "is",
            Self::IsNot => "is not",
            Self::BeginsWith => "begins with",
            Self::EndsWith => "ends with",
        }
    }

    fn will_accept(data: &Operand) -> bool {
        !data.text.trim().is_empty()
    }

    fn sanitize(data: Operand) -> Operand {
        let text = data.text.trim().to_owned();
        Operand { text, ..data }
    }

    fn compile(self, column: &str, data: &Operand) -> String {
        let needle = escape_like_pattern(data.text.trim());
        let (pattern, negated) = match self {
            Self::Contains => (format!("%{needle}%"), false),
            Self::DoesNotContain => (format!("%{needle}%"), true),
            Self::Is => (needle, false),
            Self::IsNot => (needle, true),
            Self::BeginsWith => (format!("{needle}%"), false),
            Self::EndsWith => (format!("%{needle}"), false),
        };
        let literal = quote_text_literal(&pattern);
        let operator = if negated { "NOT LIKE" } else { "LIKE" };
        format!("{column} {operator} {literal} {LIKE_ESCAPE_CLAUSE}")
    }
}

/// Comparison operators shared by the integer-, rating-, and
/// duration-valued matcher families.
///
/// The value-type semantics (acceptance, sanitization, and tolerance
/// windows) are determined by the [`Matcher`] variant wrapping the
/// operator, not by the operator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberMatcher {
    Is,
    IsNot,
    IsGreaterThan,
    IsLessThan,
    IsInRange,
}

impl NumberMatcher {
    const fn ordinal(self) -> i64 {
        match self {
            Self::Is => 0,
            Self::IsNot => 1,
            Self::IsGreaterThan => 2,
            Self::IsLessThan => 3,
            Self::IsInRange => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::IsNot => "is not",
            Self::IsGreaterThan => "is greater than",
            Self::IsLessThan => "is less than",
            Self::IsInRange => "is in range",
        }
    }

    fn accepts_integer(self, data: &Operand) -> bool {
        match self {
            Self::IsInRange => data.first <= data.second,
            _ => true,
        }
    }

    fn sanitize_integer(self, data: Operand) -> Operand {
        match self {
            // An empty range is widened by one minimal step.
            Self::IsInRange if data.second < data.first => Operand {
                second: data.first.saturating_add(1),
                ..data
            },
            _ => data,
        }
    }

    fn compile_integer(self, column: &str, data: &Operand) -> String {
        let Operand { first, second, .. } = data;
        match self {
            Self::Is => format!("{column} = {first}"),
            Self::IsNot => format!("{column} <> {first}"),
            Self::IsGreaterThan => format!("{column} > {first}"),
            Self::IsLessThan => format!("{column} < {first}"),
            Self::IsInRange => format!("{column} BETWEEN {first} AND {second}"),
        }
    }

    fn accepts_rating(self, data: &Operand) -> bool {
        match self {
            Self::IsInRange => {
                (RATING_MIN..=RATING_MAX - RATING_STEP).contains(&data.first)
                    && data.second >= data.first + RATING_STEP
                    && data.second <= RATING_MAX
            }
            _ => (RATING_MIN..=RATING_MAX).contains(&data.first),
        }
    }

    fn sanitize_rating(self, data: Operand) -> Operand {
        match self {
            Self::IsInRange => {
                // The high bound stays at least one rating step above the
                // (re-clamped) low bound.
                let first = data.first.clamp(RATING_MIN, RATING_MAX - RATING_STEP);
                let second = data.second.clamp(first + RATING_STEP, RATING_MAX);
                Operand {
                    first,
                    second,
                    ..data
                }
            }
            _ => Operand {
                first: data.first.clamp(RATING_MIN, RATING_MAX),
                ..data
            },
        }
    }

    fn accepts_duration(self, data: &Operand) -> bool {
        match self {
            Self::IsInRange => 0 <= data.first && data.first <= data.second,
            _ => data.first >= 0,
        }
    }

    fn sanitize_duration(self, data: Operand) -> Operand {
        let first = data.first.max(0);
        let second = match self {
            Self::IsInRange => data.second.max(first),
            _ => data.second,
        };
        Operand {
            first,
            second,
            ..data
        }
    }

    fn compile_duration(self, column: &str, data: &Operand) -> String {
        let Operand { first, second, .. } = data;
        let low = first.saturating_sub(DURATION_TOLERANCE_MILLIS);
        let high = first.saturating_add(DURATION_TOLERANCE_MILLIS);
        match self {
            Self::Is => format!("{column} BETWEEN {low} AND {high}"),
            Self::IsNot => format!("{column} NOT BETWEEN {low} AND {high}"),
            Self::IsGreaterThan => format!("{column} > {high}"),
            Self::IsLessThan => format!("{column} < {low}"),
            Self::IsInRange => format!(
                "{column} BETWEEN {low} AND {high}",
                high = second.saturating_add(DURATION_TOLERANCE_MILLIS)
            ),
        }
    }
}

/// Comparison operators for date-valued columns (epoch milliseconds, UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateMatcher {
    Is,
    IsNot,
    IsAfter,
    IsBefore,
    InTheLast,
    NotInTheLast,
    IsInRange,
}

impl DateMatcher {
    const fn ordinal(self) -> i64 {
        match self {
            Self::Is => 0,
            Self::IsNot => 1,
            Self::IsAfter => 2,
            Self::IsBefore => 3,
            Self::InTheLast => 4,
            Self::NotInTheLast => 5,
            Self::IsInRange => 6,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::IsNot => "is not",
            Self::IsAfter => "is after",
            Self::IsBefore => "is before",
            Self::InTheLast => "in the last",
            Self::NotInTheLast => "not in the last",
            Self::IsInRange => "is in range",
        }
    }

    fn will_accept(self, data: &Operand) -> bool {
        let in_domain = |timestamp: i64| (0..=TIMESTAMP_MILLIS_MAX).contains(&timestamp);
        match self {
            Self::InTheLast | Self::NotInTheLast => {
                (1..=DATE_UNIT_COUNT_MAX).contains(&data.first)
                    && DateUnit::from_id(data.second).is_some()
            }
            Self::IsInRange => {
                in_domain(data.first) && in_domain(data.second) && data.first <= data.second
            }
            _ => in_domain(data.first),
        }
    }

    fn sanitize(self, data: Operand) -> Operand {
        match self {
            Self::InTheLast | Self::NotInTheLast => {
                let first = data.first.clamp(1, DATE_UNIT_COUNT_MAX);
                let second = match DateUnit::from_id(data.second) {
                    Some(unit) => unit.id(),
                    None => DateUnit::Days.id(),
                };
                Operand {
                    first,
                    second,
                    ..data
                }
            }
            Self::IsInRange => {
                let first = data.first.clamp(0, TIMESTAMP_MILLIS_MAX);
                let second = data.second.clamp(first, TIMESTAMP_MILLIS_MAX);
                Operand {
                    first,
                    second,
                    ..data
                }
            }
            _ => Operand {
                first: data.first.clamp(0, TIMESTAMP_MILLIS_MAX),
                ..data
            },
        }
    }

    fn compile(self, column: &str, data: &Operand) -> String {
        match self {
            Self::Is => {
                let (start, end) = utc_day_bounds(data.first);
                format!("{column} BETWEEN {start} AND {end}")
            }
            Self::IsNot => {
                let (start, end) = utc_day_bounds(data.first);
                format!("{column} NOT BETWEEN {start} AND {end}")
            }
            Self::IsAfter => {
                let (_, end) = utc_day_bounds(data.first);
                format!("{column} > {end}")
            }
            Self::IsBefore => {
                let (start, _) = utc_day_bounds(data.first);
                format!("{column} < {start}")
            }
            Self::InTheLast => {
                format!("{column} >= {origin}", origin = relative_origin_sql(data))
            }
            Self::NotInTheLast => {
                format!("{column} < {origin}", origin = relative_origin_sql(data))
            }
            Self::IsInRange => {
                let (start, _) = utc_day_bounds(data.first);
                let (_, end) = utc_day_bounds(data.second);
                format!("{column} BETWEEN {start} AND {end}")
            }
        }
    }
}

/// Start and end of the UTC day containing the given instant, inclusive.
///
/// # Panics
///
/// Panics if the timestamp is outside the representable range. Guarded by
/// [`DateMatcher::will_accept`].
fn utc_day_bounds(timestamp_millis: i64) -> (i64, i64) {
    let nanos = i128::from(timestamp_millis) * 1_000_000;
    let instant =
        OffsetDateTime::from_unix_timestamp_nanos(nanos).expect("timestamp within supported range");
    let start_of_day = instant.date().midnight().assume_utc();
    let start = i64::try_from(start_of_day.unix_timestamp_nanos() / 1_000_000)
        .expect("timestamp within supported range");
    (start, start + MILLIS_PER_DAY - 1)
}

/// SQL expression for "now minus the relative offset", in epoch milliseconds.
///
/// Evaluated by the database at query time, so a persisted view stays
/// relative to the moment it is queried.
fn relative_origin_sql(data: &Operand) -> String {
    let unit = DateUnit::from_id(data.second).unwrap_or(DateUnit::Days);
    format!(
        "(CAST(strftime('%s', 'now', '{modifier}') AS INTEGER) * 1000)",
        modifier = unit.sqlite_modifier(data.first)
    )
}

/// Storage kind of a playlist referenced by a membership rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaylistKind {
    /// Manually ordered list with explicit entries.
    Plain,
    /// Rule-derived list backed by a materialized view.
    Smart,
}

impl PlaylistKind {
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Plain => 0,
            Self::Smart => 1,
        }
    }

    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Self::Plain),
            1 => Some(Self::Smart),
            _ => None,
        }
    }
}

/// Membership test against another playlist.
///
/// The operand encodes the referenced playlist as a triple: `text` holds
/// its display/view name, `first` its [`PlaylistKind`], and `second` its
/// numeric ID. The triple round-trips through persistence unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaylistMatcher {
    Is,
    IsNot,
}

impl PlaylistMatcher {
    const fn ordinal(self) -> i64 {
        match self {
            Self::Is => 0,
            Self::IsNot => 1,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::IsNot => "is not",
        }
    }

    fn will_accept(data: &Operand) -> bool {
        let Some(kind) = PlaylistKind::from_id(data.first) else {
            return false;
        };
        if data.second <= 0 {
            return false;
        }
        match kind {
            PlaylistKind::Plain => true,
            // The join target is the referenced view name.
            PlaylistKind::Smart => !data.text.trim().is_empty(),
        }
    }

    fn sanitize(data: Operand) -> Operand {
        let text = data.text.trim().to_owned();
        let first = match PlaylistKind::from_id(data.first) {
            Some(kind) => kind.id(),
            None => PlaylistKind::Plain.id(),
        };
        Operand {
            text,
            first,
            ..data
        }
    }

    fn compile(self, data: &Operand) -> String {
        match PlaylistKind::from_id(data.first).unwrap_or(PlaylistKind::Plain) {
            PlaylistKind::Plain => {
                let operator = match self {
                    Self::Is => "IN",
                    Self::IsNot => "NOT IN",
                };
                format!(
                    r#"{TRACK_ID_COLUMN} {operator} (SELECT "trackId" FROM "PlaylistEntity" WHERE "listId" = {list_id})"#,
                    list_id = data.second
                )
            }
            PlaylistKind::Smart => {
                let view = quote_identifier(data.text.trim());
                let test = match self {
                    Self::Is => "IS NOT NULL",
                    Self::IsNot => "IS NULL",
                };
                format!(r#"{view}."id" {test}"#)
            }
        }
    }

    fn join_template(data: &Operand) -> Option<JoinTemplate> {
        match PlaylistKind::from_id(data.first) {
            Some(PlaylistKind::Smart) => Some(JoinTemplate::new(data.text.trim(), "id", "id")),
            _ => None,
        }
    }
}

/// A comparison operator bound to a column value type.
///
/// Matchers are stateless values; two rules referring to the same matcher
/// hold equal copies, and containment in a field's matcher family is
/// decided by the stable [`id`](Self::id) rather than by instance identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Matcher {
    Text(TextMatcher),
    Integer(NumberMatcher),
    Duration(NumberMatcher),
    Date(DateMatcher),
    Playlist(PlaylistMatcher),
    Rating(NumberMatcher),
}

impl Matcher {
    /// Stable small integer ID, persisted in rule rows.
    ///
    /// Each family occupies its own decade so that IDs stay unique across
    /// families even though the operator enums are shared.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Text(matcher) => 1 + matcher.ordinal(),
            Self::Integer(matcher) => 10 + matcher.ordinal(),
            Self::Duration(matcher) => 20 + matcher.ordinal(),
            Self::Date(matcher) => 30 + matcher.ordinal(),
            Self::Playlist(matcher) => 40 + matcher.ordinal(),
            Self::Rating(matcher) => 50 + matcher.ordinal(),
        }
    }

    /// User-facing display string.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text(matcher) => matcher.label(),
            Self::Integer(matcher) | Self::Duration(matcher) | Self::Rating(matcher) => {
                matcher.label()
            }
            Self::Date(matcher) => matcher.label(),
            Self::Playlist(matcher) => matcher.label(),
        }
    }

    /// Checks whether the operand is structurally usable for this matcher.
    #[must_use]
    pub fn will_accept(self, data: &Operand) -> bool {
        match self {
            Self::Text(_) => TextMatcher::will_accept(data),
            Self::Integer(matcher) => matcher.accepts_integer(data),
            Self::Duration(matcher) => matcher.accepts_duration(data),
            Self::Date(matcher) => matcher.will_accept(data),
            Self::Playlist(_) => PlaylistMatcher::will_accept(data),
            Self::Rating(matcher) => matcher.accepts_rating(data),
        }
    }

    /// Repairs invalid operand values by clamping them to the nearest
    /// valid value. Idempotent.
    ///
    /// Values that cannot be repaired without inventing content (blank
    /// text, a missing playlist reference) are left as they are; such an
    /// operand remains unaccepted and the rule stays invalid.
    #[must_use]
    pub fn sanitize(self, data: Operand) -> Operand {
        match self {
            Self::Text(_) => TextMatcher::sanitize(data),
            Self::Integer(matcher) => matcher.sanitize_integer(data),
            Self::Duration(matcher) => matcher.sanitize_duration(data),
            Self::Date(matcher) => matcher.sanitize(data),
            Self::Playlist(_) => PlaylistMatcher::sanitize(data),
            Self::Rating(matcher) => matcher.sanitize_rating(data),
        }
    }

    /// Compiles the matcher plus a target column into a boolean SQL
    /// predicate with all operand values rendered as escaped literals.
    #[must_use]
    pub fn compile(self, column: &str, data: &Operand) -> String {
        match self {
            Self::Text(matcher) => matcher.compile(column, data),
            Self::Integer(matcher) | Self::Rating(matcher) => matcher.compile_integer(column, data),
            Self::Duration(matcher) => matcher.compile_duration(column, data),
            Self::Date(matcher) => matcher.compile(column, data),
            Self::Playlist(matcher) => matcher.compile(data),
        }
    }

    /// Additional relation required to evaluate this matcher, if any.
    ///
    /// Only playlist membership matchers contribute one, and only when the
    /// referenced playlist is itself rule-based.
    #[must_use]
    pub(crate) fn join_template(self, data: &Operand) -> Option<JoinTemplate> {
        match self {
            Self::Playlist(_) => PlaylistMatcher::join_template(data),
            _ => None,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
