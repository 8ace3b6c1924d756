// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};

use crate::{Error, Field, Matcher, Operand, Result, sql::JoinTemplate};

crate::db_id!(RuleId);

/// One filter condition of a smart playlist.
///
/// Constructed invariant: the matcher belongs to the field's matcher
/// family. An operand the matcher rejects does not prevent construction;
/// it only makes the rule [not valid](Self::is_valid).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    id: RuleId,
    field: Field,
    matcher: Matcher,
    data: Operand,
}

impl Rule {
    pub fn new(id: RuleId, field: Field, matcher: Matcher, data: Operand) -> Result<Self> {
        if !field.matchers().contains(&matcher) {
            return Err(Error::UnknownMatcher {
                field,
                matcher_id: matcher.id(),
            });
        }
        Ok(Self {
            id,
            field,
            matcher,
            data,
        })
    }

    /// Reconstructs a rule from its persisted IDs.
    pub fn from_stored(id: RuleId, field_id: i64, matcher_id: i64, data: Operand) -> Result<Self> {
        let field = Field::from_id(field_id)?;
        let matcher = field.reify_matcher(matcher_id)?;
        Ok(Self {
            id,
            field,
            matcher,
            data,
        })
    }

    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    #[must_use]
    pub const fn field(&self) -> Field {
        self.field
    }

    #[must_use]
    pub const fn matcher(&self) -> Matcher {
        self.matcher
    }

    #[must_use]
    pub const fn data(&self) -> &Operand {
        &self.data
    }

    /// Replaces the operand, sanitized by the rule's matcher.
    #[must_use]
    pub fn with_data(self, data: Operand) -> Self {
        let data = self.matcher.sanitize(data);
        Self { data, ..self }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.field.matchers().contains(&self.matcher) && self.matcher.will_accept(&self.data)
    }

    #[must_use]
    pub fn make_where_clause(&self) -> String {
        self.field.make_where_clause(self.matcher, &self.data)
    }

    #[must_use]
    pub(crate) fn make_join_template(&self) -> Option<JoinTemplate> {
        self.field.make_join_template(self.matcher, &self.data)
    }

    /// The rule's identity for set comparison, ignoring the row ID.
    ///
    /// Persisted rules are addressed as an unordered set; bulk reinserts
    /// assign fresh row IDs.
    #[must_use]
    pub fn contents(&self) -> (Field, Matcher, &Operand) {
        (self.field, self.matcher, &self.data)
    }

    #[must_use]
    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            id: self.id.get(),
            field_id: self.field.id(),
            matcher_id: self.matcher.id(),
            text: self.data.text.clone(),
            first: self.data.first,
            second: self.data.second,
        }
    }

    pub fn from_record(record: RuleRecord) -> Result<Self> {
        let RuleRecord {
            id,
            field_id,
            matcher_id,
            text,
            first,
            second,
        } = record;
        Self::from_stored(
            RuleId::new(id),
            field_id,
            matcher_id,
            Operand {
                text,
                first,
                second,
            },
        )
    }
}

/// Plain serializable shape of a [`Rule`], independent of any UI framework.
///
/// Matches the persisted rule row column for column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default)]
    pub id: i64,
    pub field_id: i64,
    pub matcher_id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub first: i64,
    #[serde(default)]
    pub second: i64,
}
