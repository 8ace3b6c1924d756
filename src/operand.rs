// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};

/// Raw, type-erased operand bundle of a rule.
///
/// The interpretation of the three values depends on the matcher the
/// operand is paired with: range matchers read `first`/`second` as bounds,
/// date matchers read `first` as epoch milliseconds (UTC), and playlist
/// membership matchers read `text` as the referenced view name, `first` as
/// the referenced list kind, and `second` as the referenced list ID.
///
/// Persisted verbatim as the three operand columns of a rule row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub first: i64,

    #[serde(default)]
    pub second: i64,
}

impl Operand {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            first: 0,
            second: 0,
        }
    }

    #[must_use]
    pub const fn first(first: i64) -> Self {
        Self {
            text: String::new(),
            first,
            second: 0,
        }
    }

    #[must_use]
    pub const fn range(first: i64, second: i64) -> Self {
        Self {
            text: String::new(),
            first,
            second,
        }
    }
}
