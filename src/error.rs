// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

use crate::Field;

/// Failures surfaced by loading, validating, or persisting smart playlists.
///
/// Invalid operands are deliberately not an error: a rule built from data
/// that its matcher rejects is simply not valid and the playlist containing
/// it is refused before any I/O happens.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A persisted field ID does not correspond to any known field.
    #[error("unknown field id {field_id}")]
    UnknownField { field_id: i64 },

    /// A persisted matcher ID is not a member of the resolved field's
    /// matcher family.
    #[error("field {field} has no matcher with id {matcher_id}")]
    UnknownMatcher { field: Field, matcher_id: i64 },

    /// A persisted enum discriminant (combinator, sort order, ...) is
    /// out of range.
    #[error("unknown {what} id {id}")]
    UnknownId { what: &'static str, id: i64 },

    /// The playlist must not be compiled or persisted in its current state.
    #[error("invalid smart playlist: {reason}")]
    InvalidPlaylist { reason: &'static str },

    #[error(transparent)]
    Sqlite(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
