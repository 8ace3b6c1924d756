// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

#![doc = include_str!("../README.md")]

mod db_id;

mod error;
pub use self::error::{Error, Result};

mod operand;
pub use self::operand::Operand;

mod sql;
pub use self::sql::{JoinTemplate, SelectQuery};

mod matcher;
pub use self::matcher::{
    DATE_UNIT_COUNT_MAX, DURATION_TOLERANCE_MILLIS, DateMatcher, DateUnit, Matcher, NumberMatcher,
    PlaylistKind, PlaylistMatcher, RATING_MAX, RATING_MIN, RATING_STEP, TIMESTAMP_MILLIS_MAX,
    TextMatcher,
};

mod field;
pub use self::field::Field;

mod rule;
pub use self::rule::{Rule, RuleId, RuleRecord};

mod playlist;
pub use self::playlist::{
    AnyOrAll, EndOfListAction, MEDIA_TYPE_AUDIO, PlaylistRecord, RESERVED_NAME_PREFIX,
    SmartPlaylist, SmartPlaylistId, SortBy,
};

mod repo;
pub use self::repo::{
    NO_LIMIT, SmartPlaylistRow, SmartPlaylistRuleRow, TrackId, create_schema, query_track_ids,
};
