// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

use itertools::Itertools as _;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, Rule, RuleRecord,
    sql::{JoinTemplate, SelectQuery, fold_predicates},
};

crate::db_id!(SmartPlaylistId);

/// Value of `Track.mediaType` for audio rows.
pub const MEDIA_TYPE_AUDIO: i64 = 1;

/// Prefix reserved by SQLite for internal schema objects.
///
/// A playlist title becomes the name of its materialized view and must
/// not collide with that namespace.
pub const RESERVED_NAME_PREFIX: &str = "sqlite_";

/// Top-level combinator applied across a playlist's rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnyOrAll {
    /// Conjunction: every rule must match.
    #[default]
    All,
    /// Disjunction: at least one rule must match.
    Any,
}

impl AnyOrAll {
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::All => 0,
            Self::Any => 1,
        }
    }

    pub fn from_id(id: i64) -> Result<Self> {
        match id {
            0 => Ok(Self::All),
            1 => Ok(Self::Any),
            _ => Err(Error::UnknownId {
                what: "combinator",
                id,
            }),
        }
    }

    /// Folds the rules' individual predicates into one predicate.
    ///
    /// Both operators are associative and commutative, so the fold result
    /// does not depend on rule order.
    #[must_use]
    pub(crate) fn fold(self, predicates: impl IntoIterator<Item = String>) -> String {
        let separator = match self {
            Self::All => " AND ",
            Self::Any => " OR ",
        };
        fold_predicates(predicates, separator)
    }
}

/// Ordering strategy applied to a playlist's result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortBy {
    #[default]
    None,
    Random,
    Title,
    Album,
    AlbumArtist,
    Artist,
    Genre,
    HighestRating,
    LowestRating,
    MostOftenPlayed,
    LeastOftenPlayed,
    MostRecentlyAdded,
    LeastRecentlyAdded,
    MostRecentlyPlayed,
    LeastRecentlyPlayed,
}

impl SortBy {
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Random => 1,
            Self::Title => 2,
            Self::Album => 3,
            Self::AlbumArtist => 4,
            Self::Artist => 5,
            Self::Genre => 6,
            Self::HighestRating => 7,
            Self::LowestRating => 8,
            Self::MostOftenPlayed => 9,
            Self::LeastOftenPlayed => 10,
            Self::MostRecentlyAdded => 11,
            Self::LeastRecentlyAdded => 12,
            Self::MostRecentlyPlayed => 13,
            Self::LeastRecentlyPlayed => 14,
        }
    }

    pub fn from_id(id: i64) -> Result<Self> {
        let sort_by = match id {
            0 => Self::None,
            1 => Self::Random,
            2 => Self::Title,
            3 => Self::Album,
            4 => Self::AlbumArtist,
            5 => Self::Artist,
            6 => Self::Genre,
            7 => Self::HighestRating,
            8 => Self::LowestRating,
            9 => Self::MostOftenPlayed,
            10 => Self::LeastOftenPlayed,
            11 => Self::MostRecentlyAdded,
            12 => Self::LeastRecentlyAdded,
            13 => Self::MostRecentlyPlayed,
            14 => Self::LeastRecentlyPlayed,
            _ => {
                return Err(Error::UnknownId {
                    what: "sort order",
                    id,
                });
            }
        };
        debug_assert_eq!(sort_by.id(), id);
        Ok(sort_by)
    }

    #[must_use]
    pub(crate) const fn order_by(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Random => Some("RANDOM()"),
            Self::Title => Some(r#""Track"."title" ASC"#),
            Self::Album => Some(r#""Album"."title" ASC"#),
            Self::AlbumArtist => Some(r#""AlbumArtist"."name" ASC"#),
            Self::Artist => Some(r#""Artist"."name" ASC"#),
            Self::Genre => Some(r#""Genre"."name" ASC"#),
            Self::HighestRating => Some(r#""Track"."rating" DESC"#),
            Self::LowestRating => Some(r#""Track"."rating" ASC"#),
            Self::MostOftenPlayed => Some(r#""Track"."playCount" DESC"#),
            Self::LeastOftenPlayed => Some(r#""Track"."playCount" ASC"#),
            Self::MostRecentlyAdded => Some(r#""Track"."dateAdded" DESC"#),
            Self::LeastRecentlyAdded => Some(r#""Track"."dateAdded" ASC"#),
            Self::MostRecentlyPlayed => Some(r#""Track"."lastPlayed" DESC"#),
            Self::LeastRecentlyPlayed => Some(r#""Track"."lastPlayed" ASC"#),
        }
    }

    /// The relation join needed to evaluate the ordering column, if any.
    ///
    /// Value-equal to the corresponding field's join so that a rule and
    /// the sort order collapse to a single join.
    #[must_use]
    pub(crate) fn join_template(self) -> Option<JoinTemplate> {
        match self {
            Self::Album => Some(JoinTemplate::new("Album", "id", "albumId")),
            Self::AlbumArtist => Some(JoinTemplate::new("AlbumArtist", "id", "albumArtistId")),
            Self::Artist => Some(JoinTemplate::new("Artist", "id", "artistId")),
            Self::Genre => Some(JoinTemplate::new("Genre", "id", "genreId")),
            _ => None,
        }
    }
}

/// What the player should do when playback reaches the end of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EndOfListAction {
    /// Defer to the outer queue policy.
    #[default]
    Defer,
    Repeat,
    Stop,
}

impl EndOfListAction {
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Defer => 0,
            Self::Repeat => 1,
            Self::Stop => 2,
        }
    }

    pub fn from_id(id: i64) -> Result<Self> {
        match id {
            0 => Ok(Self::Defer),
            1 => Ok(Self::Repeat),
            2 => Ok(Self::Stop),
            _ => Err(Error::UnknownId {
                what: "end-of-list action",
                id,
            }),
        }
    }
}

/// A named, rule-derived dynamic subset of the media library.
///
/// Created and edited entirely in memory; persisted on explicit save,
/// which replaces the full rule set and recreates the materialized view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartPlaylist {
    pub id: SmartPlaylistId,
    pub title: String,
    pub combinator: AnyOrAll,
    /// Maximum number of rows, `None` for no limit.
    pub limit: Option<i64>,
    pub sort_by: SortBy,
    pub end_of_list_action: EndOfListAction,
    pub rules: Vec<Rule>,
}

impl SmartPlaylist {
    /// Checks whether the playlist may be compiled and persisted.
    ///
    /// See [`validate`](Self::validate) for the reason when it may not.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> Result<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidPlaylist {
                reason: "blank title",
            });
        }
        if title.to_ascii_lowercase().starts_with(RESERVED_NAME_PREFIX) {
            return Err(Error::InvalidPlaylist {
                reason: "title starts with a reserved prefix",
            });
        }
        if self.rules.is_empty() {
            return Err(Error::InvalidPlaylist {
                reason: "no rules",
            });
        }
        if !self.rules.iter().all(Rule::is_valid) {
            return Err(Error::InvalidPlaylist {
                reason: "invalid rule",
            });
        }
        Ok(())
    }

    /// Name of the playlist's materialized view.
    #[must_use]
    pub fn view_name(&self) -> &str {
        self.title.trim()
    }

    /// Compiles the rule list into one executable query description.
    ///
    /// Gathers the join templates of all rules plus the sort order,
    /// deduplicated by value equality in first-seen order, folds the rule
    /// predicates with the combinator, and applies grouping, ordering, and
    /// the row limit. Pure and synchronous.
    ///
    /// # Panics
    ///
    /// Panics if the playlist is not [valid](Self::is_valid). Compiling an
    /// invalid playlist is a programming error, not a recoverable case.
    #[must_use]
    pub fn compile(&self) -> SelectQuery {
        assert!(self.is_valid(), "compiling an invalid smart playlist");
        let joins = self
            .rules
            .iter()
            .filter_map(Rule::make_join_template)
            .chain(self.sort_by.join_template())
            .unique()
            .collect();
        let folded = self
            .combinator
            .fold(self.rules.iter().map(Rule::make_where_clause));
        let predicate = format!(r#""Track"."mediaType" = {MEDIA_TYPE_AUDIO} AND ({folded})"#);
        SelectQuery {
            joins,
            predicate,
            order_by: self.sort_by.order_by().map(str::to_owned),
            limit: self.limit.filter(|limit| *limit > 0),
        }
    }

    /// Compiles the playlist and wraps it as a named view definition.
    #[must_use]
    pub fn to_view_sql(&self) -> String {
        self.compile().to_view_sql(self.view_name())
    }

    #[must_use]
    pub fn to_record(&self) -> PlaylistRecord {
        PlaylistRecord {
            id: self.id.get(),
            title: self.title.clone(),
            combinator_id: self.combinator.id(),
            limit: self.limit,
            sort_by_id: self.sort_by.id(),
            end_of_list_action_id: self.end_of_list_action.id(),
            rules: self.rules.iter().map(Rule::to_record).collect(),
        }
    }

    pub fn from_record(record: PlaylistRecord) -> Result<Self> {
        let PlaylistRecord {
            id,
            title,
            combinator_id,
            limit,
            sort_by_id,
            end_of_list_action_id,
            rules,
        } = record;
        Ok(Self {
            id: SmartPlaylistId::new(id),
            title,
            combinator: AnyOrAll::from_id(combinator_id)?,
            limit,
            sort_by: SortBy::from_id(sort_by_id)?,
            end_of_list_action: EndOfListAction::from_id(end_of_list_action_id)?,
            rules: rules
                .into_iter()
                .map(Rule::from_record)
                .collect::<Result<_>>()?,
        })
    }
}

/// Plain serializable shape of a [`SmartPlaylist`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub combinator_id: i64,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort_by_id: i64,
    #[serde(default)]
    pub end_of_list_action_id: i64,
    pub rules: Vec<RuleRecord>,
}
