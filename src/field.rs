// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

use std::fmt;

use crate::{
    DateMatcher, Error, Matcher, NumberMatcher, Operand, PlaylistMatcher, Result, TextMatcher,
    sql::JoinTemplate,
};

const TEXT_MATCHERS: &[Matcher] = &[
    Matcher::Text(TextMatcher::Contains),
    Matcher::Text(TextMatcher::DoesNotContain),
    Matcher::Text(TextMatcher::Is),
    Matcher::Text(TextMatcher::IsNot),
    Matcher::Text(TextMatcher::BeginsWith),
    Matcher::Text(TextMatcher::EndsWith),
];

const INTEGER_MATCHERS: &[Matcher] = &[
    Matcher::Integer(NumberMatcher::Is),
    Matcher::Integer(NumberMatcher::IsNot),
    Matcher::Integer(NumberMatcher::IsGreaterThan),
    Matcher::Integer(NumberMatcher::IsLessThan),
    Matcher::Integer(NumberMatcher::IsInRange),
];

const RATING_MATCHERS: &[Matcher] = &[
    Matcher::Rating(NumberMatcher::Is),
    Matcher::Rating(NumberMatcher::IsNot),
    Matcher::Rating(NumberMatcher::IsGreaterThan),
    Matcher::Rating(NumberMatcher::IsLessThan),
    Matcher::Rating(NumberMatcher::IsInRange),
];

const DURATION_MATCHERS: &[Matcher] = &[
    Matcher::Duration(NumberMatcher::Is),
    Matcher::Duration(NumberMatcher::IsNot),
    Matcher::Duration(NumberMatcher::IsGreaterThan),
    Matcher::Duration(NumberMatcher::IsLessThan),
    Matcher::Duration(NumberMatcher::IsInRange),
];

const DATE_MATCHERS: &[Matcher] = &[
    Matcher::Date(DateMatcher::Is),
    Matcher::Date(DateMatcher::IsNot),
    Matcher::Date(DateMatcher::IsAfter),
    Matcher::Date(DateMatcher::IsBefore),
    Matcher::Date(DateMatcher::InTheLast),
    Matcher::Date(DateMatcher::NotInTheLast),
    Matcher::Date(DateMatcher::IsInRange),
];

const PLAYLIST_MATCHERS: &[Matcher] = &[
    Matcher::Playlist(PlaylistMatcher::Is),
    Matcher::Playlist(PlaylistMatcher::IsNot),
];

/// A filterable track attribute.
///
/// Each field fixes its legal matcher family, the column it is evaluated
/// against, and the relation join (if any) needed to reach that column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Album,
    Artist,
    AlbumArtist,
    Genre,
    Composer,
    Comment,
    Rating,
    Year,
    DateAdded,
    PlayCount,
    LastPlayed,
    SkipCount,
    LastSkipped,
    Duration,
    DiscCount,
    Playlist,
}

impl Field {
    /// Stable small integer ID, persisted in rule rows.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Title => 1,
            Self::Album => 2,
            Self::Artist => 3,
            Self::AlbumArtist => 4,
            Self::Genre => 5,
            Self::Composer => 6,
            Self::Comment => 7,
            Self::Rating => 8,
            Self::Year => 9,
            Self::DateAdded => 10,
            Self::PlayCount => 11,
            Self::LastPlayed => 12,
            Self::SkipCount => 13,
            Self::LastSkipped => 14,
            Self::Duration => 15,
            Self::DiscCount => 16,
            Self::Playlist => 17,
        }
    }

    /// Resolves a persisted field ID.
    pub fn from_id(field_id: i64) -> Result<Self> {
        let field = match field_id {
            1 => Self::Title,
            2 => Self::Album,
            3 => Self::Artist,
            4 => Self::AlbumArtist,
            5 => Self::Genre,
            6 => Self::Composer,
            7 => Self::Comment,
            8 => Self::Rating,
            9 => Self::Year,
            10 => Self::DateAdded,
            11 => Self::PlayCount,
            12 => Self::LastPlayed,
            13 => Self::SkipCount,
            14 => Self::LastSkipped,
            15 => Self::Duration,
            16 => Self::DiscCount,
            17 => Self::Playlist,
            _ => return Err(Error::UnknownField { field_id }),
        };
        debug_assert_eq!(field.id(), field_id);
        Ok(field)
    }

    /// User-facing display string.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Album => "Album",
            Self::Artist => "Artist",
            Self::AlbumArtist => "Album Artist",
            Self::Genre => "Genre",
            Self::Composer => "Composer",
            Self::Comment => "Comment",
            Self::Rating => "Rating",
            Self::Year => "Year",
            Self::DateAdded => "Date Added",
            Self::PlayCount => "Play Count",
            Self::LastPlayed => "Last Played",
            Self::SkipCount => "Skip Count",
            Self::LastSkipped => "Last Skipped",
            Self::Duration => "Duration",
            Self::DiscCount => "Disc Count",
            Self::Playlist => "Playlist",
        }
    }

    /// The matchers that may legally be paired with this field.
    #[must_use]
    pub const fn matchers(self) -> &'static [Matcher] {
        match self {
            Self::Title
            | Self::Album
            | Self::Artist
            | Self::AlbumArtist
            | Self::Genre
            | Self::Composer
            | Self::Comment => TEXT_MATCHERS,
            Self::Rating => RATING_MATCHERS,
            Self::Year | Self::PlayCount | Self::SkipCount | Self::DiscCount => INTEGER_MATCHERS,
            Self::DateAdded | Self::LastPlayed | Self::LastSkipped => DATE_MATCHERS,
            Self::Duration => DURATION_MATCHERS,
            Self::Playlist => PLAYLIST_MATCHERS,
        }
    }

    /// The column the field's predicates are evaluated against.
    ///
    /// The playlist field has no bound column of its own; its matchers
    /// compile against the referenced list instead.
    #[must_use]
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Title => r#""Track"."title""#,
            Self::Album => r#""Album"."title""#,
            Self::Artist => r#""Artist"."name""#,
            Self::AlbumArtist => r#""AlbumArtist"."name""#,
            Self::Genre => r#""Genre"."name""#,
            Self::Composer => r#""Track"."composer""#,
            Self::Comment => r#""Track"."comment""#,
            Self::Rating => r#""Track"."rating""#,
            Self::Year => r#""Track"."year""#,
            Self::DateAdded => r#""Track"."dateAdded""#,
            Self::PlayCount => r#""Track"."playCount""#,
            Self::LastPlayed => r#""Track"."lastPlayed""#,
            Self::SkipCount => r#""Track"."skipCount""#,
            Self::LastSkipped => r#""Track"."lastSkipped""#,
            Self::Duration => r#""Track"."length""#,
            Self::DiscCount => r#""Track"."discCount""#,
            Self::Playlist => r#""Track"."id""#,
        }
    }

    /// Looks up a matcher by its persisted ID within this field's family.
    ///
    /// This is the only place matcher identity is reconstructed from
    /// storage. Never substitutes a different matcher silently.
    pub fn reify_matcher(self, matcher_id: i64) -> Result<Matcher> {
        self.matchers()
            .iter()
            .copied()
            .find(|matcher| matcher.id() == matcher_id)
            .ok_or(Error::UnknownMatcher {
                field: self,
                matcher_id,
            })
    }

    /// Compiles a predicate for this field.
    ///
    /// # Panics
    ///
    /// Panics if `matcher` is not a member of this field's family, which
    /// cannot happen for a validly constructed rule.
    #[must_use]
    pub fn make_where_clause(self, matcher: Matcher, data: &Operand) -> String {
        assert!(
            self.matchers().contains(&matcher),
            "matcher {matcher:?} does not belong to field {self:?}"
        );
        matcher.compile(self.column(), data)
    }

    /// The relation join needed to evaluate this field, if any.
    ///
    /// Most fields have a fixed join. The playlist field's join depends on
    /// the referenced playlist's kind and is delegated to the matcher.
    #[must_use]
    pub fn make_join_template(self, matcher: Matcher, data: &Operand) -> Option<JoinTemplate> {
        match self {
            Self::Album => Some(JoinTemplate::new("Album", "id", "albumId")),
            Self::Artist => Some(JoinTemplate::new("Artist", "id", "artistId")),
            Self::AlbumArtist => Some(JoinTemplate::new("AlbumArtist", "id", "albumArtistId")),
            Self::Genre => Some(JoinTemplate::new("Genre", "id", "genreId")),
            Self::Playlist => matcher.join_template(data),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaylistKind;

    const ALL_FIELDS: &[Field] = &[
        Field::Title,
        Field::Album,
        Field::Artist,
        Field::AlbumArtist,
        Field::Genre,
        Field::Composer,
        Field::Comment,
        Field::Rating,
        Field::Year,
        Field::DateAdded,
        Field::PlayCount,
        Field::LastPlayed,
        Field::SkipCount,
        Field::LastSkipped,
        Field::Duration,
        Field::DiscCount,
        Field::Playlist,
    ];

    #[test]
    fn field_ids_round_trip() {
        for field in ALL_FIELDS {
            assert_eq!(Field::from_id(field.id()).unwrap(), *field);
        }
        assert!(matches!(
            Field::from_id(0),
            Err(Error::UnknownField { field_id: 0 })
        ));
        assert!(Field::from_id(9999).is_err());
    }

    #[test]
    fn reify_matcher_resolves_within_the_field_family() {
        for field in ALL_FIELDS {
            for matcher in field.matchers() {
                assert_eq!(field.reify_matcher(matcher.id()).unwrap(), *matcher);
            }
        }
    }

    #[test]
    fn reify_matcher_rejects_foreign_ids() {
        // A duration matcher id is unknown to a text field.
        let foreign = Matcher::Duration(NumberMatcher::Is).id();
        assert!(matches!(
            Field::Title.reify_matcher(foreign),
            Err(Error::UnknownMatcher {
                field: Field::Title,
                ..
            })
        ));
    }

    #[test]
    #[should_panic(expected = "does not belong to field")]
    fn make_where_clause_fails_fast_on_foreign_matcher() {
        let _ = Field::Title.make_where_clause(
            Matcher::Integer(NumberMatcher::Is),
            &Operand::first(1),
        );
    }

    #[test]
    fn fixed_joins_are_value_equal() {
        let data = Operand::text("x");
        let matcher = Matcher::Text(TextMatcher::Is);
        let album_a = Field::Album.make_join_template(matcher, &data);
        let album_b = Field::Album.make_join_template(matcher, &data);
        assert!(album_a.is_some());
        assert_eq!(album_a, album_b);
        assert_ne!(album_a, Field::Genre.make_join_template(matcher, &data));
        assert_eq!(Field::Title.make_join_template(matcher, &data), None);
    }

    #[test]
    fn playlist_join_depends_on_referenced_kind() {
        let matcher = Matcher::Playlist(PlaylistMatcher::Is);
        let plain = Operand::range(PlaylistKind::Plain.id(), 7);
        assert_eq!(Field::Playlist.make_join_template(matcher, &plain), None);
        let smart = Operand {
            text: "Loud Rock".to_owned(),
            first: PlaylistKind::Smart.id(),
            second: 3,
        };
        assert!(Field::Playlist.make_join_template(matcher, &smart).is_some());
    }
}
