// SPDX-FileCopyrightText: The smartlists authors
// SPDX-License-Identifier: MPL-2.0

use futures_util::stream::BoxStream;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

use crate::{
    AnyOrAll, EndOfListAction, Error, Operand, Result, Rule, RuleId, SelectQuery, SmartPlaylist,
    SmartPlaylistId, SortBy,
    sql::quote_identifier,
};

crate::db_id!(TrackId);

/// Sentinel stored in the `limit` column for "no limit".
pub const NO_LIMIT: i64 = -1;

/// Creates the engine-owned tables and indexes. Idempotent.
///
/// The media library tables (`Track`, `Album`, ...) belong to the
/// enclosing store and are not touched here.
pub async fn create_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS "SmartPlaylist" (
            "id"                INTEGER PRIMARY KEY,
            "title"             TEXT NOT NULL UNIQUE COLLATE NOCASE,
            "combinatorId"      INTEGER NOT NULL DEFAULT 0,
            "limit"             INTEGER NOT NULL DEFAULT -1,
            "sortById"          INTEGER NOT NULL DEFAULT 0,
            "endOfListActionId" INTEGER NOT NULL DEFAULT 0
        )"#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS "SmartPlaylistRule" (
            "id"            INTEGER PRIMARY KEY AUTOINCREMENT,
            "listId"        INTEGER NOT NULL REFERENCES "SmartPlaylist"("id") ON DELETE CASCADE,
            "fieldId"       INTEGER NOT NULL,
            "matcherId"     INTEGER NOT NULL,
            "operandText"   TEXT NOT NULL DEFAULT '',
            "operandFirst"  INTEGER NOT NULL DEFAULT 0,
            "operandSecond" INTEGER NOT NULL DEFAULT 0
        )"#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS "index_SmartPlaylistRule_listId"
            ON "SmartPlaylistRule" ("listId")"#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Metadata row of a smart playlist.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct SmartPlaylistRow {
    pub id: SmartPlaylistId,
    pub title: String,
    pub combinator_id: i64,
    #[sqlx(rename = "limit")]
    pub row_limit: i64,
    pub sort_by_id: i64,
    pub end_of_list_action_id: i64,
}

impl SmartPlaylistRow {
    /// Fetches all [`SmartPlaylistRow`]s asynchronously.
    ///
    /// Unfiltered and in no particular order, without rules attached.
    #[must_use]
    pub fn fetch_all<'a>(
        executor: impl SqliteExecutor<'a> + 'a,
    ) -> BoxStream<'a, sqlx::Result<Self>> {
        sqlx::query_as(r#"SELECT * FROM "SmartPlaylist""#).fetch(executor)
    }

    fn into_playlist(self, rules: Vec<Rule>) -> Result<SmartPlaylist> {
        // A persisted playlist always has rules; an empty set means the
        // stored state is torn or was tampered with.
        if rules.is_empty() {
            return Err(Error::InvalidPlaylist { reason: "no rules" });
        }
        let Self {
            id,
            title,
            combinator_id,
            row_limit,
            sort_by_id,
            end_of_list_action_id,
        } = self;
        Ok(SmartPlaylist {
            id,
            title,
            combinator: AnyOrAll::from_id(combinator_id)?,
            limit: (row_limit > 0).then_some(row_limit),
            sort_by: SortBy::from_id(sort_by_id)?,
            end_of_list_action: EndOfListAction::from_id(end_of_list_action_id)?,
            rules,
        })
    }
}

/// Rule row of a smart playlist.
///
/// Rule rows carry no persisted ordering; the rule set of a playlist is
/// unordered and the combinator is insensitive to it.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct SmartPlaylistRuleRow {
    pub id: RuleId,
    pub list_id: SmartPlaylistId,
    pub field_id: i64,
    pub matcher_id: i64,
    pub operand_text: String,
    pub operand_first: i64,
    pub operand_second: i64,
}

impl SmartPlaylistRuleRow {
    /// Fetches all rule rows of a playlist asynchronously.
    ///
    /// In no particular order.
    #[must_use]
    pub fn fetch_list<'a>(
        executor: impl SqliteExecutor<'a> + 'a,
        list_id: SmartPlaylistId,
    ) -> BoxStream<'a, sqlx::Result<Self>> {
        sqlx::query_as(r#"SELECT * FROM "SmartPlaylistRule" WHERE "listId"=?1"#)
            .bind(list_id)
            .fetch(executor)
    }

    fn into_rule(self) -> Result<Rule> {
        let Self {
            id,
            list_id: _,
            field_id,
            matcher_id,
            operand_text,
            operand_first,
            operand_second,
        } = self;
        Rule::from_stored(
            id,
            field_id,
            matcher_id,
            Operand {
                text: operand_text,
                first: operand_first,
                second: operand_second,
            },
        )
    }
}

impl SmartPlaylist {
    /// Persists a new playlist: metadata row, rule rows, and the
    /// materialized view, all in one transaction.
    ///
    /// Refuses an [invalid](Self::is_valid) playlist before any I/O. The
    /// playlist ID must have been assigned by the caller.
    pub async fn create(&self, pool: &SqlitePool) -> Result<()> {
        self.validate()?;
        if !self.id.is_valid() {
            return Err(Error::InvalidPlaylist {
                reason: "unsaved playlist id",
            });
        }
        let view_sql = self.to_view_sql();
        let mut tx = pool.begin().await?;
        sqlx::query(
            r#"INSERT INTO "SmartPlaylist"
                ("id","title","combinatorId","limit","sortById","endOfListActionId")
                VALUES (?1,?2,?3,?4,?5,?6)"#,
        )
        .bind(self.id)
        .bind(self.title.trim())
        .bind(self.combinator.id())
        .bind(self.limit.unwrap_or(NO_LIMIT))
        .bind(self.sort_by.id())
        .bind(self.end_of_list_action.id())
        .execute(&mut *tx)
        .await?;
        insert_rules(&mut tx, self).await?;
        sqlx::query(&view_sql).execute(&mut *tx).await?;
        tx.commit().await?;
        log::debug!(
            "Created smart playlist {id} with {rule_count} rule(s)",
            id = self.id,
            rule_count = self.rules.len()
        );
        Ok(())
    }

    /// Replaces a persisted playlist with this value.
    ///
    /// The full rule set is replaced and the view is dropped and
    /// recreated, all in one transaction. There is no incremental diff.
    pub async fn update(&self, pool: &SqlitePool) -> Result<()> {
        self.validate()?;
        let mut tx = pool.begin().await?;
        let previous_title: Option<(String,)> =
            sqlx::query_as(r#"SELECT "title" FROM "SmartPlaylist" WHERE "id"=?1"#)
                .bind(self.id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((previous_title,)) = previous_title else {
            return Err(Error::Sqlite(sqlx::Error::RowNotFound));
        };
        sqlx::query(&format!(
            "DROP VIEW IF EXISTS {view_name}",
            view_name = quote_identifier(previous_title.trim())
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"UPDATE "SmartPlaylist"
                SET "title"=?2, "combinatorId"=?3, "limit"=?4, "sortById"=?5, "endOfListActionId"=?6
                WHERE "id"=?1"#,
        )
        .bind(self.id)
        .bind(self.title.trim())
        .bind(self.combinator.id())
        .bind(self.limit.unwrap_or(NO_LIMIT))
        .bind(self.sort_by.id())
        .bind(self.end_of_list_action.id())
        .execute(&mut *tx)
        .await?;
        sqlx::query(r#"DELETE FROM "SmartPlaylistRule" WHERE "listId"=?1"#)
            .bind(self.id)
            .execute(&mut *tx)
            .await?;
        insert_rules(&mut tx, self).await?;
        sqlx::query(&self.to_view_sql()).execute(&mut *tx).await?;
        tx.commit().await?;
        log::debug!("Updated smart playlist {id}", id = self.id);
        Ok(())
    }

    /// Removes a playlist: view, rule rows, and metadata row, all in one
    /// transaction. Removing an unknown ID is a no-op.
    pub async fn delete(pool: &SqlitePool, id: SmartPlaylistId) -> Result<()> {
        let mut tx = pool.begin().await?;
        let title: Option<(String,)> =
            sqlx::query_as(r#"SELECT "title" FROM "SmartPlaylist" WHERE "id"=?1"#)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((title,)) = title else {
            log::debug!("No smart playlist {id} to delete");
            return Ok(());
        };
        sqlx::query(&format!(
            "DROP VIEW IF EXISTS {view_name}",
            view_name = quote_identifier(title.trim())
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(r#"DELETE FROM "SmartPlaylistRule" WHERE "listId"=?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM "SmartPlaylist" WHERE "id"=?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        log::debug!("Deleted smart playlist {id}");
        Ok(())
    }

    /// Loads a single playlist by ID with its full rule set attached.
    ///
    /// Metadata and rule rows are read in one transaction, so a concurrent
    /// update cannot interleave between the two reads.
    ///
    /// Returns `Ok(None)` if the requested playlist has not been found.
    /// Fails if any persisted field or matcher ID is unknown.
    pub async fn try_load(
        pool: &SqlitePool,
        id: SmartPlaylistId,
    ) -> Result<Option<SmartPlaylist>> {
        let mut tx = pool.begin().await?;
        let row: Option<SmartPlaylistRow> =
            sqlx::query_as(r#"SELECT * FROM "SmartPlaylist" WHERE "id"=?1"#)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let rules = load_rules(&mut *tx, id).await?;
        tx.commit().await?;
        row.into_playlist(rules).map(Some)
    }

    /// Loads all playlists with their rule sets attached.
    ///
    /// All rows are read in one transaction.
    pub async fn load_all(pool: &SqlitePool) -> Result<Vec<SmartPlaylist>> {
        let mut tx = pool.begin().await?;
        let rows: Vec<SmartPlaylistRow> = sqlx::query_as(r#"SELECT * FROM "SmartPlaylist""#)
            .fetch_all(&mut *tx)
            .await?;
        let mut playlists = Vec::with_capacity(rows.len());
        for row in rows {
            let rules = load_rules(&mut *tx, row.id).await?;
            playlists.push(row.into_playlist(rules)?);
        }
        tx.commit().await?;
        Ok(playlists)
    }
}

async fn load_rules(
    executor: impl SqliteExecutor<'_>,
    list_id: SmartPlaylistId,
) -> Result<Vec<Rule>> {
    let rows: Vec<SmartPlaylistRuleRow> =
        sqlx::query_as(r#"SELECT * FROM "SmartPlaylistRule" WHERE "listId"=?1"#)
            .bind(list_id)
            .fetch_all(executor)
            .await?;
    rows.into_iter().map(SmartPlaylistRuleRow::into_rule).collect()
}

async fn insert_rules(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    playlist: &SmartPlaylist,
) -> Result<()> {
    for rule in &playlist.rules {
        sqlx::query(
            r#"INSERT INTO "SmartPlaylistRule"
                ("listId","fieldId","matcherId","operandText","operandFirst","operandSecond")
                VALUES (?1,?2,?3,?4,?5,?6)"#,
        )
        .bind(playlist.id)
        .bind(rule.field().id())
        .bind(rule.matcher().id())
        .bind(&rule.data().text)
        .bind(rule.data().first)
        .bind(rule.data().second)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Executes a compiled query and returns the matching track IDs in order.
pub async fn query_track_ids(
    executor: impl SqliteExecutor<'_>,
    query: &SelectQuery,
) -> sqlx::Result<Vec<TrackId>> {
    sqlx::query_scalar(&query.to_sql()).fetch_all(executor).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::{
        Field, Matcher, NumberMatcher, PlaylistKind, PlaylistMatcher, TextMatcher,
    };

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        create_media_schema(&pool).await.unwrap();
        pool
    }

    /// Minimal replica of the external media library schema.
    async fn create_media_schema(pool: &SqlitePool) -> sqlx::Result<()> {
        for ddl in [
            r#"CREATE TABLE "Track" (
                "id" INTEGER PRIMARY KEY,
                "mediaType" INTEGER NOT NULL DEFAULT 1,
                "title" TEXT NOT NULL DEFAULT '',
                "albumId" INTEGER,
                "artistId" INTEGER,
                "albumArtistId" INTEGER,
                "genreId" INTEGER,
                "composer" TEXT NOT NULL DEFAULT '',
                "comment" TEXT NOT NULL DEFAULT '',
                "year" INTEGER NOT NULL DEFAULT 0,
                "rating" INTEGER NOT NULL DEFAULT 0,
                "length" INTEGER NOT NULL DEFAULT 0,
                "discCount" INTEGER NOT NULL DEFAULT 0,
                "dateAdded" INTEGER NOT NULL DEFAULT 0,
                "lastPlayed" INTEGER NOT NULL DEFAULT 0,
                "lastSkipped" INTEGER NOT NULL DEFAULT 0,
                "playCount" INTEGER NOT NULL DEFAULT 0,
                "skipCount" INTEGER NOT NULL DEFAULT 0
            )"#,
            r#"CREATE TABLE "Album" ("id" INTEGER PRIMARY KEY, "title" TEXT NOT NULL)"#,
            r#"CREATE TABLE "Artist" ("id" INTEGER PRIMARY KEY, "name" TEXT NOT NULL)"#,
            r#"CREATE TABLE "AlbumArtist" ("id" INTEGER PRIMARY KEY, "name" TEXT NOT NULL)"#,
            r#"CREATE TABLE "Genre" ("id" INTEGER PRIMARY KEY, "name" TEXT NOT NULL)"#,
            r#"CREATE TABLE "Playlist" ("id" INTEGER PRIMARY KEY, "title" TEXT NOT NULL)"#,
            r#"CREATE TABLE "PlaylistEntity" (
                "id" INTEGER PRIMARY KEY,
                "listId" INTEGER NOT NULL,
                "trackId" INTEGER NOT NULL
            )"#,
            r#"INSERT INTO "Genre" ("id","name") VALUES (1,'Rock'),(2,'Jazz')"#,
            r#"INSERT INTO "Track" ("id","mediaType","title","genreId","rating","length")
                VALUES (1,1,'Thunder',1,90,241000),
                       (2,1,'Breeze',2,50,193000),
                       (3,2,'Concert Film',1,95,5400000)"#,
        ] {
            sqlx::query(ddl).execute(pool).await?;
        }
        Ok(())
    }

    fn rule(field: Field, matcher: Matcher, data: Operand) -> Rule {
        Rule::new(RuleId::UNSAVED, field, matcher, data).unwrap()
    }

    fn loud_rock(id: i64) -> SmartPlaylist {
        SmartPlaylist {
            id: SmartPlaylistId::new(id),
            title: "Loud Rock".to_owned(),
            combinator: AnyOrAll::All,
            limit: None,
            sort_by: SortBy::None,
            end_of_list_action: EndOfListAction::Defer,
            rules: vec![
                rule(
                    Field::Genre,
                    Matcher::Text(TextMatcher::Is),
                    Operand::text("Rock"),
                ),
                rule(
                    Field::Rating,
                    Matcher::Rating(NumberMatcher::IsGreaterThan),
                    Operand::first(80),
                ),
            ],
        }
    }

    async fn view_count(pool: &SqlitePool, name: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(
            r"SELECT COUNT(*) FROM sqlite_master WHERE type='view' AND name=?1",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
        count
    }

    #[tokio::test]
    async fn create_and_load_round_trip() {
        let pool = test_pool().await;
        let playlist = loud_rock(1);
        playlist.create(&pool).await.unwrap();

        let loaded = SmartPlaylist::try_load(&pool, playlist.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, playlist.id);
        assert_eq!(loaded.title, playlist.title);
        assert_eq!(loaded.combinator, playlist.combinator);
        assert_eq!(loaded.limit, playlist.limit);
        assert_eq!(loaded.sort_by, playlist.sort_by);
        assert_eq!(loaded.end_of_list_action, playlist.end_of_list_action);
        // Rule rows are an unordered set with fresh row ids.
        let expected: HashSet<_> = playlist.rules.iter().map(Rule::contents).collect();
        let actual: HashSet<_> = loaded.rules.iter().map(Rule::contents).collect();
        assert_eq!(expected, actual);
        assert!(loaded.rules.iter().all(|rule| rule.id().is_valid()));
    }

    #[tokio::test]
    async fn created_view_is_queryable() {
        let pool = test_pool().await;
        loud_rock(1).create(&pool).await.unwrap();
        assert_eq!(view_count(&pool, "Loud Rock").await, 1);
        let ids: Vec<TrackId> = sqlx::query_scalar(r#"SELECT "id" FROM "Loud Rock""#)
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(ids, [TrackId::new(1)]);
    }

    #[tokio::test]
    async fn compiled_query_executes_directly() {
        let pool = test_pool().await;
        let ids = query_track_ids(&pool, &loud_rock(1).compile()).await.unwrap();
        assert_eq!(ids, [TrackId::new(1)]);
    }

    #[tokio::test]
    async fn update_replaces_rules_and_recreates_view() {
        let pool = test_pool().await;
        let playlist = loud_rock(1);
        playlist.create(&pool).await.unwrap();

        let mut renamed = playlist.clone();
        renamed.title = "Mellow".to_owned();
        renamed.rules = vec![rule(
            Field::Genre,
            Matcher::Text(TextMatcher::Is),
            Operand::text("Jazz"),
        )];
        renamed.update(&pool).await.unwrap();

        assert_eq!(view_count(&pool, "Loud Rock").await, 0);
        assert_eq!(view_count(&pool, "Mellow").await, 1);
        let ids: Vec<TrackId> = sqlx::query_scalar(r#"SELECT "id" FROM "Mellow""#)
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(ids, [TrackId::new(2)]);

        let loaded = SmartPlaylist::try_load(&pool, renamed.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.rules.len(), 1);
        assert_eq!(loaded.rules[0].field(), Field::Genre);
    }

    #[tokio::test]
    async fn update_of_unknown_playlist_fails() {
        let pool = test_pool().await;
        let result = loud_rock(42).update(&pool).await;
        assert!(matches!(
            result,
            Err(Error::Sqlite(sqlx::Error::RowNotFound))
        ));
    }

    #[tokio::test]
    async fn delete_removes_metadata_rules_and_view() {
        let pool = test_pool().await;
        let playlist = loud_rock(1);
        playlist.create(&pool).await.unwrap();
        SmartPlaylist::delete(&pool, playlist.id).await.unwrap();

        assert!(SmartPlaylist::try_load(&pool, playlist.id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(view_count(&pool, "Loud Rock").await, 0);
        let (rule_count,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM "SmartPlaylistRule""#)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rule_count, 0);

        // Deleting again is a no-op.
        SmartPlaylist::delete(&pool, playlist.id).await.unwrap();
    }

    #[tokio::test]
    async fn create_refuses_invalid_playlist_before_io() {
        let pool = test_pool().await;
        let mut playlist = loud_rock(1);
        playlist.rules.clear();
        assert!(matches!(
            playlist.create(&pool).await,
            Err(Error::InvalidPlaylist { reason: "no rules" })
        ));
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM "SmartPlaylist""#)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_title_atomically() {
        let pool = test_pool().await;
        loud_rock(1).create(&pool).await.unwrap();
        let mut duplicate = loud_rock(2);
        duplicate.title = "LOUD ROCK".to_owned();
        assert!(duplicate.create(&pool).await.is_err());
        // The failed save left no rule rows behind.
        let (rule_count,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM "SmartPlaylistRule" WHERE "listId"=2"#)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rule_count, 0);
    }

    #[tokio::test]
    async fn nested_playlist_reference_round_trip() {
        let pool = test_pool().await;
        let inner = loud_rock(1);
        inner.create(&pool).await.unwrap();

        let outer = SmartPlaylist {
            id: SmartPlaylistId::new(2),
            title: "Not Loud Rock".to_owned(),
            combinator: AnyOrAll::All,
            limit: None,
            sort_by: SortBy::None,
            end_of_list_action: EndOfListAction::Defer,
            rules: vec![rule(
                Field::Playlist,
                Matcher::Playlist(PlaylistMatcher::IsNot),
                Operand {
                    text: inner.title.clone(),
                    first: PlaylistKind::Smart.id(),
                    second: inner.id.get(),
                },
            )],
        };
        outer.create(&pool).await.unwrap();

        // The reference triple survives persistence unchanged.
        let loaded = SmartPlaylist::try_load(&pool, outer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.rules[0].data(), outer.rules[0].data());

        let ids: Vec<TrackId> = sqlx::query_scalar(r#"SELECT "id" FROM "Not Loud Rock""#)
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(ids, [TrackId::new(2)]);
    }

    #[tokio::test]
    async fn plain_playlist_membership_round_trip() {
        let pool = test_pool().await;
        sqlx::query(r#"INSERT INTO "Playlist" ("id","title") VALUES (9,'Road Trip')"#)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(r#"INSERT INTO "PlaylistEntity" ("listId","trackId") VALUES (9,2)"#)
            .execute(&pool)
            .await
            .unwrap();

        let playlist = SmartPlaylist {
            id: SmartPlaylistId::new(1),
            title: "Road Trip Audio".to_owned(),
            combinator: AnyOrAll::All,
            limit: None,
            sort_by: SortBy::None,
            end_of_list_action: EndOfListAction::Defer,
            rules: vec![rule(
                Field::Playlist,
                Matcher::Playlist(PlaylistMatcher::Is),
                Operand {
                    text: String::new(),
                    first: PlaylistKind::Plain.id(),
                    second: 9,
                },
            )],
        };
        let ids = query_track_ids(&pool, &playlist.compile()).await.unwrap();
        assert_eq!(ids, [TrackId::new(2)]);
    }

    #[tokio::test]
    async fn load_all_attaches_rules() {
        let pool = test_pool().await;
        loud_rock(1).create(&pool).await.unwrap();
        let mut mellow = loud_rock(2);
        mellow.title = "Mellow".to_owned();
        mellow.rules = vec![rule(
            Field::Genre,
            Matcher::Text(TextMatcher::Is),
            Operand::text("Jazz"),
        )];
        mellow.create(&pool).await.unwrap();

        let mut all = SmartPlaylist::load_all(&pool).await.unwrap();
        all.sort_by_key(|playlist| playlist.id);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].rules.len(), 2);
        assert_eq!(all[1].rules.len(), 1);
    }

    #[tokio::test]
    async fn load_never_yields_a_rule_less_playlist() {
        let pool = test_pool().await;
        loud_rock(1).create(&pool).await.unwrap();
        // Tear the rule set behind the engine's back.
        sqlx::query(r#"DELETE FROM "SmartPlaylistRule" WHERE "listId"=1"#)
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(
            SmartPlaylist::try_load(&pool, SmartPlaylistId::new(1)).await,
            Err(Error::InvalidPlaylist { reason: "no rules" })
        ));
        assert!(matches!(
            SmartPlaylist::load_all(&pool).await,
            Err(Error::InvalidPlaylist { reason: "no rules" })
        ));
    }

    #[tokio::test]
    async fn unknown_matcher_id_surfaces_as_load_failure() {
        let pool = test_pool().await;
        loud_rock(1).create(&pool).await.unwrap();
        sqlx::query(r#"UPDATE "SmartPlaylistRule" SET "matcherId"=9999 WHERE "listId"=1"#)
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(
            SmartPlaylist::try_load(&pool, SmartPlaylistId::new(1)).await,
            Err(Error::UnknownMatcher { .. })
        ));
    }
}
