//! libSQL backend. One shared connection; every mutation is a single statement
//! so the database engine, not this process, serializes concurrent writers.

use std::path::Path;
use std::sync::Arc;

use libsql::{Builder, Connection, Database, Row, params};
use tracing::info;

use super::{ProgressStore, TitleCatalog, UserDirectory};
use crate::domain::{ChapterNumber, NewTitle, ProgressRecord, Title, TitleId, UserAccount, UserId};
use crate::error::{FolioError, Result};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS titles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    author TEXT NOT NULL DEFAULT '',
    genre TEXT NOT NULL DEFAULT '',
    language TEXT NOT NULL DEFAULT '',
    publisher TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    total_chapters INTEGER NOT NULL DEFAULT 0 CHECK (total_chapters >= 0),
    available INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS progress (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title_id INTEGER NOT NULL,
    current_chapter INTEGER NOT NULL CHECK (current_chapter >= 0),
    UNIQUE (user_id, title_id)
);
";

const TITLE_COLUMNS: &str =
    "id, name, author, genre, language, publisher, description, total_chapters, available";

#[derive(Clone)]
pub struct SqlStore {
    // Keeps the database handle alive as long as any clone of the connection.
    _db: Arc<Database>,
    conn: Connection,
}

impl SqlStore {
    /// Open (or create) a database file and bootstrap the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        let store = Self {
            _db: Arc::new(db),
            conn,
        };
        store.bootstrap().await?;
        info!(path = %path.display(), "database ready");
        Ok(store)
    }

    pub async fn open_in_memory() -> Result<Self> {
        Self::open(":memory:").await
    }

    async fn bootstrap(&self) -> Result<()> {
        self.conn.query("PRAGMA busy_timeout = 5000", ()).await?;
        self.conn.execute_batch(SCHEMA).await?;
        Ok(())
    }
}

fn chapter_from_db(value: i64) -> Result<ChapterNumber> {
    ChapterNumber::try_from(value)
        .map_err(|_| FolioError::Corrupt(format!("chapter number out of range: {value}")))
}

fn title_from_row(row: &Row) -> Result<Title> {
    let total: i64 = row.get(7)?;
    Ok(Title {
        id: row.get(0)?,
        name: row.get(1)?,
        author: row.get(2)?,
        genre: row.get(3)?,
        language: row.get(4)?,
        publisher: row.get(5)?,
        description: row.get(6)?,
        total_chapters: u32::try_from(total)
            .map_err(|_| FolioError::Corrupt(format!("total chapters out of range: {total}")))?,
        available: row.get::<i64>(8)? != 0,
    })
}

fn user_from_row(row: &Row) -> Result<UserAccount> {
    Ok(UserAccount {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

impl ProgressStore for SqlStore {
    async fn get(&self, user_id: UserId, title_id: TitleId) -> Result<Option<ProgressRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT current_chapter FROM progress WHERE user_id = ?1 AND title_id = ?2",
                params![user_id, title_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(ProgressRecord {
                user_id,
                title_id,
                current_chapter: chapter_from_db(row.get(0)?)?,
            })),
            None => Ok(None),
        }
    }

    async fn upsert(
        &self,
        user_id: UserId,
        title_id: TitleId,
        chapter: ChapterNumber,
    ) -> Result<ProgressRecord> {
        let mut rows = self
            .conn
            .query(
                "INSERT INTO progress (user_id, title_id, current_chapter) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, title_id)
                 DO UPDATE SET current_chapter = MAX(current_chapter, excluded.current_chapter)
                 RETURNING current_chapter",
                params![user_id, title_id, i64::from(chapter)],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| FolioError::Corrupt("upsert returned no row".into()))?;
        Ok(ProgressRecord {
            user_id,
            title_id,
            current_chapter: chapter_from_db(row.get(0)?)?,
        })
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT title_id, current_chapter FROM progress WHERE user_id = ?1 ORDER BY title_id",
                params![user_id],
            )
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(ProgressRecord {
                user_id,
                title_id: row.get(0)?,
                current_chapter: chapter_from_db(row.get(1)?)?,
            });
        }
        Ok(records)
    }
}

impl TitleCatalog for SqlStore {
    async fn get_title(&self, title_id: TitleId) -> Result<Title> {
        let sql = format!("SELECT {TITLE_COLUMNS} FROM titles WHERE id = ?1");
        let mut rows = self.conn.query(&sql, params![title_id]).await?;
        match rows.next().await? {
            Some(row) => title_from_row(&row),
            None => Err(FolioError::TitleNotFound(title_id)),
        }
    }

    async fn create_title(&self, title: NewTitle) -> Result<Title> {
        title.validate()?;
        let mut rows = self
            .conn
            .query(
                "INSERT INTO titles
                 (name, author, genre, language, publisher, description, total_chapters, available)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 RETURNING id",
                params![
                    title.name.clone(),
                    title.author.clone(),
                    title.genre.clone(),
                    title.language.clone(),
                    title.publisher.clone(),
                    title.description.clone(),
                    i64::from(title.total_chapters),
                    i64::from(title.available)
                ],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| FolioError::Corrupt("insert returned no id".into()))?;
        Ok(title.into_title(row.get(0)?))
    }

    async fn search_available(&self, query: &str) -> Result<Vec<Title>> {
        let sql = format!(
            "SELECT {TITLE_COLUMNS} FROM titles
             WHERE available = 1 AND instr(lower(name), lower(?1)) > 0
             ORDER BY id"
        );
        let mut rows = self.conn.query(&sql, params![query]).await?;
        let mut titles = Vec::new();
        while let Some(row) = rows.next().await? {
            titles.push(title_from_row(&row)?);
        }
        Ok(titles)
    }
}

impl UserDirectory for SqlStore {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<UserAccount> {
        let mut rows = self
            .conn
            .query(
                "INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3)
                 ON CONFLICT (email) DO NOTHING
                 RETURNING id",
                params![name, email, password_hash],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(UserAccount {
                id: row.get(0)?,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            }),
            None => Err(FolioError::EmailTaken),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, email, password_hash FROM users WHERE email = ?1",
                params![email],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_keeps_the_maximum() {
        let store = SqlStore::open_in_memory().await.unwrap();
        assert_eq!(store.get(3, 8).await.unwrap(), None);
        for chapter in [4, 11, 2, 11, 7] {
            store.upsert(3, 8, chapter).await.unwrap();
        }
        let record = store.get(3, 8).await.unwrap().unwrap();
        assert_eq!(record.current_chapter, 11);
        assert_eq!(store.get(4, 8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn title_round_trips_through_catalog() {
        let store = SqlStore::open_in_memory().await.unwrap();
        let created = store
            .create_title(NewTitle {
                name: "Vinland Saga".into(),
                author: "Yukimura".into(),
                total_chapters: 200,
                available: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(store.get_title(created.id).await.unwrap(), created);
        assert!(matches!(
            store.get_title(created.id + 1).await,
            Err(FolioError::TitleNotFound(_))
        ));
        assert_eq!(store.search_available("saga").await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn empty_title_name_is_invalid() {
        let store = SqlStore::open_in_memory().await.unwrap();
        assert!(matches!(
            store.create_title(NewTitle::default()).await,
            Err(FolioError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn email_is_unique() {
        let store = SqlStore::open_in_memory().await.unwrap();
        let user = store.create_user("Ana", "ana@x.io", "hash").await.unwrap();
        assert!(matches!(
            store.create_user("Other", "ana@x.io", "hash").await,
            Err(FolioError::EmailTaken)
        ));
        assert_eq!(store.find_by_email("ana@x.io").await.unwrap(), Some(user));
        assert_eq!(store.find_by_email("nobody@x.io").await.unwrap(), None);
    }

    #[tokio::test]
    async fn schema_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("db").join("folio.db");
        {
            let store = SqlStore::open(&path).await.unwrap();
            store.upsert(1, 1, 5).await.unwrap();
        }
        let store = SqlStore::open(&path).await.unwrap();
        assert_eq!(store.list_for_user(1).await.unwrap()[0].current_chapter, 5);
    }
}
