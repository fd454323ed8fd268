//! Persistence seams: title catalog, user directory and reading progress.

use std::future::Future;
use std::path::PathBuf;

use crate::domain::{ChapterNumber, NewTitle, ProgressRecord, Title, TitleId, UserAccount, UserId};
use crate::error::Result;

pub mod memory;
pub mod sql;

pub use memory::MemoryStore;
pub use sql::SqlStore;

pub trait ProgressStore: Send + Sync {
    fn get(
        &self,
        user_id: UserId,
        title_id: TitleId,
    ) -> impl Future<Output = Result<Option<ProgressRecord>>> + Send;

    /// Sets `current_chapter` to `max(stored, chapter)` in one atomic step,
    /// creating the record if absent. Returns the record as stored afterwards.
    fn upsert(
        &self,
        user_id: UserId,
        title_id: TitleId,
        chapter: ChapterNumber,
    ) -> impl Future<Output = Result<ProgressRecord>> + Send;

    fn list_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<ProgressRecord>>> + Send;
}

pub trait TitleCatalog: Send + Sync {
    /// `TitleNotFound` when the id is unknown.
    fn get_title(&self, title_id: TitleId) -> impl Future<Output = Result<Title>> + Send;

    fn create_title(&self, title: NewTitle) -> impl Future<Output = Result<Title>> + Send;

    /// Available titles whose name contains `query` (ASCII case-insensitive), by id.
    fn search_available(&self, query: &str) -> impl Future<Output = Result<Vec<Title>>> + Send;
}

pub trait UserDirectory: Send + Sync {
    /// `EmailTaken` when the email is already registered.
    fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<UserAccount>> + Send;

    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<Option<UserAccount>>> + Send;
}

pub enum Backend {
    Memory,
    Sqlite(PathBuf),
}

pub async fn open_store(backend: Backend) -> Result<Store> {
    match backend {
        Backend::Memory => Ok(Store::Memory(MemoryStore::default())),
        Backend::Sqlite(path) => Ok(Store::Sql(SqlStore::open(&path).await?)),
    }
}

/// Backend chosen at start-up; cheap to clone, clones share state.
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sql(SqlStore),
}

impl ProgressStore for Store {
    async fn get(&self, user_id: UserId, title_id: TitleId) -> Result<Option<ProgressRecord>> {
        match self {
            Store::Memory(s) => s.get(user_id, title_id).await,
            Store::Sql(s) => s.get(user_id, title_id).await,
        }
    }

    async fn upsert(
        &self,
        user_id: UserId,
        title_id: TitleId,
        chapter: ChapterNumber,
    ) -> Result<ProgressRecord> {
        match self {
            Store::Memory(s) => s.upsert(user_id, title_id, chapter).await,
            Store::Sql(s) => s.upsert(user_id, title_id, chapter).await,
        }
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>> {
        match self {
            Store::Memory(s) => s.list_for_user(user_id).await,
            Store::Sql(s) => s.list_for_user(user_id).await,
        }
    }
}

impl TitleCatalog for Store {
    async fn get_title(&self, title_id: TitleId) -> Result<Title> {
        match self {
            Store::Memory(s) => s.get_title(title_id).await,
            Store::Sql(s) => s.get_title(title_id).await,
        }
    }

    async fn create_title(&self, title: NewTitle) -> Result<Title> {
        match self {
            Store::Memory(s) => s.create_title(title).await,
            Store::Sql(s) => s.create_title(title).await,
        }
    }

    async fn search_available(&self, query: &str) -> Result<Vec<Title>> {
        match self {
            Store::Memory(s) => s.search_available(query).await,
            Store::Sql(s) => s.search_available(query).await,
        }
    }
}

impl UserDirectory for Store {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<UserAccount> {
        match self {
            Store::Memory(s) => s.create_user(name, email, password_hash).await,
            Store::Sql(s) => s.create_user(name, email, password_hash).await,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        match self {
            Store::Memory(s) => s.find_by_email(email).await,
            Store::Sql(s) => s.find_by_email(email).await,
        }
    }
}
