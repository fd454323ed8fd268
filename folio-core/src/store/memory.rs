use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{ProgressStore, TitleCatalog, UserDirectory};
use crate::domain::{ChapterNumber, NewTitle, ProgressRecord, Title, TitleId, UserAccount, UserId};
use crate::error::{FolioError, Result};

#[derive(Default)]
struct Inner {
    titles: DashMap<TitleId, Title>,
    progress: DashMap<(UserId, TitleId), ChapterNumber>,
    users: DashMap<String, UserAccount>,
    last_title_id: AtomicI64,
    last_user_id: AtomicI64,
}

/// Process-local backend over concurrent maps. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl ProgressStore for MemoryStore {
    async fn get(&self, user_id: UserId, title_id: TitleId) -> Result<Option<ProgressRecord>> {
        Ok(self
            .inner
            .progress
            .get(&(user_id, title_id))
            .map(|c| ProgressRecord {
                user_id,
                title_id,
                current_chapter: *c,
            }))
    }

    async fn upsert(
        &self,
        user_id: UserId,
        title_id: TitleId,
        chapter: ChapterNumber,
    ) -> Result<ProgressRecord> {
        // The entry guard holds the shard lock across read and write.
        let current_chapter = *self
            .inner
            .progress
            .entry((user_id, title_id))
            .and_modify(|c| *c = (*c).max(chapter))
            .or_insert(chapter);
        Ok(ProgressRecord {
            user_id,
            title_id,
            current_chapter,
        })
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>> {
        let mut records: Vec<ProgressRecord> = self
            .inner
            .progress
            .iter()
            .filter(|e| e.key().0 == user_id)
            .map(|e| ProgressRecord {
                user_id,
                title_id: e.key().1,
                current_chapter: *e.value(),
            })
            .collect();
        records.sort_by_key(|r| r.title_id);
        Ok(records)
    }
}

impl TitleCatalog for MemoryStore {
    async fn get_title(&self, title_id: TitleId) -> Result<Title> {
        self.inner
            .titles
            .get(&title_id)
            .map(|t| t.clone())
            .ok_or(FolioError::TitleNotFound(title_id))
    }

    async fn create_title(&self, title: NewTitle) -> Result<Title> {
        title.validate()?;
        let id = self.inner.last_title_id.fetch_add(1, Ordering::SeqCst) + 1;
        let title = title.into_title(id);
        self.inner.titles.insert(id, title.clone());
        Ok(title)
    }

    async fn search_available(&self, query: &str) -> Result<Vec<Title>> {
        let needle = query.to_ascii_lowercase();
        let mut found: Vec<Title> = self
            .inner
            .titles
            .iter()
            .filter(|t| t.available && t.name.to_ascii_lowercase().contains(&needle))
            .map(|t| t.value().clone())
            .collect();
        found.sort_by_key(|t| t.id);
        Ok(found)
    }
}

impl UserDirectory for MemoryStore {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<UserAccount> {
        match self.inner.users.entry(email.to_string()) {
            Entry::Occupied(_) => Err(FolioError::EmailTaken),
            Entry::Vacant(slot) => {
                let account = UserAccount {
                    id: self.inner.last_user_id.fetch_add(1, Ordering::SeqCst) + 1,
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash: password_hash.to_string(),
                };
                slot.insert(account.clone());
                Ok(account)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        Ok(self.inner.users.get(email).map(|u| u.clone()))
    }
}
