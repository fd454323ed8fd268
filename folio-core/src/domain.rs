// folio_core/src/domain.rs
use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

pub type UserId = i64;
pub type TitleId = i64;
pub type ChapterNumber = u32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub id: TitleId,
    pub name: String,
    pub author: String,
    pub genre: String,
    pub language: String,
    pub publisher: String,
    pub description: String,
    /// Declared chapter count; zero when unknown.
    pub total_chapters: u32,
    pub available: bool,
}

/// Title fields supplied on creation, before an id is assigned.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewTitle {
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total_chapters: u32,
    #[serde(default)]
    pub available: bool,
}

impl NewTitle {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FolioError::Invalid("title name must not be empty".into()));
        }
        Ok(())
    }

    pub fn into_title(self, id: TitleId) -> Title {
        Title {
            id,
            name: self.name,
            author: self.author,
            genre: self.genre,
            language: self.language,
            publisher: self.publisher,
            description: self.description,
            total_chapters: self.total_chapters,
            available: self.available,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
}

/// Highest chapter a user has reached in a title.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub title_id: TitleId,
    pub current_chapter: ChapterNumber,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStatus {
    Read,
    Current,
    Unread,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChapterView {
    pub chapter: ChapterNumber,
    pub status: ChapterStatus,
}

impl ChapterView {
    pub fn is_read(&self) -> bool {
        self.status == ChapterStatus::Read
    }

    pub fn is_current(&self) -> bool {
        self.status == ChapterStatus::Current
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TitleView {
    pub title: Title,
    pub chapters: Vec<ChapterView>,
    pub current_chapter: ChapterNumber,
    pub percentage: u8,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChapterPages {
    pub title_id: TitleId,
    pub chapter: ChapterNumber,
    /// Paths relative to the storage root, ordered by file name.
    pub pages: Vec<std::path::PathBuf>,
}
