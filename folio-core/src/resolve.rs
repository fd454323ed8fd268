//! Reading progress: merges chapters found on storage with stored progress
//! and advances progress as chapters are viewed.

use tracing::{debug, info};

use crate::domain::{
    ChapterNumber, ChapterPages, ChapterStatus, ChapterView, ProgressRecord, TitleId, TitleView,
    UserId,
};
use crate::error::{FolioError, Result};
use crate::scan::ChapterScanner;
use crate::store::{ProgressStore, TitleCatalog};

/// Classify each chapter against the reader's current chapter.
///
/// `None` means the reader has no progress on the title, so every chapter is
/// unread, chapter 0 included.
pub fn reconcile(chapters: &[ChapterNumber], current_chapter: Option<ChapterNumber>) -> Vec<ChapterView> {
    chapters
        .iter()
        .map(|&chapter| ChapterView {
            chapter,
            status: match current_chapter.map(|current| chapter.cmp(&current)) {
                Some(std::cmp::Ordering::Less) => ChapterStatus::Read,
                Some(std::cmp::Ordering::Equal) => ChapterStatus::Current,
                Some(std::cmp::Ordering::Greater) | None => ChapterStatus::Unread,
            },
        })
        .collect()
}

/// `floor(current * 100 / total)` clamped to 100; zero when the total is unknown.
pub fn completion_percentage(current_chapter: ChapterNumber, total_chapters: u32) -> u8 {
    if total_chapters == 0 {
        return 0;
    }
    let pct = u64::from(current_chapter) * 100 / u64::from(total_chapters);
    pct.min(100) as u8
}

pub struct ProgressResolver<C, P> {
    catalog: C,
    progress: P,
    scanner: ChapterScanner,
}

impl<C: TitleCatalog, P: ProgressStore> ProgressResolver<C, P> {
    pub fn new(catalog: C, progress: P, scanner: ChapterScanner) -> Self {
        Self {
            catalog,
            progress,
            scanner,
        }
    }

    pub fn scanner(&self) -> &ChapterScanner {
        &self.scanner
    }

    async fn list_chapters(&self, title_id: TitleId) -> Result<Vec<ChapterNumber>> {
        let scanner = self.scanner.clone();
        tokio::task::spawn_blocking(move || scanner.list_chapters(title_id))
            .await
            .map_err(|e| FolioError::Io(std::io::Error::other(e)))
    }

    /// `None` for anonymous viewers and for readers without a record.
    async fn current_chapter(&self, title_id: TitleId, viewer: Option<UserId>) -> Result<Option<ChapterNumber>> {
        let Some(user_id) = viewer else {
            return Ok(None);
        };
        Ok(self
            .progress
            .get(user_id, title_id)
            .await?
            .map(|r| r.current_chapter))
    }

    pub async fn resolve_title_view(&self, title_id: TitleId, viewer: Option<UserId>) -> Result<TitleView> {
        let title = self.catalog.get_title(title_id).await?;
        let chapters = self.list_chapters(title_id).await?;
        let progress = self.current_chapter(title_id, viewer).await?;
        let current_chapter = progress.unwrap_or(0);
        debug!(title_id, chapters = chapters.len(), ?progress, "resolved title view");
        Ok(TitleView {
            percentage: completion_percentage(current_chapter, title.total_chapters),
            chapters: reconcile(&chapters, progress),
            current_chapter,
            title,
        })
    }

    /// No-op for anonymous viewers; otherwise advances progress monotonically.
    pub async fn record_view(
        &self,
        title_id: TitleId,
        chapter: ChapterNumber,
        viewer: Option<UserId>,
    ) -> Result<Option<ProgressRecord>> {
        let Some(user_id) = viewer else {
            return Ok(None);
        };
        let record = self.progress.upsert(user_id, title_id, chapter).await?;
        info!(
            user_id,
            title_id,
            viewed = chapter,
            current_chapter = record.current_chapter,
            "recorded chapter view"
        );
        Ok(Some(record))
    }

    /// Page listing for a chapter; only a chapter of a catalogued title that
    /// exists on storage counts as viewed.
    pub async fn open_chapter(
        &self,
        title_id: TitleId,
        chapter: ChapterNumber,
        viewer: Option<UserId>,
    ) -> Result<ChapterPages> {
        self.catalog.get_title(title_id).await?;
        let scanner = self.scanner.clone();
        let pages = tokio::task::spawn_blocking(move || scanner.list_pages(title_id, chapter))
            .await
            .map_err(|e| FolioError::Io(std::io::Error::other(e)))??;
        self.record_view(title_id, chapter, viewer).await?;
        Ok(ChapterPages {
            title_id,
            chapter,
            pages,
        })
    }

    pub async fn reading_list(&self, user_id: UserId) -> Result<Vec<ProgressRecord>> {
        self.progress.list_for_user(user_id).await
    }
}
