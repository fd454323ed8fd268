//! Chapter discovery over the storage layout
//! `<root>/<title_id>/chapters/<chapter_number>/<page_file>`.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::domain::{ChapterNumber, TitleId};
use crate::error::{FolioError, Result};

pub const CHAPTERS_DIR: &str = "chapters";

/// Accepts only canonical decimal names: no sign, no leading zeros, fits in `u32`.
pub fn parse_chapter_name(name: &str) -> Option<ChapterNumber> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.len() > 1 && name.starts_with('0') {
        return None;
    }
    name.parse().ok()
}

/// Holds only the storage root, so one scanner can serve any number of concurrent callers.
#[derive(Clone, Debug)]
pub struct ChapterScanner {
    root: PathBuf,
}

impl ChapterScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative_chapters_dir(title_id: TitleId) -> PathBuf {
        Path::new(&title_id.to_string()).join(CHAPTERS_DIR)
    }

    pub fn chapters_dir(&self, title_id: TitleId) -> PathBuf {
        self.root.join(Self::relative_chapters_dir(title_id))
    }

    /// Chapter numbers present on storage, ascending by value.
    /// Unreadable or non-numeric entries are skipped; a missing title directory lists as empty.
    pub fn list_chapters(&self, title_id: TitleId) -> Vec<ChapterNumber> {
        let dir = self.chapters_dir(title_id);
        if !dir.is_dir() {
            debug!(title_id, dir = %dir.display(), "no chapters directory");
            return Vec::new();
        }

        let mut chapters: Vec<ChapterNumber> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    debug!(title_id, error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy();
                let parsed = parse_chapter_name(&name);
                if parsed.is_none() {
                    debug!(title_id, name = %name, "skipping non-chapter directory");
                }
                parsed
            })
            .collect();
        chapters.sort_unstable();
        chapters
    }

    /// Page files of one chapter, relative to the storage root, in file-name order.
    pub fn list_pages(&self, title_id: TitleId, chapter: ChapterNumber) -> Result<Vec<PathBuf>> {
        let rel_dir = Self::relative_chapters_dir(title_id).join(chapter.to_string());
        let dir = self.root.join(&rel_dir);
        if !dir.is_dir() {
            return Err(FolioError::ChapterNotFound { title_id, chapter });
        }

        let mut pages = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() {
                pages.push(rel_dir.join(entry.file_name()));
            }
        }
        Ok(pages)
    }
}
