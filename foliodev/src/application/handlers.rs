use std::path::PathBuf;

use folio_core::domain::{ChapterNumber, ChapterStatus, NewTitle, TitleId, UserId};
use folio_core::error::{FolioError, Result};
use folio_core::store::{ProgressStore, SqlStore, TitleCatalog};
use folio_core::{ChapterScanner, ProgressResolver, TokenCodec, TokenSettings};

fn codec_from_args(secret_hex: &str, hours: i64) -> Result<TokenCodec> {
    let settings = TokenSettings::from_hex(secret_hex, hours)?;
    Ok(TokenCodec::new(&settings))
}

pub fn handle_keygen() -> Result<()> {
    let mut key = [0u8; 32];
    getrandom::getrandom(&mut key)
        .map_err(|e| FolioError::Credential(format!("entropy source: {e}")))?;
    println!("{}", hex::encode(key));
    Ok(())
}

pub fn handle_token_issue(user: UserId, secret_hex: &str, hours: i64) -> Result<()> {
    let token = codec_from_args(secret_hex, hours)?.issue(user)?;
    println!("{}", token.value);
    eprintln!("token: user={} expires={}", user, token.expires_at);
    Ok(())
}

pub fn handle_token_verify(token: &str, secret_hex: &str) -> Result<()> {
    // Validity only matters when issuing.
    let codec = codec_from_args(secret_hex, 24)?;
    let user = codec.verify(token)?;
    println!("{user}");
    Ok(())
}

pub fn handle_scan_chapters(root: PathBuf, title: TitleId) -> Result<()> {
    let scanner = ChapterScanner::new(root);
    for chapter in scanner.list_chapters(title) {
        println!("{chapter}");
    }
    Ok(())
}

pub fn handle_scan_pages(root: PathBuf, title: TitleId, chapter: ChapterNumber) -> Result<()> {
    let scanner = ChapterScanner::new(root);
    for page in scanner.list_pages(title, chapter)? {
        println!("{}", page.display());
    }
    Ok(())
}

pub async fn handle_db_init(db: PathBuf) -> Result<()> {
    SqlStore::open(&db).await?;
    eprintln!("db: initialized {}", db.display());
    Ok(())
}

pub async fn handle_title_add(db: PathBuf, title: NewTitle) -> Result<()> {
    let store = SqlStore::open(&db).await?;
    let title = store.create_title(title).await?;
    println!("{}", title.id);
    eprintln!("title: added \"{}\" (chapters={})", title.name, title.total_chapters);
    Ok(())
}

pub async fn handle_title_list(db: PathBuf, query: &str) -> Result<()> {
    let store = SqlStore::open(&db).await?;
    for t in store.search_available(query).await? {
        println!("{:<6} {}  chapters={}", t.id, t.name, t.total_chapters);
    }
    Ok(())
}

pub async fn handle_progress_record(
    db: PathBuf,
    user: UserId,
    title: TitleId,
    chapter: ChapterNumber,
) -> Result<()> {
    let store = SqlStore::open(&db).await?;
    let record = store.upsert(user, title, chapter).await?;
    println!("{}", record.current_chapter);
    if record.current_chapter > chapter {
        eprintln!(
            "progress: kept chapter {} (already past {})",
            record.current_chapter, chapter
        );
    }
    Ok(())
}

pub async fn handle_progress_show(db: PathBuf, user: UserId) -> Result<()> {
    let store = SqlStore::open(&db).await?;
    for r in store.list_for_user(user).await? {
        println!("title={:<6} chapter={}", r.title_id, r.current_chapter);
    }
    Ok(())
}

pub async fn handle_view(
    db: PathBuf,
    root: PathBuf,
    title: TitleId,
    user: Option<UserId>,
) -> Result<()> {
    let store = SqlStore::open(&db).await?;
    let resolver = ProgressResolver::new(store.clone(), store, ChapterScanner::new(root));
    let view = resolver.resolve_title_view(title, user).await?;
    println!(
        "{}  chapter {} of {}  ({}%)",
        view.title.name, view.current_chapter, view.title.total_chapters, view.percentage
    );
    for c in &view.chapters {
        let mark = match c.status {
            ChapterStatus::Read => "x",
            ChapterStatus::Current => ">",
            ChapterStatus::Unread => " ",
        };
        println!("[{mark}] {}", c.chapter);
    }
    Ok(())
}
