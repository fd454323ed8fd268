use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use folio_core::FolioError;
use folio_core::accounts;
use folio_core::domain::{ChapterNumber, NewTitle, TitleId};
use folio_core::scan::parse_chapter_name;
use folio_core::store::TitleCatalog;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::auth::{Authenticated, Viewer};
use super::error::AppError;
use super::state::AppState;

pub const STATIC_PREFIX: &str = "/static";

#[derive(Deserialize)]
pub struct RegisterForm {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
pub struct ChapterResponse {
    title_id: TitleId,
    chapter: ChapterNumber,
    pages: Vec<String>,
}

fn page_url(page: &FsPath) -> String {
    let parts: Vec<_> = page.iter().map(|c| c.to_string_lossy()).collect();
    format!("{STATIC_PREFIX}/{}", parts.join("/"))
}

fn session_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, AppError> {
    let account = accounts::register(&state.store, &form.name, &form.email, &form.password).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let token = accounts::login(&state.store, &state.tokens, &form.email, &form.password).await?;
    let cookie = session_cookie(
        state.tokens.cookie_name(),
        &token.value,
        state.tokens.validity().whole_seconds(),
    );
    let body = json!({
        "token": token.value,
        "expires_at": token.expires_at.unix_timestamp(),
    });
    Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(body)))
}

pub async fn logout_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = session_cookie(state.tokens.cookie_name(), "", 0);
    (StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)])
}

pub async fn list_titles_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.search_available(&params.q).await?))
}

pub async fn create_title_handler(
    State(state): State<Arc<AppState>>,
    Authenticated(_user_id): Authenticated,
    Json(title): Json<NewTitle>,
) -> Result<impl IntoResponse, AppError> {
    let title = state.store.create_title(title).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

pub async fn title_view_handler(
    State(state): State<Arc<AppState>>,
    Viewer(viewer): Viewer,
    Path(title_id): Path<TitleId>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.resolver.resolve_title_view(title_id, viewer).await?))
}

pub async fn chapter_handler(
    State(state): State<Arc<AppState>>,
    Viewer(viewer): Viewer,
    Path((title_id, name)): Path<(TitleId, String)>,
) -> Result<impl IntoResponse, AppError> {
    // Only the canonical spelling that the scanner accepts names a chapter.
    let chapter: ChapterNumber =
        parse_chapter_name(&name).ok_or(FolioError::NonCanonicalChapter { title_id, name })?;
    let opened = state.resolver.open_chapter(title_id, chapter, viewer).await?;
    Ok(Json(ChapterResponse {
        title_id: opened.title_id,
        chapter: opened.chapter,
        pages: opened.pages.iter().map(|p| page_url(p)).collect(),
    }))
}

pub async fn reading_list_handler(
    State(state): State<Arc<AppState>>,
    Authenticated(user_id): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.resolver.reading_list(user_id).await?))
}
