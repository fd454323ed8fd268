use std::sync::Arc;

use folio_core::{ChapterScanner, ProgressResolver, Result, Store, TokenCodec, open_store};

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub resolver: ProgressResolver<Store, Store>,
    pub tokens: TokenCodec,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let store = open_store(config.backend()).await?;
        let scanner = ChapterScanner::new(config.storage_root.clone());
        let tokens = TokenCodec::new(&config.tokens).with_cookie_name(config.cookie_name.clone());

        Ok(Arc::new(Self {
            resolver: ProgressResolver::new(store.clone(), store.clone(), scanner),
            store,
            tokens,
            config,
        }))
    }
}
