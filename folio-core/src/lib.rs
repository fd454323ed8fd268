#![forbid(unsafe_code)]

pub mod accounts;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod resolve;
pub mod scan;
pub mod store;
pub mod token;

pub mod util {
    pub mod hex;
}

// Re-exports: stable API surface
pub use config::TokenSettings;
pub use error::{FolioError, Result};
pub use resolve::{ProgressResolver, completion_percentage, reconcile};
pub use scan::ChapterScanner;
pub use store::{Backend, Store, open_store};
pub use token::{SessionToken, TokenCarrier, TokenCodec};
