mod application;
mod presentation;

use folio_core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    application::run().await
}
