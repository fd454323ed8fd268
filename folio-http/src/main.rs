use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match folio_http::start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("folio-http: {e}");
            ExitCode::FAILURE
        }
    }
}
