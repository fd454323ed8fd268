pub mod handlers;

use crate::presentation::cli::{
    Cli, Commands, DbCommands, ProgressCommands, ScanCommands, TitleCommands, TokenCommands,
};
use clap::Parser;
use folio_core::Result;
use folio_core::domain::NewTitle;
use tracing_subscriber::EnvFilter;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Keygen => handlers::handle_keygen(),
        Commands::Token(cmd) => match cmd {
            TokenCommands::Issue {
                user,
                secret,
                hours,
            } => handlers::handle_token_issue(user, &secret.secret, hours),
            TokenCommands::Verify { token, secret } => {
                handlers::handle_token_verify(&token, &secret.secret)
            }
        },
        Commands::Scan(cmd) => match cmd {
            ScanCommands::Chapters { root, title } => handlers::handle_scan_chapters(root, title),
            ScanCommands::Pages {
                root,
                title,
                chapter,
            } => handlers::handle_scan_pages(root, title, chapter),
        },
        Commands::Db(cmd) => match cmd {
            DbCommands::Init { db } => handlers::handle_db_init(db).await,
        },
        Commands::Title(cmd) => match cmd {
            TitleCommands::Add {
                db,
                name,
                author,
                genre,
                language,
                publisher,
                description,
                total,
                available,
            } => {
                let title = NewTitle {
                    name,
                    author,
                    genre,
                    language,
                    publisher,
                    description,
                    total_chapters: total,
                    available,
                };
                handlers::handle_title_add(db, title).await
            }
            TitleCommands::List { db, query } => handlers::handle_title_list(db, &query).await,
        },
        Commands::Progress(cmd) => match cmd {
            ProgressCommands::Record {
                db,
                user,
                title,
                chapter,
            } => handlers::handle_progress_record(db, user, title, chapter).await,
            ProgressCommands::Show { db, user } => handlers::handle_progress_show(db, user).await,
        },
        Commands::View {
            db,
            root,
            title,
            user,
        } => handlers::handle_view(db, root, title, user).await,
    }
}
