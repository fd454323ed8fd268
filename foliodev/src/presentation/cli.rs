use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "foliodev CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct SecretArgs {
    /// 32-byte hex signing key
    #[arg(long, env = "FOLIO_TOKEN_SECRET", hide_env_values = true)]
    pub secret: String,
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Issue a session token for a user id
    Issue {
        user: i64,
        #[command(flatten)]
        secret: SecretArgs,
        /// validity window in hours (2..=24)
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Verify a token and print the user id it carries
    Verify {
        token: String,
        #[command(flatten)]
        secret: SecretArgs,
    },
}

#[derive(Subcommand)]
pub enum ScanCommands {
    /// List chapter numbers found under a storage root
    Chapters { root: PathBuf, title: i64 },
    /// List page files of one chapter
    Pages {
        root: PathBuf,
        title: i64,
        chapter: u32,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Create the database file and schema if missing
    Init { db: PathBuf },
}

#[derive(Subcommand)]
pub enum TitleCommands {
    /// Add a title to the catalog
    Add {
        db: PathBuf,
        name: String,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long, default_value = "")]
        genre: String,
        #[arg(long, default_value = "")]
        language: String,
        #[arg(long, default_value = "")]
        publisher: String,
        #[arg(long, default_value = "")]
        description: String,
        /// declared chapter count (0 = unknown)
        #[arg(long, default_value_t = 0)]
        total: u32,
        #[arg(long)]
        available: bool,
    },
    /// List available titles, optionally filtered by name
    List {
        db: PathBuf,
        #[arg(long, default_value = "")]
        query: String,
    },
}

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Record that a user viewed a chapter (never moves progress backwards)
    Record {
        db: PathBuf,
        user: i64,
        title: i64,
        chapter: u32,
    },
    /// Show a user's reading list
    Show { db: PathBuf, user: i64 },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a fresh random signing key as hex
    Keygen,

    #[command(subcommand)]
    /// Issue and verify session tokens
    Token(TokenCommands),

    #[command(subcommand)]
    /// Inspect the chapter storage layout
    Scan(ScanCommands),

    #[command(subcommand)]
    /// Database maintenance
    Db(DbCommands),

    #[command(subcommand)]
    /// Manage the title catalog
    Title(TitleCommands),

    #[command(subcommand)]
    /// Inspect and advance reading progress
    Progress(ProgressCommands),

    /// Resolve a title's chapter list against a reader's progress
    View {
        db: PathBuf,
        root: PathBuf,
        title: i64,
        #[arg(long)]
        user: Option<i64>,
    },
}
