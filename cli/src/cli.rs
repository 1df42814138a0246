use clap::{Args, Parser, Subcommand};
use knowledge_core::{API_URL_ENV, DEFAULT_BASE_URL};

#[derive(Parser, Debug)]
#[command(name = "knowledge", version, about = "Manage knowledge entries from the terminal")]
pub struct Cli {
    /// Base URL of the knowledge-entries backend
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Log requests and store activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List entries, most recently updated first
    List,

    /// Create a new entry
    Add(AddArgs),

    /// Change fields of an existing entry
    Edit(EditArgs),

    /// Delete an entry
    Delete {
        /// Entry id
        id: String,
    },
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct AddArgs {
    #[arg(short, long)]
    pub title: String,

    #[arg(short, long)]
    pub description: String,

    /// Image as a base64 data URL (JPEG, PNG or WebP)
    #[arg(short, long)]
    pub image: Option<String>,
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct EditArgs {
    /// Entry id
    pub id: String,

    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Image as a base64 data URL (JPEG, PNG or WebP)
    #[arg(short, long)]
    pub image: Option<String>,
}
