use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "fuserank",
    about = "A hybrid semantic + lexical search CLI for small text corpora"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest a document into the corpus
    Add(AddArgs),
    /// Search the corpus with fused semantic + lexical ranking
    Search(SearchArgs),
    /// Show system status and statistics
    Status(StatusArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Add --

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// The document text
    pub text: String,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return
    #[arg(short = 'n', long, default_value = "100")]
    pub top_k: usize,

    /// Minimum semantic similarity for a candidate (0.0 to 1.0)
    #[arg(long, default_value = "0.4")]
    pub threshold: f32,

    /// Semantic weight; lexical weight is 1 - weight (0.0 to 1.0)
    #[arg(short = 'w', long, default_value = "0.5")]
    pub weight: f32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "fuserank",
            &mut std::io::stdout(),
        );
    }
}
