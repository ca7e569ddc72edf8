use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod data_dir;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod language;
pub mod lexical;
pub mod output;
pub mod store;
pub mod text;

use cli::{Cli, Command};
use data_dir::DataDir;
use embedding::{Embedder, HashEmbedder};
use engine::{SearchEngine, SearchParams};
use store::DocumentStore;

fn init_tracing(verbose: u8) {
    let filter = if let Ok(env) = std::env::var("FUSERANK_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error::Error::EmptyInput) => {
            eprintln!("Input cannot be empty.");
            std::process::ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> error::Result<()> {
    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let store = DocumentStore::open(&data_dir.store_db())?;
    let mut engine = SearchEngine::new(store, HashEmbedder::default())?;

    match cli.command {
        Command::Add(args) => {
            let id = engine.insert(&args.text)?;
            let language = engine
                .store()
                .get(id)?
                .and_then(|d| d.language)
                .unwrap_or_else(|| "unknown".to_string());
            println!("Inserted document #{id} (language: {language})");
        }
        Command::Search(args) => {
            let params = SearchParams {
                top_k: args.top_k,
                threshold: args.threshold,
                weight: args.weight,
            };
            let results = engine.search(&args.query, &params)?;

            if args.json {
                output::format_json(&results, &args.query);
            } else {
                output::format_human(&results, &args.query);
            }
        }
        Command::Status(args) => {
            let documents = engine.document_count()?;
            let dimension = engine.store().dimension()?;
            let embedder = engine.embedder().name();

            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "data_dir": data_dir.root().display().to_string(),
                        "embedder": embedder,
                        "dimension": dimension,
                        "documents": documents,
                    })
                );
            } else {
                println!("Data directory: {}", data_dir.root().display());
                println!("Embedder: {embedder}");
                match dimension {
                    Some(d) => println!("Dimension: {d}"),
                    None => println!("Dimension: (unset, no documents yet)"),
                }
                println!("Documents: {documents}");
            }
        }
        Command::Completions(_) => unreachable!("handled above"),
    }

    Ok(())
}
