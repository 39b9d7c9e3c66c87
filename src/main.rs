//! # corpus-qa CLI (`cqa`)
//!
//! The `cqa` binary answers questions against the internal corpus with
//! citations, entirely from extracted text.
//!
//! ## Usage
//!
//! ```bash
//! cqa --config ./config/cqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cqa ask "<query>"` | Answer one question and print citations |
//! | `cqa repl` | Interactive question loop (build the index once) |
//! | `cqa stats` | Corpus overview: chunk counts per document and type |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use corpus_qa::config::{self, Config};
use corpus_qa::engine::Assistant;
use corpus_qa::loader;
use corpus_qa::models::Response;

/// corpus-qa — grounded, citation-backed Q&A over internal documents.
#[derive(Parser)]
#[command(
    name = "cqa",
    about = "Grounded, citation-backed Q&A over a small internal document corpus",
    version,
    long_about = "corpus-qa retrieves relevant passages from a curated internal corpus with a \
    hybrid keyword + semantic index and assembles citation-backed answers from extracted \
    sentences only. It provides educational, non-medical information."
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/cqa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question.
    ///
    /// Builds the retrieval index from the data directory, answers the
    /// query, and prints the answer followed by its sources.
    Ask {
        /// The question to answer.
        query: String,

        /// Number of candidate chunks to retrieve.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Interactive question loop.
    ///
    /// Builds the index once, then reads one question per line from
    /// stdin until EOF or `exit`.
    Repl,

    /// Print corpus statistics.
    ///
    /// Loads and chunks the corpus, then prints chunk counts per
    /// document and per chunk type. Useful for verifying the data
    /// directory before asking questions.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Ask { query, top_k } => {
            let assistant = Assistant::new(config).await?;
            let response = assistant.answer_user_query(&query, top_k).await;
            print_response(&response);
        }
        Commands::Repl => {
            let assistant = Assistant::new(config).await?;
            run_repl(&assistant).await?;
        }
        Commands::Stats => {
            run_stats(&config)?;
        }
    }

    Ok(())
}

fn print_response(response: &Response) {
    println!("{}", response.answer);

    if !response.citations.is_empty() {
        println!();
        println!("Sources:");
        for citation in &response.citations {
            println!("- {} : {}", citation.doc_id, citation.section_id);
        }
    }

    println!();
    println!("Note: internal informational use only. Not medical advice, diagnosis, or treatment.");
}

async fn run_repl(assistant: &Assistant) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!(
        "corpus-qa ready ({} chunks indexed). Type a question, or 'exit' to quit.",
        assistant.corpus().len()
    );

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }

        let response = assistant.answer_user_query(query, None).await;
        print_response(&response);
    }

    Ok(())
}

fn run_stats(config: &Config) -> Result<()> {
    let chunks = loader::load_chunks(config)?;

    let mut by_doc: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for chunk in &chunks {
        *by_doc.entry(chunk.doc_id.as_str()).or_insert(0) += 1;
        *by_type.entry(chunk.chunk_type.as_str()).or_insert(0) += 1;
    }

    println!("corpus-qa — Corpus Stats");
    println!("========================");
    println!();
    println!("  Data dir:  {}", config.data.dir.display());
    println!("  Chunks:    {}", chunks.len());
    println!();
    println!("  By document:");
    for (doc, count) in &by_doc {
        println!("    {:<40} {}", doc, count);
    }
    println!();
    println!("  By type:");
    for (chunk_type, count) in &by_type {
        println!("    {:<16} {}", chunk_type, count);
    }

    Ok(())
}
