//! `graphrag-chat` — terminal chat over a Neo4j graph.
//!
//! Reads `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD` and `OPENAI_API_KEY`
//! from the environment (or `.env`), extracts the graph schema once, then
//! answers one question per input line.

use clap::Parser;
use colored::Colorize;
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::error;
use tracing_subscriber::EnvFilter;

use graphrag_chat::rag::default_examples;
use graphrag_chat::{
    BoltBackend, ChatSession, GraphBackend, LanguageModel, OpenAiChat, Role, Settings,
    extract_schema, format_schema,
};

/// Ask questions about a Neo4j graph in plain language
#[derive(Parser)]
#[command(name = "graphrag-chat")]
#[command(version)]
struct Cli {
    /// Print the extracted schema and exit
    #[arg(long)]
    schema_only: bool,

    /// Chat model to use (overrides OPENAI_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Debug logging (equivalent to RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::from_env();
    if let Some(model) = cli.model {
        settings.openai_model = model;
    }

    // A connection failure ends startup here.
    let backend = BoltBackend::connect(&settings.bolt_config()?).await?;

    if cli.schema_only {
        let schema = extract_schema(&backend).await?;
        println!("{}", format_schema(&schema));
        backend.shutdown().await?;
        return Ok(());
    }

    let llm = OpenAiChat::from_settings(&settings);
    let model_name = llm.model_name().to_string();
    let mut session = ChatSession::start(backend, llm, default_examples()).await?;

    println!("{}", "💬 Neo4j graph chat".bold().green());
    println!("Model: {}", model_name.cyan());
    println!("Type a question, ':schema' for the schema, ':history' for the transcript, ':quit' to exit");

    let mut rl = DefaultEditor::new()?;
    loop {
        let line = match rl.readline(&format!("{} ", "you>".cyan())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        rl.add_history_entry(input)?;

        match input {
            ":quit" | ":exit" => break,
            ":schema" => println!("{}", session.schema_text()),
            ":history" => {
                for message in session.transcript() {
                    let who = match message.role {
                        Role::User => message.role.to_string().cyan(),
                        Role::Assistant => message.role.to_string().green(),
                    };
                    println!("{who}: {}", message.text);
                }
            }
            question => {
                println!("{}", "Generating an answer...".dimmed());
                match session.ask(question).await {
                    Ok(answer) => println!("{} {answer}", "assistant>".green()),
                    Err(e) => {
                        error!(error = %e, "question failed");
                        eprintln!("{}", format!("Error: {e}").red());
                    }
                }
            }
        }
    }

    println!("{}", "Goodbye!".green());
    session.shutdown().await?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
