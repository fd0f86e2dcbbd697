//! `rag`: ask the pipeline a question from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag_agents::{AgentSuite, CallLogger, PipelineRequest, RagPipeline};
use rag_config::{ProviderKind, Settings};
use rag_lm::Lm;
use rag_provider_openai::OpenAiProvider;
use rag_signature::catalog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod executor;

use executor::InterpreterExecutor;

/// Agentic RAG pipeline
#[derive(Parser)]
#[command(name = "rag", version)]
#[command(about = "Route a query through logged LLM call-sites", long_about = None)]
struct Cli {
    /// Settings file (defaults to ./rag.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a query
    Ask {
        /// The query
        query: String,

        /// File whose contents are passed as retrieved context
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// A previous conversation turn; repeat for more, oldest first
        #[arg(long)]
        history: Vec<String>,

        /// Run generated code with this interpreter (e.g. python3)
        #[arg(long)]
        execute_with: Option<String>,

        /// Seconds generated code may run before it is killed
        #[arg(long, default_value_t = executor::DEFAULT_TIMEOUT.as_secs())]
        exec_timeout: u64,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,

        /// Print the call log after the answer
        #[arg(long)]
        show_logs: bool,
    },

    /// List the call-site signatures
    Signatures,

    /// Print the effective settings, keys redacted
    Config,
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
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        Commands::Ask {
            query,
            context_file,
            history,
            execute_with,
            exec_timeout,
            json,
            show_logs,
        } => {
            let context = match context_file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => String::new(),
            };
            let request = PipelineRequest::new(query)
                .with_history(history)
                .with_context(context);
            let executor = execute_with.map(|interpreter| {
                InterpreterExecutor::new(interpreter)
                    .with_timeout(Duration::from_secs(exec_timeout))
            });
            ask(&settings, request, executor, json, show_logs).await
        }
        Commands::Signatures => {
            print_signatures();
            Ok(())
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

fn provider(settings: &Settings) -> Result<OpenAiProvider> {
    let key = settings.lm_api_key()?.expose();
    let provider = match settings.lm.provider {
        ProviderKind::Groq => OpenAiProvider::groq(key),
        ProviderKind::OpenAi => OpenAiProvider::new(key),
    }
    .with_model(settings.lm.model.as_str());
    Ok(match &settings.lm.base_url {
        Some(url) => provider.with_base_url(url.as_str()),
        None => provider,
    })
}

async fn ask(
    settings: &Settings,
    request: PipelineRequest,
    executor: Option<InterpreterExecutor>,
    json: bool,
    show_logs: bool,
) -> Result<()> {
    let lm = Arc::new(Lm::new(provider(settings)?, settings.lm_config()));
    let logger = Arc::new(CallLogger::with_tracked(settings.tracked_agents.iter().cloned()));
    let mut pipeline = RagPipeline::new(AgentSuite::new(lm, logger.clone()));
    if let Some(executor) = executor {
        pipeline = pipeline.with_executor(Arc::new(executor));
    }

    let response = pipeline.run(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.answer);
        if !response.follow_ups.is_empty() {
            println!("\nYou might also ask:");
            for question in &response.follow_ups {
                println!("  - {question}");
            }
        }
    }

    if show_logs {
        print!("{}", logger.show_logs());
    } else {
        let totals = logger.totals();
        tracing::info!(
            cost = %totals.cost,
            tokens = totals.tokens,
            secs = totals.time.as_secs_f64(),
            "query complete"
        );
    }
    Ok(())
}

fn print_signatures() {
    for signature in catalog::all() {
        println!("{}", signature.name);
        for field in &signature.inputs {
            println!("  in   {} ({})", field.name, field.kind.type_name());
        }
        for field in &signature.outputs {
            println!("  out  {} ({})", field.name, field.kind.type_name());
        }
    }
}
