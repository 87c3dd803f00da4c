mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faqbot_core::{
    extract_text, ocr_available, Assistant, AssistantConfig, OllamaGenerator, TextGenerator,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "faqbot", version)]
#[command(about = "FAQ assistant with fuzzy matching and a local LLM fallback")]
struct Cli {
    /// TOML config file. Defaults to <config dir>/faqbot/config.toml when present.
    #[arg(long, global = true, env = "FAQBOT_CONFIG")]
    config: Option<PathBuf>,

    /// CSV with qtype, Question and Answer columns.
    #[arg(long, global = true, env = "FAQBOT_DATASET")]
    dataset: Option<PathBuf>,

    /// Base URL of the model service.
    #[arg(long, global = true, env = "OLLAMA_HOST")]
    host: Option<String>,

    #[arg(long, global = true, env = "FAQBOT_MODEL")]
    model: Option<String>,

    /// Minimum match score (0-100) for a direct FAQ answer.
    #[arg(long, global = true, env = "FAQBOT_THRESHOLD", value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,

    /// Model request timeout; 0 disables it.
    #[arg(long, global = true, env = "FAQBOT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Start even when the model service is not reachable.
    #[arg(long, global = true)]
    skip_health_check: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive chat (the default)
    Chat,
    /// Answer a single question
    Ask {
        #[arg(long)]
        question: String,
        /// PDF, image or text file used as context for the fallback answer
        #[arg(long)]
        attach: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Show the best FAQ match without contacting the model service
    Match {
        #[arg(long)]
        question: String,
    },
    /// Print the text extracted from an attachment
    Extract { path: PathBuf },
    /// Probe the model service and the OCR backend
    Check,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    question: &'a str,
    response: &'a str,
}

impl Cli {
    fn resolve_config(&self) -> Result<AssistantConfig> {
        let mut config = AssistantConfig::load_or_default(self.config.as_deref())
            .context("load config")?;

        if let Some(dataset) = &self.dataset {
            config.dataset = dataset.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }

        config.validate()?;
        Ok(config)
    }

    fn build_assistant(&self) -> Result<Assistant> {
        let config = self.resolve_config()?;
        let assistant = Assistant::from_config(&config)
            .with_context(|| format!("load dataset {}", config.dataset.display()))?;

        if self.skip_health_check {
            tracing::warn!("skipping model service health check");
        } else {
            assistant.health_check().with_context(|| {
                format!(
                    "model service at {} is not ready (use --skip-health-check to start anyway)",
                    config.host
                )
            })?;
        }

        Ok(assistant)
    }
}

fn ocr_status() -> &'static str {
    if ocr_available() {
        "available"
    } else {
        "unavailable"
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Commands::Chat) {
        Commands::Chat => {
            let assistant = cli.build_assistant()?;
            let model_status = if cli.skip_health_check {
                "not checked".to_string()
            } else {
                let generator = assistant.generator();
                format!("ok at {}, model {}", generator.host(), generator.model())
            };
            repl::run(&assistant, &model_status)?;
        }
        Commands::Ask {
            question,
            attach,
            json,
        } => {
            let assistant = cli.build_assistant()?;
            let response = assistant.respond(question, attach.as_deref());
            if *json {
                let out = AskOutput {
                    question,
                    response: &response,
                };
                println!("{}", serde_json::to_string(&out)?);
            } else {
                println!("{response}");
            }
        }
        Commands::Match { question } => {
            let config = cli.resolve_config()?;
            let entries = faqbot_core::load_entries_csv(&config.dataset)
                .with_context(|| format!("load dataset {}", config.dataset.display()))?;
            let result = faqbot_core::find_best_match(question, &entries, config.threshold);

            println!(
                "decision={:?} score={} category={} question={}",
                result.decision,
                result.score,
                result.category.as_deref().unwrap_or("null"),
                result.question.as_deref().unwrap_or("null")
            );
            if let Some(answer) = &result.answer {
                println!("answer={answer}");
            }
        }
        Commands::Extract { path } => {
            println!("{}", extract_text(path));
        }
        Commands::Check => {
            let config = cli.resolve_config()?;
            println!("ocr={}", ocr_status());

            let generator = OllamaGenerator::new(&config.host, &config.model, config.timeout())?;
            generator
                .health_check()
                .with_context(|| format!("model service at {}", generator.host()))?;
            println!("model_service=ok host={} model={}", generator.host(), generator.model());
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
