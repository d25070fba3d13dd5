//! PlanLens command-line tool
//!
//! Imports an execution plan from a file or stdin and prints its tree,
//! rule-based insights, the compact digest, or the request body for the
//! configured analysis service.

mod logging;
mod output;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use planlens_analyzer::{
    AnalysisPayload, ParseOptions, PlanDialect, PlanExecution, PlanSource, chat_request_body,
    compact, evaluate_with, list_docs, lookup_doc, parse_plan,
};
use planlens_settings::PlanlensSettings;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::logging::LoggingConfig;

const STDIN_PATH: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "planlens")]
#[command(author, version, about = "Inspect and analyze database execution plans")]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the plan tree and its statistics
    Inspect(PlanArgs),

    /// Print rule-based insights
    Insights {
        #[command(flatten)]
        plan: PlanArgs,

        /// Print insights as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the compact digest sent to the analysis service
    Digest(PlanArgs),

    /// Print the chat-completion request for the analysis service
    Request {
        #[command(flatten)]
        plan: PlanArgs,

        /// Response language requested from the service
        #[arg(long)]
        locale: Option<String>,
    },

    /// List operator documentation, or show one entry
    Docs {
        /// Documentation key, e.g. hash_join
        key: Option<String>,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Plan file, or "-" to read stdin
    plan: PathBuf,

    /// Dialect of the plan (opengauss or dws); detected from the text when omitted
    #[arg(long, value_parser = parse_dialect)]
    dialect: Option<PlanDialect>,

    /// Title for the imported plan
    #[arg(long)]
    title: Option<String>,

    /// File holding the query the plan belongs to
    #[arg(long)]
    sql_file: Option<PathBuf>,

    /// Provenance of the plan (manual-import or live-connection)
    #[arg(long, value_parser = parse_source)]
    source: Option<PlanSource>,
}

fn parse_dialect(value: &str) -> std::result::Result<PlanDialect, String> {
    PlanDialect::parse(value).ok_or_else(|| format!("unknown dialect '{value}'"))
}

fn parse_source(value: &str) -> std::result::Result<PlanSource, String> {
    PlanSource::parse(value).ok_or_else(|| format!("unknown source '{value}'"))
}

impl PlanArgs {
    fn read_text(&self) -> Result<String> {
        if self.plan.as_os_str() == STDIN_PATH {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read plan from stdin")?;
            return Ok(text);
        }
        std::fs::read_to_string(&self.plan)
            .with_context(|| format!("Failed to read plan from {:?}", self.plan))
    }

    fn options(&self) -> Result<ParseOptions> {
        let mut options = ParseOptions::new();
        if let Some(dialect) = self.dialect {
            options = options.with_dialect(dialect);
        }
        if let Some(title) = &self.title {
            options = options.with_title(title.clone());
        }
        if let Some(source) = self.source {
            options = options.with_source(source);
        }
        if let Some(path) = &self.sql_file {
            let sql = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read SQL from {:?}", path))?;
            options = options.with_sql_text(sql);
        }
        Ok(options)
    }

    fn load(&self) -> Result<PlanExecution> {
        let text = self.read_text()?;
        let execution = parse_plan(&text, self.options()?)
            .with_context(|| format!("Failed to import plan from {:?}", self.plan))?;
        tracing::info!(
            title = %execution.summary.title,
            nodes = execution.stats.node_count,
            "imported plan"
        );
        Ok(execution)
    }
}

fn load_settings() -> PlanlensSettings {
    let mut settings = PlanlensSettings::load_or_default();
    settings.apply_env_overrides();
    settings
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Inspect(plan) => {
            let execution = plan.load()?;
            println!("{}", output::render_summary(&execution));
            println!("{}", output::render_plan(&execution));
        }
        Command::Insights { plan, json } => {
            let execution = plan.load()?;
            let settings = load_settings();
            let insights = evaluate_with(Some(&execution), &settings.insights);
            if json {
                println!("{}", serde_json::to_string_pretty(&insights)?);
            } else {
                println!("{}", output::render_insights(&insights));
            }
        }
        Command::Digest(plan) => {
            let execution = plan.load()?;
            println!("{}", serde_json::to_string_pretty(&compact(&execution))?);
        }
        Command::Request { plan, locale } => {
            let execution = plan.load()?;
            let settings = load_settings();
            let locale = locale.unwrap_or_else(|| settings.locale.clone());
            let payload = AnalysisPayload::from_execution(&execution, locale);
            let body = chat_request_body(&settings.ai, &payload)?;
            let endpoint = settings.ai.endpoint().unwrap_or_default();
            let request = serde_json::json!({ "endpoint": endpoint, "body": body });
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Docs { key: Some(key) } => match lookup_doc(&key) {
            Some(entry) => print!("{}", output::render_doc(entry)),
            None => bail!("Unknown documentation key: {key}"),
        },
        Command::Docs { key: None } => {
            println!("{}", output::render_doc_list(list_docs()));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(LoggingConfig::from_flags(cli.verbose, cli.log_json)) {
        eprintln!("Failed to initialize logging: {err}");
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
