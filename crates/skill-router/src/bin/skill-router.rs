//! Prompt hook entry point.
//!
//! Usage: `echo '{"prompt":"fix this bug"}' | skill-router`

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use skill_router::hook::{self, ResolveRequest};
use skill_router::settings::{
    OutputFormat, RouterSettings, DEBT_ROOT_ENV, DEFAULT_LOG_FILTER, LOG_ENV, RULES_ENV,
};
use skill_router::{DispatchResult, Dispatcher, Outcome, OutcomeReport, Resolution, RouteResult};

#[derive(Debug, Parser)]
#[command(name = "skill-router", version, about = "Route prompts to capability directives")]
struct Cli {
    /// Rule file (JSON). Defaults to the builtin table.
    #[arg(long, global = true, env = RULES_ENV)]
    rules: Option<PathBuf>,

    /// Root directory for debt records. Defaults to the table's `debt_root`.
    #[arg(long, global = true, env = DEBT_ROOT_ENV)]
    debt_root: Option<PathBuf>,

    /// Output format: json or text.
    #[arg(long, global = true, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dispatch the prompt read from stdin (default).
    Dispatch,
    /// Print the directive for a chained capability.
    Activate { capability: String },
    /// Resolve a completed capability's outcome to its next step.
    Resolve {
        capability: String,
        #[arg(long)]
        outcome: Outcome,
        /// Index of the rule that fired, as reported in `ruleIndex`.
        #[arg(long)]
        rule: Option<usize>,
        /// Issue slug for a debt record; overrides the configured slug.
        #[arg(long)]
        slug: Option<String>,
        /// Free-text context stored in a debt record.
        #[arg(long, default_value = "")]
        context: String,
        /// Render debt records instead of writing them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Load and validate the rule table.
    Validate,
    /// List every rule matching the given text, in table order.
    Explain { text: Vec<String> },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let settings = RouterSettings {
        rules_path: cli.rules,
        debt_root: cli.debt_root,
        format: cli.format,
    };

    let result = match cli.command.unwrap_or(Command::Dispatch) {
        Command::Dispatch => {
            run_dispatch(&settings).await;
            Ok(())
        }
        Command::Activate { capability } => run_activate(&settings, &capability),
        Command::Resolve {
            capability,
            outcome,
            rule,
            slug,
            context,
            dry_run,
        } => {
            let request = ResolveRequest {
                capability,
                rule,
                outcome,
                report: OutcomeReport { slug, context },
                dry_run,
            };
            run_resolve(&settings, request).await
        }
        Command::Validate => run_validate(&settings),
        Command::Explain { text } => run_explain(&settings, &text.join(" ")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("skill-router: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// The hook path. Matching is advisory: every failure degrades to a no-op
/// and the process still exits successfully.
async fn run_dispatch(settings: &RouterSettings) {
    let mut input = String::new();
    if let Err(error) = tokio::io::stdin().read_to_string(&mut input).await {
        tracing::warn!("failed to read stdin: {error}");
        input.clear();
    }

    let result = hook::dispatch_or_noop(settings, &input);

    if let Err(error) = emit_dispatch(settings.format, &result) {
        tracing::warn!("failed to write directive: {error}");
    }
}

fn run_activate(settings: &RouterSettings, capability: &str) -> RouteResult<()> {
    let dispatcher = Dispatcher::new(settings.load_table()?);
    emit_dispatch(settings.format, &dispatcher.activate(capability))
}

async fn run_resolve(settings: &RouterSettings, request: ResolveRequest) -> RouteResult<()> {
    let dry_run = request.dry_run;
    let output = hook::resolve_outcome(settings, request).await?;
    if dry_run {
        if let Some(debt) = &output.debt {
            eprint!("{}", debt.record.render_markdown());
        }
    }

    match settings.format {
        OutputFormat::Json => emit_json(&output),
        OutputFormat::Text => {
            let mut text = format!("{}: {}\n", output.capability, output.outcome);
            for directive in &output.next {
                text.push_str(&DispatchResult::Directive(directive.clone()).render_text());
            }
            if let Some(debt) = &output.debt {
                text.push_str(&format!("debt record: {}\n", debt.path.display()));
            }
            if matches!(output.resolution, Resolution::Complete) {
                text.push_str("complete\n");
            }
            emit_text(&text)
        }
    }
}

fn run_validate(settings: &RouterSettings) -> RouteResult<()> {
    let summary = hook::validate(settings)?;
    match settings.format {
        OutputFormat::Json => emit_json(&summary),
        OutputFormat::Text => emit_text(&format!(
            "ok: {} rules, {} capabilities\n",
            summary.rules, summary.capabilities
        )),
    }
}

fn run_explain(settings: &RouterSettings, text: &str) -> RouteResult<()> {
    let dispatcher = Dispatcher::new(settings.load_table()?);
    let matches = dispatcher.explain(text);

    match settings.format {
        OutputFormat::Json => {
            let summaries: Vec<_> = matches.iter().map(|rule| rule.summary()).collect();
            emit_json(&summaries)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for (position, rule) in matches.iter().enumerate() {
                let winner = if position == 0 { "*" } else { " " };
                out.push_str(&format!(
                    "{winner} #{:<3} {:<28} {:<16} {}\n",
                    rule.index,
                    rule.capability_id,
                    rule.output_marker,
                    rule.pattern.as_str()
                ));
            }
            if matches.is_empty() {
                out.push_str("no rule matches\n");
            }
            emit_text(&out)
        }
    }
}

fn emit_dispatch(format: OutputFormat, result: &DispatchResult) -> RouteResult<()> {
    match format {
        OutputFormat::Json => emit_json(&result.payload()),
        OutputFormat::Text => emit_text(&result.render_text()),
    }
}

fn emit_json<T: Serialize>(value: &T) -> RouteResult<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn emit_text(text: &str) -> RouteResult<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}
