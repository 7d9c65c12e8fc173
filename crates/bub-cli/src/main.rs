use anyhow::{Context, Result};
use bub_mentions::{builtin_catalog, MentionPipeline, MentionRuntimeConfig};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "robobub",
    about = "GitHub mention bot: runs slash commands from comments it is mentioned in",
    version
)]
struct Cli {
    /// GitHub token used for notifications, comments, and reactions.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// GitHub REST API base URL.
    #[arg(long, default_value = "https://api.github.com")]
    api_base: String,

    /// Login allowed to run commands; repeat for multiple allowed runners.
    #[arg(long = "allow-runner", required = true)]
    allow_runner: Vec<String>,

    /// Character that marks the first line of a comment as a command.
    #[arg(long, default_value = "/")]
    command_prefix: char,

    /// Seconds between notification polls.
    #[arg(long, default_value_t = 60, value_parser = parse_positive_u64)]
    interval_seconds: u64,

    /// Poll one batch of mentions and exit.
    #[arg(long)]
    poll_once: bool,

    /// Per-request timeout for GitHub API calls, in milliseconds.
    #[arg(long, default_value_t = 30_000, value_parser = parse_positive_u64)]
    request_timeout_ms: u64,

    /// Maximum attempts per GitHub API call.
    #[arg(long, default_value_t = 3, value_parser = parse_positive_usize)]
    retry_max_attempts: usize,

    /// Base backoff delay between retries, in milliseconds.
    #[arg(long, default_value_t = 250, value_parser = parse_positive_u64)]
    retry_base_delay_ms: u64,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let catalog = builtin_catalog().context("failed to build command catalog")?;
    println!("robobub commands: {}", catalog.names().join(", "));

    let config = MentionRuntimeConfig {
        api_base: cli.api_base,
        token: cli.github_token,
        allowed_runners: cli.allow_runner,
        command_prefix: cli.command_prefix,
        request_timeout_ms: cli.request_timeout_ms,
        retry_max_attempts: cli.retry_max_attempts,
        retry_base_delay_ms: cli.retry_base_delay_ms,
    };
    let pipeline =
        MentionPipeline::new(config, catalog).context("failed to create mention pipeline")?;

    if cli.poll_once {
        let report = pipeline.process_pending_mentions().await?;
        print_report(&report);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(cli.interval_seconds));
    loop {
        ticker.tick().await;
        match pipeline.process_pending_mentions().await {
            Ok(report) => print_report(&report),
            Err(error) => eprintln!("mention poll error: {error:#}"),
        }
    }
}

fn print_report(report: &bub_mentions::MentionBatchReport) {
    println!(
        "mention poll: seen={} greeted={} executed={} rejected={} failed={} errors={}",
        report.mentions_seen,
        report.greetings_posted,
        report.commands_executed,
        report.commands_rejected,
        report.commands_failed,
        report.failures
    );
}
