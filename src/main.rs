//! llm-usage - meter provider responses from the command line
//!
//! ## Usage
//!
//! ```bash
//! # Process a saved response and print the usage record
//! llm-usage process --provider openai --endpoint /v1/chat/completions response.json
//!
//! # Replay a captured SSE stream
//! llm-usage process --provider anthropic --endpoint /v1/messages --stream capture.sse
//!
//! # Price a usage tuple
//! llm-usage price --provider openai --model gpt-4o --prompt-tokens 1000 --completion-tokens 200
//!
//! # Which provider serves a host
//! llm-usage hosts my-resource.openai.azure.com api.anthropic.com
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use llm_usage::core::cost::{UsageQuantities, format_cents};
use llm_usage::utils::logging::init_logging;
use llm_usage::{
    InMemorySink, MeterConfig, ModelType, PricingTierName, Provider, ResponseBody, TokenMetrics,
    UsageMeter,
};
use serde_json::Value;
use tracing::{debug, error};

/// Usage and cost metering for generative-AI provider calls
#[derive(Parser, Debug)]
#[command(name = "llm-usage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file; environment variables are used when absent
    #[arg(short, long, env = "LLM_USAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a saved provider response and print the usage record
    Process {
        #[arg(long)]
        provider: Provider,
        /// Request path the response came from
        #[arg(long)]
        endpoint: Option<String>,
        /// Model the caller asked for
        #[arg(long)]
        model: Option<String>,
        /// JSON file with the request payload
        #[arg(long)]
        request: Option<PathBuf>,
        /// Treat the input as a captured stream, one SSE line or JSON chunk per line
        #[arg(long)]
        stream: bool,
        /// Response body file
        response: PathBuf,
    },
    /// Price a usage tuple against the catalog
    Price {
        #[arg(long)]
        provider: Provider,
        #[arg(long)]
        model: String,
        #[arg(long)]
        tier: Option<PricingTierName>,
        #[arg(long)]
        kind: Option<ModelType>,
        #[arg(long, default_value_t = 0)]
        prompt_tokens: u64,
        #[arg(long, default_value_t = 0)]
        completion_tokens: u64,
        #[arg(long, default_value_t = 0)]
        cached_tokens: u64,
        #[arg(long, default_value_t = 0)]
        images: u64,
        #[arg(long)]
        seconds: Option<f64>,
        #[arg(long)]
        characters: Option<u64>,
    },
    /// Show which provider serves each host
    Hosts {
        #[arg(required = true)]
        hosts: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("llm-usage failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => MeterConfig::from_file(path)?,
        None => MeterConfig::from_env()?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging(&config.logging);
    debug!(config = ?cli.config, "Configuration loaded");

    let sink = Arc::new(InMemorySink::new());
    let meter = UsageMeter::from_config(&config, sink.clone())?;

    match cli.command {
        Command::Process {
            provider,
            endpoint,
            model,
            request,
            stream,
            response,
        } => {
            let mut builder = meter.context(provider);
            if let Some(endpoint) = endpoint {
                builder = builder.endpoint(endpoint);
            }
            if let Some(model) = model {
                builder = builder.model(model);
            }
            if let Some(path) = request {
                builder = builder.request_body(read_json(&path)?);
            }

            let handle = if stream {
                replay_stream(&meter, builder, &response)?
            } else {
                let bytes = std::fs::read(&response)
                    .with_context(|| format!("reading {}", response.display()))?;
                let mut ctx = builder.build();
                meter.prepare(&mut ctx);
                meter.record(&mut ctx, ResponseBody::from_bytes(bytes, None))?
            };

            match handle {
                Some(_) => {
                    for record in sink.records() {
                        println!("{}", serde_json::to_string_pretty(&record)?);
                    }
                }
                None => println!("response skipped, nothing recorded"),
            }
        }
        Command::Price {
            provider,
            model,
            tier,
            kind,
            prompt_tokens,
            completion_tokens,
            cached_tokens,
            images,
            seconds,
            characters,
        } => {
            let usage = UsageQuantities {
                tokens: TokenMetrics::new(prompt_tokens, completion_tokens)
                    .with_cached(cached_tokens),
                duration_seconds: seconds,
                characters,
                images,
                ..Default::default()
            };
            let breakdown = meter
                .calculator()
                .calculate(provider, &model, tier, kind, &usage);
            if !breakdown.model_found {
                bail!("{} is not in the {} pricing catalog", model, provider);
            }
            if let Some(cost) = breakdown.prompt_cost {
                println!("prompt:     {}", format_cents(cost));
            }
            if let Some(cost) = breakdown.completion_cost {
                println!("completion: {}", format_cents(cost));
            }
            if breakdown.unit_cost > 0.0 {
                println!("units:      {}", format_cents(breakdown.unit_cost));
            }
            println!("total:      {}", format_cents(breakdown.total_cost));
            if let Some(tier) = breakdown.tier {
                println!("tier:       {}", tier.as_str());
            }
        }
        Command::Hosts { hosts } => {
            for host in hosts {
                match meter.detect_provider(&host) {
                    Some(provider) => println!("{}\t{}", host, provider),
                    None => println!("{}\t-", host),
                }
            }
        }
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn replay_stream(
    meter: &UsageMeter,
    builder: llm_usage::RequestContextBuilder,
    path: &Path,
) -> Result<Option<llm_usage::RecordHandle>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut tracker = meter.start_stream(builder);
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        tracker.observe(line);
    }
    Ok(meter.finish_stream(&mut tracker)?)
}
