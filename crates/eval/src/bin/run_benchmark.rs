use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use eval::{
    BenchConfig, Benchmarker, InputText, ModelController, NoopController, OllamaCli, get_articles,
    plot_benchmark, report, storage, summarize,
};
use extract::OllamaChatClient;

/// Time local extraction prompts against an Ollama server.
#[derive(Parser, Debug)]
#[command(name = "run_benchmark", version, about, long_about = None)]
struct Cli {
    /// YAML config file
    #[arg(short, long, env = "BENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for input and output JSONL files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Base URL of the Ollama server
    #[arg(long)]
    ollama_url: Option<String>,

    /// Don't stop loaded models between runs
    #[arg(long)]
    no_stop: bool,

    /// Skip rendering the scatter plot
    #[arg(long)]
    no_plot: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(url) = cli.ollama_url {
        config.ollama_url = url;
    }
    if cli.no_stop {
        config.stop_models = false;
    }

    init_tracing(&config.log_level, cli.json_logs)?;

    println!("=== Extraction Prompt Benchmark ===\n");

    if config.stop_models {
        run(&config, OllamaCli::default(), cli.no_plot).await
    } else {
        run(&config, NoopController, cli.no_plot).await
    }
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(level).context(format!("Invalid log level: '{}'", level))?
        }
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn run<C: ModelController>(
    config: &BenchConfig,
    controller: C,
    no_plot: bool,
) -> Result<()> {
    let client = match config.request_timeout_secs {
        Some(secs) => {
            OllamaChatClient::with_timeout(config.ollama_url.clone(), Duration::from_secs(secs))?
        }
        None => OllamaChatClient::new(config.ollama_url.clone()),
    };

    let texts: Vec<InputText> = match &config.inputs {
        Some(path) => storage::read_inputs(path)?,
        None => get_articles(),
    };
    println!("Inputs: {} texts\n", texts.len());

    let benchmarker = Benchmarker::new(client, controller);
    let results = benchmarker.run_benchmark(&texts, &config.models).await?;

    let summary = summarize(&results);
    report::print_results(&results, &summary);

    let inputs_path = storage::write_inputs(&config.output_dir, &texts)?;
    let result_paths = storage::write_results(&config.output_dir, &results)?;
    let summary_path = storage::write_summary(&config.output_dir, &summary)?;
    info!(
        inputs = %inputs_path.display(),
        outputs = result_paths.len(),
        summary = %summary_path.display(),
        "Results written"
    );
    println!("\n✅ Results saved to {}", config.output_dir.display());

    if !no_plot && plot_benchmark(&results, &config.figure_path)? {
        println!("✅ Plot saved to {}", config.figure_path.display());
    }

    Ok(())
}
