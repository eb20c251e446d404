use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use vidseek_core::{
    PipelineConfig, Provider, SearchEngine, format_results_readable, get_transcripts_dir,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Openai,
    Grok,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "vidseek")]
#[command(about = "Find the moments in YouTube videos that answer your question")]
struct Cli {
    /// Search query. Read from stdin when omitted.
    query: Option<String>,

    /// AI provider for topic extraction and transcript analysis
    #[arg(short, long, default_value = "openai")]
    provider: CliProvider,

    /// Caption language to request (no fallback to other languages)
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Number of videos to analyze
    #[arg(short = 'n', long, default_value_t = 3)]
    max_results: u32,

    /// Per-video time limit in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Save raw transcripts to the cache directory
    #[arg(long)]
    save_transcripts: bool,

    /// Save raw transcripts to this directory (implies --save-transcripts)
    #[arg(long)]
    transcripts_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default()
            .with_language(&self.lang)
            .with_max_results(self.max_results);

        if let Some(secs) = self.timeout {
            config = config.with_unit_timeout(Duration::from_secs(secs));
        }

        match (&self.transcripts_dir, self.save_transcripts) {
            (Some(dir), _) => config.with_transcripts_dir(dir),
            (None, true) => config.with_transcripts_dir(get_transcripts_dir()),
            (None, false) => config,
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vidseek=info,vidseek_core=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_query() -> Result<String> {
    print!("Enter your search query: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn create_spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")?,
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = cli.pipeline_config();
    let provider: Provider = cli.provider.clone().into();

    // Validate API keys early
    let engine = match SearchEngine::from_provider(&provider, &config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let query = match cli.query.clone() {
        Some(query) => query,
        None => read_query()?,
    };
    if query.trim().is_empty() {
        eprintln!("{} query must not be empty", style("Error:").red().bold());
        std::process::exit(2);
    }

    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("vidseek").cyan().bold(),
            style("Video Moment Search").dim()
        );
    }

    let started = Instant::now();
    let spinner = (!cli.json)
        .then(|| {
            create_spinner(&format!(
                "Searching {} videos with {}...",
                config.max_results,
                provider.name()
            ))
        })
        .transpose()?;

    let results = engine.search(&query).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    let results = match results {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{} {}", style("Search failed:").red().bold(), e);
            std::process::exit(1);
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!(
        "{} Found {} excerpts {}",
        style("✓").green().bold(),
        results.len(),
        style(format!("[{}]", format_duration(started.elapsed()))).dim()
    );
    if let Some(dir) = &config.transcripts_dir {
        println!(
            "{} {}",
            style("Transcripts:").dim(),
            style(dir.display()).cyan()
        );
    }
    println!("{}", style("─".repeat(60)).dim());

    if results.is_empty() {
        println!("No relevant excerpts found for the query.");
    } else {
        println!("{}", format_results_readable(&results));
    }

    Ok(())
}
