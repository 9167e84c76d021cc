use anyhow::Context;
use clap::{Parser, Subcommand};
use ecn_pathdep::Result;
use ecn_pathdep::config::Config;
use ecn_pathdep::emit::{JsonlSink, emit_batched};
use ecn_pathdep::pipeline::Classifier;
use ecn_pathdep::schema::{ResultInfo, Variant};
use ecn_pathdep::source::{ObservationReader, read_run_info};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ecn-pathdep")]
#[command(about = "Classify ECN connectivity anomalies as path- or site-dependent", long_about = None)]
struct Cli {
    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug details.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one run window and write the results.
    Classify {
        /// Observation export (JSONL).
        #[arg(long)]
        observations: PathBuf,

        /// Run metadata (run id, time windows, output location).
        #[arg(long)]
        run: PathBuf,

        /// Override the pipeline variant from the configuration.
        #[arg(long, value_enum)]
        variant: Option<Variant>,

        /// Override the output location named by the run metadata.
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    if let Err(error) = run() {
        eprintln!("ecn-pathdep error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match cli.cmd {
        Commands::Classify {
            observations,
            run,
            variant,
            out,
            config,
        } => {
            let mut config = Config::load(config.as_deref()).context("load configuration")?;
            if let Some(variant) = variant {
                config.pipeline.variant = variant;
            }
            classify_run(&config, &observations, &run, out)?;
        }
        Commands::Config { config } => {
            let config = Config::load(config.as_deref()).context("load configuration")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn classify_run(
    config: &Config,
    observations: &Path,
    run: &Path,
    out: Option<PathBuf>,
) -> Result<()> {
    // 1) Upstream inputs: both must be reachable before any work starts.
    let run_info = read_run_info(run).context("read run metadata")?;
    let window = run_info.first_window()?;
    let reader = ObservationReader::open(observations).context("open observation store")?;

    tracing::info!(
        run_id = run_info.run_id,
        variant = %config.pipeline.variant,
        from = %window.from,
        to = %window.to,
        "starting classification"
    );

    // 2) Filter, group and classify.
    let mut classifier = Classifier::new(&config.pipeline, window);
    for doc in reader {
        classifier.observe_document(doc?)?;
    }
    let outcome = classifier.finish();

    // 3) Emit.
    let out = out.unwrap_or_else(|| run_info.output.clone());
    let mut sink = JsonlSink::create(&out)
        .with_context(|| format!("create output {}", out.display()))?;
    let batches = emit_batched(outcome.results, &mut sink, config.emit.batch_size)
        .with_context(|| format!("write results to {}", out.display()))?;

    // 4) Record what this run covered.
    let info_path = run_info.result_info_path(&out);
    let info = ResultInfo {
        run_id: run_info.run_id,
        variant: config.pipeline.variant,
        windows: vec![window],
        stats: outcome.stats,
        batches,
    };
    std::fs::write(&info_path, serde_json::to_string_pretty(&info)?)
        .with_context(|| format!("write result info {}", info_path.display()))?;

    println!(
        "Wrote {} results in {} batches to {}",
        outcome.stats.emitted,
        batches,
        out.display()
    );
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ECN_PATHDEP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
