use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use fraudtree_analysis::{AnalysisService, ClassificationParams, IsolationParams};
use fraudtree_io::{CsvFeatureSource, FeatureSource, ModelStore};

#[derive(Parser)]
#[command(name = "fraudtree")]
#[command(about = "Tree-ensemble fraud scoring over transaction feature tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Transaction CSV with amt, distance_km, age, trans_hour and is_fraud columns
    #[arg(long, default_value = "transactions.csv", global = true)]
    data: PathBuf,

    /// Directory holding the stored models (one per ensemble kind)
    #[arg(long, default_value = "models", global = true)]
    model_dir: PathBuf,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Unsupervised anomaly scoring with an isolation forest
    Isolation {
        #[command(subcommand)]
        action: IsolationAction,
    },

    /// Supervised fraud classification with a bagged decision forest
    Forest {
        #[command(subcommand)]
        action: ForestAction,
    },
}

#[derive(Subcommand)]
enum IsolationAction {
    /// Train on every record, store the model, and report metrics
    Train(IsolationArgs),

    /// Score every record with the stored model and report metrics
    Evaluate {
        /// Flagging threshold in (0, 1]; defaults to the one saved with the model
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Subcommand)]
enum ForestAction {
    /// Train on every labeled record, store the model, and report metrics
    Train(ForestArgs),

    /// Predict every record with the stored model and report metrics
    Evaluate,

    /// Predict labels with the stored model
    Predict {
        /// One comma-separated feature vector (amt,distance_km,age,trans_hour);
        /// when omitted, every record in --data is predicted
        #[arg(value_delimiter = ',', allow_hyphen_values = true)]
        features: Vec<f64>,
    },
}

/// Isolation forest hyperparameters.
#[derive(Args, Debug, Clone)]
struct IsolationArgs {
    /// Number of isolation trees
    #[arg(long, default_value_t = 120)]
    tree_count: usize,

    /// Rows drawn without replacement per tree
    #[arg(long, default_value_t = 256)]
    sample_size: usize,

    /// Score at or above which a record is flagged, in (0, 1]
    #[arg(long, default_value_t = 0.55)]
    threshold: f64,

    /// Depth limit (defaults to ceil(log2(sample_size)))
    #[arg(long)]
    max_depth: Option<usize>,
}

/// Classification forest hyperparameters.
#[derive(Args, Debug, Clone)]
struct ForestArgs {
    /// Number of trees
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    /// Minimum rows at a node to attempt a split
    #[arg(long, default_value_t = 2)]
    min_samples_split: usize,

    /// Features considered per split (defaults to floor(sqrt(n_features)))
    #[arg(long)]
    feature_subset_size: Option<usize>,

    /// Bootstrap draws per tree (defaults to the number of records)
    #[arg(long)]
    sample_size: Option<usize>,
}

/// Stdout payload for `forest predict`.
#[derive(Serialize)]
struct PredictOutput {
    predictions: Vec<usize>,
    model_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let source = CsvFeatureSource::new(&cli.data);
    let service = AnalysisService::new(&source, ModelStore::new(&cli.model_dir));

    match cli.command {
        Command::Isolation { action } => {
            let metrics = match action {
                IsolationAction::Train(args) => {
                    let params = IsolationParams {
                        tree_count: args.tree_count,
                        sample_size: args.sample_size,
                        threshold: args.threshold,
                        max_depth: args.max_depth,
                        seed: cli.seed,
                    };
                    service
                        .train_isolation(&params)
                        .context("isolation training failed")?
                }
                IsolationAction::Evaluate { threshold } => service
                    .evaluate_isolation(threshold)
                    .context("isolation evaluation failed")?,
            };
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }

        Command::Forest { action } => match action {
            ForestAction::Train(args) => {
                let params = ClassificationParams {
                    n_trees: args.n_trees,
                    max_depth: args.max_depth,
                    min_samples_split: args.min_samples_split,
                    feature_subset_size: args.feature_subset_size,
                    sample_size: args.sample_size,
                    seed: cli.seed,
                };
                let metrics = service
                    .train_classifier(&params)
                    .context("forest training failed")?;
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            }
            ForestAction::Evaluate => {
                let metrics = service
                    .evaluate_classifier()
                    .context("forest evaluation failed")?;
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            }
            ForestAction::Predict { features } => {
                let predictions = if features.is_empty() {
                    let dataset = source.fetch().context("failed to read input CSV")?;
                    service
                        .predict_batch(&dataset.features)
                        .context("batch prediction failed")?
                } else {
                    vec![
                        service
                            .predict_single(&features)
                            .context("prediction failed")?,
                    ]
                };
                let output = PredictOutput {
                    predictions,
                    model_dir: service.store().dir().to_path_buf(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        },
    }

    Ok(())
}
