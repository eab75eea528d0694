//! Tuner CLI - hyperparameter search and ensemble inference.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tuner_ensemble::{EnsembleMethod, EnsemblePredictor, ModelComparator};
use tuner_evolution::{example_bounds, OptimizationRequest, TargetObjective};
use tuner_models::{ModelKind, ModelRegistry, RegressionModel, SegmentationModel};

#[derive(Parser)]
#[command(name = "tuner")]
#[command(about = "Evolutionary hyperparameter search and model ensembles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a genetic-algorithm search from a JSON request
    Optimize {
        /// Request file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        request: PathBuf,
        /// Override the request's seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print example parameter bounds
    ExampleBounds,
    /// List hosted models
    Models,
    /// Show model details
    Info {
        /// Model name
        name: String,
    },
    /// Combine predictions from several models
    Ensemble {
        /// Comma-separated input vector
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        inputs: Vec<f64>,
        /// Models to combine (default: every regression model)
        #[arg(long, value_delimiter = ',')]
        models: Vec<String>,
        /// Combination method
        #[arg(long, value_enum, default_value_t = MethodArg::WeightedAverage)]
        method: MethodArg,
        /// Report the spread across members instead
        #[arg(long)]
        uncertainty: bool,
    },
    /// Compare every hosted model on one input
    Compare {
        /// Comma-separated input vector
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        inputs: Vec<f64>,
        /// Comma-separated ground truth
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        truth: Option<Vec<f64>>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Average,
    WeightedAverage,
    Voting,
}

impl From<MethodArg> for EnsembleMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Average => EnsembleMethod::Average,
            MethodArg::WeightedAverage => EnsembleMethod::WeightedAverage,
            MethodArg::Voting => EnsembleMethod::Voting,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let registry = build_registry()?;

    let output = match cli.command {
        Commands::Optimize { request, seed } => {
            let mut request = load_request(&request)?;
            if seed.is_some() {
                request.seed = seed;
            }
            let response = request
                .run(TargetObjective)
                .context("Optimization failed")?;
            info!("Best fitness {:.6}", response.best_fitness);
            serde_json::to_value(&response)?
        }
        Commands::ExampleBounds => serde_json::to_value(example_bounds())?,
        Commands::Models => json!(registry.list()),
        Commands::Info { name } => {
            let info = registry
                .info(&name)
                .ok_or_else(|| anyhow::anyhow!("Model not found: {}", name))?;
            serde_json::to_value(info)?
        }
        Commands::Ensemble { inputs, models, method, uncertainty } => {
            let names = if models.is_empty() { regression_models(&registry) } else { models };
            let method = EnsembleMethod::from(method);
            let ensemble = EnsemblePredictor::from_registry(&registry, &names)?.with_method(method);

            if uncertainty {
                let result = ensemble.predict_with_uncertainty(&inputs)?;
                json!({
                    "prediction": result.prediction,
                    "uncertainty": result.uncertainty,
                    "models_used": names,
                })
            } else {
                let prediction = ensemble.predict(&inputs)?;
                json!({
                    "prediction": prediction,
                    "models_used": names,
                    "ensemble_size": ensemble.len(),
                    "method": method,
                })
            }
        }
        Commands::Compare { inputs, truth } => {
            let comparator = ModelComparator::from_registry(&registry)?;
            let comparisons = comparator.compare(&inputs, truth.as_deref())?;
            json!({ "input": inputs, "comparisons": comparisons })
        }
    };

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output);
    }
    Ok(())
}

/// Models hosted by this process.
fn build_registry() -> Result<ModelRegistry> {
    let mut registry = ModelRegistry::with_defaults();
    registry.register("sum", RegressionModel::with_parameters(vec![1.0; 4], 0.0))?;
    registry.register("mean", RegressionModel::with_parameters(vec![0.25; 4], 0.0))?;
    registry.register("mask", SegmentationModel::new(4.0, -2.0))?;
    Ok(registry)
}

fn regression_models(registry: &ModelRegistry) -> Vec<String> {
    registry
        .list()
        .into_iter()
        .filter(|name| registry.info(name).is_some_and(|i| i.kind == ModelKind::Regression))
        .map(str::to_string)
        .collect()
}

fn load_request(path: &Path) -> Result<OptimizationRequest> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).context("Invalid optimization request")
}
