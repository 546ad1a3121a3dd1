use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use loan_score::config::{init::run_init_wizard, load_config};
use loan_score::features::derive_features;
use loan_score::input::{collect_interactively, RawInput, RawInputRecord};
use loan_score::oracle::ArtifactOracle;
use loan_score::output;
use loan_score::prompt::Prompter;
use loan_score::scoring::validate_bands;
use loan_score::{PipelineError, ScoringPipeline};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_VALIDATION: i32 = 2;
const EXIT_ORACLE: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a loan application (default if no subcommand)
    Predict(ApplicationArgs),
    /// Print the feature vector derived from an application, without scoring it
    Features(ApplicationArgs),
    /// Create a config file interactively
    Init,
}

/// Where the application comes from. Fields not given fall back to the form defaults.
#[derive(Args, Debug, Default)]
struct ApplicationArgs {
    /// Read the application from a YAML or JSON file
    #[arg(long, conflicts_with = "interactive")]
    input: Option<PathBuf>,

    /// Prompt for each field
    #[arg(short, long)]
    interactive: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,

    #[arg(long)]
    loan_amount: Option<f64>,
    #[arg(long)]
    term_days: Option<i64>,
    #[arg(long)]
    repayment_curr_ratio: Option<f64>,
    #[arg(long)]
    num_prev_loans: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    avg_repay_delay_days: Option<f64>,
    #[arg(long)]
    total_firstrepaid_late: Option<f64>,
    #[arg(long)]
    avg_prev_repayment_ratio: Option<f64>,
    #[arg(long)]
    avg_duration_days: Option<f64>,
    #[arg(long)]
    avg_prev_interest: Option<f64>,
    #[arg(long)]
    age: Option<i64>,
    /// One of: Other, Savings, Current
    #[arg(long)]
    bank_account_type: Option<String>,
    /// One of: Permanent, Unknown, Unemployed, Self-Employed, Student, Retired, Contract
    #[arg(long)]
    employment_status: Option<String>,
}

impl ApplicationArgs {
    /// Apply field flags on top of `record`.
    fn overlay(&self, mut record: RawInputRecord) -> RawInputRecord {
        fn set<T: Clone>(slot: &mut Option<T>, flag: &Option<T>) {
            if let Some(v) = flag {
                *slot = Some(v.clone());
            }
        }
        set(&mut record.loan_amount, &self.loan_amount);
        set(&mut record.term_days, &self.term_days);
        set(&mut record.repayment_curr_ratio, &self.repayment_curr_ratio);
        set(&mut record.num_prev_loans, &self.num_prev_loans);
        set(&mut record.avg_repay_delay_days, &self.avg_repay_delay_days);
        set(&mut record.total_firstrepaid_late, &self.total_firstrepaid_late);
        set(&mut record.avg_prev_repayment_ratio, &self.avg_prev_repayment_ratio);
        set(&mut record.avg_duration_days, &self.avg_duration_days);
        set(&mut record.avg_prev_interest, &self.avg_prev_interest);
        set(&mut record.age, &self.age);
        set(&mut record.bank_account_type, &self.bank_account_type);
        set(&mut record.employment_status, &self.employment_status);
        record
    }

    fn gather(&self) -> anyhow::Result<RawInputRecord> {
        if self.interactive {
            let mut prompter = Prompter::stdio();
            let input = collect_interactively(&mut prompter, &RawInput::default())?;
            return Ok(input.into());
        }
        let base = match &self.input {
            Some(path) => read_record(path)?,
            None => RawInput::default().into(),
        };
        Ok(self.overlay(base))
    }
}

fn read_record(path: &Path) -> anyhow::Result<RawInputRecord> {
    use anyhow::Context;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read application at {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let record = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse application: invalid JSON in {}", path.display()))?
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse application: invalid YAML in {}", path.display()))?
    };
    Ok(record)
}

#[derive(Parser, Debug)]
#[command(name = "loan-score")]
#[command(about = "Score loan applications with a trained classifier", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/loan-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the model artifact (overrides oracle.artifact in the config)
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Predict(ApplicationArgs::default()));

    let code = match command {
        Commands::Init => match run_init_wizard(&mut Prompter::stdio(), cli.config) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                eprintln!("Init failed: {:#}", e);
                EXIT_FAILURE
            }
        },
        Commands::Features(args) => show_features(&args),
        Commands::Predict(args) => predict(cli.config, cli.model, &args),
    };

    std::process::exit(code);
}

fn show_features(args: &ApplicationArgs) -> i32 {
    let record = match args.gather() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    let features = match record.into_raw_input().and_then(|input| derive_features(&input)) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}", output::format_validation_error(&e, output::should_use_colors()));
            return EXIT_VALIDATION;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&features) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize features: {}", e);
                return EXIT_FAILURE;
            }
        }
    } else {
        println!("{}", output::format_features(&features, output::should_use_colors()));
    }
    EXIT_SUCCESS
}

/// Build the pipeline once, then score the application.
fn predict(config_path: Option<PathBuf>, model: Option<PathBuf>, args: &ApplicationArgs) -> i32 {
    // Without a config file the --model flag is enough
    let config = match load_config(config_path, model.is_some()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            return EXIT_CONFIG;
        }
    };

    let bands = config.effective_bands();
    if let Err(errors) = validate_bands(&bands) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return EXIT_CONFIG;
    }

    let Some(artifact) = model.or_else(|| config.oracle.map(|o| o.artifact)) else {
        eprintln!("No model artifact configured.");
        eprintln!("Pass --model <PATH> or add it to the config file:");
        eprintln!("  oracle:");
        eprintln!("    artifact: /path/to/model.json");
        return EXIT_CONFIG;
    };

    let oracle = match ArtifactOracle::load(&artifact) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Failed to load model: {}", e);
            return EXIT_ORACLE;
        }
    };

    let pipeline = match ScoringPipeline::new(Arc::new(oracle), bands) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return EXIT_CONFIG;
        }
    };
    tracing::debug!(
        oracle = %pipeline.oracle().describe(),
        bands = ?pipeline.bands(),
        "Pipeline ready"
    );

    let record = match args.gather() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    let use_colors = output::should_use_colors();
    let result = match pipeline.predict_record(record) {
        Ok(r) => r,
        Err(PipelineError::Validation(e)) => {
            eprintln!("{}", output::format_validation_error(&e, use_colors));
            return EXIT_VALIDATION;
        }
        Err(PipelineError::Inference(_)) => {
            // Details were logged by the pipeline
            eprintln!("Prediction failed: internal error.");
            return EXIT_ORACLE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                return EXIT_FAILURE;
            }
        }
    } else {
        println!("{}", output::format_result(&result, use_colors));
    }
    EXIT_SUCCESS
}
