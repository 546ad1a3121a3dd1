use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config, OracleConfig};
use crate::prompt::Prompter;
use crate::scoring::{validate_bands, ScoreBands};

fn parse_score(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| "must be a non-negative whole number".to_string())
}

/// Ask for the score scale until the three values form valid bands.
fn prompt_bands<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<ScoreBands> {
    let defaults = ScoreBands::default();
    loop {
        let min_score = prompter.prompt_until(
            "Minimum score (probability 0)",
            &defaults.min_score.to_string(),
            parse_score,
        )?;
        let max_score = prompter.prompt_until(
            "Maximum score (probability 1)",
            &defaults.max_score.to_string(),
            parse_score,
        )?;
        let good_threshold = prompter.prompt_until(
            "Lowest score labelled Good",
            &defaults.good_threshold.to_string(),
            parse_score,
        )?;

        let bands = ScoreBands {
            min_score,
            max_score,
            good_threshold,
        };
        match validate_bands(&bands) {
            Ok(()) => return Ok(bands),
            Err(errors) => {
                for error in errors {
                    prompter.say(&format!("  Invalid: {}", error))?;
                }
                prompter.say("  Let's try the score scale again.")?;
            }
        }
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the suggested config file path.
/// Otherwise, suggests ~/.config/loan-score/config.yaml.
pub fn run_init_wizard<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    default_path: Option<PathBuf>,
) -> Result<()> {
    prompter.say("")?;
    prompter.say("Loan Score Configuration Wizard")?;
    prompter.say("===============================")?;
    prompter.say("")?;

    // 1. Model artifact
    prompter.say("The model artifact is the exported classifier (JSON) used to score applications.")?;
    let artifact = loop {
        let input = prompter.prompt("Path to model artifact (leave empty to pass --model each time): ")?;
        if input.is_empty() {
            break None;
        }
        let path = PathBuf::from(&input);
        if path.exists() {
            break Some(path);
        }
        let keep = prompter.prompt_yes_no(
            &format!("{} does not exist yet. Use it anyway?", path.display()),
            false,
        )?;
        if keep {
            break Some(path);
        }
    };

    // 2. Score scale
    prompter.say("")?;
    prompter.say("Probabilities are mapped linearly onto a credit score scale.")?;
    let use_defaults = prompter.prompt_yes_no(
        "Use the conventional scale? (300-850, Good from 575)",
        true,
    )?;
    let scoring = if use_defaults {
        None
    } else {
        Some(prompt_bands(prompter)?)
    };

    // 3. Config path
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    prompter.say("")?;
    let path_str = prompter.prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompter.prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            prompter.say("Aborted.")?;
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        oracle: artifact.map(|artifact| OracleConfig { artifact }),
        scoring,
    };
    write_config(&config_path, &config)?;

    prompter.say("")?;
    prompter.say(&format!("Config written to {}", config_path.display()))?;
    prompter.say("Run `loan-score predict` to score an application.")?;

    Ok(())
}

/// Serialize `config` as YAML and replace `path` atomically.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}
