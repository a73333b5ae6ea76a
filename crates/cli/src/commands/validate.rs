//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{OverrunPolicy, ScenarioAction, SessionBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    primary: String,
    secondary: String,
    step_count: usize,
    run_for_s: f64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    primary: blueprint.media.primary.label.clone(),
                    secondary: blueprint.media.secondary.label.clone(),
                    step_count: blueprint.scenario.len(),
                    run_for_s: blueprint.simulation.run_for_s,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SessionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    let first_establish = blueprint
        .scenario
        .iter()
        .filter(|s| s.action == ScenarioAction::Establish)
        .map(|s| s.at_s)
        .reduce(f64::min);

    match first_establish {
        None => warnings.push(
            "Scenario never establishes sync - the timelines will run independently".to_string(),
        ),
        Some(at_s) => {
            let media = &blueprint.media;
            let ready_at = media.primary.load_delay_s.max(media.secondary.load_delay_s);
            if at_s < ready_at {
                warnings.push(format!(
                    "establish at {at_s}s runs before media metadata loads ({ready_at}s) and will be declined"
                ));
            }
        }
    }

    if blueprint.engine.interval_ms >= blueprint.simulation.tick_interval_ms {
        warnings.push(format!(
            "engine.interval_ms ({}) >= simulation.tick_interval_ms ({}) - back-to-back corrections will be throttled",
            blueprint.engine.interval_ms, blueprint.simulation.tick_interval_ms
        ));
    }

    if blueprint.engine.overrun == OverrunPolicy::PassThrough {
        warnings.push(
            "engine.overrun = pass_through - corrections may seek the secondary past its end"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Primary: {}", summary.primary);
            println!("  Secondary: {}", summary.secondary);
            println!("  Scenario steps: {}", summary.step_count);
            println!("  Run length: {}s", summary.run_for_s);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
