use serde::Deserialize;
use ssas_onboarding::config::Config;
use ssas_onboarding::corporate_form::{CorporateEvent, CorporateFormController};
use ssas_onboarding::errors::AppError;
use ssas_onboarding::individual_form::{IndividualEvent, IndividualFormController};
use ssas_onboarding::reference_data::{ReferenceData, ReferenceDataProvider, ReferenceKind};
use ssas_onboarding::submission::{LoggingSubmitter, SubmissionReceipt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: ssas-forms replay <session.json> | ssas-forms reference <kind>";

/// A recorded form session: which form, and the user edits in order.
#[derive(Debug, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
enum SessionScript {
    Corporate {
        #[serde(default)]
        events: Vec<CorporateEvent>,
    },
    Individual {
        #[serde(default)]
        events: Vec<IndividualEvent>,
    },
}

/// Loads the built-in reference lists plus the configured overlay, if any.
async fn load_reference(config: &Config) -> anyhow::Result<ReferenceData> {
    let mut reference = ReferenceData::builtin();
    if let Some(ref path) = config.reference_data_path {
        let overlay = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read reference overlay {}: {}", path, e))?;
        let added = reference.extend_from_json(&overlay)?;
        tracing::info!("✓ Reference overlay loaded: {} entries", added);
    }
    Ok(reference)
}

/// Replays a session script through the matching form controller and submits it.
///
/// Visibility changes are logged as they happen; a failed validation prints
/// the field errors as JSON and returns an error.
async fn replay(config: &Config, reference: &ReferenceData, path: &str) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read session script {}: {}", path, e))?;
    let script: SessionScript = serde_json::from_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("Invalid session script: {}", e)))?;

    let submitter = LoggingSubmitter::new(config.pretty_payloads);

    let outcome = match script {
        SessionScript::Corporate { events } => {
            let mut controller = CorporateFormController::new(reference);
            tracing::info!(
                "Replaying {} corporate events (session {})",
                events.len(),
                controller.session_id()
            );
            for event in events {
                controller.apply(event);
            }
            tracing::info!("Scheme contact phone: {}", controller.display_phone());
            controller.submit(&submitter).await
        }
        SessionScript::Individual { events } => {
            let mut controller =
                IndividualFormController::new(reference, config.individual_options());
            tracing::info!(
                "Replaying {} individual events (session {})",
                events.len(),
                controller.session_id()
            );
            for event in events {
                for section in controller.apply(event) {
                    tracing::info!(
                        "Section {:?} is now {}",
                        section,
                        if controller.visibility().is_visible(section) {
                            "visible"
                        } else {
                            "hidden"
                        }
                    );
                }
            }
            tracing::info!("Member phone: {}", controller.display_phone());
            controller.submit(&submitter).await
        }
    };

    report(outcome)
}

fn report(outcome: Result<SubmissionReceipt, AppError>) -> anyhow::Result<()> {
    match outcome {
        Ok(receipt) => {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        Err(err) => {
            if let Some(errors) = err.validation_errors() {
                println!("{}", serde_json::to_string_pretty(errors)?);
            }
            Err(err.into())
        }
    }
}

fn print_reference(reference: &ReferenceData, kind: &str) -> anyhow::Result<()> {
    let kind: ReferenceKind = kind.parse()?;
    println!(
        "{}",
        serde_json::to_string_pretty(reference.entries(kind))?
    );
    Ok(())
}

/// Main entry point for the form host.
///
/// Initializes tracing and configuration, loads reference data, then either
/// replays a recorded form session or prints one reference list.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ssas_onboarding=debug,ssas_forms=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let reference = load_reference(&config).await?;

    let mut args = std::env::args().skip(1);
    match (args.next().as_deref(), args.next()) {
        (Some("replay"), Some(path)) => replay(&config, &reference, &path).await,
        (Some("reference"), Some(kind)) => print_reference(&reference, &kind),
        _ => anyhow::bail!(USAGE),
    }
}
