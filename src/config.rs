use crate::individual_form::IndividualValidationOptions;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Pretty-print payloads logged by the logging submitter.
    pub pretty_payloads: bool,
    /// Close the dual-nationality gap in the individual schema.
    pub require_second_nationality: bool,
    /// Require previous addresses below 36 months at the current address.
    pub require_address_history: bool,
    /// Optional JSON overlay appended to the built-in reference lists.
    pub reference_data_path: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            pretty_payloads: bool_var("SUBMISSION_PRETTY_JSON")?,
            require_second_nationality: bool_var("REQUIRE_SECOND_NATIONALITY")?,
            require_address_history: bool_var("REQUIRE_ADDRESS_HISTORY")?,
            reference_data_path: std::env::var("REFERENCE_DATA_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Pretty payloads: {}", config.pretty_payloads);
        tracing::debug!(
            "Individual schema options: second nationality required = {}, address history required = {}",
            config.require_second_nationality,
            config.require_address_history
        );
        if let Some(ref path) = config.reference_data_path {
            tracing::info!("Reference data overlay configured: {}", path);
        }

        Ok(config)
    }

    pub fn individual_options(&self) -> IndividualValidationOptions {
        IndividualValidationOptions {
            require_second_nationality: self.require_second_nationality,
            require_address_history: self.require_address_history,
        }
    }
}

/// Reads a boolean flag; unset or empty means `false`.
fn bool_var(name: &str) -> anyhow::Result<bool> {
    match std::env::var(name) {
        Err(_) => Ok(false),
        Ok(value) => parse_bool(&value)
            .ok_or_else(|| anyhow::anyhow!("{} must be one of true/false/1/0/yes/no", name)),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Some(false),
        "1" | "true" | "yes" | "on" => Some(true),
        _ => None,
    }
}
