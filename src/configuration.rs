use std::collections::HashMap;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub completion: CompletionSettings,
    pub scraper: ScraperSettings,
    pub pitch: PitchSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone)]
pub struct CompletionSettings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub insight_temperature: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub pitch_temperature: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct ScraperSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_chars: usize,
    pub user_agent: String,
}

#[derive(Deserialize, Clone)]
pub struct PitchSettings {
    pub sender_name: String,
    /// Prompt templates keyed by pitch type name. Types left out use the built-in template.
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // APP_COMPLETION__API_KEY=... sets Settings.completion.api_key
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
