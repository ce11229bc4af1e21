use std::net::TcpListener;

use anyhow::Context;
use env_logger::Env;
use pitchcraft::{
    configuration::get_configuration,
    services::{
        pitch_generator::PitchGenerator, pitch_templates::PitchTemplates, OpenaiClient,
        OutreachPipeline, TextExtractor,
    },
    startup::run,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    if configuration.completion.api_key.trim().is_empty() {
        log::warn!("No completion API key set, every completion call will fail. Set APP_COMPLETION__API_KEY.");
    }

    let openai_client = OpenaiClient::new(&configuration.completion)
        .context("Failed to build completion client.")?;
    let text_extractor =
        TextExtractor::new(&configuration.scraper).context("Failed to build HTTP client.")?;
    let templates = PitchTemplates::from_settings(&configuration.pitch)
        .context("Invalid pitch template configuration.")?;

    let pipeline = OutreachPipeline::new(
        openai_client,
        text_extractor,
        PitchGenerator::new(templates, configuration.completion.pitch_temperature),
        configuration.completion.insight_temperature,
    );

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    log::info!("Listening on {}", address);

    run(listener, pipeline)?.await?;

    Ok(())
}
