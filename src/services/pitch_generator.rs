use crate::{
    domain::{
        insights::Insights,
        pitch::{PitchRequest, PitchType},
        spam_words::rewrite_spam_words,
    },
    services::{pitch_templates::PitchTemplates, CompletionError, CompletionService},
};

/// Returned instead of calling the completion service for an unrecognised pitch type.
pub const INVALID_PITCH_TYPE: &str = "Invalid pitch type";

pub struct PitchGenerator {
    templates: PitchTemplates,
    temperature: f32,
}

impl PitchGenerator {
    pub fn new(templates: PitchTemplates, temperature: f32) -> Self {
        PitchGenerator {
            templates,
            temperature,
        }
    }

    pub fn build_prompt(&self, request: &PitchRequest<'_>) -> String {
        self.templates.render(request)
    }

    /// Email pitches come back with spam trigger words rewritten; LinkedIn messages come back as generated.
    pub async fn generate<C: CompletionService>(
        &self,
        completion: &C,
        request: &PitchRequest<'_>,
    ) -> Result<String, CompletionError> {
        let prompt = self.build_prompt(request);

        let content = completion
            .complete(&prompt, self.temperature)
            .await
            .inspect_err(|e| {
                log::error!(
                    "{} pitch completion failed for {}: {}",
                    request.pitch_type,
                    request.url,
                    e
                )
            })?;

        match request.pitch_type.is_email() {
            true => Ok(rewrite_spam_words(&content)),
            false => Ok(content),
        }
    }

    /// Like [`PitchGenerator::generate`], selecting the pitch type by name.
    pub async fn generate_by_name<C: CompletionService>(
        &self,
        completion: &C,
        url: &str,
        scraped_text: &str,
        pitch_type: &str,
        insights: &Insights,
    ) -> Result<String, CompletionError> {
        let pitch_type: PitchType = match pitch_type.parse() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("{}", e);
                return Ok(INVALID_PITCH_TYPE.to_string());
            }
        };

        let request = PitchRequest {
            url,
            scraped_text,
            pitch_type,
            insights,
        };
        self.generate(completion, &request).await
    }
}
