use crate::{
    domain::{
        batch::{BatchRow, PitchOutput, RowReport},
        pitch::{format_pitch, parse_email, PitchBlock, PitchRequest, PitchType},
    },
    services::{
        insight_extractor::generate_insights, pitch_generator::PitchGenerator, CompletionService,
        ScrapedText, TextSource,
    },
};

pub const FIRST_NAME_PLACEHOLDER: &str = "[First Name]";

/// Scrape, extract insights, then write one pitch of every type.
pub struct OutreachPipeline<C, S> {
    completion: C,
    source: S,
    generator: PitchGenerator,
    insight_temperature: f32,
}

impl<C: CompletionService, S: TextSource> OutreachPipeline<C, S> {
    pub fn new(
        completion: C,
        source: S,
        generator: PitchGenerator,
        insight_temperature: f32,
    ) -> Self {
        OutreachPipeline {
            completion,
            source,
            generator,
            insight_temperature,
        }
    }

    /// Single URL mode.
    pub async fn analyze_url(&self, url: &str) -> RowReport {
        let scraped = self.source.scrape_website(url).await;
        self.build_report(url, scraped, None).await
    }

    /// Batch mode: like [`OutreachPipeline::analyze_url`], personalised with the row's contact details.
    pub async fn process_row(&self, row: &BatchRow) -> RowReport {
        let scraped = self.source.scrape_website(&row.website).await;
        self.build_report(&row.website, scraped, Some(row)).await
    }

    async fn build_report(
        &self,
        url: &str,
        scraped: ScrapedText,
        row: Option<&BatchRow>,
    ) -> RowReport {
        log::info!("Analyzing {}", url);

        let (insights, insight_error) = match generate_insights(
            &self.completion,
            self.insight_temperature,
            url,
            &scraped.text,
        )
        .await
        {
            Ok(insights) => (Some(insights), None),
            Err(e) => (None, Some(e.to_string())),
        };

        // Pitches still get written without insights, from the defaults.
        let pitch_insights = insights.clone().unwrap_or_default();

        let mut pitches = Vec::with_capacity(PitchType::ALL.len());
        for pitch_type in PitchType::ALL {
            let request = PitchRequest {
                url,
                scraped_text: &scraped.text,
                pitch_type,
                insights: &pitch_insights,
            };
            let generated = self.generator.generate(&self.completion, &request).await;
            pitches.push(build_pitch_output(pitch_type, generated, row));
        }

        RowReport {
            url: url.to_string(),
            scrape_warning: scraped.warning,
            insights,
            insight_error,
            pitches,
        }
    }
}

fn build_pitch_output<E: std::fmt::Display>(
    pitch_type: PitchType,
    generated: Result<String, E>,
    row: Option<&BatchRow>,
) -> PitchOutput {
    let (text, error) = match generated {
        Ok(text) => (text, None),
        Err(e) => (String::new(), Some(e.to_string())),
    };
    let text = match row {
        Some(row) => text.replace(FIRST_NAME_PLACEHOLDER, &row.first_name),
        None => text,
    };

    if !pitch_type.is_email() {
        let body = text.trim().to_string();
        let blocks = match body.is_empty() {
            true => vec![],
            false => vec![PitchBlock::Paragraph(body.clone())],
        };
        return PitchOutput {
            pitch_type,
            subject: None,
            body,
            blocks,
            error,
        };
    }

    let mut email = parse_email(&text);
    if let Some(company_name) = row.and_then(BatchRow::subject_override) {
        email.subject = company_name.to_string();
    }

    PitchOutput {
        pitch_type,
        blocks: format_pitch(&email),
        subject: Some(email.subject),
        body: email.body,
        error,
    }
}

#[cfg(test)]
pub mod fixtures {
    use crate::services::{testing::ScriptedCompletion, ScrapedText, TextSource};

    use super::OutreachPipeline;

    impl<S: TextSource> OutreachPipeline<ScriptedCompletion, S> {
        pub fn completion_calls(&self) -> usize {
            self.completion.calls()
        }
    }

    /// Serves the same text for every URL.
    pub struct FixedText(pub ScrapedText);

    impl FixedText {
        pub fn new(text: &str) -> Self {
            FixedText(ScrapedText {
                text: text.to_string(),
                warning: None,
            })
        }
    }

    impl TextSource for FixedText {
        async fn scrape_website(&self, _url: &str) -> ScrapedText {
            self.0.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{
            batch::{BatchRow, NOT_AVAILABLE},
            pitch::{PitchBlock, PitchType},
        },
        services::{
            outreach::{fixtures::FixedText, OutreachPipeline},
            pitch_generator::PitchGenerator,
            pitch_templates::PitchTemplates,
            testing::ScriptedCompletion,
            CompletionError, ScrapedText,
        },
    };

    const INSIGHTS: &str = r#"{"company_name":"Acme","industry":"retail tech"}"#;
    const EMAIL: &str = "Subject: Growth for Acme\n\nHello [First Name],\n\nWe can help.";
    const LINKEDIN: &str = "Hi [First Name], would love to connect!";

    fn pipeline(
        replies: Vec<Result<String, CompletionError>>,
        source: FixedText,
    ) -> OutreachPipeline<ScriptedCompletion, FixedText> {
        OutreachPipeline::new(
            ScriptedCompletion::new(replies),
            source,
            PitchGenerator::new(PitchTemplates::new("Sam"), 0.55),
            0.3,
        )
    }

    fn happy_replies() -> Vec<Result<String, CompletionError>> {
        [INSIGHTS, EMAIL, EMAIL, EMAIL, LINKEDIN]
            .iter()
            .map(|r| Ok(r.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn single_url_runs_one_insight_and_four_pitch_calls() {
        let pipeline = pipeline(
            happy_replies(),
            FixedText::new("We sell CRM software to retailers."),
        );

        let report = pipeline.analyze_url("example.com").await;

        assert_eq!(pipeline.completion.calls(), 5);
        assert_eq!(report.url, "example.com");
        let insights = report.insights.unwrap();
        assert_eq!(insights.company_name, "Acme");
        assert_eq!(insights.company_summary, "A growing organization");

        let types: Vec<PitchType> = report.pitches.iter().map(|p| p.pitch_type).collect();
        assert_eq!(types, PitchType::ALL.to_vec());

        let professional = &report.pitches[0];
        assert_eq!(professional.subject.as_deref(), Some("Growth for Acme"));
        assert_eq!(professional.body, "Hello [First Name],\n\nWe can help.");

        let linkedin = &report.pitches[3];
        assert_eq!(linkedin.subject, None);
        assert_eq!(
            linkedin.blocks,
            vec![PitchBlock::Paragraph(LINKEDIN.to_string())]
        );
    }

    #[tokio::test]
    async fn row_company_name_replaces_email_subjects() {
        let pipeline = pipeline(happy_replies(), FixedText::new(""));
        let row = BatchRow {
            first_name: "Priya".to_string(),
            company_name: "Acme Co".to_string(),
            ..BatchRow::from_website("acme.com")
        };

        let report = pipeline.process_row(&row).await;

        for pitch in &report.pitches[..3] {
            assert_eq!(pitch.subject.as_deref(), Some("Acme Co"));
            assert_eq!(pitch.blocks[0], PitchBlock::Subject("Acme Co".to_string()));
            assert!(pitch.body.starts_with("Hello Priya,"));
        }
        assert_eq!(report.pitches[3].subject, None);
        assert_eq!(report.pitches[3].body, "Hi Priya, would love to connect!");
    }

    #[tokio::test]
    async fn placeholder_company_name_keeps_generated_subject() {
        let pipeline = pipeline(happy_replies(), FixedText::new(""));
        let row = BatchRow::from_website("acme.com");

        let report = pipeline.process_row(&row).await;

        assert_eq!(report.pitches[0].subject.as_deref(), Some("Growth for Acme"));
        assert!(report.pitches[0]
            .body
            .starts_with(&format!("Hello {},", NOT_AVAILABLE)));
    }

    #[tokio::test]
    async fn unusable_insights_still_produce_pitches() {
        let mut replies = happy_replies();
        replies[0] = Ok("No idea, sorry.".to_string());
        let pipeline = pipeline(replies, FixedText::new(""));

        let report = pipeline.analyze_url("example.com").await;

        assert!(report.insights.is_none());
        assert!(report.insight_error.is_some());
        assert_eq!(report.company_summary(), "A growing organization");
        assert_eq!(report.pitches.len(), 4);
        assert!(pipeline.completion.prompts.borrow()[1]
            .0
            .contains("Company Name: This Company"));
    }

    #[tokio::test]
    async fn failed_pitch_is_reported_not_fatal() {
        let mut replies = happy_replies();
        replies[2] = Err(CompletionError::RateLimited("slow down".to_string()));
        let pipeline = pipeline(replies, FixedText::new(""));

        let report = pipeline.analyze_url("example.com").await;

        let results = &report.pitches[1];
        assert_eq!(results.body, "");
        assert!(results.error.as_deref().unwrap().contains("slow down"));
        assert_eq!(report.pitches[2].subject.as_deref(), Some("Growth for Acme"));
    }

    #[tokio::test]
    async fn scrape_warning_is_carried_into_the_report() {
        let source = FixedText(ScrapedText {
            text: String::new(),
            warning: Some("Failed to scrape https://down.example".to_string()),
        });
        let pipeline = pipeline(happy_replies(), source);

        let report = pipeline.analyze_url("down.example").await;

        assert_eq!(
            report.scrape_warning.as_deref(),
            Some("Failed to scrape https://down.example")
        );
        assert_eq!(pipeline.completion.calls(), 5);
    }
}
