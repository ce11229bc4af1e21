use crate::{
    domain::insights::{parse_insights, Insights},
    services::{CompletionError, CompletionService},
};

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("Completion response held no usable JSON insights")]
    Unparsable,
}

pub fn build_insights_prompt(url: &str, scraped_text: &str) -> String {
    format!(
        r#"
You are a business analyst. Extract ONLY JSON insights from the website.

Return in this exact JSON format:

{{
"company_name": "Company Name",
"company_summary": "2-3 line summary",
"main_products": ["service 1", "service 2", "service 3"],
"ideal_customers": ["ICP1", "ICP2", "ICP3"],
"ideal_audience": ["job title 1", "job title 2", "job title 3"],
"industry": "best guess industry",
"countries_of_operation": ["country 1", "country 2"]
}}

Company URL: {}
Website Content: {}
"#,
        url, scraped_text
    )
}

pub async fn generate_insights<C: CompletionService>(
    completion: &C,
    temperature: f32,
    url: &str,
    scraped_text: &str,
) -> Result<Insights, InsightError> {
    let prompt = build_insights_prompt(url, scraped_text);

    let content = completion
        .complete(&prompt, temperature)
        .await
        .inspect_err(|e| log::error!("Insight completion failed for {}: {}", url, e))?;

    parse_insights(&content).ok_or_else(|| {
        log::warn!("No JSON insights in completion for {}: {:?}", url, content);
        InsightError::Unparsable
    })
}

#[cfg(test)]
mod tests {
    use crate::services::{
        insight_extractor::{build_insights_prompt, generate_insights, InsightError},
        testing::ScriptedCompletion,
        CompletionError,
    };

    #[test]
    fn prompt_names_every_insight_key() {
        let prompt = build_insights_prompt("example.com", "We sell CRM software to retailers.");

        for key in [
            "company_name",
            "company_summary",
            "main_products",
            "ideal_customers",
            "ideal_audience",
            "industry",
            "countries_of_operation",
        ] {
            assert!(prompt.contains(key), "missing {}", key);
        }
        assert!(prompt.contains("Company URL: example.com"));
        assert!(prompt.contains("Website Content: We sell CRM software to retailers."));
    }

    #[tokio::test]
    async fn partial_json_is_filled_with_defaults() {
        let completion =
            ScriptedCompletion::replying(&[r#"{"company_name":"Acme","industry":"retail tech"}"#]);

        let insights = generate_insights(
            &completion,
            0.3,
            "example.com",
            "We sell CRM software to retailers.",
        )
        .await
        .unwrap();

        assert_eq!(insights.company_name, "Acme");
        assert_eq!(insights.industry, "retail tech");
        assert_eq!(insights.company_summary, "A growing organization");
        assert!(insights.main_products.is_empty());
        assert!(insights.ideal_customers.is_empty());
        assert!(insights.countries_of_operation.is_empty());

        let prompts = completion.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].1, 0.3);
    }

    #[tokio::test]
    async fn prose_reply_is_unparsable() {
        let completion = ScriptedCompletion::replying(&["Sorry, I cannot access websites."]);

        let result = generate_insights(&completion, 0.3, "example.com", "").await;

        assert!(matches!(result, Err(InsightError::Unparsable)));
    }

    #[tokio::test]
    async fn service_failures_are_not_confused_with_bad_output() {
        let completion =
            ScriptedCompletion::new(vec![Err(CompletionError::Auth("bad key".to_string()))]);

        let result = generate_insights(&completion, 0.3, "example.com", "").await;

        assert!(matches!(
            result,
            Err(InsightError::Completion(CompletionError::Auth(_)))
        ));
    }
}
