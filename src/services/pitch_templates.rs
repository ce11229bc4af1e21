use std::{collections::HashMap, sync::LazyLock};

use regex::{Captures, Regex};

use crate::{
    configuration::PitchSettings,
    domain::pitch::{PitchRequest, PitchType, UnknownPitchType},
};

pub const DEFAULT_PRODUCTS: &str = "your services/products";
pub const DEFAULT_CUSTOMERS: &str = "Your best-fit customers";
pub const DEFAULT_AUDIENCE: &str = "Your target audience";
pub const DEFAULT_COUNTRIES: &str = "your markets";

const PROFESSIONAL_TEMPLATE: &str = r#"
You are a B2B sales outreach expert.

Analyze the following company and generate an outreach email in EXACT format.

Company Name: {company_name}
Industry: {industry}
Summary: {company_summary}
Main Products/Services: {main_products}
Countries of Operation: {countries}

Return ONLY the email in this format, starting with the Subject line:

Subject: Enhance Your Outreach with Targeted Contacts at {company_name}

Hello [First Name],

I noticed {company_name} is focusing on {main_products}.
We help teams like yours connect with verified decision-makers across:

• Ideal Customers:
{ideal_customers}

• Ideal Audience:
{ideal_audience}

If this aligns with your outreach strategy, I'd be happy to share more details along with a small sample for your review.

Looking forward to your thoughts,
{sender_name}
"#;

const RESULTS_TEMPLATE: &str = r#"
You are a B2B sales outreach expert who writes results-driven emails.

Analyze the following company and generate an outreach email in EXACT format.

Company Name: {company_name}
Industry: {industry}
Summary: {company_summary}
Main Products/Services: {main_products}
Countries of Operation: {countries}

Return ONLY the email in this format, starting with the Subject line:

Subject: More Qualified Conversations for {company_name}

Hi [First Name],

Teams in {industry} that sell {main_products} often tell us pipeline is the bottleneck.
We have helped similar companies start more qualified conversations with:

• Ideal Customers:
{ideal_customers}

• Ideal Audience:
{ideal_audience}

Would a short sample be useful to see the fit for {company_name}?

Best regards,
{sender_name}
"#;

const DATA_TEMPLATE: &str = r#"
You are a B2B data specialist writing an outreach email.

Analyze the following company and generate an outreach email in EXACT format.

Company Name: {company_name}
Industry: {industry}
Summary: {company_summary}
Main Products/Services: {main_products}
Countries of Operation: {countries}

Return ONLY the email in this format, starting with the Subject line:

Subject: Verified Contact Data for {company_name}'s Growth in {countries}

Hello [First Name],

We maintain verified, regularly refreshed contact data for companies in {industry}.
For {company_name}, the most relevant segments would be:

• Ideal Customers:
{ideal_customers}

• Ideal Audience:
{ideal_audience}

Happy to send a small segment so you can check accuracy before anything else.

Kind regards,
{sender_name}
"#;

const LINKEDIN_TEMPLATE: &str = r#"
You are a B2B sales outreach expert writing a LinkedIn connection note.

Company Name: {company_name}
Industry: {industry}
Summary: {company_summary}
Main Products/Services: {main_products}

Write ONE short, friendly LinkedIn message under 300 characters addressed to
[First Name]. Mention {company_name} and their work in {industry}. Do not
include a subject line, hashtags or links. Sign off as {sender_name}.
Return ONLY the message text.
"#;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

fn built_in_template(pitch_type: PitchType) -> &'static str {
    match pitch_type {
        PitchType::Professional => PROFESSIONAL_TEMPLATE,
        PitchType::Results => RESULTS_TEMPLATE,
        PitchType::Data => DATA_TEMPLATE,
        PitchType::Linkedin => LINKEDIN_TEMPLATE,
    }
}

/// Prompt templates per pitch type, with branding kept as data.
#[derive(Debug, Clone)]
pub struct PitchTemplates {
    templates: HashMap<PitchType, String>,
    sender_name: String,
}

impl PitchTemplates {
    pub fn new(sender_name: &str) -> Self {
        PitchTemplates {
            templates: PitchType::ALL
                .into_iter()
                .map(|t| (t, built_in_template(t).to_string()))
                .collect(),
            sender_name: sender_name.to_string(),
        }
    }

    /// Configured templates replace the built-in ones for their pitch type.
    pub fn from_settings(settings: &PitchSettings) -> Result<Self, UnknownPitchType> {
        let mut templates = PitchTemplates::new(&settings.sender_name);

        for (name, template) in settings.templates.iter() {
            let pitch_type: PitchType = name.parse()?;
            log::info!("Using configured prompt template for {}", pitch_type);
            templates.templates.insert(pitch_type, template.clone());
        }

        Ok(templates)
    }

    pub fn render(&self, request: &PitchRequest<'_>) -> String {
        let template = self
            .templates
            .get(&request.pitch_type)
            .map(String::as_str)
            .unwrap_or_else(|| built_in_template(request.pitch_type));

        let values = self.placeholder_values(request);

        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    fn placeholder_values(&self, request: &PitchRequest<'_>) -> HashMap<&'static str, String> {
        let insights = request.insights;

        HashMap::from([
            ("company_name", insights.company_name.clone()),
            ("company_summary", insights.company_summary.clone()),
            ("industry", insights.industry.clone()),
            (
                "main_products",
                join_or(&insights.main_products, ", ", DEFAULT_PRODUCTS),
            ),
            (
                "ideal_customers",
                join_or(&insights.ideal_customers, "\n", DEFAULT_CUSTOMERS),
            ),
            (
                "ideal_audience",
                join_or(&insights.ideal_audience, "\n", DEFAULT_AUDIENCE),
            ),
            (
                "countries",
                join_or(&insights.countries_of_operation, ", ", DEFAULT_COUNTRIES),
            ),
            ("url", request.url.to_string()),
            ("website_content", request.scraped_text.to_string()),
            ("sender_name", self.sender_name.clone()),
        ])
    }
}

fn join_or(items: &[String], separator: &str, default: &str) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();

    match items.is_empty() {
        true => default.to_string(),
        false => items.join(separator),
    }
}
