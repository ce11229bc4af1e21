use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_COMPANY_NAME: &str = "This Company";
pub const DEFAULT_COMPANY_SUMMARY: &str = "A growing organization";
pub const DEFAULT_INDUSTRY: &str = "your industry";

/// Company profile pulled out of a completion response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub company_name: String,
    pub company_summary: String,
    pub main_products: Vec<String>,
    pub ideal_customers: Vec<String>,
    pub ideal_audience: Vec<String>,
    pub industry: String,
    pub countries_of_operation: Vec<String>,
}

impl Default for Insights {
    fn default() -> Self {
        Insights {
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            company_summary: DEFAULT_COMPANY_SUMMARY.to_string(),
            main_products: vec![],
            ideal_customers: vec![],
            ideal_audience: vec![],
            industry: DEFAULT_INDUSTRY.to_string(),
            countries_of_operation: vec![],
        }
    }
}

impl Insights {
    /// Laid over the defaults key by key. A key with the wrong JSON type counts as missing.
    fn merged_over_defaults(fields: &Map<String, Value>) -> Self {
        let defaults = Insights::default();

        Insights {
            company_name: field_or(fields, "company_name", defaults.company_name),
            company_summary: field_or(fields, "company_summary", defaults.company_summary),
            main_products: field_or(fields, "main_products", defaults.main_products),
            ideal_customers: field_or(fields, "ideal_customers", defaults.ideal_customers),
            ideal_audience: field_or(fields, "ideal_audience", defaults.ideal_audience),
            industry: field_or(fields, "industry", defaults.industry),
            countries_of_operation: field_or(
                fields,
                "countries_of_operation",
                defaults.countries_of_operation,
            ),
        }
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn field_or<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, default: T) -> T {
    fields
        .get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(default)
}

/// Parses the JSON object between the first `{` and the last `}` of `content`.
///
/// Models like to wrap their JSON in commentary or code fences, so anything
/// outside the braces is ignored. Returns `None` when there are no braces or the
/// slice is not a JSON object.
pub fn parse_insights(content: &str) -> Option<Insights> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }

    let fields: Map<String, Value> = serde_json::from_str(&content[start..=end]).ok()?;

    Some(Insights::merged_over_defaults(&fields))
}

#[cfg(test)]
mod tests {
    use crate::domain::insights::{parse_insights, Insights};

    #[test]
    fn missing_keys_take_defaults() {
        let insights =
            parse_insights(r#"{"company_name":"Acme","industry":"retail tech"}"#).unwrap();

        assert_eq!(
            insights,
            Insights {
                company_name: "Acme".to_string(),
                company_summary: "A growing organization".to_string(),
                main_products: vec![],
                ideal_customers: vec![],
                ideal_audience: vec![],
                industry: "retail tech".to_string(),
                countries_of_operation: vec![],
            }
        )
    }

    #[test]
    fn present_keys_are_kept_verbatim() {
        let content = r#"Sure! Here is the JSON you asked for:
```json
{
  "company_name": "Northwind",
  "company_summary": "Wholesale groceries.",
  "main_products": ["Tea", "Coffee"],
  "ideal_customers": ["Cafes", "Hotels"],
  "ideal_audience": ["Procurement leads"],
  "industry": "Food distribution",
  "countries_of_operation": ["US", "Canada"]
}
```
Let me know if you need anything else."#;

        let insights = parse_insights(content).unwrap();

        assert_eq!(insights.company_name, "Northwind");
        assert_eq!(insights.main_products, vec!["Tea", "Coffee"]);
        assert_eq!(insights.ideal_customers, vec!["Cafes", "Hotels"]);
        assert_eq!(insights.ideal_audience, vec!["Procurement leads"]);
        assert_eq!(insights.countries_of_operation, vec!["US", "Canada"]);
    }

    #[test]
    fn empty_object_is_fully_defaulted() {
        assert_eq!(parse_insights("{}"), Some(Insights::default()));
    }

    #[test]
    fn wrongly_typed_key_falls_back_to_default() {
        let insights =
            parse_insights(r#"{"main_products": "Tea, Coffee", "industry": null}"#).unwrap();

        assert!(insights.main_products.is_empty());
        assert_eq!(insights.industry, "your industry");
    }

    #[test]
    fn malformed_responses_yield_nothing() {
        let responses = [
            "",
            "I could not find anything useful on that website.",
            r#"{"company_name": "Acme", "#,
            r#"{"company_name": Acme}"#,
            "} backwards {",
            r#"["company_name", "Acme"]"#,
        ];

        for response in responses {
            assert_eq!(parse_insights(response), None, "response: {:?}", response);
        }
    }
}
