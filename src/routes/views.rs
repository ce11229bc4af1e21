use actix_web::HttpResponse;
use askama::Template;

use crate::domain::{
    batch::{PitchOutput, RowReport},
    pitch::{render_markdown, PitchBlock},
};

pub struct BlockView {
    pub is_subject: bool,
    pub heading: String,
    pub lines: Vec<String>,
}

impl From<&PitchBlock> for BlockView {
    fn from(value: &PitchBlock) -> Self {
        match value {
            PitchBlock::Subject(subject) => BlockView {
                is_subject: true,
                heading: "Subject:".to_string(),
                lines: vec![subject.clone()],
            },
            PitchBlock::Section { heading, items } => BlockView {
                is_subject: false,
                heading: heading.clone(),
                lines: items.clone(),
            },
            PitchBlock::Paragraph(text) => BlockView {
                is_subject: false,
                heading: "".to_string(),
                lines: vec![text.clone()],
            },
        }
    }
}

pub struct PitchView {
    pub label: String,
    pub blocks: Vec<BlockView>,
    pub markdown: String,
    pub error: String,
}

impl From<&PitchOutput> for PitchView {
    fn from(value: &PitchOutput) -> Self {
        Self {
            label: value.pitch_type.label().to_string(),
            blocks: value.blocks.iter().map(BlockView::from).collect(),
            markdown: render_markdown(&value.blocks),
            error: value.error.clone().unwrap_or_default(),
        }
    }
}

pub struct ReportView {
    pub url: String,
    pub scrape_warning: String,
    pub insights_json: String,
    pub insight_notice: String,
    pub pitches: Vec<PitchView>,
}

impl From<&RowReport> for ReportView {
    fn from(value: &RowReport) -> Self {
        let (insights_json, insight_notice) = match value.insights {
            Some(ref insights) => (insights.to_pretty_json(), "".to_string()),
            None => (
                "".to_string(),
                format!(
                    "No usable insights found ({}). Pitches below use generic defaults.",
                    value.insight_error.as_deref().unwrap_or("unknown reason")
                ),
            ),
        };

        Self {
            url: value.url.clone(),
            scrape_warning: value.scrape_warning.clone().unwrap_or_default(),
            insights_json,
            insight_notice,
            pitches: value.pitches.iter().map(PitchView::from).collect(),
        }
    }
}

pub fn render_page<T: Template>(template: T) -> HttpResponse {
    match template.render() {
        Ok(body) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body),
        Err(e) => {
            log::error!("Failed to render template: {:?}", e);
            HttpResponse::InternalServerError().body("Failed to render page")
        }
    }
}
