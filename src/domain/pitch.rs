use std::{fmt, str::FromStr};

use crate::domain::insights::Insights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchType {
    Professional,
    Results,
    Data,
    Linkedin,
}

impl PitchType {
    /// Display order, also the order of export columns.
    pub const ALL: [PitchType; 4] = [
        PitchType::Professional,
        PitchType::Results,
        PitchType::Data,
        PitchType::Linkedin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PitchType::Professional => "professional",
            PitchType::Results => "results",
            PitchType::Data => "data",
            PitchType::Linkedin => "linkedin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PitchType::Professional => "Professional Corporate Email",
            PitchType::Results => "Results-Driven Email",
            PitchType::Data => "Data-Focused Email",
            PitchType::Linkedin => "LinkedIn Message",
        }
    }

    /// Email pitches carry a subject line and go through the spam word rewriter.
    pub fn is_email(&self) -> bool {
        !matches!(self, PitchType::Linkedin)
    }
}

impl fmt::Display for PitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pitch type: {0}")]
pub struct UnknownPitchType(pub String);

impl FromStr for PitchType {
    type Err = UnknownPitchType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();

        PitchType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted || t.label().to_lowercase() == wanted)
            .ok_or_else(|| UnknownPitchType(s.to_string()))
    }
}

/// Everything a single pitch prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PitchRequest<'a> {
    pub url: &'a str,
    pub scraped_text: &'a str,
    pub pitch_type: PitchType,
    pub insights: &'a Insights,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEmail {
    pub subject: String,
    pub body: String,
}

/// Splits generated text at the first line starting with `Subject:`.
///
/// Text without such a line parses to an empty subject and an empty body.
pub fn parse_email(content: &str) -> ParsedEmail {
    let lines: Vec<&str> = content.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if line.to_lowercase().starts_with("subject:") {
            let subject = match line.split_once(':') {
                Some((_, rest)) => rest.trim().to_string(),
                None => String::new(),
            };
            let body = lines[i + 1..].join("\n").trim().to_string();

            return ParsedEmail { subject, body };
        }
    }

    ParsedEmail::default()
}

pub const SECTION_HEADERS: [&str; 2] = ["• Ideal Customers:", "• Ideal Audience:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PitchBlock {
    Subject(String),
    Section { heading: String, items: Vec<String> },
    Paragraph(String),
}

/// Lays a parsed email out for display.
///
/// Bulleted section headers collect every following non-empty line up to the
/// next header. Blank lines are dropped.
pub fn format_pitch(email: &ParsedEmail) -> Vec<PitchBlock> {
    let mut blocks = vec![PitchBlock::Subject(email.subject.clone())];
    let mut open_section: Option<(String, Vec<String>)> = None;

    for line in email.body.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if SECTION_HEADERS.contains(&line) {
            if let Some((heading, items)) = open_section.take() {
                blocks.push(PitchBlock::Section { heading, items });
            }
            open_section = Some((line.to_string(), vec![]));
            continue;
        }

        match open_section {
            Some((_, ref mut items)) => items.push(line.to_string()),
            None => blocks.push(PitchBlock::Paragraph(line.to_string())),
        }
    }

    if let Some((heading, items)) = open_section {
        blocks.push(PitchBlock::Section { heading, items });
    }

    blocks
}

/// Markdown rendering of formatted blocks, one paragraph per line of content.
pub fn render_markdown(blocks: &[PitchBlock]) -> String {
    let mut paragraphs = vec![];

    for block in blocks {
        match block {
            PitchBlock::Subject(subject) => paragraphs.push(format!("**Subject:** {}", subject)),
            PitchBlock::Section { heading, items } => {
                paragraphs.push(format!("**{}**", heading));
                paragraphs.extend(items.iter().cloned());
            }
            PitchBlock::Paragraph(text) => paragraphs.push(text.clone()),
        }
    }

    paragraphs.join("\n\n")
}
