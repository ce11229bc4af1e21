use std::collections::BTreeMap;

use crate::domain::{
    insights::Insights,
    pitch::{PitchBlock, PitchType},
};

pub const NOT_AVAILABLE: &str = "N/A";

const WEBSITE_COLUMNS: [&str; 2] = ["website", "url"];
const FIRST_NAME_COLUMN: &str = "first name";
const LAST_NAME_COLUMN: &str = "last name";
const COMPANY_NAME_COLUMN: &str = "company name";
const EMAIL_COLUMN: &str = "email";

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("CSV must contain a 'Website' (or 'url') column")]
    MissingWebsiteColumn,
    #[error("CSV has no data rows")]
    Empty,
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One contact from an uploaded sheet. Optional columns hold [`NOT_AVAILABLE`] when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    pub website: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub email: String,
}

impl BatchRow {
    pub fn from_website(website: &str) -> Self {
        BatchRow {
            website: website.to_string(),
            first_name: NOT_AVAILABLE.to_string(),
            last_name: NOT_AVAILABLE.to_string(),
            company_name: NOT_AVAILABLE.to_string(),
            email: NOT_AVAILABLE.to_string(),
        }
    }

    /// The row's company name when it is a real value, used to replace generated subjects.
    pub fn subject_override(&self) -> Option<&str> {
        let name = self.company_name.trim();
        match name.is_empty() || name == NOT_AVAILABLE {
            true => None,
            false => Some(name),
        }
    }
}

/// Uploads are UTF-8 most of the time; spreadsheet exports on Windows are often Latin-1.
pub fn decode_upload(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            log::warn!("Upload is not valid UTF-8 ({}), decoding as Latin-1", e);
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

pub fn parse_batch_csv(bytes: &[u8]) -> Result<Vec<BatchRow>, BatchError> {
    let text = decode_upload(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let website_column = WEBSITE_COLUMNS
        .iter()
        .find_map(|name| column(name))
        .ok_or(BatchError::MissingWebsiteColumn)?;
    let first_name_column = column(FIRST_NAME_COLUMN);
    let last_name_column = column(LAST_NAME_COLUMN);
    let company_name_column = column(COMPANY_NAME_COLUMN);
    let email_column = column(EMAIL_COLUMN);

    let mut rows = vec![];
    for record in reader.records() {
        let record = record?;
        let value = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(NOT_AVAILABLE)
                .to_string()
        };

        rows.push(BatchRow {
            website: record.get(website_column).unwrap_or("").trim().to_string(),
            first_name: value(first_name_column),
            last_name: value(last_name_column),
            company_name: value(company_name_column),
            email: value(email_column),
        });
    }

    match rows.is_empty() {
        true => Err(BatchError::Empty),
        false => Ok(rows),
    }
}

/// One generated pitch, ready for display and export.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchOutput {
    pub pitch_type: PitchType,
    /// `None` for LinkedIn messages, which have no subject line.
    pub subject: Option<String>,
    pub body: String,
    pub blocks: Vec<PitchBlock>,
    pub error: Option<String>,
}

/// What processing a single website produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RowReport {
    pub url: String,
    pub scrape_warning: Option<String>,
    /// `None` when the completion response held no usable JSON.
    pub insights: Option<Insights>,
    pub insight_error: Option<String>,
    pub pitches: Vec<PitchOutput>,
}

impl RowReport {
    pub fn company_summary(&self) -> &str {
        match self.insights {
            Some(ref insights) => &insights.company_summary,
            None => crate::domain::insights::DEFAULT_COMPANY_SUMMARY,
        }
    }

    pub fn to_export_record(&self) -> ExportRecord {
        ExportRecord {
            url: self.url.clone(),
            company_summary: self.company_summary().to_string(),
            pitches: self
                .pitches
                .iter()
                .map(|p| {
                    (
                        p.pitch_type,
                        p.subject.clone().unwrap_or_default(),
                        p.body.clone(),
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub url: String,
    pub company_summary: String,
    pub pitches: Vec<(PitchType, String, String)>,
}

pub fn export_csv(records: &[ExportRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(vec![]);

    let mut header = vec!["url".to_string(), "company_summary".to_string()];
    for pitch_type in PitchType::ALL {
        header.push(format!("{}_subject", pitch_type));
        header.push(format!("{}_body", pitch_type));
    }
    writer.write_record(&header)?;

    for record in records {
        let mut fields = vec![record.url.clone(), record.company_summary.clone()];
        for pitch_type in PitchType::ALL {
            match record.pitches.iter().find(|(t, _, _)| *t == pitch_type) {
                Some((_, subject, body)) => {
                    fields.push(subject.clone());
                    fields.push(body.clone());
                }
                None => fields.extend([String::new(), String::new()]),
            }
        }
        writer.write_record(&fields)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    ProcessingRow(usize),
    Complete,
}

/// Batch progress for one interactive session, bound to one uploaded file.
#[derive(Debug, Default)]
pub struct BatchSession {
    file_name: Option<String>,
    rows: Vec<BatchRow>,
    cursor: usize,
    current: Option<RowReport>,
    exports: BTreeMap<usize, ExportRecord>,
}

impl BatchSession {
    /// Registers an upload. A file with a new name starts over at row 0; the
    /// same name keeps the cursor and what has been generated so far.
    ///
    /// Returns whether the session was reset.
    pub fn observe_upload(&mut self, file_name: &str, rows: Vec<BatchRow>) -> bool {
        let is_new_file = self.file_name.as_deref() != Some(file_name);

        if is_new_file {
            log::info!("New batch file {}, resetting cursor", file_name);
            self.file_name = Some(file_name.to_string());
            self.cursor = 0;
            self.current = None;
            self.exports.clear();
        }
        self.rows = rows;

        is_new_file
    }

    pub fn state(&self) -> BatchState {
        match self.cursor < self.rows.len() {
            true => BatchState::ProcessingRow(self.cursor),
            false => BatchState::Complete,
        }
    }

    /// Moves to the next row. Complete stays complete.
    pub fn advance(&mut self) -> BatchState {
        if self.cursor < self.rows.len() {
            self.cursor += 1;
            self.current = None;
        }
        self.state()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn current_row(&self) -> Option<&BatchRow> {
        match self.state() {
            BatchState::ProcessingRow(i) => self.rows.get(i),
            BatchState::Complete => None,
        }
    }

    pub fn current_report(&self) -> Option<&RowReport> {
        self.current.as_ref()
    }

    /// Exports the report for row `index`. It is only shown while the cursor is still on that row.
    pub fn record(&mut self, index: usize, report: RowReport) {
        self.exports.insert(index, report.to_export_record());

        match index == self.cursor {
            true => self.current = Some(report),
            false => log::warn!(
                "Report for row {} arrived with the cursor at {}, exporting only",
                index,
                self.cursor
            ),
        }
    }

    pub fn export_records(&self) -> Vec<ExportRecord> {
        self.exports.values().cloned().collect()
    }
}
