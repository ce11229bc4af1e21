use tokio::sync::Mutex;

use crate::{
    domain::batch::{parse_batch_csv, BatchError, BatchSession, BatchState},
    services::{CompletionService, OutreachPipeline, TextSource},
};

/// Validates and registers an uploaded sheet, then processes the row under the cursor.
///
/// A missing website column fails before any row runs. Re-uploading the same
/// file only reprocesses the current row when it has no report yet.
pub async fn upload_batch<C: CompletionService, S: TextSource>(
    pipeline: &OutreachPipeline<C, S>,
    session: &Mutex<BatchSession>,
    file_name: &str,
    bytes: &[u8],
) -> Result<BatchState, BatchError> {
    let rows = parse_batch_csv(bytes)?;
    log::info!("Uploaded {} with {} rows", file_name, rows.len());

    let mut session = session.lock().await;
    let reset = session.observe_upload(file_name, rows);

    match reset || session.current_report().is_none() {
        true => Ok(process_current_row(pipeline, &mut session).await),
        false => Ok(session.state()),
    }
}

/// The explicit "next" action. Overlapping calls run one after the other.
pub async fn advance_batch<C: CompletionService, S: TextSource>(
    pipeline: &OutreachPipeline<C, S>,
    session: &Mutex<BatchSession>,
) -> BatchState {
    let mut session = session.lock().await;
    session.advance();
    process_current_row(pipeline, &mut session).await
}

/// Runs the pipeline for the row under the cursor. The caller holds the
/// session for the whole row so the cursor cannot move underneath it.
async fn process_current_row<C: CompletionService, S: TextSource>(
    pipeline: &OutreachPipeline<C, S>,
    session: &mut BatchSession,
) -> BatchState {
    let (index, row) = match (session.state(), session.current_row()) {
        (BatchState::ProcessingRow(i), Some(row)) => (i, row.clone()),
        (state, _) => {
            log::info!("Batch complete, nothing to process");
            return state;
        }
    };

    log::info!("Processing batch row {} ({})", index + 1, row.website);
    let report = pipeline.process_row(&row).await;

    session.record(index, report);
    session.state()
}
