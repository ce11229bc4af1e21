use actix_multipart::form::{bytes::Bytes, MultipartForm};
use actix_web::{get, http::header, post, web, HttpResponse};
use askama::Template;
use tokio::sync::Mutex;

use crate::{
    domain::batch::{export_csv, BatchRow, BatchSession, BatchState},
    routes::views::{render_page, ReportView},
    services::batch_controller::{advance_batch, upload_batch},
    startup::AppPipeline,
};

const EXPORT_FILE_NAME: &str = "pitch_results.csv";

#[derive(MultipartForm)]
struct UploadForm {
    #[multipart(limit = "2MB")]
    file: Bytes,
}

#[derive(Template)]
#[template(path = "batch.html")]
struct BatchTemplate {
    file_name: String,
    row_number: usize,
    row_count: usize,
    complete: bool,
    contact: Option<BatchRow>,
    report: Option<ReportView>,
    exported_rows: usize,
    error: String,
}

impl BatchTemplate {
    fn from_session(session: &BatchSession) -> Self {
        BatchTemplate {
            file_name: session.file_name().unwrap_or_default().to_string(),
            row_number: session.cursor() + 1,
            row_count: session.row_count(),
            complete: session.state() == BatchState::Complete,
            contact: session.current_row().cloned(),
            report: session.current_report().map(ReportView::from),
            exported_rows: session.export_records().len(),
            error: "".to_string(),
        }
    }
}

#[get("")]
async fn batch(session: web::Data<Mutex<BatchSession>>) -> HttpResponse {
    let session = session.lock().await;
    render_page(BatchTemplate::from_session(&session))
}

#[post("/upload")]
async fn upload(
    pipeline: web::Data<AppPipeline>,
    session: web::Data<Mutex<BatchSession>>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> HttpResponse {
    let file_name = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "upload.csv".to_string());

    match upload_batch(pipeline.get_ref(), session.get_ref(), &file_name, &form.file.data).await {
        Ok(state) => log::info!("Batch {} at {:?}", file_name, state),
        Err(e) => {
            log::error!("Rejected batch upload {}: {}", file_name, e);
            let session = session.lock().await;
            return render_page(BatchTemplate {
                error: e.to_string(),
                ..BatchTemplate::from_session(&session)
            });
        }
    }

    let session = session.lock().await;
    render_page(BatchTemplate::from_session(&session))
}

#[post("/next")]
async fn next(
    pipeline: web::Data<AppPipeline>,
    session: web::Data<Mutex<BatchSession>>,
) -> HttpResponse {
    let state = advance_batch(pipeline.get_ref(), session.get_ref()).await;
    log::info!("Advanced batch to {:?}", state);

    let session = session.lock().await;
    render_page(BatchTemplate::from_session(&session))
}

#[get("/export")]
async fn export(session: web::Data<Mutex<BatchSession>>) -> HttpResponse {
    let records = session.lock().await.export_records();

    match export_csv(&records) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ))
            .body(csv),
        Err(e) => {
            log::error!("Failed to export batch results: {:?}", e);
            HttpResponse::InternalServerError().body("Failed to export results")
        }
    }
}
