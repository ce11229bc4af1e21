use actix_web::{post, web, HttpResponse};
use askama::Template;
use serde::Deserialize;

use crate::{
    routes::{
        default_route::IndexTemplate,
        views::{render_page, ReportView},
    },
    startup::AppPipeline,
};

#[derive(Deserialize)]
struct AnalyzeForm {
    url: String,
}

#[derive(Template)]
#[template(path = "analysis.html")]
struct AnalysisTemplate {
    report: ReportView,
}

#[post("/analyze")]
async fn analyze(pipeline: web::Data<AppPipeline>, form: web::Form<AnalyzeForm>) -> HttpResponse {
    let url = form.url.trim();
    if url.is_empty() {
        return render_page(IndexTemplate {
            error: "Enter a website URL to analyze.".to_string(),
        });
    }

    let report = pipeline.analyze_url(url).await;

    render_page(AnalysisTemplate {
        report: ReportView::from(&report),
    })
}
