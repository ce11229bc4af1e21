use actix_web::{get, HttpResponse};
use askama::Template;

use crate::routes::views::render_page;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub error: String,
}

#[get("/")]
async fn default() -> HttpResponse {
    render_page(IndexTemplate {
        error: "".to_string(),
    })
}
