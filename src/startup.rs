use std::net::TcpListener;

use actix_files::Files;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use tokio::sync::Mutex;

use crate::{
    domain::batch::BatchSession,
    routes::{analyze_route, batch_route, default_route},
    services::{OpenaiClient, OutreachPipeline, TextExtractor},
};

pub type AppPipeline = OutreachPipeline<OpenaiClient, TextExtractor>;

pub fn run(listener: TcpListener, pipeline: AppPipeline) -> Result<Server, std::io::Error> {
    let pipeline = web::Data::new(pipeline);
    // One interactive session per server, so one batch cursor.
    let batch_session = web::Data::new(Mutex::new(BatchSession::default()));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(Files::new("/static", "./templates/static").prefer_utf8(true))
            .service(default_route::default)
            .service(analyze_route::analyze)
            .service(
                web::scope("/batch")
                    .service(batch_route::batch)
                    .service(batch_route::upload)
                    .service(batch_route::next)
                    .service(batch_route::export),
            )
            .app_data(pipeline.clone())
            .app_data(batch_session.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
