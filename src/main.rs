// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use anyhow::Context;
use log::{info, warn};
use std::sync::Arc;

mod errors;
mod handlers;
mod models;
mod services;

use crate::handlers::{
    generate_logos, get_favorites, get_history, get_styles, toggle_favorite, upload_reference,
};
use crate::services::{
    GEMINI_API_KEY_ENV, GeminiClient, HistoryService, ImageProcessor, LogoGenerator,
};

#[derive(Clone)]
pub struct AppState {
    history: Arc<HistoryService>,
    generator: Arc<LogoGenerator>,
    image_processor: Arc<ImageProcessor>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting brandforge service...");

    // The credential is checked again per batch; starting without it keeps
    // the health endpoint and history readable while generation is rejected.
    let api_key = std::env::var(GEMINI_API_KEY_ENV).ok();
    if api_key.is_none() {
        warn!("{GEMINI_API_KEY_ENV} is not set; generation requests will be rejected");
    }

    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let history = Arc::new(
        HistoryService::new(&redis_url)
            .await
            .with_context(|| format!("failed to connect to redis at {redis_url}"))?,
    );

    let capability = Arc::new(GeminiClient::new(api_key));
    let generator = Arc::new(LogoGenerator::new(capability));
    let image_processor = Arc::new(ImageProcessor::new());

    let app_state = AppState {
        history,
        generator,
        image_processor,
    };

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    info!("Starting HTTP server on {bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api/v1")
                    .route("/generate", web::post().to(generate_logos))
                    .route("/styles", web::get().to(get_styles))
                    .route("/reference", web::post().to(upload_reference))
                    .route("/history/{session_id}", web::get().to(get_history))
                    .route(
                        "/history/{item_id}/favorite",
                        web::post().to(toggle_favorite),
                    )
                    .route("/favorites/{session_id}", web::get().to(get_favorites)),
            )
            .route("/health", web::get().to(health_check))
            .service(actix_files::Files::new("/", "./static").index_file("index.html"))
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {bind_addr}"))?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "brandforge",
        "version": "0.1.0"
    }))
}
