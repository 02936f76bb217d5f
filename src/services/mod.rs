// src/services/mod.rs
pub mod gemini_client;
pub mod generator;
pub mod history_service;
pub mod image_processor;
pub mod prompt;

pub use gemini_client::{GEMINI_API_KEY_ENV, GeminiClient};
pub use generator::LogoGenerator;
pub use history_service::HistoryService;
pub use image_processor::ImageProcessor;
