// src/models.rs
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Brand description submitted by the form. Immutable once handed to the
/// generator; the handler validates the required fields before that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandBrief {
    pub brand_name: String,
    pub industry: String,
    pub style: LogoStyle,
    pub colors: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<EncodedImage>,
}

/// Visual style selected in the form. Deserialization is total: names that
/// are not in the fixed set land in `Other` and keep their raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogoStyle {
    Minimalist,
    #[serde(rename = "Modern Luxury")]
    ModernLuxury,
    #[serde(rename = "3D Gradient")]
    Gradient3d,
    Geometric,
    #[serde(rename = "Abstract Fluid")]
    AbstractFluid,
    #[serde(rename = "Modern Mascot")]
    ModernMascot,
    #[serde(rename = "Vintage Retro")]
    VintageRetro,
    #[serde(rename = "Cyberpunk Neon")]
    CyberpunkNeon,
    #[serde(rename = "Hand-drawn")]
    HandDrawn,
    #[serde(rename = "Negative Space")]
    NegativeSpace,
    #[serde(rename = "Tech Futuristic")]
    TechFuturistic,
    #[serde(rename = "Elegant Serif")]
    ElegantSerif,
    #[serde(rename = "Isometric 3D")]
    Isometric3d,
    #[serde(rename = "Low Poly")]
    LowPoly,
    #[serde(rename = "Glitch Art")]
    GlitchArt,
    Monogram,
    Neuromorphic,
    #[serde(rename = "Pop Art")]
    PopArt,
    #[serde(untagged)]
    Other(String),
}

impl LogoStyle {
    pub const ALL: [LogoStyle; 18] = [
        LogoStyle::Minimalist,
        LogoStyle::ModernLuxury,
        LogoStyle::Gradient3d,
        LogoStyle::Geometric,
        LogoStyle::AbstractFluid,
        LogoStyle::ModernMascot,
        LogoStyle::VintageRetro,
        LogoStyle::CyberpunkNeon,
        LogoStyle::HandDrawn,
        LogoStyle::NegativeSpace,
        LogoStyle::TechFuturistic,
        LogoStyle::ElegantSerif,
        LogoStyle::Isometric3d,
        LogoStyle::LowPoly,
        LogoStyle::GlitchArt,
        LogoStyle::Monogram,
        LogoStyle::Neuromorphic,
        LogoStyle::PopArt,
    ];

    /// Display name as it appears in the form and in prompt text.
    pub fn name(&self) -> &str {
        match self {
            LogoStyle::Minimalist => "Minimalist",
            LogoStyle::ModernLuxury => "Modern Luxury",
            LogoStyle::Gradient3d => "3D Gradient",
            LogoStyle::Geometric => "Geometric",
            LogoStyle::AbstractFluid => "Abstract Fluid",
            LogoStyle::ModernMascot => "Modern Mascot",
            LogoStyle::VintageRetro => "Vintage Retro",
            LogoStyle::CyberpunkNeon => "Cyberpunk Neon",
            LogoStyle::HandDrawn => "Hand-drawn",
            LogoStyle::NegativeSpace => "Negative Space",
            LogoStyle::TechFuturistic => "Tech Futuristic",
            LogoStyle::ElegantSerif => "Elegant Serif",
            LogoStyle::Isometric3d => "Isometric 3D",
            LogoStyle::LowPoly => "Low Poly",
            LogoStyle::GlitchArt => "Glitch Art",
            LogoStyle::Monogram => "Monogram",
            LogoStyle::Neuromorphic => "Neuromorphic",
            LogoStyle::PopArt => "Pop Art",
            LogoStyle::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for LogoStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Image bytes encoded for transport (base64 + MIME type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

/// One generation attempt, built fresh per variation. Never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_prompt: String,
    pub seed: i64,
    pub variation_index: usize,
    pub reference_image: Option<EncodedImage>,
}

/// A successfully generated logo, ready for display.
#[derive(Debug, Clone)]
pub struct LogoImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl LogoImage {
    /// Data URI the browser can render directly as an `<img>` source.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.data)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EmptyResponse,
    NoImageData,
    RateLimited,
    Transport,
    Unknown,
}

/// Outcome of a single failed attempt. Failures are collected per batch and
/// only surfaced in aggregate when no attempt succeeded.
#[derive(Debug, Clone)]
pub struct AttemptFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl AttemptFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == FailureKind::RateLimited
    }
}

/// Result of one batch of generation attempts. `images` keeps attempt order
/// and is non-empty; an all-failure batch is reported as an error instead.
#[derive(Debug)]
pub struct BatchResult {
    pub images: Vec<LogoImage>,
    pub failures: Vec<AttemptFailure>,
}

/// Snapshot of one generation run, stored per browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: Uuid,
    pub session_id: Uuid,
    pub brief: BrandBrief,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}
