// src/services/prompt.rs
//
// Prompt composition for logo generation. Everything here is a pure function
// of the brief: no I/O, no randomness. Seeds live in the generator.
use crate::models::{BrandBrief, LogoStyle};

/// Fixed designer persona sent as the system instruction with every attempt.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert graphic designer specializing in logo creation. \
     Your task is to generate a professional, high-quality, vector-style logo \
     based on the user's requirements. The output must be a single, clear \
     image suitable for a brand identity. Avoid generic clipart.";

/// Art direction used when the selected style has no dedicated directive.
pub const FALLBACK_DIRECTIVE: &str =
    "Clean, modern, professional design with a balanced composition and a timeless feel.";

/// Hard design constraints appended to every base prompt.
const DESIGN_CONSTRAINTS: &str = "Focus on simplicity, memorability, and clear visual identity.\n\
     Requirements:\n\
     - Clean vector-style graphic or high-quality illustration.\n\
     - Flat design, 2D, minimalist (unless the style calls for 3D, gradients, isometric, or complex effects).\n\
     - White or solid color background for easy extraction.\n\
     - Visually balanced and instantly recognizable.\n\
     - High contrast and professional typography if text is included.\n\
     - Do not include realistic photos; focus on graphic design.\n\
     - No clip-art, no watermarks, no extraneous objects.\n\
     - Provide the logo in a clean format suitable for web, print, and social media.";

/// Per-variation creative nuances, cycled by variation index. Each one pushes
/// the model toward a different compositional approach within the same style.
const NUANCES: [&str; 4] = [
    "Lead with a bold, abstract brandmark and set the name in a supporting role.",
    "Build the composition around custom lettering or a distinctive wordmark.",
    "Explore an emblem or badge arrangement that encloses the brand name.",
    "Reduce the subject to an unexpected geometric simplification as the focal point.",
];

pub fn system_instruction() -> &'static str {
    SYSTEM_INSTRUCTION
}

/// Art-direction text for a style. Total over every style, including
/// `Other`: unknown styles take the generic fallback. Never fails.
pub fn style_directive(style: &LogoStyle) -> &'static str {
    match style {
        LogoStyle::Minimalist => {
            "Ultra-clean composition, generous negative space, a single strong mark, \
             restrained palette, no gradients or ornamentation."
        }
        LogoStyle::ModernLuxury => {
            "Refined and understated premium feel: thin elegant linework, muted gold or \
             metallic accents, wide letter spacing, dark sophisticated background."
        }
        LogoStyle::Gradient3d => {
            "Smooth dimensional forms with soft vibrant gradients, subtle depth and \
             lighting, contemporary tech aesthetic."
        }
        LogoStyle::Geometric => {
            "Precise geometric construction from circles, triangles, and grids; crisp \
             edges, mathematical balance, modernist sensibility."
        }
        LogoStyle::AbstractFluid => {
            "Organic flowing shapes, liquid curves and blended color transitions, \
             dynamic sense of motion."
        }
        LogoStyle::ModernMascot => {
            "Friendly stylized mascot character with bold outlines, flat shading, and \
             an energetic, approachable personality."
        }
        LogoStyle::VintageRetro => {
            "Classic badge sensibility: distressed texture, muted heritage palette, \
             traditional typography, hand-crafted feel."
        }
        LogoStyle::CyberpunkNeon => {
            "Glowing neon strokes on a dark background, electric cyan and magenta, \
             futuristic dystopian edge."
        }
        LogoStyle::HandDrawn => {
            "Imperfect hand-sketched linework, organic strokes, warm and personal \
             artisanal character."
        }
        LogoStyle::NegativeSpace => {
            "Clever figure-ground interplay where a hidden second shape emerges from \
             the negative space of the primary mark."
        }
        LogoStyle::TechFuturistic => {
            "Sleek angular forms, circuit-like details, monospaced or extended \
             typography, high-tech precision."
        }
        LogoStyle::ElegantSerif => {
            "Graceful high-contrast serif typography, classical proportions, \
             refined editorial tone."
        }
        LogoStyle::Isometric3d => {
            "Isometric projection with clean 30-degree angles, layered dimensional \
             blocks, architectural clarity."
        }
        LogoStyle::LowPoly => {
            "Faceted triangular mesh construction, angular polygon shading, crystalline \
             geometric character."
        }
        LogoStyle::GlitchArt => {
            "Digital distortion effects: RGB channel splits, scanlines, and \
             fragmented displacement over bold base shapes."
        }
        LogoStyle::Monogram => {
            "Interlocked or nested initial letters as a single compact mark, balanced \
             stroke weights, classic crest-like presence."
        }
        LogoStyle::Neuromorphic => {
            "Soft extruded surfaces with subtle inner and outer shadows, matte \
             monochrome palette, tactile embossed look."
        }
        LogoStyle::PopArt => {
            "Bold comic-inspired colors, halftone dot textures, thick black outlines, \
             playful high-energy attitude."
        }
        LogoStyle::Other(_) => FALLBACK_DIRECTIVE,
    }
}

/// Shared prompt for one batch: brand details, the style's art direction, and
/// the hard design constraints. An empty or whitespace icon omits the icon
/// line entirely.
pub fn base_prompt(brief: &BrandBrief) -> String {
    let mut prompt = String::new();

    prompt.push_str("Design a professional, creative logo for a brand.\n");
    prompt.push_str(&format!("Brand Name: {}\n", brief.brand_name));
    prompt.push_str(&format!("Industry/Niche: {}\n", brief.industry));
    prompt.push_str(&format!("Style: {}\n", brief.style.name()));
    prompt.push_str(&format!("Color Palette: {}\n", brief.colors));

    if let Some(icon) = brief.icon.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Optional Icon/Symbol: {}\n", icon));
    }

    if brief.reference_image.is_some() {
        prompt.push_str("Use the attached reference image as loose visual inspiration.\n");
    }

    prompt.push_str(&format!("\nArt direction: {}\n\n", style_directive(&brief.style)));
    prompt.push_str(DESIGN_CONSTRAINTS);
    prompt
}

/// Per-variation prompt: the base prompt plus a nuance directive cycled by
/// index, plus an explicit distinctness instruction. Deterministic in
/// `(base, index, total)`.
pub fn variation_prompt(base: &str, index: usize, total: usize) -> String {
    let nuance = NUANCES[index % NUANCES.len()];
    format!(
        "{}\n\nCreate variation #{} of {}. {} Make this variation visually \
         distinct from the other variations while staying within the specified \
         style. Make it striking and scalable.",
        base,
        index + 1,
        total,
        nuance
    )
}
