//! Page listing for the `pages` command.
//!
//! Pure functions: (pages, OutputFormat) → String.
//! No I/O, no side effects.

use crate::content::{Face, Media, Page};

/// Output format for non-interactive listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Format the book for output.
pub fn format_pages(pages: &[Page], format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(pages),
        OutputFormat::Json => format_json(pages),
    }
}

// ============================================================================
// HUMAN FORMAT
// ============================================================================

fn format_human(pages: &[Page]) -> String {
    let mut out = String::new();

    for (index, page) in pages.iter().enumerate() {
        out.push_str(&format!("=== Page {} ===\n", index + 1));
        push_face(&mut out, "front", &page.front);
        push_face(&mut out, "back", &page.back);
        out.push('\n');
    }

    out.push_str("=== Summary ===\n");
    out.push_str(&format!("Pages:     {}\n", pages.len()));
    out.push_str(&format!("Spreads:   {} (cover included)\n", pages.len() + 1));
    let question = pages
        .iter()
        .position(|p| p.front.question)
        .map(|i| format!("page {}", i + 1))
        .unwrap_or_else(|| "none".to_string());
    out.push_str(&format!("Question:  {}\n", question));

    out
}

fn push_face(out: &mut String, side: &str, face: &Face) {
    let mut flags = Vec::new();
    if face.question {
        flags.push("question");
    }
    if face.ending {
        flags.push("ending");
    }
    if face.compact {
        flags.push("compact");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    match &face.eyebrow {
        Some(eyebrow) => out.push_str(&format!("  {}: {} — {}{}\n", side, eyebrow, face.title, flags)),
        None => out.push_str(&format!("  {}: {}{}\n", side, face.title, flags)),
    }
    match &face.media {
        Some(Media::Placeholder(label)) => out.push_str(&format!("    media: {}\n", label)),
        Some(Media::Image(image)) => {
            out.push_str(&format!("    image: {} ({})\n", image.src, image.alt))
        }
        None => {}
    }
}

// ============================================================================
// JSON FORMAT
// ============================================================================

fn format_json(pages: &[Page]) -> String {
    serde_json::to_string_pretty(pages).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

// ============================================================================
// TESTS
// ============================================================================
