//! Page content: the static record of what the card says.
//!
//! Pages are authored once (compiled in, or loaded from a JSON file at
//! startup) and never mutated afterwards. Everything downstream borrows them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// TYPES
// ============================================================================

/// One leaf of the book: two independent faces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub front: Face,
    pub back: Face,
}

/// One side of a page.
///
/// Flags default to off so content files only spell out what they use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    /// Small hint bubble, e.g. "Swipe or use the arrows".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub compact: bool,
    /// Marks the face hosting the yes/no prompt.
    #[serde(default, skip_serializing_if = "is_false")]
    pub question: bool,
    /// Marks the closing face of the book.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ending: bool,
}

/// Media attached to a face: a placeholder caption or an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Media {
    Placeholder(String),
    Image(ImageRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// The question asked on the prompt face.
pub const QUESTION: &str = "Will you be my Valentine?";

/// Cover lines, top to bottom.
pub const COVER_TITLE: [&str; 2] = ["To Glow", "The Love of My Life"];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid page content: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("the book needs at least one page")]
    Empty,
    #[error("page {index}: only the front of the last page may hold the question")]
    MisplacedQuestion { index: usize },
}

// ============================================================================
// LOADING
// ============================================================================

/// Parse pages from a JSON array and check the book's shape.
pub fn parse_pages(json: &str) -> Result<Vec<Page>, ContentError> {
    let pages: Vec<Page> = serde_json::from_str(json)?;
    validate(&pages)?;
    Ok(pages)
}

/// Read and parse a JSON content file.
pub fn load_pages(path: &Path) -> Result<Vec<Page>, ContentError> {
    let json = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pages = parse_pages(&json)?;
    tracing::info!(path = %path.display(), pages = pages.len(), "loaded page content");
    Ok(pages)
}

/// A book must have pages, and the question can only sit on the last front.
pub fn validate(pages: &[Page]) -> Result<(), ContentError> {
    if pages.is_empty() {
        return Err(ContentError::Empty);
    }
    let last = pages.len() - 1;
    for (index, page) in pages.iter().enumerate() {
        if page.back.question || (page.front.question && index != last) {
            return Err(ContentError::MisplacedQuestion { index });
        }
    }
    Ok(())
}

/// Index of the page whose front holds the question, if any.
pub fn question_index(pages: &[Page]) -> Option<usize> {
    pages.iter().position(|p| p.front.question)
}

// ============================================================================
// BUILT-IN BOOK
// ============================================================================

fn face(eyebrow: &str, title: &str, text: &str) -> Face {
    Face {
        eyebrow: Some(eyebrow.to_string()),
        title: title.to_string(),
        text: text.to_string(),
        ..Face::default()
    }
}

fn image(src: &str, alt: &str) -> Option<Media> {
    Some(Media::Image(ImageRef {
        kind: MediaKind::Image,
        src: src.to_string(),
        alt: alt.to_string(),
    }))
}

fn placeholder(label: &str) -> Option<Media> {
    Some(Media::Placeholder(label.to_string()))
}

/// The compiled-in four-page book.
pub fn default_pages() -> Vec<Page> {
    vec![
        Page {
            front: Face {
                pill: Some("Swipe or use the arrows".to_string()),
                signature: Some("— Yours".to_string()),
                ..face(
                    "A quiet little journey",
                    "Every page is a heartbeat.",
                    "In the soft glow of February, I wrote this for you. A few moments, \
                     a few wishes, and one question that matters most.",
                )
            },
            back: Face {
                media: placeholder("Photo / GIF"),
                ..face(
                    "Chapter I",
                    "The Way You Entered My Days",
                    "Placeholder for your first memory together. A sentence about how her \
                     smile changed the room, or how the world got softer the day you met.",
                )
            },
        },
        Page {
            front: Face {
                compact: true,
                media: image("peach-cat-hug.gif", "Peach cat hug"),
                ..face(
                    "Chapter II",
                    "The Little Things",
                    "My love ❤️\n\
                     I still remember the day we met on your street and the night of our first \
                     kiss. How enchanting eyes were is something I can never forget.\n\
                     Whenever I’m with you, I feel complete and at peace. I keep imagining our \
                     future together happy, married, and building a beautiful family.\n\
                     I pray to God for long life and wisdom to love and care for His precious \
                     daughter, Elo Marvelous Edafeasume.",
                )
            },
            back: Face {
                media: placeholder("Favorite Quote"),
                ..face(
                    "Chapter III",
                    "Where I Want to Be",
                    "Placeholder for a future scene: a city to visit, a rainy day, a Sunday \
                     morning. A sentence about choosing her, always.",
                )
            },
        },
        Page {
            front: Face {
                media: image("promise.gif", "Promise gif"),
                ..face(
                    "Chapter IV",
                    "The Promise",
                    "They say promises are meant to be broken, but not ours. I choose you, \
                     every day. I’m sticking with you till the very end through the fights, \
                     through misunderstandings, through thick and thin.\n\
                     You are my heart, my love, and my forever ❤️",
                )
            },
            back: Face {
                media: placeholder("A Shared Song"),
                ..face(
                    "Chapter V",
                    "If I Could Freeze Time",
                    "Placeholder for a moment you wish could last forever. A gentle reminder \
                     that she is your favorite place.",
                )
            },
        },
        Page {
            front: Face {
                question: true,
                ..face(
                    "Finale",
                    "One Question",
                    "If this story has a title, it is the way I feel around you. I want to \
                     make more pages together.",
                )
            },
            back: Face {
                ending: true,
                title: "Thank you for turning every page.".to_string(),
                text: "Add your own message here.".to_string(),
                ..Face::default()
            },
        },
    ]
}

// ============================================================================
// TESTS
// ============================================================================
