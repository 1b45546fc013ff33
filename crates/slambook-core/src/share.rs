//! Share links
//!
//! A share link carries only a book's ID and title, base64-encoded into
//! the URL fragment as `#book=<data>`. It identifies a book; it does not
//! transport its contents.
//!
//! `SharePattern` draws a decorative grid from the encoded payload with
//! three QR-style corner markers. It is NOT a QR code and no reader can
//! decode it.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::Book;

/// Value of the payload's `type` field
pub const SHARE_TYPE: &str = "slambook";

/// Fragment key preceding the payload
const FRAGMENT_KEY: &str = "book=";

/// Identifying record embedded in a share link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl SharePayload {
    pub fn for_book(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            kind: SHARE_TYPE.to_string(),
        }
    }
}

/// A generated share link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLink {
    /// Full URL including the `#book=` fragment
    pub url: String,
    /// The base64 payload on its own
    pub data: String,
}

impl ShareLink {
    /// Decorative pattern derived from this link's payload
    pub fn pattern(&self) -> SharePattern {
        SharePattern::from_data(&self.data)
    }
}

/// Build the share link for `book`, pointing at `base_url`
///
/// Any fragment already on `base_url` is replaced.
pub fn share_link(book: &Book, base_url: &str) -> Result<ShareLink> {
    let json = serde_json::to_string(&SharePayload::for_book(book))?;
    let data = STANDARD.encode(json.as_bytes());
    let base = base_url.split('#').next().unwrap_or(base_url);
    Ok(ShareLink {
        url: format!("{}#{}{}", base, FRAGMENT_KEY, data),
        data,
    })
}

/// Recover the payload from a share URL or bare fragment
///
/// Returns `None` when there is no `book=` entry or it doesn't decode.
pub fn decode_share_fragment(input: &str) -> Option<SharePayload> {
    let fragment = match input.split_once('#') {
        Some((_, fragment)) => fragment,
        None => input,
    };

    let start = fragment.find(FRAGMENT_KEY)? + FRAGMENT_KEY.len();
    let encoded = fragment[start..].split('&').next()?;
    if encoded.is_empty() {
        return None;
    }

    let bytes = match STANDARD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Share fragment is not valid base64: {}", e);
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!("Share fragment is not a book payload: {}", e);
            None
        }
    }
}

// ==================== Pattern ====================

/// Canvas size in pixels used when rendering
pub const PATTERN_SIZE: usize = 200;
/// Edge length of one module in pixels
const BLOCK_SIZE: usize = 10;
/// Corner markers are this many modules wide
const MARKER_MODULES: usize = 3;
/// Module size of the fallback checkerboard
const FALLBACK_BLOCK_SIZE: usize = 20;

/// A square grid of black/white modules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePattern {
    /// Modules per side
    size: usize,
    /// Row-major; `true` is black
    modules: Vec<bool>,
}

impl SharePattern {
    /// Derive the pattern from encoded payload bytes
    ///
    /// Module `i` is black when `data[i % len] + i` is even. Empty data
    /// yields a plain checkerboard instead.
    pub fn from_data(data: &str) -> Self {
        let bytes = data.as_bytes();
        if bytes.is_empty() {
            return Self::fallback();
        }

        let size = PATTERN_SIZE / BLOCK_SIZE;
        let mut modules: Vec<bool> = (0..size * size)
            .map(|i| (bytes[i % bytes.len()] as usize + i) % 2 == 0)
            .collect();

        let far = size - MARKER_MODULES;
        for (row, col) in [(0, 0), (0, far), (far, 0)] {
            for dr in 0..MARKER_MODULES {
                for dc in 0..MARKER_MODULES {
                    modules[(row + dr) * size + col + dc] = !(dr == 1 && dc == 1);
                }
            }
        }

        Self { size, modules }
    }

    fn fallback() -> Self {
        let size = PATTERN_SIZE / FALLBACK_BLOCK_SIZE;
        let modules = (0..size * size)
            .map(|i| (i / size + i % size) % 2 == 0)
            .collect();
        Self { size, modules }
    }

    /// Modules per side
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the module at (`row`, `col`) is black
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.modules[row * self.size + col]
    }

    /// Render as a 200x200 SVG image with a thin border
    pub fn to_svg(&self) -> String {
        let block = PATTERN_SIZE / self.size;
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {0} {0}\">\n\
             <rect width=\"{0}\" height=\"{0}\" fill=\"#FFFFFF\"/>\n",
            PATTERN_SIZE
        );
        for row in 0..self.size {
            for col in 0..self.size {
                if self.is_dark(row, col) {
                    let _ = writeln!(
                        svg,
                        "<rect x=\"{}\" y=\"{}\" width=\"{2}\" height=\"{2}\" fill=\"#000000\"/>",
                        col * block,
                        row * block,
                        block
                    );
                }
            }
        }
        let _ = writeln!(
            svg,
            "<rect x=\"1\" y=\"1\" width=\"{0}\" height=\"{0}\" fill=\"none\" stroke=\"#000000\" stroke-width=\"2\"/>",
            PATTERN_SIZE - 2
        );
        svg.push_str("</svg>\n");
        svg
    }

    /// Render with terminal block characters, two columns per module
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size * 2 + 1) * 3);
        for row in 0..self.size {
            for col in 0..self.size {
                out.push_str(if self.is_dark(row, col) { "██" } else { "  " });
            }
            out.push('\n');
        }
        out
    }
}
