use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookletError {
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Output file '{}' already exists. Use -f or --force to overwrite.", .0.display())]
    OutputExists(PathBuf),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Interrupted by {0}")]
    Interrupted(&'static str),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl BookletError {
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BookletError>;

/// One physical sheet: the four page numbers printed on it, in the order
/// they are extracted for reimposition.
///
/// For a 12 page booklet the outermost sheet is `(12, 1, 2, 11)`: the front
/// side carries 12 and 1, the back side carries 2 and 11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    pub outer_right: i64,
    pub outer_left: i64,
    pub inner_left: i64,
    pub inner_right: i64,
}

impl Sheet {
    pub fn new(outer_right: i64, outer_left: i64, inner_left: i64, inner_right: i64) -> Self {
        Self {
            outer_right,
            outer_left,
            inner_left,
            inner_right,
        }
    }

    /// Page numbers in extraction order
    pub fn pages(&self) -> [i64; 4] {
        [
            self.outer_right,
            self.outer_left,
            self.inner_left,
            self.inner_right,
        ]
    }

    /// Return a copy with every page number moved by `delta`
    pub fn shifted(&self, delta: i64) -> Self {
        Self::new(
            self.outer_right + delta,
            self.outer_left + delta,
            self.inner_left + delta,
            self.inner_right + delta,
        )
    }
}

impl From<(i64, i64, i64, i64)> for Sheet {
    fn from((outer_right, outer_left, inner_left, inner_right): (i64, i64, i64, i64)) -> Self {
        Self::new(outer_right, outer_left, inner_left, inner_right)
    }
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes for blank pages and the imposed output
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PaperSize {
    /// Get base dimensions (always portrait)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Portrait dimensions in whole points, as ImageMagick expects them
    pub fn dimensions_pt(self) -> (u32, u32) {
        let (w, h) = self.dimensions_mm();
        (
            crate::constants::mm_to_pt(w).round() as u32,
            crate::constants::mm_to_pt(h).round() as u32,
        )
    }
}

/// Statistics about a booklet run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookletStatistics {
    /// Pages in the source document
    pub source_pages: usize,
    /// Pages that go into the booklet (source pages from the start page on)
    pub booklet_pages: usize,
    /// Booklet pages after padding to a multiple of four
    pub padded_pages: usize,
    /// Number of blank pages appended
    pub blank_pages_added: usize,
    /// Physical sheets needed
    pub sheets: usize,
    /// Printed sides (front and back of each sheet)
    pub printed_sides: usize,
}
