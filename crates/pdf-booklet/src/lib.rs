pub mod booklet;
mod constants;
mod options;
pub mod sequence;
mod stats;
pub mod tools;
mod types;
mod workspace;

pub use booklet::{BookletContext, BookletReport, booklet_statistics, make_booklet, page_order};
pub use constants::{DEFAULT_SEPARATOR, OUTPUT_SUFFIX};
pub use options::*;
pub use sequence::{compute_sheets, flatten, format_page_order, padded_page_count};
pub use stats::calculate_statistics;
pub use tools::{ExternalTools, NativeTools, PdfToolkit};
pub use types::*;
pub use workspace::WorkDir;
