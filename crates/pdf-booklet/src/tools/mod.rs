//! PDF manipulation collaborators
//!
//! The booklet pipeline needs four document operations. They are expressed
//! by [`PdfToolkit`] and provided by two backends:
//! - [`ExternalTools`] shells out to pdftk, ImageMagick and pdfjam
//! - [`NativeTools`] does the same work in-process with lopdf

mod external;
mod native;

pub use external::ExternalTools;
pub use native::NativeTools;

use crate::types::Result;
use std::path::Path;

/// Document operations the booklet pipeline depends on.
///
/// Documents are files on disk; page numbers are 1-indexed.
#[allow(async_fn_in_trait)]
pub trait PdfToolkit {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Count the pages of a document
    async fn count_pages(&self, document: &Path) -> Result<usize>;

    /// Append blank pages to `document` in place until it has
    /// `target_count` pages. Returns the number of pages added.
    ///
    /// `scratch_dir` may be used for intermediate files.
    async fn pad_with_blanks(
        &self,
        document: &Path,
        target_count: usize,
        scratch_dir: &Path,
    ) -> Result<usize>;

    /// Write the pages of `input` selected and concatenated per `order`
    async fn reorder_pages(&self, input: &Path, output: &Path, order: &[i64]) -> Result<()>;

    /// Lay out consecutive page pairs side by side on landscape sheets
    async fn impose_two_up_landscape(&self, input: &Path, output: &Path) -> Result<()>;
}
