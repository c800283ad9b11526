//! In-process backend built on lopdf

mod pages;
mod two_up;
mod xobject;

use super::PdfToolkit;
use crate::types::*;
use log::{debug, info};
use lopdf::Document;
use std::path::Path;

pub(crate) const LOPDF: &str = "lopdf";

/// Performs every document operation with lopdf, no external programs needed
#[derive(Debug, Clone, Default)]
pub struct NativeTools {
    paper_size: PaperSize,
}

impl NativeTools {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }
}

impl PdfToolkit for NativeTools {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn count_pages(&self, document: &Path) -> Result<usize> {
        let doc = load_pdf(document).await?;
        let pages = doc.get_pages().len();
        debug!("Number of pages in '{}': {}", document.display(), pages);
        Ok(pages)
    }

    async fn pad_with_blanks(
        &self,
        document: &Path,
        target_count: usize,
        _scratch_dir: &Path,
    ) -> Result<usize> {
        info!(
            "Adding blank pages to PDF '{}' to reach total pages: {}",
            document.display(),
            target_count
        );

        let doc = load_pdf(document).await?;
        let current = doc.get_pages().len();
        if current >= target_count {
            debug!("No blank pages needed.");
            return Ok(0);
        }
        let to_add = target_count - current;
        debug!("Current pages: {}, pages to add: {}", current, to_add);

        let padded =
            tokio::task::spawn_blocking(move || pages::append_blank_pages(doc, to_add)).await??;
        save_pdf(padded, document).await?;
        Ok(to_add)
    }

    async fn reorder_pages(&self, input: &Path, output: &Path, order: &[i64]) -> Result<()> {
        info!("Reordering PDF pages in '{}'", input.display());
        let doc = load_pdf(input).await?;
        let order = order.to_vec();
        let reordered =
            tokio::task::spawn_blocking(move || pages::reorder_document(doc, &order)).await??;
        save_pdf(reordered, output).await?;
        debug!("Reordered PDF saved as '{}'", output.display());
        Ok(())
    }

    async fn impose_two_up_landscape(&self, input: &Path, output: &Path) -> Result<()> {
        info!("Creating booklet PDF from '{}'", input.display());
        let source = load_pdf(input).await?;
        let paper = self.paper_size;
        let imposed =
            tokio::task::spawn_blocking(move || two_up::impose_two_up(&source, paper)).await??;
        save_pdf(imposed, output).await?;
        debug!("Booklet PDF created at '{}'", output.display());
        Ok(())
    }
}

/// Load a PDF document
async fn load_pdf(path: &Path) -> Result<Document> {
    let bytes = tokio::fs::read(path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Save a PDF document
async fn save_pdf(mut doc: Document, path: &Path) -> Result<()> {
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, BookletError>(writer)
    })
    .await??;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
