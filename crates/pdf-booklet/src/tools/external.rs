//! Subprocess backend: pdftk, ImageMagick `convert` and pdfjam

use super::PdfToolkit;
use crate::types::*;
use log::{debug, info};
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;

const PDFTK: &str = "pdftk";
const CONVERT: &str = "convert";
const PDFJAM: &str = "pdfjam";

/// Handle assigned to the input document in pdftk `cat` ranges
const PDFTK_HANDLE: &str = "A";

/// Runs the external command-line tools
#[derive(Debug, Clone, Default)]
pub struct ExternalTools {
    paper_size: PaperSize,
}

impl ExternalTools {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    /// Create a single blank page of the configured paper size
    async fn create_blank_pdf(&self, output: &Path) -> Result<()> {
        debug!("Creating blank PDF page: {}", output.display());
        let (width, height) = self.paper_size.dimensions_pt();
        run(
            CONVERT,
            vec![
                "-size".into(),
                format!("{}x{}", width, height).into(),
                "xc:white".into(),
                output.into(),
            ],
        )
        .await?;
        Ok(())
    }
}

impl PdfToolkit for ExternalTools {
    fn name(&self) -> &'static str {
        "external"
    }

    async fn count_pages(&self, document: &Path) -> Result<usize> {
        debug!("Getting number of pages for PDF file: {}", document.display());
        let stdout = run(PDFTK, vec![document.into(), "dump_data".into()]).await?;
        let pages = parse_number_of_pages(&stdout)?;
        debug!("Number of pages in '{}': {}", document.display(), pages);
        Ok(pages)
    }

    async fn pad_with_blanks(
        &self,
        document: &Path,
        target_count: usize,
        scratch_dir: &Path,
    ) -> Result<usize> {
        info!(
            "Adding blank pages to PDF '{}' to reach total pages: {}",
            document.display(),
            target_count
        );

        let current = self.count_pages(document).await?;
        if current >= target_count {
            debug!("No blank pages needed.");
            return Ok(0);
        }
        let to_add = target_count - current;
        debug!("Current pages: {}, pages to add: {}", current, to_add);

        let blank = scratch_dir.join("blank.pdf");
        self.create_blank_pdf(&blank).await?;

        let combined = scratch_dir.join("extended_with_blanks.pdf");
        let mut args: Vec<OsString> = vec![document.into()];
        args.extend(std::iter::repeat_n(OsString::from(&blank), to_add));
        args.extend([
            OsString::from("cat"),
            OsString::from("output"),
            combined.clone().into_os_string(),
        ]);
        run(PDFTK, args).await?;

        tokio::fs::rename(&combined, document).await?;
        debug!("Replaced PDF with extended PDF '{}'", document.display());
        Ok(to_add)
    }

    async fn reorder_pages(&self, input: &Path, output: &Path, order: &[i64]) -> Result<()> {
        info!("Reordering PDF pages in '{}'", input.display());
        let ranges = pdftk_page_ranges(order)?;
        debug!("Page order: {}", ranges.join(" "));

        let mut handle = OsString::from(format!("{}=", PDFTK_HANDLE));
        handle.push(input);

        let mut args = vec![handle, "cat".into()];
        args.extend(ranges.into_iter().map(OsString::from));
        args.extend([OsString::from("output"), output.as_os_str().to_owned()]);
        run(PDFTK, args).await?;

        debug!("Reordered PDF saved as '{}'", output.display());
        Ok(())
    }

    async fn impose_two_up_landscape(&self, input: &Path, output: &Path) -> Result<()> {
        info!("Creating booklet PDF from '{}'", input.display());
        let mut args: Vec<OsString> = vec![input.into(), "--landscape".into()];
        args.extend(pdfjam_paper_args(self.paper_size));
        args.extend([
            OsString::from("--nup"),
            OsString::from("2x1"),
            OsString::from("--outfile"),
            output.as_os_str().to_owned(),
        ]);
        run(PDFJAM, args).await?;

        debug!("Booklet PDF created at '{}'", output.display());
        Ok(())
    }
}

/// Run a tool to completion, returning its stdout.
///
/// The child is killed if the returned future is dropped before it exits.
async fn run(tool: &str, args: Vec<OsString>) -> Result<String> {
    debug!("Running {} {:?}", tool, args);
    let output = Command::new(tool)
        .args(&args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                BookletError::tool(tool, "not installed or not found in PATH")
            }
            _ => BookletError::tool(tool, format!("failed to execute: {}", e)),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BookletError::tool(
            tool,
            format!(
                "exit code {}: {}",
                output
                    .status
                    .code()
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                stderr.trim()
            ),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract the page count from `pdftk dump_data` output
fn parse_number_of_pages(dump: &str) -> Result<usize> {
    for line in dump.lines() {
        if let Some(rest) = line.strip_prefix("NumberOfPages") {
            let value = rest.trim_start_matches(':').trim();
            return value.parse().map_err(|_| {
                BookletError::tool(PDFTK, format!("unexpected NumberOfPages value '{}'", value))
            });
        }
    }

    Err(BookletError::tool(
        PDFTK,
        "could not find 'NumberOfPages' in pdftk output",
    ))
}

/// Translate a page order into pdftk handle ranges (`A12 A1 A2 A11`)
fn pdftk_page_ranges(order: &[i64]) -> Result<Vec<String>> {
    order
        .iter()
        .map(|&page| {
            if page < 1 {
                Err(BookletError::tool(
                    PDFTK,
                    format!("page {} is out of range", page),
                ))
            } else {
                Ok(format!("{}{}", PDFTK_HANDLE, page))
            }
        })
        .collect()
}

/// pdfjam paper selection arguments
fn pdfjam_paper_args(paper: PaperSize) -> Vec<OsString> {
    let named = match paper {
        PaperSize::A3 => "--a3paper",
        PaperSize::A4 => "--a4paper",
        PaperSize::A5 => "--a5paper",
        PaperSize::Letter => "--letterpaper",
        PaperSize::Legal => "--legalpaper",
        PaperSize::Tabloid => {
            let (w, h) = paper.dimensions_mm();
            return vec![
                "--papersize".into(),
                format!("{{{}mm,{}mm}}", w, h).into(),
            ];
        }
    };
    vec![named.into()]
}
