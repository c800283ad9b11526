//! Booklet generation
//!
//! This module orchestrates the booklet process:
//! 1. Copy the input into a scoped working directory
//! 2. Pad the booklet pages to a multiple of four
//! 3. Reorder pages into sheet order
//! 4. Impose two pages per landscape sheet and publish the result

use crate::options::BookletOptions;
use crate::sequence::{compute_sheets, flatten};
use crate::stats::calculate_statistics;
use crate::tools::PdfToolkit;
use crate::types::*;
use crate::workspace::WorkDir;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Everything one booklet run needs: validated options, the resolved output
/// path and the working directory.
///
/// Dropping the context releases the working directory.
#[derive(Debug)]
pub struct BookletContext {
    options: BookletOptions,
    input: PathBuf,
    output: PathBuf,
    workdir: WorkDir,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct BookletReport {
    pub output: PathBuf,
    pub statistics: BookletStatistics,
    pub page_order: Vec<i64>,
}

impl BookletContext {
    /// Validate options and acquire the working directory.
    ///
    /// Fails before any work is done when the input is missing or the output
    /// exists and overwriting was not requested.
    pub fn new(options: BookletOptions) -> Result<Self> {
        options.validate()?;
        let input = options.require_input()?.to_owned();
        let output = options.output_path()?;

        if output.exists() {
            if !options.force {
                return Err(BookletError::OutputExists(output));
            }
            warn!("Overwriting existing file '{}'.", output.display());
        }

        let workdir = WorkDir::new(options.keep_temp)?;
        Ok(Self {
            options,
            input,
            output,
            workdir,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn workdir(&self) -> &WorkDir {
        &self.workdir
    }
}

/// Produce the booklet described by `ctx` using `toolkit`.
pub async fn make_booklet<T: PdfToolkit>(
    ctx: &BookletContext,
    toolkit: &T,
) -> Result<BookletReport> {
    info!("Using {} PDF tools", toolkit.name());

    let extended = ctx.workdir.join("extended.pdf");
    let reordered = ctx.workdir.join("reordered.pdf");
    let imposed = ctx.workdir.join("booklet.pdf");

    tokio::fs::copy(&ctx.input, &extended).await?;
    debug!(
        "Copied input PDF '{}' to '{}'",
        ctx.input.display(),
        extended.display()
    );

    let total_pages = toolkit.count_pages(&extended).await?;
    info!("Input PDF has {} pages", total_pages);
    if total_pages == 0 {
        return Err(no_pages(&ctx.input));
    }

    let start_page = ctx.options.start_page;
    let statistics = calculate_statistics(total_pages, start_page)?;
    let skipped = total_pages - statistics.booklet_pages;
    let pages_needed = skipped + statistics.padded_pages;
    debug!("Total pages needed after adding blanks: {}", pages_needed);

    toolkit
        .pad_with_blanks(&extended, pages_needed, ctx.workdir.path())
        .await?;
    let padded_total = toolkit.count_pages(&extended).await?;
    debug!("Total pages after adding blanks: {}", padded_total);
    if padded_total != pages_needed {
        return Err(BookletError::tool(
            toolkit.name(),
            format!(
                "expected {} pages after padding, found {}",
                pages_needed, padded_total
            ),
        ));
    }

    let page_order = flatten(&compute_sheets(statistics.booklet_pages, start_page));
    debug!("Reordered page list: {:?}", page_order);

    toolkit
        .reorder_pages(&extended, &reordered, &page_order)
        .await?;
    toolkit.impose_two_up_landscape(&reordered, &imposed).await?;

    publish(&imposed, &ctx.output).await?;
    info!("Booklet created: {}", ctx.output.display());

    Ok(BookletReport {
        output: ctx.output.clone(),
        statistics,
        page_order,
    })
}

/// Compute the flat page order without producing a document.
///
/// The order is the one [`make_booklet`] would apply for the same options.
pub async fn page_order<T: PdfToolkit>(
    options: &BookletOptions,
    toolkit: &T,
) -> Result<Vec<i64>> {
    let statistics = booklet_statistics(options, toolkit).await?;
    Ok(flatten(&compute_sheets(
        statistics.booklet_pages,
        options.start_page,
    )))
}

/// Statistics for page-order and statistics modes.
///
/// With an input document, pages before `start_page` are left out, as in
/// [`make_booklet`]. Without one, `options.page_count` is the number of
/// booklet pages, numbered from `start_page`.
pub async fn booklet_statistics<T: PdfToolkit>(
    options: &BookletOptions,
    toolkit: &T,
) -> Result<BookletStatistics> {
    options.validate()?;
    match (&options.input, options.page_count) {
        (Some(input), _) => {
            let total_pages = toolkit.count_pages(input).await?;
            if total_pages == 0 {
                return Err(no_pages(input));
            }
            calculate_statistics(total_pages, options.start_page)
        }
        (None, Some(pages)) => calculate_statistics(pages, 1),
        (None, None) => Err(BookletError::Input(
            "Either specify an input PDF or use -n/--pages to define the number of pages."
                .to_string(),
        )),
    }
}

/// Move the finished document into place.
///
/// The copy goes to a staging file beside `output`, which is then renamed over
/// it, so `output` is either untouched or complete.
async fn publish(finished: &Path, output: &Path) -> Result<()> {
    let staged = staging_path(output);
    if let Err(e) = tokio::fs::copy(finished, &staged).await {
        remove_staged(&staged).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&staged, output).await {
        remove_staged(&staged).await;
        return Err(e.into());
    }
    Ok(())
}

/// `dir/.name.partial` for `dir/name`
fn staging_path(output: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(output.file_name().unwrap_or(output.as_os_str()));
    name.push(".partial");
    output.with_file_name(name)
}

async fn remove_staged(staged: &Path) {
    match tokio::fs::remove_file(staged).await {
        Ok(()) => debug!("Removed partial output '{}'", staged.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove '{}': {}", staged.display(), e),
    }
}

fn no_pages(input: &Path) -> BookletError {
    BookletError::Input(format!("'{}' has no pages", input.display()))
}
