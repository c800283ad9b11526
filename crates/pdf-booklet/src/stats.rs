use crate::constants::{PAGES_PER_SHEET, SIDES_PER_SHEET};
use crate::sequence::padded_page_count;
use crate::types::*;

/// Calculate statistics for a booklet made from `source_pages` pages,
/// beginning at document page `start_page`.
pub fn calculate_statistics(source_pages: usize, start_page: i64) -> Result<BookletStatistics> {
    let booklet_pages = pages_from_start(source_pages, start_page)?;

    let padded_pages = padded_page_count(booklet_pages);
    let sheets = padded_pages / PAGES_PER_SHEET;

    Ok(BookletStatistics {
        source_pages,
        booklet_pages,
        padded_pages,
        blank_pages_added: padded_pages - booklet_pages,
        sheets,
        printed_sides: sheets * SIDES_PER_SHEET,
    })
}

/// Number of document pages from `start_page` to the end
pub(crate) fn pages_from_start(source_pages: usize, start_page: i64) -> Result<usize> {
    if start_page < 1 {
        return Err(BookletError::Input(format!(
            "Start page must be at least 1, got {}",
            start_page
        )));
    }

    let skipped = (start_page - 1) as usize;
    if skipped > 0 && skipped >= source_pages {
        return Err(BookletError::Input(format!(
            "Start page {} is beyond the last page ({})",
            start_page, source_pages
        )));
    }

    Ok(source_pages - skipped)
}
