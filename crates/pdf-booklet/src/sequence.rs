//! Booklet page sequencing
//!
//! Computes the order in which pages must be extracted so that, printed two
//! per side and folded at the centre, the sheets read sequentially.
//!
//! ## Layout
//!
//! **12 pages, 3 sheets (outermost first):**
//! - Sheet 1: front [12, 1], back [2, 11]
//! - Sheet 2: front [10, 3], back [4, 9]
//! - Sheet 3: front [8, 5], back [6, 7]

use crate::constants::PAGES_PER_SHEET;
use crate::types::Sheet;
use log::debug;

// =============================================================================
// Sheet Calculation
// =============================================================================

/// Round a page count up to the next multiple of four.
pub fn padded_page_count(total_pages: usize) -> usize {
    total_pages + (PAGES_PER_SHEET - total_pages % PAGES_PER_SHEET) % PAGES_PER_SHEET
}

/// Calculate the sheets for a booklet of `total_pages` pages.
///
/// The count is padded up to a multiple of four first, so every sheet is
/// complete. Sheets are returned outermost first, which is the order they are
/// nested for folding. Every page number is shifted by `start_page - 1`.
pub fn compute_sheets(total_pages: usize, start_page: i64) -> Vec<Sheet> {
    debug!(
        "Calculating booklet pages for total pages: {}, starting at page: {}",
        total_pages, start_page
    );

    let padded = padded_page_count(total_pages);
    debug!("Adjusted total pages to nearest multiple of 4: {}", padded);

    let offset = start_page - 1;
    let mut sheets = Vec::with_capacity(padded / PAGES_PER_SHEET);
    let mut left: i64 = 1;
    let mut right = padded as i64;

    while left < right {
        let sheet = Sheet::new(right, left, left + 1, right - 1).shifted(offset);
        debug!("Added sheet: {:?}", sheet.pages());
        sheets.push(sheet);
        left += 2;
        right -= 2;
    }

    sheets
}

// =============================================================================
// Page Ordering
// =============================================================================

/// Expand sheets into the flat extraction order.
///
/// Each sheet contributes its four pages in tuple order, sheets are
/// concatenated in sequence order.
pub fn flatten(sheets: &[Sheet]) -> Vec<i64> {
    let order: Vec<i64> = sheets.iter().flat_map(Sheet::pages).collect();
    debug!("Flat page list for booklet printing: {:?}", order);
    order
}

/// Join a page order into a single line, as printed by `--print-pages`.
pub fn format_page_order(order: &[i64], separator: &str) -> String {
    order
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// Tests
// =============================================================================
