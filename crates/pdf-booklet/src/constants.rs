//! Shared constants for booklet generation

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Booklet Geometry
// =============================================================================

/// Logical pages on one folded sheet (two per side)
pub const PAGES_PER_SHEET: usize = 4;

/// Printed sides per sheet
pub const SIDES_PER_SHEET: usize = 2;

/// Default source page size in points when a page carries no MediaBox (A4)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (595.0, 842.0);

// =============================================================================
// Naming
// =============================================================================

/// Appended to the input file stem when no output path is given
pub const OUTPUT_SUFFIX: &str = "-booklet.pdf";

/// Separator used when printing the page order
pub const DEFAULT_SEPARATOR: &str = " ";

/// Suffix of the temporary working directory
pub const WORKDIR_SUFFIX: &str = ".make_booklet";
