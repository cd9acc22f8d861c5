use std::ops::Deref;

use crate::guillotine::Sheet;
use crate::types::Score;

/// Weight that keeps sheet count dominant over waste and fragmentation.
const SHEET_WEIGHT: f64 = 100_000.0;
const FRAGMENTATION_WEIGHT: f64 = 30.0;

/// Scores a sheet set. Lower `composite` is better.
///
/// Accepts anything that derefs to a `Sheet`, so the search's shared snapshots
/// can be scored without copying.
pub fn score_sheets<S: Deref<Target = Sheet>>(sheets: &[S]) -> Score {
    let sheet_count = sheets.len();
    let mut total_waste = 0u64;
    let mut total_fragments = 0usize;

    for sheet in sheets {
        total_waste += sheet.stock().area() - sheet.used_area();
        total_fragments += sheet.free_rects.len();
    }

    let avg_fragmentation = if sheet_count == 0 {
        0.0
    } else {
        total_fragments as f64 / sheet_count as f64
    };

    Score {
        sheet_count,
        total_waste,
        composite: sheet_count as f64 * SHEET_WEIGHT
            + total_waste as f64
            + FRAGMENTATION_WEIGHT * avg_fragmentation,
    }
}
