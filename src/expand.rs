use std::cmp::Ordering;

use crate::types::{Demand, Part, Rect};

/// Flattens demands into one `Part` per unit, most awkward first.
///
/// Larger parts come first; among equal areas, the part whose aspect ratio is
/// furthest from the sheet's goes first. Equal keys keep their demand order.
pub fn expand_demands(demands: &[Demand], stock: Rect) -> Vec<Part> {
    let mut pieces: Vec<Part> = demands
        .iter()
        .flat_map(|d| std::iter::repeat_n(&d.part, d.qty as usize).cloned())
        .collect();

    let sheet_ratio = stock.aspect_ratio();
    pieces.sort_by(|a, b| compare_awkwardness(b, a, sheet_ratio));
    pieces
}

fn compare_awkwardness(a: &Part, b: &Part, sheet_ratio: f64) -> Ordering {
    let deviation = |p: &Part| (p.rect.aspect_ratio() - sheet_ratio).abs();
    a.rect
        .area()
        .cmp(&b.rect.area())
        .then_with(|| deviation(a).total_cmp(&deviation(b)))
}
