use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::guillotine::Sheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(rename = "width")]
    pub w: u32,
    #[serde(rename = "height")]
    pub h: u32,
}

impl Rect {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    /// Width over height; 1.0 for a degenerate height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.h == 0 {
            1.0
        } else {
            self.w as f64 / self.h as f64
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// A named part shape. One `Part` value stands for one unit once demands are expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: Arc<str>,
    pub rect: Rect,
    pub can_rotate: bool,
}

impl Part {
    pub fn new(name: impl Into<Arc<str>>, rect: Rect, can_rotate: bool) -> Self {
        Self {
            name: name.into(),
            rect,
            can_rotate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Demand {
    pub part: Part,
    pub qty: u32,
}

impl Demand {
    pub fn new(name: impl Into<Arc<str>>, rect: Rect, qty: u32, can_rotate: bool) -> Self {
        Self {
            part: Part::new(name, rect, can_rotate),
            qty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub part_name: Arc<str>,
    pub x: u32,
    pub y: u32,
    #[serde(flatten)]
    pub rect: Rect,
    pub rotated: bool,
    pub sheet_id: usize,
}

impl Placement {
    pub fn overlaps(&self, x: u32, y: u32, rect: Rect) -> bool {
        self.x < x + rect.w && x < self.x + self.rect.w && self.y < y + rect.h && y < self.y + self.rect.h
    }
}

/// A straight guillotine cut. `index` counts from 1 in the order cuts were made on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cut {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub index: usize,
}

impl Cut {
    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub sheet_count: usize,
    pub total_waste: u64,
    pub composite: f64,
}

impl Score {
    pub fn is_better_than(&self, other: &Score) -> bool {
        self.composite < other.composite
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub sheets: Vec<Sheet>,
    pub stock: Rect,
    pub score: Score,
}

impl Solution {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn placement_count(&self) -> usize {
        self.sheets.iter().map(|s| s.placements.len()).sum()
    }

    pub fn total_waste_percent(&self) -> f64 {
        let total_stock_area = self.stock.area() * self.sheets.len() as u64;
        if total_stock_area == 0 {
            return 0.0;
        }
        self.score.total_waste as f64 / total_stock_area as f64 * 100.0
    }
}
