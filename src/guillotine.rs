use serde::Serialize;

use crate::types::{Cut, Part, Placement, Rect};

/// Added when a candidate's orientation differs from the last part placed on the sheet.
const ORIENTATION_PENALTY: u64 = 1000;
/// Added when a placement leaves both a right and a bottom remainder.
const L_SPLIT_PENALTY: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeRect {
    pub x: u32,
    pub y: u32,
    #[serde(flatten)]
    pub rect: Rect,
}

impl FreeRect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            rect: Rect::new(w, h),
        }
    }
}

/// Footprint of an oriented piece inside a particular free rect.
///
/// Kerf is only charged on an axis where the free rect is not already exactly the
/// piece's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub piece: Rect,
    pub kerf_w: u32,
    pub kerf_h: u32,
}

impl Fit {
    fn right_w(&self, free: &FreeRect) -> u32 {
        free.rect.w - self.piece.w - self.kerf_w
    }

    fn bottom_h(&self, free: &FreeRect) -> u32 {
        free.rect.h - self.piece.h - self.kerf_h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredPlacement {
    pub free_idx: usize,
    pub rotated: bool,
    pub fit: Fit,
    pub score: u64,
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub id: usize,
    stock: Rect,
    kerf: u32,
    pub free_rects: Vec<FreeRect>,
    pub placements: Vec<Placement>,
    pub cuts: Vec<Cut>,
    kerf_area: u64,
}

impl Sheet {
    pub fn new(id: usize, stock: Rect, kerf: u32) -> Self {
        Self {
            id,
            stock,
            kerf,
            free_rects: vec![FreeRect {
                x: 0,
                y: 0,
                rect: stock,
            }],
            placements: Vec::new(),
            cuts: Vec::new(),
            kerf_area: 0,
        }
    }

    pub fn stock(&self) -> Rect {
        self.stock
    }

    pub fn kerf(&self) -> u32 {
        self.kerf
    }

    pub fn used_area(&self) -> u64 {
        self.placements.iter().map(|p| p.rect.area()).sum()
    }

    /// Area still available for placements.
    pub fn waste_area(&self) -> u64 {
        self.free_rects.iter().map(|f| f.rect.area()).sum()
    }

    /// Area lost to blade strips.
    pub fn kerf_area(&self) -> u64 {
        self.kerf_area
    }

    pub fn utilization(&self) -> f64 {
        self.used_area() as f64 / self.stock.area() as f64
    }

    pub fn fit(&self, free: &FreeRect, piece: Rect) -> Option<Fit> {
        let kerf_w = if free.rect.w != piece.w { self.kerf } else { 0 };
        let kerf_h = if free.rect.h != piece.h { self.kerf } else { 0 };
        let fits = free.rect.w as u64 >= piece.w as u64 + kerf_w as u64
            && free.rect.h as u64 >= piece.h as u64 + kerf_h as u64;
        fits.then_some(Fit {
            piece,
            kerf_w,
            kerf_h,
        })
    }

    /// Best free rect for `part`. Normal-orientation candidates are preferred as a
    /// whole; rotated ones are only considered when no normal candidate exists.
    pub fn find_best(&self, part: &Part, allow_rotate: bool) -> Option<ScoredPlacement> {
        self.find_best_oriented(part, false).or_else(|| {
            (allow_rotate && part.can_rotate)
                .then(|| self.find_best_oriented(part, true))
                .flatten()
        })
    }

    /// Best free rect for `part` in one fixed orientation.
    pub fn find_best_oriented(&self, part: &Part, rotated: bool) -> Option<ScoredPlacement> {
        let piece = if rotated {
            part.rect.rotated()
        } else {
            part.rect
        };
        let mut best: Option<ScoredPlacement> = None;
        for (idx, free) in self.free_rects.iter().enumerate() {
            if let Some(fit) = self.fit(free, piece) {
                let scored = self.scored(idx, fit, rotated);
                if best.is_none_or(|b| scored.score < b.score) {
                    best = Some(scored);
                }
            }
        }
        best
    }

    fn scored(&self, free_idx: usize, fit: Fit, rotated: bool) -> ScoredPlacement {
        let free = &self.free_rects[free_idx];
        let right_w = fit.right_w(free);
        let bottom_h = fit.bottom_h(free);

        // L-shaped leftover: the strip beside the piece plus the full-width strip below it.
        let mut score = right_w as u64 * fit.piece.h as u64 + free.rect.w as u64 * bottom_h as u64;
        if self
            .placements
            .last()
            .is_some_and(|last| last.rotated != rotated)
        {
            score += ORIENTATION_PENALTY;
        }
        if right_w > 0 && bottom_h > 0 {
            score += L_SPLIT_PENALTY;
        }

        ScoredPlacement {
            free_idx,
            rotated,
            fit,
            score,
        }
    }

    pub fn try_place(&mut self, part: &Part, allow_rotate: bool) -> Option<Placement> {
        let scored = self.find_best(part, allow_rotate)?;
        Some(self.place(part, scored))
    }

    /// Places `part` in the given orientation wherever the heuristic likes best.
    pub fn try_place_oriented(&mut self, part: &Part, rotated: bool) -> Option<Placement> {
        debug_assert!(!rotated || part.can_rotate);
        let scored = self.find_best_oriented(part, rotated)?;
        Some(self.place(part, scored))
    }

    pub fn place(&mut self, part: &Part, scored: ScoredPlacement) -> Placement {
        let free = self.free_rects.remove(scored.free_idx);
        let Fit {
            piece,
            kerf_w,
            kerf_h,
        } = scored.fit;

        let placement = Placement {
            part_name: part.name.clone(),
            x: free.x,
            y: free.y,
            rect: piece,
            rotated: scored.rotated,
            sheet_id: self.id,
        };

        let right = FreeRect::new(
            free.x + piece.w + kerf_w,
            free.y,
            scored.fit.right_w(&free),
            piece.h,
        );
        let bottom = FreeRect::new(
            free.x,
            free.y + piece.h + kerf_h,
            free.rect.w,
            scored.fit.bottom_h(&free),
        );

        if right.rect.w > 0 && right.rect.h > 0 {
            self.free_rects.push(right);
            self.push_cut(right.x, free.y, right.x, free.y + piece.h);
        }
        if bottom.rect.w > 0 && bottom.rect.h > 0 {
            self.free_rects.push(bottom);
            self.push_cut(free.x, bottom.y, free.x + free.rect.w, bottom.y);
        }

        self.kerf_area += kerf_w as u64 * piece.h as u64 + free.rect.w as u64 * kerf_h as u64;
        self.placements.push(placement.clone());

        debug_assert!(self.free_rects.iter().all(|f| f.rect.w > 0 && f.rect.h > 0));
        placement
    }

    fn push_cut(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) {
        let index = self.cuts.len() + 1;
        self.cuts.push(Cut {
            x1,
            y1,
            x2,
            y2,
            index,
        });
    }
}
