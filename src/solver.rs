use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::expand::expand_demands;
use crate::guillotine::Sheet;
use crate::score::score_sheets;
use crate::types::{Demand, Part, Rect, Score, Solution};

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(5);
/// Most unit parts a single run will expand demands into.
pub const MAX_UNITS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub stock: Rect,
    pub kerf: u32,
    /// Global rotation switch, AND-ed with each part's own permission.
    pub allow_rotate: bool,
    pub time_limit: Duration,
}

impl SolverConfig {
    pub fn new(stock: Rect) -> Self {
        Self {
            stock,
            kerf: 0,
            allow_rotate: true,
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }

    pub fn with_kerf(mut self, kerf: u32) -> Self {
        self.kerf = kerf;
        self
    }

    pub fn with_rotation(mut self, allow_rotate: bool) -> Self {
        self.allow_rotate = allow_rotate;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Sets the time limit from (possibly fractional) seconds.
    pub fn with_time_limit_secs(self, secs: f64) -> Result<Self> {
        let time_limit = Duration::try_from_secs_f64(secs).map_err(|_| {
            Error::InvalidInput(format!(
                "time limit must be a finite, non-negative number of seconds, got {secs}"
            ))
        })?;
        Ok(self.with_time_limit(time_limit))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Recursive calls that got past the deadline check.
    pub nodes: u64,
    pub elapsed: Duration,
    /// Score of every layout accepted as the new best, in order.
    pub improvements: Vec<Score>,
}

/// Result of one run. `solution` is `None` when no complete layout was found
/// before the search stopped; `exhaustive` is false when the deadline cut it short.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub solution: Option<Solution>,
    pub exhaustive: bool,
    pub stats: SearchStats,
}

pub struct Solver {
    config: SolverConfig,
    demands: Vec<Demand>,
}

impl Solver {
    pub fn new(config: SolverConfig, demands: Vec<Demand>) -> Self {
        Self { config, demands }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }

    /// Rejects zero dimensions, oversized batches and parts that cannot go on an
    /// empty sheet.
    pub fn validate(&self) -> Result<()> {
        let stock = self.config.stock;
        if stock.w == 0 || stock.h == 0 {
            return Err(Error::InvalidInput(format!(
                "sheet dimensions must be non-zero, got {stock}"
            )));
        }

        let units: u64 = self.demands.iter().map(|d| d.qty as u64).sum();
        if units > MAX_UNITS {
            return Err(Error::InvalidInput(format!(
                "at most {MAX_UNITS} parts can be cut in one run, got {units}"
            )));
        }

        let empty = Sheet::new(0, stock, self.config.kerf);
        for d in &self.demands {
            let part = &d.part;
            if part.rect.w == 0 || part.rect.h == 0 {
                return Err(Error::InvalidInput(format!(
                    "part '{}' dimensions must be non-zero, got {}",
                    part.name, part.rect
                )));
            }
            if d.qty > 0 && empty.find_best(part, self.config.allow_rotate).is_none() {
                return Err(Error::NoFeasiblePlacement {
                    name: part.name.to_string(),
                    size: part.rect,
                    stock,
                });
            }
        }
        Ok(())
    }

    pub fn solve(&self) -> Result<Outcome> {
        self.validate()?;

        let parts = expand_demands(&self.demands, self.config.stock);
        let mut search = Search::new(&self.config);
        search.recurse(&parts, Vec::new());
        let outcome = search.finish();

        info!(
            parts = parts.len(),
            nodes = outcome.stats.nodes,
            elapsed_ms = outcome.stats.elapsed.as_millis() as u64,
            exhaustive = outcome.exhaustive,
            sheets = outcome.solution.as_ref().map(|s| s.sheet_count()),
            "search finished"
        );
        Ok(outcome)
    }
}

/// State for one run. Sheet sets are shared between branches and copied on
/// write, so a branch never sees a sibling's placements.
struct Search<'a> {
    config: &'a SolverConfig,
    started: Instant,
    best: Option<(Vec<Rc<Sheet>>, Score)>,
    improvements: Vec<Score>,
    nodes: u64,
    truncated: bool,
}

impl<'a> Search<'a> {
    fn new(config: &'a SolverConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
            best: None,
            improvements: Vec::new(),
            nodes: 0,
            truncated: false,
        }
    }

    fn expired(&mut self) -> bool {
        if !self.truncated && self.started.elapsed() > self.config.time_limit {
            self.truncated = true;
        }
        self.truncated
    }

    fn best_score(&self) -> Option<&Score> {
        self.best.as_ref().map(|(_, score)| score)
    }

    /// A branch on existing sheets goes on while it uses no more sheets than the best.
    fn admits_placement(&self, branch: &[Rc<Sheet>]) -> bool {
        self.best_score().is_none_or(|best| branch.len() <= best.sheet_count)
    }

    /// Opening a sheet must already beat the best composite.
    fn admits_new_sheet(&self, score: &Score) -> bool {
        self.best_score().is_none_or(|best| score.is_better_than(best))
    }

    fn recurse(&mut self, parts: &[Part], sheets: Vec<Rc<Sheet>>) {
        if self.expired() {
            return;
        }
        self.nodes += 1;

        let Some((part, rest)) = parts.split_first() else {
            self.accept(sheets);
            return;
        };

        let orientations: &[bool] = if self.config.allow_rotate && part.can_rotate {
            &[false, true]
        } else {
            &[false]
        };

        let mut attempted = false;
        for si in 0..sheets.len() {
            for fi in 0..sheets[si].free_rects.len() {
                for &rotated in orientations {
                    let sheet = &sheets[si];
                    let piece = if rotated {
                        part.rect.rotated()
                    } else {
                        part.rect
                    };
                    if sheet.fit(&sheet.free_rects[fi], piece).is_none() {
                        continue;
                    }

                    // The free rect only gates the branch; the heuristic picks
                    // where the oriented part goes on the snapshot.
                    let mut branch = sheets.clone();
                    Rc::make_mut(&mut branch[si])
                        .try_place_oriented(part, rotated)
                        .expect("fit checked above");
                    attempted = true;

                    if self.admits_placement(&branch) {
                        self.recurse(rest, branch);
                        if self.truncated {
                            return;
                        }
                    }
                }
            }
        }

        if !attempted {
            let mut sheet = Sheet::new(sheets.len() + 1, self.config.stock, self.config.kerf);
            sheet
                .try_place(part, self.config.allow_rotate)
                .expect("every part fits an empty sheet after validation");
            let mut branch = sheets;
            branch.push(Rc::new(sheet));

            if self.admits_new_sheet(&score_sheets(&branch)) {
                self.recurse(rest, branch);
            }
        }
    }

    fn accept(&mut self, sheets: Vec<Rc<Sheet>>) {
        let score = score_sheets(&sheets);
        if self
            .best_score()
            .is_some_and(|best| !score.is_better_than(best))
        {
            return;
        }

        debug!(
            sheets = score.sheet_count,
            waste = score.total_waste,
            composite = score.composite,
            nodes = self.nodes,
            "improved layout"
        );
        self.improvements.push(score);
        self.best = Some((sheets, score));
    }

    fn finish(self) -> Outcome {
        let stock = self.config.stock;
        let solution = self.best.map(|(sheets, score)| Solution {
            sheets: sheets.into_iter().map(Rc::unwrap_or_clone).collect(),
            stock,
            score,
        });

        Outcome {
            solution,
            exhaustive: !self.truncated,
            stats: SearchStats {
                nodes: self.nodes,
                elapsed: self.started.elapsed(),
                improvements: self.improvements,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guillotine::tests::assert_sheet_valid;

    const AMPLE: Duration = Duration::from_secs(30);

    /// Validates a complete solution:
    /// 1. Every sheet is internally consistent (bounds, no overlaps, area conserved)
    /// 2. Sheet ids match their position
    /// 3. The total number of placed pieces matches expectations
    fn assert_solution_valid(sol: &Solution, expected_pieces: usize) {
        assert_eq!(
            sol.placement_count(),
            expected_pieces,
            "expected {} pieces placed, got {}",
            expected_pieces,
            sol.placement_count()
        );
        assert_eq!(sol.score.sheet_count, sol.sheet_count());
        for (si, sheet) in sol.sheets.iter().enumerate() {
            assert_eq!(sheet.id, si + 1);
            assert_sheet_valid(sheet);
        }
    }

    fn solve(config: SolverConfig, demands: Vec<Demand>) -> Outcome {
        Solver::new(config, demands).solve().unwrap()
    }

    fn solved(config: SolverConfig, demands: Vec<Demand>) -> Solution {
        let outcome = solve(config, demands);
        outcome.solution.expect("a layout")
    }

    #[test]
    fn test_single_piece() {
        let config = SolverConfig::new(Rect::new(1000, 1000)).with_time_limit(AMPLE);
        let outcome = solve(config, vec![Demand::new("A", Rect::new(200, 200), 1, true)]);
        assert!(outcome.exhaustive);

        let sol = outcome.solution.unwrap();
        assert_solution_valid(&sol, 1);
        assert_eq!(sol.sheet_count(), 1);
        let p = &sol.sheets[0].placements[0];
        assert_eq!((p.x, p.y), (0, 0));

        let cuts = &sol.sheets[0].cuts;
        assert_eq!(cuts.len(), 2);
        assert!(cuts[0].is_vertical() && cuts[0].x1 == 200);
        assert!(!cuts[1].is_vertical() && cuts[1].y1 == 200 && cuts[1].x2 == 1000);
    }

    #[test]
    fn test_exact_fit_four_pieces() {
        let config = SolverConfig::new(Rect::new(100, 100)).with_time_limit(AMPLE);
        let sol = solved(config, vec![Demand::new("Q", Rect::new(50, 50), 4, false)]);
        assert_solution_valid(&sol, 4);
        assert_eq!(sol.sheet_count(), 1);
        assert_eq!(sol.score.total_waste, 0);
    }

    #[test]
    fn test_needs_one_sheet_per_piece() {
        // 60x60 leaves 40x60 and 100x40, no room for another 60x60.
        let config = SolverConfig::new(Rect::new(100, 100)).with_time_limit(AMPLE);
        let sol = solved(config, vec![Demand::new("Q", Rect::new(60, 60), 4, false)]);
        assert_solution_valid(&sol, 4);
        assert_eq!(sol.sheet_count(), 4);
    }

    #[test]
    fn test_half_sheet_parts() {
        let config = SolverConfig::new(Rect::new(1000, 1000)).with_time_limit(AMPLE);
        let outcome = solve(config, vec![Demand::new("Half", Rect::new(500, 1000), 5, true)]);
        assert!(outcome.exhaustive);

        let sol = outcome.solution.unwrap();
        assert_solution_valid(&sol, 5);
        assert_eq!(sol.score.sheet_count, 3);
        let per_sheet: Vec<usize> = sol.sheets.iter().map(|s| s.placements.len()).collect();
        assert_eq!(per_sheet, vec![2, 2, 1]);
    }

    #[test]
    fn test_rotation_helps() {
        // Stock 100x50, piece 50x100: only fits if rotated
        let config = SolverConfig::new(Rect::new(100, 50)).with_time_limit(AMPLE);
        let sol = solved(config, vec![Demand::new("R", Rect::new(50, 100), 1, true)]);
        assert_solution_valid(&sol, 1);
        assert!(sol.sheets[0].placements[0].rotated);
        assert_eq!(sol.sheets[0].placements[0].rect, Rect::new(100, 50));
    }

    #[test]
    fn test_rotation_used_on_existing_sheet() {
        // The second strip only fits next to the first one when turned.
        let config = SolverConfig::new(Rect::new(100, 100)).with_time_limit(AMPLE);
        let sol = solved(
            config,
            vec![
                Demand::new("Wide", Rect::new(100, 60), 1, true),
                Demand::new("Tall", Rect::new(40, 100), 1, true),
            ],
        );
        assert_solution_valid(&sol, 2);
        assert_eq!(sol.sheet_count(), 1);
        let tall = sol.sheets[0]
            .placements
            .iter()
            .find(|p| &*p.part_name == "Tall")
            .unwrap();
        assert!(tall.rotated);
    }

    #[test]
    fn test_global_switch_disables_rotation() {
        let config = SolverConfig::new(Rect::new(100, 100))
            .with_rotation(false)
            .with_time_limit(AMPLE);
        let sol = solved(
            config,
            vec![
                Demand::new("Wide", Rect::new(100, 60), 1, true),
                Demand::new("Tall", Rect::new(40, 100), 1, true),
            ],
        );
        assert_solution_valid(&sol, 2);
        assert_eq!(sol.sheet_count(), 2);
        assert!(sol.sheets.iter().flat_map(|s| &s.placements).all(|p| !p.rotated));
    }

    #[test]
    fn test_no_demands() {
        let config = SolverConfig::new(Rect::new(100, 100));
        let outcome = solve(config, vec![Demand::new("None", Rect::new(10, 10), 0, true)]);
        let sol = outcome.solution.unwrap();
        assert_solution_valid(&sol, 0);
        assert_eq!(sol.sheet_count(), 0);
    }

    #[test]
    fn test_kerf_reduces_capacity() {
        // Without kerf: 2 pieces of 50x100 fit in 100x100
        let config = SolverConfig::new(Rect::new(100, 100)).with_time_limit(AMPLE);
        let demands = vec![Demand::new("Side", Rect::new(50, 100), 2, false)];
        let sol_no_kerf = solved(config, demands.clone());
        assert_solution_valid(&sol_no_kerf, 2);
        assert_eq!(sol_no_kerf.sheet_count(), 1);

        // With kerf of 5: 50 + 5 + 50 = 105 > 100, needs 2 sheets
        let sol_kerf = solved(config.with_kerf(5), demands);
        assert_solution_valid(&sol_kerf, 2);
        assert_eq!(sol_kerf.sheet_count(), 2);
        assert_eq!(sol_kerf.sheets[0].kerf_area(), 5 * 100);
    }

    #[test]
    fn test_waste_percent() {
        let config = SolverConfig::new(Rect::new(100, 100));
        let sol = solved(config, vec![Demand::new("Full", Rect::new(100, 100), 1, false)]);
        assert_solution_valid(&sol, 1);
        assert!((sol.total_waste_percent() - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_oversized_part_rejected() {
        let config = SolverConfig::new(Rect::new(1000, 1000));
        let err = Solver::new(
            config,
            vec![
                Demand::new("Fine", Rect::new(100, 100), 1, true),
                Demand::new("Beam", Rect::new(1200, 300), 2, false),
            ],
        )
        .solve()
        .unwrap_err();
        match err {
            Error::NoFeasiblePlacement { name, .. } => assert_eq!(name, "Beam"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_kerf_counts_towards_feasibility() {
        // 99 wide on a 100 wide sheet leaves 1, too narrow for a 2 wide blade.
        let config = SolverConfig::new(Rect::new(100, 100)).with_kerf(2);
        let result = Solver::new(config, vec![Demand::new("Tight", Rect::new(99, 100), 1, false)])
            .solve();
        assert!(matches!(result, Err(Error::NoFeasiblePlacement { .. })));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let result = Solver::new(SolverConfig::new(Rect::new(0, 100)), vec![]).solve();
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = Solver::new(
            SolverConfig::new(Rect::new(100, 100)),
            vec![Demand::new("Flat", Rect::new(10, 0), 1, true)],
        )
        .solve();
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_time_limit_secs_validation() {
        let config = SolverConfig::new(Rect::new(10, 10));
        assert_eq!(
            config.with_time_limit_secs(0.25).unwrap().time_limit,
            Duration::from_millis(250)
        );
        assert!(config.with_time_limit_secs(-1.0).is_err());
        assert!(config.with_time_limit_secs(f64::NAN).is_err());
        assert!(config.with_time_limit_secs(f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_time_limit() {
        let config = SolverConfig::new(Rect::new(1000, 1000)).with_time_limit(Duration::ZERO);
        let started = Instant::now();
        let outcome = solve(config, vec![Demand::new("A", Rect::new(300, 200), 6, true)]);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!outcome.exhaustive);
        if let Some(sol) = &outcome.solution {
            assert_solution_valid(sol, 6);
        }
    }

    #[test]
    fn test_improvements_are_monotonic() {
        let config = SolverConfig::new(Rect::new(500, 400)).with_time_limit(Duration::from_millis(300));
        let outcome = solve(
            config,
            vec![
                Demand::new("A", Rect::new(200, 150), 3, true),
                Demand::new("B", Rect::new(300, 200), 2, true),
                Demand::new("C", Rect::new(150, 100), 3, true),
            ],
        );
        let improvements = &outcome.stats.improvements;
        assert!(!improvements.is_empty());
        for pair in improvements.windows(2) {
            assert!(pair[1].composite < pair[0].composite);
        }
        let sol = outcome.solution.unwrap();
        assert_eq!(improvements.last().unwrap(), &sol.score);
        assert_solution_valid(&sol, 8);
    }

    #[test]
    fn test_exhaustive_run_respects_area_bound() {
        let stock = Rect::new(100, 100);
        let config = SolverConfig::new(stock).with_time_limit(AMPLE);
        let demands = vec![
            Demand::new("A", Rect::new(70, 40), 2, true),
            Demand::new("B", Rect::new(30, 30), 3, true),
        ];
        let outcome = solve(config, demands);
        assert!(outcome.exhaustive);
        let sol = outcome.solution.unwrap();
        assert_solution_valid(&sol, 5);

        let total_area = 2 * 70 * 40 + 3 * 30 * 30;
        assert!(sol.sheet_count() >= (total_area as u64).div_ceil(stock.area()) as usize);
    }

    #[test]
    fn test_branches_let_heuristic_choose_position() {
        let config = SolverConfig::new(Rect::new(100, 100))
            .with_rotation(false)
            .with_time_limit(AMPLE);
        let outcome = solve(
            config,
            vec![
                Demand::new("A", Rect::new(60, 60), 1, true),
                Demand::new("B", Rect::new(40, 30), 2, true),
                Demand::new("C", Rect::new(30, 20), 3, true),
            ],
        );
        assert!(outcome.exhaustive);
        assert_eq!(outcome.stats.nodes, 36);

        let sol = outcome.solution.unwrap();
        assert_solution_valid(&sol, 6);
        assert_eq!(sol.score.composite, 102_260.0);
        let layout: Vec<(&str, u32, u32)> = sol.sheets[0]
            .placements
            .iter()
            .map(|p| (&*p.part_name, p.x, p.y))
            .collect();
        // The last C takes the 40x40 corner beside the Bs, not the strip under them.
        assert_eq!(
            layout,
            vec![
                ("A", 0, 0),
                ("B", 60, 0),
                ("B", 60, 30),
                ("C", 0, 60),
                ("C", 30, 60),
                ("C", 60, 60),
            ]
        );
    }

    #[test]
    fn test_new_sheet_needs_better_composite() {
        // Upright, the three parts stand side by side on one sheet. Nodes: the
        // first part, the second, the third after an upright second, the finished
        // layout, and the third after a turned second. That last one has no room,
        // and a second sheet cannot beat the finished layout.
        let config = SolverConfig::new(Rect::new(600, 400)).with_time_limit(AMPLE);
        let outcome = solve(config, vec![Demand::new("A", Rect::new(200, 240), 3, true)]);
        assert!(outcome.exhaustive);
        assert_eq!(outcome.stats.nodes, 5);
        assert_eq!(outcome.stats.improvements.len(), 1);

        let sol = outcome.solution.unwrap();
        assert_solution_valid(&sol, 3);
        assert_eq!(sol.sheet_count(), 1);
        assert!(sol.sheets[0].placements.iter().all(|p| !p.rotated));
    }

    #[test]
    fn test_square_parts_try_both_orientations() {
        let config = SolverConfig::new(Rect::new(100, 100)).with_time_limit(AMPLE);
        let rotating = solve(config, vec![Demand::new("Q", Rect::new(50, 50), 2, true)]);
        let fixed = solve(config, vec![Demand::new("Q", Rect::new(50, 50), 2, false)]);
        assert_eq!(rotating.stats.nodes, 6);
        assert_eq!(fixed.stats.nodes, 4);
        assert_eq!(
            rotating.solution.unwrap().score,
            fixed.solution.unwrap().score
        );
    }

    #[test]
    fn test_search_bounds() {
        let stock = Rect::new(100, 100);
        let config = SolverConfig::new(stock);
        let sheets = |n: usize| -> Vec<Rc<Sheet>> {
            (1..=n).map(|id| Rc::new(Sheet::new(id, stock, 0))).collect()
        };

        let mut search = Search::new(&config);
        let anything = Score {
            sheet_count: 9,
            total_waste: 0,
            composite: f64::MAX,
        };
        assert!(search.admits_placement(&sheets(9)));
        assert!(search.admits_new_sheet(&anything));

        let best = Score {
            sheet_count: 2,
            total_waste: 5_000,
            composite: 205_000.0,
        };
        search.best = Some((sheets(2), best));
        assert!(search.admits_placement(&sheets(2)));
        assert!(!search.admits_placement(&sheets(3)));

        let cheaper = Score {
            composite: 204_999.0,
            ..best
        };
        let wider = Score {
            sheet_count: 3,
            total_waste: 0,
            composite: 300_000.0,
        };
        assert!(search.admits_new_sheet(&cheaper));
        assert!(!search.admits_new_sheet(&best));
        assert!(!search.admits_new_sheet(&wider));
    }

    #[test]
    fn test_unit_ceiling() {
        let config = SolverConfig::new(Rect::new(100, 100));
        let at_limit = Solver::new(
            config,
            vec![Demand::new("Chip", Rect::new(1, 1), MAX_UNITS as u32, true)],
        );
        assert!(at_limit.validate().is_ok());

        let result = Solver::new(
            config,
            vec![
                Demand::new("Chip", Rect::new(1, 1), MAX_UNITS as u32, true),
                Demand::new("Extra", Rect::new(1, 1), 1, true),
            ],
        )
        .solve();
        assert!(matches!(result, Err(Error::InvalidInput(ref m)) if m.contains("10001")));
    }

    #[test]
    fn test_exact_fit_edges_consume_no_kerf() {
        // 30 + 5 + 30 + 5 + 30 = 100: the last column matches the final gap exactly.
        let config = SolverConfig::new(Rect::new(100, 50))
            .with_kerf(5)
            .with_rotation(false)
            .with_time_limit(AMPLE);
        let sol = solved(config, vec![Demand::new("Col", Rect::new(30, 50), 3, false)]);
        assert_solution_valid(&sol, 3);
        assert_eq!(sol.sheet_count(), 1);
        assert!(sol.sheets[0].free_rects.is_empty());
        assert_eq!(sol.sheets[0].kerf_area(), 2 * 5 * 50);
    }

    #[test]
    fn test_mixed_workloads_stay_consistent() {
        let workloads = [
            (
                Rect::new(2440, 1220),
                3,
                vec![
                    Demand::new("Side", Rect::new(720, 560), 4, true),
                    Demand::new("Shelf", Rect::new(764, 540), 6, true),
                    Demand::new("Back", Rect::new(1200, 800), 2, false),
                    Demand::new("Kick", Rect::new(764, 100), 4, true),
                ],
            ),
            (
                Rect::new(600, 400),
                0,
                vec![
                    Demand::new("A", Rect::new(200, 150), 5, true),
                    Demand::new("B", Rect::new(300, 200), 3, false),
                    Demand::new("C", Rect::new(600, 100), 2, true),
                ],
            ),
            (
                Rect::new(100, 100),
                1,
                vec![
                    Demand::new("Strip", Rect::new(100, 20), 4, true),
                    Demand::new("Block", Rect::new(33, 33), 6, true),
                ],
            ),
        ];
        for (stock, kerf, demands) in workloads {
            let expected: u32 = demands.iter().map(|d| d.qty).sum();
            let config = SolverConfig::new(stock)
                .with_kerf(kerf)
                .with_time_limit(Duration::from_millis(150));
            let sol = solved(config, demands);
            assert_solution_valid(&sol, expected as usize);
        }
    }

    /// 30 pieces, 6 different sizes, standard plywood sheet 2440x1220, no kerf.
    #[test]
    fn test_complex_mixed_sizes_no_kerf() {
        let stock = Rect::new(2440, 1220);
        let demands = vec![
            Demand::new("A", Rect::new(800, 600), 5, true),
            Demand::new("B", Rect::new(400, 300), 8, true),
            Demand::new("C", Rect::new(600, 400), 4, true),
            Demand::new("D", Rect::new(1200, 600), 3, true),
            Demand::new("E", Rect::new(300, 200), 6, true),
            Demand::new("F", Rect::new(500, 500), 4, false),
        ];
        let config = SolverConfig::new(stock).with_time_limit(Duration::from_millis(200));
        let sol = solved(config, demands);
        assert_solution_valid(&sol, 30);

        let total_area: u64 = sol.sheets.iter().map(|s| s.used_area()).sum();
        assert!(sol.sheet_count() >= total_area.div_ceil(stock.area()) as usize);
    }

    /// 35 pieces, 7 different sizes, with kerf=3.
    #[test]
    fn test_complex_mixed_sizes_with_kerf() {
        let demands = vec![
            Demand::new("A", Rect::new(700, 500), 6, true),
            Demand::new("B", Rect::new(350, 250), 5, true),
            Demand::new("C", Rect::new(1000, 400), 3, true),
            Demand::new("D", Rect::new(450, 450), 4, false),
            Demand::new("E", Rect::new(600, 300), 7, true),
            Demand::new("F", Rect::new(250, 150), 5, true),
            Demand::new("G", Rect::new(800, 400), 5, true),
        ];
        let config = SolverConfig::new(Rect::new(2440, 1220))
            .with_kerf(3)
            .with_time_limit(Duration::from_millis(200));
        let sol = solved(config, demands);
        assert_solution_valid(&sol, 35);
    }

    /// 50 pieces on a small stock with mixed rotation; the deadline must cut the run short.
    #[test]
    fn test_large_batch_truncated_by_deadline() {
        let demands = vec![
            Demand::new("A", Rect::new(200, 150), 10, true),
            Demand::new("B", Rect::new(300, 200), 8, false),
            Demand::new("C", Rect::new(150, 100), 12, true),
            Demand::new("D", Rect::new(250, 180), 10, true),
            Demand::new("E", Rect::new(400, 300), 10, true),
        ];
        let limit = Duration::from_millis(100);
        let config = SolverConfig::new(Rect::new(500, 400))
            .with_kerf(2)
            .with_time_limit(limit);
        let started = Instant::now();
        let outcome = solve(config, demands);
        assert!(started.elapsed() < limit + Duration::from_secs(2));
        assert!(!outcome.exhaustive);

        let sol = outcome.solution.unwrap();
        assert_solution_valid(&sol, 50);
        assert!(sol.sheet_count() >= 10);
    }
}
