//! JSON request and response shapes for a single optimization.
//!
//! Field names follow the camelCase contract of the form that collects parts.
//! Numeric fields are taken as signed so out-of-range values surface as
//! [`Error::InvalidInput`] rather than as deserialization failures.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::guillotine::{FreeRect, Sheet};
use crate::render::render_svg;
use crate::solver::{DEFAULT_TIME_LIMIT, Outcome, Solver, SolverConfig};
use crate::types::{Cut, Demand, Placement, Rect, Score};

/// Accepts integers and integral floats (`600` or `600.0`).
pub fn deserialize_i64_from_number<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || !value.is_finite() || value.abs() > i64::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a whole number, got {value}"
        )));
    }
    Ok(value as i64)
}

fn default_true() -> bool {
    true
}

fn default_quantity() -> i64 {
    1
}

fn default_time_limit() -> f64 {
    DEFAULT_TIME_LIMIT.as_secs_f64()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRequest {
    pub name: String,
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub width: i64,
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub height: i64,
    #[serde(
        default = "default_quantity",
        deserialize_with = "deserialize_i64_from_number"
    )]
    pub quantity: i64,
    #[serde(default = "default_true")]
    pub can_rotate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub parts: Vec<PartRequest>,
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub sheet_width: i64,
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub sheet_height: i64,
    #[serde(default, deserialize_with = "deserialize_i64_from_number")]
    pub kerf: i64,
    #[serde(default = "default_true")]
    pub allow_rotations: bool,
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,
}

impl OptimizeRequest {
    pub fn into_solver(self) -> Result<Solver> {
        let stock = Rect::new(
            positive(self.sheet_width, "sheet width")?,
            positive(self.sheet_height, "sheet height")?,
        );
        let kerf = u32::try_from(self.kerf).map_err(|_| {
            Error::InvalidInput(format!("kerf must be non-negative, got {}", self.kerf))
        })?;
        let config = SolverConfig::new(stock)
            .with_kerf(kerf)
            .with_rotation(self.allow_rotations)
            .with_time_limit_secs(self.time_limit)?;

        let demands = self
            .parts
            .into_iter()
            .map(|p| {
                let rect = Rect::new(
                    positive(p.width, &format!("width of part '{}'", p.name))?,
                    positive(p.height, &format!("height of part '{}'", p.name))?,
                );
                // Negative quantities ask for nothing.
                let qty = u32::try_from(p.quantity.max(0)).map_err(|_| {
                    Error::InvalidInput(format!(
                        "quantity of part '{}' is too large: {}",
                        p.name, p.quantity
                    ))
                })?;
                Ok(Demand::new(p.name, rect, qty, p.can_rotate))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Solver::new(config, demands))
    }
}

fn positive(value: i64, what: &str) -> Result<u32> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::InvalidInput(format!(
            "{what} must be a positive integer, got {value}"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Solved,
    NoSolution,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetReport {
    pub id: usize,
    #[serde(flatten)]
    pub stock: Rect,
    pub placements: Vec<Placement>,
    pub cuts: Vec<Cut>,
    pub free_rects: Vec<FreeRect>,
    pub waste_area: u64,
    pub kerf_area: u64,
    pub utilization: f64,
}

impl From<&Sheet> for SheetReport {
    fn from(sheet: &Sheet) -> Self {
        Self {
            id: sheet.id,
            stock: sheet.stock(),
            placements: sheet.placements.clone(),
            cuts: sheet.cuts.clone(),
            free_rects: sheet.free_rects.clone(),
            waste_area: sheet.waste_area(),
            kerf_area: sheet.kerf_area(),
            utilization: sheet.utilization(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub status: Status,
    /// False when the deadline stopped the search early.
    pub exhaustive: bool,
    pub elapsed_ms: u64,
    pub nodes: u64,
    pub score: Option<Score>,
    pub waste_percent: Option<f64>,
    pub sheets: Vec<SheetReport>,
    pub svg: Option<String>,
}

impl From<Outcome> for OptimizeResponse {
    fn from(outcome: Outcome) -> Self {
        let (status, score, waste_percent, sheets, svg) = match &outcome.solution {
            Some(sol) => (
                Status::Solved,
                Some(sol.score),
                Some(sol.total_waste_percent()),
                sol.sheets.iter().map(SheetReport::from).collect(),
                Some(render_svg(&sol.sheets)),
            ),
            None => (Status::NoSolution, None, None, Vec::new(), None),
        };

        Self {
            status,
            exhaustive: outcome.exhaustive,
            elapsed_ms: outcome.stats.elapsed.as_millis() as u64,
            nodes: outcome.stats.nodes,
            score,
            waste_percent,
            sheets,
            svg,
        }
    }
}

pub fn optimize(request: OptimizeRequest) -> Result<OptimizeResponse> {
    let outcome = request.into_solver()?.solve()?;
    Ok(outcome.into())
}
