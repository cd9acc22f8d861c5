//! Errors raised before a search starts.

use thiserror::Error;

use crate::types::Rect;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Dimensions, kerf or time limit out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A part that cannot go on an empty sheet in any allowed orientation.
    #[error("part '{name}' ({size}) does not fit on a {stock} sheet")]
    NoFeasiblePlacement {
        name: String,
        size: Rect,
        stock: Rect,
    },
}
