//! Error types for the layout engine

use thiserror::Error;

use crate::table::Side;

/// Errors that can occur during layout computation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// A stack group reappears after another position or on another side
    #[error("stack group '{tag}' is split on the {side} side")]
    SplitStack { tag: String, side: &'static str },

    /// More pin positions on one side than allowed
    #[error("{count} pin positions on the {side} side exceed the limit of {max}")]
    SideOverflow {
        side: &'static str,
        count: usize,
        max: usize,
    },

    /// Padding plus pin length does not land on the grid
    #[error("pin '{number}': padding {padding} plus length {length} is not a whole number of grid units")]
    OffGrid {
        number: String,
        length: f64,
        padding: f64,
    },
}

impl LayoutError {
    /// Create a split stack error
    pub fn split_stack(tag: impl Into<String>, side: Side) -> Self {
        Self::SplitStack {
            tag: tag.into(),
            side: side.label(),
        }
    }

    /// Create a side overflow error
    pub fn overflow(side: Side, count: usize, max: usize) -> Self {
        Self::SideOverflow {
            side: side.label(),
            count,
            max,
        }
    }

    /// Create an off-grid error
    pub fn off_grid(number: impl Into<String>, length: f64, padding: f64) -> Self {
        Self::OffGrid {
            number: number.into(),
            length,
            padding,
        }
    }
}
