//! Error types for the `labsim-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

/// Errors that can occur during landscape operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The landscape was created with a side length of zero.
    #[error("landscape size must be at least 1")]
    ZeroSize,

    /// The landscape is too large to index on this platform.
    #[error("landscape size {0} is too large to allocate")]
    TooLarge(u32),

    /// A coordinate lies outside the grid.
    #[error("topic ({x}, {y}) is outside a {size}x{size} landscape")]
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Side length of the grid.
        size: u32,
    },
}
