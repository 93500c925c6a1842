use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or driving a simulation.
///
/// Steady-state stepping never fails; everything here is either a
/// configuration problem caught at construction or a caller misusing the API.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Grid partition with a zero dimension.
    #[error("degenerate grid: {rows} rows x {columns} columns")]
    DegenerateGrid { rows: u32, columns: u32 },

    /// Invalid runtime argument.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Loop driven from a state that does not allow the operation.
    #[error("invalid loop state: {0}")]
    InvalidState(String),

    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for `SimConfig`.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
