use thiserror::Error;

use crate::event::Flavour;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown final state --> {0}")]
    UnknownFinalState(String),

    #[error("Unknown sample --> {0}")]
    UnknownSample(String),

    #[error("{flavour} column `{column}` has {got} entries, expected {expected}")]
    ColumnLength {
        flavour: Flavour,
        column: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Degenerate decay geometry: {0}")]
    Degenerate(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "parallel")]
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
