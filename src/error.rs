use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid order at row {row} (OrderID {order_id}): {reason}")]
    Validation {
        row: usize,
        order_id: i64,
        reason: String,
    },

    #[error("cannot compute {aggregate} over an empty dataset")]
    EmptyDataset { aggregate: &'static str },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid age buckets: {0}")]
    BucketSpec(String),
}

impl Error {
    pub(crate) fn validation(row: usize, order_id: i64, reason: impl Into<String>) -> Self {
        Error::Validation {
            row,
            order_id,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
