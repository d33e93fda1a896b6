use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("capture limit reached ({limit} records) -- further calls are dropped")]
    CaptureLimitReached { limit: u64 },

    #[error("record count {n} exceeds store capacity {capacity}")]
    CountOutOfRange { n: u64, capacity: u64 },

    #[error("failed to create report file {}: {source}", path.display())]
    ReportCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
