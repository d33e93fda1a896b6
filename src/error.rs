use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no capture files found in {} -- run an instrumented binary first", .0.display())]
    NoCaptures(PathBuf),

    #[error("failed to read capture {}: {source}", path.display())]
    CaptureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid capture data in {}: {reason}", path.display())]
    InvalidCapture { path: PathBuf, reason: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
