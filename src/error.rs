use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("malformed run log at line {line}: {reason}")]
    RunLog { line: usize, reason: String },
    #[error("evolution failed: {0}")]
    Evolution(String),
    #[error("observer failed: {0}")]
    Observer(String),
}
