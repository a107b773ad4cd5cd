//! Error taxonomy for the viewer core.

use std::path::PathBuf;

use crate::adapter::SurfaceError;

/// Errors raised by registry, overlay and export operations.
///
/// Everything except `Surface` during session construction is recoverable:
/// the controller logs it and carries on with unchanged state.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("no geometry has been added to the viewer")]
    EmptyRegistry,

    #[error("no mesh with id {id} (registry holds {count})")]
    NotFound { id: usize, count: usize },

    #[error("render surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, ViewerError>;
