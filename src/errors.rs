//! Centralized error handling for glacier_vis
//!
//! Every failure the pipelines can hit is one variant of [`GlacierVisError`].
//! The three failure kinds callers most often need to tell apart are
//! [`GlacierVisError::SourceNotFound`], [`GlacierVisError::ShapeMismatch`] and
//! [`GlacierVisError::AllMissing`].

use std::fmt;
use std::path::PathBuf;

/// Main error type for glacier_vis operations
#[derive(Debug)]
pub enum GlacierVisError {
    /// A raster or array file does not exist
    SourceNotFound { path: PathBuf },

    /// A file exists but could not be decoded into a raster
    SourceUnreadable { path: PathBuf, message: String },

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// Raster field dimensions differ from the coordinate mesh
    ShapeMismatch {
        field: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Every sample of a field is missing, so no statistic exists
    AllMissing { field: String },

    /// A raster with zero rows or zero columns
    EmptyRaster { field: String },

    /// Figure composition or encoding failed
    RenderError(String),

    /// NetCDF library errors
    NetCDFError(netcdf::Error),

    /// TIFF decoder errors
    TiffError(tiff::TiffError),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),
}

impl fmt::Display for GlacierVisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlacierVisError::SourceNotFound { path } => {
                write!(f, "Source file not found: {}", path.display())
            }
            GlacierVisError::SourceUnreadable { path, message } => {
                write!(f, "Cannot read raster '{}': {}", path.display(), message)
            }
            GlacierVisError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            GlacierVisError::ShapeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "Field '{}' has shape {}x{} but the coordinate mesh is {}x{}",
                field, found.0, found.1, expected.0, expected.1
            ),
            GlacierVisError::AllMissing { field } => write!(
                f,
                "Field '{}' contains no valid samples; statistics are undefined",
                field
            ),
            GlacierVisError::EmptyRaster { field } => {
                write!(f, "Field '{}' has zero rows or columns", field)
            }
            GlacierVisError::RenderError(msg) => write!(f, "Rendering error: {}", msg),
            GlacierVisError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            GlacierVisError::TiffError(e) => write!(f, "TIFF error: {}", e),
            GlacierVisError::IoError(e) => write!(f, "I/O error: {}", e),
            GlacierVisError::ArrayError(e) => write!(f, "Array error: {}", e),
        }
    }
}

impl std::error::Error for GlacierVisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlacierVisError::NetCDFError(e) => Some(e),
            GlacierVisError::TiffError(e) => Some(e),
            GlacierVisError::IoError(e) => Some(e),
            GlacierVisError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for GlacierVisError {
    fn from(error: netcdf::Error) -> Self {
        GlacierVisError::NetCDFError(error)
    }
}

impl From<tiff::TiffError> for GlacierVisError {
    fn from(error: tiff::TiffError) -> Self {
        GlacierVisError::TiffError(error)
    }
}

impl From<std::io::Error> for GlacierVisError {
    fn from(error: std::io::Error) -> Self {
        GlacierVisError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for GlacierVisError {
    fn from(error: ndarray::ShapeError) -> Self {
        GlacierVisError::ArrayError(error)
    }
}

/// Result type alias for glacier_vis operations
pub type Result<T> = std::result::Result<T, GlacierVisError>;
