use std::fmt;

use tabletalk_engine::BuildError;

/// Ingestion failures are fatal to the upload: no partial dataset is ever
/// produced, and the message is surfaced to the user verbatim.
#[derive(Debug)]
pub enum IngestError {
    /// The decoded grid had no cells at all.
    EmptyFile(String),
    /// The byte decoder rejected the file.
    Decode(String),
    /// Extension not handled by any decoder.
    UnsupportedFormat(String),
    /// Grid decoded but the dataset could not be built from it.
    Build(BuildError),
    Io(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFile(name) => write!(f, "'{name}' contains no data"),
            Self::Decode(msg) => write!(f, "could not decode file: {msg}"),
            Self::UnsupportedFormat(ext) => {
                write!(f, "unsupported file format '{ext}' (expected xlsx, xls, ods or csv)")
            }
            Self::Build(e) => write!(f, "{e}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<BuildError> for IngestError {
    fn from(e: BuildError) -> Self {
        IngestError::Build(e)
    }
}
