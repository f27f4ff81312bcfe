//! Error type shared by the parser, the MXL reader and the public entry points.
//!
//! The layout core never fails; only reading input and validating
//! configuration can.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoreError>;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid UTF-8 in MusicXML file: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Anything but `score-partwise`.
    #[error("unsupported root element '{0}', only 'score-partwise' is supported")]
    UnsupportedFormat(String),

    #[error("failed to read MXL archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("no MusicXML root file in archive (entries: {0:?})")]
    MissingRootFile(Vec<String>),

    #[error("invalid layout config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
