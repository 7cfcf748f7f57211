use thiserror::Error;

/// Structural problems with an uploaded statement. Any of these means the
/// file must be re-exported; no partial result is produced.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unrecognized schema: no known column layout matches header [{}]", headers.join(", "))]
    UnrecognizedSchema { headers: Vec<String> },

    #[error(
        "unparseable dates: best format {best_format} parsed {parsed} of {total} date cells"
    )]
    UnparseableDates {
        best_format: String,
        parsed: usize,
        total: usize,
    },

    #[error("too many malformed rows: dropped {dropped} of {total}")]
    TooManyMalformedRows { dropped: usize, total: usize },

    #[error("statement has a header but no transaction rows")]
    Empty,

    #[error("header row is not valid UTF-8")]
    HeaderEncoding,

    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),
}
