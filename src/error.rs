use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown word list: {0}")]
    UnknownList(String),

    #[error("Unsupported export version: {found} (expected {expected})")]
    UnsupportedExportVersion { found: u32, expected: u32 },

    #[error("Export is missing {0}")]
    IncompleteExport(&'static str),
}
