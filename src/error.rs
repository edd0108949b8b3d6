use libsqlite3_sys::{SQLITE_EMPTY, SQLITE_MISMATCH, SQLITE_NOTFOUND, SQLITE_RANGE};
use std::ffi::c_int;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// One variant per failure class. Engine-originated variants carry the
/// engine's numeric code and message verbatim; the remaining variants map
/// onto a synthetic engine code through [`Error::code`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("cannot open database: {message}")]
    OpenDatabase { code: c_int, message: String },

    #[error("cannot prepare statement: {message}")]
    PrepareStatement { code: c_int, message: String },

    #[error("query contains no statement")]
    EmptyQuery,

    #[error("expected {expected} bindings, got {got}")]
    BindingMismatch { expected: usize, got: usize },

    #[error("no rows fetched")]
    NoRowsFetched,

    #[error("expected {expected} columns, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },

    #[error("sqlite error {code}: {message}")]
    Engine { code: c_int, message: String },

    #[error("cannot decode a {found} value as `{target}`")]
    TypeMismatch {
        target: &'static str,
        found: &'static str,
    },

    #[error("column `{0}` does not exist in the row")]
    KeyNotFound(String),
}

impl Error {
    /// The engine result code for engine-originated errors, or the closest
    /// synthetic code otherwise.
    pub fn code(&self) -> c_int {
        match self {
            Error::OpenDatabase { code, .. }
            | Error::PrepareStatement { code, .. }
            | Error::Engine { code, .. } => *code,
            Error::EmptyQuery => SQLITE_EMPTY,
            Error::BindingMismatch { .. } => SQLITE_RANGE,
            Error::NoRowsFetched | Error::KeyNotFound(..) => SQLITE_NOTFOUND,
            Error::ColumnCountMismatch { .. } | Error::TypeMismatch { .. } => SQLITE_MISMATCH,
        }
    }
}
