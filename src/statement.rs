use crate::{
    cbox::CBox,
    error::{Error, Result},
    extract::extract_value,
    row::{FromRow, Row},
    unmanaged::{UnmanagedConnection, error_message},
};
use libsqlite3_sys::{
    SQLITE_DONE, SQLITE_OK, SQLITE_ROW, sqlite3, sqlite3_finalize, sqlite3_step, sqlite3_stmt,
};
use std::{ffi::c_int, sync::Arc};

/// Dealloc for the implicit (drop) finalization path: errors are logged
/// and swallowed. Explicit finalization goes through
/// [`RawStatement::finalize`] and surfaces them.
pub(crate) fn finalize_handle(statement: *mut sqlite3_stmt) {
    let rc = unsafe { sqlite3_finalize(statement) };
    if rc != SQLITE_OK {
        log::warn!("failed to finalize statement: error code {rc}");
    }
}

/// Change counters reported by a terminal [`Statement::run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    pub last_insert_rowid: i64,
    /// Rows changed by the statement itself.
    pub rows_affected: u64,
    /// Also counts rows changed by triggers and foreign-key cascades.
    pub total_rows_affected: u64,
}

/// Owns the engine statement handle plus everything stepping needs: the
/// column names materialized at prepare and a non-owning copy of the
/// database handle for diagnostics.
pub(crate) struct RawStatement {
    statement: CBox<*mut sqlite3_stmt>,
    database: CBox<*mut sqlite3>,
    columns: Arc<[String]>,
    exhausted: bool,
}

impl RawStatement {
    pub fn new(
        statement: CBox<*mut sqlite3_stmt>,
        database: *mut sqlite3,
        columns: Arc<[String]>,
    ) -> Self {
        Self {
            statement,
            database: CBox::new(database, |_| {}),
            columns,
            exhausted: false,
        }
    }

    pub fn columns(&self) -> &Arc<[String]> {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn step(&mut self) -> Result<Option<Row>> {
        if self.exhausted || self.statement.is_null() {
            return Ok(None);
        }
        unsafe {
            match sqlite3_step(*self.statement) {
                SQLITE_ROW => {
                    let values = (0..self.columns.len())
                        .map(|index| extract_value(*self.statement, index as c_int))
                        .collect::<Result<Box<[_]>>>()?;
                    Ok(Some(Row::new(self.columns.clone(), values)))
                }
                SQLITE_DONE => {
                    self.exhausted = true;
                    Ok(None)
                }
                // SQLITE_BUSY lands here too; retrying is the caller's call
                code => {
                    let error = Error::Engine {
                        code,
                        message: error_message(*self.database),
                    };
                    log::error!("{error}");
                    Err(error)
                }
            }
        }
    }

    /// Idempotent: the handle is nulled on the first call, so neither a
    /// second call nor the drop path touch it again.
    pub fn finalize(&mut self) -> Result<()> {
        let statement = self.statement.take();
        if statement.is_null() {
            return Ok(());
        }
        let rc = unsafe { sqlite3_finalize(statement) };
        if rc != SQLITE_OK {
            return Err(Error::Engine {
                code: rc,
                message: error_message(*self.database),
            });
        }
        Ok(())
    }
}

pub(crate) fn check_columns<T: FromRow>(raw: &RawStatement) -> Result<()> {
    match T::COLUMN_COUNT {
        Some(expected) if expected != raw.column_count() => Err(Error::ColumnCountMismatch {
            expected,
            got: raw.column_count(),
        }),
        _ => Ok(()),
    }
}

/// A prepared statement borrowing the connection that made it. Terminal
/// fetchers consume the statement and finalize on every exit path;
/// dropping one mid-iteration finalizes best-effort.
pub struct Statement<'c> {
    raw: RawStatement,
    connection: &'c UnmanagedConnection,
}

impl<'c> Statement<'c> {
    pub(crate) fn new(raw: RawStatement, connection: &'c UnmanagedConnection) -> Self {
        Self { raw, connection }
    }

    pub fn column_names(&self) -> &[String] {
        self.raw.columns()
    }

    pub fn column_count(&self) -> usize {
        self.raw.column_count()
    }

    /// One step: the next row, or `None` once the statement is done.
    /// After done, further calls keep returning `None`.
    pub fn step(&mut self) -> Result<Option<Row>> {
        self.raw.step()
    }

    pub fn step_as<T: FromRow>(&mut self) -> Result<Option<T>> {
        check_columns::<T>(&self.raw)?;
        match self.raw.step()? {
            Some(row) => T::from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    /// Execute to completion and report the change counters.
    pub fn run(mut self) -> Result<RowsAffected> {
        let result = self.raw.step().map(|_| RowsAffected {
            last_insert_rowid: self.connection.last_insert_rowid(),
            rows_affected: self.connection.changes(),
            total_rows_affected: self.connection.total_changes(),
        });
        self.complete(result)
    }

    pub fn fetch_all(mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let result = loop {
            match self.raw.step() {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => break Ok(rows),
                Err(error) => break Err(error),
            }
        };
        self.complete(result)
    }

    pub fn fetch_one(mut self) -> Result<Row> {
        let result = match self.raw.step() {
            Ok(Some(row)) => Ok(row),
            Ok(None) => Err(Error::NoRowsFetched),
            Err(error) => Err(error),
        };
        self.complete(result)
    }

    pub fn fetch_optional(mut self) -> Result<Option<Row>> {
        let result = self.raw.step();
        self.complete(result)
    }

    pub fn fetch_all_as<T: FromRow>(mut self) -> Result<Vec<T>> {
        let result = check_columns::<T>(&self.raw).and_then(|()| {
            let mut rows = Vec::new();
            while let Some(row) = self.raw.step()? {
                rows.push(T::from_row(&row)?);
            }
            Ok(rows)
        });
        self.complete(result)
    }

    pub fn fetch_one_as<T: FromRow>(mut self) -> Result<T> {
        let result = check_columns::<T>(&self.raw).and_then(|()| match self.raw.step() {
            Ok(Some(row)) => T::from_row(&row),
            Ok(None) => Err(Error::NoRowsFetched),
            Err(error) => Err(error),
        });
        self.complete(result)
    }

    pub fn fetch_optional_as<T: FromRow>(mut self) -> Result<Option<T>> {
        let result = check_columns::<T>(&self.raw).and_then(|()| match self.raw.step() {
            Ok(Some(row)) => T::from_row(&row).map(Some),
            Ok(None) => Ok(None),
            Err(error) => Err(error),
        });
        self.complete(result)
    }

    /// Finalize explicitly, surfacing the engine's verdict. Dropping the
    /// statement instead finalizes too, but logs and swallows errors.
    pub fn finalize(mut self) -> Result<()> {
        self.raw.finalize()
    }

    /// A failed result outranks a failed finalize; the latter is logged.
    fn complete<T>(&mut self, result: Result<T>) -> Result<T> {
        match (result, self.raw.finalize()) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(error)) => Err(error),
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(finalize_error)) => {
                log::warn!("discarding finalize error after a failed statement: {finalize_error}");
                Err(error)
            }
        }
    }
}
