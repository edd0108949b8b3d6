use crate::{
    Blob, Sql, Value,
    cbox::CBox,
    error::{Error, Result},
    extract::extract_name,
    statement::{RawStatement, finalize_handle},
};
use libsqlite3_sys::{
    SQLITE_MISUSE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_NOMUTEX, SQLITE_OPEN_READONLY,
    SQLITE_OPEN_READWRITE, SQLITE_TRANSIENT, sqlite3, sqlite3_bind_blob, sqlite3_bind_double,
    sqlite3_bind_int64, sqlite3_bind_null, sqlite3_bind_parameter_count, sqlite3_bind_text,
    sqlite3_bind_zeroblob, sqlite3_changes64, sqlite3_close, sqlite3_column_count, sqlite3_errmsg,
    sqlite3_errstr, sqlite3_exec, sqlite3_free, sqlite3_last_insert_rowid, sqlite3_open_v2,
    sqlite3_prepare_v2, sqlite3_stmt, sqlite3_threadsafe, sqlite3_total_changes64,
};
use std::{
    ffi::{CStr, CString, c_char, c_int, c_void},
    ptr,
    sync::Arc,
};

/// How to open a database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite { create: bool },
}

impl Default for OpenMode {
    fn default() -> Self {
        OpenMode::ReadWrite { create: true }
    }
}

#[cfg(feature = "bundled")]
fn initialize_engine() -> Result<()> {
    use std::sync::OnceLock;

    // the statically linked engine wants one explicit init before first use
    static INIT: OnceLock<c_int> = OnceLock::new();
    let rc = *INIT.get_or_init(|| unsafe { libsqlite3_sys::sqlite3_initialize() });
    if rc == SQLITE_OK {
        Ok(())
    } else {
        Err(Error::OpenDatabase {
            code: rc,
            message: format!("engine initialization failed: {}", errstr(rc)),
        })
    }
}

#[cfg(not(feature = "bundled"))]
fn initialize_engine() -> Result<()> {
    // dynamically linked engines are initialized by the host
    Ok(())
}

fn close_handle(handle: *mut sqlite3) {
    let rc = unsafe { sqlite3_close(handle) };
    if rc != SQLITE_OK {
        log::warn!("failed to close connection: error code {rc}");
    }
}

/// The one thin safe wrapper over a raw database handle. Carries no
/// synchronization of its own; every owner serializes access.
pub(crate) struct UnmanagedConnection {
    handle: CBox<*mut sqlite3>,
}

impl UnmanagedConnection {
    pub fn open(path: &str, mode: OpenMode) -> Result<Self> {
        initialize_engine()?;
        let filename = CString::new(path).map_err(|_| Error::OpenDatabase {
            code: SQLITE_MISUSE,
            message: "database path contains an interior NUL byte".into(),
        })?;
        let mut flags = match mode {
            OpenMode::ReadOnly => SQLITE_OPEN_READONLY,
            OpenMode::ReadWrite { create: false } => SQLITE_OPEN_READWRITE,
            OpenMode::ReadWrite { create: true } => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
        };
        unsafe {
            if sqlite3_threadsafe() != 0 {
                // this library owns serialization
                flags |= SQLITE_OPEN_NOMUTEX;
            }
            let mut handle = CBox::new(ptr::null_mut(), close_handle);
            let rc = sqlite3_open_v2(filename.as_ptr(), &mut *handle, flags, ptr::null());
            if rc != SQLITE_OK {
                // a handle may exist even on failure; CBox closes it
                let message = if handle.is_null() {
                    errstr(rc)
                } else {
                    error_message(*handle)
                };
                let error = Error::OpenDatabase { code: rc, message };
                log::error!("{error}");
                return Err(error);
            }
            Ok(Self { handle })
        }
    }

    pub fn prepare(&self, query: &Sql) -> Result<RawStatement> {
        let text = query.text();
        let bindings = query.bindings();
        unsafe {
            let mut statement = CBox::new(ptr::null_mut(), finalize_handle);
            let mut tail: *const c_char = ptr::null();
            let rc = sqlite3_prepare_v2(
                *self.handle,
                text.as_ptr() as *const c_char,
                text.len() as c_int,
                &mut *statement,
                &mut tail,
            );
            if rc != SQLITE_OK {
                let error = Error::PrepareStatement {
                    code: rc,
                    message: error_message(*self.handle),
                };
                log::error!("{error}");
                return Err(error);
            }
            if statement.is_null() {
                return Err(Error::EmptyQuery);
            }
            let consumed = tail as usize - text.as_ptr() as usize;
            if !text[consumed..].trim().is_empty() {
                let error = Error::PrepareStatement {
                    code: SQLITE_MISUSE,
                    message: "query contains more than one statement; use execute for batches"
                        .into(),
                };
                log::error!("{error}");
                return Err(error);
            }
            let expected = sqlite3_bind_parameter_count(*statement) as usize;
            if expected != bindings.len() {
                return Err(Error::BindingMismatch {
                    expected,
                    got: bindings.len(),
                });
            }
            for (index, value) in bindings.iter().enumerate() {
                self.bind(*statement, index as c_int + 1, value)?;
            }
            let columns = (0..sqlite3_column_count(*statement))
                .map(|index| extract_name(*statement, index))
                .collect::<Result<Arc<[String]>>>()?;
            Ok(RawStatement::new(statement, *self.handle, columns))
        }
    }

    /// Positional bind, 1-based. Text and loaded blobs bind transient (the
    /// engine copies before returning); empty blobs go through zeroblob.
    fn bind(&self, statement: *mut sqlite3_stmt, index: c_int, value: &Value) -> Result<()> {
        unsafe {
            let rc = match value {
                Value::Null => sqlite3_bind_null(statement, index),
                Value::Integer(v) => sqlite3_bind_int64(statement, index, *v),
                Value::Real(v) => sqlite3_bind_double(statement, index, *v),
                Value::Text(v) => sqlite3_bind_text(
                    statement,
                    index,
                    v.as_ptr() as *const c_char,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                Value::Blob(Blob::Empty) => sqlite3_bind_zeroblob(statement, index, 0),
                Value::Blob(Blob::Loaded(v)) => sqlite3_bind_blob(
                    statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
            };
            if rc != SQLITE_OK {
                let error = Error::PrepareStatement {
                    code: rc,
                    message: error_message(*self.handle),
                };
                log::error!("{error}");
                return Err(error);
            }
            Ok(())
        }
    }

    /// Run a semicolon-delimited batch through the engine's multi-statement
    /// executor. No bindings; injection-unsafe by design.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let sql = CString::new(sql).map_err(|_| Error::PrepareStatement {
            code: SQLITE_MISUSE,
            message: "batch contains an interior NUL byte".into(),
        })?;
        unsafe {
            let mut errmsg: *mut c_char = ptr::null_mut();
            let rc = sqlite3_exec(*self.handle, sql.as_ptr(), None, ptr::null_mut(), &mut errmsg);
            if rc != SQLITE_OK {
                let message = if errmsg.is_null() {
                    errstr(rc)
                } else {
                    let message = CStr::from_ptr(errmsg).to_string_lossy().into_owned();
                    sqlite3_free(errmsg as *mut c_void);
                    message
                };
                let error = Error::Engine { code: rc, message };
                log::error!("{error}");
                return Err(error);
            }
            Ok(())
        }
    }

    /// Idempotent: the first call releases the handle, later calls are
    /// no-ops. Dropping an unclosed connection closes it and logs failures.
    pub fn close(&mut self) -> Result<()> {
        let handle = self.handle.take();
        if handle.is_null() {
            return Ok(());
        }
        let rc = unsafe { sqlite3_close(handle) };
        if rc != SQLITE_OK {
            return Err(Error::Engine {
                code: rc,
                message: errstr(rc),
            });
        }
        Ok(())
    }

    pub fn changes(&self) -> u64 {
        unsafe { sqlite3_changes64(*self.handle) as u64 }
    }

    pub fn total_changes(&self) -> u64 {
        unsafe { sqlite3_total_changes64(*self.handle) as u64 }
    }

    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { sqlite3_last_insert_rowid(*self.handle) }
    }
}

pub(crate) fn error_message(handle: *mut sqlite3) -> String {
    unsafe {
        let ptr = sqlite3_errmsg(handle);
        if ptr.is_null() {
            "unknown error (no message available)".into()
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }
}

pub(crate) fn errstr(code: c_int) -> String {
    unsafe {
        let ptr = sqlite3_errstr(code);
        if ptr.is_null() {
            format!("unknown error (code {code})")
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }
}
