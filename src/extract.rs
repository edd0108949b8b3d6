use crate::{
    Blob, Value,
    error::{Error, Result},
};
use libsqlite3_sys::*;
use std::{
    ffi::{CStr, c_int},
    slice,
};

pub(crate) fn extract_value(statement: *mut sqlite3_stmt, index: c_int) -> Result<Value> {
    unsafe {
        let column_type = sqlite3_column_type(statement, index);
        Ok(match column_type {
            SQLITE_NULL => Value::Null,
            SQLITE_INTEGER => Value::Integer(sqlite3_column_int64(statement, index)),
            SQLITE_FLOAT => Value::Real(sqlite3_column_double(statement, index)),
            SQLITE_TEXT => {
                let ptr = sqlite3_column_text(statement, index);
                let len = sqlite3_column_bytes(statement, index) as usize;
                if ptr.is_null() || len == 0 {
                    Value::Text(String::new())
                } else {
                    // the engine hands out well-formed UTF-8 from column_text
                    Value::Text(String::from_utf8_unchecked(
                        slice::from_raw_parts(ptr, len).to_vec(),
                    ))
                }
            }
            SQLITE_BLOB => {
                let ptr = sqlite3_column_blob(statement, index) as *const u8;
                let len = sqlite3_column_bytes(statement, index) as usize;
                if ptr.is_null() || len == 0 {
                    Value::Blob(Blob::Empty)
                } else {
                    Value::Blob(Blob::Loaded(slice::from_raw_parts(ptr, len).into()))
                }
            }
            _ => {
                return Err(Error::Engine {
                    code: column_type,
                    message: format!("unexpected column type {column_type}"),
                });
            }
        })
    }
}

pub(crate) fn extract_name(statement: *mut sqlite3_stmt, index: c_int) -> Result<String> {
    unsafe {
        let ptr = sqlite3_column_name(statement, index);
        if ptr.is_null() {
            return Err(Error::Engine {
                code: SQLITE_NOMEM,
                message: "out of memory while materializing a column name".into(),
            });
        }
        CStr::from_ptr(ptr)
            .to_str()
            .map(Into::into)
            .map_err(|_| Error::Engine {
                code: SQLITE_MISUSE,
                message: "column name is not valid UTF-8".into(),
            })
    }
}
