use crate::{
    Sql,
    error::{Error, Result},
    row::{FromRow, Row},
    statement::{RawStatement, RowsAffected, Statement, check_columns},
    unmanaged::{OpenMode, UnmanagedConnection},
};
use async_stream::try_stream;
use futures::Stream;
use libsqlite3_sys::SQLITE_MISUSE;
use std::sync::Arc;
use tokio::{runtime::Handle, sync::Mutex};

/// A cloneable connection serialized by an async mutex: every operation
/// suspends at the mutex boundary, runs the synchronous operation, and
/// releases. The order in which concurrent submitters win the mutex is
/// unspecified.
///
/// Transactions are deliberately absent here: the mutex serializes single
/// operations and cannot pin a logical session across several statements.
/// The last handle to drop closes the connection; close errors are logged.
#[derive(Clone)]
pub struct SharedConnection {
    connection: Arc<Mutex<UnmanagedConnection>>,
}

impl SharedConnection {
    pub fn open(path: &str, mode: OpenMode) -> Result<Self> {
        Ok(Self {
            connection: Arc::new(Mutex::new(UnmanagedConnection::open(path, mode)?)),
        })
    }

    /// An ephemeral in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:", OpenMode::default())
    }

    /// Run a semicolon-delimited batch verbatim. No bindings; the input is
    /// the caller's responsibility.
    pub async fn execute(&self, sql: &str) -> Result<()> {
        self.connection.lock().await.execute_batch(sql)
    }

    pub async fn run(&self, query: impl Into<Sql>) -> Result<RowsAffected> {
        let query = query.into();
        let connection = self.connection.lock().await;
        let raw = connection.prepare(&query)?;
        Statement::new(raw, &connection).run()
    }

    pub async fn fetch_all(&self, query: impl Into<Sql>) -> Result<Vec<Row>> {
        let query = query.into();
        let connection = self.connection.lock().await;
        let raw = connection.prepare(&query)?;
        Statement::new(raw, &connection).fetch_all()
    }

    pub async fn fetch_one(&self, query: impl Into<Sql>) -> Result<Row> {
        let query = query.into();
        let connection = self.connection.lock().await;
        let raw = connection.prepare(&query)?;
        Statement::new(raw, &connection).fetch_one()
    }

    pub async fn fetch_optional(&self, query: impl Into<Sql>) -> Result<Option<Row>> {
        let query = query.into();
        let connection = self.connection.lock().await;
        let raw = connection.prepare(&query)?;
        Statement::new(raw, &connection).fetch_optional()
    }

    pub async fn fetch_all_as<T: FromRow>(&self, query: impl Into<Sql>) -> Result<Vec<T>> {
        let query = query.into();
        let connection = self.connection.lock().await;
        let raw = connection.prepare(&query)?;
        Statement::new(raw, &connection).fetch_all_as()
    }

    pub async fn fetch_one_as<T: FromRow>(&self, query: impl Into<Sql>) -> Result<T> {
        let query = query.into();
        let connection = self.connection.lock().await;
        let raw = connection.prepare(&query)?;
        Statement::new(raw, &connection).fetch_one_as()
    }

    pub async fn fetch_optional_as<T: FromRow>(
        &self,
        query: impl Into<Sql>,
    ) -> Result<Option<T>> {
        let query = query.into();
        let connection = self.connection.lock().await;
        let raw = connection.prepare(&query)?;
        Statement::new(raw, &connection).fetch_optional_as()
    }

    /// Prepare a statement whose every operation re-acquires this
    /// connection's mutex.
    pub async fn prepare(&self, query: impl Into<Sql>) -> Result<SharedStatement> {
        let query = query.into();
        let raw = self.connection.lock().await.prepare(&query)?;
        Ok(SharedStatement {
            connection: self.connection.clone(),
            raw: Some(raw),
        })
    }
}

fn already_consumed() -> Error {
    Error::Engine {
        code: SQLITE_MISUSE,
        message: "statement was already consumed".into(),
    }
}

/// A prepared statement over a [`SharedConnection`]. It keeps the
/// connection alive and locks its mutex for each operation. Terminal
/// fetchers consume the statement; dropping one finalizes best-effort.
pub struct SharedStatement {
    connection: Arc<Mutex<UnmanagedConnection>>,
    raw: Option<RawStatement>,
}

impl SharedStatement {
    pub fn column_names(&self) -> &[String] {
        self.raw.as_ref().map(|raw| &raw.columns()[..]).unwrap_or(&[])
    }

    pub fn column_count(&self) -> usize {
        self.raw.as_ref().map_or(0, RawStatement::column_count)
    }

    /// One step: the next row, or `None` once the statement is done.
    pub async fn step(&mut self) -> Result<Option<Row>> {
        let _connection = self.connection.lock().await;
        match self.raw.as_mut() {
            Some(raw) => raw.step(),
            None => Ok(None),
        }
    }

    pub async fn step_as<T: FromRow>(&mut self) -> Result<Option<T>> {
        let _connection = self.connection.lock().await;
        let Some(raw) = self.raw.as_mut() else {
            return Ok(None);
        };
        check_columns::<T>(raw)?;
        match raw.step()? {
            Some(row) => T::from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    pub async fn run(mut self) -> Result<RowsAffected> {
        let connection = self.connection.lock().await;
        match self.raw.take() {
            Some(raw) => Statement::new(raw, &connection).run(),
            None => Err(already_consumed()),
        }
    }

    pub async fn fetch_all(mut self) -> Result<Vec<Row>> {
        let connection = self.connection.lock().await;
        match self.raw.take() {
            Some(raw) => Statement::new(raw, &connection).fetch_all(),
            None => Err(already_consumed()),
        }
    }

    pub async fn fetch_one(mut self) -> Result<Row> {
        let connection = self.connection.lock().await;
        match self.raw.take() {
            Some(raw) => Statement::new(raw, &connection).fetch_one(),
            None => Err(already_consumed()),
        }
    }

    pub async fn fetch_optional(mut self) -> Result<Option<Row>> {
        let connection = self.connection.lock().await;
        match self.raw.take() {
            Some(raw) => Statement::new(raw, &connection).fetch_optional(),
            None => Err(already_consumed()),
        }
    }

    pub async fn fetch_all_as<T: FromRow>(mut self) -> Result<Vec<T>> {
        let connection = self.connection.lock().await;
        match self.raw.take() {
            Some(raw) => Statement::new(raw, &connection).fetch_all_as(),
            None => Err(already_consumed()),
        }
    }

    pub async fn fetch_one_as<T: FromRow>(mut self) -> Result<T> {
        let connection = self.connection.lock().await;
        match self.raw.take() {
            Some(raw) => Statement::new(raw, &connection).fetch_one_as(),
            None => Err(already_consumed()),
        }
    }

    pub async fn fetch_optional_as<T: FromRow>(mut self) -> Result<Option<T>> {
        let connection = self.connection.lock().await;
        match self.raw.take() {
            Some(raw) => Statement::new(raw, &connection).fetch_optional_as(),
            None => Err(already_consumed()),
        }
    }

    /// Finalize explicitly, surfacing the engine's verdict.
    pub async fn finalize(mut self) -> Result<()> {
        let _connection = self.connection.lock().await;
        match self.raw.take() {
            Some(mut raw) => raw.finalize(),
            None => Ok(()),
        }
    }

    /// Adapt stepping into a stream of rows. The mutex is re-acquired for
    /// each step and the statement finalizes once the stream is drained.
    pub fn stream(mut self) -> impl Stream<Item = Result<Row>> {
        try_stream! {
            while let Some(row) = self.step().await? {
                yield row;
            }
            self.finalize().await?;
        }
    }
}

impl Drop for SharedStatement {
    fn drop(&mut self) {
        let Some(raw) = self.raw.take() else {
            return;
        };
        // finalize under the mutex; when it is contended, defer to a task
        // so the handle is never touched concurrently with an operation
        match self.connection.try_lock() {
            Ok(_guard) => drop(raw),
            Err(_) => {
                let connection = self.connection.clone();
                if let Ok(handle) = Handle::try_current() {
                    handle.spawn(async move {
                        let _guard = connection.lock().await;
                        drop(raw);
                    });
                } else {
                    let _guard = connection.blocking_lock();
                    drop(raw);
                }
            }
        }
    }
}
