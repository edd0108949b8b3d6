use crate::{
    Sql,
    error::Result,
    row::{FromRow, Row},
    statement::{RowsAffected, Statement},
    transaction::{Transaction, TransactionKind},
    unmanaged::{OpenMode, UnmanagedConnection},
};

/// An owned single-threaded connection. Moves, never copies; every query
/// entry point takes `&mut self`, so one logical thread of control touches
/// the handle at a time.
pub struct Connection {
    raw: UnmanagedConnection,
}

impl Connection {
    pub fn open(path: &str, mode: OpenMode) -> Result<Self> {
        Ok(Self {
            raw: UnmanagedConnection::open(path, mode)?,
        })
    }

    /// An ephemeral in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:", OpenMode::default())
    }

    /// Run a semicolon-delimited batch verbatim. No bindings; the input is
    /// the caller's responsibility.
    pub fn execute(&mut self, sql: &str) -> Result<()> {
        self.raw.execute_batch(sql)
    }

    /// Prepare a statement for incremental stepping. The borrow keeps the
    /// connection pinned until the statement is finalized or dropped.
    pub fn prepare(&mut self, query: impl Into<Sql>) -> Result<Statement<'_>> {
        let query = query.into();
        let raw = self.raw.prepare(&query)?;
        Ok(Statement::new(raw, &self.raw))
    }

    pub fn run(&mut self, query: impl Into<Sql>) -> Result<RowsAffected> {
        self.prepare(query)?.run()
    }

    pub fn fetch_all(&mut self, query: impl Into<Sql>) -> Result<Vec<Row>> {
        self.prepare(query)?.fetch_all()
    }

    pub fn fetch_one(&mut self, query: impl Into<Sql>) -> Result<Row> {
        self.prepare(query)?.fetch_one()
    }

    pub fn fetch_optional(&mut self, query: impl Into<Sql>) -> Result<Option<Row>> {
        self.prepare(query)?.fetch_optional()
    }

    pub fn fetch_all_as<T: FromRow>(&mut self, query: impl Into<Sql>) -> Result<Vec<T>> {
        self.prepare(query)?.fetch_all_as()
    }

    pub fn fetch_one_as<T: FromRow>(&mut self, query: impl Into<Sql>) -> Result<T> {
        self.prepare(query)?.fetch_one_as()
    }

    pub fn fetch_optional_as<T: FromRow>(&mut self, query: impl Into<Sql>) -> Result<Option<T>> {
        self.prepare(query)?.fetch_optional_as()
    }

    /// Begin a transaction. The guard borrows the connection exclusively;
    /// commit or roll back through it.
    pub fn transaction(&mut self, kind: TransactionKind) -> Result<Transaction<'_>> {
        Transaction::begin(self, kind)
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.raw.last_insert_rowid()
    }

    /// Close now and surface the engine's verdict. Dropping the connection
    /// closes it too, logging failures instead.
    pub fn close(mut self) -> Result<()> {
        self.raw.close()
    }
}
