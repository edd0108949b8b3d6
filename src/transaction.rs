use crate::{
    Sql,
    connection::Connection,
    error::Result,
    row::{FromRow, Row},
    statement::{RowsAffected, Statement},
};

/// Which lock `BEGIN` takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransactionKind {
    #[default]
    Deferred,
    Immediate,
    Exclusive,
}

impl TransactionKind {
    fn begin_statement(self) -> &'static str {
        match self {
            TransactionKind::Deferred => "BEGIN DEFERRED",
            TransactionKind::Immediate => "BEGIN IMMEDIATE",
            TransactionKind::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

/// A scoped transactional view. While it lives the parent connection is
/// mutably borrowed and unreachable; queries go through the guard. A guard
/// dropped without [`commit`](Transaction::commit) rolls back, so an early
/// `?` return undoes the block's writes.
pub struct Transaction<'c> {
    connection: &'c mut Connection,
    finished: bool,
}

impl<'c> Transaction<'c> {
    pub(crate) fn begin(connection: &'c mut Connection, kind: TransactionKind) -> Result<Self> {
        connection.execute(kind.begin_statement())?;
        Ok(Self {
            connection,
            finished: false,
        })
    }

    pub fn commit(mut self) -> Result<()> {
        self.connection.execute("COMMIT")?;
        self.finished = true;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        self.connection.execute("ROLLBACK")?;
        self.finished = true;
        Ok(())
    }

    pub fn execute(&mut self, sql: &str) -> Result<()> {
        self.connection.execute(sql)
    }

    pub fn prepare(&mut self, query: impl Into<Sql>) -> Result<Statement<'_>> {
        self.connection.prepare(query)
    }

    pub fn run(&mut self, query: impl Into<Sql>) -> Result<RowsAffected> {
        self.connection.run(query)
    }

    pub fn fetch_all(&mut self, query: impl Into<Sql>) -> Result<Vec<Row>> {
        self.connection.fetch_all(query)
    }

    pub fn fetch_one(&mut self, query: impl Into<Sql>) -> Result<Row> {
        self.connection.fetch_one(query)
    }

    pub fn fetch_optional(&mut self, query: impl Into<Sql>) -> Result<Option<Row>> {
        self.connection.fetch_optional(query)
    }

    pub fn fetch_all_as<T: FromRow>(&mut self, query: impl Into<Sql>) -> Result<Vec<T>> {
        self.connection.fetch_all_as(query)
    }

    pub fn fetch_one_as<T: FromRow>(&mut self, query: impl Into<Sql>) -> Result<T> {
        self.connection.fetch_one_as(query)
    }

    pub fn fetch_optional_as<T: FromRow>(&mut self, query: impl Into<Sql>) -> Result<Option<T>> {
        self.connection.fetch_optional_as(query)
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.connection.last_insert_rowid()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(error) = self.connection.execute("ROLLBACK") {
                log::warn!("failed to roll back abandoned transaction: {error}");
            }
        }
    }
}
