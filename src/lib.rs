mod as_value;
mod cbox;
mod connection;
mod error;
mod extract;
mod parse;
mod pool;
mod row;
mod shared;
mod sql;
mod statement;
mod transaction;
mod unmanaged;
mod value;

pub use as_value::AsValue;
pub use connection::Connection;
pub use error::{Error, Result};
pub use pool::{Pool, PoolOptions, PoolStatus, PooledConnection};
pub use row::{FromRow, Row};
pub use shared::{SharedConnection, SharedStatement};
pub use sql::Sql;
pub use statement::{RowsAffected, Statement};
pub use transaction::{Transaction, TransactionKind};
pub use unmanaged::OpenMode;
pub use value::{Blob, Value};

pub use cistern_macros::FromRow;
