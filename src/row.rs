use crate::{
    AsValue, Blob, Value,
    error::{Error, Result},
};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// One result row: column names (shared across all rows of a statement)
/// plus the values, in column order. Immutable after production.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Arc<[String]>,
    values: Box<[Value]>,
}

impl Row {
    pub(crate) fn new(names: Arc<[String]>, values: Box<[Value]>) -> Self {
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// The value under the first column carrying this name. Duplicate
    /// names are legal; later duplicates are reachable by position only.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|index| self.values.get(index))
    }

    /// Decode the value at a position.
    pub fn decode<T: AsValue>(&self, index: usize) -> Result<T> {
        let value = self.values.get(index).ok_or(Error::ColumnCountMismatch {
            expected: index + 1,
            got: self.len(),
        })?;
        T::try_from_value(value.clone())
    }

    /// Decode the value under a column name.
    pub fn decode_named<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::KeyNotFound(name.into()))?;
        T::try_from_value(value.clone())
    }
}

/// Decoding a whole row into a host type: a scalar (one column), a tuple of
/// primitives (fixed arity), or a keyed record via `#[derive(FromRow)]`.
///
/// The row itself never checks its width; the statement fetchers compare
/// [`FromRow::COLUMN_COUNT`] against the statement's column count before
/// stepping.
pub trait FromRow: Sized {
    /// Column arity this type decodes from, when statically known. Keyed
    /// records leave this `None` and look columns up by name.
    const COLUMN_COUNT: Option<usize> = None;

    fn from_row(row: &Row) -> Result<Self>;
}

macro_rules! impl_from_row_scalar {
    ($($source:ty),+ $(,)?) => {$(
        impl FromRow for $source {
            const COLUMN_COUNT: Option<usize> = Some(1);
            fn from_row(row: &Row) -> Result<Self> {
                row.decode(0)
            }
        }
    )+};
}

impl_from_row_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    Blob,
    Vec<u8>,
    Box<[u8]>,
    Value,
    OffsetDateTime,
    Uuid,
);

impl<T: AsValue> FromRow for Option<T> {
    const COLUMN_COUNT: Option<usize> = Some(1);
    fn from_row(row: &Row) -> Result<Self> {
        row.decode(0)
    }
}

macro_rules! impl_from_row_tuple {
    ($count:expr => $($name:ident $index:tt),+) => {
        impl<$($name: AsValue),+> FromRow for ($($name,)+) {
            const COLUMN_COUNT: Option<usize> = Some($count);
            fn from_row(row: &Row) -> Result<Self> {
                Ok(($(row.decode::<$name>($index)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(2 => A 0, B 1);
impl_from_row_tuple!(3 => A 0, B 1, C 2);
impl_from_row_tuple!(4 => A 0, B 1, C 2, D 3);
impl_from_row_tuple!(5 => A 0, B 1, C 2, D 3, E 4);
impl_from_row_tuple!(6 => A 0, B 1, C 2, D 3, E 4, F 5);
impl_from_row_tuple!(7 => A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_from_row_tuple!(8 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_from_row_tuple!(9 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_from_row_tuple!(10 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_from_row_tuple!(11 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_from_row_tuple!(12 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);
