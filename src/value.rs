/// The dynamic storage classes of an SQLite cell.
///
/// Values are immutable once constructed and compare structurally.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Blob),
}

/// A blob cell. The engine reports zero-length blobs with a null data
/// pointer, so the empty case is its own state rather than an empty buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Blob {
    #[default]
    Empty,
    Loaded(Box<[u8]>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The engine's name for this storage class, as used in error messages.
    pub fn storage_class(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(..) => "INTEGER",
            Value::Real(..) => "REAL",
            Value::Text(..) => "TEXT",
            Value::Blob(..) => "BLOB",
        }
    }
}

impl Blob {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Blob::Empty => &[],
            Blob::Loaded(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Blob::Empty) || self.len() == 0
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            Blob::Empty
        } else {
            Blob::Loaded(bytes.into())
        }
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Blob::Empty
        } else {
            Blob::Loaded(bytes.into())
        }
    }
}
