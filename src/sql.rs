use crate::Value;
use std::{
    fmt::{self, Display},
    ops::{Add, AddAssign},
};

/// A bound query: SQL text with `?` placeholders plus the bindings, in
/// placeholder order. The [`sql!`](crate::sql) macro keeps the two in step
/// by construction; `from_parts` does not, and prepare rejects mismatches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sql {
    text: String,
    bindings: Vec<Value>,
}

impl Sql {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(text: impl Into<String>, bindings: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            bindings,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.bindings.is_empty()
    }

    /// Append trusted SQL verbatim. This is the injection-unsafe escape
    /// hatch; the input is the caller's responsibility.
    pub fn push(&mut self, sql: impl AsRef<str>) -> &mut Self {
        self.text.push_str(sql.as_ref());
        self
    }

    /// Append one `?` placeholder and its binding.
    pub fn bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.text.push('?');
        self.bindings.push(value.into());
        self
    }

    /// Splice a reusable fragment in: its text verbatim, its bindings in
    /// order. `Option<Sql>` splices nothing when absent.
    pub fn append(&mut self, fragment: impl Into<Sql>) -> &mut Self {
        let fragment = fragment.into();
        self.text.push_str(&fragment.text);
        self.bindings.extend(fragment.bindings);
        self
    }
}

impl Display for Sql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Sql {
    fn from(text: &str) -> Self {
        Sql::from_parts(text, Vec::new())
    }
}

impl From<String> for Sql {
    fn from(text: String) -> Self {
        Sql::from_parts(text, Vec::new())
    }
}

impl From<Option<Sql>> for Sql {
    fn from(fragment: Option<Sql>) -> Self {
        fragment.unwrap_or_default()
    }
}

impl Add for Sql {
    type Output = Sql;

    fn add(mut self, rhs: Sql) -> Sql {
        self.append(rhs);
        self
    }
}

impl AddAssign for Sql {
    fn add_assign(&mut self, rhs: Sql) {
        self.append(rhs);
    }
}

/// Build an [`Sql`] from interleaved parts:
///
/// ```
/// use cistern::sql;
///
/// let min = 10;
/// let filter = sql!("weight >= " {min});
/// let query = sql!("select name from parts where " {fragment: filter} " order by " {raw: "name"});
/// assert_eq!(query.text(), "select name from parts where weight >= ? order by name");
/// ```
///
/// String literals append verbatim, `{expr}` appends a `?` placeholder and
/// binds the value, `{fragment: expr}` splices another `Sql` (or
/// `Option<Sql>`) with its bindings, and `{raw: expr}` appends a runtime
/// string verbatim — the only injection-unsafe form.
#[macro_export]
macro_rules! sql {
    ($($part:tt)*) => {{
        let mut query = $crate::Sql::new();
        $crate::__sql_part!(query $($part)*);
        query
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sql_part {
    ($query:ident) => {};
    ($query:ident $text:literal $($rest:tt)*) => {
        $query.push($text);
        $crate::__sql_part!($query $($rest)*);
    };
    ($query:ident {raw: $e:expr} $($rest:tt)*) => {
        $query.push($e);
        $crate::__sql_part!($query $($rest)*);
    };
    ($query:ident {fragment: $e:expr} $($rest:tt)*) => {
        $query.append($e);
        $crate::__sql_part!($query $($rest)*);
    };
    ($query:ident {$e:expr} $($rest:tt)*) => {
        $query.bind($e);
        $crate::__sql_part!($query $($rest)*);
    };
}
