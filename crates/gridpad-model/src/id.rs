use core::fmt;
use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier (e.g. one read back from a snapshot).
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub(crate) fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), crate::new_uuid().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Identifier for a column, stable for the column's lifetime.
    ///
    /// Freshly generated ids look like `col-<uuid>`; ids loaded from older
    /// snapshots (e.g. `col-1`) are kept verbatim.
    ColumnId,
    "col"
);

string_id!(
    /// Identifier for a row, stable for the row's lifetime.
    RowId,
    "row"
);
