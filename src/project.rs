//! Projection of generic [`Value`] trees into typed records.
//!
//! Records are declared with the [`record!`] macro, which produces the struct
//! and a [`FromValue`] impl that reads each field from its source key.
//! Projection never fails on data: a key that is missing, or that holds a
//! value of the wrong kind, yields the field's zero value. This tolerates
//! schema drift between a database and the records declared here, at the
//! cost of hiding it; [`Value::kind`] is there for callers that want to
//! inspect the raw tree themselves.

use crate::edition::{Capability, Edition};
use crate::error::Result;
use crate::value::{Map, Value};

/// Conversion from a generic value into a typed field.
pub trait FromValue: Sized + Default {
    /// Convert `value`, or return `None` when it is the wrong kind for `Self`.
    fn from_value(value: &Value) -> Option<Self>;

    /// Convert `value`, falling back to the zero value.
    #[inline]
    fn project(value: &Value) -> Self {
        Self::from_value(value).unwrap_or_default()
    }
}

/// A top-level record shape and the capability a database needs to answer it.
pub trait Record: FromValue {
    const CAPABILITY: Capability;
}

/// Read `key` from `map` as a `T`, defaulting when absent or mismatched.
#[inline]
pub fn field<T: FromValue>(map: &Map, key: &str) -> T {
    map.get(key).and_then(T::from_value).unwrap_or_default()
}

/// Project `tree` into `R` after checking `edition` can answer `R` at all.
///
/// The capability check runs first, so a wrong accessor never produces a
/// zero-valued record.
pub fn project<R: Record>(tree: &Value, edition: &Edition) -> Result<R> {
    edition.require(R::CAPABILITY)?;
    Ok(R::project(tree))
}

macro_rules! unsigned_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    value.as_unsigned().and_then(|n| <$ty>::try_from(n).ok())
                }
            }
        )*
    };
}

unsigned_from_value!(u8, u16, u32, u64);

impl FromValue for f64 {
    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for bool {
    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

// Elements of the wrong kind keep their slot as zero values.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_array()
            .map(|items| items.iter().map(T::project).collect())
    }
}

/// Declare a record: a plain struct whose fields are read from the listed
/// source keys.
///
/// ```ignore
/// record! {
///     pub struct Postal {
///         code: String = "code",
///     }
/// }
/// ```
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty = $key:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                #[serde(rename = $key)]
                pub $field: $ty,
            )*
        }

        impl $crate::project::FromValue for $name {
            fn from_value(value: &$crate::value::Value) -> Option<Self> {
                let map = value.as_map()?;
                Some(Self {
                    $($field: $crate::project::field(map, $key),)*
                })
            }
        }
    };
}

pub(crate) use record;
