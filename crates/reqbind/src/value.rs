//! Conversion of raw request strings into typed fields.
//!
//! Scalars read the first value bound to a key; an empty string converts to
//! the type's zero value (`0`, `0.0`, `false`, `""`). Integers are parsed in
//! base 10 at their own width, so `"300"` overflows a `u8`.

use std::str::FromStr;

use crate::error::ValueError;

/// Types that can be built from the raw values of one key.
///
/// Implemented for strings, `char`, `bool`, every integer width, both float
/// widths, and for `Option<T>`, `Box<T>` and `Vec<T>` of those.
///
/// # Example
///
/// ```rust
/// use reqbind::FromValues;
///
/// let raw = vec!["42".to_string(), "7".to_string()];
/// assert_eq!(u32::from_values(&raw).unwrap(), 42);
/// assert_eq!(Vec::<u32>::from_values(&raw).unwrap(), vec![42, 7]);
/// assert_eq!(i64::from_values(&["".to_string()]).unwrap(), 0);
/// ```
pub trait FromValues: Sized {
    /// Converts the values bound to one key.
    fn from_values(values: &[String]) -> Result<Self, ValueError>;
}

/// Types that can be built from one raw string.
///
/// Implementing `FromValue` does not make a type usable as a field on its
/// own: add the [`FromValues`] impl with [`impl_from_values!`], which reads
/// the first value and treats a missing one as `""`.
///
/// ```rust
/// use reqbind::{impl_from_values, FromValue, FromValues, ValueError};
///
/// #[derive(Debug, PartialEq)]
/// struct Cents(u64);
///
/// impl FromValue for Cents {
///     fn from_value(value: &str) -> Result<Self, ValueError> {
///         let (whole, frac) = value.split_once('.').unwrap_or((value, "0"));
///         let whole = u64::from_value(whole)?;
///         let frac = u64::from_value(frac)?;
///         Ok(Cents(whole * 100 + frac))
///     }
/// }
///
/// impl_from_values!(Cents);
///
/// assert_eq!(Cents::from_values(&["3.25".to_string()]).unwrap(), Cents(325));
/// ```
pub trait FromValue: Sized {
    /// Converts a single raw value.
    fn from_value(value: &str) -> Result<Self, ValueError>;
}

fn first(values: &[String]) -> &str {
    values.first().map_or("", String::as_str)
}

impl FromValue for String {
    fn from_value(value: &str) -> Result<Self, ValueError> {
        Ok(value.to_owned())
    }
}

impl FromValue for char {
    fn from_value(value: &str) -> Result<Self, ValueError> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok('\0'),
            (Some(c), None) => Ok(c),
            _ => Err(ValueError::new(value, "expected a single character")),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &str) -> Result<Self, ValueError> {
        match value {
            "" | "0" | "f" | "F" | "false" | "FALSE" | "False" | "off" => Ok(false),
            "1" | "t" | "T" | "true" | "TRUE" | "True" | "on" => Ok(true),
            _ => Err(ValueError::new(value, "invalid boolean")),
        }
    }
}

macro_rules! impl_from_value_for_number {
    ($zero:literal => $($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &str) -> Result<Self, ValueError> {
                    let value_or_zero = if value.is_empty() { $zero } else { value };
                    value_or_zero
                        .parse::<$ty>()
                        .map_err(|e| ValueError::new(value, e))
                }
            }
        )*
    };
}

impl_from_value_for_number!("0" => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_from_value_for_number!("0.0" => f32, f64);

/// Implements [`FromValues`] for types that implement [`FromValue`], reading
/// the first bound value.
#[macro_export]
macro_rules! impl_from_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::FromValues for $ty {
                fn from_values(
                    values: &[::std::string::String],
                ) -> ::std::result::Result<Self, $crate::ValueError> {
                    <$ty as $crate::FromValue>::from_value(
                        values.first().map_or("", ::std::string::String::as_str),
                    )
                }
            }
        )*
    };
}

impl_from_values!(
    String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &str) -> Result<Self, ValueError> {
        if value.is_empty() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: FromValue> FromValues for Option<T> {
    fn from_values(values: &[String]) -> Result<Self, ValueError> {
        <Self as FromValue>::from_value(first(values))
    }
}

impl<T: FromValues> FromValues for Box<T> {
    fn from_values(values: &[String]) -> Result<Self, ValueError> {
        T::from_values(values).map(Box::new)
    }
}

impl<T: FromValue> FromValues for Vec<T> {
    fn from_values(values: &[String]) -> Result<Self, ValueError> {
        values.iter().map(|v| T::from_value(v)).collect()
    }
}

/// Converts the first value through [`FromStr`].
///
/// Used by fields marked `#[bind(from_str)]`, for types such as
/// `std::net::IpAddr` that have no [`FromValues`] implementation.
pub fn parse_from_str<T>(values: &[String]) -> Result<T, ValueError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = first(values);
    value.parse().map_err(|e| ValueError::new(value, e))
}
