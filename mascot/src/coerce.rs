//! Permissive numeric parsing for search engine exports
//!
//! Exported tables routinely contain empty cells, `---` placeholders and
//! the odd stray character in numeric columns. A single bad cell should never
//! abort a run, so every numeric field goes through [`coerce`], which falls
//! back to the type's zero value when the text is not a number.
//!
//! Rules:
//! - surrounding whitespace is ignored
//! - floats that are not finite (`nan`, `inf`) become `0.0`
//! - integers written as decimals (`"12.0"`, `"7.9"`) are truncated toward zero
//! - anything else unparseable becomes `0`

/// A numeric type with a zero fallback for unparseable text
pub trait Coerce: Sized {
    fn coerce(field: &str) -> Self;
}

/// Parse `field` as `T`, or return `T`'s zero value
#[inline]
pub fn coerce<T: Coerce>(field: &str) -> T {
    T::coerce(field)
}

impl Coerce for f64 {
    fn coerce(field: &str) -> f64 {
        field
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .unwrap_or_default()
    }
}

macro_rules! coerce_integer {
    ($($t:ty),+) => {
        $(
            impl Coerce for $t {
                fn coerce(field: &str) -> $t {
                    let field = field.trim();
                    field
                        .parse::<$t>()
                        .ok()
                        .or_else(|| {
                            let x = field.parse::<f64>().ok()?.trunc();
                            if x.is_finite() && x >= <$t>::MIN as f64 && x <= <$t>::MAX as f64 {
                                Some(x as $t)
                            } else {
                                None
                            }
                        })
                        .unwrap_or_default()
                }
            }
        )+
    };
}

coerce_integer!(u32, i64);
