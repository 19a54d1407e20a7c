//! Macro for implementing Display and FromStr for keyword enums
//!
//! Settings values such as the debug level arrive as strings from the
//! environment or a config file. This macro provides both directions of the
//! conversion from one variant table.
//!
//! # Example
//!
//! ```rust
//! use vaultline_domain::impl_keyword_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Region {
//!     Us,
//!     Eu,
//! }
//!
//! impl_keyword_conversions!(Region {
//!     Us => "us",
//!     Eu => "eu",
//! });
//! ```

/// Implements Display and FromStr traits for keyword enums
///
/// - Display writes the keyword exactly as listed
/// - FromStr matches case-insensitively, so keywords must be lowercase
#[macro_export]
macro_rules! impl_keyword_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
