//! Macro for implementing string conversions on code enums
//!
//! ERP and portal records carry short string codes (`"sap"`, `"pending"`,
//! `"C"`, `"B"`). This macro maps each enum variant to its canonical code and
//! generates `as_str`, `Display` and a case-insensitive `FromStr`.
//!
//! # Example
//!
//! ```rust
//! use mdsync_domain::impl_code_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Origin {
//!     Erp,
//!     Portal,
//! }
//!
//! impl_code_conversions!(Origin {
//!     Erp => "sap",
//!     Portal => "portal",
//! });
//!
//! assert_eq!(Origin::Erp.to_string(), "sap");
//! assert_eq!("PORTAL".parse::<Origin>().unwrap(), Origin::Portal);
//! ```

/// Implements `as_str`, `Display` and `FromStr` for code enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $code` - Mapping of enum variants to their canonical codes
///
/// Parsing ignores ASCII case and surrounding whitespace; output always uses
/// the canonical code.
#[macro_export]
macro_rules! impl_code_conversions {
    ($enum_name:ident { $($variant:ident => $code:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire code for this variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($code) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
