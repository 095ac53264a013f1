//! # replistore-id
//!
//! Stable ID types, parsing, and validation for the replistore platform.
//!
//! ## Design Principles
//!
//! - IDs are stable and system-generated; names are user-controlled labels
//! - All IDs have a canonical string representation with strict parsing
//! - IDs support roundtrip serialization (parse → format → parse)
//! - IDs are typed to prevent mixing different resource types
//!
//! ## ID Format
//!
//! All resource IDs use a prefixed format: `{prefix}_{ulid}`
//!
//! Examples:
//! - `site_01HV4Z2WQXKJNM8GPQY6VBKC3D`
//! - `bkt_01HV4Z3MXNKPQR9HSTZ7WCLD4E`
//! - `task_01HV4Z4NYPLTRS0JTUA8XDME5F`
//!
//! This format provides:
//! - Type safety (prefix indicates resource type)
//! - Sortability (ULID is time-ordered)
//! - Uniqueness (ULID has 80 bits of randomness)
//! - Human readability (clear prefixes)

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export ulid for consumers that need raw ULID operations
pub use ulid::Ulid;

/// Parses a `{prefix}_{ulid}` string, validating the prefix.
///
/// Shared by every generated ID type; exposed so callers can validate an
/// ID string against an expected prefix without constructing the type.
pub fn parse_prefixed(prefix: &'static str, s: &str) -> Result<Ulid, IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }

    let Some((found, ulid_str)) = s.split_once('_') else {
        return Err(IdError::MissingSeparator);
    };

    if found != prefix {
        return Err(IdError::WrongPrefix {
            expected: prefix,
            found: found.to_string(),
        });
    }

    ulid_str
        .parse::<Ulid>()
        .map_err(|e| IdError::InvalidUlid(e.to_string()))
}
