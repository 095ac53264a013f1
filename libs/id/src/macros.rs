//! Macros for defining typed ID types.

/// Macro to define a typed ID with a specific prefix.
///
/// This generates a newtype wrapper around ULID with:
/// - A `PREFIX` constant
/// - `new()` to generate a fresh ID
/// - `parse()` delegating to [`crate::parse_prefixed`]
/// - `Display` and `FromStr` implementations
/// - `Serialize` and `Deserialize` implementations
/// - `Ord`, `Hash`, and other standard traits
///
/// # Example
///
/// ```ignore
/// define_id!(SiteId, "site");
/// define_id!(TaskId, "task");
///
/// let site_id = SiteId::new();
/// let parsed: SiteId = "site_01HV4Z2WQXKJNM8GPQY6VBKC3D".parse()?;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        /// A typed ID for this resource type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::Ulid);

        impl $name {
            /// The prefix for this ID type.
            pub const PREFIX: &'static str = $prefix;

            /// Creates a new ID with a fresh ULID.
            #[must_use]
            pub fn new() -> Self {
                Self($crate::Ulid::new())
            }

            /// Creates an ID from a raw ULID.
            #[must_use]
            pub const fn from_ulid(ulid: $crate::Ulid) -> Self {
                Self(ulid)
            }

            /// Returns the underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> $crate::Ulid {
                self.0
            }

            /// Parses an ID from a string in the `{prefix}_{ulid}` format.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                $crate::parse_prefixed(Self::PREFIX, s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
