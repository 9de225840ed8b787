//! Newtype IDs for type-safe Slack entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Slack IDs are opaque
//! strings (`C0123ABCD`, `U0456EFGH`), so the wrappers hold a `String`.

/// Macro to define a type-safe Slack ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Accessors: `new()`, `as_str()`, `into_inner()`
/// - `Display`, `AsRef<str>` and `From<String>` / `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use gohan_core::define_id;
/// define_id!(TeamId);
/// define_id!(AppId);
///
/// let team = TeamId::new("T123");
/// let app = AppId::new("T123");
///
/// // These are different types, so this won't compile:
/// // let _: TeamId = app;
/// assert_eq!(team.as_str(), app.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard Slack entity IDs
define_id!(ChannelId);
define_id!(UserId);

impl UserId {
    /// Render the ID as a Slack user mention (`<@U123>`).
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}
