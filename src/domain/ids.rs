//! Record identifier types with proper encapsulation.
//!
//! Identifiers are opaque strings minted by whichever record store backs the
//! engine; the newtypes exist so a deal reference can never be confused with a
//! customer or actor reference.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// The inner String is private to ensure all construction goes through
        /// the defined constructors.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new id from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id! {
    /// Deal identifier - newtype for type safety.
    DealId
}

string_id! {
    /// Customer identifier - newtype for type safety.
    CustomerId
}

string_id! {
    /// Actor (sales rep / user) identifier - newtype for type safety.
    ActorId
}
