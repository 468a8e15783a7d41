//! Newtype reference URLs for type-safe resource links.
//!
//! SWAPI records reference each other by absolute URL. Use the
//! `define_resource_url!` macro to create wrappers that prevent passing a
//! planet link where a species link is expected.

/// Macro to define a type-safe resource URL wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
///
/// # Example
///
/// ```rust
/// # use holocron_core::define_resource_url;
/// define_resource_url!(StarshipUrl);
///
/// let url = StarshipUrl::new("https://swapi.dev/api/starships/9/");
/// assert_eq!(url.as_str(), "https://swapi.dev/api/starships/9/");
/// ```
#[macro_export]
macro_rules! define_resource_url {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new reference URL.
            #[must_use]
            pub fn new(url: impl Into<String>) -> Self {
                Self(url.into())
            }

            /// Returns the URL as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper and returns the inner string.
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

        impl From<String> for $name {
            fn from(url: String) -> Self {
                Self(url)
            }
        }

        impl From<&str> for $name {
            fn from(url: &str) -> Self {
                Self(url.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_resource_url!(CharacterUrl);
define_resource_url!(PlanetUrl);
define_resource_url!(SpeciesUrl);
define_resource_url!(FilmUrl);
