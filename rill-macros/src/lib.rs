//! # rill-macros
//!
//! Procedural macros for rill.
//!
//! ## Concat Derive
//!
//! ```ignore
//! #[derive(Debug, Clone, Concat)]
//! struct Progress {
//!     #[concat(append)]
//!     log: String,
//!     status: String,
//!     #[concat(nested)]
//!     message: Message,
//! }
//! ```
//!
//! `rill_core::Concat` expands to paths under `::rill_core`, and `rill::Concat`
//! to paths under `::rill::core`, so either crate alone is enough. A struct can
//! name another host with `#[concat(crate = my_reexport::core)]`.

extern crate proc_macro;

mod concat;

use proc_macro::TokenStream;

/// Derive macro for implementing the `Concat` trait field by field.
///
/// # Attributes
///
/// - `#[concat(append)]` - Append the field across chunks (strings, vectors)
/// - `#[concat(nested)]` - Reduce the field with its own `Concat` impl
/// - `#[concat(last)]` - Keep the latest non-empty value (the default)
/// - `#[concat(crate = path)]` on the struct - Where `concat` lives (default `::rill_core`)
///
/// Fields without an attribute must implement `IsEmpty` and `Clone`.
/// `KIND` is the struct name.
///
/// # Example
///
/// ```ignore
/// #[derive(Concat)]
/// struct Chunk {
///     #[concat(append)]
///     text: String,
///     finish_reason: String,
/// }
/// ```
#[proc_macro_derive(Concat, attributes(concat))]
pub fn derive_concat(input: TokenStream) -> TokenStream {
    concat::derive_concat_impl(input, "::rill_core")
}

/// `Concat` derive re-exported by the `rill` facade, resolving through `::rill::core`.
#[doc(hidden)]
#[proc_macro_derive(RillConcat, attributes(concat))]
pub fn derive_rill_concat(input: TokenStream) -> TokenStream {
    concat::derive_concat_impl(input, "::rill::core")
}
