//! Procedural macros for nimbus option structs.
//!
//! `#[derive(Options)]` generates the static field table the query and body
//! builders walk, plus the `ToQuery` / `ToBody` capabilities.
//!
//! # Example
//!
//! ```ignore
//! use nimbus::Options;
//!
//! #[derive(Options, Default)]
//! #[opts(root = "vpc")]
//! pub struct CreateOpts {
//!     #[opts(required)]
//!     pub name: String,
//!     pub cidr: String,
//! }
//!
//! let body = CreateOpts { name: "web".into(), ..Default::default() }.to_body()?;
//! // {"vpc": {"name": "web"}}
//! ```

mod attrs;
mod options_derive;

use proc_macro::TokenStream;

/// Derive `Described` (and `ToQuery` / `ToBody` where they apply) for an option struct.
///
/// # Struct Attributes
///
/// - `#[opts(root = "vpc")]` - Generate `ToBody`, wrapping the fields under `vpc`
/// - `#[opts(rename_all = "camelCase")]` - Key case for fields without an explicit key
///   (`camelCase`, `PascalCase`, `lowercase`, `kebab-case`)
///
/// # Field Attributes
///
/// - `#[opts(query)]`, `#[opts(query = "key")]` - Emit in query strings
/// - `#[opts(body)]`, `#[opts(body = "key")]` - Emit in bodies (the default)
/// - `#[opts(required)]` - Fail the build when the value is zero
/// - `#[opts(keep_zero)]` - Emit the field even when its value is zero
/// - `#[opts(ignore)]` - Never serialized
/// - `#[opts(lookup(key = "flavorRef", kind = "flavor"))]` - Resolve a name to an id (implies `ignore`)
/// - `#[opts(format = "csv")]` - Comma-join a query sequence instead of repeating the key
/// - `#[opts(flatten)]` - Write an embedded option struct's fields at this level
/// - `#[opts(skip)]` - Leave the field out of the table entirely
///
/// `ToQuery` is generated when a field targets the query (or is flattened).
#[proc_macro_derive(Options, attributes(opts))]
pub fn derive_options(input: TokenStream) -> TokenStream {
    options_derive::expand_options_derive(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
