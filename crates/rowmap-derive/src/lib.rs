//! Derive macros for rowmap
//!
//! Provides `#[derive(Model)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod model;

/// Derive `rowmap::Record` for a struct.
///
/// # Example
///
/// ```ignore
/// use rowmap::Model;
///
/// #[derive(Debug, Default, Model)]
/// #[rowmap(table = "blog_post")]
/// struct Post {
///     #[rowmap(primary)]
///     id: i64,
///     #[rowmap(column = "headline")]
///     title: String,
///     comments: Vec<Box<Comment>>,
///     #[rowmap(skip)]
///     rendered: String,
/// }
/// ```
///
/// # Field mapping
///
/// - Value fields become columns named in snake_case
/// - `Box<U>` and `Option<Box<U>>` are single references to model `U`
/// - `Vec<Box<U>>` is a sequence of references to model `U`
///
/// Reference fields never become columns; the registry uses them to infer
/// relationships.
///
/// # Attributes
///
/// - `#[rowmap(table = "name")]` - Override the snake_case table name
/// - `#[rowmap(primary)]` - Mark field as (part of) the primary key
/// - `#[rowmap(column = "name")]` - Map field to a different column name
/// - `#[rowmap(skip)]` - Keep the field off the table
#[proc_macro_derive(Model, attributes(rowmap))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
