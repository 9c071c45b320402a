//! Attribute parsing for the Model derive macro.
//!
//! Handles struct-level `#[rowmap(table = "...")]` and field-level
//! `#[rowmap(primary, column = "...", skip)]`.

use syn::{DeriveInput, Result};

/// Parsed field-level options.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub primary: bool,
    pub skip: bool,
    pub column: Option<String>,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            if ident == "primary" {
                attr.primary = true;
            } else if ident == "skip" {
                attr.skip = true;
            } else if ident == "column" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                attr.column = Some(value.value());
            } else {
                return Err(syn::Error::new_spanned(
                    ident,
                    "unknown rowmap field attribute, expected `primary`, `skip` or `column = \"...\"`",
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("expected `,`"));
        }
        Ok(attr)
    }
}

/// Table name from `#[rowmap(table = "...")]`, if present.
pub(super) fn get_table_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("rowmap") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: syn::LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unknown rowmap struct attribute, expected `table = \"...\"`"))
            }
        })?;
    }
    Ok(table)
}

/// Merge every `#[rowmap(...)]` on a field.
pub(super) fn get_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("rowmap") {
            continue;
        }
        let parsed: FieldAttr = attr.parse_args()?;
        merged.primary |= parsed.primary;
        merged.skip |= parsed.skip;
        if parsed.column.is_some() {
            merged.column = parsed.column;
        }
    }
    Ok(merged)
}
