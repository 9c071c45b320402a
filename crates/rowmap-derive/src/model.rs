//! Model derive macro implementation
//!
//! Emits an `impl ::rowmap::Record` carrying the static schema plus
//! positional field accessors. Attribute parsing lives in `attrs`.

mod attrs;

use crate::common::syn_types::{Reference, reference_of};
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

/// One named field, as seen by the generator.
struct FieldInfo {
    ident: syn::Ident,
    name: String,
    attr: attrs::FieldAttr,
    reference: Option<Reference>,
}

impl FieldInfo {
    fn is_column(&self) -> bool {
        !self.attr.skip && self.reference.is_none()
    }

    fn def_tokens(&self) -> TokenStream {
        let name = &self.name;
        let mut def = match &self.reference {
            None => quote! { ::rowmap::FieldDef::scalar(#name) },
            Some(Reference::One(target)) => quote! { ::rowmap::FieldDef::one(#name, #target) },
            Some(Reference::Many(target)) => quote! { ::rowmap::FieldDef::many(#name, #target) },
        };
        if self.attr.primary {
            def = quote! { #def.primary() };
        }
        if let Some(column) = &self.attr.column {
            def = quote! { #def.column(#column) };
        }
        if self.attr.skip {
            def = quote! { #def.skip() };
        }
        def
    }
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();
    let table = attrs::get_table_name(&input)?;

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let (shape, fields) = match &data.fields {
        Fields::Named(named) => {
            let fields = named
                .named
                .iter()
                .map(field_info)
                .collect::<Result<Vec<_>>>()?;
            (quote!(Named), fields)
        }
        Fields::Unnamed(_) => (quote!(Tuple), Vec::new()),
        Fields::Unit => (quote!(Unit), Vec::new()),
    };

    let table_tokens = match &table {
        Some(t) => quote! { ::core::option::Option::Some(#t) },
        None => quote! { ::core::option::Option::None },
    };
    let defs = fields.iter().map(FieldInfo::def_tokens);

    let columns: Vec<(Literal, &syn::Ident)> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_column())
        .map(|(i, f)| (Literal::usize_unsuffixed(i), &f.ident))
        .collect();
    let value_arms = columns.iter().map(|(i, ident)| {
        quote! { #i => ::rowmap::ToValue::to_value(&self.#ident), }
    });
    let scan_arms = columns.iter().map(|(i, ident)| {
        quote! {
            #i => {
                self.#ident = ::rowmap::FromValue::from_value(value)?;
                ::core::result::Result::Ok(())
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::rowmap::Record for #name #ty_generics #where_clause {
            const SCHEMA: ::rowmap::Schema = ::rowmap::Schema {
                name: #name_str,
                table: #table_tokens,
                shape: ::rowmap::Shape::#shape,
                fields: &[#(#defs),*],
            };

            fn value_at(&self, index: usize) -> ::rowmap::Value {
                match index {
                    #(#value_arms)*
                    _ => ::rowmap::Value::Null,
                }
            }

            fn scan_at(
                &mut self,
                index: usize,
                value: ::rowmap::Value,
            ) -> ::rowmap::OrmResult<()> {
                match index {
                    #(#scan_arms)*
                    _ => {
                        let _ = value;
                        ::core::result::Result::Err(::rowmap::OrmError::decode(
                            "",
                            ::std::format!("{} has no column at field position {}", #name_str, index),
                        ))
                    }
                }
            }
        }
    })
}

fn field_info(field: &syn::Field) -> Result<FieldInfo> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let attr = attrs::get_field_attr(field)?;
    let reference = reference_of(&field.ty);

    if attr.primary && (attr.skip || reference.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "#[rowmap(primary)] requires a column field",
        ));
    }

    let name = ident.unraw().to_string();
    Ok(FieldInfo {
        ident,
        name,
        attr,
        reference,
    })
}
