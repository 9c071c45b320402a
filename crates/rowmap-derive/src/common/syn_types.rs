//! Type helper utilities for syn type analysis.

/// The single type argument of a path type whose last segment is `name`.
fn single_arg<'a>(ty: &'a syn::Type, name: &str) -> Option<&'a syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != name {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

/// Extract the inner type T from Option<T>, or return None if not an Option type.
///
/// Recognizes `Option<T>`, `std::option::Option<T>`, and `core::option::Option<T>`.
pub fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    single_arg(ty, "Option")
}

/// Extract the inner type T from Vec<T>, or return None if not a Vec type.
pub fn vec_inner(ty: &syn::Type) -> Option<&syn::Type> {
    single_arg(ty, "Vec")
}

/// Extract the inner type T from Box<T>, or return None if not a Box type.
pub fn box_inner(ty: &syn::Type) -> Option<&syn::Type> {
    single_arg(ty, "Box")
}

/// Last path segment of a type, e.g. `Post` for `crate::blog::Post`.
pub fn type_name(ty: &syn::Type) -> Option<String> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    type_path.path.segments.last().map(|seg| seg.ident.to_string())
}

/// Where a field points, if it is reference-shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `Box<U>` or `Option<Box<U>>`
    One(String),
    /// `Vec<Box<U>>`
    Many(String),
}

/// Classify a field type as a reference to another record.
///
/// Plain values, `Option<T>` of a non-box and `Vec<u8>` style sequences are
/// not references.
pub fn reference_of(ty: &syn::Type) -> Option<Reference> {
    if let Some(item) = vec_inner(ty) {
        return box_inner(item)
            .and_then(type_name)
            .map(Reference::Many);
    }
    let ty = option_inner(ty).unwrap_or(ty);
    box_inner(ty).and_then(type_name).map(Reference::One)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_option_inner() {
        let ty: syn::Type = parse_quote!(Option<String>);
        assert!(option_inner(&ty).is_some());

        let ty: syn::Type = parse_quote!(std::option::Option<i32>);
        assert!(option_inner(&ty).is_some());

        let ty: syn::Type = parse_quote!(String);
        assert!(option_inner(&ty).is_none());

        let ty: syn::Type = parse_quote!(Vec<String>);
        assert!(option_inner(&ty).is_none());
    }

    #[test]
    fn test_vec_inner() {
        let ty: syn::Type = parse_quote!(Vec<String>);
        assert!(vec_inner(&ty).is_some());

        let ty: syn::Type = parse_quote!(std::vec::Vec<i32>);
        assert!(vec_inner(&ty).is_some());

        let ty: syn::Type = parse_quote!(Option<String>);
        assert!(vec_inner(&ty).is_none());
    }

    #[test]
    fn test_box_inner() {
        let ty: syn::Type = parse_quote!(Box<Post>);
        assert!(box_inner(&ty).is_some());

        let ty: syn::Type = parse_quote!(std::boxed::Box<Post>);
        assert!(box_inner(&ty).is_some());

        let ty: syn::Type = parse_quote!(Post);
        assert!(box_inner(&ty).is_none());
    }

    #[test]
    fn test_reference_of() {
        let ty: syn::Type = parse_quote!(Vec<Box<Comment>>);
        assert_eq!(reference_of(&ty), Some(Reference::Many("Comment".into())));

        let ty: syn::Type = parse_quote!(Option<Box<crate::blog::Post>>);
        assert_eq!(reference_of(&ty), Some(Reference::One("Post".into())));

        let ty: syn::Type = parse_quote!(Box<Post>);
        assert_eq!(reference_of(&ty), Some(Reference::One("Post".into())));

        let ty: syn::Type = parse_quote!(Vec<u8>);
        assert_eq!(reference_of(&ty), None);

        let ty: syn::Type = parse_quote!(Option<i64>);
        assert_eq!(reference_of(&ty), None);

        let ty: syn::Type = parse_quote!(Vec<Comment>);
        assert_eq!(reference_of(&ty), None);
    }
}
