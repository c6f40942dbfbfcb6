//! Derive macro for `tagcheck_core::Record` and `tagcheck_core::Validatable`.
//!
//! ```ignore
//! #[derive(Validate)]
//! struct Signup {
//!     #[validate("@NotBlank;@MaxLength(32)")]
//!     name: String,
//!     #[validate(rules = "@MinInt(18)", field = "Age")]
//!     age: u32,
//! }
//! ```
//!
//! Only annotated fields are described; unannotated fields carry no
//! directives and would pass anyway. Directive strings are kept verbatim and
//! parsed at validation time.

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Fields, Index, LitStr, Member, Path, Type};

/// Derive `tagcheck_core::Record` and `tagcheck_core::Validatable`.
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand_validate(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_validate(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let krate = parse_crate_path(&input.attrs)?;
    let Data::Struct(struct_data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "Validate can only be derived for structs",
        ));
    };

    let members: Vec<(Member, String, &syn::Field)> = match &struct_data.fields {
        Fields::Named(fields) => fields
            .named
            .iter()
            .filter_map(|field| {
                let ident = field.ident.as_ref()?;
                Some((
                    Member::Named(ident.clone()),
                    ident.unraw().to_string(),
                    field,
                ))
            })
            .collect(),
        Fields::Unnamed(fields) => fields
            .unnamed
            .iter()
            .enumerate()
            .map(|(position, field)| {
                (
                    Member::Unnamed(Index::from(position)),
                    position.to_string(),
                    field,
                )
            })
            .collect(),
        Fields::Unit => Vec::new(),
    };

    let mut descriptors = Vec::new();
    let mut bounded_types: Vec<&Type> = Vec::new();
    for (member, default_name, field) in members {
        let Some(annotation) = parse_field_annotation(&field.attrs)? else {
            continue;
        };
        let field_name = annotation.field.unwrap_or(default_name);
        let directives = annotation.directives.join(";");
        descriptors.push(quote! {
            #krate::FieldDescriptor::new(
                #field_name,
                #directives,
                #krate::AsFieldValue::as_field_value(&self.#member),
            )
        });
        bounded_types.push(&field.ty);
    }

    let name = &input.ident;
    let mut generics = input.generics.clone();
    if !generics.params.is_empty() {
        let where_clause = generics.make_where_clause();
        for ty in bounded_types {
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: #krate::AsFieldValue));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::Record for #name #ty_generics #where_clause {
            fn fields(&self) -> ::std::vec::Vec<#krate::FieldDescriptor<'_>> {
                ::std::vec![#(#descriptors),*]
            }
        }

        impl #impl_generics #krate::Validatable for #name #ty_generics #where_clause {
            fn shape(&self) -> #krate::Shape<'_> {
                #krate::Shape::Record(self)
            }
        }
    })
}

fn parse_crate_path(attrs: &[Attribute]) -> Result<Path, syn::Error> {
    let mut krate: Option<Path> = None;
    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let value: LitStr = meta.value()?.parse()?;
                if krate.is_some() {
                    return Err(meta.error("duplicate validate(crate = ...)"));
                }
                krate = Some(value.parse()?);
                return Ok(());
            }
            Err(meta.error("unsupported validate attribute on container"))
        })?;
    }

    Ok(krate.unwrap_or_else(|| syn::parse_quote!(::tagcheck_core)))
}

#[derive(Debug, Default)]
struct FieldAnnotation {
    directives: Vec<String>,
    field: Option<String>,
}

/// Collects every `#[validate(...)]` on a field. Returns `None` when the
/// field has no such attribute.
fn parse_field_annotation(attrs: &[Attribute]) -> Result<Option<FieldAnnotation>, syn::Error> {
    let mut annotation: Option<FieldAnnotation> = None;
    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }
        let current = annotation.get_or_insert_with(FieldAnnotation::default);

        // Shorthand: #[validate("@NotZero;@MaxInt(10)")]
        if let Ok(directives) = attr.parse_args::<LitStr>() {
            current.directives.push(directives.value());
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rules") {
                let value: LitStr = meta.value()?.parse()?;
                current.directives.push(value.value());
                return Ok(());
            }
            if meta.path.is_ident("field") {
                let value: LitStr = meta.value()?.parse()?;
                if current.field.is_some() {
                    return Err(meta.error("duplicate validate(field = ...)"));
                }
                current.field = Some(value.value());
                return Ok(());
            }
            Err(meta.error("unsupported validate attribute on field"))
        })?;
    }
    Ok(annotation)
}
