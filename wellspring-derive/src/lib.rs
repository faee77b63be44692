//! Derive macros for Wellspring property-based testing.
//!
//! This crate provides procedural macros to automatically derive structural
//! construction descriptors for custom types.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derive macro implementing the `Structural` trait.
///
/// Structs (named, tuple, or unit) get a single constructor descriptor whose
/// parameters are the field types in declaration order, so each field is
/// generated through the engine's type-directed path. Fieldless enums become
/// a uniform draw over their variants and therefore need `Clone` and `Debug`.
/// Enums with data and unions are not supported.
///
/// # Example
///
/// ```rust,ignore
/// use wellspring::*;
///
/// #[derive(Structural, Debug)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// let registry = StructuralRegistry::builder().structural::<User>().build();
/// ```
#[proc_macro_derive(Structural)]
pub fn derive_structural(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match structural_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn structural_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let construction = match &input.data {
        Data::Struct(data) => struct_construction(data)?,
        Data::Enum(data) => enum_construction(data)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Structural derive macro does not support unions",
            ));
        }
    };

    let expanded = quote! {
        impl #impl_generics ::wellspring::structural::Structural for #name #ty_generics #where_clause {
            fn construction() -> ::wellspring::structural::Construction {
                #construction
            }
        }
    };

    Ok(expanded)
}

fn struct_construction(data: &syn::DataStruct) -> Result<TokenStream2, syn::Error> {
    match &data.fields {
        Fields::Named(fields) => {
            let types: Vec<_> = fields.named.iter().map(|field| &field.ty).collect();
            let assignments = fields.named.iter().map(|field| {
                let field_name = field.ident.as_ref().unwrap();
                let field_type = &field.ty;
                quote! {
                    #field_name: args.take::<#field_type>()?
                }
            });

            Ok(quote! {
                ::wellspring::structural::Construction::Descriptors(vec![
                    ::wellspring::structural::ConstructorDescriptor::new(
                        vec![#(::wellspring::structural::TypeKey::of::<#types>()),*],
                        |mut args: ::wellspring::structural::ArgList| {
                            Ok(Box::new(Self {
                                #(#assignments),*
                            }) as Box<dyn ::std::any::Any>)
                        },
                    ),
                ])
            })
        }
        Fields::Unnamed(fields) => {
            let types: Vec<_> = fields.unnamed.iter().map(|field| &field.ty).collect();
            let takes = types.iter().map(|field_type| {
                quote! {
                    args.take::<#field_type>()?
                }
            });

            Ok(quote! {
                ::wellspring::structural::Construction::Descriptors(vec![
                    ::wellspring::structural::ConstructorDescriptor::new(
                        vec![#(::wellspring::structural::TypeKey::of::<#types>()),*],
                        |mut args: ::wellspring::structural::ArgList| {
                            Ok(Box::new(Self(#(#takes),*)) as Box<dyn ::std::any::Any>)
                        },
                    ),
                ])
            })
        }
        Fields::Unit => Ok(quote! {
            ::wellspring::structural::Construction::Descriptors(vec![
                ::wellspring::structural::ConstructorDescriptor::new(
                    vec![],
                    |_args: ::wellspring::structural::ArgList| {
                        Ok(Box::new(Self) as Box<dyn ::std::any::Any>)
                    },
                ),
            ])
        }),
    }
}

fn enum_construction(data: &syn::DataEnum) -> Result<TokenStream2, syn::Error> {
    let mut variants = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Structural derive macro supports only fieldless enum variants",
            ));
        }
        let ident = &variant.ident;
        variants.push(quote! { Self::#ident });
    }

    if variants.is_empty() {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "Structural derive macro cannot build an enum with no variants",
        ));
    }

    Ok(quote! {
        ::wellspring::structural::Construction::Closed(Box::new(|source| {
            let variants = [#(#variants),*];
            let value = source.from(&variants)?;
            Ok(Box::new(value) as Box<dyn ::std::any::Any>)
        }))
    })
}
