//! `#[derive(Options)]` implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Fields, parse2};

use crate::attrs::{FieldOptions, Format, Target, field_name, parse_field_options, parse_struct_options};

/// Expand the `#[derive(Options)]` macro.
pub fn expand_options_derive(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let struct_options = parse_struct_options(&input.attrs)?;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Options derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Options derive only supports structs",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut has_query = false;

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let options = parse_field_options(field)?;
        if options.target == Target::Skip {
            continue;
        }
        has_query |= matches!(options.target, Target::Query(_) | Target::Flatten);

        let logical = field_name(field);
        let key = options.key(field, struct_options.rename_all);
        descriptors.push(descriptor(ident, &logical, &key, &options));
    }

    let described = quote! {
        impl #impl_generics ::nimbus::Described for #name #ty_generics #where_clause {
            const FIELDS: &'static [::nimbus::FieldDescriptor<Self>] = &[
                #(#descriptors),*
            ];
        }
    };

    let to_query = has_query.then(|| {
        quote! {
            impl #impl_generics ::nimbus::ToQuery for #name #ty_generics #where_clause {
                fn to_query(&self) -> ::nimbus::Result<::nimbus::QueryString> {
                    ::nimbus::build_query(self)
                }
            }
        }
    });

    let to_body = struct_options.root.map(|root| {
        quote! {
            impl #impl_generics ::nimbus::ToBody for #name #ty_generics #where_clause {
                fn to_body_with(
                    &self,
                    lookup: ::std::option::Option<&dyn ::nimbus::IdLookup>,
                ) -> ::nimbus::Result<::nimbus::Body> {
                    ::nimbus::build_body_with(self, #root, lookup)
                }
            }
        }
    });

    Ok(quote! {
        #described
        #to_query
        #to_body
    })
}

/// Generate one `FieldDescriptor` expression.
fn descriptor(ident: &syn::Ident, logical: &str, key: &str, options: &FieldOptions) -> TokenStream {
    let (target, value) = match &options.target {
        Target::Query(_) => (
            quote! { ::nimbus::FieldTarget::Query(#key) },
            quote! { ::nimbus::AsFieldValue::as_field_value(&options.#ident) },
        ),
        Target::Body(_) => (
            quote! { ::nimbus::FieldTarget::Body(#key) },
            quote! { ::nimbus::AsFieldValue::as_field_value(&options.#ident) },
        ),
        Target::Ignore | Target::Skip => (
            quote! { ::nimbus::FieldTarget::Ignore },
            quote! { ::nimbus::AsFieldValue::as_field_value(&options.#ident) },
        ),
        Target::Flatten => (
            quote! { ::nimbus::FieldTarget::Embedded },
            quote! { ::nimbus::FieldValue::Embedded(&options.#ident) },
        ),
    };

    let required = options.required.then(|| quote! { .required() });
    let keep_zero = options.keep_zero.then(|| quote! { .keep_zero() });
    let format = options.format.map(|format| match format {
        Format::Multi => quote! { .format(::nimbus::CollectionFormat::Multi) },
        Format::Csv => quote! { .format(::nimbus::CollectionFormat::Csv) },
    });
    let lookup = options.lookup.as_ref().map(|lookup| {
        let (key, kind) = (&lookup.key, &lookup.kind);
        quote! { .lookup(#key, #kind) }
    });

    quote! {
        ::nimbus::FieldDescriptor::<Self>::new(#logical, #target, |options| #value)
            #required
            #keep_zero
            #format
            #lookup
    }
}
