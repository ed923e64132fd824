#![recursion_limit = "256"]

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Ident, Type};

/// One field of the container, with its `#[ssz(...)]` markers resolved.
struct FieldSchema<'a> {
    name: &'a Ident,
    ty: &'a Type,
    skip_serializing: bool,
    skip_deserializing: bool,
}

fn container_schema(ast: &DeriveInput) -> Vec<FieldSchema<'_>> {
    let named = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("ssz codecs can only be derived for structs with named fields"),
        },
        _ => panic!("ssz codecs can only be derived for structs with named fields"),
    };

    named
        .iter()
        .map(|field| FieldSchema {
            name: field.ident.as_ref().expect("fields are named"),
            ty: &field.ty,
            skip_serializing: has_ssz_marker(field, "skip_serializing"),
            skip_deserializing: has_ssz_marker(field, "skip_deserializing"),
        })
        .collect()
}

fn has_ssz_marker(field: &Field, marker: &str) -> bool {
    field.attrs.iter().any(|attr| {
        attr.path().is_ident("ssz")
            && attr
                .parse_args::<Ident>()
                .map(|ident| ident == marker)
                .unwrap_or(false)
    })
}

#[proc_macro_derive(SszEncode, attributes(ssz))]
pub fn encode_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let fields = container_schema(&ast);
    let encoded: Vec<_> = fields
        .iter()
        .filter(|field| !field.skip_serializing)
        .collect();
    let field_count = encoded.len();

    let part_pushes = encoded.iter().map(|field| {
        let field_name = field.name;
        let field_type = field.ty;
        quote! {
            if <#field_type as ssz::SszEncode>::is_ssz_fixed_len() {
                fixed_parts.push(Some(ssz::SszEncode::as_ssz_bytes(&self.#field_name)));
                variable_parts.push(vec![]);
            } else {
                fixed_parts.push(None);
                variable_parts.push(ssz::SszEncode::as_ssz_bytes(&self.#field_name));
            }
        }
    });

    let fixed_checks = encoded.iter().map(|field| {
        let field_type = field.ty;
        quote! { <#field_type as ssz::SszEncode>::is_ssz_fixed_len() }
    });

    let generated = quote! {
        impl #impl_generics ssz::SszEncode for #name #ty_generics #where_clause {
            fn as_ssz_bytes(&self) -> Vec<u8> {
                let mut fixed_parts = Vec::with_capacity(#field_count);
                let mut variable_parts = Vec::with_capacity(#field_count);
                #( #part_pushes )*

                ssz::encode_items_from_parts(&fixed_parts, &variable_parts)
            }

            fn is_ssz_fixed_len() -> bool {
                let field_is_fixed: [bool; #field_count] = [ #( #fixed_checks ),* ];
                field_is_fixed.iter().all(|fixed| *fixed)
            }
        }
    };

    generated.into()
}

#[proc_macro_derive(SszDecode, attributes(ssz))]
pub fn decode_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let fields = container_schema(&ast);

    let mut registrations = Vec::with_capacity(fields.len());
    let mut bindings = Vec::with_capacity(fields.len());
    let mut fixed_checks = Vec::with_capacity(fields.len());
    let mut fixed_lengths = Vec::with_capacity(fields.len());
    for field in &fields {
        let field_name = field.name;
        let field_type = field.ty;

        if field.skip_deserializing {
            bindings.push(quote! {
                let #field_name = <#field_type as Default>::default();
            });
        } else {
            registrations.push(quote! {
                __decoder.next_type::<#field_type>()?;
            });
            bindings.push(quote! {
                let #field_name = __decoder.deserialize_next::<#field_type>()?;
            });
            fixed_checks.push(quote! {
                <#field_type as ssz::SszDecode>::is_ssz_fixed_len()
            });
            fixed_lengths.push(quote! {
                <#field_type as ssz::SszDecode>::ssz_fixed_len()
            });
        }
    }
    let decoded_count = fixed_checks.len();
    let field_names = fields.iter().map(|field| field.name);

    let generated = quote! {
        impl #impl_generics ssz::SszDecode for #name #ty_generics #where_clause {
            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ssz::SszDecodeError> {
                let mut __decoder = ssz::Decoder::for_bytes(bytes);

                #( #registrations )*
                #( #bindings )*

                Ok(Self { #( #field_names ),* })
            }

            fn is_ssz_fixed_len() -> bool {
                let field_is_fixed: [bool; #decoded_count] = [ #( #fixed_checks ),* ];
                field_is_fixed.iter().all(|fixed| *fixed)
            }

            fn ssz_fixed_len() -> usize {
                if <Self as ssz::SszDecode>::is_ssz_fixed_len() {
                    let field_lengths: [usize; #decoded_count] = [ #( #fixed_lengths ),* ];
                    field_lengths.iter().sum()
                } else {
                    ssz::BYTES_PER_LENGTH_OFFSET
                }
            }
        }
    };

    generated.into()
}
