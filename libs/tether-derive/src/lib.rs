use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive macro mapping a struct's fields to object attributes.
///
/// Generates `tether_reflect::Record` (the field table and slot accessors)
/// plus `FromValue` / `IntoValue`, so the struct converts to and from
/// object values and nests inside other records and collections.
///
/// Every field carries exactly one `#[tether(...)]` form:
///
/// - `name = "..."`: the attribute this field maps to.
/// - `skip`: not part of the object; left at its default on decode.
/// - `embed`: the field is itself a record whose attributes are promoted
///   into this one.
///
/// The struct must implement `Default`.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default)]
/// pub struct Server {
///     #[tether(name = "hostname")]
///     pub hostname: String,
///
///     #[tether(embed)]
///     pub common: Common,
///
///     #[tether(skip)]
///     pub cache: Option<Handle>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(tether))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

enum FieldTag {
    Name(String),
    Skip,
    Embed,
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ));
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Record only supports structs")),
    };

    let mut tag_tokens = Vec::new();
    let mut slot_arms = Vec::new();
    let mut slot_mut_arms = Vec::new();
    let mut bounds = Vec::new();
    let mut seen_names = HashSet::new();

    for (index, field) in fields.iter().enumerate() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.to_string();
        let field_ty = &field.ty;

        let tag = parse_field_tag(field)?;

        match tag {
            FieldTag::Name(attr_name) => {
                if !seen_names.insert(attr_name.clone()) {
                    return Err(syn::Error::new_spanned(
                        field_name,
                        format!("duplicate attribute name '{attr_name}'"),
                    ));
                }
                tag_tokens.push(quote! {
                    tether_reflect::FieldTag {
                        field: #field_name_str,
                        tag: tether_reflect::Tag::Name(#attr_name),
                    }
                });
                slot_arms.push(quote! {
                    [#index] => ::core::option::Option::Some(
                        &self.#field_name as &dyn tether_reflect::FieldSlot
                    ),
                });
                slot_mut_arms.push(quote! {
                    [#index] => ::core::option::Option::Some(
                        &mut self.#field_name as &mut dyn tether_reflect::FieldSlot
                    ),
                });
                bounds.push(quote! {
                    #field_ty: tether_reflect::FromValue + tether_reflect::IntoValue
                });
            }
            FieldTag::Embed => {
                tag_tokens.push(quote! {
                    tether_reflect::FieldTag {
                        field: #field_name_str,
                        tag: tether_reflect::Tag::Embed(
                            <#field_ty as tether_reflect::Record>::field_tags
                        ),
                    }
                });
                slot_arms.push(quote! {
                    [#index, __rest @ ..] => {
                        tether_reflect::Record::slot(&self.#field_name, __rest)
                    }
                });
                slot_mut_arms.push(quote! {
                    [#index, __rest @ ..] => {
                        tether_reflect::Record::slot_mut(&mut self.#field_name, __rest)
                    }
                });
                bounds.push(quote! { #field_ty: tether_reflect::Record });
            }
            FieldTag::Skip => {
                tag_tokens.push(quote! {
                    tether_reflect::FieldTag {
                        field: #field_name_str,
                        tag: tether_reflect::Tag::Skip,
                    }
                });
            }
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Field bounds only for generic records: on concrete types they are
    // checked anyway, and recursive records would overflow the solver.
    let where_clause = if input.generics.params.is_empty() {
        quote! { #where_clause }
    } else {
        let existing = where_clause.map(|w| {
            let predicates = &w.predicates;
            quote! { #predicates, }
        });
        quote! {
            where
                #existing
                #name #ty_generics: ::core::default::Default,
                #(#bounds,)*
        }
    };

    let expanded = quote! {
        impl #impl_generics tether_reflect::Record for #name #ty_generics #where_clause {
            fn field_tags() -> ::std::vec::Vec<tether_reflect::FieldTag> {
                ::std::vec![
                    #(#tag_tokens),*
                ]
            }

            fn slot(
                &self,
                __index: &[usize],
            ) -> ::core::option::Option<&dyn tether_reflect::FieldSlot> {
                match __index {
                    #(#slot_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn slot_mut(
                &mut self,
                __index: &[usize],
            ) -> ::core::option::Option<&mut dyn tether_reflect::FieldSlot> {
                match __index {
                    #(#slot_mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics tether_reflect::FromValue for #name #ty_generics #where_clause {
            fn from_value(
                __ctx: &tether_reflect::Context,
                __ty: &tether_reflect::Type,
                __value: &tether_reflect::Value,
                __path: &tether_reflect::Path,
                __diags: &mut tether_reflect::Diagnostics,
            ) -> ::core::option::Option<Self> {
                tether_reflect::convert::record_from_value::<Self>(
                    __ctx, __ty, __value, __path, __diags,
                )
            }
        }

        impl #impl_generics tether_reflect::IntoValue for #name #ty_generics #where_clause {
            fn into_value(
                &self,
                __ctx: &tether_reflect::Context,
                __ty: &tether_reflect::Type,
                __path: &tether_reflect::Path,
                __diags: &mut tether_reflect::Diagnostics,
            ) -> ::core::option::Option<tether_reflect::Value> {
                tether_reflect::convert::record_into_value(self, __ctx, __ty, __path, __diags)
            }
        }
    };

    Ok(expanded)
}

/// Parse the single `#[tether(...)]` form on a field.
fn parse_field_tag(field: &syn::Field) -> Result<FieldTag, syn::Error> {
    let mut tags = Vec::new();

    for attr in &field.attrs {
        if !attr.path().is_ident("tether") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("attribute name must not be empty"));
                }
                tags.push(FieldTag::Name(value.value()));
            } else if meta.path.is_ident("skip") {
                tags.push(FieldTag::Skip);
            } else if meta.path.is_ident("embed") {
                tags.push(FieldTag::Embed);
            } else {
                return Err(
                    meta.error("unknown tether option (expected 'name', 'skip' or 'embed')")
                );
            }
            Ok(())
        })?;
    }

    let mut tags = tags.into_iter();
    match (tags.next(), tags.next()) {
        (Some(tag), None) => Ok(tag),
        (None, _) => Err(syn::Error::new_spanned(
            field,
            "missing #[tether(name = \"...\")], #[tether(skip)] or #[tether(embed)]",
        )),
        (Some(_), Some(_)) => Err(syn::Error::new_spanned(
            field,
            "a field takes exactly one of 'name', 'skip' or 'embed'",
        )),
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn rejection(input: DeriveInput) -> String {
        match derive_impl(&input) {
            Ok(_) => panic!("derive accepted invalid input"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn accepts_each_tag_form() {
        let input: DeriveInput = parse_quote! {
            struct Server {
                #[tether(name = "hostname")]
                hostname: String,
                #[tether(embed)]
                common: Common,
                #[tether(skip)]
                cache: u64,
            }
        };
        let tokens = derive_impl(&input).unwrap().to_string();
        assert!(tokens.contains("\"hostname\""), "{tokens}");
        assert!(tokens.contains("Embed"), "{tokens}");
        assert!(tokens.contains("Skip"), "{tokens}");
    }

    #[test]
    fn rejects_untagged_fields() {
        let err = rejection(parse_quote! {
            struct Server {
                hostname: String,
            }
        });
        assert!(err.starts_with("missing #[tether(name"), "{err}");
    }

    #[test]
    fn rejects_two_forms_on_one_field() {
        let err = rejection(parse_quote! {
            struct Server {
                #[tether(name = "hostname", skip)]
                hostname: String,
            }
        });
        assert_eq!(err, "a field takes exactly one of 'name', 'skip' or 'embed'");

        let err = rejection(parse_quote! {
            struct Server {
                #[tether(skip)]
                #[tether(embed)]
                common: Common,
            }
        });
        assert_eq!(err, "a field takes exactly one of 'name', 'skip' or 'embed'");
    }

    #[test]
    fn rejects_empty_names() {
        let err = rejection(parse_quote! {
            struct Server {
                #[tether(name = "")]
                hostname: String,
            }
        });
        assert_eq!(err, "attribute name must not be empty");
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = rejection(parse_quote! {
            struct Server {
                #[tether(name = "host")]
                hostname: String,
                #[tether(name = "host")]
                alias: String,
            }
        });
        assert_eq!(err, "duplicate attribute name 'host'");
    }

    #[test]
    fn rejects_unknown_options() {
        let err = rejection(parse_quote! {
            struct Server {
                #[tether(rename = "host")]
                hostname: String,
            }
        });
        assert!(err.starts_with("unknown tether option"), "{err}");
    }

    #[test]
    fn rejects_tuple_structs_and_enums() {
        let err = rejection(parse_quote! {
            struct Pair(String, u16);
        });
        assert_eq!(err, "Record only supports structs with named fields");

        let err = rejection(parse_quote! {
            enum Mode {
                Fast,
            }
        });
        assert_eq!(err, "Record only supports structs");
    }
}
