//! Service trait macro for the weave injector
//!
//! Provides the `#[service]` attribute macro that:
//! 1. Adds `Send + Sync + 'static` bounds to trait definitions
//! 2. Declares the listed implementations usable as `dyn Trait`

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, ItemTrait, Path, Token};

/// Parsed arguments from the service attribute
struct ServiceArgs {
    implementations: Punctuated<Path, Token![,]>,
}

impl Parse for ServiceArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(ServiceArgs {
            implementations: Punctuated::parse_terminated(input)?,
        })
    }
}

fn has_trait_bound(item_trait: &ItemTrait, name: &str) -> bool {
    item_trait.supertraits.iter().any(|bound| {
        if let syn::TypeParamBound::Trait(trait_bound) = bound {
            trait_bound
                .path
                .segments
                .last()
                .map(|s| s.ident == name)
                .unwrap_or(false)
        } else {
            false
        }
    })
}

/// Implements the `#[service]` attribute macro
pub fn service_impl(attr: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ServiceArgs);
    let mut item_trait = parse_macro_input!(input as ItemTrait);

    if !args.implementations.is_empty() && !item_trait.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &item_trait.generics,
            "service implementations cannot be listed for a generic trait",
        )
        .to_compile_error()
        .into();
    }

    // Add Send + Sync + 'static to the trait's supertraits
    if !has_trait_bound(&item_trait, "Send") {
        item_trait.supertraits.push(syn::parse_quote!(Send));
    }
    if !has_trait_bound(&item_trait, "Sync") {
        item_trait.supertraits.push(syn::parse_quote!(Sync));
    }
    let has_static = item_trait
        .supertraits
        .iter()
        .any(|bound| matches!(bound, syn::TypeParamBound::Lifetime(lt) if lt.ident == "static"));
    if !has_static {
        item_trait.supertraits.push(syn::parse_quote!('static));
    }

    let trait_name = &item_trait.ident;
    let upcasts = args.implementations.iter().map(|concrete_type| {
        quote! {
            ::weave::implements!(#concrete_type => dyn #trait_name);
        }
    });

    TokenStream::from(quote! {
        #item_trait
        #(#upcasts)*
    })
}
