//! Constructor descriptors for the weave injector
//!
//! Both macros emit an `impl ::weave::Injectable` listing the type's
//! constructors and submit a `ConstructorEntry` to `inventory`, so the type
//! becomes constructible by every injector in the binary.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{
    parse_macro_input, Attribute, DeriveInput, Fields, FnArg, GenericArgument, Ident, ImplItem,
    ImplItemFn, ItemImpl, PathArguments, ReturnType, Type,
};

/// Check if a field has the #[inject] attribute
fn has_inject_attr(field: &syn::Field) -> bool {
    field
        .attrs
        .iter()
        .any(|attr| attr.path().is_ident("inject"))
}

/// `T` out of `Arc<T>` (any path ending in `Arc`)
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Code shared by both macros: the trait impl plus its link-time entry
fn emit_injectable(target: &impl ToTokens, constructors: &[TokenStream2]) -> TokenStream2 {
    quote! {
        impl ::weave::Injectable for #target {
            fn constructors() -> ::std::vec::Vec<::weave::Constructor> {
                ::std::vec![#(#constructors),*]
            }
        }

        ::weave::inventory::submit! {
            ::weave::ConstructorEntry::of::<#target>()
        }
    }
}

/// Implements `#[derive(Injectable)]`
pub fn derive_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "Injectable cannot be derived for generic types",
        )
        .to_compile_error()
        .into();
    }

    let fields = match &input.data {
        syn::Data::Struct(data_struct) => &data_struct.fields,
        _ => {
            return syn::Error::new_spanned(&input, "Injectable can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };

    let constructor = match fields {
        Fields::Unit => quote! {
            ::weave::Constructor::new::<Self, _>(
                #name_str,
                ::std::vec::Vec::new(),
                |_args: &mut ::weave::Arguments| ::std::result::Result::Ok(Self),
            )
        },
        Fields::Named(fields_named) => {
            let mut params = Vec::new();
            let mut field_initializations = Vec::new();

            for field in &fields_named.named {
                let Some(field_name) = field.ident.as_ref() else {
                    continue;
                };

                if !has_inject_attr(field) {
                    field_initializations.push(quote! {
                        #field_name: ::std::default::Default::default()
                    });
                    continue;
                }

                let Some(inner) = arc_inner(&field.ty) else {
                    return syn::Error::new_spanned(
                        &field.ty,
                        "#[inject] fields must be of type Arc<T>",
                    )
                    .to_compile_error()
                    .into();
                };
                params.push(inner.clone());
                field_initializations.push(quote! {
                    #field_name: args.next::<#inner>()?
                });
            }

            let args = if params.is_empty() {
                quote!(_args)
            } else {
                quote!(args)
            };

            quote! {
                ::weave::Constructor::new::<Self, _>(
                    #name_str,
                    ::std::vec![#(::weave::TypeKey::of::<#params>()),*],
                    |#args: &mut ::weave::Arguments| {
                        ::std::result::Result::Ok(Self {
                            #(#field_initializations),*
                        })
                    },
                )
            }
        }
        Fields::Unnamed(_) => {
            return syn::Error::new_spanned(
                &input,
                "Injectable does not support tuple structs. Use named fields instead.",
            )
            .to_compile_error()
            .into()
        }
    };

    TokenStream::from(emit_injectable(name, &[constructor]))
}

/// Whether `attr` is `#[injectable(skip)]`; any other `#[injectable(..)]` is an error
fn is_skip_attr(attr: &Attribute) -> syn::Result<bool> {
    if !attr.path().is_ident("injectable") {
        return Ok(false);
    }
    let mut skip = false;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("skip") {
            skip = true;
            Ok(())
        } else {
            Err(meta.error("expected `skip`"))
        }
    })?;
    Ok(skip)
}

/// `Self` or the impl's own type name
fn is_self_type(ty: &Type, name: &Ident) -> bool {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .map(|s| s.ident == "Self" || s.ident == *name)
            .unwrap_or(false),
        _ => false,
    }
}

/// How a candidate constructor returns: `Some(false)` for `Self`,
/// `Some(true)` for `Result<Self, _>`, `None` when it is not a constructor
fn constructor_kind(output: &ReturnType, name: &Ident) -> Option<bool> {
    let ReturnType::Type(_, ty) = output else {
        return None;
    };
    if is_self_type(ty, name) {
        return Some(false);
    }

    let Type::Path(type_path) = ty.as_ref() else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(ok) if is_self_type(ok, name) => Some(true),
        _ => None,
    }
}

fn is_candidate(method: &ImplItemFn) -> syn::Result<bool> {
    for attr in &method.attrs {
        if is_skip_attr(attr)? {
            return Ok(false);
        }
    }
    Ok(matches!(method.vis, syn::Visibility::Public(_))
        && method.sig.receiver().is_none()
        && method.sig.generics.params.is_empty()
        && method.sig.asyncness.is_none())
}

fn constructor_for(
    method: &ImplItemFn,
    name: &Ident,
    fallible: bool,
) -> syn::Result<TokenStream2> {
    let fn_name = &method.sig.ident;
    let label = format!("{}::{}", name, fn_name);

    let mut params = Vec::new();
    for input in &method.sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        let inner = arc_inner(&pat_type.ty).ok_or_else(|| {
            syn::Error::new_spanned(
                &pat_type.ty,
                "injectable constructor parameters must be of type Arc<T>",
            )
        })?;
        params.push(inner.clone());
    }

    let args = if params.is_empty() {
        quote!(_args)
    } else {
        quote!(args)
    };
    let call = quote! {
        Self::#fn_name(#(args.next::<#params>()?),*)
    };
    let body = if fallible {
        quote!(#call.map_err(::std::convert::Into::into))
    } else {
        quote!(::std::result::Result::Ok(#call))
    };

    Ok(quote! {
        ::weave::Constructor::new::<Self, _>(
            #label,
            ::std::vec![#(::weave::TypeKey::of::<#params>()),*],
            |#args: &mut ::weave::Arguments| #body,
        )
    })
}

/// Implements `#[injectable]` on an inherent impl block
pub fn constructors_impl(attr: TokenStream, input: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[injectable] takes no arguments on an impl block",
        )
        .to_compile_error()
        .into();
    }

    let mut item_impl = parse_macro_input!(input as ItemImpl);

    if item_impl.trait_.is_some() {
        return syn::Error::new_spanned(
            &item_impl.self_ty,
            "#[injectable] goes on an inherent impl block, not a trait impl",
        )
        .to_compile_error()
        .into();
    }
    if !item_impl.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &item_impl.generics,
            "#[injectable] does not support generic types",
        )
        .to_compile_error()
        .into();
    }

    let name = match item_impl.self_ty.as_ref() {
        Type::Path(type_path) if type_path.qself.is_none() => {
            match type_path.path.segments.last() {
                Some(segment) => segment.ident.clone(),
                None => {
                    return syn::Error::new_spanned(&item_impl.self_ty, "expected a type name")
                        .to_compile_error()
                        .into()
                }
            }
        }
        _ => {
            return syn::Error::new_spanned(&item_impl.self_ty, "expected a type name")
                .to_compile_error()
                .into()
        }
    };

    let mut constructors = Vec::new();
    for item in &mut item_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let candidate = match is_candidate(method) {
            Ok(candidate) => candidate,
            Err(e) => return e.to_compile_error().into(),
        };
        if candidate {
            if let Some(fallible) = constructor_kind(&method.sig.output, &name) {
                match constructor_for(method, &name, fallible) {
                    Ok(constructor) => constructors.push(constructor),
                    Err(e) => return e.to_compile_error().into(),
                }
            }
        }

        // Strip #[injectable(skip)] so it doesn't reach the compiler
        method.attrs.retain(|attr| !attr.path().is_ident("injectable"));
    }

    if constructors.is_empty() {
        return syn::Error::new_spanned(
            &item_impl.self_ty,
            "#[injectable] found no public constructor returning Self or Result<Self, E>",
        )
        .to_compile_error()
        .into();
    }

    let injectable = emit_injectable(&item_impl.self_ty, &constructors);

    TokenStream::from(quote! {
        #item_impl
        #injectable
    })
}
