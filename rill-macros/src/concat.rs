//! Concat derive macro implementation.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Index, LitStr, Member, Path};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Policy {
    Last,
    Append,
    Nested,
}

fn field_policy(field: &Field) -> syn::Result<Policy> {
    let mut policy = Policy::Last;
    for attr in &field.attrs {
        if !attr.path().is_ident("concat") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("append") {
                policy = Policy::Append;
            } else if meta.path.is_ident("nested") {
                policy = Policy::Nested;
            } else if meta.path.is_ident("last") {
                policy = Policy::Last;
            } else {
                return Err(meta.error("unknown `concat` attribute, expected `append`, `nested` or `last`"));
            }
            Ok(())
        })?;
    }
    Ok(policy)
}

/// Path of the crate that hosts `concat`, from `#[concat(crate = path)]` on
/// the struct, or `default` when absent.
fn crate_path(input: &DeriveInput, default: &str) -> syn::Result<Path> {
    let mut path = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("concat") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("crate") {
                return Err(meta.error("unknown `concat` container attribute, expected `crate`"));
            }
            let value = meta.value()?;
            path = Some(if value.peek(LitStr) {
                value.parse::<LitStr>()?.parse::<Path>()?
            } else {
                value.parse::<Path>()?
            });
            Ok(())
        })?;
    }
    match path {
        Some(path) => Ok(path),
        None => syn::parse_str(default),
    }
}

/// Implementation for `#[derive(Concat)]`, with `default_crate` naming the
/// crate that hosts `concat` unless the struct overrides it.
pub fn derive_concat_impl(input: TokenStream, default_crate: &str) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match crate_path(&input, default_crate).and_then(|krate| expand(&input, &krate)) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput, krate: &Path) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let kind = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Concat can only be derived for structs",
            ))
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Concat cannot be derived for unions",
            ))
        }
    };

    let mut reductions = Vec::new();
    let mut bindings = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(i)),
        };
        let var = format_ident!("__field_{}", i);
        let ty = &field.ty;

        let reduction = match field_policy(field)? {
            Policy::Nested => quote! {
                let #var = <#ty as #krate::concat::Concat>::concat_refs(
                    &chunks.iter().map(|c| &c.#member).collect::<::std::vec::Vec<_>>(),
                )?;
            },
            Policy::Append => quote! {
                let mut #var = ::std::clone::Clone::clone(&first.#member);
                for c in rest {
                    #krate::concat::policy::append(&mut #var, &c.#member);
                }
            },
            Policy::Last => quote! {
                let mut #var = ::std::clone::Clone::clone(&first.#member);
                for c in rest {
                    #krate::concat::policy::last_non_empty(&mut #var, &c.#member);
                }
            },
        };
        reductions.push(reduction);
        bindings.push((member, var));
    }

    let construct = match fields {
        Fields::Named(_) => {
            let pairs = bindings.iter().map(|(member, var)| quote! { #member: #var });
            quote! { Self { #(#pairs),* } }
        }
        Fields::Unnamed(_) => {
            let vars = bindings.iter().map(|(_, var)| var);
            quote! { Self( #(#vars),* ) }
        }
        Fields::Unit => quote! { Self },
    };

    Ok(quote! {
        impl #impl_generics #krate::concat::Concat for #name #ty_generics #where_clause {
            const KIND: &'static str = #kind;

            #[allow(unused_variables)]
            fn concat_refs(chunks: &[&Self]) -> #krate::errors::ConcatResult<Self> {
                let ::std::option::Option::Some((first, rest)) = chunks.split_first() else {
                    return ::std::result::Result::Err(
                        #krate::errors::ConcatError::empty_input(#kind),
                    );
                };
                #(#reductions)*
                ::std::result::Result::Ok(#construct)
            }
        }
    })
}
