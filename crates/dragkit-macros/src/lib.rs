//! Proc-macros for dragkit.
//!
//! `#[derive(WithBuilders)]` generates a `with_<field>(...)` method for every
//! named field of a configuration struct.
//!
//! ## Field control
//! - `#[with_builders(skip)]` leaves the field out. Use it for fields that get a
//!   hand-written setter (closures, for instance).
//! - Fields typed `Option<T>` get a setter that takes `T` and stores `Some(value)`.
//!
//! ### Example
//! ```ignore
//! use dragkit_macros::WithBuilders;
//!
//! #[derive(Clone, Default, WithBuilders)]
//! pub struct Flags {
//!     pub prevent_default: bool,
//!     pub label: Option<String>,
//!     #[with_builders(skip)]
//!     pub internal: u32,
//! }
//!
//! let flags = Flags::default()
//!     .with_prevent_default(true)
//!     .with_label("grip".to_string());
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, Data, DeriveInput, Fields, GenericArgument,
    PathArguments, Type,
};

/// Derive that generates `with_<field>` builder methods for structs with named fields.
///
/// Generated methods take `self` by value and return `Self`.
#[proc_macro_derive(WithBuilders, attributes(with_builders))]
pub fn derive_with_builders(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let ident = &input.ident;
    let generics = &input.generics;

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "#[derive(WithBuilders)] only supports structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(fields_named) = &data_struct.fields else {
        return syn::Error::new(
            data_struct.fields.span(),
            "#[derive(WithBuilders)] only supports structs with named fields",
        )
        .to_compile_error()
        .into();
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut methods = Vec::with_capacity(fields_named.named.len());
    for field in fields_named.named.iter() {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };

        if has_skip(field) {
            continue;
        }

        let method_ident = format_ident!("with_{}", field_ident);

        let method = match option_inner(&field.ty) {
            Some(inner_ty) => quote! {
                #[inline]
                pub fn #method_ident(mut self, value: #inner_ty) -> Self {
                    self.#field_ident = ::core::option::Option::Some(value);
                    self
                }
            },
            None => {
                let field_ty = &field.ty;
                quote! {
                    #[inline]
                    pub fn #method_ident(mut self, value: #field_ty) -> Self {
                        self.#field_ident = value;
                        self
                    }
                }
            }
        };
        methods.push(method);
    }

    quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#methods)*
        }
    }
    .into()
}

/// `T` when `ty` is spelled `Option<T>` (or a path ending in `Option<T>`).
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }

    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }

    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn has_skip(field: &syn::Field) -> bool {
    field
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("with_builders"))
        .any(|attr| {
            let mut skip = false;
            // Unknown nested items are ignored.
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                }
                Ok(())
            });
            skip
        })
}
