#![recursion_limit = "128"]
extern crate proc_macro;
extern crate syn;
#[macro_use]
extern crate quote;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Implements `resident::Resource` for a struct carrying a field named `id`
/// (the identifier) and a field named `link` (the intrusive chain link).
/// When the `id` field's type is spelled `ChronoId`, a
/// `resident::ChronoResource` impl is emitted as well.
#[proc_macro_derive(Resource)]
pub fn resource(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as DeriveInput);
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    if let syn::Data::Struct(ref s) = item.data {
        let mut id_ty = None;
        let mut has_link = false;
        for field in s.fields.iter() {
            if let Some(ref ident) = field.ident {
                if ident == "id" {
                    id_ty = Some(field.ty.clone());
                } else if ident == "link" {
                    has_link = true;
                }
            }
        }
        let id_ty = match id_ty {
            Some(ty) => ty,
            None => panic!("#[derive(Resource)] needs a field named `id`"),
        };
        if !has_link {
            panic!("#[derive(Resource)] needs a field named `link`");
        }

        let chrono = if is_chrono_id(&id_ty) {
            quote! {
                impl #impl_generics ::resident::ChronoResource for #name #ty_generics #where_clause {
                    #[inline]
                    fn set_id(&mut self, id: ::resident::ChronoId) {
                        self.id = id;
                    }
                }
            }
        } else {
            quote! {}
        };

        let output = quote! {
            impl #impl_generics ::resident::Resource for #name #ty_generics #where_clause {
                type Id = #id_ty;
                #[inline]
                fn id(&self) -> &Self::Id {
                    &self.id
                }
                #[inline]
                fn link(&self) -> &::resident::Link<Self> {
                    &self.link
                }
                #[inline]
                fn link_mut(&mut self) -> &mut ::resident::Link<Self> {
                    &mut self.link
                }
            }
            #chrono
        };

        proc_macro::TokenStream::from(output)
    } else {
        panic!("#[derive(Resource)] only works for structs");
    }
}

fn is_chrono_id(ty: &syn::Type) -> bool {
    if let syn::Type::Path(ref p) = ty {
        p.path
            .segments
            .last()
            .map(|segment| segment.ident == "ChronoId")
            .unwrap_or(false)
    } else {
        false
    }
}
