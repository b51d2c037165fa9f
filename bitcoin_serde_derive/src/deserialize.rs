use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, Fields};

pub fn impl_deserialize(ast: &syn::DeriveInput) -> TokenStream {
    let name = &ast.ident;

    let data = match &ast.data {
        Data::Struct(data) => data,
        _ => panic!("BtcDeserialize can only be derived for structs"),
    };

    let expanded = match &data.fields {
        Fields::Named(fields) => {
            let reads: Vec<TokenStream2> = fields
                .named
                .iter()
                .map(|field| {
                    let ident = field.ident.as_ref().expect("named field has an identifier");
                    let ty = &field.ty;
                    quote! { #ident: <#ty as BitcoinDeserialize>::bitcoin_deserialize(&mut reader)?, }
                })
                .collect();

            quote! {
                impl BitcoinDeserialize for #name {
                    fn bitcoin_deserialize<R: std::io::Read>(mut reader: R) -> Result<Self, SerializationError> {
                        Ok(#name {
                            #(#reads)*
                        })
                    }
                }
            }
        }
        Fields::Unnamed(fields) => {
            let reads: Vec<TokenStream2> = fields
                .unnamed
                .iter()
                .map(|field| {
                    let ty = &field.ty;
                    quote! { <#ty as BitcoinDeserialize>::bitcoin_deserialize(&mut reader)?, }
                })
                .collect();

            quote! {
                impl BitcoinDeserialize for #name {
                    fn bitcoin_deserialize<R: std::io::Read>(mut reader: R) -> Result<Self, SerializationError> {
                        Ok(#name (
                            #(#reads)*
                        ))
                    }
                }
            }
        }
        Fields::Unit => quote! {
            impl BitcoinDeserialize for #name {
                fn bitcoin_deserialize<R: std::io::Read>(_reader: R) -> Result<Self, SerializationError> {
                    Ok(#name)
                }
            }
        },
    };

    TokenStream::from(expanded)
}
