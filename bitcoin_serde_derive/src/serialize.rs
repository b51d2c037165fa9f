use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, Index};

pub fn impl_serialize(ast: &syn::DeriveInput) -> TokenStream {
    let name = &ast.ident;

    let data = match &ast.data {
        Data::Struct(data) => data,
        _ => panic!("BtcSerialize can only be derived for structs"),
    };

    let writes: Vec<TokenStream2> = data
        .fields
        .iter()
        .enumerate()
        .map(|(position, field)| match &field.ident {
            Some(ident) => quote! { self.#ident.bitcoin_serialize(&mut target)?; },
            None => {
                let index = Index::from(position);
                quote! { self.#index.bitcoin_serialize(&mut target)?; }
            }
        })
        .collect();

    let expanded = quote! {
        impl BitcoinSerialize for #name {
            fn bitcoin_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
            where
                W: std::io::Write,
            {
                #(#writes)*
                Ok(())
            }
        }
    };

    TokenStream::from(expanded)
}
