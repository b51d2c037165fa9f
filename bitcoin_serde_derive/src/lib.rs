//! Derive macros for the Bitcoin-style consensus codec traits.
//!
//! `#[derive(BtcSerialize)]` and `#[derive(BtcDeserialize)]` implement
//! `BitcoinSerialize` / `BitcoinDeserialize` for a struct by encoding its
//! fields in declaration order. The expanded code refers to the traits and
//! `SerializationError` by their unqualified names, so deriving types must
//! have them in scope.
//!
//! Enums are not supported: a variant tag is part of the wire format being
//! modeled, so enum codecs are always hand-written.

extern crate proc_macro;
use proc_macro::TokenStream;

mod deserialize;
mod serialize;

#[proc_macro_derive(BtcSerialize)]
pub fn derive_serialize(input: TokenStream) -> TokenStream {
    let ast = syn::parse(input).expect("BtcSerialize: could not parse derive input");
    serialize::impl_serialize(&ast)
}

#[proc_macro_derive(BtcDeserialize)]
pub fn derive_deserialize(input: TokenStream) -> TokenStream {
    let ast = syn::parse(input).expect("BtcDeserialize: could not parse derive input");
    deserialize::impl_deserialize(&ast)
}
