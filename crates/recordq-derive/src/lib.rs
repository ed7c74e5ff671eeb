use proc_macro::TokenStream;

mod field_key;

/// Derive `FieldKey` for a field-less enum naming the fields of one entity.
///
/// Wire names default to the snake_case variant name; override one with
/// `#[key(rename = "...")]`. Duplicate wire names are a compile error.
#[proc_macro_derive(FieldKey, attributes(key))]
pub fn derive_field_key(input: TokenStream) -> TokenStream {
    field_key::derive_field_key(input.into()).into()
}
