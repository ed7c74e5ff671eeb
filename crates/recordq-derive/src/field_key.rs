use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::BTreeMap;
use syn::{Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr};

// derive_field_key
pub fn derive_field_key(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

///
/// KeyVariant
///

struct KeyVariant {
    ident: Ident,
    name: String,
}

fn expand(input: &DeriveInput) -> Result<TokenStream, Error> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data) = &input.data else {
        return Err(Error::new_spanned(
            ident,
            "FieldKey can only be derived for field-less enums",
        ));
    };

    if data.variants.is_empty() {
        return Err(Error::new_spanned(
            ident,
            "FieldKey requires at least one variant",
        ));
    }

    let mut variants = Vec::with_capacity(data.variants.len());
    let mut seen: BTreeMap<String, Ident> = BTreeMap::new();

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new_spanned(
                &variant.fields,
                "FieldKey variants cannot carry data",
            ));
        }

        let name = match rename(&variant.attrs)? {
            Some(name) => name,
            None => variant.ident.to_string().to_case(Case::Snake),
        };

        if let Some(previous) = seen.get(&name) {
            return Err(Error::new_spanned(
                &variant.ident,
                format!("field key name '{name}' is already used by variant `{previous}`"),
            ));
        }
        seen.insert(name.clone(), variant.ident.clone());

        variants.push(KeyVariant {
            ident: variant.ident.clone(),
            name,
        });
    }

    let all = variants.iter().map(|v| {
        let variant = &v.ident;
        quote!(Self::#variant)
    });

    let to_name_arms = variants.iter().map(|v| {
        let variant = &v.ident;
        let name = &v.name;
        quote!(Self::#variant => #name,)
    });

    let from_name_arms = variants.iter().map(|v| {
        let variant = &v.ident;
        let name = &v.name;
        quote!(#name => ::core::option::Option::Some(Self::#variant),)
    });

    Ok(quote! {
        impl #impl_generics ::recordq::key::FieldKey for #ident #ty_generics #where_clause {
            const ALL: &'static [Self] = &[#(#all),*];

            fn string_value(self) -> &'static str {
                match self {
                    #(#to_name_arms)*
                }
            }

            fn from_string_value(value: &str) -> ::core::option::Option<Self> {
                match value {
                    #(#from_name_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

// rename
// reads `#[key(rename = "...")]`
fn rename(attrs: &[Attribute]) -> Result<Option<String>, Error> {
    let mut name = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("key")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(meta.error("field key name cannot be empty"));
                }
                name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported key attribute, expected `rename`"))
            }
        })?;
    }

    Ok(name)
}
