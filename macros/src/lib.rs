use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derives keyed row decoding: each field is looked up by column name and
/// decoded through the primitive codec, so a missing column reports the
/// field's name and extra columns are ignored. `#[column_name("...")]`
/// overrides the column a field reads from.
#[proc_macro_derive(FromRow, attributes(column_name))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as DeriveInput);
    let name = &item.ident;
    let Data::Struct(data) = &item.data else {
        panic!("FromRow can only be derived for structs");
    };
    let Fields::Named(fields) = &data.fields else {
        panic!("FromRow requires named fields");
    };
    let field_values = fields.named.iter().map(|field| {
        let ident = field
            .ident
            .as_ref()
            .expect("named fields have identifiers");
        let mut column = ident.to_string();
        for attr in &field.attrs {
            if attr.meta.path().is_ident("column_name") {
                let Ok(v) = attr.meta.require_list().and_then(|v| v.parse_args::<LitStr>())
                else {
                    panic!(
                        "error while parsing `column_name`, use it like `#[column_name(\"my_column\")]`"
                    );
                };
                column = v.value();
            }
        }
        quote! {
            #ident: row.decode_named(#column)?
        }
    });
    quote! {
        impl ::cistern::FromRow for #name {
            fn from_row(row: &::cistern::Row) -> ::cistern::Result<Self> {
                Ok(Self {
                    #(#field_values),*
                })
            }
        }
    }
    .into()
}
