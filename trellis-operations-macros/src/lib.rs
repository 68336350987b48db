//! Procedural macros for defining board operations
//!
//! `#[operation]` derives the `Operation` metadata impl (intent tag, entity
//! noun, description, parameter table) from the struct definition, so the
//! fields of a command struct are the single source of truth for its wire
//! shape.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Attribute, DeriveInput, Expr, Field, Ident, Lit, Meta, Token, Type,
};

/// Attribute macro for defining an operation
///
/// # Usage
///
/// ```ignore
/// #[operation(intent = "updateColumn", entity = "column", description = "Rename a column")]
/// #[derive(Debug, Deserialize, Serialize)]
/// #[serde(rename_all = "camelCase")]
/// pub struct UpdateColumn {
///     /// The column to rename
///     pub column_id: ColumnId,
///     /// The new name
///     pub name: String,
/// }
/// ```
///
/// Parameter wire names are the camelCase form of the field name.
#[proc_macro_attribute]
pub fn operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as OperationArgs);
    let input = parse_macro_input!(item as DeriveInput);

    let name = input.ident.clone();
    let intent = &args.intent;
    let entity = &args.entity;
    let description = &args.description;

    let param_metas: Vec<_> = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => fields.named.iter().map(generate_param_meta).collect(),
            syn::Fields::Unit => Vec::new(),
            syn::Fields::Unnamed(_) => {
                return syn::Error::new_spanned(&name, "operation macro does not support tuple structs")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&name, "operation macro only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let num_params = param_metas.len();

    let expanded = quote! {
        #input

        impl #name {
            /// Parameter table for this operation, available before an instance exists
            pub const PARAMS: [trellis_operations::ParamMeta; #num_params] = [
                #(#param_metas),*
            ];
        }

        impl trellis_operations::Operation for #name {
            fn intent(&self) -> &'static str {
                #intent
            }

            fn entity(&self) -> &'static str {
                #entity
            }

            fn description(&self) -> &'static str {
                #description
            }

            fn parameters(&self) -> &'static [trellis_operations::ParamMeta] {
                &Self::PARAMS
            }
        }
    };

    TokenStream::from(expanded)
}

/// Arguments for the #[operation(...)] attribute
struct OperationArgs {
    intent: String,
    entity: String,
    description: String,
}

impl Parse for OperationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut intent = None;
        let mut entity = None;
        let mut description = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let value: Lit = input.parse()?;

            let value_str = match value {
                Lit::Str(s) => s.value(),
                _ => return Err(syn::Error::new_spanned(value, "expected string literal")),
            };

            match ident.to_string().as_str() {
                "intent" => intent = Some(value_str),
                "entity" => entity = Some(value_str),
                "description" => description = Some(value_str),
                other => {
                    return Err(syn::Error::new_spanned(
                        ident,
                        format!("unknown attribute: {}", other),
                    ))
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(OperationArgs {
            intent: intent.ok_or_else(|| input.error("missing 'intent' attribute"))?,
            entity: entity.ok_or_else(|| input.error("missing 'entity' attribute"))?,
            description: description
                .ok_or_else(|| input.error("missing 'description' attribute"))?,
        })
    }
}

/// Generate ParamMeta for a field
fn generate_param_meta(field: &Field) -> proc_macro2::TokenStream {
    let field_name = field
        .ident
        .as_ref()
        .map(|ident| ident.to_string())
        .unwrap_or_default();

    let description = extract_doc_comment(&field.attrs);
    let required = !is_option_type(&field.ty) && !has_serde_default(&field.attrs);
    let param_type = rust_type_to_param_type(&field.ty);
    let wire_name = to_camel_case(&field_name);

    let required_call = if required {
        quote! { .required() }
    } else {
        quote! {}
    };

    quote! {
        trellis_operations::ParamMeta::new(#wire_name)
            .description(#description)
            .param_type(#param_type)
            #required_call
    }
}

/// snake_case field name to camelCase wire name
fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Extract doc comment from attributes
fn extract_doc_comment(attrs: &[Attribute]) -> String {
    let docs: Vec<String> = attrs
        .iter()
        .filter_map(|attr| {
            if attr.path().is_ident("doc") {
                if let Meta::NameValue(nv) = &attr.meta {
                    if let Expr::Lit(lit) = &nv.value {
                        if let Lit::Str(s) = &lit.lit {
                            return Some(s.value().trim().to_string());
                        }
                    }
                }
            }
            None
        })
        .collect();

    docs.join(" ")
}

/// Check if type is Option<T>
fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}

/// Fields carrying `#[serde(default)]` may be omitted on the wire
fn has_serde_default(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        if !attr.path().is_ident("serde") {
            return false;
        }
        let mut found = false;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                found = true;
            }
            if meta.input.peek(Token![=]) {
                meta.input.parse::<Token![=]>()?;
                let _: Lit = meta.input.parse()?;
            }
            Ok(())
        });
        found
    })
}

/// Convert Rust type to ParamType
fn rust_type_to_param_type(ty: &Type) -> proc_macro2::TokenStream {
    if let Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if segment.ident == "Option" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return rust_type_to_param_type(inner);
                    }
                }
            } else if segment.ident == "Vec" {
                return quote! { trellis_operations::ParamType::Array };
            } else if segment.ident == "bool" {
                return quote! { trellis_operations::ParamType::Boolean };
            } else if segment.ident == "i32"
                || segment.ident == "i64"
                || segment.ident == "u32"
                || segment.ident == "u64"
                || segment.ident == "usize"
                || segment.ident == "isize"
            {
                return quote! { trellis_operations::ParamType::Integer };
            } else if segment.ident == "f32" || segment.ident == "f64" {
                return quote! { trellis_operations::ParamType::Number };
            }
        }
    }
    // Strings and id newtypes
    quote! { trellis_operations::ParamType::String }
}
