//! Procedural macros for the CRM backend
//!
//! This crate provides macros to reduce boilerplate in the CRM backend:
//!
//! - `mutation_result!` - Generate GraphQL mutation payload types

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, parse_macro_input, Ident, Token};

/// Generate a GraphQL mutation payload type carrying the created entity and
/// a list of validation errors.
///
/// # Usage
///
/// ```ignore
/// // Entity + errors
/// mutation_result!(CreateProductPayload, product: Product);
///
/// // Entity + success message + errors
/// mutation_result!(CreateCustomerPayload, customer: Customer, message);
/// ```
///
/// # Generated Code
///
/// For `mutation_result!(CreateProductPayload, product: Product)`:
///
/// ```ignore
/// #[derive(Debug, Clone, async_graphql::SimpleObject)]
/// pub struct CreateProductPayload {
///     pub product: Option<Product>,
///     pub errors: Vec<String>,
/// }
///
/// impl CreateProductPayload {
///     pub fn created(product: Product) -> Self {
///         Self { product: Some(product), errors: Vec::new() }
///     }
///     pub fn rejected(errors: Vec<String>) -> Self {
///         Self { product: None, errors }
///     }
/// }
/// ```
#[proc_macro]
pub fn mutation_result(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as MutationResultInput);

    let struct_name = &parsed.name;
    let field_name = &parsed.field_name;
    let field_type = &parsed.field_type;

    let output = if parsed.with_message {
        quote! {
            #[derive(Debug, Clone, async_graphql::SimpleObject)]
            pub struct #struct_name {
                pub #field_name: Option<#field_type>,
                pub message: Option<String>,
                pub errors: Vec<String>,
            }

            impl #struct_name {
                pub fn created(#field_name: #field_type, message: impl Into<String>) -> Self {
                    Self {
                        #field_name: Some(#field_name),
                        message: Some(message.into()),
                        errors: Vec::new(),
                    }
                }

                pub fn rejected(errors: Vec<String>) -> Self {
                    Self {
                        #field_name: None,
                        message: None,
                        errors,
                    }
                }
            }
        }
    } else {
        quote! {
            #[derive(Debug, Clone, async_graphql::SimpleObject)]
            pub struct #struct_name {
                pub #field_name: Option<#field_type>,
                pub errors: Vec<String>,
            }

            impl #struct_name {
                pub fn created(#field_name: #field_type) -> Self {
                    Self {
                        #field_name: Some(#field_name),
                        errors: Vec::new(),
                    }
                }

                pub fn rejected(errors: Vec<String>) -> Self {
                    Self {
                        #field_name: None,
                        errors,
                    }
                }
            }
        }
    };
    output.into()
}

/// Input for mutation_result! macro
struct MutationResultInput {
    name: Ident,
    field_name: Ident,
    field_type: Ident,
    with_message: bool,
}

impl Parse for MutationResultInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![,]>()?;
        let field_name: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let field_type: Ident = input.parse()?;

        let with_message = if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let flag: Ident = input.parse()?;
            if flag != "message" {
                return Err(syn::Error::new(flag.span(), "expected `message`"));
            }
            true
        } else {
            false
        };

        Ok(MutationResultInput {
            name,
            field_name,
            field_type,
            with_message,
        })
    }
}
