use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, Attribute, DeriveInput, Expr, ExprLit, FnArg,
    GenericArgument, Ident, ImplItem, ImplItemFn, ItemImpl, Lit, Meta, Pat, PathArguments,
    ReturnType, Type, Visibility,
};

/// Registers every `pub async fn(&self, ..)` of an inherent impl block as an
/// operation of the resource.
///
/// The method's doc comment becomes the tool description and each parameter
/// type is described through `Describe`. A parameter marked
/// `#[default(expr)]` is optional to callers, and so is an `Option<T>`
/// parameter, which receives `None` when omitted. A `Result<T, E>` return
/// maps `E` into `InvocationError`.
///
/// # Example
/// ```ignore
/// #[resource]
/// impl Memories {
///     /// Query memories similar to the given content.
///     pub async fn query_memory(&self, form_data: QueryMemoryForm) -> Result<Value, ClientError> {
///         // Implementation
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn resource(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(Span::call_site(), "#[resource] takes no arguments")
            .to_compile_error()
            .into();
    }

    let mut impl_block = parse_macro_input!(item as ItemImpl);
    match expand_resource(&mut impl_block) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Implements `Describe`, `FromTypedValue` and `IntoTypedValue` for a
/// structured record. The type must also derive `Serialize`, `Deserialize`
/// and `JsonSchema`.
#[proc_macro_derive(Record)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics owui_mcp::Describe for #name #ty_generics #where_clause {
            fn describe() -> owui_mcp::TypeDescriptor {
                owui_mcp::TypeDescriptor::Record(owui_mcp::RecordType::of::<Self>())
            }
        }

        impl #impl_generics owui_mcp::FromTypedValue for #name #ty_generics #where_clause {
            fn from_typed_value(
                value: owui_mcp::TypedValue,
            ) -> ::std::result::Result<Self, owui_mcp::DecodeError> {
                owui_mcp::value::record_from_typed_value(value)
            }
        }

        impl #impl_generics owui_mcp::IntoTypedValue for #name #ty_generics #where_clause {
            fn into_typed_value(self) -> owui_mcp::TypedValue {
                owui_mcp::TypedValue::Record(::std::boxed::Box::new(self))
            }
        }
    };

    TokenStream::from(expanded)
}

struct Param {
    ident: Ident,
    name: String,
    ty: Type,
    default: Option<Expr>,
}

enum Output {
    Unit,
    Plain(Type),
    Fallible(Type),
}

struct Method {
    ident: Ident,
    doc: Option<String>,
    params: Vec<Param>,
    output: Output,
}

fn expand_resource(impl_block: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if impl_block.trait_.is_some() {
        return Err(syn::Error::new(
            impl_block.span(),
            "#[resource] must be applied to an inherent impl block",
        ));
    }
    if !impl_block.generics.params.is_empty() {
        return Err(syn::Error::new(
            impl_block.generics.span(),
            "#[resource] does not support generic resources",
        ));
    }

    let self_ty = (*impl_block.self_ty).clone();
    let struct_name = match &self_ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.clone()),
        _ => None,
    }
    .ok_or_else(|| syn::Error::new(self_ty.span(), "#[resource] requires a named type"))?;

    let mut methods = Vec::new();
    for item in &mut impl_block.items {
        if let ImplItem::Fn(method) = item {
            if is_operation(method) {
                methods.push(parse_method(method)?);
            }
        }
    }

    let operations = methods
        .iter()
        .map(|method| expand_operation(&struct_name, &self_ty, method));
    let constructors = methods.iter().map(|method| {
        let op = operation_ident(&struct_name, &method.ident);
        quote! {
            ::std::sync::Arc::new(#op(::std::sync::Arc::clone(&self)))
                as ::std::sync::Arc<dyn owui_mcp::Operation>
        }
    });

    Ok(quote! {
        #impl_block

        #(#operations)*

        impl owui_mcp::Resource for #self_ty {
            fn operations(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::vec::Vec<::std::sync::Arc<dyn owui_mcp::Operation>> {
                vec![#(#constructors),*]
            }
        }
    })
}

fn is_operation(method: &ImplItemFn) -> bool {
    matches!(method.vis, Visibility::Public(_))
        && method.sig.asyncness.is_some()
        && matches!(
            method.sig.inputs.first(),
            Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
        )
}

fn parse_method(method: &mut ImplItemFn) -> syn::Result<Method> {
    let doc = doc_string(&method.attrs);

    let mut params = Vec::new();
    for arg in method.sig.inputs.iter_mut().skip(1) {
        let FnArg::Typed(pat_type) = arg else {
            continue;
        };
        let ident = match &*pat_type.pat {
            Pat::Ident(pat) => pat.ident.clone(),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "operation parameters must be plain identifiers",
                ))
            }
        };

        // `#[default]` is ours; strip it so the method itself still compiles.
        let mut default = None;
        let mut kept = Vec::new();
        for attr in pat_type.attrs.drain(..) {
            if attr.path().is_ident("default") {
                default = Some(attr.parse_args::<Expr>()?);
            } else {
                kept.push(attr);
            }
        }
        pat_type.attrs = kept;

        let name = ident.to_string().trim_start_matches("r#").to_string();
        params.push(Param {
            ident,
            name,
            ty: (*pat_type.ty).clone(),
            default,
        });
    }

    let output = match &method.sig.output {
        ReturnType::Default => Output::Unit,
        ReturnType::Type(_, ty) => match extract_result_ok_type(ty) {
            Some(ok) => Output::Fallible(ok.clone()),
            None => Output::Plain((**ty).clone()),
        },
    };

    Ok(Method {
        ident: method.sig.ident.clone(),
        doc,
        params,
        output,
    })
}

fn expand_operation(struct_name: &Ident, self_ty: &Type, method: &Method) -> TokenStream2 {
    let op = operation_ident(struct_name, &method.ident);
    let method_ident = &method.ident;
    let name = method_ident.to_string();

    let doc = match &method.doc {
        Some(doc) => quote! { ::std::option::Option::Some(#doc.to_string()) },
        None => quote! { ::std::option::Option::None },
    };

    let parameters = method.params.iter().map(|param| {
        let name = &param.name;
        let ty = &param.ty;
        let parameter = quote! {
            owui_mcp::Parameter::new(#name, <#ty as owui_mcp::Describe>::describe())
        };
        if param.default.is_some() {
            quote! { #parameter.with_default() }
        } else {
            parameter
        }
    });

    let bindings = method.params.iter().map(|param| {
        let ident = &param.ident;
        let name = &param.name;
        let ty = &param.ty;
        match &param.default {
            Some(expr) => quote! { let #ident: #ty = args.take_or_else(#name, || #expr)?; },
            None => quote! { let #ident: #ty = args.take(#name)?; },
        }
    });

    let idents = method.params.iter().map(|param| &param.ident);
    let call = quote! { self.0.#method_ident(#(#idents),*).await };

    let (returns, output) = match &method.output {
        Output::Unit => (quote! { () }, call),
        Output::Plain(ty) => (quote! { #ty }, call),
        Output::Fallible(ty) => (
            quote! { #ty },
            quote! { #call.map_err(::std::convert::Into::<owui_mcp::InvocationError>::into)? },
        ),
    };

    quote! {
        #[allow(non_camel_case_types)]
        #[doc(hidden)]
        struct #op(::std::sync::Arc<#self_ty>);

        #[owui_mcp::__private::async_trait]
        impl owui_mcp::Operation for #op {
            fn name(&self) -> &str {
                #name
            }

            fn doc(&self) -> ::std::option::Option<::std::string::String> {
                #doc
            }

            fn parameters(
                &self,
            ) -> ::std::result::Result<::std::vec::Vec<owui_mcp::Parameter>, owui_mcp::DiscoveryError> {
                ::std::result::Result::Ok(vec![#(#parameters),*])
            }

            fn returns(&self) -> owui_mcp::TypeDescriptor {
                <#returns as owui_mcp::Describe>::describe()
            }

            #[allow(unused_mut, unused_variables)]
            async fn call(
                &self,
                mut args: owui_mcp::Arguments,
            ) -> ::std::result::Result<owui_mcp::TypedValue, owui_mcp::InvocationError> {
                #(#bindings)*
                let output = #output;
                ::std::result::Result::Ok(owui_mcp::IntoTypedValue::into_typed_value(output))
            }
        }
    }
}

fn operation_ident(struct_name: &Ident, method: &Ident) -> Ident {
    format_ident!("__{}_{}", struct_name, method)
}

/// Joined `///` lines, or `None` when there are none.
fn doc_string(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').unwrap_or(&line).trim_end().to_string())
        .collect();

    let doc = lines.join("\n").trim().to_string();
    (!doc.is_empty()).then_some(doc)
}

/// Extract the Ok type from Result<T, E>
fn extract_result_ok_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Result" {
            if let PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(GenericArgument::Type(ok_type)) = args.args.first() {
                    return Some(ok_type);
                }
            }
        }
    }
    None
}
