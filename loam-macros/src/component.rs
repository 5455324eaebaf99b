//! `#[derive(Component)]`
//!
//! Expands a struct into a `loam_ioc::ir::ComponentDefinition` submitted to
//! `inventory`. `#[autowired]` fields become this component's dependency
//! edges; everything else about the definition (scope, ordering,
//! qualifiers, conditions, `@DependsOn`) comes from attributes on the
//! struct itself.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Error, Field, Fields, FieldsNamed, GenericArgument, Ident,
    LitInt, LitStr, PathArguments, Type,
};

/// How an `#[autowired]` field wants its dependency delivered
enum FieldWrapper {
    Direct,
    Optional,
}

struct AutowiredField {
    field: Field,
    inner_type: Type,
    wrapper: FieldWrapper,
    qualifier: Option<String>,
}

/// Parsed `#[component(...)]` attribute content
#[derive(Default)]
struct ComponentAttr {
    name: Option<String>,
    scope: Option<String>,
    primary: bool,
    lazy: bool,
    order: i32,
    destroy_order: i32,
    qualifier: Option<String>,
    field_injection: bool,
    depends_on: Vec<String>,
    /// Traits declared via `#[component(implements(Trait1, Trait2))]`
    implements: Vec<syn::Path>,
    /// `#[component(lifecycle)]` — a plain `Lifecycle` bean
    lifecycle: bool,
    /// `#[component(smart_lifecycle)]`/`#[component(smart_lifecycle(phase = N))]`
    smart_lifecycle: bool,
    lifecycle_phase: i32,
    /// `#[component(initializing_bean)]`
    initializing_bean: bool,
    /// Bare `#[post_construct]` struct attribute
    post_construct: bool,
    /// Bare `#[pre_destroy]` struct attribute
    pre_destroy: bool,
}

pub(crate) fn impl_component_derive(ast: &DeriveInput) -> TokenStream {
    let struct_name = &ast.ident;

    let fields = match validate_struct_input(ast) {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error(),
    };

    let component_attr = match parse_component_attr(&ast.attrs) {
        Ok(attr) => attr,
        Err(err) => return err.to_compile_error(),
    };

    let conditions = match parse_conditions(&ast.attrs) {
        Ok(conditions) => conditions,
        Err(err) => return err.to_compile_error(),
    };

    let (autowired, plain) = match partition_fields(fields) {
        Ok(partitioned) => partitioned,
        Err(err) => return err.to_compile_error(),
    };

    match expand(struct_name, &component_attr, &conditions, &autowired, &plain) {
        Ok(expanded) => expanded,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(
    struct_name: &Ident,
    attr: &ComponentAttr,
    conditions: &[TokenStream],
    autowired: &[AutowiredField],
    plain: &[Field],
) -> Result<TokenStream, Error> {
    let field_names: Vec<&Ident> = autowired
        .iter()
        .map(|f| f.field.ident.as_ref().unwrap())
        .collect();
    let inner_types: Vec<&Type> = autowired.iter().map(|f| &f.inner_type).collect();

    let plain_initializers: Vec<TokenStream> = plain
        .iter()
        .map(|f| {
            let name = f.ident.as_ref().unwrap();
            if is_optional_field(&f.ty) {
                quote! { #name: None }
            } else {
                quote! { #name: Default::default() }
            }
        })
        .collect();

    let field_extractions: Vec<TokenStream> = autowired
        .iter()
        .map(|f| {
            let name = f.field.ident.as_ref().unwrap();
            let ty = &f.inner_type;
            match f.wrapper {
                FieldWrapper::Direct => quote! {
                    let #name: std::sync::Arc<#ty> = deps
                        .get(&std::any::TypeId::of::<#ty>())
                        .cloned()
                        .ok_or_else(|| ::loam_core::error::component::ComponentError::DependencyNotFound(
                            format!("dependency '{}' not found for {}", stringify!(#ty), stringify!(#struct_name))
                        ))?
                        .downcast::<#ty>()
                        .map_err(|_| ::loam_core::error::component::ComponentError::DowncastFailed(
                            format!("failed to downcast dependency '{}'", stringify!(#ty))
                        ))?;
                },
                FieldWrapper::Optional => quote! {
                    let #name: Option<std::sync::Arc<#ty>> = deps
                        .get(&std::any::TypeId::of::<#ty>())
                        .cloned()
                        .and_then(|instance| instance.downcast::<#ty>().ok());
                },
            }
        })
        .collect();

    let scope_id = attr.scope.clone().unwrap_or_else(|| "singleton".to_string());
    let component_name = match &attr.name {
        Some(name) => quote! { Some(#name) },
        None => quote! { None },
    };
    let primary = attr.primary;
    let lazy = attr.lazy;
    let order = attr.order;
    let destroy_order = attr.destroy_order;
    let qualifiers: Vec<&str> = attr.qualifier.iter().map(String::as_str).collect();
    let depends_on: Vec<&str> = attr.depends_on.iter().map(String::as_str).collect();

    let injection_points: Vec<TokenStream> = autowired
        .iter()
        .enumerate()
        .map(|(index, f)| {
            let ty = &f.inner_type;
            let required = matches!(f.wrapper, FieldWrapper::Direct);
            let wrapper_variant = match f.wrapper {
                FieldWrapper::Direct => quote! { ::loam_ioc::Wrapper::Direct },
                FieldWrapper::Optional => quote! { ::loam_ioc::Wrapper::Optional },
            };
            let qualifier = match &f.qualifier {
                Some(q) => quote! { Some(::loam_ioc::Qualifier(#q)) },
                None => quote! { None },
            };
            let kind = if attr.field_injection {
                let name = f.field.ident.as_ref().unwrap().to_string();
                quote! { ::loam_ioc::InjectionKind::Field { name: #name } }
            } else {
                quote! { ::loam_ioc::InjectionKind::ConstructorArg { index: #index } }
            };
            quote! {
                ::loam_ioc::InjectionPointDef {
                    owner_type_id: || std::any::TypeId::of::<#struct_name>(),
                    kind: #kind,
                    requested_type: || std::any::TypeId::of::<#ty>(),
                    requested_type_name: stringify!(#ty),
                    qualifier: #qualifier,
                    wrapper: #wrapper_variant,
                    required: #required,
                }
            }
        })
        .collect();

    let interface_paths = &attr.implements;
    let cast_arms: Vec<TokenStream> = interface_paths
        .iter()
        .map(|iface| {
            quote! {
                if interface == std::any::TypeId::of::<dyn #iface>() {
                    if let Ok(concrete) = instance.clone().downcast::<#struct_name>() {
                        return Some(Box::new(concrete as std::sync::Arc<dyn #iface + Send + Sync>)
                            as Box<dyn std::any::Any + Send + Sync>);
                    }
                }
            }
        })
        .collect();

    let post_construct_impl = if attr.post_construct {
        quote! {
            #[doc(hidden)]
            fn __loam_post_construct(
                instance: &std::sync::Arc<dyn std::any::Any + Send + Sync>,
            ) -> Result<(), String> {
                let concrete = instance.clone().downcast::<#struct_name>()
                    .map_err(|_| "downcast failed in post_construct".to_string())?;
                ::loam_ioc::PostConstruct::post_construct(&*concrete)
            }
        }
    } else {
        quote! {}
    };
    let post_construct_field = if attr.post_construct {
        quote! { Some(#struct_name::__loam_post_construct) }
    } else {
        quote! { None }
    };

    let pre_destroy_impl = if attr.pre_destroy {
        quote! {
            #[doc(hidden)]
            fn __loam_pre_destroy(
                instance: &std::sync::Arc<dyn std::any::Any + Send + Sync>,
            ) -> Result<(), String> {
                let concrete = instance.clone().downcast::<#struct_name>()
                    .map_err(|_| "downcast failed in pre_destroy".to_string())?;
                ::loam_ioc::PreDestroy::pre_destroy(&*concrete)
            }
        }
    } else {
        quote! {}
    };
    let pre_destroy_field = if attr.pre_destroy {
        quote! { Some(#struct_name::__loam_pre_destroy) }
    } else {
        quote! { None }
    };

    let after_properties_set_impl = if attr.initializing_bean {
        quote! {
            #[doc(hidden)]
            fn __loam_after_properties_set(
                instance: &std::sync::Arc<dyn std::any::Any + Send + Sync>,
            ) -> Result<(), String> {
                let concrete = instance.clone().downcast::<#struct_name>()
                    .map_err(|_| "downcast failed in after_properties_set".to_string())?;
                ::loam_ioc::InitializingBean::after_properties_set(&*concrete)
            }
        }
    } else {
        quote! {}
    };
    let after_properties_set_field = if attr.initializing_bean {
        quote! { Some(#struct_name::__loam_after_properties_set) }
    } else {
        quote! { None }
    };

    let has_lifecycle = attr.lifecycle || attr.smart_lifecycle;
    let lifecycle_impl = if has_lifecycle {
        quote! {
            #[doc(hidden)]
            fn __loam_lifecycle_start(
                instance: &std::sync::Arc<dyn std::any::Any + Send + Sync>,
            ) -> Result<(), String> {
                let concrete = instance.clone().downcast::<#struct_name>()
                    .map_err(|_| "downcast failed in lifecycle start".to_string())?;
                ::loam_ioc::Lifecycle::start(&*concrete)
            }

            #[doc(hidden)]
            fn __loam_lifecycle_stop(
                instance: &std::sync::Arc<dyn std::any::Any + Send + Sync>,
            ) -> Result<(), String> {
                let concrete = instance.clone().downcast::<#struct_name>()
                    .map_err(|_| "downcast failed in lifecycle stop".to_string())?;
                ::loam_ioc::Lifecycle::stop(&*concrete)
            }
        }
    } else {
        quote! {}
    };
    let lifecycle_start_field = if has_lifecycle {
        quote! { Some(#struct_name::__loam_lifecycle_start) }
    } else {
        quote! { None }
    };
    let lifecycle_stop_field = if has_lifecycle {
        quote! { Some(#struct_name::__loam_lifecycle_stop) }
    } else {
        quote! { None }
    };
    let lifecycle_phase_field = if attr.smart_lifecycle {
        let phase = attr.lifecycle_phase;
        quote! { Some(#phase) }
    } else {
        quote! { None }
    };

    let expanded = quote! {
        impl #struct_name {
            #[doc(hidden)]
            fn __loam_create(
                deps: std::collections::HashMap<std::any::TypeId, ::loam_ioc::ComponentInstance>,
            ) -> Result<::loam_ioc::ComponentInstance, ::loam_core::error::component::ComponentError> {
                #( #field_extractions )*

                let instance = Self {
                    #( #field_names, )*
                    #( #plain_initializers, )*
                };
                Ok(std::sync::Arc::new(instance))
            }

            #[doc(hidden)]
            fn __loam_cast_to_interface(
                instance: &std::sync::Arc<dyn std::any::Any + Send + Sync>,
                interface: std::any::TypeId,
            ) -> Option<Box<dyn std::any::Any + Send + Sync>> {
                #( #cast_arms )*
                None
            }

            #post_construct_impl
            #pre_destroy_impl
            #after_properties_set_impl
            #lifecycle_impl
        }

        inventory::submit! {
            ::loam_ioc::ComponentDefinition {
                type_id: || std::any::TypeId::of::<#struct_name>(),
                type_name: stringify!(#struct_name),
                component_name: #component_name,
                qualifiers: &[ #( #qualifiers, )* ],
                primary: #primary,
                lazy: #lazy,
                order: #order,
                destroy_order: #destroy_order,
                scope_id: #scope_id,
                depends_on: &[ #( #depends_on, )* ],
                conditions: || vec![ #( #conditions, )* ],
                injection_points: || vec![ #( #injection_points, )* ],
                implemented_interfaces: || vec![ #( std::any::TypeId::of::<dyn #interface_paths>(), )* ],
                cast_to_interface: #struct_name::__loam_cast_to_interface,
                creator: #struct_name::__loam_create,
                post_construct: #post_construct_field,
                after_properties_set: #after_properties_set_field,
                pre_destroy: #pre_destroy_field,
                lifecycle_phase: #lifecycle_phase_field,
                lifecycle_start: #lifecycle_start_field,
                lifecycle_stop: #lifecycle_stop_field,
            }
        }
    };

    Ok(expanded)
}

fn parse_component_attr(attrs: &[Attribute]) -> Result<ComponentAttr, Error> {
    let mut parsed = ComponentAttr::default();

    for attr in attrs {
        if !attr.path().is_ident("component") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                parsed.name = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("scope") {
                parsed.scope = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("qualifier") {
                parsed.qualifier = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("order") {
                parsed.order = meta.value()?.parse::<LitInt>()?.base10_parse()?;
            } else if meta.path.is_ident("destroy_order") {
                parsed.destroy_order = meta.value()?.parse::<LitInt>()?.base10_parse()?;
            } else if meta.path.is_ident("primary") {
                parsed.primary = true;
            } else if meta.path.is_ident("lazy") {
                parsed.lazy = true;
            } else if meta.path.is_ident("field_injection") {
                parsed.field_injection = true;
            } else if meta.path.is_ident("depends_on") {
                let content;
                syn::parenthesized!(content in meta.input);
                let idents =
                    content.parse_terminated(syn::Ident::parse, syn::Token![,])?;
                parsed.depends_on = idents.into_iter().map(|i| i.to_string()).collect();
            } else if meta.path.is_ident("implements") {
                let content;
                syn::parenthesized!(content in meta.input);
                let paths = content.parse_terminated(syn::Path::parse, syn::Token![,])?;
                parsed.implements = paths.into_iter().collect();
            } else if meta.path.is_ident("lifecycle") {
                parsed.lifecycle = true;
            } else if meta.path.is_ident("smart_lifecycle") {
                parsed.smart_lifecycle = true;
                if meta.input.peek(syn::token::Paren) {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let phase_key: Ident = content.parse()?;
                    if phase_key != "phase" {
                        return Err(Error::new_spanned(phase_key, "expected `phase`"));
                    }
                    content.parse::<syn::Token![=]>()?;
                    parsed.lifecycle_phase = content.parse::<LitInt>()?.base10_parse()?;
                }
            } else if meta.path.is_ident("initializing_bean") {
                parsed.initializing_bean = true;
            } else {
                return Err(meta.error("unrecognized #[component(...)] key"));
            }
            Ok(())
        })?;
    }

    parsed.post_construct = attrs.iter().any(|a| a.path().is_ident("post_construct"));
    parsed.pre_destroy = attrs.iter().any(|a| a.path().is_ident("pre_destroy"));

    Ok(parsed)
}

/// Parses a conditional attribute's argument list: a comma-separated run of
/// string literal bean/profile names, optionally followed by a trailing
/// `strategy = "any"|"all"` key, e.g.
/// `#[conditional_on_present_bean("A", "B", strategy = "any")]`. Strategy
/// defaults to `All` when omitted.
fn parse_names_and_strategy(attr: &Attribute) -> Result<(Vec<String>, TokenStream), Error> {
    let mut names = Vec::new();
    let mut strategy = quote! { ::loam_ioc::Strategy::All };

    attr.parse_args_with(|input: syn::parse::ParseStream| {
        while !input.is_empty() {
            if input.peek(Ident) {
                let ident: Ident = input.parse()?;
                if ident != "strategy" {
                    return Err(Error::new_spanned(ident, "expected `strategy`"));
                }
                input.parse::<syn::Token![=]>()?;
                let value: LitStr = input.parse()?;
                strategy = match value.value().as_str() {
                    "any" | "ANY" => quote! { ::loam_ioc::Strategy::Any },
                    "all" | "ALL" => quote! { ::loam_ioc::Strategy::All },
                    _ => return Err(Error::new_spanned(value, "expected `any` or `all`")),
                };
            } else {
                let lit: LitStr = input.parse()?;
                names.push(lit.value());
            }

            if input.peek(syn::Token![,]) {
                input.parse::<syn::Token![,]>()?;
            }
        }
        Ok(())
    })?;

    Ok((names, strategy))
}

/// Parses `#[conditional_on_property]`, `#[conditional_on_class]`,
/// `#[conditional_on_missing_bean]`, `#[conditional_on_present_bean]`, and
/// `#[conditional_on_profile]` struct attributes into `Condition` tokens
fn parse_conditions(attrs: &[Attribute]) -> Result<Vec<TokenStream>, Error> {
    let mut conditions = Vec::new();

    for attr in attrs {
        if attr.path().is_ident("conditional_on_property") {
            let mut name = None;
            let mut value = None;
            let mut match_if_missing = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    name = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("value") {
                    value = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("match_if_missing") {
                    match_if_missing = true;
                } else {
                    return Err(meta.error("expected name, value or match_if_missing"));
                }
                Ok(())
            })?;
            let name = name.ok_or_else(|| Error::new_spanned(attr, "missing `name`"))?;
            let expected = match value {
                Some(v) => quote! { ::std::option::Option::Some(#v) },
                None => quote! { ::std::option::Option::None },
            };
            conditions.push(quote! {
                ::loam_ioc::Condition::PropertyMatch {
                    name: #name,
                    expected: #expected,
                    match_if_missing: #match_if_missing,
                }
            });
        } else if attr.path().is_ident("conditional_on_class") {
            let lit: LitStr = attr.parse_args()?;
            let value = lit.value();
            conditions.push(quote! {
                ::loam_ioc::Condition::ClassPresence { type_name: #value }
            });
        } else if attr.path().is_ident("conditional_on_missing_bean") {
            let (names, _strategy) = parse_names_and_strategy(attr)?;
            conditions.push(quote! {
                ::loam_ioc::Condition::MissingBean { type_names: &[ #( #names, )* ] }
            });
        } else if attr.path().is_ident("conditional_on_present_bean") {
            let (names, strategy) = parse_names_and_strategy(attr)?;
            conditions.push(quote! {
                ::loam_ioc::Condition::PresentBean {
                    type_names: &[ #( #names, )* ],
                    strategy: #strategy,
                }
            });
        } else if attr.path().is_ident("conditional_on_profile") {
            let (names, strategy) = parse_names_and_strategy(attr)?;
            conditions.push(quote! {
                ::loam_ioc::Condition::ProfileMatch {
                    profiles: &[ #( #names, )* ],
                    strategy: #strategy,
                }
            });
        }
    }

    Ok(conditions)
}

fn partition_fields(fields: &FieldsNamed) -> Result<(Vec<AutowiredField>, Vec<Field>), Error> {
    let mut autowired = Vec::new();
    let mut plain = Vec::new();

    for field in &fields.named {
        let Some(autowired_attr) = field.attrs.iter().find(|a| a.path().is_ident("autowired")) else {
            plain.push(field.clone());
            continue;
        };

        let qualifier = parse_autowired_qualifier(autowired_attr)?;
        let (inner_type, wrapper) = classify_field_type(&field.ty)?;
        autowired.push(AutowiredField {
            field: field.clone(),
            inner_type,
            wrapper,
            qualifier,
        });
    }

    Ok((autowired, plain))
}

fn parse_autowired_qualifier(attr: &Attribute) -> Result<Option<String>, Error> {
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(None);
    }
    let mut qualifier = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("qualifier") {
            qualifier = Some(meta.value()?.parse::<LitStr>()?.value());
            Ok(())
        } else {
            Err(meta.error("expected `qualifier`"))
        }
    })?;
    Ok(qualifier)
}

/// Recognizes `Arc<T>` (direct) and `Option<Arc<T>>` (optional) on
/// `#[autowired]` fields
///
/// `Provider<T>` and `Vec<Arc<T>>` are deliberately not supported here:
/// the registry hands the factory a single resolved instance per
/// dependency type, not a re-resolvable handle or a multimap, so deferred
/// and collection injection go through `Container::provider`/`get_all`
/// instead of a field.
fn classify_field_type(ty: &Type) -> Result<(Type, FieldWrapper), Error> {
    if let Some(inner) = unwrap_generic(ty, "Option") {
        if let Some(arc_inner) = unwrap_generic(&inner, "Arc") {
            return Ok((arc_inner, FieldWrapper::Optional));
        }
        return Err(Error::new_spanned(
            ty,
            "#[autowired] Option field must be Option<Arc<T>>",
        ));
    }

    if let Some(arc_inner) = unwrap_generic(ty, "Arc") {
        return Ok((arc_inner, FieldWrapper::Direct));
    }

    if unwrap_generic(ty, "Provider").is_some() || unwrap_generic(ty, "Vec").is_some() {
        return Err(Error::new_spanned(
            ty,
            "#[autowired] does not support Provider<T> or Vec<T>; resolve these via \
             Container::provider::<T>() or Container::get_all::<T>() instead",
        ));
    }

    Err(Error::new_spanned(
        ty,
        "#[autowired] fields must be Arc<T> or Option<Arc<T>>",
    ))
}

fn unwrap_generic(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner.clone()),
        _ => None,
    }
}

fn is_optional_field(ty: &Type) -> bool {
    unwrap_generic(ty, "Option").is_some()
}

fn validate_struct_input(ast: &DeriveInput) -> Result<&FieldsNamed, Error> {
    match &ast.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(fields) => Ok(fields),
            _ => Err(Error::new_spanned(
                ast,
                "Component derive macro only supports structs with named fields",
            )),
        },
        _ => Err(Error::new_spanned(
            ast,
            "Component derive macro can only be used on structs",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn expands_simple_struct() {
        let input: DeriveInput = parse_quote! {
            #[component(name = "widget", scope = "singleton", primary)]
            struct Widget {
                #[autowired]
                repository: std::sync::Arc<Repository>,
                #[autowired(qualifier = "slow")]
                cache: Option<std::sync::Arc<Cache>>,
                label: String,
            }
        };

        let tokens = impl_component_derive(&input);
        let rendered = tokens.to_string();
        assert!(rendered.contains("ComponentDefinition"));
        assert!(rendered.contains("__loam_create"));
    }

    #[test]
    fn rejects_non_arc_autowired_field() {
        let input: DeriveInput = parse_quote! {
            struct Widget {
                #[autowired]
                repository: Repository,
            }
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("compile_error"));
    }

    #[test]
    fn parses_depends_on_and_conditions() {
        let input: DeriveInput = parse_quote! {
            #[component(depends_on(DatabaseService, ConfigService))]
            #[conditional_on_property(name = "feature.enabled", value = "true")]
            struct UserService {
                #[autowired]
                database: std::sync::Arc<DatabaseService>,
            }
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("DatabaseService"));
        assert!(tokens.contains("PropertyMatch"));
    }

    #[test]
    fn widened_missing_bean_and_present_bean_accept_lists_and_strategy() {
        let input: DeriveInput = parse_quote! {
            #[conditional_on_missing_bean("LegacyCache", "StubCache")]
            #[conditional_on_present_bean("DatabaseService", "ConfigService", strategy = "any")]
            #[conditional_on_profile("dev", "test", strategy = "any")]
            struct FeatureService {}
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("MissingBean"));
        assert!(tokens.contains("LegacyCache"));
        assert!(tokens.contains("StubCache"));
        assert!(tokens.contains("PresentBean"));
        assert!(tokens.contains("Strategy :: Any"));
        assert!(tokens.contains("ProfileMatch"));
    }

    #[test]
    fn present_bean_defaults_to_all_strategy() {
        let input: DeriveInput = parse_quote! {
            #[conditional_on_present_bean("DatabaseService")]
            struct FeatureService {}
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("Strategy :: All"));
    }

    #[test]
    fn parses_implements_and_generates_cast_function() {
        let input: DeriveInput = parse_quote! {
            #[component(implements(Greeter, Farewell))]
            struct EnglishGreeter {}
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("__loam_cast_to_interface"));
        assert!(tokens.contains("dyn Greeter"));
        assert!(tokens.contains("dyn Farewell"));
    }

    #[test]
    fn post_construct_and_pre_destroy_struct_attributes_generate_callbacks() {
        let input: DeriveInput = parse_quote! {
            #[post_construct]
            #[pre_destroy]
            struct Connection {}
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("__loam_post_construct"));
        assert!(tokens.contains("__loam_pre_destroy"));
        assert!(tokens.contains("PostConstruct :: post_construct"));
        assert!(tokens.contains("PreDestroy :: pre_destroy"));
    }

    #[test]
    fn initializing_bean_wires_after_properties_set() {
        let input: DeriveInput = parse_quote! {
            #[component(initializing_bean)]
            struct Pool {}
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("__loam_after_properties_set"));
        assert!(tokens.contains("InitializingBean :: after_properties_set"));
    }

    #[test]
    fn smart_lifecycle_wires_phase_and_start_stop() {
        let input: DeriveInput = parse_quote! {
            #[component(smart_lifecycle(phase = 10))]
            struct Worker {}
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("lifecycle_phase"));
        assert!(tokens.contains("10i32"));
        assert!(tokens.contains("__loam_lifecycle_start"));
        assert!(tokens.contains("__loam_lifecycle_stop"));
        assert!(tokens.contains("Lifecycle :: start"));
        assert!(tokens.contains("Lifecycle :: stop"));
    }

    #[test]
    fn plain_lifecycle_has_no_phase() {
        let input: DeriveInput = parse_quote! {
            #[component(lifecycle)]
            struct Poller {}
        };

        let tokens = impl_component_derive(&input).to_string();
        assert!(tokens.contains("lifecycle_phase : None"));
        assert!(tokens.contains("__loam_lifecycle_start"));
    }
}
