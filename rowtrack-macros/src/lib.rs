use convert_case::Case;
use convert_case::Casing;
use darling::FromDeriveInput;
use darling::FromField;
use proc_macro2::Ident;
use proc_macro2::TokenStream as TokenStream2;
use quote::format_ident;
use quote::quote;
use syn::DeriveInput;
use syn::Lit;
use syn::Type;

#[derive(Debug, FromField)]
#[darling(attributes(rowtrack))]
struct FieldReceiver {
    pub ident: Option<Ident>,
    pub ty:    Type,

    #[darling(default)]
    pub primary_key: bool,

    #[darling(default)]
    pub property: Option<String>,

    #[darling(default)]
    pub max_length: Option<usize>,

    #[darling(default)]
    pub required: bool,

    #[darling(default)]
    pub non_empty: bool,

    #[darling(default)]
    pub default: Option<Lit>,
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(rowtrack), supports(struct_named))]
struct EntityReceiver {
    pub ident: Ident,
    pub data:  darling::ast::Data<(), FieldReceiver>,

    #[darling(default)]
    pub table_name: Option<String>,
}

#[derive(Debug)]
struct FieldInfo {
    pub field_name:     Ident,
    pub property:       String,
    pub field_type:     Type,
    pub semantic_type:  TokenStream2,
    pub is_primary_key: bool,
    pub is_optional:    bool,
    pub max_length:     Option<usize>,
    pub is_required:    bool,
    pub is_non_empty:   bool,
    pub default_value:  Option<TokenStream2>,
}

#[derive(Debug)]
struct EntityInfo {
    pub struct_name: Ident,
    pub table_name:  String,
    pub fields:      Vec<FieldInfo>,
}

impl FieldReceiver {
    pub fn to_field_info(self) -> syn::Result<FieldInfo> {
        let field_name = self
            .ident
            .ok_or_else(|| syn::Error::new_spanned(&self.ty, "Entity fields must be named"))?;
        let is_optional = is_option_type(&self.ty);
        let inner = extract_option_inner_type(&self.ty).unwrap_or(&self.ty);
        let semantic_type = rust_type_to_semantic_type(inner)?;
        if !is_optional && is_datetime_type(inner) {
            // Datetimes are null until set
            return Err(syn::Error::new_spanned(&self.ty, "Datetime fields must be declared as Option<NaiveDateTime>"));
        }
        let property = self.property.unwrap_or_else(|| field_name.to_string().to_case(Case::Camel));
        let default_value = self.default.as_ref().map(lit_to_default_value).transpose()?;

        Ok(FieldInfo {
            field_name,
            property,
            field_type: self.ty,
            semantic_type,
            is_primary_key: self.primary_key,
            is_optional,
            max_length: self.max_length,
            is_required: self.required,
            is_non_empty: self.non_empty,
            default_value,
        })
    }
}

impl EntityReceiver {
    pub fn to_entity_info(self) -> syn::Result<EntityInfo> {
        let table_name = self.table_name.unwrap_or_else(|| self.ident.to_string().to_case(Case::Snake));

        let fields = match self.data {
            darling::ast::Data::Struct(fields) => fields.fields,
            darling::ast::Data::Enum(_) => {
                return Err(syn::Error::new_spanned(&self.ident, "Entity can only be derived for structs"));
            }
        };
        let fields = fields.into_iter().map(FieldReceiver::to_field_info).collect::<syn::Result<Vec<_>>>()?;

        if !fields.iter().any(|f| f.is_primary_key) {
            return Err(syn::Error::new_spanned(
                &self.ident,
                "Entity must have a primary key field marked with #[rowtrack(primary_key)]",
            ));
        }

        Ok(EntityInfo { struct_name: self.ident, table_name, fields })
    }
}

/// Derive the schema and model conversions for an entity struct.
///
/// Each field maps to a camelCase property. `Option<_>` fields are nullable.
/// Several `primary_key` fields form a composite key. Datetime fields must be
/// `Option<NaiveDateTime>`.
#[proc_macro_derive(Entity, attributes(rowtrack))]
pub fn derive_entity(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    let receiver = match EntityReceiver::from_derive_input(&input) {
        Ok(r) => r,
        Err(e) => return e.write_errors().into(),
    };

    let entity_info = match receiver.to_entity_info() {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    let expanded = impl_entity(&entity_info);
    proc_macro::TokenStream::from(expanded)
}

fn impl_entity(entity_info: &EntityInfo) -> TokenStream2 {
    let name = &entity_info.struct_name;
    let fields_trait_name = format_ident!("{}Fields", name);
    let table_name = &entity_info.table_name;
    let field_count = entity_info.fields.len();

    let field_defs: Vec<_> = entity_info
        .fields
        .iter()
        .map(|f| {
            let property = &f.property;
            let semantic_type = &f.semantic_type;
            let mut def = quote! { ::rowtrack::FieldDef::new(#property, #semantic_type) };
            if f.is_optional {
                def = quote! { #def.nullable() };
            }
            if let Some(default) = &f.default_value {
                def = quote! { #def.with_default(#default) };
            }
            if let Some(max_length) = f.max_length {
                def = quote! { #def.with_max_length(#max_length) };
            }
            if f.is_required {
                def = quote! { #def.required() };
            }
            if f.is_non_empty {
                def = quote! { #def.non_empty() };
            }
            def
        })
        .collect();

    let primary_properties: Vec<_> =
        entity_info.fields.iter().filter(|f| f.is_primary_key).map(|f| f.property.as_str()).collect();

    let primary_key = if primary_properties.len() == 1 {
        let property = primary_properties[0];
        quote! { ::rowtrack::PrimaryKey::Single(#property) }
    } else {
        quote! { ::rowtrack::PrimaryKey::Composite(&[#(#primary_properties),*]) }
    };

    let from_entity_fields: Vec<_> = entity_info
        .fields
        .iter()
        .map(|f| {
            let field_name = &f.field_name;
            let property = &f.property;
            let field_type = &f.field_type;
            quote! {
                #field_name: entity.get_as::<#field_type>(#property)?
            }
        })
        .collect();

    let into_entity_sets: Vec<_> = entity_info
        .fields
        .iter()
        .map(|f| {
            let field_name = &f.field_name;
            let property = &f.property;
            quote! {
                entity.set(#property, self.#field_name)?;
            }
        })
        .collect();

    let accessor_decls: Vec<_> = entity_info
        .fields
        .iter()
        .map(|f| {
            let field_name = &f.field_name;
            let setter = format_ident!("set_{}", field_name);
            let field_type = &f.field_type;
            quote! {
                fn #field_name(&self) -> ::rowtrack::Result<#field_type>;
                fn #setter(&mut self, value: #field_type) -> ::rowtrack::Result<()>;
            }
        })
        .collect();

    let accessor_impls: Vec<_> = entity_info
        .fields
        .iter()
        .map(|f| {
            let field_name = &f.field_name;
            let setter = format_ident!("set_{}", field_name);
            let field_type = &f.field_type;
            let property = &f.property;
            quote! {
                fn #field_name(&self) -> ::rowtrack::Result<#field_type> {
                    self.get_as::<#field_type>(#property)
                }

                fn #setter(&mut self, value: #field_type) -> ::rowtrack::Result<()> {
                    self.set(#property, value)
                }
            }
        })
        .collect();

    quote! {
        impl ::rowtrack::EntityTrait for #name {
            fn schema() -> &'static ::rowtrack::EntitySchema {
                static FIELDS: [::rowtrack::FieldDef; #field_count] = [#(#field_defs),*];
                static SCHEMA: ::rowtrack::EntitySchema =
                    ::rowtrack::EntitySchema::new(#table_name, &FIELDS, #primary_key);
                &SCHEMA
            }
        }

        impl ::rowtrack::ModelTrait for #name {
            fn from_entity(entity: &::rowtrack::Entity<Self>) -> ::rowtrack::Result<Self> {
                Ok(Self {
                    #(#from_entity_fields),*
                })
            }

            fn into_entity(self) -> ::rowtrack::Result<::rowtrack::Entity<Self>> {
                let mut entity = ::rowtrack::Entity::<Self>::new()?;
                #(#into_entity_sets)*
                Ok(entity)
            }
        }

        /// Typed property accessors
        pub trait #fields_trait_name {
            #(#accessor_decls)*
        }

        impl #fields_trait_name for ::rowtrack::Entity<#name> {
            #(#accessor_impls)*
        }
    }
}

fn rust_type_to_semantic_type(ty: &Type) -> syn::Result<TokenStream2> {
    let ident = match ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|segment| segment.ident.to_string()),
        _ => None,
    };

    match ident.as_deref() {
        Some("i64" | "i32" | "i16" | "i8" | "u32" | "u16" | "u8") => {
            Ok(quote! { ::rowtrack::SemanticType::Integer })
        }
        Some("f64" | "f32") => Ok(quote! { ::rowtrack::SemanticType::Float }),
        Some("bool") => Ok(quote! { ::rowtrack::SemanticType::Boolean }),
        Some("String") => Ok(quote! { ::rowtrack::SemanticType::String }),
        Some("NaiveDateTime") => Ok(quote! { ::rowtrack::SemanticType::DateTime }),
        _ => Err(syn::Error::new_spanned(
            ty,
            "Unsupported entity field type (expected an integer, float, bool, String or NaiveDateTime)",
        )),
    }
}

fn is_datetime_type(ty: &Type) -> bool {
    matches!(ty, Type::Path(type_path) if type_path.path.segments.last().is_some_and(|s| s.ident == "NaiveDateTime"))
}

fn lit_to_default_value(lit: &Lit) -> syn::Result<TokenStream2> {
    match lit {
        Lit::Int(v) => {
            let v = v.base10_parse::<i64>()?;
            Ok(quote! { ::rowtrack::DefaultValue::Integer(#v) })
        }
        Lit::Float(v) => {
            let v = v.base10_parse::<f64>()?;
            Ok(quote! { ::rowtrack::DefaultValue::Float(#v) })
        }
        Lit::Bool(v) => {
            let v = v.value;
            Ok(quote! { ::rowtrack::DefaultValue::Boolean(#v) })
        }
        Lit::Str(v) => {
            let v = v.value();
            Ok(quote! { ::rowtrack::DefaultValue::Text(#v) })
        }
        _ => Err(syn::Error::new_spanned(lit, "Unsupported default value literal")),
    }
}

fn extract_option_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return Some(inner);
                    }
                }
            }
        }
    }
    None
}

fn is_option_type(ty: &Type) -> bool {
    extract_option_inner_type(ty).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_info(input: DeriveInput) -> syn::Result<EntityInfo> {
        EntityReceiver::from_derive_input(&input)
            .map_err(|e| syn::Error::new(proc_macro2::Span::call_site(), e.to_string()))?
            .to_entity_info()
    }

    #[test]
    fn test_optional_datetime_is_nullable() {
        let info = entity_info(syn::parse_quote! {
            struct Event {
                #[rowtrack(primary_key)]
                id: i64,
                starts_at: Option<NaiveDateTime>,
            }
        })
        .unwrap();

        assert_eq!(info.table_name, "event");
        assert_eq!(info.fields[1].property, "startsAt");
        assert!(info.fields[1].is_optional);
    }

    #[test]
    fn test_plain_datetime_is_rejected() {
        let err = entity_info(syn::parse_quote! {
            struct Event {
                #[rowtrack(primary_key)]
                id: i64,
                starts_at: NaiveDateTime,
            }
        })
        .unwrap_err();

        assert!(err.to_string().contains("Option<NaiveDateTime>"));
    }

    #[test]
    fn test_missing_primary_key_is_rejected() {
        let err = entity_info(syn::parse_quote! {
            struct Event {
                id: i64,
            }
        })
        .unwrap_err();

        assert!(err.to_string().contains("primary key"));
    }
}
