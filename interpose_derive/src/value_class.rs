// vim: tw=80
use super::*;

/// The single field of a value class
struct Wrapped {
    ty: Type,
    /// Expression reading the field from `self`
    access: TokenStream,
    /// Expression building the struct from a variable named `inner`
    construct: TokenStream
}

fn wrapped_field(input: &DeriveInput) -> Option<Wrapped> {
    let ident = &input.ident;
    let fields = if let Data::Struct(ds) = &input.data {
        &ds.fields
    } else {
        compile_error(input.span(), "ValueClass can only be derived for structs");
        return None;
    };
    if fields.len() != 1 {
        compile_error(fields.span(),
            "A ValueClass must have exactly one field");
        return None;
    }
    let field = fields.iter().next()?;
    let ty = field.ty.clone();
    match &field.ident {
        Some(name) => Some(Wrapped {
            ty,
            access: quote!(self.#name),
            construct: quote!(#ident{#name: inner})
        }),
        None => Some(Wrapped {
            ty,
            access: quote!(self.0),
            construct: quote!(#ident(inner))
        })
    }
}

/// Require every type parameter to be a `MockValue`
fn bounded_generics(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    let params = generics.type_params()
        .map(|tp| tp.ident.clone())
        .collect::<Vec<_>>();
    let wc = generics.make_where_clause();
    for p in params {
        wc.predicates.push(parse_quote!(#p: ::interpose::MockValue));
    }
    generics
}

pub(crate) fn do_derive_value_class(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error()
    };
    let Some(Wrapped{ty, access, construct}) = wrapped_field(&input) else {
        return TokenStream::new();
    };
    let ident = &input.ident;
    let generics = bounded_generics(&input.generics);
    let (ig, tg, wc) = generics.split_for_impl();
    quote!(
        impl #ig ::interpose::MockValue for #ident #tg #wc {
            const VALUE_CLASS: bool = true;

            fn into_underlying(self)
                -> ::std::boxed::Box<dyn ::interpose::DynValue>
            {
                <#ty as ::interpose::MockValue>::into_underlying(#access)
            }

            fn from_underlying(
                value: ::std::boxed::Box<dyn ::interpose::DynValue>)
                -> ::std::result::Result<Self, ::interpose::Error>
            {
                <#ty as ::interpose::MockValue>::from_underlying(value)
                    .map(|inner| #construct)
            }

            fn default_value() -> Self {
                let inner = <#ty as ::interpose::MockValue>::default_value();
                #construct
            }

            fn signature(seed: u32) -> Self {
                let inner = <#ty as ::interpose::MockValue>::signature(seed);
                #construct
            }
        }

        impl #ig ::interpose::ValueClass for #ident #tg #wc {
            type Inner = #ty;

            fn wrap_value(inner: #ty) -> Self {
                #construct
            }

            fn unwrap_value(self) -> #ty {
                #access
            }
        }
    )
}

pub(crate) fn do_derive_mock_value(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error()
    };
    let ident = &input.ident;
    let generics = bounded_generics(&input.generics);
    let (ig, tg, wc) = generics.split_for_impl();
    quote!(
        impl #ig ::interpose::MockValue for #ident #tg #wc {
            fn into_underlying(self)
                -> ::std::boxed::Box<dyn ::interpose::DynValue>
            {
                ::std::boxed::Box::new(self)
            }

            fn from_underlying(
                value: ::std::boxed::Box<dyn ::interpose::DynValue>)
                -> ::std::result::Result<Self, ::interpose::Error>
            {
                ::interpose::downcast_underlying(value)
            }

            fn default_value() -> Self {
                <Self as ::std::default::Default>::default()
            }
        }
    )
}
