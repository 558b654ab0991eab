// vim: tw=80
use super::*;
use syn::ext::IdentExt;

/// One trait method, ready to be mocked
struct MockMethod {
    /// The method's signature, with its argument patterns replaced by plain
    /// identifiers
    sig: Signature,
    /// Expressions converting each argument into a `Repr`
    reprs: Vec<TokenStream>,
    /// Source text of the parameter list, for the method's identity
    params: String
}

impl MockMethod {
    fn new(method: &TraitItemFn) -> Option<MockMethod> {
        let mut sig = method.sig.clone();
        if let Some(a) = &sig.asyncness {
            compile_error(a.span(), "interpose does not support async methods");
            return None;
        }
        if sig.generics.type_params().next().is_some()
            || sig.generics.const_params().next().is_some()
        {
            compile_error(sig.generics.span(),
                "interpose does not support generic methods");
            return None;
        }
        if let ReturnType::Type(_, ty) = &sig.output {
            match ty.as_ref() {
                Type::ImplTrait(_) => {
                    compile_error(ty.span(),
                        "interpose does not support returning impl Trait");
                    return None;
                },
                Type::Reference(_) => {
                    compile_error(ty.span(),
                        "interpose does not support returning references");
                    return None;
                },
                _ => ()
            }
        }
        let mut has_receiver = false;
        let mut reprs = Vec::new();
        let mut params = Vec::new();
        for (i, fn_arg) in sig.inputs.iter_mut().enumerate() {
            match fn_arg {
                FnArg::Receiver(r) => {
                    if r.reference.is_none() {
                        compile_error(r.span(),
                            "interpose requires methods to take &self or &mut self");
                        return None;
                    }
                    has_receiver = true;
                },
                FnArg::Typed(pt) => {
                    let ident = match pt.pat.as_ref() {
                        Pat::Ident(pi) if pi.subpat.is_none() =>
                            pi.ident.clone(),
                        _ => format_ident!("arg{}", i)
                    };
                    *pt.pat = Pat::Ident(PatIdent {
                        attrs: Vec::new(),
                        by_ref: None,
                        mutability: None,
                        ident: ident.clone(),
                        subpat: None
                    });
                    let repr = match pt.ty.as_ref() {
                        Type::Reference(_) => quote!(
                            ::interpose::MockValue::into_repr(
                                ::std::clone::Clone::clone(&*#ident))
                        ),
                        Type::ImplTrait(_) => {
                            compile_error(pt.ty.span(),
                                "interpose does not support impl Trait arguments");
                            return None;
                        },
                        _ => quote!(::interpose::MockValue::into_repr(#ident))
                    };
                    reprs.push(repr);
                    params.push(type_string(&pt.ty));
                }
            }
        }
        if !has_receiver {
            compile_error(sig.span(),
                "interpose does not support static methods");
            return None;
        }
        Some(MockMethod{sig, reprs, params: params.join(", ")})
    }

    fn gen_impl(&self) -> TokenStream {
        let sig = &self.sig;
        let name = sig.ident.unraw().to_string();
        let params = &self.params;
        let arity = self.reprs.len();
        let reprs = &self.reprs;
        quote!(
            #sig {
                self.handle.invoke(
                    ::interpose::MethodId::new(#name, #params, #arity),
                    ::std::vec![#(#reprs),*])
            }
        )
    }
}

/// Generate the mock struct for a trait
fn mock_trait(item: &ItemTrait) -> TokenStream {
    let ident = &item.ident;
    let mock_ident = gen_mock_ident(ident);
    let vis = &item.vis;
    let unsafety = &item.unsafety;
    if !item.generics.params.is_empty() {
        compile_error(item.generics.span(),
            "interpose does not support generic traits");
        return TokenStream::new();
    }
    let mut methods = Vec::new();
    for ti in item.items.iter() {
        match ti {
            TraitItem::Fn(tif) => {
                if let Some(m) = MockMethod::new(tif) {
                    methods.push(m.gen_impl());
                }
            },
            TraitItem::Const(tic) if tic.default.is_some() => {
                // The trait's default applies to the mock too
            },
            TraitItem::Const(tic) => {
                compile_error(tic.span(),
                    "interpose does not support associated constants without a default");
            },
            TraitItem::Type(tit) => {
                compile_error(tit.span(),
                    "interpose does not support associated types");
            },
            _ => {
                // Nothing to do
            }
        }
    }
    let docstr = format!("Mock version of the `{}` trait", ident);
    quote!(
        #[doc = #docstr]
        #[derive(Clone)]
        #vis struct #mock_ident {
            handle: ::interpose::MockHandle
        }

        impl ::interpose::Mock for #mock_ident {
            fn from_handle(handle: ::interpose::MockHandle) -> Self {
                #mock_ident{handle}
            }

            fn handle(&self) -> &::interpose::MockHandle {
                &self.handle
            }
        }

        #[allow(dead_code)]
        impl #mock_ident {
            /// Create a mock that fails on unstubbed calls
            pub fn new() -> Self {
                ::interpose::mock()
            }

            /// Create a mock that returns default values for unstubbed calls
            pub fn relaxed() -> Self {
                ::interpose::relaxed_mock()
            }

            pub fn with_config(config: ::interpose::MockConfig) -> Self {
                ::interpose::mock_with(config)
            }

            /// Create a mock and declare its stubs in `f`
            pub fn new_with<F: FnOnce(&Self)>(f: F) -> Self {
                let mock = Self::new();
                f(&mock);
                mock
            }
        }

        impl ::std::default::Default for #mock_ident {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::fmt::Debug for #mock_ident {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>)
                -> ::std::fmt::Result
            {
                ::std::fmt::Debug::fmt(&self.handle, f)
            }
        }

        #unsafety impl #ident for #mock_ident {
            #(#methods)*
        }
    )
}

pub(crate) fn do_automock(input: TokenStream) -> TokenStream {
    let item: Item = match parse2(input) {
        Ok(item) => item,
        Err(err) => return err.to_compile_error()
    };
    match &item {
        Item::Trait(item_trait) => mock_trait(item_trait),
        _ => {
            compile_error(item.span(), "automock only supports traits");
            TokenStream::new()
        }
    }
}
