// vim: tw=80
//! Proc Macros for use with Interpose
//!
//! You probably don't want to use this crate directly.  Instead, you use use
//! its reexports via the [`interpose`](../interpose/index.html) crate.

#![cfg_attr(feature = "nightly_derive", feature(proc_macro_diagnostic))]
extern crate proc_macro;

use cfg_if::cfg_if;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
    *,
    spanned::Spanned
};

mod automock;
mod value_class;
use crate::automock::do_automock;
use crate::value_class::{do_derive_mock_value, do_derive_value_class};

cfg_if! {
    // proc-macro2's Span::unstable method requires the nightly feature, and it
    // doesn't work in test mode.
    // https://github.com/alexcrichton/proc-macro2/issues/159
    if #[cfg(all(feature = "nightly_derive", not(test)))] {
        fn compile_error(span: Span, msg: &str) {
            span.unstable()
                .error(msg)
                .emit();
        }
    } else {
        fn compile_error(_span: Span, msg: &str) {
            panic!("{}.  More information may be available when interpose is built with the \"nightly\" feature.", msg);
        }
    }
}

/// Generate a mock identifier from the regular one: eg "Foo" => "MockFoo"
fn gen_mock_ident(ident: &Ident) -> Ident {
    format_ident!("Mock{}", ident)
}

/// Render a type as compact source text, eg `Vec<u32>` rather than
/// `Vec < u32 >`.  Used in method identities and failure messages.
fn type_string(ty: &Type) -> String {
    quote!(#ty).to_string()
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" ,", ",")
        .replace("& ", "&")
        .replace("( ", "(")
        .replace(" )", ")")
}

/// Automatically generate a mock struct for a trait.
///
/// The mock struct's name is the trait's name with "Mock" prepended.  It
/// implements the trait by dispatching every call through its
/// `MockHandle`, and provides `new`, `relaxed`, `with_config` and `new_with`
/// constructors.
///
/// Every method must take `&self` or `&mut self`.  Arguments must be owned
/// `MockValue` types or references to them, and the return type must be a
/// `MockValue` or `()`.
///
/// # Examples
///
/// The generated code refers to the `interpose` crate, so use the macro
/// through its reexport there.
///
/// ```ignore
/// use interpose::*;
///
/// #[automock]
/// pub trait Foo {
///     fn foo(&self, key: i16) -> u32;
/// }
///
/// let mock = MockFoo::new_with(|m| {
///     every(|| m.foo(5)).returns(999);
/// });
/// assert_eq!(999, mock.foo(5));
/// ```
#[proc_macro_attribute]
pub fn automock(attrs: proc_macro::TokenStream, input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    let attrs: proc_macro2::TokenStream = attrs.into();
    if !attrs.is_empty() {
        compile_error(attrs.span(), "automock does not take any arguments");
    }
    let input: proc_macro2::TokenStream = input.into();
    let mut output = input.clone();
    output.extend(do_automock(input));
    output.into()
}

/// Implement `MockValue` and `ValueClass` for a struct with exactly one
/// field.
///
/// The struct is stored and compared by its field's value.
#[proc_macro_derive(ValueClass)]
pub fn derive_value_class(input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    do_derive_value_class(input.into()).into()
}

/// Implement `MockValue` for a type that is
/// `Clone + Debug + PartialEq + Default + Send + 'static`.
#[proc_macro_derive(MockValue)]
pub fn derive_mock_value(input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    do_derive_mock_value(input.into()).into()
}

#[cfg(test)]
mod t {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check_type_string(ty: TokenStream, expected: &str) {
        let ty: Type = parse2(ty).unwrap();
        assert_eq!(expected, type_string(&ty));
    }

    #[test]
    fn type_string_generic() {
        check_type_string(quote!(Vec<u32>), "Vec<u32>");
        check_type_string(quote!(Option<Vec<u32> >), "Option<Vec<u32>>");
    }

    #[test]
    fn type_string_path() {
        check_type_string(quote!(std::string::String), "std::string::String");
    }

    #[test]
    fn type_string_reference() {
        check_type_string(quote!(&DummyValue), "&DummyValue");
    }

    #[test]
    fn type_string_tuple() {
        check_type_string(quote!((u8, String)), "(u8, String)");
    }

    #[test]
    fn mock_ident() {
        let i = format_ident!("Foo");
        assert_eq!("MockFoo", gen_mock_ident(&i).to_string());
    }
}
