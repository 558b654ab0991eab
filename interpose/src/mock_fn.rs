// vim: tw=80
//! Mocks of bare functions and closures.
use std::{any, fmt, marker::PhantomData};

use crate::{
    Mock,
    MockConfig,
    MockHandle,
    MockValue,
    Repr,
    MethodId,
    mock_with
};

/// An argument tuple of a mockable function
pub trait ArgList {
    const ARITY: usize;

    fn into_reprs(self) -> Vec<Repr>;
}

macro_rules! arg_list {
    ($n:expr; $($t:ident $v:ident),*) => {
        impl<$($t: MockValue),*> ArgList for ($($t,)*) {
            const ARITY: usize = $n;

            #[allow(unused_variables)]
            fn into_reprs(self) -> Vec<Repr> {
                let ($($v,)*) = self;
                vec![$($v.into_repr()),*]
            }
        }
    }
}

arg_list!(0; );
arg_list!(1; A0 a0);
arg_list!(2; A0 a0, A1 a1);
arg_list!(3; A0 a0, A1 a1, A2 a2);
arg_list!(4; A0 a0, A1 a1, A2 a2, A3 a3);

/// A mock of a function taking the argument tuple `A` and returning `R`.
///
/// The receiver of an extension-style function is simply its first argument.
///
/// # Examples
/// ```
/// # use interpose::*;
/// let f = MockFn::<(String,), u32>::new();
/// every(|| f.call(("string".to_owned(),))).returns(777);
/// assert_eq!(777, f.call(("string".to_owned(),)));
/// ```
pub struct MockFn<A, R> {
    handle: MockHandle,
    _phantom: PhantomData<fn(A) -> R>
}

impl<A: ArgList, R: MockValue> MockFn<A, R> {
    /// All calls share one method identity, named after the signature
    fn method() -> MethodId {
        MethodId::new("call", any::type_name::<A>(), A::ARITY)
    }

    pub fn new() -> Self {
        crate::mock()
    }

    pub fn relaxed() -> Self {
        crate::relaxed_mock()
    }

    pub fn with_config(config: MockConfig) -> Self {
        mock_with(config)
    }

    pub fn call(&self, args: A) -> R {
        self.handle.invoke(Self::method(), args.into_reprs())
    }
}

impl<A: ArgList, R: MockValue> Default for MockFn<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Mock for MockFn<A, R> {
    fn from_handle(handle: MockHandle) -> Self {
        MockFn{handle, _phantom: PhantomData}
    }

    fn handle(&self) -> &MockHandle {
        &self.handle
    }
}

impl<A, R> Clone for MockFn<A, R> {
    fn clone(&self) -> Self {
        MockFn{handle: self.handle.clone(), _phantom: PhantomData}
    }
}

impl<A, R> fmt::Debug for MockFn<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.handle, f)
    }
}
