// vim: tw=80
use std::fmt;

use crate::{Error, MockValue, Repr};

/// Identifies one mockable method: its name and its parameter list.
///
/// `#[automock]` generates one of these for every method of the mocked trait.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MethodId {
    name: &'static str,
    params: &'static str,
    arity: usize
}

impl MethodId {
    /// # Arguments
    ///
    /// * `name`:   The method's name
    /// * `params`: The method's parameter types, rendered as source text
    /// * `arity`:  Number of parameters, not counting the receiver
    pub const fn new(name: &'static str, params: &'static str, arity: usize)
        -> Self
    {
        MethodId{name, params, arity}
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &'static str {
        self.params
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params)
    }
}

/// Render a call like `process_value(DummyValue(1))`
pub(crate) fn render_call<T: fmt::Debug>(method: &MethodId, args: &[T])
    -> String
{
    let rendered = args.iter()
        .map(|a| format!("{:?}", a))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", method.name(), rendered)
}

/// A live call on a mock, as seen by an answer closure.
///
/// # Examples
/// ```
/// # use interpose::*;
/// #[automock]
/// trait Adder {
///     fn add(&self, x: u32, y: u32) -> u32;
/// }
///
/// let mock = MockAdder::new();
/// every(|| mock.add(any(), any()))
///     .answers(|call| call.first_arg::<u32>() + call.second_arg::<u32>());
/// assert_eq!(5, mock.add(2, 3));
/// ```
pub struct Call<'a> {
    mock: &'a str,
    method: MethodId,
    args: &'a [Repr]
}

impl<'a> Call<'a> {
    pub(crate) fn new(mock: &'a str, method: MethodId, args: &'a [Repr])
        -> Self
    {
        Call{mock, method, args}
    }

    /// Name of the mock that received this call
    pub fn mock(&self) -> &str {
        self.mock
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Erased arguments, in declaration order
    pub fn args(&self) -> &[Repr] {
        self.args
    }

    pub fn n_args(&self) -> usize {
        self.args.len()
    }

    /// Fetch the `n`th argument.
    ///
    /// Fails if there is no such argument or if it isn't a `T`.
    pub fn try_arg<T: MockValue>(&self, n: usize) -> Result<T, Error> {
        match self.args.get(n) {
            Some(repr) => repr.get(),
            None => Err(Error::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: format!("no argument #{} in {}", n,
                               render_call(&self.method, self.args))
            })
        }
    }

    /// Fetch the `n`th argument, panicking if it doesn't exist or has the
    /// wrong type.
    pub fn arg<T: MockValue>(&self, n: usize) -> T {
        self.try_arg(n).unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn first_arg<T: MockValue>(&self) -> T {
        self.arg(0)
    }

    pub fn second_arg<T: MockValue>(&self) -> T {
        self.arg(1)
    }

    pub fn third_arg<T: MockValue>(&self) -> T {
        self.arg(2)
    }

    pub fn last_arg<T: MockValue>(&self) -> T {
        self.arg(self.args.len().saturating_sub(1))
    }
}

impl fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.mock, render_call(&self.method, self.args))
    }
}
