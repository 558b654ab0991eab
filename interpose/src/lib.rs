// vim: tw=80
//! Call interception and stub resolution for test doubles.
//!
//! Interpose creates mock versions of traits whose behavior is declared by
//! *recording* calls: the stubbed call is written out, inside a closure,
//! exactly the way the code under test would make it.
//!
//! # Usage
//!
//! * Annotate a trait with [`#[automock]`](automock).  This generates a mock
//!   struct whose name is the trait's name with "Mock" prepended.
//! * Create a mock with `MockFoo::new()` (unstubbed calls fail) or
//!   `MockFoo::relaxed()` (unstubbed calls return defaults).
//! * Declare stubs with [`every`].  Arguments may be literal values or
//!   argument matchers such as [`any`], [`capture`] and [`matching`].
//! * Supply the mock to the code under test.
//! * Check which calls were made with [`verify`] and friends.
//!
//! ## Getting Started
//! ```
//! use interpose::*;
//!
//! #[automock]
//! trait MyTrait {
//!     fn foo(&self, x: u32) -> u32;
//! }
//!
//! fn call_with_four(x: &dyn MyTrait) -> u32 {
//!     x.foo(4)
//! }
//!
//! let mock = MockMyTrait::new();
//! every(|| mock.foo(4)).returns(5);
//! assert_eq!(5, call_with_four(&mock));
//! verify(|| mock.foo(4));
//! ```
//!
//! ## Return values
//!
//! A stub can return a constant, a list of values in turn, or a value computed
//! from the call.
//!
//! ```
//! # use interpose::*;
//! #[automock]
//! trait MyTrait {
//!     fn foo(&self) -> u32;
//!     fn bar(&self, x: u32, y: u32) -> u32;
//! }
//!
//! let mock = MockMyTrait::new();
//! every(|| mock.foo()).returns_many(vec![1, 2]);
//! every(|| mock.bar(any(), any()))
//!     .answers(|call| call.first_arg::<u32>() + call.second_arg::<u32>());
//! assert_eq!(1, mock.foo());
//! assert_eq!(2, mock.foo());
//! assert_eq!(2, mock.foo());
//! assert_eq!(7, mock.bar(3, 4));
//! ```
//!
//! ## Value classes
//!
//! A value class is a struct with exactly one field that should behave like
//! the value it wraps.  Derive [`ValueClass`] for it.  Its instances are
//! stored and compared by their unwrapped value, so a stub declared with one
//! instance matches calls made with any equal instance, and matchers like
//! [`any`] and [`capture`] work on them like on any other type.
//!
//! ```
//! # use interpose::*;
//! #[derive(Clone, Debug, PartialEq, ValueClass)]
//! struct DummyValue(i32);
//!
//! #[automock]
//! trait DummyService {
//!     fn request_value(&self) -> DummyValue;
//!     fn process_value(&self, value: DummyValue) -> DummyValue;
//! }
//!
//! let mock = MockDummyService::new();
//! every(|| mock.process_value(DummyValue(1))).returns(DummyValue(42));
//! assert_eq!(DummyValue(42), mock.process_value(DummyValue(1)));
//! verify_times(Times::once(), || mock.process_value(DummyValue(1)));
//! ```
//!
//! Other types used as arguments or return values need [`MockValue`], which
//! `#[derive(MockValue)]` provides for any `Clone + Debug + PartialEq +
//! Default + Send + 'static` type.
//!
//! ## Matching arguments
//!
//! When a stub is declared with literal arguments, it only matches calls with
//! equal arguments.  The matchers [`any`], [`eq`], [`capture`] and
//! [`matching`] may be used instead, and may be mixed with literals.  When
//! several stubs match a call, the most recently declared one wins.  Declaring
//! a stub with the same method and the same matchers as an earlier one replaces
//! it.
//!
//! The closure passed to [`every`] or [`verify`] is called twice, and matchers
//! return a different placeholder each time.  That is how the recorder tells
//! matchers from literals.  Types that derive [`MockValue`] have only one
//! placeholder, their default.  A literal equal to it, mixed with a matcher
//! for the same type, is [`Error::AmbiguousMatcher`].  Wrap such literals in
//! [`eq`].
//!
//! ## Relaxed mocks
//!
//! A relaxed mock returns [`MockValue::default_value`] for any unstubbed call.
//! With [`MockConfig::relax_unit_fun`], only methods returning `()` are
//! relaxed.  The environment variables `INTERPOSE_RELAXED` and
//! `INTERPOSE_RELAX_UNIT_FUN` turn these on for every mock.
//!
//! ## Verification
//!
//! [`verify`], [`verify_times`] and [`verify_not_called`] count the recorded
//! calls that match an expectation.  [`confirm_verified`] checks that no call
//! escaped verification.
//!
//! ## Function mocks
//!
//! [`MockFn`] mocks a bare function signature.
//!
//! ## Failures
//!
//! Failures panic at the call site, which fails the test.  Each such function
//! has a `try_` twin that returns [`Error`] instead.
//!
//! ## Crate features
//!
//! * **nightly** - Better compile errors from the proc macros.  Requires a
//!   nightly compiler.

mod call;
mod error;
mod handle;
mod matcher;
mod mock_fn;
mod recorder;
mod settings;
mod slot;
mod stub;
mod value;
mod verify;

pub use interpose_derive::{automock, MockValue, ValueClass};
pub use predicates::prelude::{Predicate, predicate};

pub use crate::{
    call::{Call, MethodId},
    error::Error,
    handle::{
        InvocationRecord,
        Mock,
        MockConfig,
        MockHandle,
        clear_mocks,
        mock,
        mock_with,
        relaxed_mock
    },
    matcher::{ArgumentMatcher, any, capture, eq, matching},
    mock_fn::{ArgList, MockFn},
    recorder::{Mode, mode},
    settings::{Settings, settings},
    slot::{Slot, slot},
    stub::{Stubbing, every, try_every},
    value::{MockValue, Repr, TypeTag, ValueClass},
    verify::{
        Times,
        confirm_verified,
        try_confirm_verified,
        try_verify,
        verify,
        verify_not_called,
        verify_times
    }
};

#[doc(hidden)]
pub use crate::value::{DynValue, downcast_underlying};
