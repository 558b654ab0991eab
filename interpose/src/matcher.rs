// vim: tw=80
//! Argument matchers.
//!
//! Matchers are created inside the closure passed to [`every`](crate::every)
//! or [`verify`](crate::verify).  Each constructor registers a pending matcher
//! with the thread's recorder and returns a placeholder value of the
//! argument's type, which satisfies the method signature.  When the mock
//! method is then called, the recorder assigns the pending matchers to the
//! argument positions that received their placeholders.

use predicates::Predicate;
use predicates_tree::CaseTreeExt;
use std::{fmt, sync::Arc};

use crate::{
    MockValue,
    Repr,
    TypeTag,
    recorder,
    slot::{Sink, Slot}
};

/// Type-erased form of a `Predicate<T>`
struct ErasedPredicate {
    description: String,
    eval: Box<dyn Fn(&Repr) -> bool + Send + Sync>,
    explain: Box<dyn Fn(&Repr) -> Option<String> + Send + Sync>
}

/// Decides whether one argument of a call satisfies a stub or a verification.
#[derive(Clone)]
pub enum ArgumentMatcher {
    /// Equal to this value, compared by underlying value and type tag
    Exact(Repr),
    /// Any value of the tagged type
    Any(TypeTag),
    /// Any value of the tagged type, which will be stored into a slot
    #[doc(hidden)]
    Capture(TypeTag, Arc<dyn Sink>),
    #[doc(hidden)]
    Predicate(TypeTag, Arc<ErasedPredicateHandle>)
}

#[doc(hidden)]
pub struct ErasedPredicateHandle(ErasedPredicate);

impl ArgumentMatcher {
    pub fn accepts(&self, arg: &Repr) -> bool {
        match self {
            ArgumentMatcher::Exact(expected) => expected == arg,
            ArgumentMatcher::Any(tag) => *tag == arg.tag(),
            ArgumentMatcher::Capture(tag, _) => *tag == arg.tag(),
            ArgumentMatcher::Predicate(tag, p) =>
                *tag == arg.tag() && (p.0.eval)(arg)
        }
    }

    /// Type of the arguments this matcher can accept
    pub fn tag(&self) -> TypeTag {
        match self {
            ArgumentMatcher::Exact(v) => v.tag(),
            ArgumentMatcher::Any(tag)
                | ArgumentMatcher::Capture(tag, _)
                | ArgumentMatcher::Predicate(tag, _) => *tag
        }
    }

    /// Two matchers have the same shape if a stub registered with one should
    /// replace a stub registered with the other.
    pub(crate) fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (ArgumentMatcher::Exact(a), ArgumentMatcher::Exact(b)) => a == b,
            (ArgumentMatcher::Any(a), ArgumentMatcher::Any(b)) => a == b,
            (ArgumentMatcher::Capture(_, a), ArgumentMatcher::Capture(_, b)) =>
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const (),
            (ArgumentMatcher::Predicate(_, a),
             ArgumentMatcher::Predicate(_, b)) => Arc::ptr_eq(a, b),
            _ => false
        }
    }

    /// Store `arg` if this is a capturing matcher
    pub(crate) fn capture(&self, arg: &Repr) -> Result<(), crate::Error> {
        if let ArgumentMatcher::Capture(_, sink) = self {
            sink.store(arg)?;
        }
        Ok(())
    }

    /// Describe why `arg` is rejected, if it is
    pub(crate) fn explain(&self, arg: &Repr) -> Option<String> {
        if self.accepts(arg) {
            return None;
        }
        match self {
            ArgumentMatcher::Predicate(tag, p) if *tag == arg.tag() =>
                (p.0.explain)(arg)
                    .or_else(|| Some(format!("{:?} failed {}", arg, self))),
            _ => Some(format!("{:?} is not {}", arg, self))
        }
    }
}

impl fmt::Display for ArgumentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArgumentMatcher::Exact(v) => write!(f, "{:?}", v),
            ArgumentMatcher::Any(tag) => write!(f, "any::<{}>()", tag),
            ArgumentMatcher::Capture(tag, _) =>
                write!(f, "capture::<{}>()", tag),
            ArgumentMatcher::Predicate(_, p) => f.write_str(&p.0.description)
        }
    }
}

impl fmt::Debug for ArgumentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Register `matcher` with the recorder and return a placeholder for it
fn pending<T: MockValue>(matcher: ArgumentMatcher) -> T {
    recorder::push_matcher::<T>(matcher)
}

/// Match any argument of type `T`.
///
/// # Examples
/// ```
/// # use interpose::*;
/// #[derive(Clone, Debug, PartialEq, ValueClass)]
/// struct DummyValue(i32);
///
/// #[automock]
/// trait DummyService {
///     fn process_value(&self, value: DummyValue) -> DummyValue;
/// }
///
/// let mock = MockDummyService::new();
/// every(|| mock.process_value(any())).returns(DummyValue(42));
/// assert_eq!(DummyValue(42), mock.process_value(DummyValue(1)));
/// ```
pub fn any<T: MockValue>() -> T {
    pending(ArgumentMatcher::Any(TypeTag::of::<T>()))
}

/// Match an argument equal to `value`.
///
/// Passing `value` directly has the same effect, but `eq` may be mixed freely
/// with other matchers.
pub fn eq<T: MockValue>(value: T) -> T {
    pending(ArgumentMatcher::Exact(value.into_repr()))
}

/// Match any argument of type `T`, storing it into `slot` whenever the stub
/// or verification matches.
pub fn capture<T: MockValue>(slot: &Slot<T>) -> T {
    pending(ArgumentMatcher::Capture(TypeTag::of::<T>(), slot.sink()))
}

/// Match any argument satisfying a [`Predicate`].
///
/// # Examples
/// ```
/// # use interpose::*;
/// #[automock]
/// trait Foo {
///     fn foo(&self, x: u32) -> u32;
/// }
///
/// let mock = MockFoo::new();
/// every(|| mock.foo(matching(predicate::gt(10u32)))).returns(1);
/// every(|| mock.foo(matching(predicate::le(10u32)))).returns(2);
/// assert_eq!(1, mock.foo(11));
/// assert_eq!(2, mock.foo(3));
/// ```
pub fn matching<T, P>(predicate: P) -> T
    where T: MockValue,
          P: Predicate<T> + Send + Sync + 'static
{
    let predicate = Arc::new(predicate);
    let p2 = predicate.clone();
    let erased = ErasedPredicate {
        description: predicate.to_string(),
        eval: Box::new(move |repr| {
            repr.get::<T>()
                .map(|v| predicate.eval(&v))
                .unwrap_or(false)
        }),
        explain: Box::new(move |repr| {
            let v = repr.get::<T>().ok()?;
            p2.find_case(false, &v)
                .map(|case| case.tree().to_string())
        })
    };
    pending(ArgumentMatcher::Predicate(TypeTag::of::<T>(),
        Arc::new(ErasedPredicateHandle(erased))))
}

#[cfg(test)]
mod t {
    use super::*;

    #[test]
    fn any_checks_the_tag() {
        let m = ArgumentMatcher::Any(TypeTag::of::<u32>());
        assert!(m.accepts(&5u32.into_repr()));
        assert!(!m.accepts(&5i32.into_repr()));
    }

    #[test]
    fn exact_shape() {
        let a = ArgumentMatcher::Exact(5u32.into_repr());
        let b = ArgumentMatcher::Exact(5u32.into_repr());
        let c = ArgumentMatcher::Exact(6u32.into_repr());
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
        assert!(!a.same_shape(&ArgumentMatcher::Any(TypeTag::of::<u32>())));
    }

    #[test]
    fn capture_shape_is_slot_identity() {
        let s1 = Slot::<u32>::new();
        let s2 = Slot::<u32>::new();
        let tag = TypeTag::of::<u32>();
        let a = ArgumentMatcher::Capture(tag, s1.sink());
        let b = ArgumentMatcher::Capture(tag, s1.clone().sink());
        let c = ArgumentMatcher::Capture(tag, s2.sink());
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn explain_exact() {
        let m = ArgumentMatcher::Exact(5u32.into_repr());
        assert_eq!(None, m.explain(&5u32.into_repr()));
        assert_eq!(Some("6 is not 5".to_owned()), m.explain(&6u32.into_repr()));
    }
}
