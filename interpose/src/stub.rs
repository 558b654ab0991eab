// vim: tw=80
use fragile::Fragile;
use std::{
    marker::PhantomData,
    sync::{Arc, Mutex, PoisonError}
};

use crate::{
    ArgumentMatcher,
    Call,
    Error,
    MethodId,
    MockValue,
    Repr,
    call::render_call,
    recorder::{self, RecordedCall}
};

/// A user-supplied function computing a stub's return value
type AnswerFn = Arc<dyn Fn(&Call) -> Repr + Send + Sync>;

/// How a stub produces its return value
pub(crate) enum Response {
    Value(Repr),
    Answer(AnswerFn),
    /// Return each value in turn, then keep returning the last one
    Many {
        values: Vec<Repr>,
        next: usize
    },
    Panic(String)
}

/// What a response does for one call, decided under the response's lock
enum Step {
    Value(Repr),
    Answer(AnswerFn),
    Panic(String)
}

impl Response {
    fn step(&mut self) -> Step {
        match self {
            Response::Value(v) => Step::Value(v.clone()),
            Response::Answer(f) => Step::Answer(f.clone()),
            Response::Many{values, next} => {
                let i = (*next).min(values.len() - 1);
                *next += 1;
                Step::Value(values[i].clone())
            },
            Response::Panic(msg) => Step::Panic(msg.clone())
        }
    }
}

/// One registered stub: a method, one matcher per parameter, and a response.
#[derive(Clone)]
pub(crate) struct StubEntry {
    pub method: MethodId,
    pub matchers: Vec<ArgumentMatcher>,
    // Locked separately from the stub table, and never while an answer runs,
    // so answers may call back into the mock.
    response: Arc<Mutex<Response>>
}

impl StubEntry {
    pub fn new(method: MethodId, matchers: Vec<ArgumentMatcher>,
               response: Response) -> Self
    {
        StubEntry {
            method,
            matchers,
            response: Arc::new(Mutex::new(response))
        }
    }

    pub fn matches(&self, method: &MethodId, args: &[Repr]) -> bool {
        self.method == *method
            && self.matchers.len() == args.len()
            && self.matchers.iter().zip(args).all(|(m, a)| m.accepts(a))
    }

    fn same_shape(&self, other: &StubEntry) -> bool {
        self.method == other.method
            && self.matchers.len() == other.matchers.len()
            && self.matchers.iter()
                .zip(other.matchers.iter())
                .all(|(a, b)| a.same_shape(b))
    }

    /// Write the arguments of a matching call into any capture slots
    pub fn capture(&self, args: &[Repr]) -> Result<(), Error> {
        for (m, a) in self.matchers.iter().zip(args) {
            m.capture(a)?;
        }
        Ok(())
    }

    pub fn respond(&self, call: &Call) -> Repr {
        let step = self.response.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .step();
        match step {
            Step::Value(v) => v,
            Step::Answer(f) => f(call),
            Step::Panic(msg) => panic!("{}", msg)
        }
    }

    pub fn describe(&self) -> String {
        render_call(&self.method, &self.matchers)
    }

    /// Explain why this stub rejects `args`, one line per failing argument
    pub fn explain(&self, args: &[Repr]) -> String {
        self.matchers.iter()
            .zip(args)
            .enumerate()
            .filter_map(|(i, (m, a))| m.explain(a)
                .map(|why| format!("    arg #{}: {}", i, why)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// All stubs registered on one mock, in registration order.
#[derive(Default)]
pub(crate) struct StubTable(Vec<StubEntry>);

impl StubTable {
    /// Add a stub, replacing any older stub with the same method and matcher
    /// shape.
    pub fn register(&mut self, entry: StubEntry) {
        self.0.retain(|e| !e.same_shape(&entry));
        self.0.push(entry);
    }

    /// Find the most recently registered stub that matches the call
    pub fn resolve(&self, method: &MethodId, args: &[Repr])
        -> Option<StubEntry>
    {
        self.0.iter()
            .rev()
            .find(|e| e.matches(method, args))
            .cloned()
    }

    /// Stubs for `method` that didn't match `args`
    pub fn near_misses(&self, method: &MethodId, args: &[Repr]) -> String {
        self.0.iter()
            .rev()
            .filter(|e| e.method == *method)
            .map(|e| format!("\n  {}:\n{}", e.describe(), e.explain(args)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }
}

/// A recorded call waiting for its response.  Returned by [`every`].
///
/// Nothing is registered until one of the response methods is called.
#[must_use = "a stub has no effect until a response is supplied"]
pub struct Stubbing<R> {
    call: RecordedCall,
    _r: PhantomData<fn() -> R>
}

impl<R: MockValue> Stubbing<R> {
    fn register(self, response: Response) {
        let entry = StubEntry::new(self.call.method, self.call.matchers,
                                   response);
        self.call.handle.register(entry);
    }

    /// Return a constant value
    pub fn returns(self, value: R) {
        self.register(Response::Value(value.into_repr()))
    }

    /// Return each value in turn.  Once exhausted, keep returning the last.
    ///
    /// # Panics
    ///
    /// If `values` is empty.
    pub fn returns_many<I>(self, values: I)
        where I: IntoIterator<Item=R>
    {
        let values = values.into_iter()
            .map(MockValue::into_repr)
            .collect::<Vec<_>>();
        assert!(!values.is_empty(), "returns_many requires at least one value");
        self.register(Response::Many{values, next: 0})
    }

    /// Compute the return value from the call.
    ///
    /// `f` may call back into any mock, including this stub.
    pub fn answers<F>(self, f: F)
        where F: Fn(&Call) -> R + Send + Sync + 'static
    {
        let answer = move |call: &Call| f(call).into_repr();
        self.register(Response::Answer(Arc::new(answer)))
    }

    /// Single-threaded version of [`answers`](#method.answers).  Can be used
    /// when the closure isn't `Send`.
    ///
    /// It is a runtime error to call the mock method from a different thread
    /// than the one that registered this stub.
    pub fn answers_st<F>(self, f: F)
        where F: Fn(&Call) -> R + 'static
    {
        let fragile = Fragile::new(f);
        let answer = move |call: &Call| (fragile.get())(call).into_repr();
        self.register(Response::Answer(Arc::new(answer)))
    }

    /// Panic with `msg` whenever the stub matches
    pub fn panics(self, msg: &str) {
        self.register(Response::Panic(msg.to_owned()))
    }
}

/// Like [`every`], but return recording failures instead of panicking.
pub fn try_every<R, F>(f: F) -> Result<Stubbing<R>, Error>
    where R: MockValue,
          F: FnMut() -> R
{
    let call = recorder::record(f)?;
    Ok(Stubbing{call, _r: PhantomData})
}

/// Declare a stub.
///
/// `f` must call exactly one mock method (the last call wins), with literal
/// arguments or argument matchers.  The returned [`Stubbing`] supplies the
/// response.  A later stub with the same method and matchers replaces this
/// one; otherwise the most recently registered matching stub answers a call.
///
/// `f` is called twice, to tell literal arguments from matchers, so it should
/// have no side effects besides the mock call.
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
/// every(|| mock.foo(any())).returns(1);
/// every(|| mock.foo(5)).returns(2);
/// assert_eq!(1, mock.foo(4));
/// assert_eq!(2, mock.foo(5));
/// ```
///
/// # Panics
///
/// If `f` calls no mock method, leaves a matcher unused, or is itself called
/// from within another `every` or `verify`.
pub fn every<R, F>(f: F) -> Stubbing<R>
    where R: MockValue,
          F: FnMut() -> R
{
    try_every(f).unwrap_or_else(|e| panic!("{}", e))
}

#[cfg(test)]
mod t {
    use super::*;
    use crate::TypeTag;

    const FOO: MethodId = MethodId::new("foo", "u32", 1);
    const BAR: MethodId = MethodId::new("bar", "u32", 1);

    fn exact(method: MethodId, v: u32, r: u32) -> StubEntry {
        StubEntry::new(method,
                       vec![ArgumentMatcher::Exact(v.into_repr())],
                       Response::Value(r.into_repr()))
    }

    fn wild(method: MethodId, r: u32) -> StubEntry {
        StubEntry::new(method,
                       vec![ArgumentMatcher::Any(TypeTag::of::<u32>())],
                       Response::Value(r.into_repr()))
    }

    fn answer(e: &StubEntry, args: &[Repr]) -> u32 {
        let call = Call::new("mock", e.method, args);
        e.respond(&call).get().unwrap()
    }

    #[test]
    fn resolve_most_recent_first() {
        let mut table = StubTable::default();
        table.register(exact(FOO, 5, 1));
        table.register(wild(FOO, 2));
        let args = [5u32.into_repr()];
        let e = table.resolve(&FOO, &args).unwrap();
        assert_eq!(2, answer(&e, &args));
    }

    #[test]
    fn register_replaces_same_shape() {
        let mut table = StubTable::default();
        table.register(exact(FOO, 5, 1));
        table.register(exact(FOO, 6, 3));
        table.register(exact(FOO, 5, 2));
        assert_eq!(2, table.len());
        let args = [5u32.into_repr()];
        let e = table.resolve(&FOO, &args).unwrap();
        assert_eq!(2, answer(&e, &args));
    }

    #[test]
    fn resolve_checks_method() {
        let mut table = StubTable::default();
        table.register(wild(BAR, 2));
        assert!(table.resolve(&FOO, &[5u32.into_repr()]).is_none());
    }

    #[test]
    fn returns_many_repeats_last() {
        let e = StubEntry::new(FOO, vec![], Response::Many {
            values: vec![1u32.into_repr(), 2u32.into_repr()],
            next: 0
        });
        assert_eq!(1, answer(&e, &[]));
        assert_eq!(2, answer(&e, &[]));
        assert_eq!(2, answer(&e, &[]));
    }

    #[test]
    fn near_misses() {
        let mut table = StubTable::default();
        table.register(exact(FOO, 5, 1));
        table.register(wild(BAR, 2));
        let s = table.near_misses(&FOO, &[6u32.into_repr()]);
        assert_eq!("\n  foo(5):\n    arg #0: 6 is not 5", s);
    }
}
