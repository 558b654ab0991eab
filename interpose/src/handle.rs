// vim: tw=80
use std::{
    any::{self, TypeId},
    fmt,
    sync::{
        Arc,
        Mutex,
        MutexGuard,
        PoisonError,
        atomic::{AtomicUsize, Ordering}
    }
};
use tracing::{debug, trace};

use crate::{
    Call,
    Error,
    MethodId,
    MockValue,
    Repr,
    call::render_call,
    recorder::{self, Mode},
    settings::settings,
    stub::{StubEntry, StubTable}
};

/// Orders invocations across every mock in the process
static NEXT_ORDER: AtomicUsize = AtomicUsize::new(0);
/// Numbers mocks that weren't given a name
static NEXT_MOCK: AtomicUsize = AtomicUsize::new(1);

/// Construction-time options for a mock.
///
/// # Examples
/// ```
/// # use interpose::*;
/// #[automock]
/// trait Foo {
///     fn foo(&self) -> u32;
///     fn bar(&self);
/// }
///
/// let mock: MockFoo = mock_with(MockConfig::new()
///     .relax_unit_fun(true)
///     .name("foo"));
/// mock.bar();
/// assert_eq!("foo", mock.handle().name());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    relaxed: bool,
    relax_unit_fun: bool,
    name: Option<String>
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return default values instead of failing when no stub matches
    pub fn relaxed(mut self, relaxed: bool) -> Self {
        self.relaxed = relaxed;
        self
    }

    /// Allow methods returning `()` to be called without a stub
    pub fn relax_unit_fun(mut self, relax_unit_fun: bool) -> Self {
        self.relax_unit_fun = relax_unit_fun;
        self
    }

    /// Name used in failure messages and logs
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One call received by a mock.
#[derive(Clone, Debug)]
pub struct InvocationRecord {
    pub method: MethodId,
    pub args: Vec<Repr>,
    /// Position of this call among all calls to all mocks
    pub order: usize,
    pub(crate) verified: bool
}

impl InvocationRecord {
    /// Has this call been matched by a verification?
    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

impl fmt::Display for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render_call(&self.method, &self.args))
    }
}

#[derive(Default)]
pub(crate) struct State {
    pub stubs: StubTable,
    pub log: Vec<InvocationRecord>
}

struct Inner {
    name: String,
    relaxed: bool,
    relax_unit_fun: bool,
    state: Mutex<State>
}

/// The identity of one mock, and everything registered on it.
///
/// Clones refer to the same mock.
#[derive(Clone)]
pub struct MockHandle(Arc<Inner>);

impl MockHandle {
    pub fn new(config: MockConfig) -> Self {
        Self::with_default_name(config, "mock")
    }

    fn with_default_name(config: MockConfig, prefix: &str) -> Self {
        let global = settings();
        let name = config.name.unwrap_or_else(|| {
            let n = NEXT_MOCK.fetch_add(1, Ordering::Relaxed);
            format!("{}#{}", prefix, n)
        });
        MockHandle(Arc::new(Inner {
            name,
            relaxed: config.relaxed || global.relaxed,
            relax_unit_fun: config.relax_unit_fun || global.relax_unit_fun,
            state: Mutex::new(State::default())
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_relaxed(&self) -> bool {
        self.0.relaxed
    }

    /// Whether calls on the current thread are currently being recorded
    pub fn mode(&self) -> Mode {
        recorder::mode()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.0.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self, entry: StubEntry) {
        debug!(mock = %self.name(), stub = %entry.describe(), "stub registered");
        self.state().stubs.register(entry);
    }

    /// Dispatch a call to this mock.
    ///
    /// This is what every mocked method does.
    ///
    /// # Panics
    ///
    /// If no stub matches and the mock isn't relaxed, or if the stub's response
    /// has the wrong type.
    pub fn invoke<R: MockValue>(&self, method: MethodId, args: Vec<Repr>) -> R
    {
        self.try_invoke(method, args)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// Like [`invoke`](#method.invoke), but return failures instead of
    /// panicking.
    pub fn try_invoke<R: MockValue>(&self, method: MethodId, args: Vec<Repr>)
        -> Result<R, Error>
    {
        if recorder::intercept(self, method, &args) {
            return Ok(R::default_value());
        }
        let order = NEXT_ORDER.fetch_add(1, Ordering::Relaxed);
        let entry = {
            let mut state = self.state();
            state.log.push(InvocationRecord {
                method,
                args: args.clone(),
                order,
                verified: false
            });
            state.stubs.resolve(&method, &args)
        };
        match entry {
            Some(entry) => {
                trace!(mock = %self.name(), stub = %entry.describe(),
                    "dispatching {}", render_call(&method, &args));
                entry.capture(&args)?;
                let call = Call::new(self.name(), method, &args);
                R::from_repr(entry.respond(&call))
            },
            None if self.0.relaxed => {
                debug!(mock = %self.name(), method = %method,
                    "no stub, returning relaxed default");
                Ok(R::default_value())
            },
            None if self.0.relax_unit_fun
                && TypeId::of::<R>() == TypeId::of::<()>() =>
            {
                Ok(R::default_value())
            },
            None => {
                let near_misses = self.state().stubs
                    .near_misses(&method, &args);
                debug!(mock = %self.name(), method = %method, "no stub found");
                Err(Error::NoStubFound {
                    mock: self.name().to_owned(),
                    call: render_call(&method, &args),
                    near_misses
                })
            }
        }
    }

    /// Every call received so far, oldest first
    pub fn invocations(&self) -> Vec<InvocationRecord> {
        self.state().log.clone()
    }

    /// Forget all stubs and recorded calls
    pub fn clear(&self) {
        let mut state = self.state();
        state.stubs.clear();
        state.log.clear();
    }
}

impl fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Implemented by every mock struct.  Usually generated by
/// [`#[automock]`](crate::automock).
pub trait Mock {
    fn from_handle(handle: MockHandle) -> Self where Self: Sized;
    fn handle(&self) -> &MockHandle;
}

/// Strip the path and generic arguments from a type name
fn short_type_name<T>() -> &'static str {
    let name = any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Create a mock that fails on unstubbed calls
pub fn mock<M: Mock>() -> M {
    mock_with(MockConfig::new())
}

/// Create a mock that returns default values for unstubbed calls
pub fn relaxed_mock<M: Mock>() -> M {
    mock_with(MockConfig::new().relaxed(true))
}

pub fn mock_with<M: Mock>(config: MockConfig) -> M {
    M::from_handle(MockHandle::with_default_name(config, short_type_name::<M>()))
}

/// Forget all stubs and recorded calls of each mock
pub fn clear_mocks(mocks: &[&dyn Mock]) {
    for m in mocks {
        m.handle().clear();
    }
}
