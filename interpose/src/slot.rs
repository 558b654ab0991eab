// vim: tw=80
use std::{
    any,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError}
};

use crate::{Error, MockValue, Repr};

/// Receives arguments from a [`capture`](crate::capture) matcher.
#[doc(hidden)]
pub trait Sink: Send + Sync {
    fn store(&self, repr: &Repr) -> Result<(), Error>;
}

impl<T: MockValue> Sink for Mutex<Option<T>> {
    fn store(&self, repr: &Repr) -> Result<(), Error> {
        let v = repr.get::<T>()?;
        *self.lock().unwrap_or_else(PoisonError::into_inner) = Some(v);
        Ok(())
    }
}

/// Holds the most recent argument matched by a [`capture`](crate::capture)
/// matcher.
///
/// Clones share the same storage.
///
/// # Examples
/// ```
/// # use interpose::*;
/// #[derive(Clone, Debug, PartialEq, ValueClass)]
/// struct ValueDummy(String);
///
/// #[automock]
/// trait ValueService {
///     fn do_something(&self, value: ValueDummy) -> i32;
/// }
///
/// let mock = MockValueService::relaxed();
/// let slot = slot::<ValueDummy>();
/// every(|| mock.do_something(capture(&slot))).returns(1);
///
/// assert_eq!(1, mock.do_something(ValueDummy("s".to_owned())));
/// assert_eq!(ValueDummy("s".to_owned()), slot.captured());
/// ```
pub struct Slot<T> {
    inner: Arc<Mutex<Option<T>>>
}

impl<T: MockValue> Slot<T> {
    pub fn new() -> Self {
        Slot{inner: Arc::new(Mutex::new(None))}
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recently captured value.
    ///
    /// # Panics
    ///
    /// If nothing has been captured yet.
    pub fn captured(&self) -> T {
        self.try_captured().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn try_captured(&self) -> Result<T, Error> {
        self.lock()
            .clone()
            .ok_or(Error::EmptyCapture{ty: any::type_name::<T>()})
    }

    pub fn is_captured(&self) -> bool {
        self.lock().is_some()
    }

    /// Forget the captured value, if any
    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub(crate) fn sink(&self) -> Arc<dyn Sink> {
        self.inner.clone()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot{inner: self.inner.clone()}
    }
}

impl<T: MockValue> Default for Slot<T> {
    fn default() -> Self {
        Slot::new()
    }
}

impl<T: MockValue> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.lock() {
            Some(v) => write!(f, "Slot({:?})", v),
            None => f.write_str("Slot(<empty>)")
        }
    }
}

/// Create a new, empty [`Slot`]
pub fn slot<T: MockValue>() -> Slot<T> {
    Slot::new()
}
