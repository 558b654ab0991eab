// vim: tw=80
use std::{fmt, ops::Range};
use tracing::debug;

use crate::{Error, Mock, recorder};

/// How many times a verified call must have happened.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Times {
    /// Allowed call counts.  `usize::MAX` as the end means unbounded.
    range: Range<usize>
}

impl Times {
    pub fn exactly(n: usize) -> Self {
        Times{range: n..n.saturating_add(1)}
    }

    pub fn once() -> Self {
        Times::exactly(1)
    }

    pub fn never() -> Self {
        Times::exactly(0)
    }

    pub fn at_least(n: usize) -> Self {
        Times{range: n..usize::MAX}
    }

    pub fn at_most(n: usize) -> Self {
        Times{range: 0..n.saturating_add(1)}
    }

    /// Between `min` and `max` calls, inclusive
    pub fn between(min: usize, max: usize) -> Self {
        Times{range: min..max.saturating_add(1)}
    }

    pub fn is_satisfied_by(&self, count: usize) -> bool {
        count >= self.range.start
            && (self.range.end == usize::MAX || count < self.range.end)
    }
}

impl Default for Times {
    /// By default a verification requires at least one call
    fn default() -> Self {
        Times::at_least(1)
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Range{start, end} = self.range;
        if end == usize::MAX {
            write!(f, "at least {} {}", start, plural(&start))
        } else if start + 1 == end {
            write!(f, "exactly {} {}", start, plural(&start))
        } else if start == 0 {
            write!(f, "at most {} {}", end - 1, plural(&(end - 1)))
        } else {
            write!(f, "between {} and {} times", start, end - 1)
        }
    }
}

/// "time" or "times", to follow the count `n`
pub(crate) fn plural(n: &usize) -> &'static str {
    if *n == 1 {
        "time"
    } else {
        "times"
    }
}

/// Like [`verify_times`], but return failures instead of panicking.
///
/// On success, returns the number of matching calls.
pub fn try_verify<R, F>(times: Times, f: F) -> Result<usize, Error>
    where F: FnMut() -> R
{
    let expected = recorder::record(f)?;
    let handle = &expected.handle;
    let mut state = handle.state();
    let matching = state.log.iter()
        .enumerate()
        .filter(|(_, rec)| rec.method == expected.method
            && rec.args.len() == expected.matchers.len()
            && expected.matchers.iter()
                .zip(rec.args.iter())
                .all(|(m, a)| m.accepts(a)))
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    let actual = matching.len();
    debug!(mock = %handle.name(), call = %expected.describe(), actual,
        "verifying {}", times);
    if !times.is_satisfied_by(actual) {
        return Err(Error::VerificationFailed {
            mock: handle.name().to_owned(),
            call: expected.describe(),
            expected: times,
            actual
        });
    }
    for i in matching {
        let rec = &mut state.log[i];
        rec.verified = true;
        for (m, a) in expected.matchers.iter().zip(rec.args.iter()) {
            m.capture(a)?;
        }
    }
    Ok(actual)
}

/// Verify that the call made in `f` happened the required number of times.
///
/// Matching calls are flagged as verified for [`confirm_verified`], and
/// capture matchers in `f` receive their arguments.
///
/// # Examples
/// ```
/// # use interpose::*;
/// #[automock]
/// trait Foo {
///     fn foo(&self, x: u32) -> u32;
/// }
///
/// let mock = MockFoo::relaxed();
/// mock.foo(1);
/// mock.foo(2);
/// verify_times(Times::exactly(2), || mock.foo(any()));
/// verify_times(Times::once(), || mock.foo(2));
/// ```
pub fn verify_times<R, F>(times: Times, f: F)
    where F: FnMut() -> R
{
    if let Err(e) = try_verify(times, f) {
        panic!("{}", e);
    }
}

/// Verify that the call made in `f` happened at least once.
pub fn verify<R, F>(f: F)
    where F: FnMut() -> R
{
    verify_times(Times::default(), f)
}

/// Verify that the call made in `f` never happened.
pub fn verify_not_called<R, F>(f: F)
    where F: FnMut() -> R
{
    verify_times(Times::never(), f)
}

/// Like [`confirm_verified`], but return the failure instead of panicking.
pub fn try_confirm_verified(mock: &dyn Mock) -> Result<(), Error> {
    let handle = mock.handle();
    let state = handle.state();
    let unverified = state.log.iter()
        .filter(|rec| !rec.verified)
        .map(|rec| format!("  {}", rec))
        .collect::<Vec<_>>();
    if unverified.is_empty() {
        Ok(())
    } else {
        Err(Error::UnverifiedCalls {
            mock: handle.name().to_owned(),
            calls: unverified.join("\n")
        })
    }
}

/// Check that every call received by `mock` has been matched by some
/// verification.
pub fn confirm_verified(mock: &dyn Mock) {
    if let Err(e) = try_confirm_verified(mock) {
        panic!("{}", e);
    }
}

#[cfg(test)]
mod t {
    use super::*;

    #[test]
    fn display() {
        assert_eq!("exactly 1 time", Times::once().to_string());
        assert_eq!("exactly 0 times", Times::never().to_string());
        assert_eq!("at least 1 time", Times::default().to_string());
        assert_eq!("at least 2 times", Times::at_least(2).to_string());
        assert_eq!("at most 1 time", Times::at_most(1).to_string());
        assert_eq!("at most 3 times", Times::at_most(3).to_string());
        assert_eq!("between 2 and 4 times", Times::between(2, 4).to_string());
    }

    #[test]
    fn satisfied() {
        assert!(Times::at_least(1).is_satisfied_by(1000));
        assert!(!Times::at_least(1).is_satisfied_by(0));
        assert!(Times::never().is_satisfied_by(0));
        assert!(!Times::at_most(2).is_satisfied_by(3));
        assert!(Times::between(2, 4).is_satisfied_by(4));
    }

    #[test]
    fn unbounded_limits() {
        assert!(Times::exactly(usize::MAX).is_satisfied_by(usize::MAX));
        assert!(!Times::exactly(usize::MAX).is_satisfied_by(0));
        assert!(Times::at_most(usize::MAX).is_satisfied_by(usize::MAX));
        assert!(Times::at_most(usize::MAX).is_satisfied_by(0));
        assert!(Times::between(3, usize::MAX).is_satisfied_by(usize::MAX));
        assert!(!Times::between(3, usize::MAX).is_satisfied_by(2));
    }

    #[test]
    fn failure_message() {
        let e = Error::VerificationFailed {
            mock: "foo".to_owned(),
            call: "bar()".to_owned(),
            expected: Times::never(),
            actual: 1
        };
        assert_eq!("Verification failed for foo.bar(): expected to be called exactly 0 times, but was called 1 time",
                   e.to_string());
    }
}
