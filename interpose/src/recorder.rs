// vim: tw=80
//! Records the calls made inside a declaration scope.
//!
//! While a closure passed to [`every`](crate::every) or
//! [`verify`](crate::verify) runs, the current thread is in
//! [`Mode::Recording`].  Mock methods called in that mode don't dispatch.
//! Instead they hand their arguments to the recorder, which turns them into a
//! list of [`ArgumentMatcher`]s, and return a default value.
//!
//! The closure runs twice.  Every matcher returns a different placeholder in
//! each round, so an argument that changes between the rounds came from a
//! matcher and an argument that doesn't is a literal.

use std::{cell::RefCell, mem};
use tracing::warn;

use crate::{
    ArgumentMatcher,
    Error,
    MethodId,
    MockHandle,
    MockValue,
    Repr,
    call::render_call
};

/// Whether mock calls on this thread are being recorded or dispatched
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Live,
    Recording
}

/// The expectation captured from one declaration scope
pub(crate) struct RecordedCall {
    pub handle: MockHandle,
    pub method: MethodId,
    pub matchers: Vec<ArgumentMatcher>
}

impl RecordedCall {
    pub fn describe(&self) -> String {
        render_call(&self.method, &self.matchers)
    }
}

/// A matcher created during one round, and the placeholder it returned
struct Pending {
    placeholder: Repr,
    matcher: ArgumentMatcher
}

/// A mock call made during one round
struct RawCall {
    handle: MockHandle,
    method: MethodId,
    args: Vec<Repr>,
    /// Matchers created since the previous call
    pending: Vec<Pending>
}

#[derive(Default)]
struct Recording {
    round: u32,
    /// Number of matchers created so far in this round
    created: u32,
    pending: Vec<Pending>,
    calls: Vec<RawCall>
}

thread_local! {
    static RECORDING: RefCell<Option<Recording>> = const { RefCell::new(None) };
}

/// Leaves recording mode when dropped, even if the scope panics
struct Guard;

impl Guard {
    fn begin() -> Result<Guard, Error> {
        RECORDING.with(|r| {
            let mut r = r.borrow_mut();
            if r.is_some() {
                Err(Error::NestedRecording)
            } else {
                *r = Some(Recording::default());
                Ok(Guard)
            }
        })
    }

    /// Finish the current round and start the next one
    fn next_round(&self) -> Recording {
        RECORDING.with(|r| {
            let mut r = r.borrow_mut();
            let round = r.as_ref().map_or(0, |rec| rec.round + 1);
            r.replace(Recording{round, ..Recording::default()})
                .unwrap_or_default()
        })
    }

    fn finish(self) -> Recording {
        RECORDING.with(|r| r.borrow_mut().take())
            .unwrap_or_default()
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        RECORDING.with(|r| r.borrow_mut().take());
    }
}

pub fn mode() -> Mode {
    RECORDING.with(|r| {
        if r.borrow().is_some() {
            Mode::Recording
        } else {
            Mode::Live
        }
    })
}

/// The last call of a round.  Matchers created after it are an error.
fn last_call(mut recording: Recording) -> Result<RawCall, Error> {
    let last = recording.calls.pop().ok_or(Error::NothingRecorded)?;
    if !recording.pending.is_empty() {
        return Err(Error::MatcherMisuse {
            call: render_call(&last.method, &last.args),
            unused: recording.pending.len()
        });
    }
    Ok(last)
}

/// Run `f` in recording mode and return the last mock call it made.
///
/// `f` is called twice.
pub(crate) fn record<R, F>(mut f: F) -> Result<RecordedCall, Error>
    where F: FnMut() -> R
{
    let guard = Guard::begin()?;
    drop(f());
    let first = guard.next_round();
    drop(f());
    let second = guard.finish();
    align(last_call(first)?, last_call(second)?)
}

/// Register a matcher and return the placeholder that stands in for it.
pub(crate) fn push_matcher<T: MockValue>(matcher: ArgumentMatcher) -> T {
    RECORDING.with(|r| {
        match r.borrow_mut().as_mut() {
            Some(recording) => {
                recording.created += 1;
                // Distinct per matcher, and different in each round
                let seed = 2 * recording.created + recording.round;
                let placeholder = T::signature(seed);
                recording.pending.push(Pending {
                    placeholder: placeholder.clone().into_repr(),
                    matcher
                });
                placeholder
            },
            None => {
                warn!(matcher = %matcher,
                    "argument matcher used outside of every or verify");
                T::default_value()
            }
        }
    })
}

/// Offer a call to the recorder.  Returns `true` if the thread is recording,
/// in which case the call must not be dispatched.
pub(crate) fn intercept(handle: &MockHandle, method: MethodId, args: &[Repr])
    -> bool
{
    RECORDING.with(|r| {
        let mut r = r.borrow_mut();
        let recording = match r.as_mut() {
            Some(recording) => recording,
            None => return false
        };
        let pending = mem::take(&mut recording.pending);
        recording.calls.push(RawCall {
            handle: handle.clone(),
            method,
            args: args.to_vec(),
            pending
        });
        true
    })
}

/// Find the argument positions that received a matcher.
///
/// Arguments that changed between the rounds came from a matcher.  A matcher
/// whose placeholder is the same in both rounds (eg. for `()` or a type
/// deriving `MockValue`) can only be located by value, and only if no
/// literal argument equals its placeholder.
fn matcher_positions(first: &RawCall, second: &RawCall)
    -> Result<Vec<usize>, Error>
{
    let call = || render_call(&second.method, &second.args);
    let mut positions = second.args.iter()
        .zip(first.args.iter())
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    let fixed = second.pending.iter()
        .zip(first.pending.iter())
        .filter(|(p, q)| p.placeholder == q.placeholder)
        .map(|(p, _)| &p.placeholder)
        .collect::<Vec<_>>();
    if !fixed.is_empty() {
        let candidates = second.args.iter()
            .enumerate()
            .filter(|(i, a)| !positions.contains(i)
                && fixed.iter().any(|p| *p == *a))
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        if candidates.len() > fixed.len() {
            return Err(Error::AmbiguousMatcher{call: call()});
        }
        positions.extend(candidates);
        positions.sort_unstable();
    }
    let n = second.pending.len();
    if positions.len() < n {
        Err(Error::MatcherMisuse{call: call(), unused: n - positions.len()})
    } else if positions.len() > n {
        Err(Error::AmbiguousMatcher{call: call()})
    } else {
        Ok(positions)
    }
}

/// Combine both rounds' views of a call into one expectation.
///
/// If every argument has a matcher they are assigned in order.  Otherwise
/// each argument position found by [`matcher_positions`] takes the next
/// matcher, and the other arguments become exact matches.
fn align(first: RawCall, second: RawCall) -> Result<RecordedCall, Error> {
    if first.method != second.method
        || first.args.len() != second.args.len()
        || first.pending.len() != second.pending.len()
    {
        // The scope made a different call in each round
        return Err(Error::AmbiguousMatcher {
            call: render_call(&second.method, &second.args)
        });
    }
    let positions = if second.pending.len() == second.args.len() {
        (0..second.args.len()).collect()
    } else {
        matcher_positions(&first, &second)?
    };
    let RawCall{handle, method, args, pending} = second;
    let mut matchers = args.iter()
        .cloned()
        .map(ArgumentMatcher::Exact)
        .collect::<Vec<_>>();
    for (i, p) in positions.into_iter().zip(pending) {
        if p.matcher.tag() != args[i].tag() {
            return Err(Error::AmbiguousMatcher {
                call: render_call(&method, &args)
            });
        }
        matchers[i] = p.matcher;
    }
    Ok(RecordedCall{handle, method, matchers})
}

#[cfg(test)]
mod t {
    use super::*;
    use crate::{MockConfig, TypeTag, any};

    const M: MethodId = MethodId::new("foo", "u32, u32", 2);

    fn raw(args: Vec<Repr>, pending: Vec<(Repr, ArgumentMatcher)>)
        -> RawCall
    {
        RawCall {
            handle: MockHandle::new(MockConfig::new()),
            method: M,
            args,
            pending: pending.into_iter()
                .map(|(placeholder, matcher)| Pending{placeholder, matcher})
                .collect()
        }
    }

    fn any_of<T: MockValue>() -> ArgumentMatcher {
        ArgumentMatcher::Any(TypeTag::of::<T>())
    }

    #[test]
    fn align_all_matchers() {
        let round = |a: u32, b: u32| raw(
            vec![a.into_repr(), b.into_repr()],
            vec![(a.into_repr(), any_of::<u32>()),
                 (b.into_repr(), ArgumentMatcher::Exact(3u32.into_repr()))]);
        let m = align(round(1, 2), round(3, 4)).unwrap().matchers;
        assert!(matches!(m[0], ArgumentMatcher::Any(_)));
        assert!(m[1].accepts(&3u32.into_repr()));
    }

    #[test]
    fn align_mixed() {
        let round = |seed| {
            let placeholder = u32::signature(seed).into_repr();
            raw(vec![5u32.into_repr(), placeholder.clone()],
                vec![(placeholder, any_of::<u32>())])
        };
        let m = align(round(2), round(3)).unwrap().matchers;
        assert!(m[0].accepts(&5u32.into_repr()));
        assert!(!m[0].accepts(&6u32.into_repr()));
        assert!(m[1].accepts(&6u32.into_repr()));
    }

    #[test]
    fn align_literal_equal_to_a_placeholder() {
        // The first round's bool placeholder is false, the second's is true
        let round = |b: bool| raw(vec![true.into_repr(), b.into_repr()],
                                  vec![(b.into_repr(), any_of::<bool>())]);
        let m = align(round(false), round(true)).unwrap().matchers;
        assert!(m[0].accepts(&true.into_repr()));
        assert!(!m[0].accepts(&false.into_repr()));
        assert!(m[1].accepts(&false.into_repr()));
    }

    #[test]
    fn align_fixed_placeholder() {
        let round = || raw(vec![7u32.into_repr(), ().into_repr()],
                           vec![(().into_repr(), any_of::<()>())]);
        let m = align(round(), round()).unwrap().matchers;
        assert!(!m[0].accepts(&8u32.into_repr()));
        assert!(matches!(m[1], ArgumentMatcher::Any(_)));
    }

    #[test]
    fn align_ambiguous() {
        let round = || raw(vec![().into_repr(), ().into_repr()],
                           vec![(().into_repr(), any_of::<()>())]);
        assert!(matches!(align(round(), round()),
                         Err(Error::AmbiguousMatcher{..})));
    }

    #[test]
    fn align_unused() {
        let round = |seed| raw(
            vec![5u32.into_repr(), 6u32.into_repr()],
            vec![(u32::signature(seed).into_repr(), any_of::<u32>())]);
        assert_eq!(Err(Error::MatcherMisuse{call: "foo(5, 6)".to_owned(),
                                            unused: 1}),
                   align(round(2), round(3)).map(|_| ()));
    }

    #[test]
    fn scope_runs_twice() {
        let mut n = 0;
        assert_eq!(Err(Error::NothingRecorded), record(|| n += 1).map(|_| ()));
        assert_eq!(2, n);
    }

    #[test]
    fn matcher_outside_recording_returns_default() {
        assert_eq!(Mode::Live, mode());
        assert_eq!(0u32, any::<u32>());
    }

    #[test]
    fn nothing_recorded() {
        assert_eq!(Err(Error::NothingRecorded), record(|| 5).map(|_| ()));
        assert_eq!(Mode::Live, mode());
    }

    #[test]
    fn nested_recording() {
        let mut inner = None;
        let outer = record(|| inner = Some(record(|| ()).map(|_| ())));
        assert_eq!(Some(Err(Error::NestedRecording)), inner);
        assert_eq!(Err(Error::NothingRecorded), outer.map(|_| ()));
    }
}
