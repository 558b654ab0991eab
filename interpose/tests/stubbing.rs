// vim: tw=80
//! Declaring stubs and resolving calls against them
use interpose::*;
use std::{cell::Cell, rc::Rc};

#[automock]
trait Foo {
    fn foo(&self, x: u32) -> u32;
    fn bar(&self, x: u32, y: u32) -> u32;
    fn baz(&self) -> u32;
    fn name(&self, s: &String) -> String;
    fn unit(&self, x: i64);
    fn factorial(&self, n: u64) -> u64;
}

#[test]
fn returns() {
    let mock = MockFoo::new();
    every(|| mock.foo(4)).returns(5);
    assert_eq!(5, mock.foo(4));
    assert_eq!(5, mock.foo(4));
}

#[test]
fn last_write_wins() {
    let mock = MockFoo::new();
    every(|| mock.foo(4)).returns(5);
    every(|| mock.foo(4)).returns(6);
    assert_eq!(6, mock.foo(4));
}

#[test]
fn most_recent_match_wins() {
    let mock = MockFoo::new();
    every(|| mock.foo(4)).returns(5);
    every(|| mock.foo(any())).returns(6);
    assert_eq!(6, mock.foo(4));
    assert_eq!(6, mock.foo(3));
}

#[test]
fn specific_after_wildcard() {
    let mock = MockFoo::new();
    every(|| mock.foo(any())).returns(6);
    every(|| mock.foo(4)).returns(5);
    assert_eq!(5, mock.foo(4));
    assert_eq!(6, mock.foo(3));
}

#[test]
fn returns_many() {
    let mock = MockFoo::new();
    every(|| mock.baz()).returns_many(vec![1, 2, 3]);
    assert_eq!(1, mock.baz());
    assert_eq!(2, mock.baz());
    assert_eq!(3, mock.baz());
    assert_eq!(3, mock.baz());
}

#[test]
#[should_panic(expected = "returns_many requires at least one value")]
fn returns_many_empty() {
    let mock = MockFoo::new();
    every(|| mock.baz()).returns_many(Vec::new());
}

#[test]
fn answers() {
    let mock = MockFoo::new();
    every(|| mock.bar(any(), any()))
        .answers(|call| call.first_arg::<u32>() * call.second_arg::<u32>());
    assert_eq!(12, mock.bar(3, 4));
}

#[test]
fn answers_may_call_the_mock() {
    let mock = MockFoo::new();
    let m2 = mock.clone();
    every(|| mock.baz()).returns(10);
    every(|| mock.foo(any()))
        .answers(move |call| m2.baz() + call.first_arg::<u32>());
    assert_eq!(13, mock.foo(3));
}

#[test]
fn answers_may_call_their_own_stub() {
    let mock = MockFoo::new();
    let m2 = mock.clone();
    every(|| mock.factorial(any())).answers(move |call| {
        let n = call.first_arg::<u64>();
        if n <= 1 { 1 } else { n * m2.factorial(n - 1) }
    });
    assert_eq!(120, mock.factorial(5));
}

#[test]
fn answers_st() {
    let counter = Rc::new(Cell::new(0u32));
    let c2 = counter.clone();
    let mock = MockFoo::new();
    every(|| mock.baz()).answers_st(move |_| {
        c2.set(c2.get() + 1);
        c2.get()
    });
    assert_eq!(1, mock.baz());
    assert_eq!(2, mock.baz());
    assert_eq!(2, counter.get());
}

#[test]
fn call_describes_itself() {
    let mock = MockFoo::with_config(MockConfig::new().name("foo"));
    every(|| mock.bar(any(), any()))
        .answers(|call| {
            assert_eq!("foo", call.mock());
            assert_eq!("bar", call.method().name());
            assert_eq!(2, call.n_args());
            assert_eq!("foo.bar(1, 2)", format!("{:?}", call));
            call.last_arg::<u32>()
        });
    assert_eq!(2, mock.bar(1, 2));
}

#[test]
#[should_panic(expected = "Type mismatch: expected i64")]
fn answer_reads_wrong_type() {
    let mock = MockFoo::new();
    every(|| mock.foo(any())).answers(|call| call.first_arg::<i64>() as u32);
    mock.foo(1);
}

#[test]
#[should_panic(expected = "Out of cheese")]
fn panics() {
    let mock = MockFoo::new();
    every(|| mock.baz()).panics("Out of cheese");
    mock.baz();
}

#[test]
fn reference_argument() {
    let mock = MockFoo::new();
    every(|| mock.name(&"x".to_owned())).returns("y".to_owned());
    assert_eq!("y", mock.name(&"x".to_owned()));
}

#[test]
fn reference_argument_any() {
    let mock = MockFoo::new();
    every(|| mock.name(&any())).answers(|call| call.first_arg::<String>());
    assert_eq!("echo", mock.name(&"echo".to_owned()));
}

#[test]
fn unit_return() {
    let mock = MockFoo::new();
    every(|| mock.unit(any())).returns(());
    mock.unit(5);
}

#[test]
#[should_panic(expected = "No matching stub found for foo.unit(5)")]
fn unit_return_unstubbed() {
    let mock = MockFoo::with_config(MockConfig::new().name("foo"));
    mock.unit(5);
}

#[test]
#[should_panic(expected = "No matching stub found for foo.foo(6)\n  foo(5):\n    arg #0: 6 is not 5")]
fn near_misses() {
    let mock = MockFoo::with_config(MockConfig::new().name("foo"));
    every(|| mock.foo(5)).returns(1);
    every(|| mock.baz()).returns(1);
    mock.foo(6);
}

#[test]
fn near_misses_explain_predicates() {
    let mock = MockFoo::with_config(MockConfig::new().name("foo"));
    every(|| mock.foo(matching(predicate::gt(10u32)))).returns(1);
    let e = mock.handle()
        .try_invoke::<u32>(MethodId::new("foo", "u32", 1),
                           vec![3u32.into_repr()])
        .unwrap_err();
    let msg = e.to_string();
    assert!(msg.starts_with("No matching stub found for foo.foo(3)"), "{}", msg);
    assert!(msg.contains("var > 10"), "{}", msg);
}

#[test]
fn try_every_nothing_recorded() {
    let mock = MockFoo::new();
    let r = try_every(|| 5u32).map(|_| ());
    assert_eq!(Err(Error::NothingRecorded), r);
    // The mock still works afterwards
    every(|| mock.baz()).returns(1);
    assert_eq!(1, mock.baz());
}

#[test]
#[should_panic(expected = "No mock method was called while recording")]
fn every_nothing_recorded() {
    every(|| 5u32).returns(1);
}

#[test]
fn recording_mode() {
    let mock = MockFoo::relaxed();
    assert_eq!(Mode::Live, mode());
    every(|| {
        assert_eq!(Mode::Recording, mock.handle().mode());
        mock.baz()
    }).returns(3);
    assert_eq!(Mode::Live, mode());
    assert_eq!(3, mock.baz());
}

#[test]
fn recording_does_not_log() {
    let mock = MockFoo::new();
    every(|| mock.baz()).returns(3);
    assert!(mock.handle().invocations().is_empty());
}

#[test]
fn stubs_are_per_mock() {
    let a = MockFoo::new();
    let b = MockFoo::relaxed();
    every(|| a.baz()).returns(3);
    assert_eq!(3, a.baz());
    assert_eq!(0, b.baz());
}
