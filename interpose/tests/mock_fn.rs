// vim: tw=80
//! Mocking bare functions
use interpose::*;

#[derive(Clone, Debug, PartialEq, ValueClass)]
struct Celsius(f64);

#[test]
fn no_args() {
    let f = MockFn::<(), u32>::new();
    every(|| f.call(())).returns(5);
    assert_eq!(5, f.call(()));
}

#[test]
fn extension_receiver_is_first_arg() {
    let f = MockFn::<(String,), u32>::new();
    every(|| f.call(("string".to_owned(),))).returns(777);
    every(|| f.call(("other".to_owned(),))).returns(1);
    assert_eq!(777, f.call(("string".to_owned(),)));
    assert_eq!(1, f.call(("other".to_owned(),)));
}

#[test]
fn matchers() {
    let f = MockFn::<(u8, i16, char, Celsius), Celsius>::new();
    every(|| f.call((any(), 2, 'c', any())))
        .answers(|call| call.last_arg::<Celsius>());
    assert_eq!(Celsius(21.5), f.call((9, 2, 'c', Celsius(21.5))));
}

#[test]
fn relaxed() {
    let f = MockFn::<(u32, u32), Celsius>::relaxed();
    assert_eq!(Celsius(0.0), f.call((1, 2)));
    verify(|| f.call((1, 2)));
    confirm_verified(&f);
}

#[test]
#[should_panic(expected = "No matching stub found for f.call(1)")]
fn unstubbed() {
    let f = MockFn::<(u32,), u32>::with_config(MockConfig::new().name("f"));
    f.call((1,));
}

#[test]
fn clones_share_stubs() {
    let f = MockFn::<(u32,), u32>::default();
    let g = f.clone();
    every(|| f.call((1,))).returns(2);
    assert_eq!(2, g.call((1,)));
    verify(|| f.call((1,)));
}
