// vim: tw=80
//! The erased value model shared by matchers, stubs and the invocation log.
//!
//! Every argument and return value that crosses a mock boundary is converted
//! into a [`Repr`]: a [`TypeTag`] naming the declared type plus the
//! *underlying* value.  For ordinary types the underlying value is the value
//! itself.  For [value classes](ValueClass) it is the wrapped value, unwrapped
//! recursively, so two wrappers are equal exactly when their tags and their
//! innermost values are equal.

use downcast::{downcast, Any};
use std::{
    any::{self, TypeId},
    fmt,
    hash::{Hash, Hasher}
};

use crate::Error;

/// An erased, clonable, comparable underlying value.
#[doc(hidden)]
pub trait DynValue: Any + fmt::Debug + Send {
    fn eq_dyn(&self, other: &dyn DynValue) -> bool;
    fn clone_dyn(&self) -> Box<dyn DynValue>;
}
downcast!(dyn DynValue);

impl<T> DynValue for T
    where T: Clone + fmt::Debug + PartialEq + Send + 'static
{
    fn eq_dyn(&self, other: &dyn DynValue) -> bool {
        other.downcast_ref::<T>()
            .map(|o| o == self)
            .unwrap_or(false)
    }

    fn clone_dyn(&self) -> Box<dyn DynValue> {
        Box::new(self.clone())
    }
}

/// Identifies the declared type of an argument or return value.
///
/// For a value class this is the wrapper type, not the wrapped one.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
    value_class: bool
}

impl TypeTag {
    pub fn of<T: MockValue>() -> Self {
        TypeTag {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
            value_class: T::VALUE_CLASS
        }
    }

    /// Fully qualified name of the tagged type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path, eg `DummyValue`
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(i) => &self.name[i + 2..],
            None => self.name
        }
    }

    pub fn is_value_class(&self) -> bool {
        self.value_class
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// The stored form of an argument or return value.
pub struct Repr {
    tag: TypeTag,
    value: Box<dyn DynValue>
}

impl Repr {
    #[doc(hidden)]
    pub fn new(tag: TypeTag, value: Box<dyn DynValue>) -> Self {
        Repr{tag, value}
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    #[doc(hidden)]
    pub fn into_parts(self) -> (TypeTag, Box<dyn DynValue>) {
        (self.tag, self.value)
    }

    /// Recover a typed value.  Fails if `T` is not the tagged type.
    pub fn get<T: MockValue>(&self) -> Result<T, Error> {
        T::from_repr(self.clone())
    }
}

impl Clone for Repr {
    fn clone(&self) -> Self {
        Repr {
            tag: self.tag,
            value: (*self.value).clone_dyn()
        }
    }
}

impl PartialEq for Repr {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && (*self.value).eq_dyn(&*other.value)
    }
}

impl fmt::Debug for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.tag.is_value_class() {
            write!(f, "{}({:?})", self.tag.short_name(), self.value)
        } else {
            write!(f, "{:?}", self.value)
        }
    }
}

/// A type that may be passed to or returned from a mocked method.
///
/// Usually implemented with `#[derive(MockValue)]` or
/// `#[derive(ValueClass)]`.  Implementations for the primitive types,
/// `String`, `()`, `Option` and `Vec` are provided.
pub trait MockValue: Clone + fmt::Debug + Send + Sized + 'static {
    /// Whether this type is a value class, ie. represented by its wrapped
    /// value.
    const VALUE_CLASS: bool = false;

    /// Erase this value into its underlying representation.  Value classes
    /// return the underlying representation of their inner value.
    fn into_underlying(self) -> Box<dyn DynValue>;

    /// Inverse of [`into_underlying`](MockValue::into_underlying).
    fn from_underlying(value: Box<dyn DynValue>) -> Result<Self, Error>;

    /// The value returned by relaxed mocks and by matchers.
    fn default_value() -> Self;

    /// A placeholder distinct from most real values, used to locate matcher
    /// positions while recording.  `seed` is unique within one recording.
    fn signature(_seed: u32) -> Self {
        Self::default_value()
    }

    fn into_repr(self) -> Repr {
        Repr::new(TypeTag::of::<Self>(), self.into_underlying())
    }

    fn from_repr(repr: Repr) -> Result<Self, Error> {
        let expected = TypeTag::of::<Self>();
        let (tag, value) = repr.into_parts();
        if tag != expected {
            return Err(Error::TypeMismatch {
                expected: expected.name(),
                found: tag.name().to_owned()
            });
        }
        Self::from_underlying(value)
    }
}

/// A single-field wrapper that is compared and stored by its wrapped value.
///
/// # Examples
/// ```
/// # use interpose::*;
/// #[derive(Clone, Debug, PartialEq, ValueClass)]
/// struct DummyValue(i32);
///
/// let a = DummyValue(42).into_repr();
/// let b = DummyValue(42).into_repr();
/// assert_eq!(a, b);
/// assert_eq!("DummyValue(42)", format!("{:?}", a));
/// ```
pub trait ValueClass: MockValue {
    type Inner: MockValue;

    fn wrap_value(inner: Self::Inner) -> Self;
    fn unwrap_value(self) -> Self::Inner;
}

/// Recover a concrete underlying value
#[doc(hidden)]
pub fn downcast_underlying<T>(value: Box<dyn DynValue>) -> Result<T, Error>
    where T: DynValue
{
    let found = format!("{:?}", value);
    value.downcast::<T>()
        .map(|b| *b)
        .map_err(|_| Error::TypeMismatch {
            expected: any::type_name::<T>(),
            found
        })
}

macro_rules! plain_value {
    ($($t:ty => |$seed:ident| $sig:expr),* $(,)?) => {
        $(
            impl MockValue for $t {
                fn into_underlying(self) -> Box<dyn DynValue> {
                    Box::new(self)
                }

                fn from_underlying(value: Box<dyn DynValue>)
                    -> Result<Self, Error>
                {
                    downcast_underlying(value)
                }

                fn default_value() -> Self {
                    <$t as Default>::default()
                }

                fn signature($seed: u32) -> Self {
                    $sig
                }
            }
        )*
    }
}

plain_value! {
    u8 => |seed| 0xA5u8.wrapping_add(seed as u8),
    u16 => |seed| 0xA5A5u16.wrapping_add(seed as u16),
    u32 => |seed| 0xA5A5_0000u32.wrapping_add(seed),
    u64 => |seed| 0xA5A5_A5A5_0000_0000u64 + u64::from(seed),
    u128 => |seed| 0xA5A5_A5A5_0000_0000u128 + u128::from(seed),
    usize => |seed| (0xA5A5_0000u32.wrapping_add(seed)) as usize,
    i8 => |seed| i8::MIN.wrapping_add(seed as i8),
    i16 => |seed| i16::MIN.wrapping_add(seed as i16),
    i32 => |seed| i32::MIN.wrapping_add(seed as i32),
    i64 => |seed| i64::MIN + i64::from(seed),
    i128 => |seed| i128::MIN + i128::from(seed),
    isize => |seed| isize::MIN.wrapping_add(seed as isize),
    bool => |seed| seed % 2 == 1,
    char => |seed| char::from_u32(0xE000 + seed % 0x1900).unwrap_or('\u{E000}'),
    f32 => |seed| -3.0e38f32 + seed as f32 * 1.0e32,
    f64 => |seed| -1.0e300f64 - f64::from(seed) * 1.0e285,
    String => |seed| format!("\u{0}interpose#{}", seed),
    () => |_seed| (),
}

impl<T: MockValue + PartialEq> MockValue for Option<T> {
    fn into_underlying(self) -> Box<dyn DynValue> {
        Box::new(self)
    }

    fn from_underlying(value: Box<dyn DynValue>) -> Result<Self, Error> {
        downcast_underlying(value)
    }

    fn default_value() -> Self {
        None
    }

    fn signature(seed: u32) -> Self {
        Some(T::signature(seed))
    }
}

impl<T: MockValue + PartialEq> MockValue for Vec<T> {
    fn into_underlying(self) -> Box<dyn DynValue> {
        Box::new(self)
    }

    fn from_underlying(value: Box<dyn DynValue>) -> Result<Self, Error> {
        downcast_underlying(value)
    }

    fn default_value() -> Self {
        Vec::new()
    }

    fn signature(seed: u32) -> Self {
        vec![T::signature(seed)]
    }
}
