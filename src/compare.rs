//! Three-way comparators over opaque byte payloads.
//!
//! Both collections store raw bytes and delegate ordering to a [`Comparator`]. Unlike a
//! plain `fn(&[u8], &[u8]) -> i32`, a comparator can refuse its input: a failure is a
//! [`CompareError`], never a sentinel that could be mistaken for "less than".

use core::cmp::Ordering;
use core::marker::PhantomData;
use core::mem::size_of;

use thiserror::Error;

/// Why a comparator could not order its operands.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CompareError {
    /// An operand does not have the width the comparator decodes.
    #[error("operand is {actual} bytes, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },

    /// An operand is not a whole number of code units.
    #[error("operand of {len} bytes is not a multiple of the {unit}-byte code unit")]
    Misaligned { len: usize, unit: usize },
}

/// A total order over byte payloads.
///
/// Implemented for every `Fn(&[u8], &[u8]) -> Result<Ordering, CompareError>`, so a closure
/// can be passed wherever a comparator is expected:
///
/// ```
/// use core::cmp::Ordering;
/// use keylist::{CompareError, OrderedList};
///
/// let by_len = |a: &[u8], b: &[u8]| -> Result<Ordering, CompareError> { Ok(a.len().cmp(&b.len())) };
/// let mut list = OrderedList::with_comparator(by_len);
/// list.push_back(b"ccc").unwrap();
/// list.push_back(b"a").unwrap();
/// list.sort().unwrap();
/// assert_eq!(list.front(), Some(&b"a"[..]));
/// ```
pub trait Comparator {
    /// Orders `a` relative to `b`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompareError`] if either operand is not a valid encoding for this comparator.
    fn compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering, CompareError>;
}

impl<F> Comparator for F
where
    F: Fn(&[u8], &[u8]) -> Result<Ordering, CompareError>,
{
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering, CompareError> {
        self(a, b)
    }
}

/// Lexicographic byte order. Never fails.
///
/// For UTF-8 text this is code-point order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bytewise;

impl Comparator for Bytewise {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering, CompareError> {
        Ok(a.cmp(b))
    }
}

/// Fixed-width integers that [`NativeEndian`] knows how to decode.
///
/// Implemented for every primitive integer type.
pub trait NativeInteger: Ord + Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Decodes exactly `WIDTH` native-endian bytes; any other length is `None`.
    fn decode(bytes: &[u8]) -> Option<Self>;
}

macro_rules! native_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl NativeInteger for $ty {
            const WIDTH: usize = size_of::<$ty>();

            #[inline]
            fn decode(bytes: &[u8]) -> Option<Self> {
                bytes.try_into().ok().map(<$ty>::from_ne_bytes)
            }
        }
    )*};
}

native_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Orders native-endian encodings of `T`.
///
/// An operand whose length is not exactly `T::WIDTH` is reported as
/// [`CompareError::InvalidLength`].
///
/// ```
/// use core::cmp::Ordering;
/// use keylist::{CompareError, Comparator, NativeEndian};
///
/// let cmp = NativeEndian::<i32>::new();
/// assert_eq!(cmp.compare(&(-5i32).to_ne_bytes(), &3i32.to_ne_bytes()), Ok(Ordering::Less));
/// assert_eq!(
///     cmp.compare(&[0u8; 8], &3i32.to_ne_bytes()),
///     Err(CompareError::InvalidLength { expected: 4, actual: 8 }),
/// );
/// ```
pub struct NativeEndian<T>(PhantomData<fn() -> T>);

impl<T> NativeEndian<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for NativeEndian<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NativeEndian<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NativeEndian<T> {}

impl<T> core::fmt::Debug for NativeEndian<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("NativeEndian").field(&core::any::type_name::<T>()).finish()
    }
}

impl<T: NativeInteger> NativeEndian<T> {
    fn decode(bytes: &[u8]) -> Result<T, CompareError> {
        T::decode(bytes).ok_or(CompareError::InvalidLength {
            expected: T::WIDTH,
            actual: bytes.len(),
        })
    }
}

impl<T: NativeInteger> Comparator for NativeEndian<T> {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering, CompareError> {
        Ok(Self::decode(a)?.cmp(&Self::decode(b)?))
    }
}

/// Orders NUL-terminated native-endian UTF-16 strings by code unit, like `wcscmp`.
///
/// The string ends at the first NUL unit or at the end of the buffer, whichever comes
/// first; anything after the terminator is ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WideStr;

impl WideStr {
    const UNIT: usize = size_of::<u16>();

    /// Encodes `text` as NUL-terminated native-endian UTF-16.
    #[must_use]
    pub fn encode(text: &str) -> alloc::vec::Vec<u8> {
        text.encode_utf16().chain(core::iter::once(0)).flat_map(u16::to_ne_bytes).collect()
    }

    fn units(bytes: &[u8]) -> Result<impl Iterator<Item = u16> + '_, CompareError> {
        if bytes.len() % Self::UNIT != 0 {
            return Err(CompareError::Misaligned {
                len: bytes.len(),
                unit: Self::UNIT,
            });
        }
        Ok(bytes
            .chunks_exact(Self::UNIT)
            .map(|unit| u16::from_ne_bytes([unit[0], unit[1]]))
            .take_while(|&unit| unit != 0))
    }
}

impl Comparator for WideStr {
    fn compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering, CompareError> {
        Ok(Self::units(a)?.cmp(Self::units(b)?))
    }
}
