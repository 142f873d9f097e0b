use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Stable index of a node inside an [`Arena`](super::arena::Arena).
///
/// Stored as `index + 1` so that `Option<Handle>` costs nothing extra; tree and
/// list links are all `Option<Handle>`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    /// Returns the handle for `index`, or `None` if it does not fit the handle width.
    #[inline]
    pub(crate) fn try_from_index(index: usize) -> Option<Self> {
        if index > Self::MAX {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        NonZero::new((index + 1) as RawHandle).map(Self)
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
