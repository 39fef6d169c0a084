//! Index descriptors: which integer width a mesh's index buffer uses, and
//! where inside that buffer the indices live.

use bytemuck::Pod;
use num_traits::{AsPrimitive, Unsigned};

use crate::view::RawView;

/// Width of a single stored index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U8,
    U16,
    U32,
}

impl IndexFormat {
    /// Size of one index of this format, in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

impl std::fmt::Display for IndexFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
        })
    }
}

/// Errors from constructing an [`IndexData`] descriptor.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("index view can't be empty, create a non-indexed mesh instead")]
    Empty,
    #[error("view size {size} does not correspond to {format} indices")]
    SizeMismatch { size: usize, format: IndexFormat },
}

mod sealed {
    pub trait Sealed {}
}

/// Integer types usable as stored mesh indices.
pub trait IndexType: sealed::Sealed + Pod + Unsigned + AsPrimitive<u32> {
    /// Runtime tag matching this type's width.
    const FORMAT: IndexFormat;
}

macro_rules! impl_index_type {
    ($($t:ty => $fmt:ident),+ $(,)?) => {$(
        const _: () = {
            // the runtime tag must agree with the type's actual width
            static_assertions::const_assert_eq!(
                std::mem::size_of::<$t>(), IndexFormat::$fmt.size());
        };
        impl sealed::Sealed for $t {}
        impl IndexType for $t {
            const FORMAT: IndexFormat = IndexFormat::$fmt;
        }
    )+};
}

impl_index_type!(u8 => U8, u16 => U16, u32 => U32);

/// Describes the index side of a mesh: an integer width plus a [`RawView`]
/// over tightly packed indices, or "not indexed" ([`IndexData::none`]).
///
/// "Indexed with zero indices" is not representable: constructing a
/// descriptor from an empty view is an error, and the non-indexed state has
/// no width or view at all.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexData {
    format: Option<IndexFormat>,
    view: RawView,
}

impl IndexData {
    /// Descriptor over a typed index slice; the width is recorded from `T`.
    pub fn new<T: IndexType>(indices: &[T]) -> Result<Self, IndexError> {
        if indices.is_empty() {
            return Err(IndexError::Empty);
        }
        Ok(Self {
            format: Some(T::FORMAT),
            view: RawView::from_slice(indices),
        })
    }

    /// Type-erased descriptor: an explicit width over raw bytes. The byte
    /// length must be a positive exact multiple of the width.
    pub fn from_bytes(format: IndexFormat, data: &[u8]) -> Result<Self, IndexError> {
        if data.is_empty() {
            return Err(IndexError::Empty);
        }
        if data.len() % format.size() != 0 {
            return Err(IndexError::SizeMismatch {
                size: data.len(),
                format,
            });
        }
        let count = data.len() / format.size();
        Ok(Self {
            format: Some(format),
            view: RawView::strided(data, 0, count, format.size()),
        })
    }

    /// The non-indexed descriptor.
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.format.is_some()
    }

    #[inline]
    pub fn format(&self) -> Option<IndexFormat> {
        self.format
    }

    /// Number of stored indices (0 when not indexed).
    #[inline]
    pub fn count(&self) -> usize {
        self.view.count()
    }

    #[inline]
    pub fn view(&self) -> RawView {
        self.view
    }
}
