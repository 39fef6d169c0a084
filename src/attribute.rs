//! Vertex attribute descriptors: a semantic name, an element format, and a
//! strided view into a vertex buffer.

use std::fmt;

use bytemuck::Pod;

use crate::view::RawView;

/// Semantic role of a vertex attribute.
///
/// `Custom` carries an open identifier range for application-defined
/// channels; the named roles each have a fixed whitelist of permitted
/// [`AttributeFormat`]s (see [`allows`](Self::allows)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeName {
    Position,
    Normal,
    TextureCoordinates,
    Color,
    Custom(u16),
}

impl AttributeName {
    /// Whether `format` is a permitted element format for this name:
    ///
    /// | name                 | formats          |
    /// |----------------------|------------------|
    /// | `Position`           | Vector2, Vector3 |
    /// | `Normal`             | Vector3          |
    /// | `TextureCoordinates` | Vector2          |
    /// | `Color`              | Vector3, Vector4 |
    /// | `Custom`             | any              |
    pub fn allows(self, format: AttributeFormat) -> bool {
        use AttributeFormat::{Vector2, Vector3, Vector4};
        match self {
            Self::Position => matches!(format, Vector2 | Vector3),
            Self::Normal => matches!(format, Vector3),
            Self::TextureCoordinates => matches!(format, Vector2),
            Self::Color => matches!(format, Vector3 | Vector4),
            Self::Custom(_) => true,
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("Position"),
            Self::Normal => f.write_str("Normal"),
            Self::TextureCoordinates => f.write_str("TextureCoordinates"),
            Self::Color => f.write_str("Color"),
            Self::Custom(id) => write!(f, "Custom({id})"),
        }
    }
}

/// Element format of a vertex attribute: the component arity of an `f32`
/// vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    Vector2,
    Vector3,
    Vector4,
}

impl AttributeFormat {
    /// Number of `f32` components.
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Self::Vector2 => 2,
            Self::Vector3 => 3,
            Self::Vector4 => 4,
        }
    }

    /// Size of one element of this format, in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }
}

impl fmt::Display for AttributeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vector2 => "Vector2",
            Self::Vector3 => "Vector3",
            Self::Vector4 => "Vector4",
        })
    }
}

/// Errors from constructing an [`AttributeData`] descriptor.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum AttributeError {
    #[error("{format} is not a valid format for {name}")]
    InvalidFormat {
        format: AttributeFormat,
        name: AttributeName,
    },
    #[error("view stride {stride} is not large enough to contain {format}")]
    StrideTooSmall {
        stride: usize,
        format: AttributeFormat,
    },
}

mod sealed {
    pub trait Sealed {}
}

/// Types usable as typed vertex attribute elements.
pub trait AttributeType: sealed::Sealed + Pod {
    /// Runtime tag matching this type's layout.
    const FORMAT: AttributeFormat;
}

/// Implements [`AttributeType`] for types of a given format, asserting at
/// compile time that each type's size matches the tag it claims.
macro_rules! impl_attribute_type {
    ($fmt:ident => $($t:ty),+ $(,)?) => {$(
        const _: () = {
            static_assertions::const_assert_eq!(
                std::mem::size_of::<$t>(), AttributeFormat::$fmt.size());
        };
        impl sealed::Sealed for $t {}
        impl AttributeType for $t {
            const FORMAT: AttributeFormat = AttributeFormat::$fmt;
        }
    )+};
}

impl_attribute_type!(Vector2 => nalgebra::Vector2<f32>, nalgebra::Point2<f32>, [f32; 2]);
impl_attribute_type!(Vector3 => nalgebra::Vector3<f32>, nalgebra::Point3<f32>, [f32; 3]);
impl_attribute_type!(Vector4 => nalgebra::Vector4<f32>, nalgebra::Point4<f32>, [f32; 4]);

/// Describes one vertex attribute: a semantic name, an element format, and a
/// [`RawView`] locating the elements inside a vertex buffer.
///
/// The view's element count is the attribute's vertex count. An empty view
/// is a legal placeholder -- it carries name and format for a mesh with no
/// stored vertex data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeData {
    name: AttributeName,
    format: AttributeFormat,
    view: RawView,
}

impl AttributeData {
    /// Descriptor over a tightly packed typed slice; the format is inferred
    /// from `T` and checked against `name`'s whitelist.
    pub fn new<T: AttributeType>(name: AttributeName, data: &[T]) -> Result<Self, AttributeError> {
        Self::from_view(name, T::FORMAT, RawView::from_slice(data))
    }

    /// Type-erased descriptor: an explicit format over a raw view. On top of
    /// the whitelist check, a non-empty view's stride must be able to hold
    /// one element of `format`.
    pub fn from_view(
        name: AttributeName,
        format: AttributeFormat,
        view: RawView,
    ) -> Result<Self, AttributeError> {
        if !name.allows(format) {
            return Err(AttributeError::InvalidFormat { format, name });
        }
        if !view.is_empty() && view.stride() < format.size() {
            return Err(AttributeError::StrideTooSmall {
                stride: view.stride(),
                format,
            });
        }
        Ok(Self { name, format, view })
    }

    #[inline]
    pub fn name(&self) -> AttributeName {
        self.name
    }

    #[inline]
    pub fn format(&self) -> AttributeFormat {
        self.format
    }

    /// Number of elements, i.e. this attribute's vertex count.
    #[inline]
    pub fn count(&self) -> usize {
        self.view.count()
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.view.stride()
    }

    #[inline]
    pub fn view(&self) -> RawView {
        self.view
    }
}
