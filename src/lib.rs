//! Type-erased mesh geometry container: raw index and vertex byte storage
//! behind validated, strongly typed views.
//!
//! A mesh producer (an importer, a generator) owns byte buffers and knows
//! their layout; a consumer (a renderer) wants typed strided views and
//! zero-copy access to the raw bytes. [`MeshData`] sits between the two: it
//! takes ownership of the buffers, validates every descriptor against them
//! once, at construction, and then serves reads for the rest of its
//! lifetime -- or hands a buffer back out through the `release_*`
//! operations.
//!
//! ```
//! use tessera::{
//!     AttributeData, AttributeFormat, AttributeName, IndexData, IndexFormat, MeshData,
//!     Primitive, RawView,
//! };
//!
//! let index_bytes: Vec<u8> = bytemuck::cast_slice(&[0u16, 1, 2]).to_vec();
//! let vertex_bytes: Vec<u8> =
//!     bytemuck::cast_slice(&[[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]]).to_vec();
//!
//! let indices = IndexData::from_bytes(IndexFormat::U16, &index_bytes)?;
//! let positions = AttributeData::from_view(
//!     AttributeName::Position,
//!     AttributeFormat::Vector2,
//!     RawView::strided(&vertex_bytes, 0, 3, 8),
//! )?;
//!
//! let mesh = MeshData::builder(Primitive::Triangles)
//!     .index_data(index_bytes)
//!     .indices(indices)
//!     .vertex_data(vertex_bytes)
//!     .attribute(positions)
//!     .build()?;
//!
//! assert_eq!(mesh.vertex_count(), 3);
//! assert_eq!(mesh.index_count()?, 3);
//! assert_eq!(mesh.positions_2d(0)?.len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

pub mod attribute;
pub mod index;
pub mod mesh;
mod view;

pub use attribute::{AttributeData, AttributeError, AttributeFormat, AttributeName, AttributeType};
pub use index::{IndexData, IndexError, IndexFormat, IndexType};
pub use mesh::error::{AccessError, ValidationError, ValidationErrors};
pub use mesh::{AttributeView, MeshBuilder, MeshData, Primitive};
pub use view::{RawView, StridedIter, StridedView};
