//! The mesh geometry aggregate: owned index and vertex byte storage, the
//! descriptors locating data inside them, and typed access to both.

pub mod error;

use std::ptr::NonNull;

use nalgebra::{Vector2, Vector3, Vector4};
use num_traits::AsPrimitive;
use smallvec::SmallVec;

use crate::attribute::{AttributeData, AttributeFormat, AttributeName, AttributeType};
use crate::index::{IndexData, IndexFormat, IndexType};
use crate::view::{RawView, StridedView};
use error::{AccessError, ValidationError, ValidationErrors};

/// How vertices are assembled into topological primitives. Recorded and
/// handed back, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points = 0,
    Lines = 1,
    LineLoop = 2,
    LineStrip = 3,
    Triangles = 4,
    TriangleStrip = 5,
    TriangleFan = 6,
}

/// Attribute lists this small stay inline; covers the common
/// position + normal + texcoord (+ one more) case.
const INLINE_ATTRIBUTES: usize = 4;

/// A mesh's geometry: raw byte buffers plus validated, typed views over
/// them.
///
/// `MeshData` owns up to two byte buffers (index and vertex storage) and the
/// descriptors locating index and attribute data inside them. Every
/// structural invariant -- containment of each descriptor in its buffer, one
/// shared vertex count, no present-but-meaningless states -- is checked once
/// by [`MeshBuilder::build`]; afterwards each accessor is a cheap read-only
/// resolution against storage the validation already vouched for.
///
/// The aggregate is move-only. Buffers are meant to change hands, not to be
/// duplicated behind the scenes, so `Clone` is deliberately not implemented;
/// [`release_index_data`](Self::release_index_data) and
/// [`release_vertex_data`](Self::release_vertex_data) hand a buffer back to
/// the caller and leave the corresponding side of the mesh empty.
#[derive(Debug)]
pub struct MeshData {
    primitive: Primitive,
    index_storage: Option<Vec<u8>>,
    vertex_storage: Option<Vec<u8>>,
    index: IndexData,
    attributes: SmallVec<[AttributeData; INLINE_ATTRIBUTES]>,
    vertex_count: usize,
    external: Option<NonNull<()>>,
}

// SAFETY: `external` is an opaque provenance pointer. It is only ever
// stored, compared and handed back, never dereferenced.
unsafe impl Send for MeshData {}
unsafe impl Sync for MeshData {}

/// Assembles and validates a [`MeshData`].
///
/// Storage and descriptors are supplied separately so that every combination
/// of "buffer present" and "descriptor present" stays expressible --
/// including the invalid ones, which [`build`](Self::build) reports instead
/// of representing.
#[derive(Debug)]
pub struct MeshBuilder {
    primitive: Primitive,
    index_storage: Option<Vec<u8>>,
    index: IndexData,
    vertex_storage: Option<Vec<u8>>,
    attributes: SmallVec<[AttributeData; INLINE_ATTRIBUTES]>,
    vertex_count: Option<usize>,
    external: Option<NonNull<()>>,
}

impl MeshBuilder {
    /// Owned index buffer bytes.
    pub fn index_data(mut self, data: Vec<u8>) -> Self {
        self.index_storage = Some(data);
        self
    }

    /// Index descriptor locating indices inside the index buffer.
    pub fn indices(mut self, index: IndexData) -> Self {
        self.index = index;
        self
    }

    /// Owned vertex buffer bytes.
    pub fn vertex_data(mut self, data: Vec<u8>) -> Self {
        self.vertex_storage = Some(data);
        self
    }

    /// Append one attribute descriptor. Insertion order is the public
    /// attribute order; the same name may appear more than once.
    pub fn attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append several attribute descriptors, preserving their order.
    pub fn attributes(mut self, attributes: impl IntoIterator<Item = AttributeData>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Explicit vertex count, for meshes that carry no per-vertex data.
    /// When attributes are present as well, each of them must match it.
    pub fn vertex_count(mut self, count: usize) -> Self {
        self.vertex_count = Some(count);
        self
    }

    /// Opaque back-reference to whatever produced this data. Stored and
    /// handed back for provenance; never dereferenced.
    pub fn external_state(mut self, state: NonNull<()>) -> Self {
        self.external = Some(state);
        self
    }

    /// Validate the assembled pieces and produce the mesh.
    ///
    /// Rules are checked in a fixed order and *all* violations are reported,
    /// not just the first:
    ///
    /// 1. an index buffer without an index descriptor is meaningless;
    /// 2. a vertex buffer without attributes is meaningless;
    /// 3. a vertex buffer for zero vertices is meaningless;
    /// 4. with no attributes and no explicit count, the index descriptor is
    ///    the only thing justifying the mesh's existence and must be present;
    /// 5. the index view must lie inside the index buffer's address range;
    /// 6. every attribute view must lie inside the vertex buffer's address
    ///    range;
    /// 7. every attribute must agree on one vertex count (the explicit count
    ///    if given, otherwise the first attribute's).
    ///
    /// Containment is an address comparison, so a descriptor built over some
    /// *other* buffer fails rule 5/6 even when its offsets look plausible.
    pub fn build(self) -> Result<MeshData, ValidationErrors> {
        let mut errors = Vec::new();

        let vertex_count = self
            .vertex_count
            .or_else(|| self.attributes.first().map(AttributeData::count))
            .unwrap_or(0);

        if self.index_storage.is_some() && !self.index.is_indexed() {
            errors.push(ValidationError::UnexpectedIndexData);
        }
        if self.vertex_storage.is_some() && self.attributes.is_empty() {
            errors.push(ValidationError::UnexpectedVertexData);
        }
        if self.vertex_storage.is_some() && vertex_count == 0 {
            errors.push(ValidationError::VertexDataWithoutVertices);
        }
        if self.attributes.is_empty() && self.vertex_count.is_none() && !self.index.is_indexed() {
            errors.push(ValidationError::IndeterminateVertexCount);
        }
        if let Some(format) = self.index.format() {
            if !self
                .index
                .view()
                .contained_in(format.size(), self.index_storage.as_deref())
            {
                errors.push(ValidationError::IndicesNotContained);
            }
        }
        for (i, attribute) in self.attributes.iter().enumerate() {
            if !attribute
                .view()
                .contained_in(attribute.format().size(), self.vertex_storage.as_deref())
            {
                errors.push(ValidationError::AttributeNotContained { index: i });
            }
        }
        // an explicit count constrains every attribute; otherwise the first
        // attribute sets the expectation for the rest
        let first_checked = if self.vertex_count.is_some() { 0 } else { 1 };
        for (i, attribute) in self.attributes.iter().enumerate().skip(first_checked) {
            if attribute.count() != vertex_count {
                errors.push(ValidationError::InconsistentVertexCount {
                    index: i,
                    actual: attribute.count(),
                    expected: vertex_count,
                });
            }
        }

        if !errors.is_empty() {
            tracing::debug!(
                primitive = ?self.primitive,
                rejected = errors.len(),
                "mesh construction failed validation"
            );
            return Err(ValidationErrors::new(errors));
        }

        tracing::trace!(
            primitive = ?self.primitive,
            vertex_count,
            attributes = self.attributes.len(),
            indexed = self.index.is_indexed(),
            "mesh geometry constructed"
        );
        Ok(MeshData {
            primitive: self.primitive,
            index_storage: self.index_storage,
            vertex_storage: self.vertex_storage,
            index: self.index,
            attributes: self.attributes,
            vertex_count,
            external: self.external,
        })
    }
}

/// Resolve a validated view into a sub-slice of its owning storage.
fn resolved<'a>(storage: Option<&'a [u8]>, view: RawView, elem_size: usize) -> &'a [u8] {
    match storage {
        Some(buf) if !view.is_empty() => {
            let offset = view.begin() - buf.as_ptr() as usize;
            &buf[offset..offset + view.extent(elem_size)]
        }
        _ => &[],
    }
}

impl MeshData {
    /// Start assembling a mesh with the given primitive tag.
    pub fn builder(primitive: Primitive) -> MeshBuilder {
        MeshBuilder {
            primitive,
            index_storage: None,
            index: IndexData::none(),
            vertex_storage: None,
            attributes: SmallVec::new(),
            vertex_count: None,
            external: None,
        }
    }

    #[inline]
    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// The provenance pointer the producer attached, if any.
    #[inline]
    pub fn external_state(&self) -> Option<NonNull<()>> {
        self.external
    }

    /// Raw index buffer bytes; `None` when absent or released.
    #[inline]
    pub fn index_data(&self) -> Option<&[u8]> {
        self.index_storage.as_deref()
    }

    /// Raw vertex buffer bytes; `None` when absent or released.
    #[inline]
    pub fn vertex_data(&self) -> Option<&[u8]> {
        self.vertex_storage.as_deref()
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index.is_indexed()
    }

    /// Width of the stored indices.
    pub fn index_format(&self) -> Result<IndexFormat, AccessError> {
        self.index.format().ok_or(AccessError::NotIndexed)
    }

    /// Number of stored indices.
    pub fn index_count(&self) -> Result<usize, AccessError> {
        self.index_format().map(|_| self.index.count())
    }

    /// Typed view over the stored indices. `T`'s width must match the stored
    /// width exactly; ask [`index_format`](Self::index_format) first when in
    /// doubt.
    pub fn indices<T: IndexType>(&self) -> Result<StridedView<'_, T>, AccessError> {
        let format = self.index_format()?;
        if T::FORMAT != format {
            return Err(AccessError::ImproperIndexType { format });
        }
        let bytes = resolved(self.index_storage.as_deref(), self.index.view(), format.size());
        Ok(StridedView::new(bytes, self.index.count(), format.size()))
    }

    /// Widen the stored indices into a freshly allocated `u32` sequence,
    /// whatever their stored width. One conversion pass per call; calling it
    /// twice yields identical output.
    pub fn indices_u32(&self) -> Result<Vec<u32>, AccessError> {
        match self.index_format()? {
            IndexFormat::U8 => Ok(self.indices::<u8>()?.iter().map(|i| i.as_()).collect()),
            IndexFormat::U16 => Ok(self.indices::<u16>()?.iter().map(|i| i.as_()).collect()),
            IndexFormat::U32 => Ok(self.indices::<u32>()?.iter().map(|i| i.as_()).collect()),
        }
    }

    /// Number of vertices. Derived from the first attribute, or from the
    /// explicit count the builder was given; 0 means the mesh carries no
    /// per-vertex data and no explicit count was supplied.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of attributes, duplicate names counted separately.
    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Number of attributes with the given semantic name.
    pub fn attribute_count_of(&self, name: AttributeName) -> usize {
        self.attributes.iter().filter(|a| a.name() == name).count()
    }

    pub fn has_attribute(&self, name: AttributeName) -> bool {
        self.attributes.iter().any(|a| a.name() == name)
    }

    /// Attribute by position in stored order.
    pub fn attribute(&self, id: usize) -> Result<AttributeView<'_>, AccessError> {
        self.attributes
            .get(id)
            .map(|a| self.view_of(a))
            .ok_or(AccessError::AttributeOutOfRange {
                index: id,
                count: self.attributes.len(),
            })
    }

    /// Attribute by semantic name, disambiguated by its occurrence among
    /// attributes sharing that name (first occurrence is 0).
    pub fn attribute_named(
        &self,
        name: AttributeName,
        occurrence: usize,
    ) -> Result<AttributeView<'_>, AccessError> {
        self.attributes
            .iter()
            .filter(|a| a.name() == name)
            .nth(occurrence)
            .map(|a| self.view_of(a))
            .ok_or_else(|| AccessError::NamedAttributeOutOfRange {
                name,
                occurrence,
                count: self.attribute_count_of(name),
            })
    }

    /// All attributes, in stored order.
    pub fn attributes(&self) -> impl ExactSizeIterator<Item = AttributeView<'_>> + '_ {
        self.attributes.iter().map(|a| self.view_of(a))
    }

    fn view_of(&self, data: &AttributeData) -> AttributeView<'_> {
        let storage = self.vertex_storage.as_deref();
        let bytes = resolved(storage, data.view(), data.format().size());
        let offset = match storage {
            Some(buf) if !data.view().is_empty() => data.view().begin() - buf.as_ptr() as usize,
            _ => 0,
        };
        AttributeView {
            name: data.name(),
            format: data.format(),
            offset,
            stride: data.view().stride(),
            count: data.view().count(),
            bytes,
        }
    }

    /// Positions as a densely packed 2D sequence; positions stored as 3D
    /// vectors are truncated to their xy part.
    pub fn positions_2d(&self, occurrence: usize) -> Result<Vec<Vector2<f32>>, AccessError> {
        let attr = self.attribute_named(AttributeName::Position, occurrence)?;
        Ok(match attr.format() {
            AttributeFormat::Vector2 => attr.typed::<Vector2<f32>>()?.iter().collect(),
            AttributeFormat::Vector3 => attr
                .typed::<Vector3<f32>>()?
                .iter()
                .map(|p| Vector2::new(p.x, p.y))
                .collect(),
            // positions are two- or three-component by whitelist
            AttributeFormat::Vector4 => unreachable!(),
        })
    }

    /// Positions as a densely packed 3D sequence; positions stored as 2D
    /// vectors are widened with a zero z.
    pub fn positions_3d(&self, occurrence: usize) -> Result<Vec<Vector3<f32>>, AccessError> {
        let attr = self.attribute_named(AttributeName::Position, occurrence)?;
        Ok(match attr.format() {
            AttributeFormat::Vector2 => attr
                .typed::<Vector2<f32>>()?
                .iter()
                .map(|p| Vector3::new(p.x, p.y, 0.0))
                .collect(),
            AttributeFormat::Vector3 => attr.typed::<Vector3<f32>>()?.iter().collect(),
            AttributeFormat::Vector4 => unreachable!(),
        })
    }

    /// Normals as a densely packed sequence.
    pub fn normals(&self, occurrence: usize) -> Result<Vec<Vector3<f32>>, AccessError> {
        let attr = self.attribute_named(AttributeName::Normal, occurrence)?;
        Ok(attr.typed::<Vector3<f32>>()?.to_vec())
    }

    /// Texture coordinates as a densely packed 2D sequence.
    pub fn texture_coordinates_2d(
        &self,
        occurrence: usize,
    ) -> Result<Vec<Vector2<f32>>, AccessError> {
        let attr = self.attribute_named(AttributeName::TextureCoordinates, occurrence)?;
        Ok(attr.typed::<Vector2<f32>>()?.to_vec())
    }

    /// Colors as a densely packed RGBA sequence; three-component colors are
    /// widened with an opaque alpha of 1.
    pub fn colors(&self, occurrence: usize) -> Result<Vec<Vector4<f32>>, AccessError> {
        let attr = self.attribute_named(AttributeName::Color, occurrence)?;
        Ok(match attr.format() {
            AttributeFormat::Vector3 => attr
                .typed::<Vector3<f32>>()?
                .iter()
                .map(|c| Vector4::new(c.x, c.y, c.z, 1.0))
                .collect(),
            AttributeFormat::Vector4 => attr.typed::<Vector4<f32>>()?.iter().collect(),
            // colors are three- or four-component by whitelist
            AttributeFormat::Vector2 => unreachable!(),
        })
    }

    /// Detach and return the index buffer. The mesh afterwards reports as
    /// not indexed; the vertex side is untouched.
    pub fn release_index_data(&mut self) -> Option<Vec<u8>> {
        tracing::trace!("releasing index storage");
        self.index = IndexData::none();
        self.index_storage.take()
    }

    /// Detach and return the vertex buffer. The attribute list is dropped
    /// with it; the vertex count and the index side are untouched.
    pub fn release_vertex_data(&mut self) -> Option<Vec<u8>> {
        tracing::trace!("releasing vertex storage");
        self.attributes.clear();
        self.vertex_storage.take()
    }
}

/// One attribute of a [`MeshData`], resolved against its vertex storage:
/// name, format, placement, and typed element access.
#[derive(Debug, Clone, Copy)]
pub struct AttributeView<'a> {
    name: AttributeName,
    format: AttributeFormat,
    offset: usize,
    stride: usize,
    count: usize,
    bytes: &'a [u8],
}

impl<'a> AttributeView<'a> {
    #[inline]
    pub fn name(&self) -> AttributeName {
        self.name
    }

    #[inline]
    pub fn format(&self) -> AttributeFormat {
        self.format
    }

    /// Byte offset of the first element within the vertex buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Element count, i.e. the attribute's vertex count.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// The attribute's bytes, first element to the end of the last.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Typed element view. `T`'s format must match the stored format
    /// exactly.
    pub fn typed<T: AttributeType>(&self) -> Result<StridedView<'a, T>, AccessError> {
        if T::FORMAT != self.format {
            return Err(AccessError::ImproperAttributeType {
                name: self.name,
                format: self.format,
            });
        }
        Ok(StridedView::new(self.bytes, self.count, self.stride))
    }
}
