//! Errors related to [`MeshData`](crate::MeshData) construction and access.

use std::fmt;

use crate::attribute::{AttributeFormat, AttributeName};
use crate::index::IndexFormat;

/// One structural rule violated while assembling a mesh.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("index data passed for a non-indexed mesh")]
    UnexpectedIndexData,
    #[error("vertex data passed for an attribute-less mesh")]
    UnexpectedVertexData,
    #[error("vertex data passed for a mesh with zero vertices")]
    VertexDataWithoutVertices,
    #[error("indices are expected to be valid if there are no attributes and vertex count isn't passed explicitly")]
    IndeterminateVertexCount,
    #[error("indices are not contained in passed index data")]
    IndicesNotContained,
    #[error("attribute {index} is not contained in passed vertex data")]
    AttributeNotContained { index: usize },
    #[error("attribute {index} has {actual} vertices but {expected} expected")]
    InconsistentVertexCount {
        index: usize,
        actual: usize,
        expected: usize,
    },
}

/// Every rule one construction violated, in validation order.
///
/// Violations are independent: a single bad construction may break several
/// rules at once, and all of them are reported rather than just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

impl fmt::Display for ValidationErrors {
    /// One message per violated rule, one rule per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// A query the mesh's current state can't answer.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("the mesh is not indexed")]
    NotIndexed,
    #[error("improper type requested for {format} indices")]
    ImproperIndexType { format: IndexFormat },
    #[error("index {index} out of range for {count} attributes")]
    AttributeOutOfRange { index: usize, count: usize },
    #[error("index {occurrence} out of range for {count} {name} attributes")]
    NamedAttributeOutOfRange {
        name: AttributeName,
        occurrence: usize,
        count: usize,
    },
    #[error("improper type requested for {name} of format {format}")]
    ImproperAttributeType {
        name: AttributeName,
        format: AttributeFormat,
    },
}
