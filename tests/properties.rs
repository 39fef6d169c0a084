//! Property tests for the validation and extraction contract.

use bytemuck::cast_slice;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use tessera::{
    AttributeData, AttributeError, AttributeFormat, AttributeName, IndexData, IndexFormat,
    MeshData, Primitive, RawView, ValidationError,
};

#[quickcheck]
fn widened_indices_match_source(values: Vec<u16>) -> TestResult {
    if values.is_empty() {
        return TestResult::discard();
    }
    let storage: Vec<u8> = cast_slice(&values).to_vec();
    let indices = IndexData::from_bytes(IndexFormat::U16, &storage).unwrap();
    let mesh = MeshData::builder(Primitive::Points)
        .index_data(storage)
        .indices(indices)
        .build()
        .unwrap();
    let widened = mesh.indices_u32().unwrap();
    let expected: Vec<u32> = values.iter().map(|&v| u32::from(v)).collect();
    TestResult::from_bool(widened == expected)
}

#[quickcheck]
fn extractors_are_idempotent(values: Vec<(f32, f32)>) -> TestResult {
    if values.is_empty() {
        return TestResult::discard();
    }
    let flat: Vec<[f32; 2]> = values.iter().map(|&(x, y)| [x, y]).collect();
    let storage: Vec<u8> = cast_slice(&flat).to_vec();
    let attr = AttributeData::from_view(
        AttributeName::Position,
        AttributeFormat::Vector2,
        RawView::strided(&storage, 0, flat.len(), 8),
    )
    .unwrap();
    let mesh = MeshData::builder(Primitive::Points)
        .vertex_data(storage)
        .attribute(attr)
        .build()
        .unwrap();
    let first = mesh.positions_2d(0).unwrap();
    let second = mesh.positions_2d(0).unwrap();
    // bitwise comparison, so NaN payloads count too
    TestResult::from_bool(cast_slice::<_, u8>(&first) == cast_slice::<_, u8>(&second))
}

#[quickcheck]
fn short_strides_are_rejected(stride: u8) -> TestResult {
    let stride = stride as usize;
    if stride >= AttributeFormat::Vector3.size() {
        return TestResult::discard();
    }
    let bytes = vec![0u8; 64];
    let view = RawView::strided(&bytes, 0, 2, stride);
    TestResult::from_bool(matches!(
        AttributeData::from_view(AttributeName::Position, AttributeFormat::Vector3, view),
        Err(AttributeError::StrideTooSmall { .. })
    ))
}

#[quickcheck]
fn foreign_buffers_never_validate(len: u8) -> TestResult {
    if len == 0 || len > 32 {
        return TestResult::discard();
    }
    let len = len as usize;
    // descriptor over one buffer, storage from another of the same size:
    // live allocations never overlap, so containment must fail
    let foreign = vec![0u8; len * 2];
    let indices = IndexData::from_bytes(IndexFormat::U16, &foreign).unwrap();
    let err = MeshData::builder(Primitive::Points)
        .index_data(vec![0u8; len * 2])
        .indices(indices)
        .build()
        .unwrap_err();
    TestResult::from_bool(err.errors() == vec![ValidationError::IndicesNotContained])
}
