use arrow::datatypes::Field;

use crate::scalar::ScalarType;

/// Laid-out column descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) ty: ScalarType,
    pub(crate) offset: usize,
    pub(crate) index_id: Option<u32>,
    pub(crate) index_bucket_size: u64,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.ty
    }

    /// Byte offset of the column inside a record, counting the timestamp
    /// prefix.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.ty.size()
    }

    pub fn is_indexed(&self) -> bool {
        self.index_id.is_some()
    }

    pub fn index_id(&self) -> Option<u32> {
        self.index_id
    }

    /// Quantization width applied before key encoding; `0` and `1` mean none.
    pub fn index_bucket_size(&self) -> u64 {
        self.index_bucket_size
    }

    pub(crate) fn arrow_field(&self) -> Field {
        Field::new(&self.name, self.ty.to_arrow(), false)
    }
}
