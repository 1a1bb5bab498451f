use crate::pipeline::preprocess::NormalizedTensor;
use crate::pipeline::raw::RawDetectionSet;
use crate::Result;

/// A model that turns one normalized input tensor into a fixed-capacity set of
/// raw candidates.
///
/// Implementations are not required to be reentrant; callers serialize access
/// through `&mut self`.
pub trait InferenceEngine {
    fn infer(&mut self, tensor: &NormalizedTensor) -> Result<RawDetectionSet>;

    /// Side of the square input the model expects.
    fn input_size(&self) -> u32;

    /// Maximum number of candidates one call can return.
    fn capacity(&self) -> usize;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn infer(&mut self, tensor: &NormalizedTensor) -> Result<RawDetectionSet> {
        (**self).infer(tensor)
    }

    fn input_size(&self) -> u32 {
        (**self).input_size()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }
}
