use std::path::Path;

use tflite::context::{ElementKind, TensorInfo};
use tflite::ops::builtin::BuiltinOpResolver;
use tflite::{FlatBufferModel, Interpreter, InterpreterBuilder};

use crate::app::config::DetectorConfig;
use crate::pipeline::engine::InferenceEngine;
use crate::pipeline::preprocess::{NormalizedTensor, RGB_CHANNELS};
use crate::pipeline::raw::RawDetectionSet;
use crate::{Error, Result};

const NUM_OUTPUTS: usize = 4;

/// SSD-style TFLite detector with a float input and postprocessed outputs:
/// locations, classes, scores, detection count.
pub struct TFLiteEngine<'a> {
    interpreter: Interpreter<'a, BuiltinOpResolver>,
    input_index: i32,
    output_indices: [i32; NUM_OUTPUTS],
    input_size: u32,
    capacity: usize,
}

impl<'a> TFLiteEngine<'a> {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        let path = config.model_filename.as_str();
        tracing::info!("loading model {path}");
        if !Path::new(path).is_file() {
            return Err(Error::model_load(path, "no such file"));
        }
        let model = FlatBufferModel::build_from_file(path).map_err(|e| Error::model_load(path, e))?;
        let resolver = BuiltinOpResolver::default();
        let builder =
            InterpreterBuilder::new(model, resolver).map_err(|e| Error::model_load(path, e))?;
        let mut interpreter = builder.build().map_err(|e| Error::model_load(path, e))?;
        interpreter
            .allocate_tensors()
            .map_err(|e| Error::model_load(path, e))?;

        let inputs = interpreter.inputs().to_vec();
        if inputs.len() != 1 {
            return Err(Error::model_load(
                path,
                format!("expected 1 input, found {}", inputs.len()),
            ));
        }
        let outputs = interpreter.outputs().to_vec();
        if outputs.len() != NUM_OUTPUTS {
            return Err(Error::model_load(
                path,
                format!("expected {} outputs, found {}", NUM_OUTPUTS, outputs.len()),
            ));
        }

        let tinfos = interpreter
            .get_input_details()
            .map_err(|e| Error::model_load(path, e))?;
        let dims = &tinfos[0].dims;
        let size = config.input_size as usize;
        if dims.len() != 4 || dims[1] != size || dims[2] != size || dims[3] != RGB_CHANNELS {
            return Err(Error::model_load(
                path,
                format!("input shape {:?} does not match {}x{}x{}", dims, size, size, RGB_CHANNELS),
            ));
        }
        expect_float32(path, "input", &tinfos[0])?;
        let output_infos = interpreter
            .get_output_details()
            .map_err(|e| Error::model_load(path, e))?;
        for info in &output_infos {
            expect_float32(path, "output", info)?;
        }

        interpreter.set_num_threads(config.num_threads as i32);
        tracing::debug!("model input {:?}, outputs {:?}", dims, outputs);

        Ok(Self {
            interpreter,
            input_index: inputs[0],
            output_indices: [outputs[0], outputs[1], outputs[2], outputs[3]],
            input_size: config.input_size,
            capacity: config.max_candidates,
        })
    }

    fn output(&self, index: i32) -> Result<&[f32]> {
        self.interpreter
            .tensor_data(index)
            .map_err(|e| Error::Inference(e.to_string()))
    }
}

/// Quantized models are rejected: the pipeline only feeds and reads f32 tensors.
fn expect_float32(path: &str, role: &str, info: &TensorInfo) -> Result<()> {
    if info.element_kind != ElementKind::kTfLiteFloat32 {
        return Err(Error::model_load(
            path,
            format!("{} tensor {} is {:?}, expected float32", role, info.name, info.element_kind),
        ));
    }
    Ok(())
}

impl<'a> InferenceEngine for TFLiteEngine<'a> {
    fn infer(&mut self, tensor: &NormalizedTensor) -> Result<RawDetectionSet> {
        let input: &mut [f32] = self
            .interpreter
            .tensor_data_mut(self.input_index)
            .map_err(|e| Error::Inference(e.to_string()))?;
        let data = tensor.as_slice();
        if input.len() != data.len() {
            return Err(Error::Inference(format!(
                "input tensor holds {} values, got {}",
                input.len(),
                data.len()
            )));
        }
        input.copy_from_slice(data);
        self.interpreter
            .invoke()
            .map_err(|e| Error::Inference(e.to_string()))?;

        let [locations, classes, scores, num_detections] = self.output_indices;
        let num_detections = self
            .output(num_detections)?
            .first()
            .copied()
            .ok_or_else(|| Error::Inference("empty detection count tensor".to_string()))?;
        tracing::trace!("model reported {num_detections} detections");

        RawDetectionSet::from_tensors(
            self.capacity,
            self.output(locations)?,
            self.output(classes)?,
            self.output(scores)?,
            num_detections,
        )
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
