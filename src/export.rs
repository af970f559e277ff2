use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    prelude::*,
    record::{BinFileRecorder, FullPrecisionSettings, Recorder, RecorderError},
};

use crate::model::{Model, ModelConfig};

/// Writes the trained parameters as a single full-precision binary record
/// next to `stem` (the recorder appends its `.bin` extension) and returns
/// the path of the written file.
///
/// The record is self-contained: loading it back through [`load_frozen`]
/// needs only the model config, none of the training machinery.
pub fn freeze<B: Backend>(model: &Model<B>, stem: &Path) -> Result<PathBuf, RecorderError> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    model.clone().save_file(stem, &recorder)?;

    let frozen = stem.with_extension("bin");
    log::info!("froze trained model to {}", frozen.display());

    Ok(frozen)
}

/// Restores an inference-only model from a record written by [`freeze`].
pub fn load_frozen<B: Backend>(
    config: &ModelConfig,
    path: &Path,
    device: &B::Device,
) -> Result<Model<B>, RecorderError> {
    let record = BinFileRecorder::<FullPrecisionSettings>::new().load(path.to_path_buf(), device)?;

    Ok(config.init::<B>(device).load_record(record))
}
