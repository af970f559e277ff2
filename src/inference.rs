use std::error::Error;
use std::path::Path;

use burn::{
    data::{dataloader::batcher::Batcher, dataset::vision::MnistItem},
    prelude::*,
    tensor::activation::softmax,
};

use crate::{
    data::MnistBatcher,
    export,
    model::{Model, ModelConfig},
};

/// Outcome of spot-checking one test-set image.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePrediction {
    pub index: usize,
    pub predicted: u8,
    pub label: u8,
    pub confidence: f32,
}

/// Runs the model over the selected items and pairs each argmax class with
/// its softmax probability and the ground-truth label.
///
/// `indices` and `items` line up positionally; the indices only tag the
/// output, they are not used to look anything up.
pub fn predict<B: Backend>(
    model: &Model<B>,
    device: &B::Device,
    indices: &[usize],
    items: &[MnistItem],
) -> Vec<SamplePrediction> {
    let batch = MnistBatcher.batch(items.to_vec(), device);
    let probabilities = softmax(model.forward(batch.images), 1);

    let confidences = probabilities
        .clone()
        .max_dim(1)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .expect("one max probability per sample");
    let classes = probabilities
        .argmax(1)
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .expect("one argmax class per sample");

    indices
        .iter()
        .zip(items)
        .zip(classes.iter().zip(confidences))
        .map(|((&index, item), (&class, confidence))| SamplePrediction {
            index,
            predicted: class as u8,
            label: item.label,
            confidence,
        })
        .collect()
}

/// Reloads the frozen record into a fresh model and checks that it
/// reproduces the reported predictions, so the written artifact is known
/// to stand on its own.
pub fn verify_frozen<B: Backend>(
    config: &ModelConfig,
    frozen: &Path,
    device: &B::Device,
    indices: &[usize],
    items: &[MnistItem],
    expected: &[SamplePrediction],
) -> Result<(), Box<dyn Error>> {
    let model = export::load_frozen::<B>(config, frozen, device)?;
    let rerun = predict(&model, device, indices, items);

    for (fresh, original) in rerun.iter().zip(expected) {
        if fresh.predicted != original.predicted {
            return Err(format!(
                "frozen model predicted {} for test image {}, expected {}",
                fresh.predicted, fresh.index, original.predicted
            )
            .into());
        }
    }

    log::info!(
        "frozen record reproduced all {} sample predictions",
        expected.len()
    );

    Ok(())
}
