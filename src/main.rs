#![recursion_limit = "256"]

use std::error::Error;
use std::path::Path;

use burn::{
    backend::Autodiff,
    data::dataset::{
        Dataset,
        vision::{MnistDataset, MnistItem},
    },
    optim::AdamConfig,
};

use mnist_export::{
    export,
    inference::{self, SamplePrediction},
    model::ModelConfig,
    output,
    training::{self, TrainingConfig},
};

#[cfg(feature = "wgpu")]
type SelectedBackend = burn::backend::Wgpu;
#[cfg(all(feature = "ndarray", not(feature = "wgpu")))]
type SelectedBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
fn select_device() -> burn::backend::wgpu::WgpuDevice {
    burn::backend::wgpu::WgpuDevice::default()
}

#[cfg(all(feature = "ndarray", not(feature = "wgpu")))]
fn select_device() -> burn::backend::ndarray::NdArrayDevice {
    burn::backend::ndarray::NdArrayDevice::Cpu
}

/// Where the frozen record, its metadata, the sample dumps, and the
/// training checkpoints land.
const ARTIFACT_DIR: &str = "artifacts";

/// Hand-picked test-set indices used for spot-checking and for the
/// per-sample output files. Static configuration, independent of how
/// training turns out.
const SAMPLE_INDICES: [usize; 5] = [208, 233, 666, 1115, 1234];

fn main() -> Result<(), Box<dyn Error>> {
    let device = select_device();

    let trained = training::train::<Autodiff<SelectedBackend>>(
        ARTIFACT_DIR,
        TrainingConfig::new(ModelConfig::new(), AdamConfig::new()),
        device.clone(),
    );

    let dataset = MnistDataset::test();
    let items: Vec<MnistItem> = SAMPLE_INDICES
        .iter()
        .map(|&index| {
            dataset
                .get(index)
                .expect("sample index within the test split")
        })
        .collect();

    let predictions = inference::predict(&trained, &device, &SAMPLE_INDICES, &items);
    report(&predictions);

    let out_dir = Path::new(ARTIFACT_DIR);
    let frozen = export::freeze(&trained, &out_dir.join("mnist"))?;
    output::write_meta(&out_dir.join("mnist.bin.meta.txt"), &predictions)?;

    for (index, item) in SAMPLE_INDICES.iter().zip(&items) {
        output::save_png(&item.image, &out_dir.join(format!("xtest_{index}.png")))?;
        output::write_pixel_grid(&item.image, &out_dir.join(format!("xtest_{index}.txt")))?;
    }

    inference::verify_frozen::<SelectedBackend>(
        &ModelConfig::new(),
        &frozen,
        &device,
        &SAMPLE_INDICES,
        &items,
        &predictions,
    )?;

    println!("Frozen model written to {}", frozen.display());

    Ok(())
}

fn report(predictions: &[SamplePrediction]) {
    println!("Images: {SAMPLE_INDICES:?}");
    for prediction in predictions {
        println!(
            "Test image {}: predicted {} (p = {:.4}), label {}",
            prediction.index, prediction.predicted, prediction.confidence, prediction.label
        );
    }
}
