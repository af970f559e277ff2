use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::{GrayImage, Luma};

use crate::inference::SamplePrediction;

const IMAGE_SIDE: usize = 28;

/// Renders a raw-intensity image (byte values stored as floats) as a
/// grayscale PNG.
pub fn save_png(
    image: &[[f32; IMAGE_SIDE]; IMAGE_SIDE],
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut img = GrayImage::new(IMAGE_SIDE as u32, IMAGE_SIDE as u32);
    for (y, row) in image.iter().enumerate() {
        for (x, value) in row.iter().enumerate() {
            img.put_pixel(x as u32, y as u32, Luma([*value as u8]));
        }
    }
    img.save(path)?;

    Ok(())
}

/// Writes the image as 28 rows of 28 width-4 right-aligned byte
/// intensities, one text line per pixel row.
pub fn write_pixel_grid(image: &[[f32; IMAGE_SIDE]; IMAGE_SIDE], path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    for row in image {
        for value in row {
            write!(writer, "{:4}", *value as u8)?;
        }
        writeln!(writer)?;
    }

    writer.flush()
}

/// Writes the frozen-record companion file: logical input/output names,
/// shapes, and one `(index, pred, label)` line per spot-checked sample.
pub fn write_meta(path: &Path, predictions: &[SamplePrediction]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "Input: [\"images\"]")?;
    writeln!(writer, "Output: [\"output\"]")?;
    writeln!(writer, "Input shape: [N, 28, 28]")?;
    writeln!(writer, "Output shape: [N, 10]")?;
    for prediction in predictions {
        writeln!(
            writer,
            "Test image (index, pred, label): ({}, {}, {})",
            prediction.index, prediction.predicted, prediction.label
        )?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mnist-output-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn ramp_image() -> [[f32; IMAGE_SIDE]; IMAGE_SIDE] {
        let mut image = [[0.0; IMAGE_SIDE]; IMAGE_SIDE];
        image[0][1] = 128.0;
        image[0][27] = 255.0;
        image[27][0] = 7.0;
        image
    }

    #[test]
    fn pixel_grid_has_native_dimensions_and_valid_values() {
        let dir = scratch_dir("grid");
        let path = dir.join("xtest_208.txt");

        write_pixel_grid(&ramp_image(), &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), IMAGE_SIDE);
        for line in &lines {
            assert_eq!(line.len(), IMAGE_SIDE * 4);
            for chunk in line.as_bytes().chunks(4) {
                let field = std::str::from_utf8(chunk).unwrap().trim();
                field.parse::<u8>().unwrap();
            }
        }
        assert!(lines[0].starts_with("   0 128"));
        assert!(lines[0].ends_with(" 255"));
        assert!(lines[27].starts_with("   7"));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn png_round_trips_pixel_values() {
        let dir = scratch_dir("png");
        let path = dir.join("xtest_208.png");

        save_png(&ramp_image(), &path).unwrap();

        let rendered = image::open(&path).unwrap().into_luma8();
        assert_eq!(rendered.dimensions(), (28, 28));
        assert_eq!(rendered.get_pixel(0, 0).0[0], 0);
        assert_eq!(rendered.get_pixel(1, 0).0[0], 128);
        assert_eq!(rendered.get_pixel(27, 0).0[0], 255);
        assert_eq!(rendered.get_pixel(0, 27).0[0], 7);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn meta_lists_one_line_per_sample_in_order() {
        let dir = scratch_dir("meta");
        let path = dir.join("mnist.bin.meta.txt");
        let predictions: Vec<SamplePrediction> = [208, 233, 666, 1115, 1234]
            .into_iter()
            .enumerate()
            .map(|(position, index)| SamplePrediction {
                index,
                predicted: position as u8,
                label: 9 - position as u8,
                confidence: 0.9,
            })
            .collect();

        write_meta(&path, &predictions).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Input: [\"images\"]\n"));
        assert!(contents.contains("Input shape: [N, 28, 28]\n"));
        assert!(contents.contains("Output shape: [N, 10]\n"));

        let sample_lines: Vec<&str> = contents
            .lines()
            .filter(|line| line.starts_with("Test image"))
            .collect();
        assert_eq!(sample_lines.len(), 5);
        assert_eq!(sample_lines[0], "Test image (index, pred, label): (208, 0, 9)");
        assert_eq!(sample_lines[4], "Test image (index, pred, label): (1234, 4, 5)");

        fs::remove_dir_all(dir).ok();
    }
}
