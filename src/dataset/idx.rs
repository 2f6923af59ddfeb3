//! Decoder for the IDX binary format used by MNIST and its derivatives.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-3:   magic 0x00000803 (2051)
//! bytes  4-7:   N     (number of images, big-endian u32)
//! bytes  8-11:  rows  (big-endian u32)
//! bytes 12-15:  cols  (big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-3:   magic 0x00000801 (2049)
//! bytes  4-7:   N     (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use std::path::Path;

use tracing::info;

use crate::dataset::{one_hot, Dataset};
use crate::error::DatasetError;
use crate::math::matrix::Matrix;

pub const IMAGE_MAGIC: u32 = 2051;
pub const LABEL_MAGIC: u32 = 2049;

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn check_header(
    bytes: &[u8],
    kind: &'static str,
    magic: u32,
    header_len: usize,
) -> Result<(), DatasetError> {
    if bytes.len() < 4 {
        return Err(DatasetError::Truncated { kind, needed: header_len, found: bytes.len() });
    }
    let found = read_u32(bytes, 0);
    if found != magic {
        return Err(DatasetError::MagicNumber { kind, expected: magic, found });
    }
    if bytes.len() < header_len {
        return Err(DatasetError::Truncated { kind, needed: header_len, found: bytes.len() });
    }
    Ok(())
}

/// Decodes an IDX3 image file into `(rows * cols, 1)` column vectors with
/// pixels scaled from `[0, 255]` to `[0.0, 1.0]`.
pub fn parse_images(bytes: &[u8]) -> Result<Vec<Matrix>, DatasetError> {
    check_header(bytes, "image", IMAGE_MAGIC, 16)?;

    let n_items = read_u32(bytes, 4) as usize;
    let rows = read_u32(bytes, 8) as usize;
    let cols = read_u32(bytes, 12) as usize;

    let n_pixels = rows.checked_mul(cols);
    let needed = n_pixels
        .and_then(|px| n_items.checked_mul(px))
        .and_then(|data| data.checked_add(16))
        .ok_or(DatasetError::Truncated { kind: "image", needed: usize::MAX, found: bytes.len() })?;
    let n_pixels = rows * cols;
    if bytes.len() < needed {
        return Err(DatasetError::Truncated { kind: "image", needed, found: bytes.len() });
    }
    if n_pixels == 0 {
        return Ok(vec![Matrix::zeros(0, 1); n_items]);
    }

    Ok(bytes[16..needed]
        .chunks_exact(n_pixels)
        .map(|chunk| Matrix::column(chunk.iter().map(|&px| px as f64 / 255.0).collect()))
        .collect())
}

/// Decodes an IDX1 label file into class indices.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<usize>, DatasetError> {
    check_header(bytes, "label", LABEL_MAGIC, 8)?;

    let n_items = read_u32(bytes, 4) as usize;
    let needed = 8 + n_items;
    if bytes.len() < needed {
        return Err(DatasetError::Truncated { kind: "label", needed, found: bytes.len() });
    }
    Ok(bytes[8..needed].iter().map(|&label| label as usize).collect())
}

/// Decodes a matching image/label pair into a `Dataset` with one-hot
/// targets of length `n_classes`.
pub fn parse_idx_pair(
    image_bytes: &[u8],
    label_bytes: &[u8],
    n_classes: usize,
) -> Result<Dataset, DatasetError> {
    let inputs = parse_images(image_bytes)?;
    let labels = parse_labels(label_bytes)?;

    if inputs.len() != labels.len() {
        return Err(DatasetError::CountMismatch { images: inputs.len(), labels: labels.len() });
    }

    let mut targets = Vec::with_capacity(labels.len());
    for (index, &label) in labels.iter().enumerate() {
        let target = one_hot(label, n_classes).map_err(|_| DatasetError::LabelOutOfRange {
            index,
            label,
            classes: n_classes,
        })?;
        targets.push(target);
    }

    Ok(Dataset { inputs, targets, labels })
}

/// Reads and decodes an image/label file pair from disk.
pub fn load_idx_pair<P: AsRef<Path>>(
    image_path: P,
    label_path: P,
    n_classes: usize,
) -> Result<Dataset, DatasetError> {
    let read = |path: &Path| {
        std::fs::read(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })
    };
    let image_bytes = read(image_path.as_ref())?;
    let label_bytes = read(label_path.as_ref())?;
    let dataset = parse_idx_pair(&image_bytes, &label_bytes, n_classes)?;

    info!(
        images = %image_path.as_ref().display(),
        labels = %label_path.as_ref().display(),
        count = dataset.len(),
        "loaded IDX dataset"
    );
    Ok(dataset)
}
