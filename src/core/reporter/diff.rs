//! Per-pixel difference image.

use crate::core::fingerprint::{FingerprintRecord, ImageCodec};
use crate::error::FingerprintError;
use image::{Rgb, RgbImage};

/// Absolute RGB difference of two records' full images.
///
/// The result has `first`'s dimensions; `second` is resampled to match
/// when the sizes differ.
pub fn diff_image(
    codec: &dyn ImageCodec,
    first: &FingerprintRecord,
    second: &FingerprintRecord,
) -> Result<RgbImage, FingerprintError> {
    let a = codec.decode(first.path())?;
    let b = codec.decode(second.path())?;
    let b = if b.dimensions() == a.dimensions() {
        b
    } else {
        codec.resample(&b, a.width(), a.height())?
    };

    Ok(RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let pa = a.get_pixel(x, y);
        let pb = b.get_pixel(x, y);
        Rgb([
            pa[0].abs_diff(pb[0]),
            pa[1].abs_diff(pb[1]),
            pa[2].abs_diff(pb[2]),
        ])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::DefaultCodec;
    use tempfile::TempDir;

    fn saved(dir: &TempDir, name: &str, image: &RgbImage) -> FingerprintRecord {
        let path = dir.path().join(name);
        image.save(&path).unwrap();
        FingerprintRecord::new(path, 0)
    }

    #[test]
    fn difference_of_copies_is_black() {
        let dir = TempDir::new().unwrap();
        let image = RgbImage::from_fn(8, 8, |x, y| Rgb([x as u8 * 30, y as u8 * 30, 60]));
        let a = saved(&dir, "a.png", &image);
        let b = saved(&dir, "b.png", &image);

        let diff = diff_image(&DefaultCodec, &a, &b).unwrap();

        assert!(diff.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn difference_is_absolute_per_channel() {
        let dir = TempDir::new().unwrap();
        let a = saved(&dir, "a.png", &RgbImage::from_pixel(4, 4, Rgb([10, 200, 50])));
        let b = saved(&dir, "b.png", &RgbImage::from_pixel(4, 4, Rgb([30, 100, 50])));

        let diff = diff_image(&DefaultCodec, &a, &b).unwrap();

        assert_eq!(*diff.get_pixel(0, 0), Rgb([20, 100, 0]));
    }

    #[test]
    fn second_image_is_resampled_to_first() {
        let dir = TempDir::new().unwrap();
        let a = saved(&dir, "a.png", &RgbImage::from_pixel(6, 4, Rgb([1, 1, 1])));
        let b = saved(&dir, "b.png", &RgbImage::from_pixel(12, 8, Rgb([1, 1, 1])));

        let diff = diff_image(&DefaultCodec, &a, &b).unwrap();

        assert_eq!(diff.dimensions(), (6, 4));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let a = saved(&dir, "a.png", &RgbImage::from_pixel(2, 2, Rgb([1, 1, 1])));
        let missing = FingerprintRecord::new(dir.path().join("missing.png"), 0);

        assert!(diff_image(&DefaultCodec, &a, &missing).is_err());
    }
}
