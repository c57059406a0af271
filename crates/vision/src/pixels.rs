//! Pixel classification and blob counting

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::region_labelling::{connected_components, Connectivity};

/// Color class of a single pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PixelClass {
    /// Red fruit surface
    RipeFruit,
    /// Pale green / whitish fruit surface
    UnripeFruit,
    /// Bright white petal
    Petal,
    Other,
}

/// Classify a pixel by simple color rules
pub(crate) fn classify(pixel: &Rgb<u8>) -> PixelClass {
    let [r, g, b] = pixel.0;
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);

    if r >= 200 && g >= 200 && b >= 200 {
        return PixelClass::Petal;
    }

    if r >= 100 && rf > gf * 1.5 && rf > bf * 1.5 {
        return PixelClass::RipeFruit;
    }

    // Luminance formula: 0.299*R + 0.587*G + 0.114*B
    let luma = rf * 0.299 + gf * 0.587 + bf * 0.114;
    if luma >= 140.0 && g >= r && g > b && r >= 110 {
        return PixelClass::UnripeFruit;
    }

    PixelClass::Other
}

/// Pixel counts per class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ClassHistogram {
    pub ripe: usize,
    pub unripe: usize,
    pub petal: usize,
    pub total: usize,
}

impl ClassHistogram {
    pub fn compute(img: &RgbImage) -> Self {
        let mut hist = Self::default();
        for pixel in img.pixels() {
            hist.total += 1;
            match classify(pixel) {
                PixelClass::RipeFruit => hist.ripe += 1,
                PixelClass::UnripeFruit => hist.unripe += 1,
                PixelClass::Petal => hist.petal += 1,
                PixelClass::Other => {}
            }
        }
        hist
    }

    /// Fraction of the image covered by fruit of any ripeness
    pub fn fruit_fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.ripe + self.unripe) as f64 / self.total as f64
    }
}

/// Count 4-connected petal blobs of at least `min_pixels`
pub(crate) fn count_petal_blobs(img: &RgbImage, min_pixels: usize) -> usize {
    let mask = GrayImage::from_fn(img.width(), img.height(), |x, y| {
        match classify(img.get_pixel(x, y)) {
            PixelClass::Petal => Luma([255]),
            _ => Luma([0]),
        }
    });

    // Background keeps label 0; blobs are numbered from 1
    let labels = connected_components(&mask, Connectivity::Four, Luma([0u8]));
    let blob_count = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;

    let mut sizes = vec![0usize; blob_count + 1];
    for label in labels.pixels() {
        sizes[label[0] as usize] += 1;
    }

    sizes.iter().skip(1).filter(|&&size| size >= min_pixels).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([200, 30, 40]);
    const PALE_GREEN: Rgb<u8> = Rgb([170, 210, 120]);
    const WHITE: Rgb<u8> = Rgb([240, 240, 235]);
    const LEAF: Rgb<u8> = Rgb([40, 110, 40]);

    #[test]
    fn test_classify() {
        assert_eq!(classify(&RED), PixelClass::RipeFruit);
        assert_eq!(classify(&PALE_GREEN), PixelClass::UnripeFruit);
        assert_eq!(classify(&WHITE), PixelClass::Petal);
        assert_eq!(classify(&LEAF), PixelClass::Other);
        assert_eq!(classify(&Rgb([0, 0, 0])), PixelClass::Other);
    }

    #[test]
    fn test_histogram() {
        let mut img = RgbImage::from_pixel(10, 10, LEAF);
        for x in 0..10 {
            img.put_pixel(x, 0, RED);
            img.put_pixel(x, 1, PALE_GREEN);
        }
        let hist = ClassHistogram::compute(&img);
        assert_eq!(hist.ripe, 10);
        assert_eq!(hist.unripe, 10);
        assert_eq!(hist.total, 100);
        assert!((hist.fruit_fraction() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_blob_count() {
        let mut img = RgbImage::from_pixel(20, 20, LEAF);
        // Two 3x3 blobs and one single-pixel speck
        for (ox, oy) in [(2, 2), (12, 12)] {
            for dx in 0..3 {
                for dy in 0..3 {
                    img.put_pixel(ox + dx, oy + dy, WHITE);
                }
            }
        }
        img.put_pixel(18, 1, WHITE);

        assert_eq!(count_petal_blobs(&img, 4), 2);
        assert_eq!(count_petal_blobs(&img, 1), 3);
    }

    #[test]
    fn test_diagonal_pixels_are_separate_blobs() {
        let mut img = RgbImage::from_pixel(4, 4, LEAF);
        img.put_pixel(0, 0, WHITE);
        img.put_pixel(1, 1, WHITE);
        assert_eq!(count_petal_blobs(&img, 1), 2);
    }
}
