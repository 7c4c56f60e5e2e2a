use std::sync::OnceLock;

use finger_core::{BinaryDescriptor, Keypoint};
use rayon::prelude::*;

const DESCRIPTOR_BITS: usize = 256;

/// Sampling pairs lie in a 25x25 window around the keypoint
const PATCH_RADIUS: f32 = 12.0;

type SamplePair = (f32, f32, f32, f32);

/// Fixed pseudo-random test pattern, identical on every run.
fn sampling_pattern() -> &'static [SamplePair; DESCRIPTOR_BITS] {
    static PATTERN: OnceLock<[SamplePair; DESCRIPTOR_BITS]> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let mut state: u32 = 0x2545_F491;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            // Map to [-PATCH_RADIUS, PATCH_RADIUS]
            (state % 25) as f32 - PATCH_RADIUS
        };
        let mut pattern = [(0.0, 0.0, 0.0, 0.0); DESCRIPTOR_BITS];
        for pair in pattern.iter_mut() {
            *pair = (next(), next(), next(), next());
        }
        pattern
    })
}

/// Rotated BRIEF over a row-major 8-bit image.
pub struct BriefGenerator<'a> {
    img: &'a [u8],
    w: usize,
    h: usize,
}

impl<'a> BriefGenerator<'a> {
    pub fn new(img: &'a [u8], width: usize, height: usize) -> Self {
        Self { img, w: width, h: height }
    }

    /// One descriptor per keypoint, in keypoint order
    pub fn describe(&self, kps: &[Keypoint]) -> Vec<BinaryDescriptor> {
        kps.par_iter().map(|kp| self.describe_one(kp)).collect()
    }

    fn describe_one(&self, kp: &Keypoint) -> BinaryDescriptor {
        let (s, c) = kp.angle.sin_cos();
        let mut d = [0u8; 32];

        for (i, &(dx1, dy1, dx2, dy2)) in sampling_pattern().iter().enumerate() {
            let a = self.bilinear_sample(kp.x + c * dx1 - s * dy1, kp.y + s * dx1 + c * dy1);
            let b = self.bilinear_sample(kp.x + c * dx2 - s * dy2, kp.y + s * dx2 + c * dy2);
            d[i / 8] |= ((a < b) as u8) << (i % 8);
        }
        d
    }

    /// Bilinear interpolation; samples outside the image clamp to the border
    fn bilinear_sample(&self, x: f32, y: f32) -> f32 {
        let x = x.clamp(0.0, (self.w - 1) as f32);
        let y = y.clamp(0.0, (self.h - 1) as f32);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.w - 1);
        let y1 = (y0 + 1).min(self.h - 1);
        let dx = x - x0 as f32;
        let dy = y - y0 as f32;

        let p = |xx: usize, yy: usize| self.img[yy * self.w + xx] as f32;
        let top = p(x0, y0) * (1.0 - dx) + p(x1, y0) * dx;
        let bottom = p(x0, y1) * (1.0 - dx) + p(x1, y1) * dx;

        top * (1.0 - dy) + bottom * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finger_core::Descriptor;

    fn kp(x: f32, y: f32, angle: f32) -> Keypoint {
        Keypoint { x, y, angle }
    }

    fn noise_image(w: usize, h: usize, seed: u32) -> Vec<u8> {
        let mut state = seed;
        (0..w * h)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_pattern_is_stable_and_bounded() {
        let a = sampling_pattern();
        let b = sampling_pattern();
        assert!(std::ptr::eq(a, b));
        for &(x1, y1, x2, y2) in a.iter() {
            for v in [x1, y1, x2, y2] {
                assert!((-PATCH_RADIUS..=PATCH_RADIUS).contains(&v));
            }
        }
    }

    #[test]
    fn test_uniform_image_gives_zero_descriptor() {
        let img = vec![90u8; 40 * 40];
        let gen = BriefGenerator::new(&img, 40, 40);
        let d = gen.describe(&[kp(20.0, 20.0, 0.3)]);
        assert_eq!(d, vec![[0u8; 32]]);
    }

    #[test]
    fn test_deterministic() {
        let img = noise_image(64, 64, 99);
        let gen = BriefGenerator::new(&img, 64, 64);
        let kps = vec![kp(20.0, 30.0, 0.0), kp(40.5, 12.25, 1.2), kp(1.0, 62.0, -2.0)];
        assert_eq!(gen.describe(&kps), gen.describe(&kps));
    }

    #[test]
    fn test_distinct_locations_differ() {
        let img = noise_image(64, 64, 7);
        let gen = BriefGenerator::new(&img, 64, 64);
        let d = gen.describe(&[kp(20.0, 20.0, 0.0), kp(44.0, 40.0, 0.0)]);
        assert!(d[0].distance(&d[1]) > 32.0);
    }

    #[test]
    fn test_bilinear_sample() {
        // Horizontal gradient: value == 10 * x
        let img: Vec<u8> = (0..10 * 4).map(|i| (i % 10) as u8 * 10).collect();
        let gen = BriefGenerator::new(&img, 10, 4);
        assert!((gen.bilinear_sample(2.5, 1.0) - 25.0).abs() < 1e-4);
        assert!((gen.bilinear_sample(-5.0, 1.0) - 0.0).abs() < 1e-4);
        assert!((gen.bilinear_sample(50.0, 9.0) - 90.0).abs() < 1e-4);
    }
}
