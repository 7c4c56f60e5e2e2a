use finger_core::Keypoint;
use rayon::prelude::*;

/// Bresenham circle of radius 3, clockwise from the left
const CIRCLE: [(i32, i32); 16] = [
    (-3, 0), (-3, 1), (-2, 2), (-1, 3),
    (0, 3), (1, 3), (2, 2), (3, 1),
    (3, 0), (3, -1), (2, -2), (1, -3),
    (0, -3), (-1, -3), (-2, -2), (-3, -1),
];

/// FAST needs a 3-pixel border on each side
pub const MIN_IMAGE_SIZE: usize = 7;

/// Keypoint with corner response score for NMS
#[derive(Debug, Clone, Copy)]
pub struct ScoredKeypoint {
    pub keypoint: Keypoint,
    pub response: f32,
}

/// FAST segment-test corner detector over a row-major 8-bit image.
#[derive(Debug, Clone)]
pub struct CornerDetector {
    threshold: u8,
    arc_length: usize,
    patch_size: usize,
}

impl CornerDetector {
    pub fn new(threshold: u8, arc_length: usize, patch_size: usize) -> Self {
        Self {
            threshold,
            arc_length,
            patch_size,
        }
    }

    /// Corners with their response and orientation, in row-major order
    pub fn detect(&self, img: &[u8], w: usize, h: usize) -> Vec<ScoredKeypoint> {
        if w < MIN_IMAGE_SIZE || h < MIN_IMAGE_SIZE {
            return Vec::new();
        }

        (3..h - 3)
            .into_par_iter()
            .flat_map_iter(|y| {
                let mut row = Vec::new();
                for x in 3..w - 3 {
                    if let Some(response) = self.segment_test(img, w, x, y) {
                        let angle = self.orientation(img, w, h, x, y);
                        row.push(ScoredKeypoint {
                            keypoint: Keypoint { x: x as f32, y: y as f32, angle },
                            response,
                        });
                    }
                }
                row
            })
            .collect()
    }

    /// Mean absolute contrast of the arc if (x, y) is a corner
    fn segment_test(&self, img: &[u8], w: usize, x: usize, y: usize) -> Option<f32> {
        let p = img[y * w + x];
        let mut bright = 0u32;
        let mut dark = 0u32;
        let mut bright_sum = 0i32;
        let mut dark_sum = 0i32;

        for (i, &(dx, dy)) in CIRCLE.iter().enumerate() {
            let q = img[(y as i32 + dy) as usize * w + (x as i32 + dx) as usize];
            if q >= p.saturating_add(self.threshold) {
                bright |= 1 << i;
                bright_sum += q as i32 - p as i32;
            } else if q.saturating_add(self.threshold) <= p {
                dark |= 1 << i;
                dark_sum += p as i32 - q as i32;
            }
        }

        if has_arc(bright, self.arc_length) {
            Some(bright_sum as f32 / bright.count_ones() as f32)
        } else if has_arc(dark, self.arc_length) {
            Some(dark_sum as f32 / dark.count_ones() as f32)
        } else {
            None
        }
    }

    /// Intensity-centroid angle over a square patch, clamped at the image border
    pub fn orientation(&self, img: &[u8], w: usize, h: usize, x: usize, y: usize) -> f32 {
        let half = (self.patch_size / 2) as i32;
        let (cx, cy) = (x as i32, y as i32);
        let mut m10 = 0i64;
        let mut m01 = 0i64;

        for dy in -half..=half {
            let yy = (cy + dy).clamp(0, h as i32 - 1) as usize;
            for dx in -half..=half {
                let xx = (cx + dx).clamp(0, w as i32 - 1) as usize;
                let val = img[yy * w + xx] as i64;
                m10 += dx as i64 * val;
                m01 += dy as i64 * val;
            }
        }

        (m01 as f32).atan2(m10 as f32)
    }
}

/// True if `mask` (16 circle bits) holds `n` consecutive set bits, wrapping around
fn has_arc(mask: u32, n: usize) -> bool {
    if (mask.count_ones() as usize) < n {
        return false;
    }
    let doubled = mask | (mask << 16);
    let mut run = doubled;
    for k in 1..n {
        run &= doubled >> k;
    }
    run != 0
}

/// Greedy non-maximum suppression, strongest first, keeping at most `max_keypoints`
pub fn non_maximum_suppression(
    keypoints: &[ScoredKeypoint],
    min_distance: f32,
    max_keypoints: usize,
) -> Vec<ScoredKeypoint> {
    let mut sorted = keypoints.to_vec();
    sorted.sort_by(|a, b| b.response.total_cmp(&a.response));

    let min_distance_sq = min_distance * min_distance;
    let mut kept: Vec<ScoredKeypoint> = Vec::new();

    for candidate in sorted {
        if kept.len() >= max_keypoints {
            break;
        }
        let isolated = kept.iter().all(|k| {
            let dx = candidate.keypoint.x - k.keypoint.x;
            let dy = candidate.keypoint.y - k.keypoint.y;
            dx * dx + dy * dy >= min_distance_sq
        });
        if isolated {
            kept.push(candidate);
        }
    }

    kept
}
