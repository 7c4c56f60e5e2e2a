use std::path::{Path, PathBuf};

use finger_core::{Candidate, DescriptorSet, MatchReport, MatchResult, ReportError, ResultReporter};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use tracing::info;

/// Writes the outcome to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl<D> ResultReporter<D> for LogReporter {
    fn report(&mut self, report: MatchReport<'_, D>) -> Result<(), ReportError> {
        match report {
            MatchReport::Found { reference, best, .. } => info!(
                "Best Match for {}: {}, Score: {:.2}% ({} good matches)",
                reference,
                best.candidate(),
                best.percentage(),
                best.matches().len()
            ),
            MatchReport::NoMatch { reference } => info!("No valid matches found for {}", reference),
        }
        Ok(())
    }
}

const PALETTE: [Rgb<u8>; 6] = [
    Rgb([255, 64, 64]),
    Rgb([64, 200, 64]),
    Rgb([64, 128, 255]),
    Rgb([255, 200, 0]),
    Rgb([255, 64, 255]),
    Rgb([0, 220, 220]),
];

/// Renders reference and best candidate side by side with their matches and saves the picture.
#[derive(Debug, Clone)]
pub struct MatchImageReporter {
    output: PathBuf,
    scale: u32,
}

impl MatchImageReporter {
    /// `scale` enlarges the canvas for inspection; the default used by the CLI is 2
    pub fn new(output: impl Into<PathBuf>, scale: u32) -> Self {
        Self {
            output: output.into(),
            scale: scale.max(1),
        }
    }

    /// Draw the match picture without saving it
    pub fn render<D>(
        &self,
        reference: &Candidate,
        reference_set: &DescriptorSet<D>,
        best: &MatchResult<D>,
    ) -> Result<RgbImage, ReportError> {
        let left = open_rgb(&reference.path)?;
        let right = open_rgb(&best.candidate().path)?;

        let offset = left.width() as f32;
        let mut canvas = RgbImage::new(left.width() + right.width(), left.height().max(right.height()));
        imageops::replace(&mut canvas, &left, 0, 0);
        imageops::replace(&mut canvas, &right, left.width() as i64, 0);

        let ref_kps = reference_set.keypoints();
        let cand_kps = best.descriptors().keypoints();
        for (i, m) in best.matches().iter().enumerate() {
            let (Some(a), Some(b)) = (ref_kps.get(m.query_idx), cand_kps.get(m.train_idx)) else {
                continue;
            };
            let color = PALETTE[i % PALETTE.len()];
            let start = (a.x, a.y);
            let end = (b.x + offset, b.y);
            draw_hollow_circle_mut(&mut canvas, (start.0 as i32, start.1 as i32), 3, color);
            draw_hollow_circle_mut(&mut canvas, (end.0 as i32, end.1 as i32), 3, color);
            draw_line_segment_mut(&mut canvas, start, end, color);
        }

        if self.scale > 1 {
            let (w, h) = canvas.dimensions();
            let (Some(sw), Some(sh)) = (w.checked_mul(self.scale), h.checked_mul(self.scale)) else {
                return Err(ReportError::Render(format!(
                    "{}x{} canvas cannot be scaled by {}",
                    w, h, self.scale
                )));
            };
            canvas = imageops::resize(&canvas, sw, sh, FilterType::Nearest);
        }
        Ok(canvas)
    }
}

impl<D> ResultReporter<D> for MatchImageReporter {
    fn report(&mut self, report: MatchReport<'_, D>) -> Result<(), ReportError> {
        let MatchReport::Found { reference, reference_set, best } = report else {
            return Ok(());
        };

        let canvas = self.render(reference, reference_set, best)?;
        canvas
            .save(&self.output)
            .map_err(|e| ReportError::Render(format!("{}: {}", self.output.display(), e)))?;
        info!("Saved match visualization to {}", self.output.display());
        Ok(())
    }
}

fn open_rgb(path: &Path) -> Result<RgbImage, ReportError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| ReportError::Render(format!("{}: {}", path.display(), e)))
}
