/// Percentage of good matches relative to the smaller keypoint count.
///
/// Returns `None` when either image has no keypoints; such a candidate has no
/// score at all rather than a score of zero. The value is capped at 100.
pub fn match_percentage(
    good_matches: usize,
    reference_keypoints: usize,
    candidate_keypoints: usize,
) -> Option<f32> {
    let keypoints = reference_keypoints.min(candidate_keypoints);
    if keypoints == 0 {
        return None;
    }
    let percentage = good_matches as f64 / keypoints as f64 * 100.0;
    Some(percentage.min(100.0) as f32)
}
