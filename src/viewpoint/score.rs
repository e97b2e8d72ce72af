//! Viewpoint scoring.
//!
//! Every position of a selected segment is scored by its distance to the
//! target with the cumulative normal distribution `N(-3σ, σ)` evaluated at the
//! negated distance, where `σ` is one sixth of the maximum distance on that
//! side of the target. Positions at the target score close to one and
//! positions at the maximum distance close to zero. The per-segment sums are
//! discounted by the mean repeat content of the segment's margins and the
//! total is divided by the number of scored positions.

use statrs::distribution::ContinuousCDF as _;
use statrs::distribution::Normal;

use crate::segment::Segment;

/// Scores positions by their distance to a target.
#[derive(Clone, Copy, Debug)]
pub struct DistanceScore {
    /// The distribution, or `None` when the maximum distance is zero.
    distribution: Option<Normal>,
}

impl DistanceScore {
    /// Creates a distance score that decays to zero at `max_distance`.
    pub fn new(max_distance: u64) -> Self {
        let sd = max_distance as f64 / 6.0;
        let distribution = Normal::new(-3.0 * sd, sd).ok();

        Self { distribution }
    }

    /// Scores a distance.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::viewpoint::score::DistanceScore;
    ///
    /// let score = DistanceScore::new(6_000);
    ///
    /// assert!(score.at(0) > 0.99);
    /// assert!((score.at(3_000) - 0.5).abs() < 1e-9);
    /// assert!(score.at(6_000) < 0.01);
    /// ```
    pub fn at(&self, distance: u64) -> f64 {
        match &self.distribution {
            Some(distribution) => distribution.cdf(-(distance as f64)),
            // A degenerate distribution at zero.
            None => match distance {
                0 => 1.0,
                _ => 0.0,
            },
        }
    }
}

/// Scores the selected `segments` around the target at `position`.
///
/// `upstream` and `downstream` are the maximum distances before and after the
/// target. The score is zero when no position is selected.
pub fn score(segments: &[Segment], position: u64, upstream: u64, downstream: u64) -> f64 {
    let before = DistanceScore::new(upstream);
    let after = DistanceScore::new(downstream);

    let mut total = 0.0;
    let mut count = 0u64;

    for segment in segments.iter().filter(|s| s.is_selected()) {
        let mut sum = 0.0;

        for j in segment.start()..=segment.end() {
            sum += match j < position {
                true => before.at(position - j),
                false => after.at(j - position),
            };
        }

        count += segment.length();
        total += (1.0 - segment.mean_margin_repeat_content()) * sum;
    }

    match count {
        0 => 0.0,
        n => total / n as f64,
    }
}
