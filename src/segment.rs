//! Restriction fragments within a viewpoint.
//!
//! A [`Segment`] is one restriction fragment around a target. Its margins, the
//! stretches at either end nearest the cut sites, are where sequencing reads
//! originate and where baits are placed, so GC and repeat content are tracked
//! for the margins as well as for the whole fragment.

use crate::viewpoint::Rejection;

pub mod bait;
pub mod features;

pub use bait::Bait;
pub use bait::SegmentBaits;
pub use features::Features;

/// A 1-based, fully closed range within a segment.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Margin {
    /// The start.
    start: u64,

    /// The end.
    end: u64,
}

impl Margin {
    /// Creates a new margin.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Gets the start.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the end.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets the number of bases.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// The margins of a segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Margins {
    /// The segment is too short for two margins, so the whole segment is
    /// its only margin.
    Single(Margin),

    /// An upstream and a downstream margin of `margin_size` bases each.
    Pair(Margin, Margin),
}

impl Margins {
    /// Gets the margins of the segment `start..=end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::segment::Margin;
    /// use vpdesign::segment::Margins;
    ///
    /// assert_eq!(
    ///     Margins::of(101, 600, 250),
    ///     Margins::Pair(Margin::new(101, 350), Margin::new(351, 600))
    /// );
    /// assert_eq!(
    ///     Margins::of(101, 599, 250),
    ///     Margins::Single(Margin::new(101, 599))
    /// );
    /// ```
    pub fn of(start: u64, end: u64, margin_size: u64) -> Self {
        let length = end - start + 1;

        if margin_size > 0 && length >= 2 * margin_size {
            Margins::Pair(
                Margin::new(start, start + margin_size - 1),
                Margin::new(end + 1 - margin_size, end),
            )
        } else {
            Margins::Single(Margin::new(start, end))
        }
    }

    /// Gets the upstream margin (the only margin for short segments).
    pub fn upstream(&self) -> &Margin {
        match self {
            Margins::Single(margin) => margin,
            Margins::Pair(upstream, _) => upstream,
        }
    }

    /// Gets the downstream margin, if the segment has two margins.
    pub fn downstream(&self) -> Option<&Margin> {
        match self {
            Margins::Single(_) => None,
            Margins::Pair(_, downstream) => Some(downstream),
        }
    }

    /// Iterates over the margins from upstream to downstream.
    pub fn iter(&self) -> impl Iterator<Item = &Margin> {
        std::iter::once(self.upstream()).chain(self.downstream())
    }

    /// Gets the total number of bases in the margins.
    pub fn total_length(&self) -> u64 {
        self.iter().map(Margin::length).sum()
    }
}

/// The selection state of a segment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum State {
    /// Not yet considered.
    #[default]
    Candidate,

    /// Part of the viewpoint.
    Selected,

    /// Excluded from the viewpoint.
    Rejected(Rejection),
}

/// A restriction fragment within a viewpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// The chromosome name.
    chromosome: String,

    /// The 1-based start.
    start: u64,

    /// The 1-based, inclusive end.
    end: u64,

    /// The margins.
    margins: Margins,

    /// The sequence features.
    features: Features,

    /// Whether the segment contains the target.
    overlaps_target: bool,

    /// The selection state.
    state: State,

    /// The baits placed in the margins, if any.
    baits: Option<SegmentBaits>,
}

impl Segment {
    /// Creates a new, unselected segment.
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        margin_size: u64,
        features: Features,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            margins: Margins::of(start, end, margin_size),
            features,
            overlaps_target: false,
            state: State::Candidate,
            baits: None,
        }
    }

    /// Gets the chromosome name.
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Gets the 1-based start.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the 1-based, inclusive end.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets the number of bases.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Returns whether `position` lies within the segment.
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }

    /// Gets the margins.
    pub fn margins(&self) -> &Margins {
        &self.margins
    }

    /// Gets the total number of bases in the margins.
    pub fn margin_total_length(&self) -> u64 {
        self.margins.total_length()
    }

    /// Gets the sequence features.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Gets the mean of the repeat content of both margins.
    pub fn mean_margin_repeat_content(&self) -> f64 {
        self.features.mean_margin_repeat_content()
    }

    /// Returns whether the segment contains the target.
    pub fn overlaps_target(&self) -> bool {
        self.overlaps_target
    }

    /// Marks whether the segment contains the target.
    pub(crate) fn set_overlaps_target(&mut self, overlaps_target: bool) {
        self.overlaps_target = overlaps_target;
    }

    /// Gets the selection state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Sets the selection state.
    pub(crate) fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Returns whether the segment is selected.
    pub fn is_selected(&self) -> bool {
        self.state == State::Selected
    }

    /// Gets the reason the segment was rejected, if it was.
    pub fn rejection(&self) -> Option<Rejection> {
        match self.state {
            State::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Gets the baits placed in the margins, if baits were placed.
    pub fn baits(&self) -> Option<&SegmentBaits> {
        self.baits.as_ref()
    }

    /// Sets the baits placed in the margins.
    pub(crate) fn set_baits(&mut self, baits: SegmentBaits) {
        self.baits = Some(baits);
    }

    /// Gets the location, e.g., `chr3:425,930-736,434`, marked with `(*)`
    /// when the segment contains the target.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::segment::Features;
    /// use vpdesign::segment::Segment;
    ///
    /// let segment = Segment::new("chr3", 425_930, 736_434, 250, Features::default());
    /// assert_eq!(segment.location(), "chr3:425,930-736,434");
    /// ```
    pub fn location(&self) -> String {
        let location = format!(
            "{}:{}-{}",
            self.chromosome,
            thousands(self.start),
            thousands(self.end)
        );

        match self.overlaps_target {
            true => format!("{location} (*)"),
            false => location,
        }
    }
}

/// Formats a number with comma thousands separators.
pub(crate) fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }

        formatted.push(c);
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(48_937_985), "48,937,985");
    }

    #[test]
    fn test_margins() {
        let margins = Margins::of(1, 500, 250);
        assert_eq!(margins.upstream(), &Margin::new(1, 250));
        assert_eq!(margins.downstream(), Some(&Margin::new(251, 500)));
        assert_eq!(margins.total_length(), 500);

        let margins = Margins::of(1, 100, 250);
        assert_eq!(margins.downstream(), None);
        assert_eq!(margins.iter().count(), 1);
        assert_eq!(margins.total_length(), 100);
    }

    #[test]
    fn test_state() {
        let mut segment = Segment::new("chr1", 10, 20, 5, Features::default());
        assert_eq!(segment.state(), State::Candidate);
        assert_eq!(segment.length(), 11);
        assert!(segment.contains(10) && segment.contains(20) && !segment.contains(21));

        segment.set_state(State::Rejected(Rejection::TooShort));
        assert!(!segment.is_selected());
        assert_eq!(segment.rejection(), Some(Rejection::TooShort));

        segment.set_overlaps_target(true);
        assert_eq!(segment.location(), "chr1:10-20 (*)");
    }
}
