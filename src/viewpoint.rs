//! Viewpoints around target positions.
//!
//! A [`ViewPoint`] is the set of restriction fragments around a target
//! position (typically a transcription start site) that is chosen for
//! enrichment. Viewpoints are constructed by a [`Builder`], which carves the
//! search window around the target into [`Segment`]s at the cut sites of the
//! configured enzymes and then applies a selection [`Strategy`].

use omics::coordinate::Strand;

use crate::segment::thousands;
use crate::segment::Segment;

pub mod builder;
pub mod score;
pub mod strategy;
pub mod target;

pub use builder::Builder;
pub use strategy::Strategy;
pub use target::Target;

/// The reason a segment was not selected.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rejection {
    /// The segment is shorter than the minimum fragment size.
    TooShort,

    /// The segment is longer than the maximum fragment size.
    TooLong,

    /// The segment starts too far upstream of the target.
    TooFarUpstream,

    /// The segment ends too far downstream of the target.
    TooFarDownstream,

    /// The repeat content of the upstream margin is too high.
    RepeatContentUp,

    /// The repeat content of the downstream margin is too high.
    RepeatContentDown,

    /// The GC content is outside of the allowed window.
    GcContent,

    /// The segment does not contain the target.
    NotCenter,

    /// The segment spans the whole window without a cut site inside it.
    NoCutSite,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::TooShort => write!(f, "fragment too short"),
            Rejection::TooLong => write!(f, "fragment too long"),
            Rejection::TooFarUpstream => write!(f, "fragment too far upstream"),
            Rejection::TooFarDownstream => write!(f, "fragment too far downstream"),
            Rejection::RepeatContentUp => write!(f, "repeat content of upstream margin too high"),
            Rejection::RepeatContentDown => {
                write!(f, "repeat content of downstream margin too high")
            }
            Rejection::GcContent => write!(f, "GC content out of range"),
            Rejection::NotCenter => write!(f, "fragment does not contain the target"),
            Rejection::NoCutSite => write!(f, "fragment not bounded by a restriction site"),
        }
    }
}

/// The reason a viewpoint is unresolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unresolved {
    /// No segment contains the target.
    NoCenterSegment,

    /// The segment containing the target was rejected.
    CenterRejected(Rejection),

    /// Every segment was rejected.
    NoSegmentSelected,

    /// No enzyme cuts within the window.
    NoCutSite,
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unresolved::NoCenterSegment => write!(f, "no center fragment found"),
            Unresolved::CenterRejected(reason) => write!(f, "center fragment rejected: {reason}"),
            Unresolved::NoSegmentSelected => write!(f, "no fragment selected"),
            Unresolved::NoCutSite => write!(f, "no restriction site in window"),
        }
    }
}

/// A viewpoint around a target.
#[derive(Clone, Debug)]
pub struct ViewPoint {
    /// The target.
    target: Target,

    /// The number of bases searched before the target on the genome.
    upstream: u64,

    /// The number of bases searched after the target on the genome.
    downstream: u64,

    /// The 1-based start.
    start: u64,

    /// The 1-based, inclusive end.
    end: u64,

    /// The segments, in genomic order.
    segments: Vec<Segment>,

    /// The score within `[0, 1]`.
    score: f64,

    /// The strategy the viewpoint was built with.
    strategy: Strategy,

    /// Why the viewpoint is unresolved, if it is.
    unresolved: Option<Unresolved>,
}

impl ViewPoint {
    /// Gets the target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Gets the chromosome name.
    pub fn chromosome(&self) -> &str {
        self.target.chromosome()
    }

    /// Gets the 1-based target position.
    pub fn position(&self) -> u64 {
        self.target.position()
    }

    /// Gets the strand of the target.
    pub fn strand(&self) -> &Strand {
        self.target.strand()
    }

    /// Gets the number of bases searched before the target on the genome.
    pub fn upstream(&self) -> u64 {
        self.upstream
    }

    /// Gets the number of bases searched after the target on the genome.
    pub fn downstream(&self) -> u64 {
        self.downstream
    }

    /// Gets the 1-based start.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the 1-based, inclusive end.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets all segments, in genomic order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates over the selected segments.
    pub fn selected_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_selected())
    }

    /// Gets the number of selected segments.
    pub fn selected_count(&self) -> usize {
        self.selected_segments().count()
    }

    /// Gets the summed length of the selected segments.
    pub fn total_length_of_selected_segments(&self) -> u64 {
        self.selected_segments().map(Segment::length).sum()
    }

    /// Gets the span from the first to the last selected segment, or zero
    /// when no segment is selected.
    pub fn total_length(&self) -> u64 {
        let start = self.selected_segments().map(Segment::start).min();
        let end = self.selected_segments().map(Segment::end).max();

        match (start, end) {
            (Some(start), Some(end)) => end - start + 1,
            _ => 0,
        }
    }

    /// Gets the summed margin length of the selected segments.
    pub fn total_margin_size(&self) -> u64 {
        self.selected_segments()
            .map(Segment::margin_total_length)
            .sum()
    }

    /// Gets the score within `[0, 1]`.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Gets the score as a percentage, e.g., `87.25%`.
    pub fn score_as_percent(&self) -> String {
        format!("{:.2}%", 100.0 * self.score)
    }

    /// Gets the target location, e.g., `chr4:29,232,796`.
    pub fn genomic_location(&self) -> String {
        format!("{}:{}", self.chromosome(), thousands(self.position()))
    }

    /// Gets the strategy the viewpoint was built with.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns whether at least one segment is selected.
    pub fn is_resolved(&self) -> bool {
        self.unresolved.is_none()
    }

    /// Gets why the viewpoint is unresolved, if it is.
    pub fn unresolved(&self) -> Option<Unresolved> {
        self.unresolved
    }
}
