//! Segment selection strategies.

use crate::config::Parameters;
use crate::segment::Segment;
use crate::segment::State;
use crate::viewpoint::Rejection;
use crate::viewpoint::Unresolved;

/// The minimum length of the center segment under [`Strategy::Simple`].
pub const SIMPLE_MIN_LENGTH: u64 = 146;

/// The maximum length of the center segment under [`Strategy::Simple`].
pub const SIMPLE_MAX_LENGTH: u64 = 20_000;

/// The minimum GC content of the center segment under [`Strategy::Simple`].
pub const SIMPLE_MIN_GC_CONTENT: f64 = 0.25;

/// The maximum GC content of the center segment under [`Strategy::Simple`].
pub const SIMPLE_MAX_GC_CONTENT: f64 = 0.65;

/// An error associated with parsing a [`Strategy`].
#[derive(Debug, Eq, PartialEq)]
pub struct ParseError(String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid strategy: expected `simple` or `extended`, found `{}`",
            self.0
        )
    }
}

impl std::error::Error for ParseError {}

/// A segment selection strategy.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Strategy {
    /// Select the segment containing the target if it passes fixed GC and
    /// length thresholds, keeping its neighbors for context.
    Simple,

    /// Select every segment around the target that passes the configured
    /// filters.
    #[default]
    Extended,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Simple => write!(f, "simple"),
            Strategy::Extended => write!(f, "extended"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Strategy::Simple),
            "extended" => Ok(Strategy::Extended),
            _ => Err(ParseError(s.to_string())),
        }
    }
}

/// The outcome of applying a strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Selection {
    /// The 1-based start of the viewpoint.
    pub(crate) start: u64,

    /// The 1-based, inclusive end of the viewpoint.
    pub(crate) end: u64,

    /// Why the viewpoint is unresolved, if it is.
    pub(crate) unresolved: Option<Unresolved>,
}

impl Strategy {
    /// Selects among `segments` around the target at `position`.
    ///
    /// `window` is the span of the search window and becomes the extent of
    /// an unresolved viewpoint. Segments dropped from the viewpoint are
    /// removed from `segments`.
    pub(crate) fn apply(
        self,
        segments: &mut Vec<Segment>,
        position: u64,
        window: (u64, u64),
        parameters: &Parameters,
    ) -> Selection {
        match self {
            Strategy::Simple => simple(segments, position, window),
            Strategy::Extended => extended(segments, position, window, parameters),
        }
    }
}

/// Rejects every segment.
fn reject_all(segments: &mut [Segment], rejection: Rejection) {
    for segment in segments {
        segment.set_state(State::Rejected(rejection));
    }
}

/// Checks the center segment against the fixed thresholds.
fn check_center(segment: &Segment) -> Option<Rejection> {
    let gc = segment.features().gc_content();

    if segment.length() < SIMPLE_MIN_LENGTH {
        Some(Rejection::TooShort)
    } else if segment.length() > SIMPLE_MAX_LENGTH {
        Some(Rejection::TooLong)
    } else if !(SIMPLE_MIN_GC_CONTENT..=SIMPLE_MAX_GC_CONTENT).contains(&gc) {
        Some(Rejection::GcContent)
    } else {
        None
    }
}

/// Applies [`Strategy::Simple`].
fn simple(segments: &mut Vec<Segment>, position: u64, window: (u64, u64)) -> Selection {
    let (start, end) = window;
    let unresolved = |reason| Selection {
        start,
        end,
        unresolved: Some(reason),
    };

    let Some(center) = segments.iter().position(|s| s.contains(position)) else {
        reject_all(segments, Rejection::NotCenter);
        return unresolved(Unresolved::NoCenterSegment);
    };

    reject_all(segments, Rejection::NotCenter);

    if let Some(rejection) = check_center(&segments[center]) {
        segments[center].set_state(State::Rejected(rejection));
        return unresolved(Unresolved::CenterRejected(rejection));
    }

    segments[center].set_state(State::Selected);

    let from = center.saturating_sub(1);
    let to = (center + 2).min(segments.len());
    segments.truncate(to);
    segments.drain(..from);

    let center = &segments[center - from];

    Selection {
        start: center.start(),
        end: center.end(),
        unresolved: None,
    }
}

/// Checks a segment against the configured filters.
fn check(segment: &Segment, position: u64, parameters: &Parameters) -> Option<Rejection> {
    let features = segment.features();
    let gc = features.gc_content();

    if segment.length() < parameters.min_fragment_size() {
        Some(Rejection::TooShort)
    } else if position.saturating_sub(segment.start()) > parameters.max_distance_upstream() {
        Some(Rejection::TooFarUpstream)
    } else if segment.end().saturating_sub(position) > parameters.max_distance_downstream() {
        Some(Rejection::TooFarDownstream)
    } else if features.repeat_content_down() > parameters.max_repeat_content() {
        Some(Rejection::RepeatContentDown)
    } else if features.repeat_content_up() > parameters.max_repeat_content() {
        Some(Rejection::RepeatContentUp)
    } else if gc < parameters.min_gc_content() || gc > parameters.max_gc_content() {
        Some(Rejection::GcContent)
    } else {
        None
    }
}

/// Applies [`Strategy::Extended`].
fn extended(
    segments: &mut Vec<Segment>,
    position: u64,
    window: (u64, u64),
    parameters: &Parameters,
) -> Selection {
    for segment in segments.iter_mut() {
        let state = match check(segment, position, parameters) {
            Some(rejection) => State::Rejected(rejection),
            None => State::Selected,
        };

        segment.set_state(state);
    }

    let first = segments.iter().position(Segment::is_selected);
    let last = segments.iter().rposition(Segment::is_selected);

    let (Some(first), Some(last)) = (first, last) else {
        return Selection {
            start: window.0,
            end: window.1,
            unresolved: Some(Unresolved::NoSegmentSelected),
        };
    };

    let start = segments[first].start().min(position);
    let end = segments[last].end().max(position);

    // Keep one rejected segment on each flank.
    segments.truncate((last + 2).min(segments.len()));
    segments.drain(..first.saturating_sub(1));

    Selection {
        start,
        end,
        unresolved: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::segment::features::Calculator;

    /// Builds a segment of `length` bases with the given GC content and
    /// margin repeat content.
    fn segment(start: u64, length: u64, gc: f64, repeat: f64) -> Segment {
        let gc_count = (gc * length as f64).round() as usize;
        let masked = (repeat * length as f64).round() as usize;

        let bases = (0..length as usize)
            .map(|i| {
                let base = if i < gc_count { b'G' } else { b'A' };
                // Soft-mask bases evenly from both ends.
                if i < masked / 2 || i >= length as usize - (masked - masked / 2) {
                    base.to_ascii_lowercase()
                } else {
                    base
                }
            })
            .collect::<Vec<_>>();

        let features = Calculator::new(length / 2).from_bases(&bases);
        Segment::new("chr1", start, start + length - 1, length / 2, features)
    }

    /// Builds adjacent segments of the given lengths starting at position 1.
    fn segments(specs: &[(u64, f64)]) -> Vec<Segment> {
        let mut start = 1;

        specs
            .iter()
            .map(|(length, gc)| {
                let segment = segment(start, *length, *gc, 0.0);
                start += length;
                segment
            })
            .collect()
    }

    #[test]
    fn test_parse() {
        assert_eq!("simple".parse::<Strategy>(), Ok(Strategy::Simple));
        assert_eq!("EXTENDED".parse::<Strategy>(), Ok(Strategy::Extended));
        assert_eq!(
            "greedy".parse::<Strategy>().unwrap_err().to_string(),
            "invalid strategy: expected `simple` or `extended`, found `greedy`"
        );
    }

    #[test]
    fn test_simple_selects_center_and_keeps_neighbors() {
        let mut list = segments(&[(500, 0.4), (500, 0.4), (500, 0.45), (500, 0.4), (500, 0.4)]);
        let selection = simple(&mut list, 1250, (1, 2500));

        assert_eq!(selection.unresolved, None);
        assert_eq!((selection.start, selection.end), (1001, 1500));
        assert_eq!(list.len(), 3);
        assert!(list[1].is_selected());
        assert_eq!(list[0].rejection(), Some(Rejection::NotCenter));
        assert_eq!(list[2].rejection(), Some(Rejection::NotCenter));
    }

    #[test]
    fn test_simple_center_at_edge() {
        let mut list = segments(&[(500, 0.45), (500, 0.4)]);
        let selection = simple(&mut list, 1, (1, 1000));

        assert_eq!(selection.unresolved, None);
        assert_eq!(list.len(), 2);
        assert!(list[0].is_selected());
    }

    #[test]
    fn test_simple_rejects_low_gc_center() {
        let mut list = segments(&[(500, 0.4), (500, 0.1), (500, 0.4)]);
        let selection = simple(&mut list, 750, (1, 1500));

        assert_eq!(
            selection.unresolved,
            Some(Unresolved::CenterRejected(Rejection::GcContent))
        );
        assert_eq!((selection.start, selection.end), (1, 1500));
        assert!(list.iter().all(|s| !s.is_selected()));
    }

    #[test]
    fn test_simple_without_center() {
        let mut list = segments(&[(500, 0.4)]);
        let selection = simple(&mut list, 900, (1, 1000));
        assert_eq!(selection.unresolved, Some(Unresolved::NoCenterSegment));
    }

    #[test]
    fn test_extended_rejects_short_segments() -> Result<(), Box<dyn std::error::Error>> {
        let parameters = Builder::default().min_fragment_size(100).try_build()?;

        let mut list = segments(&[(500, 0.4), (50, 0.4), (500, 0.4)]);
        let selection = extended(&mut list, 525, (1, 1050), &parameters);

        assert_eq!(selection.unresolved, None);
        assert_eq!(list[1].rejection(), Some(Rejection::TooShort));
        assert!(list[0].is_selected() && list[2].is_selected());
        assert_eq!((selection.start, selection.end), (1, 1050));

        Ok(())
    }

    #[test]
    fn test_extended_trims_to_one_flank() -> Result<(), Box<dyn std::error::Error>> {
        let parameters = Builder::default()
            .max_distance_upstream(1000)
            .max_distance_downstream(1000)
            .try_build()?;

        let mut list = segments(&[
            (500, 0.4),
            (500, 0.4),
            (500, 0.9),
            (500, 0.4),
            (500, 0.4),
            (500, 0.4),
            (500, 0.4),
        ]);
        let selection = extended(&mut list, 1750, (1, 3500), &parameters);

        // Segments 1 and 2 start more than 1000 bases upstream, segment 3
        // has too much GC and segments 6 and 7 end too far downstream.
        let states = list.iter().map(Segment::rejection).collect::<Vec<_>>();
        assert_eq!(
            states,
            vec![Some(Rejection::GcContent), None, None, Some(Rejection::TooFarDownstream)]
        );
        assert_eq!(list[0].start(), 1001);
        assert_eq!((selection.start, selection.end), (1501, 2500));

        Ok(())
    }

    #[test]
    fn test_extended_clamps_to_target() -> Result<(), Box<dyn std::error::Error>> {
        let parameters = Builder::default().try_build()?;

        let mut list = segments(&[(500, 0.9), (500, 0.4)]);
        let selection = extended(&mut list, 100, (1, 1000), &parameters);

        assert_eq!((selection.start, selection.end), (100, 1000));

        Ok(())
    }

    #[test]
    fn test_extended_repeat_content() -> Result<(), Box<dyn std::error::Error>> {
        let parameters = Builder::default().max_repeat_content(0.5).try_build()?;

        let mut list = vec![segment(1, 500, 0.4, 0.8), segment(501, 500, 0.4, 0.2)];
        let selection = extended(&mut list, 600, (1, 1000), &parameters);

        assert_eq!(list[0].rejection(), Some(Rejection::RepeatContentDown));
        assert!(list[1].is_selected());
        assert_eq!(selection.start, 501);

        Ok(())
    }

    #[test]
    fn test_extended_nothing_selected() -> Result<(), Box<dyn std::error::Error>> {
        let parameters = Builder::default().try_build()?;

        let mut list = segments(&[(500, 0.9), (500, 0.9), (500, 0.9)]);
        let selection = extended(&mut list, 600, (1, 1500), &parameters);

        assert_eq!(selection.unresolved, Some(Unresolved::NoSegmentSelected));
        assert_eq!(list.len(), 3);
        assert_eq!((selection.start, selection.end), (1, 1500));

        Ok(())
    }
}
