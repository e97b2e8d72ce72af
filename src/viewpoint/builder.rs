//! A builder for [`ViewPoint`]s.

use omics::coordinate::Strand;
use tracing::debug;
use tracing::trace;

use crate::alignability;
use crate::alignability::AlignabilityIndex;
use crate::config::Parameters;
use crate::digest::window::CutMap;
use crate::digest::Digester;
use crate::segment::bait::Selector;
use crate::segment::features::Calculator;
use crate::segment::Segment;
use crate::segment::State;
use crate::sequence;
use crate::sequence::SequenceAccessor;
use crate::viewpoint::score;
use crate::viewpoint::strategy::Selection;
use crate::viewpoint::Rejection;
use crate::viewpoint::Strategy;
use crate::viewpoint::Target;
use crate::viewpoint::Unresolved;
use crate::viewpoint::ViewPoint;

/// An error related to building a [`ViewPoint`].
#[derive(Debug)]
pub enum Error {
    /// A sequence error.
    Sequence(sequence::Error),

    /// An alignability error.
    Alignability(alignability::Error),

    /// A target outside of its chromosome.
    PositionOutOfRange {
        /// The chromosome name.
        chromosome: String,

        /// The target position.
        position: u64,

        /// The chromosome length.
        length: u64,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Sequence(err) => write!(f, "sequence error: {err}"),
            Error::Alignability(err) => write!(f, "alignability error: {err}"),
            Error::PositionOutOfRange {
                chromosome,
                position,
                length,
            } => write!(
                f,
                "target {chromosome}:{position} is outside of the chromosome (length {length})"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The search window around a target, laid onto the genome.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Window {
    /// The number of bases searched before the target.
    upstream: u64,

    /// The number of bases searched after the target.
    downstream: u64,

    /// The 1-based start, clamped to the chromosome.
    start: u64,

    /// The 1-based, inclusive end, clamped to the chromosome.
    end: u64,
}

impl Window {
    /// Slices the bases of `start..=end` out of the bases of the window.
    fn slice<'b>(&self, bases: &'b [u8], start: u64, end: u64) -> &'b [u8] {
        let from = (start - self.start) as usize;
        let to = (end - self.start + 1) as usize;
        &bases[from..to]
    }
}

/// Builds [`ViewPoint`]s around targets.
///
/// The sequence source, digester, parameters and alignability index are
/// shared read-only, so a single builder may be used from many threads.
pub struct Builder<'a, S: ?Sized> {
    /// The sequence source.
    accessor: &'a S,

    /// The digester.
    digester: &'a Digester,

    /// The design parameters.
    parameters: &'a Parameters,

    /// The alignability index used to place baits, if any.
    alignability: Option<&'a AlignabilityIndex>,
}

impl<S: ?Sized> std::fmt::Debug for Builder<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("digester", &self.digester)
            .field("parameters", &self.parameters)
            .field("alignability", &self.alignability.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, S> Builder<'a, S>
where
    S: SequenceAccessor + ?Sized,
{
    /// Creates a new builder.
    pub fn new(accessor: &'a S, digester: &'a Digester, parameters: &'a Parameters) -> Self {
        Self {
            accessor,
            digester,
            parameters,
            alignability: None,
        }
    }

    /// Places baits in the selected segments using `index`.
    ///
    /// Baits are only placed when the parameters enable them.
    pub fn alignability(mut self, index: &'a AlignabilityIndex) -> Self {
        self.alignability = Some(index);
        self
    }

    /// Gets the design parameters.
    pub fn parameters(&self) -> &Parameters {
        self.parameters
    }

    /// Lays the search window around `target` onto its chromosome.
    ///
    /// On the negative strand, the upstream and downstream lengths swap so
    /// that upstream always lies 5' of the target on its own strand.
    fn window(&self, target: &Target) -> Result<Window> {
        let length = self
            .accessor
            .sequence_length(target.chromosome())
            .map_err(Error::Sequence)?;

        let position = target.position();

        if position < 1 || position > length {
            return Err(Error::PositionOutOfRange {
                chromosome: target.chromosome().to_string(),
                position,
                length,
            });
        }

        let (upstream, downstream) = match target.strand() {
            Strand::Positive => (self.parameters.upstream(), self.parameters.downstream()),
            Strand::Negative => (self.parameters.downstream(), self.parameters.upstream()),
        };

        Ok(Window {
            upstream,
            downstream,
            start: position.saturating_sub(upstream).max(1),
            end: position.saturating_add(downstream).min(length),
        })
    }

    /// Fetches the window and carves it into segments at every cut site.
    fn prepare(&self, target: &Target) -> Result<(Window, Vec<u8>, Vec<Segment>)> {
        let window = self.window(target)?;
        let position = target.position();

        let bases = self
            .accessor
            .subsequence(target.chromosome(), window.start, window.end)
            .map_err(Error::Sequence)?;

        let map = CutMap::new(self.digester, &bases, position - window.start);

        let mut boundaries = Vec::with_capacity(map.cuts().len() + 2);
        boundaries.push(window.start);
        boundaries.extend(
            map.cuts()
                .iter()
                .map(|cut| (position as i64 + cut) as u64)
                .filter(|cut| *cut > window.start && *cut <= window.end),
        );
        boundaries.push(window.end + 1);

        let calculator = Calculator::new(self.parameters.margin_size());

        let segments = boundaries
            .windows(2)
            .map(|pair| {
                let (start, end) = (pair[0], pair[1] - 1);
                let features = calculator.from_bases(window.slice(&bases, start, end));

                let mut segment = Segment::new(
                    target.chromosome(),
                    start,
                    end,
                    self.parameters.margin_size(),
                    features,
                );
                segment.set_overlaps_target(segment.contains(position));
                segment
            })
            .collect::<Vec<_>>();

        trace!(
            "carved {}:{}-{} into {} segment(s)",
            target.chromosome(),
            window.start,
            window.end,
            segments.len()
        );

        Ok((window, bases, segments))
    }

    /// Gets the candidate segments around `target` without selecting any.
    ///
    /// # Examples
    ///
    /// ```
    /// use nonempty::NonEmpty;
    /// use omics::coordinate::Strand;
    /// use vpdesign::config;
    /// use vpdesign::digest::Digester;
    /// use vpdesign::enzyme::Enzyme;
    /// use vpdesign::sequence::Memory;
    /// use vpdesign::viewpoint::Builder;
    /// use vpdesign::viewpoint::Target;
    ///
    /// let memory = [("chr1", b"AAAAGATCAAAAAAGATCAAAA".to_vec())]
    ///     .into_iter()
    ///     .collect::<Memory>();
    /// let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC")?));
    /// let parameters = config::Builder::default()
    ///     .upstream(10)
    ///     .downstream(10)
    ///     .margin_size(2)
    ///     .try_build()?;
    ///
    /// let builder = Builder::new(&memory, &digester, &parameters);
    /// let target = Target::new("chr1", 11, Strand::Positive, "GENE");
    ///
    /// let segments = builder.candidates(&target)?;
    /// let ranges = segments
    ///     .iter()
    ///     .map(|s| (s.start(), s.end()))
    ///     .collect::<Vec<_>>();
    ///
    /// assert_eq!(ranges, vec![(1, 4), (5, 14), (15, 21)]);
    /// assert!(segments[1].overlaps_target());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn candidates(&self, target: &Target) -> Result<Vec<Segment>> {
        self.prepare(target).map(|(_, _, segments)| segments)
    }

    /// Builds the viewpoint around `target` with `strategy`.
    pub fn build(&self, target: &Target, strategy: Strategy) -> Result<ViewPoint> {
        let (window, bases, mut segments) = self.prepare(target)?;
        let position = target.position();

        // Interior cuts are distinct, so a single segment means no cut at all.
        let selection = match segments.len() {
            0 | 1 => {
                for segment in segments.iter_mut() {
                    segment.set_state(State::Rejected(Rejection::NoCutSite));
                }

                Selection {
                    start: window.start,
                    end: window.end,
                    unresolved: Some(Unresolved::NoCutSite),
                }
            }
            _ => strategy.apply(
                &mut segments,
                position,
                (window.start, window.end),
                self.parameters,
            ),
        };

        let score = score::score(&segments, position, window.upstream, window.downstream);

        if let (Some(parameters), Some(index)) = (self.parameters.baits(), self.alignability) {
            let selector = Selector::new(parameters, index);

            for segment in segments.iter_mut().filter(|s| s.is_selected()) {
                let baits = selector
                    .place(segment, window.slice(&bases, segment.start(), segment.end()))
                    .map_err(Error::Alignability)?;

                if !baits.is_satisfied(parameters.min_per_margin()) {
                    debug!(
                        "fewer than {} bait(s) in a margin of {}",
                        parameters.min_per_margin(),
                        segment.location()
                    );
                }

                segment.set_baits(baits);
            }
        }

        match selection.unresolved {
            Some(reason) => debug!("{} ({}) is unresolved: {reason}", target.name(), strategy),
            None => debug!(
                "{} ({}) resolved with score {:.4}",
                target.name(),
                strategy,
                score
            ),
        }

        Ok(ViewPoint {
            target: target.clone(),
            upstream: window.upstream,
            downstream: window.downstream,
            start: selection.start,
            end: selection.end,
            segments,
            score,
            strategy,
            unresolved: selection.unresolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use nonempty::NonEmpty;

    use super::*;
    use crate::alignability;
    use crate::config;
    use crate::enzyme::Enzyme;
    use crate::reader::Reader;
    use crate::sequence::Memory;

    /// Two kilobases of `ACGT` with DpnII sites at 701, 901, 1101 and 1301.
    fn memory() -> Memory {
        let mut bases = b"ACGT".repeat(500);

        for start in [700, 900, 1100, 1300] {
            bases[start..start + 4].copy_from_slice(b"GATC");
        }

        [("chr1", bases)].into_iter().collect()
    }

    fn digester() -> Digester {
        Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC").unwrap()))
    }

    fn parameters() -> config::Builder {
        config::Builder::default()
            .upstream(500)
            .downstream(500)
            .margin_size(50)
            .min_fragment_size(150)
    }

    fn ranges(segments: &[Segment]) -> Vec<(u64, u64)> {
        segments.iter().map(|s| (s.start(), s.end())).collect()
    }

    #[test]
    fn test_candidates() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (memory, digester, parameters) = (memory(), digester(), parameters().try_build()?);
        let builder = Builder::new(&memory, &digester, &parameters);

        let target = Target::new("chr1", 1000, Strand::Positive, "GENE");
        let segments = builder.candidates(&target)?;

        assert_eq!(
            ranges(&segments),
            vec![(500, 700), (701, 900), (901, 1100), (1101, 1300), (1301, 1500)]
        );
        assert_eq!(
            segments.iter().filter(|s| s.overlaps_target()).count(),
            1
        );
        assert_eq!(segments[1].features().gc_content(), 0.5);

        Ok(())
    }

    #[test]
    fn test_negative_strand_swaps_window() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (memory, digester) = (memory(), digester());
        let parameters = parameters().upstream(100).downstream(400).try_build()?;
        let builder = Builder::new(&memory, &digester, &parameters);

        let target = Target::new("chr1", 1000, Strand::Negative, "GENE");
        let segments = builder.candidates(&target)?;

        assert_eq!(segments.first().map(Segment::start), Some(600));
        assert_eq!(segments.last().map(Segment::end), Some(1100));

        Ok(())
    }

    #[test]
    fn test_window_is_clamped() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (memory, digester, parameters) = (memory(), digester(), parameters().try_build()?);
        let builder = Builder::new(&memory, &digester, &parameters);

        let target = Target::new("chr1", 1900, Strand::Positive, "GENE");
        let segments = builder.candidates(&target)?;

        assert_eq!(ranges(&segments), vec![(1400, 2000)]);

        Ok(())
    }

    #[test]
    fn test_build_simple() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (memory, digester, parameters) = (memory(), digester(), parameters().try_build()?);
        let builder = Builder::new(&memory, &digester, &parameters);

        let target = Target::new("chr1", 1000, Strand::Positive, "GENE");
        let viewpoint = builder.build(&target, Strategy::Simple)?;

        assert!(viewpoint.is_resolved());
        assert_eq!(
            ranges(viewpoint.segments()),
            vec![(701, 900), (901, 1100), (1101, 1300)]
        );
        assert_eq!(viewpoint.selected_count(), 1);
        assert_eq!((viewpoint.start(), viewpoint.end()), (901, 1100));
        assert!(viewpoint.score() > 0.0 && viewpoint.score() <= 1.0);
        assert_eq!(viewpoint.genomic_location(), "chr1:1,000");

        Ok(())
    }

    #[test]
    fn test_build_extended() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (memory, digester, parameters) = (memory(), digester(), parameters().try_build()?);
        let builder = Builder::new(&memory, &digester, &parameters);

        let target = Target::new("chr1", 1000, Strand::Positive, "GENE");
        let viewpoint = builder.build(&target, Strategy::Extended)?;

        assert!(viewpoint.is_resolved());
        assert_eq!(viewpoint.selected_count(), 5);
        assert_eq!(viewpoint.total_length(), 1001);
        assert_eq!(viewpoint.total_length_of_selected_segments(), 1001);
        assert_eq!(viewpoint.total_margin_size(), 500);
        assert_eq!((viewpoint.start(), viewpoint.end()), (500, 1500));
        assert!(viewpoint.segments().iter().all(|s| s.baits().is_none()));

        Ok(())
    }

    #[test]
    fn test_build_unresolved() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (memory, digester) = (memory(), digester());
        let parameters = parameters().min_fragment_size(1000).try_build()?;
        let builder = Builder::new(&memory, &digester, &parameters);

        let target = Target::new("chr1", 1000, Strand::Positive, "GENE");
        let viewpoint = builder.build(&target, Strategy::Extended)?;

        assert_eq!(viewpoint.unresolved(), Some(Unresolved::NoSegmentSelected));
        assert_eq!(viewpoint.score(), 0.0);
        assert_eq!(viewpoint.total_length(), 0);
        assert_eq!(viewpoint.score_as_percent(), "0.00%");

        Ok(())
    }

    #[test]
    fn test_build_without_cut_site() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let memory = [("chr1", b"ACGT".repeat(500))]
            .into_iter()
            .collect::<Memory>();
        let (digester, parameters) = (digester(), parameters().try_build()?);
        let builder = Builder::new(&memory, &digester, &parameters);

        let target = Target::new("chr1", 1000, Strand::Positive, "GENE");

        for strategy in [Strategy::Simple, Strategy::Extended] {
            let viewpoint = builder.build(&target, strategy)?;

            assert!(!viewpoint.is_resolved());
            assert_eq!(viewpoint.unresolved(), Some(Unresolved::NoCutSite));
            assert_eq!(ranges(viewpoint.segments()), vec![(500, 1500)]);
            assert_eq!(viewpoint.selected_count(), 0);
            assert_eq!(viewpoint.score(), 0.0);
            assert_eq!((viewpoint.start(), viewpoint.end()), (500, 1500));
            assert!(viewpoint
                .segments()
                .iter()
                .all(|s| s.rejection() == Some(Rejection::NoCutSite)));
            assert_eq!(
                viewpoint.unresolved().map(|u| u.to_string()),
                Some(String::from("no restriction site in window"))
            );
        }

        Ok(())
    }

    #[test]
    fn test_build_with_baits() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (memory, digester) = (memory(), digester());
        let parameters = parameters()
            .bait_length(20)
            .baits_per_margin(1, 2)
            .try_build()?;

        let sizes = b"chr1\t2000\n";
        let track = b"chr1\t0\t2000\t1\n";
        let index = alignability::Builder::default()
            .try_build_from(Reader::new(&sizes[..]), Reader::new(&track[..]))?;

        let builder = Builder::new(&memory, &digester, &parameters).alignability(&index);

        let target = Target::new("chr1", 1000, Strand::Positive, "GENE");
        let viewpoint = builder.build(&target, Strategy::Simple)?;

        let center = viewpoint
            .selected_segments()
            .next()
            .ok_or("no segment selected")?;
        let baits = center.baits().ok_or("no baits placed")?;

        assert_eq!(baits.upstream().first().map(|b| b.start()), Some(901));
        assert_eq!(
            baits.downstream().and_then(|d| d.first()).map(|b| b.end()),
            Some(1100)
        );
        assert!(baits.is_satisfied(2));
        assert!(viewpoint
            .segments()
            .iter()
            .filter(|s| !s.is_selected())
            .all(|s| s.baits().is_none()));

        Ok(())
    }

    #[test]
    fn test_errors() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (memory, digester, parameters) = (memory(), digester(), parameters().try_build()?);
        let builder = Builder::new(&memory, &digester, &parameters);

        let err = builder
            .candidates(&Target::new("chr1", 2001, Strand::Positive, "GENE"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "target chr1:2001 is outside of the chromosome (length 2000)"
        );

        let err = builder
            .candidates(&Target::new("chrX", 1, Strand::Positive, "GENE"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Sequence(sequence::Error::UnknownChromosome(_))
        ));

        Ok(())
    }
}
