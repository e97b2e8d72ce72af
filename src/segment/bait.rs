//! Bait placement within segment margins.

use tracing::warn;

use crate::alignability;
use crate::alignability::AlignabilityIndex;
use crate::alignability::NO_DATA;
use crate::config::BaitParameters;
use crate::content::Content;
use crate::segment::Margin;
use crate::segment::Segment;

/// A candidate oligonucleotide bait within a margin.
#[derive(Clone, Debug, PartialEq)]
pub struct Bait {
    /// The 1-based start.
    start: u64,

    /// The 1-based, inclusive end.
    end: u64,

    /// The GC content.
    gc_content: f64,

    /// The repeat content.
    repeat_content: f64,

    /// The mean alignability score.
    alignability: f64,
}

impl Bait {
    /// Gets the 1-based start.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the 1-based, inclusive end.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets the GC content.
    pub fn gc_content(&self) -> f64 {
        self.gc_content
    }

    /// Gets the repeat content.
    pub fn repeat_content(&self) -> f64 {
        self.repeat_content
    }

    /// Gets the mean alignability score.
    pub fn alignability(&self) -> f64 {
        self.alignability
    }
}

/// The baits placed in the margins of a segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentBaits {
    /// The baits in the upstream (or only) margin.
    upstream: Vec<Bait>,

    /// The baits in the downstream margin, if the segment has one.
    downstream: Option<Vec<Bait>>,
}

impl SegmentBaits {
    /// Gets the baits in the upstream (or only) margin.
    pub fn upstream(&self) -> &[Bait] {
        &self.upstream
    }

    /// Gets the baits in the downstream margin, if the segment has one.
    pub fn downstream(&self) -> Option<&[Bait]> {
        self.downstream.as_deref()
    }

    /// Iterates over all baits, upstream first.
    pub fn iter(&self) -> impl Iterator<Item = &Bait> {
        self.upstream.iter().chain(self.downstream.iter().flatten())
    }

    /// Gets the total number of baits.
    pub fn len(&self) -> usize {
        self.upstream.len() + self.downstream.as_ref().map_or(0, Vec::len)
    }

    /// Returns whether no baits were placed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether every margin holds at least `min` baits.
    pub fn is_satisfied(&self, min: usize) -> bool {
        self.upstream.len() >= min && self.downstream.as_ref().map_or(true, |d| d.len() >= min)
    }
}

/// Places baits within segment margins.
#[derive(Debug)]
pub struct Selector<'a> {
    /// The bait parameters.
    parameters: &'a BaitParameters,

    /// The alignability index.
    index: &'a AlignabilityIndex,
}

impl<'a> Selector<'a> {
    /// Creates a new selector.
    pub fn new(parameters: &'a BaitParameters, index: &'a AlignabilityIndex) -> Self {
        Self { parameters, index }
    }

    /// Places baits in the margins of `segment`, given the bases of the whole
    /// segment.
    ///
    /// The upstream margin is scanned left to right and the downstream margin
    /// right to left, so that baits are taken nearest the cut sites first.
    pub fn place(&self, segment: &Segment, bases: &[u8]) -> alignability::Result<SegmentBaits> {
        let margins = segment.margins();
        let offset = segment.start();

        let margin_bases = |margin: &Margin| {
            let from = (margin.start() - offset) as usize;
            let to = (margin.end() - offset + 1) as usize;
            bases.get(from..to).unwrap_or_default()
        };

        let upstream = self.select(
            segment.chromosome(),
            margins.upstream(),
            margin_bases(margins.upstream()),
            false,
        )?;

        let downstream = margins
            .downstream()
            .map(|margin| self.select(segment.chromosome(), margin, margin_bases(margin), true))
            .transpose()?;

        Ok(SegmentBaits {
            upstream,
            downstream,
        })
    }

    /// Scans a margin for baits.
    ///
    /// `bases` holds the bases of the margin. A margin shorter than the bait
    /// length yields no baits.
    pub fn select(
        &self,
        chromosome: &str,
        margin: &Margin,
        bases: &[u8],
        reverse: bool,
    ) -> alignability::Result<Vec<Bait>> {
        let length = self.parameters.length();
        let max = self.parameters.max_per_margin();

        if length == 0 || max == 0 || margin.length() < length {
            return Ok(Vec::new());
        }

        if bases.len() as u64 != margin.length() {
            warn!(
                "expected {} base(s) for the margin at {chromosome}:{}-{}, found {}",
                margin.length(),
                margin.start(),
                margin.end(),
                bases.len()
            );
            return Ok(Vec::new());
        }

        let scores = self
            .index
            .scores_between(chromosome, margin.start(), margin.end())?;

        let count = (margin.length() - length + 1) as usize;
        let offsets: Box<dyn Iterator<Item = usize>> = match reverse {
            true => Box::new((0..count).rev()),
            false => Box::new(0..count),
        };

        let width = length as usize;
        let mut baits = Vec::new();

        for i in offsets {
            let content = Content::of(&bases[i..i + width]);
            let gc_content = content.gc_fraction();

            if gc_content < self.parameters.min_gc_content()
                || gc_content > self.parameters.max_gc_content()
            {
                continue;
            }

            let window = &scores[i..i + width];

            if window.iter().any(|score| *score == NO_DATA) {
                continue;
            }

            let alignability =
                window.iter().map(|score| *score as f64).sum::<f64>() / width as f64;

            if alignability > self.parameters.max_alignability() {
                continue;
            }

            let start = margin.start() + i as u64;

            baits.push(Bait {
                start,
                end: start + length - 1,
                gc_content,
                repeat_content: content.repeat_fraction(),
                alignability,
            });

            if baits.len() >= max {
                break;
            }
        }

        Ok(baits)
    }
}
