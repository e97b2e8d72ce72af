//! Genome-wide alignability scores.
//!
//! Alignability tracks assign each position of a genome the uniqueness of the
//! k-mer starting there. An [`AlignabilityIndex`] stores, per chromosome, only
//! the positions at which the score changes (the _breakpoints_) together with
//! the score effective from each breakpoint onward. A position resolves to the
//! score of the closest breakpoint at or before it, so scores form a
//! right-continuous step function.
//!
//! Regions without data (e.g., runs of `N` at the ends of chromosomes) carry
//! the [`NO_DATA`] score.

use std::collections::HashMap;
use std::io;

use crate::reader;

pub mod builder;
pub mod record;

pub use builder::Builder;

/// The score of positions for which the track has no data.
pub const NO_DATA: i32 = -1;

/// An error related to an [`AlignabilityIndex`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// An invalid chromosome-length table.
    InvalidChromosomeLengths(reader::Error<record::ParseError>),

    /// An invalid alignability track.
    InvalidTrack(reader::Error<record::ParseError>),

    /// A chromosome that is not in the chromosome-length table.
    UnknownChromosome(String),

    /// A chromosome whose records are not contiguous in the track.
    Unsorted(String),

    /// A position outside of the chromosome.
    PositionOutOfRange {
        /// The chromosome name.
        chromosome: String,

        /// The requested position.
        position: u64,

        /// The chromosome length.
        length: u64,
    },

    /// A range whose end lies before its start.
    InvalidRange {
        /// The start of the range.
        from: u64,

        /// The end of the range.
        to: u64,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::InvalidChromosomeLengths(err) => {
                write!(f, "invalid chromosome-length table: {err}")
            }
            Error::InvalidTrack(err) => write!(f, "invalid alignability track: {err}"),
            Error::UnknownChromosome(name) => write!(f, "unknown chromosome: {name}"),
            Error::Unsorted(name) => write!(
                f,
                "alignability track is not sorted: records for {name} are not contiguous"
            ),
            Error::PositionOutOfRange {
                chromosome,
                position,
                length,
            } => write!(
                f,
                "position {position} is outside of {chromosome} (length {length})"
            ),
            Error::InvalidRange { from, to } => write!(f, "invalid range: {from}-{to}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The breakpoints and scores of a single chromosome.
#[derive(Debug)]
pub(crate) struct Track {
    /// The chromosome length.
    length: u64,

    /// The strictly increasing positions at which the score changes.
    breakpoints: Box<[u64]>,

    /// The score effective from each breakpoint.
    scores: Box<[i32]>,
}

impl Track {
    /// Gets the index of the breakpoint in effect at `position`.
    fn index_at(&self, position: u64) -> Option<usize> {
        match self.breakpoints.binary_search(&position) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }
}

/// An index of alignability scores across a genome.
///
/// The index is immutable once built and can be shared by reference across
/// threads.
#[derive(Debug)]
pub struct AlignabilityIndex {
    /// The chromosome names in table order.
    names: Vec<String>,

    /// The tracks, parallel to `names`.
    tracks: Vec<Track>,

    /// A lookup from chromosome name to track.
    handles: HashMap<String, usize>,

    /// The k-mer size the track was computed with, if known.
    kmer_size: Option<usize>,
}

impl AlignabilityIndex {
    /// Gets the track of a chromosome.
    fn track(&self, chromosome: &str) -> Result<&Track> {
        self.handles
            .get(chromosome)
            .map(|i| &self.tracks[*i])
            .ok_or_else(|| Error::UnknownChromosome(chromosome.to_string()))
    }

    /// Ensures that `position` lies on the chromosome.
    fn check_position(&self, chromosome: &str, track: &Track, position: u64) -> Result<()> {
        if position < 1 || position > track.length {
            return Err(Error::PositionOutOfRange {
                chromosome: chromosome.to_string(),
                position,
                length: track.length,
            });
        }

        Ok(())
    }

    /// Gets the chromosome names.
    pub fn chromosomes(&self) -> &[String] {
        &self.names
    }

    /// Gets the length of a chromosome.
    pub fn chromosome_length(&self, chromosome: &str) -> Option<u64> {
        self.track(chromosome).ok().map(|t| t.length)
    }

    /// Gets the number of breakpoints of a chromosome.
    pub fn breakpoint_count(&self, chromosome: &str) -> Option<usize> {
        self.track(chromosome).ok().map(|t| t.breakpoints.len())
    }

    /// Gets the k-mer size the track was computed with, if known.
    pub fn kmer_size(&self) -> Option<usize> {
        self.kmer_size
    }

    /// Gets the score at a 1-based position.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::alignability::Builder;
    /// use vpdesign::alignability::NO_DATA;
    ///
    /// let sizes = b"chr1\t100\n";
    /// let track = b"chr1\t10\t50\t1\nchr1\t50\t80\t0.5\n";
    ///
    /// let index = Builder::default().try_build_from(
    ///     vpdesign::Reader::new(&sizes[..]),
    ///     vpdesign::Reader::new(&track[..]),
    /// )?;
    ///
    /// assert_eq!(index.score_at("chr1", 5)?, NO_DATA);
    /// assert_eq!(index.score_at("chr1", 11)?, 1);
    /// assert_eq!(index.score_at("chr1", 50)?, 1);
    /// assert_eq!(index.score_at("chr1", 51)?, 2);
    /// assert_eq!(index.score_at("chr1", 81)?, NO_DATA);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn score_at(&self, chromosome: &str, position: u64) -> Result<i32> {
        let track = self.track(chromosome)?;
        self.check_position(chromosome, track, position)?;

        Ok(track
            .index_at(position)
            .map(|i| track.scores[i])
            .unwrap_or(NO_DATA))
    }

    /// Gets the score of every position from `from` to `to` (1-based,
    /// inclusive).
    ///
    /// Only the first position is looked up; the remaining positions step
    /// through the breakpoints in order.
    pub fn scores_between(&self, chromosome: &str, from: u64, to: u64) -> Result<Vec<i32>> {
        if to < from {
            return Err(Error::InvalidRange { from, to });
        }

        let track = self.track(chromosome)?;
        self.check_position(chromosome, track, from)?;
        self.check_position(chromosome, track, to)?;

        let mut index = track.index_at(from);
        let mut scores = Vec::with_capacity((to - from + 1) as usize);

        for position in from..=to {
            let next = index.map(|i| i + 1).unwrap_or(0);

            if track.breakpoints.get(next) == Some(&position) {
                index = Some(next);
            }

            scores.push(index.map(|i| track.scores[i]).unwrap_or(NO_DATA));
        }

        Ok(scores)
    }

    /// Gets the mean score from `from` to `to` (1-based, inclusive), or
    /// `None` if any position in the range has no data.
    pub fn mean_score_between(
        &self,
        chromosome: &str,
        from: u64,
        to: u64,
    ) -> Result<Option<f64>> {
        let scores = self.scores_between(chromosome, from, to)?;

        if scores.iter().any(|score| *score == NO_DATA) {
            return Ok(None);
        }

        let total = scores.iter().map(|score| *score as f64).sum::<f64>();
        Ok(Some(total / scores.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng as _;
    use rand::SeedableRng as _;

    use super::*;

    fn index() -> AlignabilityIndex {
        let sizes = b"chr1\t100\nchr2\t50\nchr3\t20\n";
        let track = b"track type=bedGraph\n\
                      chr1\t0\t10\t1\n\
                      chr1\t10\t40\t0.5\n\
                      chr1\t60\t90\t0.25\n\
                      chr2\t5\t50\t1\n";

        Builder::default()
            .try_build_from(
                reader::Reader::new(&sizes[..]),
                reader::Reader::new(&track[..]),
            )
            .unwrap()
    }

    #[test]
    fn test_score_at() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let index = index();

        assert_eq!(index.score_at("chr1", 1)?, 1);
        assert_eq!(index.score_at("chr1", 10)?, 1);
        assert_eq!(index.score_at("chr1", 11)?, 2);
        assert_eq!(index.score_at("chr1", 40)?, 2);
        assert_eq!(index.score_at("chr1", 41)?, NO_DATA);
        assert_eq!(index.score_at("chr1", 61)?, 4);
        assert_eq!(index.score_at("chr1", 100)?, NO_DATA);
        assert_eq!(index.score_at("chr2", 5)?, NO_DATA);
        assert_eq!(index.score_at("chr2", 6)?, 1);
        assert_eq!(index.score_at("chr3", 20)?, NO_DATA);

        Ok(())
    }

    #[test]
    fn test_errors() {
        let index = index();

        let err = index.score_at("chr1", 101).unwrap_err();
        assert_eq!(err.to_string(), "position 101 is outside of chr1 (length 100)");

        let err = index.score_at("chrX", 1).unwrap_err();
        assert_eq!(err.to_string(), "unknown chromosome: chrX");

        let err = index.scores_between("chr1", 10, 9).unwrap_err();
        assert_eq!(err.to_string(), "invalid range: 10-9");
    }

    #[test]
    fn test_scores_between_agrees_with_score_at() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let index = index();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let from = rng.gen_range(1..=100);
            let to = rng.gen_range(from..=100);

            let scores = index.scores_between("chr1", from, to)?;
            assert_eq!(scores.len() as u64, to - from + 1);

            for (position, score) in (from..=to).zip(scores) {
                assert_eq!(score, index.score_at("chr1", position)?);
            }
        }

        Ok(())
    }

    #[test]
    fn test_mean_score_between() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let index = index();

        assert_eq!(index.mean_score_between("chr1", 9, 12)?, Some(1.5));
        assert_eq!(index.mean_score_between("chr1", 39, 42)?, None);

        Ok(())
    }

    #[test]
    fn test_metadata() {
        let index = index();

        assert_eq!(index.chromosomes(), &["chr1", "chr2", "chr3"]);
        assert_eq!(index.chromosome_length("chr2"), Some(50));
        assert_eq!(index.breakpoint_count("chr1"), Some(5));
        assert_eq!(index.breakpoint_count("chr3"), Some(1));
        assert_eq!(index.kmer_size(), None);
    }
}
