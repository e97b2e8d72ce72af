//! Cut positions around a target.
//!
//! Positions in a [`CutMap`] are relative to the target: `0` is the target
//! itself, negative values lie upstream and positive values lie downstream.
//! A cut at relative position `r` means the first base after the cut is `r`
//! bases away from the target.

use std::str::FromStr;

use tracing::debug;

use crate::digest::Digester;

/// An error related to navigating a [`CutMap`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The position lies outside of `[-upstream, downstream]`.
    OutOfRange {
        /// The requested relative position.
        position: i64,

        /// The upstream extent of the window.
        upstream: u64,

        /// The downstream extent of the window.
        downstream: u64,
    },

    /// The window contains no cut sites at all.
    NoCutSites,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OutOfRange {
                position,
                upstream,
                downstream,
            } => write!(
                f,
                "position {position} is outside of the window [-{upstream}, {downstream}]"
            ),
            Error::NoCutSites => write!(f, "no cut sites in window"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// An error parsing a [`Direction`].
#[derive(Debug, Eq, PartialEq)]
pub struct ParseDirectionError(String);

impl std::fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid direction: expected `up` or `down`, found `{}`", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

/// A direction relative to the target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Towards smaller relative positions.
    Upstream,

    /// Towards larger relative positions.
    Downstream,
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Upstream),
            "down" => Ok(Direction::Downstream),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// The cut positions within a window around a target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CutMap {
    /// The number of bases in the window upstream of the target.
    upstream: u64,

    /// The number of bases in the window downstream of the target.
    downstream: u64,

    /// The relative cut positions of each enzyme.
    by_enzyme: Vec<Vec<i64>>,

    /// The sorted, de-duplicated relative cut positions of all enzymes.
    union: Vec<i64>,
}

impl CutMap {
    /// Builds the cut map of `window`, whose first base lies `upstream` bases
    /// before the target.
    ///
    /// # Examples
    ///
    /// ```
    /// use nonempty::NonEmpty;
    /// use vpdesign::digest::window::CutMap;
    /// use vpdesign::digest::window::Direction;
    /// use vpdesign::digest::Digester;
    /// use vpdesign::enzyme::Enzyme;
    ///
    /// let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC")?));
    ///
    /// // The target is the `T` at index 5.
    /// let map = CutMap::new(&digester, b"GATCAT_AGATC", 5);
    ///
    /// assert_eq!(map.cuts(), &[-5, 3]);
    /// assert_eq!(map.next_cut(0, Direction::Downstream)?, 3);
    /// assert_eq!(map.next_cut(0, Direction::Upstream)?, -5);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(digester: &Digester, window: &[u8], upstream: u64) -> Self {
        let downstream = (window.len() as u64).saturating_sub(upstream + 1);

        let mut by_enzyme = vec![Vec::new(); digester.enzymes().len()];
        let mut union = Vec::new();

        for cut in digester.cut_sites(window) {
            let relative = cut.position() as i64 - 1 - upstream as i64;
            by_enzyme[cut.enzyme()].push(relative);
            union.push(relative);
        }

        union.dedup();

        Self {
            upstream,
            downstream,
            by_enzyme,
            union,
        }
    }

    /// Gets the number of bases in the window upstream of the target.
    pub fn upstream(&self) -> u64 {
        self.upstream
    }

    /// Gets the number of bases in the window downstream of the target.
    pub fn downstream(&self) -> u64 {
        self.downstream
    }

    /// Gets the sorted, de-duplicated relative cut positions of all enzymes.
    pub fn cuts(&self) -> &[i64] {
        &self.union
    }

    /// Gets the relative cut positions of a single enzyme.
    pub fn cuts_of(&self, enzyme: usize) -> Option<&[i64]> {
        self.by_enzyme.get(enzyme).map(Vec::as_slice)
    }

    /// Gets the nearest cut at or beyond `position` in `direction`.
    ///
    /// When no cut lies beyond `position`, the outermost cut in that direction
    /// is returned instead.
    pub fn next_cut(&self, position: i64, direction: Direction) -> Result<i64> {
        if position < -(self.upstream as i64) || position > self.downstream as i64 {
            return Err(Error::OutOfRange {
                position,
                upstream: self.upstream,
                downstream: self.downstream,
            });
        }

        let (first, last) = match (self.union.first(), self.union.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(Error::NoCutSites),
        };

        let found = match direction {
            Direction::Downstream => self.union.iter().find(|c| **c >= position),
            Direction::Upstream => self.union.iter().rev().find(|c| **c <= position),
        };

        Ok(match (found, direction) {
            (Some(cut), _) => *cut,
            (None, Direction::Downstream) => {
                debug!("no cut downstream of {position}, using the outermost cut");
                last
            }
            (None, Direction::Upstream) => {
                debug!("no cut upstream of {position}, using the outermost cut");
                first
            }
        })
    }
}
