//! GC and repeat content of segments and their margins.

use crate::content::Content;
use crate::segment::Margins;
use crate::sequence;
use crate::sequence::SequenceAccessor;

/// The sequence features of a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Features {
    /// The composition of the whole segment.
    whole: Content,

    /// The composition of the upstream margin.
    upstream: Content,

    /// The composition of the downstream margin.
    downstream: Content,
}

impl Features {
    /// Gets the GC content of the whole segment.
    pub fn gc_content(&self) -> f64 {
        self.whole.gc_fraction()
    }

    /// Gets the repeat content of the whole segment.
    pub fn repeat_content(&self) -> f64 {
        self.whole.repeat_fraction()
    }

    /// Gets the GC content of the upstream margin.
    pub fn gc_content_up(&self) -> f64 {
        self.upstream.gc_fraction()
    }

    /// Gets the GC content of the downstream margin.
    pub fn gc_content_down(&self) -> f64 {
        self.downstream.gc_fraction()
    }

    /// Gets the repeat content of the upstream margin.
    pub fn repeat_content_up(&self) -> f64 {
        self.upstream.repeat_fraction()
    }

    /// Gets the repeat content of the downstream margin.
    pub fn repeat_content_down(&self) -> f64 {
        self.downstream.repeat_fraction()
    }

    /// Gets the mean of the repeat content of both margins.
    pub fn mean_margin_repeat_content(&self) -> f64 {
        0.5 * (self.repeat_content_up() + self.repeat_content_down())
    }
}

/// Computes the [`Features`] of segments.
#[derive(Clone, Copy, Debug)]
pub struct Calculator {
    /// The margin size.
    margin_size: u64,
}

impl Calculator {
    /// Creates a calculator for margins of `margin_size` bases.
    pub fn new(margin_size: u64) -> Self {
        Self { margin_size }
    }

    /// Computes the features of the segment `start..=end` on `chromosome`.
    pub fn calculate<S>(
        &self,
        accessor: &S,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> sequence::Result<Features>
    where
        S: SequenceAccessor + ?Sized,
    {
        let bases = accessor.subsequence(chromosome, start, end)?;
        Ok(self.from_bases(&bases))
    }

    /// Computes the features of a segment from its bases.
    ///
    /// When the segment is too short for two margins, both margins take the
    /// composition of the whole segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::segment::features::Calculator;
    ///
    /// let features = Calculator::new(2).from_bases(b"gcAAAAAT");
    ///
    /// assert_eq!(features.gc_content(), 0.25);
    /// assert_eq!(features.repeat_content_up(), 1.0);
    /// assert_eq!(features.gc_content_up(), 1.0);
    /// assert_eq!(features.repeat_content_down(), 0.0);
    /// assert_eq!(features.mean_margin_repeat_content(), 0.5);
    /// ```
    pub fn from_bases(&self, bases: &[u8]) -> Features {
        let whole = Content::of(bases);

        if bases.is_empty() {
            return Features::default();
        }

        match Margins::of(1, bases.len() as u64, self.margin_size) {
            Margins::Single(_) => Features {
                whole,
                upstream: whole,
                downstream: whole,
            },
            Margins::Pair(upstream, downstream) => Features {
                whole,
                upstream: Content::of(slice(bases, upstream.start(), upstream.end())),
                downstream: Content::of(slice(bases, downstream.start(), downstream.end())),
            },
        }
    }
}

/// Slices `bases` by 1-based, inclusive coordinates.
fn slice(bases: &[u8], start: u64, end: u64) -> &[u8] {
    &bases[(start - 1) as usize..end as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Memory;

    #[test]
    fn test_short_segment_margins_equal_whole() {
        let features = Calculator::new(250).from_bases(b"ACGTacgtNN");

        assert_eq!(features.repeat_content_up(), features.repeat_content());
        assert_eq!(features.repeat_content_down(), features.repeat_content());
        assert_eq!(features.gc_content_up(), features.gc_content());
        assert_eq!(features.gc_content_down(), features.gc_content());
    }

    #[test]
    fn test_empty_segment() {
        let features = Calculator::new(10).from_bases(b"");
        assert_eq!(features, Features::default());
        assert_eq!(features.gc_content(), 0.0);
    }

    #[test]
    fn test_calculation_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let memory = [("chr1", b"ATATatatGCGCgcgcATAT".to_vec())]
            .into_iter()
            .collect::<Memory>();

        let calculator = Calculator::new(4);
        let first = calculator.calculate(&memory, "chr1", 3, 18)?;
        let second = calculator.calculate(&memory, "chr1", 3, 18)?;

        assert_eq!(first, second);
        assert_eq!(first.repeat_content_up(), 0.5);
        assert_eq!(first.gc_content_down(), 0.5);

        Ok(())
    }
}
