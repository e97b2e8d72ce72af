//! Base composition of a stretch of reference sequence.
//!
//! Reference genomes from UCSC encode repeats by soft-masking, i.e., bases in
//! repeats are written in lowercase. The repeat content of a sequence is thus
//! the fraction of lowercase bases.

/// The base composition of a sequence.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Content {
    /// The number of bases.
    length: usize,

    /// The number of `G`/`C` bases (in either case).
    gc: usize,

    /// The number of soft-masked (lowercase) bases.
    masked: usize,
}

impl Content {
    /// Counts the base composition of `bases`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::content::Content;
    ///
    /// let content = Content::of(b"ACgtNNcc");
    ///
    /// assert_eq!(content.length(), 8);
    /// assert_eq!(content.gc_fraction(), 0.5);
    /// assert_eq!(content.repeat_fraction(), 0.5);
    /// ```
    pub fn of(bases: &[u8]) -> Self {
        let mut content = Self {
            length: bases.len(),
            ..Default::default()
        };

        for base in bases {
            match base {
                b'G' | b'C' => content.gc += 1,
                b'g' | b'c' => {
                    content.gc += 1;
                    content.masked += 1;
                }
                b if b.is_ascii_lowercase() => content.masked += 1,
                _ => {}
            }
        }

        content
    }

    /// Gets the number of bases.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Gets the number of `G`/`C` bases.
    pub fn gc(&self) -> usize {
        self.gc
    }

    /// Gets the number of soft-masked bases.
    pub fn masked(&self) -> usize {
        self.masked
    }

    /// The fraction of `G`/`C` bases, or `0.0` for an empty sequence.
    pub fn gc_fraction(&self) -> f64 {
        fraction(self.gc, self.length)
    }

    /// The fraction of soft-masked bases, or `0.0` for an empty sequence.
    pub fn repeat_fraction(&self) -> f64 {
        fraction(self.masked, self.length)
    }
}

/// Divides two counts, treating an empty denominator as zero.
fn fraction(numerator: usize, denominator: usize) -> f64 {
    match denominator {
        0 => 0.0,
        _ => numerator as f64 / denominator as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sequence_has_no_content() {
        let content = Content::of(b"");
        assert_eq!(content.length(), 0);
        assert_eq!(content.gc_fraction(), 0.0);
        assert_eq!(content.repeat_fraction(), 0.0);
    }

    #[test]
    fn test_gc_is_case_insensitive() {
        let content = Content::of(b"GgCcAaTt");
        assert_eq!(content.gc(), 4);
        assert_eq!(content.masked(), 4);
        assert_eq!(content.gc_fraction(), 0.5);
        assert_eq!(content.repeat_fraction(), 0.5);
    }

    #[test]
    fn test_masked_n_counts_as_repeat() {
        let content = Content::of(b"nnNN");
        assert_eq!(content.gc(), 0);
        assert_eq!(content.repeat_fraction(), 0.5);
    }
}
