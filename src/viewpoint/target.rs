//! Target positions.

use std::num::ParseIntError;

use omics::coordinate::strand;
use omics::coordinate::Strand;

/// The delimiter between the fields of a target line.
const DELIMITER: char = '\t';

/// The number of fields in a target line.
const NUM_FIELDS: usize = 4;

/// An error associated with parsing a [`Target`].
#[derive(Debug)]
pub enum ParseError {
    /// An incorrect number of fields.
    IncorrectNumberOfFields(usize),

    /// An empty chromosome name.
    EmptyChromosome,

    /// An invalid position.
    InvalidPosition(ParseIntError),

    /// A position of zero.
    ZeroPosition,

    /// An invalid strand.
    InvalidStrand(strand::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(n) => write!(
                f,
                "incorrect number of fields: expected {NUM_FIELDS}, found {n}"
            ),
            ParseError::EmptyChromosome => write!(f, "empty chromosome name"),
            ParseError::InvalidPosition(err) => write!(f, "invalid position: {err}"),
            ParseError::ZeroPosition => write!(f, "positions are 1-based"),
            ParseError::InvalidStrand(err) => write!(f, "invalid strand: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A target position, such as a transcription start site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    /// The chromosome name.
    chromosome: String,

    /// The 1-based position.
    position: u64,

    /// The strand.
    strand: Strand,

    /// The name (usually a gene symbol).
    name: String,
}

impl Target {
    /// Creates a new target.
    pub fn new(
        chromosome: impl Into<String>,
        position: u64,
        strand: Strand,
        name: impl Into<String>,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            position,
            strand,
            name: name.into(),
        }
    }

    /// Gets the chromosome name.
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Gets the 1-based position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Gets the strand.
    pub fn strand(&self) -> &Strand {
        &self.strand
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::str::FromStr for Target {
    type Err = ParseError;

    /// Parses a `chromosome<TAB>position<TAB>strand<TAB>name` line.
    ///
    /// # Examples
    ///
    /// ```
    /// use omics::coordinate::Strand;
    /// use vpdesign::viewpoint::Target;
    ///
    /// let target = "chr15\t48937985\t-\tFBN1".parse::<Target>()?;
    ///
    /// assert_eq!(target.chromosome(), "chr15");
    /// assert_eq!(target.position(), 48_937_985);
    /// assert_eq!(target.strand(), &Strand::Negative);
    /// assert_eq!(target.name(), "FBN1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.trim_end().split(DELIMITER).collect::<Vec<_>>();

        if fields.len() != NUM_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(fields.len()));
        }

        if fields[0].is_empty() {
            return Err(ParseError::EmptyChromosome);
        }

        let position = fields[1]
            .parse::<u64>()
            .map_err(ParseError::InvalidPosition)?;

        if position == 0 {
            return Err(ParseError::ZeroPosition);
        }

        let strand = fields[2]
            .parse::<Strand>()
            .map_err(ParseError::InvalidStrand)?;

        Ok(Self::new(fields[0], position, strand, fields[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_targets() {
        let err = "chr1\t100\t+".parse::<Target>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "incorrect number of fields: expected 4, found 3"
        );

        let err = "chr1\t0\t+\tGENE".parse::<Target>().unwrap_err();
        assert_eq!(err.to_string(), "positions are 1-based");

        let err = "\t10\t+\tGENE".parse::<Target>().unwrap_err();
        assert_eq!(err.to_string(), "empty chromosome name");

        assert!(matches!(
            "chr1\tten\t+\tGENE".parse::<Target>(),
            Err(ParseError::InvalidPosition(_))
        ));
        assert!(matches!(
            "chr1\t10\t?\tGENE".parse::<Target>(),
            Err(ParseError::InvalidStrand(_))
        ));
    }

    #[test]
    fn test_positive_strand() -> Result<(), Box<dyn std::error::Error>> {
        let target = "chr1\t10\t+\tGENE\n".parse::<Target>()?;
        assert_eq!(target, Target::new("chr1", 10, Strand::Positive, "GENE"));
        Ok(())
    }
}
