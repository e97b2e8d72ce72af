//! Records of chromosome-length tables and alignability tracks.

use std::num::ParseFloatError;
use std::num::ParseIntError;
use std::str::FromStr;

/// The delimiter between fields.
const DELIMITER: char = '\t';

/// An error related to parsing a record.
#[derive(Debug)]
pub enum ParseError {
    /// Too few fields on the line.
    MissingFields {
        /// The number of fields needed.
        expected: usize,

        /// The number of fields found.
        found: usize,
    },

    /// An invalid chromosome length.
    InvalidLength(ParseIntError),

    /// An invalid start coordinate.
    InvalidStart(ParseIntError),

    /// An invalid end coordinate.
    InvalidEnd(ParseIntError),

    /// An invalid raw alignability value.
    InvalidValue(ParseFloatError),

    /// A raw alignability value that is not strictly positive.
    NonPositiveValue(f64),

    /// An interval whose end does not lie after its start.
    EmptyInterval {
        /// The 0-based start.
        start: u64,

        /// The end.
        end: u64,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingFields { expected, found } => {
                write!(f, "missing fields: expected {expected}, found {found}")
            }
            ParseError::InvalidLength(err) => write!(f, "invalid length: {err}"),
            ParseError::InvalidStart(err) => write!(f, "invalid start: {err}"),
            ParseError::InvalidEnd(err) => write!(f, "invalid end: {err}"),
            ParseError::InvalidValue(err) => write!(f, "invalid value: {err}"),
            ParseError::NonPositiveValue(value) => {
                write!(f, "alignability value must be positive: {value}")
            }
            ParseError::EmptyInterval { start, end } => {
                write!(f, "empty interval: start {start}, end {end}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Splits a line into at least `expected` fields.
fn fields(s: &str, expected: usize) -> Result<Vec<&str>, ParseError> {
    let fields = s.split(DELIMITER).collect::<Vec<_>>();

    if fields.len() < expected {
        return Err(ParseError::MissingFields {
            expected,
            found: fields.len(),
        });
    }

    Ok(fields)
}

/// A line of a chromosome-length table (e.g., UCSC `chromInfo.txt`).
///
/// Columns after the length are ignored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChromosomeLength {
    /// The chromosome name.
    name: String,

    /// The chromosome length.
    length: u64,
}

impl ChromosomeLength {
    /// Gets the chromosome name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the chromosome length.
    pub fn length(&self) -> u64 {
        self.length
    }
}

impl FromStr for ChromosomeLength {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = fields(s, 2)?;

        Ok(Self {
            name: fields[0].to_string(),
            length: fields[1].trim().parse().map_err(ParseError::InvalidLength)?,
        })
    }
}

/// A line of an alignability bedGraph track.
///
/// The raw value is the uniqueness of the k-mer starting at each position
/// (`1.0` for a unique k-mer, `0.5` for a k-mer found twice, and so on).
#[derive(Clone, Debug, PartialEq)]
pub struct BedGraphRecord {
    /// The chromosome name.
    chromosome: String,

    /// The 0-based start.
    start: u64,

    /// The end (0-based exclusive, or equivalently 1-based inclusive).
    end: u64,

    /// The raw value.
    value: f64,
}

impl BedGraphRecord {
    /// Gets the chromosome name.
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Gets the 0-based start.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the end.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets the raw value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Gets the alignability score, i.e., the rounded inverse of the raw
    /// value: the number of times the k-mer occurs in the genome.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::alignability::record::BedGraphRecord;
    ///
    /// let record = "chr1\t10\t20\t0.333333".parse::<BedGraphRecord>()?;
    /// assert_eq!(record.score(), 3);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn score(&self) -> i32 {
        (1.0 / self.value).round() as i32
    }
}

impl FromStr for BedGraphRecord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = fields(s, 4)?;

        let start = fields[1].parse().map_err(ParseError::InvalidStart)?;
        let end = fields[2].parse().map_err(ParseError::InvalidEnd)?;

        if end <= start {
            return Err(ParseError::EmptyInterval { start, end });
        }

        let value = fields[3]
            .trim()
            .parse::<f64>()
            .map_err(ParseError::InvalidValue)?;

        if !value.is_finite() || value <= 0.0 {
            return Err(ParseError::NonPositiveValue(value));
        }

        Ok(Self {
            chromosome: fields[0].to_string(),
            start,
            end,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromosome_length_ignores_extra_columns() -> Result<(), Box<dyn std::error::Error>> {
        let record = "chr1\t248956422\t/gbdb/hg38/hg38.2bit".parse::<ChromosomeLength>()?;
        assert_eq!(record.name(), "chr1");
        assert_eq!(record.length(), 248956422);

        let err = "chr1".parse::<ChromosomeLength>().unwrap_err();
        assert_eq!(err.to_string(), "missing fields: expected 2, found 1");

        Ok(())
    }

    #[test]
    fn test_bedgraph_record() -> Result<(), Box<dyn std::error::Error>> {
        let record = "chr1\t0\t10000\t1".parse::<BedGraphRecord>()?;
        assert_eq!(record.chromosome(), "chr1");
        assert_eq!(record.start(), 0);
        assert_eq!(record.end(), 10000);
        assert_eq!(record.score(), 1);

        let record = "chr1\t5\t6\t0.04".parse::<BedGraphRecord>()?;
        assert_eq!(record.score(), 25);

        Ok(())
    }

    #[test]
    fn test_invalid_bedgraph_records() {
        let err = "chr1\t0\t10\t0".parse::<BedGraphRecord>().unwrap_err();
        assert_eq!(err.to_string(), "alignability value must be positive: 0");

        let err = "chr1\t10\t10\t1".parse::<BedGraphRecord>().unwrap_err();
        assert_eq!(err.to_string(), "empty interval: start 10, end 10");

        let err = "chr1\t0\t10".parse::<BedGraphRecord>().unwrap_err();
        assert_eq!(err.to_string(), "missing fields: expected 4, found 3");

        assert!("chr1\tx\t10\t1".parse::<BedGraphRecord>().is_err());
    }
}
