//! Random access to reference sequences.
//!
//! All coordinates handed to a [`SequenceAccessor`] are 1-based and fully
//! closed, matching the coordinates of segments and viewpoints. The case of
//! the reference is preserved because soft-masking carries the repeat
//! annotation.

use std::io;
use std::path::PathBuf;

pub mod indexed;
pub mod memory;

pub use indexed::IndexedFasta;
pub use memory::Memory;

/// An error related to sequence access.
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// The FASTA file has no `.fai` index next to it.
    MissingIndex(PathBuf),

    /// The `.fai` index could not be parsed.
    InvalidIndex(String),

    /// The chromosome is not present in the sequence source.
    UnknownChromosome(String),

    /// The requested range does not lie within the chromosome.
    InvalidRange {
        /// The chromosome name.
        chromosome: String,

        /// The requested start (1-based).
        start: u64,

        /// The requested end (1-based, inclusive).
        end: u64,

        /// The length of the chromosome.
        length: u64,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::MissingIndex(path) => {
                write!(f, "missing FASTA index: {}", path.display())
            }
            Error::InvalidIndex(err) => write!(f, "invalid FASTA index: {err}"),
            Error::UnknownChromosome(name) => write!(f, "unknown chromosome: {name}"),
            Error::InvalidRange {
                chromosome,
                start,
                end,
                length,
            } => write!(
                f,
                "invalid range {chromosome}:{start}-{end} for a chromosome of length {length}"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Random access to the sequences of a genome assembly.
pub trait SequenceAccessor: Sync {
    /// Gets the bases of `chromosome` from `start` to `end` (1-based,
    /// inclusive).
    fn subsequence(&self, chromosome: &str, start: u64, end: u64) -> Result<Vec<u8>>;

    /// Gets the length of `chromosome`.
    fn sequence_length(&self, chromosome: &str) -> Result<u64>;

    /// Gets the names of all chromosomes in the order they appear in the
    /// source.
    fn chromosomes(&self) -> Vec<String>;
}

/// Ensures that `start..=end` is a valid range on a chromosome of `length`.
pub(crate) fn check_range(chromosome: &str, start: u64, end: u64, length: u64) -> Result<()> {
    if start < 1 || end < start || end > length {
        return Err(Error::InvalidRange {
            chromosome: chromosome.to_string(),
            start,
            end,
            length,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert!(check_range("chr1", 1, 10, 10).is_ok());
        assert!(check_range("chr1", 5, 5, 10).is_ok());

        let err = check_range("chr1", 0, 5, 10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid range chr1:0-5 for a chromosome of length 10"
        );

        assert!(check_range("chr1", 6, 5, 10).is_err());
        assert!(check_range("chr1", 1, 11, 10).is_err());
    }
}
