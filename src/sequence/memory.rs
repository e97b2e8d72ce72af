//! An in-memory sequence source.

use std::collections::HashMap;

use crate::sequence::check_range;
use crate::sequence::Error;
use crate::sequence::Result;
use crate::sequence::SequenceAccessor;

/// A set of sequences held in memory.
///
/// Useful for small genomes (e.g., synthetic test assemblies) where an indexed
/// FASTA file would be overkill.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// The sequence names in insertion order.
    names: Vec<String>,

    /// The sequences by name.
    sequences: HashMap<String, Vec<u8>>,
}

impl Memory {
    /// Inserts (or replaces) a sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::sequence::Memory;
    /// use vpdesign::sequence::SequenceAccessor as _;
    ///
    /// let mut memory = Memory::default();
    /// memory.insert("chr1", b"ACGTacgt".to_vec());
    ///
    /// assert_eq!(memory.sequence_length("chr1")?, 8);
    /// assert_eq!(memory.subsequence("chr1", 3, 6)?, b"GTac".to_vec());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn insert(&mut self, name: impl Into<String>, sequence: Vec<u8>) {
        let name = name.into();

        if !self.sequences.contains_key(&name) {
            self.names.push(name.clone());
        }

        self.sequences.insert(name, sequence);
    }

    /// Returns whether no sequences are held.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Gets the number of sequences held.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Gets a sequence by name.
    fn get(&self, chromosome: &str) -> Result<&[u8]> {
        self.sequences
            .get(chromosome)
            .map(|sequence| sequence.as_slice())
            .ok_or_else(|| Error::UnknownChromosome(chromosome.to_string()))
    }
}

impl<S> FromIterator<(S, Vec<u8>)> for Memory
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, Vec<u8>)>>(iter: I) -> Self {
        let mut memory = Memory::default();

        for (name, sequence) in iter {
            memory.insert(name, sequence);
        }

        memory
    }
}

impl SequenceAccessor for Memory {
    fn subsequence(&self, chromosome: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let sequence = self.get(chromosome)?;
        check_range(chromosome, start, end, sequence.len() as u64)?;
        Ok(sequence[(start - 1) as usize..end as usize].to_vec())
    }

    fn sequence_length(&self, chromosome: &str) -> Result<u64> {
        self.get(chromosome).map(|sequence| sequence.len() as u64)
    }

    fn chromosomes(&self) -> Vec<String> {
        self.names.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let memory = [("chr2", b"AC".to_vec()), ("chr1", b"GT".to_vec())]
            .into_iter()
            .collect::<Memory>();

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.chromosomes(), vec!["chr2", "chr1"]);
    }

    #[test]
    fn test_unknown_chromosome() {
        let memory = Memory::default();
        let err = memory.sequence_length("chrZ").unwrap_err();
        assert_eq!(err.to_string(), "unknown chromosome: chrZ");
    }

    #[test]
    fn test_out_of_range() {
        let memory = [("chr1", b"ACGT".to_vec())].into_iter().collect::<Memory>();
        assert!(memory.subsequence("chr1", 2, 5).is_err());
        assert_eq!(memory.subsequence("chr1", 4, 4).unwrap(), b"T".to_vec());
    }
}
