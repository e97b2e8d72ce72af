//! FASTA files with a samtools-style `.fai` index.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read as _;
use std::io::Seek as _;
use std::io::SeekFrom;
use std::num::ParseIntError;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use crate::reader;
use crate::sequence::check_range;
use crate::sequence::Error;
use crate::sequence::Result;
use crate::sequence::SequenceAccessor;

/// The delimiter between the fields of an index line.
const DELIMITER: char = '\t';

/// The number of fields in an index line.
const NUM_FIELDS: usize = 5;

/// An error related to parsing an index line.
#[derive(Debug)]
pub enum ParseError {
    /// An incorrect number of fields.
    IncorrectNumberOfFields(usize),

    /// An invalid sequence length.
    InvalidLength(ParseIntError),

    /// An invalid byte offset.
    InvalidOffset(ParseIntError),

    /// An invalid number of bases per line.
    InvalidLineBases(ParseIntError),

    /// An invalid number of bytes per line.
    InvalidLineWidth(ParseIntError),

    /// A line geometry that cannot describe a FASTA file.
    InvalidLineGeometry {
        /// The number of bases per line.
        line_bases: u64,

        /// The number of bytes per line.
        line_width: u64,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(n) => write!(
                f,
                "incorrect number of fields: expected {NUM_FIELDS}, found {n}"
            ),
            ParseError::InvalidLength(err) => write!(f, "invalid length: {err}"),
            ParseError::InvalidOffset(err) => write!(f, "invalid offset: {err}"),
            ParseError::InvalidLineBases(err) => write!(f, "invalid line bases: {err}"),
            ParseError::InvalidLineWidth(err) => write!(f, "invalid line width: {err}"),
            ParseError::InvalidLineGeometry {
                line_bases,
                line_width,
            } => write!(
                f,
                "invalid line geometry: {line_bases} bases in {line_width} bytes"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// A single line of a `.fai` index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexRecord {
    /// The sequence name.
    name: String,

    /// The sequence length.
    length: u64,

    /// The byte offset of the first base.
    offset: u64,

    /// The number of bases on each line.
    line_bases: u64,

    /// The number of bytes on each line, including the line ending.
    line_width: u64,
}

impl IndexRecord {
    /// Gets the sequence name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the sequence length.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Gets the byte offset of the 0-based `position` within the file.
    fn byte_offset(&self, position: u64) -> u64 {
        self.offset + (position / self.line_bases) * self.line_width + position % self.line_bases
    }
}

impl FromStr for IndexRecord {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let fields = s.split(DELIMITER).collect::<Vec<_>>();

        if fields.len() != NUM_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(fields.len()));
        }

        let line_bases = fields[3].parse().map_err(ParseError::InvalidLineBases)?;
        let line_width = fields[4].parse().map_err(ParseError::InvalidLineWidth)?;

        if line_bases == 0 || line_width < line_bases {
            return Err(ParseError::InvalidLineGeometry {
                line_bases,
                line_width,
            });
        }

        Ok(Self {
            name: fields[0].to_string(),
            length: fields[1].parse().map_err(ParseError::InvalidLength)?,
            offset: fields[2].parse().map_err(ParseError::InvalidOffset)?,
            line_bases,
            line_width,
        })
    }
}

/// An indexed FASTA file.
///
/// Only the index is held in memory. Each request seeks to the first byte of
/// the range and reads the bytes spanning it, so genome-scale assemblies can be
/// queried without loading whole chromosomes.
#[derive(Clone, Debug)]
pub struct IndexedFasta {
    /// The path to the FASTA file.
    path: PathBuf,

    /// The index records in file order.
    records: Vec<IndexRecord>,

    /// A lookup from sequence name to index record.
    lookup: HashMap<String, usize>,
}

impl IndexedFasta {
    /// Opens an indexed FASTA file whose index is found at `<path>.fai`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vpdesign::sequence::IndexedFasta;
    /// use vpdesign::sequence::SequenceAccessor as _;
    ///
    /// let fasta = IndexedFasta::from_path("hg38.fa")?;
    /// let bases = fasta.subsequence("chr1", 1_000_001, 1_000_100)?;
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut index = path.as_os_str().to_owned();
        index.push(".fai");

        Self::from_paths(path, index)
    }

    /// Opens an indexed FASTA file with an explicitly located index.
    pub fn from_paths(path: impl AsRef<Path>, index: impl AsRef<Path>) -> Result<Self> {
        let index = index.as_ref();

        if !index.exists() {
            return Err(Error::MissingIndex(index.to_path_buf()));
        }

        let file = File::open(index).map_err(Error::Io)?;
        let mut reader = reader::Reader::new(BufReader::new(file));

        let mut records = Vec::new();
        let mut lookup = HashMap::new();

        for result in reader.records::<IndexRecord>() {
            let record = result.map_err(|err| match err {
                reader::Error::Io(err) => Error::Io(err),
                err => Error::InvalidIndex(err.to_string()),
            })?;

            lookup.insert(record.name.clone(), records.len());
            records.push(record);
        }

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            records,
            lookup,
        })
    }

    /// Gets the path to the FASTA file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the index records.
    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    /// Gets the index record for a chromosome.
    fn record(&self, chromosome: &str) -> Result<&IndexRecord> {
        self.lookup
            .get(chromosome)
            .map(|i| &self.records[*i])
            .ok_or_else(|| Error::UnknownChromosome(chromosome.to_string()))
    }
}

impl SequenceAccessor for IndexedFasta {
    fn subsequence(&self, chromosome: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let record = self.record(chromosome)?;
        check_range(chromosome, start, end, record.length)?;

        let first = record.byte_offset(start - 1);
        let last = record.byte_offset(end - 1);

        let mut file = File::open(&self.path).map_err(Error::Io)?;
        file.seek(SeekFrom::Start(first)).map_err(Error::Io)?;

        let mut buffer = vec![0; (last - first + 1) as usize];
        file.read_exact(&mut buffer).map_err(Error::Io)?;

        buffer.retain(|b| *b != b'\n' && *b != b'\r');

        Ok(buffer)
    }

    fn sequence_length(&self, chromosome: &str) -> Result<u64> {
        self.record(chromosome).map(|record| record.length)
    }

    fn chromosomes(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    /// Writes a FASTA file wrapped at four bases per line along with its index.
    fn fixture(dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join("genome.fa");

        let mut fasta = File::create(&path)?;
        fasta.write_all(b">chr1\nACGT\nacgt\nGG\n>chr2\nTTTT\nCC\n")?;

        let mut fai = File::create(dir.join("genome.fa.fai"))?;
        fai.write_all(b"chr1\t10\t6\t4\t5\nchr2\t6\t25\t4\t5\n")?;

        Ok(path)
    }

    #[test]
    fn test_subsequence_spans_lines() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let fasta = IndexedFasta::from_path(fixture(dir.path())?)?;

        assert_eq!(fasta.chromosomes(), vec!["chr1", "chr2"]);
        assert_eq!(fasta.sequence_length("chr1")?, 10);
        assert_eq!(fasta.subsequence("chr1", 1, 10)?, b"ACGTacgtGG".to_vec());
        assert_eq!(fasta.subsequence("chr1", 3, 6)?, b"GTac".to_vec());
        assert_eq!(fasta.subsequence("chr2", 4, 6)?, b"TCC".to_vec());

        Ok(())
    }

    #[test]
    fn test_missing_index() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("genome.fa");
        File::create(&path)?;

        let err = IndexedFasta::from_path(&path).unwrap_err();
        assert!(matches!(err, Error::MissingIndex(_)));

        Ok(())
    }

    #[test]
    fn test_range_errors() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let fasta = IndexedFasta::from_path(fixture(dir.path())?)?;

        assert!(matches!(
            fasta.subsequence("chr1", 5, 11),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            fasta.subsequence("chr3", 1, 1),
            Err(Error::UnknownChromosome(_))
        ));

        Ok(())
    }

    #[test]
    fn test_invalid_index_line() {
        let err = "chr1\t10\t6\t4".parse::<IndexRecord>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "incorrect number of fields: expected 5, found 4"
        );

        let err = "chr1\t10\t6\t5\t4".parse::<IndexRecord>().unwrap_err();
        assert_eq!(err.to_string(), "invalid line geometry: 5 bases in 4 bytes");
    }
}
