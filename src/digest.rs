//! In-silico restriction digestion.
//!
//! A [`Digester`] finds every cut site of a set of restriction enzymes in a
//! sequence. Whole chromosomes are carved into a contiguous, non-overlapping
//! fragment [`Catalog`]; windows around a target are turned into a
//! [`CutMap`](window::CutMap) of cut positions relative to the target.

use nonempty::NonEmpty;
use rayon::prelude::*;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::content::Content;
use crate::enzyme::Enzyme;
use crate::sequence;
use crate::sequence::SequenceAccessor;

pub mod catalog;
pub mod window;

pub use catalog::Catalog;
pub use catalog::Fragment;

/// A single cut made by an enzyme.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Cut {
    /// The 1-based position of the first base after the cut.
    position: u64,

    /// The index of the enzyme that cut.
    enzyme: usize,
}

impl Cut {
    /// Gets the 1-based position of the first base after the cut.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Gets the index of the enzyme that cut within the digester's enzymes.
    pub fn enzyme(&self) -> usize {
        self.enzyme
    }
}

/// The failure to digest a single chromosome.
#[derive(Debug)]
pub struct Failure {
    /// The chromosome name.
    pub chromosome: String,

    /// The underlying error.
    pub error: sequence::Error,
}

/// The result of digesting a whole genome.
#[derive(Debug)]
pub struct GenomeDigest {
    /// The fragments of every chromosome that could be digested.
    pub catalog: Catalog,

    /// The chromosomes that could not be digested.
    pub failures: Vec<Failure>,
}

/// A restriction digester.
#[derive(Clone, Debug)]
pub struct Digester {
    /// The enzymes used to cut.
    enzymes: NonEmpty<Enzyme>,
}

impl Digester {
    /// Creates a new digester.
    pub fn new(enzymes: NonEmpty<Enzyme>) -> Self {
        Self { enzymes }
    }

    /// Gets the enzymes used to cut.
    pub fn enzymes(&self) -> &NonEmpty<Enzyme> {
        &self.enzymes
    }

    /// Gets the names of the enzymes used to cut.
    pub fn enzyme_names(&self) -> Vec<String> {
        self.enzymes.iter().map(|e| e.name().to_string()).collect()
    }

    /// Finds every cut made by any enzyme in `bases`.
    ///
    /// Cuts are sorted by position and then by enzyme. Cuts at the same
    /// position made by different enzymes (or by overlapping occurrences of
    /// the same site) are all kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use nonempty::NonEmpty;
    /// use vpdesign::digest::Digester;
    /// use vpdesign::enzyme::Enzyme;
    ///
    /// let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC")?));
    /// let cuts = digester.cut_sites(b"AAgatcAAAGATCA");
    ///
    /// let positions = cuts.iter().map(|c| c.position()).collect::<Vec<_>>();
    /// assert_eq!(positions, vec![3, 10]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn cut_sites(&self, bases: &[u8]) -> Vec<Cut> {
        let mut cuts = self
            .enzymes
            .iter()
            .enumerate()
            .flat_map(|(i, enzyme)| {
                enzyme.match_starts(bases).map(move |start| Cut {
                    position: (start + enzyme.offset()) as u64 + 1,
                    enzyme: i,
                })
            })
            .collect::<Vec<_>>();

        cuts.sort();
        cuts
    }

    /// Digests a single chromosome into contiguous fragments.
    ///
    /// The first fragment starts at position 1 and the last fragment ends at
    /// the last base. A site at the very start of the chromosome yields no
    /// empty fragment. When several enzymes cut at the same position, the
    /// boundary is reported with the first of them (in the order the enzymes
    /// were given) on both adjacent fragments.
    ///
    /// # Examples
    ///
    /// ```
    /// use nonempty::NonEmpty;
    /// use vpdesign::digest::Digester;
    /// use vpdesign::enzyme::Enzyme;
    ///
    /// let digester = Digester::new(NonEmpty::new(Enzyme::try_new("HindIII", "A^AGCTT")?));
    /// let fragments = digester.digest_chromosome(b"CCCAAGCTTGGG");
    ///
    /// assert_eq!(fragments.len(), 2);
    /// assert_eq!((fragments[0].start(), fragments[0].end()), (1, 4));
    /// assert_eq!((fragments[1].start(), fragments[1].end()), (5, 12));
    /// assert_eq!(fragments[0].five_prime_enzyme(), None);
    /// assert_eq!(fragments[0].three_prime_enzyme(), Some(0));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn digest_chromosome(&self, bases: &[u8]) -> Vec<Fragment> {
        let length = bases.len() as u64;

        let mut cuts = self.cut_sites(bases);
        cuts.dedup_by_key(|cut| cut.position);

        let mut fragments = Vec::with_capacity(cuts.len() + 1);

        let mut start = 1;
        let mut five_prime = None;

        let boundaries = cuts
            .iter()
            .map(|cut| (cut.position, Some(cut.enzyme)))
            .chain(std::iter::once((length + 1, None)));

        for (next, three_prime) in boundaries {
            if next > start {
                let end = next - 1;
                let content = Content::of(&bases[(start - 1) as usize..end as usize]);

                fragments.push(Fragment::new(
                    start,
                    end,
                    fragments.len() + 1,
                    five_prime,
                    three_prime,
                    content,
                ));

                start = next;
            }

            five_prime = three_prime;
        }

        fragments
    }

    /// Digests every chromosome of a genome.
    ///
    /// Chromosomes are digested in parallel. A chromosome that cannot be read
    /// is reported as a [`Failure`] and does not prevent the remaining
    /// chromosomes from being digested.
    pub fn digest_genome<S>(&self, accessor: &S) -> GenomeDigest
    where
        S: SequenceAccessor,
    {
        let chromosomes = accessor.chromosomes();
        info!(
            "digesting {} chromosome(s) with {}",
            chromosomes.len(),
            self.enzyme_names().join(", ")
        );

        let results = chromosomes
            .into_par_iter()
            .map(|chromosome| {
                let result = self.read_chromosome(accessor, &chromosome).map(|bases| {
                    let fragments = self.digest_chromosome(&bases);
                    debug!(
                        "digested {} ({} bp) into {} fragment(s)",
                        chromosome,
                        bases.len(),
                        fragments.len()
                    );
                    fragments
                });

                (chromosome, result)
            })
            .collect::<Vec<_>>();

        let mut catalog = Catalog::new(self.enzyme_names());
        let mut failures = Vec::new();

        for (chromosome, result) in results {
            match result {
                Ok(fragments) => catalog.insert(chromosome, fragments),
                Err(error) => {
                    warn!("skipping chromosome {chromosome}: {error}");
                    failures.push(Failure { chromosome, error });
                }
            }
        }

        GenomeDigest { catalog, failures }
    }

    /// Reads the full sequence of a chromosome.
    fn read_chromosome<S>(&self, accessor: &S, chromosome: &str) -> sequence::Result<Vec<u8>>
    where
        S: SequenceAccessor,
    {
        match accessor.sequence_length(chromosome)? {
            0 => Ok(Vec::new()),
            length => accessor.subsequence(chromosome, 1, length),
        }
    }
}
