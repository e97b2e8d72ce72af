//! A genome-wide catalog of restriction fragments.

use std::collections::HashMap;
use std::io::Write;

use rust_lapper as lapper;

use crate::content::Content;

/// The name written for a fragment end that is not a cut site.
pub const NO_SITE: &str = "None";

/// The header line of a digest report.
pub const REPORT_HEADER: &str = "Chromosome\tFragment_Start_Position\tFragment_End_Position\t\
                                 Fragment_Number\t5'_Restriction_Site\t3'_Restriction_Site\t\
                                 Length\tGC_Content\tRepeat_Content";

/// The inner value of the fragment lookup data structure.
type Iv = lapper::Interval<u64, usize>;

/// A restriction fragment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fragment {
    /// The 1-based start.
    start: u64,

    /// The 1-based, inclusive end.
    end: u64,

    /// The 1-based number of the fragment within its chromosome.
    number: usize,

    /// The enzyme that cut at the 5' end, if any.
    five_prime: Option<usize>,

    /// The enzyme that cut at the 3' end, if any.
    three_prime: Option<usize>,

    /// The base composition.
    content: Content,
}

impl Fragment {
    /// Creates a new fragment.
    pub(crate) fn new(
        start: u64,
        end: u64,
        number: usize,
        five_prime: Option<usize>,
        three_prime: Option<usize>,
        content: Content,
    ) -> Self {
        Self {
            start,
            end,
            number,
            five_prime,
            three_prime,
            content,
        }
    }

    /// Gets the 1-based start.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the 1-based, inclusive end.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets the number of bases.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Gets the 1-based number of the fragment within its chromosome.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Gets the index of the enzyme that cut at the 5' end, if the fragment
    /// does not start at the start of the chromosome.
    pub fn five_prime_enzyme(&self) -> Option<usize> {
        self.five_prime
    }

    /// Gets the index of the enzyme that cut at the 3' end, if the fragment
    /// does not end at the end of the chromosome.
    pub fn three_prime_enzyme(&self) -> Option<usize> {
        self.three_prime
    }

    /// Gets the base composition.
    pub fn content(&self) -> &Content {
        &self.content
    }
}

/// The fragments of one chromosome.
#[derive(Debug)]
struct Chromosome {
    /// The chromosome name.
    name: String,

    /// The fragments in order.
    fragments: Vec<Fragment>,

    /// An interval lookup from coordinates to fragment indices.
    lookup: lapper::Lapper<u64, usize>,
}

/// A catalog of restriction fragments across a genome.
#[derive(Debug)]
pub struct Catalog {
    /// The names of the enzymes that produced the fragments.
    enzymes: Vec<String>,

    /// The chromosomes in insertion order.
    chromosomes: Vec<Chromosome>,

    /// A lookup from chromosome name to its position in `chromosomes`.
    handles: HashMap<String, usize>,
}

impl Catalog {
    /// Creates an empty catalog for fragments cut by the named enzymes.
    pub fn new(enzymes: Vec<String>) -> Self {
        Self {
            enzymes,
            chromosomes: Vec::new(),
            handles: HashMap::new(),
        }
    }

    /// Adds (or replaces) the fragments of a chromosome.
    pub fn insert(&mut self, name: String, fragments: Vec<Fragment>) {
        let intervals = fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| Iv {
                start: fragment.start,
                stop: fragment.end + 1,
                val: i,
            })
            .collect::<Vec<_>>();

        let chromosome = Chromosome {
            name: name.clone(),
            fragments,
            lookup: lapper::Lapper::new(intervals),
        };

        match self.handles.get(&name) {
            Some(i) => self.chromosomes[*i] = chromosome,
            None => {
                self.handles.insert(name, self.chromosomes.len());
                self.chromosomes.push(chromosome);
            }
        }
    }

    /// Gets the names of the enzymes that produced the fragments.
    pub fn enzymes(&self) -> &[String] {
        &self.enzymes
    }

    /// Gets the name of a cut site, or `None` for a chromosome end.
    pub fn site_name(&self, enzyme: Option<usize>) -> &str {
        enzyme
            .and_then(|i| self.enzymes.get(i))
            .map(String::as_str)
            .unwrap_or(NO_SITE)
    }

    /// Gets the chromosome names in insertion order.
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.chromosomes.iter().map(|c| c.name.as_str())
    }

    /// Gets the fragments of a chromosome in order.
    pub fn fragments(&self, chromosome: &str) -> Option<&[Fragment]> {
        self.handles
            .get(chromosome)
            .map(|i| self.chromosomes[*i].fragments.as_slice())
    }

    /// Gets the fragments that overlap the 1-based, inclusive range
    /// `start..=end`, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use nonempty::NonEmpty;
    /// use vpdesign::digest::Catalog;
    /// use vpdesign::digest::Digester;
    /// use vpdesign::enzyme::Enzyme;
    ///
    /// let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC")?));
    ///
    /// let mut catalog = Catalog::new(digester.enzyme_names());
    /// catalog.insert(String::from("chr1"), digester.digest_chromosome(b"AAAGATCAAAGATCAA"));
    ///
    /// let fragments = catalog.fragments_overlapping("chr1", 3, 4);
    /// let numbers = fragments.iter().map(|f| f.number()).collect::<Vec<_>>();
    ///
    /// assert_eq!(numbers, vec![1, 2]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn fragments_overlapping(
        &self,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Vec<&Fragment> {
        let Some(chromosome) = self.handles.get(chromosome).map(|i| &self.chromosomes[*i]) else {
            return Vec::new();
        };

        let mut indices = chromosome
            .lookup
            .find(start, end + 1)
            .map(|iv| iv.val)
            .collect::<Vec<_>>();
        indices.sort_unstable();

        indices
            .into_iter()
            .map(|i| &chromosome.fragments[i])
            .collect()
    }

    /// Gets the total number of fragments.
    pub fn fragment_count(&self) -> usize {
        self.chromosomes.iter().map(|c| c.fragments.len()).sum()
    }

    /// Gets the mean fragment length, or `0.0` for an empty catalog.
    pub fn mean_fragment_length(&self) -> f64 {
        let count = self.fragment_count();

        if count == 0 {
            return 0.0;
        }

        let total = self
            .chromosomes
            .iter()
            .flat_map(|c| c.fragments.iter())
            .map(|f| f.length())
            .sum::<u64>();

        total as f64 / count as f64
    }

    /// Writes the tab-separated digest report, one line per fragment.
    pub fn write_report<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: Write,
    {
        writeln!(writer, "{REPORT_HEADER}")?;

        for chromosome in &self.chromosomes {
            for fragment in &chromosome.fragments {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.3}\t{:.3}",
                    chromosome.name,
                    fragment.start,
                    fragment.end,
                    fragment.number,
                    self.site_name(fragment.five_prime),
                    self.site_name(fragment.three_prime),
                    fragment.length(),
                    fragment.content.gc_fraction(),
                    fragment.content.repeat_fraction(),
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nonempty::NonEmpty;

    use super::*;
    use crate::digest::Digester;
    use crate::enzyme::Enzyme;

    fn catalog() -> Result<Catalog, Box<dyn std::error::Error>> {
        let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC")?));

        let mut catalog = Catalog::new(digester.enzyme_names());
        catalog.insert(
            String::from("chr1"),
            digester.digest_chromosome(b"ccgGATCAAAT"),
        );

        Ok(catalog)
    }

    #[test]
    fn test_report() -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        catalog()?.write_report(&mut buffer)?;

        let report = String::from_utf8(buffer)?;
        let lines = report.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], REPORT_HEADER);
        assert_eq!(lines[1], "chr1\t1\t3\t1\tNone\tDpnII\t3\t1.000\t1.000");
        assert_eq!(lines[2], "chr1\t4\t11\t2\tDpnII\tNone\t8\t0.250\t0.000");

        Ok(())
    }

    #[test]
    fn test_overlapping_lookup() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = catalog()?;

        assert_eq!(catalog.fragments_overlapping("chr1", 1, 3).len(), 1);
        assert_eq!(catalog.fragments_overlapping("chr1", 1, 11).len(), 2);
        assert_eq!(catalog.fragments_overlapping("chr1", 12, 20).len(), 0);
        assert!(catalog.fragments_overlapping("chrX", 1, 10).is_empty());

        Ok(())
    }

    #[test]
    fn test_summary() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = catalog()?;

        assert_eq!(catalog.fragment_count(), 2);
        assert_eq!(catalog.mean_fragment_length(), 5.5);
        assert_eq!(catalog.chromosomes().collect::<Vec<_>>(), vec!["chr1"]);
        assert_eq!(catalog.site_name(Some(0)), "DpnII");
        assert_eq!(catalog.site_name(None), NO_SITE);

        Ok(())
    }
}
