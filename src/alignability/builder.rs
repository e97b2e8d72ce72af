//! A builder for an [`AlignabilityIndex`].

use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;
use tracing::info;

use crate::alignability::record::BedGraphRecord;
use crate::alignability::record::ChromosomeLength;
use crate::alignability::AlignabilityIndex;
use crate::alignability::Error;
use crate::alignability::Result;
use crate::alignability::Track;
use crate::alignability::NO_DATA;
use crate::reader;

/// The breakpoints of a chromosome that is still being read.
#[derive(Debug)]
struct Pending {
    /// The position in the chromosome-length table.
    handle: usize,

    /// The chromosome length.
    length: u64,

    /// The breakpoints so far.
    breakpoints: Vec<u64>,

    /// The scores so far.
    scores: Vec<i32>,

    /// The end of the last record.
    last_end: u64,
}

impl Pending {
    /// Starts a chromosome.
    fn new(handle: usize, length: u64) -> Self {
        Self {
            handle,
            length,
            breakpoints: Vec::new(),
            scores: Vec::new(),
            last_end: 0,
        }
    }

    /// Adds the scores of a record.
    ///
    /// Records are expected in order of their start. A record that starts at
    /// or before an earlier breakpoint overrides every breakpoint from its
    /// start onward: later records win.
    fn push(&mut self, record: &BedGraphRecord) {
        let start = record.start() + 1;

        while self.breakpoints.last().is_some_and(|b| *b >= start) {
            self.breakpoints.pop();
            self.scores.pop();
        }

        if start > self.last_end + 1 && self.breakpoints.last() != Some(&(self.last_end + 1)) {
            self.breakpoints.push(self.last_end + 1);
            self.scores.push(NO_DATA);
        }

        self.breakpoints.push(start);
        self.scores.push(record.score());
        self.last_end = record.end();
    }

    /// Freezes the chromosome, closing any gap at its end.
    fn finish(mut self) -> (usize, Track) {
        if self.breakpoints.is_empty() {
            self.breakpoints.push(1);
            self.scores.push(NO_DATA);
        } else if self.last_end < self.length {
            self.breakpoints.push(self.last_end + 1);
            self.scores.push(NO_DATA);
        }

        let track = Track {
            length: self.length,
            breakpoints: self.breakpoints.into_boxed_slice(),
            scores: self.scores.into_boxed_slice(),
        };

        (self.handle, track)
    }
}

/// A builder for an [`AlignabilityIndex`].
#[derive(Debug, Default)]
pub struct Builder {
    /// The k-mer size the track was computed with.
    kmer_size: Option<usize>,
}

impl Builder {
    /// Records the k-mer size the track was computed with.
    pub fn kmer_size(mut self, kmer_size: usize) -> Self {
        self.kmer_size = Some(kmer_size);
        self
    }

    /// Builds an [`AlignabilityIndex`] from a chromosome-length table and an
    /// alignability track.
    ///
    /// The track must be sorted by chromosome and then by start (e.g., with
    /// `sort -k1,1 -k2,2n`). Gaps before the first record of a chromosome,
    /// between records and after the last record are filled with
    /// [`NO_DATA`]. Chromosomes in the table without any record resolve to
    /// [`NO_DATA`] everywhere.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::alignability::Builder;
    ///
    /// let sizes = b"chr1\t100\nchr2\t10\n";
    /// let track = b"chr1\t0\t100\t1\n";
    ///
    /// let index = Builder::default().kmer_size(100).try_build_from(
    ///     vpdesign::Reader::new(&sizes[..]),
    ///     vpdesign::Reader::new(&track[..]),
    /// )?;
    ///
    /// assert_eq!(index.breakpoint_count("chr1"), Some(1));
    /// assert_eq!(index.kmer_size(), Some(100));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build_from<S, T>(
        &self,
        mut sizes: reader::Reader<S>,
        mut track: reader::Reader<T>,
    ) -> Result<AlignabilityIndex>
    where
        S: BufRead,
        T: BufRead,
    {
        let mut names = Vec::new();
        let mut lengths = Vec::new();
        let mut handles = HashMap::new();

        for result in sizes.records::<ChromosomeLength>() {
            let record = result.map_err(Error::InvalidChromosomeLengths)?;

            match handles.get(record.name()) {
                Some(i) => lengths[*i] = record.length(),
                None => {
                    handles.insert(record.name().to_string(), names.len());
                    names.push(record.name().to_string());
                    lengths.push(record.length());
                }
            }
        }

        let mut tracks = lengths
            .iter()
            .enumerate()
            .map(|(handle, length)| Pending::new(handle, *length).finish().1)
            .collect::<Vec<_>>();

        let mut seen = HashSet::new();
        let mut current: Option<(String, Pending)> = None;

        for result in track.records::<BedGraphRecord>() {
            let record = result.map_err(Error::InvalidTrack)?;

            if current.as_ref().map(|(name, _)| name.as_str()) != Some(record.chromosome()) {
                if let Some((name, pending)) = current.take() {
                    let (handle, finished) = pending.finish();
                    debug!("indexed {} breakpoint(s) for {name}", finished.breakpoints.len());
                    tracks[handle] = finished;
                }

                let handle = *handles
                    .get(record.chromosome())
                    .ok_or_else(|| Error::UnknownChromosome(record.chromosome().to_string()))?;

                if !seen.insert(record.chromosome().to_string()) {
                    return Err(Error::Unsorted(record.chromosome().to_string()));
                }

                current = Some((
                    record.chromosome().to_string(),
                    Pending::new(handle, lengths[handle]),
                ));
            }

            if let Some((_, pending)) = current.as_mut() {
                pending.push(&record);
            }
        }

        if let Some((name, pending)) = current.take() {
            let (handle, finished) = pending.finish();
            debug!("indexed {} breakpoint(s) for {name}", finished.breakpoints.len());
            tracks[handle] = finished;
        }

        info!(
            "built alignability index for {} chromosome(s) ({} with data)",
            names.len(),
            seen.len()
        );

        Ok(AlignabilityIndex {
            names,
            tracks,
            handles,
            kmer_size: self.kmer_size,
        })
    }

    /// Builds an [`AlignabilityIndex`] from files on disk.
    ///
    /// Files ending in `.gz` are decompressed on the fly.
    pub fn try_build_from_paths(
        &self,
        sizes: impl AsRef<Path>,
        track: impl AsRef<Path>,
    ) -> Result<AlignabilityIndex> {
        self.try_build_from(
            reader::Reader::new(open(sizes.as_ref())?),
            reader::Reader::new(open(track.as_ref())?),
        )
    }
}

/// Opens a possibly gzip-compressed text file.
fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(Error::Io)?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
