//! `vpdesign` is a crate for designing Capture Hi-C viewpoints.
//!
//! A viewpoint is the set of restriction fragments around a target position
//! (typically a transcription start site) that is enriched in a Capture Hi-C
//! experiment. Designing one involves three steps:
//!
//! - Digesting the genome around the target in silico with one or more
//!   restriction enzymes ([`digest`], [`enzyme`]).
//! - Annotating each resulting fragment with its GC content and repeat
//!   content, both for the fragment as a whole and for its margins
//!   ([`segment`]).
//! - Selecting and scoring the fragments that make up the viewpoint
//!   ([`viewpoint`]) and, optionally, placing oligonucleotide baits in their
//!   margins using a genome-wide [alignability](alignability) index.
//!
//! Viewpoints for many targets are built in parallel with [`batch::run`] and
//! summarized into a [`design::Design`], which can be exported as BED files
//! ([`export`]).
//!
//! ## Building a viewpoint
//!
//! Sequences are read through a [`sequence::SequenceAccessor`]. Genome-scale
//! work uses an [`sequence::IndexedFasta`]; the example below uses an
//! in-memory [`sequence::Memory`] instead.
//!
//! ```
//! use nonempty::NonEmpty;
//! use omics::coordinate::Strand;
//! use vpdesign::config;
//! use vpdesign::digest::Digester;
//! use vpdesign::enzyme::Registry;
//! use vpdesign::sequence::Memory;
//! use vpdesign::viewpoint::Builder;
//! use vpdesign::viewpoint::Strategy;
//! use vpdesign::viewpoint::Target;
//!
//! let mut bases = b"ACGT".repeat(500);
//! for start in [700, 900, 1100, 1300] {
//!     bases[start..start + 4].copy_from_slice(b"GATC");
//! }
//! let memory = [("chr1", bases)].into_iter().collect::<Memory>();
//!
//! let digester = Digester::new(Registry::builtin().resolve(["DpnII"])?);
//! let parameters = config::Builder::default()
//!     .upstream(500)
//!     .downstream(500)
//!     .try_build()?;
//!
//! let builder = Builder::new(&memory, &digester, &parameters);
//! let target = Target::new("chr1", 1000, Strand::Positive, "GENE");
//! let viewpoint = builder.build(&target, Strategy::Simple)?;
//!
//! assert!(viewpoint.is_resolved());
//! assert_eq!(viewpoint.start(), 901);
//! assert_eq!(viewpoint.end(), 1100);
//!
//! for segment in viewpoint.segments() {
//!     println!("{} {:?}", segment.location(), segment.state());
//! }
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod alignability;
pub mod batch;
pub mod config;
pub mod content;
pub mod design;
pub mod digest;
pub mod enzyme;
pub mod export;
pub mod reader;
pub mod segment;
pub mod sequence;
pub mod viewpoint;

pub use self::reader::Reader;
