//! Summary statistics of a whole design.
//!
//! A [`Design`] is derived from a set of viewpoints and is never updated in
//! place: recompute it with [`Design::from_viewpoints`] whenever the
//! viewpoints change.

use std::collections::HashSet;

use crate::config::Parameters;
use crate::viewpoint::ViewPoint;

/// A margin of a selected segment, counted once across a design.
#[derive(Clone, Debug, PartialEq)]
pub struct UniqueMargin<'a> {
    /// The chromosome name.
    pub chromosome: &'a str,

    /// The 1-based start.
    pub start: u64,

    /// The 1-based, inclusive end.
    pub end: u64,

    /// The name of the target whose viewpoint holds the margin.
    pub target: &'a str,

    /// The index of the margin within its segment.
    pub index: usize,

    /// The mean repeat content of the margins of its segment.
    pub repeat_content: f64,
}

impl UniqueMargin<'_> {
    /// Gets the number of bases.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Gets the margins of the selected segments of every viewpoint.
///
/// Margins are keyed by chromosome, coordinates, target name and margin
/// index, so a margin shared by viewpoints of the same target is only
/// reported once.
pub fn unique_margins(viewpoints: &[ViewPoint]) -> Vec<UniqueMargin<'_>> {
    let mut seen = HashSet::new();
    let mut margins = Vec::new();

    for viewpoint in viewpoints {
        for segment in viewpoint.selected_segments() {
            for (index, margin) in segment.margins().iter().enumerate() {
                let key = (
                    segment.chromosome(),
                    margin.start() - 1,
                    margin.end(),
                    viewpoint.target().name(),
                    index,
                );

                if seen.insert(key) {
                    margins.push(UniqueMargin {
                        chromosome: segment.chromosome(),
                        start: margin.start(),
                        end: margin.end(),
                        target: viewpoint.target().name(),
                        index,
                        repeat_content: segment.mean_margin_repeat_content(),
                    });
                }
            }
        }
    }

    margins
}

/// Summary statistics of a design.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Design {
    /// The number of viewpoints.
    viewpoints: usize,

    /// The number of resolved viewpoints.
    resolved_viewpoints: usize,

    /// The number of distinct target names.
    genes: usize,

    /// The number of target names with at least one resolved viewpoint.
    resolved_genes: usize,

    /// The number of distinct selected segments.
    unique_fragments: usize,

    /// The number of bases in unique margins.
    margin_nucleotides: u64,

    /// The mean repeat content of unique margins.
    mean_margin_repeat_content: f64,

    /// The mean number of distinct selected segments per viewpoint.
    mean_fragments_per_viewpoint: f64,

    /// The mean viewpoint score.
    mean_score: f64,

    /// The mean viewpoint size.
    mean_size: f64,

    /// The estimated number of probes.
    estimated_probes: u64,

    /// The tiling factor.
    tiling_factor: u64,
}

impl Design {
    /// Summarizes `viewpoints`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::config::Parameters;
    /// use vpdesign::design::Design;
    ///
    /// let design = Design::from_viewpoints(&[], &Parameters::default());
    ///
    /// assert_eq!(design.viewpoints(), 0);
    /// assert_eq!(design.mean_score(), 0.0);
    /// assert_eq!(design.estimated_probes(), 0);
    /// ```
    pub fn from_viewpoints(viewpoints: &[ViewPoint], parameters: &Parameters) -> Self {
        let mut genes = HashSet::new();
        let mut resolved_genes = HashSet::new();
        let mut fragments = HashSet::new();

        let mut resolved_viewpoints = 0;
        let mut total_score = 0.0;
        let mut total_size = 0.0;

        for viewpoint in viewpoints {
            let name = viewpoint.target().name();
            genes.insert(name);

            if viewpoint.is_resolved() {
                resolved_viewpoints += 1;
                resolved_genes.insert(name);
            }

            fragments.extend(
                viewpoint
                    .selected_segments()
                    .map(|s| (s.chromosome(), s.start(), s.end())),
            );

            total_score += viewpoint.score();
            total_size += viewpoint.total_length() as f64;
        }

        let margins = unique_margins(viewpoints);
        let margin_nucleotides = margins.iter().map(UniqueMargin::length).sum::<u64>();
        let mean_margin_repeat_content = match margins.len() {
            0 => 0.0,
            n => margins.iter().map(|m| m.repeat_content).sum::<f64>() / n as f64,
        };

        let estimated_probes = (margin_nucleotides as f64
            * (1.0 - mean_margin_repeat_content)
            * parameters.tiling_factor() as f64
            / parameters.probe_length() as f64)
            .floor() as u64;

        let mean = |total: f64| match viewpoints.len() {
            0 => 0.0,
            n => total / n as f64,
        };

        Self {
            viewpoints: viewpoints.len(),
            resolved_viewpoints,
            genes: genes.len(),
            resolved_genes: resolved_genes.len(),
            unique_fragments: fragments.len(),
            margin_nucleotides,
            mean_margin_repeat_content,
            mean_fragments_per_viewpoint: mean(fragments.len() as f64),
            mean_score: mean(total_score),
            mean_size: mean(total_size),
            estimated_probes,
            tiling_factor: parameters.tiling_factor(),
        }
    }

    /// Gets the number of viewpoints.
    pub fn viewpoints(&self) -> usize {
        self.viewpoints
    }

    /// Gets the number of resolved viewpoints.
    pub fn resolved_viewpoints(&self) -> usize {
        self.resolved_viewpoints
    }

    /// Gets the number of distinct target names.
    pub fn genes(&self) -> usize {
        self.genes
    }

    /// Gets the number of target names with at least one resolved viewpoint.
    pub fn resolved_genes(&self) -> usize {
        self.resolved_genes
    }

    /// Gets the number of distinct selected segments.
    pub fn unique_fragments(&self) -> usize {
        self.unique_fragments
    }

    /// Gets the number of bases in unique margins.
    pub fn margin_nucleotides(&self) -> u64 {
        self.margin_nucleotides
    }

    /// Gets the mean repeat content of unique margins.
    pub fn mean_margin_repeat_content(&self) -> f64 {
        self.mean_margin_repeat_content
    }

    /// Gets the mean number of distinct selected segments per viewpoint.
    pub fn mean_fragments_per_viewpoint(&self) -> f64 {
        self.mean_fragments_per_viewpoint
    }

    /// Gets the mean viewpoint score.
    pub fn mean_score(&self) -> f64 {
        self.mean_score
    }

    /// Gets the mean viewpoint size.
    pub fn mean_size(&self) -> f64 {
        self.mean_size
    }

    /// Gets the estimated number of probes.
    pub fn estimated_probes(&self) -> u64 {
        self.estimated_probes
    }

    /// Gets the total effective size (bases in unique margins times the
    /// tiling factor).
    pub fn total_effective_size(&self) -> u64 {
        self.margin_nucleotides * self.tiling_factor
    }
}

#[cfg(test)]
mod tests {
    use nonempty::NonEmpty;
    use omics::coordinate::Strand;

    use super::*;
    use crate::config;
    use crate::digest::Digester;
    use crate::enzyme::Enzyme;
    use crate::sequence::Memory;
    use crate::viewpoint::Builder;
    use crate::viewpoint::Strategy;
    use crate::viewpoint::Target;

    /// Builds viewpoints over two kilobases with DpnII sites every 200 bases.
    fn viewpoints(targets: &[Target], strategy: Strategy) -> Vec<ViewPoint> {
        let mut bases = b"ACGT".repeat(500);

        for start in (100..2000).step_by(200) {
            bases[start..start + 4].copy_from_slice(b"GATC");
        }

        let memory = [("chr1", bases)].into_iter().collect::<Memory>();
        let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC").unwrap()));
        let parameters = config::Builder::default()
            .upstream(300)
            .downstream(300)
            .margin_size(50)
            .try_build()
            .unwrap();

        let builder = Builder::new(&memory, &digester, &parameters);

        targets
            .iter()
            .map(|target| builder.build(target, strategy).unwrap())
            .collect()
    }

    #[test]
    fn test_shared_margins_are_counted_once() {
        let parameters = config::Builder::default()
            .probe_length(100)
            .tiling_factor(2)
            .try_build()
            .unwrap();

        // The center segment (1101 to 1300) and its margins are identical.
        let one = viewpoints(
            &[Target::new("chr1", 1200, Strand::Positive, "GENE")],
            Strategy::Simple,
        );
        let two = viewpoints(
            &[
                Target::new("chr1", 1200, Strand::Positive, "GENE"),
                Target::new("chr1", 1250, Strand::Positive, "GENE"),
            ],
            Strategy::Simple,
        );

        let one = Design::from_viewpoints(&one, &parameters);
        let two = Design::from_viewpoints(&two, &parameters);

        assert_eq!(one.margin_nucleotides(), 100);
        assert_eq!(two.margin_nucleotides(), 100);
        assert_eq!(two.unique_fragments(), 1);
        assert_eq!(two.viewpoints(), 2);
        assert_eq!(two.genes(), 1);
        assert_eq!(two.mean_fragments_per_viewpoint(), 0.5);
        assert_eq!(two.estimated_probes(), 2);
        assert_eq!(two.total_effective_size(), 200);
    }

    #[test]
    fn test_margins_of_different_targets_are_distinct() {
        let viewpoints = viewpoints(
            &[
                Target::new("chr1", 1200, Strand::Positive, "A"),
                Target::new("chr1", 1250, Strand::Positive, "B"),
            ],
            Strategy::Simple,
        );

        let margins = unique_margins(&viewpoints);
        assert_eq!(margins.len(), 4);
        assert_eq!(margins[0].start, 1101);
        assert_eq!(margins[1].end, 1300);
        assert_eq!(margins[2].target, "B");
    }

    #[test]
    fn test_resolution_counts() {
        let viewpoints = viewpoints(
            &[
                Target::new("chr1", 1200, Strand::Positive, "A"),
                // Too close to the chromosome start for a 146 bp center segment.
                Target::new("chr1", 50, Strand::Positive, "B"),
            ],
            Strategy::Simple,
        );

        let design = Design::from_viewpoints(&viewpoints, &Parameters::default());

        assert_eq!(design.viewpoints(), 2);
        assert_eq!(design.resolved_viewpoints(), 1);
        assert_eq!(design.genes(), 2);
        assert_eq!(design.resolved_genes(), 1);
        assert!(design.mean_score() > 0.0);
        assert_eq!(design.mean_size(), 100.0);
    }
}
