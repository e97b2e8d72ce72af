//! Building viewpoints for many targets.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use rayon::prelude::*;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::sequence::SequenceAccessor;
use crate::viewpoint::builder;
use crate::viewpoint::Builder;
use crate::viewpoint::Strategy;
use crate::viewpoint::Target;
use crate::viewpoint::ViewPoint;

/// The failure to build the viewpoint of a single target.
#[derive(Debug)]
pub struct Failure {
    /// The target.
    pub target: Target,

    /// The underlying error.
    pub error: builder::Error,
}

/// The result of a batch run.
#[derive(Debug, Default)]
pub struct Batch {
    /// The viewpoints that were built, in the order of their targets.
    pub viewpoints: Vec<ViewPoint>,

    /// The targets whose viewpoints could not be built.
    pub failures: Vec<Failure>,

    /// Whether the run was cancelled before every target was processed.
    pub cancelled: bool,
}

/// Builds the viewpoint of every target in parallel.
///
/// A target whose viewpoint cannot be built is reported as a [`Failure`]
/// without affecting the others. Once `cancel` is set, targets that have not
/// started are skipped; viewpoints that were already built are kept.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::AtomicBool;
///
/// use nonempty::NonEmpty;
/// use omics::coordinate::Strand;
/// use vpdesign::batch;
/// use vpdesign::config;
/// use vpdesign::digest::Digester;
/// use vpdesign::enzyme::Enzyme;
/// use vpdesign::sequence::Memory;
/// use vpdesign::viewpoint::Builder;
/// use vpdesign::viewpoint::Strategy;
/// use vpdesign::viewpoint::Target;
///
/// let memory = [("chr1", b"ACGT".repeat(100))].into_iter().collect::<Memory>();
/// let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC")?));
/// let parameters = config::Builder::default().try_build()?;
/// let builder = Builder::new(&memory, &digester, &parameters);
///
/// let targets = vec![
///     Target::new("chr1", 200, Strand::Positive, "A"),
///     Target::new("chr2", 200, Strand::Positive, "B"),
/// ];
///
/// let batch = batch::run(&builder, &targets, Strategy::Extended, &AtomicBool::new(false));
///
/// assert_eq!(batch.viewpoints.len(), 1);
/// assert_eq!(batch.failures.len(), 1);
/// assert!(!batch.cancelled);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run<S>(
    builder: &Builder<'_, S>,
    targets: &[Target],
    strategy: Strategy,
    cancel: &AtomicBool,
) -> Batch
where
    S: SequenceAccessor + ?Sized,
{
    let total = targets.len();
    let done = AtomicUsize::new(0);

    info!("building {total} viewpoint(s) with the {strategy} strategy");

    let results = targets
        .par_iter()
        .map(|target| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }

            let result = builder.build(target, strategy);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("built viewpoint {n}/{total} ({})", target.name());

            Some(result)
        })
        .collect::<Vec<_>>();

    let mut batch = Batch::default();

    for (target, result) in targets.iter().zip(results) {
        match result {
            Some(Ok(viewpoint)) => batch.viewpoints.push(viewpoint),
            Some(Err(error)) => {
                warn!(
                    "skipping {} at {}:{}: {error}",
                    target.name(),
                    target.chromosome(),
                    target.position()
                );
                batch.failures.push(Failure {
                    target: target.clone(),
                    error,
                });
            }
            None => batch.cancelled = true,
        }
    }

    if batch.cancelled {
        warn!(
            "cancelled after {} of {total} viewpoint(s)",
            done.load(Ordering::Relaxed)
        );
    }

    info!(
        "built {} viewpoint(s), {} failure(s)",
        batch.viewpoints.len(),
        batch.failures.len()
    );

    batch
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

    fn memory() -> Memory {
        let mut bases = b"ACGT".repeat(1000);

        for start in (100..4000).step_by(300) {
            bases[start..start + 4].copy_from_slice(b"GATC");
        }

        [("chr1", bases.clone()), ("chr2", bases)].into_iter().collect()
    }

    fn targets() -> Vec<Target> {
        (1..=30)
            .map(|i| {
                let chromosome = match i % 3 {
                    0 => "chrUn",
                    1 => "chr1",
                    _ => "chr2",
                };

                Target::new(chromosome, i * 120, Strand::Positive, format!("GENE{i}"))
            })
            .collect()
    }

    #[test]
    fn test_order_is_preserved() -> Result<(), Box<dyn std::error::Error>> {
        let memory = memory();
        let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC")?));
        let parameters = config::Builder::default()
            .upstream(1000)
            .downstream(1000)
            .margin_size(50)
            .try_build()?;
        let builder = Builder::new(&memory, &digester, &parameters);
        let targets = targets();

        let batch = run(&builder, &targets, Strategy::Simple, &AtomicBool::new(false));

        let built = batch
            .viewpoints
            .iter()
            .map(|v| v.target().name().to_string())
            .collect::<Vec<_>>();
        let expected = targets
            .iter()
            .filter(|t| t.chromosome() != "chrUn")
            .map(|t| t.name().to_string())
            .collect::<Vec<_>>();

        assert_eq!(built, expected);
        assert_eq!(batch.failures.len(), 10);
        assert!(batch.failures.iter().all(|f| f.target.chromosome() == "chrUn"));
        assert!(!batch.cancelled);

        Ok(())
    }

    #[test]
    fn test_cancelled() -> Result<(), Box<dyn std::error::Error>> {
        let memory = memory();
        let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC")?));
        let parameters = config::Builder::default().try_build()?;
        let builder = Builder::new(&memory, &digester, &parameters);

        let batch = run(&builder, &targets(), Strategy::Extended, &AtomicBool::new(true));

        assert!(batch.cancelled);
        assert!(batch.viewpoints.is_empty());
        assert!(batch.failures.is_empty());

        Ok(())
    }
}
