//! BED export of designs.
//!
//! BED coordinates are 0-based and half-open, so every 1-based, closed
//! range `start..=end` is written as `start - 1` and `end`.

use std::io;
use std::io::Write;

use crate::design::unique_margins;
use crate::viewpoint::ViewPoint;

/// Writes a single BED line.
fn write_line<W>(
    writer: &mut W,
    chromosome: &str,
    start: u64,
    end: u64,
    name: &str,
) -> io::Result<()>
where
    W: Write,
{
    writeln!(writer, "{chromosome}\t{}\t{end}\t{name}", start - 1)
}

/// Writes one line per selected segment of every viewpoint.
///
/// # Examples
///
/// ```
/// use vpdesign::export::write_fragments;
///
/// let mut buffer = Vec::new();
/// write_fragments(&mut buffer, &[])?;
/// assert!(buffer.is_empty());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_fragments<W>(writer: &mut W, viewpoints: &[ViewPoint]) -> io::Result<()>
where
    W: Write,
{
    for viewpoint in viewpoints {
        for segment in viewpoint.selected_segments() {
            let name = format!(
                "{}_{}:{}-{}",
                viewpoint.target().name(),
                segment.chromosome(),
                segment.start(),
                segment.end()
            );

            write_line(writer, segment.chromosome(), segment.start(), segment.end(), &name)?;
        }
    }

    Ok(())
}

/// Writes one line per unique margin of the selected segments.
pub fn write_margins<W>(writer: &mut W, viewpoints: &[ViewPoint]) -> io::Result<()>
where
    W: Write,
{
    for margin in unique_margins(viewpoints) {
        let name = format!("{}_margin_{}", margin.target, margin.index);
        write_line(writer, margin.chromosome, margin.start, margin.end, &name)?;
    }

    Ok(())
}

/// Writes one line per bait placed in the selected segments.
pub fn write_baits<W>(writer: &mut W, viewpoints: &[ViewPoint]) -> io::Result<()>
where
    W: Write,
{
    for viewpoint in viewpoints {
        let baits = viewpoint
            .selected_segments()
            .filter_map(|segment| segment.baits().map(|baits| (segment, baits)))
            .flat_map(|(segment, baits)| baits.iter().map(move |bait| (segment, bait)));

        for (i, (segment, bait)) in baits.enumerate() {
            let name = format!("{}_bait_{}", viewpoint.target().name(), i + 1);
            write_line(writer, segment.chromosome(), bait.start(), bait.end(), &name)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use nonempty::NonEmpty;
    use omics::coordinate::Strand;

    use super::*;
    use crate::alignability;
    use crate::config;
    use crate::digest::Digester;
    use crate::enzyme::Enzyme;
    use crate::reader::Reader;
    use crate::sequence::Memory;
    use crate::viewpoint::Builder;
    use crate::viewpoint::Strategy;
    use crate::viewpoint::Target;

    fn viewpoints() -> Vec<ViewPoint> {
        let mut bases = b"ACGT".repeat(500);

        for start in [700, 900, 1100, 1300] {
            bases[start..start + 4].copy_from_slice(b"GATC");
        }

        let memory = [("chr1", bases)].into_iter().collect::<Memory>();
        let digester = Digester::new(NonEmpty::new(Enzyme::try_new("DpnII", "^GATC").unwrap()));
        let parameters = config::Builder::default()
            .upstream(500)
            .downstream(500)
            .margin_size(50)
            .bait_length(20)
            .baits_per_margin(1, 1)
            .try_build()
            .unwrap();

        let sizes = b"chr1\t2000\n";
        let track = b"chr1\t0\t2000\t1\n";
        let index = alignability::Builder::default()
            .try_build_from(Reader::new(&sizes[..]), Reader::new(&track[..]))
            .unwrap();

        let builder = Builder::new(&memory, &digester, &parameters).alignability(&index);
        let target = Target::new("chr1", 1000, Strand::Positive, "GENE");

        vec![builder.build(&target, Strategy::Simple).unwrap()]
    }

    #[test]
    fn test_write_fragments() -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        write_fragments(&mut buffer, &viewpoints())?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "chr1\t900\t1100\tGENE_chr1:901-1100\n"
        );

        Ok(())
    }

    #[test]
    fn test_write_margins() -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        write_margins(&mut buffer, &viewpoints())?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "chr1\t900\t950\tGENE_margin_0\nchr1\t1050\t1100\tGENE_margin_1\n"
        );

        Ok(())
    }

    #[test]
    fn test_write_baits() -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        write_baits(&mut buffer, &viewpoints())?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "chr1\t900\t920\tGENE_bait_1\nchr1\t1080\t1100\tGENE_bait_2\n"
        );

        Ok(())
    }
}
