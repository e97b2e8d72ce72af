//! Restriction enzymes.
//!
//! A restriction enzyme is described by its name and its recognition site. The
//! site may carry a single `^` marking where the enzyme cuts (e.g., `^GATC`
//! for DpnII or `A^AGCTT` for HindIII); without a marker the cut falls before
//! the first base of the site. IUPAC ambiguity codes are allowed in the site.

use std::str::FromStr;

use regex::bytes::Regex;
use regex::bytes::RegexBuilder;

pub mod registry;

pub use registry::Registry;

/// The character marking the cut position within a recognition site.
pub const CUT_MARKER: char = '^';

/// The delimiter between the name and the site in a textual enzyme line.
const DELIMITER: char = '\t';

/// An error related to parsing an [`Enzyme`].
#[derive(Debug)]
pub enum ParseError {
    /// The enzyme line does not have a name and a site.
    MissingSite,

    /// The recognition site is empty.
    EmptySite,

    /// The recognition site has more than one cut marker.
    MultipleCutMarkers(String),

    /// The recognition site contains a character that is not an IUPAC code.
    InvalidBase(char),

    /// The recognition site could not be compiled into a pattern.
    InvalidPattern(regex::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingSite => write!(f, "missing recognition site"),
            ParseError::EmptySite => write!(f, "empty recognition site"),
            ParseError::MultipleCutMarkers(site) => {
                write!(f, "more than one cut marker in site: {site}")
            }
            ParseError::InvalidBase(c) => write!(f, "invalid base in site: {c}"),
            ParseError::InvalidPattern(err) => write!(f, "invalid pattern: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// An error related to selecting enzymes.
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(std::io::Error),

    /// An enzyme could not be parsed.
    Parse(ParseError),

    /// An enzyme name that is not known.
    Unknown(String),

    /// No enzymes were requested.
    NoneSelected,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Parse(err) => write!(f, "parse error: {err}"),
            Error::Unknown(name) => write!(f, "unknown restriction enzyme: {name}"),
            Error::NoneSelected => write!(f, "no restriction enzymes selected"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A restriction enzyme.
#[derive(Clone, Debug)]
pub struct Enzyme {
    /// The name.
    name: String,

    /// The recognition site as given, including any cut marker.
    site: String,

    /// The recognition site without the cut marker.
    plain_site: String,

    /// The number of bases of the site before the cut.
    offset: usize,

    /// The compiled, case-insensitive site.
    pattern: Regex,
}

impl Enzyme {
    /// Creates a new enzyme.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::enzyme::Enzyme;
    ///
    /// let enzyme = Enzyme::try_new("HindIII", "A^AGCTT")?;
    ///
    /// assert_eq!(enzyme.name(), "HindIII");
    /// assert_eq!(enzyme.site(), "A^AGCTT");
    /// assert_eq!(enzyme.plain_site(), "AAGCTT");
    /// assert_eq!(enzyme.offset(), 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(
        name: impl Into<String>,
        site: impl Into<String>,
    ) -> std::result::Result<Self, ParseError> {
        let site = site.into();

        let mut markers = site.match_indices(CUT_MARKER);
        let offset = match (markers.next(), markers.next()) {
            (None, _) => 0,
            (Some((i, _)), None) => i,
            (Some(_), Some(_)) => return Err(ParseError::MultipleCutMarkers(site)),
        };

        let plain_site = site.replace(CUT_MARKER, "").to_ascii_uppercase();

        if plain_site.is_empty() {
            return Err(ParseError::EmptySite);
        }

        let mut pattern = String::with_capacity(plain_site.len() * 4);

        for c in plain_site.chars() {
            pattern.push_str(iupac_class(c).ok_or(ParseError::InvalidBase(c))?);
        }

        let pattern = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .unicode(false)
            .build()
            .map_err(ParseError::InvalidPattern)?;

        Ok(Self {
            name: name.into(),
            site,
            plain_site,
            offset,
            pattern,
        })
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the recognition site as given, including any cut marker.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Gets the recognition site without the cut marker.
    pub fn plain_site(&self) -> &str {
        &self.plain_site
    }

    /// Gets the number of bases of the site that precede the cut.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Gets the 0-based start of every occurrence of the site in `bases`,
    /// including occurrences that overlap each other.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::enzyme::Enzyme;
    ///
    /// let enzyme = Enzyme::try_new("CviAII", "C^ATG")?;
    /// let starts = enzyme.match_starts(b"ccatgCATGATG").collect::<Vec<_>>();
    ///
    /// assert_eq!(starts, vec![1, 5]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn match_starts<'a>(&'a self, bases: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        let mut from = 0;

        std::iter::from_fn(move || {
            if from > bases.len() {
                return None;
            }

            let m = self.pattern.find_at(bases, from)?;
            from = m.start() + 1;
            Some(m.start())
        })
    }
}

impl PartialEq for Enzyme {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.site == other.site
    }
}

impl Eq for Enzyme {}

impl std::fmt::Display for Enzyme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.site)
    }
}

impl FromStr for Enzyme {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut fields = s.split(DELIMITER).map(str::trim);

        match (fields.next(), fields.next()) {
            (Some(name), Some(site)) if !name.is_empty() => Self::try_new(name, site),
            _ => Err(ParseError::MissingSite),
        }
    }
}

/// Gets the regular expression class matching an IUPAC nucleotide code.
fn iupac_class(code: char) -> Option<&'static str> {
    let class = match code {
        'A' => "A",
        'C' => "C",
        'G' => "G",
        'T' => "T",
        'R' => "[AG]",
        'Y' => "[CT]",
        'W' => "[AT]",
        'S' => "[CG]",
        'M' => "[AC]",
        'K' => "[GT]",
        'B' => "[CGT]",
        'D' => "[AGT]",
        'H' => "[ACT]",
        'V' => "[ACG]",
        'N' => "[ACGT]",
        _ => return None,
    };

    Some(class)
}
