//! Design parameters.
//!
//! All tunable values of a design live in one immutable [`Parameters`] object
//! that is handed to the components that need it. Parameters are built
//! through a [`Builder`], which starts from the defaults below and validates
//! the result.
//!
//! | Parameter                        | Default        |
//! | -------------------------------- | -------------- |
//! | search window (up/down)          | 5,000 / 5,000  |
//! | margin size                      | 250            |
//! | maximum distance (up/down)       | 5,000 / 5,000  |
//! | minimum fragment size            | 130            |
//! | maximum repeat content           | 0.6            |
//! | fragment GC content              | 0.25 to 0.65   |
//! | bait length                      | 120            |
//! | baits per margin (min/max)       | 1 / 3          |
//! | bait GC content                  | 0.25 to 0.65   |
//! | maximum bait alignability score  | 10             |
//! | probe length                     | 120            |
//! | tiling factor                    | 2              |

/// The default number of bases searched upstream of a target.
pub const DEFAULT_UPSTREAM: u64 = 5_000;

/// The default number of bases searched downstream of a target.
pub const DEFAULT_DOWNSTREAM: u64 = 5_000;

/// The default margin size.
pub const DEFAULT_MARGIN_SIZE: u64 = 250;

/// The default maximum distance of a selected fragment's start upstream of a
/// target.
pub const DEFAULT_MAX_DISTANCE_UPSTREAM: u64 = 5_000;

/// The default maximum distance of a selected fragment's end downstream of a
/// target.
pub const DEFAULT_MAX_DISTANCE_DOWNSTREAM: u64 = 5_000;

/// The default minimum fragment size.
pub const DEFAULT_MIN_FRAGMENT_SIZE: u64 = 130;

/// The default maximum repeat content of either margin.
pub const DEFAULT_MAX_REPEAT_CONTENT: f64 = 0.6;

/// The default minimum GC content.
pub const DEFAULT_MIN_GC_CONTENT: f64 = 0.25;

/// The default maximum GC content.
pub const DEFAULT_MAX_GC_CONTENT: f64 = 0.65;

/// The default bait length.
pub const DEFAULT_BAIT_LENGTH: u64 = 120;

/// The default minimum number of baits per margin.
pub const DEFAULT_MIN_BAITS: usize = 1;

/// The default maximum number of baits per margin.
pub const DEFAULT_MAX_BAITS: usize = 3;

/// The default maximum mean alignability score of a bait.
pub const DEFAULT_MAX_ALIGNABILITY: f64 = 10.0;

/// The default probe length.
pub const DEFAULT_PROBE_LENGTH: u64 = 120;

/// The default tiling factor.
pub const DEFAULT_TILING_FACTOR: u64 = 2;

/// An error related to building [`Parameters`].
#[derive(Debug, PartialEq)]
pub enum Error {
    /// A fraction outside of `[0, 1]`.
    FractionOutOfRange {
        /// The name of the parameter.
        name: &'static str,

        /// The value.
        value: f64,
    },

    /// A minimum that is larger than its maximum.
    InvertedBounds {
        /// The name of the parameter.
        name: &'static str,

        /// The minimum.
        min: f64,

        /// The maximum.
        max: f64,
    },

    /// A value that must not be zero.
    Zero(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::FractionOutOfRange { name, value } => {
                write!(f, "{name} must be within [0, 1], found {value}")
            }
            Error::InvertedBounds { name, min, max } => {
                write!(f, "minimum {name} ({min}) exceeds maximum {name} ({max})")
            }
            Error::Zero(name) => write!(f, "{name} must not be zero"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Parameters for placing baits within fragment margins.
#[derive(Clone, Debug, PartialEq)]
pub struct BaitParameters {
    /// The bait length.
    length: u64,

    /// The number of baits a margin needs to be satisfied.
    min_per_margin: usize,

    /// The number of baits after which a margin is not scanned further.
    max_per_margin: usize,

    /// The minimum GC content.
    min_gc_content: f64,

    /// The maximum GC content.
    max_gc_content: f64,

    /// The maximum mean alignability score.
    max_alignability: f64,
}

impl BaitParameters {
    /// Gets the bait length.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Gets the number of baits a margin needs to be satisfied.
    pub fn min_per_margin(&self) -> usize {
        self.min_per_margin
    }

    /// Gets the number of baits after which a margin is not scanned further.
    pub fn max_per_margin(&self) -> usize {
        self.max_per_margin
    }

    /// Gets the minimum GC content.
    pub fn min_gc_content(&self) -> f64 {
        self.min_gc_content
    }

    /// Gets the maximum GC content.
    pub fn max_gc_content(&self) -> f64 {
        self.max_gc_content
    }

    /// Gets the maximum mean alignability score.
    pub fn max_alignability(&self) -> f64 {
        self.max_alignability
    }
}

impl Default for BaitParameters {
    fn default() -> Self {
        Self {
            length: DEFAULT_BAIT_LENGTH,
            min_per_margin: DEFAULT_MIN_BAITS,
            max_per_margin: DEFAULT_MAX_BAITS,
            min_gc_content: DEFAULT_MIN_GC_CONTENT,
            max_gc_content: DEFAULT_MAX_GC_CONTENT,
            max_alignability: DEFAULT_MAX_ALIGNABILITY,
        }
    }
}

/// The parameters of a design.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    /// The number of bases searched upstream of a target.
    upstream: u64,

    /// The number of bases searched downstream of a target.
    downstream: u64,

    /// The margin size.
    margin_size: u64,

    /// The maximum distance of a selected fragment's start upstream of a
    /// target.
    max_distance_upstream: u64,

    /// The maximum distance of a selected fragment's end downstream of a
    /// target.
    max_distance_downstream: u64,

    /// The minimum fragment size.
    min_fragment_size: u64,

    /// The maximum repeat content of either margin.
    max_repeat_content: f64,

    /// The minimum GC content.
    min_gc_content: f64,

    /// The maximum GC content.
    max_gc_content: f64,

    /// The bait parameters, if baits are placed.
    baits: Option<BaitParameters>,

    /// The probe length.
    probe_length: u64,

    /// The tiling factor.
    tiling_factor: u64,
}

impl Parameters {
    /// Gets the number of bases searched upstream of a target.
    pub fn upstream(&self) -> u64 {
        self.upstream
    }

    /// Gets the number of bases searched downstream of a target.
    pub fn downstream(&self) -> u64 {
        self.downstream
    }

    /// Gets the margin size.
    pub fn margin_size(&self) -> u64 {
        self.margin_size
    }

    /// Gets the maximum distance of a selected fragment's start upstream of a
    /// target.
    pub fn max_distance_upstream(&self) -> u64 {
        self.max_distance_upstream
    }

    /// Gets the maximum distance of a selected fragment's end downstream of a
    /// target.
    pub fn max_distance_downstream(&self) -> u64 {
        self.max_distance_downstream
    }

    /// Gets the minimum fragment size.
    pub fn min_fragment_size(&self) -> u64 {
        self.min_fragment_size
    }

    /// Gets the maximum repeat content of either margin.
    pub fn max_repeat_content(&self) -> f64 {
        self.max_repeat_content
    }

    /// Gets the minimum GC content.
    pub fn min_gc_content(&self) -> f64 {
        self.min_gc_content
    }

    /// Gets the maximum GC content.
    pub fn max_gc_content(&self) -> f64 {
        self.max_gc_content
    }

    /// Gets the bait parameters, if baits are placed.
    pub fn baits(&self) -> Option<&BaitParameters> {
        self.baits.as_ref()
    }

    /// Gets the probe length.
    pub fn probe_length(&self) -> u64 {
        self.probe_length
    }

    /// Gets the tiling factor.
    pub fn tiling_factor(&self) -> u64 {
        self.tiling_factor
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            upstream: DEFAULT_UPSTREAM,
            downstream: DEFAULT_DOWNSTREAM,
            margin_size: DEFAULT_MARGIN_SIZE,
            max_distance_upstream: DEFAULT_MAX_DISTANCE_UPSTREAM,
            max_distance_downstream: DEFAULT_MAX_DISTANCE_DOWNSTREAM,
            min_fragment_size: DEFAULT_MIN_FRAGMENT_SIZE,
            max_repeat_content: DEFAULT_MAX_REPEAT_CONTENT,
            min_gc_content: DEFAULT_MIN_GC_CONTENT,
            max_gc_content: DEFAULT_MAX_GC_CONTENT,
            baits: Some(BaitParameters::default()),
            probe_length: DEFAULT_PROBE_LENGTH,
            tiling_factor: DEFAULT_TILING_FACTOR,
        }
    }
}

/// A builder for [`Parameters`].
#[derive(Clone, Debug, Default)]
pub struct Builder {
    /// The parameters being built.
    inner: Parameters,
}

impl Builder {
    /// Sets the number of bases searched upstream of a target.
    pub fn upstream(mut self, value: u64) -> Self {
        self.inner.upstream = value;
        self
    }

    /// Sets the number of bases searched downstream of a target.
    pub fn downstream(mut self, value: u64) -> Self {
        self.inner.downstream = value;
        self
    }

    /// Sets the margin size.
    pub fn margin_size(mut self, value: u64) -> Self {
        self.inner.margin_size = value;
        self
    }

    /// Sets the maximum distance of a selected fragment's start upstream of a
    /// target.
    pub fn max_distance_upstream(mut self, value: u64) -> Self {
        self.inner.max_distance_upstream = value;
        self
    }

    /// Sets the maximum distance of a selected fragment's end downstream of a
    /// target.
    pub fn max_distance_downstream(mut self, value: u64) -> Self {
        self.inner.max_distance_downstream = value;
        self
    }

    /// Sets the minimum fragment size.
    pub fn min_fragment_size(mut self, value: u64) -> Self {
        self.inner.min_fragment_size = value;
        self
    }

    /// Sets the maximum repeat content of either margin.
    pub fn max_repeat_content(mut self, value: f64) -> Self {
        self.inner.max_repeat_content = value;
        self
    }

    /// Sets the allowed GC content of a fragment.
    pub fn gc_content(mut self, min: f64, max: f64) -> Self {
        self.inner.min_gc_content = min;
        self.inner.max_gc_content = max;
        self
    }

    /// Sets the bait length.
    pub fn bait_length(mut self, value: u64) -> Self {
        self.bait_parameters().length = value;
        self
    }

    /// Sets the minimum and maximum number of baits per margin.
    pub fn baits_per_margin(mut self, min: usize, max: usize) -> Self {
        let baits = self.bait_parameters();
        baits.min_per_margin = min;
        baits.max_per_margin = max;
        self
    }

    /// Sets the allowed GC content of a bait.
    pub fn bait_gc_content(mut self, min: f64, max: f64) -> Self {
        let baits = self.bait_parameters();
        baits.min_gc_content = min;
        baits.max_gc_content = max;
        self
    }

    /// Sets the maximum mean alignability score of a bait.
    pub fn max_bait_alignability(mut self, value: f64) -> Self {
        self.bait_parameters().max_alignability = value;
        self
    }

    /// Disables bait placement.
    pub fn without_baits(mut self) -> Self {
        self.inner.baits = None;
        self
    }

    /// Sets the probe length.
    pub fn probe_length(mut self, value: u64) -> Self {
        self.inner.probe_length = value;
        self
    }

    /// Sets the tiling factor.
    pub fn tiling_factor(mut self, value: u64) -> Self {
        self.inner.tiling_factor = value;
        self
    }

    /// Gets the bait parameters, enabling bait placement if needed.
    fn bait_parameters(&mut self) -> &mut BaitParameters {
        self.inner.baits.get_or_insert_with(BaitParameters::default)
    }

    /// Validates and builds the [`Parameters`].
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::config::Builder;
    ///
    /// let parameters = Builder::default()
    ///     .upstream(10_000)
    ///     .min_fragment_size(150)
    ///     .without_baits()
    ///     .try_build()?;
    ///
    /// assert_eq!(parameters.upstream(), 10_000);
    /// assert_eq!(parameters.downstream(), 5_000);
    /// assert!(parameters.baits().is_none());
    ///
    /// let err = Builder::default().gc_content(0.7, 0.3).try_build().unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "minimum GC content (0.7) exceeds maximum GC content (0.3)"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build(self) -> Result<Parameters> {
        let p = self.inner;

        check_fraction("repeat content", p.max_repeat_content)?;
        check_window("GC content", p.min_gc_content, p.max_gc_content)?;
        check_nonzero("margin size", p.margin_size)?;
        check_nonzero("probe length", p.probe_length)?;
        check_nonzero("tiling factor", p.tiling_factor)?;

        if let Some(baits) = &p.baits {
            check_nonzero("bait length", baits.length)?;
            check_window("bait GC content", baits.min_gc_content, baits.max_gc_content)?;

            if baits.min_per_margin > baits.max_per_margin {
                return Err(Error::InvertedBounds {
                    name: "baits per margin",
                    min: baits.min_per_margin as f64,
                    max: baits.max_per_margin as f64,
                });
            }
        }

        Ok(p)
    }
}

/// Ensures that a value lies within `[0, 1]`.
fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::FractionOutOfRange { name, value });
    }

    Ok(())
}

/// Ensures that `min..=max` is a window of fractions.
fn check_window(name: &'static str, min: f64, max: f64) -> Result<()> {
    check_fraction(name, min)?;
    check_fraction(name, max)?;

    if min > max {
        return Err(Error::InvertedBounds { name, min, max });
    }

    Ok(())
}

/// Ensures that a value is not zero.
fn check_nonzero(name: &'static str, value: u64) -> Result<()> {
    match value {
        0 => Err(Error::Zero(name)),
        _ => Ok(()),
    }
}
