//! A registry of known restriction enzymes.

use std::io::BufRead;

use nonempty::NonEmpty;

use crate::enzyme::Enzyme;
use crate::enzyme::Error;
use crate::enzyme::Result;
use crate::reader;

/// The enzymes known without any configuration.
const BUILTIN: &[(&str, &str)] = &[
    ("DpnII", "^GATC"),
    ("MboI", "^GATC"),
    ("Sau3AI", "^GATC"),
    ("NlaIII", "CATG^"),
    ("CviAII", "C^ATG"),
    ("Csp6I", "G^TAC"),
    ("CviQI", "G^TAC"),
    ("MseI", "T^TAA"),
    ("DdeI", "C^TNAG"),
    ("HinfI", "G^ANTC"),
    ("MluCI", "^AATT"),
    ("HindIII", "A^AGCTT"),
    ("EcoRI", "G^AATTC"),
    ("BglII", "A^GATCT"),
    ("NcoI", "C^CATGG"),
    ("BamHI", "G^GATCC"),
];

/// A set of restriction enzymes that can be looked up by name.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    /// The enzymes in registration order.
    enzymes: Vec<Enzyme>,
}

impl Registry {
    /// Gets a registry holding the commonly used Capture Hi-C enzymes.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::enzyme::Registry;
    ///
    /// let registry = Registry::builtin();
    /// let enzyme = registry.get("dpnii").unwrap();
    ///
    /// assert_eq!(enzyme.site(), "^GATC");
    /// ```
    pub fn builtin() -> Self {
        let enzymes = BUILTIN
            .iter()
            .filter_map(|(name, site)| Enzyme::try_new(*name, *site).ok())
            .collect();

        Self { enzymes }
    }

    /// Reads a registry from `name<TAB>site` lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::enzyme::Registry;
    ///
    /// let data = b"# name\tsite\nHindIII\tA^AGCTT\nDpnII\t^GATC\n";
    /// let registry = Registry::try_from_reader(vpdesign::Reader::new(&data[..]))?;
    ///
    /// assert_eq!(registry.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_reader<T>(mut reader: reader::Reader<T>) -> Result<Self>
    where
        T: BufRead,
    {
        let mut registry = Self::default();

        for result in reader.records::<Enzyme>() {
            match result {
                Ok(enzyme) => registry.insert(enzyme),
                Err(reader::Error::Parse { err, .. }) => return Err(Error::Parse(err)),
                Err(reader::Error::Io(err)) => return Err(Error::Io(err)),
            }
        }

        Ok(registry)
    }

    /// Adds an enzyme, replacing any enzyme of the same (case-insensitive)
    /// name.
    pub fn insert(&mut self, enzyme: Enzyme) {
        match self
            .enzymes
            .iter_mut()
            .find(|e| e.name().eq_ignore_ascii_case(enzyme.name()))
        {
            Some(existing) => *existing = enzyme,
            None => self.enzymes.push(enzyme),
        }
    }

    /// Looks up an enzyme by its case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&Enzyme> {
        self.enzymes
            .iter()
            .find(|enzyme| enzyme.name().eq_ignore_ascii_case(name))
    }

    /// Gets the registered enzymes.
    pub fn enzymes(&self) -> &[Enzyme] {
        &self.enzymes
    }

    /// Gets the number of registered enzymes.
    pub fn len(&self) -> usize {
        self.enzymes.len()
    }

    /// Returns whether no enzymes are registered.
    pub fn is_empty(&self) -> bool {
        self.enzymes.is_empty()
    }

    /// Resolves a list of enzyme names into enzymes.
    ///
    /// Any unknown name fails the whole resolution; there is no meaningful
    /// digest with only part of the requested enzymes.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::enzyme::Registry;
    ///
    /// let registry = Registry::builtin();
    ///
    /// let enzymes = registry.resolve(["DpnII", "NlaIII"])?;
    /// assert_eq!(enzymes.len(), 2);
    ///
    /// let err = registry.resolve(["FooI"]).unwrap_err();
    /// assert_eq!(err.to_string(), "unknown restriction enzyme: FooI");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn resolve<I, S>(&self, names: I) -> Result<NonEmpty<Enzyme>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let enzymes = names
            .into_iter()
            .map(|name| {
                self.get(name.as_ref())
                    .cloned()
                    .ok_or_else(|| Error::Unknown(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        NonEmpty::from_vec(enzymes).ok_or(Error::NoneSelected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_enzymes_all_parse() {
        assert_eq!(Registry::builtin().len(), BUILTIN.len());
    }

    #[test]
    fn test_resolve_requires_a_name() {
        let err = Registry::builtin()
            .resolve(Vec::<String>::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "no restriction enzymes selected");
    }

    #[test]
    fn test_insert_replaces_by_name() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut registry = Registry::builtin();
        registry.insert(Enzyme::try_new("hindiii", "AAGCTT")?);

        assert_eq!(registry.len(), BUILTIN.len());
        assert_eq!(registry.get("HindIII").map(|e| e.offset()), Some(0));

        Ok(())
    }

    #[test]
    fn test_parse_error_is_reported() {
        let data = b"DpnII\t^GA^TC\n";
        let err = Registry::try_from_reader(reader::Reader::new(&data[..])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error: more than one cut marker in site: ^GA^TC"
        );
    }
}
