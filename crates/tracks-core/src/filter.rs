//! Atom-index membership predicate for importer and exporter front ends.
//!
//! Trajectory converters often let users restrict processing to a subset
//! of atoms, given on the command line as a comma-separated index list.
//! [`AtomFilter`] holds that configuration and answers one question: does
//! any of the atoms involved in a quantity belong to the selected set?
//!
//! The storage core itself never consults the filter; it is part of the
//! public API surface because the external collaborators around the core
//! share it.

use std::collections::BTreeSet;
use std::num::ParseIntError;
use std::str::FromStr;

use snafu::prelude::*;

/// Error from parsing a textual atom-filter specification.
#[derive(Debug, Snafu)]
pub enum FilterParseError {
    /// An entry of the comma-separated list is not a non-negative integer.
    #[snafu(display("Invalid atom index {word:?}: {source}"))]
    InvalidIndex {
        /// The offending entry, as written.
        word: String,
        /// Underlying integer parse error.
        source: ParseIntError,
    },
}

/// Tests whether some atoms belong to a user-defined set.
///
/// An unconfigured filter accepts everything; a configured one accepts a
/// group of atoms when the intersection with the configured set is
/// non-empty. Pure predicate: no mutation, no I/O.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtomFilter {
    atoms: Option<BTreeSet<usize>>,
}

impl AtomFilter {
    /// A filter that accepts every atom.
    pub fn accept_all() -> AtomFilter {
        AtomFilter { atoms: None }
    }

    /// A filter restricted to the given atom indexes.
    pub fn from_atoms<I: IntoIterator<Item = usize>>(atoms: I) -> AtomFilter {
        AtomFilter {
            atoms: Some(atoms.into_iter().collect()),
        }
    }

    /// Whether the filter is unconfigured and accepts everything.
    pub fn is_unrestricted(&self) -> bool {
        self.atoms.is_none()
    }

    /// Test whether one of `indexes` belongs to the configured set.
    ///
    /// Always true for an unconfigured filter.
    pub fn matches(&self, indexes: &[usize]) -> bool {
        match &self.atoms {
            None => true,
            Some(atoms) => indexes.iter().any(|index| atoms.contains(index)),
        }
    }
}

impl FromStr for AtomFilter {
    type Err = FilterParseError;

    /// Parse a comma-separated index list; the empty string means
    /// "accept everything". Whitespace around entries is tolerated.
    fn from_str(spec: &str) -> Result<AtomFilter, FilterParseError> {
        if spec.is_empty() {
            return Ok(AtomFilter::accept_all());
        }
        let mut atoms = BTreeSet::new();
        for word in spec.split(',') {
            let trimmed = word.trim();
            let index = trimmed.parse::<usize>().context(InvalidIndexSnafu {
                word: trimmed.to_string(),
            })?;
            atoms.insert(index);
        }
        Ok(AtomFilter { atoms: Some(atoms) })
    }
}
