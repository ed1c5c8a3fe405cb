//! # Closed Vocabularies
//!
//! A fixed, case-sensitive table of wire strings and their variants.
//!
//! ## Invariants
//! - Parsing is exact: no trimming, no case folding, no fallback variant.
//! - Empty or absent input is an error, never a default variant.
//! - Every variant's wire string parses back to that variant.

use crate::error::UnknownVariantError;

#[derive(Debug)]
pub struct Vocabulary<T: 'static> {
    name: &'static str,
    entries: &'static [(&'static str, T)],
}

impl<T: Copy + PartialEq + 'static> Vocabulary<T> {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, T)]) -> Self {
        Self { name, entries }
    }

    /// The type name used in error messages.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn parse(&self, wire: &str) -> Result<T, UnknownVariantError> {
        if wire.is_empty() {
            return Err(UnknownVariantError::Empty { type_name: self.name });
        }
        self.entries
            .iter()
            .find(|(w, _)| *w == wire)
            .map(|(_, v)| *v)
            .ok_or_else(|| UnknownVariantError::Unknown { type_name: self.name, value: wire.to_string() })
    }

    pub fn wire_of(&self, variant: T) -> Option<&'static str> {
        self.entries.iter().find(|(_, v)| *v == variant).map(|(w, _)| *w)
    }

    pub fn variants(&self) -> impl Iterator<Item = T> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn wire_strings(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(w, _)| *w)
    }

    /// No empty wire strings, and no string or variant listed twice.
    pub fn is_well_formed(&self) -> bool {
        self.entries.iter().enumerate().all(|(i, (w, v))| {
            !w.is_empty() && self.entries[..i].iter().all(|(pw, pv)| pw != w && pv != v)
        })
    }
}

/// A closed set of variants with a fixed wire spelling each.
/// Declared with [`wire_enum!`](crate::wire_enum).
pub trait WireEnum: Copy + PartialEq + 'static {
    const VOCABULARY: Vocabulary<Self>;

    /// The type name used in error messages.
    const NAME: &'static str = Self::VOCABULARY.name();

    fn to_wire(self) -> &'static str;

    fn from_wire(wire: &str) -> Result<Self, UnknownVariantError> {
        Self::VOCABULARY.parse(wire)
    }

    /// Parses an optional wire value; absence is the same error as empty input.
    fn from_wire_opt(wire: Option<&str>) -> Result<Self, UnknownVariantError> {
        match wire {
            Some(wire) => Self::from_wire(wire),
            None => Err(UnknownVariantError::Empty { type_name: Self::NAME }),
        }
    }
}
