//! Region Lookup
//! Fixed mapping from Chilean region codes to their Spanish names.

use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegionLookupError {
    #[error("Duplicate region code: {0}")]
    DuplicateCode(i64),
    #[error("Duplicate region name: {0}")]
    DuplicateName(&'static str),
}

/// Region code → name, ordered by code.
pub const REGIONS: [(i64, &str); 16] = [
    (1, "Tarapacá"),
    (2, "Antofagasta"),
    (3, "Atacama"),
    (4, "Coquimbo"),
    (5, "Valparaíso"),
    (6, "O'Higgins"),
    (7, "Maule"),
    (8, "Biobío"),
    (9, "La Araucanía"),
    (10, "Los Lagos"),
    (11, "Aysén"),
    (12, "Magallanes"),
    (13, "Metropolitana"),
    (14, "Los Ríos"),
    (15, "Arica y Parinacota"),
    (16, "Ñuble"),
];

/// Name for a region code, `None` when the code has no entry.
pub fn region_name(code: i64) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Reverse lookup: code for an exact region name.
pub fn region_code(name: &str) -> Option<i64> {
    REGIONS
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(code, _)| *code)
}

/// Region names in code order (for pickers).
pub fn region_names() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(_, name)| *name)
}

/// Check that codes and names are both unique. Run once at startup.
pub fn validate() -> Result<(), RegionLookupError> {
    let mut codes = HashSet::new();
    let mut names = HashSet::new();

    for (code, name) in REGIONS {
        if !codes.insert(code) {
            return Err(RegionLookupError::DuplicateCode(code));
        }
        if !names.insert(name) {
            return Err(RegionLookupError::DuplicateName(name));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_from_1_to_16_is_defined() {
        for code in 1..=16 {
            assert!(region_name(code).is_some(), "missing region {code}");
        }
    }

    #[test]
    fn codes_outside_lookup_are_absent() {
        assert_eq!(region_name(0), None);
        assert_eq!(region_name(17), None);
        assert_eq!(region_name(99), None);
        assert_eq!(region_name(-5), None);
    }

    #[test]
    fn lookup_is_unique() {
        assert_eq!(validate(), Ok(()));
        let names: HashSet<_> = region_names().collect();
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn reverse_lookup_matches_forward() {
        for (code, name) in REGIONS {
            assert_eq!(region_code(name), Some(code));
        }
        assert_eq!(region_code("Valparaíso"), Some(5));
        assert_eq!(region_code("Metropolitana"), Some(13));
        assert_eq!(region_code("valparaíso"), None);
        assert_eq!(region_code("Atlántida"), None);
    }
}
