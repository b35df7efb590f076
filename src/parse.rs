//! Predicate citation scanning
//!
//! Clearance documents cite their predicates inline in running text, and
//! recognized text frequently fragments a number across spaces and line
//! breaks ("K 08\n1113"). The scan therefore strips all whitespace from each
//! page before matching. Results are persisted one number per line, sorted,
//! in the same syntax the parser accepts, so a later run (or a merge of two
//! data directories) reads them back verbatim.

use crate::approval::ApprovalId;
use crate::store::StorageLayout;
use std::collections::BTreeSet;
use tracing::warn;

/// Scans page text for predicate citations and caches the result per number.
pub struct PredicateParser {
    layout: StorageLayout,
}

impl PredicateParser {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// The persisted predicate set for `id`, if one exists.
    pub fn cached(&self, id: &ApprovalId) -> std::io::Result<Option<BTreeSet<ApprovalId>>> {
        let path = self.layout.predicates_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let mut predicates = BTreeSet::new();
        for line in std::fs::read_to_string(&path)?.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match ApprovalId::parse(line) {
                Ok(predicate) => {
                    predicates.insert(predicate);
                }
                Err(e) => warn!(id = %id, line, error = %e, "ignoring malformed predicate entry"),
            }
        }
        Ok(Some(predicates))
    }

    /// Extract every predicate citation from a document's page text.
    ///
    /// Whitespace is stripped per page before matching; the document's own
    /// number is removed, since a self-citation is not a predicate
    /// relationship.
    pub fn scan(id: &ApprovalId, pages: &[String]) -> BTreeSet<ApprovalId> {
        let mut predicates = BTreeSet::new();
        for page in pages {
            let normalized: String = page.chars().filter(|c| !c.is_whitespace()).collect();
            predicates.extend(ApprovalId::parse_all(&normalized));
        }
        predicates.remove(id);
        predicates
    }

    /// Persist a predicate set (including the empty set) for `id`.
    pub fn persist(&self, id: &ApprovalId, predicates: &BTreeSet<ApprovalId>) -> std::io::Result<()> {
        let mut body = String::new();
        for predicate in predicates {
            body.push_str(predicate.as_str());
            body.push('\n');
        }
        std::fs::write(self.layout.predicates_path(id), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ApprovalId {
        ApprovalId::parse(s).unwrap()
    }

    #[test]
    fn scan_reassembles_fragmented_citations() {
        let pages = vec![
            "Predicate device: K 08\n1113, cleared in 2008.".to_string(),
            "Additional predicates: K05\t2896; DEN17 0009.".to_string(),
        ];
        let found = PredicateParser::scan(&id("K173585"), &pages);
        let expected: BTreeSet<_> = [id("K081113"), id("K052896"), id("DEN170009")]
            .into_iter()
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn scan_excludes_self_citation() {
        let pages =
            vec!["Device: K173585. Predicates: K081113, K173585.".to_string()];
        let found = PredicateParser::scan(&id("K173585"), &pages);
        assert_eq!(found, [id("K081113")].into_iter().collect());
    }

    #[test]
    fn scan_of_blank_pages_is_empty() {
        let pages = vec!["   \n\t ".to_string(), String::new()];
        assert!(PredicateParser::scan(&id("K173585"), &pages).is_empty());
    }

    #[test]
    fn persist_then_cached_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path());
        let parser = PredicateParser::new(layout.clone());
        let subject = id("K173585");
        layout.ensure_dir(&subject).unwrap();

        let predicates: BTreeSet<_> = [id("K081113"), id("P810002")].into_iter().collect();
        parser.persist(&subject, &predicates).unwrap();

        let loaded = parser.cached(&subject).unwrap().unwrap();
        assert_eq!(loaded, predicates);

        // One canonical number per line, sorted.
        let raw = std::fs::read_to_string(layout.predicates_path(&subject)).unwrap();
        assert_eq!(raw, "K081113\nP810002\n");
    }

    #[test]
    fn cached_is_none_before_first_computation() {
        let dir = tempfile::tempdir().unwrap();
        let parser = PredicateParser::new(StorageLayout::new(dir.path()));
        assert!(parser.cached(&id("K173585")).unwrap().is_none());
    }

    #[test]
    fn empty_set_persists_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path());
        let parser = PredicateParser::new(layout.clone());
        let subject = id("K990001");
        layout.ensure_dir(&subject).unwrap();

        parser.persist(&subject, &BTreeSet::new()).unwrap();
        let loaded = parser.cached(&subject).unwrap().unwrap();
        assert!(loaded.is_empty());
    }
}
