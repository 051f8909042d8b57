//! metadata::store
//!
//! In-memory triple store built from one metadata document.
//!
//! Triples are kept in insertion (document) order and duplicates are
//! ignored, so predicate lookups are deterministic: the first value written
//! in the document is the first value returned.

use std::collections::HashSet;

use oxrdf::{NamedNodeRef, Term, Triple};

/// An insertion-ordered set of triples.
#[derive(Debug, Clone, Default)]
pub struct TripleStore {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
}

impl TripleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Number of distinct triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the store holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Check if the store holds the given triple.
    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    /// Iterate over all triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Distinct objects of the given predicate, in insertion order.
    pub fn objects_for_predicate(&self, predicate: NamedNodeRef<'_>) -> Vec<&Term> {
        let mut seen = HashSet::new();
        self.triples
            .iter()
            .filter(|t| t.predicate.as_ref() == predicate)
            .map(|t| &t.object)
            .filter(|o| seen.insert(*o))
            .collect()
    }
}

impl FromIterator<Triple> for TripleStore {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut store = TripleStore::new();
        for triple in iter {
            store.insert(triple);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode};

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(iri(s), iri(p), Literal::new_simple_literal(o))
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut store = TripleStore::new();
        assert!(store.insert(triple("https://ex.org/a", "https://ex.org/p", "x")));
        assert!(!store.insert(triple("https://ex.org/a", "https://ex.org/p", "x")));
        assert_eq!(store.len(), 1);
        assert!(store.contains(&triple("https://ex.org/a", "https://ex.org/p", "x")));
    }

    #[test]
    fn objects_keep_insertion_order_without_duplicates() {
        let store: TripleStore = vec![
            triple("https://ex.org/a", "https://ex.org/p", "second"),
            triple("https://ex.org/a", "https://ex.org/q", "other"),
            triple("https://ex.org/b", "https://ex.org/p", "first"),
            triple("https://ex.org/c", "https://ex.org/p", "second"),
        ]
        .into_iter()
        .collect();

        let predicate = iri("https://ex.org/p");
        let objects: Vec<String> = store
            .objects_for_predicate(predicate.as_ref())
            .into_iter()
            .map(|t| match t {
                Term::Literal(l) => l.value().to_string(),
                other => other.to_string(),
            })
            .collect();

        assert_eq!(objects, vec!["second", "first"]);
    }

    #[test]
    fn empty_store() {
        let store = TripleStore::new();
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);
        assert!(store
            .objects_for_predicate(iri("https://ex.org/p").as_ref())
            .is_empty());
    }
}
