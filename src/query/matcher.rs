// SPDX-License-Identifier: Apache-2.0
use crate::models::types::{Annotations, PredicateSet};

/// Whether every predicate key is present in the annotations with exactly the same value.
/// Extra annotations are ignored and an empty predicate set matches everything.
pub fn matches(annotations: &Annotations, predicates: &PredicateSet) -> bool {
    predicates.iter().all(|(key, value)| annotations.get(key) == Some(value))
}
