//! Fact set diffing
//!
//! Determines whether the freshly computed fact set differs meaningfully
//! from the last value pushed to the entitlement service. Keys on the
//! graylist are allowed to fluctuate without counting as a change; they
//! are still reported, just never diffed.

use std::collections::BTreeSet;

use crate::store::FactSet;

/// Compute the keys whose values changed between the last pushed set and
/// the current one.
///
/// - With no prior set there is no comparison baseline, so nothing is a
///   change; callers decide separately whether a first run warrants a push.
/// - A key present only in `current` is a change.
/// - A key present in both with differing values is a change unless it is
///   graylisted.
/// - A key present only in `prior` is a change, recorded with its old
///   value.
pub fn diff_facts(
    current: &FactSet,
    prior: Option<&FactSet>,
    graylist: &BTreeSet<String>,
) -> FactSet {
    let mut diff = FactSet::new();
    let Some(prior) = prior else {
        return diff;
    };

    for (key, value) in current {
        match prior.get(key) {
            None => {
                diff.insert(key.clone(), value.clone());
            }
            Some(old) if old != value && !graylist.contains(key) => {
                diff.insert(key.clone(), value.clone());
            }
            Some(_) => {}
        }
    }

    for (key, old) in prior {
        if !current.contains_key(key) {
            diff.insert(key.clone(), old.clone());
        }
    }

    diff
}
