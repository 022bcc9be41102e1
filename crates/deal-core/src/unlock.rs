//! Reputation gates: which products a dealer currently shows, and whether a
//! dealer itself is revealed.

use crate::catalog::{Dealer, Drug};
use serde::{Deserialize, Serialize};

/// Deep copy of the catalog entries visible at a given reputation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnlockedSnapshot {
    pub drugs: Vec<Drug>,
}

impl UnlockedSnapshot {
    pub fn drug(&self, kind: &str) -> Option<&Drug> {
        self.drugs.iter().find(|d| d.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    /// Flat list of `(drug, quality)` pairs, mostly useful for comparisons.
    pub fn quality_keys(&self) -> Vec<(String, String)> {
        self.drugs
            .iter()
            .flat_map(|d| d.qualities.iter().map(|q| (d.kind.clone(), q.kind.clone())))
            .collect()
    }

    /// Flat list of `(drug, effect)` pairs.
    pub fn effect_keys(&self) -> Vec<(String, String)> {
        self.drugs
            .iter()
            .flat_map(|d| d.effects.iter().map(|e| (d.kind.clone(), e.name.clone())))
            .collect()
    }
}

/// Compute the products, qualities and effects unlocked at `reputation`.
///
/// Pure function of the catalog entry; the catalog is never mutated.
pub fn compute_unlocked(dealer: &Dealer, reputation: i32) -> UnlockedSnapshot {
    let drugs = dealer
        .drugs
        .iter()
        .filter(|d| d.unlock_rep <= reputation)
        .map(|d| Drug {
            qualities: d
                .qualities
                .iter()
                .filter(|q| q.unlock_rep <= reputation)
                .cloned()
                .collect(),
            effects: d
                .effects
                .iter()
                .filter(|e| e.unlock_rep <= reputation)
                .cloned()
                .collect(),
            ..d.clone()
        })
        .collect();
    UnlockedSnapshot { drugs }
}

/// Whether every unlock requirement of `dealer` is satisfied.
///
/// `reputation_of` returns the current reputation of another dealer, or
/// `None` if that dealer has no state yet (treated as unmet).
pub fn requirements_met<F>(dealer: &Dealer, reputation_of: F) -> bool
where
    F: Fn(&str) -> Option<i32>,
{
    dealer
        .unlock_requirements
        .iter()
        .all(|req| reputation_of(&req.name).is_some_and(|rep| rep >= req.min_rep))
}
