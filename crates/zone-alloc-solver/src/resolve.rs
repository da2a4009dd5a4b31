// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Candidate selection. Strict mode picks one winner per group, flat mode one
//! winner overall. Ties always fall back to the lower facility id so that
//! identical inputs produce identical assignments.

use crate::coverage::Candidate;
use std::{cmp::Ordering, collections::BTreeSet};
use zone_alloc_model::prelude::{Assignment, CoverageTier, GroupKey, ZoneIdentifier};

pub const NO_REACHABLE_FACILITY: &str = "No reachable facility";

#[inline]
fn by_tie_break(a: &&Candidate, b: &&Candidate) -> Ordering {
    a.tie_break_km
        .total_cmp(&b.tie_break_km)
        .then_with(|| a.facility.cmp(&b.facility))
}

#[inline]
fn by_distance(a: &&Candidate, b: &&Candidate) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.facility.cmp(&b.facility))
}

fn covered(c: &Candidate) -> Assignment {
    Assignment::covered(
        c.zone,
        c.group,
        c.facility,
        c.distance_km,
        c.tier.unwrap_or(CoverageTier::Verified),
        c.score,
    )
}

fn fallback(zone: ZoneIdentifier, group: GroupKey, c: Option<&Candidate>) -> Assignment {
    match c {
        Some(c) => Assignment::uncovered(
            zone,
            group,
            Some(c.facility),
            Some(c.distance_km),
            c.reason.clone().unwrap_or_else(|| NO_REACHABLE_FACILITY.to_string()),
        ),
        None => Assignment::uncovered(zone, group, None, None, NO_REACHABLE_FACILITY),
    }
}

/// One assignment per group in `groups`. A group without any covered
/// candidate gets an uncovered assignment carrying its nearest failing
/// candidate's reason. Without any group the zone is uncovered under
/// [`GroupKey::Unassigned`].
pub fn resolve_strict(
    zone: ZoneIdentifier,
    candidates: &[Candidate],
    groups: &BTreeSet<GroupKey>,
) -> Vec<Assignment> {
    if groups.is_empty() {
        return vec![fallback(zone, GroupKey::Unassigned, None)];
    }
    groups
        .iter()
        .map(|&group| {
            let in_group = || candidates.iter().filter(move |c| c.group == group);
            let winner = in_group()
                .filter(|c| c.is_covered() && c.score > 0.0)
                .min_by(by_tie_break);
            match winner {
                Some(c) => covered(c),
                None => fallback(zone, group, in_group().min_by(by_distance)),
            }
        })
        .collect()
}

/// Single global winner by highest score, then lower distance, then lower id.
/// Uncovered zones are attributed to the nearest facility's group.
pub fn resolve_flat(zone: ZoneIdentifier, candidates: &[Candidate]) -> Assignment {
    let winner = candidates.iter().filter(|c| c.is_covered()).min_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| by_distance(a, b))
    });
    if let Some(c) = winner {
        return covered(c);
    }
    match candidates.iter().min_by(by_distance) {
        Some(c) => fallback(zone, c.group, Some(c)),
        None => fallback(zone, GroupKey::Unassigned, None),
    }
}
