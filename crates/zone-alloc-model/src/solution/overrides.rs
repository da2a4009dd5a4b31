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

use crate::{
    problem::{facility::FacilityIdentifier, group::GroupKey, zone::ZoneIdentifier},
    solution::asg::{Assignment, AssignmentKey, AssignmentSet},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A manually forced facility for one `(zone, originating group)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Override {
    pub zone: ZoneIdentifier,
    #[serde(default)]
    pub group: GroupKey,
    pub facility: FacilityIdentifier,
}

impl Override {
    #[inline]
    pub fn new(zone: ZoneIdentifier, group: GroupKey, facility: FacilityIdentifier) -> Self {
        Self {
            zone,
            group,
            facility,
        }
    }

    #[inline]
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey::new(self.zone, self.group)
    }
}

/// Overrides keyed like assignments. A later override for the same key
/// replaces the earlier one.
#[repr(transparent)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Override>", into = "Vec<Override>")]
pub struct OverrideSet(BTreeMap<AssignmentKey, FacilityIdentifier>);

impl OverrideSet {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, ov: Override) -> Option<FacilityIdentifier> {
        self.0.insert(ov.key(), ov.facility)
    }

    #[inline]
    pub fn remove(&mut self, key: &AssignmentKey) -> Option<FacilityIdentifier> {
        self.0.remove(key)
    }

    #[inline]
    pub fn get(&self, key: &AssignmentKey) -> Option<FacilityIdentifier> {
        self.0.get(key).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Override> + '_ {
        self.0
            .iter()
            .map(|(k, f)| Override::new(k.zone, k.group, *f))
    }

    /// Lays the overrides over a computed baseline and returns the merged view.
    /// The baseline is left untouched so that a re-run always starts clean.
    pub fn merge(&self, computed: &AssignmentSet) -> AssignmentSet {
        let mut merged = computed.clone();
        for ov in self.iter() {
            merged.remove(&ov.key());
            merged.insert(Assignment::manual(ov.zone, ov.group, ov.facility));
        }
        merged
    }
}

impl FromIterator<Override> for OverrideSet {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Override>>(iter: I) -> Self {
        let mut s = Self::new();
        for ov in iter {
            s.insert(ov);
        }
        s
    }
}

impl From<Vec<Override>> for OverrideSet {
    fn from(value: Vec<Override>) -> Self {
        value.into_iter().collect()
    }
}

impl From<OverrideSet> for Vec<Override> {
    fn from(value: OverrideSet) -> Self {
        value.iter().collect()
    }
}
