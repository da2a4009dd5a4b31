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

use crate::common::{Identifier, IdentifierMarkerName};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupIdentifierMarker;

impl IdentifierMarkerName for GroupIdentifierMarker {
    const NAME: &'static str = "GroupId";
}

pub type GroupIdentifier = Identifier<u64, GroupIdentifierMarker>;

/// Ownership network a facility belongs to. Facilities without a parent
/// network form the implicit `Unassigned` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "Option<GroupIdentifier>", into = "Option<GroupIdentifier>")]
pub enum GroupKey {
    #[default]
    Unassigned,
    Group(GroupIdentifier),
}

impl GroupKey {
    #[inline]
    pub fn id(&self) -> Option<GroupIdentifier> {
        match self {
            GroupKey::Unassigned => None,
            GroupKey::Group(id) => Some(*id),
        }
    }

    #[inline]
    pub fn is_unassigned(&self) -> bool {
        matches!(self, GroupKey::Unassigned)
    }
}

impl From<Option<GroupIdentifier>> for GroupKey {
    fn from(value: Option<GroupIdentifier>) -> Self {
        match value {
            Some(id) => GroupKey::Group(id),
            None => GroupKey::Unassigned,
        }
    }
}

impl From<GroupKey> for Option<GroupIdentifier> {
    fn from(value: GroupKey) -> Self {
        value.id()
    }
}

impl From<GroupIdentifier> for GroupKey {
    fn from(value: GroupIdentifier) -> Self {
        GroupKey::Group(value)
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKey::Unassigned => write!(f, "Unassigned"),
            GroupKey::Group(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_sorts_first() {
        let g = GroupKey::Group(GroupIdentifier::new(0));
        assert!(GroupKey::Unassigned < g);
    }

    #[test]
    fn test_serde_maps_null_to_unassigned() {
        let k: GroupKey = serde_json::from_str("null").unwrap();
        assert_eq!(k, GroupKey::Unassigned);
        let k: GroupKey = serde_json::from_str("4").unwrap();
        assert_eq!(k, GroupKey::Group(GroupIdentifier::new(4)));
        assert_eq!(serde_json::to_string(&k).unwrap(), "4");
    }

    #[test]
    fn test_display() {
        assert_eq!(GroupKey::Unassigned.to_string(), "Unassigned");
        assert_eq!(GroupKey::from(GroupIdentifier::new(2)).to_string(), "GroupId(2)");
    }
}
