use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use crate::fingerprint::Fingerprint;

/// Files sharing one fingerprint, with the member to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup<I> {
    /// Fingerprint shared by every member
    pub fingerprint: Fingerprint,

    /// All members in input order
    pub members: Vec<I>,

    /// Index into `members` of the canonical member
    canonical: usize,
}

impl<I: AsRef<Path>> DuplicateGroup<I> {
    /// The member to keep
    pub fn canonical(&self) -> &I {
        &self.members[self.canonical]
    }

    /// Every member except the canonical one
    pub fn duplicates(&self) -> impl Iterator<Item = &I> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.canonical)
            .map(|(_, member)| member)
    }

    /// More than one file shares the fingerprint
    pub fn is_duplicate(&self) -> bool {
        self.members.len() > 1
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Order two paths by canonical preference: shorter path string first, then
/// lexicographically smaller
pub fn canonical_order(a: &Path, b: &Path) -> Ordering {
    let a = a.to_string_lossy();
    let b = b.to_string_lossy();
    a.chars()
        .count()
        .cmp(&b.chars().count())
        .then_with(|| a.cmp(&b))
}

/// Partition `(id, fingerprint)` pairs into groups of equal fingerprints.
///
/// Every id lands in exactly one group; files with a unique fingerprint form
/// singleton groups. Groups come back in order of first appearance.
pub fn group_duplicates<I, P>(pairs: P) -> Vec<DuplicateGroup<I>>
where
    I: AsRef<Path>,
    P: IntoIterator<Item = (I, Fingerprint)>,
{
    // Create a HashMap from fingerprint to its group's position
    let mut index: HashMap<Fingerprint, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup<I>> = Vec::new();

    for (id, fingerprint) in pairs {
        match index.get(&fingerprint) {
            Some(&position) => groups[position].members.push(id),
            None => {
                index.insert(fingerprint, groups.len());
                groups.push(DuplicateGroup {
                    fingerprint,
                    members: vec![id],
                    canonical: 0,
                });
            }
        }
    }

    for group in &mut groups {
        group.canonical = pick_canonical(&group.members);
    }

    groups
}

/// Like [`group_duplicates`] but drops singleton groups
pub fn duplicate_groups<I, P>(pairs: P) -> Vec<DuplicateGroup<I>>
where
    I: AsRef<Path>,
    P: IntoIterator<Item = (I, Fingerprint)>,
{
    group_duplicates(pairs)
        .into_iter()
        .filter(|group| group.is_duplicate())
        .collect()
}

fn pick_canonical<I: AsRef<Path>>(members: &[I]) -> usize {
    members
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| canonical_order(a.as_ref(), b.as_ref()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelMode;
    use std::collections::HashSet;

    fn fp(byte: u8) -> Fingerprint {
        Fingerprint::from_parts([byte; 32], 8, 8, ChannelMode::Rgba)
    }

    #[test]
    fn test_canonical_is_shortest_then_lexicographic() {
        let groups = group_duplicates(vec![("b/tex.png", fp(1)), ("a_tex.png", fp(1))]);

        assert_eq!(groups.len(), 1);
        assert_eq!(*groups[0].canonical(), "a_tex.png");
        assert_eq!(groups[0].duplicates().copied().collect::<Vec<_>>(), vec!["b/tex.png"]);
    }

    #[test]
    fn test_shorter_path_wins_over_lexicographic() {
        let groups = group_duplicates(vec![
            ("a/long/name.png", fp(1)),
            ("z.png", fp(1)),
            ("b.png", fp(1)),
        ]);

        assert_eq!(*groups[0].canonical(), "b.png");
        assert_eq!(groups[0].duplicates().count(), 2);
    }

    #[test]
    fn test_groups_partition_the_input() {
        let pairs = vec![
            ("one.png", fp(1)),
            ("two.png", fp(2)),
            ("three.png", fp(1)),
            ("four.png", fp(3)),
            ("five.png", fp(2)),
        ];
        let ids: Vec<&str> = pairs.iter().map(|(id, _)| *id).collect();

        let groups = group_duplicates(pairs);

        let mut seen = HashSet::new();
        for group in &groups {
            for member in &group.members {
                assert!(seen.insert(*member), "{} appears twice", member);
            }
        }
        assert_eq!(seen.len(), ids.len());
        assert_eq!(groups.len(), 3);

        // First-appearance order, members in input order
        assert_eq!(groups[0].members, vec!["one.png", "three.png"]);
        assert_eq!(groups[1].members, vec!["two.png", "five.png"]);
        assert_eq!(groups[2].members, vec!["four.png"]);
        assert!(!groups[2].is_duplicate());
        assert_eq!(groups[2].duplicates().count(), 0);
    }

    #[test]
    fn test_same_digest_different_shape_not_grouped() {
        let digest = [5u8; 32];
        let groups = group_duplicates(vec![
            ("a.png", Fingerprint::from_parts(digest, 4, 4, ChannelMode::Rgba)),
            ("b.png", Fingerprint::from_parts(digest, 2, 8, ChannelMode::Rgba)),
        ]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_duplicate_groups_filters_singletons() {
        let groups = duplicate_groups(vec![
            ("a.png", fp(1)),
            ("b.png", fp(2)),
            ("c.png", fp(1)),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let groups = group_duplicates(Vec::<(&str, Fingerprint)>::new());
        assert!(groups.is_empty());
    }
}
