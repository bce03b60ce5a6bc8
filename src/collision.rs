use std::collections::HashMap;
use std::hash::Hash;

/// Two or more distinct strings sharing one digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionGroup<D> {
    digest: D,
    members: Vec<String>,
}

impl<D> CollisionGroup<D> {
    pub fn digest(&self) -> &D {
        &self.digest
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_pair(&self) -> bool {
        self.members.len() == 2
    }

    /// Three members or more
    pub fn is_triple(&self) -> bool {
        self.members.len() >= 3
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }

    fn absorb(&mut self, member: String) -> bool {
        if self.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }
}

/// What a merge did to the collision set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// First pair for this digest
    NewPair,
    /// A pair grew into a triple
    Escalated,
    /// A triple gained more members
    Extended,
    /// Nothing new
    Known,
}

/// Every collision found so far, grouped by digest in discovery order
#[derive(Debug, Clone)]
pub struct CollisionSet<D> {
    groups: Vec<CollisionGroup<D>>,
    by_digest: HashMap<D, usize>,
    triples: usize,
}

impl<D: Clone + Eq + Hash> CollisionSet<D> {
    pub fn new() -> Self {
        CollisionSet { groups: Vec::new(), by_digest: HashMap::new(), triples: 0 }
    }

    /// Records that `first` and `second` share `digest`
    ///
    /// Members already in the digest's group are skipped, so a pair that overlaps an earlier one
    /// turns it into a triple rather than a second group.
    pub fn merge(&mut self, digest: D, first: String, second: String) -> Merge {
        if first == second {
            return Merge::Known;
        }

        let slot = match self.by_digest.get(&digest) {
            Some(&slot) => slot,
            None => {
                self.by_digest.insert(digest.clone(), self.groups.len());
                self.groups.push(CollisionGroup { digest, members: vec![first, second] });
                return Merge::NewPair;
            }
        };

        let group = &mut self.groups[slot];
        let before = group.len();
        group.absorb(first);
        group.absorb(second);

        match (before, group.len()) {
            (before, after) if before == after => Merge::Known,
            (2, _) => {
                self.triples += 1;
                Merge::Escalated
            }
            _ => Merge::Extended,
        }
    }

    /// Number of distinct colliding digests
    pub fn pair_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of digests shared by three strings or more
    pub fn triple_count(&self) -> usize {
        self.triples
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[CollisionGroup<D>] {
        &self.groups
    }

    pub fn get(&self, digest: &D) -> Option<&CollisionGroup<D>> {
        self.by_digest.get(digest).map(|&slot| &self.groups[slot])
    }

    /// Splits into (pairs, triples)
    pub fn into_groups(self) -> (Vec<CollisionGroup<D>>, Vec<CollisionGroup<D>>) {
        self.groups.into_iter().partition(CollisionGroup::is_pair)
    }
}

impl<D: Clone + Eq + Hash> Default for CollisionSet<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> String {
        value.to_owned()
    }

    #[test]
    fn overlapping_pairs_escalate_to_one_triple() {
        let mut set = CollisionSet::new();
        assert_eq!(set.merge(7u8, s("ab"), s("cd")), Merge::NewPair);
        assert_eq!(set.merge(7u8, s("cd"), s("ef")), Merge::Escalated);

        assert_eq!(set.pair_count(), 1);
        assert_eq!(set.triple_count(), 1);

        let (pairs, triples) = set.into_groups();
        assert!(pairs.is_empty());
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].members(), &[s("ab"), s("cd"), s("ef")]);
        assert_eq!(*triples[0].digest(), 7);
    }

    #[test]
    fn independent_digests_stay_separate() {
        let mut set = CollisionSet::new();
        set.merge(1u8, s("aa"), s("bb"));
        set.merge(2u8, s("cc"), s("dd"));

        assert_eq!(set.pair_count(), 2);
        assert_eq!(set.triple_count(), 0);
        assert!(set.get(&1).unwrap().is_pair());
        assert!(set.get(&3).is_none());
    }

    #[test]
    fn repeated_and_degenerate_pairs_are_known() {
        let mut set = CollisionSet::new();
        assert_eq!(set.merge(1u8, s("aa"), s("aa")), Merge::Known);
        assert!(set.is_empty());

        set.merge(1u8, s("aa"), s("bb"));
        assert_eq!(set.merge(1u8, s("bb"), s("aa")), Merge::Known);
        assert_eq!(set.triple_count(), 0);
    }

    #[test]
    fn triples_grow_without_recounting() {
        let mut set = CollisionSet::new();
        set.merge(0u8, s("a"), s("b"));
        assert_eq!(set.merge(0u8, s("c"), s("d")), Merge::Escalated);
        assert_eq!(set.merge(0u8, s("a"), s("e")), Merge::Extended);

        assert_eq!(set.triple_count(), 1);
        let group = set.get(&0).unwrap();
        assert_eq!(group.len(), 5);
        assert!(group.is_triple());
        assert!(group.contains("e"));
    }
}
