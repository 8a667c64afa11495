//! Permutation groups given by generators, with a lazily built stabilizer chain.
//! Can be used to study the symmetry of graphs and other objects built from points.

use crate::group::chain::{Closure, Level, StabilizerChain};
use crate::permutable::{Block, FHashSet, Perm, PermError, Relabel};
use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::One;
use std::cell::OnceCell;
use std::fmt;
use std::hash::Hash;

pub mod blocks;
pub mod chain;

#[derive(Clone, Debug)]
pub struct PermGroup {
    len: usize,
    generators: Vec<Perm>,
    closure: Closure,
    chain: OnceCell<StabilizerChain>,
}

impl PermGroup {
    /// Group generated by the given permutations, which must be non-empty and of equal length.
    pub fn new(generators: Vec<Perm>) -> Result<Self, PermError> {
        let len = generators.first().ok_or(PermError::InvalidGenerators)?.len();
        if generators.iter().any(|g| g.len() != len) {
            return Err(PermError::InvalidGenerators);
        }
        Ok(Self::with_len(len, generators))
    }

    /// Group generated by the identity on `len` points.
    pub fn trivial(len: usize) -> Self {
        Self::with_len(len, vec![Perm::identity(len)])
    }

    /// The full symmetric group, generated by a transposition and a long cycle.
    pub fn symmetric(len: usize) -> Self {
        if len < 2 {
            return Self::trivial(len);
        }
        Self::with_len(len, vec![Perm::transposition(len, 0, 1), Perm::rotation(len)])
    }

    /// The cyclic group generated by i -> i + 1 mod len.
    pub fn cyclic(len: usize) -> Self {
        if len < 2 {
            return Self::trivial(len);
        }
        Self::with_len(len, vec![Perm::rotation(len)])
    }

    /// Generators may be empty here; the group is then trivial.
    fn with_len(len: usize, mut generators: Vec<Perm>) -> Self {
        if generators.is_empty() {
            generators.push(Perm::identity(len));
        }
        Self { len, generators, closure: Closure::default(), chain: OnceCell::new() }
    }

    /// Group given directly by a stabilizer chain, with its representatives as generators.
    pub(crate) fn from_chain(chain: StabilizerChain, closure: Closure) -> Self {
        let len = chain.degree();
        let generators = chain.iter()
            .flat_map(Level::representatives)
            .filter(|r| !r.is_identity())
            .cloned()
            .sorted()
            .collect();
        let mut out = Self::with_len(len, generators).with_closure(closure);
        out.chain = OnceCell::from(chain);
        out
    }

    /// Selects the worklist used when the stabilizer chain is built.
    pub fn with_closure(mut self, closure: Closure) -> Self {
        if closure != self.closure {
            self.closure = closure;
            self.chain = OnceCell::new();
        }
        self
    }

    /// Number of points acted on.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn generators(&self) -> &[Perm] {
        &self.generators
    }

    pub fn closure(&self) -> Closure {
        self.closure
    }

    /// Stabilizer chain for the base 0..len-1, built on first use.
    pub fn stabilizer_chain(&self) -> &StabilizerChain {
        self.chain.get_or_init(|| StabilizerChain::points(self.len, &self.generators, self.closure))
    }

    /// Strong generators, one transversal per level of the stabilizer chain.
    pub fn strong_generators(&self) -> &[Level] {
        self.stabilizer_chain()
    }

    pub fn contains(&self, g: &Perm) -> bool {
        g.len() == self.len && self.factorize(g).is_some()
    }

    /// Representatives h_0, ..., h_k, one per level, with g = h_0 * ... * h_k,
    /// or None if g is not in the group.
    pub fn factorize(&self, g: &Perm) -> Option<Vec<Perm>> {
        if g.len() != self.len {
            return None;
        }
        self.stabilizer_chain().factorize(g)
    }

    pub fn order(&self) -> BigUint {
        self.order_factors().into_iter().fold(BigUint::one(), |acc, f| acc * f)
    }

    /// Orbit sizes along the base, whose product is the order.
    pub fn order_factors(&self) -> Vec<usize> {
        self.stabilizer_chain().factors()
    }

    /// Partitions the given points into orbits under the generators. Each returned orbit is
    /// the full orbit of the points it contains, ordered by smallest given point.
    pub fn compute_orbits(&self, points: impl IntoIterator<Item=usize>) -> Vec<Block> {
        let neighbors = |i: usize| self.generators.iter().map(move |g| g.apply(i));
        let mut found = FHashSet::default();
        let mut out = vec![];
        for root in points.into_iter().sorted_unstable().dedup() {
            if found.contains(&root) {
                continue;
            }
            let mut orbit = Block::from([root]);
            let mut unexamined = vec![root];
            while let Some(next) = unexamined.pop() {
                for i in neighbors(next) {
                    if orbit.insert(i) {
                        unexamined.push(i);
                    }
                }
            }
            found.extend(orbit.iter().cloned());
            out.push(orbit);
        }
        out
    }

    /// Orbit of any value built from points: a point, a set of points, a set of sets, ...
    pub fn orbit<T: Relabel + Clone + Eq + Hash>(&self, a: &T) -> FHashSet<T> {
        let mut orbit = FHashSet::from_iter([a.clone()]);
        let mut new_elements = vec![a.clone()];
        while !new_elements.is_empty() {
            let mut added = vec![];
            for x in &new_elements {
                for g in &self.generators {
                    let image = g.image(x);
                    if !orbit.contains(&image) {
                        orbit.insert(image.clone());
                        added.push(image);
                    }
                }
            }
            new_elements = added;
        }
        orbit
    }
}

impl fmt::Display for PermGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, level) in self.strong_generators().iter().enumerate() {
            let reps = level.representatives().sorted().join(", ");
            writeln!(f, "C_{i} {:?}: {reps}", level.base)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutable::PermutationUniform;
    use std::collections::VecDeque;

    fn perm(images: &[usize]) -> Perm {
        Perm::new(images.to_vec()).unwrap()
    }

    /// All products of generators, by breadth-first search from the identity.
    fn closure(len: usize, generators: &[Perm]) -> FHashSet<Perm> {
        let mut all = FHashSet::from_iter([Perm::identity(len)]);
        let mut queue = VecDeque::from([Perm::identity(len)]);
        while let Some(current) = queue.pop_front() {
            for g in generators {
                let next = &current * g;
                if all.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        all
    }

    fn all_perms(len: usize) -> Vec<Perm> {
        (0..len).permutations(len).map(Perm::new).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn invalid_generators() {
        assert_eq!(PermGroup::new(vec![]).err(), Some(PermError::InvalidGenerators));
        assert_eq!(PermGroup::new(vec![Perm::identity(3), Perm::identity(4)]).err(), Some(PermError::InvalidGenerators));
    }

    #[test]
    fn trivial_group() {
        let g = PermGroup::trivial(5);
        assert_eq!(g.order(), BigUint::one());
        assert_eq!(g.order_factors(), vec![1; 4]);
        assert!(g.contains(&Perm::identity(5)));
        assert!(!g.contains(&perm(&[1, 0, 2, 3, 4])));
        assert!(!g.contains(&Perm::identity(4)));
        assert_eq!(PermGroup::trivial(0).order(), BigUint::one());
        assert_eq!(PermGroup::trivial(1).order_factors(), Vec::<usize>::new());
    }

    #[test]
    fn symmetric_and_cyclic() {
        assert_eq!(PermGroup::symmetric(6).order(), BigUint::from(720u32));
        assert_eq!(PermGroup::symmetric(6).order_factors(), vec![6, 5, 4, 3, 2]);
        assert_eq!(PermGroup::cyclic(7).order(), BigUint::from(7u32));
        assert_eq!(PermGroup::cyclic(7).order_factors(), vec![7, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn order_beyond_u64() {
        let factorial = (1..=25u32).fold(BigUint::one(), |acc, i| acc * i);
        assert_eq!(PermGroup::symmetric(25).order(), factorial);
        assert!(factorial > BigUint::from(u64::MAX));
    }

    #[test]
    fn order_matches_brute_force() {
        for len in 2..=6 {
            for seed in 0..6 {
                let generators = PermutationUniform::new(len).samples(2 + seed % 2, seed + 10 * len);
                let group = PermGroup::new(generators.clone()).unwrap();
                let elements = closure(len, &generators);
                assert_eq!(group.order(), BigUint::from(elements.len()));
                assert_eq!(group.order_factors().iter().product::<usize>(), elements.len());
                for p in all_perms(len) {
                    assert_eq!(group.contains(&p), elements.contains(&p), "{p} in <{}>", generators.iter().join(", "));
                }
            }
        }
    }

    #[test]
    fn closures_give_same_order() {
        for seed in 0..5 {
            let generators = PermutationUniform::new(6).samples(2, seed);
            let dedup = PermGroup::new(generators.clone()).unwrap();
            let stack = PermGroup::new(generators).unwrap().with_closure(Closure::Stack);
            assert_eq!(stack.closure(), Closure::Stack);
            assert_eq!(dedup.order(), stack.order());
        }
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let generators = vec![perm(&[1, 2, 3, 4, 5, 0]), perm(&[5, 4, 3, 2, 1, 0])];
        let first = PermGroup::new(generators.clone()).unwrap().order();
        let second = PermGroup::new(generators).unwrap().order();
        assert_eq!(first, BigUint::from(12u32));
        assert_eq!(first, second);
    }

    #[test]
    fn factorize_members() {
        let group = PermGroup::new(vec![perm(&[1, 2, 3, 4, 0]), perm(&[4, 3, 2, 1, 0])]).unwrap();
        assert_eq!(group.order(), BigUint::from(10u32));
        for p in all_perms(5) {
            match group.factorize(&p) {
                Some(factors) => {
                    assert_eq!(factors.len(), 4);
                    assert_eq!(factors.into_iter().reduce(|a, b| a * b), Some(p));
                }
                None => assert!(!group.contains(&p)),
            }
        }
    }

    #[test]
    fn orbits_of_points() {
        let group = PermGroup::new(vec![perm(&[1, 0, 2, 3, 4, 5]), perm(&[0, 1, 3, 4, 2, 5])]).unwrap();
        assert_eq!(group.compute_orbits(0..6), vec![Block::from([0, 1]), Block::from([2, 3, 4]), Block::from([5])]);
        assert_eq!(group.compute_orbits([4, 3]), vec![Block::from([2, 3, 4])]);
        assert!(group.compute_orbits(Vec::<usize>::new()).is_empty());
    }

    #[test]
    fn orbit_of_sets() {
        let group = PermGroup::cyclic(4);
        assert_eq!(group.orbit(&1usize), FHashSet::from_iter([0, 1, 2, 3]));
        let pair = Block::from([0, 2]);
        assert_eq!(group.orbit(&pair), FHashSet::from_iter([Block::from([0, 2]), Block::from([1, 3])]));
        let edge = std::collections::BTreeSet::from([Block::from([0]), Block::from([1])]);
        assert_eq!(group.orbit(&edge).len(), 4);
    }

    #[test]
    fn display_lists_levels() {
        let text = PermGroup::new(vec![perm(&[1, 0, 2])]).unwrap().to_string();
        assert_eq!(text, "C_0 Point(0): (), (0 1)\nC_1 Point(1): ()\n");
    }
}
