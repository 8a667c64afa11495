//! Permutations and the objects they act on.
use fxhash::FxBuildHasher;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::ops::Mul;
use thiserror::Error;

pub mod graph;

pub type FBuildHasher = FxBuildHasher;
pub type FHashMap<K, V> = HashMap<K, V, FBuildHasher>;
pub type FHashSet<K> = HashSet<K, FBuildHasher>;

/// A set of points, as used for blocks of a block system.
pub type Block = BTreeSet<usize>;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PermError {
    #[error("attempted to create an invalid permutation from {0:?}")]
    InvalidPermutation(Vec<usize>),

    #[error("attempted an invalid permutation operation between sizes {left} and {right}")]
    InvalidPermOperation { left: usize, right: usize },

    #[error("invalid generator set")]
    InvalidGenerators,
}

/// An ordered object of a fixed length. Permutations act on it by relabeling its indices.
pub trait Permutable: Clone {
    /// Length of the ordered object.
    fn len(&self) -> usize;

    /// Relabels the ordered object by a permutation of the same length.
    fn permuted(&self, x: &Perm) -> Self;

    /// Shuffles the ordered object by a random permutation uniformly sampled with the given seed.
    fn shuffled(&self, seed: usize) -> Self {
        self.permuted(&PermutationUniform::new(self.len()).sample(seed))
    }

    /// Test left group action axioms for this ordered object.
    /// Any implementation should pass this test for any ordered object and seed.
    #[cfg(test)]
    fn test_left_group_action_axioms(&self, seed: usize)
    where
        Self: Eq + fmt::Debug,
    {
        let (p0, p1) = PermutationUniform::new(self.len()).samples(2, seed).into_iter().collect_tuple().unwrap();
        assert_eq!(self.permuted(&p0).len(), self.len());
        assert_eq!(&self.permuted(&Perm::identity(self.len())), self);
        assert_eq!(self.permuted(&p0).permuted(&p1), self.permuted(&(&p1 * &p0)));
    }
}

/// A value built from points, mapped by a permutation point by point.
/// Sets stay sets (images are deduplicated), sequences keep their order and multiplicity.
pub trait Relabel: Sized {
    fn relabeled(&self, p: &Perm) -> Self;
}

impl Relabel for usize {
    fn relabeled(&self, p: &Perm) -> Self { p.apply(*self) }
}

impl<T: Relabel + Ord> Relabel for BTreeSet<T> {
    fn relabeled(&self, p: &Perm) -> Self {
        self.iter().map(|x| x.relabeled(p)).collect()
    }
}

impl<T: Relabel> Relabel for Vec<T> {
    fn relabeled(&self, p: &Perm) -> Self {
        self.iter().map(|x| x.relabeled(p)).collect()
    }
}

impl<A: Relabel, B: Relabel> Relabel for (A, B) {
    fn relabeled(&self, p: &Perm) -> Self {
        (self.0.relabeled(p), self.1.relabeled(p))
    }
}

/// Permutation of {0, ..., len - 1}, densely represented by the images of all points.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Perm(Vec<usize>);

impl Perm {
    /// Returns `InvalidPermutation` unless the images form a bijection on their own length.
    pub fn new(images: Vec<usize>) -> Result<Self, PermError> {
        let mut seen = vec![false; images.len()];
        for &x in &images {
            if x >= images.len() || seen[x] {
                return Err(PermError::InvalidPermutation(images));
            }
            seen[x] = true;
        }
        Ok(Self(images))
    }

    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Panics if `i` or `j` is not smaller than `len`, like `apply` on an out-of-range point.
    pub fn transposition(len: usize, i: usize, j: usize) -> Self {
        let mut out = Self::identity(len);
        out.0.swap(i, j);
        out
    }

    /// The long cycle i -> i + 1 mod len.
    pub fn rotation(len: usize) -> Self {
        Self((0..len).map(|i| (i + 1) % len).collect())
    }

    /// The cycle (c_0 c_1 ... c_k), mapping each listed point to the next one.
    pub fn cycle(len: usize, points: &[usize]) -> Result<Self, PermError> {
        let mut images = (0..len).collect_vec();
        for (&a, &b) in points.iter().circular_tuple_windows() {
            if a >= len {
                return Err(PermError::InvalidPermutation(points.to_vec()));
            }
            images[a] = b;
        }
        Self::new(images)
    }

    /// Uniformly random permutation by an unbiased shuffle.
    pub fn random(len: usize, rng: &mut impl Rng) -> Self {
        let mut out = Self::identity(len);
        for i in 0..len.saturating_sub(1) {
            let j = rng.gen_range(i..len);
            out.0.swap(i, j);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn apply(&self, i: usize) -> usize {
        self.0[i]
    }

    pub fn images(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item=usize> + '_ {
        self.0.iter().cloned()
    }

    pub fn is_identity(&self) -> bool {
        self.iter().enumerate().all(|(i, x)| i == x)
    }

    pub fn inverse(&self) -> Self {
        let mut out = vec![0; self.0.len()];
        for (i, &x) in self.0.iter().enumerate() {
            out[x] = i;
        }
        Self(out)
    }

    /// The composition `self * other`, applying `other` first.
    pub fn compose(&self, other: &Perm) -> Result<Self, PermError> {
        if self.len() != other.len() {
            return Err(PermError::InvalidPermOperation { left: self.len(), right: other.len() });
        }
        Ok(Self(other.iter().map(|i| self.apply(i)).collect()))
    }

    /// Image of a value built from points.
    pub fn image<T: Relabel>(&self, x: &T) -> T {
        x.relabeled(self)
    }

    /// Image of an ordered object such as a graph. Fails if the lengths differ.
    pub fn permute<P: Permutable>(&self, x: &P) -> Result<P, PermError> {
        if self.len() != x.len() {
            return Err(PermError::InvalidPermOperation { left: self.len(), right: x.len() });
        }
        Ok(x.permuted(self))
    }

    /// Whether every block is mapped onto itself, not necessarily pointwise.
    pub fn fixes_blocks(&self, blocks: &[Block]) -> bool {
        blocks.iter().all(|b| &self.image(b) == b)
    }

    /// Proper cycles, each starting at its smallest point, ordered by that point.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.len()];
        let mut out = vec![];
        for start in 0..self.len() {
            if seen[start] || self.apply(start) == start {
                continue;
            }
            let mut cycle = vec![];
            let mut i = start;
            while !seen[i] {
                seen[i] = true;
                cycle.push(i);
                i = self.apply(i);
            }
            out.push(cycle);
        }
        out
    }
}

impl TryFrom<Vec<usize>> for Perm {
    type Error = PermError;

    fn try_from(images: Vec<usize>) -> Result<Self, PermError> {
        Self::new(images)
    }
}

/// Size-major, then lexicographic by images. Only used for canonical ordering inside containers.
impl Ord for Perm {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len().cmp(&other.len()).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Perm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cycles = self.cycles();
        if cycles.is_empty() {
            return f.write_str("()");
        }
        for cycle in cycles {
            write!(f, "({})", cycle.iter().join(" "))?;
        }
        Ok(())
    }
}

impl Permutable for Perm {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn permuted(&self, x: &Perm) -> Self {
        Perm((0..self.len()).map(|i| x.apply(self.0[i])).collect())
    }
}

impl Mul<usize> for &Perm {
    type Output = usize;

    fn mul(self, rhs: usize) -> usize { self.apply(rhs) }
}

/// Composition, applying the right-hand side first. Panics if the lengths differ.
impl Mul<&Perm> for &Perm {
    type Output = Perm;

    fn mul(self, rhs: &Perm) -> Perm {
        assert_eq!(self.len(), rhs.len());
        Perm(rhs.iter().map(|i| self.apply(i)).collect())
    }
}

impl Mul<Perm> for Perm {
    type Output = Perm;

    fn mul(self, rhs: Perm) -> Perm { &self * &rhs }
}

/// Uniform distribution over permutations of a given length, sampled from seeded generators.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PermutationUniform {
    pub len: usize,
}

impl PermutationUniform {
    pub fn new(len: usize) -> Self { Self { len } }

    pub fn sample(&self, seed: usize) -> Perm {
        Perm::random(self.len, &mut Pcg64Mcg::seed_from_u64(seed as u64))
    }

    pub fn samples(&self, len: usize, seed: usize) -> Vec<Perm> {
        let mut rng = Pcg64Mcg::seed_from_u64(seed as u64);
        (0..len).map(|_| Perm::random(self.len, &mut rng)).collect()
    }
}
