//! Stabilizer chains over a base of points and blocks, built by sifting and closure.
use crate::permutable::{Block, FHashMap, FHashSet, Perm, Relabel};
use log::{debug, trace};
use std::ops::Deref;

/// Base element of a chain level. A level stabilizes its point pointwise or its block setwise.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BasePoint {
    Point(usize),
    Block(Block),
}

impl Relabel for BasePoint {
    fn relabeled(&self, p: &Perm) -> Self {
        match self {
            Self::Point(i) => Self::Point(p.apply(*i)),
            Self::Block(b) => Self::Block(p.image(b)),
        }
    }
}

/// A level of a stabilizer chain: for every image of the base point reachable by the
/// level's subgroup, a representative mapping the base point there.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Level {
    pub base: BasePoint,
    pub transversal: FHashMap<BasePoint, Perm>,
}

impl Level {
    fn new(base: BasePoint, len: usize) -> Self {
        let transversal = FHashMap::from_iter([(base.clone(), Perm::identity(len))]);
        Self { base, transversal }
    }

    pub fn len(&self) -> usize {
        self.transversal.len()
    }

    pub fn representatives(&self) -> impl Iterator<Item=&Perm> {
        self.transversal.values()
    }

    fn representative(&self, g: &Perm) -> Option<&Perm> {
        self.transversal.get(&self.base.relabeled(g))
    }
}

/// Outcome of sifting a permutation through a chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Sifted {
    /// The permutation is a product of one representative per level.
    Redundant,
    /// No representative at `level` matches; `residue` fixes all earlier base points.
    New { level: usize, residue: Perm },
}

/// Worklist discipline for the closure.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Closure {
    /// Pending candidates are kept in a set, so equal candidates are sifted once.
    #[default]
    Deduplicated,
    /// Plain stack, may sift equal candidates repeatedly.
    Stack,
}

trait Worklist {
    fn push(&mut self, p: Perm);
    fn pop(&mut self) -> Option<Perm>;
}

impl Worklist for Vec<Perm> {
    fn push(&mut self, p: Perm) { Vec::push(self, p) }
    fn pop(&mut self) -> Option<Perm> { Vec::pop(self) }
}

#[derive(Default)]
struct DedupWorklist {
    stack: Vec<Perm>,
    pending: FHashSet<Perm>,
}

impl Worklist for DedupWorklist {
    fn push(&mut self, p: Perm) {
        if self.pending.insert(p.clone()) {
            self.stack.push(p);
        }
    }

    fn pop(&mut self) -> Option<Perm> {
        let p = self.stack.pop()?;
        self.pending.remove(&p);
        Some(p)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StabilizerChain {
    degree: usize,
    levels: Vec<Level>,
}

impl Deref for StabilizerChain {
    type Target = Vec<Level>;
    fn deref(&self) -> &Self::Target { &self.levels }
}

impl StabilizerChain {
    /// Chain over the base 0..len-1; the last point is fixed once all others are.
    pub fn points(len: usize, generators: &[Perm], closure: Closure) -> Self {
        Self::build(len, (0..len.saturating_sub(1)).map(BasePoint::Point).collect(), generators, closure)
    }

    /// Chain over an arbitrary base of points and blocks.
    pub fn build(len: usize, base: Vec<BasePoint>, generators: &[Perm], closure: Closure) -> Self {
        let levels = base.into_iter().map(|b| Level::new(b, len)).collect();
        let mut chain = Self { degree: len, levels };
        match closure {
            Closure::Deduplicated => chain.close(generators, DedupWorklist::default()),
            Closure::Stack => chain.close(generators, vec![]),
        }
        chain
    }

    /// Schreier-Sims closure: insert each new residue into its level, then queue its products
    /// with every representative on both sides.
    fn close(&mut self, generators: &[Perm], mut worklist: impl Worklist) {
        for g in generators {
            worklist.push(g.clone());
        }

        let mut sifted = 0usize;
        while let Some(g) = worklist.pop() {
            sifted += 1;
            let Sifted::New { level, residue } = self.sift(&g) else { continue };
            trace!("strong generator {residue} at level {level}");
            let key = self.levels[level].base.relabeled(&residue);
            self.levels[level].transversal.insert(key, residue.clone());
            for r in self.levels.iter().flat_map(|l| l.representatives()) {
                worklist.push(r * &residue);
                worklist.push(&residue * r);
            }
        }
        debug!("sifted {sifted} candidates into {} strong generators over {} levels",
            self.num_strong_generators(), self.levels.len());
    }

    /// Reduce g level by level. At each level, g is replaced by h^-1 * g for the representative
    /// h agreeing with g on the level's base point.
    pub fn sift(&self, g: &Perm) -> Sifted {
        let mut residue = g.clone();
        for (level, l) in self.levels.iter().enumerate() {
            match l.representative(&residue) {
                Some(h) => residue = &h.inverse() * &residue,
                None => return Sifted::New { level, residue },
            }
        }
        Sifted::Redundant
    }

    /// One representative per level whose product, in level order, is g.
    pub fn factorize(&self, g: &Perm) -> Option<Vec<Perm>> {
        let mut residue = g.clone();
        let mut factors = Vec::with_capacity(self.levels.len());
        for l in &self.levels {
            let h = l.representative(&residue)?;
            residue = &h.inverse() * &residue;
            factors.push(h.clone());
        }
        residue.is_identity().then_some(factors)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Transversal sizes, whose product is the order of the group.
    pub fn factors(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.len()).collect()
    }

    /// Non-identity representatives over all levels.
    pub fn num_strong_generators(&self) -> usize {
        self.levels.iter().map(|l| l.len() - 1).sum()
    }

    /// The chain made of the levels from `start` on, a chain of the subgroup fixing all earlier base points.
    pub fn suffix(&self, start: usize) -> Self {
        Self { degree: self.degree, levels: self.levels[start.min(self.levels.len())..].to_vec() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn perm(images: &[usize]) -> Perm {
        Perm::new(images.to_vec()).unwrap()
    }

    #[test]
    fn trivial_chain() {
        let chain = StabilizerChain::points(4, &[Perm::identity(4)], Closure::default());
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.factors(), vec![1, 1, 1]);
        assert_eq!(chain.sift(&perm(&[1, 0, 2, 3])), Sifted::New { level: 0, residue: perm(&[1, 0, 2, 3]) });
        assert_eq!(chain.sift(&perm(&[0, 1, 3, 2])), Sifted::New { level: 2, residue: perm(&[0, 1, 3, 2]) });
        assert_eq!(chain.sift(&Perm::identity(4)), Sifted::Redundant);
    }

    #[test]
    fn levels_fix_earlier_base_points() {
        let generators = [perm(&[1, 2, 3, 4, 0]), perm(&[1, 0, 2, 3, 4])];
        let chain = StabilizerChain::points(5, &generators, Closure::default());
        assert_eq!(chain.factors(), vec![5, 4, 3, 2]);
        for (i, level) in chain.iter().enumerate() {
            assert_eq!(level.base, BasePoint::Point(i));
            for (image, r) in &level.transversal {
                assert_eq!(&level.base.relabeled(r), image);
                assert!((0..i).all(|j| r.apply(j) == j));
            }
        }
    }

    #[test]
    fn closures_agree() {
        let generators = [perm(&[1, 2, 0, 3, 4, 5]), perm(&[3, 4, 5, 0, 1, 2])];
        let dedup = StabilizerChain::points(6, &generators, Closure::Deduplicated);
        let stack = StabilizerChain::points(6, &generators, Closure::Stack);
        let order = |c: &StabilizerChain| c.factors().iter().product::<usize>();
        assert_eq!(order(&dedup), 18);
        assert_eq!(order(&stack), 18);
    }

    #[test]
    fn factorization() {
        let generators = [perm(&[1, 2, 3, 0]), perm(&[1, 0, 2, 3])];
        let chain = StabilizerChain::points(4, &generators, Closure::default());
        let g = perm(&[2, 0, 3, 1]);
        let factors = chain.factorize(&g).unwrap();
        assert_eq!(factors.len(), 3);
        assert_eq!(factors.into_iter().reduce(|a, b| a * b), Some(g));
    }

    #[test]
    fn block_levels_compare_setwise() {
        let blocks = [Block::from([0, 1]), Block::from([2, 3])];
        let base = blocks.iter().cloned().map(BasePoint::Block).chain((0..3).map(BasePoint::Point)).collect_vec();
        let generators = [perm(&[2, 3, 0, 1]), perm(&[1, 0, 2, 3])];
        let chain = StabilizerChain::build(4, base, &generators, Closure::default());
        assert_eq!(chain.factors(), vec![2, 1, 2, 1, 2]);
        assert_eq!(chain.suffix(2).factors(), vec![2, 1, 2]);
        assert!(chain.suffix(9).is_empty());
    }

    #[test]
    fn empty_degree() {
        let chain = StabilizerChain::points(0, &[Perm::identity(0)], Closure::Stack);
        assert!(chain.is_empty());
        assert_eq!(chain.factorize(&Perm::identity(0)), Some(vec![]));
    }
}
