use crate::permutable::{Block, FHashSet, Perm, Permutable};
use itertools::Itertools;
use rand::Rng;
use std::collections::VecDeque;

pub type EdgeIndex = (usize, usize);

/// Undirected graph without self-loops on the vertices 0..len.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Graph {
    pub nodes: Vec<FHashSet<usize>>,
}

impl Graph {
    pub fn empty(len: usize) -> Self {
        Self { nodes: vec![FHashSet::default(); len] }
    }

    pub fn new(len: usize, edges: impl IntoIterator<Item=EdgeIndex>) -> Self {
        let mut x = Self::empty(len);
        for e in edges {
            x.insert_edge(e);
        }
        x
    }

    /// Random graph from the G(n, p) model, with p clamped to [0, 1].
    pub fn gnp(len: usize, p: f64, rng: &mut impl Rng) -> Self {
        let p = p.clamp(0., 1.);
        let mut out = Self::empty(len);
        for (i, j) in (0..len).tuple_combinations() {
            if rng.gen::<f64>() < p {
                out.insert_edge((i, j));
            }
        }
        out
    }

    /// Returns false without changing the graph if an endpoint is out of range or both are equal.
    pub fn insert_edge(&mut self, (i, j): EdgeIndex) -> bool {
        if i >= self.len() || j >= self.len() || i == j {
            return false;
        }
        self.nodes[i].insert(j);
        self.nodes[j].insert(i);
        true
    }

    /// Returns true if the edge existed.
    pub fn remove_edge(&mut self, (i, j): EdgeIndex) -> bool {
        if !self.has_edge((i, j)) {
            return false;
        }
        self.nodes[i].remove(&j);
        self.nodes[j].remove(&i);
        true
    }

    pub fn has_edge(&self, (i, j): EdgeIndex) -> bool {
        self.nodes.get(i).is_some_and(|ne| ne.contains(&j))
    }

    pub fn neighbors(&self, i: usize) -> &FHashSet<usize> {
        &self.nodes[i]
    }

    pub fn degree(&self, i: usize) -> usize {
        self.nodes[i].len()
    }

    pub fn max_degree(&self) -> usize {
        self.nodes.iter().map(|ne| ne.len()).max().unwrap_or(0)
    }

    pub fn num_edges(&self) -> usize {
        self.nodes.iter().map(|ne| ne.len()).sum::<usize>() / 2
    }

    /// Edges (i, j) with i < j in ascending order.
    pub fn edges(&self) -> Vec<EdgeIndex> {
        self.nodes.iter().enumerate().flat_map(|(i, ne)|
            ne.iter().filter(move |&&j| i < j).map(move |&j| (i, j))).sorted_unstable().collect()
    }

    /// Vertices connected to i, found by breadth-first search. Empty if i is out of range.
    pub fn component(&self, i: usize) -> Block {
        let mut out = Block::new();
        if i >= self.len() {
            return out;
        }
        let mut queue = VecDeque::from([i]);
        out.insert(i);
        while let Some(current) = queue.pop_front() {
            for &j in &self.nodes[current] {
                if out.insert(j) {
                    queue.push_back(j);
                }
            }
        }
        out
    }

    /// Disjoint connected components covering all vertices, ordered by their smallest vertex.
    pub fn components(&self) -> Vec<Block> {
        let mut found = vec![false; self.len()];
        let mut out = vec![];
        for i in 0..self.len() {
            if found[i] {
                continue;
            }
            let component = self.component(i);
            for &j in &component {
                found[j] = true;
            }
            out.push(component);
        }
        out
    }

    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }
}

impl Permutable for Graph {
    fn len(&self) -> usize { self.nodes.len() }

    fn permuted(&self, p: &Perm) -> Self {
        assert_eq!(self.len(), p.len());
        let mut out = Self::empty(self.len());
        for (i, j) in self.edges() {
            out.insert_edge((p.apply(i), p.apply(j)));
        }
        out
    }
}
