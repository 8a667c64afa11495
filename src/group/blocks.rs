//! Block systems of a permutation group and the subgroup fixing a block system.
use crate::group::chain::{BasePoint, StabilizerChain};
use crate::group::PermGroup;
use crate::permutable::graph::Graph;
use crate::permutable::{Block, FHashMap};
use itertools::Itertools;
use log::debug;
use std::collections::BTreeSet;

impl PermGroup {
    /// Minimal block system refined from the singletons of the given points.
    pub fn minimal_block_system_of_points(&self, points: impl IntoIterator<Item=usize>) -> Vec<Block> {
        self.minimal_block_system(points.into_iter().map(|p| Block::from([p])).collect())
    }

    /// Coarsens the given blocks until, for every i > 0, the orbit of the pair {B_0, B_i}
    /// connects all blocks. Whenever it does not, the blocks of each connected component are
    /// merged and the search starts over on the coarser partition.
    ///
    /// All points must be smaller than the degree of the group, or this panics. Pairs in an orbit that are not
    /// made of current blocks are ignored.
    pub fn minimal_block_system(&self, mut blocks: Vec<Block>) -> Vec<Block> {
        'refine: loop {
            let index: FHashMap<Block, usize> = blocks.iter().cloned().enumerate().map(|(i, b)| (b, i)).collect();
            for i in 1..blocks.len() {
                let pair = BTreeSet::from([blocks[0].clone(), blocks[i].clone()]);
                let mut graph = Graph::empty(blocks.len());
                for image in self.orbit(&pair) {
                    for (a, b) in image.iter().tuple_combinations() {
                        if let (Some(&a), Some(&b)) = (index.get(a), index.get(b)) {
                            graph.insert_edge((a, b));
                        }
                    }
                }

                let components = graph.components();
                if components.len() > 1 {
                    debug!("pair (0, {i}) merges {} blocks into {}", blocks.len(), components.len());
                    blocks = components.iter()
                        .map(|c| c.iter().flat_map(|&j| blocks[j].iter().cloned()).collect())
                        .collect();
                    continue 'refine;
                }
            }
            return blocks;
        }
    }

    /// Subgroup of all elements mapping each block onto itself, not necessarily pointwise.
    ///
    /// Blocks need not partition the points, but all points must be smaller than the degree of
    /// the group. Panics otherwise.
    pub fn block_stabilizer(&self, blocks: &[Block]) -> PermGroup {
        let base = blocks.iter().cloned().map(BasePoint::Block)
            .chain((0..self.len().saturating_sub(1)).map(BasePoint::Point))
            .collect();
        let chain = StabilizerChain::build(self.len(), base, self.generators(), self.closure());
        debug!("block stabilizer over {} blocks with block levels {:?}", blocks.len(), &chain.factors()[..blocks.len()]);
        PermGroup::from_chain(chain.suffix(blocks.len()), self.closure())
    }
}
