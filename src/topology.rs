//! Decay graph of a reconstructed H → Z1 Z2 → 4ℓ candidate
use particle_id::ParticleID;
use petgraph::{prelude::DiGraph, visit::EdgeRef, Direction};

use crate::{ordering::OrderedCandidates, vector::FourVector};

/// PDG code of the Higgs boson
pub const HIGGS: i32 = 25;
/// PDG code of the Z boson
pub const Z: i32 = 23;

/// Position of each particle in [DecayTree::particles]
pub const H_IDX: usize = 0;
pub const Z1_IDX: usize = 1;
pub const Z2_IDX: usize = 2;
pub const LEP11_IDX: usize = 3;
pub const LEP12_IDX: usize = 4;
pub const LEP21_IDX: usize = 5;
pub const LEP22_IDX: usize = 6;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecayParticle {
    pub id: ParticleID,
    pub p: FourVector,
}

/// Reconstructed decay chain
#[derive(Clone, Debug)]
pub struct DecayTree {
    /// H, Z1, Z2, Lep11, Lep12, Lep21, Lep22
    pub particles: Vec<DecayParticle>,
    /// Edge weights correspond to the index in the `particles` vector
    pub topology: DiGraph<(), usize>,
}

impl DecayTree {
    pub fn new(ordered: &OrderedCandidates) -> Self {
        let [h, z1, z2, lep11, lep12, lep21, lep22] = ordered.momenta();
        let particles = vec![
            DecayParticle { id: ParticleID::new(HIGGS), p: h },
            DecayParticle { id: ParticleID::new(Z), p: z1 },
            DecayParticle { id: ParticleID::new(Z), p: z2 },
            DecayParticle { id: ordered.lep11.id(), p: lep11 },
            DecayParticle { id: ordered.lep12.id(), p: lep12 },
            DecayParticle { id: ordered.lep21.id(), p: lep21 },
            DecayParticle { id: ordered.lep22.id(), p: lep22 },
        ];

        let mut g = DiGraph::new();
        let production = g.add_node(());
        let h_decay = g.add_node(());
        let z1_decay = g.add_node(());
        let z2_decay = g.add_node(());
        g.add_edge(production, h_decay, H_IDX);
        g.add_edge(h_decay, z1_decay, Z1_IDX);
        g.add_edge(h_decay, z2_decay, Z2_IDX);
        for (decay, leptons) in [
            (z1_decay, [LEP11_IDX, LEP12_IDX]),
            (z2_decay, [LEP21_IDX, LEP22_IDX]),
        ] {
            for lepton in leptons {
                let end = g.add_node(());
                g.add_edge(decay, end, lepton);
            }
        }
        Self {
            particles,
            topology: g,
        }
    }

    /// Indices of the decay products of particle `idx`
    pub fn daughters(&self, idx: usize) -> Vec<usize> {
        let g = &self.topology;
        let Some(edge) = g.edge_references().find(|e| *e.weight() == idx) else {
            return Vec::new();
        };
        let mut daughters: Vec<_> = g
            .edges_directed(edge.target(), Direction::Outgoing)
            .map(|e| *e.weight())
            .collect();
        daughters.sort_unstable();
        daughters
    }

    /// Index of the particle that decayed into particle `idx`
    pub fn mother(&self, idx: usize) -> Option<usize> {
        let g = &self.topology;
        let edge = g.edge_references().find(|e| *e.weight() == idx)?;
        g.edges_directed(edge.source(), Direction::Incoming)
            .next()
            .map(|e| *e.weight())
    }

    /// Particles without decay products
    pub fn final_state(&self) -> Vec<usize> {
        (0..self.particles.len())
            .filter(|&idx| self.daughters(idx).is_empty())
            .collect()
    }
}
