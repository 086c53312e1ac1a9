//! Lorentz boosts into the Higgs and Z rest frames
use crate::{
    error::{Error, Result},
    ordering::OrderedCandidates,
    vector::{FourVector, ThreeVector},
};

/// Four-momenta of the decay chain seen from the rest frames needed for the
/// decay angles
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frames {
    pub z1_h_rest: FourVector,
    pub z2_h_rest: FourVector,
    pub lep11_h_rest: FourVector,
    pub lep12_h_rest: FourVector,
    pub lep21_h_rest: FourVector,
    pub lep22_h_rest: FourVector,
    pub lep11_z1_rest: FourVector,
    pub z2_z1_rest: FourVector,
    pub lep21_z2_rest: FourVector,
    pub z1_z2_rest: FourVector,
}

/// Boost taking lab-frame vectors into the rest frame of `p`
///
/// Fails unless `p` is time-like with positive energy.
pub fn rest_frame_boost(p: &FourVector, frame: &'static str) -> Result<ThreeVector> {
    if !(p.e() > 0.) || !(p.m2() > 0.) {
        return Err(Error::Degenerate(frame));
    }
    Ok(-p.boost_vector())
}

impl Frames {
    pub fn new(ordered: &OrderedCandidates) -> Result<Self> {
        let h_rest = rest_frame_boost(&ordered.higgs(), "Higgs candidate has no rest frame")?;
        let z1_rest = rest_frame_boost(&ordered.z1.p, "Z1 candidate has no rest frame")?;
        let z2_rest = rest_frame_boost(&ordered.z2.p, "Z2 candidate has no rest frame")?;
        Ok(Self {
            z1_h_rest: ordered.z1.p.boost(&h_rest),
            z2_h_rest: ordered.z2.p.boost(&h_rest),
            lep11_h_rest: ordered.lep11.p.boost(&h_rest),
            lep12_h_rest: ordered.lep12.p.boost(&h_rest),
            lep21_h_rest: ordered.lep21.p.boost(&h_rest),
            lep22_h_rest: ordered.lep22.p.boost(&h_rest),
            lep11_z1_rest: ordered.lep11.p.boost(&z1_rest),
            z2_z1_rest: ordered.z2.p.boost(&z1_rest),
            lep21_z2_rest: ordered.lep21.p.boost(&z2_rest),
            z1_z2_rest: ordered.z1.p.boost(&z2_rest),
        })
    }
}
