//! Heavy/light labelling of the Z candidates and their leptons
use crate::{
    event::{FinalState, Flavour, Lepton, Leptons},
    pairing::{ZCandidate, ZPair},
    vector::FourVector,
};

/// Z candidates and leptons in canonical order
///
/// * `z1`: heavier Z candidate
/// * `z2`: lighter Z candidate
/// * `lep11`, `lep12`: lepton and anti-lepton of `z1`
/// * `lep21`, `lep22`: lepton and anti-lepton of `z2`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrderedCandidates {
    pub z1: ZCandidate,
    pub z2: ZCandidate,
    pub lep11: Lepton,
    pub lep12: Lepton,
    pub lep21: Lepton,
    pub lep22: Lepton,
}

impl OrderedCandidates {
    /// Four-momentum of the Higgs candidate
    pub fn higgs(&self) -> FourVector {
        self.z1.p + self.z2.p
    }

    /// Four-momenta in the order H, Z1, Z2, Lep11, Lep12, Lep21, Lep22
    pub fn momenta(&self) -> [FourVector; 7] {
        [
            self.higgs(),
            self.z1.p,
            self.z2.p,
            self.lep11.p,
            self.lep12.p,
            self.lep21.p,
            self.lep22.p,
        ]
    }
}

/// Assign the heavy/light labels
///
/// For four leptons of the same flavour Z1 is the heavier of the two
/// candidates. In the mixed final state the muon pair mass is compared
/// directly to the electron pair mass and the muon pair becomes Z1 only if
/// it is strictly heavier.
pub fn order(final_state: FinalState, pair: &ZPair, leptons: &Leptons) -> OrderedCandidates {
    let (z1, z2) = match final_state.same_flavour() {
        Some(_) => heavier_first(*pair.close(), *pair.far()),
        None => {
            let [a, b] = pair.0;
            let (muons, electrons) = if a.flavour == Flavour::Muon { (a, b) } else { (b, a) };
            heavier_first(muons, electrons)
        }
    };
    let [lep11, lep12] = split(&z1, leptons);
    let [lep21, lep22] = split(&z2, leptons);
    OrderedCandidates {
        z1,
        z2,
        lep11: *lep11,
        lep12: *lep12,
        lep21: *lep21,
        lep22: *lep22,
    }
}

fn heavier_first(a: ZCandidate, b: ZCandidate) -> (ZCandidate, ZCandidate) {
    if a.mass() > b.mass() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Negatively charged lepton first, then its anti-lepton
fn split<'a>(z: &ZCandidate, leptons: &'a Leptons) -> [&'a Lepton; 2] {
    let [first, second] = z.constituents(leptons);
    if first.charge == -1 {
        [first, second]
    } else {
        [second, first]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Z_MASS, pairing::z_candidates};

    const EL_MASS: f64 = 0.511e-3;
    const MU_MASS: f64 = 0.106;

    fn lepton(flavour: Flavour, px: f64, m: f64, charge: i32) -> Lepton {
        let p = FourVector::new((m * m + px * px).sqrt(), px, 0., 0.);
        Lepton {
            flavour,
            p,
            pt: p.pt(),
            eta: p.eta(),
            phi: p.phi(),
            mass: m,
            charge,
            iso: 0.,
            dxy: 0.,
            dz: 0.,
            dxy_err: 0.01,
            dz_err: 0.01,
        }
    }

    fn same_kind() -> Leptons {
        Leptons {
            muons: vec![],
            electrons: vec![
                lepton(Flavour::Electron, 10., EL_MASS, 1),
                lepton(Flavour::Electron, -15., EL_MASS, -1),
                lepton(Flavour::Electron, 50., EL_MASS, 1),
                lepton(Flavour::Electron, -45., EL_MASS, -1),
            ],
        }
    }

    #[test]
    fn same_kind_labels() {
        let leptons = same_kind();
        let pair = z_candidates(FinalState::FourElectrons, &leptons, Z_MASS).unwrap();
        let ordered = order(FinalState::FourElectrons, &pair, &leptons);
        assert_eq!(ordered.z1.leptons, [2, 3]);
        assert_eq!(ordered.z2.leptons, [0, 1]);
        assert!(ordered.z1.mass() >= ordered.z2.mass());
        assert_eq!(ordered.lep11, leptons.electrons[3]);
        assert_eq!(ordered.lep12, leptons.electrons[2]);
        assert_eq!(ordered.lep21, leptons.electrons[1]);
        assert_eq!(ordered.lep22, leptons.electrons[0]);
    }

    #[test]
    fn heavier_is_z1_even_when_far() {
        let leptons = same_kind();
        let pair = z_candidates(FinalState::FourElectrons, &leptons, Z_MASS).unwrap();
        let swapped = ZPair([pair.0[1], pair.0[0]]);
        let ordered = order(FinalState::FourElectrons, &swapped, &leptons);
        assert_eq!(ordered.z1.leptons, [2, 3]);
    }

    #[test]
    fn mixed_labels() {
        let leptons = Leptons {
            muons: vec![
                lepton(Flavour::Muon, 10., MU_MASS, -1),
                lepton(Flavour::Muon, -15., MU_MASS, 1),
            ],
            electrons: vec![
                lepton(Flavour::Electron, 50., EL_MASS, 1),
                lepton(Flavour::Electron, -45., EL_MASS, -1),
            ],
        };
        let pair = z_candidates(FinalState::TwoMuonsTwoElectrons, &leptons, Z_MASS).unwrap();
        let ordered = order(FinalState::TwoMuonsTwoElectrons, &pair, &leptons);
        assert_eq!(ordered.z1.flavour, Flavour::Electron);
        assert_eq!(ordered.lep11, leptons.electrons[1]);
        assert_eq!(ordered.lep12, leptons.electrons[0]);
        assert_eq!(ordered.lep21, leptons.muons[0]);
        assert_eq!(ordered.lep22, leptons.muons[1]);
    }
}
