//! Combination of leptons into Z boson candidates
use itertools::Itertools;

use crate::{
    event::{FinalState, Flavour, Lepton, Leptons},
    vector::FourVector,
};

/// Opposite-charge lepton pair approximating a Z boson
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZCandidate {
    /// Flavour of both leptons
    pub flavour: Flavour,
    /// Indices into the leptons of `flavour`, in pairing order
    pub leptons: [usize; 2],
    /// Sum of the lepton four-momenta
    pub p: FourVector,
}

impl ZCandidate {
    pub fn new(flavour: Flavour, leptons: &[Lepton], pair: [usize; 2]) -> Self {
        Self {
            flavour,
            leptons: pair,
            p: leptons[pair[0]].p + leptons[pair[1]].p,
        }
    }

    pub fn mass(&self) -> f64 {
        self.p.mass()
    }

    /// |m - `z_mass`|
    pub fn distance(&self, z_mass: f64) -> f64 {
        (self.mass() - z_mass).abs()
    }

    /// The two constituent leptons
    pub fn constituents<'a>(&self, leptons: &'a Leptons) -> [&'a Lepton; 2] {
        let of = leptons.of(self.flavour);
        [&of[self.leptons[0]], &of[self.leptons[1]]]
    }
}

/// The two Z candidates of an event in ascending distance to the Z mass
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZPair(pub [ZCandidate; 2]);

impl ZPair {
    /// Order two candidates by distance to `z_mass`, keeping the given order on ties
    pub fn sorted(first: ZCandidate, second: ZCandidate, z_mass: f64) -> Self {
        if second.distance(z_mass) < first.distance(z_mass) {
            Self([second, first])
        } else {
            Self([first, second])
        }
    }

    /// Candidate closest to the Z mass
    pub fn close(&self) -> &ZCandidate {
        &self.0[0]
    }

    pub fn far(&self) -> &ZCandidate {
        &self.0[1]
    }

    /// Four-momentum of the Higgs candidate
    pub fn higgs(&self) -> FourVector {
        self.0[0].p + self.0[1].p
    }

    /// Angular separation veto: both candidates have ΔR ≥ `min_delta_r`
    /// between their leptons
    pub fn separated(&self, leptons: &Leptons, min_delta_r: f64) -> bool {
        self.0.iter().all(|z| {
            let [l1, l2] = z.constituents(leptons);
            l1.delta_r(l2) >= min_delta_r
        })
    }
}

/// Find the opposite-charge pair of same-flavour leptons whose invariant
/// mass is closest to `z_mass`, and the complementary pair
///
/// Requires exactly four leptons with two positive and two negative
/// charges. Among equally close pairs the first one in combination order
/// wins.
pub fn pair_same_kind(leptons: &[Lepton], z_mass: f64) -> Option<[[usize; 2]; 2]> {
    if leptons.len() != 4
        || leptons.iter().filter(|l| l.charge == 1).count() != 2
        || leptons.iter().filter(|l| l.charge == -1).count() != 2
    {
        return None;
    }
    let mut best: Option<([usize; 2], f64)> = None;
    for (i1, i2) in (0..leptons.len()).tuple_combinations() {
        if leptons[i1].charge == leptons[i2].charge {
            continue;
        }
        let distance = ((leptons[i1].p + leptons[i2].p).mass() - z_mass).abs();
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some(([i1, i2], distance));
        }
    }
    let (first, _) = best?;
    let rest = (0..leptons.len())
        .filter(|i| !first.contains(i))
        .collect_tuple::<(usize, usize)>()?;
    Some([first, [rest.0, rest.1]])
}

/// Build both Z candidates of an event
///
/// Same-flavour final states are paired by [pair_same_kind]; in the mixed
/// final state the muon pair and the electron pair are the candidates.
/// Returns `None` if the leptons cannot form two neutral pairs.
pub fn z_candidates(final_state: FinalState, leptons: &Leptons, z_mass: f64) -> Option<ZPair> {
    match final_state.same_flavour() {
        Some(flavour) => {
            let of = leptons.of(flavour);
            let [first, second] = pair_same_kind(of, z_mass)?;
            Some(ZPair::sorted(
                ZCandidate::new(flavour, of, first),
                ZCandidate::new(flavour, of, second),
                z_mass,
            ))
        }
        None => {
            let muon = neutral_pair(Flavour::Muon, &leptons.muons)?;
            let electron = neutral_pair(Flavour::Electron, &leptons.electrons)?;
            Some(ZPair::sorted(muon, electron, z_mass))
        }
    }
}

fn neutral_pair(flavour: Flavour, leptons: &[Lepton]) -> Option<ZCandidate> {
    match leptons {
        [l1, l2] if l1.charge + l2.charge == 0 => Some(ZCandidate::new(flavour, leptons, [0, 1])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Reconstruction, Z_MASS};
    use approx::assert_abs_diff_eq;

    const EL_MASS: f64 = 0.511e-3;

    fn lepton(flavour: Flavour, p: FourVector, charge: i32) -> Lepton {
        Lepton {
            flavour,
            p,
            pt: p.pt(),
            eta: p.eta(),
            phi: p.phi(),
            mass: p.mass(),
            charge,
            iso: 0.,
            dxy: 0.,
            dz: 0.,
            dxy_err: 0.01,
            dz_err: 0.01,
        }
    }

    fn along_x(px: f64, m: f64) -> FourVector {
        FourVector::new((m * m + px * px).sqrt(), px, 0., 0.)
    }

    // leptons at rest in the transverse plane combine into a pair of
    // mass `m` when they are back to back with energy m/2 each
    fn back_to_back(m: f64, phi: f64) -> [FourVector; 2] {
        let e = m / 2.;
        let (s, c) = phi.sin_cos();
        [
            FourVector::new(e, e * c, e * s, 0.),
            FourVector::new(e, -e * c, -e * s, 0.),
        ]
    }

    #[test]
    fn same_kind_collinear() {
        let electrons = vec![
            lepton(Flavour::Electron, along_x(10., EL_MASS), 1),
            lepton(Flavour::Electron, along_x(-15., EL_MASS), -1),
            lepton(Flavour::Electron, along_x(50., EL_MASS), 1),
            lepton(Flavour::Electron, along_x(-45., EL_MASS), -1),
        ];
        assert_eq!(pair_same_kind(&electrons, Z_MASS), Some([[2, 3], [0, 1]]));
    }

    #[test]
    fn closest_pairing_wins() {
        // (0, 2) has 91 GeV and (1, 3) complements it
        let [a, b] = back_to_back(91., 0.3);
        let [c, d] = back_to_back(30., 1.7);
        let muons = vec![
            lepton(Flavour::Muon, a, 1),
            lepton(Flavour::Muon, c, 1),
            lepton(Flavour::Muon, b, -1),
            lepton(Flavour::Muon, d, -1),
        ];
        let m03 = (a + d).mass();
        assert!((m03 - Z_MASS).abs() > (91. - Z_MASS).abs());
        assert_eq!(pair_same_kind(&muons, Z_MASS), Some([[0, 2], [1, 3]]));

        let leptons = Leptons {
            muons,
            electrons: vec![],
        };
        let pair = z_candidates(FinalState::FourMuons, &leptons, Z_MASS).unwrap();
        assert_eq!(pair.close().leptons, [0, 2]);
        assert_eq!(pair.far().leptons, [1, 3]);
        assert_abs_diff_eq!(pair.close().mass(), 91., epsilon = 1e-9);
        assert_abs_diff_eq!(pair.far().mass(), 30., epsilon = 1e-9);
    }

    #[test]
    fn partition_and_neutrality() {
        let [a, b] = back_to_back(70., 0.);
        let [c, d] = back_to_back(25., 2.);
        for charges in [[1, -1, 1, -1], [1, 1, -1, -1], [-1, 1, 1, -1]] {
            let muons: Vec<_> = [a, b, c, d]
                .into_iter()
                .zip(charges)
                .map(|(p, q)| lepton(Flavour::Muon, p, q))
                .collect();
            let [first, second] = pair_same_kind(&muons, Z_MASS).unwrap();
            let mut all: Vec<_> = first.iter().chain(second.iter()).copied().collect();
            all.sort();
            assert_eq!(all, [0, 1, 2, 3]);
            for pair in [first, second] {
                assert_eq!(muons[pair[0]].charge + muons[pair[1]].charge, 0);
            }
        }
    }

    #[test]
    fn unbalanced_charges() {
        let [a, b] = back_to_back(70., 0.);
        let muons: Vec<_> = [a, b, a, b]
            .into_iter()
            .zip([1, 1, 1, -1])
            .map(|(p, q)| lepton(Flavour::Muon, p, q))
            .collect();
        assert_eq!(pair_same_kind(&muons, Z_MASS), None);
        assert_eq!(pair_same_kind(&muons[..3], Z_MASS), None);
    }

    #[test]
    fn mixed_final_state() {
        let [m1, m2] = back_to_back(95., 0.4);
        let [e1, e2] = back_to_back(50., 2.);
        let leptons = Leptons {
            muons: vec![lepton(Flavour::Muon, m1, -1), lepton(Flavour::Muon, m2, 1)],
            electrons: vec![
                lepton(Flavour::Electron, e1, 1),
                lepton(Flavour::Electron, e2, -1),
            ],
        };
        let pair = z_candidates(FinalState::TwoMuonsTwoElectrons, &leptons, Z_MASS).unwrap();
        assert_eq!(pair.close().flavour, Flavour::Muon);
        assert_eq!(pair.far().flavour, Flavour::Electron);
        assert_abs_diff_eq!(pair.higgs().mass(), 145., epsilon = 1e-9);
    }

    #[test]
    fn mass_windows() {
        let reco = Reconstruction::default();
        let [a, b] = back_to_back(91., 0.3);
        let [c, d] = back_to_back(10., 1.7);
        let muons = vec![
            lepton(Flavour::Muon, a, 1),
            lepton(Flavour::Muon, c, 1),
            lepton(Flavour::Muon, b, -1),
            lepton(Flavour::Muon, d, -1),
        ];
        let leptons = Leptons {
            muons,
            electrons: vec![],
        };
        // second candidate at 10 GeV is below the 12 GeV threshold
        let pair = z_candidates(FinalState::FourMuons, &leptons, Z_MASS).unwrap();
        assert!(reco.z_close_window.contains(pair.close().mass()));
        assert!(!reco.z_far_window.contains(pair.far().mass()));
    }

    #[test]
    fn delta_r_veto() {
        let p = FourVector::from_pt_eta_phi_m(30., 0.5, 1., 0.);
        let q = FourVector::from_pt_eta_phi_m(30., 0.51, 1.005, 0.);
        let muons = vec![lepton(Flavour::Muon, p, 1), lepton(Flavour::Muon, q, -1)];
        let [e1, e2] = back_to_back(50., 2.);
        let leptons = Leptons {
            muons,
            electrons: vec![
                lepton(Flavour::Electron, e1, 1),
                lepton(Flavour::Electron, e2, -1),
            ],
        };
        let pair = z_candidates(FinalState::TwoMuonsTwoElectrons, &leptons, Z_MASS).unwrap();
        assert!(!pair.separated(&leptons, 0.02));
        assert!(pair.separated(&leptons, 0.01));
    }
}
