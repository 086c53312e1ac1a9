use hzz4l::event::{EventRecord, LeptonColumns};

pub const MUON_MASS: f32 = 0.106;
pub const ELECTRON_MASS: f32 = 0.000511;

/// Well isolated prompt lepton given by (pt, eta, phi, charge)
pub type Kinematics = (f32, f32, f32, i32);

/// Columns of prompt, well isolated leptons
pub fn columns(leptons: &[Kinematics], mass: f32) -> LeptonColumns {
    let n = leptons.len();
    LeptonColumns {
        pt: leptons.iter().map(|l| l.0).collect(),
        eta: leptons.iter().map(|l| l.1).collect(),
        phi: leptons.iter().map(|l| l.2).collect(),
        mass: vec![mass; n],
        charge: leptons.iter().map(|l| l.3).collect(),
        pf_rel_iso: vec![0.05; n],
        dxy: vec![0.001; n],
        dz: vec![0.002; n],
        dxy_err: vec![0.001; n],
        dz_err: vec![0.001; n],
    }
}

pub fn event(muons: &[Kinematics], electrons: &[Kinematics]) -> EventRecord {
    EventRecord {
        run: Some(195013),
        event: Some(1),
        muons: columns(muons, MUON_MASS),
        electrons: columns(electrons, ELECTRON_MASS),
    }
}

/// Four muons where the pairing (0, 2) has a mass of 91 GeV and (0, 3) of 60 GeV
pub fn four_muons_91_60() -> EventRecord {
    let phi3 = -(1. - 3600. / (2. * 45.5 * 20.0_f64)).acos();
    event(
        &[
            (45.5, 0., 0., 1),
            (25., 0.5, 1.5, 1),
            (45.5, 0., std::f32::consts::PI, -1),
            (20., 0., phi3 as f32, -1),
        ],
        &[],
    )
}

/// Generic four-muon event with Z candidates of about 89.5 and 37.9 GeV
pub fn four_muons() -> EventRecord {
    event(
        &[
            (45., 0.3, 0.1, 1),
            (40., -0.4, 3.0, -1),
            (20., 1.1, -1.6, 1),
            (15., 0.2, 1.8, -1),
        ],
        &[],
    )
}

/// Two muons and two electrons with pair masses of about 75 and 62 GeV
pub fn two_muons_two_electrons() -> EventRecord {
    event(
        &[(38., -0.2, 0.4, 1), (33., 0.5, -2.6, -1)],
        &[(25., 1.2, 1.5, -1), (18., -0.7, -1.1, 1)],
    )
}

/// Back-to-back pairs with the given muon and electron pair masses
///
/// The muon pair is at rest, the electron pair recoils transversely.
pub fn back_to_back(muon_pair_mass: f32, electron_pair_mass: f32) -> EventRecord {
    use std::f32::consts::PI;
    let mu_pt = muon_pair_mass / 2.;
    let (e1_pt, e2_pt) = (0.625 * electron_pair_mass, 0.4 * electron_pair_mass);
    event(
        &[(mu_pt, 0., 0.2, 1), (mu_pt, 0., 0.2 - PI, -1)],
        &[(e1_pt, 0., 1.5, 1), (e2_pt, 0., 1.5 - PI, -1)],
    )
}

/// Four muons whose far pair is two identical muons
///
/// The event passes the selection once the far mass window and the ΔR veto
/// start at zero, but the Z2 decay plane is undefined.
pub fn collinear_z2() -> EventRecord {
    use std::f32::consts::PI;
    event(
        &[
            (45.5, 0., 0., 1),
            (45.5, 0., PI, -1),
            (20., 1., 1.2, 1),
            (20., 1., 1.2, -1),
        ],
        &[],
    )
}
