use std::fmt::{self, Display};
use std::str::FromStr;

use itertools::izip;
use particle_id::ParticleID;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    vector::FourVector,
};

/// PDG code of the electron
pub const ELECTRON: i32 = 11;
/// PDG code of the muon
pub const MUON: i32 = 13;

/// Charged lepton flavour
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Flavour {
    Muon,
    Electron,
}

impl Flavour {
    /// Particle type of the negatively charged lepton
    pub fn particle_id(self) -> ParticleID {
        match self {
            Flavour::Muon => ParticleID::new(MUON),
            Flavour::Electron => ParticleID::new(ELECTRON),
        }
    }
}

impl Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flavour::Muon => write!(f, "Muon"),
            Flavour::Electron => write!(f, "Electron"),
        }
    }
}

/// Lepton flavour composition of a Higgs candidate decay
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum FinalState {
    FourMuons,
    FourElectrons,
    TwoMuonsTwoElectrons,
}

impl FinalState {
    pub const ALL: [FinalState; 3] = [
        FinalState::FourMuons,
        FinalState::FourElectrons,
        FinalState::TwoMuonsTwoElectrons,
    ];

    /// Flavour of all four leptons, if they share one
    pub fn same_flavour(self) -> Option<Flavour> {
        match self {
            FinalState::FourMuons => Some(Flavour::Muon),
            FinalState::FourElectrons => Some(Flavour::Electron),
            FinalState::TwoMuonsTwoElectrons => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FinalState::FourMuons => "FourMuons",
            FinalState::FourElectrons => "FourElectrons",
            FinalState::TwoMuonsTwoElectrons => "TwoMuonsTwoElectrons",
        }
    }
}

impl Display for FinalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinalState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FinalState::ALL
            .into_iter()
            .find(|fs| fs.as_str() == s)
            .ok_or_else(|| Error::UnknownFinalState(s.to_owned()))
    }
}

/// A reconstructed charged lepton
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Lepton {
    pub flavour: Flavour,
    /// Four-momentum
    pub p: FourVector,
    /// Transverse momentum in GeV
    pub pt: f64,
    /// Pseudorapidity
    pub eta: f64,
    /// Azimuthal angle
    pub phi: f64,
    /// Mass in GeV
    pub mass: f64,
    /// Electric charge, ±1
    pub charge: i32,
    /// Relative isolation
    pub iso: f64,
    /// Transverse impact parameter in cm
    pub dxy: f64,
    /// Longitudinal impact parameter in cm
    pub dz: f64,
    pub dxy_err: f64,
    pub dz_err: f64,
}

impl Lepton {
    /// Signed particle type, positive for the negatively charged lepton
    pub fn id(&self) -> ParticleID {
        let id = self.flavour.particle_id().id();
        if self.charge < 0 {
            ParticleID::new(id)
        } else {
            ParticleID::new(-id)
        }
    }

    /// Three-dimensional impact parameter significance
    pub fn sip(&self) -> f64 {
        sip(self.dxy, self.dz, self.dxy_err, self.dz_err)
    }

    pub fn delta_r(&self, other: &Lepton) -> f64 {
        crate::vector::delta_r(self.eta, other.eta, self.phi, other.phi)
    }
}

/// Impact parameter at the point of closest approach divided by its uncertainty
pub fn sip(dxy: f64, dz: f64, dxy_err: f64, dz_err: f64) -> f64 {
    dxy.hypot(dz) / dxy_err.hypot(dz_err)
}

/// Flat per-event arrays for leptons of one flavour
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LeptonColumns {
    pub pt: Vec<f32>,
    pub eta: Vec<f32>,
    pub phi: Vec<f32>,
    pub mass: Vec<f32>,
    pub charge: Vec<i32>,
    #[serde(rename = "pfRelIso")]
    pub pf_rel_iso: Vec<f32>,
    pub dxy: Vec<f32>,
    pub dz: Vec<f32>,
    #[serde(rename = "dxyErr")]
    pub dxy_err: Vec<f32>,
    #[serde(rename = "dzErr")]
    pub dz_err: Vec<f32>,
}

impl LeptonColumns {
    /// Multiplicity as given by the `pt` column
    pub fn len(&self) -> usize {
        self.pt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pt.is_empty()
    }

    /// Assemble leptons from the columns
    pub fn leptons(&self, flavour: Flavour) -> Result<Vec<Lepton>> {
        self.check_lengths(flavour)?;
        let leptons = izip!(
            &self.pt,
            &self.eta,
            &self.phi,
            &self.mass,
            &self.charge,
            &self.pf_rel_iso,
            &self.dxy,
            &self.dz,
            &self.dxy_err,
            &self.dz_err,
        )
        .map(|(&pt, &eta, &phi, &mass, &charge, &iso, &dxy, &dz, &dxy_err, &dz_err)| {
            let (pt, eta, phi, mass) = (pt as f64, eta as f64, phi as f64, mass as f64);
            Lepton {
                flavour,
                p: FourVector::from_pt_eta_phi_m(pt, eta, phi, mass),
                pt,
                eta,
                phi,
                mass,
                charge,
                iso: iso as f64,
                dxy: dxy as f64,
                dz: dz as f64,
                dxy_err: dxy_err as f64,
                dz_err: dz_err as f64,
            }
        })
        .collect();
        Ok(leptons)
    }

    fn check_lengths(&self, flavour: Flavour) -> Result<()> {
        let expected = self.len();
        let lengths = [
            ("eta", self.eta.len()),
            ("phi", self.phi.len()),
            ("mass", self.mass.len()),
            ("charge", self.charge.len()),
            ("pfRelIso", self.pf_rel_iso.len()),
            ("dxy", self.dxy.len()),
            ("dz", self.dz.len()),
            ("dxyErr", self.dxy_err.len()),
            ("dzErr", self.dz_err.len()),
        ];
        match lengths.into_iter().find(|(_, got)| *got != expected) {
            Some((column, got)) => Err(Error::ColumnLength {
                flavour,
                column,
                expected,
                got,
            }),
            None => Ok(()),
        }
    }
}

/// One row of the input event store
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventRecord {
    /// Run number
    pub run: Option<u32>,
    /// Event number
    pub event: Option<u64>,
    #[serde(rename = "Muon")]
    pub muons: LeptonColumns,
    #[serde(rename = "Electron")]
    pub electrons: LeptonColumns,
}

impl EventRecord {
    pub fn columns(&self, flavour: Flavour) -> &LeptonColumns {
        match flavour {
            Flavour::Muon => &self.muons,
            Flavour::Electron => &self.electrons,
        }
    }

    pub fn n_muon(&self) -> usize {
        self.muons.len()
    }

    pub fn n_electron(&self) -> usize {
        self.electrons.len()
    }
}

/// Leptons of one event, split by flavour
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Leptons {
    pub muons: Vec<Lepton>,
    pub electrons: Vec<Lepton>,
}

impl Leptons {
    pub fn of(&self, flavour: Flavour) -> &[Lepton] {
        match flavour {
            Flavour::Muon => &self.muons,
            Flavour::Electron => &self.electrons,
        }
    }
}

impl TryFrom<&EventRecord> for Leptons {
    type Error = Error;

    fn try_from(source: &EventRecord) -> Result<Self> {
        Ok(Self {
            muons: source.muons.leptons(Flavour::Muon)?,
            electrons: source.electrons.leptons(Flavour::Electron)?,
        })
    }
}
