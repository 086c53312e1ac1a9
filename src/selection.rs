//! Event filter and cut-flow bookkeeping
use std::fmt::{self, Display};

use ahash::AHashMap;
use serde::Serialize;

use crate::{
    config::SelectionCuts,
    event::{FinalState, Flavour, Lepton, Leptons},
};

/// A named event-level requirement
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Cut {
    /// Exact lepton multiplicity of the final state
    Multiplicity(FinalState),
    /// Leptons of each flavour come in opposite-charge pairs
    Charge(FinalState),
    /// All leptons of the final state are isolated
    Isolation(FinalState),
    /// Minimum pt and maximum |η| for every lepton of one flavour
    Kinematics(Flavour),
    /// Maximum |η| for muons and electrons
    Eta,
    /// Leading and trailing pt of at least one same-flavour pair
    PtThresholds,
    /// ΔR between the two muons and between the two electrons
    DeltaR,
    /// Leptons of one flavour are compatible with the primary vertex
    PrimaryVertex(Flavour),
}

use Cut::*;

const FOUR_MUONS: [Cut; 5] = [
    Multiplicity(FinalState::FourMuons),
    Charge(FinalState::FourMuons),
    Isolation(FinalState::FourMuons),
    Kinematics(Flavour::Muon),
    PrimaryVertex(Flavour::Muon),
];

const FOUR_ELECTRONS: [Cut; 5] = [
    Multiplicity(FinalState::FourElectrons),
    Charge(FinalState::FourElectrons),
    Isolation(FinalState::FourElectrons),
    Kinematics(Flavour::Electron),
    PrimaryVertex(Flavour::Electron),
];

const TWO_MUONS_TWO_ELECTRONS: [Cut; 8] = [
    Multiplicity(FinalState::TwoMuonsTwoElectrons),
    Charge(FinalState::TwoMuonsTwoElectrons),
    Eta,
    Isolation(FinalState::TwoMuonsTwoElectrons),
    PtThresholds,
    DeltaR,
    PrimaryVertex(Flavour::Muon),
    PrimaryVertex(Flavour::Electron),
];

/// The ordered list of cuts defining the selection of a final state
pub fn cuts(final_state: FinalState) -> &'static [Cut] {
    match final_state {
        FinalState::FourMuons => &FOUR_MUONS,
        FinalState::FourElectrons => &FOUR_ELECTRONS,
        FinalState::TwoMuonsTwoElectrons => &TWO_MUONS_TWO_ELECTRONS,
    }
}

fn flavours(final_state: FinalState) -> &'static [Flavour] {
    match final_state {
        FinalState::FourMuons => &[Flavour::Muon],
        FinalState::FourElectrons => &[Flavour::Electron],
        FinalState::TwoMuonsTwoElectrons => &[Flavour::Muon, Flavour::Electron],
    }
}

impl Cut {
    pub fn name(&self) -> &'static str {
        match self {
            Multiplicity(FinalState::FourMuons) => "Four muons",
            Multiplicity(FinalState::FourElectrons) => "Four electrons",
            Multiplicity(FinalState::TwoMuonsTwoElectrons) => "Two muons and two electrons",
            Charge(FinalState::FourMuons) => "Two positive and two negative muons",
            Charge(FinalState::FourElectrons) => "Two positive and two negative electrons",
            Charge(FinalState::TwoMuonsTwoElectrons) => {
                "Two opposite charged electron and muon pairs"
            }
            Isolation(FinalState::FourMuons) => "Good isolation of the muons",
            Isolation(FinalState::FourElectrons) => "Good isolation of the electrons",
            Isolation(FinalState::TwoMuonsTwoElectrons) => "Require good isolation",
            Kinematics(Flavour::Muon) => "Good muon kinematics",
            Kinematics(Flavour::Electron) => "Good electron kinematics",
            Eta => "Eta cuts",
            PtThresholds => "Pt cuts",
            DeltaR => "Delta R cuts",
            PrimaryVertex(Flavour::Muon) => "Muons originate from the same primary vertex",
            PrimaryVertex(Flavour::Electron) => {
                "Electrons originate from the same primary vertex"
            }
        }
    }

    /// Whether the leptons of one event satisfy this requirement
    pub fn passes(&self, leptons: &Leptons, cuts: &SelectionCuts) -> bool {
        match *self {
            Multiplicity(fs) => match fs.same_flavour() {
                Some(flavour) => leptons.of(flavour).len() == 4,
                None => leptons.muons.len() == 2 && leptons.electrons.len() == 2,
            },
            Charge(fs) => match fs.same_flavour() {
                Some(flavour) => {
                    let leptons = leptons.of(flavour);
                    count_charge(leptons, 1) == 2 && count_charge(leptons, -1) == 2
                }
                None => {
                    net_charge(&leptons.muons) == 0 && net_charge(&leptons.electrons) == 0
                }
            },
            Isolation(fs) => flavours(fs).iter().all(|&flavour| {
                let max_iso = cuts.lepton(flavour).max_iso;
                leptons.of(flavour).iter().all(|l| l.iso.abs() < max_iso)
            }),
            Kinematics(flavour) => {
                let cuts = cuts.lepton(flavour);
                leptons
                    .of(flavour)
                    .iter()
                    .all(|l| l.pt > cuts.min_pt && l.eta.abs() < cuts.max_abs_eta)
            }
            Eta => [Flavour::Muon, Flavour::Electron].iter().all(|&flavour| {
                let max_abs_eta = cuts.lepton(flavour).max_abs_eta;
                leptons.of(flavour).iter().all(|l| l.eta.abs() < max_abs_eta)
            }),
            PtThresholds => {
                let pt = |leptons: &[Lepton]| leptons.iter().map(|l| l.pt).collect::<Vec<_>>();
                pt_cuts(
                    &pt(&leptons.muons),
                    &pt(&leptons.electrons),
                    cuts.leading_pt,
                    cuts.trailing_pt,
                )
            }
            DeltaR => [&leptons.muons, &leptons.electrons]
                .iter()
                .all(|pair| match pair.as_slice() {
                    [l1, l2] => l1.delta_r(l2) > cuts.min_delta_r,
                    _ => false,
                }),
            PrimaryVertex(flavour) => {
                let cuts = cuts.lepton(flavour);
                leptons.of(flavour).iter().all(|l| {
                    l.sip() < cuts.max_sip && l.dxy.abs() < cuts.max_dxy && l.dz.abs() < cuts.max_dz
                })
            }
        }
    }
}

impl Display for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn count_charge(leptons: &[Lepton], charge: i32) -> usize {
    leptons.iter().filter(|l| l.charge == charge).count()
}

fn net_charge(leptons: &[Lepton]) -> i32 {
    leptons.iter().map(|l| l.charge).sum()
}

/// Require that in at least one of the same-flavour lepton pairs the
/// leading lepton has `pt > leading` and the trailing one `pt > trailing`
pub fn pt_cuts(muon_pt: &[f64], electron_pt: &[f64], leading: f64, trailing: f64) -> bool {
    let passes = |pt: &[f64]| {
        let max = pt.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = pt.iter().copied().fold(f64::INFINITY, f64::min);
        !pt.is_empty() && max > leading && min > trailing
    };
    passes(muon_pt) || passes(electron_pt)
}

/// Event filter for one final state
pub fn select(final_state: FinalState, leptons: &Leptons, cuts: &SelectionCuts) -> bool {
    self::cuts(final_state)
        .iter()
        .all(|cut| cut.passes(leptons, cuts))
}

/// Like [select], booking every evaluated cut in `flow`
///
/// Cuts after the first failing one are not evaluated.
pub fn select_booked(
    final_state: FinalState,
    leptons: &Leptons,
    cuts: &SelectionCuts,
    flow: &mut CutFlow,
) -> bool {
    self::cuts(final_state)
        .iter()
        .all(|cut| flow.record(cut.name(), cut.passes(leptons, cuts)))
}

/// Number of events seen and accepted by one cut
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CutCount {
    pub name: &'static str,
    pub all: u64,
    pub pass: u64,
}

impl CutCount {
    pub fn efficiency(&self) -> f64 {
        if self.all == 0 {
            0.
        } else {
            self.pass as f64 / self.all as f64
        }
    }
}

/// Ordered accept/reject counts per named cut
#[derive(Clone, Debug, Default)]
pub struct CutFlow {
    counts: Vec<CutCount>,
    index: AHashMap<&'static str, usize>,
}

impl CutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book one evaluation of the cut `name` and hand back `passed`
    pub fn record(&mut self, name: &'static str, passed: bool) -> bool {
        let idx = self.slot(name);
        let count = &mut self.counts[idx];
        count.all += 1;
        if passed {
            count.pass += 1;
        }
        passed
    }

    fn slot(&mut self, name: &'static str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        self.counts.push(CutCount {
            name,
            ..Default::default()
        });
        let idx = self.counts.len() - 1;
        self.index.insert(name, idx);
        idx
    }

    /// Add the counts of `other`, appending cuts not seen so far
    pub fn merge(&mut self, other: &CutFlow) {
        for count in &other.counts {
            let idx = self.slot(count.name);
            self.counts[idx].all += count.all;
            self.counts[idx].pass += count.pass;
        }
    }

    pub fn counts(&self) -> &[CutCount] {
        &self.counts
    }

    pub fn get(&self, name: &str) -> Option<&CutCount> {
        self.index.get(name).map(|&idx| &self.counts[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of events entering the first cut
    pub fn total(&self) -> u64 {
        self.counts.first().map(|c| c.all).unwrap_or_default()
    }

    /// Number of events passing the last booked cut
    pub fn accepted(&self) -> u64 {
        self.counts.last().map(|c| c.pass).unwrap_or_default()
    }
}

impl Display for CutFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.counts.iter().map(|c| c.name.len()).max().unwrap_or_default();
        let total = self.total();
        for count in &self.counts {
            let cumulative = if total == 0 {
                0.
            } else {
                count.pass as f64 / total as f64
            };
            writeln!(
                f,
                "{:<width$}: pass={:<10} all={:<10} -- eff={:.2} % cumulative eff={:.2} %",
                count.name,
                count.pass,
                count.all,
                100. * count.efficiency(),
                100. * cumulative,
            )?;
        }
        Ok(())
    }
}
