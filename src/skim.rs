//! Per-event reconstruction kernel and skimming of event samples
use std::io::{BufRead, Write};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    angles::AngleSet,
    boost::Frames,
    config::Config,
    error::Result,
    event::{EventRecord, FinalState, Leptons},
    ordering::{order, OrderedCandidates},
    pairing::{z_candidates, ZPair},
    selection::{select_booked, CutFlow},
    topology::DecayTree,
    vector::FourVector,
};

pub const PAIRING_CUT: &str = "Two opposite charged lepton pairs";
pub const DELTA_R_CUT: &str = "Delta R separation of particles building the Z systems";
pub const Z_CLOSE_MASS_CUT: &str = "Mass of first Z candidate in window";
pub const Z_FAR_MASS_CUT: &str = "Mass of second Z candidate in window";

/// Z candidates and ordered decay products of one selected event
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reconstructed {
    /// Candidates in ascending distance to the Z mass
    pub pair: ZPair,
    pub ordered: OrderedCandidates,
}

impl Reconstructed {
    pub fn higgs(&self) -> FourVector {
        self.pair.higgs()
    }

    pub fn decay_tree(&self) -> DecayTree {
        DecayTree::new(&self.ordered)
    }

    /// Decay angles, or why they are undefined
    pub fn angles(&self) -> Result<AngleSet> {
        let frames = Frames::new(&self.ordered)?;
        AngleSet::new(&frames)
    }
}

/// One output row
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SkimRecord {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub run: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub event: Option<u64>,
    #[serde(rename = "Weight")]
    pub weight: f64,

    #[serde(rename = "Higgs_mass")]
    pub higgs_mass: f64,
    #[serde(rename = "Z1_mass")]
    pub z1_mass: f64,
    #[serde(rename = "Z2_mass")]
    pub z2_mass: f64,
    #[serde(rename = "Z_close_mass")]
    pub z_close_mass: f64,
    #[serde(rename = "Z_far_mass")]
    pub z_far_mass: f64,

    #[serde(rename = "Higgs_pt")]
    pub higgs_pt: f64,
    #[serde(rename = "Z1_pt")]
    pub z1_pt: f64,
    #[serde(rename = "Z2_pt")]
    pub z2_pt: f64,
    #[serde(rename = "Z_close_pt")]
    pub z_close_pt: f64,
    #[serde(rename = "Z_far_pt")]
    pub z_far_pt: f64,

    #[serde(rename = "Higgs_eta")]
    pub higgs_eta: f64,
    #[serde(rename = "Z1_eta")]
    pub z1_eta: f64,
    #[serde(rename = "Z2_eta")]
    pub z2_eta: f64,
    #[serde(rename = "Z_close_eta")]
    pub z_close_eta: f64,
    #[serde(rename = "Z_far_eta")]
    pub z_far_eta: f64,

    #[serde(rename = "Higgs_phi")]
    pub higgs_phi: f64,
    #[serde(rename = "Z1_phi")]
    pub z1_phi: f64,
    #[serde(rename = "Z2_phi")]
    pub z2_phi: f64,
    #[serde(rename = "Z_close_phi")]
    pub z_close_phi: f64,
    #[serde(rename = "Z_far_phi")]
    pub z_far_phi: f64,

    #[serde(flatten)]
    pub angles: AngleSet,
    /// False if the decay angles could not be computed and are NaN
    pub angles_valid: bool,
}

impl SkimRecord {
    pub fn new(reco: &Reconstructed, angles: Option<AngleSet>, weight: f64) -> Self {
        let h = reco.higgs();
        let z1 = reco.ordered.z1.p;
        let z2 = reco.ordered.z2.p;
        let close = reco.pair.close().p;
        let far = reco.pair.far().p;
        Self {
            run: None,
            event: None,
            weight,
            higgs_mass: h.mass(),
            z1_mass: z1.mass(),
            z2_mass: z2.mass(),
            z_close_mass: close.mass(),
            z_far_mass: far.mass(),
            higgs_pt: h.pt(),
            z1_pt: z1.pt(),
            z2_pt: z2.pt(),
            z_close_pt: close.pt(),
            z_far_pt: far.pt(),
            higgs_eta: h.eta(),
            z1_eta: z1.eta(),
            z2_eta: z2.eta(),
            z_close_eta: close.eta(),
            z_far_eta: far.eta(),
            higgs_phi: h.phi(),
            z1_phi: z1.phi(),
            z2_phi: z2.phi(),
            z_close_phi: close.phi(),
            z_far_phi: far.phi(),
            angles_valid: angles.is_some(),
            angles: angles.unwrap_or_else(AngleSet::nan),
        }
    }
}

/// Selected events of one sample and final state
#[derive(Clone, Debug, Default)]
pub struct Skim {
    pub records: Vec<SkimRecord>,
    pub cut_flow: CutFlow,
}

impl Skim {
    /// Number of records with undefined decay angles
    pub fn degenerate(&self) -> usize {
        self.records.iter().filter(|r| !r.angles_valid).count()
    }

    /// Write one JSON object per record and line
    pub fn write_records<W: Write>(&self, mut out: W) -> Result<()> {
        for record in &self.records {
            serde_json::to_writer(&mut out, record)?;
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Read one [EventRecord] per non-empty line
pub fn read_events<R: BufRead>(input: R) -> Result<Vec<EventRecord>> {
    let mut events = Vec::new();
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str(&line)?);
    }
    Ok(events)
}

/// Runs the reconstruction chain for one final state
#[derive(Copy, Clone, Debug)]
pub struct Skimmer<'a> {
    config: &'a Config,
    final_state: FinalState,
    weight: f64,
}

impl<'a> Skimmer<'a> {
    pub fn new(config: &'a Config, final_state: FinalState, weight: f64) -> Self {
        Self {
            config,
            final_state,
            weight,
        }
    }

    pub fn final_state(&self) -> FinalState {
        self.final_state
    }

    /// Selection, pairing and ordering of one event
    ///
    /// Returns `None` if the event fails any cut; every evaluated cut is
    /// booked in `flow`.
    pub fn reconstruct(&self, leptons: &Leptons, flow: &mut CutFlow) -> Option<Reconstructed> {
        let cuts = &self.config.cuts;
        let reco = &self.config.reconstruction;
        if !select_booked(self.final_state, leptons, cuts, flow) {
            return None;
        }
        let pair = z_candidates(self.final_state, leptons, reco.z_mass);
        if !flow.record(PAIRING_CUT, pair.is_some()) {
            return None;
        }
        let pair = pair?;
        let passed = flow.record(DELTA_R_CUT, pair.separated(leptons, cuts.min_delta_r))
            && flow.record(
                Z_CLOSE_MASS_CUT,
                reco.z_close_window.contains(pair.close().mass()),
            )
            && flow.record(Z_FAR_MASS_CUT, reco.z_far_window.contains(pair.far().mass()));
        if !passed {
            return None;
        }
        let ordered = order(self.final_state, &pair, leptons);
        Some(Reconstructed { pair, ordered })
    }

    /// Full chain for one input row
    ///
    /// Malformed input columns are an error, failed cuts give `Ok(None)`.
    pub fn process(&self, event: &EventRecord, flow: &mut CutFlow) -> Result<Option<SkimRecord>> {
        let leptons = Leptons::try_from(event)?;
        let Some(reco) = self.reconstruct(&leptons, flow) else {
            return Ok(None);
        };
        let angles = match reco.angles() {
            Ok(angles) => Some(angles),
            Err(err) => {
                warn!(
                    "{} event {:?} in run {:?}: {err}",
                    self.final_state, event.event, event.run
                );
                None
            }
        };
        let mut record = SkimRecord::new(&reco, angles, self.weight);
        record.run = event.run;
        record.event = event.event;
        Ok(Some(record))
    }

    /// Process all `events`, keeping the input order of the selected ones
    pub fn skim(&self, events: &[EventRecord]) -> Result<Skim> {
        let events = match self.config.range {
            Some(range) => &events[..range.min(events.len())],
            None => events,
        };
        #[cfg(feature = "parallel")]
        if self.config.runs_parallel() {
            return self.skim_parallel(events);
        }
        self.skim_sequential(events)
    }

    fn skim_sequential(&self, events: &[EventRecord]) -> Result<Skim> {
        let mut skim = Skim::default();
        for event in events {
            if let Some(record) = self.process(event, &mut skim.cut_flow)? {
                skim.records.push(record);
            }
        }
        debug!("{} selected {} of {} events", self.final_state, skim.records.len(), events.len());
        Ok(skim)
    }

    #[cfg(feature = "parallel")]
    fn skim_parallel(&self, events: &[EventRecord]) -> Result<Skim> {
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.n_workers)
            .build()?;
        log::info!("Thread pool size for parallel processing: {}", pool.current_num_threads());

        let (mut records, cut_flow) = pool.install(|| {
            events
                .par_iter()
                .enumerate()
                .try_fold(
                    || (Vec::new(), CutFlow::new()),
                    |(mut records, mut flow), (idx, event)| {
                        if let Some(record) = self.process(event, &mut flow)? {
                            records.push((idx, record));
                        }
                        Ok::<_, crate::error::Error>((records, flow))
                    },
                )
                .try_reduce(
                    || (Vec::new(), CutFlow::new()),
                    |(mut records, mut flow), (other_records, other_flow)| {
                        records.extend(other_records);
                        flow.merge(&other_flow);
                        Ok::<_, crate::error::Error>((records, flow))
                    },
                )
        })?;
        records.sort_unstable_by_key(|(idx, _)| *idx);
        debug!("{} selected {} of {} events", self.final_state, records.len(), events.len());
        Ok(Skim {
            records: records.into_iter().map(|(_, record)| record).collect(),
            cut_flow,
        })
    }
}
