//! Reconstruction of H → ZZ → 4ℓ candidates and their decay angles
pub mod angles;
pub mod boost;
pub mod config;
pub mod error;
pub mod event;
pub mod ordering;
pub mod pairing;
pub mod sample;
pub mod selection;
pub mod skim;
pub mod topology;
pub mod vector;

pub use crate::angles::AngleSet;
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::event::{EventRecord, FinalState, Flavour, Lepton, Leptons};
pub use crate::selection::CutFlow;
pub use crate::skim::{Reconstructed, Skim, SkimRecord, Skimmer};
pub use crate::vector::{FourVector, ThreeVector};

/// Reconstruct a single event with the default configuration
///
/// Returns `Ok(None)` if the event is not selected in the given final state.
pub fn reconstruct(event: &EventRecord, final_state: FinalState) -> Result<Option<SkimRecord>> {
    let config = Config::default();
    Skimmer::new(&config, final_state, 1.).process(event, &mut CutFlow::new())
}
