use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{error::Result, event::Flavour};

/// Nominal Z boson mass in GeV
pub const Z_MASS: f64 = 91.2;

/// Per-lepton quality requirements
///
/// Read from a config file through [SelectionCuts], omitted fields keep the
/// defaults of the respective flavour.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct LeptonCuts {
    /// Minimum transverse momentum in GeV, not applied in the mixed final state
    pub min_pt: f64,
    pub max_abs_eta: f64,
    /// Maximum relative isolation
    pub max_iso: f64,
    /// Maximum impact parameter significance
    pub max_sip: f64,
    /// Maximum |dxy| in cm
    pub max_dxy: f64,
    /// Maximum |dz| in cm
    pub max_dz: f64,
}

impl LeptonCuts {
    pub fn muon() -> Self {
        Self {
            min_pt: 5.,
            max_abs_eta: 2.4,
            ..Self::vertex_and_isolation()
        }
    }

    pub fn electron() -> Self {
        Self {
            min_pt: 7.,
            max_abs_eta: 2.5,
            ..Self::vertex_and_isolation()
        }
    }

    fn vertex_and_isolation() -> Self {
        Self {
            min_pt: 0.,
            max_abs_eta: 2.5,
            max_iso: 0.40,
            max_sip: 4.,
            max_dxy: 0.5,
            max_dz: 1.0,
        }
    }
}

/// Fields of [LeptonCuts] given in a config file
#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LeptonCutsOverride {
    min_pt: Option<f64>,
    max_abs_eta: Option<f64>,
    max_iso: Option<f64>,
    max_sip: Option<f64>,
    max_dxy: Option<f64>,
    max_dz: Option<f64>,
}

impl LeptonCutsOverride {
    fn apply(self, cuts: LeptonCuts) -> LeptonCuts {
        LeptonCuts {
            min_pt: self.min_pt.unwrap_or(cuts.min_pt),
            max_abs_eta: self.max_abs_eta.unwrap_or(cuts.max_abs_eta),
            max_iso: self.max_iso.unwrap_or(cuts.max_iso),
            max_sip: self.max_sip.unwrap_or(cuts.max_sip),
            max_dxy: self.max_dxy.unwrap_or(cuts.max_dxy),
            max_dz: self.max_dz.unwrap_or(cuts.max_dz),
        }
    }
}

fn muon_cuts<'de, D>(deserializer: D) -> std::result::Result<LeptonCuts, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LeptonCutsOverride::deserialize(deserializer)?.apply(LeptonCuts::muon()))
}

fn electron_cuts<'de, D>(deserializer: D) -> std::result::Result<LeptonCuts, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LeptonCutsOverride::deserialize(deserializer)?.apply(LeptonCuts::electron()))
}

/// Thresholds of the event selection
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionCuts {
    #[serde(deserialize_with = "muon_cuts")]
    pub muon: LeptonCuts,
    #[serde(deserialize_with = "electron_cuts")]
    pub electron: LeptonCuts,
    /// Leading lepton pt of at least one same-flavour pair in the mixed final state
    pub leading_pt: f64,
    /// Trailing lepton pt of that pair
    pub trailing_pt: f64,
    /// Minimum ΔR between the two leptons forming a Z candidate
    pub min_delta_r: f64,
}

impl SelectionCuts {
    pub fn lepton(&self, flavour: Flavour) -> &LeptonCuts {
        match flavour {
            Flavour::Muon => &self.muon,
            Flavour::Electron => &self.electron,
        }
    }
}

impl Default for SelectionCuts {
    fn default() -> Self {
        Self {
            muon: LeptonCuts::muon(),
            electron: LeptonCuts::electron(),
            leading_pt: 20.,
            trailing_pt: 10.,
            min_delta_r: 0.02,
        }
    }
}

/// Closed mass interval in GeV
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MassWindow {
    pub min: f64,
    pub max: f64,
}

impl MassWindow {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, mass: f64) -> bool {
        (self.min..=self.max).contains(&mass)
    }
}

/// Reconstruction settings
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Reconstruction {
    /// Reference mass for choosing the Z candidate pairing
    pub z_mass: f64,
    /// Window for the candidate closest to the Z mass
    pub z_close_window: MassWindow,
    /// Window for the other candidate
    pub z_far_window: MassWindow,
}

impl Default for Reconstruction {
    fn default() -> Self {
        Self {
            z_mass: Z_MASS,
            z_close_window: MassWindow::new(40., 120.),
            z_far_window: MassWindow::new(12., 120.),
        }
    }
}

/// Complete analysis configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub cuts: SelectionCuts,
    pub reconstruction: Reconstruction,
    /// Process events on a thread pool
    pub parallel: bool,
    /// Size of the thread pool, 0 lets rayon decide
    pub n_workers: usize,
    /// Only process this many events per sample, always sequentially
    pub range: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cuts: Default::default(),
            reconstruction: Default::default(),
            parallel: true,
            n_workers: 0,
            range: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Whether events should be distributed over a thread pool
    pub fn runs_parallel(&self) -> bool {
        self.parallel && self.range.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.cuts.muon.min_pt, 5.);
        assert_eq!(config.cuts.electron.max_abs_eta, 2.5);
        assert_eq!(config.cuts.lepton(Flavour::Muon).max_iso, 0.40);
        assert!(config.reconstruction.z_close_window.contains(40.));
        assert!(!config.reconstruction.z_far_window.contains(11.9));
        assert!(config.runs_parallel());
    }

    #[test]
    fn partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"cuts": {"muon": {"min_pt": 6.0}}, "range": 100}"#).unwrap();
        assert_eq!(config.cuts.muon.min_pt, 6.);
        assert_eq!(config.cuts.muon.max_abs_eta, 2.4);
        assert_eq!(config.cuts.muon.max_sip, 4.);
        assert_eq!(config.cuts.electron, LeptonCuts::electron());
        assert_eq!(config.range, Some(100));
        assert!(!config.runs_parallel());
    }

    #[test]
    fn partial_lepton_cuts_keep_flavour_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"cuts": {"muon": {"max_iso": 0.6}, "electron": {"max_sip": 3.0}}}"#,
        )
        .unwrap();
        assert_eq!(
            config.cuts.muon,
            LeptonCuts {
                max_iso: 0.6,
                ..LeptonCuts::muon()
            }
        );
        assert_eq!(
            config.cuts.electron,
            LeptonCuts {
                max_sip: 3.,
                ..LeptonCuts::electron()
            }
        );
        assert_eq!(config.cuts.leading_pt, 20.);

        let err = serde_json::from_str::<Config>(r#"{"cuts": {"muon": {"min_ptt": 3.0}}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn serialised_config_reads_back() {
        let config = Config {
            cuts: SelectionCuts {
                muon: LeptonCuts {
                    min_pt: 3.,
                    ..LeptonCuts::muon()
                },
                ..Default::default()
            },
            n_workers: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
    }
}
