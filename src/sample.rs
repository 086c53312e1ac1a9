//! Catalogue of the analysed CMS open-data samples
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    event::FinalState::{self, *},
};

/// Integrated luminosity of the collision data in pb⁻¹
pub const INTEGRATED_LUMINOSITY: f64 = 11.58 * 1000.0;
/// Correction of the simulated ZZ → 4ℓ background
pub const SCALE_FACTOR_ZZ_4L: f64 = 1.386;

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Sample {
    SMHiggsToZZTo4L,
    ZZTo4mu,
    ZZTo4e,
    ZZTo2e2mu,
    #[serde(rename = "Run2012B_DoubleMuParked")]
    Run2012BDoubleMuParked,
    #[serde(rename = "Run2012C_DoubleMuParked")]
    Run2012CDoubleMuParked,
    #[serde(rename = "Run2012B_DoubleElectron")]
    Run2012BDoubleElectron,
    #[serde(rename = "Run2012C_DoubleElectron")]
    Run2012CDoubleElectron,
}

use Sample::*;

impl Sample {
    pub const ALL: [Sample; 8] = [
        SMHiggsToZZTo4L,
        ZZTo4mu,
        ZZTo4e,
        ZZTo2e2mu,
        Run2012BDoubleMuParked,
        Run2012CDoubleMuParked,
        Run2012BDoubleElectron,
        Run2012CDoubleElectron,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SMHiggsToZZTo4L => "SMHiggsToZZTo4L",
            ZZTo4mu => "ZZTo4mu",
            ZZTo4e => "ZZTo4e",
            ZZTo2e2mu => "ZZTo2e2mu",
            Run2012BDoubleMuParked => "Run2012B_DoubleMuParked",
            Run2012CDoubleMuParked => "Run2012C_DoubleMuParked",
            Run2012BDoubleElectron => "Run2012B_DoubleElectron",
            Run2012CDoubleElectron => "Run2012C_DoubleElectron",
        }
    }

    /// Final states the sample is analysed in
    pub fn final_states(self) -> &'static [FinalState] {
        match self {
            SMHiggsToZZTo4L => &[FourMuons, FourElectrons, TwoMuonsTwoElectrons],
            ZZTo4mu => &[FourMuons],
            ZZTo4e => &[FourElectrons],
            ZZTo2e2mu => &[TwoMuonsTwoElectrons],
            Run2012BDoubleMuParked | Run2012CDoubleMuParked => &[FourMuons, TwoMuonsTwoElectrons],
            Run2012BDoubleElectron | Run2012CDoubleElectron => {
                &[FourElectrons, TwoMuonsTwoElectrons]
            }
        }
    }

    /// Record id on the CMS open-data portal
    pub fn record_id(self) -> u32 {
        match self {
            SMHiggsToZZTo4L => 12361,
            ZZTo4mu => 12362,
            ZZTo4e => 12363,
            ZZTo2e2mu => 12364,
            Run2012BDoubleMuParked => 12365,
            Run2012CDoubleMuParked => 12366,
            Run2012BDoubleElectron => 12367,
            Run2012CDoubleElectron => 12368,
        }
    }

    /// Cross section in pb and number of generated events of simulated samples
    pub fn simulation(self) -> Option<(f64, f64)> {
        match self {
            SMHiggsToZZTo4L => Some((0.0065, 299973.0)),
            ZZTo4mu => Some((0.077, 1499064.0)),
            ZZTo4e => Some((0.077, 1499093.0)),
            ZZTo2e2mu => Some((0.18, 1497445.0)),
            _ => None,
        }
    }

    pub fn is_data(self) -> bool {
        self.simulation().is_none()
    }

    pub fn is_zz_background(self) -> bool {
        matches!(self, ZZTo4mu | ZZTo4e | ZZTo2e2mu)
    }

    /// Event weight normalising the sample to the integrated luminosity
    ///
    /// Collision data have unit weight.
    pub fn weight(self) -> f64 {
        let Some((xs, nevents)) = self.simulation() else {
            return 1.0;
        };
        let weight = INTEGRATED_LUMINOSITY * xs / nevents;
        if self.is_zz_background() {
            weight * SCALE_FACTOR_ZZ_4L
        } else {
            weight
        }
    }
}

impl Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sample {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Sample::ALL
            .into_iter()
            .find(|sample| sample.name() == s)
            .ok_or_else(|| Error::UnknownSample(s.to_owned()))
    }
}

/// Parse a comma separated selection, `all` selecting every entry of `all`
pub fn parse_list<T>(list: &str, all: &[T]) -> Result<Vec<T>>
where
    T: FromStr<Err = Error> + Copy,
{
    if list.trim() == "all" {
        return Ok(all.to_vec());
    }
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weights() {
        assert_relative_eq!(
            SMHiggsToZZTo4L.weight(),
            11580. * 0.0065 / 299973.,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            ZZTo2e2mu.weight(),
            11580. * 0.18 / 1497445. * 1.386,
            max_relative = 1e-12
        );
        assert_eq!(Run2012CDoubleElectron.weight(), 1.0);
        assert!(Run2012BDoubleMuParked.is_data());
    }

    #[test]
    fn names() {
        for sample in Sample::ALL {
            assert_eq!(sample.to_string().parse::<Sample>().unwrap(), sample);
        }
        assert_eq!(
            serde_json::to_string(&Run2012BDoubleMuParked).unwrap(),
            "\"Run2012B_DoubleMuParked\""
        );
        let err = "Run2013".parse::<Sample>().unwrap_err();
        assert!(err.to_string().contains("Run2013"));
    }

    #[test]
    fn selections() {
        assert_eq!(parse_list("all", &Sample::ALL).unwrap().len(), 8);
        assert_eq!(
            parse_list("ZZTo4e, SMHiggsToZZTo4L", &Sample::ALL).unwrap(),
            [ZZTo4e, SMHiggsToZZTo4L]
        );
        assert_eq!(
            parse_list("FourMuons", &FinalState::ALL).unwrap(),
            [FourMuons]
        );
        assert!(matches!(
            parse_list("FourMuons,FiveMuons", &FinalState::ALL),
            Err(Error::UnknownFinalState(s)) if s == "FiveMuons"
        ));
    }

    #[test]
    fn catalogue() {
        assert_eq!(SMHiggsToZZTo4L.final_states().len(), 3);
        assert!(Run2012CDoubleMuParked
            .final_states()
            .contains(&TwoMuonsTwoElectrons));
        assert!(!ZZTo4e.final_states().contains(&FourMuons));
        assert_eq!(ZZTo2e2mu.record_id(), 12364);
    }
}
