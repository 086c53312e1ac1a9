//! Production and decay angles of H → Z1 Z2 → 4ℓ
//!
//! Definitions follow Bolognesi et al., Phys. Rev. D 86, 095031 (2012).
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    boost::Frames,
    error::{Error, Result},
    vector::ThreeVector,
};

const BEAM_AXIS: ThreeVector = ThreeVector::new(0., 0., 1.);

/// The five decay observables, together with the cosines of the polar angles
///
/// Undefined angles are NaN, which JSON writes as `null`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AngleSet {
    #[serde(deserialize_with = "nan_if_null")]
    pub theta_star: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub cos_theta_star: f64,
    #[serde(rename = "Phi", deserialize_with = "nan_if_null")]
    pub phi: f64,
    #[serde(rename = "Phi1", deserialize_with = "nan_if_null")]
    pub phi1: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub theta1: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub cos_theta1: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub theta2: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub cos_theta2: f64,
}

fn nan_if_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl AngleSet {
    /// Marker for events where the angles are undefined
    pub fn nan() -> Self {
        Self {
            theta_star: f64::NAN,
            cos_theta_star: f64::NAN,
            phi: f64::NAN,
            phi1: f64::NAN,
            theta1: f64::NAN,
            cos_theta1: f64::NAN,
            theta2: f64::NAN,
            cos_theta2: f64::NAN,
        }
    }

    pub fn new(frames: &Frames) -> Result<Self> {
        let z1 = frames.z1_h_rest.vect();

        let p = frames.z1_h_rest.p();
        if !(p > 0.) {
            return Err(Error::Degenerate("Z1 at rest in the Higgs frame"));
        }
        let cos_theta_star = frames.z1_h_rest.pz() / p;

        let n1 = normal(
            &frames.lep11_h_rest.vect(),
            &frames.lep12_h_rest.vect(),
            "collinear Z1 decay leptons",
        )?;
        let n2 = normal(
            &frames.lep21_h_rest.vect(),
            &frames.lep22_h_rest.vect(),
            "collinear Z2 decay leptons",
        )?;
        let n_coll = normal(&BEAM_AXIS, &z1, "Z1 along the beam axis")?;

        let cos_theta1 = cos_opposite(
            &frames.z2_z1_rest.vect(),
            &frames.lep11_z1_rest.vect(),
            "Z1 decay",
        )?;
        let cos_theta2 = cos_opposite(
            &frames.z1_z2_rest.vect(),
            &frames.lep21_z2_rest.vect(),
            "Z2 decay",
        )?;

        Ok(Self {
            theta_star: cos_theta_star.clamp(-1., 1.).acos(),
            cos_theta_star,
            phi: azimuthal(&z1, &n2, &-n1),
            phi1: azimuthal(&z1, &n1, &n_coll),
            theta1: cos_theta1.clamp(-1., 1.).acos(),
            cos_theta1,
            theta2: cos_theta2.clamp(-1., 1.).acos(),
            cos_theta2,
        })
    }
}

/// Unit normal `v1 × v2 / |v1 × v2|` of the plane spanned by two vectors
pub fn normal(v1: &ThreeVector, v2: &ThreeVector, what: &'static str) -> Result<ThreeVector> {
    v1.cross(v2).unit().ok_or(Error::Degenerate(what))
}

/// Signed angle `sign(p · (n1 × n2)) · acos(n1 · n2)` between two unit normals
///
/// A vanishing triple product counts as positive.
pub fn azimuthal(p: &ThreeVector, n1: &ThreeVector, n2: &ThreeVector) -> f64 {
    let sign = if p.dot(&n1.cross(n2)) < 0. { -1. } else { 1. };
    sign * n1.dot(n2).clamp(-1., 1.).acos()
}

/// `-v1 · v2 / (|v1| |v2|)`, the cosine of the angle between `v2` and the
/// direction opposite to `v1`
pub fn cos_opposite(v1: &ThreeVector, v2: &ThreeVector, what: &'static str) -> Result<f64> {
    let norm = v1.mag() * v2.mag();
    if !(norm > 0.) {
        return Err(Error::Degenerate(what));
    }
    Ok(-v1.dot(v2) / norm)
}
