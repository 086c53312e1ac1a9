use std::f64::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Spatial three-vector
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct ThreeVector(pub [f64; 3]);

impl ThreeVector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y() * other.z() - self.z() * other.y(),
            self.z() * other.x() - self.x() * other.z(),
            self.x() * other.y() - self.y() * other.x(),
        )
    }

    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Unit vector along `self`, or `None` for the null vector
    pub fn unit(&self) -> Option<Self> {
        let mag = self.mag();
        if mag > 0. && mag.is_finite() {
            Some(*self * mag.recip())
        } else {
            None
        }
    }
}

impl Add for ThreeVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x() + rhs.x(), self.y() + rhs.y(), self.z() + rhs.z())
    }
}

impl Sub for ThreeVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for ThreeVector {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.map(|c| -c))
    }
}

impl Mul<f64> for ThreeVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0.map(|c| c * rhs))
    }
}

/// Energy-momentum four-vector
///
/// Components are stored as `[E, px, py, pz]` in GeV.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct FourVector(pub [f64; 4]);

impl FourVector {
    pub const fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self([e, px, py, pz])
    }

    /// Build from transverse momentum, pseudorapidity, azimuth and mass
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        let pt = pt.abs();
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let p2 = px * px + py * py + pz * pz;
        let e = if m >= 0. {
            (p2 + m * m).sqrt()
        } else {
            (p2 - m * m).max(0.).sqrt()
        };
        Self::new(e, px, py, pz)
    }

    pub fn e(&self) -> f64 {
        self.0[0]
    }

    pub fn px(&self) -> f64 {
        self.0[1]
    }

    pub fn py(&self) -> f64 {
        self.0[2]
    }

    pub fn pz(&self) -> f64 {
        self.0[3]
    }

    /// Spatial part
    pub fn vect(&self) -> ThreeVector {
        ThreeVector::new(self.px(), self.py(), self.pz())
    }

    /// Magnitude of the spatial momentum
    pub fn p(&self) -> f64 {
        self.vect().mag()
    }

    pub fn m2(&self) -> f64 {
        self.e() * self.e() - self.vect().mag2()
    }

    /// Invariant mass
    ///
    /// Space-like vectors get a negative mass `-sqrt(-m²)`.
    pub fn mass(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0. {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    pub fn pt(&self) -> f64 {
        self.px().hypot(self.py())
    }

    /// Pseudorapidity
    ///
    /// Vectors along the beam axis give ±∞, the null vector gives 0.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt > 0. {
            (self.pz() / pt).asinh()
        } else if self.pz() == 0. {
            0.
        } else {
            self.pz().signum() * f64::INFINITY
        }
    }

    /// Azimuthal angle in (-π, π]
    pub fn phi(&self) -> f64 {
        if self.px() == 0. && self.py() == 0. {
            0.
        } else {
            self.py().atan2(self.px())
        }
    }

    /// Velocity `p/E` of the rest frame of `self`
    pub fn boost_vector(&self) -> ThreeVector {
        self.vect() * self.e().recip()
    }

    /// Lorentz transformation with velocity `beta`
    ///
    /// Boosting with `-p.boost_vector()` takes `self` into the rest frame of `p`.
    pub fn boost(&self, beta: &ThreeVector) -> Self {
        let b2 = beta.mag2();
        let gamma = (1. - b2).sqrt().recip();
        let bp = beta.dot(&self.vect());
        let gamma2 = if b2 > 0. { (gamma - 1.) / b2 } else { 0. };
        let vect = self.vect() + *beta * (gamma2 * bp + gamma * self.e());
        Self::new(gamma * (self.e() + bp), vect.x(), vect.y(), vect.z())
    }

    /// This vector as seen from the rest frame of `frame`
    pub fn in_rest_frame_of(&self, frame: &FourVector) -> Self {
        self.boost(&-frame.boost_vector())
    }

    /// Distance in (η, φ) space
    pub fn delta_r(&self, other: &Self) -> f64 {
        delta_r(self.eta(), other.eta(), self.phi(), other.phi())
    }
}

impl Add for FourVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for FourVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

/// Azimuthal difference wrapped into [-π, π]
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let mut dphi = (phi1 - phi2) % (2. * PI);
    if dphi > PI {
        dphi -= 2. * PI;
    } else if dphi < -PI {
        dphi += 2. * PI;
    }
    dphi
}

/// Angular separation `sqrt(Δη² + Δφ²)`
pub fn delta_r(eta1: f64, eta2: f64, phi1: f64, phi2: f64) -> f64 {
    (eta1 - eta2).hypot(delta_phi(phi1, phi2))
}
