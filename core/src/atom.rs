use nalgebra::Vector3;

use crate::{periodic_table::ElementType, vocabulary::Spin};

/// Decimal places kept for coordinates, in Å.
pub const COORDINATE_DECIMALS: i32 = 8;
/// Decimal places kept for mass overrides, in amu.
pub const MASS_DECIMALS: i32 = 6;

/// Rounds to `decimals` places. Values too large to scale are already
/// coarser than the requested precision and come back unchanged.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

pub(crate) fn round_position(position: Vector3<f64>) -> Vector3<f64> {
    position.map(|x| round_to(x, COORDINATE_DECIMALS))
}

/// Represents an atom in a molecule.
///
/// Coordinates are rounded to [`COORDINATE_DECIMALS`] on construction so the
/// value survives a trip through the wire format bit for bit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Atom {
    pub(crate) position: Vector3<f64>,
    pub(crate) element_type: ElementType,
    pub(crate) mass: Option<f64>,
    pub(crate) formal_charge: Option<i32>,
    pub(crate) spin: Option<Spin>,
}

impl Atom {
    pub fn new(element_type: ElementType, position: impl Into<Vector3<f64>>) -> Self {
        Self {
            position: round_position(position.into()),
            element_type,
            mass: None,
            formal_charge: None,
            spin: None,
        }
    }

    /// Overrides the isotope-averaged mass, e.g. for deuterium.
    pub fn with_mass(self, mass: f64) -> Self {
        Self {
            mass: Some(round_to(mass, MASS_DECIMALS)),
            ..self
        }
    }

    pub fn with_formal_charge(self, formal_charge: i32) -> Self {
        Self {
            formal_charge: Some(formal_charge),
            ..self
        }
    }

    pub fn with_spin(self, spin: Spin) -> Self {
        Self {
            spin: Some(spin),
            ..self
        }
    }

    /// Returns a copy with the element and/or position replaced.
    pub fn edited(
        &self,
        element_type: Option<ElementType>,
        position: Option<Vector3<f64>>,
    ) -> Self {
        Self {
            element_type: element_type.unwrap_or(self.element_type),
            position: position.map(round_position).unwrap_or(self.position),
            ..*self
        }
    }

    /// Returns the charge of this nucleus
    pub fn nuclear_charge(&self) -> i32 {
        i32::from(self.element_type.atomic_number())
    }

    pub fn element(&self) -> ElementType {
        self.element_type
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    pub fn mass(&self) -> Option<f64> {
        self.mass
    }

    pub fn formal_charge(&self) -> Option<i32> {
        self.formal_charge
    }

    pub fn spin(&self) -> Option<Spin> {
        self.spin
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.iter().all(|x| x.is_finite())
    }
}
