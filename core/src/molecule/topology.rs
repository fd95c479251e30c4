use nalgebra::Vector3;

use crate::atom::round_position;

/// A connectivity entry between two atoms, by index into the atom list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    /// 1, 2 or 3
    pub order: u8,
}

impl Bond {
    pub fn new(a: usize, b: usize, order: u8) -> Self {
        Self { a, b, order }
    }

    /// The atom pair with the smaller index first.
    pub fn pair(&self) -> (usize, usize) {
        (self.a.min(self.b), self.a.max(self.b))
    }
}

/// An alternative geometry sharing the molecule's atoms, charge and multiplicity.
#[derive(Clone, Debug, PartialEq)]
pub struct Conformer {
    pub(crate) positions: Vec<Vector3<f64>>,
}

impl Conformer {
    pub fn new(positions: impl IntoIterator<Item = Vector3<f64>>) -> Self {
        Self {
            positions: positions.into_iter().map(round_position).collect(),
        }
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }
}
