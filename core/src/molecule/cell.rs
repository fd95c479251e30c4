use nalgebra::{Matrix3, Vector3};

use crate::{atom::round_position, error::InvalidMoleculeError};

/// Lattice for periodic boundary conditions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PeriodicCell {
    /// Rows are the lattice vectors a, b, c in Å.
    lattice_vectors: Matrix3<f64>,
    periodic: [bool; 3],
}

impl PeriodicCell {
    pub fn new(
        lattice_vectors: [[f64; 3]; 3],
        periodic: [bool; 3],
    ) -> Result<Self, InvalidMoleculeError> {
        if !periodic.iter().any(|&axis| axis) {
            return Err(InvalidMoleculeError::Cell(
                "at least one dimension must be periodic",
            ));
        }

        let rows = lattice_vectors.map(|row| round_position(Vector3::from(row)).transpose());
        let lattice_vectors = Matrix3::from_rows(&rows);

        if !lattice_vectors.iter().all(|x| x.is_finite()) {
            return Err(InvalidMoleculeError::Cell("lattice vectors must be finite"));
        }
        if lattice_vectors.determinant().abs() < f64::EPSILON {
            return Err(InvalidMoleculeError::Cell("lattice vectors are linearly dependent"));
        }

        Ok(Self {
            lattice_vectors,
            periodic,
        })
    }

    pub fn lattice_vectors(&self) -> &Matrix3<f64> {
        &self.lattice_vectors
    }

    pub fn rows(&self) -> [[f64; 3]; 3] {
        let m = &self.lattice_vectors;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Cell volume in Å³.
    pub fn volume(&self) -> f64 {
        self.lattice_vectors.determinant().abs()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn volume_of_orthorhombic_cell() {
        let cell = PeriodicCell::new(
            [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]],
            [true, true, true],
        )
        .unwrap();
        assert_relative_eq!(cell.volume(), 24.0);
        assert_eq!(cell.rows()[1], [0.0, 3.0, 0.0]);
    }

    #[test]
    fn needs_a_periodic_axis() {
        let error = PeriodicCell::new(
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            [false; 3],
        )
        .unwrap_err();
        assert!(matches!(error, InvalidMoleculeError::Cell(_)));
    }

    #[test]
    fn rejects_degenerate_lattices() {
        assert!(PeriodicCell::new(
            [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            [true, true, false],
        )
        .is_err());
        assert!(PeriodicCell::new(
            [[f64::NAN, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            [true; 3],
        )
        .is_err());
    }
}
