//! The molecule model: atoms plus the global charge and spin state, with
//! optional connectivity, conformers and a periodic cell.
//!
//! A [`Molecule`] is checked in full whenever one is produced, so holding one
//! means its electron count, multiplicity and index references are consistent.

mod cell;
mod topology;
mod xyz;

use itertools::Itertools;
use nalgebra::Vector3;

pub use cell::PeriodicCell;
pub use topology::{Bond, Conformer};

use crate::{atom::Atom, error::InvalidMoleculeError, periodic_table::ElementType};

/// Represents a molecule
#[derive(Clone, Debug, PartialEq)]
pub struct Molecule {
    pub(crate) atoms: Vec<Atom>,
    pub(crate) charge: i32,
    pub(crate) multiplicity: u32,
    pub(crate) bonds: Vec<Bond>,
    pub(crate) conformers: Vec<Conformer>,
    pub(crate) cell: Option<PeriodicCell>,
}

impl Molecule {
    pub fn new(
        atoms: Vec<Atom>,
        charge: i32,
        multiplicity: u32,
    ) -> Result<Self, InvalidMoleculeError> {
        Self {
            atoms,
            charge,
            multiplicity,
            bonds: Vec::new(),
            conformers: Vec::new(),
            cell: None,
        }
        .checked()
    }

    pub fn with_charge(self, charge: i32) -> Result<Self, InvalidMoleculeError> {
        Self { charge, ..self }.checked()
    }

    pub fn with_multiplicity(self, multiplicity: u32) -> Result<Self, InvalidMoleculeError> {
        Self {
            multiplicity,
            ..self
        }
        .checked()
    }

    /// Replaces the connectivity table.
    pub fn with_bonds(self, bonds: Vec<Bond>) -> Result<Self, InvalidMoleculeError> {
        Self { bonds, ..self }.checked()
    }

    /// Replaces the alternative geometries.
    pub fn with_conformers(self, conformers: Vec<Conformer>) -> Result<Self, InvalidMoleculeError> {
        Self { conformers, ..self }.checked()
    }

    pub fn with_cell(self, cell: Option<PeriodicCell>) -> Self {
        Self { cell, ..self }
    }

    fn checked(self) -> Result<Self, InvalidMoleculeError> {
        if self.atoms.is_empty() {
            return Err(InvalidMoleculeError::Empty);
        }
        if self.multiplicity < 1 {
            return Err(InvalidMoleculeError::Multiplicity(i64::from(self.multiplicity)));
        }

        for (index, atom) in self.atoms.iter().enumerate() {
            if !atom.is_finite() {
                return Err(InvalidMoleculeError::NonFiniteCoordinate { atom: index });
            }
            if let Some(mass) = atom.mass {
                if !(mass.is_finite() && mass > 0.0) {
                    return Err(InvalidMoleculeError::Mass { atom: index, mass });
                }
            }
        }

        self.check_electrons()?;
        self.check_formal_charges()?;
        self.check_bonds()?;
        self.check_conformers()?;

        Ok(self)
    }

    fn check_electrons(&self) -> Result<(), InvalidMoleculeError> {
        let electrons = self.n_electrons();
        if electrons < 0 {
            return Err(InvalidMoleculeError::NegativeElectrons {
                charge: self.charge,
                electrons,
            });
        }

        let unpaired = self.unpaired_electrons();
        if (electrons - unpaired) % 2 != 0 {
            return Err(InvalidMoleculeError::Parity {
                electrons,
                charge: self.charge,
                multiplicity: self.multiplicity,
            });
        }
        if unpaired > electrons {
            return Err(InvalidMoleculeError::TooManyUnpaired {
                multiplicity: self.multiplicity,
                unpaired,
                electrons,
            });
        }

        Ok(())
    }

    fn check_formal_charges(&self) -> Result<(), InvalidMoleculeError> {
        let formal_charges = self
            .atoms
            .iter()
            .filter_map(|atom| atom.formal_charge)
            .collect::<Vec<_>>();

        if formal_charges.is_empty() {
            return Ok(());
        }

        let sum = formal_charges.into_iter().map(i64::from).sum::<i64>();
        if sum != i64::from(self.charge) {
            return Err(InvalidMoleculeError::FormalCharges {
                sum,
                charge: self.charge,
            });
        }

        Ok(())
    }

    fn check_bonds(&self) -> Result<(), InvalidMoleculeError> {
        let n_atoms = self.atoms.len();

        for (index, bond) in self.bonds.iter().enumerate() {
            for atom in [bond.a, bond.b] {
                if atom >= n_atoms {
                    return Err(InvalidMoleculeError::BondIndex {
                        bond: index,
                        index: atom,
                        n_atoms,
                    });
                }
            }
            if bond.a == bond.b {
                return Err(InvalidMoleculeError::SelfBond {
                    bond: index,
                    atom: bond.a,
                });
            }
            if !(1..=3).contains(&bond.order) {
                return Err(InvalidMoleculeError::BondOrder {
                    bond: index,
                    order: i64::from(bond.order),
                });
            }
        }

        let repeated = self
            .bonds
            .iter()
            .enumerate()
            .duplicates_by(|(_, bond)| bond.pair())
            .next();
        if let Some((index, bond)) = repeated {
            let (a, b) = bond.pair();
            return Err(InvalidMoleculeError::DuplicateBond { bond: index, a, b });
        }

        Ok(())
    }

    fn check_conformers(&self) -> Result<(), InvalidMoleculeError> {
        let expected = self.atoms.len();

        for (index, conformer) in self.conformers.iter().enumerate() {
            if conformer.positions.len() != expected {
                return Err(InvalidMoleculeError::ConformerLength {
                    conformer: index,
                    found: conformer.positions.len(),
                    expected,
                });
            }
            if let Some(atom) = conformer
                .positions
                .iter()
                .position(|position| !position.iter().all(|x| x.is_finite()))
            {
                return Err(InvalidMoleculeError::NonFiniteConformer {
                    conformer: index,
                    atom,
                });
            }
        }

        Ok(())
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn multiplicity(&self) -> u32 {
        self.multiplicity
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn conformers(&self) -> &[Conformer] {
        &self.conformers
    }

    pub fn cell(&self) -> Option<&PeriodicCell> {
        self.cell.as_ref()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Always false for a constructed molecule.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atomic_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.atoms
            .iter()
            .map(|atom| atom.element_type.atomic_number())
    }

    /// The distinct elements present, in order of atomic number.
    pub fn elements(&self) -> Vec<ElementType> {
        self.atoms
            .iter()
            .map(|atom| atom.element_type)
            .sorted()
            .dedup()
            .collect()
    }

    pub fn n_electrons(&self) -> i64 {
        self.atomic_numbers().map(i64::from).sum::<i64>() - i64::from(self.charge)
    }

    pub fn unpaired_electrons(&self) -> i64 {
        i64::from(self.multiplicity) - 1
    }

    pub fn is_closed_shell(&self) -> bool {
        self.multiplicity == 1
    }

    pub fn is_periodic(&self) -> bool {
        self.cell.is_some()
    }

    /// Distance between two atoms in Å, if both indices exist.
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        let a = self.atoms.get(i)?.position;
        let b = self.atoms.get(j)?.position;
        Some((a - b).norm())
    }

    /// Geometric center of the atoms.
    pub fn centroid(&self) -> Vector3<f64> {
        let sum = self
            .atoms
            .iter()
            .fold(Vector3::zeros(), |sum, atom| sum + atom.position);
        sum / self.atoms.len() as f64
    }

    /// Number of atom evaluations an engine performs: the reference geometry
    /// plus every conformer.
    pub fn expanded_atom_count(&self) -> usize {
        self.atoms.len() * (1 + self.conformers.len())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::{testing, vocabulary::Spin};

    fn oxygen() -> Vec<Atom> {
        vec![Atom::new(ElementType::O, [0.0; 3])]
    }

    #[test]
    fn oxygen_atom_triplet_is_valid() {
        let molecule = Molecule::new(oxygen(), 0, 3).unwrap();
        assert_eq!(molecule.n_electrons(), 8);
        assert_eq!(molecule.unpaired_electrons(), 2);
        assert!(!molecule.is_closed_shell());
    }

    #[test]
    fn oxygen_atom_doublet_breaks_parity() {
        let error = Molecule::new(oxygen(), 0, 2).unwrap_err();
        assert_eq!(
            error,
            InvalidMoleculeError::Parity {
                electrons: 8,
                charge: 0,
                multiplicity: 2
            }
        );
    }

    #[test]
    fn parity_matches_electron_count() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let n_atoms = rng.gen_range(1..6);
            let atoms = (0..n_atoms)
                .map(|i| {
                    let z = rng.gen_range(1..=36);
                    let element = ElementType::from_atomic_number(z).unwrap();
                    Atom::new(element, [i as f64 * 1.5, 0.0, 0.0])
                })
                .collect::<Vec<_>>();
            let charge = rng.gen_range(-2..=2);
            let multiplicity = rng.gen_range(1..=5);

            let electrons = atoms
                .iter()
                .map(|atom| i64::from(atom.nuclear_charge()))
                .sum::<i64>()
                - i64::from(charge);
            let consistent = electrons >= 0
                && (electrons - i64::from(multiplicity - 1)) % 2 == 0
                && i64::from(multiplicity - 1) <= electrons;

            let result = Molecule::new(atoms, charge, multiplicity);
            assert_eq!(result.is_ok(), consistent, "{electrons} e, mult {multiplicity}");
        }
    }

    #[test]
    fn rejects_basic_violations() {
        assert_eq!(Molecule::new(vec![], 0, 1), Err(InvalidMoleculeError::Empty));
        assert_eq!(
            Molecule::new(oxygen(), 0, 0),
            Err(InvalidMoleculeError::Multiplicity(0))
        );
        assert_eq!(
            Molecule::new(vec![Atom::new(ElementType::H, [f64::NAN, 0.0, 0.0])], 0, 2),
            Err(InvalidMoleculeError::NonFiniteCoordinate { atom: 0 })
        );
        let distant = Atom::new(ElementType::H, [1e301, 0.0, 0.0]);
        assert!(Molecule::new(vec![distant], 0, 2).is_ok());
        assert!(matches!(
            Molecule::new(vec![Atom::new(ElementType::H, [0.0; 3])], 3, 1),
            Err(InvalidMoleculeError::NegativeElectrons { .. })
        ));
        assert!(matches!(
            Molecule::new(vec![Atom::new(ElementType::H, [0.0; 3])], 0, 4),
            Err(InvalidMoleculeError::TooManyUnpaired { .. })
        ));
        assert!(matches!(
            Molecule::new(
                vec![Atom::new(ElementType::H, [0.0; 3]).with_mass(-1.0)],
                0,
                2
            ),
            Err(InvalidMoleculeError::Mass { atom: 0, .. })
        ));
    }

    #[test]
    fn formal_charges_sum_to_molecule_charge() {
        let ammonium = |charge| {
            let mut atoms = vec![Atom::new(ElementType::N, [0.0; 3]).with_formal_charge(1)];
            for position in [
                [0.6, 0.6, 0.6],
                [-0.6, -0.6, 0.6],
                [-0.6, 0.6, -0.6],
                [0.6, -0.6, -0.6],
            ] {
                atoms.push(Atom::new(ElementType::H, position).with_formal_charge(0));
            }
            Molecule::new(atoms, charge, 1)
        };

        assert!(ammonium(1).is_ok());
        assert_eq!(
            ammonium(-1),
            Err(InvalidMoleculeError::FormalCharges { sum: 1, charge: -1 })
        );
    }

    #[test]
    fn edits_revalidate() {
        let water = testing::water();

        let cation = water.clone().with_charge(1);
        assert!(matches!(cation, Err(InvalidMoleculeError::Parity { .. })));

        let doublet_cation = water.clone().with_multiplicity(2).and_then(|m| m.with_charge(1));
        assert!(matches!(doublet_cation, Err(InvalidMoleculeError::Parity { .. })));

        let radical_cation = Molecule::new(water.atoms().to_vec(), 1, 2).unwrap();
        assert_eq!(radical_cation.with_charge(-1).unwrap().charge(), -1);

        // the original is untouched
        assert_eq!(water.charge(), 0);
        assert_eq!(water.multiplicity(), 1);
    }

    #[test]
    fn connectivity_is_checked() {
        let water = testing::water();

        let bonded = water
            .clone()
            .with_bonds(vec![Bond::new(0, 1, 1), Bond::new(0, 2, 1)])
            .unwrap();
        assert_eq!(bonded.bonds().len(), 2);

        assert_eq!(
            water.clone().with_bonds(vec![Bond::new(0, 3, 1)]),
            Err(InvalidMoleculeError::BondIndex {
                bond: 0,
                index: 3,
                n_atoms: 3
            })
        );
        assert_eq!(
            water.clone().with_bonds(vec![Bond::new(1, 1, 1)]),
            Err(InvalidMoleculeError::SelfBond { bond: 0, atom: 1 })
        );
        assert_eq!(
            water.clone().with_bonds(vec![Bond::new(0, 1, 4)]),
            Err(InvalidMoleculeError::BondOrder { bond: 0, order: 4 })
        );
        assert_eq!(
            water.with_bonds(vec![Bond::new(0, 1, 1), Bond::new(1, 0, 2)]),
            Err(InvalidMoleculeError::DuplicateBond { bond: 1, a: 0, b: 1 })
        );
    }

    #[test]
    fn conformers_share_the_atom_list() {
        let water = testing::water();
        let shifted = water
            .atoms()
            .iter()
            .map(|atom| atom.position() + Vector3::new(0.0, 0.0, 0.1))
            .collect::<Vec<_>>();

        let molecule = water
            .clone()
            .with_conformers(vec![Conformer::new(shifted.clone()), Conformer::new(shifted)])
            .unwrap();
        assert_eq!(molecule.expanded_atom_count(), 9);

        assert_eq!(
            water.clone().with_conformers(vec![Conformer::new([Vector3::zeros()])]),
            Err(InvalidMoleculeError::ConformerLength {
                conformer: 0,
                found: 1,
                expected: 3
            })
        );

        let mut broken = water.atoms().iter().map(|a| *a.position()).collect::<Vec<_>>();
        broken[2].x = f64::INFINITY;
        assert_eq!(
            water.with_conformers(vec![Conformer::new(broken)]),
            Err(InvalidMoleculeError::NonFiniteConformer {
                conformer: 0,
                atom: 2
            })
        );
    }

    #[test]
    fn derived_quantities() {
        let glycine = testing::glycine();
        assert_eq!(glycine.len(), 10);
        assert_eq!(glycine.n_electrons(), 40);
        assert!(glycine.is_closed_shell());
        assert_eq!(
            glycine.elements(),
            vec![ElementType::H, ElementType::C, ElementType::N, ElementType::O]
        );
        assert_relative_eq!(glycine.distance(0, 1).unwrap(), 1.52);
        assert_eq!(glycine.distance(0, 10), None);

        let water = testing::water();
        assert_relative_eq!(water.centroid().z, 0.39, epsilon = 1e-12);
    }

    #[test]
    fn spin_tags_are_kept() {
        let molecule = Molecule::new(
            vec![
                Atom::new(ElementType::H, [0.0; 3]).with_spin(Spin::Alpha),
                Atom::new(ElementType::H, [0.0, 0.0, 3.0]).with_spin(Spin::Beta),
            ],
            0,
            1,
        )
        .unwrap();
        assert_eq!(molecule.atoms()[1].spin(), Some(Spin::Beta));
    }
}
