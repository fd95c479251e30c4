use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    atom::Atom,
    error::InvalidMoleculeError,
    molecule::{Bond, Conformer, Molecule, PeriodicCell},
    periodic_table::ElementType,
    vocabulary::Spin,
};

/// Wire form of a [`Molecule`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaMolecule {
    atoms: Option<Vec<SchemaAtom>>,
    charge: Option<i64>,
    multiplicity: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    connectivity: Vec<(usize, usize, i64)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conformers: Vec<Vec<[f64; 3]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cell: Option<SchemaCell>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaAtom {
    element: String,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formal_charge: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spin: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaCell {
    lattice_vectors: [[f64; 3]; 3],
    periodic: [bool; 3],
}

impl From<&Molecule> for SchemaMolecule {
    fn from(molecule: &Molecule) -> Self {
        let atoms = molecule
            .atoms()
            .iter()
            .map(|atom| {
                let position = atom.position();
                SchemaAtom {
                    element: atom.element().symbol().to_owned(),
                    x: position.x,
                    y: position.y,
                    z: position.z,
                    mass: atom.mass(),
                    formal_charge: atom.formal_charge(),
                    spin: atom.spin().map(|spin| spin.tag().to_owned()),
                }
            })
            .collect();

        Self {
            atoms: Some(atoms),
            charge: Some(i64::from(molecule.charge())),
            multiplicity: Some(i64::from(molecule.multiplicity())),
            connectivity: molecule
                .bonds()
                .iter()
                .map(|bond| (bond.a, bond.b, i64::from(bond.order)))
                .collect(),
            conformers: molecule
                .conformers()
                .iter()
                .map(|conformer| {
                    conformer
                        .positions()
                        .iter()
                        .map(|p| [p.x, p.y, p.z])
                        .collect()
                })
                .collect(),
            cell: molecule.cell().map(|cell| SchemaCell {
                lattice_vectors: cell.rows(),
                periodic: cell.periodic(),
            }),
        }
    }
}

impl TryFrom<SchemaAtom> for Atom {
    type Error = InvalidMoleculeError;

    fn try_from(value: SchemaAtom) -> Result<Self, Self::Error> {
        let element = value.element.parse::<ElementType>()?;
        let mut atom = Atom::new(element, [value.x, value.y, value.z]);

        if let Some(mass) = value.mass {
            atom = atom.with_mass(mass);
        }
        if let Some(formal_charge) = value.formal_charge {
            atom = atom.with_formal_charge(formal_charge);
        }
        if let Some(spin) = value.spin {
            // the atom index is attached by the caller
            let spin = spin
                .parse::<Spin>()
                .map_err(|_| InvalidMoleculeError::UnknownSpin { atom: 0, tag: spin })?;
            atom = atom.with_spin(spin);
        }

        Ok(atom)
    }
}

impl TryFrom<SchemaMolecule> for Molecule {
    type Error = InvalidMoleculeError;

    fn try_from(value: SchemaMolecule) -> Result<Self, Self::Error> {
        let schema_atoms = value.atoms.ok_or(InvalidMoleculeError::MissingField("atoms"))?;
        let charge = value
            .charge
            .ok_or(InvalidMoleculeError::MissingField("charge"))?;
        let multiplicity = value
            .multiplicity
            .ok_or(InvalidMoleculeError::MissingField("multiplicity"))?;

        let charge = i32::try_from(charge).map_err(|_| InvalidMoleculeError::ChargeRange(charge))?;
        let multiplicity = u32::try_from(multiplicity)
            .map_err(|_| InvalidMoleculeError::Multiplicity(multiplicity))?;

        let atoms = schema_atoms
            .into_iter()
            .enumerate()
            .map(|(index, atom)| {
                Atom::try_from(atom).map_err(|error| match error {
                    InvalidMoleculeError::UnknownSpin { tag, .. } => {
                        InvalidMoleculeError::UnknownSpin { atom: index, tag }
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let molecule = Molecule::new(atoms, charge, multiplicity)?;

        let bonds = value
            .connectivity
            .into_iter()
            .enumerate()
            .map(|(index, (a, b, order))| {
                u8::try_from(order)
                    .map(|order| Bond::new(a, b, order))
                    .map_err(|_| InvalidMoleculeError::BondOrder { bond: index, order })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let conformers = value
            .conformers
            .into_iter()
            .map(|positions| Conformer::new(positions.into_iter().map(Vector3::from)))
            .collect();
        let cell = value
            .cell
            .map(|cell| PeriodicCell::new(cell.lattice_vectors, cell.periodic))
            .transpose()?;

        Ok(molecule
            .with_bonds(bonds)?
            .with_conformers(conformers)?
            .with_cell(cell))
    }
}
