use std::fmt::Write;

use nalgebra::Vector3;

use super::Molecule;
use crate::{
    atom::{Atom, COORDINATE_DECIMALS},
    error::InvalidMoleculeError,
    periodic_table::ElementType,
};

fn xyz_error(line: usize, reason: impl Into<String>) -> InvalidMoleculeError {
    InvalidMoleculeError::Xyz {
        line,
        reason: reason.into(),
    }
}

fn parse_element(token: &str, line: usize) -> Result<ElementType, InvalidMoleculeError> {
    match token.parse::<u8>() {
        Ok(z) => ElementType::from_atomic_number(z)
            .ok_or_else(|| xyz_error(line, format!("no element with atomic number {z}"))),
        Err(_) => token.parse(),
    }
}

fn parse_atom(text: &str, line: usize) -> Result<Atom, InvalidMoleculeError> {
    let mut tokens = text.split_whitespace();

    let element = tokens
        .next()
        .ok_or_else(|| xyz_error(line, "empty atom line"))?;
    let element = parse_element(element, line)?;

    let mut position = Vector3::zeros();
    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        let token = tokens
            .next()
            .ok_or_else(|| xyz_error(line, format!("missing {name} coordinate")))?;
        position[axis] = token
            .parse::<f64>()
            .map_err(|_| xyz_error(line, format!("`{token}` is not a number")))?;
    }

    Ok(Atom::new(element, position))
}

impl Molecule {
    /// Reads XYZ text. The atom-count and comment header lines are optional;
    /// elements may be given as symbols or atomic numbers. Columns after the
    /// coordinates are ignored.
    pub fn from_xyz(
        text: &str,
        charge: i32,
        multiplicity: u32,
    ) -> Result<Self, InvalidMoleculeError> {
        let lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .collect::<Vec<_>>();

        let (declared, body) = match lines.first() {
            Some((_, first)) if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) => {
                let count = first
                    .parse::<usize>()
                    .map_err(|_| xyz_error(1, "atom count out of range"))?;
                (Some(count), lines.get(2..).unwrap_or_default())
            }
            _ => (None, lines.as_slice()),
        };

        let atoms = body
            .iter()
            .filter(|(_, line)| !line.is_empty())
            .map(|&(number, line)| parse_atom(line, number))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(count) = declared {
            if count != atoms.len() {
                return Err(xyz_error(
                    1,
                    format!("header declares {count} atoms but {} were given", atoms.len()),
                ));
            }
        }

        Molecule::new(atoms, charge, multiplicity)
    }

    /// Writes the reference geometry as XYZ text with the given comment line.
    pub fn to_xyz(&self, comment: &str) -> String {
        let precision = COORDINATE_DECIMALS as usize;
        let mut xyz = format!("{}\n{}\n", self.atoms.len(), comment.replace('\n', " "));

        for atom in &self.atoms {
            let p = atom.position;
            let _ = writeln!(
                xyz,
                "{:<2} {:>w$.precision$} {:>w$.precision$} {:>w$.precision$}",
                atom.element_type.symbol(),
                p.x,
                p.y,
                p.z,
                w = precision + 6,
            );
        }

        xyz
    }
}
