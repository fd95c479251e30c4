//! Deterministic fixture molecules for tests and benchmarks.

use crate::{atom::Atom, molecule::Molecule, periodic_table::ElementType};

fn closed_shell(atoms: Vec<Atom>) -> Molecule {
    Molecule {
        atoms,
        charge: 0,
        multiplicity: 1,
        bonds: Vec::new(),
        conformers: Vec::new(),
        cell: None,
    }
}

/// H2O
pub fn water() -> Molecule {
    use ElementType::{H, O};

    closed_shell(vec![
        Atom::new(O, [0.0, 0.0, 0.0]),
        Atom::new(H, [0.0, 0.75, 0.585]),
        Atom::new(H, [0.0, -0.75, 0.585]),
    ])
}

/// Neutral glycine, 10 atoms.
pub fn glycine() -> Molecule {
    use ElementType::{C, H, N, O};

    closed_shell(vec![
        Atom::new(C, [0.0, 0.0, 0.0]),
        Atom::new(C, [1.52, 0.0, 0.0]),
        Atom::new(O, [2.15, 1.05, 0.0]),
        Atom::new(O, [2.09, -1.22, 0.0]),
        Atom::new(H, [3.05, -1.13, 0.0]),
        Atom::new(N, [-0.5, 1.39, 0.0]),
        Atom::new(H, [-1.51, 1.39, 0.0]),
        Atom::new(H, [-0.18, 1.86, 0.83]),
        Atom::new(H, [-0.36, -0.52, 0.89]),
        Atom::new(H, [-0.36, -0.52, -0.89]),
    ])
}

/// A ground-state oxygen atom (triplet).
pub fn triplet_oxygen() -> Molecule {
    Molecule {
        multiplicity: 3,
        ..closed_shell(vec![Atom::new(ElementType::O, [0.0; 3])])
    }
}

/// A straight-chain alkane CₙH₂ₙ₊₂ in an all-trans zig-zag, `3n + 2` atoms.
/// `n` below one is treated as methane.
pub fn alkane(n: usize) -> Molecule {
    const CC_X: f64 = 1.26;
    const CC_Y: f64 = 0.89;
    const CH_Y: f64 = 0.63;
    const CH_Z: f64 = 0.89;
    const CH_END: f64 = 1.07;

    let n = n.max(1);
    let mut atoms = Vec::with_capacity(3 * n + 2);

    for i in 0..n {
        let x = CC_X * i as f64;
        let (y, outward) = if i % 2 == 0 { (0.0, -1.0) } else { (CC_Y, 1.0) };

        atoms.push(Atom::new(ElementType::C, [x, y, 0.0]));
        for z in [CH_Z, -CH_Z] {
            atoms.push(Atom::new(ElementType::H, [x, y + outward * CH_Y, z]));
        }
    }

    atoms.push(Atom::new(ElementType::H, [-CH_END, 0.0, 0.0]));
    let last = CC_X * (n - 1) as f64 + CH_END;
    let last_y = if (n - 1) % 2 == 0 { 0.0 } else { CC_Y };
    atoms.push(Atom::new(ElementType::H, [last, last_y, 0.0]));

    closed_shell(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_valid_molecules() {
        for molecule in [water(), glycine(), triplet_oxygen(), alkane(0), alkane(5)] {
            let rebuilt = Molecule::new(
                molecule.atoms().to_vec(),
                molecule.charge(),
                molecule.multiplicity(),
            );
            assert_eq!(rebuilt.as_ref(), Ok(&molecule));
        }
    }

    #[test]
    fn alkane_sizes() {
        assert_eq!(alkane(1).len(), 5);
        assert_eq!(alkane(10).len(), 32);
        assert_eq!(alkane(10).n_electrons(), 82);
    }

    #[test]
    fn alkane_atoms_do_not_overlap() {
        let propane = alkane(3);
        for i in 0..propane.len() {
            for j in i + 1..propane.len() {
                assert!(propane.distance(i, j).unwrap() > 0.9, "{i} {j}");
            }
        }
    }
}
