use crate::periodic_table::ElementType;

use super::tagged_enum;

tagged_enum! {
    /// A named Gaussian basis set.
    pub enum BasisSet as "basis set" {
        Sto3g => "STO-3G",
        B321g => "3-21G",
        P631g => "6-31G",
        P631gStar => "6-31G*",
        P631gStarStar => "6-31G**",
        P631PlusGStar => "6-31+G*",
        P6311gStar => "6-311G*",
        Def2Svp => "def2-SVP",
        Def2Tzvp => "def2-TZVP",
        Def2Tzvpp => "def2-TZVPP",
        Def2MTzvp => "def2-mTZVP",
        Def2MTzvpp => "def2-mTZVPP",
        CcPvdz => "cc-pVDZ",
        CcPvtz => "cc-pVTZ",
        AugCcPvdz => "aug-cc-pVDZ",
        Pcseg1 => "pcseg-1",
        Minix => "MINIX",
        Vdzp => "vDZP",
    }
}

// inclusive atomic-number ranges
const KARLSRUHE: &[(u8, u8)] = &[(1, 57), (72, 86)];
const DUNNING: &[(u8, u8)] = &[(1, 18), (20, 20), (31, 36)];

impl BasisSet {
    /// The elements this basis set defines functions for, as inclusive
    /// atomic-number ranges.
    pub fn coverage(self) -> &'static [(u8, u8)] {
        match self {
            BasisSet::Sto3g => &[(1, 54)],
            BasisSet::B321g => &[(1, 55)],
            BasisSet::P631g | BasisSet::P631gStar | BasisSet::P631gStarStar => &[(1, 30)],
            BasisSet::P631PlusGStar => &[(1, 20)],
            BasisSet::P6311gStar => &[(1, 20), (31, 36), (53, 53)],
            BasisSet::Def2Svp
            | BasisSet::Def2Tzvp
            | BasisSet::Def2Tzvpp
            | BasisSet::Def2MTzvp
            | BasisSet::Def2MTzvpp => KARLSRUHE,
            BasisSet::CcPvdz | BasisSet::CcPvtz => DUNNING,
            BasisSet::AugCcPvdz => &[(1, 18), (31, 36)],
            BasisSet::Pcseg1 | BasisSet::Minix | BasisSet::Vdzp => &[(1, 86)],
        }
    }

    pub fn covers(self, element: ElementType) -> bool {
        let z = element.atomic_number();
        self.coverage()
            .iter()
            .any(|&(first, last)| (first..=last).contains(&z))
    }

    /// Basis sets that only exist as part of a composite method.
    pub const fn composite_only(self) -> bool {
        matches!(
            self,
            BasisSet::Minix | BasisSet::Def2MTzvp | BasisSet::Def2MTzvpp | BasisSet::Vdzp
        )
    }
}
