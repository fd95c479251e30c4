use super::{tagged_enum, BasisSet};

tagged_enum! {
    /// The theoretical family a method belongs to. Families decide whether a
    /// basis set, an SCF procedure or dispersion corrections make sense at all.
    pub enum MethodFamily as "method family" {
        Wavefunction => "wavefunction",
        Dft => "dft",
        Semiempirical => "semiempirical",
        NeuralNetwork => "neural_network",
        ForceField => "force_field",
    }
}

impl MethodFamily {
    /// Whether methods of this family are defined relative to a basis set.
    pub const fn uses_basis(self) -> bool {
        matches!(self, MethodFamily::Wavefunction | MethodFamily::Dft)
    }

    /// Whether methods of this family iterate a self-consistent field.
    pub const fn is_scf(self) -> bool {
        matches!(
            self,
            MethodFamily::Wavefunction | MethodFamily::Dft | MethodFamily::Semiempirical
        )
    }

    /// Prose name used in messages.
    pub const fn description(self) -> &'static str {
        match self {
            MethodFamily::Wavefunction => "wavefunction",
            MethodFamily::Dft => "DFT",
            MethodFamily::Semiempirical => "semiempirical",
            MethodFamily::NeuralNetwork => "neural-network",
            MethodFamily::ForceField => "force-field",
        }
    }
}

tagged_enum! {
    /// A level of theory.
    pub enum Method as "method" {
        HartreeFock => "hf",
        Hf3c => "hf-3c",
        Mp2 => "mp2",
        CcsdT => "ccsd(t)",

        Lsda => "lsda",
        Pbe => "pbe",
        Blyp => "blyp",
        Bp86 => "bp86",
        B97D3 => "b97-d3",
        B973c => "b97-3c",
        R2scan => "r2scan",
        R2scan3c => "r2scan-3c",
        Tpss => "tpss",
        M06l => "m06l",
        Pbe0 => "pbe0",
        B3lyp => "b3lyp",
        B3pw91 => "b3pw91",
        B97mV => "b97m_v",
        Tpss0 => "tpss0",
        M06 => "m06",
        M062x => "m062x",
        Camb3lyp => "camb3lyp",
        Wb97xD => "wb97x_d",
        Wb97xD3 => "wb97x_d3",
        Wb97xV => "wb97x_v",
        Wb97mV => "wb97m_v",
        Wb97x3c => "wb97x-3c",

        Aimnet2Wb97md3 => "aimnet2_wb97md3",
        Aimnet2B973c => "aimnet2_b973c",
        Egret1 => "egret_1",

        Gfn1Xtb => "gfn1_xtb",
        Gfn2Xtb => "gfn2_xtb",

        GfnFf => "gfn_ff",
        OpenFf => "openff",
    }
}

/// Static metadata attached to every [`Method`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MethodInfo {
    pub family: MethodFamily,
    /// Composite methods are parameterised against exactly one basis set.
    pub composite_basis: Option<BasisSet>,
    /// Correlated wavefunction methods beyond Hartree–Fock.
    pub post_hartree_fock: bool,
    /// The functional already carries its own dispersion treatment.
    pub dispersion_included: bool,
    pub closed_shell_only: bool,
    pub neutral_only: bool,
}

impl MethodInfo {
    const fn of(family: MethodFamily) -> Self {
        Self {
            family,
            composite_basis: None,
            post_hartree_fock: false,
            dispersion_included: false,
            closed_shell_only: false,
            neutral_only: false,
        }
    }

    const fn composite(self, basis: BasisSet) -> Self {
        Self {
            composite_basis: Some(basis),
            dispersion_included: true,
            ..self
        }
    }

    const fn correlated(self) -> Self {
        Self {
            post_hartree_fock: true,
            ..self
        }
    }

    const fn dispersion(self) -> Self {
        Self {
            dispersion_included: true,
            ..self
        }
    }

    const fn closed_shell(self) -> Self {
        Self {
            closed_shell_only: true,
            ..self
        }
    }

    const fn neutral(self) -> Self {
        Self {
            neutral_only: true,
            ..self
        }
    }
}

impl Method {
    pub const fn info(self) -> MethodInfo {
        use MethodFamily::*;

        match self {
            Method::HartreeFock => MethodInfo::of(Wavefunction),
            Method::Hf3c => MethodInfo::of(Wavefunction).composite(BasisSet::Minix),
            Method::Mp2 | Method::CcsdT => MethodInfo::of(Wavefunction).correlated(),

            Method::B973c => MethodInfo::of(Dft).composite(BasisSet::Def2MTzvp),
            Method::R2scan3c => MethodInfo::of(Dft).composite(BasisSet::Def2MTzvpp),
            Method::Wb97x3c => MethodInfo::of(Dft).composite(BasisSet::Vdzp),
            Method::B97D3
            | Method::B97mV
            | Method::Wb97xD
            | Method::Wb97xD3
            | Method::Wb97xV
            | Method::Wb97mV => MethodInfo::of(Dft).dispersion(),
            Method::Lsda
            | Method::Pbe
            | Method::Blyp
            | Method::Bp86
            | Method::R2scan
            | Method::Tpss
            | Method::M06l
            | Method::Pbe0
            | Method::B3lyp
            | Method::B3pw91
            | Method::Tpss0
            | Method::M06
            | Method::M062x
            | Method::Camb3lyp => MethodInfo::of(Dft),

            Method::Aimnet2Wb97md3 | Method::Aimnet2B973c => MethodInfo::of(NeuralNetwork),
            Method::Egret1 => MethodInfo::of(NeuralNetwork).closed_shell().neutral(),

            Method::Gfn1Xtb | Method::Gfn2Xtb => MethodInfo::of(Semiempirical),

            Method::GfnFf => MethodInfo::of(ForceField),
            Method::OpenFf => MethodInfo::of(ForceField).closed_shell(),
        }
    }

    pub const fn family(self) -> MethodFamily {
        self.info().family
    }

    /// Whether post hoc corrections (dispersion, counterpoise) may be added.
    pub const fn accepts_corrections(self) -> bool {
        let info = self.info();
        info.family.uses_basis() && !info.post_hartree_fock && !info.dispersion_included
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families() {
        assert_eq!(Method::B3lyp.family(), MethodFamily::Dft);
        assert_eq!(Method::Gfn2Xtb.family(), MethodFamily::Semiempirical);
        assert_eq!(Method::Mp2.family(), MethodFamily::Wavefunction);
        assert!(Method::Mp2.info().post_hartree_fock);
        assert!(!Method::HartreeFock.info().post_hartree_fock);
        assert_eq!(Method::OpenFf.family(), MethodFamily::ForceField);
    }

    #[test]
    fn composites_are_bound_to_their_basis() {
        assert_eq!(Method::Hf3c.info().composite_basis, Some(BasisSet::Minix));
        assert_eq!(Method::B973c.info().composite_basis, Some(BasisSet::Def2MTzvp));
        assert_eq!(Method::R2scan3c.info().composite_basis, Some(BasisSet::Def2MTzvpp));
        assert_eq!(Method::Wb97x3c.info().composite_basis, Some(BasisSet::Vdzp));

        for &method in Method::ALL {
            if let Some(basis) = method.info().composite_basis {
                assert!(method.family().uses_basis());
                assert!(basis.composite_only(), "{basis} should be reserved for composites");
            }
        }
    }

    #[test]
    fn corrections() {
        assert!(Method::B3lyp.accepts_corrections());
        assert!(Method::HartreeFock.accepts_corrections());
        assert!(!Method::Wb97xD3.accepts_corrections());
        assert!(!Method::B973c.accepts_corrections());
        assert!(!Method::Mp2.accepts_corrections());
        assert!(!Method::Gfn2Xtb.accepts_corrections());
    }

    #[test]
    fn families_describe_themselves() {
        assert_eq!(MethodFamily::Semiempirical.description(), "semiempirical");
        assert!(!MethodFamily::Semiempirical.uses_basis());
        assert!(MethodFamily::Semiempirical.is_scf());
        assert!(!MethodFamily::ForceField.is_scf());
    }
}
