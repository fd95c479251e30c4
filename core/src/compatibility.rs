//! Which engine runs which method, and with what.
//!
//! The matrix is compiled-in reference data. It is built on first use and
//! shared read-only for the rest of the process.

use std::{collections::BTreeMap, sync::OnceLock};

use smallvec::{smallvec, SmallVec};

use crate::vocabulary::{BasisSet, Engine, Method, MethodFamily, SolvationModel, Task};

static MATRIX: OnceLock<CompatibilityMatrix> = OnceLock::new();

/// What an engine accepts alongside one method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compatibility {
    /// Empty for methods that take no basis set.
    pub bases: SmallVec<[BasisSet; 16]>,
    pub recommended_basis: Option<BasisSet>,
    /// Implicit solvation models; the first is the default.
    pub solvation: SmallVec<[SolvationModel; 4]>,
    pub forbidden_tasks: SmallVec<[Task; 4]>,
}

impl Compatibility {
    pub fn allows_basis(&self, basis: BasisSet) -> bool {
        self.bases.contains(&basis)
    }

    pub fn allows_solvation(&self, model: SolvationModel) -> bool {
        self.solvation.contains(&model)
    }

    pub fn default_solvation(&self) -> Option<SolvationModel> {
        self.solvation.first().copied()
    }

    pub fn forbids(&self, task: Task) -> bool {
        self.forbidden_tasks.contains(&task)
    }
}

/// Engines tried for a method family, most preferred first.
pub fn engine_priority(family: MethodFamily) -> &'static [Engine] {
    match family {
        MethodFamily::Wavefunction => &[Engine::Psi4, Engine::Pyscf, Engine::TeraChem],
        MethodFamily::Dft => &[Engine::Psi4, Engine::TeraChem, Engine::Pyscf],
        MethodFamily::Semiempirical => &[Engine::Xtb, Engine::Tblite],
        MethodFamily::NeuralNetwork => &[Engine::Aimnet2, Engine::Egret],
        MethodFamily::ForceField => &[Engine::Xtb, Engine::OpenFf],
    }
}

#[derive(Debug)]
pub struct CompatibilityMatrix {
    entries: BTreeMap<(Method, Engine), Compatibility>,
}

impl CompatibilityMatrix {
    /// The process-wide matrix.
    pub fn global() -> &'static CompatibilityMatrix {
        MATRIX.get_or_init(Self::build)
    }

    pub fn get(&self, method: Method, engine: Engine) -> Option<&Compatibility> {
        self.entries.get(&(method, engine))
    }

    /// Engines with an entry for `method`, in declaration order.
    pub fn engines_for(&self, method: Method) -> impl Iterator<Item = Engine> + '_ {
        Engine::ALL
            .iter()
            .copied()
            .filter(move |&engine| self.entries.contains_key(&(method, engine)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Method, Engine, &Compatibility)> {
        self.entries
            .iter()
            .map(|(&(method, engine), entry)| (method, engine, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn build() -> Self {
        let entries = Method::ALL
            .iter()
            .flat_map(|&method| Engine::ALL.iter().map(move |&engine| (method, engine)))
            .filter(|&(method, engine)| runs(engine, method))
            .map(|(method, engine)| ((method, engine), entry(method, engine)))
            .collect::<BTreeMap<_, _>>();

        log::debug!("compatibility matrix holds {} entries", entries.len());

        Self { entries }
    }
}

fn runs(engine: Engine, method: Method) -> bool {
    let info = method.info();
    if !engine.supports_family(info.family) {
        return false;
    }

    match engine {
        Engine::TeraChem => !info.post_hartree_fock && info.composite_basis.is_none(),
        Engine::Aimnet2 => matches!(method, Method::Aimnet2Wb97md3 | Method::Aimnet2B973c),
        Engine::Egret => method == Method::Egret1,
        Engine::Xtb => method != Method::OpenFf,
        Engine::OpenFf => method == Method::OpenFf,
        Engine::Psi4 | Engine::Pyscf | Engine::Tblite => true,
    }
}

const TERACHEM_BASES: &[BasisSet] = &[
    BasisSet::Sto3g,
    BasisSet::B321g,
    BasisSet::P631g,
    BasisSet::P631gStar,
    BasisSet::P631gStarStar,
    BasisSet::P631PlusGStar,
    BasisSet::Def2Svp,
    BasisSet::Def2Tzvp,
    BasisSet::CcPvdz,
];

fn entry(method: Method, engine: Engine) -> Compatibility {
    let info = method.info();

    let (bases, recommended_basis): (SmallVec<[BasisSet; 16]>, _) = if !info.family.uses_basis() {
        (SmallVec::new(), None)
    } else if let Some(own) = info.composite_basis {
        (smallvec![own], Some(own))
    } else {
        let bases = match engine {
            Engine::TeraChem => TERACHEM_BASES.iter().copied().collect(),
            _ => BasisSet::ALL
                .iter()
                .copied()
                .filter(|basis| !basis.composite_only())
                .collect(),
        };
        let recommended = match info.family {
            MethodFamily::Wavefunction if info.post_hartree_fock => BasisSet::CcPvdz,
            MethodFamily::Wavefunction => BasisSet::P631gStar,
            _ => BasisSet::Def2Svp,
        };
        (bases, Some(recommended))
    };

    let solvation: &[SolvationModel] = if info.post_hartree_fock {
        &[]
    } else {
        use SolvationModel::*;
        match engine {
            Engine::Psi4 => &[Pcm, Cpcm],
            Engine::Pyscf => &[Cpcm, Pcm, Cosmo],
            Engine::TeraChem => &[Cpcm, Cosmo],
            Engine::Xtb => &[Alpb, Gbsa, CpcmX],
            Engine::Tblite => &[Alpb, Gbsa, Cpcm],
            Engine::Aimnet2 | Engine::Egret | Engine::OpenFf => &[],
        }
    };

    let mut forbidden_tasks: SmallVec<[Task; 4]> = match engine {
        Engine::Tblite | Engine::Aimnet2 => smallvec![Task::SpinDensity],
        Engine::Egret => smallvec![Task::Charge, Task::SpinDensity, Task::Dipole],
        Engine::OpenFf => smallvec![Task::SpinDensity, Task::Dipole],
        Engine::Psi4 | Engine::Pyscf | Engine::TeraChem | Engine::Xtb => SmallVec::new(),
    };
    if matches!(
        info.family,
        MethodFamily::ForceField | MethodFamily::NeuralNetwork
    ) && !forbidden_tasks.contains(&Task::SpinDensity)
    {
        forbidden_tasks.push(Task::SpinDensity);
    }

    Compatibility {
        bases,
        recommended_basis,
        solvation: solvation.iter().copied().collect(),
        forbidden_tasks,
    }
}
