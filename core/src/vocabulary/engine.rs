use super::{tagged_enum, ComputeType, MethodFamily};

tagged_enum! {
    /// An external program that executes resolved calculation requests.
    pub enum Engine as "engine" {
        Psi4 => "psi4",
        Pyscf => "pyscf",
        TeraChem => "terachem",
        Xtb => "xtb",
        Tblite => "tblite",
        Aimnet2 => "aimnet2",
        Egret => "egret",
        OpenFf => "openff",
    }
}

/// Capabilities of an [`Engine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineInfo {
    pub families: &'static [MethodFamily],
    /// Largest number of atoms the engine is practical for, summed over
    /// every conformer it will be asked to evaluate.
    pub max_atoms: usize,
    pub symmetry: bool,
    pub periodic: bool,
    /// Supported compute types; the first is the default.
    pub compute: &'static [ComputeType],
}

impl Engine {
    pub const fn info(self) -> EngineInfo {
        use ComputeType::{Cpu, Gpu};
        use MethodFamily::*;

        match self {
            Engine::Psi4 => EngineInfo {
                families: &[Wavefunction, Dft],
                max_atoms: 250,
                symmetry: true,
                periodic: false,
                compute: &[Cpu],
            },
            Engine::Pyscf => EngineInfo {
                families: &[Wavefunction, Dft],
                max_atoms: 200,
                symmetry: true,
                periodic: false,
                compute: &[Cpu, Gpu],
            },
            Engine::TeraChem => EngineInfo {
                families: &[Wavefunction, Dft],
                max_atoms: 2_000,
                symmetry: false,
                periodic: false,
                compute: &[Gpu],
            },
            Engine::Xtb => EngineInfo {
                families: &[Semiempirical, ForceField],
                max_atoms: 10_000,
                symmetry: false,
                periodic: true,
                compute: &[Cpu],
            },
            Engine::Tblite => EngineInfo {
                families: &[Semiempirical],
                max_atoms: 10_000,
                symmetry: false,
                periodic: true,
                compute: &[Cpu],
            },
            Engine::Aimnet2 => EngineInfo {
                families: &[NeuralNetwork],
                max_atoms: 20_000,
                symmetry: false,
                periodic: false,
                compute: &[Gpu, Cpu],
            },
            Engine::Egret => EngineInfo {
                families: &[NeuralNetwork],
                max_atoms: 20_000,
                symmetry: false,
                periodic: false,
                compute: &[Gpu, Cpu],
            },
            Engine::OpenFf => EngineInfo {
                families: &[ForceField],
                max_atoms: 100_000,
                symmetry: false,
                periodic: true,
                compute: &[Cpu],
            },
        }
    }

    pub fn supports_family(self, family: MethodFamily) -> bool {
        self.info().families.contains(&family)
    }

    pub fn supports_compute(self, compute: ComputeType) -> bool {
        self.info().compute.contains(&compute)
    }

    pub fn default_compute(self) -> ComputeType {
        // every engine lists at least one compute type
        self.info().compute.first().copied().unwrap_or(ComputeType::Cpu)
    }
}
