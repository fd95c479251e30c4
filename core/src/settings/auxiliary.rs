use smallvec::SmallVec;

use super::Field;
use crate::vocabulary::{
    ComputeType, ConstraintKind, Correction, Mode, Soscf, Solvent, Symmetry, Task,
};

/// A geometric coordinate frozen during optimization, by 0-based atom index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub atoms: SmallVec<[usize; 4]>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, atoms: impl IntoIterator<Item = usize>) -> Self {
        Self {
            kind,
            atoms: atoms.into_iter().collect(),
        }
    }
}

macro_rules! auxiliary_fields {
    ($( $(#[$meta:meta])* $key:ident: $ty:ty ),+ $(,)?) => {
        /// The auxiliary tunables of a [`Settings`](super::Settings) record.
        ///
        /// Fields are declared in resolution order; a field's default may
        /// depend only on the fields above it.
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct Auxiliary {
            $( $(#[$meta])* pub $key: Field<$ty> ),+
        }

        impl Auxiliary {
            /// Wire keys in resolution order.
            pub const KEYS: &'static [&'static str] = &[$(stringify!($key)),+];

            const PATHS: &'static [&'static str] =
                &[$(concat!("settings.auxiliary.", stringify!($key))),+];

            fn unset_flags(&self) -> impl Iterator<Item = bool> {
                [$(self.$key.is_unset()),+].into_iter()
            }
        }
    };
}

auxiliary_fields! {
    tasks: Vec<Task>,
    corrections: Vec<Correction>,
    mode: Mode,
    scf_max_iterations: u32,
    /// Energy change between SCF iterations, in Hartree.
    scf_convergence: f64,
    soscf: Soscf,
    opt_max_steps: u32,
    constraints: Vec<Constraint>,
    /// Hartree/Bohr
    opt_max_gradient: f64,
    /// Hartree/Bohr
    opt_rms_gradient: f64,
    /// Hartree
    opt_energy_threshold: f64,
    /// Kelvin
    temperature: f64,
    /// Low-frequency cutoff in cm⁻¹ for the quasi-RRHO treatment.
    frequency_cutoff: f64,
    frequency_scaling: f64,
    /// Standard-state concentration in mol/L.
    concentration: f64,
    symmetry: Symmetry,
    compute_type: ComputeType,
    solvent: Solvent,
}

impl Auxiliary {
    /// Wire paths of the fields still unset, in resolution order.
    pub fn unset_paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::PATHS
            .iter()
            .zip(self.unset_flags())
            .filter_map(|(&path, unset)| unset.then_some(path))
    }

    pub fn is_resolved(&self) -> bool {
        self.unset_paths().next().is_none()
    }

    pub fn has_task(&self, predicate: impl Fn(Task) -> bool) -> bool {
        self.tasks
            .value()
            .is_some_and(|tasks| tasks.iter().any(|&task| predicate(task)))
    }

    pub fn is_optimization(&self) -> bool {
        self.has_task(Task::is_optimization)
    }

    pub fn needs_thermochemistry(&self) -> bool {
        self.has_task(Task::needs_thermochemistry)
    }
}
