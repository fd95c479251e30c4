//! Enumerated values of the auxiliary tunables.

use super::tagged_enum;

tagged_enum! {
    /// A property the engine is asked to compute.
    pub enum Task as "task" {
        Energy => "energy",
        Gradient => "gradient",
        Optimize => "optimize",
        OptimizeTs => "optimize_ts",
        Charge => "charge",
        SpinDensity => "spin_density",
        Dipole => "dipole",
        Hessian => "hessian",
        Frequencies => "frequencies",
    }
}

impl Task {
    pub const fn is_optimization(self) -> bool {
        matches!(self, Task::Optimize | Task::OptimizeTs)
    }

    pub const fn needs_thermochemistry(self) -> bool {
        matches!(self, Task::Hessian | Task::Frequencies)
    }
}

tagged_enum! {
    /// Post hoc corrections added on top of a method.
    pub enum Correction as "correction" {
        /// Grimme's D3 dispersion with Becke–Johnson damping.
        D3bj => "d3bj",
        /// Grimme's D3 dispersion with zero damping.
        D3 => "d3",
        D4 => "d4",
        /// Geometric counterpoise correction.
        Gcp => "gcp",
    }
}

tagged_enum! {
    /// Overall accuracy/cost trade-off; drives threshold defaults.
    ///
    /// Declaration order runs from loosest to tightest.
    pub enum Mode as "mode" {
        Reckless => "reckless",
        Rapid => "rapid",
        Careful => "careful",
        Meticulous => "meticulous",
        Debug => "debug",
        /// Thresholds are never defaulted.
        Manual => "manual",
    }
}

tagged_enum! {
    /// When to fall back to second-order SCF.
    pub enum Soscf as "soscf setting" {
        Always => "always",
        UponFailure => "upon_failure",
        Never => "never",
    }
}

tagged_enum! {
    pub enum Symmetry as "symmetry setting" {
        Off => "off",
        Detect => "detect",
    }
}

tagged_enum! {
    pub enum ComputeType as "compute type" {
        Cpu => "cpu",
        Gpu => "gpu",
    }
}

tagged_enum! {
    /// Geometric coordinate held fixed during an optimization.
    pub enum ConstraintKind as "constraint kind" {
        Bond => "bond",
        Angle => "angle",
        Dihedral => "dihedral",
    }
}

impl ConstraintKind {
    /// Number of atoms the constraint spans.
    pub const fn arity(self) -> usize {
        match self {
            ConstraintKind::Bond => 2,
            ConstraintKind::Angle => 3,
            ConstraintKind::Dihedral => 4,
        }
    }
}

tagged_enum! {
    /// Per-atom spin tag for broken-symmetry initial guesses.
    pub enum Spin as "spin tag" {
        Alpha => "alpha",
        Beta => "beta",
    }
}
