//! Error types for molecule construction, vocabulary lookup, default resolution,
//! validation and the wire format.
//!
//! Every failure names the field or rule responsible. Nothing in this crate
//! recovers from these errors locally: the operation that raised one did not
//! produce a value.

use std::fmt;

use thiserror::Error;

use crate::vocabulary::{Engine, Method};

/// Violations of the geometric or electronic invariants of a
/// [`Molecule`](crate::molecule::Molecule).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InvalidMoleculeError {
    /// The atom list is empty.
    #[error("a molecule needs at least one atom")]
    Empty,

    /// A required wire field (`atoms`, `charge` or `multiplicity`) is missing.
    #[error("missing required molecule field `{0}`")]
    MissingField(&'static str),

    /// The charge does not fit the supported integer range.
    #[error("charge {0} is out of range")]
    ChargeRange(i64),

    /// Multiplicity below one, or beyond the supported integer range.
    #[error("multiplicity must be at least 1, got {0}")]
    Multiplicity(i64),

    /// Electron count and multiplicity disagree on parity.
    #[error(
        "{electrons} electrons (charge {charge}) cannot have multiplicity {multiplicity}: \
         electron count and unpaired electrons must have the same parity"
    )]
    Parity {
        /// Total electron count, `sum(Z) - charge`.
        electrons: i64,
        /// Molecular charge.
        charge: i32,
        /// Requested spin multiplicity.
        multiplicity: u32,
    },

    /// More electrons removed than the nuclei provide.
    #[error("charge {charge} leaves {electrons} electrons")]
    NegativeElectrons {
        /// Molecular charge.
        charge: i32,
        /// Resulting electron count.
        electrons: i64,
    },

    /// Multiplicity asks for more unpaired electrons than exist.
    #[error(
        "multiplicity {multiplicity} needs {unpaired} unpaired electrons but only {electrons} exist"
    )]
    TooManyUnpaired {
        /// Requested spin multiplicity.
        multiplicity: u32,
        /// Unpaired electrons implied by the multiplicity.
        unpaired: i64,
        /// Total electron count.
        electrons: i64,
    },

    /// An atom coordinate is NaN or infinite.
    #[error("atom {atom} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the atom.
        atom: usize,
    },

    /// An atom carries a mass override that is not a positive finite number.
    #[error("atom {atom} has invalid mass override {mass}")]
    Mass {
        /// Index of the atom.
        atom: usize,
        /// The rejected mass, in amu.
        mass: f64,
    },

    /// Per-atom formal charges do not add up to the molecular charge.
    #[error("formal charges sum to {sum} but the molecule charge is {charge}")]
    FormalCharges {
        /// Sum of per-atom formal charges.
        sum: i64,
        /// Molecular charge.
        charge: i32,
    },

    /// Unrecognised element symbol or atomic number.
    #[error("unknown element `{0}`")]
    UnknownElement(String),

    /// Unrecognised per-atom spin tag.
    #[error("atom {atom} has unknown spin tag `{tag}`")]
    UnknownSpin {
        /// Index of the atom.
        atom: usize,
        /// The rejected tag.
        tag: String,
    },

    /// A bond references an atom index outside the atom list.
    #[error("bond {bond} references atom {index}, but the molecule has {n_atoms} atoms")]
    BondIndex {
        /// Index of the bond in the connectivity table.
        bond: usize,
        /// The out-of-range atom index.
        index: usize,
        /// Number of atoms in the molecule.
        n_atoms: usize,
    },

    /// A bond joins an atom to itself.
    #[error("bond {bond} joins atom {atom} to itself")]
    SelfBond {
        /// Index of the bond.
        bond: usize,
        /// The atom index.
        atom: usize,
    },

    /// The same atom pair appears twice in the connectivity table.
    #[error("bond {bond} repeats the pair {a}-{b}")]
    DuplicateBond {
        /// Index of the repeated bond.
        bond: usize,
        /// First atom.
        a: usize,
        /// Second atom.
        b: usize,
    },

    /// Bond order outside 1..=3.
    #[error("bond {bond} has order {order}; expected 1, 2 or 3")]
    BondOrder {
        /// Index of the bond.
        bond: usize,
        /// The rejected order.
        order: i64,
    },

    /// A conformer does not provide exactly one position per atom.
    #[error("conformer {conformer} has {found} positions, expected {expected}")]
    ConformerLength {
        /// Index of the conformer.
        conformer: usize,
        /// Positions supplied.
        found: usize,
        /// Atoms in the molecule.
        expected: usize,
    },

    /// A conformer coordinate is NaN or infinite.
    #[error("conformer {conformer}: atom {atom} has a non-finite coordinate")]
    NonFiniteConformer {
        /// Index of the conformer.
        conformer: usize,
        /// Index of the atom.
        atom: usize,
    },

    /// The periodic cell is malformed.
    #[error("invalid periodic cell: {0}")]
    Cell(&'static str),

    /// Malformed XYZ text.
    #[error("xyz line {line}: {reason}")]
    Xyz {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// A tag that names no member of a closed vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown {kind} `{tag}`")]
pub struct UnknownVocabularyError {
    /// Which vocabulary was searched, e.g. `"method"`.
    pub kind: &'static str,
    /// The text that failed to parse.
    pub tag: String,
}

impl UnknownVocabularyError {
    pub fn new(kind: &'static str, tag: impl Into<String>) -> Self {
        Self {
            kind,
            tag: tag.into(),
        }
    }
}

/// An explicitly supplied settings value that contradicts the vocabulary metadata.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid `{field}`: {reason}")]
pub struct InvalidVocabularyReferenceError {
    /// The settings field at fault.
    pub field: &'static str,
    /// Why the value was rejected.
    pub reason: String,
}

impl InvalidVocabularyReferenceError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl From<UnknownVocabularyError> for InvalidVocabularyReferenceError {
    fn from(value: UnknownVocabularyError) -> Self {
        Self::new(value.kind, value.to_string())
    }
}

/// No engine in the method family's priority list can take the molecule.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(
    "no engine can run {method} on {n_atoms} atoms (considered: {})",
    display_engines(.considered)
)]
pub struct NoCompatibleEngineError {
    /// The requested method.
    pub method: Method,
    /// Atoms in the molecule.
    pub n_atoms: usize,
    /// Engines that were tried, in priority order.
    pub considered: Vec<Engine>,
}

fn display_engines(engines: &[Engine]) -> String {
    if engines.is_empty() {
        return "none".to_owned();
    }
    engines
        .iter()
        .map(|engine| engine.tag())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A settings field that default resolution could not fill.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error(transparent)]
    NoCompatibleEngine(#[from] NoCompatibleEngineError),

    /// The chosen engine does not run the method at all.
    #[error("engine {engine} does not run {method}")]
    UnsupportedEngine { method: Method, engine: Engine },

    /// The compatibility matrix names no recommended basis for the pair.
    #[error("no recommended basis set for {method} on {engine}")]
    NoRecommendedBasis { method: Method, engine: Engine },

    /// A solvent was requested but the pair supports no implicit solvation model.
    #[error("a solvent was requested but {engine} offers no implicit solvation model for {method}")]
    NoSolvationModel { method: Method, engine: Engine },

    /// `mode = manual` forbids defaulting this threshold.
    #[error("`{field}` must be given explicitly when mode is manual")]
    ManualValueRequired { field: &'static str },
}

impl ResolutionError {
    /// The settings field that could not be resolved.
    pub fn field(&self) -> &'static str {
        match self {
            ResolutionError::NoCompatibleEngine(_) | ResolutionError::UnsupportedEngine { .. } => {
                "engine"
            }
            ResolutionError::NoRecommendedBasis { .. } => "basis",
            ResolutionError::NoSolvationModel { .. } => "solvation",
            ResolutionError::ManualValueRequired { field } => *field,
        }
    }
}

/// Cross-field invariants re-checked after resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Invariant {
    Unresolved,
    ElectronParity,
    ClosedShellRequired,
    NeutralRequired,
    EngineSupportsMethod,
    BasisNotApplicable,
    CompositeBasis,
    BasisAllowed,
    BasisCoverage,
    SolvationAllowed,
    SolventWithoutModel,
    AtomLimit,
    PeriodicSupport,
    TasksNonEmpty,
    UniqueEntries,
    TaskAllowed,
    CorrectionsApplicable,
    TunableApplicable,
    PositiveTunables,
    ConstraintAtoms,
    ComputeTypeSupported,
    SymmetrySupported,
}

impl Invariant {
    pub const fn name(self) -> &'static str {
        match self {
            Invariant::Unresolved => "unresolved",
            Invariant::ElectronParity => "electron-parity",
            Invariant::ClosedShellRequired => "closed-shell-required",
            Invariant::NeutralRequired => "neutral-required",
            Invariant::EngineSupportsMethod => "engine-supports-method",
            Invariant::BasisNotApplicable => "basis-not-applicable",
            Invariant::CompositeBasis => "composite-basis",
            Invariant::BasisAllowed => "basis-allowed",
            Invariant::BasisCoverage => "basis-coverage",
            Invariant::SolvationAllowed => "solvation-allowed",
            Invariant::SolventWithoutModel => "solvent-without-model",
            Invariant::AtomLimit => "atom-limit",
            Invariant::PeriodicSupport => "periodic-support",
            Invariant::TasksNonEmpty => "tasks-non-empty",
            Invariant::UniqueEntries => "unique-entries",
            Invariant::TaskAllowed => "task-allowed",
            Invariant::CorrectionsApplicable => "corrections-applicable",
            Invariant::TunableApplicable => "tunable-applicable",
            Invariant::PositiveTunables => "positive-tunables",
            Invariant::ConstraintAtoms => "constraint-atoms",
            Invariant::ComputeTypeSupported => "compute-type-supported",
            Invariant::SymmetrySupported => "symmetry-supported",
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved request that breaks a cross-field invariant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{invariant}: {detail} [{}]", .fields.join(", "))]
pub struct ValidationError {
    /// The violated invariant.
    pub invariant: Invariant,
    /// The offending fields, as wire keys (`settings.basis`, `molecule.multiplicity`, ...).
    pub fields: Vec<&'static str>,
    /// Human-readable explanation.
    pub detail: String,
}

impl ValidationError {
    pub fn new(
        invariant: Invariant,
        fields: impl IntoIterator<Item = &'static str>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            invariant,
            fields: fields.into_iter().collect(),
            detail: detail.into(),
        }
    }
}

/// Input JSON that does not match the wire schema.
#[derive(Debug, Error)]
pub enum SchemaMismatchError {
    /// Malformed JSON, an unknown key, or a value of the wrong type.
    #[error("request does not match the wire schema: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or unsupported `schema_version`.
    #[error("unsupported schema version {found:?}, expected {expected:?}")]
    Version {
        found: Option<String>,
        expected: &'static str,
    },
}

/// Any error raised at the crate boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidMolecule(#[from] InvalidMoleculeError),
    #[error(transparent)]
    UnknownVocabulary(#[from] UnknownVocabularyError),
    #[error(transparent)]
    InvalidVocabularyReference(#[from] InvalidVocabularyReferenceError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),
}

impl From<NoCompatibleEngineError> for Error {
    fn from(value: NoCompatibleEngineError) -> Self {
        Error::Resolution(value.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::SchemaMismatch(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_invariant_and_fields() {
        let error = ValidationError::new(
            Invariant::BasisNotApplicable,
            ["settings.basis", "settings.method"],
            "basis not applicable to semiempirical method",
        );
        assert_eq!(
            error.to_string(),
            "basis-not-applicable: basis not applicable to semiempirical method \
             [settings.basis, settings.method]"
        );
    }

    #[test]
    fn engine_error_lists_considered_engines() {
        let error = NoCompatibleEngineError {
            method: Method::B3lyp,
            n_atoms: 5000,
            considered: vec![Engine::Psi4, Engine::TeraChem, Engine::Pyscf],
        };
        assert_eq!(
            error.to_string(),
            "no engine can run b3lyp on 5000 atoms (considered: psi4, terachem, pyscf)"
        );
        assert_eq!(ResolutionError::from(error).field(), "engine");
    }
}
