//! Cross-field checks on resolved settings paired with their molecule.
//!
//! Checks run in a fixed order. [`validate`] stops at the first violation,
//! [`violations`] collects them all.

use itertools::Itertools;

use crate::{
    compatibility::{Compatibility, CompatibilityMatrix},
    error::{Invariant, ValidationError},
    molecule::Molecule,
    request::CalculationRequest,
    settings::{Auxiliary, Field, Settings},
    vocabulary::{Engine, MethodInfo, Symmetry},
};

/// What every check looks at.
struct Subject<'a> {
    molecule: &'a Molecule,
    settings: &'a Settings,
    info: MethodInfo,
    engine: Option<Engine>,
    entry: Option<&'static Compatibility>,
}

impl<'a> Subject<'a> {
    fn new(molecule: &'a Molecule, settings: &'a Settings) -> Self {
        let entry = settings
            .engine
            .and_then(|engine| CompatibilityMatrix::global().get(settings.method, engine));
        Self {
            molecule,
            settings,
            info: settings.method.info(),
            engine: settings.engine,
            entry,
        }
    }

    fn auxiliary(&self) -> &Auxiliary {
        &self.settings.auxiliary
    }
}

type Check = fn(&Subject, &mut Vec<ValidationError>);

const CHECKS: &[Check] = &[
    unresolved,
    electron_parity,
    closed_shell,
    neutral,
    engine_supports_method,
    basis_not_applicable,
    composite_basis,
    basis_allowed,
    basis_coverage,
    solvation,
    atom_limit,
    periodic_support,
    tasks,
    unique_entries,
    corrections,
    tunables_applicable,
    positive_tunables,
    constraint_atoms,
    compute_type,
    symmetry,
];

/// Pairs `molecule` with resolved `settings` if every invariant holds.
pub fn validate(
    molecule: Molecule,
    settings: Settings,
) -> Result<CalculationRequest, ValidationError> {
    let subject = Subject::new(&molecule, &settings);

    for check in CHECKS {
        let mut found = Vec::new();
        check(&subject, &mut found);
        if let Some(error) = found.into_iter().next() {
            log::debug!("validation failed: {error}");
            return Err(error);
        }
    }

    Ok(CalculationRequest { molecule, settings })
}

/// Every violated invariant, in check order.
pub fn violations(molecule: &Molecule, settings: &Settings) -> Vec<ValidationError> {
    let subject = Subject::new(molecule, settings);
    let mut found = Vec::new();
    for check in CHECKS {
        check(&subject, &mut found);
    }
    found
}

fn unresolved(subject: &Subject, found: &mut Vec<ValidationError>) {
    let fields = subject.settings.unresolved_fields();
    if !fields.is_empty() {
        let detail = format!("{} settings fields are unresolved", fields.len());
        found.push(ValidationError::new(Invariant::Unresolved, fields, detail));
    }
}

fn electron_parity(subject: &Subject, found: &mut Vec<ValidationError>) {
    let molecule = subject.molecule;
    let electrons = molecule.n_electrons();
    if (electrons - molecule.unpaired_electrons()) % 2 != 0 {
        found.push(ValidationError::new(
            Invariant::ElectronParity,
            ["molecule.charge", "molecule.multiplicity"],
            format!(
                "{electrons} electrons cannot have multiplicity {}",
                molecule.multiplicity()
            ),
        ));
    }
}

fn closed_shell(subject: &Subject, found: &mut Vec<ValidationError>) {
    if subject.info.closed_shell_only && !subject.molecule.is_closed_shell() {
        found.push(ValidationError::new(
            Invariant::ClosedShellRequired,
            ["molecule.multiplicity", "settings.method"],
            format!(
                "{} requires a closed-shell molecule, got multiplicity {}",
                subject.settings.method,
                subject.molecule.multiplicity()
            ),
        ));
    }
}

fn neutral(subject: &Subject, found: &mut Vec<ValidationError>) {
    if subject.info.neutral_only && subject.molecule.charge() != 0 {
        found.push(ValidationError::new(
            Invariant::NeutralRequired,
            ["molecule.charge", "settings.method"],
            format!(
                "{} requires a neutral molecule, got charge {}",
                subject.settings.method,
                subject.molecule.charge()
            ),
        ));
    }
}

fn engine_supports_method(subject: &Subject, found: &mut Vec<ValidationError>) {
    if let (Some(engine), None) = (subject.engine, subject.entry) {
        found.push(ValidationError::new(
            Invariant::EngineSupportsMethod,
            ["settings.engine", "settings.method"],
            format!("{engine} does not run {}", subject.settings.method),
        ));
    }
}

fn basis_not_applicable(subject: &Subject, found: &mut Vec<ValidationError>) {
    let family = subject.info.family;
    if !family.uses_basis() && subject.settings.basis.is_value() {
        found.push(ValidationError::new(
            Invariant::BasisNotApplicable,
            ["settings.basis", "settings.method"],
            format!("basis not applicable to {} method", family.description()),
        ));
    }
}

fn composite_basis(subject: &Subject, found: &mut Vec<ValidationError>) {
    let Some(own) = subject.info.composite_basis else {
        return;
    };
    if subject.settings.basis != Field::Value(own) {
        found.push(ValidationError::new(
            Invariant::CompositeBasis,
            ["settings.basis", "settings.method"],
            format!("{} is only defined with {own}", subject.settings.method),
        ));
    }
}

fn basis_allowed(subject: &Subject, found: &mut Vec<ValidationError>) {
    if !subject.info.family.uses_basis() || subject.info.composite_basis.is_some() {
        return;
    }
    let (Some(engine), Some(entry)) = (subject.engine, subject.entry) else {
        return;
    };

    match subject.settings.basis {
        Field::Value(basis) if !entry.allows_basis(basis) => {
            found.push(ValidationError::new(
                Invariant::BasisAllowed,
                ["settings.basis", "settings.engine"],
                format!("{engine} does not offer {basis}"),
            ));
        }
        Field::NotApplicable => {
            found.push(ValidationError::new(
                Invariant::BasisAllowed,
                ["settings.basis", "settings.method"],
                format!(
                    "{} method {} needs a basis set",
                    subject.info.family.description(),
                    subject.settings.method
                ),
            ));
        }
        _ => {}
    }
}

fn basis_coverage(subject: &Subject, found: &mut Vec<ValidationError>) {
    if !subject.info.family.uses_basis() {
        return;
    }
    let Some(&basis) = subject.settings.basis.value() else {
        return;
    };

    let missing = subject
        .molecule
        .elements()
        .into_iter()
        .filter(|&element| !basis.covers(element))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        found.push(ValidationError::new(
            Invariant::BasisCoverage,
            ["settings.basis", "molecule.atoms"],
            format!("{basis} has no functions for {}", missing.iter().join(", ")),
        ));
    }
}

fn solvation(subject: &Subject, found: &mut Vec<ValidationError>) {
    let settings = subject.settings;
    let solvent = &settings.auxiliary.solvent;

    match (settings.solvation, subject.engine, subject.entry) {
        (Field::Value(model), Some(engine), Some(entry)) if !entry.allows_solvation(model) => {
            found.push(ValidationError::new(
                Invariant::SolvationAllowed,
                ["settings.solvation", "settings.engine"],
                format!("{engine} does not offer {model} for {}", settings.method),
            ));
        }
        (Field::Value(model), _, _) if !solvent.is_value() => {
            found.push(ValidationError::new(
                Invariant::SolventWithoutModel,
                ["settings.solvation", "settings.auxiliary.solvent"],
                format!("solvation model {model} needs a solvent"),
            ));
        }
        (Field::NotApplicable, _, _) if solvent.is_value() => {
            found.push(ValidationError::new(
                Invariant::SolventWithoutModel,
                ["settings.auxiliary.solvent", "settings.solvation"],
                "a solvent was given without a solvation model",
            ));
        }
        _ => {}
    }
}

fn atom_limit(subject: &Subject, found: &mut Vec<ValidationError>) {
    let Some(engine) = subject.engine else {
        return;
    };
    let count = subject.molecule.expanded_atom_count();
    let limit = engine.info().max_atoms;
    if count > limit {
        found.push(ValidationError::new(
            Invariant::AtomLimit,
            ["settings.engine", "molecule.atoms", "molecule.conformers"],
            format!("{engine} handles at most {limit} atoms, the request needs {count}"),
        ));
    }
}

fn periodic_support(subject: &Subject, found: &mut Vec<ValidationError>) {
    let Some(engine) = subject.engine else {
        return;
    };
    if subject.molecule.is_periodic() && !engine.info().periodic {
        found.push(ValidationError::new(
            Invariant::PeriodicSupport,
            ["settings.engine", "molecule.cell"],
            format!("{engine} does not support periodic systems"),
        ));
    }
}

fn tasks(subject: &Subject, found: &mut Vec<ValidationError>) {
    let tasks = match &subject.auxiliary().tasks {
        Field::Value(tasks) if !tasks.is_empty() => tasks,
        Field::Unset => return,
        _ => {
            found.push(ValidationError::new(
                Invariant::TasksNonEmpty,
                ["settings.auxiliary.tasks"],
                "at least one task is required",
            ));
            return;
        }
    };

    let (Some(engine), Some(entry)) = (subject.engine, subject.entry) else {
        return;
    };
    let forbidden = tasks
        .iter()
        .filter(|&&task| entry.forbids(task))
        .collect::<Vec<_>>();
    if !forbidden.is_empty() {
        found.push(ValidationError::new(
            Invariant::TaskAllowed,
            ["settings.auxiliary.tasks", "settings.engine"],
            format!(
                "{engine} cannot compute {} with {}",
                forbidden.iter().join(", "),
                subject.settings.method
            ),
        ));
    }
}

fn unique_entries(subject: &Subject, found: &mut Vec<ValidationError>) {
    fn check<T: Eq + std::hash::Hash + std::fmt::Debug>(
        field: &'static str,
        values: &Field<Vec<T>>,
        found: &mut Vec<ValidationError>,
    ) {
        let Some(values) = values.value() else {
            return;
        };
        let repeated = values.iter().duplicates().collect::<Vec<_>>();
        if !repeated.is_empty() {
            found.push(ValidationError::new(
                Invariant::UniqueEntries,
                [field],
                format!("repeated entries {repeated:?}"),
            ));
        }
    }

    let auxiliary = subject.auxiliary();
    check("settings.auxiliary.tasks", &auxiliary.tasks, found);
    check("settings.auxiliary.corrections", &auxiliary.corrections, found);
    check("settings.auxiliary.constraints", &auxiliary.constraints, found);
}

fn corrections(subject: &Subject, found: &mut Vec<ValidationError>) {
    let method = subject.settings.method;
    let Some(corrections) = subject.auxiliary().corrections.value() else {
        return;
    };
    if !corrections.is_empty() && !method.accepts_corrections() {
        found.push(ValidationError::new(
            Invariant::CorrectionsApplicable,
            ["settings.auxiliary.corrections", "settings.method"],
            format!("{method} takes no additive corrections"),
        ));
    }
}

/// Field paths with whether they apply to this method and task list.
fn applicability(subject: &Subject) -> [(&'static str, bool, bool, bool); 15] {
    let auxiliary = subject.auxiliary();
    let family = subject.info.family;
    let scf = family.is_scf();
    let optimizing = auxiliary.is_optimization();
    let thermo = auxiliary.needs_thermochemistry();

    // (path, applies, is value, is not applicable)
    macro_rules! row {
        ($key:ident, $applies:expr) => {
            (
                concat!("settings.auxiliary.", stringify!($key)),
                $applies,
                auxiliary.$key.is_value(),
                auxiliary.$key == Field::NotApplicable,
            )
        };
    }

    // An empty list is how "no corrections" is spelled for any method.
    let corrections = (
        "settings.auxiliary.corrections",
        subject.settings.method.accepts_corrections(),
        auxiliary.corrections.value().is_some_and(|c| !c.is_empty()),
        auxiliary.corrections == Field::NotApplicable,
    );

    [
        corrections,
        row!(mode, true),
        row!(scf_max_iterations, scf),
        row!(scf_convergence, scf),
        row!(soscf, family.uses_basis()),
        row!(opt_max_steps, optimizing),
        row!(constraints, optimizing),
        row!(opt_max_gradient, optimizing),
        row!(opt_rms_gradient, optimizing),
        row!(opt_energy_threshold, optimizing),
        row!(temperature, thermo),
        row!(frequency_cutoff, thermo),
        row!(frequency_scaling, thermo),
        row!(concentration, thermo),
        row!(symmetry, true),
    ]
}

fn tunables_applicable(subject: &Subject, found: &mut Vec<ValidationError>) {
    for (path, applies, is_value, not_applicable) in applicability(subject) {
        if applies && not_applicable {
            found.push(ValidationError::new(
                Invariant::TunableApplicable,
                [path],
                "a value is required here",
            ));
        } else if !applies && is_value {
            found.push(ValidationError::new(
                Invariant::TunableApplicable,
                [path],
                format!(
                    "does not apply to {} with the requested tasks",
                    subject.settings.method
                ),
            ));
        }
    }

    if subject.auxiliary().compute_type == Field::NotApplicable {
        found.push(ValidationError::new(
            Invariant::TunableApplicable,
            ["settings.auxiliary.compute_type"],
            "a value is required here",
        ));
    }
}

fn positive_tunables(subject: &Subject, found: &mut Vec<ValidationError>) {
    let auxiliary = subject.auxiliary();

    let counts = [
        ("settings.auxiliary.scf_max_iterations", &auxiliary.scf_max_iterations),
        ("settings.auxiliary.opt_max_steps", &auxiliary.opt_max_steps),
    ];
    for (path, value) in counts {
        if value.value() == Some(&0) {
            found.push(ValidationError::new(
                Invariant::PositiveTunables,
                [path],
                "must be at least 1",
            ));
        }
    }

    let thresholds = [
        ("settings.auxiliary.scf_convergence", &auxiliary.scf_convergence),
        ("settings.auxiliary.opt_max_gradient", &auxiliary.opt_max_gradient),
        ("settings.auxiliary.opt_rms_gradient", &auxiliary.opt_rms_gradient),
        ("settings.auxiliary.opt_energy_threshold", &auxiliary.opt_energy_threshold),
    ];
    for (path, value) in thresholds {
        if let Some(&value) = value.value() {
            if !(value.is_finite() && value > 0.0) {
                found.push(ValidationError::new(
                    Invariant::PositiveTunables,
                    [path],
                    format!("threshold must be positive and finite, got {value}"),
                ));
            }
        }
    }

    let thermochemistry = [
        ("settings.auxiliary.temperature", &auxiliary.temperature),
        ("settings.auxiliary.frequency_cutoff", &auxiliary.frequency_cutoff),
        ("settings.auxiliary.frequency_scaling", &auxiliary.frequency_scaling),
        ("settings.auxiliary.concentration", &auxiliary.concentration),
    ];
    for (path, value) in thermochemistry {
        if let Some(&value) = value.value() {
            if !(value.is_finite() && value >= 0.0) {
                found.push(ValidationError::new(
                    Invariant::PositiveTunables,
                    [path],
                    format!("must be non-negative and finite, got {value}"),
                ));
            }
        }
    }
}

fn constraint_atoms(subject: &Subject, found: &mut Vec<ValidationError>) {
    let Some(constraints) = subject.auxiliary().constraints.value() else {
        return;
    };
    let n_atoms = subject.molecule.len();

    for (index, constraint) in constraints.iter().enumerate() {
        let arity = constraint.kind.arity();
        let problem = if constraint.atoms.len() != arity {
            Some(format!(
                "{} constraint needs {arity} atoms, got {}",
                constraint.kind,
                constraint.atoms.len()
            ))
        } else if let Some(&atom) = constraint.atoms.iter().find(|&&atom| atom >= n_atoms) {
            Some(format!("atom {atom} does not exist in a molecule of {n_atoms} atoms"))
        } else if !constraint.atoms.iter().all_unique() {
            Some("atoms must be distinct".to_owned())
        } else {
            None
        };

        if let Some(problem) = problem {
            found.push(ValidationError::new(
                Invariant::ConstraintAtoms,
                ["settings.auxiliary.constraints"],
                format!("constraint {index}: {problem}"),
            ));
        }
    }
}

fn compute_type(subject: &Subject, found: &mut Vec<ValidationError>) {
    let (Some(engine), Some(&compute)) = (subject.engine, subject.auxiliary().compute_type.value())
    else {
        return;
    };
    if !engine.supports_compute(compute) {
        found.push(ValidationError::new(
            Invariant::ComputeTypeSupported,
            ["settings.auxiliary.compute_type", "settings.engine"],
            format!("{engine} does not run on {compute}"),
        ));
    }
}

fn symmetry(subject: &Subject, found: &mut Vec<ValidationError>) {
    let Some(engine) = subject.engine else {
        return;
    };
    if subject.auxiliary().symmetry == Field::Value(Symmetry::Detect) && !engine.info().symmetry {
        found.push(ValidationError::new(
            Invariant::SymmetrySupported,
            ["settings.auxiliary.symmetry", "settings.engine"],
            format!("{engine} does not use point-group symmetry"),
        ));
    }
}
