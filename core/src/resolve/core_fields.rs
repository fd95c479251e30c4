use super::Trace;
use crate::{
    compatibility::{engine_priority, Compatibility, CompatibilityMatrix},
    error::{NoCompatibleEngineError, ResolutionError},
    molecule::Molecule,
    settings::{Field, Settings},
    vocabulary::{BasisSet, Engine, SolvationModel},
};

/// The first engine in the family's priority list that has an entry for the
/// method and can take the molecule.
pub(super) fn engine(
    settings: &Settings,
    molecule: &Molecule,
    trace: &mut Trace,
) -> Result<(Engine, &'static Compatibility), ResolutionError> {
    let matrix = CompatibilityMatrix::global();
    let method = settings.method;

    if let Some(engine) = settings.engine {
        let entry = matrix
            .get(method, engine)
            .ok_or(ResolutionError::UnsupportedEngine { method, engine })?;
        return Ok((engine, entry));
    }

    let family = method.family();
    let n_atoms = molecule.len();
    let priority = engine_priority(family);

    let chosen = priority.iter().find_map(|&engine| {
        let entry = matrix.get(method, engine)?;
        let has_basis = !family.uses_basis() || !entry.bases.is_empty();
        (has_basis && engine.info().max_atoms >= n_atoms).then_some((engine, entry))
    });

    let Some((engine, entry)) = chosen else {
        return Err(NoCompatibleEngineError {
            method,
            n_atoms,
            considered: priority.to_vec(),
        }
        .into());
    };

    trace.record(
        "engine",
        &engine,
        format!(
            "first {} engine able to run {method} on {n_atoms} atoms",
            family.description()
        ),
    );
    Ok((engine, entry))
}

pub(super) fn basis(
    settings: &Settings,
    engine: Engine,
    entry: &Compatibility,
    trace: &mut Trace,
) -> Result<Field<BasisSet>, ResolutionError> {
    if !settings.basis.is_unset() {
        return Ok(settings.basis);
    }

    let method = settings.method;
    let info = method.info();

    let (basis, rule) = if !info.family.uses_basis() {
        (
            Field::NotApplicable,
            format!("{} methods take no basis set", info.family.description()),
        )
    } else if let Some(own) = info.composite_basis {
        (Field::Value(own), format!("{method} is defined with {own}"))
    } else {
        let recommended = entry
            .recommended_basis
            .ok_or(ResolutionError::NoRecommendedBasis { method, engine })?;
        (
            Field::Value(recommended),
            format!("recommended for {method} on {engine}"),
        )
    };

    trace.record("basis", &basis, rule);
    Ok(basis)
}

/// Implicit solvation is used only when a solvent was asked for.
pub(super) fn solvation(
    settings: &Settings,
    engine: Engine,
    entry: &Compatibility,
    trace: &mut Trace,
) -> Result<Field<SolvationModel>, ResolutionError> {
    if !settings.solvation.is_unset() {
        return Ok(settings.solvation);
    }

    let method = settings.method;
    let (solvation, rule) = match settings.auxiliary.solvent.value() {
        Some(solvent) => {
            let model = entry
                .default_solvation()
                .ok_or(ResolutionError::NoSolvationModel { method, engine })?;
            (
                Field::Value(model),
                format!("{engine} default for {method} in {solvent}"),
            )
        }
        None => (Field::NotApplicable, "no solvent requested".to_owned()),
    };

    trace.record("solvation", &solvation, rule);
    Ok(solvation)
}
