use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, UnknownVocabularyError},
    settings::{Auxiliary, Constraint, Field, Settings},
    vocabulary::{BasisSet, ConstraintKind, Engine, Method, SolvationModel},
};

/// Wire form of [`Settings`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSettings {
    method: String,
    #[serde(default)]
    basis: Field<String>,
    #[serde(default)]
    solvation: Field<String>,
    #[serde(default)]
    engine: Option<String>,
    #[serde(default)]
    auxiliary: SchemaAuxiliary,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaAuxiliary {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    tasks: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    corrections: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    mode: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    scf_max_iterations: Field<u32>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    scf_convergence: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    soscf: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    opt_max_steps: Field<u32>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    constraints: Field<Vec<SchemaConstraint>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    opt_max_gradient: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    opt_rms_gradient: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    opt_energy_threshold: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    temperature: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    frequency_cutoff: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    frequency_scaling: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    concentration: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    symmetry: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    compute_type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    solvent: Field<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConstraint {
    kind: String,
    atoms: Vec<usize>,
}

fn tag<T: ToString>(field: &Field<T>) -> Field<String> {
    field.as_ref().map(ToString::to_string)
}

fn tags<T: ToString>(field: &Field<Vec<T>>) -> Field<Vec<String>> {
    field
        .as_ref()
        .map(|values| values.iter().map(ToString::to_string).collect())
}

fn parse<T>(field: Field<String>) -> Result<Field<T>, UnknownVocabularyError>
where
    T: std::str::FromStr<Err = UnknownVocabularyError>,
{
    field.try_map(|text| text.parse())
}

fn parse_all<T>(field: Field<Vec<String>>) -> Result<Field<Vec<T>>, UnknownVocabularyError>
where
    T: std::str::FromStr<Err = UnknownVocabularyError>,
{
    field.try_map(|texts| texts.iter().map(|text| text.parse()).collect())
}

impl From<&Settings> for SchemaSettings {
    fn from(settings: &Settings) -> Self {
        let auxiliary = settings.auxiliary();

        Self {
            method: settings.method().tag().to_owned(),
            basis: tag(&settings.basis()),
            solvation: tag(&settings.solvation()),
            engine: settings.engine().map(|engine| engine.tag().to_owned()),
            auxiliary: SchemaAuxiliary {
                tasks: tags(&auxiliary.tasks),
                corrections: tags(&auxiliary.corrections),
                mode: tag(&auxiliary.mode),
                scf_max_iterations: auxiliary.scf_max_iterations,
                scf_convergence: auxiliary.scf_convergence,
                soscf: tag(&auxiliary.soscf),
                opt_max_steps: auxiliary.opt_max_steps,
                constraints: auxiliary.constraints.as_ref().map(|constraints| {
                    constraints
                        .iter()
                        .map(|constraint| SchemaConstraint {
                            kind: constraint.kind.tag().to_owned(),
                            atoms: constraint.atoms.to_vec(),
                        })
                        .collect()
                }),
                opt_max_gradient: auxiliary.opt_max_gradient,
                opt_rms_gradient: auxiliary.opt_rms_gradient,
                opt_energy_threshold: auxiliary.opt_energy_threshold,
                temperature: auxiliary.temperature,
                frequency_cutoff: auxiliary.frequency_cutoff,
                frequency_scaling: auxiliary.frequency_scaling,
                concentration: auxiliary.concentration,
                symmetry: tag(&auxiliary.symmetry),
                compute_type: tag(&auxiliary.compute_type),
                solvent: tag(&auxiliary.solvent),
            },
        }
    }
}

impl TryFrom<SchemaAuxiliary> for Auxiliary {
    type Error = UnknownVocabularyError;

    fn try_from(value: SchemaAuxiliary) -> Result<Self, Self::Error> {
        let constraints = value.constraints.try_map(|constraints| {
            constraints
                .into_iter()
                .map(|constraint| {
                    Ok(Constraint::new(
                        constraint.kind.parse::<ConstraintKind>()?,
                        constraint.atoms,
                    ))
                })
                .collect::<Result<Vec<_>, UnknownVocabularyError>>()
        })?;

        Ok(Auxiliary {
            tasks: parse_all(value.tasks)?,
            corrections: parse_all(value.corrections)?,
            mode: parse(value.mode)?,
            scf_max_iterations: value.scf_max_iterations,
            scf_convergence: value.scf_convergence,
            soscf: parse(value.soscf)?,
            opt_max_steps: value.opt_max_steps,
            constraints,
            opt_max_gradient: value.opt_max_gradient,
            opt_rms_gradient: value.opt_rms_gradient,
            opt_energy_threshold: value.opt_energy_threshold,
            temperature: value.temperature,
            frequency_cutoff: value.frequency_cutoff,
            frequency_scaling: value.frequency_scaling,
            concentration: value.concentration,
            symmetry: parse(value.symmetry)?,
            compute_type: parse(value.compute_type)?,
            solvent: parse(value.solvent)?,
        })
    }
}

impl TryFrom<SchemaSettings> for Settings {
    type Error = Error;

    fn try_from(value: SchemaSettings) -> Result<Self, Self::Error> {
        let method = value.method.parse::<Method>()?;
        let mut builder = Settings::builder(method)
            .basis(parse::<BasisSet>(value.basis)?)
            .solvation(parse::<SolvationModel>(value.solvation)?)
            .auxiliary(Auxiliary::try_from(value.auxiliary)?);
        if let Some(engine) = value.engine {
            builder = builder.engine(engine.parse::<Engine>()?);
        }
        Ok(builder.build()?)
    }
}
