//! Calculation settings: a method plus everything needed to run it.
//!
//! A [`Settings`] value may be partial. Unset fields are filled by
//! [`resolve`](crate::resolve::resolve); a value is never rewritten once given.

mod auxiliary;
mod field;

use std::fmt::Write;

pub use auxiliary::{Auxiliary, Constraint};
pub use field::Field;
pub(crate) use field::{is_not_applicable, NOT_APPLICABLE};

use crate::{
    compatibility::CompatibilityMatrix,
    error::InvalidVocabularyReferenceError,
    vocabulary::{BasisSet, Engine, Method, SolvationModel},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub(crate) method: Method,
    pub(crate) basis: Field<BasisSet>,
    pub(crate) solvation: Field<SolvationModel>,
    pub(crate) engine: Option<Engine>,
    pub(crate) auxiliary: Auxiliary,
}

impl Settings {
    /// Settings with every optional field unset.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            basis: Field::Unset,
            solvation: Field::Unset,
            engine: None,
            auxiliary: Auxiliary::default(),
        }
    }

    pub fn builder(method: Method) -> SettingsBuilder {
        SettingsBuilder {
            settings: Self::new(method),
        }
    }

    /// Builds settings from text tags. `None` leaves a field unset and
    /// `"none"`, in any case, marks it not applicable.
    pub fn from_tags(
        method: &str,
        basis: Option<&str>,
        solvation: Option<&str>,
        engine: Option<&str>,
    ) -> Result<Self, InvalidVocabularyReferenceError> {
        fn field<T: std::str::FromStr>(tag: Option<&str>) -> Result<Field<T>, T::Err> {
            match tag {
                None => Ok(Field::Unset),
                Some(tag) if is_not_applicable(tag) => Ok(Field::NotApplicable),
                Some(tag) => tag.parse().map(Field::Value),
            }
        }

        let mut builder = Settings::builder(method.parse::<Method>()?)
            .basis(field::<BasisSet>(basis)?)
            .solvation(field::<SolvationModel>(solvation)?);
        if let Some(engine) = engine {
            builder = builder.engine(engine.parse::<Engine>()?);
        }
        builder.build()
    }

    /// Starts a builder from a copy of these settings.
    pub fn to_builder(&self) -> SettingsBuilder {
        SettingsBuilder {
            settings: self.clone(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn basis(&self) -> Field<BasisSet> {
        self.basis
    }

    pub fn solvation(&self) -> Field<SolvationModel> {
        self.solvation
    }

    pub fn engine(&self) -> Option<Engine> {
        self.engine
    }

    pub fn auxiliary(&self) -> &Auxiliary {
        &self.auxiliary
    }

    /// Wire paths of every field that still needs a value.
    pub fn unresolved_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.engine.is_none() {
            fields.push("settings.engine");
        }
        if self.basis.is_unset() {
            fields.push("settings.basis");
        }
        if self.solvation.is_unset() {
            fields.push("settings.solvation");
        }
        fields.extend(self.auxiliary.unset_paths());
        fields
    }

    pub fn is_resolved(&self) -> bool {
        self.engine.is_some()
            && !self.basis.is_unset()
            && !self.solvation.is_unset()
            && self.auxiliary.is_resolved()
    }

    /// A compact label such as `b3lyp-d3bj/def2-svp/pcm(water)`.
    pub fn level_of_theory(&self) -> String {
        let mut label = self.method.tag().to_owned();

        if let Some(corrections) = self.auxiliary.corrections.value() {
            for correction in corrections {
                let _ = write!(label, "-{correction}");
            }
        }

        if self.method.info().composite_basis.is_none() {
            if let Some(basis) = self.basis.value() {
                let _ = write!(label, "/{}", basis.tag().to_ascii_lowercase());
            }
        }

        if let Some(model) = self.solvation.value() {
            let _ = write!(label, "/{model}");
            if let Some(solvent) = self.auxiliary.solvent.value() {
                let _ = write!(label, "({solvent})");
            }
        }

        label
    }
}

/// Assembles a [`Settings`] and checks explicit values against the vocabulary.
#[derive(Clone, Debug)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.settings.method = method;
        self
    }

    pub fn basis(mut self, basis: impl Into<Field<BasisSet>>) -> Self {
        self.settings.basis = basis.into();
        self
    }

    pub fn solvation(mut self, solvation: impl Into<Field<SolvationModel>>) -> Self {
        self.settings.solvation = solvation.into();
        self
    }

    pub fn engine(mut self, engine: impl Into<Option<Engine>>) -> Self {
        self.settings.engine = engine.into();
        self
    }

    pub fn auxiliary(mut self, auxiliary: Auxiliary) -> Self {
        self.settings.auxiliary = auxiliary;
        self
    }

    /// Fails if an explicit engine cannot run the method, or an explicit basis
    /// contradicts the method's own.
    pub fn build(self) -> Result<Settings, InvalidVocabularyReferenceError> {
        let settings = self.settings;
        let method = settings.method;
        let info = method.info();

        if let Some(engine) = settings.engine {
            if CompatibilityMatrix::global().get(method, engine).is_none() {
                return Err(InvalidVocabularyReferenceError::new(
                    "engine",
                    format!("{engine} does not run {method}"),
                ));
            }
        }

        match (info.composite_basis, settings.basis) {
            (Some(own), Field::Value(basis)) if basis != own => {
                return Err(InvalidVocabularyReferenceError::new(
                    "basis",
                    format!("{method} is defined with {own}, not {basis}"),
                ));
            }
            (_, Field::NotApplicable) if info.family.uses_basis() => {
                return Err(InvalidVocabularyReferenceError::new(
                    "basis",
                    format!("{} method {method} needs a basis set", info.family.description()),
                ));
            }
            _ => {}
        }

        Ok(settings)
    }
}
