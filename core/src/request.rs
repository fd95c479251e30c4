use crate::{error::Error, molecule::Molecule, resolve::resolve, settings::Settings, validate};

/// A molecule with fully resolved, validated settings: the unit exchanged
/// between producers and compute engines.
///
/// Only [`CalculationRequest::new`], [`validate::validate`] and request
/// deserialization produce one.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculationRequest {
    pub(crate) molecule: Molecule,
    pub(crate) settings: Settings,
}

impl CalculationRequest {
    /// Resolves `settings` against `molecule` and validates the result.
    pub fn new(molecule: Molecule, settings: Settings) -> Result<Self, Error> {
        let settings = resolve(&settings, &molecule)?;
        Ok(validate::validate(molecule, settings)?)
    }

    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_parts(self) -> (Molecule, Settings) {
        (self.molecule, self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ResolutionError,
        settings::{Auxiliary, Field},
        testing,
        vocabulary::{Engine, Method, Mode},
    };

    #[test]
    fn new_resolves_and_validates() {
        let request = CalculationRequest::new(testing::glycine(), Settings::new(Method::B3lyp))
            .unwrap();
        assert!(request.settings().is_resolved());
        assert_eq!(request.settings().engine(), Some(Engine::Psi4));
        assert_eq!(request.molecule(), &testing::glycine());
    }

    #[test]
    fn errors_keep_their_kind() {
        let manual = Settings::builder(Method::B3lyp)
            .auxiliary(Auxiliary {
                mode: Field::Value(Mode::Manual),
                ..Default::default()
            })
            .build()
            .unwrap();
        let error = CalculationRequest::new(testing::water(), manual).unwrap_err();
        assert!(matches!(
            error,
            Error::Resolution(ResolutionError::ManualValueRequired { .. })
        ));

        let error =
            CalculationRequest::new(testing::triplet_oxygen(), Settings::new(Method::OpenFf))
                .unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }
}
