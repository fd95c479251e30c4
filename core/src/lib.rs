//! Canonical molecules and calculation requests for quantum-chemistry engines.
//!
//! A producer builds a [`Molecule`] and a possibly partial [`Settings`],
//! [`resolve`]s the settings, [`validate`]s the pair into a
//! [`CalculationRequest`] and [`serialize`]s it. Consumers [`deserialize`],
//! which runs the same resolution and validation.

pub mod atom;
pub mod compatibility;
pub mod error;
pub mod molecule;
pub mod periodic_table;
pub mod request;
pub mod resolve;
pub mod schema;
pub mod settings;
pub mod testing;
pub mod validate;
pub mod vocabulary;

pub use atom::Atom;
pub use compatibility::CompatibilityMatrix;
pub use error::Error;
pub use molecule::Molecule;
pub use request::CalculationRequest;
pub use resolve::{resolve, resolve_with_trace, Decision};
pub use schema::{WireFormat, SCHEMA_VERSION};
pub use settings::{Auxiliary, Field, Settings};
pub use validate::{validate, violations};

/// Writes the canonical JSON form of `value`.
pub fn serialize<T: WireFormat>(value: &T) -> Result<String, Error> {
    value.to_json()
}

/// Reads `T` from its JSON form. Requests come back resolved and validated.
pub fn deserialize<T: WireFormat>(json: &str) -> Result<T, Error> {
    T::from_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{BasisSet, Engine, Method};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn values_are_shareable_across_threads() {
        assert_send_sync::<Molecule>();
        assert_send_sync::<Settings>();
        assert_send_sync::<CalculationRequest>();
        assert_send_sync::<&'static CompatibilityMatrix>();
        assert_send_sync::<Error>();
    }

    #[test]
    fn boundary_pipeline() {
        let molecule = testing::glycine();
        let settings = Settings::new(Method::B3lyp);

        let resolved = resolve(&settings, &molecule).unwrap();
        assert_eq!(resolved.engine(), Some(Engine::Psi4));
        assert_eq!(resolved.basis(), Field::Value(BasisSet::Def2Svp));

        let request = validate(molecule, resolved).unwrap();
        let json = serialize(&request).unwrap();
        let back = deserialize::<CalculationRequest>(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn matrix_is_shared_between_threads() {
        let handles = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    let molecule = testing::water();
                    let request =
                        CalculationRequest::new(molecule, Settings::new(Method::Gfn2Xtb)).unwrap();
                    (
                        CompatibilityMatrix::global() as *const CompatibilityMatrix as usize,
                        request,
                    )
                })
            })
            .collect::<Vec<_>>();

        let results = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
