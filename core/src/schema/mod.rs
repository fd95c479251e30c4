//! The canonical JSON form of molecules, settings and requests.
//!
//! Domain types are mirrored by private serde structs whose field order fixes
//! the key order of the output. Unknown keys are rejected at every level.
//! Coordinates carry at most [`COORDINATE_DECIMALS`](crate::atom::COORDINATE_DECIMALS)
//! decimals; every other float is written in its shortest round-trip form.

mod field;
mod molecule;
mod settings;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use molecule::SchemaMolecule;
pub use settings::SchemaSettings;

use crate::{
    error::{Error, SchemaMismatchError},
    molecule::Molecule,
    request::CalculationRequest,
    settings::Settings,
};

/// Version written to, and required from, every serialized request.
pub const SCHEMA_VERSION: &str = "1";

/// Conversion to and from the wire JSON form.
pub trait WireFormat: Sized {
    /// The serde mirror of `Self`.
    type Schema: Serialize + DeserializeOwned;

    fn to_schema(&self) -> Self::Schema;

    fn from_schema(schema: Self::Schema) -> Result<Self, Error>;

    fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_schema())?)
    }

    fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.to_schema())?)
    }

    fn from_json(json: &str) -> Result<Self, Error> {
        let schema = serde_json::from_str(json).map_err(SchemaMismatchError::from)?;
        Self::from_schema(schema)
    }
}

impl WireFormat for Molecule {
    type Schema = SchemaMolecule;

    fn to_schema(&self) -> Self::Schema {
        self.into()
    }

    fn from_schema(schema: Self::Schema) -> Result<Self, Error> {
        Ok(schema.try_into()?)
    }
}

/// Standalone settings are read as written; nothing is resolved.
impl WireFormat for Settings {
    type Schema = SchemaSettings;

    fn to_schema(&self) -> Self::Schema {
        self.into()
    }

    fn from_schema(schema: Self::Schema) -> Result<Self, Error> {
        schema.try_into()
    }
}

/// Wire form of a [`CalculationRequest`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaRequest {
    molecule: SchemaMolecule,
    settings: SchemaSettings,
    schema_version: Option<String>,
}

impl SchemaRequest {
    /// Checks the version and converts both halves without resolving the
    /// settings.
    pub fn into_parts(self) -> Result<(Molecule, Settings), Error> {
        if self.schema_version.as_deref() != Some(SCHEMA_VERSION) {
            return Err(SchemaMismatchError::Version {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            }
            .into());
        }

        let molecule = Molecule::from_schema(self.molecule)?;
        let settings = Settings::from_schema(self.settings)?;
        Ok((molecule, settings))
    }
}

/// Reading a request resolves any settings left unset and validates the
/// result, so a successfully read request is always complete.
impl WireFormat for CalculationRequest {
    type Schema = SchemaRequest;

    fn to_schema(&self) -> Self::Schema {
        SchemaRequest {
            molecule: (&self.molecule).into(),
            settings: (&self.settings).into(),
            schema_version: Some(SCHEMA_VERSION.to_owned()),
        }
    }

    fn from_schema(schema: Self::Schema) -> Result<Self, Error> {
        let (molecule, settings) = schema.into_parts()?;
        CalculationRequest::new(molecule, settings)
    }
}
