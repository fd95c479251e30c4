/// A settings value that distinguishes "not given" from "does not apply".
///
/// `Unset` fields are filled by default resolution. `NotApplicable` is a
/// deliberate, concrete state: solvation for a gas-phase run, a basis set for
/// a force field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field<T> {
    Unset,
    NotApplicable,
    Value(T),
}

/// Text tag for [`Field::NotApplicable`].
pub(crate) const NOT_APPLICABLE: &str = "none";

/// Whether `text` names [`Field::NotApplicable`], ignoring ASCII case.
pub(crate) fn is_not_applicable(text: &str) -> bool {
    text.eq_ignore_ascii_case(NOT_APPLICABLE)
}

impl<T> Field<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Field::Unset)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Field::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Unset | Field::NotApplicable => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Unset | Field::NotApplicable => None,
        }
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Unset => Field::Unset,
            Field::NotApplicable => Field::NotApplicable,
            Field::Value(value) => Field::Value(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Unset => Field::Unset,
            Field::NotApplicable => Field::NotApplicable,
            Field::Value(value) => Field::Value(f(value)),
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Field<U>, E> {
        Ok(match self {
            Field::Unset => Field::Unset,
            Field::NotApplicable => Field::NotApplicable,
            Field::Value(value) => Field::Value(f(value)?),
        })
    }
}

// derived Default would require `T: Default`
impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unset
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}
