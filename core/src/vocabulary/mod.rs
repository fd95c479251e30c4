//! The closed vocabularies a calculation request is written in: methods, basis
//! sets, solvation models, engines, and the enumerated auxiliary tunables.
//!
//! Every vocabulary is a plain Rust enum whose variants carry static metadata.
//! Tags are matched ignoring ASCII case, `-` and `_`, so `"GFN2-xTB"` and
//! `"gfn2_xtb"` name the same method. Unrecognised text is always an
//! [`UnknownVocabularyError`](crate::error::UnknownVocabularyError); nothing is
//! coerced to a default here.

mod basis_set;
mod engine;
mod method;
mod solvation;
mod tunables;

pub use basis_set::BasisSet;
pub use engine::{Engine, EngineInfo};
pub use method::{Method, MethodFamily, MethodInfo};
pub use solvation::{SolvationModel, Solvent};
pub use tunables::{ComputeType, ConstraintKind, Correction, Mode, Soscf, Spin, Symmetry, Task};

/// Declares a vocabulary enum with its canonical wire tags.
///
/// Generates `ALL`, `tag()`, [`FromStr`](std::str::FromStr) (tolerant matching)
/// and [`Display`](std::fmt::Display) (canonical tag).
macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $kind:literal {
            $( $(#[$variant_meta:meta])* $variant:ident => $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $(#[$variant_meta])* $variant ),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical wire tag.
            pub const fn tag(self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::UnknownVocabularyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $crate::vocabulary::lookup(Self::ALL, |member| member.tag(), s)
                    .ok_or_else(|| $crate::error::UnknownVocabularyError::new($kind, s))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.tag())
            }
        }
    };
}

pub(crate) use tagged_enum;

fn normalized(tag: &str) -> impl Iterator<Item = char> + '_ {
    tag.chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
}

/// Finds the member whose tag matches `text` up to case, `-` and `_`.
pub(crate) fn lookup<T: Copy>(
    members: &[T],
    tag: impl Fn(T) -> &'static str,
    text: &str,
) -> Option<T> {
    if text.is_empty() {
        return None;
    }

    members
        .iter()
        .copied()
        .find(|&member| normalized(tag(member)).eq(normalized(text)))
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn assert_tags_unambiguous<T: Copy + std::fmt::Debug>(
        members: &[T],
        tag: impl Fn(T) -> &'static str,
    ) {
        let keys = members
            .iter()
            .map(|&member| normalized(tag(member)).collect::<String>())
            .collect::<Vec<_>>();
        assert!(
            keys.iter().all_unique(),
            "two tags normalize to the same key: {:?}",
            keys.iter().duplicates().collect::<Vec<_>>()
        );
    }

    #[test]
    fn normalized_tags_are_unambiguous() {
        assert_tags_unambiguous(Method::ALL, Method::tag);
        assert_tags_unambiguous(BasisSet::ALL, BasisSet::tag);
        assert_tags_unambiguous(Engine::ALL, Engine::tag);
        assert_tags_unambiguous(SolvationModel::ALL, SolvationModel::tag);
        assert_tags_unambiguous(Solvent::ALL, Solvent::tag);
        assert_tags_unambiguous(Task::ALL, Task::tag);
    }

    #[test]
    fn canonical_tags_round_trip() {
        for &method in Method::ALL {
            assert_eq!(method.tag().parse::<Method>(), Ok(method));
        }
        for &basis in BasisSet::ALL {
            assert_eq!(basis.to_string().parse::<BasisSet>(), Ok(basis));
        }
        for &engine in Engine::ALL {
            assert_eq!(engine.tag().parse::<Engine>(), Ok(engine));
        }
    }

    #[test]
    fn matching_ignores_case_hyphens_and_underscores() {
        assert_eq!("GFN2-xTB".parse::<Method>(), Ok(Method::Gfn2Xtb));
        assert_eq!("B3LYP".parse::<Method>(), Ok(Method::B3lyp));
        assert_eq!("wB97X-D3".parse::<Method>(), Ok(Method::Wb97xD3));
        assert_eq!("DEF2_SVP".parse::<BasisSet>(), Ok(BasisSet::Def2Svp));
        assert_eq!("PySCF".parse::<Engine>(), Ok(Engine::Pyscf));
    }

    #[test]
    fn unknown_tags_are_errors_not_defaults() {
        let error = "b3lyp5".parse::<Method>().unwrap_err();
        assert_eq!(error.kind, "method");
        assert_eq!(error.tag, "b3lyp5");
        assert!("".parse::<Engine>().is_err());
        assert!("6-31G(d)".parse::<BasisSet>().is_err());
        assert!("none".parse::<SolvationModel>().is_err());
    }
}
