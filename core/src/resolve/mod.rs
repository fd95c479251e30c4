//! Default resolution: fills every unset settings field from the method, the
//! chosen engine's compatibility entry and the molecule.
//!
//! Stages run in a fixed order (engine, basis, solvation, then the auxiliary
//! tunables in declaration order) and each only reads fields resolved before
//! it. A stage never overwrites a value the producer gave.

mod auxiliary;
mod core_fields;

use std::fmt;

use crate::{
    compatibility::Compatibility,
    error::ResolutionError,
    molecule::Molecule,
    settings::{Constraint, Field, Settings},
    vocabulary::{
        BasisSet, ComputeType, Correction, Engine, Method, MethodInfo, Mode, SolvationModel,
        Soscf, Solvent, Symmetry, Task,
    },
};

/// One field filled by resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Wire key of the field, e.g. `basis` or `scf_convergence`.
    pub field: &'static str,
    /// The chosen value in wire notation.
    pub value: String,
    /// The rule that produced it.
    pub rule: String,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} ({})", self.field, self.value, self.rule)
    }
}

/// Wire notation used in [`Decision::value`].
pub(crate) trait Render {
    fn render(&self) -> String;
}

macro_rules! render_display {
    ($($ty:ty),+) => {
        $(impl Render for $ty {
            fn render(&self) -> String {
                self.to_string()
            }
        })+
    };
}

render_display!(
    Engine, BasisSet, SolvationModel, Mode, Soscf, Symmetry, ComputeType, Solvent, Task,
    Correction, u32, f64
);

impl Render for Constraint {
    fn render(&self) -> String {
        let atoms = self
            .atoms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        format!("{}({})", self.kind, atoms.join(","))
    }
}

impl<T: Render> Render for Vec<T> {
    fn render(&self) -> String {
        let items = self.iter().map(Render::render).collect::<Vec<_>>();
        format!("[{}]", items.join(", "))
    }
}

impl<T: Render> Render for Field<T> {
    fn render(&self) -> String {
        match self {
            Field::Unset => "unset".to_owned(),
            Field::NotApplicable => "none".to_owned(),
            Field::Value(value) => value.render(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Trace {
    decisions: Vec<Decision>,
}

impl Trace {
    /// Stores `value` in an unset `slot` and records why.
    pub(crate) fn fill<T: Render>(
        &mut self,
        slot: &mut Field<T>,
        field: &'static str,
        value: Field<T>,
        rule: impl Into<String>,
    ) {
        let decision = Decision {
            field,
            value: value.render(),
            rule: rule.into(),
        };
        log::debug!("resolved {decision}");

        *slot = value;
        self.decisions.push(decision);
    }

    pub(crate) fn record(
        &mut self,
        field: &'static str,
        value: &impl Render,
        rule: impl Into<String>,
    ) {
        let decision = Decision {
            field,
            value: value.render(),
            rule: rule.into(),
        };
        log::debug!("resolved {decision}");

        self.decisions.push(decision);
    }
}

/// Everything an auxiliary stage may read.
pub(crate) struct Context<'a> {
    pub method: Method,
    pub info: MethodInfo,
    pub engine: Engine,
    pub entry: &'a Compatibility,
    pub solvation: Field<SolvationModel>,
    pub molecule: &'a Molecule,
}

/// Fills every unset field of `settings` for `molecule`.
///
/// Resolving already resolved settings returns them unchanged.
pub fn resolve(settings: &Settings, molecule: &Molecule) -> Result<Settings, ResolutionError> {
    resolve_with_trace(settings, molecule).map(|(settings, _)| settings)
}

/// Like [`resolve`], also returning one [`Decision`] per filled field in the
/// order the fields were filled.
pub fn resolve_with_trace(
    settings: &Settings,
    molecule: &Molecule,
) -> Result<(Settings, Vec<Decision>), ResolutionError> {
    let method = settings.method;
    let mut trace = Trace::default();

    log::trace!("resolving {} for {} atoms", method, molecule.len());

    let (engine, entry) = core_fields::engine(settings, molecule, &mut trace)?;
    let basis = core_fields::basis(settings, engine, entry, &mut trace)?;
    let solvation = core_fields::solvation(settings, engine, entry, &mut trace)?;

    let context = Context {
        method,
        info: method.info(),
        engine,
        entry,
        solvation,
        molecule,
    };

    let mut auxiliary = settings.auxiliary.clone();
    for (stage, resolve_stage) in auxiliary::STAGES {
        log::trace!("auxiliary stage {stage}");
        resolve_stage(&context, &mut auxiliary, &mut trace)?;
    }

    let resolved = Settings {
        method,
        basis,
        solvation,
        engine: Some(engine),
        auxiliary,
    };

    Ok((resolved, trace.decisions))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    use super::*;
    use crate::{
        error::NoCompatibleEngineError,
        settings::Auxiliary,
        testing,
        vocabulary::ConstraintKind,
    };

    #[test]
    fn b3lyp_on_glycine() {
        let glycine = testing::glycine();
        let settings = Settings::new(Method::B3lyp);

        let resolved = resolve(&settings, &glycine).unwrap();
        assert!(resolved.is_resolved());
        assert_eq!(resolved.engine(), Some(Engine::Psi4));
        assert_eq!(resolved.basis(), Field::Value(BasisSet::Def2Svp));
        assert_eq!(resolved.solvation(), Field::NotApplicable);

        let auxiliary = resolved.auxiliary();
        assert_eq!(
            auxiliary.tasks,
            Field::Value(vec![Task::Energy, Task::Charge, Task::Dipole])
        );
        assert_eq!(auxiliary.corrections, Field::Value(vec![]));
        assert_eq!(auxiliary.mode, Field::Value(Mode::Rapid));
        assert_eq!(auxiliary.scf_max_iterations, Field::Value(250));
        assert_eq!(auxiliary.soscf, Field::Value(Soscf::UponFailure));
        assert_eq!(auxiliary.opt_max_steps, Field::NotApplicable);
        assert_eq!(auxiliary.temperature, Field::NotApplicable);
        assert_eq!(auxiliary.symmetry, Field::Value(Symmetry::Detect));
        assert_eq!(auxiliary.compute_type, Field::Value(ComputeType::Cpu));
        assert_eq!(auxiliary.solvent, Field::NotApplicable);
        assert_relative_eq!(*auxiliary.scf_convergence.value().unwrap(), 1e-6);

        assert_eq!(resolve(&resolved, &glycine).unwrap(), resolved);
    }

    #[test]
    fn trace_explains_every_filled_field() {
        let glycine = testing::glycine();
        let settings = Settings::new(Method::B3lyp);

        let (resolved, decisions) = resolve_with_trace(&settings, &glycine).unwrap();
        let fields = decisions.iter().map(|d| d.field).collect::<Vec<_>>();
        assert_eq!(&fields[..4], ["engine", "basis", "solvation", "tasks"]);
        assert_eq!(fields.len(), settings.unresolved_fields().len());

        assert_eq!(decisions[0].value, "psi4");
        assert_eq!(decisions[1].value, "def2-SVP");
        assert_eq!(decisions[2].value, "none");

        let (_, again) = resolve_with_trace(&resolved, &glycine).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn explicit_values_are_kept() {
        let water = testing::water();
        let settings = Settings::builder(Method::B3lyp)
            .engine(Engine::Pyscf)
            .basis(BasisSet::CcPvtz)
            .auxiliary(Auxiliary {
                mode: Field::Value(Mode::Meticulous),
                soscf: Field::Value(Soscf::Never),
                ..Default::default()
            })
            .build()
            .unwrap();

        let resolved = resolve(&settings, &water).unwrap();
        assert_eq!(resolved.engine(), Some(Engine::Pyscf));
        assert_eq!(resolved.basis(), Field::Value(BasisSet::CcPvtz));
        assert_eq!(resolved.auxiliary().soscf, Field::Value(Soscf::Never));
        assert_relative_eq!(
            *resolved.auxiliary().scf_convergence.value().unwrap(),
            1e-8
        );
    }

    #[test]
    fn basis_free_families() {
        let water = testing::water();

        let xtb = resolve(&Settings::new(Method::Gfn2Xtb), &water).unwrap();
        assert_eq!(xtb.engine(), Some(Engine::Xtb));
        assert_eq!(xtb.basis(), Field::NotApplicable);
        assert_eq!(xtb.auxiliary().soscf, Field::NotApplicable);
        assert_eq!(xtb.auxiliary().corrections, Field::NotApplicable);
        assert_eq!(xtb.auxiliary().scf_max_iterations, Field::Value(250));

        let openff = resolve(&Settings::new(Method::OpenFf), &water).unwrap();
        assert_eq!(openff.engine(), Some(Engine::OpenFf));
        assert_eq!(openff.auxiliary().scf_convergence, Field::NotApplicable);
        assert_eq!(
            openff.auxiliary().tasks,
            Field::Value(vec![Task::Energy, Task::Charge])
        );

        let egret = resolve(&Settings::new(Method::Egret1), &water).unwrap();
        assert_eq!(egret.engine(), Some(Engine::Egret));
        assert_eq!(egret.auxiliary().tasks, Field::Value(vec![Task::Energy]));
        assert_eq!(
            egret.auxiliary().compute_type,
            Field::Value(ComputeType::Gpu)
        );
    }

    #[test]
    fn composite_methods_use_their_basis() {
        let resolved = resolve(&Settings::new(Method::R2scan3c), &testing::water()).unwrap();
        assert_eq!(resolved.basis(), Field::Value(BasisSet::Def2MTzvpp));
        assert_eq!(resolved.auxiliary().corrections, Field::NotApplicable);
    }

    #[test]
    fn post_hartree_fock_defaults_are_tighter() {
        let resolved = resolve(&Settings::new(Method::Mp2), &testing::water()).unwrap();
        assert_eq!(resolved.basis(), Field::Value(BasisSet::CcPvdz));
        assert_eq!(resolved.auxiliary().mode, Field::Value(Mode::Careful));
        assert_relative_eq!(
            *resolved.auxiliary().scf_convergence.value().unwrap(),
            1e-9
        );

        let hf = resolve(&Settings::new(Method::HartreeFock), &testing::water()).unwrap();
        assert_eq!(hf.basis(), Field::Value(BasisSet::P631gStar));
    }

    #[test]
    fn open_shell_adds_spin_density() {
        let oxygen = testing::triplet_oxygen();

        let resolved = resolve(&Settings::new(Method::Pbe0), &oxygen).unwrap();
        assert_eq!(
            resolved.auxiliary().tasks,
            Field::Value(vec![Task::Energy, Task::Charge, Task::Dipole, Task::SpinDensity])
        );
        // a single atom has no point group worth detecting
        assert_eq!(resolved.auxiliary().symmetry, Field::Value(Symmetry::Off));

        let aimnet = resolve(&Settings::new(Method::Aimnet2Wb97md3), &oxygen).unwrap();
        assert!(!aimnet
            .auxiliary()
            .tasks
            .value()
            .unwrap()
            .contains(&Task::SpinDensity));
    }

    #[test]
    fn large_systems_fall_through_the_priority_list() {
        let alkane = testing::alkane(100);
        assert_eq!(alkane.len(), 302);

        let resolved = resolve(&Settings::new(Method::B3lyp), &alkane).unwrap();
        assert_eq!(resolved.engine(), Some(Engine::TeraChem));
        assert_eq!(resolved.auxiliary().compute_type, Field::Value(ComputeType::Gpu));
        assert_eq!(resolved.auxiliary().symmetry, Field::Value(Symmetry::Off));

        let huge = testing::alkane(700);
        let error = resolve(&Settings::new(Method::B3lyp), &huge).unwrap_err();
        assert_eq!(
            error,
            ResolutionError::NoCompatibleEngine(NoCompatibleEngineError {
                method: Method::B3lyp,
                n_atoms: 2102,
                considered: vec![Engine::Psi4, Engine::TeraChem, Engine::Pyscf],
            })
        );
        assert_eq!(error.field(), "engine");
    }

    #[test]
    fn solvent_mandates_a_model() {
        let water = testing::water();
        let solvated = |method| {
            Settings::builder(method)
                .auxiliary(Auxiliary {
                    solvent: Field::Value(Solvent::Methanol),
                    ..Default::default()
                })
                .build()
                .unwrap()
        };

        let resolved = resolve(&solvated(Method::B3lyp), &water).unwrap();
        assert_eq!(resolved.solvation(), Field::Value(SolvationModel::Pcm));
        assert_eq!(resolved.auxiliary().solvent, Field::Value(Solvent::Methanol));

        let xtb = resolve(&solvated(Method::Gfn2Xtb), &water).unwrap();
        assert_eq!(xtb.solvation(), Field::Value(SolvationModel::Alpb));

        assert_eq!(
            resolve(&solvated(Method::Egret1), &water),
            Err(ResolutionError::NoSolvationModel {
                method: Method::Egret1,
                engine: Engine::Egret,
            })
        );

        let model_only = Settings::builder(Method::B3lyp)
            .solvation(SolvationModel::Cpcm)
            .build()
            .unwrap();
        let resolved = resolve(&model_only, &water).unwrap();
        assert_eq!(resolved.auxiliary().solvent, Field::Value(Solvent::Water));
    }

    #[test]
    fn optimization_defaults_follow_mode_and_constraints() {
        let water = testing::water();
        let optimize = |mode, constraints: Vec<Constraint>| {
            let settings = Settings::builder(Method::B3lyp)
                .auxiliary(Auxiliary {
                    tasks: Field::Value(vec![Task::Optimize]),
                    mode: Field::Value(mode),
                    constraints: Field::Value(constraints),
                    ..Default::default()
                })
                .build()
                .unwrap();
            resolve(&settings, &water).unwrap()
        };

        let careful = optimize(Mode::Careful, vec![]);
        let auxiliary = careful.auxiliary();
        assert_eq!(auxiliary.opt_max_steps, Field::Value(250));
        assert_relative_eq!(*auxiliary.opt_max_gradient.value().unwrap(), 9e-4);
        assert_relative_eq!(*auxiliary.opt_rms_gradient.value().unwrap(), 6e-4);
        assert_relative_eq!(*auxiliary.opt_energy_threshold.value().unwrap(), 1e-6);

        let constrained = optimize(
            Mode::Careful,
            vec![Constraint::new(ConstraintKind::Bond, [0, 1])],
        );
        let auxiliary = constrained.auxiliary();
        assert_relative_eq!(*auxiliary.opt_max_gradient.value().unwrap(), 5e-3);
        assert_relative_eq!(*auxiliary.opt_energy_threshold.value().unwrap(), 5e-5);
        // the SCF stays at the requested tightness
        assert_relative_eq!(*auxiliary.scf_convergence.value().unwrap(), 1e-7);

        let reckless = optimize(
            Mode::Reckless,
            vec![Constraint::new(ConstraintKind::Bond, [0, 1])],
        );
        assert_relative_eq!(
            *reckless.auxiliary().opt_max_gradient.value().unwrap(),
            7e-3
        );
    }

    #[test]
    fn frequencies_pull_in_thermochemistry() {
        let settings = Settings::builder(Method::Gfn2Xtb)
            .auxiliary(Auxiliary {
                tasks: Field::Value(vec![Task::Frequencies]),
                ..Default::default()
            })
            .build()
            .unwrap();
        let resolved = resolve(&settings, &testing::water()).unwrap();
        let auxiliary = resolved.auxiliary();
        assert_relative_eq!(*auxiliary.temperature.value().unwrap(), 298.15);
        assert_relative_eq!(*auxiliary.frequency_cutoff.value().unwrap(), 100.0);
        assert_relative_eq!(*auxiliary.frequency_scaling.value().unwrap(), 1.0);
        assert_relative_eq!(*auxiliary.concentration.value().unwrap(), 0.0408740470708);
        assert_eq!(auxiliary.opt_max_steps, Field::NotApplicable);
    }

    #[test]
    fn manual_mode_needs_explicit_thresholds() {
        let water = testing::water();
        let manual = Auxiliary {
            mode: Field::Value(Mode::Manual),
            ..Default::default()
        };

        let settings = Settings::builder(Method::B3lyp)
            .auxiliary(manual.clone())
            .build()
            .unwrap();
        assert_eq!(
            resolve(&settings, &water),
            Err(ResolutionError::ManualValueRequired {
                field: "scf_convergence"
            })
        );

        let settings = Settings::builder(Method::B3lyp)
            .auxiliary(Auxiliary {
                scf_convergence: Field::Value(1e-7),
                tasks: Field::Value(vec![Task::Optimize]),
                ..manual.clone()
            })
            .build()
            .unwrap();
        assert_eq!(
            resolve(&settings, &water),
            Err(ResolutionError::ManualValueRequired {
                field: "opt_max_gradient"
            })
        );

        // force fields have no thresholds to ask for
        let settings = Settings::builder(Method::GfnFf)
            .auxiliary(manual)
            .build()
            .unwrap();
        assert!(resolve(&settings, &water).is_ok());
    }

    fn random_settings(rng: &mut StdRng) -> Settings {
        let method = *Method::ALL.choose(rng).unwrap();
        let mut auxiliary = Auxiliary::default();

        if rng.gen_bool(0.5) {
            let mut tasks = vec![Task::Energy];
            tasks.extend(Task::ALL.choose(rng).copied().filter(|&task| task != Task::Energy));
            auxiliary.tasks = Field::Value(tasks);
        }
        if rng.gen_bool(0.3) {
            let modes = &Mode::ALL[..5];
            auxiliary.mode = Field::Value(*modes.choose(rng).unwrap());
        }
        if rng.gen_bool(0.2) {
            auxiliary.solvent = Field::Value(*Solvent::ALL.choose(rng).unwrap());
        }

        Settings::builder(method).auxiliary(auxiliary).build().unwrap()
    }

    #[test]
    fn resolution_is_idempotent_and_deterministic() {
        let mut rng = StdRng::seed_from_u64(42);
        let molecules = [
            testing::water(),
            testing::glycine(),
            testing::triplet_oxygen(),
            testing::alkane(3),
        ];

        for _ in 0..300 {
            let settings = random_settings(&mut rng);
            let molecule = molecules.choose(&mut rng).unwrap();

            let Ok(once) = resolve(&settings, molecule) else {
                // e.g. a solvent for a method without solvation models
                continue;
            };
            assert!(once.is_resolved(), "{:?}", once.unresolved_fields());
            assert_eq!(resolve(&once, molecule).unwrap(), once);
            assert_eq!(resolve(&settings, molecule).unwrap(), once);
            assert_eq!(
                format!("{:?}", resolve(&settings, molecule).unwrap()),
                format!("{once:?}")
            );
        }
    }

    #[test]
    fn unsolvated_methods_always_resolve() {
        let water = testing::water();
        for &method in Method::ALL {
            let resolved = resolve(&Settings::new(method), &water)
                .unwrap_or_else(|error| panic!("{method}: {error}"));
            assert!(resolved.is_resolved());
            assert_eq!(resolved.basis().is_value(), method.family().uses_basis());
        }
    }
}
