use super::{Context, Trace};
use crate::{
    error::ResolutionError,
    settings::{Auxiliary, Field},
    vocabulary::{Mode, Soscf, Solvent, Symmetry, Task},
};

type Stage = fn(&Context, &mut Auxiliary, &mut Trace) -> Result<(), ResolutionError>;

/// Auxiliary stages in resolution order.
pub(super) const STAGES: &[(&str, Stage)] = &[
    ("tasks", tasks),
    ("corrections", corrections),
    ("mode", mode),
    ("scf_max_iterations", scf_max_iterations),
    ("scf_convergence", scf_convergence),
    ("soscf", soscf),
    ("opt_max_steps", opt_max_steps),
    ("constraints", constraints),
    ("optimization thresholds", optimization_thresholds),
    ("thermochemistry", thermochemistry),
    ("symmetry", symmetry),
    ("compute_type", compute_type),
    ("solvent", solvent),
];

const DEFAULT_MAX_ITERATIONS: u32 = 250;
const DEFAULT_MAX_STEPS: u32 = 250;

/// SCF energy convergence, indexed by decimal exponent minus 5.
const SCF_CONVERGENCE: [f64; 7] = [1e-5, 1e-6, 1e-7, 1e-8, 1e-9, 1e-10, 1e-11];

/// Optimization thresholds as (energy, max gradient, rms gradient).
fn optimization_thresholds_for(mode: Mode) -> (f64, f64, f64) {
    match mode {
        Mode::Reckless => (2e-5, 7e-3, 6e-3),
        Mode::Rapid => (5e-5, 5e-3, 3.5e-3),
        Mode::Careful => (1e-6, 9e-4, 6e-4),
        Mode::Meticulous => (1e-6, 3e-5, 2e-5),
        Mode::Debug | Mode::Manual => (1e-6, 4e-6, 2e-6),
    }
}

const TEMPERATURE: f64 = 298.15;
const FREQUENCY_CUTOFF: f64 = 100.0;
const FREQUENCY_SCALING: f64 = 1.0;
/// 1 atm ideal gas at 298.15 K, in mol/L.
const CONCENTRATION: f64 = 0.0408740470708;

fn current_mode(auxiliary: &Auxiliary) -> Mode {
    auxiliary.mode.value().copied().unwrap_or(Mode::Rapid)
}

fn tasks(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.tasks.is_unset() {
        return Ok(());
    }

    let mut tasks = vec![Task::Energy, Task::Charge, Task::Dipole];
    if !context.molecule.is_closed_shell() {
        tasks.push(Task::SpinDensity);
    }
    tasks.retain(|&task| !context.entry.forbids(task));

    let rule = if context.molecule.is_closed_shell() {
        format!("standard properties {} can compute", context.engine)
    } else {
        format!("standard open-shell properties {} can compute", context.engine)
    };
    trace.fill(&mut auxiliary.tasks, "tasks", Field::Value(tasks), rule);
    Ok(())
}

fn corrections(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.corrections.is_unset() {
        return Ok(());
    }

    let (value, rule) = if context.method.accepts_corrections() {
        (Field::Value(Vec::new()), "none requested")
    } else {
        (Field::NotApplicable, "method takes no additive corrections")
    };
    trace.fill(&mut auxiliary.corrections, "corrections", value, rule);
    Ok(())
}

fn mode(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.mode.is_unset() {
        return Ok(());
    }

    let (mode, rule) = if context.info.post_hartree_fock {
        (Mode::Careful, "post-Hartree-Fock methods run careful")
    } else {
        (Mode::Rapid, "default mode")
    };
    trace.fill(&mut auxiliary.mode, "mode", Field::Value(mode), rule);
    Ok(())
}

fn scf_max_iterations(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.scf_max_iterations.is_unset() {
        return Ok(());
    }

    let (value, rule) = if context.info.family.is_scf() {
        (Field::Value(DEFAULT_MAX_ITERATIONS), "SCF iteration limit")
    } else {
        (Field::NotApplicable, "no SCF procedure")
    };
    trace.fill(&mut auxiliary.scf_max_iterations, "scf_max_iterations", value, rule);
    Ok(())
}

fn scf_convergence(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.scf_convergence.is_unset() {
        return Ok(());
    }

    if !context.info.family.is_scf() {
        trace.fill(
            &mut auxiliary.scf_convergence,
            "scf_convergence",
            Field::NotApplicable,
            "no SCF procedure",
        );
        return Ok(());
    }

    let mode = current_mode(auxiliary);
    let base = match mode {
        Mode::Manual => {
            return Err(ResolutionError::ManualValueRequired {
                field: "scf_convergence",
            })
        }
        Mode::Reckless => 0,
        Mode::Rapid => 1,
        Mode::Careful => 2,
        Mode::Meticulous => 3,
        Mode::Debug => 4,
    };
    // correlated methods need a tighter reference wavefunction
    let (index, rule) = if context.info.post_hartree_fock {
        (base + 2, format!("{mode} mode, tightened for post-Hartree-Fock"))
    } else {
        (base, format!("{mode} mode"))
    };

    trace.fill(
        &mut auxiliary.scf_convergence,
        "scf_convergence",
        Field::Value(SCF_CONVERGENCE[index]),
        rule,
    );
    Ok(())
}

fn soscf(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.soscf.is_unset() {
        return Ok(());
    }

    let (value, rule) = if context.info.family.uses_basis() {
        (Field::Value(Soscf::UponFailure), "second-order fallback for difficult SCF")
    } else {
        (Field::NotApplicable, "no SCF solver options")
    };
    trace.fill(&mut auxiliary.soscf, "soscf", value, rule);
    Ok(())
}

fn opt_max_steps(
    _: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.opt_max_steps.is_unset() {
        return Ok(());
    }

    let (value, rule) = if auxiliary.is_optimization() {
        (Field::Value(DEFAULT_MAX_STEPS), "optimization step limit")
    } else {
        (Field::NotApplicable, "no optimization task")
    };
    trace.fill(&mut auxiliary.opt_max_steps, "opt_max_steps", value, rule);
    Ok(())
}

fn constraints(
    _: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.constraints.is_unset() {
        return Ok(());
    }

    let (value, rule) = if auxiliary.is_optimization() {
        (Field::Value(Vec::new()), "unconstrained")
    } else {
        (Field::NotApplicable, "no optimization task")
    };
    trace.fill(&mut auxiliary.constraints, "constraints", value, rule);
    Ok(())
}

fn optimization_thresholds(
    _: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.is_optimization() {
        let rule = "no optimization task";
        for (slot, field) in [
            (&mut auxiliary.opt_max_gradient, "opt_max_gradient"),
            (&mut auxiliary.opt_rms_gradient, "opt_rms_gradient"),
            (&mut auxiliary.opt_energy_threshold, "opt_energy_threshold"),
        ] {
            if slot.is_unset() {
                trace.fill(slot, field, Field::NotApplicable, rule);
            }
        }
        return Ok(());
    }

    let requested = current_mode(auxiliary);
    let constrained = auxiliary
        .constraints
        .value()
        .is_some_and(|constraints| !constraints.is_empty());
    // constrained optimizations rarely reach tight thresholds
    let mode = if constrained && requested != Mode::Manual {
        requested.min(Mode::Rapid)
    } else {
        requested
    };
    let (energy, max_gradient, rms_gradient) = optimization_thresholds_for(mode);
    let rule = if mode != requested {
        format!("{mode} thresholds for a constrained {requested} optimization")
    } else {
        format!("{mode} mode")
    };

    for (slot, field, value) in [
        (&mut auxiliary.opt_max_gradient, "opt_max_gradient", max_gradient),
        (&mut auxiliary.opt_rms_gradient, "opt_rms_gradient", rms_gradient),
        (&mut auxiliary.opt_energy_threshold, "opt_energy_threshold", energy),
    ] {
        if !slot.is_unset() {
            continue;
        }
        if mode == Mode::Manual {
            return Err(ResolutionError::ManualValueRequired { field });
        }
        trace.fill(slot, field, Field::Value(value), rule.clone());
    }
    Ok(())
}

fn thermochemistry(
    _: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    let needed = auxiliary.needs_thermochemistry();
    let rule = if needed {
        "standard state"
    } else {
        "no frequency task"
    };

    for (slot, field, value) in [
        (&mut auxiliary.temperature, "temperature", TEMPERATURE),
        (&mut auxiliary.frequency_cutoff, "frequency_cutoff", FREQUENCY_CUTOFF),
        (&mut auxiliary.frequency_scaling, "frequency_scaling", FREQUENCY_SCALING),
        (&mut auxiliary.concentration, "concentration", CONCENTRATION),
    ] {
        if slot.is_unset() {
            let value = if needed {
                Field::Value(value)
            } else {
                Field::NotApplicable
            };
            trace.fill(slot, field, value, rule);
        }
    }
    Ok(())
}

fn symmetry(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.symmetry.is_unset() {
        return Ok(());
    }

    let (value, rule) = if !context.engine.info().symmetry {
        (Symmetry::Off, format!("{} does not use point groups", context.engine))
    } else if context.molecule.len() < 2 {
        (Symmetry::Off, "single atom".to_owned())
    } else {
        (Symmetry::Detect, format!("{} detects point groups", context.engine))
    };
    trace.fill(&mut auxiliary.symmetry, "symmetry", Field::Value(value), rule);
    Ok(())
}

fn compute_type(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.compute_type.is_unset() {
        return Ok(());
    }

    let engine = context.engine;
    trace.fill(
        &mut auxiliary.compute_type,
        "compute_type",
        Field::Value(engine.default_compute()),
        format!("{engine} default"),
    );
    Ok(())
}

fn solvent(
    context: &Context,
    auxiliary: &mut Auxiliary,
    trace: &mut Trace,
) -> Result<(), ResolutionError> {
    if !auxiliary.solvent.is_unset() {
        return Ok(());
    }

    let (value, rule) = match context.solvation.value() {
        Some(model) => (Field::Value(Solvent::Water), format!("default solvent for {model}")),
        None => (Field::NotApplicable, "gas phase".to_owned()),
    };
    trace.fill(&mut auxiliary.solvent, "solvent", value, rule);
    Ok(())
}
