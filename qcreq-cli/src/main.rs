use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use qcreq::{
    resolve_with_trace,
    schema::SchemaRequest,
    validate,
    vocabulary::{BasisSet, Engine, Method, SolvationModel},
    CalculationRequest, CompatibilityMatrix, WireFormat,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a partial request and print its canonical form
    Resolve {
        /// A path to the request JSON
        file: PathBuf,
        /// Print the rule behind every filled field before the request
        #[arg(long, short)]
        explain: bool,
        /// Print the request on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Check that a request resolves and validates
    Check {
        /// A path to the request JSON
        file: PathBuf,
    },
    /// List a vocabulary, or all of them
    Vocab {
        #[arg(value_enum)]
        kind: Option<VocabKind>,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum VocabKind {
    Method,
    Basis,
    Engine,
    Solvation,
}

fn read_request(file: &PathBuf) -> anyhow::Result<String> {
    fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn resolve(file: &PathBuf, explain: bool, compact: bool) -> anyhow::Result<()> {
    let text = read_request(file)?;

    let request = if explain {
        let schema: SchemaRequest = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", file.display()))?;
        let (molecule, settings) = schema.into_parts()?;
        let (settings, decisions) = resolve_with_trace(&settings, &molecule)?;

        for decision in &decisions {
            println!("{decision}");
        }
        if decisions.is_empty() {
            println!("nothing to resolve");
        }

        validate(molecule, settings)?
    } else {
        CalculationRequest::from_json(&text)
            .with_context(|| format!("resolving {}", file.display()))?
    };

    let json = if compact {
        request.to_json()?
    } else {
        request.to_json_pretty()?
    };
    println!("{json}");

    Ok(())
}

fn check(file: &PathBuf) -> anyhow::Result<()> {
    let text = read_request(file)?;
    let request = CalculationRequest::from_json(&text)?;
    log::debug!(
        "{} atoms at {}",
        request.molecule().len(),
        request.settings().level_of_theory()
    );
    Ok(())
}

fn print_tags<T: Copy + std::fmt::Display>(
    title: &str,
    members: &[T],
    detail: impl Fn(T) -> String,
) {
    println!("{title}:");
    for &member in members {
        println!("  {:<18} {}", member.to_string(), detail(member));
    }
}

fn vocab(kind: Option<VocabKind>) {
    let wanted = |candidate: VocabKind| kind.map_or(true, |kind| kind == candidate);

    if wanted(VocabKind::Method) {
        print_tags("methods", Method::ALL, |method| {
            let info = method.info();
            match info.composite_basis {
                Some(basis) => format!("{}, composite with {basis}", info.family.description()),
                None => info.family.description().to_owned(),
            }
        });
    }
    if wanted(VocabKind::Basis) {
        print_tags("basis sets", BasisSet::ALL, |basis| {
            let ranges = basis
                .coverage()
                .iter()
                .map(|&(first, last)| format!("Z {first}-{last}"))
                .collect::<Vec<_>>();
            ranges.join(", ")
        });
    }
    if wanted(VocabKind::Engine) {
        print_tags("engines", Engine::ALL, |engine| {
            let info = engine.info();
            let families = info
                .families
                .iter()
                .map(|family| family.description())
                .collect::<Vec<_>>();
            format!("{}, up to {} atoms", families.join("/"), info.max_atoms)
        });
    }
    if wanted(VocabKind::Solvation) {
        let matrix = CompatibilityMatrix::global();
        print_tags("solvation models", SolvationModel::ALL, |model| {
            let engines = Engine::ALL
                .iter()
                .filter(|&&engine| {
                    matrix.iter().any(|(_, candidate, entry)| {
                        candidate == engine && entry.allows_solvation(model)
                    })
                })
                .map(|engine| engine.tag())
                .collect::<Vec<_>>();
            format!("offered by {}", engines.join(", "))
        });
    }
}

fn main() -> anyhow::Result<ExitCode> {
    pretty_env_logger::init();

    let args: Args = Args::parse();

    match args.command {
        Command::Resolve {
            file,
            explain,
            compact,
        } => resolve(&file, explain, compact)?,
        Command::Check { file } => match check(&file) {
            Ok(()) => println!("ok"),
            Err(error) => {
                println!("{}: {error:#}", file.display());
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Vocab { kind } => vocab(kind),
    }

    Ok(ExitCode::SUCCESS)
}
