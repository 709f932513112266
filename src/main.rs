use std::{
    fs,
    io::{self, BufRead, IsTerminal, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, ValueEnum};

use archon::{
    arg_err,
    codegen::CodeGen,
    driver::{Driver, Outcome},
    location::Location,
    parser::PrecedenceTable,
    printable::Printable,
    result::Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The parsed syntax tree of each unit
    Ast,
    /// The generated IR of each unit
    Ir,
}

#[derive(Parser, Debug)]
#[command(version, about = "Compile Kaleidoscope-like programs to SSA IR", long_about = None)]
struct Cli {
    /// Input program. Lines are read from stdin if not given
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// What to print for each top-level unit
    #[arg(long, value_enum, default_value_t = Emit::Ir)]
    emit: Emit,

    /// Name of the generated module
    #[arg(long, default_value = "archon")]
    module_name: String,
}

// Print what became of each unit. Returns false if any unit failed.
fn report(codegen: &CodeGen, emit: Emit, outcomes: &[Outcome]) -> bool {
    let ctx = codegen.context();
    let mut ok = true;
    for outcome in outcomes {
        match (outcome, emit) {
            (Outcome::Failed(err), _) => {
                ok = false;
                eprintln!("Error: {}", err.disp(ctx));
            }
            (Outcome::Definition { ast, .. }, Emit::Ast)
            | (Outcome::Expression { ast, .. }, Emit::Ast) => println!("{ast:#?}"),
            (Outcome::Extern { ast, .. }, Emit::Ast) => println!("{ast:#?}"),
            (Outcome::Definition { func, .. }, Emit::Ir) => {
                println!("Read function definition:\n{}", func.disp(ctx))
            }
            (Outcome::Extern { func, .. }, Emit::Ir) => {
                println!("Read extern:\n{}", func.disp(ctx))
            }
            (Outcome::Expression { func, .. }, Emit::Ir) => {
                println!("Read top-level expression:\n{}", func.disp(ctx))
            }
        }
    }
    ok
}

fn run(cli: Cli) -> Result<bool> {
    let mut driver = Driver::new(PrecedenceTable::standard(), &cli.module_name);
    let mut ok = true;

    match &cli.file {
        Some(path) => {
            let text = fs::read_to_string(path).or_else(|err| {
                arg_err!(Location::Unknown, "{}: {}", path.display(), err)
            })?;
            let outcomes = driver.run(&text);
            ok &= report(driver.codegen(), cli.emit, &outcomes);
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            let mut lines = stdin.lock().lines();
            loop {
                if interactive {
                    eprint!("ready> ");
                    // A prompt that fails to show is not worth stopping for.
                    let _ = io::stderr().flush();
                }
                let Some(line) = lines.next() else {
                    break;
                };
                let line = line.or_else(|err| arg_err!(Location::Unknown, "stdin: {}", err))?;
                let outcomes = driver.run(&line);
                ok &= report(driver.codegen(), cli.emit, &outcomes);
            }
        }
    }

    let codegen = driver.codegen();
    println!("{}", codegen.module().disp(codegen.context()));
    Ok(ok)
}

pub fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("{cli:?}");
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
