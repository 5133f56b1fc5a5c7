use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use bytesim::{
    machine::{debugger::Debugger, Machine},
    repl,
};

/// An educational byte machine: eight 8-bit registers, 256 bytes of memory,
/// and a line-oriented instruction language.
#[derive(Parser)]
#[command(name = "bytesim", version, about)]
struct Cli {
    /// Program file to run. Starts the interactive prompt when omitted.
    file: Option<PathBuf>,

    /// Arm the verbosity flag before the run, same as a leading `VER = 1`.
    #[arg(short, long)]
    verbose: bool,

    /// Step through the program unit by unit instead of running it.
    #[arg(short, long)]
    debug: bool,

    /// Print registers and memory after the run.
    #[arg(long)]
    dump: bool,

    /// Internal log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    TermLogger::init(
        cli.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let mut machine = Machine::new();
    machine.set_verbose(cli.verbose);

    match cli.file {
        Some(path) => {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            if cli.debug {
                Debugger::new(&mut machine, &source).repl()?;
            } else {
                let output = machine.run(&source);
                if !output.is_empty() {
                    println!("{output}");
                }
            }
            if cli.dump {
                println!();
                repl::print_registers(&machine);
                println!();
                repl::print_ram(&machine);
            }
        }
        None => repl::run(&mut machine)?,
    }
    Ok(())
}
