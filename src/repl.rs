//! The interactive prompt, standing in for a program editor.
//!
//! Instructions run as they are entered, except that an `IF` line buffers its
//! indented block (and `ELSE` block) until the indentation drops, then the
//! whole group runs at once. Dot-commands inspect and reset the machine.

use anyhow::Result;
use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{isa, machine::Machine};

/// Runs the interactive prompt until EOF or `.quit`.
pub fn run(machine: &mut Machine) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!(
        "bytesim {} -- .help for the instruction reference, .quit to exit.",
        env!("CARGO_PKG_VERSION")
    );
    let mut pending: Vec<String> = Vec::new();
    loop {
        let prompt = if pending.is_empty() { ">> " } else { " | " };
        match rl.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                if !pending.is_empty() {
                    // An open IF group keeps collecting until the
                    // indentation drops.
                    if line.starts_with("  ") || line.trim() == "ELSE" {
                        pending.push(line);
                        continue;
                    }
                    flush(machine, &mut pending);
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Some(cmd) = trimmed.strip_prefix('.') {
                    if command(machine, cmd) {
                        break;
                    }
                    continue;
                }
                if trimmed.split_whitespace().next() == Some("IF") {
                    pending.push(line);
                    continue;
                }
                print_output(machine.run(&line));
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                flush(machine, &mut pending);
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn flush(machine: &mut Machine, pending: &mut Vec<String>) {
    if pending.is_empty() {
        return;
    }
    let source = pending.join("\n");
    pending.clear();
    print_output(machine.run(&source));
}

// Dot-commands for inspection. Returns true when the prompt should exit.
fn command(machine: &mut Machine, cmd: &str) -> bool {
    let mut words = cmd.split_whitespace();
    match words.next() {
        Some("help") => help(words.next()),
        Some("regs") => print_registers(machine),
        Some("mem") => print_ram(machine),
        Some("reset") => {
            machine.reset();
            println!("machine reset");
        }
        Some("quit") | Some("exit") => return true,
        _ => println!("unknown command: .{cmd}"),
    }
    false
}

fn help(topic: Option<&str>) {
    match topic {
        Some(mnemonic) => match isa::reference().get(mnemonic) {
            Some(doc) => {
                println!("{} -- {}", doc.syntax, doc.summary);
                println!("{}", doc.example);
            }
            None => println!("no such instruction: {mnemonic}"),
        },
        None => {
            for doc in &isa::OP_DOCS {
                println!("{:<18} {}", doc.syntax, doc.summary);
            }
        }
    }
}

fn print_output(output: String) {
    if !output.is_empty() {
        println!("{output}");
    }
}

/// Prints the registers in binary, one per line.
pub fn print_registers(machine: &Machine) {
    for (i, value) in machine.registers().iter().enumerate() {
        println!("R{i} = {value:08b}");
    }
}

/// Prints memory as a 16x16 hex grid.
pub fn print_ram(machine: &Machine) {
    let ram = machine.ram();
    for row in 0..16 {
        let base = row * 16;
        let cells: Vec<String> = ram[base..base + 16]
            .iter()
            .map(|value| format!("{value:02x}"))
            .collect();
        println!("{base:02x}: {}", cells.join(" "));
    }
}
