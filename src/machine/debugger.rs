//! An interactive step debugger over a segmented program.

use std::cell::{Cell, RefCell};

use anyhow::Result;
use easy_repl::{command, repl::LoopStatus, CommandStatus, Repl};

use crate::lang::segment::{segment, Unit};

use super::Machine;

/// Steps a program one unit at a time, accumulating the same output a
/// straight run would produce.
pub struct Debugger<'a> {
    machine: RefCell<&'a mut Machine>,
    units: Vec<Unit>,
    cursor: Cell<usize>,
    output: RefCell<Vec<String>>,
}

impl<'a> Debugger<'a> {
    pub fn new(machine: &'a mut Machine, source: &str) -> Self {
        machine.resume();
        Self {
            machine: RefCell::new(machine),
            units: segment(source),
            cursor: Cell::new(0),
            output: RefCell::new(Vec::new()),
        }
    }

    /// Executes the next unit, returning its output lines, or `None` when
    /// the program is finished or the machine has halted.
    pub fn step(&self) -> Option<Vec<String>> {
        if self.machine.borrow().halted() {
            return None;
        }
        let at = self.cursor.get();
        let unit = self.units.get(at)?;
        let lines = self.machine.borrow_mut().run_unit(unit);
        self.output.borrow_mut().extend(lines.iter().cloned());
        self.cursor.set(at + 1);
        Some(lines)
    }

    /// The output accumulated so far.
    pub fn output(&self) -> Vec<String> {
        self.output.borrow().clone()
    }

    pub fn repl(&self) -> Result<()> {
        let mut repl = Repl::builder()
            .description("bytesim debugger")
            .add(
                "n",
                command! {
                    "Execute the next unit",
                    () => || {
                        match self.step() {
                            Some(lines) => {
                                for line in &lines {
                                    eprintln!("{line}");
                                }
                            }
                            None => eprintln!("(program finished)"),
                        }
                        Ok(CommandStatus::Done)
                    }
                },
            )
            .add(
                "c",
                command! {
                    "Run to the end of the program",
                    () => || {
                        while let Some(lines) = self.step() {
                            for line in &lines {
                                eprintln!("{line}");
                            }
                        }
                        Ok(CommandStatus::Quit)
                    }
                },
            )
            .add(
                "pr",
                command! {
                    "Print the value of all registers",
                    () => || {
                        for (i, value) in self.machine.borrow().registers().iter().enumerate() {
                            eprintln!("R{i}={value:08b}");
                        }
                        Ok(CommandStatus::Done)
                    }
                },
            )
            .add(
                "peek",
                command! {
                    "Peek a value from memory",
                    (addr: String) => |addr: String| {
                        let parsed = addr
                            .strip_prefix("0x")
                            .map(|hex| u8::from_str_radix(hex, 16))
                            .unwrap_or_else(|| addr.parse::<u8>());
                        match parsed {
                            Ok(cell) => {
                                let value = self.machine.borrow().ram()[cell as usize];
                                eprintln!("{cell:02x}={value:08b}");
                            }
                            Err(_) => eprintln!("invalid address: {addr}"),
                        }
                        Ok(CommandStatus::Done)
                    }
                },
            )
            .add(
                "out",
                command! {
                    "Print the output accumulated so far",
                    () => || {
                        for line in self.output.borrow().iter() {
                            eprintln!("{line}");
                        }
                        Ok(CommandStatus::Done)
                    }
                },
            )
            .add(
                "q",
                command! {
                    "Quit the debugger",
                    () => || {
                        Ok(CommandStatus::Quit)
                    }
                },
            )
            .build()?;
        eprintln!("bytesim debugger: {} unit(s)", self.units.len());
        'repl: loop {
            if let Some(unit) = self.units.get(self.cursor.get()) {
                match unit {
                    Unit::Plain(line) => eprintln!("next --> {line}"),
                    Unit::Conditional { condition, .. } => {
                        eprintln!("next --> {condition} (conditional)")
                    }
                }
            }

            let status = repl.next()?;
            if let LoopStatus::Break = status {
                break 'repl;
            }
            if self.machine.borrow().halted() {
                break 'repl;
            }
        }
        Ok(())
    }
}
