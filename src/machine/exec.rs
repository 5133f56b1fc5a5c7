//! Instruction dispatch and program orchestration.

use log::debug;

use crate::{
    isa::{Opcode, Register},
    lang::{
        condition::{condition_text, parse_condition},
        operand::{parse_operand, parse_target, Operand, Target},
        segment::{strip_comment, Segmenter, Unit},
        Condition, LangError,
    },
};

use super::{ram::Ram, registers::RegisterFile, MachError, MachResult};

/// The machine's current run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachState {
    /// Execution may proceed to the next line.
    Continue,
    /// A `HALT 1` was executed; the rest of the current program is skipped.
    Halt,
}

/// The byte machine: eight 8-bit registers, 256 bytes of memory, and a
/// verbosity flag controlling per-instruction diagnostics.
///
/// One `Machine` owns all mutable state for one program at a time; embedders
/// that run programs concurrently must use separate instances. Registers and
/// memory are only reachable through machine operations.
pub struct Machine {
    registers: RegisterFile,
    ram: Ram,
    verbose: bool,
    state: MachState,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            registers: RegisterFile::new(),
            ram: Ram::new(),
            verbose: false,
            state: MachState::Continue,
        }
    }

    /// Register state, for display surfaces.
    pub fn registers(&self) -> &[u8; Register::COUNT] {
        self.registers.as_bytes()
    }

    /// Memory state, for display surfaces.
    pub fn ram(&self) -> &[u8; Ram::SIZE] {
        self.ram.as_bytes()
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Pre-arms the verbosity flag, same as a leading `VER = 1`.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn halted(&self) -> bool {
        self.state == MachState::Halt
    }

    /// Clears the halt state so another program (or interactive line) can run.
    pub fn resume(&mut self) {
        self.state = MachState::Continue;
    }

    /// Returns the machine to its power-on state.
    pub fn reset(&mut self) {
        self.registers.clear();
        self.ram.clear();
        self.verbose = false;
        self.state = MachState::Continue;
    }

    /// Resolves an operand to its current byte value. Pure read.
    pub fn resolve(&self, operand: &Operand) -> u8 {
        match operand {
            Operand::Immediate(value) => *value,
            Operand::Register(reg) => self.registers.read(*reg),
            Operand::Memory(addr) => self.ram.read(self.resolve(addr)),
        }
    }

    /// Evaluates a parsed condition against current machine state.
    pub fn eval_condition(&self, cond: &Condition) -> bool {
        cond.op.eval(self.resolve(&cond.left), self.resolve(&cond.right))
    }

    fn read_target(&self, target: &Target) -> u8 {
        match target {
            Target::Register(reg) => self.registers.read(*reg),
            Target::Memory(addr) => self.ram.read(self.resolve(addr)),
        }
    }

    fn write_target(&mut self, target: &Target, value: u8) {
        match target {
            Target::Register(reg) => self.registers.write(*reg, value),
            Target::Memory(addr) => {
                let addr = self.resolve(addr);
                self.ram.write(addr, value);
            }
        }
    }

    // Destination label used in diagnostics: `R3` for registers, the
    // two-digit hex address for memory cells.
    fn target_label(&self, target: &Target) -> String {
        match target {
            Target::Register(reg) => reg.to_string(),
            Target::Memory(addr) => format!("{:02x}", self.resolve(addr)),
        }
    }

    // Diagnostics are only recorded when the verbosity flag is set.
    fn log(&self, out: &mut Vec<String>, msg: String) {
        if self.verbose {
            out.push(msg);
        }
    }

    /// Executes one instruction line, returning the diagnostic/output lines
    /// it produced.
    ///
    /// The line may still carry a trailing `;` comment. Every operand is
    /// parsed before any state is mutated, so a failed instruction leaves the
    /// machine untouched; callers render the error as an `Error: <message>`
    /// output line and keep going.
    pub fn execute(&mut self, line: &str) -> MachResult<Vec<String>> {
        let line = strip_comment(line);
        let tokens: Vec<&str> = line
            .split_whitespace()
            .map(|tok| tok.trim_end_matches(','))
            .filter(|tok| !tok.is_empty())
            .collect();
        let mnemonic = match tokens.first() {
            Some(tok) => *tok,
            None => return Ok(Vec::new()),
        };
        let opcode = Opcode::from_mnemonic(mnemonic)
            .ok_or_else(|| MachError::UnknownInstruction(mnemonic.to_string()))?;
        debug!(">>> {line}");

        let mut out = Vec::new();
        match opcode {
            Opcode::Ver => {
                let value = self.resolve(&parse_operand(arg(&tokens, 2, line)?)?);
                self.verbose = value == 1;
                self.log(&mut out, format!("VER: VER = {value} -> SET"));
            }
            Opcode::Init => {
                let target = parse_target(arg(&tokens, 1, line)?)?;
                let value = self.resolve(&parse_operand(arg(&tokens, 3, line)?)?);
                let label = self.target_label(&target);
                self.write_target(&target, value);
                self.log(&mut out, format!("INIT: Initialized {label} = {value:08b}"));
            }
            Opcode::Mov => {
                let target = parse_target(arg(&tokens, 1, line)?)?;
                let value = self.resolve(&parse_operand(arg(&tokens, 2, line)?)?);
                let label = self.target_label(&target);
                self.write_target(&target, value);
                self.log(&mut out, format!("MOV: Moved {label} = {value:08b}"));
            }
            Opcode::Qmov => {
                let dest = parse_target(arg(&tokens, 1, line)?)?;
                let src = parse_target(arg(&tokens, 2, line)?)?;
                let value = self.read_target(&src);
                let dest_label = self.target_label(&dest);
                let src_label = self.target_label(&src);
                self.write_target(&dest, value);
                self.write_target(&src, 0);
                self.log(&mut out, format!("QMOV: Moved {dest_label} = {value:08b}"));
                self.log(&mut out, format!("QMOV: Cleared {src_label} = {:08b}", 0));
            }
            Opcode::Add => {
                self.arith(&tokens, line, &mut out, opcode, "Added", |l, r| {
                    Ok(l.wrapping_add(r))
                })?;
            }
            Opcode::Sub => {
                self.arith(&tokens, line, &mut out, opcode, "Subtracted", |l, r| {
                    Ok(l.wrapping_sub(r))
                })?;
            }
            Opcode::Mul => {
                self.arith(&tokens, line, &mut out, opcode, "Multiplied", |l, r| {
                    Ok(l.wrapping_mul(r))
                })?;
            }
            Opcode::Div => {
                self.arith(&tokens, line, &mut out, opcode, "Divided", |l, r| {
                    if r == 0 {
                        Err(MachError::DivisionByZero)
                    } else {
                        Ok(l / r)
                    }
                })?;
            }
            Opcode::Out => {
                let token = arg(&tokens, 1, line)?;
                let value = self.resolve(&parse_operand(token)?);
                // OUT reports regardless of verbosity.
                out.push(format!("OUT: Output {token} = {value:08b}"));
            }
            Opcode::If => {
                // No branching here: the caller replays the segmenter's
                // grouped blocks. This only reports the condition.
                let cond = parse_condition(condition_text(line))?;
                let left = self.resolve(&cond.left);
                let right = self.resolve(&cond.right);
                let met = cond.op.eval(left, right);
                self.log(
                    &mut out,
                    format!("IF condition: {left} {} {right} -> {met}", cond.op),
                );
            }
            Opcode::Clr => {
                let target = parse_target(arg(&tokens, 1, line)?)?;
                self.write_target(&target, 0);
            }
            Opcode::Halt => {
                let value = match tokens.get(1) {
                    Some(tok) => self.resolve(&parse_operand(tok)?),
                    None => 0,
                };
                let decision = if value == 1 { "HALT" } else { "RUN" };
                self.log(&mut out, format!("HALT: HALT = {value} -> {decision}"));
                if value == 1 {
                    self.state = MachState::Halt;
                }
            }
        }
        Ok(out)
    }

    fn arith(
        &mut self,
        tokens: &[&str],
        line: &str,
        out: &mut Vec<String>,
        op: Opcode,
        verb: &str,
        apply: impl FnOnce(u8, u8) -> MachResult<u8>,
    ) -> MachResult<()> {
        let dest = parse_target(arg(tokens, 1, line)?)?;
        let right = self.resolve(&parse_operand(arg(tokens, 2, line)?)?);
        let left = self.read_target(&dest);
        let value = apply(left, right)?;
        let label = self.target_label(&dest);
        self.write_target(&dest, value);
        self.log(out, format!("{}: {verb} {label} = {value:08b}", op.mnemonic()));
        Ok(())
    }

    /// Executes an ordered block of lines, absorbing per-line errors into
    /// `Error:` output lines. Stops early once the machine halts.
    pub fn execute_block(&mut self, lines: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        for line in lines {
            if self.halted() {
                break;
            }
            self.execute_logged(line, &mut out);
        }
        out
    }

    // One line of the best-effort run loop: failures become output, not
    // unwinding.
    fn execute_logged(&mut self, line: &str, out: &mut Vec<String>) {
        match self.execute(line) {
            Ok(lines) => out.extend(lines),
            Err(err) => out.push(format!("Error: {err}")),
        }
    }

    /// Executes one segmented unit.
    ///
    /// Conditional units follow a fixed sequence: report the `IF` line's own
    /// diagnostic, evaluate its condition against current machine state, then
    /// replay the if-block when it holds or the else-block (when present)
    /// otherwise. A condition that fails to parse emits exactly one `Error:`
    /// line and skips both branches.
    pub fn run_unit(&mut self, unit: &Unit) -> Vec<String> {
        let mut out = Vec::new();
        match unit {
            Unit::Plain(line) => self.execute_logged(line, &mut out),
            Unit::Conditional {
                condition,
                if_block,
                else_block,
            } => match parse_condition(condition_text(condition)) {
                Ok(cond) => {
                    let left = self.resolve(&cond.left);
                    let right = self.resolve(&cond.right);
                    let met = cond.op.eval(left, right);
                    self.log(
                        &mut out,
                        format!("IF condition: {left} {} {right} -> {met}", cond.op),
                    );
                    let block = if met { if_block } else { else_block };
                    out.extend(self.execute_block(block));
                }
                Err(err) => out.push(format!("Error: {err}")),
            },
        }
        out
    }

    /// Runs a whole source listing: segments it, executes every unit in
    /// order, and joins the accumulated output with newlines. Clears any
    /// halt left over from a previous run first.
    pub fn run(&mut self, source: &str) -> String {
        self.resume();
        let mut out = Vec::new();
        for unit in Segmenter::new(source) {
            if self.halted() {
                break;
            }
            out.extend(self.run_unit(&unit));
        }
        out.join("\n")
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

// Fetches the operand token at `idx`, erroring on truncated lines.
fn arg<'a>(tokens: &[&'a str], idx: usize, line: &str) -> MachResult<&'a str> {
    tokens
        .get(idx)
        .copied()
        .ok_or_else(|| MachError::Lang(LangError::MalformedOperand(line.to_string())))
}
