//! Common ISA definitions shared by the language front-end and the machine.

use rustc_hash::FxHashMap;

/// The eight general purpose registers of the byte machine.
///
/// Each holds a single unsigned byte. There are no special registers: the
/// machine has no program counter or flags exposed to programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Register {
    /// Number of registers in the machine.
    pub const COUNT: usize = 8;

    /// Slot of this register in the register file.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks up the register for an index. Valid indices are exactly 0-7.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            _ => None,
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", *self as u8)
    }
}

/// The instructions understood by the machine.
///
/// Mnemonics are case sensitive and always upper-case in source listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `VER = 0|1`: sets the verbosity flag controlling diagnostics.
    Ver,
    /// `INIT dest = value`: writes a value into a register or memory cell.
    Init,
    /// `MOV dest, src`: copies a resolved value into a register or memory cell.
    Mov,
    /// `QMOV dest, src`: copies a resolved value, then zeroes the source location.
    Qmov,
    /// `ADD dest, src`: `dest <- dest + src`, wrapping to 8 bits.
    Add,
    /// `SUB dest, src`: `dest <- dest - src`, wrapping to 8 bits.
    Sub,
    /// `MUL dest, src`: `dest <- dest * src`, wrapping to 8 bits.
    Mul,
    /// `DIV dest, src`: `dest <- dest / src`, truncating; dividing by zero is an error.
    Div,
    /// `OUT value`: reports a value in binary, regardless of verbosity.
    Out,
    /// `IF left op right`: evaluates a condition. Branching itself is done by
    /// the caller over the segmenter's grouped blocks.
    If,
    /// `CLR target`: zeroes a register or memory cell.
    Clr,
    /// `HALT 0|1`: a resolved value of 1 stops the rest of the program.
    Halt,
}

impl Opcode {
    /// Every opcode, in reference order.
    pub const ALL: [Opcode; 12] = [
        Self::Ver,
        Self::Init,
        Self::Mov,
        Self::Qmov,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Out,
        Self::If,
        Self::Clr,
        Self::Halt,
    ];

    /// Looks up the opcode for a mnemonic token.
    pub fn from_mnemonic(token: &str) -> Option<Self> {
        match token {
            "VER" => Some(Self::Ver),
            "INIT" => Some(Self::Init),
            "MOV" => Some(Self::Mov),
            "QMOV" => Some(Self::Qmov),
            "ADD" => Some(Self::Add),
            "SUB" => Some(Self::Sub),
            "MUL" => Some(Self::Mul),
            "DIV" => Some(Self::Div),
            "OUT" => Some(Self::Out),
            "IF" => Some(Self::If),
            "CLR" => Some(Self::Clr),
            "HALT" => Some(Self::Halt),
            _ => None,
        }
    }

    /// The source-listing mnemonic for this opcode.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Ver => "VER",
            Self::Init => "INIT",
            Self::Mov => "MOV",
            Self::Qmov => "QMOV",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Out => "OUT",
            Self::If => "IF",
            Self::Clr => "CLR",
            Self::Halt => "HALT",
        }
    }
}

/// A reference entry for one opcode.
///
/// This is the static data behind the interactive `.help` command. It must
/// stay in sync with the dispatch table in [`crate::machine::Machine`]; a
/// test asserts that every [`Opcode`] has an entry.
#[derive(Debug, Clone, Copy)]
pub struct OpDoc {
    pub opcode: Opcode,
    pub syntax: &'static str,
    pub summary: &'static str,
    pub example: &'static str,
}

/// The instruction reference, one entry per opcode.
pub static OP_DOCS: [OpDoc; 12] = [
    OpDoc {
        opcode: Opcode::Ver,
        syntax: "VER = 0|1",
        summary: "Toggle verbosity (0 or 1)",
        example: "VER = 1\nVER = 0",
    },
    OpDoc {
        opcode: Opcode::Init,
        syntax: "INIT dest = value",
        summary: "Initialize a register or memory address",
        example: "INIT R0 = 42\nINIT [0x10] = 0b10101010\nINIT [0x20] = 0xFF",
    },
    OpDoc {
        opcode: Opcode::Mov,
        syntax: "MOV dest, src",
        summary: "Move a value to a register or memory address",
        example: "MOV R0, 42\nMOV [0x10], R1\nMOV R2, [0x20]",
    },
    OpDoc {
        opcode: Opcode::Qmov,
        syntax: "QMOV dest, src",
        summary: "Move a value and clear the source",
        example: "QMOV R0, R1\nQMOV [0x10], R2\nQMOV R3, [0x30]",
    },
    OpDoc {
        opcode: Opcode::Add,
        syntax: "ADD dest, src",
        summary: "Add two values",
        example: "ADD R0, R1\nADD R2, 10\nADD [0x10], R3",
    },
    OpDoc {
        opcode: Opcode::Sub,
        syntax: "SUB dest, src",
        summary: "Subtract two values",
        example: "SUB R0, R1\nSUB R2, 5\nSUB [0x10], R3",
    },
    OpDoc {
        opcode: Opcode::Mul,
        syntax: "MUL dest, src",
        summary: "Multiply two values",
        example: "MUL R0, R1\nMUL R2, 3\nMUL [0x10], R3",
    },
    OpDoc {
        opcode: Opcode::Div,
        syntax: "DIV dest, src",
        summary: "Divide two values",
        example: "DIV R0, R1\nDIV R2, 2\nDIV [0x10], R3",
    },
    OpDoc {
        opcode: Opcode::Out,
        syntax: "OUT value",
        summary: "Output a value",
        example: "OUT R0\nOUT [0x10]\nOUT 42",
    },
    OpDoc {
        opcode: Opcode::If,
        syntax: "IF left op right",
        summary: "Conditional statement",
        example: "IF R0 == 0\n  MOV R1, 42\nELSE\n  MOV R1, 24",
    },
    OpDoc {
        opcode: Opcode::Clr,
        syntax: "CLR target",
        summary: "Clear a register or memory address",
        example: "CLR R0\nCLR [0x10]",
    },
    OpDoc {
        opcode: Opcode::Halt,
        syntax: "HALT 0|1",
        summary: "Halt the program (0 or 1)",
        example: "HALT 1\nHALT 0",
    },
];

/// Mnemonic-keyed lookup over [`OP_DOCS`].
pub fn reference() -> FxHashMap<&'static str, &'static OpDoc> {
    OP_DOCS.iter().map(|doc| (doc.opcode.mnemonic(), doc)).collect()
}
