//! Operand parsing.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, hex_digit1, one_of, space0},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize},
    multi::many1,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::isa::Register;

use super::{LangError, LangResult};

/// A parsed operand: anything resolvable to an 8-bit value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A literal byte. Out-of-range literals wrap to 8 bits at parse time,
    /// matching the fixed-width register and memory storage.
    Immediate(u8),
    /// The value held in a register.
    Register(Register),
    /// The value held in the memory cell the inner operand addresses.
    /// The address is itself an operand, so `[0x10]`, `[R1]` and nested
    /// forms all work.
    Memory(Box<Operand>),
}

/// A write-capable location: the destination side of `INIT`/`MOV`/arithmetic,
/// and the source side of `QMOV`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Register(Register),
    Memory(Operand),
}

fn bin_literal(inp: &str) -> IResult<&str, u8> {
    map_res(
        preceded(tag("0b"), recognize(many1(one_of("01")))),
        |digits: &str| u64::from_str_radix(digits, 2).map(|v| v as u8),
    )(inp)
}

fn hex_literal(inp: &str) -> IResult<&str, u8> {
    map_res(preceded(tag("0x"), hex_digit1), |digits: &str| {
        u64::from_str_radix(digits, 16).map(|v| v as u8)
    })(inp)
}

fn dec_literal(inp: &str) -> IResult<&str, u8> {
    // A leading `-` wraps two's-complement, like any other out-of-range value.
    map_res(
        recognize(pair(opt(char('-')), digit1)),
        |digits: &str| digits.parse::<i64>().map(|v| v as u8),
    )(inp)
}

fn register(inp: &str) -> IResult<&str, Register> {
    map_opt(preceded(char('R'), one_of("01234567")), |digit| {
        Register::from_index(digit as u8 - b'0')
    })(inp)
}

fn memory(inp: &str) -> IResult<&str, Operand> {
    map(
        delimited(char('['), delimited(space0, operand, space0), char(']')),
        |inner| Operand::Memory(Box::new(inner)),
    )(inp)
}

fn operand(inp: &str) -> IResult<&str, Operand> {
    alt((
        map(bin_literal, Operand::Immediate),
        map(hex_literal, Operand::Immediate),
        map(register, Operand::Register),
        memory,
        map(dec_literal, Operand::Immediate),
    ))(inp)
}

/// Parses one textual operand into its typed form.
///
/// Grammar: `0b`/`0x` prefixed literals, `R0`-`R7` register references,
/// bracketed memory references (whose inner text is itself an operand), and
/// decimal literals. Resolving the result against machine state is a pure
/// read; all error cases live here at parse time.
pub fn parse_operand(text: &str) -> LangResult<Operand> {
    let text = text.trim();
    match all_consuming(operand)(text) {
        Ok((_, op)) => Ok(op),
        Err(_) => Err(classify(text)),
    }
}

// Failed parses keep the committed-prefix error taxonomy: anything that looks
// like a register reference is an invalid register, bracketed forms classify
// on their inner text, and the rest are malformed operands.
fn classify(text: &str) -> LangError {
    if text.starts_with('R') {
        return LangError::InvalidRegister(text.to_string());
    }
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if let LangError::InvalidRegister(reg) = classify(inner.trim()) {
            return LangError::InvalidRegister(reg);
        }
    }
    LangError::MalformedOperand(text.to_string())
}

/// Parses an operand that must name a writable location.
pub fn parse_target(text: &str) -> LangResult<Target> {
    match parse_operand(text)? {
        Operand::Register(reg) => Ok(Target::Register(reg)),
        Operand::Memory(addr) => Ok(Target::Memory(*addr)),
        Operand::Immediate(_) => Err(LangError::MalformedOperand(text.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        assert_eq!(parse_operand("42"), Ok(Operand::Immediate(42)));
        assert_eq!(parse_operand("0x2A"), Ok(Operand::Immediate(42)));
        assert_eq!(parse_operand("0b101010"), Ok(Operand::Immediate(42)));
        assert_eq!(parse_operand("0"), Ok(Operand::Immediate(0)));
        assert_eq!(parse_operand("255"), Ok(Operand::Immediate(255)));
    }

    #[test]
    fn out_of_range_literals_wrap() {
        assert_eq!(parse_operand("260"), Ok(Operand::Immediate(4)));
        assert_eq!(parse_operand("0x1FF"), Ok(Operand::Immediate(0xFF)));
        assert_eq!(parse_operand("0b100000001"), Ok(Operand::Immediate(1)));
        assert_eq!(parse_operand("-1"), Ok(Operand::Immediate(0xFF)));
    }

    #[test]
    fn registers() {
        assert_eq!(parse_operand("R0"), Ok(Operand::Register(Register::R0)));
        assert_eq!(parse_operand("R7"), Ok(Operand::Register(Register::R7)));
        assert_eq!(
            parse_operand("R8"),
            Err(LangError::InvalidRegister("R8".to_string()))
        );
        assert_eq!(
            parse_operand("R12"),
            Err(LangError::InvalidRegister("R12".to_string()))
        );
        assert_eq!(
            parse_operand("Rx"),
            Err(LangError::InvalidRegister("Rx".to_string()))
        );
        assert_eq!(
            parse_operand("R"),
            Err(LangError::InvalidRegister("R".to_string()))
        );
    }

    #[test]
    fn memory_references() {
        assert_eq!(
            parse_operand("[0x10]"),
            Ok(Operand::Memory(Box::new(Operand::Immediate(0x10))))
        );
        assert_eq!(
            parse_operand("[R1]"),
            Ok(Operand::Memory(Box::new(Operand::Register(Register::R1))))
        );
        // The address operand nests.
        assert_eq!(
            parse_operand("[[0x01]]"),
            Ok(Operand::Memory(Box::new(Operand::Memory(Box::new(
                Operand::Immediate(1)
            )))))
        );
        assert_eq!(
            parse_operand("[ 5 ]"),
            Ok(Operand::Memory(Box::new(Operand::Immediate(5))))
        );
    }

    #[test]
    fn malformed() {
        assert_eq!(
            parse_operand("abc"),
            Err(LangError::MalformedOperand("abc".to_string()))
        );
        assert_eq!(
            parse_operand("12abc"),
            Err(LangError::MalformedOperand("12abc".to_string()))
        );
        assert_eq!(
            parse_operand(""),
            Err(LangError::MalformedOperand(String::new()))
        );
        assert_eq!(
            parse_operand("[0x10"),
            Err(LangError::MalformedOperand("[0x10".to_string()))
        );
        // Register errors surface through brackets.
        assert_eq!(
            parse_operand("[R9]"),
            Err(LangError::InvalidRegister("R9".to_string()))
        );
    }

    #[test]
    fn targets() {
        assert_eq!(
            parse_target("R3"),
            Ok(Target::Register(Register::R3))
        );
        assert_eq!(
            parse_target("[0x10]"),
            Ok(Target::Memory(Operand::Immediate(0x10)))
        );
        assert_eq!(
            parse_target("42"),
            Err(LangError::MalformedOperand("42".to_string()))
        );
    }
}
