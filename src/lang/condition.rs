//! Condition parsing and evaluation for `IF` lines.

use std::fmt;

use super::{operand::parse_operand, LangError, LangResult, Operand};

/// A comparison operator in an `IF` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl CmpOp {
    /// Every operator, in the order the splitter tries them. Two-character
    /// operators come before their single-character prefixes so `>=` is never
    /// mis-split as `>`.
    pub const ALL: [CmpOp; 6] = [Self::Eq, Self::Ne, Self::Ge, Self::Le, Self::Gt, Self::Lt];

    /// The operator's source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }

    /// Looks up the operator for a symbol token.
    pub fn from_symbol(symbol: &str) -> LangResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| LangError::InvalidOperator(symbol.to_string()))
    }

    /// Applies the comparison to two resolved byte values.
    pub fn eval(self, left: u8, right: u8) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Ge => left >= right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Lt => left < right,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed `IF` condition: two operands joined by a comparison operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub left: Operand,
    pub op: CmpOp,
    pub right: Operand,
}

/// Splits a condition on the first operator it contains.
///
/// Operators are tried in [`CmpOp::ALL`] order, so an operator earlier in the
/// list wins even when another occurs earlier in the text. Returns the raw
/// operand texts, trimmed.
pub fn split_condition(text: &str) -> LangResult<(&str, CmpOp, &str)> {
    for op in CmpOp::ALL {
        if let Some(at) = text.find(op.symbol()) {
            let left = &text[..at];
            let right = &text[at + op.symbol().len()..];
            return Ok((left.trim(), op, right.trim()));
        }
    }
    Err(LangError::InvalidCondition(text.trim().to_string()))
}

/// Parses a condition into its typed form.
pub fn parse_condition(text: &str) -> LangResult<Condition> {
    let (left, op, right) = split_condition(text)?;
    Ok(Condition {
        left: parse_operand(left)?,
        op,
        right: parse_operand(right)?,
    })
}

/// The condition text of an `IF` line: everything after the leading `IF`
/// token.
pub fn condition_text(line: &str) -> &str {
    line.trim().strip_prefix("IF").unwrap_or(line).trim()
}

#[cfg(test)]
mod tests {
    use crate::isa::Register;

    use super::*;

    #[test]
    fn splits_on_operator() {
        assert_eq!(split_condition("R0 >= 5"), Ok(("R0", CmpOp::Ge, "5")));
        assert_eq!(split_condition("R0 == 0"), Ok(("R0", CmpOp::Eq, "0")));
        assert_eq!(split_condition("1<2"), Ok(("1", CmpOp::Lt, "2")));
    }

    #[test]
    fn two_character_operators_win() {
        // A naive `>` match would split `>=` in half.
        assert_eq!(split_condition("R2 >= [0x10]"), Ok(("R2", CmpOp::Ge, "[0x10]")));
        assert_eq!(split_condition("R2 <= 3"), Ok(("R2", CmpOp::Le, "3")));
        assert_eq!(split_condition("R2 > 3"), Ok(("R2", CmpOp::Gt, "3")));
    }

    #[test]
    fn missing_operator_is_invalid() {
        assert_eq!(
            split_condition("R0 5"),
            Err(LangError::InvalidCondition("R0 5".to_string()))
        );
    }

    #[test]
    fn unknown_symbol_is_invalid_operator() {
        assert_eq!(CmpOp::from_symbol(">="), Ok(CmpOp::Ge));
        assert_eq!(
            CmpOp::from_symbol(">>"),
            Err(LangError::InvalidOperator(">>".to_string()))
        );
    }

    #[test]
    fn evaluation_table() {
        assert!(CmpOp::Ge.eval(5, 5));
        assert!(CmpOp::Le.eval(4, 5));
        assert!(CmpOp::Eq.eval(7, 7));
        assert!(CmpOp::Ne.eval(7, 8));
        assert!(CmpOp::Gt.eval(6, 5));
        assert!(CmpOp::Lt.eval(5, 6));
        assert!(!CmpOp::Gt.eval(5, 5));
        assert!(!CmpOp::Eq.eval(5, 6));
    }

    #[test]
    fn parses_typed_conditions() {
        let cond = parse_condition("R0 == [0x10]").unwrap();
        assert_eq!(cond.left, Operand::Register(Register::R0));
        assert_eq!(cond.op, CmpOp::Eq);
        assert_eq!(
            cond.right,
            Operand::Memory(Box::new(Operand::Immediate(0x10)))
        );
    }

    #[test]
    fn bad_operands_propagate() {
        assert_eq!(
            parse_condition("R9 == 5"),
            Err(LangError::InvalidRegister("R9".to_string()))
        );
    }

    #[test]
    fn strips_the_if_token() {
        assert_eq!(condition_text("IF R0 == 5"), "R0 == 5");
        assert_eq!(condition_text("  IF R0 == 5  "), "R0 == 5");
    }
}
