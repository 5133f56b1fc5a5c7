//! Groups raw source lines into executable units.

use log::trace;

/// One executable unit emitted by the [`Segmenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// A single instruction line.
    Plain(String),
    /// An `IF` line together with the indented blocks that follow it.
    ///
    /// The blocks hold plain instruction lines only: block lines are not
    /// re-examined for nested `IF`s, so conditionals never nest.
    Conditional {
        /// The full `IF` line, comment-stripped and trimmed.
        condition: String,
        if_block: Vec<String>,
        else_block: Vec<String>,
    },
}

/// Walks source lines and groups them into [`Unit`]s, one forward pass.
///
/// Blank and comment-only lines are dropped, and every line is truncated at
/// its first `;`. A line whose first token is `IF` opens a conditional unit:
/// all immediately following lines indented by at least two spaces form the
/// if-block, and if the next non-indented line is exactly `ELSE`, the same
/// rule collects the else-block. Indentation is the only block delimiter; a
/// block ends at the first line with less than two leading spaces or at end
/// of input.
pub struct Segmenter<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
}

impl<'a> Segmenter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            cursor: 0,
        }
    }

    fn collect_block(&mut self) -> Vec<String> {
        let mut block = Vec::new();
        while let Some(raw) = self.lines.get(self.cursor) {
            if !raw.starts_with("  ") {
                break;
            }
            let line = strip_comment(raw);
            if !line.is_empty() {
                block.push(line.to_string());
            }
            self.cursor += 1;
        }
        block
    }
}

impl Iterator for Segmenter<'_> {
    type Item = Unit;

    fn next(&mut self) -> Option<Unit> {
        while self.cursor < self.lines.len() {
            let raw = self.lines[self.cursor];
            self.cursor += 1;
            let line = strip_comment(raw);
            if line.is_empty() {
                continue;
            }
            if line.split_whitespace().next() == Some("IF") {
                let if_block = self.collect_block();
                let mut else_block = Vec::new();
                if let Some(next) = self.lines.get(self.cursor) {
                    if strip_comment(next) == "ELSE" {
                        self.cursor += 1;
                        else_block = self.collect_block();
                    }
                }
                trace!(
                    "conditional unit {line:?}: {} if line(s), {} else line(s)",
                    if_block.len(),
                    else_block.len()
                );
                return Some(Unit::Conditional {
                    condition: line.to_string(),
                    if_block,
                    else_block,
                });
            }
            return Some(Unit::Plain(line.to_string()));
        }
        None
    }
}

/// Segments a whole source listing in one call.
pub fn segment(source: &str) -> Vec<Unit> {
    Segmenter::new(source).collect()
}

/// Truncates a line at its first `;` and trims the remainder.
pub fn strip_comment(line: &str) -> &str {
    line.split(';').next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &str) -> Unit {
        Unit::Plain(line.to_string())
    }

    #[test]
    fn groups_if_and_else_blocks() {
        let units = segment("IF R0 == 0\n  MOV R1, 42\nELSE\n  MOV R1, 24");
        assert_eq!(
            units,
            vec![Unit::Conditional {
                condition: "IF R0 == 0".to_string(),
                if_block: vec!["MOV R1, 42".to_string()],
                else_block: vec!["MOV R1, 24".to_string()],
            }]
        );
    }

    #[test]
    fn if_without_else() {
        let units = segment("IF R2 > [0x10]\n  ADD R3, 5\n  OUT R3\nCLR R3");
        assert_eq!(
            units,
            vec![
                Unit::Conditional {
                    condition: "IF R2 > [0x10]".to_string(),
                    if_block: vec!["ADD R3, 5".to_string(), "OUT R3".to_string()],
                    else_block: vec![],
                },
                plain("CLR R3"),
            ]
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let units = segment("; a comment\n\nMOV R0, 1\n   \nOUT R0 ; report");
        assert_eq!(units, vec![plain("MOV R0, 1"), plain("OUT R0")]);
    }

    #[test]
    fn block_ends_at_unindented_line() {
        let units = segment("IF R0 == 1\n  OUT 1\nOUT 2");
        assert_eq!(
            units,
            vec![
                Unit::Conditional {
                    condition: "IF R0 == 1".to_string(),
                    if_block: vec!["OUT 1".to_string()],
                    else_block: vec![],
                },
                plain("OUT 2"),
            ]
        );
    }

    #[test]
    fn block_ends_at_end_of_input() {
        let units = segment("IF R0 == 1\n  OUT 1");
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn nested_if_lines_stay_plain_block_lines() {
        // One level of nesting only: an indented IF is collected verbatim.
        let units = segment("IF R0 == 1\n  IF R1 == 2\n  OUT 1");
        assert_eq!(
            units,
            vec![Unit::Conditional {
                condition: "IF R0 == 1".to_string(),
                if_block: vec!["IF R1 == 2".to_string(), "OUT 1".to_string()],
                else_block: vec![],
            }]
        );
    }

    #[test]
    fn else_with_trailing_comment() {
        let units = segment("IF R0 == 0\n  OUT 1\nELSE ; otherwise\n  OUT 0");
        match &units[0] {
            Unit::Conditional { else_block, .. } => {
                assert_eq!(else_block, &vec!["OUT 0".to_string()]);
            }
            other => panic!("expected conditional unit, got {other:?}"),
        }
    }

    #[test]
    fn comments_inside_blocks_are_stripped() {
        let units = segment("IF R0 == 0\n  OUT 1 ; then\n  ; just a comment\n  OUT 2");
        match &units[0] {
            Unit::Conditional { if_block, .. } => {
                assert_eq!(if_block, &vec!["OUT 1".to_string(), "OUT 2".to_string()]);
            }
            other => panic!("expected conditional unit, got {other:?}"),
        }
    }

    #[test]
    fn if_must_be_its_own_token() {
        assert_eq!(segment("IFFY R0"), vec![plain("IFFY R0")]);
    }
}
