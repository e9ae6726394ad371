//! Arithmetic over a closed numeric grammar.
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/" | "%") unary)*
//! unary   := ("+" | "-") unary | power
//! power   := primary ("**" unary)?
//! primary := number | "(" expr ")"
//! ```

use crate::error::{ToolError, ToolResult};

const INVALID: &str = "Invalid mathematical expression";
const MAX_NESTING: usize = 64;

/// Evaluates `input` after discarding every character other than ASCII
/// digits, spaces, and `+-*/().%`. Spaces separate tokens, so `1 2` is
/// rejected rather than read as `12`.
///
/// # Errors
///
/// Returns [`ToolError::Execution`] for malformed expressions and
/// non-finite results.
pub fn evaluate(input: &str) -> ToolResult<String> {
    let filtered: Vec<u8> = input
        .chars()
        .filter(|c| c.is_ascii_digit() || "+-*/().% ".contains(*c))
        .map(|c| c as u8)
        .collect();

    let mut parser = Parser {
        src: &filtered,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    parser.skip_spaces();
    if parser.pos != filtered.len() || !value.is_finite() {
        return Err(ToolError::execution(INVALID));
    }
    Ok(format_number(value))
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn skip_spaces(&mut self) {
        while self.src.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }
    }

    /// Next token byte, skipping spaces before it.
    fn peek(&mut self) -> Option<u8> {
        self.skip_spaces();
        self.src.get(self.pos).copied()
    }

    fn digit_at(&self, pos: usize) -> bool {
        self.src.get(pos).is_some_and(u8::is_ascii_digit)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> ToolResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ToolError::execution(INVALID));
        }
        Ok(())
    }

    fn expr(&mut self) -> ToolResult<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat(b'+') {
                value += self.term()?;
            } else if self.eat(b'-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> ToolResult<f64> {
        let mut value = self.unary()?;
        loop {
            if self.peek() == Some(b'*') && self.src.get(self.pos + 1) != Some(&b'*') {
                self.pos += 1;
                value *= self.unary()?;
            } else if self.eat(b'/') {
                value /= self.unary()?;
            } else if self.eat(b'%') {
                value %= self.unary()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> ToolResult<f64> {
        self.descend()?;
        let value = if self.eat(b'-') {
            -self.unary()?
        } else if self.eat(b'+') {
            self.unary()?
        } else {
            self.power()?
        };
        self.depth -= 1;
        Ok(value)
    }

    fn power(&mut self) -> ToolResult<f64> {
        let base = self.primary()?;
        if self.peek() == Some(b'*') && self.src.get(self.pos + 1) == Some(&b'*') {
            self.pos += 2;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> ToolResult<f64> {
        if self.eat(b'(') {
            self.descend()?;
            let value = self.expr()?;
            self.depth -= 1;
            if !self.eat(b')') {
                return Err(ToolError::execution(INVALID));
            }
            return Ok(value);
        }
        self.number()
    }

    fn number(&mut self) -> ToolResult<f64> {
        self.skip_spaces();
        let start = self.pos;
        while self.digit_at(self.pos) {
            self.pos += 1;
        }
        if self.src.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            while self.digit_at(self.pos) {
                self.pos += 1;
            }
        }
        let literal = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| ToolError::execution(INVALID))?;
        if literal.is_empty() || literal == "." {
            return Err(ToolError::execution(INVALID));
        }
        literal
            .parse::<f64>()
            .map_err(|_| ToolError::execution(INVALID))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> String {
        evaluate(input).unwrap()
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(eval("2 + 3 * 4"), "14");
        assert_eq!(eval("(2 + 3) * 4"), "20");
        assert_eq!(eval("7 / 2"), "3.5");
        assert_eq!(eval("10 % 4"), "2");
        assert_eq!(eval("-3 + -(-2)"), "-1");
        assert_eq!(eval("2 ** 3 ** 2"), "512");
        assert_eq!(eval(".5 * 4"), "2");
    }

    #[test]
    fn non_math_characters_are_discarded() {
        assert_eq!(eval("what is 6*7?"), "42");
        assert_eq!(eval("alert(1)+1"), "2");
    }

    #[test]
    fn spaces_separate_numbers() {
        assert_eq!(eval("  12  +  3 "), "15");
        for input in ["1 2", "2 3 * 2", "1. 5", "2 * * 3"] {
            let err = evaluate(input).unwrap_err();
            assert_eq!(err.to_string(), INVALID, "{input:?}");
        }
    }

    #[test]
    fn rejects_malformed_and_non_finite() {
        for input in ["", "   ", "2 +", "(1", "1)", "1 / 0", "0 / 0", "1..2", "hello"] {
            let err = evaluate(input).unwrap_err();
            assert_eq!(err.to_string(), INVALID, "{input:?}");
        }
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let input = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(evaluate(&input).is_err());
        let minus = format!("{}1", "-".repeat(500));
        assert!(evaluate(&minus).is_err());
    }
}
