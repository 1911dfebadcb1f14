//! Restricted arithmetic: a small lexer and a recursive-descent evaluator.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/" | "//" | "%") unary)*
//! unary   := ("+" | "-") unary | power
//! power   := primary ("**" unary)?
//! primary := number | name | name "(" args ")" | "(" expr ")"
//! ```
//!
//! Names resolve only against a fixed table of constants and functions,
//! optionally written with a `math.` prefix. Nothing else is reachable.

use super::CalcError;

/// Longest accepted expression, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 256;

/// Deepest accepted nesting of unary operators, calls and parentheses.
pub const MAX_DEPTH: usize = 64;

/// Largest argument `factorial` accepts; anything above overflows an f64.
const MAX_FACTORIAL: f64 = 170.0;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::invalid(format!("bad number literal '{}'", literal)))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = read_name(&chars, &mut i);
                if name == "math" && i < chars.len() && chars[i] == '.' {
                    i += 1;
                    if i >= chars.len() || !(chars[i].is_ascii_alphabetic() || chars[i] == '_') {
                        return Err(CalcError::invalid("expected a name after 'math.'"));
                    }
                    name = read_name(&chars, &mut i);
                }
                tokens.push(Token::Name(name));
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::StarStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::SlashSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            other => {
                return Err(CalcError::invalid(format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(tokens)
}

fn read_name(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while *i < chars.len() && (chars[*i].is_ascii_alphanumeric() || chars[*i] == '_') {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::invalid("expression nested too deeply"));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                value = finite(value + self.term()?)?;
            } else if self.eat(&Token::Minus) {
                value = finite(value - self.term()?)?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                value = finite(value * self.unary()?)?;
            } else if self.eat(&Token::Slash) {
                let rhs = nonzero(self.unary()?)?;
                value = finite(value / rhs)?;
            } else if self.eat(&Token::SlashSlash) {
                let rhs = nonzero(self.unary()?)?;
                value = finite((value / rhs).floor())?;
            } else if self.eat(&Token::Percent) {
                let rhs = nonzero(self.unary()?)?;
                value = finite(floor_mod(value, rhs))?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<f64, CalcError> {
        if self.eat(&Token::Minus) {
            self.descend()?;
            let value = -self.unary()?;
            self.ascend();
            Ok(value)
        } else if self.eat(&Token::Plus) {
            self.descend()?;
            let value = self.unary()?;
            self.ascend();
            Ok(value)
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.eat(&Token::StarStar) {
            self.descend()?;
            let exponent = self.unary()?;
            self.ascend();
            return checked_pow(base, exponent);
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                self.descend()?;
                let value = self.expr()?;
                self.ascend();
                if !self.eat(&Token::RParen) {
                    return Err(CalcError::invalid("missing ')'"));
                }
                Ok(value)
            }
            Some(Token::Name(name)) => {
                if self.eat(&Token::LParen) {
                    self.descend()?;
                    let args = self.arguments()?;
                    self.ascend();
                    call(&name, &args)
                } else {
                    constant(&name)
                }
            }
            Some(token) => Err(CalcError::invalid(format!("unexpected token {:?}", token))),
            None => Err(CalcError::invalid("unexpected end of expression")),
        }
    }

    fn arguments(&mut self) -> Result<Vec<f64>, CalcError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            return Err(CalcError::invalid("expected ',' or ')' in argument list"));
        }
    }
}

fn finite(value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid("result is not a finite number"))
    }
}

fn nonzero(value: f64) -> Result<f64, CalcError> {
    if value == 0.0 {
        Err(CalcError::invalid("division by zero"))
    } else {
        Ok(value)
    }
}

/// Modulo whose sign follows the divisor.
fn floor_mod(lhs: f64, rhs: f64) -> f64 {
    let rem = lhs % rhs;
    if rem != 0.0 && (rem < 0.0) != (rhs < 0.0) {
        rem + rhs
    } else {
        rem
    }
}

fn checked_pow(base: f64, exponent: f64) -> Result<f64, CalcError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(CalcError::invalid("zero cannot be raised to a negative power"));
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(CalcError::invalid("fractional power of a negative number"));
    }
    finite(base.powf(exponent))
}

fn constant(name: &str) -> Result<f64, CalcError> {
    match name {
        "pi" => Ok(std::f64::consts::PI),
        "e" => Ok(std::f64::consts::E),
        "tau" => Ok(std::f64::consts::TAU),
        _ => Err(CalcError::invalid(format!("unknown name '{}'", name))),
    }
}

fn arity(name: &str, args: &[f64], expected: usize) -> Result<(), CalcError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CalcError::invalid(format!(
            "{}() takes {} argument(s), got {}",
            name,
            expected,
            args.len()
        )))
    }
}

fn unary_fn(name: &str, args: &[f64], f: fn(f64) -> f64) -> Result<f64, CalcError> {
    arity(name, args, 1)?;
    let value = f(args[0]);
    if value.is_nan() {
        return Err(CalcError::invalid(format!("math domain error in {}()", name)));
    }
    finite(value)
}

fn factorial(name: &str, args: &[f64]) -> Result<f64, CalcError> {
    arity(name, args, 1)?;
    let n = args[0];
    if n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::invalid(
            "factorial() only accepts non-negative integral values",
        ));
    }
    if n > MAX_FACTORIAL {
        return Err(CalcError::invalid("factorial() argument too large"));
    }
    Ok((1..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}

fn call(name: &str, args: &[f64]) -> Result<f64, CalcError> {
    match name {
        "sqrt" => unary_fn(name, args, f64::sqrt),
        "sin" => unary_fn(name, args, f64::sin),
        "cos" => unary_fn(name, args, f64::cos),
        "tan" => unary_fn(name, args, f64::tan),
        "asin" => unary_fn(name, args, f64::asin),
        "acos" => unary_fn(name, args, f64::acos),
        "atan" => unary_fn(name, args, f64::atan),
        "sinh" => unary_fn(name, args, f64::sinh),
        "cosh" => unary_fn(name, args, f64::cosh),
        "tanh" => unary_fn(name, args, f64::tanh),
        "exp" => unary_fn(name, args, f64::exp),
        "log10" => unary_fn(name, args, f64::log10),
        "log2" => unary_fn(name, args, f64::log2),
        "floor" => unary_fn(name, args, f64::floor),
        "ceil" => unary_fn(name, args, f64::ceil),
        "trunc" => unary_fn(name, args, f64::trunc),
        "fabs" | "abs" => unary_fn(name, args, f64::abs),
        "degrees" => unary_fn(name, args, f64::to_degrees),
        "radians" => unary_fn(name, args, f64::to_radians),
        "factorial" => factorial(name, args),
        "log" => match args {
            [x] if *x > 0.0 => finite(x.ln()),
            [x, base] if *x > 0.0 && *base > 0.0 && *base != 1.0 => finite(x.ln() / base.ln()),
            [_] | [_, _] => Err(CalcError::invalid("math domain error in log()")),
            _ => Err(CalcError::invalid("log() takes 1 or 2 arguments")),
        },
        "atan2" => {
            arity(name, args, 2)?;
            finite(args[0].atan2(args[1]))
        }
        "pow" => {
            arity(name, args, 2)?;
            checked_pow(args[0], args[1])
        }
        "hypot" => {
            if args.is_empty() {
                return Err(CalcError::invalid("hypot() needs at least one argument"));
            }
            finite(args.iter().map(|a| a * a).sum::<f64>().sqrt())
        }
        "min" | "max" => {
            if args.len() < 2 {
                return Err(CalcError::invalid(format!(
                    "{}() needs at least two arguments",
                    name
                )));
            }
            let fold: fn(f64, f64) -> f64 = if name == "min" { f64::min } else { f64::max };
            Ok(args[1..].iter().copied().fold(args[0], fold))
        }
        _ => Err(CalcError::invalid(format!("unknown function '{}'", name))),
    }
}

/// Evaluate an expression to a finite number.
pub fn evaluate_expression(input: &str) -> Result<f64, CalcError> {
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(CalcError::invalid("expression too long"));
    }
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(CalcError::invalid("empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(CalcError::invalid("trailing input after expression"));
    }
    finite(value)
}

/// Render a result the way the calc reply shows it.
pub fn format_result(value: f64) -> String {
    // -0 prints as 0
    let value = if value == 0.0 { 0.0 } else { value };
    format!("Result: `{}`", value)
}
