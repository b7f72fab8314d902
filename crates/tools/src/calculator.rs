//! Calculator tool: evaluates arithmetic expressions.
//!
//! A tokenizer plus recursive-descent parser over a closed grammar. The only
//! identifiers accepted are the constants and functions listed in
//! [`FUNCTIONS`] and [`CONSTANTS`]; anything else is rejected before
//! evaluation, so there is nothing to escape from.
//!
//! Integers stay integers until an operation needs a float, which keeps
//! `2+2` printing as `4` while `sqrt(16)` prints as `4.0`.

use async_trait::async_trait;
use deskmate_core::error::ToolError;
use deskmate_core::tool::{Tool, ToolResult, required_str};

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Realiza cálculos matemáticos: + - * / // % ** ^, paréntesis, pi/e/tau y \
         funciones como sqrt, sin, cos, tan, log, exp, factorial, round, floor o ceil"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The expression to evaluate, e.g. 'sqrt(16) + 2**3'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let expr = required_str(&arguments, "expression")?;

        let value = evaluate(expr).map_err(ToolError::InvalidExpression)?;
        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: format!("El resultado es: {value}"),
            data: Some(serde_json::json!({
                "expression": expr,
                "result": value.to_string(),
            })),
        })
    }
}

// ── Values ────────────────────────────────────────────────────────────────

/// A calculator value: exact integer or float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn is_int(self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) if x.is_nan() => write!(f, "nan"),
            Self::Float(x) if x.is_infinite() => {
                write!(f, "{}", if *x > 0.0 { "inf" } else { "-inf" })
            }
            // Debug keeps the ".0" on whole floats and prints the shortest
            // representation otherwise.
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// Functions callable from expressions, with their accepted arities.
pub const FUNCTIONS: &[(&str, usize, usize)] = &[
    ("sqrt", 1, 1),
    ("sin", 1, 1),
    ("cos", 1, 1),
    ("tan", 1, 1),
    ("asin", 1, 1),
    ("acos", 1, 1),
    ("atan", 1, 1),
    ("sinh", 1, 1),
    ("cosh", 1, 1),
    ("tanh", 1, 1),
    ("log", 1, 2),
    ("log10", 1, 1),
    ("log2", 1, 1),
    ("exp", 1, 1),
    ("factorial", 1, 1),
    ("abs", 1, 1),
    ("round", 1, 2),
    ("floor", 1, 1),
    ("ceil", 1, 1),
    ("trunc", 1, 1),
    ("pow", 2, 2),
    ("degrees", 1, 1),
    ("radians", 1, 1),
];

pub const CONSTANTS: &[(&str, f64)] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("tau", std::f64::consts::TAU),
];

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Evaluate a mathematical expression string.
pub fn evaluate(expr: &str) -> Result<Number, String> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!(
            "Unexpected token at position {}: {:?}",
            parser.pos, parser.tokens[parser.pos]
        ));
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Number),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' if chars.get(i + 1) == Some(&'*') => { tokens.push(Token::Power); i += 2; }
            '*' | '×' => { tokens.push(Token::Star); i += 1; }
            '/' if chars.get(i + 1) == Some(&'/') => { tokens.push(Token::DoubleSlash); i += 2; }
            '/' | '÷' => { tokens.push(Token::Slash); i += 1; }
            '%' => { tokens.push(Token::Percent); i += 1; }
            '^' => { tokens.push(Token::Power); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            ',' => { tokens.push(Token::Comma); i += 1; }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Scientific notation: 1e10, 2.5E-3
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
                let num_str: String = chars[start..i].iter().collect();
                tokens.push(Token::Number(parse_number(&num_str)?));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(ident.to_lowercase()));
            }
            c => return Err(format!("Unexpected character: '{}'", c)),
        }
    }

    Ok(tokens)
}

fn parse_number(s: &str) -> Result<Number, String> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Number::Int(i));
        }
    }
    s.parse::<f64>()
        .map(Number::Float)
        .map_err(|_| format!("Invalid number: {}", s))
}

/// Bound on nested parentheses, signs and exponents. Every nesting level
/// passes through `parse_unary`, so that is where it is counted.
const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Number, String> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.consume();
                    let right = self.parse_term()?;
                    left = int_or_float(left, right, i64::checked_add, |a, b| a + b);
                }
                Token::Minus => {
                    self.consume();
                    let right = self.parse_term()?;
                    left = int_or_float(left, right, i64::checked_sub, |a, b| a - b);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = unary (('*' | '/' | '//' | '%') unary)*
    fn parse_term(&mut self) -> Result<Number, String> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.consume();
                    let right = self.parse_unary()?;
                    left = int_or_float(left, right, i64::checked_mul, |a, b| a * b);
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right.as_f64() == 0.0 {
                        return Err("Division by zero".into());
                    }
                    left = Number::Float(left.as_f64() / right.as_f64());
                }
                Token::DoubleSlash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    left = floor_div(left, right)?;
                }
                Token::Percent => {
                    self.consume();
                    let right = self.parse_unary()?;
                    left = modulo(left, right)?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Number, String> {
        if self.depth >= MAX_DEPTH {
            return Err("Expression nested too deeply".into());
        }
        self.depth += 1;
        let result = self.parse_signed();
        self.depth -= 1;
        result
    }

    // unary = ('-' | '+') unary | power
    fn parse_signed(&mut self) -> Result<Number, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.consume();
                let val = self.parse_unary()?;
                Ok(match val {
                    Number::Int(i) => i.checked_neg().map(Number::Int).unwrap_or(Number::Float(-(i as f64))),
                    Number::Float(f) => Number::Float(-f),
                })
            }
            Some(Token::Plus) => {
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    // power = primary (('**' | '^') unary)?   (right-associative, binds tighter than unary on the left)
    fn parse_power(&mut self) -> Result<Number, String> {
        let base = self.parse_primary()?;
        if let Some(Token::Power) = self.peek() {
            self.consume();
            let exponent = self.parse_unary()?;
            return power(base, exponent);
        }
        Ok(base)
    }

    // primary = NUMBER | IDENT | IDENT '(' args ')' | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Number, String> {
        match self.consume().cloned() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let val = self.parse_expr()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(val),
                    _ => Err("Expected closing parenthesis".into()),
                }
            }
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume();
                    let args = self.parse_args()?;
                    call_function(&name, &args)
                } else {
                    constant(&name)
                }
            }
            Some(tok) => Err(format!("Unexpected token: {:?}", tok)),
            None => Err("Unexpected end of expression".into()),
        }
    }

    // args = (expr (',' expr)*)? ')'
    fn parse_args(&mut self) -> Result<Vec<Number>, String> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.consume();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.consume() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                _ => return Err("Expected ',' or ')' in argument list".into()),
            }
        }
    }
}

fn int_or_float(
    a: Number,
    b: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Number {
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if let Some(v) = int_op(x, y) {
            return Number::Int(v);
        }
    }
    Number::Float(float_op(a.as_f64(), b.as_f64()))
}

fn floor_div(a: Number, b: Number) -> Result<Number, String> {
    if b.as_f64() == 0.0 {
        return Err("Division by zero".into());
    }
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if let Some(q) = x.checked_div_euclid(y) {
            // div_euclid keeps the remainder non-negative; floor needs it to follow the divisor.
            let r = x - q * y;
            let q = if r != 0 && (r < 0) != (y < 0) { q - 1 } else { q };
            return Ok(Number::Int(q));
        }
    }
    Ok(Number::Float((a.as_f64() / b.as_f64()).floor()))
}

fn modulo(a: Number, b: Number) -> Result<Number, String> {
    if b.as_f64() == 0.0 {
        return Err("Modulo by zero".into());
    }
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if let Some(r) = x.checked_rem(y) {
            // Result takes the sign of the divisor.
            let r = if r != 0 && (r < 0) != (y < 0) { r + y } else { r };
            return Ok(Number::Int(r));
        }
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    Ok(Number::Float(x - y * (x / y).floor()))
}

fn power(base: Number, exponent: Number) -> Result<Number, String> {
    if let (Number::Int(b), Number::Int(e)) = (base, exponent) {
        if e >= 0 {
            if let Some(v) = u32::try_from(e).ok().and_then(|e| b.checked_pow(e)) {
                return Ok(Number::Int(v));
            }
        } else if b == 0 {
            return Err("Zero cannot be raised to a negative power".into());
        }
    }
    finite(base.as_f64().powf(exponent.as_f64()))
}

fn constant(name: &str) -> Result<Number, String> {
    CONSTANTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| Number::Float(*v))
        .ok_or_else(|| {
            if FUNCTIONS.iter().any(|(n, _, _)| *n == name) {
                format!("Function '{name}' must be called with parentheses")
            } else {
                format!("Unknown identifier '{name}'")
            }
        })
}

fn finite(value: f64) -> Result<Number, String> {
    if value.is_nan() {
        Err("Math domain error".into())
    } else {
        Ok(Number::Float(value))
    }
}

fn to_int(value: f64) -> Result<Number, String> {
    if !value.is_finite() {
        return Err("Cannot convert infinity or NaN to integer".into());
    }
    if value.abs() < 9.2e18 {
        Ok(Number::Int(value as i64))
    } else {
        Ok(Number::Float(value))
    }
}

fn call_function(name: &str, args: &[Number]) -> Result<Number, String> {
    let (_, min, max) = FUNCTIONS
        .iter()
        .find(|(n, _, _)| *n == name)
        .ok_or_else(|| format!("Unknown function '{name}'"))?;
    if args.len() < *min || args.len() > *max {
        return Err(format!(
            "{name}() takes {} argument(s), got {}",
            if min == max { min.to_string() } else { format!("{min}-{max}") },
            args.len()
        ));
    }

    let x = args[0].as_f64();
    match name {
        "sqrt" => {
            if x < 0.0 {
                return Err("Math domain error: sqrt of a negative number".into());
            }
            finite(x.sqrt())
        }
        "sin" => finite(x.sin()),
        "cos" => finite(x.cos()),
        "tan" => finite(x.tan()),
        "asin" => finite(x.asin()),
        "acos" => finite(x.acos()),
        "atan" => finite(x.atan()),
        "sinh" => finite(x.sinh()),
        "cosh" => finite(x.cosh()),
        "tanh" => finite(x.tanh()),
        "log" => {
            if x <= 0.0 {
                return Err("Math domain error: log of a non-positive number".into());
            }
            match args.get(1) {
                Some(base) => {
                    let b = base.as_f64();
                    if b <= 0.0 || b == 1.0 {
                        return Err("Math domain error: invalid logarithm base".into());
                    }
                    finite(x.ln() / b.ln())
                }
                None => finite(x.ln()),
            }
        }
        "log10" | "log2" => {
            if x <= 0.0 {
                return Err("Math domain error: log of a non-positive number".into());
            }
            finite(if name == "log10" { x.log10() } else { x.log2() })
        }
        "exp" => finite(x.exp()),
        "factorial" => factorial(args[0]),
        "abs" => Ok(match args[0] {
            Number::Int(i) => i.checked_abs().map(Number::Int).unwrap_or(Number::Float(x.abs())),
            Number::Float(f) => Number::Float(f.abs()),
        }),
        "round" => match args.get(1) {
            None if args[0].is_int() => Ok(args[0]),
            None => to_int(round_half_even(x)),
            Some(Number::Int(digits)) => {
                // Past 10^308 the factor overflows and any f64 is already exact.
                let digits = (*digits).clamp(-308, 308) as i32;
                let factor = 10f64.powi(digits);
                let scaled = x * factor;
                let rounded = if scaled.is_finite() { round_half_even(scaled) / factor } else { x };
                if args[0].is_int() { to_int(rounded) } else { Ok(Number::Float(rounded)) }
            }
            Some(Number::Float(_)) => Err("round() digits must be an integer".into()),
        },
        "floor" => if args[0].is_int() { Ok(args[0]) } else { to_int(x.floor()) },
        "ceil" => if args[0].is_int() { Ok(args[0]) } else { to_int(x.ceil()) },
        "trunc" => if args[0].is_int() { Ok(args[0]) } else { to_int(x.trunc()) },
        "pow" => finite(x.powf(args[1].as_f64())),
        "degrees" => finite(x.to_degrees()),
        "radians" => finite(x.to_radians()),
        other => Err(format!("Unknown function '{other}'")),
    }
}

/// Banker's rounding, matching the usual `round()` of calculators that
/// follow IEEE defaults.
fn round_half_even(x: f64) -> f64 {
    let r = x.round();
    if (x - x.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
        r - x.signum()
    } else {
        r
    }
}

fn factorial(n: Number) -> Result<Number, String> {
    let n = match n {
        Number::Int(i) => i,
        Number::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
        Number::Float(_) => return Err("factorial() only accepts integral values".into()),
    };
    if n < 0 {
        return Err("factorial() not defined for negative values".into());
    }
    let mut acc: i64 = 1;
    for k in 2..=n {
        match acc.checked_mul(k) {
            Some(v) => acc = v,
            None => {
                // Past 20! the result no longer fits; continue in floating point.
                let mut f = acc as f64;
                for j in k..=n {
                    f *= j as f64;
                    if f.is_infinite() {
                        return Err("factorial() result too large".into());
                    }
                }
                return Ok(Number::Float(f));
            }
        }
    }
    Ok(Number::Int(acc))
}

// ── Tests ─────────────────────────────────────────────────────────────────
