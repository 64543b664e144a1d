use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;

use super::polynomial::Polynomial;
use super::rational::RationalFunction;
use crate::error::{QuizError, Result};

/// Highest exponent accepted on `^`.
const MAX_EXPONENT: u32 = 32;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(BigRational),
    X,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

/// Parse `numerator / denominator`; a bare polynomial gets denominator 1.
pub fn parse_rational(input: &str) -> Result<RationalFunction> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
    };

    let numerator = parser.expr()?;
    let denominator = if parser.eat(&Token::Slash) {
        parser.expr()?
    } else {
        Polynomial::one()
    };
    parser.finish()?;

    RationalFunction::new(numerator, denominator)
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => {}
            'x' | 'X' => tokens.push(Token::X),
            '+' => tokens.push(Token::Plus),
            '-' | '−' => tokens.push(Token::Minus),
            '*' | '·' => tokens.push(Token::Star),
            '/' => tokens.push(Token::Slash),
            '^' => tokens.push(Token::Caret),
            '(' | '[' => tokens.push(Token::LParen),
            ')' | ']' => tokens.push(Token::RParen),
            d if d.is_ascii_digit() || d == '.' => {
                let start = i;
                while i + 1 < chars.len()
                    && (chars[i + 1].is_ascii_digit() || chars[i + 1] == '.')
                {
                    i += 1;
                }
                let literal: String = chars[start..=i].iter().collect();
                tokens.push(Token::Num(parse_number(input, &literal)?));
            }
            other => {
                return Err(QuizError::parse(
                    input,
                    format!("unexpected character '{}'", other),
                ))
            }
        }
        i += 1;
    }

    if tokens.is_empty() {
        return Err(QuizError::parse(input, "empty expression"));
    }
    Ok(tokens)
}

fn parse_number(input: &str, literal: &str) -> Result<BigRational> {
    let invalid = || QuizError::parse(input, format!("bad number '{}'", literal));

    let (whole, frac) = match literal.split_once('.') {
        Some((w, f)) => (w, f),
        None => (literal, ""),
    };
    if frac.contains('.') || (whole.is_empty() && frac.is_empty()) {
        return Err(invalid());
    }

    let digits = format!("{}{}", whole, frac);
    let numer: BigInt = digits.parse().map_err(|_| invalid())?;
    let denom = BigInt::from(10u32).pow(frac.len() as u32);
    Ok(BigRational::new(numer, denom))
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, reason: impl Into<String>) -> QuizError {
        QuizError::parse(self.input, reason)
    }

    fn finish(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(Token::Slash) => Err(self.error("only one top-level '/' is allowed")),
            Some(Token::RParen) => Err(self.error("unmatched ')'")),
            Some(t) => Err(self.error(format!("unexpected {:?}", t))),
        }
    }

    // expr := [+|-] term ((+|-) term)*
    fn expr(&mut self) -> Result<Polynomial> {
        let negate_first = if self.eat(&Token::Minus) {
            true
        } else {
            self.eat(&Token::Plus);
            false
        };

        let first = self.term()?;
        let mut acc = if negate_first { -&first } else { first };

        loop {
            if self.eat(&Token::Plus) {
                acc = &acc + &self.term()?;
            } else if self.eat(&Token::Minus) {
                acc = &acc - &self.term()?;
            } else {
                return Ok(acc);
            }
        }
    }

    // term := power ([*] power)*
    fn term(&mut self) -> Result<Polynomial> {
        let mut acc = self.power()?;
        loop {
            if self.eat(&Token::Star) {
                acc = &acc * &self.power()?;
            } else if matches!(
                self.peek(),
                Some(Token::Num(_)) | Some(Token::X) | Some(Token::LParen)
            ) {
                acc = &acc * &self.power()?;
            } else {
                return Ok(acc);
            }
        }
    }

    // power := atom [^ integer]
    fn power(&mut self) -> Result<Polynomial> {
        let base = self.atom()?;
        if !self.eat(&Token::Caret) {
            return Ok(base);
        }

        match self.tokens.get(self.pos).cloned() {
            Some(Token::Num(n)) if n.is_integer() => {
                self.pos += 1;
                let exp = n
                    .to_integer()
                    .to_u32()
                    .filter(|e| *e <= MAX_EXPONENT)
                    .ok_or_else(|| self.error(format!("exponent {} is out of range", n)))?;
                Ok(base.pow(exp))
            }
            _ => Err(self.error("exponent must be a non-negative integer")),
        }
    }

    // atom := number | x | ( expr )
    fn atom(&mut self) -> Result<Polynomial> {
        match self.tokens.get(self.pos).cloned() {
            Some(Token::Num(n)) => {
                self.pos += 1;
                Ok(Polynomial::constant(n))
            }
            Some(Token::X) => {
                self.pos += 1;
                Ok(Polynomial::x())
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.error("missing ')'"));
                }
                Ok(inner)
            }
            Some(t) => Err(self.error(format!("unexpected {:?}", t))),
            None => Err(self.error("expression ends too early")),
        }
    }
}

/// Parses plain numbers such as `3`, `-0.5` or `3/2`.
pub fn parse_constant(input: &str) -> Option<BigRational> {
    let rational = parse_rational(input).ok()?;
    let num = rational.numerator();
    let den = rational.denominator();
    if !num.is_constant() || !den.is_constant() || den.is_zero() {
        return None;
    }
    Some(num.coeff(0) / den.coeff(0))
}
