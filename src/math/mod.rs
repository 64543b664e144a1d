pub mod parse;
pub mod polynomial;
pub mod rational;
pub mod roots;

pub use parse::{parse_constant, parse_rational};
pub use polynomial::{q, to_f64, Polynomial};
pub use rational::RationalFunction;
pub use roots::{real_roots, Real};
