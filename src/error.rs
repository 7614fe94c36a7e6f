//! Crate-wide error type.
//!
//! Coda distinguishes three failure kinds: attempting to mutate a frozen
//! object, a structural problem while encoding (monotonicity violation,
//! write-side cycle, recursion limit, field id exhaustion), and a problem
//! while parsing text input (which carries source position).

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

pub type Result<T> = std::result::Result<T, CodaError>;

#[derive(Debug)]
pub enum CodaError {
  /// Attempted to mutate a frozen object. Carries the descriptor name of
  /// the object that was mutated.
  IllegalMutation(String),

  /// A structural problem encountered while encoding.
  Encoding(EncodingError),

  /// A problem encountered while parsing text input.
  Parsing(ParseError),
}

#[derive(Debug)]
pub enum EncodingError {
  /// Fields must be written in ascending id order; `last` is the most
  /// recently written field id, `next` the one that violated it.
  NonMonotonicField { last: u32, next: u32 },

  /// A shared object was encountered a second time during a single write
  /// pass before its first occurrence finished writing, i.e. a cycle.
  Cycle,

  /// Recursion depth exceeded the configured limit.
  DepthExceeded(usize),

  /// No field ids remain below the configured field id ceiling.
  FieldIdExhausted,

  /// Underlying I/O failure while writing.
  Io(String),
}

#[derive(Debug)]
pub struct ParseError {
  pub path: Option<String>,
  pub line: usize,
  pub column: usize,
  pub message: String,
}

impl Display for CodaError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      CodaError::IllegalMutation(name) => {
        write!(f, "cannot mutate frozen object of type `{}`", name)
      }
      CodaError::Encoding(e) => write!(f, "encoding error: {}", e),
      CodaError::Parsing(e) => write!(f, "parse error: {}", e),
    }
  }
}

impl Display for EncodingError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    use EncodingError::*;
    match self {
      NonMonotonicField { last, next } => write!(
        f,
        "field id {} written after field id {}; field ids must ascend",
        next, last
      ),
      Cycle => write!(f, "cycle detected among shared objects during write"),
      DepthExceeded(limit) => write!(f, "recursion depth exceeded limit of {}", limit),
      FieldIdExhausted => write!(f, "no field ids remain below the configured ceiling"),
      Io(msg) => write!(f, "i/o error: {}", msg),
    }
  }
}

impl Display for ParseError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match &self.path {
      Some(path) => write!(
        f,
        "{}:{}:{}: {}",
        path, self.line, self.column, self.message
      ),
      None => write!(f, "{}:{}: {}", self.line, self.column, self.message),
    }
  }
}

impl Error for CodaError {}
impl Error for EncodingError {}
impl Error for ParseError {}

impl From<EncodingError> for CodaError {
  fn from(e: EncodingError) -> Self {
    CodaError::Encoding(e)
  }
}

impl From<ParseError> for CodaError {
  fn from(e: ParseError) -> Self {
    CodaError::Parsing(e)
  }
}
