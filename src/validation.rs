//! Declarative input validation
//!
//! A `RuleSet` is a list of checks evaluated together. Every failing rule
//! contributes its message, so callers see all problems with a request at
//! once instead of fixing them one round-trip at a time.

use std::fmt::Display;
use std::ops::RangeInclusive;

use crate::outcome::Outcome;

type Check<T> = Box<dyn Fn(&T) -> Vec<String> + Send + Sync>;

pub struct RuleSet<T> {
  checks: Vec<Check<T>>,
}

impl<T> Default for RuleSet<T> {
  fn default() -> Self {
    Self { checks: Vec::new() }
  }
}

impl<T: 'static> RuleSet<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Field must be present and not blank
  pub fn required<F>(self, field: &'static str, get: F) -> Self
  where
    F: Fn(&T) -> &str + Send + Sync + 'static,
  {
    self.rule(format!("{} is required", field), move |input| {
      !get(input).trim().is_empty()
    })
  }

  /// Numeric field must fall inside an inclusive range
  pub fn range<N, F>(mut self, field: &'static str, bounds: RangeInclusive<N>, get: F) -> Self
  where
    N: PartialOrd + Display + Copy + Send + Sync + 'static,
    F: Fn(&T) -> N + Send + Sync + 'static,
  {
    self.checks.push(Box::new(move |input| {
      let value = get(input);
      if bounds.contains(&value) {
        Vec::new()
      } else {
        vec![format!(
          "{} must be between {} and {} (got {})",
          field,
          bounds.start(),
          bounds.end(),
          value
        )]
      }
    }));
    self
  }

  /// Arbitrary predicate, including cross-field rules
  pub fn rule<F>(mut self, message: impl Into<String>, predicate: F) -> Self
  where
    F: Fn(&T) -> bool + Send + Sync + 'static,
  {
    let message = message.into();
    self.checks.push(Box::new(move |input| {
      if predicate(input) {
        Vec::new()
      } else {
        vec![message.clone()]
      }
    }));
    self
  }

  /// Rule that reports its own messages, for nested collections
  pub fn each<F>(mut self, check: F) -> Self
  where
    F: Fn(&T) -> Vec<String> + Send + Sync + 'static,
  {
    self.checks.push(Box::new(check));
    self
  }

  /// Evaluate every rule and collect all messages
  pub fn validate(&self, input: &T) -> Vec<String> {
    self.checks.iter().flat_map(|check| check(input)).collect()
  }
}

/// Types that carry their own rule set
pub trait Validate: Sized + 'static {
  fn rules() -> RuleSet<Self>;

  fn validate(&self) -> Vec<String> {
    Self::rules().validate(self)
  }
}

/// Gate an operation on its input's rules
pub fn check<T: Validate>(input: &T) -> Outcome<()> {
  let errors = input.validate();
  if errors.is_empty() {
    Outcome::success(())
  } else {
    Outcome::failures(errors)
  }
}
