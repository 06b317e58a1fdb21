//! Uniform success/failure result for expected outcomes
//!
//! Every core operation reports rejected input and domain rule violations
//! as `Outcome::Failure`. Infrastructure faults (database, HTTP) never end
//! up here; they travel on the surrounding `Result`'s `Err` side.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Outcome<T> {
  Success(T),
  Failure(Vec<String>),
}

impl<T> Outcome<T> {
  pub fn success(value: T) -> Self {
    Outcome::Success(value)
  }

  /// Single-message failure (domain/state errors)
  pub fn failure(message: impl Into<String>) -> Self {
    Outcome::Failure(vec![message.into()])
  }

  /// Failure carrying every collected message (validation errors)
  pub fn failures(messages: Vec<String>) -> Self {
    Outcome::Failure(messages)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, Outcome::Success(_))
  }

  pub fn is_failure(&self) -> bool {
    !self.is_success()
  }

  pub fn value(&self) -> Option<&T> {
    match self {
      Outcome::Success(value) => Some(value),
      Outcome::Failure(_) => None,
    }
  }

  /// Error messages, empty on success
  pub fn errors(&self) -> &[String] {
    match self {
      Outcome::Success(_) => &[],
      Outcome::Failure(errors) => errors,
    }
  }

  pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
    match self {
      Outcome::Success(value) => Outcome::Success(f(value)),
      Outcome::Failure(errors) => Outcome::Failure(errors),
    }
  }

  pub fn and_then<U, F: FnOnce(T) -> Outcome<U>>(self, f: F) -> Outcome<U> {
    match self {
      Outcome::Success(value) => f(value),
      Outcome::Failure(errors) => Outcome::Failure(errors),
    }
  }

  pub fn into_result(self) -> Result<T, Vec<String>> {
    match self {
      Outcome::Success(value) => Ok(value),
      Outcome::Failure(errors) => Err(errors),
    }
  }
}

impl<T> From<Result<T, String>> for Outcome<T> {
  fn from(result: Result<T, String>) -> Self {
    match result {
      Ok(value) => Outcome::Success(value),
      Err(message) => Outcome::failure(message),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_map_and_chain_success() {
    let outcome = Outcome::success(4)
      .map(|n| n * 2)
      .and_then(|n| if n > 5 { Outcome::success(n) } else { Outcome::failure("too small") });

    assert!(outcome.is_success());
    assert_eq!(outcome.value(), Some(&8));
    assert!(outcome.errors().is_empty());
  }

  #[test]
  fn test_failure_short_circuits_chain() {
    let mut called = false;
    let outcome: Outcome<i32> = Outcome::failures(vec!["a".to_string(), "b".to_string()])
      .and_then(|n: i32| {
        called = true;
        Outcome::success(n)
      });

    assert!(!called);
    assert!(outcome.is_failure());
    assert_eq!(outcome.errors(), ["a".to_string(), "b".to_string()]);
  }

  #[test]
  fn test_from_result() {
    let ok: Outcome<u8> = Ok(1).into();
    let err: Outcome<u8> = Err("nope".to_string()).into();

    assert_eq!(ok.into_result(), Ok(1));
    assert_eq!(err.into_result(), Err(vec!["nope".to_string()]));
  }

  #[test]
  fn test_serializes_with_status_tag() {
    let json = serde_json::to_value(Outcome::<u8>::failure("bad input")).unwrap();
    assert_eq!(json["status"], "failure");
    assert_eq!(json["data"][0], "bad input");

    let json = serde_json::to_value(Outcome::success(3u8)).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"], 3);
  }
}
