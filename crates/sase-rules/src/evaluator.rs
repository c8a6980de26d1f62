//! Condition evaluation against a submission

use crate::condition::{Condition, ConditionGroup};
use crate::resolver::FieldResolver;
use sase_common::AtomicCounter;
use sase_forms::{display_value, ConditionalOperator, FieldConfig, SubmissionData};
use serde_json::Value;
use tracing::{trace, warn};

/// Evaluates condition trees through a [`FieldResolver`].
///
/// The resolver memoizes per key, so one evaluator can check every rule of a
/// submission without re-resolving shared fields.
pub struct ConditionEvaluator<'r, 'a> {
    resolver: &'r FieldResolver<'a>,
    invalid: AtomicCounter,
}

impl<'r, 'a> ConditionEvaluator<'r, 'a> {
    pub fn new(resolver: &'r FieldResolver<'a>) -> Self {
        Self {
            resolver,
            invalid: AtomicCounter::new(0),
        }
    }

    pub fn evaluate(&self, group: &ConditionGroup) -> bool {
        group.evaluate_with(&mut |condition: &Condition| self.evaluate_condition(condition))
    }

    pub fn evaluate_condition(&self, condition: &Condition) -> bool {
        if let Err(e) = condition.validate() {
            warn!(error = %e, operator = condition.operator.as_str(), "malformed condition");
            self.invalid.inc();
            return false;
        }

        let found = self.resolver.resolve_first(condition.lookup_keys());
        let Some(actual) = found.map(|r| r.value) else {
            trace!(stable_id = %condition.stable_id, "condition field not found");
            return false;
        };
        apply_operator(condition.operator, &actual, condition.expected())
    }

    /// Malformed conditions seen so far.
    pub fn invalid_count(&self) -> u64 {
        self.invalid.get()
    }
}

/// Evaluate a condition tree against one submission.
pub fn evaluate_group(group: &ConditionGroup, fields: &[FieldConfig], data: &SubmissionData) -> bool {
    let resolver = FieldResolver::new(fields, data);
    ConditionEvaluator::new(&resolver).evaluate(group)
}

/// Evaluate a single leaf condition against one submission.
pub fn evaluate_condition(
    condition: &Condition,
    fields: &[FieldConfig],
    data: &SubmissionData,
) -> bool {
    let resolver = FieldResolver::new(fields, data);
    ConditionEvaluator::new(&resolver).evaluate_condition(condition)
}

/// Compare a resolved value against a condition's expected value.
pub(crate) fn apply_operator(op: ConditionalOperator, actual: &Value, expected: &Value) -> bool {
    use ConditionalOperator::*;

    match op {
        Equals => actual == expected,
        NotEquals => actual != expected,
        Contains => contains(actual, expected) == Some(true),
        NotContains => contains(actual, expected) == Some(false),
        StartsWith => match (actual.as_str(), expected.as_str()) {
            (Some(a), Some(e)) => a.starts_with(e),
            _ => false,
        },
        EndsWith => match (actual.as_str(), expected.as_str()) {
            (Some(a), Some(e)) => a.ends_with(e),
            _ => false,
        },
        GreaterThan => compare_numbers(actual, expected, |a, e| a > e),
        LessThan => compare_numbers(actual, expected, |a, e| a < e),
        IsEmpty => is_empty(actual),
        IsNotEmpty => !is_empty(actual),
        Unknown => false,
    }
}

/// `None` when containment is undefined for the value's type.
fn contains(actual: &Value, expected: &Value) -> Option<bool> {
    match actual {
        Value::String(haystack) => match expected {
            Value::Null | Value::Array(_) | Value::Object(_) => None,
            needle => Some(haystack.contains(display_value(needle).as_str())),
        },
        Value::Array(items) => Some(items.contains(expected)),
        _ => None,
    }
}

fn compare_numbers(actual: &Value, expected: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    match (parse_float(actual), parse_float(expected)) {
        (Some(a), Some(e)) => cmp(a, e),
        _ => false,
    }
}

pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Numeric reading of a value: numbers as-is, strings by their longest
/// leading decimal literal (`"12px"` reads as 12).
pub(crate) fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }
}

fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let sign = if s.starts_with('-') { -1.0 } else { 1.0 };
        return Some(sign * f64::INFINITY);
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
