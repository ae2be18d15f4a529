//! Coercion of raw cell values into display strings and numbers.

use serde_json::{Number, Value};

/// Text of a present, non-empty cell. `None` for missing, null, empty
/// strings and `false`, which all fall back to defaults during mapping.
pub fn value_text(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::Null | Value::Bool(false) => None,
		Value::String(s) if s.is_empty() => None,
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(number_text(n)),
		Value::Bool(true) => Some("true".to_string()),
		other => Some(other.to_string()),
	}
}

/// Number formatting that matches how the values read in a spreadsheet:
/// integral floats lose their trailing `.0`.
pub fn number_text(n: &Number) -> String {
	if let Some(i) = n.as_i64() {
		return i.to_string();
	}
	if let Some(u) = n.as_u64() {
		return u.to_string();
	}
	n.as_f64().map(float_text).unwrap_or_else(|| n.to_string())
}

pub fn float_text(f: f64) -> String {
	if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
		format!("{}", f as i64)
	} else {
		format!("{f}")
	}
}

/// Numeric reading of a cell: JSON numbers as-is, strings via
/// [`parse_leading_float`].
pub fn value_number(value: Option<&Value>) -> Option<f64> {
	match value? {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => parse_leading_float(s),
		_ => None,
	}
}

/// Parses the longest numeric prefix of `input`, like `parseFloat`:
/// `"12px"` is 12, `" -3.5e2 kg"` is -350, `"abc"` is `None`.
pub fn parse_leading_float(input: &str) -> Option<f64> {
	let s = input.trim_start();
	let bytes = s.as_bytes();
	let mut end = 0;

	if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
		end += 1;
	}
	if s[end..].starts_with("Infinity") {
		let sign = if s.starts_with('-') { -1.0 } else { 1.0 };
		return Some(sign * f64::INFINITY);
	}

	let int_start = end;
	while end < bytes.len() && bytes[end].is_ascii_digit() {
		end += 1;
	}
	let mut digits = end - int_start;

	if end < bytes.len() && bytes[end] == b'.' {
		let frac_start = end + 1;
		let mut frac_end = frac_start;
		while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
			frac_end += 1;
		}
		digits += frac_end - frac_start;
		if digits > 0 {
			end = frac_end;
		}
	}
	if digits == 0 {
		return None;
	}

	if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
		let mut exp_end = end + 1;
		if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
			exp_end += 1;
		}
		let exp_digits_start = exp_end;
		while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
			exp_end += 1;
		}
		if exp_end > exp_digits_start {
			end = exp_end;
		}
	}

	s[..end].parse::<f64>().ok()
}
