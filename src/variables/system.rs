//! Built-in functions: `{{$datetime}}`, `{{$guid}}`/`{{$uuid}}`,
//! `{{$processEnv}}` and `{{$randomInt}}`.
//!
//! A built-in placeholder is the function name followed by whitespace-separated
//! arguments. `$datetime` takes its format as a single argument even when a
//! quoted custom format contains spaces:
//!
//! ```text
//! {{$datetime iso8601}}
//! {{$datetime rfc1123 1 d}}
//! {{$datetime "dd MMM yyyy HH:mm" 2 h}}
//! {{$randomInt -5 5}}
//! {{$processEnv HOME}}
//! ```

use super::error::VarError;
use chrono::{DateTime, Duration, Months, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::env;
use uuid::Uuid;

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(iso8601|rfc1123|"[^"]+"|'[^']+')(?:\s+([-+]?\d+)\s+(\w+))?$"#)
        .expect("Failed to compile datetime regex")
});

/// The closed set of built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFunction {
    Datetime,
    Guid,
    ProcessEnv,
    RandomInt,
}

/// Dispatch table from placeholder name to function. `guid` and `uuid` are
/// aliases.
const BUILTINS: &[(&str, BuiltinFunction)] = &[
    ("datetime", BuiltinFunction::Datetime),
    ("guid", BuiltinFunction::Guid),
    ("uuid", BuiltinFunction::Guid),
    ("processEnv", BuiltinFunction::ProcessEnv),
    ("randomInt", BuiltinFunction::RandomInt),
];

impl BuiltinFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, function)| *function)
    }

    /// Runs the function against the raw argument text that followed its name.
    pub fn call(self, args: &str) -> Result<String, VarError> {
        match self {
            BuiltinFunction::Datetime => format_datetime(Utc::now(), args),
            BuiltinFunction::Guid => Ok(Uuid::new_v4().to_string()),
            BuiltinFunction::ProcessEnv => process_env(args),
            BuiltinFunction::RandomInt => random_int(args),
        }
    }
}

/// Evaluates a built-in placeholder body with the leading `$` removed,
/// e.g. `randomInt 1 10`.
///
/// # Examples
///
/// ```
/// use http_script::variables::system::evaluate;
///
/// let value: i64 = evaluate("randomInt 1 6").unwrap().parse().unwrap();
/// assert!((1..=6).contains(&value));
///
/// assert_eq!(evaluate("guid").unwrap().len(), 36);
/// assert_eq!(evaluate("nope").unwrap_err().to_string(), "not implemented: $nope");
/// ```
pub fn evaluate(expression: &str) -> Result<String, VarError> {
    let expression = expression.trim();
    let (name, args) = match expression.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (expression, ""),
    };

    let function =
        BuiltinFunction::from_name(name).ok_or_else(|| VarError::UnknownFunction(name.to_string()))?;

    log::trace!("evaluating ${} with arguments {:?}", name, args);
    function.call(args)
}

/// Formats `now`, optionally shifted, according to a `$datetime` argument
/// string.
pub fn format_datetime(now: DateTime<Utc>, args: &str) -> Result<String, VarError> {
    let captures = DATETIME_REGEX.captures(args.trim()).ok_or_else(|| {
        VarError::InvalidSyntax(format!(
            "datetime expects iso8601, rfc1123 or a quoted format, found \"{}\"",
            args
        ))
    })?;

    let instant = match (captures.get(2), captures.get(3)) {
        (Some(amount), Some(unit)) => apply_offset(now, amount.as_str(), unit.as_str())?,
        _ => now,
    };

    match &captures[1] {
        "iso8601" => Ok(instant.to_rfc3339_opts(SecondsFormat::Secs, true)),
        "rfc1123" => Ok(instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()),
        quoted => {
            let pattern = translate_format(&quoted[1..quoted.len() - 1])?;
            Ok(instant.format(&pattern).to_string())
        }
    }
}

/// Shifts `base` by `amount` units: `y`, `M`, `w`, `d`, `h`, `m` or `s`.
///
/// Years and months follow the calendar, clamping to the last day of shorter
/// months.
fn apply_offset(base: DateTime<Utc>, amount: &str, unit: &str) -> Result<DateTime<Utc>, VarError> {
    let out_of_range = || VarError::InvalidSyntax(format!("datetime offset out of range: {} {}", amount, unit));

    let amount: i64 = amount.parse().map_err(|_| out_of_range())?;

    let shifted = match unit {
        "y" | "M" => {
            let months = if unit == "y" {
                amount.checked_mul(12).ok_or_else(out_of_range)?
            } else {
                amount
            };
            let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| out_of_range())?;
            if months < 0 {
                base.checked_sub_months(Months::new(magnitude))
            } else {
                base.checked_add_months(Months::new(magnitude))
            }
        }
        "w" | "d" | "h" | "m" | "s" => {
            let delta = match unit {
                "w" => Duration::try_weeks(amount),
                "d" => Duration::try_days(amount),
                "h" => Duration::try_hours(amount),
                "m" => Duration::try_minutes(amount),
                _ => Duration::try_seconds(amount),
            }
            .ok_or_else(out_of_range)?;
            base.checked_add_signed(delta)
        }
        _ => {
            return Err(VarError::InvalidSyntax(format!(
                "unknown datetime unit \"{}\", expected one of y, M, w, d, h, m, s",
                unit
            )))
        }
    };

    shifted.ok_or_else(out_of_range)
}

/// Converts a Unicode-style date pattern (`yyyy-MM-dd HH:mm:ss`) into a
/// `strftime` pattern. Text inside single quotes is literal; `''` is a quote.
fn translate_format(pattern: &str) -> Result<String, VarError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&other| other == c).count();
        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('a', _) => "%p",
            ('X', 1) | ('x', 1) => "%z",
            ('X', _) | ('x', _) => "%:z",
            _ => {
                return Err(VarError::InvalidSyntax(format!(
                    "unsupported datetime pattern \"{}\"",
                    c.to_string().repeat(run)
                )))
            }
        };
        out.push_str(spec);
        i += run;
    }

    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Value of a process environment variable; empty when it is not set.
fn process_env(args: &str) -> Result<String, VarError> {
    let name = args
        .split_whitespace()
        .next()
        .ok_or_else(|| VarError::InvalidSyntax("processEnv requires a variable name".to_string()))?;

    Ok(env::var(name).unwrap_or_default())
}

/// Validates a base-10 integer literal with an optional leading `-`.
fn parse_integer(value: &str) -> Result<i64, VarError> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VarError::InvalidInteger(value.to_string()));
    }
    value
        .parse()
        .map_err(|_| VarError::InvalidInteger(value.to_string()))
}

/// Uniform integer in `[min, max]`. Missing bounds default to the `i64`
/// extrema.
fn random_int(args: &str) -> Result<String, VarError> {
    let mut bounds = args.split_whitespace();
    let min = bounds.next().map(parse_integer).transpose()?.unwrap_or(i64::MIN);
    let max = bounds.next().map(parse_integer).transpose()?.unwrap_or(i64::MAX);

    if min > max {
        return Err(VarError::InvalidRange { min, max });
    }

    let value = rand::thread_rng().gen_range(min..=max);
    Ok(value.to_string())
}
