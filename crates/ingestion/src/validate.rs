//! Field rules
//!
//! Each column carries an ordered list of validators. Rules are checked in
//! insertion order and every failure of a row is reported, not just the first.

use std::str::FromStr;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::record::TrainingRecord;

/// One check on one cell; `Err` carries the message shown to the user
pub trait Validator: Send + Sync {
    fn check(&self, field: &str, value: Option<&str>) -> std::result::Result<(), String>;
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Cell must be present and non-blank, unless enforcement is off
#[derive(Debug, Clone, Copy)]
pub struct Required {
    pub enforce: bool,
}

impl Validator for Required {
    fn check(&self, field: &str, value: Option<&str>) -> std::result::Result<(), String> {
        if self.enforce && is_blank(value) {
            return Err(format!("The {field} field is required."));
        }
        Ok(())
    }
}

/// Non-blank cell must match a pattern
#[derive(Debug, Clone)]
pub struct RegexFormat {
    pattern: Regex,
}

impl RegexFormat {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Validator for RegexFormat {
    fn check(&self, field: &str, value: Option<&str>) -> std::result::Result<(), String> {
        match value {
            Some(v) if !v.trim().is_empty() && !self.pattern.is_match(v) => Err(format!(
                "The {field} field does not match the expected format."
            )),
            _ => Ok(()),
        }
    }
}

/// Non-blank cell must be a `MM/DD/YYYY` date
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormat;

impl Validator for DateFormat {
    fn check(&self, field: &str, value: Option<&str>) -> std::result::Result<(), String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() && NaiveDate::parse_from_str(v, "%m/%d/%Y").is_err() => {
                Err(format!("The {field} field is not a valid date."))
            }
            _ => Ok(()),
        }
    }
}

/// Money amount; `$` is ignored and blank passes
#[derive(Debug, Clone, Copy, Default)]
pub struct Currency;

impl Currency {
    fn parses(raw: &str) -> bool {
        let s = raw.replace('$', "");
        let s = s.trim();
        if s.is_empty() {
            return true;
        }
        if s.contains('_') {
            return false;
        }
        let s = s.replace(',', "");
        // trailing sign as in "5-"
        let s = match s.strip_suffix(['-', '+']) {
            Some(rest) => format!("{}{rest}", &s[rest.len()..]),
            None => s,
        };
        Decimal::from_str(&s).is_ok()
    }
}

impl Validator for Currency {
    fn check(&self, field: &str, value: Option<&str>) -> std::result::Result<(), String> {
        match value {
            Some(v) if !Self::parses(v) => Err(format!(
                "Field: [{field}] can not be parsed to a valid currency type."
            )),
            _ => Ok(()),
        }
    }
}

/// Select-list cell starting with its option code
///
/// The code is two digits when required fields are enforced, one or two
/// otherwise. Blank passes either way.
#[derive(Debug, Clone, Copy)]
pub struct SelectOption {
    pub required: bool,
}

impl Validator for SelectOption {
    fn check(&self, field: &str, value: Option<&str>) -> std::result::Result<(), String> {
        let Some(v) = value else {
            return Ok(());
        };
        if v.trim().is_empty() {
            return Ok(());
        }
        let digits = v.chars().take_while(char::is_ascii_digit).count();
        let min = if self.required { 2 } else { 1 };
        if digits >= min {
            Ok(())
        } else {
            Err(format!(
                "The {field} field could not be parsed to a valid Select Field."
            ))
        }
    }
}

/// Ordered column → validators table
#[derive(Default)]
pub struct FieldRules {
    rules: Vec<(String, Vec<Box<dyn Validator>>)>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator to `field`, after any already registered for it
    pub fn rule(mut self, field: &str, validator: impl Validator + 'static) -> Self {
        let boxed: Box<dyn Validator> = Box::new(validator);
        match self.rules.iter_mut().find(|(name, _)| name == field) {
            Some((_, list)) => list.push(boxed),
            None => self.rules.push((field.to_string(), vec![boxed])),
        }
        self
    }

    /// Number of registered validators across all fields
    pub fn len(&self) -> usize {
        self.rules.iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All failure messages for `record`, in rule order
    pub fn check(&self, record: &TrainingRecord) -> Vec<String> {
        self.rules
            .iter()
            .flat_map(|(field, list)| {
                let value = record.field(field);
                list.iter()
                    .filter_map(move |validator| validator.check(field, value).err())
            })
            .collect()
    }

    /// Rules for the transcript extract
    pub fn training_defaults(enforce_required: bool) -> Self {
        let required = Required {
            enforce: enforce_required,
        };
        Self::new()
            .rule("UserID", required)
            .rule("Title", required)
            .rule("Date", required)
            .rule("Date", DateFormat)
            .rule("Category", SelectOption {
                required: enforce_required,
            })
            .rule("Cost", Currency)
    }
}

impl std::fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.rules.iter().map(|(name, list)| (name, list.len())))
            .finish()
    }
}
