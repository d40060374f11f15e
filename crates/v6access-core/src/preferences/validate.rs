//! Declarative validation of the well-known preference keys
//!
//! Each key is checked against its rules in order and stops at its first
//! failure; every failing key is reported.

use uuid::{Uuid, Variant, Version};

use super::{BOOL_FALSE, BOOL_TRUE, Preferences, keys};
use crate::error::{FieldError, ValidationErrors};

#[derive(Debug, Clone, Copy)]
enum Check {
    Uuid4,
    Len(usize),
    Hexadecimal,
    OneOf(&'static [&'static str]),
    Numeric,
}

impl Check {
    fn name(&self) -> &'static str {
        match self {
            Check::Uuid4 => "uuid4",
            Check::Len(_) => "len",
            Check::Hexadecimal => "hexadecimal",
            Check::OneOf(_) => "oneof",
            Check::Numeric => "numeric",
        }
    }

    /// Returns a failure detail, or `None` if `value` passes
    fn apply(&self, value: &str) -> Option<String> {
        match self {
            Check::Uuid4 => {
                let valid = value.len() == 36
                    && !value.chars().any(|c| c.is_ascii_uppercase())
                    && Uuid::parse_str(value).is_ok_and(|uuid| {
                        uuid.get_version() == Some(Version::Random)
                            && uuid.get_variant() == Variant::RFC4122
                    });
                (!valid).then(|| format!("'{}' is not a version 4 UUID", value))
            }
            Check::Len(expected) => {
                let actual = value.chars().count();
                (actual != *expected)
                    .then(|| format!("expected {} characters, got {}", expected, actual))
            }
            Check::Hexadecimal => (!value.chars().all(|c| c.is_ascii_hexdigit()))
                .then(|| "value is not hexadecimal".to_string()),
            Check::OneOf(allowed) => (!allowed.contains(&value))
                .then(|| format!("'{}' is not one of {}", value, allowed.join(", "))),
            Check::Numeric => {
                (!is_numeric(value)).then(|| format!("'{}' is not numeric", value))
            }
        }
    }
}

/// An optionally signed run of digits with an optional fractional part
fn is_numeric(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());

    digits(integer) && fraction.is_none_or(digits)
}

struct Rule {
    key: &'static str,
    required: bool,
    checks: &'static [Check],
}

const RULES: &[Rule] = &[
    Rule {
        key: keys::MACHINE_IDENTIFIER,
        required: true,
        checks: &[Check::Uuid4],
    },
    Rule {
        key: keys::PROCESSED_MACHINE_IDENTIFIER,
        required: true,
        checks: &[Check::Len(40), Check::Hexadecimal],
    },
    Rule {
        key: keys::ONLINE_TOKEN,
        required: true,
        checks: &[],
    },
    Rule {
        key: keys::MANUAL_PORT_MAPPING_MODE,
        required: true,
        checks: &[Check::OneOf(&[BOOL_FALSE, BOOL_TRUE])],
    },
    Rule {
        key: keys::MANUAL_PORT_MAPPING_PORT,
        required: false,
        checks: &[Check::Numeric],
    },
    Rule {
        key: keys::LAST_AUTOMATIC_MAPPED_PORT,
        required: false,
        checks: &[Check::Numeric],
    },
];

impl Preferences {
    /// Check the well-known keys, collecting every failing key
    ///
    /// Absent or empty values fail `required` keys and skip optional ones.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for rule in RULES {
            let value = match self.get(rule.key) {
                Some(value) if !value.is_empty() => value,
                Some(_) | None => {
                    if rule.required {
                        errors.push(FieldError {
                            key: rule.key.to_string(),
                            rule: "required",
                            detail: "value is missing or empty".to_string(),
                        });
                    }
                    continue;
                }
            };

            let failure = rule
                .checks
                .iter()
                .find_map(|check| check.apply(value).map(|detail| (check.name(), detail)));

            if let Some((name, detail)) = failure {
                errors.push(FieldError {
                    key: rule.key.to_string(),
                    rule: name,
                    detail,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
