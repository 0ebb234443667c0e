//! Water-quality threshold evaluator.
//!
//! Checks one [`WaterReading`] against the fixed shrimp-farming limits and
//! produces an ordered list of human-readable issues. Pure and synchronous:
//! no I/O, no shared state, safe to call from any handler or task.

use std::fmt;

use serde::Serialize;

use crate::WaterReading;

// ---

/// Message carried by a reading with no violations.
pub const ALL_NORMAL: &str = "Water quality is within normal range";

/// Message carried when there is no reading to evaluate.
pub const NO_DATA: &str = "No water-quality data available";

/// Measured parameters, in evaluation (and report) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Salinity,
    Ph,
    DissolvedOxygen,
    Nitrogen,
    HydrogenSulfide,
    Bod,
    Temperature,
}

impl Parameter {
    // ---
    pub fn label(self) -> &'static str {
        match self {
            Parameter::Salinity => "Salinity",
            Parameter::Ph => "pH",
            Parameter::DissolvedOxygen => "Dissolved oxygen",
            Parameter::Nitrogen => "Nitrogen",
            Parameter::HydrogenSulfide => "Hydrogen sulfide",
            Parameter::Bod => "BOD",
            Parameter::Temperature => "Temperature",
        }
    }

    /// Unit suffix, empty for unitless pH.
    pub fn unit(self) -> &'static str {
        match self {
            Parameter::Salinity => "ppt",
            Parameter::Ph => "",
            Parameter::Temperature => "°C",
            _ => "mg/L",
        }
    }

    /// The reading's value for this parameter, if it was measured.
    pub fn value_of(self, reading: &WaterReading) -> Option<f64> {
        let value = match self {
            Parameter::Salinity => reading.salinity,
            Parameter::Ph => reading.ph,
            Parameter::DissolvedOxygen => reading.dissolved_oxygen,
            Parameter::Nitrogen => reading.nitrogen,
            Parameter::HydrogenSulfide => reading.hydrogen_sulfide,
            Parameter::Bod => reading.bod,
            Parameter::Temperature => reading.temperature,
        };
        value.filter(|v| v.is_finite())
    }
}

/// Acceptable region for one parameter. All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Range { min: f64, max: f64 },
    AtLeast(f64),
    AtMost(f64),
}

impl Bound {
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            Bound::Range { min, max } => (min..=max).contains(&value),
            Bound::AtLeast(min) => value >= min,
            Bound::AtMost(max) => value <= max,
        }
    }
}

/// Static limit for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    pub parameter: Parameter,
    pub bound: Bound,
}

/// Fixed limits for giant freshwater prawn ponds.
///
/// BOD uses a single 20 mg/L ceiling everywhere.
pub const RULES: [ThresholdRule; 7] = [
    ThresholdRule {
        parameter: Parameter::Salinity,
        bound: Bound::Range { min: 5.0, max: 25.0 },
    },
    ThresholdRule {
        parameter: Parameter::Ph,
        bound: Bound::Range { min: 7.5, max: 8.5 },
    },
    ThresholdRule {
        parameter: Parameter::DissolvedOxygen,
        bound: Bound::AtLeast(4.0),
    },
    ThresholdRule {
        parameter: Parameter::Nitrogen,
        bound: Bound::AtMost(0.1),
    },
    ThresholdRule {
        parameter: Parameter::HydrogenSulfide,
        bound: Bound::AtMost(0.003),
    },
    ThresholdRule {
        parameter: Parameter::Bod,
        bound: Bound::AtMost(20.0),
    },
    ThresholdRule {
        parameter: Parameter::Temperature,
        bound: Bound::Range { min: 26.0, max: 32.0 },
    },
];

/// A measured value that falls outside its rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    pub rule: ThresholdRule,
    pub value: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ---
        let p = self.rule.parameter;
        let unit = with_space(p.unit());
        match self.rule.bound {
            Bound::Range { min, max } => write!(
                f,
                "{} ({}{unit}) is outside the acceptable range {min} - {max}{unit}",
                p.label(),
                self.value
            ),
            Bound::AtLeast(min) => write!(
                f,
                "{} ({}{unit}) is below the minimum of {min}{unit}",
                p.label(),
                self.value
            ),
            Bound::AtMost(max) => write!(
                f,
                "{} ({}{unit}) is above the maximum of {max}{unit}",
                p.label(),
                self.value
            ),
        }
    }
}

fn with_space(unit: &str) -> String {
    if unit.is_empty() {
        String::new()
    } else {
        format!(" {unit}")
    }
}

/// Verdict for one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    // ---
    pub is_suitable: bool,

    /// Violations in rule order, or the single [`ALL_NORMAL`] message.
    pub issues: Vec<String>,

    /// Parameters skipped because the reading did not carry them.
    pub not_evaluated: Vec<Parameter>,
}

impl EvaluationResult {
    /// Result used when there is no reading at all.
    pub fn no_data() -> Self {
        Self {
            is_suitable: false,
            issues: vec![NO_DATA.to_string()],
            not_evaluated: RULES.iter().map(|r| r.parameter).collect(),
        }
    }
}

/// Check every rule against the reading, in table order.
pub fn violations(reading: &WaterReading) -> Vec<Violation> {
    // ---
    RULES
        .iter()
        .filter_map(|rule| {
            let value = rule.parameter.value_of(reading)?;
            (!rule.bound.admits(value)).then_some(Violation { rule: *rule, value })
        })
        .collect()
}

/// Evaluate a reading against [`RULES`].
///
/// Missing parameters are reported in `not_evaluated` and never count as a
/// violation.
pub fn evaluate(reading: &WaterReading) -> EvaluationResult {
    // ---
    let found = violations(reading);
    let not_evaluated = RULES
        .iter()
        .map(|r| r.parameter)
        .filter(|p| p.value_of(reading).is_none())
        .collect();

    let is_suitable = found.is_empty();
    let issues = if is_suitable {
        vec![ALL_NORMAL.to_string()]
    } else {
        found.iter().map(ToString::to_string).collect()
    };

    EvaluationResult {
        is_suitable,
        issues,
        not_evaluated,
    }
}
