//! Leaf input descriptors: the closed set of input kinds and their validation.

use crate::{Color, Value, error::ValidationError};

/// Kind of input widget, with kind-specific constraints.
#[derive(Clone, Debug, PartialEq)]
pub enum InputKind {
    /// Numeric slider or field.
    Number {
        /// Inclusive lower bound.
        min: Option<f64>,
        /// Inclusive upper bound.
        max: Option<f64>,
        /// Suggested increment for the widget.
        step: Option<f64>,
    },
    /// Checkbox.
    Boolean,
    /// Free text.
    Text,
    /// Color picker. Text writes are parsed as colors.
    Color,
    /// Fixed-dimension numeric vector.
    Vector {
        /// Number of components, fixed by the declared value.
        dims: usize,
        /// Inclusive lower bound for every component.
        min: Option<f64>,
        /// Inclusive upper bound for every component.
        max: Option<f64>,
    },
    /// One value out of a fixed list.
    Select {
        /// Allowed values.
        options: Vec<Value>,
    },
    /// Two-component `[lo, hi]` range inside `[min, max]`.
    Interval {
        /// Lowest permitted `lo`.
        min: f64,
        /// Highest permitted `hi`.
        max: f64,
    },
    /// Push button. Carries no value.
    Button,
}

impl InputKind {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Color => "color",
            Self::Vector { .. } => "vector",
            Self::Select { .. } => "select",
            Self::Interval { .. } => "interval",
            Self::Button => "button",
        }
    }

    /// Check that a value fits this kind, coercing where the kind allows.
    pub fn sanitize(&self, value: Value) -> Result<Value, ValidationError> {
        match (self, value) {
            (Self::Number { min, max, .. }, Value::Number(n)) => {
                check_number(n, *min, *max)?;
                Ok(Value::Number(n))
            }
            (Self::Boolean, v @ Value::Bool(_)) | (Self::Text, v @ Value::Text(_)) => Ok(v),
            (Self::Color, v @ Value::Color(_)) => Ok(v),
            (Self::Color, Value::Text(s)) => Color::parse(&s)
                .map(Value::Color)
                .ok_or(ValidationError::InvalidColor(s)),
            (Self::Vector { dims, min, max }, Value::Vector(v)) => {
                if v.len() != *dims {
                    return Err(ValidationError::WrongDimension {
                        expected: *dims,
                        found: v.len(),
                    });
                }
                for x in &v {
                    check_number(*x, *min, *max)?;
                }
                Ok(Value::Vector(v))
            }
            (Self::Select { options }, v) => {
                if options.contains(&v) {
                    Ok(v)
                } else {
                    Err(ValidationError::NotAnOption(v.to_string()))
                }
            }
            (Self::Interval { min, max }, Value::Vector(v)) => {
                let &[lo, hi] = v.as_slice() else {
                    return Err(ValidationError::WrongDimension {
                        expected: 2,
                        found: v.len(),
                    });
                };
                check_number(lo, Some(*min), Some(*max))?;
                check_number(hi, Some(*min), Some(*max))?;
                if lo > hi {
                    return Err(ValidationError::ReversedInterval { lo, hi });
                }
                Ok(Value::Vector(v))
            }
            (Self::Button, Value::Unit) => Ok(Value::Unit),
            (kind, v) => Err(ValidationError::TypeMismatch {
                expected: kind.expected(),
                found: v.type_name(),
            }),
        }
    }

    /// Describe contradictory constraints, if any.
    pub fn constraint_problem(&self) -> Option<String> {
        match self {
            Self::Number { min, max, step } => {
                if let (Some(lo), Some(hi)) = (min, max)
                    && lo > hi
                {
                    return Some(format!("min {} exceeds max {}", lo, hi));
                }
                match step {
                    Some(s) if s.is_nan() || *s <= 0.0 => Some(format!("step {} is not positive", s)),
                    _ => None,
                }
            }
            Self::Vector { dims, min, max } => {
                if *dims == 0 {
                    return Some("vector has no components".to_string());
                }
                match (min, max) {
                    (Some(lo), Some(hi)) if lo > hi => {
                        Some(format!("min {} exceeds max {}", lo, hi))
                    }
                    _ => None,
                }
            }
            Self::Select { options } if options.is_empty() => {
                Some("select has no options".to_string())
            }
            Self::Interval { min, max } if min > max => {
                Some(format!("min {} exceeds max {}", min, max))
            }
            _ => None,
        }
    }

    /// Value variant name this kind accepts, for mismatch errors.
    fn expected(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Color => "color",
            Self::Vector { .. } | Self::Interval { .. } => "vector",
            Self::Select { .. } => "option",
            Self::Button => "unit",
        }
    }
}

/// Range check shared by numeric kinds.
fn check_number(n: f64, min: Option<f64>, max: Option<f64>) -> Result<(), ValidationError> {
    if !n.is_finite() {
        return Err(ValidationError::NotFinite(n));
    }
    let below = min.is_some_and(|lo| n < lo);
    let above = max.is_some_and(|hi| n > hi);
    if below || above {
        return Err(ValidationError::OutOfRange { value: n, min, max });
    }
    Ok(())
}

/// Presentation and write-access settings of one input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSettings {
    /// Display label; the input's name is used when absent.
    pub label: Option<String>,
    /// Tooltip text.
    pub hint: Option<String>,
    /// Sort key among siblings (stable; default 0).
    pub order: i32,
    /// Value is derived by its owner; user writes are rejected.
    pub readonly: bool,
    /// Widget is shown greyed out.
    pub disabled: bool,
}

/// Leaf descriptor: an input kind, its declared value and its settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Input {
    /// Kind and constraints.
    pub kind: InputKind,
    /// Declared initial value.
    pub value: Value,
    /// Presentation settings.
    pub settings: InputSettings,
}

impl Input {
    /// Build an input from a kind and initial value with default settings.
    pub fn new(kind: InputKind, value: Value) -> Self {
        Self {
            kind,
            value,
            settings: InputSettings::default(),
        }
    }

    /// Unbounded number.
    pub fn number(value: f64) -> Self {
        Self::new(
            InputKind::Number {
                min: None,
                max: None,
                step: None,
            },
            Value::Number(value),
        )
    }

    /// Checkbox.
    pub fn boolean(value: bool) -> Self {
        Self::new(InputKind::Boolean, Value::Bool(value))
    }

    /// Free text.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(InputKind::Text, Value::Text(value.into()))
    }

    /// Color picker.
    pub fn color(value: Color) -> Self {
        Self::new(InputKind::Color, Value::Color(value))
    }

    /// Vector whose dimension is fixed by `value`.
    pub fn vector(value: Vec<f64>) -> Self {
        Self::new(
            InputKind::Vector {
                dims: value.len(),
                min: None,
                max: None,
            },
            Value::Vector(value),
        )
    }

    /// Select among `options`, starting at `value`.
    pub fn select(value: impl Into<Value>, options: Vec<Value>) -> Self {
        Self::new(InputKind::Select { options }, value.into())
    }

    /// Interval `[lo, hi]` constrained to `[min, max]`.
    pub fn interval(lo: f64, hi: f64, min: f64, max: f64) -> Self {
        Self::new(InputKind::Interval { min, max }, Value::Vector(vec![lo, hi]))
    }

    /// Push button.
    pub fn button() -> Self {
        Self::new(InputKind::Button, Value::Unit)
    }

    /// Pick a kind from the shape of a plain value.
    ///
    /// Text beginning with `#` that parses as a color becomes a color input.
    pub fn infer(value: Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(Self::boolean(b)),
            Value::Number(n) => Ok(Self::number(n)),
            Value::Color(c) => Ok(Self::color(c)),
            Value::Text(s) => match s.starts_with('#').then(|| Color::parse(&s)).flatten() {
                Some(c) => Ok(Self::color(c)),
                None => Ok(Self::text(s)),
            },
            Value::Vector(v) if !v.is_empty() => Ok(Self::vector(v)),
            Value::Vector(_) => Err("cannot infer an input from an empty list".to_string()),
            Value::Unit => Err("cannot infer an input from ()".to_string()),
        }
    }

    /// Set the lower bound of a number or vector input.
    #[must_use]
    pub fn min(mut self, bound: f64) -> Self {
        match &mut self.kind {
            InputKind::Number { min, .. } | InputKind::Vector { min, .. } => *min = Some(bound),
            _ => {}
        }
        self
    }

    /// Set the upper bound of a number or vector input.
    #[must_use]
    pub fn max(mut self, bound: f64) -> Self {
        match &mut self.kind {
            InputKind::Number { max, .. } | InputKind::Vector { max, .. } => *max = Some(bound),
            _ => {}
        }
        self
    }

    /// Set the step of a number input.
    #[must_use]
    pub fn step(mut self, increment: f64) -> Self {
        if let InputKind::Number { step, .. } = &mut self.kind {
            *step = Some(increment);
        }
        self
    }

    /// Set the display label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.settings.label = Some(label.into());
        self
    }

    /// Set the tooltip.
    #[must_use]
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.settings.hint = Some(hint.into());
        self
    }

    /// Set the sibling sort key.
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.settings.order = order;
        self
    }

    /// Mark the input as derived: user writes are rejected.
    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.settings.readonly = true;
        self
    }

    /// Show the widget greyed out.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.settings.disabled = true;
        self
    }

    /// Validate and coerce a value against this input's kind.
    pub fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        self.kind.sanitize(value)
    }

    /// False for buttons, which never appear in consumer values.
    pub fn has_value(&self) -> bool {
        !matches!(self.kind, InputKind::Button)
    }
}
