//! Integer value held inside a movable `[min, max]` window.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which bound a rejected update targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

/// A bound update that would leave `min > max`.
///
/// State is never modified when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRangeError {
    pub bound: Bound,
    /// The value that was asked for.
    pub requested: i64,
    /// The opposite bound it collided with.
    pub limit: i64,
}

impl fmt::Display for InvalidRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bound {
            Bound::Min => write!(f, "setting min > max ({} > {})", self.requested, self.limit),
            Bound::Max => write!(f, "setting max < min ({} < {})", self.requested, self.limit),
        }
    }
}

impl std::error::Error for InvalidRangeError {}

/// Construction defaults for a range-valued control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDefaults {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

/// Defaults shared by plain ranges and rotary encoders.
pub const DEFAULT_RANGE: RangeDefaults = RangeDefaults { value: 0, min: 0, max: 100 };

/// An integer that always satisfies `min <= value <= max`.
///
/// Each setter checks only against the two other fields as they currently are.
/// `set_min` and `set_max` drag `value` along when the window moves past it;
/// `set_value` never touches the bounds. Moving both bounds at once should go
/// through [`BoundedRange::set_bounds`], since two sequential setters can be
/// rejected for a disjoint move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct BoundedRange {
    value: i64,
    min: i64,
    max: i64,
}

/// Unvalidated wire form; missing fields take [`DEFAULT_RANGE`].
#[derive(Deserialize)]
struct RawRange {
    value: Option<i64>,
    min: Option<i64>,
    max: Option<i64>,
}

impl TryFrom<RawRange> for BoundedRange {
    type Error = InvalidRangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        BoundedRange::with_defaults(DEFAULT_RANGE, raw.value, raw.min, raw.max)
    }
}

impl Default for BoundedRange {
    fn default() -> Self {
        let d = DEFAULT_RANGE;
        Self { value: d.value, min: d.min, max: d.max }
    }
}

impl BoundedRange {
    /// Build a range, clamping `value` into `[min, max]`.
    pub fn new(value: i64, min: i64, max: i64) -> Result<Self, InvalidRangeError> {
        Self::with_defaults(DEFAULT_RANGE, Some(value), Some(min), Some(max))
    }

    /// Build a range from optional fields, falling back to `defaults`.
    ///
    /// Bounds are installed together first, then the value is clamped, so a
    /// starting value outside the window is accepted and pulled inside.
    pub fn with_defaults(
        defaults: RangeDefaults,
        value: Option<i64>,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Self, InvalidRangeError> {
        let mut range = Self { value: defaults.value, min: defaults.min, max: defaults.max };
        range.set_bounds(min.unwrap_or(defaults.min), max.unwrap_or(defaults.max))?;
        range.set_value(value.unwrap_or(defaults.value));
        Ok(range)
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// The value `set_value(value)` would store.
    pub fn clamp(&self, value: i64) -> i64 {
        value.min(self.max).max(self.min)
    }

    /// Store `value`, clamped into the window.
    pub fn set_value(&mut self, value: i64) {
        self.value = self.clamp(value);
    }

    /// Move the lower bound. Raises `value` if it would fall below the new bound.
    pub fn set_min(&mut self, min: i64) -> Result<(), InvalidRangeError> {
        if min > self.max {
            return Err(InvalidRangeError { bound: Bound::Min, requested: min, limit: self.max });
        }
        if min > self.value {
            self.value = min;
        }
        self.min = min;
        Ok(())
    }

    /// Move the upper bound. Lowers `value` if it would rise above the new bound.
    pub fn set_max(&mut self, max: i64) -> Result<(), InvalidRangeError> {
        if max < self.min {
            return Err(InvalidRangeError { bound: Bound::Max, requested: max, limit: self.min });
        }
        if max < self.value {
            self.value = max;
        }
        self.max = max;
        Ok(())
    }

    /// Replace both bounds in one step, then clamp `value` into them.
    pub fn set_bounds(&mut self, min: i64, max: i64) -> Result<(), InvalidRangeError> {
        if min > max {
            return Err(InvalidRangeError { bound: Bound::Min, requested: min, limit: max });
        }
        self.min = min;
        self.max = max;
        self.value = self.clamp(self.value);
        Ok(())
    }

    /// Move `value` by `delta` steps, stopping at the bounds.
    pub fn nudge(&mut self, delta: i64) {
        self.set_value(self.value.saturating_add(delta));
    }

    /// Position of `value` within the window, from 0.0 at `min` to 1.0 at `max`.
    pub fn normalized(&self) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        let offset = i128::from(self.value) - i128::from(self.min);
        let span = i128::from(self.max) - i128::from(self.min);
        offset as f64 / span as f64
    }
}

/// Shared accessors for controls that wrap a [`BoundedRange`].
pub trait RangeControl {
    fn range(&self) -> &BoundedRange;
    fn range_mut(&mut self) -> &mut BoundedRange;

    fn value(&self) -> i64 {
        self.range().value()
    }

    fn min(&self) -> i64 {
        self.range().min()
    }

    fn max(&self) -> i64 {
        self.range().max()
    }

    fn set_value(&mut self, value: i64) {
        self.range_mut().set_value(value)
    }

    fn set_min(&mut self, min: i64) -> Result<(), InvalidRangeError> {
        self.range_mut().set_min(min)
    }

    fn set_max(&mut self, max: i64) -> Result<(), InvalidRangeError> {
        self.range_mut().set_max(max)
    }

    fn set_bounds(&mut self, min: i64, max: i64) -> Result<(), InvalidRangeError> {
        self.range_mut().set_bounds(min, max)
    }
}

impl RangeControl for BoundedRange {
    fn range(&self) -> &BoundedRange {
        self
    }

    fn range_mut(&mut self) -> &mut BoundedRange {
        self
    }
}
