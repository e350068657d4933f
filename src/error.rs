//! Error types for engine construction and configuration
//!
//! The tick itself never fails. Errors only come from host-supplied geometry
//! and tuning, which are checked before they can reach simulation state.

use std::fmt;

/// Top-level error enum for the simulation core
#[derive(Debug)]
pub enum SimError {
    /// Play area has a zero, negative or non-finite dimension
    InvalidPlayArea {
        width: f32,
        height: f32,
    },

    /// A tuning value is outside the range the simulation can handle
    InvalidTuning {
        /// Field name (for logging)
        name: &'static str,
        /// The rejected value
        value: f64,
        /// Human-readable description of the accepted range
        expected: &'static str,
    },

    /// Level director was built without any layout
    NoLevels,

    /// A level pattern row is wider than the brick grid or the grid has too many rows
    PatternTooLarge {
        level: usize,
        cols: usize,
        rows: usize,
    },

    /// A layout has no bricks, so it would count as cleared the moment it loads
    EmptyLevel {
        level: usize,
    },

    /// Level director grid differs from the tuning grid
    GridMismatch {
        levels: (usize, usize),
        grid: (usize, usize),
    },

    /// Tuning JSON could not be parsed
    TuningParse(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidPlayArea { width, height } => write!(
                f,
                "invalid play area {}x{}: both dimensions must be finite and positive",
                width, height
            ),
            SimError::InvalidTuning {
                name,
                value,
                expected,
            } => write!(f, "tuning '{}' = {} is outside {}", name, value, expected),
            SimError::NoLevels => write!(f, "level director needs at least one layout"),
            SimError::PatternTooLarge { level, cols, rows } => write!(
                f,
                "level {} pattern does not fit a {}x{} brick grid",
                level + 1,
                cols,
                rows
            ),
            SimError::EmptyLevel { level } => write!(f, "level {} has no bricks", level + 1),
            SimError::GridMismatch { levels, grid } => write!(
                f,
                "levels are laid out on a {}x{} grid but tuning asks for {}x{}",
                levels.0, levels.1, grid.0, grid.1
            ),
            SimError::TuningParse(e) => write!(f, "failed to parse tuning: {}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::TuningParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::TuningParse(e)
    }
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_field() {
        let err = SimError::InvalidTuning {
            name: "powerup_chance",
            value: 2.0,
            expected: "[0, 1]",
        };
        let msg = err.to_string();
        assert!(msg.contains("powerup_chance"));
        assert!(msg.contains("[0, 1]"));
    }

    #[test]
    fn test_parse_error_has_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SimError::from(parse);
        assert!(std::error::Error::source(&err).is_some());
    }
}
