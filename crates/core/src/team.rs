//! Team configuration entity.
//!
//! Teams are shared reference data maintained by admins. Projects point at a
//! team by `code`; display name and planner color live here and nowhere
//! else, so the UI looks them up instead of hard-coding literal maps.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a team code.
pub const MAX_CODE_LENGTH: usize = 32;

/// Maximum length of a team display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// A crew that can hold planner slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable key referenced by projects, e.g. `"team-a"`.
    pub code: String,
    /// Display name shown on the planner, e.g. `"Team A"`.
    pub name: String,
    /// Hex color (`#RRGGBB`) for the planner bars.
    pub color: String,
}

/// Validate a team code: non-empty, bounded, lowercase alphanumeric plus
/// `-`/`_` so it is safe in URLs and query strings.
pub fn validate_code(code: &str) -> Result<(), CoreError> {
    if code.is_empty() || code.len() > MAX_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Team code must be 1-{MAX_CODE_LENGTH} characters"
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Team code '{code}' may only contain lowercase letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// Validate a `#RRGGBB` hex color.
pub fn validate_color(color: &str) -> Result<(), CoreError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(CoreError::Validation(format!(
            "Team color '{color}' must be a #RRGGBB hex value"
        )));
    }
    Ok(())
}

/// Validate a full team definition.
pub fn validate_team(team: &Team) -> Result<(), CoreError> {
    validate_code(&team.code)?;
    if team.name.trim().is_empty() || team.name.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Team name must be 1-{MAX_NAME_LENGTH} characters"
        )));
    }
    validate_color(&team.color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn team(code: &str, name: &str, color: &str) -> Team {
        Team {
            code: code.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    #[test]
    fn valid_team_passes() {
        assert!(validate_team(&team("team-a", "Team A", "#3fa7d6")).is_ok());
    }

    #[test]
    fn uppercase_code_rejected() {
        assert_matches!(validate_code("Team-A"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_code_rejected() {
        assert_matches!(validate_code(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn bad_colors_rejected() {
        assert_matches!(validate_color("3fa7d6"), Err(CoreError::Validation(_)));
        assert_matches!(validate_color("#3fa7d"), Err(CoreError::Validation(_)));
        assert_matches!(validate_color("#3fa7dg"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_name_rejected() {
        assert_matches!(
            validate_team(&team("team-a", "   ", "#3fa7d6")),
            Err(CoreError::Validation(_))
        );
    }
}
