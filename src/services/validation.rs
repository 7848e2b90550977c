use crate::database::entities::TShirtSize;
use crate::errors::{CoreError, CoreResult};

const MAX_TITLE_LENGTH: usize = 255;
const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Input checks that run before any storage access.
pub struct ValidationService;

impl ValidationService {
    /// Parse a client-supplied identifier such as a path segment.
    pub fn parse_id(raw: &str, entity: &str) -> CoreResult<i32> {
        raw.trim()
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| CoreError::invalid_argument(format!("Invalid {} ID '{}'", entity, raw)))
    }

    pub fn require_id(id: i32, entity: &str) -> CoreResult<i32> {
        if id > 0 {
            Ok(id)
        } else {
            Err(CoreError::invalid_argument(format!(
                "Invalid {} ID '{}'",
                entity, id
            )))
        }
    }

    /// Trimmed, non-empty, bounded title or name.
    pub fn validate_title(field: &str, value: &str) -> CoreResult<String> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(CoreError::invalid_argument(format!("{} cannot be empty", field)));
        }

        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            return Err(CoreError::invalid_argument(format!(
                "{} is too long (max {} characters)",
                field, MAX_TITLE_LENGTH
            )));
        }

        Ok(trimmed.to_string())
    }

    /// Blank descriptions are stored as null.
    pub fn validate_description(value: Option<&str>) -> CoreResult<Option<String>> {
        let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(CoreError::invalid_argument(format!(
                "Description is too long (max {} characters)",
                MAX_DESCRIPTION_LENGTH
            )));
        }

        Ok(Some(trimmed.to_string()))
    }

    /// Effort figures must be finite and non-negative.
    pub fn validate_amount(field: &str, value: f64) -> CoreResult<f64> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(CoreError::invalid_argument(format!(
                "{} must be a non-negative number",
                field
            )))
        }
    }

    pub fn validate_optional_amount(field: &str, value: Option<f64>) -> CoreResult<Option<f64>> {
        value
            .map(|v| Self::validate_amount(field, v))
            .transpose()
    }

    pub fn parse_t_shirt_size(value: Option<&str>) -> CoreResult<Option<TShirtSize>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<TShirtSize>()
                .map(Some)
                .map_err(CoreError::invalid_argument),
        }
    }

    /// Deletion is refused while anything still references the row.
    pub fn ensure_no_dependents(entity: &str, dependents: &[(&str, u64)]) -> CoreResult<()> {
        let blocking: Vec<String> = dependents
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, count)| format!("{} {}", count, name))
            .collect();

        if blocking.is_empty() {
            Ok(())
        } else {
            Err(CoreError::conflict(format!(
                "Cannot delete {}: still referenced by {}",
                entity,
                blocking.join(", ")
            )))
        }
    }
}
