use crate::constants::MAX_PATTERN_LEN;
use crate::error::AppError;
use fancy_regex::Regex;

/// Split pattern text from the settings form into one pattern per line,
/// trimming whitespace and dropping blank lines.
pub fn normalize_patterns(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Return the patterns that do not compile as regular expressions.
pub fn invalid_patterns(patterns: &[String]) -> Vec<&str> {
    patterns
        .iter()
        .filter(|pattern| Regex::new(pattern).is_err())
        .map(String::as_str)
        .collect()
}

/// Validate exclusion patterns before they are saved.
pub fn validate_exclude_patterns(patterns: &[String]) -> Result<(), AppError> {
    if let Some(too_long) = patterns.iter().find(|p| p.chars().count() > MAX_PATTERN_LEN) {
        return Err(AppError::InvalidInput {
            field: "autoMaximizeExcludePatterns",
            reason: format!(
                "pattern '{}…' cannot exceed {MAX_PATTERN_LEN} characters",
                too_long.chars().take(20).collect::<String>()
            ),
        });
    }

    let invalid = invalid_patterns(patterns);
    if !invalid.is_empty() {
        return Err(AppError::InvalidInput {
            field: "autoMaximizeExcludePatterns",
            reason: format!("invalid regex pattern(s): {}", invalid.join(", ")),
        });
    }

    Ok(())
}
