use crate::models::{ClassAssociation, MaterialClass};
use std::path::Path;
use thiserror::Error;

pub const MIN_TITLE_LEN: usize = 3;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Trimmed title, at least three characters long.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    let len = title.chars().count();
    if len < MIN_TITLE_LEN {
        return Err(ValidationError::new(
            "TITLE_TOO_SHORT",
            format!("Title must be at least {} characters.", MIN_TITLE_LEN),
        ));
    }
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::new(
            "TITLE_TOO_LONG",
            format!("Title must be at most {} characters.", MAX_TITLE_LEN),
        ));
    }
    Ok(title.to_string())
}

pub fn parse_class(class: &str) -> Result<MaterialClass, ValidationError> {
    let class = class.trim();
    if class.is_empty() {
        return Err(ValidationError::new("CLASS_REQUIRED", "Please select a class."));
    }
    class
        .parse()
        .map_err(|_| ValidationError::new("INVALID_CLASS", format!("Unknown class '{}'.", class)))
}

pub fn parse_class_association(value: &str) -> Result<ClassAssociation, ValidationError> {
    value.trim().parse().map_err(|_| {
        ValidationError::new(
            "INVALID_CLASS_ASSOCIATION",
            format!("Class association must be '10', '12' or 'both', got '{}'.", value),
        )
    })
}

pub fn validate_category_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(
            "CATEGORY_NAME_REQUIRED",
            "Category name cannot be empty.",
        ));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(ValidationError::new(
            "CATEGORY_NAME_TOO_LONG",
            format!(
                "Category name must be at most {} characters.",
                MAX_CATEGORY_NAME_LEN
            ),
        ));
    }
    Ok(name.to_string())
}

/// Form clients send the literal string "null" (or nothing) for "no category".
pub fn normalize_category_id(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && *v != "null")
        .map(str::to_string)
}

pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::new("FILE_REQUIRED", "File is required."));
    }
    if size > max_size {
        return Err(ValidationError::new(
            "FILE_TOO_LARGE",
            format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                max_size,
                max_size / 1024 / 1024
            ),
        ));
    }
    Ok(())
}

/// Sanitizes filename to prevent path traversal in storage keys
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    // Browsers on Windows may send the full client path
    let last = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let name = Path::new(last)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(ValidationError::new(
            "INVALID_FILENAME",
            "Filename cannot be empty",
        ));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components stripped from upload name: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
                || c == '#'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    let sanitized = sanitized.trim_start_matches('.').to_string();
    if sanitized.is_empty() {
        return Err(ValidationError::new(
            "INVALID_FILENAME",
            "Filename cannot be empty",
        ));
    }

    Ok(sanitized)
}

/// `{class}/{unix_millis}-{file_name}`: unique per upload, still readable in the bucket.
pub fn storage_key(class: MaterialClass, millis: i64, file_name: &str) -> String {
    format!("{}/{}-{}", class.as_str(), millis, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_rules() {
        assert_eq!(validate_title("  Notes A ").unwrap(), "Notes A");
        assert_eq!(validate_title("ab").unwrap_err().code, "TITLE_TOO_SHORT");
        assert_eq!(validate_title("   ab   ").unwrap_err().code, "TITLE_TOO_SHORT");
        assert!(validate_title("").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_parse_class() {
        assert_eq!(parse_class("12-arts").unwrap(), MaterialClass::TwelveArts);
        assert_eq!(parse_class("").unwrap_err().code, "CLASS_REQUIRED");
        assert_eq!(parse_class("9").unwrap_err().code, "INVALID_CLASS");
    }

    #[test]
    fn test_normalize_category_id() {
        assert_eq!(normalize_category_id(None), None);
        assert_eq!(normalize_category_id(Some("")), None);
        assert_eq!(normalize_category_id(Some("null")), None);
        assert_eq!(normalize_category_id(Some(" abc ")), Some("abc".to_string()));
    }

    #[test]
    fn test_file_size() {
        assert_eq!(validate_file_size(0, 10).unwrap_err().code, "FILE_REQUIRED");
        assert_eq!(validate_file_size(11, 10).unwrap_err().code, "FILE_TOO_LARGE");
        assert!(validate_file_size(10, 10).is_ok());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("notes.pdf").unwrap(), "notes.pdf");
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\Desktop\\paper.docx").unwrap(),
            "paper.docx"
        );
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("a:b?.pdf").unwrap(), "a_b_.pdf");
        assert_eq!(sanitize_filename(".hidden.pdf").unwrap(), "hidden.pdf");
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("dir/").is_err());
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(
            storage_key(MaterialClass::Ten, 1700000000000, "notes.pdf"),
            "10/1700000000000-notes.pdf"
        );
    }
}
