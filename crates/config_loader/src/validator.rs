//! 配置校验模块
//!
//! 校验规则：
//! - 字段范围 (validator derive)
//! - header_pattern 非空且可编译
//! - lock_path 指向文件而非目录

use contracts::{ContractError, ImporterConfig};
use regex::Regex;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// 校验 ImporterConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ImporterConfig) -> Result<(), ContractError> {
    config.validate().map_err(|e| first_violation("", &e))?;
    validate_header_pattern(config)?;
    validate_lock_path(config)?;
    Ok(())
}

/// Flatten the first derive failure into a dotted field path
fn first_violation(prefix: &str, errors: &ValidationErrors) -> ContractError {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(name, _)| name.to_string());

    for (name, kind) in fields {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let message = list
                    .first()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => format!("failed '{}' check", e.code),
                    })
                    .unwrap_or_else(|| "invalid value".to_string());
                return ContractError::config_validation(path, message);
            }
            ValidationErrorsKind::Struct(nested) => return first_violation(&path, nested),
            ValidationErrorsKind::List(items) => {
                if let Some((idx, nested)) = items.iter().next() {
                    return first_violation(&format!("{path}[{idx}]"), nested);
                }
            }
        }
    }
    ContractError::config_validation(prefix, "invalid configuration")
}

/// 校验表头正则
fn validate_header_pattern(config: &ImporterConfig) -> Result<(), ContractError> {
    let pattern = &config.import.header_pattern;
    if pattern.trim().is_empty() {
        return Err(ContractError::config_validation(
            "import.header_pattern",
            "header pattern cannot be blank",
        ));
    }
    Regex::new(pattern).map_err(|e| {
        ContractError::config_validation("import.header_pattern", format!("invalid regex: {e}"))
    })?;
    Ok(())
}

/// 校验锁文件路径
fn validate_lock_path(config: &ImporterConfig) -> Result<(), ContractError> {
    if let Some(path) = &config.file_sink.lock_path {
        if path.file_name().is_none() || path.is_dir() {
            return Err(ContractError::config_validation(
                "file_sink.lock_path",
                format!("'{}' is not a file path", path.display()),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&ImporterConfig::default()).is_ok());
    }

    #[test]
    fn test_timeout_out_of_range() {
        let mut config = ImporterConfig::default();
        config.file_sink.lock_timeout_secs = 100_000;

        let err = validate(&config).unwrap_err();
        match err {
            ContractError::ConfigValidation { field, .. } => {
                assert_eq!(field, "file_sink.lock_timeout_secs");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_header_pattern() {
        let mut config = ImporterConfig::default();
        config.import.header_pattern = "   ".into();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("import.header_pattern"));
    }

    #[test]
    fn test_uncompilable_header_pattern() {
        let mut config = ImporterConfig::default();
        config.import.header_pattern = "(UserID".into();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("invalid regex"));
    }

    #[test]
    fn test_lock_path_must_name_a_file() {
        let dir = std::env::temp_dir();
        let mut config = ImporterConfig::default();
        config.file_sink.lock_path = Some(dir);
        assert!(validate(&config).is_err());

        config.file_sink.lock_path = Some(PathBuf::from("/"));
        assert!(validate(&config).is_err());
    }
}
