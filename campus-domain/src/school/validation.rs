use super::SchoolDraft;
use regex::Regex;

/// 校验结果，errors按字段顺序累积
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// School字段校验器
/// 正则在构造时编译一次，validate本身无副作用
pub struct SchoolValidator {
    contact_pattern: Regex,
    email_pattern: Regex,
}

impl SchoolValidator {
    pub fn new() -> Self {
        Self {
            // 10位印度手机号，首位6-9
            contact_pattern: Regex::new(r"^[6-9]\d{9}$").expect("invalid contact pattern"),
            email_pattern: Regex::new(r"^(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$")
                .expect("invalid email pattern"),
        }
    }

    /// 校验全部规则，错误累积而不是遇错即返
    /// 缺失字段视为对应规则不通过
    pub fn validate(&self, draft: &SchoolDraft) -> ValidationReport {
        let mut errors = Vec::new();

        if !min_trimmed_len(&draft.name, 2) {
            errors.push("School name must be at least 2 characters long".to_string());
        }

        if !min_trimmed_len(&draft.address, 10) {
            errors.push("Address must be at least 10 characters long".to_string());
        }

        if !min_trimmed_len(&draft.city, 2) {
            errors.push("City must be at least 2 characters long".to_string());
        }

        if !min_trimmed_len(&draft.state, 2) {
            errors.push("State must be at least 2 characters long".to_string());
        }

        if !matches_pattern(&draft.contact, &self.contact_pattern) {
            errors.push(
                "Please enter a valid 10-digit Indian mobile number starting with 6-9".to_string(),
            );
        }

        if !matches_pattern(&draft.email_id, &self.email_pattern) {
            errors.push("Please enter a valid email address".to_string());
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

impl Default for SchoolValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn min_trimmed_len(field: &Option<String>, min: usize) -> bool {
    field
        .as_deref()
        .is_some_and(|value| value.trim().chars().count() >= min)
}

fn matches_pattern(field: &Option<String>, pattern: &Regex) -> bool {
    field.as_deref().is_some_and(|value| pattern.is_match(value))
}
