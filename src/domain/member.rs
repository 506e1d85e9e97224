use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MemberId, ValidationError, errors::require};

/// 会員
///
/// 退会は削除ではなく`is_active`フラグで表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub membership_date: DateTime<Utc>,
    pub is_active: bool,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 会員情報の検証
///
/// ビジネスルール：
/// - 姓・名・メールアドレスは必須
/// - メールアドレスは`@`と`.`を両方含む
pub fn validate_member_fields(
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<(), ValidationError> {
    require("first_name", first_name)?;
    require("last_name", last_name)?;
    require("email", email)?;
    if !email.contains('@') || !email.contains('.') {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_joins_first_and_last() {
        let now = Utc::now();
        let member = Member {
            id: MemberId::new(1),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            address: None,
            membership_date: now,
            is_active: true,
            created_at: now,
            updated_at: None,
        };
        assert_eq!(member.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_validate_member_fields_accepts_valid_input() {
        assert!(validate_member_fields("Ada", "Lovelace", "ada@example.com").is_ok());
    }

    #[test]
    fn test_validate_member_fields_requires_names() {
        assert_eq!(
            validate_member_fields(" ", "Lovelace", "ada@example.com"),
            Err(ValidationError::EmptyField("first_name"))
        );
        assert_eq!(
            validate_member_fields("Ada", "", "ada@example.com"),
            Err(ValidationError::EmptyField("last_name"))
        );
        assert_eq!(
            validate_member_fields("Ada", "Lovelace", ""),
            Err(ValidationError::EmptyField("email"))
        );
    }

    #[test]
    fn test_validate_member_fields_requires_at_and_dot() {
        for email in ["ada.example.com", "ada@example", "ada"] {
            assert_eq!(
                validate_member_fields("Ada", "Lovelace", email),
                Err(ValidationError::InvalidEmail(email.to_string()))
            );
        }
    }
}
