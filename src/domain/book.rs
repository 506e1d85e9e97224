use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, ValidationError, errors::require};

/// 書籍 - 蔵書の1タイトル分
///
/// 不変条件：`0 <= available_copies <= total_copies`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: Option<i32>,
    pub genre: Option<String>,

    // 在庫
    pub total_copies: i32,
    pub available_copies: i32,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    /// 貸出可能な冊数が残っているか
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// 貸出中の冊数
    pub fn copies_on_loan(&self) -> i32 {
        self.total_copies - self.available_copies
    }

    /// 1冊を貸し出す。残りがなければ`None`
    pub fn take_copy(&self, at: DateTime<Utc>) -> Option<Book> {
        if !self.is_available() {
            return None;
        }
        Some(Book {
            available_copies: self.available_copies - 1,
            updated_at: Some(at),
            ..self.clone()
        })
    }

    /// 1冊を戻す。全冊が書架にあれば`None`（在庫の不整合）
    pub fn release_copy(&self, at: DateTime<Utc>) -> Option<Book> {
        if self.available_copies >= self.total_copies {
            return None;
        }
        Some(Book {
            available_copies: self.available_copies + 1,
            updated_at: Some(at),
            ..self.clone()
        })
    }
}

/// 書誌情報の検証
///
/// ビジネスルール：
/// - タイトル・著者・ISBNは必須
/// - 蔵書数は1冊以上
pub fn validate_catalog_fields(
    title: &str,
    author: &str,
    isbn: &str,
    total_copies: i32,
) -> Result<(), ValidationError> {
    require("title", title)?;
    require("author", author)?;
    require("isbn", isbn)?;
    if total_copies < 1 {
        return Err(ValidationError::InvalidTotalCopies(total_copies));
    }
    Ok(())
}

/// 蔵書数変更後の貸出可能数を求める
///
/// 貸出中の冊数は維持される。新しい蔵書数が貸出中の冊数を下回る場合はエラー。
pub fn reconcile_available_copies(current: &Book, new_total: i32) -> Result<i32, ValidationError> {
    let on_loan = current.copies_on_loan();
    if new_total < on_loan {
        return Err(ValidationError::TotalBelowCopiesOnLoan {
            total: new_total,
            on_loan,
        });
    }
    Ok(new_total - on_loan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(total: i32, available: i32) -> Book {
        Book {
            id: BookId::new(1),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            isbn: "123".to_string(),
            published_year: Some(1965),
            genre: None,
            total_copies: total,
            available_copies: available,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_is_available_when_copies_remain() {
        assert!(book(2, 1).is_available());
        assert!(!book(2, 0).is_available());
    }

    #[test]
    fn test_take_copy_decrements_available() {
        let now = Utc::now();
        let taken = book(2, 2).take_copy(now).unwrap();
        assert_eq!(taken.available_copies, 1);
        assert_eq!(taken.total_copies, 2);
        assert_eq!(taken.updated_at, Some(now));
    }

    #[test]
    fn test_take_copy_fails_when_none_left() {
        assert!(book(1, 0).take_copy(Utc::now()).is_none());
    }

    #[test]
    fn test_release_copy_never_exceeds_total() {
        assert!(book(2, 2).release_copy(Utc::now()).is_none());
        let released = book(2, 1).release_copy(Utc::now()).unwrap();
        assert_eq!(released.available_copies, 2);
    }

    #[test]
    fn test_validate_catalog_fields_rules() {
        assert!(validate_catalog_fields("Dune", "Herbert", "123", 1).is_ok());
        assert_eq!(
            validate_catalog_fields("  ", "Herbert", "123", 1),
            Err(ValidationError::EmptyField("title"))
        );
        assert_eq!(
            validate_catalog_fields("Dune", "", "123", 1),
            Err(ValidationError::EmptyField("author"))
        );
        assert_eq!(
            validate_catalog_fields("Dune", "Herbert", "\t", 1),
            Err(ValidationError::EmptyField("isbn"))
        );
        assert_eq!(
            validate_catalog_fields("Dune", "Herbert", "123", 0),
            Err(ValidationError::InvalidTotalCopies(0))
        );
    }

    #[test]
    fn test_reconcile_keeps_copies_on_loan() {
        // 5冊中2冊貸出中 → 3冊に減らすと貸出可能は1冊
        let current = book(5, 3);
        assert_eq!(reconcile_available_copies(&current, 3), Ok(1));
        assert_eq!(reconcile_available_copies(&current, 8), Ok(6));
    }

    #[test]
    fn test_reconcile_rejects_total_below_on_loan() {
        let current = book(5, 2);
        assert_eq!(
            reconcile_available_copies(&current, 2),
            Err(ValidationError::TotalBelowCopiesOnLoan {
                total: 2,
                on_loan: 3
            })
        );
    }
}
