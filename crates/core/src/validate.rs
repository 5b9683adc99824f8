use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::types::EmployeeDocument;

const MAX_NAME_CHARS: usize = 100;
const MAX_EMAIL_CHARS: usize = 255;
const PHONE_TYPES: [&str; 3] = ["home", "work", "mobile"];

/// Loose phone pattern: optional leading `+`, then digits, spaces, or
/// hyphens, at least ten characters in total.
static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s-]{10,}$").expect("phone pattern is a valid regex"));

/// First violated structural rule for an employee document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

/// A single structural rule: the predicate returns `true` when violated.
struct Rule {
    field: &'static str,
    message: &'static str,
    violated: fn(&EmployeeDocument) -> bool,
}

/// Rules are evaluated top to bottom and the first violation wins, so a
/// document with several problems reports one error at a time.
const RULES: &[Rule] = &[
    Rule {
        field: "firstName",
        message: "First name is required",
        violated: first_name_blank,
    },
    Rule {
        field: "firstName",
        message: "First name cannot exceed 100 characters",
        violated: first_name_too_long,
    },
    Rule {
        field: "lastName",
        message: "Last name is required",
        violated: last_name_blank,
    },
    Rule {
        field: "lastName",
        message: "Last name cannot exceed 100 characters",
        violated: last_name_too_long,
    },
    Rule {
        field: "email",
        message: "Email is required",
        violated: email_missing_or_malformed,
    },
    Rule {
        field: "email",
        message: "Email cannot exceed 255 characters",
        violated: email_too_long,
    },
    Rule {
        field: "address",
        message: "At least one address is required",
        violated: address_absent,
    },
    Rule {
        field: "phones",
        message: "At least one phone is required",
        violated: phones_absent_or_empty,
    },
    Rule {
        field: "phones",
        message: "Phone type must be 'home', 'work', or 'mobile'",
        violated: phone_type_unknown,
    },
    Rule {
        field: "phones",
        message: "Invalid phone number format",
        violated: phone_number_malformed,
    },
];

/// Checks the structural invariants of a document before persistence.
///
/// Synchronous and side-effect free; persistence state (such as email
/// uniqueness) is out of scope here and enforced by the record service.
pub fn validate_employee(document: &EmployeeDocument) -> Result<(), ValidationError> {
    for rule in RULES {
        if (rule.violated)(document) {
            return Err(ValidationError {
                field: rule.field,
                message: rule.message,
            });
        }
    }
    Ok(())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn first_name_blank(document: &EmployeeDocument) -> bool {
    is_blank(&document.first_name)
}

fn first_name_too_long(document: &EmployeeDocument) -> bool {
    document.first_name.chars().count() > MAX_NAME_CHARS
}

fn last_name_blank(document: &EmployeeDocument) -> bool {
    is_blank(&document.last_name)
}

fn last_name_too_long(document: &EmployeeDocument) -> bool {
    document.last_name.chars().count() > MAX_NAME_CHARS
}

fn email_missing_or_malformed(document: &EmployeeDocument) -> bool {
    is_blank(&document.email) || !document.email.contains('@')
}

fn email_too_long(document: &EmployeeDocument) -> bool {
    document.email.chars().count() > MAX_EMAIL_CHARS
}

fn address_absent(document: &EmployeeDocument) -> bool {
    document.address.is_none()
}

fn phones_absent_or_empty(document: &EmployeeDocument) -> bool {
    document
        .phones
        .as_ref()
        .map(|phones| phones.is_empty())
        .unwrap_or(true)
}

fn phone_type_unknown(document: &EmployeeDocument) -> bool {
    document
        .phones
        .iter()
        .flatten()
        .any(|phone| !PHONE_TYPES.contains(&phone.phone_type.as_str()))
}

fn phone_number_malformed(document: &EmployeeDocument) -> bool {
    document
        .phones
        .iter()
        .flatten()
        .any(|phone| !PHONE_NUMBER.is_match(&phone.number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Phone};

    fn valid_document() -> EmployeeDocument {
        EmployeeDocument {
            id: None,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            address: Some(Address {
                street: "123 Main St".to_string(),
                city: "New York".to_string(),
                state: "NY".to_string(),
                zip: "10001".to_string(),
            }),
            phones: Some(vec![Phone {
                phone_type: "home".to_string(),
                number: "123-456-7890".to_string(),
            }]),
        }
    }

    fn message_for(document: &EmployeeDocument) -> &'static str {
        validate_employee(document)
            .expect_err("document should be rejected")
            .message
    }

    #[test]
    fn accepts_a_valid_document() {
        assert!(validate_employee(&valid_document()).is_ok());
    }

    #[test]
    fn rejects_blank_first_name() {
        let mut document = valid_document();
        document.first_name = "   ".to_string();
        assert_eq!(message_for(&document), "First name is required");
    }

    #[test]
    fn rejects_overlong_first_name() {
        let mut document = valid_document();
        document.first_name = "x".repeat(101);
        assert_eq!(
            message_for(&document),
            "First name cannot exceed 100 characters"
        );
    }

    #[test]
    fn rejects_blank_last_name() {
        let mut document = valid_document();
        document.last_name = String::new();
        assert_eq!(message_for(&document), "Last name is required");
    }

    #[test]
    fn rejects_email_without_at_sign() {
        let mut document = valid_document();
        document.email = "invalid-email".to_string();
        assert_eq!(message_for(&document), "Email is required");
    }

    #[test]
    fn rejects_overlong_email() {
        let mut document = valid_document();
        document.email = format!("{}@example.com", "x".repeat(250));
        assert_eq!(message_for(&document), "Email cannot exceed 255 characters");
    }

    #[test]
    fn rejects_missing_address() {
        let mut document = valid_document();
        document.address = None;
        assert_eq!(message_for(&document), "At least one address is required");
    }

    #[test]
    fn rejects_missing_and_empty_phone_lists() {
        let mut document = valid_document();
        document.phones = None;
        assert_eq!(message_for(&document), "At least one phone is required");

        document.phones = Some(Vec::new());
        assert_eq!(message_for(&document), "At least one phone is required");
    }

    #[test]
    fn rejects_unknown_phone_type() {
        let mut document = valid_document();
        document.phones = Some(vec![Phone {
            phone_type: "fax".to_string(),
            number: "123-456-7890".to_string(),
        }]);
        assert_eq!(
            message_for(&document),
            "Phone type must be 'home', 'work', or 'mobile'"
        );
    }

    #[test]
    fn rejects_short_or_lettered_phone_numbers() {
        let mut document = valid_document();
        document.phones = Some(vec![Phone {
            phone_type: "work".to_string(),
            number: "12345".to_string(),
        }]);
        assert_eq!(message_for(&document), "Invalid phone number format");

        document.phones = Some(vec![Phone {
            phone_type: "work".to_string(),
            number: "phone-number-one".to_string(),
        }]);
        assert_eq!(message_for(&document), "Invalid phone number format");
    }

    #[test]
    fn accepts_international_numbers() {
        let mut document = valid_document();
        document.phones = Some(vec![Phone {
            phone_type: "mobile".to_string(),
            number: "+1 123-456-7890".to_string(),
        }]);
        assert!(validate_employee(&document).is_ok());
    }

    #[test]
    fn blank_first_name_is_reported_before_other_violations() {
        let mut document = valid_document();
        document.first_name = String::new();
        document.email = "invalid".to_string();
        document.phones = None;
        assert_eq!(message_for(&document), "First name is required");
    }
}
