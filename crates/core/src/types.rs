use serde::{Deserialize, Serialize};

/// Wire representation of an employee record exchanged over HTTP.
///
/// Field names follow the external JSON contract (camelCase). The `id` is
/// absent on create requests and filled in by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: Option<AddressDto>,
    #[serde(default)]
    pub phones: Option<Vec<PhoneDto>>,
}

/// Wire representation of an embedded address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDto {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

/// Wire representation of an embedded phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneDto {
    #[serde(rename = "type", default)]
    pub phone_type: String,
    #[serde(default)]
    pub number: String,
}

/// Persisted shape of an employee document.
///
/// The `address` and `phones` fields stay optional so that validation can
/// distinguish an absent value from an empty one; a document only reaches
/// storage once [`crate::validate::validate_employee`] has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDocument {
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: Option<Address>,
    pub phones: Option<Vec<Phone>>,
}

/// Embedded address owned exclusively by its employee document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Embedded phone entry owned exclusively by its employee document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub phone_type: String,
    pub number: String,
}
