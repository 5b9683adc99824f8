use crate::types::{Address, AddressDto, EmployeeDocument, EmployeeDto, Phone, PhoneDto};

/// Converts a wire record into its persisted document shape.
///
/// Purely structural: every field is copied verbatim and no validation is
/// applied. A missing wire `id` leaves the document id unset so the storage
/// layer assigns one on first save.
pub fn employee_to_document(dto: EmployeeDto) -> EmployeeDocument {
    EmployeeDocument {
        id: dto.id,
        first_name: dto.first_name,
        last_name: dto.last_name,
        email: dto.email,
        address: dto.address.map(address_to_document),
        phones: dto.phones.map(phones_to_documents),
    }
}

/// Converts a persisted document back into its wire shape.
pub fn employee_to_dto(document: EmployeeDocument) -> EmployeeDto {
    EmployeeDto {
        id: document.id,
        first_name: document.first_name,
        last_name: document.last_name,
        email: document.email,
        address: document.address.map(address_to_dto),
        phones: document.phones.map(phones_to_dtos),
    }
}

/// Maps a list of documents element-wise, preserving order.
pub fn employees_to_dtos(documents: Vec<EmployeeDocument>) -> Vec<EmployeeDto> {
    documents.into_iter().map(employee_to_dto).collect()
}

fn address_to_document(dto: AddressDto) -> Address {
    Address {
        street: dto.street,
        city: dto.city,
        state: dto.state,
        zip: dto.zip,
    }
}

fn address_to_dto(document: Address) -> AddressDto {
    AddressDto {
        street: document.street,
        city: document.city,
        state: document.state,
        zip: document.zip,
    }
}

fn phone_to_document(dto: PhoneDto) -> Phone {
    Phone {
        phone_type: dto.phone_type,
        number: dto.number,
    }
}

fn phone_to_dto(document: Phone) -> PhoneDto {
    PhoneDto {
        phone_type: document.phone_type,
        number: document.number,
    }
}

fn phones_to_documents(dtos: Vec<PhoneDto>) -> Vec<Phone> {
    dtos.into_iter().map(phone_to_document).collect()
}

fn phones_to_dtos(documents: Vec<Phone>) -> Vec<PhoneDto> {
    documents.into_iter().map(phone_to_dto).collect()
}
