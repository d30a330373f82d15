//! Customer entity and its embedded address.

use chrono::{DateTime, Utc};
use corebank_commons::dto::{GetAddress, GetCustomerDetail, SaveAddress, SaveCustomer};

/// Address embedded in a customer row (flattened into the same table).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// Country name
    pub country: String,
    /// State or province
    pub state: String,
    /// City name
    pub city: String,
    /// Postal or ZIP code
    pub postal_code: String,
    /// Street name
    pub street: String,
    /// Street number
    pub street_number: String,
    /// Apartment identifier, if any
    pub apartment: Option<String>,
    /// Floor, if any
    pub floor: Option<String>,
    /// Free-form additional information
    pub additional_info: Option<String>,
}

impl From<SaveAddress> for Address {
    fn from(address: SaveAddress) -> Self {
        Self {
            country: address.country,
            state: address.state,
            city: address.city,
            postal_code: address.postal_code,
            street: address.street,
            street_number: address.street_number,
            apartment: address.apartment,
            floor: address.floor,
            additional_info: address.additional_info,
        }
    }
}

impl From<Address> for GetAddress {
    fn from(address: Address) -> Self {
        Self {
            country: address.country,
            state: address.state,
            city: address.city,
            postal_code: address.postal_code,
            street: address.street,
            street_number: address.street_number,
            apartment: address.apartment,
            floor: address.floor,
            additional_info: address.additional_info,
        }
    }
}

/// A stored customer row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Customer {
    /// Generated id
    pub id: i64,
    /// First name
    pub name: String,
    /// Last name
    pub last_name: String,
    /// Unique email
    pub email: String,
    /// Mobile number in international format
    pub mobile: String,
    /// Embedded address
    pub address: Address,
    /// Logical-delete flag
    pub is_active: bool,
    /// Optimistic-concurrency version, bumped on every mutation
    pub version: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Logical-delete timestamp, set once
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Customer> for GetCustomerDetail {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.mobile,
            address: customer.address.into(),
            created_at: Some(customer.created_at),
            updated_at: Some(customer.updated_at),
        }
    }
}

/// Attributes for a customer about to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCustomer {
    /// First name
    pub name: String,
    /// Last name
    pub last_name: String,
    /// Unique email
    pub email: String,
    /// Mobile number
    pub mobile: String,
    /// Embedded address
    pub address: Address,
}

impl From<SaveCustomer> for NewCustomer {
    fn from(request: SaveCustomer) -> Self {
        Self {
            name: request.name,
            last_name: request.last_name,
            email: request.email,
            mobile: request.mobile,
            address: request.address.into(),
        }
    }
}

/// Partial update of a customer's mutable attributes. Email is immutable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateCustomer {
    /// New first name, if changing
    pub name: Option<String>,
    /// New last name, if changing
    pub last_name: Option<String>,
    /// New mobile number, if changing
    pub mobile: Option<String>,
}
