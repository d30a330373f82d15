//! Business operations on customers.

use crate::error::CustomerError;
use crate::model::{NewCustomer, UpdateCustomer};
use crate::store::CustomerStore;
use corebank_commons::dto::{GetCustomerDetail, SaveCustomer};
use corebank_commons::validate;

/// Customer business operations over a [`CustomerStore`].
pub struct CustomerService<S> {
    store: S,
}

impl<S: CustomerStore> CustomerService<S> {
    /// Creates the service.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// - [`CustomerError::Validation`] for malformed input (nothing written)
    /// - [`CustomerError::DuplicateEmail`] when the email is taken
    /// - [`CustomerError::Persistence`] on a store fault
    pub async fn save(&self, request: SaveCustomer) -> Result<GetCustomerDetail, CustomerError> {
        validate::save_customer(&request)?;

        let email = request.email.clone();
        let customer = self
            .store
            .insert(NewCustomer::from(request))
            .await
            .map_err(|e| CustomerError::from_store(e, 0, &email))?;

        tracing::info!(customer_id = customer.id, "customer created");
        metrics::counter!("customer.created").increment(1);

        Ok(customer.into())
    }

    /// Looks up an active customer by id.
    ///
    /// # Errors
    ///
    /// - [`CustomerError::NotFound`] when no active row matches
    /// - [`CustomerError::Persistence`] on a store fault
    pub async fn find_by_id(&self, id: i64) -> Result<GetCustomerDetail, CustomerError> {
        self.store
            .find_active_by_id(id)
            .await
            .map_err(CustomerError::Persistence)?
            .map(Into::into)
            .ok_or(CustomerError::NotFound { id })
    }

    /// Looks up an active customer by email.
    ///
    /// # Errors
    ///
    /// - [`CustomerError::NotFound`] when no active row matches (reported
    ///   with id 0, the key being an email)
    /// - [`CustomerError::Persistence`] on a store fault
    pub async fn find_by_email(&self, email: &str) -> Result<GetCustomerDetail, CustomerError> {
        self.store
            .find_active_by_email(email)
            .await
            .map_err(CustomerError::Persistence)?
            .map(Into::into)
            .ok_or(CustomerError::NotFound { id: 0 })
    }

    /// Applies a partial update to an active customer.
    ///
    /// # Errors
    ///
    /// - [`CustomerError::Validation`] for malformed changed fields
    /// - [`CustomerError::NotFound`] when no active row matches
    /// - [`CustomerError::Conflict`] when the row changed concurrently
    /// - [`CustomerError::Persistence`] on a store fault
    pub async fn update_by_id(
        &self,
        id: i64,
        changes: UpdateCustomer,
    ) -> Result<GetCustomerDetail, CustomerError> {
        if let Some(name) = &changes.name {
            validate::non_blank("name", name, 100)?;
        }
        if let Some(last_name) = &changes.last_name {
            validate::non_blank("last_name", last_name, 100)?;
        }
        if let Some(mobile) = &changes.mobile {
            validate::mobile("mobile", mobile)?;
        }

        let current = self
            .store
            .find_active_by_id(id)
            .await
            .map_err(CustomerError::Persistence)?
            .ok_or(CustomerError::NotFound { id })?;

        let updated = self
            .store
            .update(id, current.version, changes)
            .await
            .map_err(|e| CustomerError::from_store(e, id, &current.email))?;

        tracing::info!(customer_id = id, "customer updated");

        Ok(updated.into())
    }

    /// Logically deletes an active customer: sets the deletion timestamp and
    /// clears the active flag. A second delete of the same id fails with
    /// [`CustomerError::NotFound`], the first one having removed the row
    /// from the active set.
    ///
    /// # Errors
    ///
    /// - [`CustomerError::NotFound`] when no active row matches
    /// - [`CustomerError::Conflict`] when the row changed concurrently
    /// - [`CustomerError::Persistence`] on a store fault
    pub async fn delete_by_id(&self, id: i64) -> Result<(), CustomerError> {
        let current = self
            .store
            .find_active_by_id(id)
            .await
            .map_err(CustomerError::Persistence)?
            .ok_or(CustomerError::NotFound { id })?;

        self.store
            .mark_deleted(id, current.version)
            .await
            .map_err(|e| CustomerError::from_store(e, id, &current.email))?;

        tracing::info!(customer_id = id, "customer deleted");
        metrics::counter!("customer.deleted").increment(1);

        Ok(())
    }
}
