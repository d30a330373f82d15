//! Account business operations, including the provisioning workflow.

use crate::client::CustomerGateway;
use crate::error::{AccountError, NO_DETAILS};
use crate::model::{FullAccountInfo, NewAccount, SaveAccount};
use crate::store::AccountStore;
use corebank_commons::dto::{DepositRequest, GetAccount};
use corebank_commons::validate;
use corebank_saga::{SagaKind, SagaLog, SagaState, transition_quietly};

/// Account business operations over an [`AccountStore`], a
/// [`CustomerGateway`] and a saga log.
pub struct AccountService<S, G, L> {
    store: S,
    customers: G,
    saga: L,
}

impl<S, G, L> AccountService<S, G, L>
where
    S: AccountStore,
    G: CustomerGateway,
    L: SagaLog,
{
    /// Creates the service.
    pub const fn new(store: S, customers: G, saga: L) -> Self {
        Self {
            store,
            customers,
            saga,
        }
    }

    /// Provisions a banking relationship: creates the customer through the
    /// customer service, then persists an account linked to the returned
    /// id. On success both exist and are linked; the customer detail in the
    /// result comes from the creation response, not a re-fetch.
    ///
    /// There is no transaction spanning the two stores. When account
    /// persistence fails the customer already created upstream is left in
    /// place (an accepted, saga-logged inconsistency); this workflow never
    /// issues a compensating delete.
    ///
    /// # Errors
    ///
    /// - [`AccountError::Validation`]: malformed input, no remote call made
    /// - [`AccountError::CustomerService`]: transport fault; customer state
    ///   unknown
    /// - [`AccountError::CustomerCreation`]: the customer service refused;
    ///   nothing was created anywhere
    /// - [`AccountError::CustomerInvalidResponse`]: 2xx with an empty body
    ///   or no usable id
    /// - [`AccountError::DuplicateNumber`] / [`AccountError::Persistence`]:
    ///   the account store failed; the customer exists with no account
    pub async fn add_account(&self, request: SaveAccount) -> Result<FullAccountInfo, AccountError> {
        validate::non_blank("account_number", &request.account_number, 30)?;
        validate::non_negative("balance", request.balance)?;
        validate::max_scale("balance", request.balance, 2)?;
        validate::save_customer(&request.customer)?;

        // The saga record exists before any side effect, so begin failures
        // abort cleanly.
        let saga_id = self
            .saga
            .begin(
                SagaKind::AccountProvisioning,
                serde_json::json!({
                    "account_number": request.account_number,
                    "customer_email": request.customer.email,
                }),
            )
            .await
            .map_err(AccountError::Persistence)?;

        tracing::info!(
            saga_id = %saga_id,
            account_number = %request.account_number,
            "provisioning account"
        );

        transition_quietly(&self.saga, saga_id, SagaState::RemoteCallRequested).await;

        let response = match self.customers.create_customer(&request.customer).await {
            Ok(response) => response,
            Err(transport) => {
                // The call may or may not have reached the customer
                // service; the record stays in RemoteCallRequested for the
                // reconciler to investigate.
                tracing::error!(saga_id = %saga_id, error = %transport, "customer service unreachable");
                metrics::counter!("account.provisioning_failures", "stage" => "transport")
                    .increment(1);
                return Err(AccountError::CustomerService(transport));
            },
        };

        if !response.is_success() {
            transition_quietly(&self.saga, saga_id, SagaState::RemoteCallFailed).await;
            let status = response.status;
            let details = response.details.unwrap_or_else(|| NO_DETAILS.to_string());
            tracing::warn!(saga_id = %saga_id, status, details = %details, "customer creation refused");
            metrics::counter!("account.provisioning_failures", "stage" => "customer")
                .increment(1);
            return Err(AccountError::CustomerCreation { status, details });
        }

        let Some(customer) = response.body else {
            return Err(AccountError::CustomerInvalidResponse { reason: "empty body" });
        };
        if customer.id <= 0 {
            return Err(AccountError::CustomerInvalidResponse { reason: "missing id" });
        }

        transition_quietly(&self.saga, saga_id, SagaState::RemoteCallConfirmed).await;

        let new_account = NewAccount {
            account_number: request.account_number.clone(),
            account_type: request.account_type,
            status: request.status,
            balance: request.balance,
            customer_id: customer.id,
        };

        let account = match self.store.insert(new_account).await {
            Ok(account) => account,
            Err(store_error) => {
                transition_quietly(&self.saga, saga_id, SagaState::PersistFailed).await;
                tracing::error!(
                    saga_id = %saga_id,
                    customer_id = customer.id,
                    error = %store_error,
                    "account persist failed; customer exists without an account"
                );
                metrics::counter!("account.provisioning_failures", "stage" => "persist")
                    .increment(1);
                return Err(AccountError::from_store(store_error, &request.account_number));
            },
        };

        transition_quietly(&self.saga, saga_id, SagaState::Persisted).await;

        tracing::info!(
            saga_id = %saga_id,
            account_id = account.id,
            customer_id = customer.id,
            "account provisioned"
        );
        metrics::counter!("account.provisioned").increment(1);

        Ok(FullAccountInfo {
            account: account.into(),
            customer,
        })
    }

    /// Deposits into an active account, deduplicated on the caller-supplied
    /// idempotency key. Replaying a key returns the current balance without
    /// moving money again.
    ///
    /// # Errors
    ///
    /// - [`AccountError::Validation`]: zero or negative amount, blank key
    /// - [`AccountError::NotFound`]: no active account with that number
    /// - [`AccountError::Persistence`]: store fault
    pub async fn deposit(&self, request: DepositRequest) -> Result<GetAccount, AccountError> {
        validate::deposit(&request)?;

        let outcome = self
            .store
            .deposit(
                &request.account_number,
                request.amount,
                &request.idempotency_key,
            )
            .await
            .map_err(|e| AccountError::from_store(e, &request.account_number))?;

        Ok(outcome.account.into())
    }

    /// Looks up an active account by number.
    ///
    /// # Errors
    ///
    /// - [`AccountError::NotFound`] when no active row matches
    /// - [`AccountError::Persistence`] on a store fault
    pub async fn find_by_number(&self, account_number: &str) -> Result<GetAccount, AccountError> {
        self.store
            .find_active_by_number(account_number)
            .await
            .map_err(AccountError::Persistence)?
            .map(Into::into)
            .ok_or_else(|| AccountError::NotFound {
                account_number: account_number.to_string(),
            })
    }

    /// Logically deletes an active account. A second delete of the same
    /// number fails with [`AccountError::NotFound`], the first one having
    /// removed the row from the active set.
    ///
    /// # Errors
    ///
    /// - [`AccountError::NotFound`] when no active row matches
    /// - [`AccountError::Conflict`] when the row changed concurrently
    /// - [`AccountError::Persistence`] on a store fault
    pub async fn delete_by_number(&self, account_number: &str) -> Result<(), AccountError> {
        let current = self
            .store
            .find_active_by_number(account_number)
            .await
            .map_err(AccountError::Persistence)?
            .ok_or_else(|| AccountError::NotFound {
                account_number: account_number.to_string(),
            })?;

        self.store
            .mark_deleted(account_number, current.version)
            .await
            .map_err(|e| AccountError::from_store(e, account_number))?;

        Ok(())
    }
}
