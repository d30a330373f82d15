//! Credit business operations, including the origination workflow.

use crate::client::AccountGateway;
use crate::error::{CreditError, NO_DETAILS};
use crate::model::{CreditCreated, GetCredit, NewCredit, SaveCredit};
use crate::publisher::CreditEventPublisher;
use crate::store::CreditStore;
use corebank_commons::dto::DepositRequest;
use corebank_commons::event::Event;
use corebank_commons::validate::{self, ValidationError};
use corebank_saga::{SagaKind, SagaLog, SagaState, transition_quietly};
use rust_decimal::Decimal;

/// Largest representable interest rate, `NUMERIC(5, 4)` in the store.
const MAX_INTEREST_RATE: Decimal = Decimal::from_parts(99_999, 0, 0, false, 4);

/// Credit business operations over a [`CreditStore`], an [`AccountGateway`],
/// a [`CreditEventPublisher`] and a saga log.
pub struct CreditService<S, G, P, L> {
    store: S,
    accounts: G,
    publisher: P,
    saga: L,
}

fn validate_save_credit(request: &SaveCredit) -> Result<(), ValidationError> {
    validate::positive("amount", request.amount)?;
    validate::max_scale("amount", request.amount, 2)?;
    validate::in_range("term_months", request.term_months, 1, 600)?;
    validate::positive("interest_rate", request.interest_rate)?;
    validate::max_scale("interest_rate", request.interest_rate, 4)?;
    if request.interest_rate > MAX_INTEREST_RATE {
        return Err(ValidationError::new(
            "interest_rate",
            "must be at most 9.9999",
        ));
    }
    validate::non_blank("account_number", &request.account_number, 30)?;
    if request.customer_id <= 0 {
        return Err(ValidationError::new("customer_id", "must be positive"));
    }
    validate::non_blank("idempotency_key", &request.idempotency_key, 64)?;
    Ok(())
}

impl<S, G, P, L> CreditService<S, G, P, L>
where
    S: CreditStore,
    G: AccountGateway,
    P: CreditEventPublisher,
    L: SagaLog,
{
    /// Creates the service.
    pub const fn new(store: S, accounts: G, publisher: P, saga: L) -> Self {
        Self {
            store,
            accounts,
            publisher,
            saga,
        }
    }

    /// Originates a credit: deposits the principal into the target account
    /// through the account service, persists the credit row, then publishes
    /// a `CreditCreated` event. The deposit carries the caller's
    /// idempotency key, so retrying a failed origination cannot double the
    /// money.
    ///
    /// Publication is strictly after commit and best effort: a broker
    /// failure is logged and counted but the stored credit stands and the
    /// call still succeeds.
    ///
    /// There is no transaction spanning the deposit and the credit row.
    /// When persistence fails after the deposit succeeded, the money stays
    /// on the account (a saga-logged inconsistency for the reconciler);
    /// this workflow never reverses a deposit inline.
    ///
    /// # Errors
    ///
    /// - [`CreditError::Validation`]: malformed input, no remote call made
    /// - [`CreditError::AccountService`]: transport fault; deposit state
    ///   unknown
    /// - [`CreditError::AccountDeposit`]: the account service refused; no
    ///   money moved, no credit created
    /// - [`CreditError::AccountInvalidResponse`]: 2xx with an empty body
    /// - [`CreditError::OwnershipMismatch`]: the account belongs to another
    ///   customer; the deposit already happened
    /// - [`CreditError::Persistence`]: the credit store failed after the
    ///   deposit
    pub async fn register_credit(&self, request: SaveCredit) -> Result<GetCredit, CreditError> {
        validate_save_credit(&request)?;

        // The saga record exists before any side effect, so begin failures
        // abort cleanly.
        let saga_id = self
            .saga
            .begin(
                SagaKind::CreditOrigination,
                serde_json::json!({
                    "account_number": request.account_number,
                    "customer_id": request.customer_id,
                    "idempotency_key": request.idempotency_key,
                }),
            )
            .await
            .map_err(CreditError::Persistence)?;

        tracing::info!(
            saga_id = %saga_id,
            account_number = %request.account_number,
            customer_id = request.customer_id,
            "originating credit"
        );

        transition_quietly(&self.saga, saga_id, SagaState::RemoteCallRequested).await;

        let deposit = DepositRequest {
            account_number: request.account_number.clone(),
            amount: request.amount,
            idempotency_key: request.idempotency_key.clone(),
        };

        let response = match self.accounts.deposit(&deposit).await {
            Ok(response) => response,
            Err(transport) => {
                // The call may or may not have reached the account service;
                // the record stays in RemoteCallRequested for the
                // reconciler to investigate.
                tracing::error!(saga_id = %saga_id, error = %transport, "account service unreachable");
                metrics::counter!("credit.origination_failures", "stage" => "transport")
                    .increment(1);
                return Err(CreditError::AccountService(transport));
            },
        };

        if !response.is_success() {
            transition_quietly(&self.saga, saga_id, SagaState::RemoteCallFailed).await;
            let status = response.status;
            let details = response.details.unwrap_or_else(|| NO_DETAILS.to_string());
            tracing::warn!(saga_id = %saga_id, status, details = %details, "deposit refused");
            metrics::counter!("credit.origination_failures", "stage" => "deposit").increment(1);
            return Err(CreditError::AccountDeposit { status, details });
        }

        let Some(account) = response.body else {
            return Err(CreditError::AccountInvalidResponse { reason: "empty body" });
        };

        if account.customer_id != request.customer_id {
            // Money already landed on an account the caller does not own.
            // No credit row is written; the saga record marks the orphaned
            // deposit for the reconciler.
            transition_quietly(&self.saga, saga_id, SagaState::PersistFailed).await;
            tracing::error!(
                saga_id = %saga_id,
                claimed = request.customer_id,
                actual = account.customer_id,
                "account ownership mismatch after deposit"
            );
            metrics::counter!("credit.origination_failures", "stage" => "ownership").increment(1);
            return Err(CreditError::OwnershipMismatch {
                claimed: request.customer_id,
                actual: account.customer_id,
            });
        }

        transition_quietly(&self.saga, saga_id, SagaState::RemoteCallConfirmed).await;

        let new_credit = NewCredit {
            amount: request.amount,
            term_months: request.term_months,
            interest_rate: request.interest_rate,
            credit_type: request.credit_type,
            account_number: request.account_number.clone(),
            customer_id: request.customer_id,
        };

        let credit = match self.store.insert(new_credit).await {
            Ok(credit) => credit,
            Err(store_error) => {
                transition_quietly(&self.saga, saga_id, SagaState::PersistFailed).await;
                tracing::error!(
                    saga_id = %saga_id,
                    account_number = %request.account_number,
                    error = %store_error,
                    "credit persist failed; deposit stands without a credit row"
                );
                metrics::counter!("credit.origination_failures", "stage" => "persist")
                    .increment(1);
                return Err(CreditError::Persistence(store_error));
            },
        };

        transition_quietly(&self.saga, saga_id, SagaState::Persisted).await;

        let event = Event::created(CreditCreated {
            customer_id: credit.customer_id,
            account_number: credit.account_number.clone(),
            amount: credit.amount,
        });

        match self.publisher.publish(&event).await {
            Ok(()) => {
                transition_quietly(&self.saga, saga_id, SagaState::EventPublished).await;
                metrics::counter!("credit.events_published").increment(1);
            },
            Err(publish_error) => {
                tracing::warn!(
                    saga_id = %saga_id,
                    credit_id = credit.id,
                    error = %publish_error,
                    "credit event not published"
                );
                metrics::counter!("credit.event_publish_failures").increment(1);
            },
        }

        tracing::info!(
            saga_id = %saga_id,
            credit_id = credit.id,
            account_number = %credit.account_number,
            "credit originated"
        );
        metrics::counter!("credit.originated").increment(1);

        Ok(credit.into())
    }

    /// Looks up an active credit by id.
    ///
    /// # Errors
    ///
    /// - [`CreditError::NotFound`] when no active row matches
    /// - [`CreditError::Persistence`] on a store fault
    pub async fn find_by_id(&self, id: i64) -> Result<GetCredit, CreditError> {
        self.store
            .find_active_by_id(id)
            .await
            .map_err(CreditError::Persistence)?
            .map(Into::into)
            .ok_or(CreditError::NotFound { id })
    }

    /// Logically deletes an active credit. A second delete of the same id
    /// fails with [`CreditError::NotFound`], the first one having removed
    /// the row from the active set.
    ///
    /// # Errors
    ///
    /// - [`CreditError::NotFound`] when no active row matches
    /// - [`CreditError::Conflict`] when the row changed concurrently
    /// - [`CreditError::Persistence`] on a store fault
    pub async fn delete_by_id(&self, id: i64) -> Result<(), CreditError> {
        let current = self
            .store
            .find_active_by_id(id)
            .await
            .map_err(CreditError::Persistence)?
            .ok_or(CreditError::NotFound { id })?;

        self.store
            .mark_deleted(id, current.version)
            .await
            .map_err(|e| CreditError::from_store(e, id))?;

        Ok(())
    }
}
