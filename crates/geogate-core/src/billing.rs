//! Billing state synchronizer
//!
//! Applies verified payment-provider events to profile state. Event
//! signature verification happens at the webhook handler; this module only
//! resolves the target user and performs the plan transition.
//!
//! The upgrade and downgrade paths are deliberately asymmetric: an upgrade
//! starts a fresh window (`reset_date = now + 30d`) while a downgrade leaves
//! `analyses_count` and `reset_date` untouched, matching observed provider
//! behavior.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::IdentityProvider;
use crate::error::Result;
use crate::profile::next_reset;
use crate::store::ProfileStore;

/// Plan-transition surface of the profile store
#[async_trait::async_trait]
pub trait PlanStore: Send + Sync {
    /// Set plan to pro with a fresh rewrite budget and window
    async fn set_plan_pro(&self, id: Uuid, reset_date: DateTime<Utc>) -> Result<()>;

    /// Set plan to free with a zeroed rewrite budget
    async fn set_plan_free(&self, id: Uuid) -> Result<()>;
}

#[async_trait::async_trait]
impl PlanStore for ProfileStore {
    async fn set_plan_pro(&self, id: Uuid, reset_date: DateTime<Utc>) -> Result<()> {
        ProfileStore::set_plan_pro(self, id, reset_date).await
    }

    async fn set_plan_free(&self, id: Uuid) -> Result<()> {
        ProfileStore::set_plan_free(self, id).await
    }
}

/// How a payment event identifies its user
#[derive(Debug, Clone)]
pub enum CustomerRef {
    /// Direct profile id embedded in the event metadata
    UserId(Uuid),
    /// Customer email, resolved through the identity service
    Email(String),
}

/// Applies payment events to profile state
pub struct BillingSync {
    plans: Arc<dyn PlanStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl BillingSync {
    /// Create a new synchronizer
    pub fn new(plans: Arc<dyn PlanStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { plans, identity }
    }

    async fn resolve(&self, customer: &CustomerRef) -> Result<Option<Uuid>> {
        match customer {
            CustomerRef::UserId(id) => Ok(Some(*id)),
            CustomerRef::Email(email) => Ok(self
                .identity
                .find_user_by_email(email)
                .await?
                .map(|u| u.id)),
        }
    }

    /// Handle a confirmed checkout: upgrade the target profile to pro.
    ///
    /// An unresolvable customer is logged and ignored; the provider gets a
    /// 200 either way, as retrying cannot make the user appear.
    #[instrument(skip(self, now))]
    pub async fn activate_pro(&self, customer: CustomerRef, now: DateTime<Utc>) -> Result<()> {
        match self.resolve(&customer).await? {
            Some(id) => {
                self.plans.set_plan_pro(id, next_reset(now)).await?;
                info!(user_id = %id, "Plan upgraded to pro");
            }
            None => warn!(?customer, "Checkout event matched no user"),
        }
        Ok(())
    }

    /// Handle a subscription cancellation: downgrade the profile to free.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, email: &str) -> Result<()> {
        match self.identity.find_user_by_email(email).await? {
            Some(user) => {
                self.plans.set_plan_free(user.id).await?;
                info!(user_id = %user.id, "Plan downgraded to free");
            }
            None => warn!("Cancellation event matched no user"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;
    use crate::error::Error;
    use chrono::Duration;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Transition {
        Pro(Uuid, DateTime<Utc>),
        Free(Uuid),
    }

    #[derive(Default)]
    struct RecordingPlans {
        transitions: Mutex<Vec<Transition>>,
    }

    #[async_trait::async_trait]
    impl PlanStore for RecordingPlans {
        async fn set_plan_pro(&self, id: Uuid, reset_date: DateTime<Utc>) -> Result<()> {
            self.transitions
                .lock()
                .unwrap()
                .push(Transition::Pro(id, reset_date));
            Ok(())
        }

        async fn set_plan_free(&self, id: Uuid) -> Result<()> {
            self.transitions.lock().unwrap().push(Transition::Free(id));
            Ok(())
        }
    }

    struct StubIdentity {
        known: Vec<AuthUser>,
    }

    #[async_trait::async_trait]
    impl IdentityProvider for StubIdentity {
        async fn verify_token(&self, _token: &str) -> Result<AuthUser> {
            Err(Error::Unauthorized)
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
            Ok(self
                .known
                .iter()
                .find(|u| u.email.as_deref() == Some(email))
                .cloned())
        }
    }

    fn sync_with(known: Vec<AuthUser>) -> (BillingSync, Arc<RecordingPlans>) {
        let plans = Arc::new(RecordingPlans::default());
        let sync = BillingSync::new(plans.clone(), Arc::new(StubIdentity { known }));
        (sync, plans)
    }

    #[tokio::test]
    async fn test_checkout_with_user_id_upgrades_directly() {
        let (sync, plans) = sync_with(vec![]);
        let id = Uuid::new_v4();
        let now = Utc::now();

        sync.activate_pro(CustomerRef::UserId(id), now).await.unwrap();

        let transitions = plans.transitions.lock().unwrap();
        assert_eq!(
            *transitions,
            vec![Transition::Pro(id, now + Duration::days(30))]
        );
    }

    #[tokio::test]
    async fn test_checkout_falls_back_to_email_lookup() {
        let id = Uuid::new_v4();
        let (sync, plans) = sync_with(vec![AuthUser {
            id,
            email: Some("buyer@example.com".to_string()),
        }]);

        sync.activate_pro(CustomerRef::Email("buyer@example.com".to_string()), Utc::now())
            .await
            .unwrap();

        let transitions = plans.transitions.lock().unwrap();
        assert!(matches!(transitions[0], Transition::Pro(got, _) if got == id));
    }

    #[tokio::test]
    async fn test_unknown_customer_is_ignored() {
        let (sync, plans) = sync_with(vec![]);

        sync.activate_pro(CustomerRef::Email("ghost@example.com".to_string()), Utc::now())
            .await
            .unwrap();
        sync.deactivate("ghost@example.com").await.unwrap();

        assert!(plans.transitions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_downgrades_via_email() {
        let id = Uuid::new_v4();
        let (sync, plans) = sync_with(vec![AuthUser {
            id,
            email: Some("churn@example.com".to_string()),
        }]);

        sync.deactivate("churn@example.com").await.unwrap();

        let transitions = plans.transitions.lock().unwrap();
        assert_eq!(*transitions, vec![Transition::Free(id)]);
    }
}
