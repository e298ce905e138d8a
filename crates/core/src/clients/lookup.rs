use crate::traits::{AvailabilityLookup, LocalityProvider, ProductLookup};
use crate::{AvailabilityRequest, SearchError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Answers id lookups through the availability collaborator, scoped to the
/// session's current locality.
pub struct AvailabilityProductLookup<A> {
    availability: A,
    locality: Arc<dyn LocalityProvider + Send + Sync>,
    fallback_locality: u32,
    user_id: Option<u64>,
}

impl<A> AvailabilityProductLookup<A>
where
    A: AvailabilityLookup + Send + Sync,
{
    pub fn new(
        availability: A,
        locality: Arc<dyn LocalityProvider + Send + Sync>,
        fallback_locality: u32,
    ) -> Self {
        Self {
            availability,
            locality,
            fallback_locality,
            user_id: None,
        }
    }

    pub fn for_user(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[async_trait]
impl<A> ProductLookup for AvailabilityProductLookup<A>
where
    A: AvailabilityLookup + Send + Sync,
{
    async fn products_by_ids(&self, ids: &[u64]) -> Result<Value, SearchError> {
        let request = AvailabilityRequest {
            product_ids: ids.to_vec(),
            city_id: self
                .locality
                .current_locality()
                .unwrap_or(self.fallback_locality),
            user_id: self.user_id,
        };

        self.availability
            .dynamic_data(&request)
            .await
            .map_err(|error| match error {
                SearchError::Application(message) => SearchError::Lookup(message),
                other => other,
            })
    }
}
