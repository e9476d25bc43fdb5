//! CRUD collections: assets, users, categories, locations, transactions, notifications

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::request::RequestDescriptor;
use crate::types::{ApiEnvelope, Record};
use serde::Serialize;
use std::fmt::Display;

/// A REST collection rooted at `/{collection}`
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    client: &'a ApiClient,
    collection: &'static str,
}

impl ApiClient {
    /// Handle for an arbitrary collection
    pub const fn resource(&self, collection: &'static str) -> Resource<'_> {
        Resource {
            client: self,
            collection,
        }
    }

    pub const fn assets(&self) -> Resource<'_> {
        self.resource("assets")
    }

    pub const fn users(&self) -> Resource<'_> {
        self.resource("users")
    }

    pub const fn categories(&self) -> Resource<'_> {
        self.resource("categories")
    }

    pub const fn locations(&self) -> Resource<'_> {
        self.resource("locations")
    }

    pub const fn transactions(&self) -> Resource<'_> {
        self.resource("transactions")
    }

    pub const fn notifications(&self) -> Resource<'_> {
        self.resource("notifications")
    }
}

impl Resource<'_> {
    fn collection_path(&self) -> String {
        format!("/{}", self.collection)
    }

    fn item_path(&self, id: impl Display) -> String {
        format!("/{}/{id}", self.collection)
    }

    /// List records, with filter and paging parameters
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<ApiEnvelope<Vec<Record>>, ClientError> {
        let request =
            RequestDescriptor::get(self.collection_path()).query_pairs(query.iter().copied());
        self.client.execute(request).await
    }

    /// Fetch one record
    pub async fn get(&self, id: impl Display) -> Result<ApiEnvelope<Record>, ClientError> {
        self.client
            .execute(RequestDescriptor::get(self.item_path(id)))
            .await
    }

    /// Create a record
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<ApiEnvelope<Record>, ClientError> {
        let request = RequestDescriptor::post(self.collection_path()).json(body)?;
        self.client.execute(request).await
    }

    /// Replace a record's fields
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: impl Display,
        body: &B,
    ) -> Result<ApiEnvelope<Record>, ClientError> {
        let request = RequestDescriptor::put(self.item_path(id)).json(body)?;
        self.client.execute(request).await
    }

    /// Delete a record
    pub async fn remove(&self, id: impl Display) -> Result<ApiEnvelope<Option<Record>>, ClientError> {
        let response = self
            .client
            .request(RequestDescriptor::delete(self.item_path(id)))
            .await?;

        // 204 No Content carries no envelope
        if response.body().is_empty() {
            return Ok(ApiEnvelope {
                data: None,
                message: None,
                pagination: None,
            });
        }
        response.json()
    }
}
