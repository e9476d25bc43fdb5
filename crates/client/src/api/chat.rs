//! Dashboard, report and chat query endpoints

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::request::RequestDescriptor;
use crate::types::{ApiEnvelope, ChatQueryRequest, Record};

impl ApiClient {
    /// Dashboard data, optionally narrowed to one section (`/dashboard/{section}`)
    pub async fn dashboard(&self, section: Option<&str>) -> Result<ApiEnvelope<Record>, ClientError> {
        let path = section.map_or_else(
            || "/dashboard".to_string(),
            |section| format!("/dashboard/{}", section.trim_matches('/')),
        );
        self.execute(RequestDescriptor::get(path)).await
    }

    /// Run a named report with filter parameters
    pub async fn report(
        &self,
        name: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiEnvelope<Record>, ClientError> {
        let request = RequestDescriptor::get(format!("/reports/{}", name.trim_matches('/')))
            .query_pairs(query.iter().copied());
        self.execute(request).await
    }

    /// Ask a natural language question about the inventory
    pub async fn chat_query(&self, message: &str) -> Result<ApiEnvelope<Record>, ClientError> {
        let request = RequestDescriptor::post("/chat/query").json(&ChatQueryRequest {
            message: message.to_string(),
        })?;
        self.execute(request).await
    }
}
