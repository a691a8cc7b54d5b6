//! Box API connector implementation
//!
//! Implements the `StorageProvider` trait for the Box Content API v2.0.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::http::{MultipartForm, MultipartPart};
use bridge_traits::storage::{RemoteItem, StorageProvider};
use bytes::Bytes;
use core_auth::TokenSource;
use core_runtime::BoxEndpoints;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{BoxError, Result, NAME_CONFLICT_CODE};
use crate::types::{
    ApiErrorBody, BoxItem, NewItemRequest, ParentRef, ReplaceAttributes, UploadResponse,
};

/// Box API connector
///
/// Every request carries the session's bearer token and is sent once. When
/// Box answers `401` the token source is refreshed once and the request is
/// sent again. Timeouts are left to the transport.
///
/// # Example
///
/// ```ignore
/// use provider_box::BoxConnector;
/// use bridge_traits::storage::StorageProvider;
///
/// let connector = BoxConnector::new(http_client, session, BoxEndpoints::default());
/// let folder = connector.create_folder("0", "reports").await?;
/// ```
pub struct BoxConnector {
    http_client: Arc<dyn HttpClient>,
    token_source: Arc<dyn TokenSource>,
    endpoints: BoxEndpoints,
}

impl BoxConnector {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        token_source: Arc<dyn TokenSource>,
        endpoints: BoxEndpoints,
    ) -> Self {
        Self {
            http_client,
            token_source,
            endpoints,
        }
    }

    /// Send an authorized request, renewing the token once on `401`.
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let token = self.token_source.access_token().await?;
        let response = self
            .http_client
            .execute_with_retry(request.clone().bearer_token(token), RetryPolicy::no_retry())
            .await?;

        let response = if response.status == 401 {
            warn!("Access token rejected, refreshing and retrying once");
            let token = self.token_source.refresh().await?;
            self.http_client
                .execute_with_retry(request.bearer_token(token), RetryPolicy::no_retry())
                .await?
        } else {
            response
        };

        if response.is_success() {
            debug!(status = response.status, "Box request succeeded");
            Ok(response)
        } else {
            Err(Self::error_from_response(&response))
        }
    }

    /// Map a non-2xx response onto the typed error model
    fn error_from_response(response: &HttpResponse) -> BoxError {
        let body = serde_json::from_slice::<ApiErrorBody>(&response.body).ok();
        let code = body.as_ref().and_then(|b| b.code.clone());

        if let (409, Some(code)) = (response.status, code.as_deref()) {
            if code == NAME_CONFLICT_CODE {
                let conflicting_id = body
                    .as_ref()
                    .and_then(|b| b.conflicting_id())
                    .map(str::to_string);
                debug!(code, conflicting_id = ?conflicting_id, "Box reported a name conflict");
                return BoxError::NameConflict {
                    code: code.to_string(),
                    conflicting_id,
                };
            }
        }

        let message = body
            .and_then(|b| b.message)
            .unwrap_or_else(|| String::from_utf8_lossy(&response.body).to_string());
        warn!(status = response.status, code = ?code, "Box request failed");

        BoxError::ApiError {
            status_code: response.status,
            code,
            message,
        }
    }

    fn content_form<T: Serialize>(attributes: &T, name: &str, content: Bytes) -> Result<MultipartForm> {
        let attributes = serde_json::to_string(attributes)
            .map_err(|e| BoxError::ParseError(format!("Failed to encode attributes: {}", e)))?;

        // Box requires the attributes part to precede the file part
        Ok(MultipartForm::new()
            .part(MultipartPart::text("attributes", attributes))
            .part(MultipartPart::file("file", name, None, content)))
    }

    fn uploaded_item(response: &HttpResponse, name: &str) -> Result<RemoteItem> {
        let upload: UploadResponse = serde_json::from_slice(&response.body).map_err(|e| {
            BoxError::ParseError(format!("Failed to parse upload response: {}", e))
        })?;

        let item = upload
            .entries
            .into_iter()
            .next()
            .ok_or_else(|| BoxError::ParseError("Upload response has no entries".to_string()))?;

        Ok(RemoteItem::file(item.id, item.name.unwrap_or_else(|| name.to_string())))
    }

    async fn create_folder_inner(&self, parent_id: &str, name: &str) -> Result<RemoteItem> {
        let request = HttpRequest::new(
            HttpMethod::Post,
            format!("{}/folders", self.endpoints.api_base),
        )
        .json(&NewItemRequest {
            name,
            parent: ParentRef { id: parent_id },
        })?;

        let response = self.send(request).await?;
        let folder: BoxItem = serde_json::from_slice(&response.body).map_err(|e| {
            BoxError::ParseError(format!("Failed to parse folder response: {}", e))
        })?;

        info!(folder_id = %folder.id, "Created Box folder");
        Ok(RemoteItem::folder(
            folder.id,
            folder.name.unwrap_or_else(|| name.to_string()),
        ))
    }

    async fn upload_file_inner(
        &self,
        parent_id: &str,
        name: &str,
        content: Bytes,
    ) -> Result<RemoteItem> {
        let attributes = NewItemRequest {
            name,
            parent: ParentRef { id: parent_id },
        };
        let request = HttpRequest::new(
            HttpMethod::Post,
            format!("{}/files/content", self.endpoints.upload_base),
        )
        .multipart(Self::content_form(&attributes, name, content)?);

        let response = self.send(request).await?;
        let item = Self::uploaded_item(&response, name)?;

        info!(file_id = %item.id, "Uploaded file to Box");
        Ok(item)
    }

    async fn update_file_contents_inner(
        &self,
        file_id: &str,
        name: &str,
        content: Bytes,
    ) -> Result<RemoteItem> {
        let request = HttpRequest::new(
            HttpMethod::Post,
            format!("{}/files/{}/content", self.endpoints.upload_base, file_id),
        )
        .multipart(Self::content_form(&ReplaceAttributes { name }, name, content)?);

        let response = self.send(request).await?;
        let item = Self::uploaded_item(&response, name)?;

        info!(file_id = %item.id, "Replaced Box file contents");
        Ok(item)
    }
}

#[async_trait]
impl StorageProvider for BoxConnector {
    #[instrument(skip(self), fields(parent_id = %parent_id))]
    async fn create_folder(&self, parent_id: &str, name: &str) -> BridgeResult<RemoteItem> {
        Ok(self.create_folder_inner(parent_id, name).await?)
    }

    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn upload_file(
        &self,
        parent_id: &str,
        name: &str,
        content: Bytes,
    ) -> BridgeResult<RemoteItem> {
        Ok(self.upload_file_inner(parent_id, name, content).await?)
    }

    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn update_file_contents(
        &self,
        file_id: &str,
        name: &str,
        content: Bytes,
    ) -> BridgeResult<RemoteItem> {
        Ok(self
            .update_file_contents_inner(file_id, name, content)
            .await?)
    }
}
