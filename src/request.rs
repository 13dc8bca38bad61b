use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::types::{Dataset, Identity};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    // The backend expects an empty string rather than a missing field
    pub email: String,
}

/// Client for the equipment API. Every request carries the session cookie.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            client: Client::new(),
        }
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::Endpoint(format!("{path}: {err}")))
    }

    pub async fn upload_csv(&self, filename: &str, bytes: Vec<u8>) -> Result<Dataset, ApiError> {
        debug!(filename, size = bytes.len(), "uploading csv");

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let request = self.client.post(self.endpoint("upload/")?).multipart(form);
        self.fetch_json(request).await
    }

    #[allow(dead_code)]
    pub async fn dataset_summary(&self, id: u64) -> Result<Dataset, ApiError> {
        let request = self.client.get(self.endpoint(&format!("summary/{id}/"))?);
        self.fetch_json(request).await
    }

    pub async fn dataset_history(&self) -> Result<Vec<Dataset>, ApiError> {
        let request = self.client.get(self.endpoint("history/")?);
        self.fetch_json(request).await
    }

    #[allow(dead_code)]
    pub async fn all_datasets(&self) -> Result<Vec<Dataset>, ApiError> {
        let request = self.client.get(self.endpoint("datasets/")?);
        self.fetch_json(request).await
    }

    pub async fn dataset(&self, id: u64) -> Result<Dataset, ApiError> {
        let request = self.client.get(self.endpoint(&format!("datasets/{id}/"))?);
        self.fetch_json(request).await
    }

    pub async fn download_pdf(&self, id: u64) -> Result<Vec<u8>, ApiError> {
        let request = self
            .client
            .get(self.endpoint(&format!("datasets/{id}/download_pdf/"))?);
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;

        debug!(id, size = bytes.len(), "pdf report downloaded");

        Ok(bytes.to_vec())
    }

    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.endpoint("auth/register/")?)
            .json(registration);
        self.send(request).await.map(drop)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        let request = self
            .client
            .post(self.endpoint("auth/login/")?)
            .json(credentials);
        self.fetch_json(request).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = self.client.post(self.endpoint("auth/logout/")?);
        self.send(request).await.map(drop)
    }

    pub async fn current_user(&self) -> Result<Identity, ApiError> {
        let request = self.client.get(self.endpoint("auth/user/")?);
        self.fetch_json(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = with_credentials(request).send().await?;
        let status = response.status();

        debug!(url = %response.url(), %status, "response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);

        debug!("request error: {err}");

        Err(err)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|err| {
            error!("deserialization error: {err}");
            err.into()
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn with_credentials(request: RequestBuilder) -> RequestBuilder {
    request.fetch_credentials_include()
}

#[cfg(not(target_arch = "wasm32"))]
fn with_credentials(request: RequestBuilder) -> RequestBuilder {
    request
}
