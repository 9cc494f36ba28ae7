//! HTTP client for the member directory service.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;

use super::{DirectoryError, Member, MemberDirectory};

/// Failures specific to the HTTP directory backend.
#[derive(Debug, Error)]
pub enum HttpDirectoryError {
    /// Required environment variable is missing.
    #[error("missing directory environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build directory client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a directory endpoint could not be sent.
    #[error("failed to send directory request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The directory returned an unexpected status code.
    #[error("unexpected directory response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed.
    #[error("failed to decode directory response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<HttpDirectoryError> for DirectoryError {
    fn from(err: HttpDirectoryError) -> Self {
        let message = err.to_string();
        DirectoryError::unavailable(message, err)
    }
}

/// Connection settings for [`HttpMemberDirectory`].
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
}

impl DirectoryConfig {
    pub fn from_env() -> Result<Self, HttpDirectoryError> {
        let base_url = std::env::var("DIRECTORY_URL")
            .map_err(|_| HttpDirectoryError::MissingEnvVar {
                var: "DIRECTORY_URL",
            })?;
        let bearer_token = std::env::var("DIRECTORY_TOKEN").ok();
        Ok(Self {
            base_url,
            bearer_token,
        })
    }
}

/// Member directory backed by a remote HTTP service.
#[derive(Clone)]
pub struct HttpMemberDirectory {
    client: Client,
    base_url: Arc<str>,
    bearer_token: Option<Arc<str>>,
}

impl HttpMemberDirectory {
    /// Build the client from connection settings.
    pub fn new(config: DirectoryConfig) -> Result<Self, HttpDirectoryError> {
        let client = Client::builder()
            .build()
            .map_err(|source| HttpDirectoryError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            bearer_token: config.bearer_token.map(Arc::<str>::from),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        if let Some(ref token) = self.bearer_token {
            builder.bearer_auth(token.as_ref())
        } else {
            builder
        }
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, HttpDirectoryError> {
        let path = "members";
        let response = self.request(Method::GET, path).send().await.map_err(
            |source| HttpDirectoryError::RequestSend {
                path: path.to_owned(),
                source,
            },
        )?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpDirectoryError::RequestStatus {
                path: path.to_owned(),
                status,
            });
        }

        response
            .json::<Vec<Member>>()
            .await
            .map_err(|source| HttpDirectoryError::DecodeResponse {
                path: path.to_owned(),
                source,
            })
    }

    async fn fetch_member(&self, id: String) -> Result<Member, DirectoryError> {
        let path = format!("members/{id}");
        let response = self
            .request(Method::GET, &path)
            .send()
            .await
            .map_err(|source| HttpDirectoryError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DirectoryError::MissingMember { id }),
            status if status.is_success() => {
                response
                    .json::<Member>()
                    .await
                    .map_err(|source| {
                        HttpDirectoryError::DecodeResponse { path, source }.into()
                    })
            }
            status => Err(HttpDirectoryError::RequestStatus { path, status }.into()),
        }
    }
}

impl MemberDirectory for HttpMemberDirectory {
    fn list_members(&self) -> BoxFuture<'static, Result<Vec<Member>, DirectoryError>> {
        let directory = self.clone();
        Box::pin(async move { directory.fetch_members().await.map_err(Into::into) })
    }

    fn get_member(&self, id: String) -> BoxFuture<'static, Result<Member, DirectoryError>> {
        let directory = self.clone();
        Box::pin(async move { directory.fetch_member(id).await })
    }
}
