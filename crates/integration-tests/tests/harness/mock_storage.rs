//! S3-compatible storage double backed by wiremock

use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An object received by the mock store
pub struct ReceivedObject {
    pub path: String,
    pub content_type: Option<String>,
    pub acl: Option<String>,
    pub body: Vec<u8>,
}

/// Mock object store accepting or rejecting every `PUT`
pub struct MockStorage {
    server: MockServer,
}

impl MockStorage {
    /// Start a store that accepts all uploads
    pub async fn start() -> Self {
        Self::start_with(ResponseTemplate::new(200).insert_header("ETag", "\"mock-etag\"")).await
    }

    /// Start a store that denies all uploads
    pub async fn start_denying() -> Self {
        let denied = ResponseTemplate::new(403).set_body_raw(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
            "application/xml",
        );
        Self::start_with(denied).await
    }

    async fn start_with(response: ResponseTemplate) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("PUT")).respond_with(response).mount(&server).await;

        Self { server }
    }

    /// Endpoint URL for the storage configuration
    pub fn endpoint(&self) -> String {
        self.server.uri()
    }

    /// Uploads received so far, in arrival order
    pub async fn objects(&self) -> Vec<ReceivedObject> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.method.as_str() == "PUT")
            .map(|request| {
                let header = |name: &str| {
                    request
                        .headers
                        .get(name)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_owned)
                };

                ReceivedObject {
                    path: request.url.path().to_owned(),
                    content_type: header("content-type"),
                    acl: header("x-amz-acl"),
                    body: request.body.clone(),
                }
            })
            .collect()
    }
}
