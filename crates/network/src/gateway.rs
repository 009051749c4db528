// crates/network/src/gateway.rs
//! Remote book collection gateway
//!
//! The gateway is the only component that talks to the catalog server. It
//! maps HTTP outcomes onto [`CatalogError`] so callers never see transport
//! details.

use crate::client::{Client, ClientConfig};
use crate::error::NetworkError;
use crate::wire::query_params;
use async_trait::async_trait;
use libris_config::ApiConfig;
use libris_core::{Book, BookDraft, BookId, BookPage, BookQuery, CatalogError, CatalogResult};
use reqwest::{Method, Url};

/// Remote collection operations
#[async_trait]
pub trait BookGateway: Send + Sync {
    /// Fetches one filtered, sorted page plus the total match count
    async fn fetch_page(&self, query: &BookQuery) -> CatalogResult<BookPage>;

    /// Fetches a single book
    async fn fetch_one(&self, id: BookId) -> CatalogResult<Book>;

    /// Creates a book; the server assigns the id
    async fn create(&self, draft: &BookDraft) -> CatalogResult<Book>;

    /// Replaces the fields of an existing book
    async fn update(&self, id: BookId, draft: &BookDraft) -> CatalogResult<Book>;

    /// Deletes a book
    async fn remove(&self, id: BookId) -> CatalogResult<()>;
}

/// Which kind of request failed; decides how a status is classified
#[derive(Debug, Clone, Copy)]
enum Operation {
    Read(Option<BookId>),
    Write(Option<BookId>),
}

impl Operation {
    fn book_id(self) -> Option<BookId> {
        match self {
            Operation::Read(id) | Operation::Write(id) => id,
        }
    }
}

/// [`BookGateway`] over the catalog REST API
#[derive(Debug, Clone)]
pub struct HttpBookGateway {
    client: Client,
    base_url: Url,
}

impl HttpBookGateway {
    /// Creates a gateway rooted at `base_url` (e.g. `http://localhost:8000`)
    pub fn new(client: Client, base_url: &str) -> CatalogResult<Self> {
        let mut base_url = Url::parse(base_url.trim()).map_err(|e| {
            CatalogError::transport(format!("Invalid API base URL '{}'", base_url), e)
        })?;

        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Builds a gateway and its HTTP client from the `[api]` config section
    pub fn from_config(api: &ApiConfig) -> CatalogResult<Self> {
        let client = Client::with_config(ClientConfig::from_api_config(api))
            .map_err(|e| CatalogError::transport("Failed to build HTTP client", e))?;
        Self::new(client, &api.base_url)
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> CatalogResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| classify(NetworkError::InvalidUrl(e.to_string()), Operation::Read(None)))
    }

    fn book_url(&self, id: BookId) -> CatalogResult<Url> {
        self.endpoint(&format!("books/{}", id))
    }
}

#[async_trait]
impl BookGateway for HttpBookGateway {
    async fn fetch_page(&self, query: &BookQuery) -> CatalogResult<BookPage> {
        let url = self.endpoint("books/combined")?;
        let page: BookPage = self
            .client
            .get_json(url, &query_params(query))
            .await
            .map_err(|e| classify(e, Operation::Read(None)))?;

        log::debug!(
            "Fetched page {} ({} of {} books)",
            query.page(),
            page.books.len(),
            page.total
        );
        Ok(page)
    }

    async fn fetch_one(&self, id: BookId) -> CatalogResult<Book> {
        let url = self.book_url(id)?;
        self.client
            .get_json(url, &[] as &[(&str, String)])
            .await
            .map_err(|e| classify(e, Operation::Read(Some(id))))
    }

    async fn create(&self, draft: &BookDraft) -> CatalogResult<Book> {
        let url = self.endpoint("books/")?;
        let book: Book = self
            .client
            .send_json(Method::POST, url, draft)
            .await
            .map_err(|e| classify(e, Operation::Write(None)))?;

        log::debug!("POST books/ -> {}", book.id);
        Ok(book)
    }

    async fn update(&self, id: BookId, draft: &BookDraft) -> CatalogResult<Book> {
        let url = self.book_url(id)?;
        let book: Book = self
            .client
            .send_json(Method::PUT, url, draft)
            .await
            .map_err(|e| classify(e, Operation::Write(Some(id))))?;

        log::debug!("PUT books/{} ok", id);
        Ok(book)
    }

    async fn remove(&self, id: BookId) -> CatalogResult<()> {
        let url = self.book_url(id)?;
        self.client
            .delete(url)
            .await
            .map_err(|e| classify(e, Operation::Write(Some(id))))?;

        log::debug!("DELETE books/{} ok", id);
        Ok(())
    }
}

/// Maps a network failure onto the catalog error taxonomy
fn classify(error: NetworkError, operation: Operation) -> CatalogError {
    match error {
        NetworkError::Status { code: 404, body } => match operation.book_id() {
            Some(id) => CatalogError::NotFound { id },
            None => CatalogError::Server {
                status: 404,
                message: error_detail(&body).unwrap_or(body),
            },
        },
        NetworkError::Status { code, body }
            if matches!(operation, Operation::Write(_)) && matches!(code, 400 | 409 | 422) =>
        {
            CatalogError::Validation {
                message: error_detail(&body).unwrap_or_else(|| format!("HTTP {}", code)),
            }
        }
        NetworkError::Status { code, body } => CatalogError::Server {
            status: code,
            message: error_detail(&body).unwrap_or(body),
        },
        NetworkError::Http(e) => match e.status() {
            Some(status) => CatalogError::Server {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None if e.is_decode() => CatalogError::InvalidResponse {
                details: e.to_string(),
            },
            None => CatalogError::transport("Request to catalog server failed", e),
        },
        NetworkError::Decode(e) => CatalogError::InvalidResponse {
            details: e.to_string(),
        },
        NetworkError::InvalidUrl(url) => CatalogError::InvalidResponse {
            details: format!("Cannot build request URL: {}", url),
        },
    }
}

/// Extracts a readable message from an error body of the form `{"detail": ...}`
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, body: &str) -> NetworkError {
        NetworkError::Status {
            code,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = Client::new().unwrap();
        let gateway = HttpBookGateway::new(client, "http://localhost:8000/api").unwrap();

        assert_eq!(gateway.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            gateway.endpoint("books/combined").unwrap().as_str(),
            "http://localhost:8000/api/books/combined"
        );
        assert_eq!(
            gateway.book_url(BookId::new(12)).unwrap().as_str(),
            "http://localhost:8000/api/books/12"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = Client::new().unwrap();
        let result = HttpBookGateway::new(client, "not a url");
        assert!(matches!(result, Err(CatalogError::Transport { .. })));
    }

    #[test]
    fn test_not_found_needs_an_id() {
        let err = classify(status(404, ""), Operation::Read(Some(BookId::new(3))));
        assert!(matches!(err, CatalogError::NotFound { id } if id == BookId::new(3)));

        let err = classify(status(404, ""), Operation::Read(None));
        assert!(matches!(err, CatalogError::Server { status: 404, .. }));
    }

    #[test]
    fn test_write_rejections_become_validation() {
        for code in [400, 409, 422] {
            let err = classify(
                status(code, r#"{"detail":"Title already exists"}"#),
                Operation::Write(None),
            );
            match err {
                CatalogError::Validation { message } => {
                    assert_eq!(message, "Title already exists")
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_read_rejection_is_server_error() {
        let err = classify(status(422, "bad page"), Operation::Read(None));
        assert!(matches!(
            err,
            CatalogError::Server { status: 422, ref message } if message == "bad page"
        ));
    }

    #[test]
    fn test_server_error() {
        let err = classify(status(503, ""), Operation::Read(None));
        assert!(matches!(err, CatalogError::Server { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_decode_failure() {
        let decode = serde_json::from_str::<BookPage>("[]").unwrap_err();
        let err = classify(NetworkError::Decode(decode), Operation::Read(None));
        assert!(matches!(err, CatalogError::InvalidResponse { .. }));
    }

    #[test]
    fn test_error_detail_shapes() {
        assert_eq!(
            error_detail(r#"{"detail":"Book not found"}"#),
            Some("Book not found".to_string())
        );
        assert_eq!(
            error_detail(r#"{"detail":[{"loc":["body","title"],"msg":"field required"}]}"#),
            Some("field required".to_string())
        );
        assert_eq!(error_detail("<html>"), None);
        assert_eq!(error_detail(r#"{"error":"x"}"#), None);
    }
}
