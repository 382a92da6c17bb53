use anyhow::{Context, Result};
use bytes::Bytes;
use http::{Request, Response};
use transit::HttpRequest;

/// Outbound HTTP over a shared `reqwest` connection pool.
#[derive(Clone, Debug, Default)]
pub struct Provider {
    client: reqwest::Client,
}

impl Provider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpRequest for Provider {
    async fn fetch(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let request = reqwest::Request::try_from(request).context("converting request")?;
        let response = self.client.execute(request).await.context("sending request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.context("reading response body")?;

        let mut reply = Response::builder().status(status);
        if let Some(reply_headers) = reply.headers_mut() {
            reply_headers.extend(headers);
        }
        reply.body(body).context("building response")
    }
}
