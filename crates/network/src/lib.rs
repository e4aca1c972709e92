use reqwest::Client;
use std::{future::IntoFuture, time::Duration};
use tokio::sync::Semaphore;

/// Requests allowed in flight at once. Resolution and download jobs both
/// draw from this pool.
const DEFAULT_CONCURRENCY: usize = 10;

/// Give up on any single request after this long rather than hang the run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Wrapper around [`Client`] with a concurrent request limit enforced by the
/// [`Semaphore`] mechanism.
#[derive(Debug)]
pub struct ThrottledClient {
    semaphore: Semaphore,
    client: Client,
}

impl ThrottledClient {
    /// Construct a throttled client with `concurrency` permits.
    pub fn new(concurrency: usize) -> Self {
        let semaphore = Semaphore::new(concurrency);
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("construct HTTP client");
        ThrottledClient { semaphore, client }
    }

    /// Acquire a permit and run `proc` with the underlying [`Client`].
    pub async fn run_with_permit<Proc, ProcFuture>(&self, proc: Proc) -> ProcFuture::Output
    where
        Proc: FnOnce(&Client) -> ProcFuture,
        ProcFuture: IntoFuture,
    {
        let permit =
            self.semaphore.acquire().await.expect("semaphore shouldn't have been closed this soon");
        let result = proc(&self.client).await;
        drop(permit);
        result
    }
}

impl Default for ThrottledClient {
    fn default() -> Self {
        ThrottledClient::new(DEFAULT_CONCURRENCY)
    }
}
