//! Network side of the collections: snapshot fetches, mutations and the
//! notification side-channel.

use std::future::Future;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{HouseholdError, HouseholdResult};
use crate::notify::FamilyNotification;
use crate::record::{Collection, Record};

/// The collection endpoints.
///
/// All calls are single attempts; callers decide what a failure means.
pub trait Remote: Send + Sync + 'static {
    fn fetch<R: Record>(
        &self,
        family_id: &str,
    ) -> impl Future<Output = HouseholdResult<Vec<R>>> + Send;

    fn create<R: Record>(&self, record: &R) -> impl Future<Output = HouseholdResult<R>> + Send;

    fn update<R: Record>(
        &self,
        id: &str,
        patch: &R::Patch,
    ) -> impl Future<Output = HouseholdResult<R>> + Send;

    fn delete<R: Record>(&self, id: &str) -> impl Future<Output = HouseholdResult<()>> + Send;
}

/// Family notification dispatcher.
pub trait Notifier: Send + Sync + 'static {
    fn notify(
        &self,
        notification: &FamilyNotification,
    ) -> impl Future<Output = HouseholdResult<()>> + Send;
}

/// Body of a PUT: the id plus only the changed fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateBody<P> {
    pub id: String,
    #[serde(flatten)]
    pub patch: P,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// [`Remote`] and [`Notifier`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> HouseholdResult<Self> {
        // Single attempt with no client timeout.
        let http = reqwest::Client::builder().build()?;

        Ok(HttpRemote {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, collection: Collection) -> String {
        format!("{}/api/{}", self.base_url, collection.path())
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> HouseholdResult<Response> {
        let resp = self.authorized(req).send().await?;
        check_status(resp).await
    }
}

async fn check_status(resp: Response) -> HouseholdResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(HouseholdError::Unauthorized);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);

    Err(HouseholdError::Server {
        status: status.as_u16(),
        message,
    })
}

impl Remote for HttpRemote {
    /// GET /api/<collection>?familyId=
    async fn fetch<R: Record>(&self, family_id: &str) -> HouseholdResult<Vec<R>> {
        let req = self
            .http
            .get(self.url(R::COLLECTION))
            .query(&[("familyId", family_id)]);
        Ok(self.send(req).await?.json().await?)
    }

    /// POST /api/<collection>
    async fn create<R: Record>(&self, record: &R) -> HouseholdResult<R> {
        let req = self.http.post(self.url(R::COLLECTION)).json(record);
        Ok(self.send(req).await?.json().await?)
    }

    /// PUT /api/<collection>
    async fn update<R: Record>(&self, id: &str, patch: &R::Patch) -> HouseholdResult<R> {
        let body = UpdateBody {
            id: id.to_string(),
            patch,
        };
        let req = self.http.put(self.url(R::COLLECTION)).json(&body);
        Ok(self.send(req).await?.json().await?)
    }

    /// DELETE /api/<collection>?id=
    async fn delete<R: Record>(&self, id: &str) -> HouseholdResult<()> {
        let req = self
            .http
            .delete(self.url(R::COLLECTION))
            .query(&[("id", id)]);
        self.send(req).await?;
        Ok(())
    }
}

impl Notifier for HttpRemote {
    /// POST /api/notifications
    async fn notify(&self, notification: &FamilyNotification) -> HouseholdResult<()> {
        let req = self
            .http
            .post(format!("{}/api/notifications", self.base_url))
            .json(notification);
        self.send(req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExpensePatch;

    #[test]
    fn update_body_flattens_the_patch() {
        let body = UpdateBody {
            id: "srv-1".to_string(),
            patch: ExpensePatch {
                amount: Some(12.0),
                ..Default::default()
            },
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "id": "srv-1", "amount": 12.0 })
        );
    }

    #[test]
    fn base_url_is_normalized() {
        let remote = HttpRemote::new("http://127.0.0.1:4100/", None).unwrap();
        assert_eq!(
            remote.url(Collection::HomeChores),
            "http://127.0.0.1:4100/api/home-chores"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_responses_are_awaited() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            tokio::time::sleep(std::time::Duration::from_secs(20)).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]",
                )
                .await
                .unwrap();
        });

        let remote = HttpRemote::new(format!("http://{addr}"), None).unwrap();
        let rows = remote.fetch::<crate::model::ShopItem>("fam-1").await.unwrap();
        assert!(rows.is_empty());
    }
}
