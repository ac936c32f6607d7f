use crate::event::AppEvent;
use crate::resources::ResourceSpec;
use crate::session::{store, unix_timestamp, Role, Session, SCHEMA_VERSION};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{mpsc, Arc, RwLock};
use tokio::runtime::Handle;

pub mod error;

use error::ApiError;

const BODY_PREVIEW_LIMIT: usize = 160;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tx: mpsc::Sender<AppEvent>,
    session: Arc<RwLock<Option<Session>>>,
    runtime_handle: Handle,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    auth_token: String,
    #[serde(default)]
    refresh_token: String,
    user_id: Value,
    role: Role,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        tx: mpsc::Sender<AppEvent>,
        runtime_handle: Handle,
        initial_session: Option<Session>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
            tx,
            session: Arc::new(RwLock::new(initial_session)),
            runtime_handle,
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn install_session(&self, session: Option<Session>) {
        let mut slot = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = session;
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url, path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let request = match self.current_session() {
            Some(session) => request.bearer_auth(session.auth_token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), extract_message(&body)));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|err| ApiError::Server {
            status: status.as_u16(),
            message: format!("invalid response body: {err}"),
        })
    }

    pub fn resource(&self, spec: &'static ResourceSpec) -> ResourceClient<'_> {
        ResourceClient { api: self, spec }
    }

    pub fn fetch_list(&self, spec: &'static ResourceSpec, generation: u64) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client.resource(spec).list().await;
            match &result {
                Ok(records) => info!("fetched {} {} records", records.len(), spec.key),
                Err(err) => error!("list {} failed: {err}", spec.key),
            }
            let _ = client.tx.send(AppEvent::ListFetched {
                resource: spec.key,
                generation,
                result,
            });
        });
    }

    pub fn fetch_record(&self, spec: &'static ResourceSpec, id: u64) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client.resource(spec).get_by_id(id).await;
            if let Err(err) = &result {
                error!("get {} id {id} failed: {err}", spec.key);
            }
            let _ = client.tx.send(AppEvent::RecordFetched {
                resource: spec.key,
                id,
                result,
            });
        });
    }

    pub fn request_delete(&self, spec: &'static ResourceSpec, id: u64) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client.resource(spec).delete(id).await;
            match &result {
                Ok(()) => info!("deleted {} id {id}", spec.key),
                Err(err) => error!("delete {} id {id} failed: {err}", spec.key),
            }
            let _ = client.tx.send(AppEvent::RecordDeleted {
                resource: spec.key,
                id,
                result,
            });
        });
    }

    pub fn request_set_status(&self, spec: &'static ResourceSpec, id: u64, status: bool) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client
                .resource(spec)
                .set_status(id, status)
                .await
                .map(|_| ());
            match &result {
                Ok(()) => info!("updated status of {} id {id} to {status}", spec.key),
                Err(err) => error!("status update for {} id {id} failed: {err}", spec.key),
            }
            let _ = client.tx.send(AppEvent::StatusPushed {
                resource: spec.key,
                id,
                status,
                result,
            });
        });
    }

    pub fn submit_record(&self, spec: &'static ResourceSpec, id: Option<u64>, payload: Value) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let created = id.is_none();
            let result = match id {
                Some(id) => client.resource(spec).update(id, payload).await,
                None => client.resource(spec).create(payload).await,
            }
            .map(|_| ());
            match &result {
                Ok(()) if created => info!("created {} record", spec.singular),
                Ok(()) => info!("updated {} record", spec.singular),
                Err(err) => error!("save of {} failed: {err}", spec.singular),
            }
            let _ = client.tx.send(AppEvent::RecordSaved {
                resource: spec.key,
                created,
                result,
            });
        });
    }

    pub fn sign_in(&self, username: String, password: String) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let request = client
                .http
                .post(client.endpoint("login"))
                .json(&json!({ "username": username, "password": password }));
            let result = client.execute(request).await.and_then(|value| {
                serde_json::from_value::<LoginResponse>(value).map_err(|err| ApiError::Server {
                    status: 200,
                    message: format!("invalid login response: {err}"),
                })
            });

            let result = result.map(|login| {
                let session = Session {
                    schema_version: SCHEMA_VERSION,
                    auth_token: login.auth_token,
                    refresh_token: login.refresh_token,
                    user_id: stringify_user_id(&login.user_id),
                    role: login.role,
                    signed_in_at: unix_timestamp(),
                };
                if let Err(err) = store::save(&session) {
                    warn!("failed to persist session: {err}");
                }
                client.install_session(Some(session.clone()));
                info!("signed in as {} ({})", session.user_id, session.role.label());
                session
            });
            if let Err(err) = &result {
                error!("sign-in failed: {err}");
            }
            let _ = client.tx.send(AppEvent::SignedIn { result });
        });
    }

    pub fn sign_out(&self) {
        self.install_session(None);
        if let Err(err) = store::clear() {
            warn!("failed to clear persisted session: {err}");
        }
        info!("signed out");
    }
}

pub struct ResourceClient<'a> {
    api: &'a ApiClient,
    spec: &'static ResourceSpec,
}

impl ResourceClient<'_> {
    pub async fn list(&self) -> Result<Vec<Value>, ApiError> {
        let value = self
            .api
            .execute(self.api.http.get(self.api.endpoint(self.spec.path)))
            .await?;
        as_record_list(value).ok_or_else(|| ApiError::Server {
            status: 200,
            message: format!("expected a list of {} records", self.spec.singular),
        })
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Value, ApiError> {
        let request = self
            .api
            .http
            .get(self.api.endpoint(self.spec.path))
            .query(&[("id", id)]);
        let value = self.api.execute(request).await?;
        as_single_record(value).ok_or_else(|| ApiError::NotFound(format!(
            "{} id {id}",
            self.spec.singular
        )))
    }

    pub async fn create(&self, payload: Value) -> Result<Value, ApiError> {
        let request = self
            .api
            .http
            .post(self.api.endpoint(self.spec.path))
            .json(&payload);
        self.api.execute(request).await
    }

    pub async fn update(&self, id: u64, payload: Value) -> Result<Value, ApiError> {
        let request = self
            .api
            .http
            .put(self.api.endpoint(self.spec.path))
            .query(&[("id", id)])
            .json(&payload);
        self.api.execute(request).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let request = self
            .api
            .http
            .delete(self.api.endpoint(self.spec.path))
            .query(&[("id", id)]);
        self.api.execute(request).await.map(|_| ())
    }

    pub async fn set_status(&self, id: u64, status: bool) -> Result<Value, ApiError> {
        let request = self
            .api
            .http
            .put(self.api.endpoint(self.spec.path))
            .query(&[("id", id)])
            .json(&json!({ "status": status }));
        self.api.execute(request).await
    }
}

fn stringify_user_id(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_string();
    }
    trimmed.chars().take(BODY_PREVIEW_LIMIT).collect()
}

fn as_record_list(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

fn as_single_record(value: Value) -> Option<Value> {
    match value {
        Value::Object(_) => Some(value),
        Value::Array(items) => items.into_iter().next(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{as_record_list, as_single_record, extract_message, stringify_user_id};
    use serde_json::json;

    #[test]
    fn extract_message_prefers_structured_detail_fields() {
        assert_eq!(
            extract_message(r#"{"detail": "name already taken"}"#),
            "name already taken"
        );
        assert_eq!(
            extract_message(r#"{"message": "bad input"}"#),
            "bad input"
        );
        assert_eq!(extract_message("plain text failure"), "plain text failure");
        assert_eq!(extract_message("   "), "no response body");
    }

    #[test]
    fn record_lists_unwrap_bare_arrays_and_data_envelopes() {
        let bare = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(as_record_list(bare).map(|items| items.len()), Some(2));

        let envelope = json!({"data": [{"id": 1}]});
        assert_eq!(as_record_list(envelope).map(|items| items.len()), Some(1));

        assert!(as_record_list(json!({"rows": []})).is_none());
        assert!(as_record_list(json!(42)).is_none());
    }

    #[test]
    fn single_records_accept_objects_and_first_array_element() {
        assert!(as_single_record(json!({"id": 1})).is_some());
        assert_eq!(
            as_single_record(json!([{"id": 5}, {"id": 6}])).and_then(|v| v["id"].as_u64()),
            Some(5)
        );
        assert!(as_single_record(json!([])).is_none());
        assert!(as_single_record(json!(null)).is_none());
    }

    #[test]
    fn user_ids_keep_strings_unquoted() {
        assert_eq!(stringify_user_id(&json!("u-12")), "u-12");
        assert_eq!(stringify_user_id(&json!(12)), "12");
    }
}
