use crate::api::error::ApiError;
use crate::session::Session;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum AppEvent {
    SignedIn {
        result: Result<Session, ApiError>,
    },
    ListFetched {
        resource: &'static str,
        generation: u64,
        result: Result<Vec<Value>, ApiError>,
    },
    RecordFetched {
        resource: &'static str,
        id: u64,
        result: Result<Value, ApiError>,
    },
    RecordDeleted {
        resource: &'static str,
        id: u64,
        result: Result<(), ApiError>,
    },
    StatusPushed {
        resource: &'static str,
        id: u64,
        status: bool,
        result: Result<(), ApiError>,
    },
    RecordSaved {
        resource: &'static str,
        created: bool,
        result: Result<(), ApiError>,
    },
}
