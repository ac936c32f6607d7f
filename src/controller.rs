use crate::api::error::ApiError;
use crate::resources::{FieldKind, ResourceSpec};
use serde_json::Value;

pub const TEXT_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => format_number(*value),
        }
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    pub status: Option<bool>,
    pub values: Vec<FieldValue>,
}

impl Row {
    pub fn subject(&self, spec: &ResourceSpec) -> String {
        let name = self
            .values
            .first()
            .map(FieldValue::display)
            .unwrap_or_else(|| self.id.to_string());
        format!("{} \"{}\"", spec.singular, name)
    }
}

fn coerce_id(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|raw| raw.parse().ok()))
        .unwrap_or(0)
}

fn coerce_status(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(raw)) => {
            matches!(raw.to_ascii_lowercase().as_str(), "published" | "true")
        }
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn coerce_field(kind: FieldKind, value: Option<&Value>) -> FieldValue {
    match kind {
        FieldKind::Text => {
            let text = value.and_then(|raw| match raw {
                Value::String(text) if !text.is_empty() => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                Value::Bool(flag) => Some(flag.to_string()),
                _ => None,
            });
            FieldValue::Text(text.unwrap_or_else(|| TEXT_PLACEHOLDER.to_string()))
        }
        FieldKind::Number => {
            let number = value.and_then(|raw| {
                raw.as_f64()
                    .or_else(|| raw.as_str().and_then(|text| text.parse().ok()))
            });
            FieldValue::Number(number.unwrap_or(0.0))
        }
    }
}

pub fn normalize_record(spec: &ResourceSpec, raw: &Value) -> Row {
    let id = raw.get("id").map(coerce_id).unwrap_or(0);
    let status = spec
        .has_status
        .then(|| coerce_status(raw.get("status")));
    let values = spec
        .columns
        .iter()
        .map(|column| coerce_field(column.kind, raw.get(column.key)))
        .collect();
    Row { id, status, values }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

pub struct ListController {
    spec: &'static ResourceSpec,
    state: LoadState,
    rows: Vec<Row>,
    error: Option<String>,
    generation: u64,
}

impl ListController {
    pub fn new(spec: &'static ResourceSpec) -> Self {
        Self {
            spec,
            state: LoadState::Idle,
            rows: Vec::new(),
            error: None,
            generation: 0,
        }
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.error = None;
        self.generation
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = LoadState::Idle;
        self.rows.clear();
        self.error = None;
    }

    pub fn apply_list(&mut self, generation: u64, result: Result<Vec<Value>, ApiError>) -> bool {
        if generation != self.generation {
            return false;
        }

        match result {
            Ok(raw_records) => {
                self.rows = raw_records
                    .iter()
                    .map(|raw| normalize_record(self.spec, raw))
                    .collect();
                self.state = LoadState::Loaded;
                self.error = None;
            }
            Err(err) => {
                self.rows.clear();
                self.state = LoadState::Failed;
                self.error = Some(err.to_string());
            }
        }
        true
    }

    pub fn apply_delete(&mut self, id: u64, result: Result<(), ApiError>) -> Option<String> {
        match result {
            Ok(()) => {
                self.rows.retain(|row| row.id != id);
                None
            }
            Err(err) => Some(err.to_string()),
        }
    }

    pub fn apply_status(
        &mut self,
        id: u64,
        status: bool,
        result: Result<(), ApiError>,
    ) -> Option<String> {
        match result {
            Ok(()) => {
                for row in &mut self.rows {
                    if row.id == id {
                        row.status = Some(status);
                    }
                }
                None
            }
            Err(err) => Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_number, normalize_record, FieldValue, ListController, LoadState, TEXT_PLACEHOLDER,
    };
    use crate::api::error::ApiError;
    use crate::resources::find;
    use serde_json::{json, Value};

    fn categories() -> &'static crate::resources::ResourceSpec {
        find("categories").expect("categories resource should exist")
    }

    fn policies() -> &'static crate::resources::ResourceSpec {
        find("policies").expect("policies resource should exist")
    }

    fn loaded_controller(raw: Vec<Value>) -> ListController {
        let mut controller = ListController::new(categories());
        let generation = controller.begin_fetch();
        assert!(controller.apply_list(generation, Ok(raw)));
        assert_eq!(controller.state(), LoadState::Loaded);
        controller
    }

    #[test]
    fn list_success_normalizes_every_raw_record() {
        let controller = loaded_controller(vec![
            json!({"id": 1, "name": "Travel", "brand": "Acme", "about": "trips", "status": true}),
            json!({"id": 2, "name": "Home"}),
            json!({"id": 3}),
        ]);

        assert_eq!(controller.rows().len(), 3);
        for row in controller.rows() {
            assert_eq!(row.values.len(), categories().columns.len());
        }

        let second = &controller.rows()[1];
        assert_eq!(second.values[0], FieldValue::Text("Home".to_string()));
        assert_eq!(
            second.values[1],
            FieldValue::Text(TEXT_PLACEHOLDER.to_string())
        );
        assert_eq!(second.status, Some(false));
    }

    #[test]
    fn normalize_accepts_enum_status_and_string_ids() {
        let row = normalize_record(
            categories(),
            &json!({"id": "17", "name": "Life", "status": "Published"}),
        );
        assert_eq!(row.id, 17);
        assert_eq!(row.status, Some(true));

        let row = normalize_record(
            categories(),
            &json!({"id": 18, "name": "Auto", "status": "Unpublished"}),
        );
        assert_eq!(row.status, Some(false));
    }

    #[test]
    fn normalize_defaults_missing_numbers_to_zero() {
        let row = normalize_record(policies(), &json!({"id": 4, "name": "Silver"}));
        let premium_index = policies()
            .columns
            .iter()
            .position(|column| column.key == "premium")
            .expect("policies should have a premium column");
        assert_eq!(row.values[premium_index], FieldValue::Number(0.0));
    }

    #[test]
    fn statusless_resources_normalize_without_status() {
        let feedback = find("feedback").expect("feedback resource should exist");
        let row = normalize_record(feedback, &json!({"id": 9, "user": "ana", "rating": 4}));
        assert_eq!(row.status, None);
    }

    #[test]
    fn delete_removes_only_the_matching_row_in_order() {
        let mut controller = loaded_controller(vec![
            json!({"id": 1, "name": "A"}),
            json!({"id": 2, "name": "B"}),
            json!({"id": 3, "name": "C"}),
        ]);
        let before = controller.rows().to_vec();

        let surfaced = controller.apply_delete(2, Ok(()));
        assert!(surfaced.is_none());
        assert_eq!(controller.rows().len(), 2);
        assert!(controller.rows().iter().all(|row| row.id != 2));
        assert_eq!(controller.rows()[0], before[0]);
        assert_eq!(controller.rows()[1], before[2]);
    }

    #[test]
    fn status_change_patches_in_place_and_is_idempotent() {
        let mut controller = loaded_controller(vec![
            json!({"id": 1, "name": "A", "status": false}),
            json!({"id": 2, "name": "B", "status": false}),
        ]);
        let untouched = controller.rows()[1].clone();
        let values_before = controller.rows()[0].values.clone();

        assert!(controller.apply_status(1, true, Ok(())).is_none());
        let after_once = controller.rows().to_vec();
        assert_eq!(after_once[0].status, Some(true));
        assert_eq!(after_once[0].values, values_before);
        assert_eq!(after_once[1], untouched);

        assert!(controller.apply_status(1, true, Ok(())).is_none());
        assert_eq!(controller.rows(), after_once.as_slice());
    }

    #[test]
    fn failed_delete_leaves_the_collection_untouched() {
        let mut controller =
            loaded_controller(vec![json!({"id": 1, "name": "A"}), json!({"id": 2})]);
        let before = controller.rows().to_vec();

        let surfaced =
            controller.apply_delete(1, Err(ApiError::NotFound("id 1".to_string())));
        assert!(surfaced.is_some());
        assert_eq!(controller.rows(), before.as_slice());
        assert_eq!(controller.state(), LoadState::Loaded);
    }

    #[test]
    fn failed_status_change_leaves_the_collection_untouched() {
        let mut controller = loaded_controller(vec![json!({"id": 1, "status": false})]);
        let before = controller.rows().to_vec();

        let surfaced = controller.apply_status(
            1,
            true,
            Err(ApiError::Server {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        assert!(surfaced.is_some());
        assert_eq!(controller.rows(), before.as_slice());
    }

    #[test]
    fn list_failure_ends_in_failed_state_with_empty_collection() {
        let mut controller = ListController::new(categories());
        let generation = controller.begin_fetch();

        let applied = controller.apply_list(
            generation,
            Err(ApiError::Network("connection refused".to_string())),
        );
        assert!(applied);
        assert_eq!(controller.state(), LoadState::Failed);
        assert!(controller.rows().is_empty());
        assert!(controller
            .error()
            .is_some_and(|message| message.contains("connection refused")));
    }

    #[test]
    fn stale_generation_results_are_discarded() {
        let mut controller = ListController::new(categories());
        let stale = controller.begin_fetch();
        let current = controller.begin_fetch();

        assert!(!controller.apply_list(stale, Ok(vec![json!({"id": 1})])));
        assert_eq!(controller.state(), LoadState::Loading);
        assert!(controller.rows().is_empty());

        assert!(controller.apply_list(current, Ok(vec![json!({"id": 2})])));
        assert_eq!(controller.rows().len(), 1);
        assert_eq!(controller.rows()[0].id, 2);
    }

    #[test]
    fn reset_discards_rows_and_invalidates_inflight_fetches() {
        let mut controller = loaded_controller(vec![json!({"id": 1})]);
        let inflight = controller.begin_fetch();

        controller.reset();
        assert_eq!(controller.state(), LoadState::Idle);
        assert!(controller.rows().is_empty());
        assert!(!controller.apply_list(inflight, Ok(vec![json!({"id": 5})])));
        assert!(controller.rows().is_empty());
    }

    #[test]
    fn format_number_drops_trailing_zero_fractions() {
        assert_eq!(format_number(1200.0), "1200");
        assert_eq!(format_number(12.5), "12.50");
        assert_eq!(format_number(0.0), "0");
    }
}
