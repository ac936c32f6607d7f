use crate::controller::normalize_record;
use crate::resources::{FieldKind, ResourceSpec};
use crate::theme::Theme;
use eframe::egui::{self, RichText};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormIntent {
    Submit,
    Cancel,
}

pub struct RecordEditor {
    pub resource: &'static str,
    pub record_id: Option<u64>,
    drafts: Vec<String>,
    pub loading: bool,
    pub submitting: bool,
    pub error: Option<String>,
}

impl RecordEditor {
    pub fn create(spec: &'static ResourceSpec) -> Self {
        Self {
            resource: spec.key,
            record_id: None,
            drafts: vec![String::new(); spec.columns.len()],
            loading: false,
            submitting: false,
            error: None,
        }
    }

    pub fn edit(spec: &'static ResourceSpec, id: u64) -> Self {
        Self {
            resource: spec.key,
            record_id: Some(id),
            drafts: vec![String::new(); spec.columns.len()],
            loading: true,
            submitting: false,
            error: None,
        }
    }

    pub fn populate(&mut self, spec: &'static ResourceSpec, raw: &Value) {
        let row = normalize_record(spec, raw);
        self.drafts = row.values.iter().map(|value| value.display()).collect();
        self.loading = false;
    }

    #[cfg(test)]
    fn set_draft(&mut self, index: usize, value: &str) {
        self.drafts[index] = value.to_string();
    }

    pub fn title(&self, spec: &ResourceSpec) -> String {
        match self.record_id {
            Some(_) => format!("Edit {}", spec.singular),
            None => format!("New {}", spec.singular),
        }
    }

    pub fn payload(&self, spec: &ResourceSpec) -> Result<Value, String> {
        let mut object = Map::new();
        for (column, draft) in spec.columns.iter().zip(&self.drafts) {
            let value = match column.kind {
                FieldKind::Text => Value::String(draft.trim().to_string()),
                FieldKind::Number => {
                    let trimmed = draft.trim();
                    let number: f64 = if trimmed.is_empty() {
                        0.0
                    } else {
                        trimmed
                            .parse()
                            .map_err(|_| format!("{} must be a number", column.label))?
                    };
                    Value::from(number)
                }
            };
            object.insert(column.key.to_string(), value);
        }
        Ok(Value::Object(object))
    }

    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        theme: &Theme,
        spec: &'static ResourceSpec,
    ) -> Option<FormIntent> {
        let mut intent = None;

        if self.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Loading record...").color(theme.text_muted));
            });
            if ui.button("Cancel").clicked() {
                intent = Some(FormIntent::Cancel);
            }
            return intent;
        }

        if let Some(error) = &self.error {
            ui.label(RichText::new(error).color(theme.danger));
            ui.add_space(theme.spacing_8);
        }

        for (column, draft) in spec.columns.iter().zip(self.drafts.iter_mut()) {
            ui.label(RichText::new(column.label).color(theme.text_muted).size(12.0));
            ui.add(
                egui::TextEdit::singleline(draft)
                    .desired_width(f32::INFINITY)
                    .hint_text(match column.kind {
                        FieldKind::Text => "",
                        FieldKind::Number => "0",
                    }),
            );
            ui.add_space(theme.spacing_4);
        }

        ui.add_space(theme.spacing_8);
        ui.horizontal(|ui| {
            let save_label = if self.submitting { "Saving..." } else { "Save" };
            if ui
                .add_enabled(!self.submitting, egui::Button::new(save_label))
                .clicked()
            {
                intent = Some(FormIntent::Submit);
            }
            if ui.button("Cancel").clicked() {
                intent = Some(FormIntent::Cancel);
            }
        });

        intent
    }
}

#[cfg(test)]
mod tests {
    use super::RecordEditor;
    use crate::resources::find;
    use serde_json::json;

    #[test]
    fn payload_parses_numeric_drafts() {
        let spec = find("policies").expect("policies resource should exist");
        let mut editor = RecordEditor::create(spec);
        editor.populate(
            spec,
            &json!({"id": 3, "name": "Gold", "category": "Life", "cover": "Full", "premium": 149.99}),
        );

        let payload = editor.payload(spec).expect("payload should build");
        assert_eq!(payload["name"], json!("Gold"));
        assert_eq!(payload["premium"], json!(149.99));
    }

    #[test]
    fn payload_rejects_a_non_numeric_draft_by_label() {
        let spec = find("policies").expect("policies resource should exist");
        let mut editor = RecordEditor::create(spec);
        editor.populate(spec, &json!({"id": 3, "premium": "not-a-number"}));

        let error = editor.payload(spec);
        assert!(error.is_ok(), "placeholder premium normalizes to zero");

        let premium_index = spec
            .columns
            .iter()
            .position(|column| column.key == "premium")
            .expect("policies should have a premium column");
        let mut editor = RecordEditor::create(spec);
        editor.set_draft(premium_index, "abc");
        let error = editor.payload(spec).expect_err("bad number should fail");
        assert!(error.contains("Premium"));
    }

    #[test]
    fn empty_numeric_drafts_default_to_zero() {
        let spec = find("policies").expect("policies resource should exist");
        let editor = RecordEditor::create(spec);
        let payload = editor.payload(spec).expect("payload should build");
        assert_eq!(payload["premium"], json!(0.0));
    }

    #[test]
    fn populate_clears_the_loading_flag() {
        let spec = find("brands").expect("brands resource should exist");
        let mut editor = RecordEditor::edit(spec, 5);
        assert!(editor.loading);
        editor.populate(spec, &json!({"id": 5, "name": "Acme", "about": "tools"}));
        assert!(!editor.loading);
    }
}
