use crate::controller::{format_number, FieldValue, ListController, LoadState, Row};
use crate::resources::{FieldKind, ResourceSpec};
use crate::theme::Theme;
use eframe::egui::{self, RichText};

#[derive(Debug, Clone, PartialEq)]
pub enum TableIntent {
    Refresh,
    Create,
    Edit { id: u64 },
    RequestDelete { id: u64, subject: String },
    RequestStatus { id: u64, status: bool, subject: String },
}

pub fn column_totals(spec: &ResourceSpec, rows: &[Row]) -> Vec<Option<f64>> {
    spec.columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            (column.aggregate && column.kind == FieldKind::Number).then(|| {
                rows.iter()
                    .map(|row| match row.values.get(index) {
                        Some(FieldValue::Number(value)) => *value,
                        _ => 0.0,
                    })
                    .sum()
            })
        })
        .collect()
}

pub fn render_list(
    ui: &mut egui::Ui,
    theme: &Theme,
    controller: &ListController,
) -> Vec<TableIntent> {
    let mut intents = Vec::new();
    let spec = controller.spec();

    theme.toolbar_frame().show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.heading(spec.title);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    intents.push(TableIntent::Refresh);
                }
                if spec.editable && ui.button(format!("New {}", spec.singular)).clicked() {
                    intents.push(TableIntent::Create);
                }
            });
        });
    });
    ui.add_space(theme.spacing_8);

    match controller.state() {
        LoadState::Idle | LoadState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Loading...").color(theme.text_muted));
            });
        }
        LoadState::Failed => {
            theme.card_frame().show(ui, |ui| {
                let message = controller.error().unwrap_or("request failed");
                ui.label(RichText::new(message).color(theme.danger));
                ui.add_space(theme.spacing_8);
                if ui.button("Retry").clicked() {
                    intents.push(TableIntent::Refresh);
                }
            });
        }
        LoadState::Loaded => {
            render_rows(ui, theme, controller, &mut intents);
        }
    }

    intents
}

fn render_rows(
    ui: &mut egui::Ui,
    theme: &Theme,
    controller: &ListController,
    intents: &mut Vec<TableIntent>,
) {
    let spec = controller.spec();
    let rows = controller.rows();

    if rows.is_empty() {
        ui.label(RichText::new(format!("No {} yet", spec.title.to_lowercase())).color(theme.text_muted));
        return;
    }

    let mut column_count = spec.columns.len() + 1;
    if spec.has_status {
        column_count += 1;
    }

    egui::ScrollArea::vertical()
        .id_salt((spec.key, "list_scroll"))
        .show(ui, |ui| {
            egui::Grid::new((spec.key, "list_grid"))
                .striped(true)
                .num_columns(column_count)
                .spacing(egui::vec2(theme.spacing_16, theme.spacing_8))
                .show(ui, |ui| {
                    for column in spec.columns {
                        ui.label(RichText::new(column.label).strong().color(theme.text_muted));
                    }
                    if spec.has_status {
                        ui.label(RichText::new("Status").strong().color(theme.text_muted));
                    }
                    ui.label(RichText::new("Actions").strong().color(theme.text_muted));
                    ui.end_row();

                    for row in rows {
                        for value in &row.values {
                            ui.label(value.display());
                        }
                        if spec.has_status {
                            render_status_cell(ui, theme, spec, row, intents);
                        }
                        ui.horizontal(|ui| {
                            if spec.editable && ui.button("Edit").clicked() {
                                intents.push(TableIntent::Edit { id: row.id });
                            }
                            let delete = egui::Button::new(
                                RichText::new("Delete").color(theme.danger),
                            )
                            .stroke(theme.subtle_button_stroke())
                            .corner_radius(egui::CornerRadius::same(theme.radius_8));
                            if ui.add(delete).clicked() {
                                intents.push(TableIntent::RequestDelete {
                                    id: row.id,
                                    subject: row.subject(spec),
                                });
                            }
                        });
                        ui.end_row();
                    }
                });
        });

    ui.add_space(theme.spacing_12);
    render_footer(ui, theme, spec, rows);
}

fn render_status_cell(
    ui: &mut egui::Ui,
    theme: &Theme,
    spec: &'static ResourceSpec,
    row: &Row,
    intents: &mut Vec<TableIntent>,
) {
    let current = row.status.unwrap_or(false);
    let mut selected = current;
    egui::ComboBox::from_id_salt((spec.key, row.id, "status"))
        .selected_text(
            RichText::new(status_label(current)).color(theme.status_color(current)),
        )
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut selected, true, status_label(true));
            ui.selectable_value(&mut selected, false, status_label(false));
        });
    if selected != current {
        intents.push(TableIntent::RequestStatus {
            id: row.id,
            status: selected,
            subject: row.subject(spec),
        });
    }
}

fn render_footer(ui: &mut egui::Ui, theme: &Theme, spec: &ResourceSpec, rows: &[Row]) {
    let totals = column_totals(spec, rows);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new(format!("{} records", rows.len()))
                .color(theme.text_muted)
                .size(12.0),
        );
        for (column, total) in spec.columns.iter().zip(&totals) {
            if let Some(total) = total {
                ui.separator();
                ui.label(
                    RichText::new(format!("{} total: {}", column.label, format_number(*total)))
                        .color(theme.text_muted)
                        .size(12.0),
                );
            }
        }
    });
}

pub fn status_label(published: bool) -> &'static str {
    if published {
        "Published"
    } else {
        "Unpublished"
    }
}

#[cfg(test)]
mod tests {
    use super::{column_totals, status_label};
    use crate::controller::normalize_record;
    use crate::resources::find;
    use serde_json::json;

    #[test]
    fn totals_cover_only_aggregate_numeric_columns() {
        let spec = find("policies").expect("policies resource should exist");
        let rows = vec![
            normalize_record(spec, &json!({"id": 1, "name": "A", "premium": 120.5})),
            normalize_record(spec, &json!({"id": 2, "name": "B", "premium": 79.5})),
            normalize_record(spec, &json!({"id": 3, "name": "C"})),
        ];

        let totals = column_totals(spec, &rows);
        assert_eq!(totals.len(), spec.columns.len());

        let premium_index = spec
            .columns
            .iter()
            .position(|column| column.key == "premium")
            .expect("policies should have a premium column");
        assert_eq!(totals[premium_index], Some(200.0));

        for (index, column) in spec.columns.iter().enumerate() {
            if !column.aggregate {
                assert_eq!(totals[index], None, "{} should not total", column.key);
            }
        }
    }

    #[test]
    fn non_aggregate_numeric_columns_are_skipped() {
        let spec = find("tax-records").expect("tax resource should exist");
        let rows = vec![normalize_record(spec, &json!({"id": 1, "rate": 21.0}))];
        assert!(column_totals(spec, &rows).iter().all(Option::is_none));
    }

    #[test]
    fn status_labels_match_the_published_flag() {
        assert_eq!(status_label(true), "Published");
        assert_eq!(status_label(false), "Unpublished");
    }
}
