use crate::api::ApiClient;
use crate::backend::BackendProcess;
use crate::confirm::{ConfirmGate, GateAction};
use crate::controller::{ListController, LoadState};
use crate::event::AppEvent;
use crate::resources::{self, ResourceSpec, RESOURCES};
use crate::session::{unix_timestamp, Session};
use crate::theme::Theme;
use crate::ui::form::{FormIntent, RecordEditor};
use crate::ui::table::{self, TableIntent};
use eframe::egui::{self, RichText};
use log::warn;
use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, TryRecvError};

const DIAGNOSTICS_LIMIT: usize = 200;

#[derive(Default)]
struct LoginForm {
    username: String,
    password: String,
    error: Option<String>,
    in_flight: bool,
}

pub struct OpsDeskApp {
    rx: Receiver<AppEvent>,
    api: ApiClient,
    backend: BackendProcess,
    theme: Theme,
    theme_applied: bool,
    session: Option<Session>,
    active: Option<&'static str>,
    controllers: BTreeMap<&'static str, ListController>,
    gate: ConfirmGate,
    editor: Option<RecordEditor>,
    login: LoginForm,
    diagnostics_log: Vec<String>,
}

impl OpsDeskApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        api: ApiClient,
        backend: BackendProcess,
        initial_session: Option<Session>,
    ) -> Self {
        let mut app = Self {
            rx,
            api,
            backend,
            theme: Theme::default(),
            theme_applied: false,
            session: initial_session,
            active: None,
            controllers: BTreeMap::new(),
            gate: ConfirmGate::default(),
            editor: None,
            login: LoginForm::default(),
            diagnostics_log: Vec::new(),
        };

        if app.session.is_some() {
            app.activate_default_resource();
        }
        app
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", unix_timestamp(), message.into()));
        if self.diagnostics_log.len() > DIAGNOSTICS_LIMIT {
            let overflow = self.diagnostics_log.len() - DIAGNOSTICS_LIMIT;
            self.diagnostics_log.drain(..overflow);
        }
    }

    fn visible_resources(&self) -> Vec<&'static ResourceSpec> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        RESOURCES
            .iter()
            .filter(|spec| spec.visible_to(session.role))
            .collect()
    }

    fn activate_default_resource(&mut self) {
        if let Some(spec) = self.visible_resources().first().copied() {
            self.switch_resource(spec);
        }
    }

    fn switch_resource(&mut self, spec: &'static ResourceSpec) {
        if self.active == Some(spec.key) {
            return;
        }

        if let Some(previous) = self.active.and_then(|key| self.controllers.get_mut(key)) {
            previous.reset();
        }
        self.gate.cancel();
        self.editor = None;
        self.active = Some(spec.key);

        let controller = self
            .controllers
            .entry(spec.key)
            .or_insert_with(|| ListController::new(spec));
        let generation = controller.begin_fetch();
        self.api.fetch_list(spec, generation);
    }

    fn refresh_active(&mut self) {
        let Some(controller) = self.active.and_then(|key| self.controllers.get_mut(key)) else {
            return;
        };
        let spec = controller.spec();
        let generation = controller.begin_fetch();
        self.api.fetch_list(spec, generation);
    }

    fn expire_session(&mut self) {
        self.api.sign_out();
        self.session = None;
        self.active = None;
        self.controllers.clear();
        self.editor = None;
        self.gate.cancel();
        self.login = LoginForm::default();
        self.log_diagnostic("session expired, sign in again");
    }

    fn sign_out(&mut self) {
        self.api.sign_out();
        self.session = None;
        self.active = None;
        self.controllers.clear();
        self.editor = None;
        self.gate.cancel();
        self.login = LoginForm::default();
        self.log_diagnostic("signed out");
    }

    fn auth_failure<T>(result: &Result<T, crate::api::error::ApiError>) -> bool {
        matches!(result, Err(err) if err.is_auth_failure())
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, Some(ctx)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: Option<&egui::Context>) {
        match event {
            AppEvent::SignedIn { result } => {
                self.login.in_flight = false;
                match result {
                    Ok(session) => {
                        self.log_diagnostic(format!(
                            "signed in as {} ({})",
                            session.user_id,
                            session.role.label()
                        ));
                        self.session = Some(session);
                        self.login = LoginForm::default();
                        self.activate_default_resource();
                    }
                    Err(err) => {
                        self.login.error = Some(err.to_string());
                    }
                }
            }
            AppEvent::ListFetched {
                resource,
                generation,
                result,
            } => {
                if Self::auth_failure(&result) {
                    self.expire_session();
                    return;
                }
                let Some(controller) = self.controllers.get_mut(resource) else {
                    return;
                };
                if !controller.apply_list(generation, result) {
                    warn!("discarded stale list result for {resource}");
                    return;
                }
                if controller.state() == LoadState::Failed {
                    let message = controller
                        .error()
                        .unwrap_or("request failed")
                        .to_string();
                    self.log_diagnostic(format!("loading {resource} failed: {message}"));
                }
            }
            AppEvent::RecordFetched {
                resource,
                id,
                result,
            } => {
                if Self::auth_failure(&result) {
                    self.expire_session();
                    return;
                }
                let Some(editor) = self.editor.as_mut() else {
                    return;
                };
                if editor.resource != resource || editor.record_id != Some(id) {
                    return;
                }
                match result {
                    Ok(raw) => {
                        if let Some(spec) = resources::find(resource) {
                            editor.populate(spec, &raw);
                        }
                    }
                    Err(err) => {
                        self.editor = None;
                        self.log_diagnostic(format!("could not open record for editing: {err}"));
                    }
                }
            }
            AppEvent::RecordDeleted {
                resource,
                id,
                result,
            } => {
                if Self::auth_failure(&result) {
                    self.expire_session();
                    return;
                }
                let Some(controller) = self.controllers.get_mut(resource) else {
                    return;
                };
                match controller.apply_delete(id, result) {
                    Some(message) => {
                        self.log_diagnostic(format!("delete in {resource} failed: {message}"))
                    }
                    None => self.log_diagnostic(format!("deleted record {id} from {resource}")),
                }
            }
            AppEvent::StatusPushed {
                resource,
                id,
                status,
                result,
            } => {
                if Self::auth_failure(&result) {
                    self.expire_session();
                    return;
                }
                let Some(controller) = self.controllers.get_mut(resource) else {
                    return;
                };
                match controller.apply_status(id, status, result) {
                    Some(message) => {
                        self.log_diagnostic(format!("status change in {resource} failed: {message}"))
                    }
                    None => self.log_diagnostic(format!(
                        "record {id} in {resource} is now {}",
                        table::status_label(status)
                    )),
                }
            }
            AppEvent::RecordSaved {
                resource,
                created,
                result,
            } => {
                if Self::auth_failure(&result) {
                    self.expire_session();
                    return;
                }
                match result {
                    Ok(()) => {
                        self.editor = None;
                        self.log_diagnostic(format!(
                            "{} record in {resource}",
                            if created { "created" } else { "updated" }
                        ));
                        self.refresh_active();
                    }
                    Err(err) => {
                        if let Some(editor) = self.editor.as_mut() {
                            editor.submitting = false;
                            editor.error = Some(err.to_string());
                        } else {
                            self.log_diagnostic(format!("save in {resource} failed: {err}"));
                        }
                    }
                }
            }
        }

        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    }

    fn submit_login(&mut self) {
        let username = self.login.username.trim().to_string();
        if username.is_empty() || self.login.password.is_empty() {
            self.login.error = Some("username and password are required".to_string());
            return;
        }
        self.login.error = None;
        self.login.in_flight = true;
        self.api.sign_in(username, self.login.password.clone());
    }

    fn render_login(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let card_width = 360.0;
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.22);
                ui.set_max_width(card_width);
                self.theme.card_frame().show(ui, |ui| {
                    ui.heading("OpsDesk");
                    ui.label(
                        RichText::new("Sign in to manage the back office")
                            .color(self.theme.text_muted),
                    );
                    ui.add_space(self.theme.spacing_12);

                    let mut submit = false;
                    ui.label(RichText::new("Username").size(12.0).color(self.theme.text_muted));
                    ui.add(
                        egui::TextEdit::singleline(&mut self.login.username)
                            .desired_width(f32::INFINITY),
                    );
                    ui.label(RichText::new("Password").size(12.0).color(self.theme.text_muted));
                    let password = ui.add(
                        egui::TextEdit::singleline(&mut self.login.password)
                            .password(true)
                            .desired_width(f32::INFINITY),
                    );
                    if password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit = true;
                    }

                    if let Some(error) = &self.login.error {
                        ui.add_space(self.theme.spacing_4);
                        ui.label(RichText::new(error).color(self.theme.danger));
                    }

                    ui.add_space(self.theme.spacing_8);
                    let label = if self.login.in_flight {
                        "Signing in..."
                    } else {
                        "Sign in"
                    };
                    let sign_in = egui::Button::new(
                        RichText::new(label).color(self.theme.text_on_accent),
                    )
                    .fill(self.theme.accent_primary)
                    .min_size(egui::vec2(0.0, self.theme.button_height));
                    if ui.add_enabled(!self.login.in_flight, sign_in).clicked() {
                        submit = true;
                    }

                    if submit && !self.login.in_flight {
                        self.submit_login();
                    }
                });
            });
        });
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let (user_label, role_label) = match &self.session {
            Some(session) => (session.user_id.clone(), session.role.label()),
            None => (String::new(), ""),
        };

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("OpsDesk");
                ui.separator();
                ui.label(RichText::new(format!("{user_label} · {role_label}")).color(self.theme.text_muted));
                ui.separator();
                let backend_label = if self.backend.is_managed() {
                    "Backend: managed"
                } else {
                    "Backend: external"
                };
                ui.label(RichText::new(backend_label).color(self.theme.text_muted));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Sign out").clicked() {
                        self.sign_out();
                    }
                });
            });
        });
    }

    fn render_nav_panel(&mut self, ctx: &egui::Context) {
        let visible = self.visible_resources();
        let mut clicked: Option<&'static ResourceSpec> = None;

        egui::SidePanel::left("resources_panel")
            .resizable(true)
            .default_width(190.0)
            .show(ctx, |ui| {
                ui.heading("Resources");
                ui.separator();
                for spec in visible {
                    let selected = self.active == Some(spec.key);
                    if ui.selectable_label(selected, spec.title).clicked() {
                        clicked = Some(spec);
                    }
                }
            });

        if let Some(spec) = clicked {
            self.switch_resource(spec);
        }
    }

    fn render_list_panel(&mut self, ctx: &egui::Context) {
        let mut intents: Vec<TableIntent> = Vec::new();
        let active = self.active;

        egui::CentralPanel::default().show(ctx, |ui| {
            match active.and_then(|key| self.controllers.get(key)) {
                Some(controller) => {
                    intents = table::render_list(ui, &self.theme, controller);
                }
                None => {
                    ui.label(
                        RichText::new("Select a resource from the left panel")
                            .color(self.theme.text_muted),
                    );
                }
            }

            ui.add_space(self.theme.spacing_12);
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });
        });

        if let Some(spec) = active.and_then(resources::find) {
            for intent in intents {
                self.handle_table_intent(spec, intent);
            }
        }
    }

    fn handle_table_intent(&mut self, spec: &'static ResourceSpec, intent: TableIntent) {
        match intent {
            TableIntent::Refresh => self.refresh_active(),
            TableIntent::Create => {
                self.editor = Some(RecordEditor::create(spec));
            }
            TableIntent::Edit { id } => {
                self.editor = Some(RecordEditor::edit(spec, id));
                self.api.fetch_record(spec, id);
            }
            TableIntent::RequestDelete { id, subject } => {
                self.gate.request(
                    GateAction::Delete {
                        resource: spec.key,
                        id,
                    },
                    subject,
                );
            }
            TableIntent::RequestStatus {
                id,
                status,
                subject,
            } => {
                self.gate.request(
                    GateAction::SetStatus {
                        resource: spec.key,
                        id,
                        status,
                    },
                    subject,
                );
            }
        }
    }

    fn dispatch_gate_action(&mut self, action: GateAction) {
        match action {
            GateAction::Delete { resource, id } => {
                if let Some(spec) = resources::find(resource) {
                    self.api.request_delete(spec, id);
                }
            }
            GateAction::SetStatus {
                resource,
                id,
                status,
            } => {
                if let Some(spec) = resources::find(resource) {
                    self.api.request_set_status(spec, id, status);
                }
            }
        }
    }

    fn render_confirm_modal(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.gate.pending() else {
            return;
        };
        let prompt = pending.prompt();
        let confirm_label = pending.confirm_label();

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Please confirm")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(prompt);
                ui.add_space(self.theme.spacing_8);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                    let confirm = egui::Button::new(
                        RichText::new(confirm_label).color(self.theme.text_on_accent),
                    )
                    .fill(self.theme.danger);
                    if ui.add(confirm).clicked() {
                        confirmed = true;
                    }
                });
            });

        if cancelled {
            self.gate.cancel();
        } else if confirmed {
            if let Some(action) = self.gate.confirm() {
                self.dispatch_gate_action(action);
            }
        }
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        let Some(mut editor) = self.editor.take() else {
            return;
        };
        let Some(spec) = resources::find(editor.resource) else {
            return;
        };

        let mut intent = None;
        egui::Window::new(editor.title(spec))
            .collapsible(false)
            .resizable(false)
            .default_width(380.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                intent = editor.render(ui, &self.theme, spec);
            });

        match intent {
            Some(FormIntent::Cancel) => {}
            Some(FormIntent::Submit) => {
                match editor.payload(spec) {
                    Ok(payload) => {
                        editor.submitting = true;
                        editor.error = None;
                        self.api.submit_record(spec, editor.record_id, payload);
                    }
                    Err(message) => editor.error = Some(message),
                }
                self.editor = Some(editor);
            }
            None => self.editor = Some(editor),
        }
    }
}

impl eframe::App for OpsDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            self.theme.apply_visuals(ctx);
            self.theme_applied = true;
        }

        self.drain_events(ctx);

        if self.session.is_none() {
            self.render_login(ctx);
            return;
        }

        self.render_top_bar(ctx);
        self.render_nav_panel(ctx);
        self.render_list_panel(ctx);
        self.render_confirm_modal(ctx);
        self.render_editor(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.backend.shutdown();
    }
}
