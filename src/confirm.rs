#[derive(Debug, Clone, PartialEq)]
pub enum GateAction {
    Delete {
        resource: &'static str,
        id: u64,
    },
    SetStatus {
        resource: &'static str,
        id: u64,
        status: bool,
    },
}

impl GateAction {
    fn stages(&self) -> u8 {
        match self {
            Self::Delete { .. } => 2,
            Self::SetStatus { .. } => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingConfirm {
    pub action: GateAction,
    pub subject: String,
    stage: u8,
}

impl PendingConfirm {
    pub fn prompt(&self) -> String {
        match (&self.action, self.stage) {
            (GateAction::Delete { .. }, 0) => format!("Delete {}?", self.subject),
            (GateAction::Delete { .. }, _) => format!(
                "{} will be removed permanently. Delete anyway?",
                self.subject
            ),
            (GateAction::SetStatus { status, .. }, _) => {
                let target = if *status { "Published" } else { "Unpublished" };
                format!("Set {} to {target}?", self.subject)
            }
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        match (&self.action, self.stage) {
            (GateAction::Delete { .. }, 0) => "Yes, delete",
            (GateAction::Delete { .. }, _) => "Delete permanently",
            (GateAction::SetStatus { .. }, _) => "Confirm",
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfirmGate {
    pending: Option<PendingConfirm>,
}

impl ConfirmGate {
    pub fn request(&mut self, action: GateAction, subject: impl Into<String>) {
        self.pending = Some(PendingConfirm {
            action,
            subject: subject.into(),
            stage: 0,
        });
    }

    pub fn pending(&self) -> Option<&PendingConfirm> {
        self.pending.as_ref()
    }

    pub fn confirm(&mut self) -> Option<GateAction> {
        let mut pending = self.pending.take()?;
        pending.stage += 1;
        if pending.stage >= pending.action.stages() {
            Some(pending.action)
        } else {
            self.pending = Some(pending);
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
