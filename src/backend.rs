use log::{info, warn};
use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};

pub struct BackendProcess {
    child: Option<Child>,
}

impl BackendProcess {
    pub fn launch(executable: &Path) -> io::Result<Self> {
        let child = Command::new(executable)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        info!(
            "backend process started: {} (pid {})",
            executable.display(),
            child.id()
        );
        Ok(Self { child: Some(child) })
    }

    pub fn unmanaged() -> Self {
        Self { child: None }
    }

    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }

    pub fn shutdown(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => info!("backend process already exited: {status}"),
            _ => {
                if let Err(err) = child.kill() {
                    warn!("failed to stop backend process: {err}");
                }
                let _ = child.wait();
                info!("backend process stopped");
            }
        }
    }
}

impl Drop for BackendProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::BackendProcess;
    use std::path::Path;

    #[test]
    fn launch_fails_for_a_missing_executable() {
        let result = BackendProcess::launch(Path::new("/nonexistent/opsdesk-backend"));
        assert!(result.is_err());
    }

    #[test]
    fn unmanaged_shutdown_is_a_no_op() {
        let mut backend = BackendProcess::unmanaged();
        assert!(!backend.is_managed());
        backend.shutdown();
        backend.shutdown();
    }
}
