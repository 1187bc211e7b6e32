pub mod design;

use std::path::Path;

use watch_data::{
    LiveSessionController, LiveView, Mode, SessionApi, WatchConfig, WatchError,
};
use watch_widgets::{AppAction, TimerControl, WatchAppData};

/// What the shell should do after an action was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenResponse {
    Continue,
    Quit,
}

/// The Live Detection page. Owns the session controller and maps operator
/// actions onto it; errors become a one-line notice shown with the page.
pub struct LiveDetectionScreen<A: SessionApi + Clone> {
    controller: LiveSessionController<A>,
    notice: Option<String>,
    visible: bool,
}

impl<A: SessionApi + Clone> LiveDetectionScreen<A> {
    pub fn new(api: A, config: &WatchConfig) -> Self {
        Self {
            controller: LiveSessionController::new(api, config),
            notice: None,
            visible: false,
        }
    }

    /// Load the model registry. A failure leaves the page usable with an
    /// empty model list.
    pub async fn open(&mut self) {
        match self.controller.open().await {
            Ok(Some(model)) => self.notify(format!("Switched to {}", model)),
            Ok(None) => {}
            Err(e) => self.notify_error(e),
        }
    }

    pub async fn handle_action(&mut self, action: AppAction) -> ScreenResponse {
        self.notice = None;
        let result = match action {
            AppAction::SetMode { mode } => match Mode::parse(&mode) {
                Some(mode) => self.controller.set_mode(mode).await.map(|switched| {
                    if let Some(model) = switched {
                        self.notice = Some(format!("Switched to {}", model));
                    }
                }),
                None => {
                    self.notify(format!("Unknown mode '{}' (truck or sugar)", mode));
                    Ok(())
                }
            },
            AppAction::SelectModel { model } => {
                if self.controller.mode() == Mode::Truck {
                    self.notify("Model selection is locked in Truck mode");
                    Ok(())
                } else {
                    self.controller.switch_model(&model).await.map(|_| ())
                }
            }
            AppAction::SetSource { source } => {
                self.controller.set_source(source);
                Ok(())
            }
            AppAction::Upload { path } => self.upload(Path::new(&path)).await,
            AppAction::Start => self.controller.start().await,
            AppAction::Stop => self.controller.stop().await,
            AppAction::ResetCount => self.controller.reset_bag_count().await,
            AppAction::Refresh => self.controller.refresh_registry().await.map(|_| ()),
            AppAction::Show | AppAction::Help => Ok(()),
            AppAction::Quit => return ScreenResponse::Quit,
        };

        if let Err(e) = result {
            self.notify_error(e);
        }
        ScreenResponse::Continue
    }

    async fn upload(&mut self, path: &Path) -> Result<(), WatchError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| WatchError::Upload(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let source = self.controller.upload(&file_name, bytes).await?;
        self.notify(format!("Uploaded; source set to {}", source));
        Ok(())
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    fn notify_error(&mut self, error: WatchError) {
        let message = match &error {
            WatchError::Transport(_) => format!("Service unreachable: {}", error),
            _ => error.to_string(),
        };
        self.notice = Some(message);
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn view(&self) -> LiveView {
        self.controller.view()
    }

    pub fn controller(&self) -> &LiveSessionController<A> {
        &self.controller
    }

    pub fn render(&self, app_data: &WatchAppData) -> String {
        design::render(&self.controller.view(), app_data, self.notice())
    }
}

impl<A: SessionApi + Clone> TimerControl for LiveDetectionScreen<A> {
    fn stop_timers(&mut self) {
        self.visible = false;
        self.controller.teardown();
    }

    /// Nothing restarts on show; the operator starts the session again.
    fn start_timers(&mut self) {
        self.visible = true;
    }
}
