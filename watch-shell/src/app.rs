//! Headless console shell.
//!
//! Registers the apps, shows the Live Detection page and feeds it one
//! action per stdin line. On `quit`, end of input or Ctrl-C the shell
//! navigates away, which hides the page and tears its session down.

use anyhow::{Context, Result};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use watch_data::{HttpSessionApi, SessionApi, WatchConfig};
use watch_live::{LiveDetectionApp, LiveDetectionScreen, ScreenResponse};
use watch_widgets::{
    AppAction, AppRegistry, PageId, PageRouter, ParseActionError, TimerControl, WatchApp,
    WatchAppData,
};

pub fn app_main() -> Result<()> {
    write_default_config();
    let config = WatchConfig::load();
    config.validate().context("invalid configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run(config))
}

/// First run: leave an editable config file behind.
fn write_default_config() {
    let Some(path) = WatchConfig::config_path() else {
        return;
    };
    if path.exists() {
        return;
    }
    match WatchConfig::default().save() {
        Ok(()) => log::info!("Shell: wrote default config to {}", path.display()),
        Err(e) => log::warn!("Shell: could not write default config: {:#}", e),
    }
}

async fn run(config: WatchConfig) -> Result<()> {
    let api = HttpSessionApi::from_config(&config).context("failed to create API client")?;
    log::info!("Shell: detection service at {}", api.base_url());

    let mut registry = AppRegistry::new();
    registry.register(LiveDetectionApp::info());

    let mut router = PageRouter::new();
    for app in registry.apps() {
        router.register_page(app.page_id);
    }

    let live_page = LiveDetectionApp::info().page_id;
    let mut app_data = WatchAppData::new(api.base_url());
    let mut screen = LiveDetectionScreen::new(api, &config);

    navigate(&mut router, &mut screen, &mut app_data, live_page);
    screen.open().await;
    println!("{}", screen.render(&app_data));
    println!("Type 'help' for commands.");

    let stdin = BufReader::new(tokio::io::stdin()).lines();
    let result = console_loop(&mut screen, &app_data, stdin, interrupted()).await;

    hide_page(router.navigate_away(), &mut screen);
    log::info!("Shell: exiting");
    result
}

/// Resolves on the first Ctrl-C. If the handler cannot be installed the
/// default signal disposition stays in place and this never resolves.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Shell: cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Feed console lines to the screen until `quit`, end of input or
/// `interrupt`. The interrupt also cuts short a command that is still
/// waiting on the service.
async fn console_loop<A, R>(
    screen: &mut LiveDetectionScreen<A>,
    app_data: &WatchAppData,
    mut lines: Lines<R>,
    interrupt: impl Future<Output = ()>,
) -> Result<()>
where
    A: SessionApi + Clone,
    R: AsyncBufRead + Unpin,
{
    tokio::pin!(interrupt);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = &mut interrupt => {
                log::info!("Shell: interrupted");
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };

        match AppAction::parse(&line) {
            Ok(AppAction::Help) => println!("{}", AppAction::HELP),
            Ok(action) => {
                let response = tokio::select! {
                    response = screen.handle_action(action) => response,
                    _ = &mut interrupt => {
                        log::info!("Shell: interrupted while a command was running");
                        return Ok(());
                    }
                };
                if response == ScreenResponse::Quit {
                    return Ok(());
                }
                println!("{}", screen.render(app_data));
            }
            Err(ParseActionError::Empty) => {}
            Err(e) => println!("{}", e),
        }
    }
}

fn navigate<A: SessionApi + Clone>(
    router: &mut PageRouter,
    screen: &mut LiveDetectionScreen<A>,
    app_data: &mut WatchAppData,
    page: PageId,
) {
    hide_page(router.navigate_to(page), screen);
    app_data.current_view = page.to_string();
    if router.current_page() == Some(LiveDetectionApp::info().page_id) {
        screen.start_timers();
    }
}

fn hide_page<A: SessionApi + Clone>(page: Option<PageId>, screen: &mut LiveDetectionScreen<A>) {
    if page == Some(LiveDetectionApp::info().page_id) {
        screen.stop_timers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use watch_data::fake::FakeSessionApi;
    use watch_data::Lifecycle;

    fn live_page() -> (PageRouter, WatchAppData) {
        let mut router = PageRouter::new();
        router.register_page(LiveDetectionApp::info().page_id);
        (router, WatchAppData::default())
    }

    fn screen(api: &Arc<FakeSessionApi>) -> LiveDetectionScreen<Arc<FakeSessionApi>> {
        LiveDetectionScreen::new(api.clone(), &WatchConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_cuts_short_a_hung_start() {
        let api = Arc::new(FakeSessionApi::with_models(&["best_dec20"], "best_dec20"));
        api.set_start_delay(Duration::from_secs(3600));
        let mut screen = screen(&api);
        let (mut router, mut app_data) = live_page();
        navigate(&mut router, &mut screen, &mut app_data, LiveDetectionApp::info().page_id);
        assert!(screen.is_visible());

        let input: &[u8] = b"start\nshow\n";
        let interrupt = tokio::time::sleep(Duration::from_secs(1));
        console_loop(&mut screen, &app_data, BufReader::new(input).lines(), interrupt)
            .await
            .unwrap();

        assert_eq!(api.calls().start, 1);
        assert_eq!(screen.view().lifecycle, Lifecycle::Starting);

        hide_page(router.navigate_away(), &mut screen);
        assert!(!screen.is_visible());
        assert_eq!(screen.view().lifecycle, Lifecycle::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_ends_the_loop_and_leaves_the_page() {
        let api = Arc::new(FakeSessionApi::with_models(&["best_dec20"], "best_dec20"));
        let mut screen = screen(&api);
        let (mut router, mut app_data) = live_page();
        navigate(&mut router, &mut screen, &mut app_data, LiveDetectionApp::info().page_id);

        let input: &[u8] = b"start\nbogus\n\nquit\nstop\n";
        console_loop(
            &mut screen,
            &app_data,
            BufReader::new(input).lines(),
            std::future::pending::<()>(),
        )
        .await
        .unwrap();

        // `stop` after `quit` was never read.
        assert_eq!(screen.view().lifecycle, Lifecycle::Streaming);
        assert_eq!(api.calls().stop, 0);

        hide_page(router.navigate_away(), &mut screen);
        assert_eq!(screen.view().lifecycle, Lifecycle::Idle);
        assert_eq!(screen.controller().handle_ledger().live(), 0);
    }
}
