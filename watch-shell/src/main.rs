mod app;

fn main() {
    // Initialize the logger
    env_logger::init();
    log::info!("Starting livewatch");

    if let Err(e) = app::app_main() {
        log::error!("livewatch exited with error: {:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
