use log::{error, info};

use syncrony_site::config;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting syncrony site");
    if let Err(err) = syncrony_site::boot() {
        error!("site behaviors not started: {}", err);
    }
}
