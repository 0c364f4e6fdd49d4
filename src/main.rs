mod api;
mod app;
mod error;
mod form;
mod i18n;
mod state;
mod storage;
mod theme;
mod ui;
mod utils;

use adw::prelude::*;
use adw::Application;

fn main() -> glib::ExitCode {
    utils::init_logging();
    let app = Application::builder()
        .application_id("app.shakwa.Client")
        .build();
    app.connect_activate(|app| {
        crate::app::build_ui(app);
    });
    app.run()
}
