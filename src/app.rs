use crate::api::client::ApiClient;
use crate::api::events::{self, AppEvent, SocketHandle};
use crate::api::models::User;
use crate::error::{Error, Result};
use crate::i18n::Language;
use crate::state::auth;
use crate::state::complaints::ComplaintsStore;
use crate::state::notifications::NotificationsStore;
use crate::state::preferences::{LanguageState, ThemeState};
use crate::storage::{keys, Storage};
use crate::utils::normalize_url;
use adw::prelude::*;
use adw::Application;
use directories::BaseDirs;
use gtk4 as gtk;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub socket_url: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".into(),
            socket_url: "http://localhost:5000".into(),
            poll_interval_secs: 10,
            request_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("shakwa.toml"))
    }

    /// Writes the defaults on first run so the file can be edited by hand.
    pub fn load() -> Self {
        let Some(path) = Self::toml_path() else {
            return Self::default();
        };
        if !path.exists() {
            let cfg = Self::default();
            if let Err(e) = cfg.save() {
                log::warn!("Could not write default config: {e}");
            }
            return cfg;
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(text) = fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str::<AppConfig>(&text) {
            Ok(mut cfg) => {
                cfg.api_url = normalize_url(&cfg.api_url);
                cfg.socket_url = normalize_url(&cfg.socket_url);
                cfg
            }
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::toml_path().ok_or_else(|| Error::Config("no config dir".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Onboarding,
    Login,
    Main,
}

pub fn initial_route(seen_onboarding: bool, token: Option<&str>, user_id: Option<&str>) -> Route {
    let present = |v: Option<&str>| v.is_some_and(|s| !s.is_empty());
    if !seen_onboarding {
        Route::Onboarding
    } else if !present(token) || !present(user_id) {
        Route::Login
    } else {
        Route::Main
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Complaints,
    Notifications,
    User,
}

/// Shared state for every window, lives on the GTK main thread.
pub struct AppContext {
    pub app: Application,
    pub config: AppConfig,
    pub storage: Storage,
    pub user: RefCell<Option<User>>,
    pub theme: RefCell<ThemeState>,
    pub language: RefCell<LanguageState>,
    pub complaints: RefCell<ComplaintsStore>,
    pub notifications: RefCell<NotificationsStore>,
    api: RefCell<ApiClient>,
    socket: RefCell<Option<SocketHandle>>,
    listeners: RefCell<Vec<(usize, Rc<dyn Fn(Change)>)>>,
    next_listener: Cell<usize>,
    css: gtk::CssProvider,
}

impl AppContext {
    pub fn new(app: &Application, config: AppConfig, storage: Storage) -> Result<Rc<Self>> {
        let api = ApiClient::new(&config.api_url, config.request_timeout())?;
        let token = storage.get(keys::TOKEN)?;
        let ctx = Rc::new(Self {
            app: app.clone(),
            user: RefCell::new(None),
            theme: RefCell::new(ThemeState::load(storage.clone())),
            language: RefCell::new(LanguageState::load(storage.clone())),
            complaints: RefCell::new(ComplaintsStore::load(storage.clone())),
            notifications: RefCell::new(NotificationsStore::load(storage.clone())),
            api: RefCell::new(api.with_token(token)),
            socket: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            css: gtk::CssProvider::new(),
            config,
            storage,
        });
        if let Some(display) = gtk::gdk::Display::default() {
            gtk::style_context_add_provider_for_display(&display, &ctx.css, gtk::STYLE_PROVIDER_PRIORITY_APPLICATION);
        }
        Ok(ctx)
    }

    pub fn t(&self, key: &str) -> String {
        self.language.borrow().t(key)
    }

    pub fn lang(&self) -> Language {
        self.language.borrow().current()
    }

    pub fn api(&self) -> ApiClient {
        self.api.borrow().clone()
    }

    pub fn apply_theme(&self) {
        let theme = self.theme.borrow().current();
        let scheme = match theme {
            crate::theme::ThemeType::Light => adw::ColorScheme::ForceLight,
            crate::theme::ThemeType::Dark => adw::ColorScheme::ForceDark,
        };
        adw::StyleManager::default().set_color_scheme(scheme);
        self.css.load_from_data(&theme.palette().css());
    }

    pub fn apply_direction(&self) {
        let dir = if self.language.borrow().is_rtl() { gtk::TextDirection::Rtl } else { gtk::TextDirection::Ltr };
        gtk::Widget::set_default_direction(dir);
    }

    /// Registers a callback for store changes; pass the id to `unsubscribe` on teardown.
    pub fn subscribe(&self, f: impl Fn(Change) + 'static) -> usize {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: usize) {
        self.listeners.borrow_mut().retain(|(i, _)| *i != id);
    }

    pub fn notify(&self, change: Change) {
        // Listeners may subscribe or unsubscribe while running.
        let listeners: Vec<_> = self.listeners.borrow().iter().map(|(_, f)| f.clone()).collect();
        for f in listeners {
            f(change);
        }
    }

    pub fn set_user(&self, user: Option<User>) {
        *self.user.borrow_mut() = user;
        self.notify(Change::User);
    }

    /// Authenticated API calls and the live socket start here.
    pub fn start_session(self: &Rc<Self>, user_id: &str, token: String) {
        let api = self.api().with_token(Some(token));
        *self.api.borrow_mut() = api;

        let (tx, mut rx) = mpsc::unbounded_channel();
        match events::spawn(&self.config.socket_url, user_id.to_string(), tx) {
            Ok(handle) => *self.socket.borrow_mut() = Some(handle),
            Err(e) => log::warn!("Socket not started: {e}"),
        }

        let weak = Rc::downgrade(self);
        glib::spawn_future_local(async move {
            while let Some(event) = rx.recv().await {
                let Some(ctx) = weak.upgrade() else { break };
                ctx.handle_event(event);
            }
        });
    }

    fn handle_event(&self, event: AppEvent) {
        match event {
            AppEvent::Notification(n) => {
                let desktop = gtk::gio::Notification::new(&n.title);
                desktop.set_body(Some(&n.message));
                let id = n.id.clone();
                if self.notifications.borrow_mut().push(n) {
                    self.app.send_notification(Some(&id), &desktop);
                    self.notify(Change::Notifications);
                }
            }
            AppEvent::ComplaintUpdated(c) => {
                self.complaints.borrow_mut().apply_update(c);
                self.notify(Change::Complaints);
            }
        }
    }

    pub fn end_session(&self) {
        if let Some(socket) = self.socket.borrow_mut().take() {
            socket.close();
        }
        if let Err(e) = auth::logout(&self.storage) {
            log::warn!("Failed to clear session: {e}");
        }
        let api = self.api().with_token(None);
        *self.api.borrow_mut() = api;
        *self.user.borrow_mut() = None;
        self.complaints.borrow_mut().clear();
        self.notifications.borrow_mut().clear();
    }
}

pub fn build_ui(app: &Application) {
    let config = AppConfig::load();
    let storage = match Storage::open_default() {
        Ok(s) => s,
        Err(e) => {
            log::error!("Cannot open local storage: {e}");
            return;
        }
    };
    let ctx = match AppContext::new(app, config, storage) {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("Startup failed: {e}");
            return;
        }
    };
    ctx.apply_theme();
    ctx.apply_direction();
    show_initial(&ctx);
}

pub fn show_initial(ctx: &Rc<AppContext>) {
    let get = |key: &str| ctx.storage.get(key).unwrap_or_else(|e| {
        log::warn!("Failed to read {key}: {e}");
        None
    });
    let seen = get(keys::SEEN_ONBOARDING).is_some();
    let token = get(keys::TOKEN);
    let user_id = get(keys::USER_ID);
    match initial_route(seen, token.as_deref(), user_id.as_deref()) {
        Route::Onboarding => crate::ui::onboarding::show_onboarding_window(ctx),
        Route::Login => crate::ui::login::show_login_window(ctx),
        Route::Main => {
            if let (Some(token), Some(user_id)) = (token, user_id) {
                ctx.start_session(&user_id, token);
            }
            crate::ui::main_window::show_main_window(ctx);
            restore_user(ctx);
        }
    }
}

fn restore_user(ctx: &Rc<AppContext>) {
    let api = ctx.api();
    let storage = ctx.storage.clone();
    let ctx = ctx.clone();
    crate::utils::spawn_to_main(async move { auth::restore(&api, &storage).await }, move |res| match res {
        Ok(Some((user, _))) => ctx.set_user(Some(user)),
        Ok(None) => {}
        Err(Error::Api { status: 401, .. }) => {
            log::info!("Saved session expired");
            ctx.end_session();
            let stale = ctx.app.windows();
            crate::ui::login::show_login_window(&ctx);
            for window in stale {
                window.close();
            }
        }
        Err(e) => log::warn!("Failed to fetch user: {e}"),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_order() {
        assert_eq!(initial_route(false, Some("t"), Some("u")), Route::Onboarding);
        assert_eq!(initial_route(true, None, Some("u")), Route::Login);
        assert_eq!(initial_route(true, Some("t"), Some("")), Route::Login);
        assert_eq!(initial_route(true, Some("t"), Some("u")), Route::Main);
    }

    #[test]
    fn config_roundtrip_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("shakwa.toml");
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        let cfg = AppConfig { api_url: "https://api.example.com".into(), poll_interval_secs: 30, ..Default::default() };
        cfg.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), cfg);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(30));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shakwa.toml");
        fs::write(&path, "api_url = \"a.io\"\n").unwrap();
        let cfg = AppConfig::load_from(&path);
        assert_eq!(cfg.api_url, "https://a.io");
        assert_eq!(cfg.poll_interval_secs, 10);
    }
}
