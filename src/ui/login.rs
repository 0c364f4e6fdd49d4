use crate::app::AppContext;
use crate::error::Error;
use crate::state::auth;
use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

/// Toast text for an error; validation errors carry translation keys.
pub fn error_text(ctx: &AppContext, err: &Error, fallback_key: &str) -> String {
    match err {
        Error::Validation(key) => ctx.t(key),
        Error::Api { message, .. } if !message.is_empty() => message.clone(),
        Error::Http(_) => ctx.t(fallback_key),
        other => format!("{}: {}", ctx.t(fallback_key), other),
    }
}

pub fn show_login_window(ctx: &Rc<AppContext>) {
    show_login_window_with(ctx, None);
}

pub fn show_login_window_with(ctx: &Rc<AppContext>, notice: Option<String>) {
    let window = adw::ApplicationWindow::builder()
        .application(&ctx.app)
        .title(ctx.t("auth.login"))
        .default_width(420)
        .default_height(360)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some(&ctx.t("app.name")));
    title.add_css_class("title-1");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    let phone_entry = gtk::Entry::new();
    phone_entry.set_placeholder_text(Some(&ctx.t("auth.phone")));
    phone_entry.set_input_purpose(gtk::InputPurpose::Phone);
    phone_entry.set_hexpand(true);

    let pass_entry = gtk::PasswordEntry::new();
    pass_entry.set_placeholder_text(Some(&ctx.t("auth.password")));
    pass_entry.set_show_peek_icon(true);
    pass_entry.set_hexpand(true);

    let form = gtk::Box::new(gtk::Orientation::Vertical, 8);
    form.append(&phone_entry);
    form.append(&pass_entry);
    root.append(&form);

    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    root.append(&status);

    let login_btn = gtk::Button::with_label(&ctx.t("auth.login"));
    login_btn.add_css_class("suggested-action");
    login_btn.set_halign(gtk::Align::End);
    root.append(&login_btn);

    let register_btn = gtk::Button::with_label(&ctx.t("auth.register"));
    register_btn.add_css_class("flat");
    register_btn.set_halign(gtk::Align::Center);
    root.append(&register_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&gtk::Label::new(Some(&ctx.t("auth.login")))));
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    if let Some(text) = notice {
        toast_overlay.add_toast(adw::Toast::new(&text));
    }

    let on_login = {
        let ctx = ctx.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let phone_entry = phone_entry.clone();
        let pass_entry = pass_entry.clone();
        let login_btn = login_btn.clone();
        move || {
            let phone = phone_entry.text().to_string();
            let password = pass_entry.text().to_string();
            if let Err(e) = auth::validate_credentials(&phone, &password) {
                overlay.add_toast(adw::Toast::new(&error_text(&ctx, &e, "auth.loginFailed")));
                return;
            }

            status.set_label(&ctx.t("common.loading"));
            login_btn.set_sensitive(false);

            let api = ctx.api();
            let storage = ctx.storage.clone();
            let ctx2 = ctx.clone();
            let window2 = window.clone();
            let overlay2 = overlay.clone();
            let status2 = status.clone();
            let login_btn2 = login_btn.clone();
            crate::utils::spawn_to_main(
                async move { auth::login(&api, &storage, &phone, &password).await },
                move |res| {
                    login_btn2.set_sensitive(true);
                    match res {
                        Ok((user, token)) => {
                            status2.set_label("");
                            ctx2.start_session(&user.id, token);
                            ctx2.set_user(Some(user));
                            crate::ui::main_window::show_main_window(&ctx2);
                            window2.close();
                        }
                        Err(err) => {
                            log::warn!("Login failed: {err}");
                            status2.set_label(&ctx2.t("auth.loginFailed"));
                            overlay2.add_toast(adw::Toast::new(&error_text(&ctx2, &err, "auth.loginFailed")));
                        }
                    }
                },
            );
        }
    };

    let on_login: Rc<dyn Fn()> = Rc::new(on_login);
    {
        let on_login = on_login.clone();
        login_btn.connect_clicked(move |_| (on_login)());
    }
    {
        let on_login = on_login.clone();
        phone_entry.connect_activate(move |_| (on_login)());
    }
    {
        let on_login = on_login.clone();
        pass_entry.connect_activate(move |_| (on_login)());
    }
    {
        let ctx = ctx.clone();
        let window = window.clone();
        register_btn.connect_clicked(move |_| {
            crate::ui::register::show_register_window(&ctx);
            window.close();
        });
    }

    window.present();
}
