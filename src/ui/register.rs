use crate::app::AppContext;
use crate::form::optional;
use crate::state::auth;
use crate::ui::login::error_text;
use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

pub fn show_register_window(ctx: &Rc<AppContext>) {
    let window = adw::ApplicationWindow::builder()
        .application(&ctx.app)
        .title(ctx.t("auth.register"))
        .default_width(420)
        .default_height(380)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let name_entry = gtk::Entry::new();
    name_entry.set_placeholder_text(Some(&ctx.t("auth.fullName")));

    let phone_entry = gtk::Entry::new();
    phone_entry.set_placeholder_text(Some(&ctx.t("auth.phone")));
    phone_entry.set_input_purpose(gtk::InputPurpose::Phone);

    let pass_entry = gtk::PasswordEntry::new();
    pass_entry.set_placeholder_text(Some(&ctx.t("auth.password")));
    pass_entry.set_show_peek_icon(true);

    root.append(&name_entry);
    root.append(&phone_entry);
    root.append(&pass_entry);

    let register_btn = gtk::Button::with_label(&ctx.t("auth.register"));
    register_btn.add_css_class("suggested-action");
    register_btn.set_halign(gtk::Align::End);
    root.append(&register_btn);

    let back_btn = gtk::Button::with_label(&ctx.t("auth.haveAccount"));
    back_btn.add_css_class("flat");
    back_btn.set_halign(gtk::Align::Center);
    root.append(&back_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&gtk::Label::new(Some(&ctx.t("auth.register")))));
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    {
        let ctx = ctx.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        register_btn.connect_clicked(move |btn| {
            let phone = phone_entry.text().to_string();
            let password = pass_entry.text().to_string();
            let full_name = optional(&name_entry.text());
            if let Err(e) = auth::validate_credentials(&phone, &password) {
                overlay.add_toast(adw::Toast::new(&error_text(&ctx, &e, "common.error")));
                return;
            }
            btn.set_sensitive(false);

            let api = ctx.api();
            let ctx2 = ctx.clone();
            let window2 = window.clone();
            let overlay2 = overlay.clone();
            let btn2 = btn.clone();
            crate::utils::spawn_to_main(
                async move { auth::register(&api, &phone, &password, full_name.as_deref()).await },
                move |res| {
                    btn2.set_sensitive(true);
                    match res {
                        Ok(()) => {
                            crate::ui::login::show_login_window_with(&ctx2, Some(ctx2.t("auth.registered")));
                            window2.close();
                        }
                        Err(err) => {
                            log::warn!("Registration failed: {err}");
                            overlay2.add_toast(adw::Toast::new(&error_text(&ctx2, &err, "common.error")));
                        }
                    }
                },
            );
        });
    }

    {
        let ctx = ctx.clone();
        let window = window.clone();
        back_btn.connect_clicked(move |_| {
            crate::ui::login::show_login_window(&ctx);
            window.close();
        });
    }

    window.present();
}
