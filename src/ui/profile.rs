use crate::app::{AppContext, Change};
use crate::form::optional;
use crate::i18n::Language;
use crate::theme::ThemeType;
use crate::ui::login::error_text;
use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

pub struct ProfileView {
    ctx: Rc<AppContext>,
    root: gtk::ScrolledWindow,
    name_label: gtk::Label,
    phone_row: adw::ActionRow,
    role_row: adw::ActionRow,
    name_entry: gtk::Entry,
    email_entry: gtk::Entry,
}

impl ProfileView {
    pub fn new(ctx: &Rc<AppContext>, overlay: &adw::ToastOverlay) -> Rc<Self> {
        let content = gtk::Box::new(gtk::Orientation::Vertical, 18);
        content.set_margin_top(16);
        content.set_margin_bottom(16);
        content.set_margin_start(16);
        content.set_margin_end(16);

        let avatar = adw::Avatar::new(72, None, true);
        content.append(&avatar);
        let name_label = gtk::Label::new(None);
        name_label.add_css_class("title-2");
        content.append(&name_label);

        let account = adw::PreferencesGroup::builder().title(ctx.t("navigation.profile")).build();
        let phone_row = adw::ActionRow::builder().title(ctx.t("profile.phone")).build();
        let role_row = adw::ActionRow::builder().title(ctx.t("profile.role")).build();
        account.add(&phone_row);
        account.add(&role_row);
        content.append(&account);

        let edit = adw::PreferencesGroup::builder().title(ctx.t("common.edit")).build();
        let name_entry = gtk::Entry::new();
        name_entry.set_placeholder_text(Some(&ctx.t("profile.fullName")));
        let email_entry = gtk::Entry::new();
        email_entry.set_placeholder_text(Some(&ctx.t("profile.email")));
        email_entry.set_input_purpose(gtk::InputPurpose::Email);
        let save_btn = gtk::Button::with_label(&ctx.t("common.save"));
        save_btn.set_halign(gtk::Align::End);
        let edit_box = gtk::Box::new(gtk::Orientation::Vertical, 6);
        edit_box.append(&name_entry);
        edit_box.append(&email_entry);
        edit_box.append(&save_btn);
        edit.add(&edit_box);
        content.append(&edit);

        let settings = adw::PreferencesGroup::builder().title(ctx.t("navigation.settings")).build();
        let dark_switch = gtk::Switch::new();
        dark_switch.set_valign(gtk::Align::Center);
        dark_switch.set_active(ctx.theme.borrow().current() == ThemeType::Dark);
        let theme_row = adw::ActionRow::builder().title(ctx.t("settings.darkMode")).activatable_widget(&dark_switch).build();
        theme_row.add_suffix(&dark_switch);
        settings.add(&theme_row);

        let languages = gtk::StringList::new(&[&ctx.t("settings.english"), &ctx.t("settings.arabic")]);
        let language_row = adw::ComboRow::builder().title(ctx.t("settings.language")).model(&languages).build();
        language_row.set_selected(if ctx.lang() == Language::Ar { 1 } else { 0 });
        settings.add(&language_row);
        content.append(&settings);

        let logout_btn = gtk::Button::with_label(&ctx.t("navigation.logout"));
        logout_btn.add_css_class("destructive-action");
        logout_btn.set_halign(gtk::Align::Center);
        content.append(&logout_btn);

        let root = gtk::ScrolledWindow::builder().vexpand(true).hexpand(true).child(&content).build();
        let this = Rc::new(Self { ctx: ctx.clone(), root, name_label, phone_row, role_row, name_entry, email_entry });

        {
            let ctx = ctx.clone();
            dark_switch.connect_active_notify(move |sw| {
                let wanted = if sw.is_active() { ThemeType::Dark } else { ThemeType::Light };
                if ctx.theme.borrow().current() != wanted {
                    ctx.theme.borrow_mut().toggle();
                    ctx.apply_theme();
                }
            });
        }
        {
            let weak = Rc::downgrade(&this);
            language_row.connect_selected_notify(move |row| {
                let Some(this) = weak.upgrade() else { return };
                let wanted = if row.selected() == 1 { Language::Ar } else { Language::En };
                if this.ctx.lang() != wanted {
                    this.switch_language(wanted);
                }
            });
        }
        {
            let weak = Rc::downgrade(&this);
            let overlay = overlay.clone();
            save_btn.connect_clicked(move |btn| {
                if let Some(this) = weak.upgrade() {
                    this.save(btn, &overlay);
                }
            });
        }
        {
            let weak = Rc::downgrade(&this);
            logout_btn.connect_clicked(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.logout();
                }
            });
        }

        this.refresh();
        this
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn refresh(&self) {
        let user = self.ctx.user.borrow();
        match user.as_ref() {
            Some(u) => {
                self.name_label.set_label(u.display_name());
                self.phone_row.set_subtitle(&u.phone);
                self.role_row.set_subtitle(u.role.as_deref().unwrap_or("-"));
                self.name_entry.set_text(u.full_name.as_deref().unwrap_or_default());
                self.email_entry.set_text(u.email.as_deref().unwrap_or_default());
            }
            None => {
                self.name_label.set_label(&self.ctx.t("common.loading"));
            }
        }
    }

    fn window(&self) -> Option<gtk::Window> {
        self.root.root().and_downcast::<gtk::Window>()
    }

    fn save(&self, btn: &gtk::Button, overlay: &adw::ToastOverlay) {
        let full_name = optional(&self.name_entry.text());
        let email = optional(&self.email_entry.text());
        if email.as_deref().is_some_and(|e| !e.contains('@')) {
            overlay.add_toast(adw::Toast::new(&self.ctx.t("form.invalidEmail")));
            return;
        }
        btn.set_sensitive(false);
        let api = self.ctx.api();
        let ctx = self.ctx.clone();
        let overlay = overlay.clone();
        let btn = btn.clone();
        crate::utils::spawn_to_main(
            async move { api.update_me(full_name.as_deref(), email.as_deref()).await },
            move |res| {
                btn.set_sensitive(true);
                match res {
                    Ok(user) => {
                        ctx.set_user(Some(user));
                        overlay.add_toast(adw::Toast::new(&ctx.t("profile.saved")));
                    }
                    Err(e) => {
                        log::warn!("Profile update failed: {e}");
                        overlay.add_toast(adw::Toast::new(&error_text(&ctx, &e, "common.error")));
                    }
                }
            },
        );
    }

    /// Text and direction are fixed at build time, so the main window is rebuilt.
    fn switch_language(&self, language: Language) {
        self.ctx.language.borrow_mut().set(language);
        self.ctx.apply_direction();
        let old = self.window();
        crate::ui::main_window::show_main_window(&self.ctx);
        if let Some(old) = old {
            old.close();
        }
    }

    fn logout(&self) {
        let old = self.window();
        self.ctx.end_session();
        self.ctx.notify(Change::User);
        crate::ui::login::show_login_window(&self.ctx);
        if let Some(old) = old {
            old.close();
        }
    }
}
