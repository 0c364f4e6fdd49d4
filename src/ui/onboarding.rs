use crate::app::AppContext;
use crate::storage::keys;
use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

const PAGES: [(&str, &str, &str); 3] = [
    ("dialog-warning-symbolic", "onboarding.title1", "onboarding.body1"),
    ("mail-attachment-symbolic", "onboarding.title2", "onboarding.body2"),
    ("emblem-ok-symbolic", "onboarding.title3", "onboarding.body3"),
];

pub fn show_onboarding_window(ctx: &Rc<AppContext>) {
    let window = adw::ApplicationWindow::builder()
        .application(&ctx.app)
        .title(ctx.t("app.name"))
        .default_width(460)
        .default_height(560)
        .build();

    let carousel = adw::Carousel::new();
    carousel.set_vexpand(true);
    for (icon, title, body) in PAGES {
        let page = adw::StatusPage::builder()
            .icon_name(icon)
            .title(ctx.t(title))
            .description(ctx.t(body))
            .hexpand(true)
            .build();
        carousel.append(&page);
    }
    let dots = adw::CarouselIndicatorDots::builder().carousel(&carousel).build();

    let next_btn = gtk::Button::with_label(&ctx.t("onboarding.next"));
    next_btn.add_css_class("suggested-action");
    next_btn.add_css_class("pill");
    next_btn.set_halign(gtk::Align::Center);
    next_btn.set_margin_bottom(24);

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&gtk::Label::new(Some(&ctx.t("app.name")))));
    root.append(&header);
    root.append(&carousel);
    root.append(&dots);
    root.append(&next_btn);
    window.set_content(Some(&root));

    {
        let ctx = ctx.clone();
        let next_btn = next_btn.clone();
        carousel.connect_page_changed(move |carousel, index| {
            let last = index + 1 >= carousel.n_pages();
            let key = if last { "onboarding.start" } else { "onboarding.next" };
            next_btn.set_label(&ctx.t(key));
        });
    }

    {
        let ctx = ctx.clone();
        let window = window.clone();
        let carousel = carousel.clone();
        next_btn.connect_clicked(move |_| {
            let index = carousel.position().round() as u32;
            if index + 1 < carousel.n_pages() {
                carousel.scroll_to(&carousel.nth_page(index + 1), true);
                return;
            }
            if let Err(e) = ctx.storage.set(keys::SEEN_ONBOARDING, "1") {
                log::warn!("Failed to remember onboarding: {e}");
            }
            crate::ui::login::show_login_window(&ctx);
            window.close();
        });
    }

    window.present();
}
