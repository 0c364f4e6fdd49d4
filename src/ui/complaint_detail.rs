use crate::api::models::{Complaint, StepState};
use crate::app::AppContext;
use crate::i18n::relative_time;
use chrono::Utc;
use gtk4 as gtk;
use gtk4::prelude::*;
use std::rc::Rc;

pub struct ComplaintDetail {
    ctx: Rc<AppContext>,
    root: gtk::Box,
    content: gtk::Box,
    back_btn: gtk::Button,
}

impl ComplaintDetail {
    pub fn new(ctx: &Rc<AppContext>) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);

        let back_btn = gtk::Button::from_icon_name("go-previous-symbolic");
        back_btn.set_tooltip_text(Some(&ctx.t("common.back")));
        back_btn.add_css_class("flat");
        back_btn.set_halign(gtk::Align::Start);
        back_btn.set_margin_start(8);
        back_btn.set_margin_top(8);
        root.append(&back_btn);

        let scroller = gtk::ScrolledWindow::builder().vexpand(true).hexpand(true).build();
        let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
        content.set_margin_top(8);
        content.set_margin_bottom(16);
        content.set_margin_start(16);
        content.set_margin_end(16);
        scroller.set_child(Some(&content));
        root.append(&scroller);

        Self { ctx: ctx.clone(), root, content, back_btn }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn connect_back(&self, f: impl Fn() + 'static) {
        self.back_btn.connect_clicked(move |_| f());
    }

    pub fn show(&self, c: &Complaint) {
        let ctx = &self.ctx;
        while let Some(child) = self.content.first_child() {
            self.content.remove(&child);
        }

        let title = gtk::Label::new(Some(&c.title));
        title.add_css_class("title-2");
        title.set_wrap(true);
        title.set_halign(gtk::Align::Start);
        self.content.append(&title);

        let status = gtk::Label::new(Some(&format!(
            "{} • {}: {}",
            c.kind,
            ctx.t("complaints.status"),
            ctx.t(c.status.label_key())
        )));
        status.add_css_class(&format!("status-{}", c.status.as_str()));
        status.set_halign(gtk::Align::Start);
        self.content.append(&status);

        let when = gtk::Label::new(Some(&relative_time(c.created_at, Utc::now(), ctx.lang())));
        when.add_css_class("dim-label");
        when.set_halign(gtk::Align::Start);
        self.content.append(&when);

        if c.local {
            let local = gtk::Label::new(Some(&ctx.t("complaints.localOnly")));
            local.add_css_class("local-badge");
            local.set_halign(gtk::Align::Start);
            self.content.append(&local);
        }

        if !c.description.is_empty() {
            let desc = gtk::Label::new(Some(&c.description));
            desc.set_wrap(true);
            desc.set_xalign(0.0);
            self.content.append(&desc);
        }

        let facts = [
            ("complaints.location", c.location.clone()),
            ("complaints.priority", c.priority.map(|p| ctx.t(p.label_key()))),
            ("profile.phone", c.phone.clone()),
            ("profile.email", c.email.clone()),
        ];
        for (key, value) in facts {
            if let Some(value) = value {
                let row = gtk::Label::new(Some(&format!("{}: {}", ctx.t(key), value)));
                row.set_halign(gtk::Align::Start);
                row.set_selectable(true);
                self.content.append(&row);
            }
        }

        self.content.append(&self.timeline(c));
        self.content.append(&self.attachments(c));
    }

    fn timeline(&self, c: &Complaint) -> gtk::Widget {
        let frame = gtk::Box::new(gtk::Orientation::Vertical, 4);
        let heading = gtk::Label::new(Some(&self.ctx.t("complaints.timeline")));
        heading.add_css_class("heading");
        heading.set_halign(gtk::Align::Start);
        frame.append(&heading);

        for (stage, state) in c.status.timeline() {
            let row = gtk::Box::new(gtk::Orientation::Horizontal, 8);
            let (icon, class) = match state {
                StepState::Done => ("emblem-ok-symbolic", "step-done"),
                StepState::Current => ("media-record-symbolic", "step-current"),
                StepState::Upcoming => ("content-loading-symbolic", "step-upcoming"),
            };
            let image = gtk::Image::from_icon_name(icon);
            let label = gtk::Label::new(Some(&self.ctx.t(stage.label_key())));
            row.add_css_class(class);
            row.append(&image);
            row.append(&label);
            frame.append(&row);
        }
        frame.upcast()
    }

    fn attachments(&self, c: &Complaint) -> gtk::Widget {
        let frame = gtk::Box::new(gtk::Orientation::Vertical, 4);
        let heading = gtk::Label::new(Some(&self.ctx.t("complaints.attachments")));
        heading.add_css_class("heading");
        heading.set_halign(gtk::Align::Start);
        frame.append(&heading);

        if c.attachments.is_empty() {
            let none = gtk::Label::new(Some(&self.ctx.t("complaints.noAttachments")));
            none.add_css_class("dim-label");
            none.set_halign(gtk::Align::Start);
            frame.append(&none);
            return frame.upcast();
        }

        let api = self.ctx.api();
        for a in &c.attachments {
            let btn = gtk::Button::with_label(a.label());
            btn.add_css_class("flat");
            btn.set_halign(gtk::Align::Start);
            let uri = api.asset_url(&a.url);
            btn.connect_clicked(move |btn| {
                let parent = btn.root().and_downcast::<gtk::Window>();
                #[allow(deprecated)]
                gtk::show_uri(parent.as_ref(), &uri, 0);
            });
            frame.append(&btn);
        }
        frame.upcast()
    }
}
