use crate::api::models::Complaint;
use crate::app::{AppContext, Change};
use crate::i18n::relative_time;
use crate::ui::complaint_detail::ComplaintDetail;
use adw::prelude::*;
use chrono::Utc;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

pub struct ComplaintList {
    ctx: Rc<AppContext>,
    overlay: adw::ToastOverlay,
    stack: gtk::Stack,
    list: gtk::ListBox,
    empty: adw::StatusPage,
    detail: ComplaintDetail,
    ids: RefCell<Vec<String>>,
}

impl ComplaintList {
    pub fn new(ctx: &Rc<AppContext>, overlay: &adw::ToastOverlay) -> Rc<Self> {
        let stack = gtk::Stack::new();
        stack.set_transition_type(gtk::StackTransitionType::SlideLeftRight);

        let page = gtk::Box::new(gtk::Orientation::Vertical, 6);
        page.set_margin_top(8);
        page.set_margin_bottom(8);
        page.set_margin_start(8);
        page.set_margin_end(8);

        let top = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let title = gtk::Label::new(Some(&ctx.t("navigation.myComplaints")));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        title.set_hexpand(true);
        let refresh_btn = gtk::Button::from_icon_name("view-refresh-symbolic");
        refresh_btn.set_tooltip_text(Some(&ctx.t("complaints.refresh")));
        refresh_btn.add_css_class("flat");
        top.append(&title);
        top.append(&refresh_btn);
        page.append(&top);

        let list = gtk::ListBox::new();
        list.add_css_class("boxed-list");
        list.set_selection_mode(gtk::SelectionMode::None);
        list.set_valign(gtk::Align::Start);
        let scroller = gtk::ScrolledWindow::builder().vexpand(true).hexpand(true).child(&list).build();

        let empty = adw::StatusPage::builder()
            .icon_name("folder-documents-symbolic")
            .title(ctx.t("complaints.empty"))
            .vexpand(true)
            .build();

        page.append(&scroller);
        page.append(&empty);

        let detail = ComplaintDetail::new(ctx);
        stack.add_named(&page, Some("list"));
        stack.add_named(&detail.widget(), Some("detail"));

        let this = Rc::new(Self {
            ctx: ctx.clone(),
            overlay: overlay.clone(),
            stack,
            list,
            empty,
            detail,
            ids: RefCell::new(Vec::new()),
        });

        {
            let weak = Rc::downgrade(&this);
            this.detail.connect_back(move || {
                if let Some(this) = weak.upgrade() {
                    this.stack.set_visible_child_name("list");
                }
            });
        }
        {
            let weak = Rc::downgrade(&this);
            this.list.connect_row_activated(move |_, row| {
                let Some(this) = weak.upgrade() else { return };
                let id = this.ids.borrow().get(row.index() as usize).cloned();
                if let Some(id) = id {
                    this.open(&id);
                }
            });
        }
        {
            let weak = Rc::downgrade(&this);
            refresh_btn.connect_clicked(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.reload();
                }
            });
        }

        this.refresh();
        this
    }

    pub fn widget(&self) -> gtk::Widget {
        self.stack.clone().upcast()
    }

    fn row(&self, c: &Complaint) -> adw::ActionRow {
        let ctx = &self.ctx;
        let subtitle = format!(
            "{} • {}: {} • {}",
            c.kind,
            ctx.t("complaints.status"),
            ctx.t(c.status.label_key()),
            relative_time(c.created_at, Utc::now(), ctx.lang())
        );
        let row = adw::ActionRow::builder()
            .title(glib::markup_escape_text(&c.title).as_str())
            .subtitle(glib::markup_escape_text(&subtitle).as_str())
            .activatable(true)
            .build();
        if c.local {
            let badge = gtk::Image::from_icon_name("network-offline-symbolic");
            badge.set_tooltip_text(Some(&ctx.t("complaints.localOnly")));
            badge.add_css_class("local-badge");
            row.add_suffix(&badge);
        }
        let status = gtk::Label::new(Some(&ctx.t(c.status.label_key())));
        status.add_css_class(&format!("status-{}", c.status.as_str()));
        row.add_suffix(&status);
        row.add_suffix(&gtk::Image::from_icon_name("go-next-symbolic"));
        row
    }

    /// Re-renders from the store.
    pub fn refresh(&self) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        let complaints = self.ctx.complaints.borrow();
        let mut ids = self.ids.borrow_mut();
        ids.clear();
        for c in complaints.all() {
            self.list.append(&self.row(c));
            ids.push(c.id.clone());
        }
        let empty = ids.is_empty();
        self.empty.set_visible(empty);
        self.list.set_visible(!empty);
    }

    /// Fetches the list right away instead of waiting for the next poll tick.
    pub fn reload(&self) {
        let api = self.ctx.api();
        let ctx = self.ctx.clone();
        let overlay = self.overlay.clone();
        crate::utils::spawn_to_main(async move { api.my_complaints().await }, move |res| match res {
            Ok(list) => {
                ctx.complaints.borrow_mut().replace_remote(list);
                ctx.notify(Change::Complaints);
            }
            Err(e) => {
                log::warn!("Failed to load complaints: {e}");
                overlay.add_toast(adw::Toast::new(&ctx.t("complaints.loadFailed")));
            }
        });
    }

    pub fn open(self: &Rc<Self>, id: &str) {
        let cached = self.ctx.complaints.borrow().get(id).cloned();
        let Some(cached) = cached else { return };
        self.detail.show(&cached);
        self.stack.set_visible_child_name("detail");
        if cached.local {
            return;
        }

        let api = self.ctx.api();
        let weak = Rc::downgrade(self);
        let id = id.to_string();
        crate::utils::spawn_to_main(async move { api.complaint(&id).await }, move |res| {
            let Some(this) = weak.upgrade() else { return };
            match res {
                Ok(full) => {
                    let still_open = this.stack.visible_child_name().as_deref() == Some("detail");
                    this.ctx.complaints.borrow_mut().apply_update(full.clone());
                    this.ctx.notify(Change::Complaints);
                    if still_open {
                        this.detail.show(&full);
                    }
                }
                Err(e) => log::warn!("Failed to load complaint details: {e}"),
            }
        });
    }
}
