use crate::app::{AppContext, Change};
use crate::i18n::relative_time;
use adw::prelude::*;
use chrono::Utc;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

/// Header bell with an unread badge; the popover lists the notification history.
pub struct NotificationsButton {
    ctx: Rc<AppContext>,
    root: gtk::Overlay,
    badge: gtk::Label,
    list: gtk::ListBox,
    empty: gtk::Label,
    mark_all: gtk::Button,
    ids: RefCell<Vec<String>>,
}

impl NotificationsButton {
    pub fn new(ctx: &Rc<AppContext>) -> Rc<Self> {
        let content = gtk::Box::new(gtk::Orientation::Vertical, 6);
        content.set_margin_top(6);
        content.set_margin_bottom(6);
        content.set_margin_start(6);
        content.set_margin_end(6);

        let top = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let title = gtk::Label::new(Some(&ctx.t("notifications.title")));
        title.add_css_class("heading");
        title.set_hexpand(true);
        title.set_halign(gtk::Align::Start);
        let mark_all = gtk::Button::with_label(&ctx.t("notifications.markAllRead"));
        mark_all.add_css_class("flat");
        top.append(&title);
        top.append(&mark_all);
        content.append(&top);

        let list = gtk::ListBox::new();
        list.add_css_class("boxed-list");
        list.set_selection_mode(gtk::SelectionMode::None);
        let scroller = gtk::ScrolledWindow::builder()
            .hscrollbar_policy(gtk::PolicyType::Never)
            .min_content_width(340)
            .min_content_height(360)
            .child(&list)
            .build();
        let empty = gtk::Label::new(Some(&ctx.t("notifications.empty")));
        empty.add_css_class("dim-label");
        empty.set_margin_top(24);
        empty.set_margin_bottom(24);
        content.append(&scroller);
        content.append(&empty);

        let popover = gtk::Popover::builder().child(&content).build();
        let button = gtk::MenuButton::builder()
            .icon_name("preferences-system-notifications-symbolic")
            .tooltip_text(ctx.t("notifications.title"))
            .popover(&popover)
            .build();

        let badge = gtk::Label::new(None);
        badge.add_css_class("unread-badge");
        badge.set_halign(gtk::Align::End);
        badge.set_valign(gtk::Align::Start);
        badge.set_can_target(false);
        let root = gtk::Overlay::new();
        root.set_child(Some(&button));
        root.add_overlay(&badge);

        let this = Rc::new(Self {
            ctx: ctx.clone(),
            root,
            badge,
            list,
            empty,
            mark_all,
            ids: RefCell::new(Vec::new()),
        });

        {
            let ctx = ctx.clone();
            this.mark_all.connect_clicked(move |_| {
                ctx.notifications.borrow_mut().mark_all_as_read();
                ctx.notify(Change::Notifications);
            });
        }
        {
            let weak = Rc::downgrade(&this);
            this.list.connect_row_activated(move |_, row| {
                let Some(this) = weak.upgrade() else { return };
                let id = this.ids.borrow().get(row.index() as usize).cloned();
                if let Some(id) = id {
                    this.ctx.notifications.borrow_mut().mark_as_read(&id);
                    this.ctx.notify(Change::Notifications);
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
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        let store = self.ctx.notifications.borrow();
        let mut ids = self.ids.borrow_mut();
        ids.clear();
        let now = Utc::now();
        for n in store.all() {
            let row = adw::ActionRow::builder()
                .title(glib::markup_escape_text(&n.title).as_str())
                .subtitle(glib::markup_escape_text(&n.message).as_str())
                .subtitle_lines(3)
                .activatable(!n.read)
                .build();
            let icon = gtk::Image::from_icon_name(n.kind.icon_name());
            icon.add_css_class(n.kind.css_class());
            row.add_prefix(&icon);
            let when = gtk::Label::new(Some(&relative_time(n.created_at, now, self.ctx.lang())));
            when.add_css_class("caption");
            when.add_css_class("dim-label");
            row.add_suffix(&when);
            if !n.read {
                row.add_css_class("notification-unread");
            }
            self.list.append(&row);
            ids.push(n.id.clone());
        }

        let unread = store.unread_count();
        self.badge.set_label(&if unread > 99 { "99+".to_string() } else { unread.to_string() });
        self.badge.set_visible(unread > 0);
        self.mark_all.set_sensitive(unread > 0);
        self.empty.set_visible(ids.is_empty());
        self.list.set_visible(!ids.is_empty());
    }
}
