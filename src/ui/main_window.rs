use crate::app::{AppContext, Change};
use crate::state::complaints::spawn_refresh;
use crate::ui::add_complaint::AddComplaintView;
use crate::ui::complaint_list::ComplaintList;
use crate::ui::notifications::NotificationsButton;
use crate::ui::profile::ProfileView;
use adw::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc;

pub fn show_main_window(ctx: &Rc<AppContext>) {
    let window = adw::ApplicationWindow::builder()
        .application(&ctx.app)
        .title(ctx.t("app.name"))
        .default_width(960)
        .default_height(680)
        .build();

    let overlay = adw::ToastOverlay::new();
    let stack = adw::ViewStack::new();

    let list = ComplaintList::new(ctx, &overlay);
    let add = AddComplaintView::new(ctx, &overlay);
    let profile = ProfileView::new(ctx, &overlay);
    stack
        .add_titled(&list.widget(), Some("complaints"), &ctx.t("navigation.myComplaints"))
        .set_icon_name(Some("view-list-symbolic"));
    stack
        .add_titled(&add.widget(), Some("add"), &ctx.t("navigation.addComplaint"))
        .set_icon_name(Some("list-add-symbolic"));
    stack
        .add_titled(&profile.widget(), Some("profile"), &ctx.t("navigation.profile"))
        .set_icon_name(Some("avatar-default-symbolic"));
    overlay.set_child(Some(&stack));

    let header = adw::HeaderBar::new();
    let switcher = adw::ViewSwitcherTitle::builder()
        .stack(&stack)
        .title(ctx.t("app.name"))
        .build();
    header.set_title_widget(Some(&switcher));
    let bell = NotificationsButton::new(ctx);
    header.pack_end(&bell.widget());

    let bottom = adw::ViewSwitcherBar::builder().stack(&stack).build();
    switcher
        .bind_property("title-visible", &bottom, "reveal")
        .sync_create()
        .build();

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    container.append(&header);
    overlay.set_vexpand(true);
    container.append(&overlay);
    container.append(&bottom);
    window.set_content(Some(&container));

    {
        let stack = stack.clone();
        add.connect_filed(move || stack.set_visible_child_name("complaints"));
    }

    let subscription = {
        let list = list.clone();
        let profile = profile.clone();
        let bell = bell.clone();
        ctx.subscribe(move |change| match change {
            Change::Complaints => list.refresh(),
            Change::Notifications => bell.refresh(),
            Change::User => profile.refresh(),
        })
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let poll = spawn_refresh(ctx.api(), ctx.config.poll_interval(), tx);
    {
        let ctx = Rc::downgrade(ctx);
        glib::spawn_future_local(async move {
            while let Some(res) = rx.recv().await {
                let Some(ctx) = ctx.upgrade() else { break };
                match res {
                    Ok(list) => {
                        ctx.complaints.borrow_mut().replace_remote(list);
                        ctx.notify(Change::Complaints);
                    }
                    Err(e) => log::debug!("Complaint refresh failed: {e}"),
                }
            }
        });
    }

    // Views are held by weak handlers, so the window owns them until it closes.
    let owned = RefCell::new(Some((poll, add)));
    {
        let ctx = ctx.clone();
        window.connect_close_request(move |_| {
            // Dropping the poll handle also ends the receive loop above.
            owned.borrow_mut().take();
            ctx.unsubscribe(subscription);
            glib::Propagation::Proceed
        });
    }

    window.present();
}
