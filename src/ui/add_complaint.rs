use crate::api::models::Priority;
use crate::app::{AppContext, Change};
use crate::form::{optional, AttachmentDraft, ComplaintDraft, COMMON_TYPES};
use crate::state::complaints::SubmitOutcome;
use crate::ui::login::error_text;
use adw::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub struct AddComplaintView {
    ctx: Rc<AppContext>,
    overlay: adw::ToastOverlay,
    root: gtk::ScrolledWindow,
    title_entry: gtk::Entry,
    description: gtk::TextView,
    type_entry: gtk::Entry,
    chips: Vec<gtk::ToggleButton>,
    location_entry: gtk::Entry,
    priority: gtk::DropDown,
    phone_entry: gtk::Entry,
    email_entry: gtk::Entry,
    attachments_box: gtk::ListBox,
    submit_btn: gtk::Button,
    spinner: gtk::Spinner,
    draft: RefCell<ComplaintDraft>,
    #[allow(deprecated)]
    chooser: RefCell<Option<gtk::FileChooserNative>>,
    on_filed: RefCell<Option<Box<dyn Fn()>>>,
}

fn labeled(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("heading");
    label.set_halign(gtk::Align::Start);
    label
}

impl AddComplaintView {
    pub fn new(ctx: &Rc<AppContext>, overlay: &adw::ToastOverlay) -> Rc<Self> {
        let content = gtk::Box::new(gtk::Orientation::Vertical, 10);
        content.set_margin_top(16);
        content.set_margin_bottom(16);
        content.set_margin_start(16);
        content.set_margin_end(16);

        let header = gtk::Label::new(Some(&ctx.t("form.header")));
        header.add_css_class("title-2");
        header.set_halign(gtk::Align::Start);
        let subtitle = gtk::Label::new(Some(&ctx.t("form.subtitle")));
        subtitle.add_css_class("dim-label");
        subtitle.set_halign(gtk::Align::Start);
        content.append(&header);
        content.append(&subtitle);

        let title_entry = gtk::Entry::new();
        title_entry.set_placeholder_text(Some(&ctx.t("form.title")));
        content.append(&labeled(&ctx.t("form.title")));
        content.append(&title_entry);

        let description = gtk::TextView::new();
        description.set_wrap_mode(gtk::WrapMode::WordChar);
        description.set_height_request(96);
        description.add_css_class("card");
        content.append(&labeled(&ctx.t("form.description")));
        content.append(&description);

        content.append(&labeled(&ctx.t("form.type")));
        let chips_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let mut chips: Vec<gtk::ToggleButton> = Vec::new();
        for key in COMMON_TYPES {
            let chip = gtk::ToggleButton::with_label(&ctx.t(key));
            chip.add_css_class("pill");
            if let Some(first) = chips.first() {
                chip.set_group(Some(first));
            }
            chips_row.append(&chip);
            chips.push(chip);
        }
        content.append(&chips_row);

        let type_entry = gtk::Entry::new();
        type_entry.set_placeholder_text(Some(&ctx.t("form.otherType")));
        content.append(&type_entry);

        let location_entry = gtk::Entry::new();
        location_entry.set_placeholder_text(Some(&ctx.t("form.location")));
        content.append(&location_entry);

        let mut priority_labels = vec![ctx.t("priority.none")];
        priority_labels.extend(Priority::ALL.iter().map(|p| ctx.t(p.label_key())));
        let priority_refs: Vec<&str> = priority_labels.iter().map(String::as_str).collect();
        let priority = gtk::DropDown::from_strings(&priority_refs);
        content.append(&labeled(&ctx.t("form.priority")));
        content.append(&priority);

        let phone_entry = gtk::Entry::new();
        phone_entry.set_placeholder_text(Some(&ctx.t("form.phone")));
        phone_entry.set_input_purpose(gtk::InputPurpose::Phone);
        content.append(&phone_entry);

        let email_entry = gtk::Entry::new();
        email_entry.set_placeholder_text(Some(&ctx.t("form.email")));
        email_entry.set_input_purpose(gtk::InputPurpose::Email);
        content.append(&email_entry);

        let actions = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        let pick_image = gtk::Button::with_label(&ctx.t("form.pickImage"));
        let pick_file = gtk::Button::with_label(&ctx.t("form.pickFile"));
        let sheet = gtk::Box::new(gtk::Orientation::Vertical, 4);
        sheet.append(&pick_image);
        sheet.append(&pick_file);
        let popover = gtk::Popover::builder().child(&sheet).build();
        let attach_btn = gtk::MenuButton::builder()
            .label(ctx.t("form.addAttachment"))
            .popover(&popover)
            .build();
        let spacer = gtk::Box::new(gtk::Orientation::Horizontal, 0);
        spacer.set_hexpand(true);
        let spinner = gtk::Spinner::new();
        let submit_btn = gtk::Button::with_label(&ctx.t("form.submit"));
        submit_btn.add_css_class("suggested-action");
        actions.append(&attach_btn);
        actions.append(&spacer);
        actions.append(&spinner);
        actions.append(&submit_btn);
        content.append(&actions);

        let attachments_box = gtk::ListBox::new();
        attachments_box.add_css_class("boxed-list");
        attachments_box.set_selection_mode(gtk::SelectionMode::None);
        attachments_box.set_visible(false);
        content.append(&attachments_box);

        let root = gtk::ScrolledWindow::builder().vexpand(true).hexpand(true).child(&content).build();

        let this = Rc::new(Self {
            ctx: ctx.clone(),
            overlay: overlay.clone(),
            root,
            title_entry,
            description,
            type_entry,
            chips,
            location_entry,
            priority,
            phone_entry,
            email_entry,
            attachments_box,
            submit_btn,
            spinner,
            draft: RefCell::new(ComplaintDraft::default()),
            chooser: RefCell::new(None),
            on_filed: RefCell::new(None),
        });

        for (chip, key) in this.chips.iter().zip(COMMON_TYPES) {
            let weak = Rc::downgrade(&this);
            chip.connect_toggled(move |chip| {
                let Some(this) = weak.upgrade() else { return };
                if chip.is_active() {
                    this.type_entry.set_text(&this.ctx.t(key));
                }
            });
        }
        {
            let weak = Rc::downgrade(&this);
            let popover = popover.clone();
            pick_image.connect_clicked(move |_| {
                popover.popdown();
                if let Some(this) = weak.upgrade() {
                    this.pick(true);
                }
            });
        }
        {
            let weak = Rc::downgrade(&this);
            pick_file.connect_clicked(move |_| {
                popover.popdown();
                if let Some(this) = weak.upgrade() {
                    this.pick(false);
                }
            });
        }
        {
            let weak = Rc::downgrade(&this);
            this.submit_btn.connect_clicked(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.submit();
                }
            });
        }

        this
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Runs after a complaint was sent or kept locally.
    pub fn connect_filed(&self, f: impl Fn() + 'static) {
        *self.on_filed.borrow_mut() = Some(Box::new(f));
    }

    #[allow(deprecated)]
    fn pick(self: &Rc<Self>, images_only: bool) {
        let parent = self.root.root().and_downcast::<gtk::Window>();
        let title = self.ctx.t(if images_only { "form.pickImage" } else { "form.pickFile" });
        let chooser = gtk::FileChooserNative::new(
            Some(&title),
            parent.as_ref(),
            gtk::FileChooserAction::Open,
            Some(&self.ctx.t("common.ok")),
            Some(&self.ctx.t("common.cancel")),
        );
        if images_only {
            let filter = gtk::FileFilter::new();
            filter.add_mime_type("image/*");
            filter.set_name(Some(&title));
            chooser.add_filter(&filter);
        }
        let weak = Rc::downgrade(self);
        chooser.connect_response(move |dialog, response| {
            let Some(this) = weak.upgrade() else { return };
            if response == gtk::ResponseType::Accept {
                if let Some(path) = dialog.file().and_then(|f| f.path()) {
                    this.add_attachment(path);
                }
            }
            this.chooser.borrow_mut().take();
        });
        chooser.show();
        *self.chooser.borrow_mut() = Some(chooser);
    }

    fn add_attachment(self: &Rc<Self>, path: PathBuf) {
        self.draft.borrow_mut().add_attachment(AttachmentDraft::from_path(path));
        self.render_attachments();
    }

    fn render_attachments(self: &Rc<Self>) {
        while let Some(child) = self.attachments_box.first_child() {
            self.attachments_box.remove(&child);
        }
        let draft = self.draft.borrow();
        for (index, a) in draft.attachments.iter().enumerate() {
            let row = gtk::Box::new(gtk::Orientation::Horizontal, 10);
            row.add_css_class("attachment-row");
            if a.is_image {
                let thumb = gtk::Picture::for_filename(&a.path);
                thumb.set_size_request(48, 48);
                thumb.set_can_shrink(true);
                row.append(&thumb);
            } else {
                row.append(&gtk::Image::from_icon_name("text-x-generic-symbolic"));
            }
            let text = gtk::Box::new(gtk::Orientation::Vertical, 2);
            text.set_hexpand(true);
            let name = gtk::Label::new(Some(&a.name));
            name.set_ellipsize(gtk::pango::EllipsizeMode::Middle);
            name.set_halign(gtk::Align::Start);
            let mime = gtk::Label::new(Some(&a.mime));
            mime.add_css_class("dim-label");
            mime.set_halign(gtk::Align::Start);
            text.append(&name);
            text.append(&mime);
            row.append(&text);

            let remove = gtk::Button::with_label(&self.ctx.t("common.delete"));
            remove.add_css_class("destructive-action");
            let weak = Rc::downgrade(self);
            remove.connect_clicked(move |_| {
                let Some(this) = weak.upgrade() else { return };
                this.draft.borrow_mut().remove_attachment(index);
                this.render_attachments();
            });
            row.append(&remove);
            self.attachments_box.append(&row);
        }
        self.attachments_box.set_visible(!draft.attachments.is_empty());
    }

    fn collect(&self) -> ComplaintDraft {
        let buffer = self.description.buffer();
        let mut draft = self.draft.borrow().clone();
        draft.title = self.title_entry.text().to_string();
        draft.description = buffer.text(&buffer.start_iter(), &buffer.end_iter(), false).to_string();
        draft.kind = self.type_entry.text().to_string();
        draft.location = optional(&self.location_entry.text());
        draft.priority = match self.priority.selected() {
            0 => None,
            n => Priority::ALL.get(n as usize - 1).copied(),
        };
        draft.phone = optional(&self.phone_entry.text());
        draft.email = optional(&self.email_entry.text());
        draft
    }

    fn reset(self: &Rc<Self>) {
        self.draft.borrow_mut().clear();
        self.title_entry.set_text("");
        self.description.buffer().set_text("");
        self.type_entry.set_text("");
        for chip in &self.chips {
            chip.set_active(false);
        }
        self.location_entry.set_text("");
        self.priority.set_selected(0);
        self.phone_entry.set_text("");
        self.email_entry.set_text("");
        self.render_attachments();
    }

    fn set_busy(&self, busy: bool) {
        self.submit_btn.set_sensitive(!busy);
        self.spinner.set_spinning(busy);
    }

    fn submit(self: &Rc<Self>) {
        let draft = self.collect();
        if let Err(e) = draft.validate() {
            self.overlay.add_toast(adw::Toast::new(&error_text(&self.ctx, &e, "form.sendFailed")));
            return;
        }
        self.set_busy(true);

        let api = self.ctx.api();
        let to_send = draft.clone();
        let weak = Rc::downgrade(self);
        crate::utils::spawn_to_main(async move { api.submit_complaint(&to_send).await }, move |sent| {
            let Some(this) = weak.upgrade() else { return };
            this.set_busy(false);
            let ctx = &this.ctx;
            let outcome = ctx.complaints.borrow_mut().settle_submit(&draft, sent);
            match outcome {
                Ok(outcome) => {
                    let key = match outcome {
                        SubmitOutcome::Sent(_) => "form.sent",
                        SubmitOutcome::SavedLocally(_) => "form.savedLocally",
                    };
                    ctx.notify(Change::Complaints);
                    this.overlay.add_toast(adw::Toast::new(&ctx.t(key)));
                    this.reset();
                    if let Some(on_filed) = this.on_filed.borrow().as_ref() {
                        on_filed();
                    }
                }
                Err(e) => {
                    log::warn!("Submit rejected: {e}");
                    this.overlay.add_toast(adw::Toast::new(&error_text(ctx, &e, "form.sendFailed")));
                }
            }
        });
    }
}
