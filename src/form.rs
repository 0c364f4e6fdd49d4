use crate::api::models::Priority;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Quick picks offered above the free-text type entry. Values are translation keys.
pub const COMMON_TYPES: [&str; 4] = ["types.services", "types.cleanliness", "types.safety", "types.other"];

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDraft {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
    pub is_image: bool,
}

impl AttachmentDraft {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = guess_mime(&path).to_string();
        let is_image = mime.starts_with("image/");
        Self { path, name, mime, is_image }
    }

    /// Name sent in the multipart body; unnamed files become `file-<index>`.
    pub fn upload_name(&self, index: usize) -> String {
        if self.name.is_empty() { format!("file-{}", index) } else { self.name.clone() }
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => FALLBACK_MIME,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintDraft {
    pub title: String,
    pub description: String,
    pub kind: String,
    pub location: Option<String>,
    pub priority: Option<Priority>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub attachments: Vec<AttachmentDraft>,
}

impl ComplaintDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.kind.trim().is_empty() {
            return Err(Error::Validation("form.titleAndTypeRequired"));
        }
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                return Err(Error::Validation("form.invalidEmail"));
            }
        }
        Ok(())
    }

    pub fn add_attachment(&mut self, attachment: AttachmentDraft) {
        self.attachments.push(attachment);
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<AttachmentDraft> {
        (index < self.attachments.len()).then(|| self.attachments.remove(index))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Trims and drops blank optional fields.
pub fn optional(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() { None } else { Some(v.to_string()) }
}
