use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub phone: String,
    #[serde(rename = "fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    Running,
    Resolved,
    Rejected,
}

// The backend is not strict about status spelling; anything unknown is still
// waiting for review as far as the user is concerned.
impl<'de> Deserialize<'de> for ComplaintStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(match raw.to_ascii_lowercase().as_str() {
            "running" | "in_progress" | "in-progress" => ComplaintStatus::Running,
            "resolved" | "done" => ComplaintStatus::Resolved,
            "rejected" => ComplaintStatus::Rejected,
            _ => ComplaintStatus::Pending,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Done,
    Current,
    Upcoming,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::Running,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::Running => "running",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Rejected => "rejected",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "status.pending",
            ComplaintStatus::Running => "status.running",
            ComplaintStatus::Resolved => "status.resolved",
            ComplaintStatus::Rejected => "status.rejected",
        }
    }

    /// Stages shown in the detail view. Display only, nothing enforces order.
    pub fn timeline(self) -> Vec<(ComplaintStatus, StepState)> {
        use ComplaintStatus::*;
        match self {
            Pending => vec![(Pending, StepState::Current), (Running, StepState::Upcoming), (Resolved, StepState::Upcoming)],
            Running => vec![(Pending, StepState::Done), (Running, StepState::Current), (Resolved, StepState::Upcoming)],
            Resolved => vec![(Pending, StepState::Done), (Running, StepState::Done), (Resolved, StepState::Current)],
            Rejected => vec![(Pending, StepState::Done), (Rejected, StepState::Current)],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Priority::Low => "priority.low",
            Priority::Medium => "priority.medium",
            Priority::High => "priority.high",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteAttachment {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl RemoteAttachment {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Complaint {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: ComplaintStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<RemoteAttachment>,
    /// Only exists on this device; the backend never saw it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub local: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Complaint,
    Update,
    #[default]
    System,
    Alert,
}

impl NotificationKind {
    pub fn icon_name(self) -> &'static str {
        match self {
            NotificationKind::Complaint => "document-new-symbolic",
            NotificationKind::Update => "emblem-ok-symbolic",
            NotificationKind::Alert => "dialog-warning-symbolic",
            NotificationKind::System => "preferences-system-notifications-symbolic",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            NotificationKind::Complaint => "notification-complaint",
            NotificationKind::Update => "notification-update",
            NotificationKind::Alert => "notification-alert",
            NotificationKind::System => "notification-system",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Notification {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complaint_parses_backend_shape() {
        let json = serde_json::json!({
            "_id": "665f",
            "title": "Broken heating",
            "type": "maintenance",
            "status": "running",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "description": "first floor",
            "priority": "high",
            "attachments": [{ "url": "/uploads/a.jpg", "name": "a.jpg" }]
        });
        let c: Complaint = serde_json::from_value(json).unwrap();
        assert_eq!(c.id, "665f");
        assert_eq!(c.kind, "maintenance");
        assert_eq!(c.status, ComplaintStatus::Running);
        assert_eq!(c.priority, Some(Priority::High));
        assert_eq!(c.attachments[0].label(), "a.jpg");
        assert!(!c.local);
    }

    #[test]
    fn unknown_status_reads_as_pending() {
        let s: ComplaintStatus = serde_json::from_str("\"under_review\"").unwrap();
        assert_eq!(s, ComplaintStatus::Pending);
    }

    #[test]
    fn rejected_timeline_skips_running() {
        let steps = ComplaintStatus::Rejected.timeline();
        assert_eq!(
            steps,
            vec![
                (ComplaintStatus::Pending, StepState::Done),
                (ComplaintStatus::Rejected, StepState::Current),
            ]
        );
    }

    #[test]
    fn running_timeline_marks_current_stage() {
        let steps = ComplaintStatus::Running.timeline();
        assert_eq!(steps[0].1, StepState::Done);
        assert_eq!(steps[1], (ComplaintStatus::Running, StepState::Current));
        assert_eq!(steps[2].1, StepState::Upcoming);
    }

    #[test]
    fn display_name_falls_back_to_phone() {
        let mut user = User { id: "u1".into(), phone: "0599".into(), full_name: Some("  ".into()), role: None, email: None };
        assert_eq!(user.display_name(), "0599");
        user.full_name = Some("Sara".into());
        assert_eq!(user.display_name(), "Sara");
    }
}
