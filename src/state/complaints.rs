use crate::api::client::ApiClient;
use crate::api::models::{Complaint, ComplaintStatus};
use crate::error::Result;
use crate::form::ComplaintDraft;
use crate::storage::Storage;
use crate::utils::{spawn_poll, PollHandle};
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;

/// What became of a submitted complaint.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The backend took it; the body is the created complaint when it echoed one.
    Sent(Option<Complaint>),
    /// The backend was unreachable, so it was kept on this device.
    SavedLocally(Complaint),
}

/// Complaints shown in the list, newest first, mirrored into the local cache.
#[derive(Debug)]
pub struct ComplaintsStore {
    storage: Storage,
    items: Vec<Complaint>,
}

impl ComplaintsStore {
    pub fn load(storage: Storage) -> Self {
        let items = storage.cached_complaints(Some(500)).unwrap_or_else(|e| {
            log::warn!("Failed to read cached complaints: {e}");
            Vec::new()
        });
        Self { storage, items }
    }

    pub fn all(&self) -> &[Complaint] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Complaint> {
        self.items.iter().find(|c| c.id == id)
    }

    /// Keeps a complaint the backend never accepted so the user does not lose it.
    pub fn add_local(&mut self, draft: &ComplaintDraft) -> Complaint {
        let complaint = Complaint {
            id: Utc::now().timestamp_millis().to_string(),
            title: draft.title.trim().to_string(),
            kind: draft.kind.trim().to_string(),
            status: ComplaintStatus::Pending,
            created_at: Utc::now(),
            description: draft.description.trim().to_string(),
            location: draft.location.clone(),
            priority: draft.priority,
            phone: draft.phone.clone(),
            email: draft.email.clone(),
            attachments: Vec::new(),
            local: true,
        };
        self.items.insert(0, complaint.clone());
        if let Err(e) = self.storage.upsert_complaints(std::slice::from_ref(&complaint)) {
            log::warn!("Failed to cache local complaint: {e}");
        }
        complaint
    }

    /// Folds the result of `ApiClient::submit_complaint` into the store.
    /// Offline failures keep the draft as a local complaint; any other error is handed back.
    pub fn settle_submit(&mut self, draft: &ComplaintDraft, sent: Result<Option<Complaint>>) -> Result<SubmitOutcome> {
        match sent {
            Ok(created) => {
                if let Some(c) = &created {
                    self.apply_update(c.clone());
                }
                Ok(SubmitOutcome::Sent(created))
            }
            Err(e) if e.is_offline() => {
                log::warn!("Submit failed, keeping complaint locally: {e}");
                Ok(SubmitOutcome::SavedLocally(self.add_local(draft)))
            }
            Err(e) => Err(e),
        }
    }

    /// Server list wins for server rows; local-only rows stay on top until logout.
    pub fn replace_remote(&mut self, mut remote: Vec<Complaint>) {
        remote.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut merged: Vec<Complaint> = self.items.drain(..).filter(|c| c.local).collect();
        merged.extend(remote.iter().cloned());
        self.items = merged;
        if let Err(e) = self.storage.replace_remote_complaints(&remote) {
            log::warn!("Failed to cache complaints: {e}");
        }
    }

    /// Forgets the in-memory list; the cache is wiped by `auth::logout`.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn apply_update(&mut self, complaint: Complaint) {
        if let Err(e) = self.storage.upsert_complaints(std::slice::from_ref(&complaint)) {
            log::warn!("Failed to cache complaint {}: {e}", complaint.id);
        }
        match self.items.iter_mut().find(|c| c.id == complaint.id) {
            Some(existing) => *existing = complaint,
            None => {
                let at = self.items.iter().position(|c| !c.local && c.created_at < complaint.created_at);
                self.items.insert(at.unwrap_or(self.items.len()), complaint);
            }
        }
    }
}

/// Fetches `/complaints/mine` every `every` until the handle is dropped.
pub fn spawn_refresh(api: ApiClient, every: Duration, results: mpsc::UnboundedSender<Result<Vec<Complaint>>>) -> PollHandle {
    spawn_poll(
        every,
        move || {
            let api = api.clone();
            async move { api.my_complaints().await }
        },
        results,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::tests::{complaint, temp_storage};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn local_complaint_goes_first_and_is_cached() {
        let (_dir, storage) = temp_storage();
        let mut store = ComplaintsStore::load(storage.clone());
        store.replace_remote(vec![complaint("r1", 2, false)]);

        let draft = ComplaintDraft { title: " Broken door ".into(), kind: "maintenance".into(), ..Default::default() };
        let local = store.add_local(&draft);
        assert_eq!(local.title, "Broken door");
        assert_eq!(local.status, ComplaintStatus::Pending);
        assert!(local.local);
        assert_eq!(store.all()[0].id, local.id);

        let reloaded = ComplaintsStore::load(storage);
        assert_eq!(reloaded.all().len(), 2);
        assert!(reloaded.get(&local.id).unwrap().local);
    }

    #[test]
    fn remote_refresh_keeps_local_and_sorts_newest_first() {
        let (_dir, storage) = temp_storage();
        let mut store = ComplaintsStore::load(storage);
        store.apply_update(complaint("l1", 1, true));
        store.replace_remote(vec![complaint("old", 48, false), complaint("new", 3, false)]);

        let ids: Vec<&str> = store.all().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "new", "old"]);

        store.replace_remote(vec![complaint("new", 3, false)]);
        assert!(store.get("old").is_none());
        assert!(store.get("l1").unwrap().local);
    }

    #[test]
    fn update_replaces_in_place_or_inserts_by_date() {
        let (_dir, storage) = temp_storage();
        let mut store = ComplaintsStore::load(storage);
        store.replace_remote(vec![complaint("a", 1, false), complaint("c", 30, false)]);

        let mut changed = complaint("a", 1, false);
        changed.status = ComplaintStatus::Resolved;
        store.apply_update(changed);
        assert_eq!(store.get("a").unwrap().status, ComplaintStatus::Resolved);

        store.apply_update(complaint("b", 10, false));
        let ids: Vec<&str> = store.all().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    fn valid_draft() -> ComplaintDraft {
        ComplaintDraft { title: "Leak".into(), kind: "safety".into(), ..Default::default() }
    }

    async fn submit_against(status: u16, body: serde_json::Value) -> (ComplaintsStore, Result<SubmitOutcome>, tempfile::TempDir) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/complaints"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let (dir, storage) = temp_storage();
        let mut store = ComplaintsStore::load(storage);
        let draft = valid_draft();
        let sent = api.submit_complaint(&draft).await;
        let outcome = store.settle_submit(&draft, sent);
        (store, outcome, dir)
    }

    #[tokio::test]
    async fn accepted_submit_lands_in_store() {
        let (store, outcome, _dir) = submit_against(
            201,
            serde_json::json!({ "_id": "c7", "title": "Leak", "type": "safety", "status": "pending", "createdAt": "2024-02-01T00:00:00Z" }),
        )
        .await;
        match outcome.unwrap() {
            SubmitOutcome::Sent(Some(c)) => assert_eq!(c.id, "c7"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(store.all().len(), 1);
        assert!(!store.get("c7").unwrap().local);
    }

    #[tokio::test]
    async fn server_failure_keeps_complaint_locally() {
        let (store, outcome, _dir) = submit_against(503, serde_json::json!({ "message": "maintenance" })).await;
        let SubmitOutcome::SavedLocally(local) = outcome.unwrap() else { panic!("expected local fallback") };
        assert!(local.local);
        assert_eq!(local.title, "Leak");
        assert_eq!(store.all()[0].id, local.id);
    }

    #[tokio::test]
    async fn rejected_submit_surfaces_server_message() {
        let (store, outcome, _dir) = submit_against(422, serde_json::json!({ "message": "Title too short" })).await;
        match outcome {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "Title too short");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_keeps_complaint_locally() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = ApiClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let (_dir, storage) = temp_storage();
        let mut store = ComplaintsStore::load(storage.clone());

        let draft = valid_draft();
        let sent = api.submit_complaint(&draft).await;
        assert!(matches!(store.settle_submit(&draft, sent), Ok(SubmitOutcome::SavedLocally(_))));
        assert_eq!(ComplaintsStore::load(storage).all().len(), 1);
    }

    #[tokio::test]
    async fn refresh_poll_delivers_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/complaints/mine"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "_id": "c1", "title": "Stairs", "type": "cleaning", "status": "running", "createdAt": "2024-02-01T00:00:00Z" }
            ])))
            .mount(&server)
            .await;
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_refresh(api, Duration::from_secs(10), tx);

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap().unwrap();
        assert_eq!(first[0].id, "c1");
        drop(handle);
    }
}
