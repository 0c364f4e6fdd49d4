use crate::api::client::ApiClient;
use crate::api::models::User;
use crate::error::{Error, Result};
use crate::storage::{keys, Storage};

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
}

pub fn validate_credentials(phone: &str, password: &str) -> Result<()> {
    let phone = phone.trim();
    if phone.is_empty() || password.is_empty() {
        return Err(Error::Validation("auth.credentialsRequired"));
    }
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation("auth.invalidPhone"));
    }
    Ok(())
}

pub fn stored_credentials(storage: &Storage) -> Result<Option<Credentials>> {
    let token = storage.get(keys::TOKEN)?;
    let user_id = storage.get(keys::USER_ID)?;
    Ok(match (token, user_id) {
        (Some(token), Some(user_id)) if !token.is_empty() && !user_id.is_empty() => {
            Some(Credentials { token, user_id })
        }
        _ => None,
    })
}

/// Reloads the signed-in user when a session was saved earlier.
pub async fn restore(api: &ApiClient, storage: &Storage) -> Result<Option<(User, String)>> {
    let Some(creds) = stored_credentials(storage)? else {
        return Ok(None);
    };
    let user = api.clone().with_token(Some(creds.token.clone())).me().await?;
    Ok(Some((user, creds.token)))
}

pub async fn login(api: &ApiClient, storage: &Storage, phone: &str, password: &str) -> Result<(User, String)> {
    validate_credentials(phone, password)?;
    let res = api.login(phone.trim(), password).await?;
    storage.set(keys::TOKEN, &res.token)?;
    storage.set(keys::USER_ID, &res.user.id)?;
    log::info!("Logged in as {}", res.user.id);
    Ok((res.user, res.token))
}

pub async fn register(api: &ApiClient, phone: &str, password: &str, full_name: Option<&str>) -> Result<()> {
    validate_credentials(phone, password)?;
    api.register(phone.trim(), password, full_name).await
}

/// Ends the saved session and drops the account's cached complaints and notifications.
pub fn logout(storage: &Storage) -> Result<()> {
    storage.remove(keys::TOKEN)?;
    storage.remove(keys::USER_ID)?;
    storage.clear_user_data()?;
    log::info!("Logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::temp_storage;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn phone_rules() {
        assert!(validate_credentials("+970599000111", "pw").is_ok());
        assert!(matches!(validate_credentials("", "pw"), Err(Error::Validation("auth.credentialsRequired"))));
        assert!(matches!(validate_credentials("0599", ""), Err(Error::Validation("auth.credentialsRequired"))));
        assert!(matches!(validate_credentials("05-99", "pw"), Err(Error::Validation("auth.invalidPhone"))));
        assert!(matches!(validate_credentials("+", "pw"), Err(Error::Validation("auth.invalidPhone"))));
    }

    #[tokio::test]
    async fn login_persists_session_and_logout_clears_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "t-1",
                "user": { "_id": "u-1", "phone": "0599", "fullName": "Sara" }
            })))
            .mount(&server)
            .await;
        let (_dir, storage) = temp_storage();
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();

        let (user, token) = login(&api, &storage, " 0599 ", "pw").await.unwrap();
        assert_eq!(user.display_name(), "Sara");
        assert_eq!(token, "t-1");
        assert_eq!(
            stored_credentials(&storage).unwrap(),
            Some(Credentials { token: "t-1".into(), user_id: "u-1".into() })
        );

        logout(&storage).unwrap();
        assert_eq!(stored_credentials(&storage).unwrap(), None);
    }

    #[test]
    fn logout_leaves_nothing_for_the_next_account() {
        use crate::form::ComplaintDraft;
        use crate::state::complaints::ComplaintsStore;
        use crate::state::notifications::NotificationsStore;
        use crate::storage::tests::notification;

        let (_dir, storage) = temp_storage();
        storage.set(keys::TOKEN, "t-1").unwrap();
        storage.set(keys::USER_ID, "u-1").unwrap();
        let mut complaints = ComplaintsStore::load(storage.clone());
        complaints.add_local(&ComplaintDraft { title: "Noise".into(), kind: "other".into(), ..Default::default() });
        let mut notifications = NotificationsStore::load(storage.clone());
        assert!(notifications.push(notification("n1", 1, false)));

        logout(&storage).unwrap();

        let mut complaints = ComplaintsStore::load(storage.clone());
        complaints.replace_remote(Vec::new());
        assert!(complaints.all().is_empty());
        let notifications = NotificationsStore::load(storage);
        assert!(notifications.all().is_empty());
        assert_eq!(notifications.unread_count(), 0);
    }

    #[tokio::test]
    async fn restore_uses_saved_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .and(header("Authorization", "Bearer saved"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "_id": "u-2", "phone": "0598" })))
            .mount(&server)
            .await;
        let (_dir, storage) = temp_storage();
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();

        assert!(restore(&api, &storage).await.unwrap().is_none());

        storage.set(keys::TOKEN, "saved").unwrap();
        storage.set(keys::USER_ID, "u-2").unwrap();
        let (user, token) = restore(&api, &storage).await.unwrap().unwrap();
        assert_eq!(user.id, "u-2");
        assert_eq!(token, "saved");
    }
}
