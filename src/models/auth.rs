use serde::{ Serialize, Deserialize };

/// User record returned by the auth endpoints and persisted between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The signed-in patient as the controller sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub display_email: Option<String>,
    pub authenticated: bool,
}

impl Session {
    pub fn to_user(&self) -> User {
        User {
            username: self.username.clone(),
            patient_id: self.user_id.clone(),
            email: self.display_email.clone(),
        }
    }
}

impl From<User> for Session {
    fn from(user: User) -> Self {
        Self {
            user_id: user.patient_id,
            username: user.username,
            display_email: user.email.filter(|e| !e.is_empty()),
            authenticated: true,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct UpdateEmailRequest {
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    pub user: User,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub live: bool,
}
