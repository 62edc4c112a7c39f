use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Form,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Access level attached to a user and carried in its sessions.
///
/// Only two levels exist: admins may upload movement batches and send email,
/// viewers may only read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }
}

/// A registered application user.
///
/// The credential table is static: both accounts are built at process start
/// and never change afterwards.
#[derive(Debug, Clone)]
pub struct User {
    /// Username (unique identifier for the user)
    pub username: String,

    /// Argon2 hash of the user's password
    pub password_hash: String,

    /// Access level
    pub role: Role,

    /// Contact address
    pub email: String,
}

/// Login form data received from the client.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,

    /// Password in plaintext (only transmitted, never stored)
    pub password: String,
}

/// An authenticated user session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Username of the authenticated user
    pub username: String,

    /// Role captured at login time
    pub role: Role,

    /// Time when the session expires
    pub expires_at: SystemTime,
}

/// Global session storage, keyed by opaque session id.
lazy_static! {
    static ref USERS: HashMap<String, User> = demo_users();
    static ref SESSIONS: RwLock<HashMap<String, Session>> = RwLock::new(HashMap::new());
}

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session";

const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds

// The two built-in demo accounts. Passwords are hashed at process start so
// only the hashes ever live in memory.
fn demo_users() -> HashMap<String, User> {
    let mut users = HashMap::new();
    for (username, password, role, email) in [
        ("admin", "admin123", Role::Admin, "admin@example.com"),
        ("viewer", "viewer123", Role::Viewer, "viewer@example.com"),
    ] {
        let password_hash =
            hash_password(password).expect("hashing a built-in password cannot fail");
        users.insert(
            username.to_string(),
            User {
                username: username.to_string(),
                password_hash,
                role,
                email: email.to_string(),
            },
        );
    }
    users
}

/// Verify a username/password pair against the credential table.
///
/// # Arguments
/// * `username` - Username to look up
/// * `password` - Password to verify
///
/// # Returns
/// * `Result<Option<&'static User>, String>` - The matching user on success,
///   `None` for an unknown username or wrong password, or an error
///
/// # Errors
/// * Returns an error if the stored hash cannot be parsed
pub fn authenticate(username: &str, password: &str) -> Result<Option<&'static User>, String> {
    match USERS.get(username) {
        Some(user) => {
            if verify_password(password, &user.password_hash)? {
                Ok(Some(user))
            } else {
                Ok(None)
            }
        }
        None => Ok(None),
    }
}

/// Hash a password using Argon2
///
/// # Arguments
/// * `password` - The plaintext password to hash
///
/// # Returns
/// * `Result<String, String>` - The password hash or an error
fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    match argon2.hash_password(password.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(_) => Err("Password hashing failed".to_string()),
    }
}

/// Verify a password against a stored hash
///
/// # Arguments
/// * `password` - The plaintext password to verify
/// * `hash` - The stored password hash to check against
///
/// # Returns
/// * `Result<bool, String>` - True if the password matches, false if not, or an error
fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(hash) => hash,
        Err(_) => return Err("Invalid password hash format".to_string()),
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false), // Password didn't match
    }
}

/// Create a new session for an authenticated user.
///
/// # Returns
/// * `String` - A unique session id
pub fn create_session(user: &User) -> String {
    let session_id = Uuid::new_v4().to_string();
    let expires_at = SystemTime::now() + Duration::from_secs(SESSION_DURATION);

    let session = Session {
        username: user.username.clone(),
        role: user.role,
        expires_at,
    };

    let mut sessions = SESSIONS.write().unwrap();
    sessions.insert(session_id.clone(), session);

    session_id
}

/// Validate a session id.
///
/// # Returns
/// * `Option<Session>` - The session if it exists and has not expired
pub fn validate_session(session_id: &str) -> Option<Session> {
    let sessions = SESSIONS.read().unwrap();

    if let Some(session) = sessions.get(session_id) {
        if session.expires_at > SystemTime::now() {
            return Some(session.clone());
        }
    }

    None
}

/// Remove a session from the session table.
pub fn destroy_session(session_id: &str) {
    let mut sessions = SESSIONS.write().unwrap();
    sessions.remove(session_id);
}

/// Resolve the current session from a request's cookie jar.
pub fn session_from_jar(jar: &CookieJar) -> Option<Session> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| validate_session(cookie.value()))
}

// Web handler functions below

/// Serve the login page HTML
pub async fn serve_login_page() -> Html<&'static str> {
    Html(include_str!("./static/login.html"))
}

/// Handle login form submissions.
///
/// Validates credentials against the static credential table and, if valid,
/// creates a session and sets the session cookie.
///
/// # Arguments
/// * `jar` - Cookie jar for storing the session cookie
/// * `form` - Form data containing the username and password
///
/// # Returns
/// * `Response` - Redirect to the dashboard if successful, or plain
///   `Invalid credentials` text if not
#[axum::debug_handler]
pub async fn handle_login(jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    match authenticate(&form.username, &form.password) {
        Ok(Some(user)) => {
            let session_id = create_session(user);
            let cookie = Cookie::new(SESSION_COOKIE, session_id);
            log::info!("user {} logged in as {}", user.username, user.role.as_str());
            (jar.add(cookie), Redirect::to("/dashboard")).into_response()
        }
        Ok(None) => {
            log::warn!("failed login attempt for {}", form.username);
            (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
        }
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error").into_response(),
    }
}

/// Handle user logout.
///
/// Destroys the server-side session, clears the session cookie and redirects
/// to the login page.
pub async fn handle_logout(jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        destroy_session(cookie.value());
    }

    let cookie = Cookie::new(SESSION_COOKIE, "");
    (jar.add(cookie), Redirect::to("/login"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn demo_accounts_authenticate_with_their_roles() {
        let admin = authenticate("admin", "admin123").unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);

        let viewer = authenticate("viewer", "viewer123").unwrap().unwrap();
        assert_eq!(viewer.role, Role::Viewer);
    }

    #[test]
    fn bad_credentials_are_rejected() {
        assert!(authenticate("admin", "wrong").unwrap().is_none());
        assert!(authenticate("nobody", "admin123").unwrap().is_none());
    }

    #[test]
    fn session_lifecycle() {
        let user = USERS.get("viewer").unwrap();
        let id = create_session(user);

        let session = validate_session(&id).expect("fresh session validates");
        assert_eq!(session.username, "viewer");
        assert_eq!(session.role, Role::Viewer);

        destroy_session(&id);
        assert!(validate_session(&id).is_none());
    }

    #[test]
    fn expired_sessions_do_not_validate() {
        let id = Uuid::new_v4().to_string();
        let session = Session {
            username: "admin".to_string(),
            role: Role::Admin,
            expires_at: SystemTime::now() - Duration::from_secs(1),
        };
        SESSIONS.write().unwrap().insert(id.clone(), session);

        assert!(validate_session(&id).is_none());
    }

    #[test]
    fn unknown_session_ids_do_not_validate() {
        assert!(validate_session("not-a-session").is_none());
    }
}
