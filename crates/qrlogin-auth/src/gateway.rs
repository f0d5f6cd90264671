//! Auth gateway: maps credentials and bearer tokens to user identities

use crate::error::{AuthError, AuthResult};
use crate::token::TokenService;
use crate::user::{UserDirectory, UserId, UserProfile};
use tracing::{debug, info, warn};

/// Combines the token service and user directory
pub struct AuthGateway {
    tokens: TokenService,
    users: UserDirectory,
}

impl AuthGateway {
    /// Create a new auth gateway
    pub fn new(tokens: TokenService, users: UserDirectory) -> Self {
        Self { tokens, users }
    }

    /// Issue a token for a user id
    pub fn issue_token(&self, user_id: UserId) -> AuthResult<String> {
        self.tokens.issue(user_id)
    }

    /// Validate a token and return the user id it is bound to
    pub fn verify_token(&self, token: &str) -> AuthResult<UserId> {
        self.tokens.verify(token)
    }

    /// Check credentials and issue a token on success
    pub fn login(&self, username: &str, password: &str) -> AuthResult<String> {
        let user = self.users.authenticate(username, password).map_err(|e| {
            warn!("Login failed for {:?}: {}", username, e);
            e
        })?;
        info!("User {} logged in", user.id);
        self.tokens.issue(user.id)
    }

    /// Resolve a token to the profile of a user that still exists
    pub fn current_user(&self, token: &str) -> AuthResult<UserProfile> {
        let user_id = self.tokens.verify(token)?;
        self.users
            .get(user_id)
            .map(UserProfile::from)
            .ok_or(AuthError::UserNotFound(user_id))
    }

    /// Resolve an `Authorization` header value of the form `Bearer <token>`
    pub fn authenticate_bearer(&self, header: Option<&str>) -> AuthResult<UserProfile> {
        let token = bearer_token(header)?;
        self.current_user(token).map_err(|e| {
            debug!("Bearer authentication failed: {}", e);
            e
        })
    }
}

/// Extract the token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserSeed;
    use chrono::Duration;

    fn gateway() -> AuthGateway {
        AuthGateway::new(
            TokenService::new("gateway-secret", Duration::hours(1)),
            UserDirectory::with_default_users().unwrap(),
        )
    }

    #[test]
    fn test_login_success() {
        let gateway = gateway();
        let token = gateway.login("sun", "111").unwrap();
        assert_eq!(gateway.verify_token(&token).unwrap(), UserId(1));
    }

    #[test]
    fn test_login_failures_are_unauthorized() {
        let gateway = gateway();
        let wrong = gateway.login("sun", "000").unwrap_err();
        assert!(matches!(wrong, AuthError::WrongPassword));
        assert!(wrong.is_unauthorized());

        let unknown = gateway.login("moon", "111").unwrap_err();
        assert!(matches!(unknown, AuthError::UnknownUser));
        assert!(unknown.is_unauthorized());
    }

    #[test]
    fn test_current_user() {
        let gateway = gateway();
        let token = gateway.login("guang", "222").unwrap();
        let profile = gateway.current_user(&token).unwrap();
        assert_eq!(profile.id, UserId(2));
        assert_eq!(profile.username, "guang");
    }

    #[test]
    fn test_token_for_missing_user() {
        let gateway = AuthGateway::new(
            TokenService::new("gateway-secret", Duration::hours(1)),
            UserDirectory::from_seeds([UserSeed {
                id: 1,
                username: "sun".to_string(),
                password: "111".to_string(),
            }])
            .unwrap(),
        );
        let token = gateway.issue_token(UserId(99)).unwrap();
        assert!(matches!(
            gateway.current_user(&token),
            Err(AuthError::UserNotFound(UserId(99)))
        ));
    }

    #[test]
    fn test_bearer_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(Some("bearer  abc ")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            bearer_token(Some("Basic abc")),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            bearer_token(Some("abc")),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[test]
    fn test_authenticate_bearer() {
        let gateway = gateway();
        let token = gateway.login("sun", "111").unwrap();
        let header = format!("Bearer {}", token);
        assert_eq!(
            gateway.authenticate_bearer(Some(header.as_str())).unwrap().username,
            "sun"
        );
        assert!(gateway.authenticate_bearer(Some("Bearer junk")).is_err());
    }
}
