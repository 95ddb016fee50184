use chrono::{DateTime, Duration, Utc};
use entity::user;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use platform_api::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "crm_session";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum UserRole {
    Owner,
    Admin,
    Sales,
    Viewer,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Owner => "OWNER",
            UserRole::Admin => "ADMIN",
            UserRole::Sales => "SALES",
            UserRole::Viewer => "VIEWER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OWNER" => Some(UserRole::Owner),
            "ADMIN" => Some(UserRole::Admin),
            "SALES" => Some(UserRole::Sales),
            "VIEWER" => Some(UserRole::Viewer),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            UserRole::Owner => 4,
            UserRole::Admin => 3,
            UserRole::Sales => 2,
            UserRole::Viewer => 1,
        }
    }
}

impl From<user::Role> for UserRole {
    fn from(value: user::Role) -> Self {
        match value {
            user::Role::Owner => UserRole::Owner,
            user::Role::Admin => UserRole::Admin,
            user::Role::Sales => UserRole::Sales,
            user::Role::Viewer => UserRole::Viewer,
        }
    }
}

impl From<UserRole> for user::Role {
    fn from(value: UserRole) -> Self {
        match value {
            UserRole::Owner => user::Role::Owner,
            UserRole::Admin => user::Role::Admin,
            UserRole::Sales => user::Role::Sales,
            UserRole::Viewer => user::Role::Viewer,
        }
    }
}

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn from_user(model: &user::Model) -> Self {
        Self::new(model.id, model.role.into())
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role.level() >= role.level()
    }

    pub fn require(&self, role: UserRole) -> ApiResult<()> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }

    pub fn require_admin(&self) -> ApiResult<()> {
        self.require(UserRole::Admin)
    }

    /// Owners of a record and admins may change it.
    pub fn can_write(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

pub fn issue_token(
    user_id: Uuid,
    role: UserRole,
    config: &AuthConfig,
    now: DateTime<Utc>,
) -> jsonwebtoken::errors::Result<String> {
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: user_id,
        role: role.as_str().to_string(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_minutes: 30,
        }
    }

    #[test]
    fn role_ladder_is_ordered() {
        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);
        assert!(admin.has_role(UserRole::Sales));
        assert!(admin.is_admin());

        let owner = Actor::new(Uuid::new_v4(), UserRole::Owner);
        assert!(owner.is_admin());

        let sales = Actor::new(Uuid::new_v4(), UserRole::Sales);
        assert!(!sales.is_admin());
        assert!(matches!(sales.require_admin(), Err(ApiError::Forbidden)));

        let viewer = Actor::new(Uuid::new_v4(), UserRole::Viewer);
        assert!(viewer.require(UserRole::Viewer).is_ok());
        assert!(viewer.require(UserRole::Sales).is_err());
    }

    #[test]
    fn owner_or_admin_can_write() {
        let owner_id = Uuid::new_v4();
        assert!(Actor::new(owner_id, UserRole::Sales).can_write(owner_id));
        assert!(Actor::new(Uuid::new_v4(), UserRole::Admin).can_write(owner_id));
        assert!(!Actor::new(Uuid::new_v4(), UserRole::Sales).can_write(owner_id));
    }

    #[test]
    fn token_round_trip_keeps_subject_and_role() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, UserRole::Sales, &config(), Utc::now()).expect("token");
        let claims = decode_token(&token, &config()).expect("claims");
        assert_eq!(claims.sub, user_id);
        assert_eq!(UserRole::parse(&claims.role), Some(UserRole::Sales));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issued = Utc::now() - Duration::hours(3);
        let token = issue_token(Uuid::new_v4(), UserRole::Viewer, &config(), issued).expect("token");
        assert!(decode_token(&token, &config()).is_err());
    }
}
