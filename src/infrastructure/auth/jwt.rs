use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};
use uuid::Uuid;
use crate::entities::token::{Claims, RefreshClaims};
use crate::entities::user::User;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_expiration: Duration,
    refresh_expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            access_expiration: Duration::minutes(config.jwt_expiration_minutes),
            refresh_expiration: Duration::days(config.refresh_token_exp_days),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation
    }
}

impl TokenServiceRepository for JwtService {
    fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            admin: user.is_admin,
            verified: user.is_verified,
            exp: (now + self.access_expiration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding).map_err(AuthError::from)
    }

    fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            exp: (now + self.refresh_expiration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.refresh_encoding).map_err(AuthError::from)
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        decode::<Claims>(token, &self.keys.decoding, &Self::validation()).map_err(AuthError::from)
    }

    fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError> {
        decode::<RefreshClaims>(token, &self.keys.refresh_decoding, &Self::validation())
            .map_err(AuthError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{AppEnvironment, default_image_extensions};
    use std::path::PathBuf;

    fn config() -> AppConfig {
        AppConfig {
            env: AppEnvironment::Testing,
            name: "Rental-API".into(),
            port: 0,
            host: "127.0.0.1".into(),
            worker_count: 1,
            database_url: "postgres://localhost/rental_test".into(),
            cors_allowed_origins: vec!["*".into()],
            jwt_secret: "access-secret-that-is-long-enough-for-hs512".into(),
            jwt_expiration_minutes: 15,
            refresh_token_secret: "refresh-secret-that-is-long-enough-for-hs512".into(),
            refresh_token_exp_days: 7,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 1024,
            allowed_image_extensions: default_image_extensions(),
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "host@example.com".into(),
            full_name: None,
            phone: None,
            password_hash: String::new(),
            is_admin: true,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let service = JwtService::new(&config());
        let user = user();

        let token = service.create_jwt(&user).unwrap();
        let claims = service.decode_jwt(&token).unwrap().claims;

        assert_eq!(claims.sub, user.id.to_string());
        assert!(claims.admin);
    }

    #[test]
    fn refresh_tokens_are_not_access_tokens() {
        let service = JwtService::new(&config());
        let refresh = service.create_refresh_jwt(&Uuid::new_v4()).unwrap();

        assert!(matches!(service.decode_jwt(&refresh), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_tokens_are_reported_as_expired() {
        let mut cfg = config();
        cfg.jwt_expiration_minutes = -5;
        let service = JwtService::new(&cfg);

        let token = service.create_jwt(&user()).unwrap();
        assert!(matches!(service.decode_jwt(&token), Err(AuthError::TokenExpired)));
    }
}
