use tracing::{info, warn};

use crate::auth::dto::{PublicUser, SigninRequest, SigninResponse, SignupRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{NewUser, StoreError, UserStore};
use crate::error::ApiError;

/// Hash the credentials and create the user. There is no existence
/// pre-check: the store's unique constraint decides, and its duplicate-key
/// signal maps to `CredentialsTaken`.
pub async fn signup(store: &dyn UserStore, req: SignupRequest) -> Result<PublicUser, ApiError> {
    let SignupRequest {
        email,
        password,
        first_name,
        last_name,
    } = req;

    // Hashing is CPU-bound; run it off the async workers. The plaintext is
    // moved into the closure and dropped with it.
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))??;

    let user = store
        .create(NewUser {
            email,
            password_hash,
            first_name,
            last_name,
        })
        .await
        .map_err(|e| match e {
            StoreError::DuplicateKey => {
                warn!("signup with already-registered email");
                ApiError::CredentialsTaken
            }
            other => ApiError::Unexpected(other.into()),
        })?;

    info!(user_id = user.id, "user signed up");
    Ok(PublicUser::from(user))
}

/// Look the user up, check the password, and issue an access token. Unknown
/// email and wrong password collapse into the same error so callers cannot
/// probe which emails are registered.
pub async fn signin(
    store: &dyn UserStore,
    keys: &JwtKeys,
    req: SigninRequest,
) -> Result<SigninResponse, ApiError> {
    let SigninRequest { email, password } = req;

    let user = store.find_by_email(&email).await.map_err(|e| match e {
        StoreError::NotFound => {
            warn!("signin with unknown email");
            ApiError::InvalidCredentials
        }
        other => ApiError::Unexpected(other.into()),
    })?;

    let stored_hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))??;

    if !matches {
        warn!(user_id = user.id, "signin with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = keys.sign(user.id, &user.email)?;
    info!(user_id = user.id, "user signed in");
    Ok(SigninResponse {
        email: user.email,
        access_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::memory::MemoryUserStore;
    use crate::auth::repo::{UpdateProfile, User};
    use crate::config::JwtConfig;
    use async_trait::async_trait;

    fn make_keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            ttl_minutes: 15,
        })
    }

    fn signup_req(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: email.into(),
            password: password.into(),
            first_name: "A".into(),
            last_name: "B".into(),
        }
    }

    fn signin_req(email: &str, password: &str) -> SigninRequest {
        SigninRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn signup_stores_a_hash_not_the_plaintext() {
        let store = MemoryUserStore::default();
        let public = signup(&store, signup_req("a@x.com", "123"))
            .await
            .expect("signup");
        assert_eq!(public.email, "a@x.com");

        let stored = store.find_by_email("a@x.com").await.expect("stored");
        assert_ne!(stored.password_hash, "123");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn signup_response_never_carries_the_hash() {
        let store = MemoryUserStore::default();
        let public = signup(&store, signup_req("a@x.com", "123"))
            .await
            .expect("signup");
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[tokio::test]
    async fn duplicate_signup_fails_with_credentials_taken() {
        let store = MemoryUserStore::default();
        signup(&store, signup_req("a@x.com", "123"))
            .await
            .expect("first signup");

        // Same email, everything else different.
        let mut second = signup_req("a@x.com", "other-password");
        second.first_name = "Someone".into();
        second.last_name = "Else".into();
        let err = signup(&store, second).await.unwrap_err();
        assert!(matches!(err, ApiError::CredentialsTaken));
    }

    #[tokio::test]
    async fn signup_then_signin_roundtrip_yields_decodable_token() {
        let store = MemoryUserStore::default();
        let keys = make_keys();
        let public = signup(&store, signup_req("a@x.com", "123"))
            .await
            .expect("signup");

        let response = signin(&store, &keys, signin_req("a@x.com", "123"))
            .await
            .expect("signin");
        assert_eq!(response.email, "a@x.com");
        assert!(!response.access_token.is_empty());

        let claims = keys.verify(&response.access_token).expect("verify");
        assert_eq!(claims.sub, public.id);
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let store = MemoryUserStore::default();
        let keys = make_keys();
        signup(&store, signup_req("a@x.com", "123"))
            .await
            .expect("signup");

        let wrong_password = signin(&store, &keys, signin_req("a@x.com", "wrong"))
            .await
            .unwrap_err();
        let unknown_email = signin(&store, &keys, signin_req("nobody@x.com", "123"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_email, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    struct FailingStore;

    #[async_trait]
    impl UserStore for FailingStore {
        async fn create(&self, _new: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Other(sqlx::Error::PoolClosed))
        }
        async fn find_by_email(&self, _email: &str) -> Result<User, StoreError> {
            Err(StoreError::Other(sqlx::Error::PoolClosed))
        }
        async fn find_by_id(&self, _id: i64) -> Result<User, StoreError> {
            Err(StoreError::Other(sqlx::Error::PoolClosed))
        }
        async fn update_profile(
            &self,
            _id: i64,
            _update: UpdateProfile,
        ) -> Result<User, StoreError> {
            Err(StoreError::Other(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn other_store_failures_surface_as_unexpected() {
        let store = FailingStore;
        let keys = make_keys();

        let err = signup(&store, signup_req("a@x.com", "123")).await.unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));

        let err = signin(&store, &keys, signin_req("a@x.com", "123"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));
    }
}
