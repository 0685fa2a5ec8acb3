use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::Utc;

use crate::domain::account::errors::AccountError;
use crate::domain::account::models::Password;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::User;
use crate::domain::account::models::UserId;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::ports::UserRepository;

/// Domain service for account registration and credential checks.
pub struct AccountService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
}

impl<UR> AccountService<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self {
            repository,
            password_hasher: PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<UR> AccountServicePort for AccountService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, AccountError> {
        let password_hash = self.password_hasher.hash(command.password.as_str())?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        let created = self.repository.create(user).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "Account registered");

        Ok(created)
    }

    async fn verify_credentials(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<User, AccountError> {
        // No stored password can be this long; skip the lookup and the hash
        if password.len() > Password::MAX_BYTES {
            return Err(AccountError::InvalidCredentials);
        }

        let Some(user) = self.repository.find_by_username(username).await? else {
            self.password_hasher.verify_dummy(password);
            return Err(AccountError::InvalidCredentials);
        };

        if self.password_hasher.verify(password, &user.password_hash)? {
            Ok(user)
        } else {
            Err(AccountError::InvalidCredentials)
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::account::models::EmailAddress;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, AccountError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AccountError>;
        }
    }

    fn register_command(username: &str, email: &str) -> RegisterCommand {
        RegisterCommand::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            Password::new("correct horse battery".to_string()).unwrap(),
        )
    }

    fn stored_user(username: &str, password: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "alice"
                    && user.email.as_str() == "alice@example.com"
                    && user.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(Ok);

        let service = AccountService::new(Arc::new(repository));
        let user = service
            .register(register_command("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(user.username.as_str(), "alice");
        assert_ne!(user.password_hash, "correct horse battery");
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_create().times(1).returning(|user| {
            Err(AccountError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let service = AccountService::new(Arc::new(repository));
        let result = service
            .register(register_command("alice", "other@example.com"))
            .await;

        assert!(matches!(
            result,
            Err(AccountError::UsernameAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_credentials_success() {
        let user = stored_user("bob", "bassline-42");
        let expected_id = user.id;

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .withf(|username| username.as_str() == "bob")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = AccountService::new(Arc::new(repository));
        let username = Username::new("bob".to_string()).unwrap();
        let verified = service
            .verify_credentials(&username, "bassline-42")
            .await
            .unwrap();

        assert_eq!(verified.id, expected_id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let user = stored_user("carol", "synthwave-99");

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .returning(move |username| {
                if username.as_str() == "carol" {
                    Ok(Some(user.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = AccountService::new(Arc::new(repository));

        let wrong_password = service
            .verify_credentials(&Username::new("carol".to_string()).unwrap(), "nope-nope")
            .await;
        let unknown_user = service
            .verify_credentials(&Username::new("mallory".to_string()).unwrap(), "nope-nope")
            .await;

        assert!(matches!(wrong_password, Err(AccountError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AccountError::InvalidCredentials)));
        assert_eq!(
            wrong_password.unwrap_err().to_string(),
            unknown_user.unwrap_err().to_string()
        );
    }

    #[tokio::test]
    async fn test_oversized_password_rejected_before_lookup() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);

        let service = AccountService::new(Arc::new(repository));
        let oversized = "x".repeat(Password::MAX_BYTES + 1);
        let result = service
            .verify_credentials(&Username::new("bob".to_string()).unwrap(), &oversized)
            .await;

        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = AccountService::new(Arc::new(repository));
        let result = service.get_user(&UserId::new()).await;

        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_database_error_propagates() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .returning(|_| Err(AccountError::DatabaseError("connection reset".to_string())));

        let service = AccountService::new(Arc::new(repository));
        let result = service
            .verify_credentials(&Username::new("dave".to_string()).unwrap(), "whatever1")
            .await;

        assert!(matches!(result, Err(AccountError::DatabaseError(_))));
    }
}
