use async_trait::async_trait;

use crate::domain::account::errors::AccountError;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::User;
use crate::domain::account::models::UserId;
use crate::domain::account::models::Username;

/// Port for account domain operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Create a new account with a hashed password.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Hashing` - Password could not be hashed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<User, AccountError>;

    /// Check a username/password pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `DatabaseError` - Database operation failed
    async fn verify_credentials(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<User, AccountError>;

    /// # Errors
    /// * `NotFound` - No such account
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, AccountError>;
}

/// Persistence operations for accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, AccountError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError>;

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AccountError>;
}
