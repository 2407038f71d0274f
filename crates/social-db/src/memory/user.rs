//! In-memory implementation of UserRepository

use async_trait::async_trait;

use social_core::entities::User;
use social_core::error::DomainError;
use social_core::traits::{RepoResult, UserRepository};
use social_core::value_objects::Snowflake;

use super::tables::UserRow;
use super::Shared;

#[derive(Clone)]
pub struct MemoryUserRepository {
    tables: Shared,
}

impl MemoryUserRepository {
    pub(super) fn new(tables: Shared) -> Self {
        Self { tables }
    }
}

fn check_unique<'a>(
    mut others: impl Iterator<Item = &'a User>,
    user: &User,
) -> RepoResult<()> {
    others.try_for_each(|other| {
        if other.id == user.id {
            Ok(())
        } else if other.username == user.username {
            Err(DomainError::UsernameAlreadyExists)
        } else if user.email.is_some() && other.email == user.email {
            Err(DomainError::EmailAlreadyExists)
        } else {
            Ok(())
        }
    })
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.tables.read().users.get(&id).map(|row| row.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self.tables.read().user_by(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .user_by(|u| u.email.as_deref() == Some(email)))
    }

    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let tables = self.tables.read();
        let mut users: Vec<User> = ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .map(|row| row.user.clone())
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users.dedup_by_key(|u| u.id);
        Ok(users)
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut tables = self.tables.write();
        if tables.users.contains_key(&user.id) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate user id {}",
                user.id
            )));
        }
        check_unique(tables.users.values().map(|row| &row.user), user)?;
        tables.users.insert(
            user.id,
            UserRow {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut tables = self.tables.write();
        check_unique(tables.users.values().map(|row| &row.user), user)?;
        let row = tables
            .users
            .get_mut(&user.id)
            .ok_or(DomainError::UserNotFound(user.id))?;
        row.user = user.clone();
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self
            .tables
            .read()
            .users
            .get(&id)
            .map(|row| row.password_hash.clone()))
    }

    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()> {
        let mut tables = self.tables.write();
        let row = tables
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        row.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::MemoryDatabase;
    use super::*;

    #[tokio::test]
    async fn test_unique_username_and_email() {
        let repo = MemoryDatabase::new().users();
        let mut alice = User::new(Snowflake::new(1), "alice".to_string());
        alice.email = Some("a@example.com".to_string());
        repo.create(&alice, "hash").await.unwrap();

        let clash = User::new(Snowflake::new(2), "alice".to_string());
        assert!(matches!(
            repo.create(&clash, "hash").await,
            Err(DomainError::UsernameAlreadyExists)
        ));

        let mut email_clash = User::new(Snowflake::new(3), "bob".to_string());
        email_clash.email = Some("a@example.com".to_string());
        assert!(matches!(
            repo.create(&email_clash, "hash").await,
            Err(DomainError::EmailAlreadyExists)
        ));

        // users without email never clash on it
        repo.create(&User::new(Snowflake::new(4), "carol".to_string()), "h")
            .await
            .unwrap();
        repo.create(&User::new(Snowflake::new(5), "dave".to_string()), "h")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_and_password() {
        let repo = MemoryDatabase::new().users();
        let mut user = User::new(Snowflake::new(1), "alice".to_string());
        repo.create(&user, "old").await.unwrap();

        user.is_private = true;
        repo.update(&user).await.unwrap();
        assert!(repo.find_by_username("alice").await.unwrap().unwrap().is_private);

        repo.update_password(user.id, "new").await.unwrap();
        assert_eq!(
            repo.get_password_hash(user.id).await.unwrap().as_deref(),
            Some("new")
        );

        let ghost = User::new(Snowflake::new(9), "ghost".to_string());
        assert!(matches!(
            repo.update(&ghost).await,
            Err(DomainError::UserNotFound(_))
        ));
    }
}
