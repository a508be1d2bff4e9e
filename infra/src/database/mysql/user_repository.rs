//! MySQL implementation of the UserRepository trait.
//!
//! Reads users together with their roles and each role's permissions.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use ca_core::domain::entities::user::{Role, User};
use ca_core::errors::DomainError;
use ca_core::repositories::UserRepository;

use super::store_error;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity, without roles
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let column = |name: &str, e: sqlx::Error| {
            DomainError::internal(format!("Failed to get {}: {}", name, e))
        };

        let id: String = row.try_get("id").map_err(|e| column("id", e))?;

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::internal(format!("Invalid UUID: {}", e)))?,
            username: row.try_get("username").map_err(|e| column("username", e))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|e| column("password_hash", e))?,
            is_active: row.try_get("is_active").map_err(|e| column("is_active", e))?,
            roles: Vec::new(),
        })
    }

    async fn find_one(&self, filter: &str, value: String) -> Result<Option<User>, DomainError> {
        let query = format!(
            "SELECT id, username, password_hash, is_active FROM users WHERE {} = ? LIMIT 1",
            filter
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to find user", e))?;

        match row {
            Some(row) => {
                let mut user = Self::row_to_user(&row)?;
                user.roles = self.load_roles(user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Roles assigned to a user, each with its permissions, ordered by name
    async fn load_roles(&self, user_id: Uuid) -> Result<Vec<Role>, DomainError> {
        let query = r#"
            SELECT r.name AS role_name, rp.permission AS permission
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            LEFT JOIN role_permissions rp ON rp.role_id = r.id
            WHERE ur.user_id = ?
            ORDER BY r.name, rp.permission
        "#;

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("Failed to load user roles", e))?;

        let mut roles: Vec<Role> = Vec::new();
        for row in rows {
            let name: String = row
                .try_get("role_name")
                .map_err(|e| DomainError::internal(format!("Failed to get role_name: {}", e)))?;
            let permission: Option<String> = row
                .try_get("permission")
                .map_err(|e| DomainError::internal(format!("Failed to get permission: {}", e)))?;

            if roles.last().map(|role| role.name != name).unwrap_or(true) {
                roles.push(Role::new(name));
            }
            if let (Some(permission), Some(role)) = (permission, roles.last_mut()) {
                role.permissions.push(permission);
            }
        }

        Ok(roles)
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.find_one("id", id.to_string()).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.find_one("username", username.to_string()).await
    }
}
