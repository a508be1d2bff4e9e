//! Maps a user's identity and roles into the access-token claim set

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::AccessClaims;
use crate::domain::entities::user::User;

/// Builder for the canonical access-token claims
pub struct ClaimsBuilder;

impl ClaimsBuilder {
    /// Build the claims for one access token
    ///
    /// `token_id` must be fresh for every token. Permissions are the sorted
    /// union of the user's role permissions and are left out when empty.
    pub fn build(
        user: &User,
        token_id: Uuid,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> AccessClaims {
        let user_id = user.id.to_string();
        let permissions = user.permissions();

        AccessClaims {
            sub: user_id.clone(),
            user_id,
            username: user.username.clone(),
            token_id: token_id.to_string(),
            roles: user.role_names(),
            permissions: if permissions.is_empty() {
                None
            } else {
                Some(permissions.join(","))
            },
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::user::Role;

    #[test]
    fn test_build_claims() {
        let user = User::new("carol", "hash").with_roles(vec![
            Role::new("admin").with_permissions(["users.write", "users.read"]),
            Role::new("support").with_permissions(["users.read", "tickets.read"]),
        ]);
        let token_id = Uuid::new_v4();
        let now = Utc::now();

        let claims =
            ClaimsBuilder::build(&user, token_id, "CoreAccess", "api", now, Duration::seconds(3600));

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.user_id, user.id.to_string());
        assert_eq!(claims.username, "carol");
        assert_eq!(claims.token_id, token_id.to_string());
        assert_eq!(claims.roles, vec!["admin", "support"]);
        assert_eq!(
            claims.permissions.as_deref(),
            Some("tickets.read,users.read,users.write")
        );
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.aud, "api");
    }

    #[test]
    fn test_user_without_roles() {
        let user = User::new("dave", "hash");
        let claims = ClaimsBuilder::build(
            &user,
            Uuid::new_v4(),
            "CoreAccess",
            "CoreAccess",
            Utc::now(),
            Duration::seconds(60),
        );

        assert!(claims.roles.is_empty());
        assert!(claims.permissions.is_none());
    }
}
