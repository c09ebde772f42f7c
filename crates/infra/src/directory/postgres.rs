//! Postgres-backed directory.
//!
//! Every query binds `uuid`/`chrono` values at runtime; the multi-row paths
//! (registration, role deletion, permission deletion) run in one transaction
//! each. Uniqueness violations surface as conflicts even when a concurrent
//! writer wins the race after an application-level pre-check.

use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use warden_auth::RoleName;
use warden_core::{AppError, AppResult, PermissionId, ProfileId, RoleId, UserId};
use warden_registry::{
    AffectedRole, DashboardStats, NewRole, NewUser, PageRequest, Permission, PermissionDetail,
    Profile, RecentSignup, Role, RoleDetail, User, UserAccess, UserPage,
};

use super::Directory;

const SCHEMA: &str = include_str!("schema.sql");

const USER_SELECT: &str = "SELECT u.id, u.email, u.name, u.password_hash, u.kind, u.created_at, \
     p.id AS profile_id, p.first_name, p.last_name, p.status \
     FROM users u JOIN profiles p ON p.user_id = u.id";

pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply the idempotent schema.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = PgPool::connect(database_url).await.map_err(db_err)?;
        let directory = Self::new(pool);
        directory.ensure_schema().await?;
        Ok(directory)
    }

    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn role_detail(&self, role: Role) -> AppResult<RoleDetail> {
        let permissions = sqlx::query(
            "SELECT p.id, p.name, p.created_at FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = $1 ORDER BY p.created_at, p.id",
        )
        .bind(role.id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(permission_from_row)
        .collect::<AppResult<Vec<_>>>()?;

        let user_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM role_users WHERE role_id = $1")
            .bind(role.id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?
            .try_get("n")
            .map_err(db_err)?;

        Ok(RoleDetail {
            role,
            permissions,
            user_count: user_count as u64,
        })
    }
}

#[async_trait]
impl Directory for PostgresDirectory {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query(&format!("{USER_SELECT} WHERE u.email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn load_user_access(&self, id: UserId) -> AppResult<Option<UserAccess>> {
        let Some(user) = self.find_user(id).await? else {
            return Ok(None);
        };

        let roles = sqlx::query(
            "SELECT r.id, r.name, r.created_at FROM roles r \
             JOIN role_users ru ON ru.role_id = r.id \
             WHERE ru.user_id = $1 ORDER BY r.created_at, r.id",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(role_from_row)
        .collect::<AppResult<Vec<_>>>()?;

        let permissions: HashSet<String> = sqlx::query(
            "SELECT DISTINCT p.name FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             JOIN role_users ru ON ru.role_id = rp.role_id \
             WHERE ru.user_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(|row| row.try_get::<String, _>("name").map_err(db_err))
        .collect::<AppResult<HashSet<_>>>()?;

        Ok(Some(UserAccess {
            user,
            roles,
            permissions,
        }))
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let user_id = UserId::new();
        let profile_id = ProfileId::new();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, kind, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user_id.as_uuid())
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(new_user.kind.as_str())
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            conflict_or(
                e,
                format!("User with email '{}' already exists", new_user.email),
            )
        })?;

        sqlx::query(
            "INSERT INTO profiles (id, user_id, first_name, last_name, status) \
             VALUES ($1, $2, $3, $4, '')",
        )
        .bind(profile_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        // Default role: the one whose name equals the requested kind.
        let role_id: Option<uuid::Uuid> = sqlx::query("SELECT id FROM roles WHERE name = $1")
            .bind(new_user.kind.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .map(|row| row.try_get("id").map_err(db_err))
            .transpose()?;

        if let Some(role_id) = role_id {
            sqlx::query("INSERT INTO role_users (role_id, user_id) VALUES ($1, $2)")
                .bind(role_id)
                .bind(user_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(User {
            id: user_id,
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            kind: new_user.kind,
            created_at,
            profile: Profile {
                id: profile_id,
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                status: String::new(),
            },
        })
    }

    async fn update_user_contact(
        &self,
        id: UserId,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        if let Some(new_email) = &email {
            let taken = sqlx::query("SELECT 1 AS one FROM users WHERE email = $1 AND id <> $2")
                .bind(new_email.as_str())
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?
                .is_some();
            if taken {
                return Err(AppError::conflict("Email address is already in use"));
            }
        }

        let updated = sqlx::query(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email) \
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(name)
        .bind(email)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or(e, "Email address is already in use".to_string()))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }

        tx.commit().await.map_err(db_err)?;

        self.find_user(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let user_exists = sqlx::query("SELECT 1 AS one FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .is_some();
        if !user_exists {
            return Err(AppError::not_found("User not found"));
        }

        let role_exists = sqlx::query("SELECT 1 AS one FROM roles WHERE id = $1")
            .bind(role_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .is_some();
        if !role_exists {
            return Err(AppError::not_found("Role not found"));
        }

        sqlx::query(
            "INSERT INTO role_users (role_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(role_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        recompute_kind(&mut tx, user_id).await?;

        tx.commit().await.map_err(db_err)
    }

    async fn delete_user(&self, id: UserId) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }

    async fn list_users(&self, kinds: &[RoleName], page: &PageRequest) -> AppResult<UserPage> {
        let kind_names: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();

        let total: i64 = sqlx::query("SELECT COUNT(*) AS n FROM users WHERE kind = ANY($1)")
            .bind(&kind_names)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?
            .try_get("n")
            .map_err(db_err)?;

        let users = sqlx::query(&format!(
            "{USER_SELECT} WHERE u.kind = ANY($1) \
             ORDER BY u.created_at ASC, u.id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(&kind_names)
        .bind(i64::from(page.page_size))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(user_from_row)
        .collect::<AppResult<Vec<_>>>()?;

        Ok(UserPage {
            page: page.page,
            page_size: page.page_size,
            total: total as u64,
            users,
        })
    }

    async fn find_role(&self, id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query("SELECT id, name, created_at FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(role_from_row)
            .transpose()
    }

    async fn find_role_by_name(&self, name: RoleName) -> AppResult<Option<RoleDetail>> {
        let role = sqlx::query("SELECT id, name, created_at FROM roles WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(role_from_row)
            .transpose()?;

        match role {
            Some(role) => Ok(Some(self.role_detail(role).await?)),
            None => Ok(None),
        }
    }

    async fn load_role_detail(&self, id: RoleId) -> AppResult<Option<RoleDetail>> {
        match self.find_role(id).await? {
            Some(role) => Ok(Some(self.role_detail(role).await?)),
            None => Ok(None),
        }
    }

    async fn create_role(&self, new_role: NewRole) -> AppResult<RoleDetail> {
        let permission_ids: HashSet<PermissionId> =
            new_role.permission_ids.iter().copied().collect();
        let user_ids: HashSet<UserId> = new_role.user_ids.iter().copied().collect();

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let role = Role {
            id: RoleId::new(),
            name: new_role.name,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO roles (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(role.id.as_uuid())
            .bind(role.name.as_str())
            .bind(role.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                conflict_or(e, format!("Role with name '{}' already exists", role.name))
            })?;

        for permission_id in &permission_ids {
            let linked = sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id) \
                 SELECT $1, id FROM permissions WHERE id = $2",
            )
            .bind(role.id.as_uuid())
            .bind(permission_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            if linked.rows_affected() == 0 {
                return Err(AppError::not_found("Permission not found"));
            }
        }

        for user_id in &user_ids {
            let linked = sqlx::query(
                "INSERT INTO role_users (role_id, user_id) \
                 SELECT $1, id FROM users WHERE id = $2",
            )
            .bind(role.id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            if linked.rows_affected() == 0 {
                return Err(AppError::not_found("User not found"));
            }
            recompute_kind(&mut tx, *user_id).await?;
        }

        tx.commit().await.map_err(db_err)?;

        self.role_detail(role).await
    }

    async fn delete_role(&self, id: RoleId) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let role = sqlx::query("SELECT id, name, created_at FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(role_from_row)
            .transpose()?
            .ok_or_else(|| AppError::not_found(format!("Role with ID '{id}' not found")))?;

        let user_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM role_users WHERE role_id = $1")
            .bind(id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?
            .try_get("n")
            .map_err(db_err)?;

        if user_count > 0 {
            let plural = if user_count > 1 { "s" } else { "" };
            return Err(AppError::in_use(format!(
                "Cannot delete role '{}' because it is assigned to {user_count} user{plural}",
                role.name
            )));
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDetail>> {
        let roles = sqlx::query(
            "SELECT id, name, created_at FROM roles ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(role_from_row)
        .collect::<AppResult<Vec<_>>>()?;

        let mut details = Vec::with_capacity(roles.len());
        for role in roles {
            details.push(self.role_detail(role).await?);
        }
        Ok(details)
    }

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<PermissionDetail>> {
        let permission = sqlx::query("SELECT id, name, created_at FROM permissions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(permission_from_row)
            .transpose()?;

        let Some(permission) = permission else {
            return Ok(None);
        };

        let roles = sqlx::query(
            "SELECT r.id, r.name, r.created_at FROM roles r \
             JOIN role_permissions rp ON rp.role_id = r.id \
             WHERE rp.permission_id = $1 ORDER BY r.created_at, r.id",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(role_from_row)
        .collect::<AppResult<Vec<_>>>()?;

        Ok(Some(PermissionDetail { permission, roles }))
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        sqlx::query("SELECT id, name, created_at FROM permissions WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(permission_from_row)
            .transpose()
    }

    async fn create_permission(&self, name: &str) -> AppResult<Permission> {
        let permission = Permission {
            id: PermissionId::new(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO permissions (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(permission.id.as_uuid())
            .bind(&permission.name)
            .bind(permission.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_or(e, format!("Permission with name '{name}' already exists"))
            })?;

        Ok(permission)
    }

    async fn delete_permission(&self, id: PermissionId) -> AppResult<Vec<AffectedRole>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let exists = sqlx::query("SELECT 1 AS one FROM permissions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .is_some();
        if !exists {
            return Err(AppError::not_found(format!(
                "Permission with ID '{id}' not found"
            )));
        }

        let affected = sqlx::query(
            "SELECT r.id, r.name FROM roles r \
             JOIN role_permissions rp ON rp.role_id = r.id \
             WHERE rp.permission_id = $1 ORDER BY r.id",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?
        .iter()
        .map(|row| {
            let name: String = row.try_get("name").map_err(db_err)?;
            Ok(AffectedRole {
                id: RoleId::from_uuid(row.try_get("id").map_err(db_err)?),
                name: parse_role_name(&name)?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

        sqlx::query("DELETE FROM role_permissions WHERE permission_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(affected)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        sqlx::query("SELECT id, name, created_at FROM permissions ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(permission_from_row)
            .collect()
    }

    async fn dashboard_stats(
        &self,
        since: DateTime<Utc>,
        recent_limit: u32,
    ) -> AppResult<DashboardStats> {
        let users_total = count(&self.pool, "SELECT COUNT(*) AS n FROM users").await?;
        let roles_total = count(&self.pool, "SELECT COUNT(*) AS n FROM roles").await?;
        let permissions_total = count(&self.pool, "SELECT COUNT(*) AS n FROM permissions").await?;

        let users_new_this_week: i64 =
            sqlx::query("SELECT COUNT(*) AS n FROM users WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?
                .try_get("n")
                .map_err(db_err)?;

        let role_names = sqlx::query("SELECT name FROM roles ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(|row| {
                let name: String = row.try_get("name").map_err(db_err)?;
                parse_role_name(&name)
            })
            .collect::<AppResult<Vec<_>>>()?;

        let recent_signups = sqlx::query(
            "SELECT id, name, email, created_at FROM users \
             ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(i64::from(recent_limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(|row| {
            Ok(RecentSignup {
                id: UserId::from_uuid(row.try_get("id").map_err(db_err)?),
                name: row.try_get("name").map_err(db_err)?,
                email: row.try_get("email").map_err(db_err)?,
                created_at: row.try_get("created_at").map_err(db_err)?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

        Ok(DashboardStats {
            users_total,
            users_new_this_week: users_new_this_week as u64,
            roles_total,
            role_names,
            permissions_total,
            recent_signups,
        })
    }
}

async fn count(pool: &PgPool, sql: &str) -> AppResult<u64> {
    let n: i64 = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .map_err(db_err)?
        .try_get("n")
        .map_err(db_err)?;
    Ok(n as u64)
}

/// Recompute the `kind` projection from the user's current role set.
async fn recompute_kind(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: UserId,
) -> AppResult<()> {
    let names = sqlx::query(
        "SELECT r.name FROM roles r JOIN role_users ru ON ru.role_id = r.id \
         WHERE ru.user_id = $1",
    )
    .bind(user_id.as_uuid())
    .fetch_all(&mut **tx)
    .await
    .map_err(db_err)?
    .iter()
    .map(|row| {
        let name: String = row.try_get("name").map_err(db_err)?;
        parse_role_name(&name)
    })
    .collect::<AppResult<Vec<_>>>()?;

    let kind = RoleName::dominant(names).unwrap_or(RoleName::User);

    sqlx::query("UPDATE users SET kind = $2 WHERE id = $1")
        .bind(user_id.as_uuid())
        .bind(kind.as_str())
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

    Ok(())
}

fn user_from_row(row: &PgRow) -> AppResult<User> {
    let kind: String = row.try_get("kind").map_err(db_err)?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(db_err)?),
        email: row.try_get("email").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        password_hash: row.try_get("password_hash").map_err(db_err)?,
        kind: parse_role_name(&kind)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        profile: Profile {
            id: ProfileId::from_uuid(row.try_get("profile_id").map_err(db_err)?),
            first_name: row.try_get("first_name").map_err(db_err)?,
            last_name: row.try_get("last_name").map_err(db_err)?,
            status: row.try_get("status").map_err(db_err)?,
        },
    })
}

fn role_from_row(row: &PgRow) -> AppResult<Role> {
    let name: String = row.try_get("name").map_err(db_err)?;
    Ok(Role {
        id: RoleId::from_uuid(row.try_get("id").map_err(db_err)?),
        name: parse_role_name(&name)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn permission_from_row(row: &PgRow) -> AppResult<Permission> {
    Ok(Permission {
        id: PermissionId::from_uuid(row.try_get("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn parse_role_name(name: &str) -> AppResult<RoleName> {
    RoleName::from_str(name).map_err(|_| {
        tracing::error!(role = name, "role row holds a name outside the fixed set");
        AppError::internal("Something went wrong")
    })
}

fn db_err(e: sqlx::Error) -> AppError {
    tracing::error!(error = %e, "database error");
    AppError::internal("Something went wrong")
}

/// Map a uniqueness violation to a descriptive conflict; anything else is an
/// internal error.
fn conflict_or(e: sqlx::Error, message: String) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return AppError::conflict(message);
        }
    }
    db_err(e)
}
