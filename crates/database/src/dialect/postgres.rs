//! Relational variant: parameterized SQL over a control-plane pool and
//! single-connection tenant sessions.

use crate::dialect::{sort_identifier, TenantLookupField, TenantStore};
use crate::error::{DatabaseError, Result};
use crate::primary::{PrimaryConfig, PrimaryStore};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use coral_models::{
    EntityId, FeatureRestriction, Page, PrimaryDirectoryEntry, Role, RoleType, RoleUserSummary,
    RoleUsersRow, SearchRequest, TenantRecord, User, UserStatus,
};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Connection, PgConnection, PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

const TENANT_COLUMNS: &str =
    r#""_id", "host", "name", "dbHost", "dbPort", "dbUserName", "dbPassword", "featuresRestrictions""#;

const USER_COLUMNS: &str = r#""_id", "firstName", "lastName", "email", "password", "roleIds",
       "status"::text AS "status", "acl", "enforcePasswordReset", "dateOfBirth", "gender",
       "countryCode", "phoneNumber", "country", "address", "userImage", "createdAt", "updatedAt""#;

const ROLE_COLUMNS: &str =
    r#""_id", "name", "roleType"::text AS "roleType", "acl", "areIsDefault""#;

/// Control-plane store over the primary Postgres database. Unlike tenant
/// sessions this holds a small long-lived pool: the control plane is a fixed,
/// known target.
pub struct PostgresPrimary {
    pool: PgPool,
}

impl PostgresPrimary {
    pub async fn connect(config: &PrimaryConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(config.connect_timeout)
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(format!("primary database: {}", e)))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl PrimaryStore for PostgresPrimary {
    async fn find_tenant(
        &self,
        value: &str,
        field: TenantLookupField,
    ) -> Result<Option<TenantRecord>> {
        let sql = format!(
            r#"SELECT {} FROM "tenant" WHERE "{}" = $1"#,
            TENANT_COLUMNS,
            field.field_name()
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| tenant_from_row(&r)).transpose()
    }

    async fn find_directory_entry(&self, email: &str) -> Result<Option<PrimaryDirectoryEntry>> {
        let row = sqlx::query(
            r#"SELECT "email", "tenantIdentifier" FROM "tenant_user" WHERE "email" = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| {
            Ok(PrimaryDirectoryEntry {
                email: r.try_get("email")?,
                tenant_identifier: r.try_get("tenantIdentifier")?,
            })
        })
        .transpose()
    }
}

/// One dedicated session against one tenant's database. Deliberately not a
/// pool: each tenant database is a distinct physical target and sessions are
/// cheap to open and discard.
pub struct PostgresStore {
    conn: PgConnection,
    tenant: String,
}

impl PostgresStore {
    pub async fn connect(record: &TenantRecord, timeout: Duration) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&record.db_host)
            .port(record.db_port)
            .username(&record.db_user_name)
            .password(&record.db_password)
            .database(record.database_name());

        let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| {
                DatabaseError::ConnectionFailed(format!("tenant {}: connect timed out", record.name))
            })?
            .map_err(|e| DatabaseError::ConnectionFailed(format!("tenant {}: {}", record.name, e)))?;

        Ok(Self {
            conn,
            tenant: record.name.clone(),
        })
    }
}

#[async_trait]
impl TenantStore for PostgresStore {
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let sql = format!(r#"SELECT {} FROM "user" WHERE "email" = $1"#, USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&mut self.conn)
            .await?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    async fn find_role_by_id(&mut self, id: &EntityId) -> Result<Option<Role>> {
        let uuid = parse_uuid(id)?;
        let sql = format!(r#"SELECT {} FROM "role" WHERE "_id" = $1"#, ROLE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(uuid)
            .fetch_optional(&mut self.conn)
            .await?;
        row.map(|r| role_from_row(&r)).transpose()
    }

    async fn find_roles_by_ids(&mut self, ids: &[EntityId]) -> Result<Vec<Role>> {
        let uuids = ids.iter().map(parse_uuid).collect::<Result<Vec<_>>>()?;
        let sql = format!(r#"SELECT {} FROM "role" WHERE "_id" = ANY($1)"#, ROLE_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(&uuids)
            .fetch_all(&mut self.conn)
            .await?;
        rows.iter().map(role_from_row).collect()
    }

    async fn search_roles(&mut self, search: &SearchRequest) -> Result<Page<Role>> {
        let (items_sql, count_sql, params) = role_search_sql(search)?;

        let mut query = sqlx::query(&items_sql);
        for param in &params {
            query = query.bind(param.as_str());
        }
        let rows = query
            .bind(search.limit)
            .bind(search.offset())
            .fetch_all(&mut self.conn)
            .await?;
        let items = rows.iter().map(role_from_row).collect::<Result<Vec<_>>>()?;

        let mut count = sqlx::query(&count_sql);
        for param in &params {
            count = count.bind(param.as_str());
        }
        let total: i64 = count.fetch_one(&mut self.conn).await?.try_get(0)?;

        Ok(Page::new(items, total, search))
    }

    async fn search_users(
        &mut self,
        search: &SearchRequest,
        user_type: Option<&str>,
    ) -> Result<Page<User>> {
        let (items_sql, count_sql, params) = user_search_sql(search, user_type)?;

        let mut query = sqlx::query(&items_sql);
        for param in &params {
            query = query.bind(param.as_str());
        }
        let rows = query
            .bind(search.limit)
            .bind(search.offset())
            .fetch_all(&mut self.conn)
            .await?;
        let items = rows.iter().map(user_from_row).collect::<Result<Vec<_>>>()?;

        let mut count = sqlx::query(&count_sql);
        for param in &params {
            count = count.bind(param.as_str());
        }
        let total: i64 = count.fetch_one(&mut self.conn).await?.try_get(0)?;

        Ok(Page::new(items, total, search))
    }

    async fn users_by_role(&mut self, search: &SearchRequest) -> Result<Page<RoleUsersRow>> {
        let (items_sql, count_sql, params) = users_by_role_sql(search)?;

        let mut query = sqlx::query(&items_sql);
        for param in &params {
            query = query.bind(param.as_str());
        }
        let rows = query
            .bind(search.limit)
            .bind(search.offset())
            .fetch_all(&mut self.conn)
            .await?;
        let items = rows
            .iter()
            .map(role_users_from_row)
            .collect::<Result<Vec<_>>>()?;

        let mut count = sqlx::query(&count_sql);
        for param in &params {
            count = count.bind(param.as_str());
        }
        let total: i64 = count.fetch_one(&mut self.conn).await?.try_get(0)?;

        Ok(Page::new(items, total, search))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let PostgresStore { conn, tenant } = *self;
        conn.close().await?;
        tracing::debug!(tenant = %tenant, "tenant postgres session closed");
        Ok(())
    }
}

fn parse_uuid(id: &EntityId) -> Result<Uuid> {
    Uuid::parse_str(id.as_str())
        .map_err(|_| DatabaseError::InvalidIdentifier(format!("{} must be a UUID", id)))
}

fn tenant_from_row(row: &PgRow) -> Result<TenantRecord> {
    let id: Uuid = row.try_get("_id")?;
    let port: i32 = row.try_get("dbPort")?;
    let features: Option<Json<Vec<FeatureRestriction>>> = row.try_get("featuresRestrictions")?;
    Ok(TenantRecord {
        id: EntityId::new(id.to_string()),
        host: row.try_get("host")?,
        name: row.try_get("name")?,
        db_host: row.try_get("dbHost")?,
        db_port: u16::try_from(port)
            .map_err(|_| DatabaseError::InvalidInput(format!("invalid tenant db port: {}", port)))?,
        db_user_name: row.try_get("dbUserName")?,
        db_password: row.try_get("dbPassword")?,
        features_restrictions: features.map(|f| f.0).unwrap_or_default(),
    })
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let id: Uuid = row.try_get("_id")?;
    let role_ids: Option<Vec<Uuid>> = row.try_get("roleIds")?;
    let status: String = row.try_get("status")?;
    let acl: Option<Json<serde_json::Value>> = row.try_get("acl")?;
    Ok(User {
        id: EntityId::new(id.to_string()),
        first_name: row.try_get("firstName")?,
        last_name: row.try_get("lastName")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        role_ids: role_ids
            .unwrap_or_default()
            .into_iter()
            .map(|u| EntityId::new(u.to_string()))
            .collect(),
        status: UserStatus::parse(&status)
            .ok_or_else(|| DatabaseError::Query(format!("unknown user status: {}", status)))?,
        acl: acl.map(|a| a.0).unwrap_or(serde_json::Value::Null),
        enforce_password_reset: row.try_get("enforcePasswordReset")?,
        date_of_birth: row.try_get::<Option<NaiveDateTime>, _>("dateOfBirth")?,
        gender: row.try_get("gender")?,
        country_code: row.try_get("countryCode")?,
        phone_number: row.try_get("phoneNumber")?,
        country: row.try_get("country")?,
        address: row.try_get("address")?,
        user_image: row.try_get("userImage")?,
        created_at: row.try_get::<Option<NaiveDateTime>, _>("createdAt")?,
        updated_at: row.try_get::<Option<NaiveDateTime>, _>("updatedAt")?,
    })
}

fn role_from_row(row: &PgRow) -> Result<Role> {
    let id: Uuid = row.try_get("_id")?;
    let role_type: String = row.try_get("roleType")?;
    let acl: Option<Json<serde_json::Value>> = row.try_get("acl")?;
    let is_default: i32 = row.try_get("areIsDefault")?;
    Ok(Role {
        id: EntityId::new(id.to_string()),
        name: row.try_get("name")?,
        role_type: RoleType::parse(&role_type)
            .ok_or_else(|| DatabaseError::Query(format!("unknown role type: {}", role_type)))?,
        acl: acl.map(|a| a.0).unwrap_or(serde_json::Value::Null),
        is_default: is_default != 0,
    })
}

fn role_users_from_row(row: &PgRow) -> Result<RoleUsersRow> {
    let role_id: Uuid = row.try_get("roleId")?;
    let is_default: i32 = row.try_get("isDefault")?;
    let users: Option<Json<Vec<RoleUserSummary>>> = row.try_get("users")?;
    Ok(RoleUsersRow {
        role_id: EntityId::new(role_id.to_string()),
        role_type: row.try_get("roleType")?,
        role_name: row.try_get("roleName")?,
        is_default: is_default != 0,
        total_users: row.try_get("totalUsers")?,
        users: users.map(|u| u.0).unwrap_or_default(),
    })
}

fn order_clause(search: &SearchRequest, prefix: &str) -> Result<String> {
    match &search.sort_by {
        Some(raw) => {
            let column = sort_identifier(raw)?;
            Ok(format!(
                " ORDER BY {}\"{}\" {}",
                prefix,
                column,
                search.order().as_sql()
            ))
        }
        None => Ok(String::new()),
    }
}

/// Items SQL, count SQL and the bound string parameters. The limit and
/// offset are bound after the string parameters, in that order.
fn role_search_sql(search: &SearchRequest) -> Result<(String, String, Vec<String>)> {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(keyword) = search.keyword_trimmed() {
        params.push(format!("%{}%", keyword));
        conditions.push(format!(r#""name" ILIKE ${}"#, params.len()));
    }
    if let Some(type_filter) = search.type_filter_trimmed() {
        params.push(format!("%{}%", type_filter));
        conditions.push(format!(
            r#"CAST("roleType" AS TEXT) ILIKE ${}"#,
            params.len()
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let items_sql = format!(
        r#"SELECT {} FROM "role"{}{} LIMIT ${} OFFSET ${}"#,
        ROLE_COLUMNS,
        where_clause,
        order_clause(search, "")?,
        params.len() + 1,
        params.len() + 2,
    );
    let count_sql = format!(r#"SELECT COUNT(*) FROM "role"{}"#, where_clause);

    Ok((items_sql, count_sql, params))
}

fn user_search_sql(
    search: &SearchRequest,
    user_type: Option<&str>,
) -> Result<(String, String, Vec<String>)> {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(keyword) = search.keyword_trimmed() {
        params.push(format!("%{}%", keyword));
        conditions.push(format!(
            r#"(CONCAT("firstName", ' ', "lastName") ILIKE ${} OR "email" ILIKE ${})"#,
            params.len(),
            params.len()
        ));
    }
    if let Some(user_type) = user_type {
        params.push(user_type.to_string());
        conditions.push(format!(
            r#""roleIds" && (SELECT ARRAY(SELECT "_id" FROM "role" WHERE "roleType"::text = ${}))"#,
            params.len()
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let items_sql = format!(
        r#"SELECT {} FROM "user"{}{} LIMIT ${} OFFSET ${}"#,
        USER_COLUMNS,
        where_clause,
        order_clause(search, "")?,
        params.len() + 1,
        params.len() + 2,
    );
    let count_sql = format!(r#"SELECT COUNT(*) FROM "user"{}"#, where_clause);

    Ok((items_sql, count_sql, params))
}

fn users_by_role_sql(search: &SearchRequest) -> Result<(String, String, Vec<String>)> {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(keyword) = search.keyword_trimmed() {
        params.push(format!("%{}%", keyword));
        let n = params.len();
        conditions.push(format!(
            r#"(r."name" ILIKE ${n} OR u."firstName" ILIKE ${n} OR u."lastName" ILIKE ${n} OR r."roleType"::text ILIKE ${n} OR CONCAT(u."firstName", ' ', u."lastName") ILIKE ${n})"#,
        ));
    }
    if let Some(type_filter) = search.type_filter_trimmed() {
        params.push(format!("%{}%", type_filter));
        conditions.push(format!(r#"r."roleType"::text ILIKE ${}"#, params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let grouped = format!(
        r#"SELECT
            r."_id" AS "roleId",
            r."roleType"::text AS "roleType",
            r."name" AS "roleName",
            r."areIsDefault" AS "isDefault",
            COUNT(u."_id") AS "totalUsers",
            CASE WHEN COUNT(u."_id") > 0 THEN json_agg(json_build_object(
                '_id', u."_id",
                'firstName', u."firstName",
                'email', u."email",
                'status', u."status",
                'phoneNumber', CASE
                    WHEN u."countryCode" IS NOT NULL THEN concat(u."countryCode", ' ', u."phoneNumber")
                    ELSE u."phoneNumber"
                END
            )) ELSE NULL END AS "users"
        FROM "role" r
        LEFT JOIN "user" u ON r."_id" = ANY(u."roleIds"){}
        GROUP BY r."_id", r."roleType", r."name", r."areIsDefault""#,
        where_clause
    );

    let items_sql = format!(
        r#"{}{} LIMIT ${} OFFSET ${}"#,
        grouped,
        order_clause(search, "r.")?,
        params.len() + 1,
        params.len() + 2,
    );
    let count_sql = format!(
        r#"SELECT COUNT(*) FROM (SELECT r."_id" FROM "role" r LEFT JOIN "user" u ON r."_id" = ANY(u."roleIds"){} GROUP BY r."_id") AS "grouped""#,
        where_clause
    );

    Ok((items_sql, count_sql, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coral_models::SortOrder;

    fn search(keyword: Option<&str>, type_filter: Option<&str>) -> SearchRequest {
        SearchRequest {
            keyword: keyword.map(str::to_string),
            type_filter: type_filter.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn role_search_without_filters_has_no_where() {
        let (items, count, params) = role_search_sql(&search(None, None)).unwrap();
        assert!(!items.contains("WHERE"));
        assert!(items.ends_with("LIMIT $1 OFFSET $2"));
        assert!(!count.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn role_search_binds_keyword_and_type() {
        let (items, _, params) = role_search_sql(&search(Some("admin"), Some("end"))).unwrap();
        assert!(items.contains(r#""name" ILIKE $1"#));
        assert!(items.contains(r#"CAST("roleType" AS TEXT) ILIKE $2"#));
        assert!(items.ends_with("LIMIT $3 OFFSET $4"));
        assert_eq!(params, vec!["%admin%", "%end%"]);
    }

    #[test]
    fn role_search_orders_by_allowlisted_column() {
        let mut request = search(None, None);
        request.sort_by = Some("createdAt".into());
        request.order_by = Some(SortOrder::Desc);
        let (items, _, _) = role_search_sql(&request).unwrap();
        assert!(items.contains(r#"ORDER BY "createdAt" DESC"#));
    }

    #[test]
    fn role_search_rejects_hostile_sort_column() {
        let mut request = search(None, None);
        request.sort_by = Some("name\"; DROP TABLE \"role".into());
        assert!(role_search_sql(&request).is_err());
    }

    #[test]
    fn user_search_keyword_spans_name_and_email() {
        let (items, _, params) = user_search_sql(&search(Some("ada"), None), None).unwrap();
        assert!(items.contains(r#"CONCAT("firstName", ' ', "lastName") ILIKE $1"#));
        assert!(items.contains(r#""email" ILIKE $1"#));
        assert_eq!(params, vec!["%ada%"]);
    }

    #[test]
    fn user_search_filters_by_role_type_containment() {
        let (items, count, params) = user_search_sql(&search(None, None), Some("enduser")).unwrap();
        assert!(items.contains(r#""roleIds" && (SELECT ARRAY(SELECT "_id" FROM "role" WHERE "roleType"::text = $1))"#));
        assert!(count.contains(r#""roleIds" &&"#));
        assert_eq!(params, vec!["enduser"]);
    }

    #[test]
    fn users_by_role_groups_and_counts_grouped_rows() {
        let (items, count, params) = users_by_role_sql(&search(Some("ops"), None)).unwrap();
        assert!(items.contains(r#"LEFT JOIN "user" u ON r."_id" = ANY(u."roleIds")"#));
        assert!(items.contains(r#"GROUP BY r."_id""#));
        assert!(items.contains(r#"OR CONCAT(u."firstName", ' ', u."lastName") ILIKE $1"#));
        assert!(count.starts_with("SELECT COUNT(*) FROM (SELECT"));
        assert_eq!(params, vec!["%ops%"]);
    }
}
