#![allow(dead_code)]

use chrono::{DateTime, Utc};
use site_directory::state::AppState;
use sqlx::PgPool;
use std::sync::Arc;

pub async fn create_test_site(pool: &PgPool, name: &str, main_url: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO sites (name, main_url) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(main_url)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_grouped_site(
    pool: &PgPool,
    name: &str,
    main_url: &str,
    group: Option<&str>,
    timezone: &str,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO sites (name, main_url, group_name, timezone) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(main_url)
    .bind(group)
    .bind(timezone)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_deleted_site(pool: &PgPool, name: &str, main_url: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO sites (name, main_url, deleted) VALUES ($1, $2, TRUE) RETURNING id",
    )
    .bind(name)
    .bind(main_url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_alias(pool: &PgPool, site_id: i64, url: &str) {
    sqlx::query("INSERT INTO site_urls (site_id, url) VALUES ($1, $2)")
        .bind(site_id)
        .bind(url)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn grant_access(pool: &PgPool, login: &str, site_id: i64) {
    sqlx::query("INSERT INTO access_grants (login, site_id) VALUES ($1, $2)")
        .bind(login)
        .bind(site_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn record_visit(pool: &PgPool, site_id: i64, at: DateTime<Utc>) {
    sqlx::query("INSERT INTO visit_log (site_id, visit_last_action_time) VALUES ($1, $2)")
        .bind(site_id)
        .bind(at)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn count_rows(pool: &PgPool, table: &str, site_column: &str, site_id: i64) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {site_column} = $1");
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(site_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::new(Arc::new(pool))
}
