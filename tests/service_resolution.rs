mod common;

use chrono::{Duration, Utc};
use site_directory::domain::entities::NewSite;
use site_directory::domain::repositories::Principal;
use site_directory::error::AppError;
use sqlx::PgPool;

#[sqlx::test]
async fn test_alias_resolution_follows_lifecycle(pool: PgPool) {
    let state = common::create_test_state(pool.clone());

    let id = state
        .site_service
        .create_site(
            NewSite::new("Blog", "https://blog.example.com"),
            vec!["https://www.blog.example.com".to_string()],
        )
        .await
        .unwrap();

    let by_alias = state
        .url_resolver
        .resolve_unscoped(&["https://www.blog.example.com".to_string()])
        .await
        .unwrap();
    assert_eq!(by_alias, vec![id]);

    let by_main = state
        .url_resolver
        .resolve_unscoped(&["https://blog.example.com".to_string()])
        .await
        .unwrap();
    assert_eq!(by_main, vec![id]);

    state.site_service.soft_delete_site(id).await.unwrap();

    let after_delete = state
        .url_resolver
        .resolve_unscoped(&[
            "https://www.blog.example.com".to_string(),
            "https://blog.example.com".to_string(),
        ])
        .await
        .unwrap();
    assert!(after_delete.is_empty());

    let result = state.site_service.get_site(id).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_resolution_is_exact_match(pool: PgPool) {
    common::create_test_site(&pool, "Blog", "https://blog.example.com").await;
    let state = common::create_test_state(pool);

    let ids = state
        .url_resolver
        .resolve_unscoped(&[
            "https://blog.example.com/".to_string(),
            "HTTPS://BLOG.EXAMPLE.COM".to_string(),
        ])
        .await
        .unwrap();

    assert!(ids.is_empty());
}

#[sqlx::test]
async fn test_resolution_deduplicates_across_main_and_alias(pool: PgPool) {
    let a = common::create_test_site(&pool, "A", "https://a.example.com").await;
    let b = common::create_test_site(&pool, "B", "https://b.example.com").await;
    common::create_test_alias(&pool, a, "https://b.example.com").await;
    let state = common::create_test_state(pool);

    let ids = state
        .url_resolver
        .resolve_unscoped(&[
            "https://a.example.com".to_string(),
            "https://b.example.com".to_string(),
        ])
        .await
        .unwrap();

    assert_eq!(ids, vec![a, b]);
}

#[sqlx::test]
async fn test_scoped_resolution(pool: PgPool) {
    let a = common::create_test_site(&pool, "A", "https://a.example.com").await;
    let b = common::create_test_site(&pool, "B", "https://b.example.com").await;
    common::grant_access(&pool, "alice", a).await;
    let state = common::create_test_state(pool);

    let urls = vec![
        "https://a.example.com".to_string(),
        "https://b.example.com".to_string(),
    ];

    let alice = state
        .url_resolver
        .resolve_scoped(&Principal::user("alice"), &urls)
        .await
        .unwrap();
    assert_eq!(alice, vec![a]);

    let root = state
        .url_resolver
        .resolve_scoped(&Principal::superuser("root"), &urls)
        .await
        .unwrap();
    assert_eq!(root, vec![a, b]);
}

#[sqlx::test]
async fn test_known_urls_lists_main_urls_then_aliases(pool: PgPool) {
    let a = common::create_test_site(&pool, "A", "https://a.example.com").await;
    let b = common::create_test_site(&pool, "B", "https://b.example.com").await;
    common::create_test_alias(&pool, a, "https://www.a.example.com").await;
    let state = common::create_test_state(pool);

    let known: Vec<(i64, String)> = state
        .url_resolver
        .list_all_known_urls()
        .await
        .unwrap()
        .into_iter()
        .map(|u| (u.site_id, u.url))
        .collect();

    assert_eq!(
        known,
        vec![
            (a, "https://a.example.com".to_string()),
            (b, "https://b.example.com".to_string()),
            (a, "https://www.a.example.com".to_string()),
        ]
    );
}

#[sqlx::test]
async fn test_purge_through_service(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let id = state
        .site_service
        .create_site(
            NewSite::new("Blog", "https://blog.example.com"),
            vec!["https://www.blog.example.com".to_string()],
        )
        .await
        .unwrap();
    common::grant_access(&pool, "alice", id).await;

    let refused = state.site_service.purge_site(id).await;
    assert!(matches!(refused, Err(AppError::InvariantViolation { .. })));
    assert_eq!(common::count_rows(&pool, "sites", "id", id).await, 1);

    state.site_service.soft_delete_site(id).await.unwrap();
    state.site_service.purge_site(id).await.unwrap();

    assert_eq!(common::count_rows(&pool, "sites", "id", id).await, 0);
    assert_eq!(common::count_rows(&pool, "site_urls", "site_id", id).await, 0);
    assert_eq!(
        common::count_rows(&pool, "access_grants", "site_id", id).await,
        0
    );

    let again = state.site_service.purge_site(id).await;
    assert!(matches!(again, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_search_for_principal(pool: PgPool) {
    let a = common::create_test_site(&pool, "News Daily", "https://news.example.com").await;
    common::create_test_site(&pool, "News Weekly", "https://weekly.example.com").await;
    common::grant_access(&pool, "alice", a).await;
    let state = common::create_test_state(pool);

    let found = state
        .search_service
        .search_for_principal(&Principal::user("alice"), "news", None)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, a);

    let nothing = state
        .search_service
        .search_for_principal(&Principal::user("bob"), "news", None)
        .await
        .unwrap();
    assert!(nothing.is_empty());

    let empty = state.search_service.search(vec![], "news", None).await;
    assert!(matches!(empty, Err(AppError::InvalidArgument { .. })));
}

#[sqlx::test]
async fn test_sites_with_visits_in_window(pool: PgPool) {
    let t0 = Utc::now() - Duration::days(7);
    let t1 = t0 + Duration::days(1);

    let on_start = common::create_test_site(&pool, "A", "https://a.example.com").await;
    let on_end = common::create_test_site(&pool, "B", "https://b.example.com").await;
    let inside = common::create_test_site(&pool, "C", "https://c.example.com").await;
    let deleted = common::create_deleted_site(&pool, "D", "https://d.example.com").await;

    common::record_visit(&pool, on_start, t0).await;
    common::record_visit(&pool, on_end, t1).await;
    common::record_visit(&pool, inside, t0 + Duration::hours(6)).await;
    common::record_visit(&pool, deleted, t0 + Duration::hours(6)).await;
    let state = common::create_test_state(pool);

    let ids = state
        .directory_service
        .site_ids_with_visits(t0, t1)
        .await
        .unwrap();
    assert_eq!(ids, vec![on_end, inside]);

    let inverted = state.directory_service.site_ids_with_visits(t1, t0).await;
    assert!(matches!(inverted, Err(AppError::InvalidArgument { .. })));
}

#[sqlx::test]
async fn test_create_rejects_invalid_input(pool: PgPool) {
    let state = common::create_test_state(pool.clone());

    let blank = state
        .site_service
        .create_site(NewSite::new("  ", "https://a.example.com"), vec![])
        .await;
    assert!(matches!(blank, Err(AppError::Validation { .. })));

    let bad_alias = state
        .site_service
        .create_site(
            NewSite::new("A", "https://a.example.com"),
            vec!["not a url".to_string()],
        )
        .await;
    assert!(matches!(bad_alias, Err(AppError::Validation { .. })));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sites")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
