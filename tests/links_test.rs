use link_inbox::db::{self, LinkMetadata, ListFilter, Pool};
use link_inbox::model::{Direction, RankedList};

async fn setup_pool() -> Pool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

async fn add(pool: &Pool, url: &str, title: &str) -> String {
    db::upsert_link(
        pool,
        &LinkMetadata {
            url: url.into(),
            domain: Some("example.com".into()),
            title: Some(title.into()),
            summary: Some("(No summary available)".into()),
            description: None,
            read_time_minutes: Some(1),
        },
    )
    .await
    .unwrap()
    .id
}

fn titles(links: &[link_inbox::model::LinkRecord]) -> Vec<&str> {
    links.iter().filter_map(|l| l.title.as_deref()).collect()
}

#[tokio::test]
async fn newest_links_are_listed_first() {
    let pool = setup_pool().await;
    add(&pool, "https://example.com/1", "first").await;
    add(&pool, "https://example.com/2", "second").await;
    add(&pool, "https://example.com/3", "third").await;

    let all = db::list_links(&pool, &ListFilter::default()).await.unwrap();
    assert_eq!(titles(&all), vec!["third", "second", "first"]);
}

#[tokio::test]
async fn read_filter_splits_inbox_and_archive() {
    let pool = setup_pool().await;
    let a = add(&pool, "https://example.com/a", "a").await;
    add(&pool, "https://example.com/b", "b").await;
    db::set_read(&pool, &a, true).await.unwrap();

    let unread = db::list_links(
        &pool,
        &ListFilter {
            is_read: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(titles(&unread), vec!["b"]);

    let read = db::list_links(
        &pool,
        &ListFilter {
            is_read: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(titles(&read), vec!["a"]);
    assert!(read[0].read_at.is_some());
}

#[tokio::test]
async fn query_matches_title_or_url_case_insensitively() {
    let pool = setup_pool().await;
    add(&pool, "https://example.com/tokio-guide", "Async runtimes").await;
    add(&pool, "https://example.com/other", "Learning TOKIO").await;
    add(&pool, "https://example.com/unrelated", "Gardening").await;

    let found = db::list_links(
        &pool,
        &ListFilter {
            query: Some("tokio".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(titles(&found), vec!["Learning TOKIO", "Async runtimes"]);

    let blank = db::list_links(
        &pool,
        &ListFilter {
            query: Some("   ".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(blank.len(), 3);
}

#[tokio::test]
async fn query_wildcards_are_literal() {
    let pool = setup_pool().await;
    add(&pool, "https://example.com/sale", "50% off").await;
    add(&pool, "https://example.com/plain", "500 things").await;
    add(&pool, "https://example.com/snake", "a_b notes").await;
    add(&pool, "https://example.com/other", "axb notes").await;

    let percent = db::list_links(
        &pool,
        &ListFilter {
            query: Some("50%".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(titles(&percent), vec!["50% off"]);

    let underscore = db::list_links(
        &pool,
        &ListFilter {
            query: Some("a_b".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(titles(&underscore), vec!["a_b notes"]);
}

#[tokio::test]
async fn long_reads_follow_manual_order() {
    let pool = setup_pool().await;
    let a = add(&pool, "https://example.com/a", "a").await;
    let b = add(&pool, "https://example.com/b", "b").await;
    let c = add(&pool, "https://example.com/c", "c").await;
    add(&pool, "https://example.com/d", "not a long read").await;
    for id in [&a, &b, &c] {
        db::set_ranked(&pool, RankedList::LongRead, id, true)
            .await
            .unwrap();
    }

    let filter = ListFilter {
        long_reads_only: true,
        ..Default::default()
    };
    let listed = db::list_links(&pool, &filter).await.unwrap();
    assert_eq!(titles(&listed), vec!["a", "b", "c"]);

    db::move_ranked(&pool, RankedList::LongRead, &c, Direction::Up)
        .await
        .unwrap();
    db::move_ranked(&pool, RankedList::LongRead, &a, Direction::Down)
        .await
        .unwrap();
    let listed = db::list_links(&pool, &filter).await.unwrap();
    assert_eq!(titles(&listed), vec!["c", "a", "b"]);

    // last item moving down is a no-op
    db::move_ranked(&pool, RankedList::LongRead, &b, Direction::Down)
        .await
        .unwrap();
    let listed = db::list_links(&pool, &filter).await.unwrap();
    assert_eq!(titles(&listed), vec!["c", "a", "b"]);
}

#[tokio::test]
async fn removed_then_readded_goes_to_the_end() {
    let pool = setup_pool().await;
    let a = add(&pool, "https://example.com/a", "a").await;
    let b = add(&pool, "https://example.com/b", "b").await;
    db::set_ranked(&pool, RankedList::Today, &a, true).await.unwrap();
    db::set_ranked(&pool, RankedList::Today, &b, true).await.unwrap();

    db::set_ranked(&pool, RankedList::Today, &a, false).await.unwrap();
    let back = db::set_ranked(&pool, RankedList::Today, &a, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(back.today_rank, Some(3));
}

#[tokio::test]
async fn unknown_ids_report_none() {
    let pool = setup_pool().await;
    assert!(db::set_read(&pool, "nope", true).await.unwrap().is_none());
    assert!(db::set_ranked(&pool, RankedList::Today, "nope", true)
        .await
        .unwrap()
        .is_none());
    assert!(db::move_ranked(&pool, RankedList::LongRead, "nope", Direction::Up)
        .await
        .unwrap()
        .is_none());
    assert!(!db::delete_link(&pool, "nope").await.unwrap());
}
