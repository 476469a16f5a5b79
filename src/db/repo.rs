use super::model::{LinkMetadata, ListFilter};
use crate::model::{Direction, LinkRecord, LinkStats, RankedList};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};
use uuid::Uuid;

pub type Pool = SqlitePool;

const LINK_COLUMNS: &str = "id, url, domain, title, summary, description, read_time_minutes, \
     is_read, is_today, today_rank, is_long_read, long_read_rank, created_at, read_at";

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized)
        .await
        .with_context(|| format!("failed to open database {}", normalized))?;
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the parent
/// directory exists. Leaves in-memory URLs untouched. Returns possibly-updated URL.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    // sqlx refuses to create a missing file unless asked to
    let mut rebuilt = format!("sqlite://{}", expanded_path);
    match query_part {
        Some(q) => {
            rebuilt.push('?');
            rebuilt.push_str(q);
        }
        None => rebuilt.push_str("?mode=rwc"),
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Fixed-width UTC timestamp so text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn link_from_row(row: &SqliteRow) -> Result<LinkRecord> {
    Ok(LinkRecord {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        domain: row.try_get("domain")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        description: row.try_get("description")?,
        read_time_minutes: row.try_get("read_time_minutes")?,
        is_read: row.try_get("is_read")?,
        is_today: row.try_get("is_today")?,
        today_rank: row.try_get("today_rank")?,
        is_long_read: row.try_get("is_long_read")?,
        long_read_rank: row.try_get("long_read_rank")?,
        created_at: row.try_get("created_at")?,
        read_at: row.try_get("read_at")?,
    })
}

#[instrument(skip_all)]
pub async fn get_link(pool: &Pool, id: &str) -> Result<Option<LinkRecord>> {
    let sql = format!("SELECT {} FROM links WHERE id = ?", LINK_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(link_from_row).transpose()
}

/// Insert a new link, or refresh the page-derived fields of an existing one
/// with the same URL.
#[instrument(skip_all, fields(url = %meta.url))]
pub async fn upsert_link(pool: &Pool, meta: &LinkMetadata) -> Result<LinkRecord> {
    let mut tx = pool.begin().await?;
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM links WHERE url = ?")
        .bind(&meta.url)
        .fetch_optional(&mut *tx)
        .await?;

    let id = match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE links SET domain = ?, title = ?, summary = ?, description = ?, read_time_minutes = ? WHERE id = ?",
            )
            .bind(&meta.domain)
            .bind(&meta.title)
            .bind(&meta.summary)
            .bind(&meta.description)
            .bind(meta.read_time_minutes)
            .bind(&id)
            .execute(&mut *tx)
            .await?;
            debug!(%id, "refreshed existing link");
            id
        }
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO links (id, url, domain, title, summary, description, read_time_minutes, is_read, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
            )
            .bind(&id)
            .bind(&meta.url)
            .bind(&meta.domain)
            .bind(&meta.title)
            .bind(&meta.summary)
            .bind(&meta.description)
            .bind(meta.read_time_minutes)
            .bind(timestamp(Utc::now()))
            .execute(&mut *tx)
            .await?;
            debug!(%id, "inserted link");
            id
        }
    };
    tx.commit().await?;

    get_link(pool, &id)
        .await?
        .with_context(|| format!("link {} vanished after upsert", id))
}

fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[instrument(skip_all)]
pub async fn list_links(pool: &Pool, filter: &ListFilter) -> Result<Vec<LinkRecord>> {
    let mut clauses: Vec<&str> = Vec::new();
    if filter.long_reads_only {
        clauses.push("is_long_read = 1");
    }
    if filter.is_read.is_some() {
        clauses.push("is_read = ?");
    }
    let pattern = filter
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(like_pattern);
    if pattern.is_some() {
        clauses.push("(title LIKE ? ESCAPE '\\' OR url LIKE ? ESCAPE '\\')");
    }

    let mut sql = format!("SELECT {} FROM links", LINK_COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    if filter.long_reads_only {
        sql.push_str(" ORDER BY long_read_rank IS NULL, long_read_rank ASC");
    } else {
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
    }

    let mut query = sqlx::query(&sql);
    if let Some(is_read) = filter.is_read {
        query = query.bind(is_read);
    }
    if let Some(p) = &pattern {
        query = query.bind(p.clone()).bind(p.clone());
    }
    let rows = query.fetch_all(pool).await?;
    rows.iter().map(link_from_row).collect()
}

/// Mark read (stamping `read_at`) or unread (clearing it). `None` if no such link.
#[instrument(skip_all)]
pub async fn set_read(pool: &Pool, id: &str, is_read: bool) -> Result<Option<LinkRecord>> {
    let read_at = is_read.then(|| timestamp(Utc::now()));
    let res = sqlx::query("UPDATE links SET is_read = ?, read_at = ? WHERE id = ?")
        .bind(is_read)
        .bind(read_at)
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Ok(None);
    }
    get_link(pool, id).await
}

/// Returns whether a row was deleted.
#[instrument(skip_all)]
pub async fn delete_link(pool: &Pool, id: &str) -> Result<bool> {
    let res = sqlx::query("DELETE FROM links WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Add a link to the end of `list` (rank `max + 1`) or take it out (rank cleared).
/// Adding a link that is already a member keeps its rank.
#[instrument(skip_all, fields(list = list.as_str()))]
pub async fn set_ranked(
    pool: &Pool,
    list: RankedList,
    id: &str,
    member: bool,
) -> Result<Option<LinkRecord>> {
    let flag = list.flag_column();
    let rank = list.rank_column();
    let mut tx = pool.begin().await?;

    let current: Option<(bool, Option<i64>)> =
        sqlx::query_as(&format!("SELECT {flag}, {rank} FROM links WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((is_member, current_rank)) = current else {
        return Ok(None);
    };

    if member {
        if !(is_member && current_rank.is_some()) {
            let max_rank: Option<i64> =
                sqlx::query_scalar(&format!("SELECT MAX({rank}) FROM links WHERE {flag} = 1"))
                    .fetch_one(&mut *tx)
                    .await?;
            let next_rank = max_rank.unwrap_or(0) + 1;
            sqlx::query(&format!(
                "UPDATE links SET {flag} = 1, {rank} = ? WHERE id = ?"
            ))
            .bind(next_rank)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            debug!(id, next_rank, "added to ranked list");
        }
    } else {
        sqlx::query(&format!(
            "UPDATE links SET {flag} = 0, {rank} = NULL WHERE id = ?"
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    get_link(pool, id).await
}

/// Swap a member's rank with its nearest neighbour in `direction`. Moving the
/// first item up or the last item down leaves the order unchanged. `None` if
/// the link does not exist or is not a member of `list`.
#[instrument(skip_all, fields(list = list.as_str(), direction = direction.as_str()))]
pub async fn move_ranked(
    pool: &Pool,
    list: RankedList,
    id: &str,
    direction: Direction,
) -> Result<Option<LinkRecord>> {
    let flag = list.flag_column();
    let rank = list.rank_column();
    let mut tx = pool.begin().await?;

    let current: Option<Option<i64>> =
        sqlx::query_scalar(&format!("SELECT {rank} FROM links WHERE id = ? AND {flag} = 1"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(current) = current else {
        return Ok(None);
    };

    if let Some(current_rank) = current {
        let neighbour_sql = match direction {
            Direction::Up => format!(
                "SELECT id, {rank} FROM links WHERE {flag} = 1 AND {rank} < ? ORDER BY {rank} DESC LIMIT 1"
            ),
            Direction::Down => format!(
                "SELECT id, {rank} FROM links WHERE {flag} = 1 AND {rank} > ? ORDER BY {rank} ASC LIMIT 1"
            ),
        };
        let neighbour: Option<(String, i64)> = sqlx::query_as(&neighbour_sql)
            .bind(current_rank)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some((neighbour_id, neighbour_rank)) = neighbour {
            let update = format!("UPDATE links SET {rank} = ? WHERE id = ?");
            sqlx::query(&update)
                .bind(neighbour_rank)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(&update)
                .bind(current_rank)
                .bind(&neighbour_id)
                .execute(&mut *tx)
                .await?;
            debug!(id, %neighbour_id, current_rank, neighbour_rank, "swapped ranks");
        }
    }
    tx.commit().await?;

    get_link(pool, id).await
}

#[instrument(skip_all)]
pub async fn link_stats(pool: &Pool) -> Result<LinkStats> {
    let row = sqlx::query(
        "SELECT \
            COALESCE(SUM(CASE WHEN is_read = 0 THEN 1 ELSE 0 END), 0) AS unread_count, \
            COALESCE(SUM(CASE WHEN is_read = 1 THEN 1 ELSE 0 END), 0) AS read_count, \
            COALESCE(SUM(CASE WHEN is_long_read = 1 THEN 1 ELSE 0 END), 0) AS long_read_count \
         FROM links",
    )
    .fetch_one(pool)
    .await?;
    Ok(LinkStats {
        unread_count: row.get("unread_count"),
        read_count: row.get("read_count"),
        long_read_count: row.get("long_read_count"),
    })
}

/// Cheap reachability probe used by the health report.
pub async fn ping(pool: &Pool) -> Result<()> {
    sqlx::query("SELECT id FROM links LIMIT 1")
        .fetch_optional(pool)
        .await
        .context("links table unreachable")?;
    Ok(())
}
