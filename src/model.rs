use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One saved link as stored in the `links` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: String,
    pub url: String,
    pub domain: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub read_time_minutes: Option<i64>,
    pub is_read: bool,
    pub is_today: bool,
    pub today_rank: Option<i64>,
    pub is_long_read: bool,
    pub long_read_rank: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// A manually ordered subset of links. Members carry a rank; lower ranks sort first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankedList {
    Today,
    LongRead,
}

impl RankedList {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankedList::Today => "today",
            RankedList::LongRead => "long_read",
        }
    }

    pub(crate) fn flag_column(&self) -> &'static str {
        match self {
            RankedList::Today => "is_today",
            RankedList::LongRead => "is_long_read",
        }
    }

    pub(crate) fn rank_column(&self) -> &'static str {
        match self {
            RankedList::Today => "today_rank",
            RankedList::LongRead => "long_read_rank",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    pub fn parse_direction(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkStats {
    pub unread_count: i64,
    pub read_count: i64,
    pub long_read_count: i64,
}
