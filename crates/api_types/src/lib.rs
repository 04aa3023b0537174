use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod entry {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        pub description: String,
        pub amount: f64,
        /// RFC 3339 transaction date.
        pub date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryUpdate {
        pub id: String,
        pub description: String,
        pub amount: f64,
        pub date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryDelete {
        pub id: String,
    }

    /// Body of `/getEntries`.
    ///
    /// `filter` elements are kept as raw JSON: their shape is checked by the
    /// engine's filter parser so that every malformed element gets a precise
    /// error. `start` and `limit` are plain JSON numbers and are checked for
    /// integrality and range before use.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntrySearch {
        #[serde(default)]
        pub filter: Vec<serde_json::Value>,
        pub start: f64,
        pub limit: f64,
        #[serde(default)]
        pub sort: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryView {
        pub id: Uuid,
        pub description: String,
        pub amount: f64,
        pub date: DateTime<Utc>,
        pub create_time: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryList {
        pub entries: Vec<EntryView>,
        pub positive_amount: f64,
        pub negative_amount: f64,
        pub count: u64,
    }
}

pub mod report {
    use super::*;

    /// Year as sent by clients: either `2024` or `"2024"`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum YearInput {
        Number(f64),
        Text(String),
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyReportRequest {
        pub year: Option<YearInput>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthView {
        pub month: u32,
        pub income: f64,
        pub expense: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MonthlyReport {
        pub monthly_data: Vec<MonthView>,
    }
}
