//! Training record row

use serde::{Deserialize, Serialize};

/// One row of a training transcript extract
///
/// Columns absent from a short row, and blank cells, deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingRecord {
    #[serde(rename = "UserID")]
    pub user_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "Cost")]
    pub cost: Option<String>,
}

impl TrainingRecord {
    /// Column names in file order
    pub const COLUMNS: [&'static str; 7] = [
        "UserID",
        "Title",
        "Date",
        "Description",
        "Category",
        "City",
        "Cost",
    ];

    /// Look up a cell by column name
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "UserID" => &self.user_id,
            "Title" => &self.title,
            "Date" => &self.date,
            "Description" => &self.description,
            "Category" => &self.category,
            "City" => &self.city,
            "Cost" => &self.cost,
            _ => return None,
        };
        value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let record = TrainingRecord {
            user_id: Some("u42".into()),
            cost: Some("$10".into()),
            ..Default::default()
        };

        assert_eq!(record.field("UserID"), Some("u42"));
        assert_eq!(record.field("Cost"), Some("$10"));
        assert_eq!(record.field("Title"), None);
        assert_eq!(record.field("Unknown"), None);
    }

    #[test]
    fn test_columns_cover_every_field() {
        let record = TrainingRecord {
            user_id: Some("a".into()),
            title: Some("a".into()),
            date: Some("a".into()),
            description: Some("a".into()),
            category: Some("a".into()),
            city: Some("a".into()),
            cost: Some("a".into()),
        };
        for column in TrainingRecord::COLUMNS {
            assert_eq!(record.field(column), Some("a"), "column {column}");
        }
    }
}
