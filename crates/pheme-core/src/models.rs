use serde::{Deserialize, Serialize};

/// One scrape target: a listing page identified by its URL.
///
/// `name` and `ranking` are carried through from the input file untouched.
/// `address` starts empty and is filled in exactly once, when the entity's
/// page is first visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub ranking: String,
    /// Identity key — two entities are the same iff their URLs are equal.
    pub url: String,
    pub address: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, ranking: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ranking: ranking.into(),
            url: url.into(),
            address: None,
        }
    }
}

/// One decoded review. Immutable once constructed by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub title: String,
    /// Raw display form as published on the page, not parsed into a
    /// calendar type.
    pub date: String,
    pub text: String,
    /// 1–5.
    pub rating: u8,
}

/// A committed entity together with its complete review list.
///
/// This is the element shape of the output artifact, hence the PascalCase
/// field names on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScrapedEntity {
    pub name: String,
    pub ranking: String,
    pub url: String,
    pub address: Option<String>,
    pub reviews: Vec<Review>,
}

impl ScrapedEntity {
    pub fn new(entity: Entity, reviews: Vec<Review>) -> Self {
        Self {
            name: entity.name,
            ranking: entity.ranking,
            url: entity.url,
            address: entity.address,
            reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scraped_entity_serializes_with_artifact_field_names() {
        let mut entity = Entity::new("Trattoria", "#3 of 120", "https://example.com/r/3");
        entity.address = Some("Via Roma 1".into());
        let record = ScrapedEntity::new(
            entity,
            vec![Review {
                title: "Lovely".into(),
                date: "July 2025".into(),
                text: "Great food".into(),
                rating: 5,
            }],
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Name"], "Trattoria");
        assert_eq!(json["Ranking"], "#3 of 120");
        assert_eq!(json["Url"], "https://example.com/r/3");
        assert_eq!(json["Address"], "Via Roma 1");
        assert_eq!(json["Reviews"][0]["title"], "Lovely");
        assert_eq!(json["Reviews"][0]["rating"], 5);
    }

    #[test]
    fn entity_starts_without_address() {
        let entity = Entity::new("A", "#1", "https://example.com/a");
        assert!(entity.address.is_none());
    }
}
