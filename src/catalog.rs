//! The item catalog and its filtered views.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::progress::{ProgressSummary, StudiedSet};

/// Sentinel accepted wherever a domain name is parsed.
pub const ALL_DOMAINS: &str = "all";

/// Stable item identifier, kept as typed in the source: `7` and `"7"` are
/// different items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(serde_json::Number),
    Text(String),
}

impl Ord for ItemId {
    // numbers before strings; numbers by value, ties broken on their text
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => {
                let by_value = match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    _ => Ordering::Equal,
                };
                by_value.then_with(|| a.to_string().cmp(&b.to_string()))
            }
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// An item as it appears in a source collection, before domain stamping.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub id: ItemId,
    pub topic: String,
    pub description: String,
    #[serde(default)]
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyItem {
    pub id: ItemId,
    pub topic: String,
    pub description: String,
    pub reference: String,
    pub domain: String,
}

impl StudyItem {
    fn from_raw(raw: RawItem, domain: &str) -> Self {
        Self {
            id: raw.id,
            topic: raw.topic,
            description: raw.description,
            reference: raw.reference,
            domain: domain.to_string(),
        }
    }

    /// `query` must already be lower-cased.
    fn matches_query(&self, query: &str) -> bool {
        self.topic.to_lowercase().contains(query) || self.description.to_lowercase().contains(query)
    }
}

/// One labeled source collection.
#[derive(Debug, Clone)]
pub struct Collection {
    pub domain: String,
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DomainFilter {
    #[default]
    All,
    Only(String),
}

impl DomainFilter {
    pub fn parse(s: &str) -> Self {
        if s == ALL_DOMAINS {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_DOMAINS,
            Self::Only(d) => d,
        }
    }

    fn admits(&self, domain: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(d) => d == domain,
        }
    }
}

/// Catalog indices in presentation order.
pub type ActiveView = Vec<usize>;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<StudyItem>,
}

impl Catalog {
    /// Flattens collections in order, stamping each item with its
    /// collection's domain. Ids must be unique across all collections.
    pub fn from_collections(collections: Vec<Collection>) -> Result<Self, LoadError> {
        let mut seen: HashMap<ItemId, String> = HashMap::new();
        let mut items = Vec::new();
        for collection in collections {
            for raw in collection.items {
                if let Some(first) = seen.get(&raw.id) {
                    return Err(LoadError::DuplicateId {
                        id: raw.id.to_string(),
                        first_domain: first.clone(),
                        second_domain: collection.domain.clone(),
                    });
                }
                seen.insert(raw.id.clone(), collection.domain.clone());
                items.push(StudyItem::from_raw(raw, &collection.domain));
            }
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[StudyItem] {
        &self.items
    }

    pub fn get(&self, idx: usize) -> Option<&StudyItem> {
        self.items.get(idx)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Search first, then domain. A blank query does not filter.
    pub fn apply_filters(&self, query: &str, domain: &DomainFilter) -> ActiveView {
        let query = if query.trim().is_empty() {
            None
        } else {
            Some(query.to_lowercase())
        };
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| query.as_deref().map_or(true, |q| item.matches_query(q)))
            .filter(|(_, item)| domain.admits(&item.domain))
            .map(|(i, _)| i)
            .collect()
    }

    /// Distinct domains in first-seen order.
    pub fn domains(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for item in &self.items {
            if !out.iter().any(|d| d == &item.domain) {
                out.push(item.domain.clone());
            }
        }
        out
    }

    /// Filter for a domain name as typed by the user: the "all" sentinel or
    /// a loaded domain, matched case-insensitively. `None` when unknown.
    pub fn resolve_domain(&self, name: &str) -> Option<DomainFilter> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(ALL_DOMAINS) {
            return Some(DomainFilter::All);
        }
        self.domains()
            .into_iter()
            .find(|d| d.to_lowercase() == name.to_lowercase())
            .map(DomainFilter::Only)
    }

    pub fn studied_view(&self, studied: &StudiedSet) -> ActiveView {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| studied.contains(&item.id))
            .map(|(i, _)| i)
            .collect()
    }

    /// Ids in the set that no longer exist in the catalog are not counted.
    pub fn progress(&self, studied: &StudiedSet) -> ProgressSummary {
        let done = self
            .items
            .iter()
            .filter(|item| studied.contains(&item.id))
            .count();
        ProgressSummary::new(self.items.len(), done)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn raw(id: &str, topic: &str, description: &str) -> RawItem {
        RawItem {
            id: ItemId::from(id),
            topic: topic.to_string(),
            description: description.to_string(),
            reference: format!("ref {id}"),
        }
    }

    pub(crate) fn sample_catalog() -> Catalog {
        Catalog::from_collections(vec![
            Collection {
                domain: "Asset Security".into(),
                items: vec![
                    raw("a1", "Data Classification", "Labels assets by sensitivity"),
                    raw("a2", "Data Remanence", "Residual data left after erasure"),
                    raw("a3", "Data Owner", "Accountable for classification"),
                ],
            },
            Collection {
                domain: "Security Operations".into(),
                items: vec![
                    raw("o1", "Incident Response", "Detect, respond, recover"),
                    raw("o2", "Change Management", "Controls changes to production data"),
                ],
            },
        ])
        .unwrap()
    }

    fn ids(catalog: &Catalog, view: &ActiveView) -> Vec<String> {
        view.iter()
            .map(|&i| catalog.get(i).unwrap().id.to_string())
            .collect()
    }

    #[test]
    fn load_stamps_domains_in_order() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.items()[0].domain, "Asset Security");
        assert_eq!(catalog.items()[3].domain, "Security Operations");
        assert_eq!(catalog.items()[3].id, ItemId::from("o1"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::from_collections(vec![
            Collection {
                domain: "A".into(),
                items: vec![raw("x", "t", "d")],
            },
            Collection {
                domain: "B".into(),
                items: vec![raw("x", "t2", "d2")],
            },
        ])
        .unwrap_err();
        match err {
            LoadError::DuplicateId {
                id,
                first_domain,
                second_domain,
            } => {
                assert_eq!(id, "x");
                assert_eq!(first_domain, "A");
                assert_eq!(second_domain, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_query_and_all_domains_keep_everything() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.apply_filters("", &DomainFilter::All),
            vec![0, 1, 2, 3, 4]
        );
        assert_eq!(
            catalog.apply_filters("   ", &DomainFilter::All),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn query_is_case_insensitive_over_topic_and_description() {
        let catalog = sample_catalog();
        let view = catalog.apply_filters("DATA", &DomainFilter::All);
        assert_eq!(ids(&catalog, &view), vec!["a1", "a2", "a3", "o2"]);
        let view = catalog.apply_filters("recover", &DomainFilter::All);
        assert_eq!(ids(&catalog, &view), vec!["o1"]);
    }

    #[test]
    fn query_and_domain_compose() {
        let catalog = sample_catalog();
        let ops = DomainFilter::parse("Security Operations");
        let view = catalog.apply_filters("data", &ops);
        assert_eq!(ids(&catalog, &view), vec!["o2"]);
        let view = catalog.apply_filters("", &ops);
        assert_eq!(ids(&catalog, &view), vec!["o1", "o2"]);
    }

    #[test]
    fn filters_match_brute_force_for_many_inputs() {
        let catalog = sample_catalog();
        let queries = ["", "a", "data", "RESP", "zzz", " ", "owner"];
        let mut domains = vec![DomainFilter::All];
        domains.extend(catalog.domains().into_iter().map(DomainFilter::Only));
        domains.push(DomainFilter::Only("Nope".into()));
        for q in queries {
            for d in &domains {
                let view = catalog.apply_filters(q, d);
                let expected: Vec<usize> = (0..catalog.len())
                    .filter(|&i| {
                        let item = catalog.get(i).unwrap();
                        let lq = q.to_lowercase();
                        let text_ok = q.trim().is_empty()
                            || item.topic.to_lowercase().contains(&lq)
                            || item.description.to_lowercase().contains(&lq);
                        let dom_ok = match d {
                            DomainFilter::All => true,
                            DomainFilter::Only(name) => &item.domain == name,
                        };
                        text_ok && dom_ok
                    })
                    .collect();
                assert_eq!(view, expected, "query {q:?} domain {d:?}");
            }
        }
    }

    #[test]
    fn domains_are_distinct() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.domains(),
            vec!["Asset Security".to_string(), "Security Operations".to_string()]
        );
    }

    #[test]
    fn resolve_domain_accepts_known_names_only() {
        let catalog = sample_catalog();
        assert_eq!(catalog.resolve_domain("all"), Some(DomainFilter::All));
        assert_eq!(
            catalog.resolve_domain(" security operations "),
            Some(DomainFilter::Only("Security Operations".into()))
        );
        assert_eq!(catalog.resolve_domain("Cryptography"), None);
    }

    #[test]
    fn all_sentinel_parses() {
        assert_eq!(DomainFilter::parse("all"), DomainFilter::All);
        assert_eq!(DomainFilter::All.as_str(), "all");
        assert_eq!(
            DomainFilter::parse("Asset Security").as_str(),
            "Asset Security"
        );
    }

    #[test]
    fn numeric_and_string_ids_deserialize() {
        let items: Vec<RawItem> = serde_json::from_str(
            r#"[{"id": 7, "topic": "t", "description": "d"},
                {"id": "x-1", "topic": "t", "description": "d", "reference": "r"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].id, ItemId::from(7u64));
        assert_eq!(items[0].reference, "");
        assert_eq!(items[1].id, ItemId::from("x-1"));
    }

    #[test]
    fn number_and_string_ids_stay_distinct() {
        let a: Vec<RawItem> =
            serde_json::from_str(r#"[{"id": 7, "topic": "t1", "description": "d1"}]"#).unwrap();
        let b: Vec<RawItem> =
            serde_json::from_str(r#"[{"id": "7", "topic": "t2", "description": "d2"}]"#).unwrap();
        let catalog = Catalog::from_collections(vec![
            Collection {
                domain: "A".into(),
                items: a,
            },
            Collection {
                domain: "B".into(),
                items: b,
            },
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_ne!(catalog.items()[0].id, catalog.items()[1].id);

        let mut studied = StudiedSet::default();
        studied.insert(ItemId::from(7u64));
        assert_eq!(catalog.progress(&studied).studied, 1);
        assert_eq!(ids(&catalog, &catalog.studied_view(&studied)), vec!["7"]);
        assert_eq!(catalog.items()[catalog.studied_view(&studied)[0]].domain, "A");
    }

    #[test]
    fn floats_and_large_numbers_are_valid_ids() {
        let items: Vec<RawItem> = serde_json::from_str(
            r#"[{"id": 1.5, "topic": "t", "description": "d"},
                {"id": 18446744073709551615, "topic": "t", "description": "d"},
                {"id": -3, "topic": "t", "description": "d"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].id.to_string(), "1.5");
        assert_eq!(items[1].id, ItemId::from(u64::MAX));
        assert_eq!(items[2].id.to_string(), "-3");
    }

    #[test]
    fn ids_order_numbers_first_then_text() {
        let mut ids = vec![
            ItemId::from("b"),
            ItemId::from(10u64),
            ItemId::from("a"),
            ItemId::from(2u64),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                ItemId::from(2u64),
                ItemId::from(10u64),
                ItemId::from("a"),
                ItemId::from("b"),
            ]
        );
    }

    #[test]
    fn studied_view_and_progress_ignore_unknown_ids() {
        let catalog = sample_catalog();
        let mut studied = StudiedSet::default();
        studied.insert(ItemId::from("o1"));
        studied.insert(ItemId::from("a2"));
        studied.insert(ItemId::from("gone"));
        assert_eq!(ids(&catalog, &catalog.studied_view(&studied)), vec!["a2", "o1"]);
        let summary = catalog.progress(&studied);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.studied, 2);
        assert_eq!(summary.percent, 40);
    }
}
