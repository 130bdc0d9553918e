//! Personal author metadata aggregation.
//!
//! Author facts arrive as flat property records harvested from Wikidata:
//! one row per `(name, value, qualifier, qualifier_value)` tuple. A single
//! statement such as "place of birth: Munich, country: German Empire, country:
//! Bavaria" is spread over several rows that repeat the name and value. This
//! module folds those rows back into the nested structure the author page
//! renders.
//!
//! ## Ranking
//!
//! Property names are ranked by an external table ([`RankLookup`]). Higher
//! ranks are shown first. Names without a rank, or with a rank of zero or
//! below, are curated out and never shown.
//!
//! ## Ordering rules
//!
//! Nothing depends on the order records arrive in, except where noted:
//!
//! | Level | Order |
//! |---|---|
//! | properties | rank descending, then name ascending |
//! | values within a property | value ascending |
//! | qualifiers within a value | qualifier name ascending |
//! | qualifier values | ascending, deduplicated |
//!
//! The two order-sensitive outputs are the image URL (first `image` record)
//! and the author description (first record overall).
//!
//! ## Special properties
//!
//! - `family name`, `given name`, `birth name` duplicate the author's own
//!   name fields and are dropped.
//! - `place of birth` + `date of birth` collapse into a single `born` entry
//!   reading `"<date> (<place>)"`; the death pair collapses into `died`.
//! - `image` is pulled out into [`AuthorMetadata::image`], with alt text taken
//!   from a matching `media legend` qualifier when one exists.

use crate::author::Author;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

const EXCLUDED_NAMES: [&str; 3] = ["family name", "given name", "birth name"];
const ROLE_ALIASES: [&str; 2] = ["subject has role", "object has role"];
const ROLE: &str = "role";
const IGNORED_QUALIFIER: &str = "valid in place";
const IMAGE: &str = "image";
const MEDIA_LEGEND: &str = "media legend";

/// Property pairs folded into one synthetic `"<date> (<place>)"` entry.
const LIFE_EVENTS: [LifeEvent; 2] = [
    LifeEvent {
        synthetic: "born",
        place: "place of birth",
        date: "date of birth",
    },
    LifeEvent {
        synthetic: "died",
        place: "place of death",
        date: "date of death",
    },
];

struct LifeEvent {
    synthetic: &'static str,
    place: &'static str,
    date: &'static str,
}

/// A single fact about an author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub name: String,
    pub value: String,
    /// Empty when the value carries no qualifier.
    #[serde(default)]
    pub qualifier: String,
    #[serde(default)]
    pub qualifier_value: String,
    /// Author description joined onto every record by the data source.
    #[serde(default, alias = "personal_author_description")]
    pub author_description: String,
}

impl PropertyRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_qualifier(
        mut self,
        qualifier: impl Into<String>,
        qualifier_value: impl Into<String>,
    ) -> Self {
        self.qualifier = qualifier.into();
        self.qualifier_value = qualifier_value.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.author_description = description.into();
        self
    }

    fn has_qualifier(&self) -> bool {
        !self.qualifier.is_empty() && !self.qualifier_value.is_empty()
    }
}

/// Source of property name ranks.
///
/// Implementations must return at most one rank per name. `None` means the
/// name is unranked.
pub trait RankLookup {
    fn rank(&self, name: &str) -> Option<i32>;
}

/// One row of the rank table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub name: String,
    pub rank: i32,
}

/// In-memory rank table keyed by exact property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankTable {
    ranks: HashMap<String, i32>,
}

impl RankTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the rank for a name.
    pub fn insert(&mut self, name: impl Into<String>, rank: i32) {
        self.ranks.insert(name.into(), rank);
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl RankLookup for RankTable {
    fn rank(&self, name: &str) -> Option<i32> {
        self.ranks.get(name).copied()
    }
}

impl FromIterator<RankEntry> for RankTable {
    fn from_iter<I: IntoIterator<Item = RankEntry>>(iter: I) -> Self {
        Self {
            ranks: iter.into_iter().map(|e| (e.name, e.rank)).collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, i32)> for RankTable {
    fn from_iter<I: IntoIterator<Item = (S, i32)>>(iter: I) -> Self {
        Self {
            ranks: iter
                .into_iter()
                .map(|(name, rank)| (name.into(), rank))
                .collect(),
        }
    }
}

/// Aggregated metadata for one author, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorMetadata {
    pub author: AuthorSummary,
    pub image: Option<AuthorImage>,
    pub properties: Vec<AggregatedProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub name: String,
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorImage {
    pub url: String,
    pub alt: String,
}

/// All values shown for one property name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedProperty {
    pub rank: i32,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "prop_values")]
    pub values: Vec<ValueGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueGroup {
    pub value: String,
    pub qualifiers: Vec<QualifierGroup>,
}

/// A qualifier name with its sorted, deduplicated values.
///
/// Serialized as a two-element array: `["country", ["CA", "US"]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifierGroup(pub String, pub Vec<String>);

impl QualifierGroup {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn values(&self) -> &[String] {
        &self.1
    }
}

type Qualifiers = BTreeMap<String, BTreeSet<String>>;

/// Intermediate grouping for one property name.
#[derive(Debug, Default)]
struct NameGroup {
    rank: i32,
    values: BTreeMap<String, Qualifiers>,
}

/// A record that survived rank, name and qualifier filtering.
struct RankedRecord<'a> {
    record: &'a PropertyRecord,
    rank: i32,
    qualifier: &'a str,
}

/// Aggregate an author's property records into display metadata.
///
/// Total over any input: unranked or suppressed records simply disappear.
pub fn aggregate(
    author: &Author,
    records: &[PropertyRecord],
    ranks: &impl RankLookup,
) -> AuthorMetadata {
    let full_name = author.full_name();
    let description = records
        .first()
        .map(|r| r.author_description.clone())
        .unwrap_or_default();

    let ranked: Vec<RankedRecord<'_>> = records
        .iter()
        .filter_map(|record| rank_record(record, ranks))
        .collect();

    let (images, rest): (Vec<_>, Vec<_>) = ranked
        .into_iter()
        .partition(|r| r.record.name.eq_ignore_ascii_case(IMAGE));

    let mut groups = group_by_name(&rest);
    for event in &LIFE_EVENTS {
        merge_life_event(&mut groups, event);
    }

    AuthorMetadata {
        author: AuthorSummary {
            slug: author.slug(),
            id: author.id,
            title: author.title.clone(),
            description,
            name: full_name.clone(),
        },
        image: extract_image(&images, &full_name),
        properties: order_properties(groups),
    }
}

/// Apply steps that look at a single record: rank, excluded names, qualifiers.
fn rank_record<'a>(record: &'a PropertyRecord, ranks: &impl RankLookup) -> Option<RankedRecord<'a>> {
    let rank = ranks.rank(&record.name).filter(|rank| *rank > 0)?;
    if EXCLUDED_NAMES
        .iter()
        .any(|excluded| record.name.eq_ignore_ascii_case(excluded))
    {
        return None;
    }
    let qualifier = normalize_qualifier(&record.qualifier)?;
    Some(RankedRecord {
        record,
        rank,
        qualifier,
    })
}

/// Map role aliases onto `role`. Returns `None` for qualifiers that void the record.
fn normalize_qualifier(qualifier: &str) -> Option<&str> {
    if qualifier.eq_ignore_ascii_case(IGNORED_QUALIFIER) {
        None
    } else if ROLE_ALIASES
        .iter()
        .any(|alias| qualifier.eq_ignore_ascii_case(alias))
    {
        Some(ROLE)
    } else {
        Some(qualifier)
    }
}

fn group_by_name(records: &[RankedRecord<'_>]) -> BTreeMap<String, NameGroup> {
    let mut groups: BTreeMap<String, NameGroup> = BTreeMap::new();

    for ranked in records {
        let record = ranked.record;
        let group = groups.entry(record.name.clone()).or_default();
        group.rank = group.rank.max(ranked.rank);

        let qualifiers = group.values.entry(record.value.clone()).or_default();
        if record.has_qualifier() {
            qualifiers
                .entry(ranked.qualifier.to_string())
                .or_default()
                .insert(record.qualifier_value.clone());
        }
    }

    groups
}

/// Find a group by case-insensitive name and take it out of the map.
fn take_group(groups: &mut BTreeMap<String, NameGroup>, name: &str) -> Option<NameGroup> {
    let key = groups
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))?
        .clone();
    groups.remove(&key)
}

/// Replace a place/date pair with one synthetic entry.
///
/// Each (date, place) value pair yields one `"<date> (<place>)"` value whose
/// qualifiers are the union of both sides. When only one side of the pair is
/// present it is left untouched under its own name.
fn merge_life_event(groups: &mut BTreeMap<String, NameGroup>, event: &LifeEvent) {
    let has = |groups: &BTreeMap<String, NameGroup>, name: &str| {
        groups.keys().any(|key| key.eq_ignore_ascii_case(name))
    };
    if !has(groups, event.place) || !has(groups, event.date) {
        return;
    }
    let (Some(place), Some(date)) = (take_group(groups, event.place), take_group(groups, event.date))
    else {
        return;
    };

    let synthetic = groups.entry(event.synthetic.to_string()).or_default();
    synthetic.rank = synthetic.rank.max(place.rank).max(date.rank);

    for (date_value, date_qualifiers) in &date.values {
        for (place_value, place_qualifiers) in &place.values {
            let combined = synthetic
                .values
                .entry(format!("{date_value} ({place_value})"))
                .or_default();
            for (name, values) in date_qualifiers.iter().chain(place_qualifiers) {
                combined
                    .entry(name.clone())
                    .or_default()
                    .extend(values.iter().cloned());
            }
        }
    }
}

fn extract_image(images: &[RankedRecord<'_>], full_name: &str) -> Option<AuthorImage> {
    let url = &images.first()?.record.value;
    let alt = images
        .iter()
        .map(|r| r.record)
        .find(|r| r.qualifier == MEDIA_LEGEND && &r.value == url && !r.qualifier_value.is_empty())
        .map(|r| r.qualifier_value.clone())
        .unwrap_or_else(|| format!("Image of {full_name}"));

    Some(AuthorImage {
        url: url.clone(),
        alt,
    })
}

/// Flatten groups into the output order: rank descending, name ascending on ties.
fn order_properties(groups: BTreeMap<String, NameGroup>) -> Vec<AggregatedProperty> {
    // BTreeMap iteration already yields names ascending; the sort is stable.
    let mut properties: Vec<AggregatedProperty> = groups
        .into_iter()
        .map(|(name, group)| AggregatedProperty {
            rank: group.rank,
            display_name: name,
            values: group
                .values
                .into_iter()
                .map(|(value, qualifiers)| ValueGroup {
                    value,
                    qualifiers: qualifiers
                        .into_iter()
                        .map(|(name, values)| QualifierGroup(name, values.into_iter().collect()))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    properties.sort_by(|a, b| b.rank.cmp(&a.rank));
    properties
}
