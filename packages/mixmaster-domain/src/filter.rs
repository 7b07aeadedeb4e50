use std::{collections::HashSet, fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{AlcoholicStatus, CanonicalRecord, FavoriteSet};

const ALL: &str = "all";

/// Either no constraint (`all`) or one exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
	All,
	Only(T),
}
impl<T> Default for Selection<T> {
	fn default() -> Self {
		Self::All
	}
}
impl<T> Selection<T> {
	fn admits<U>(&self, value: Option<&U>) -> bool
	where
		T: PartialEq<U>,
		U: ?Sized,
	{
		match self {
			Self::All => true,
			Self::Only(expected) => value.map(|value| expected == value).unwrap_or(false),
		}
	}
}
impl<T> FromStr for Selection<T>
where
	T: FromStr,
{
	type Err = T::Err;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		if raw.eq_ignore_ascii_case(ALL) {
			return Ok(Self::All);
		}

		raw.parse().map(Self::Only)
	}
}
impl<T> Serialize for Selection<T>
where
	T: Display,
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Self::All => serializer.serialize_str(ALL),
			Self::Only(value) => serializer.collect_str(value),
		}
	}
}
impl<'de, T> Deserialize<'de> for Selection<T>
where
	T: FromStr,
	T::Err: Display,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(serde::de::Error::custom)
	}
}

/// User-selected narrowing criteria. A filtering pass always receives a whole spec.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
	pub alcoholic_type: Selection<AlcoholicStatus>,
	pub category: Selection<String>,
	pub favorites_only: bool,
}
impl FilterSpec {
	pub fn admits(&self, record: &CanonicalRecord, favorites: &FavoriteSet) -> bool {
		self.alcoholic_type.admits(record.alcoholic_status.as_ref())
			&& self.category.admits(record.category.as_deref())
			&& (!self.favorites_only || favorites.contains(&record.id))
	}
}

/// Keeps the records that satisfy every predicate of `spec`, in their incoming order.
pub fn filter(
	records: &[CanonicalRecord],
	spec: &FilterSpec,
	favorites: &FavoriteSet,
) -> Vec<CanonicalRecord> {
	records.iter().filter(|record| spec.admits(record, favorites)).cloned().collect()
}

/// Distinct categories in first-seen order.
pub fn category_options(records: &[CanonicalRecord]) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for category in records.iter().filter_map(|record| record.category.as_deref()) {
		if seen.insert(category) {
			out.push(category.to_string());
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::SourceKind;

	fn record(id: &str, category: Option<&str>) -> CanonicalRecord {
		CanonicalRecord {
			id: id.to_string(),
			name: id.to_string(),
			image_url: None,
			alcoholic_status: None,
			category: category.map(str::to_string),
			glass_type: None,
			source_kind: SourceKind::Remote,
		}
	}

	#[test]
	fn parses_selection_from_query_values() {
		let all: Selection<AlcoholicStatus> = "ALL".parse().expect("parse failed");
		let only: Selection<AlcoholicStatus> = "Non alcoholic".parse().expect("parse failed");

		assert_eq!(all, Selection::All);
		assert_eq!(only, Selection::Only(AlcoholicStatus::NonAlcoholic));
		assert!("Optional alcohol".parse::<Selection<AlcoholicStatus>>().is_err());
	}

	#[test]
	fn specific_type_never_admits_unset_status() {
		let spec = FilterSpec {
			alcoholic_type: Selection::Only(AlcoholicStatus::Alcoholic),
			..FilterSpec::default()
		};

		assert!(!spec.admits(&record("1", None), &FavoriteSet::default()));
	}

	#[test]
	fn category_options_keep_first_seen_order() {
		let records = vec![
			record("1", Some("Shot")),
			record("2", None),
			record("3", Some("Cocktail")),
			record("4", Some("Shot")),
		];

		assert_eq!(category_options(&records), vec!["Shot".to_string(), "Cocktail".to_string()]);
	}

	#[test]
	fn spec_round_trips_through_json_labels() {
		let spec: FilterSpec = serde_json::from_value(serde_json::json!({
			"alcoholic_type": "Alcoholic",
			"category": "all",
		}))
		.expect("parse failed");

		assert_eq!(spec.alcoholic_type, Selection::Only(AlcoholicStatus::Alcoholic));
		assert_eq!(spec.category, Selection::All);
		assert!(!spec.favorites_only);
		assert_eq!(
			serde_json::to_value(&spec).expect("encode failed"),
			serde_json::json!({
				"alcoholic_type": "Alcoholic",
				"category": "all",
				"favorites_only": false,
			})
		);
	}
}
