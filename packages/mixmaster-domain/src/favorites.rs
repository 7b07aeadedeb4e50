use std::collections::BTreeSet;

/// Record identifiers the user marked as favorite.
///
/// Persisted as a JSON list of strings. Anything that does not decode as such reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
	ids: BTreeSet<String>,
}
impl FavoriteSet {
	pub fn decode(raw: Option<&str>) -> Self {
		let Some(raw) = raw else {
			return Self::default();
		};

		serde_json::from_str::<Vec<String>>(raw)
			.map(|ids| ids.into_iter().collect())
			.unwrap_or_default()
	}

	pub fn encode(&self) -> String {
		let ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();

		serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
	}

	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	/// Flips membership and returns whether `id` is now a favorite.
	pub fn toggle(&mut self, id: &str) -> bool {
		if self.ids.remove(id) {
			return false;
		}

		self.ids.insert(id.to_string());

		true
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.ids.iter().map(String::as_str)
	}
}
impl FromIterator<String> for FavoriteSet {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = String>,
	{
		Self { ids: iter.into_iter().collect() }
	}
}
