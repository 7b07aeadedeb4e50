use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which catalog a record was normalized from. Set once by the adapter and never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
	Remote,
	Local,
}
impl SourceKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Remote => "remote",
			Self::Local => "local",
		}
	}
}
impl fmt::Display for SourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for SourceKind {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"remote" => Ok(Self::Remote),
			"local" => Ok(Self::Local),
			other => Err(format!("unknown source kind '{other}'")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlcoholicStatus {
	Alcoholic,
	NonAlcoholic,
}
impl AlcoholicStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Alcoholic => "Alcoholic",
			Self::NonAlcoholic => "Non alcoholic",
		}
	}

	/// Lenient parse used by the adapters. Values outside the two known labels map to `None`.
	pub fn parse(raw: &str) -> Option<Self> {
		let folded = raw.trim().to_ascii_lowercase().replace('-', " ");

		match folded.as_str() {
			"alcoholic" => Some(Self::Alcoholic),
			"non alcoholic" => Some(Self::NonAlcoholic),
			_ => None,
		}
	}
}
impl fmt::Display for AlcoholicStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for AlcoholicStatus {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		Self::parse(raw).ok_or_else(|| format!("unknown alcoholic status '{raw}'"))
	}
}
impl Serialize for AlcoholicStatus {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}
impl<'de> Deserialize<'de> for AlcoholicStatus {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(serde::de::Error::custom)
	}
}

/// The source-agnostic recipe shape every adapter maps into.
///
/// `id` is only unique within `source_kind`; the two catalogs do not namespace their ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
	pub id: String,
	pub name: String,
	pub image_url: Option<String>,
	pub alcoholic_status: Option<AlcoholicStatus>,
	pub category: Option<String>,
	pub glass_type: Option<String>,
	pub source_kind: SourceKind,
}
impl CanonicalRecord {
	/// Builds a record from raw adapter fields. Returns `None` when the id or name is missing or
	/// blank, so partial objects never leave an adapter.
	pub fn from_parts(
		source_kind: SourceKind,
		id: Option<String>,
		name: Option<String>,
		image_url: Option<String>,
		alcoholic: Option<String>,
		category: Option<String>,
		glass_type: Option<String>,
	) -> Option<Self> {
		let id = non_blank(id)?;
		let name = non_blank(name)?;

		Some(Self {
			id,
			name,
			image_url: non_blank(image_url),
			alcoholic_status: alcoholic.as_deref().and_then(AlcoholicStatus::parse),
			category: non_blank(category),
			glass_type: non_blank(glass_type),
			source_kind,
		})
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty())
}
