//! Postal address components and single-line formatting.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Split address as cached per client (`{city, state, zipCode, streetAddress}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressComponents {
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub street_address: String,
}

impl AddressComponents {
    /// Storage key under which a client's components are cached.
    pub fn cache_key(client_id: Uuid) -> String {
        format!("client_{}_address_components", client_id)
    }

    /// Parses `street, city, ST 12345` (or `street, city, ST, 12345`).
    ///
    /// The street part may itself contain commas (`Unit 4, 12 Elm St`).
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.len() < 3 {
            return None;
        }

        let last = parts[parts.len() - 1];
        let (state, zip_code, city_index) = if let Some((state, zip)) = split_state_zip(last) {
            (state, zip, parts.len() - 2)
        } else if parts.len() >= 4 && is_state_code(parts[parts.len() - 2]) && is_zip(last) {
            (parts[parts.len() - 2], last, parts.len() - 3)
        } else {
            return None;
        };

        let street_address = parts[..city_index].join(", ");
        if street_address.is_empty() {
            return None;
        }

        Some(Self {
            city: parts[city_index].to_string(),
            state: state.to_ascii_uppercase(),
            zip_code: zip_code.to_string(),
            street_address,
        })
    }

    pub fn formatted(&self) -> String {
        format_address(&self.street_address, &self.city, &self.state, &self.zip_code)
    }
}

/// Joins address parts as `street, city, ST zip`, skipping blanks.
pub fn format_address(street: &str, city: &str, state: &str, zip: &str) -> String {
    let region = [state.trim(), zip.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    [street.trim(), city.trim(), region.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn split_state_zip(segment: &str) -> Option<(&str, &str)> {
    let mut tokens = segment.split_whitespace();
    let state = tokens.next()?;
    let zip = tokens.next().unwrap_or("");
    if tokens.next().is_some() || !is_state_code(state) {
        return None;
    }
    if !zip.is_empty() && !is_zip(zip) {
        return None;
    }
    Some((state, zip))
}

fn is_state_code(value: &str) -> bool {
    value.len() == 2 && value.chars().all(|ch| ch.is_ascii_alphabetic())
}

fn is_zip(value: &str) -> bool {
    let (base, plus_four) = match value.split_once('-') {
        Some((base, rest)) => (base, Some(rest)),
        None => (value, None),
    };
    let digits = |part: &str, len: usize| part.len() == len && part.chars().all(|ch| ch.is_ascii_digit());
    digits(base, 5) && plus_four.map_or(true, |rest| digits(rest, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_single_line_address() {
        let parsed = AddressComponents::parse("123 Main St, Philadelphia, PA 19103").unwrap();
        assert_eq!(parsed.street_address, "123 Main St");
        assert_eq!(parsed.city, "Philadelphia");
        assert_eq!(parsed.state, "PA");
        assert_eq!(parsed.zip_code, "19103");
        assert_eq!(parsed.formatted(), "123 Main St, Philadelphia, PA 19103");
    }

    #[test]
    fn parses_separate_zip_segment_and_multi_part_street() {
        let parsed = AddressComponents::parse("Unit 4, 12 Elm St, Media, pa, 19063-1234").unwrap();
        assert_eq!(parsed.street_address, "Unit 4, 12 Elm St");
        assert_eq!(parsed.city, "Media");
        assert_eq!(parsed.state, "PA");
        assert_eq!(parsed.zip_code, "19063-1234");
    }

    #[test]
    fn rejects_unstructured_text() {
        assert!(AddressComponents::parse("somewhere downtown").is_none());
        assert!(AddressComponents::parse("1 Road, Town, Pennsylvania 19000").is_none());
    }

    #[test]
    fn format_skips_missing_parts() {
        assert_eq!(format_address("1 A St", "", "PA", ""), "1 A St, PA");
        assert_eq!(format_address("", "", "", ""), "");
    }

    #[test]
    fn cache_key_embeds_client_id() {
        let id = Uuid::nil();
        assert_eq!(
            AddressComponents::cache_key(id),
            "client_00000000-0000-0000-0000-000000000000_address_components"
        );
    }
}
