// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan metadata from document text
//!
//! Technical passports carry the floor area, ceiling height and address as
//! free text. Each category has an ordered list of patterns; the first one
//! that yields a usable value wins and the rest are skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Metadata recovered from a plan's accompanying text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    /// Total floor area in square meters
    pub area: Option<f64>,
    /// Ceiling height in meters
    pub ceiling_height: Option<f64>,
    pub address: Option<String>,
}

impl PlanMetadata {
    pub fn is_empty(&self) -> bool {
        self.area.is_none() && self.ceiling_height.is_none() && self.address.is_none()
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).unwrap_or_else(|e| panic!("Failed to compile regex pattern {p}: {e}"))
        })
        .collect()
}

static AREA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)площадь[:\s]+([0-9]+[.,][0-9]+|[0-9]+)\s*м[²2]",
        r"(?i)общая\s+площадь[:\s]+([0-9]+[.,][0-9]+|[0-9]+)",
        r"(?i)([0-9]+[.,][0-9]+|[0-9]+)\s*м[²2]\s*общая",
        r"(?i)S\s*общ[ая]*[:\s]+([0-9]+[.,][0-9]+|[0-9]+)",
        r"(?i)total\s+area[:\s]+([0-9]+[.,][0-9]+|[0-9]+)",
        r"(?i)area[:\s]+([0-9]+[.,][0-9]+|[0-9]+)\s*(?:m²|m2|sq\.?\s*m)",
    ])
});

static CEILING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)высота[:\s]+([0-9]+[.,][0-9]+|[0-9]+)\s*м",
        r"(?i)потол[ки]*[:\s]+([0-9]+[.,][0-9]+|[0-9]+)\s*м",
        r"(?i)H[:\s]+([0-9]+[.,][0-9]+|[0-9]+)\s*м",
        r"(?i)ceiling\s+height[:\s]+([0-9]+[.,][0-9]+|[0-9]+)\s*m",
    ])
});

static ADDRESS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)г\.?\s*[А-ЯЁ][а-яё]+[,\s]+(?:ул\.?|улица|пр\.?|проспект)[\sА-ЯЁа-яё0-9.,]+",
        r"(?i)Москва[,\s]+[А-ЯЁа-яё0-9.,]+",
        r"(?i)Санкт-Петербург[,\s]+[А-ЯЁа-яё0-9.,]+",
        r"\d+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Lane)\b",
    ])
});

/// Addresses this short are treated as noise
const MIN_ADDRESS_CHARS: usize = 10;

/// Parse a decimal that may use a comma separator; zero counts as absent
fn parse_decimal(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v != 0.0)
}

fn first_number(patterns: &[Regex], text: &str) -> Option<f64> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_decimal(m.as_str()))
    })
}

fn first_address(text: &str) -> Option<String> {
    ADDRESS_PATTERNS.iter().find_map(|re| {
        re.find(text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| s.chars().count() > MIN_ADDRESS_CHARS)
    })
}

/// Extract area, ceiling height and address from free text
pub fn parse_metadata(text: &str) -> PlanMetadata {
    PlanMetadata {
        area: first_number(&AREA_PATTERNS, text),
        ceiling_height: first_number(&CEILING_PATTERNS, text),
        address: first_address(text),
    }
}
