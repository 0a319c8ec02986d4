use std::collections::HashMap;

use super::domain::PhenomenonCategory;

/// Exact-match classifier from free-text phenomenon descriptions to
/// surcharge categories.
///
/// Blank input and descriptions absent from the table both classify as
/// [`PhenomenonCategory::None`]; an unknown phenomenon never fails a quote,
/// it simply attracts no surcharge.
#[derive(Debug, Clone, Default)]
pub struct PhenomenonClassifier {
    table: HashMap<String, PhenomenonCategory>,
}

impl PhenomenonClassifier {
    pub fn new(entries: impl IntoIterator<Item = (String, PhenomenonCategory)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }

    /// The classification table for the Estonian weather feed's phenomenon
    /// vocabulary.
    pub fn reference() -> Self {
        let entries = [
            ("Clear", PhenomenonCategory::None),
            ("Few clouds", PhenomenonCategory::None),
            ("Variable clouds", PhenomenonCategory::None),
            ("Cloudy with clear spells", PhenomenonCategory::None),
            ("Overcast", PhenomenonCategory::None),
            ("Mist", PhenomenonCategory::None),
            ("Fog", PhenomenonCategory::None),
            ("Light shower", PhenomenonCategory::Rain),
            ("Moderate shower", PhenomenonCategory::Rain),
            ("Heavy shower", PhenomenonCategory::Rain),
            ("Light rain", PhenomenonCategory::Rain),
            ("Moderate rain", PhenomenonCategory::Rain),
            ("Heavy rain", PhenomenonCategory::Rain),
            ("Light snow shower", PhenomenonCategory::SnowOrSleet),
            ("Moderate snow shower", PhenomenonCategory::SnowOrSleet),
            ("Heavy snow shower", PhenomenonCategory::SnowOrSleet),
            ("Light sleet", PhenomenonCategory::SnowOrSleet),
            ("Moderate sleet", PhenomenonCategory::SnowOrSleet),
            ("Light snowfall", PhenomenonCategory::SnowOrSleet),
            ("Moderate snowfall", PhenomenonCategory::SnowOrSleet),
            ("Heavy snowfall", PhenomenonCategory::SnowOrSleet),
            ("Blowing snow", PhenomenonCategory::SnowOrSleet),
            ("Drifting snow", PhenomenonCategory::SnowOrSleet),
            ("Glaze", PhenomenonCategory::ThunderGlazeOrHail),
            ("Hail", PhenomenonCategory::ThunderGlazeOrHail),
            ("Thunder", PhenomenonCategory::ThunderGlazeOrHail),
            ("Thunderstorm", PhenomenonCategory::ThunderGlazeOrHail),
        ];
        Self::new(
            entries
                .into_iter()
                .map(|(description, category)| (description.to_string(), category)),
        )
    }

    pub fn classify(&self, description: &str) -> PhenomenonCategory {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return PhenomenonCategory::None;
        }
        self.table
            .get(trimmed)
            .copied()
            .unwrap_or(PhenomenonCategory::None)
    }
}
