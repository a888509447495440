use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::outfit::ComboKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occasion {
    Casual,
    Formal,
    Sporty,
    Party,
    Work,
}

impl Occasion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Occasion::Casual => "casual",
            Occasion::Formal => "formal",
            Occasion::Sporty => "sporty",
            Occasion::Party => "party",
            Occasion::Work => "work",
        }
    }

    /// Permissive parse: anything unrecognized is treated as no occasion.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "casual" => Some(Occasion::Casual),
            "formal" => Some(Occasion::Formal),
            "sporty" | "sport" | "sports" => Some(Occasion::Sporty),
            "party" => Some(Occasion::Party),
            "work" | "office" => Some(Occasion::Work),
            _ => None,
        }
    }

    /// Keeps recognized occasions in input order, dropping duplicates.
    pub fn parse_list<S: AsRef<str>>(values: &[S]) -> Vec<Self> {
        let mut occasions = Vec::new();
        for occasion in values.iter().filter_map(|value| Self::parse(value.as_ref())) {
            if !occasions.contains(&occasion) {
                occasions.push(occasion);
            }
        }
        occasions
    }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Minimalist,
    Colorful,
    Elegant,
    Modern,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Minimalist => "minimalist",
            Style::Colorful => "colorful",
            Style::Elegant => "elegant",
            Style::Modern => "modern",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minimalist" | "minimal" => Some(Style::Minimalist),
            "colorful" | "colourful" => Some(Style::Colorful),
            "elegant" => Some(Style::Elegant),
            "modern" => Some(Style::Modern),
            _ => None,
        }
    }
}

/// Which top subtype the user leans towards when outfits are not layered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopPreference {
    #[default]
    Any,
    Tshirt,
    Pullover,
}

impl TopPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopPreference::Any => "any",
            TopPreference::Tshirt => "tshirt",
            TopPreference::Pullover => "pullover",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "tshirt" => TopPreference::Tshirt,
            "pullover" => TopPreference::Pullover,
            _ => TopPreference::Any,
        }
    }
}

/// Soft preferences for one recommendation request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub preferred_colors: BTreeSet<String>,
    #[serde(default)]
    pub occasion: Option<Occasion>,
    #[serde(default)]
    pub style: Option<Style>,
    #[serde(default)]
    pub include_dress: bool,
    #[serde(default)]
    pub include_coat: bool,
    #[serde(default)]
    pub top_preference: TopPreference,
    #[serde(default)]
    pub layered_top: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exclude_keys: BTreeSet<ComboKey>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferred_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.preferred_colors = colors
            .into_iter()
            .map(|color| color.as_ref().trim().to_lowercase())
            .filter(|color| !color.is_empty())
            .collect();
        self
    }

    pub fn with_occasion(mut self, occasion: Occasion) -> Self {
        self.occasion = Some(occasion);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_coat(mut self, include_coat: bool) -> Self {
        self.include_coat = include_coat;
        self
    }

    pub fn with_dress(mut self, include_dress: bool) -> Self {
        self.include_dress = include_dress;
        self
    }

    pub fn with_top_preference(mut self, top_preference: TopPreference) -> Self {
        self.top_preference = top_preference;
        self
    }

    pub fn with_layered_top(mut self, layered_top: bool) -> Self {
        self.layered_top = layered_top;
        self
    }

    pub fn with_excluded_keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = ComboKey>,
    {
        self.exclude_keys.extend(keys);
        self
    }

    /// Copy suitable for storing as a profile; exclusions are session-scoped.
    pub fn without_exclusions(&self) -> Self {
        Self { exclude_keys: BTreeSet::new(), ..self.clone() }
    }
}

/// Loosely-typed preference input as sent by a UI, possibly partial.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PreferencesInput {
    #[serde(default)]
    pub colors: Vec<String>,
    pub occasion: Option<String>,
    pub style: Option<String>,
    pub include_dress: Option<bool>,
    pub include_coat: Option<bool>,
    pub top_preference: Option<String>,
    pub layered_top: Option<bool>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl PreferencesInput {
    /// Overlays the values present in this input onto `base`. Colors replace the
    /// base colors only when some were given; exclusions are added.
    pub fn apply_to(self, base: Preferences) -> Preferences {
        let mut merged = base;
        if let Some(occasion) = self.occasion.as_deref() {
            merged.occasion = Occasion::parse(occasion);
        }
        if let Some(style) = self.style.as_deref() {
            merged.style = Style::parse(style);
        }
        if let Some(include_dress) = self.include_dress {
            merged.include_dress = include_dress;
        }
        if let Some(include_coat) = self.include_coat {
            merged.include_coat = include_coat;
        }
        if let Some(top_preference) = self.top_preference.as_deref() {
            merged.top_preference = TopPreference::parse(top_preference);
        }
        if let Some(layered_top) = self.layered_top {
            merged.layered_top = layered_top;
        }
        merged.exclude_keys.extend(self.exclude.iter().filter_map(|key| ComboKey::parse(key)));

        if self.colors.iter().any(|color| !color.trim().is_empty()) {
            merged = merged.with_preferred_colors(self.colors);
        }
        merged
    }
}

impl From<PreferencesInput> for Preferences {
    fn from(input: PreferencesInput) -> Self {
        input.apply_to(Preferences::default())
    }
}
