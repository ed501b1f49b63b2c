use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Closed set of expense categories.
///
/// The same list drives validation, the `allowed` field of rejected
/// submissions and the colour table used by charts and reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Bills,
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Bills,
        Category::Other,
    ];

    /// Canonical name, as stored and as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Bills => "Bills",
            Self::Other => "Other",
        }
    }

    /// Hex colour (`#rrggbb`) of the category in charts and report swatches.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Food => "#06b6d4",
            Self::Transport => "#818cf8",
            Self::Entertainment => "#34d399",
            Self::Bills => "#f472b6",
            Self::Other => "#94a3b8",
        }
    }

    /// Names of all categories, in display order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }
}

/// Colour for an arbitrary category label; unknown labels get the `Other`
/// colour.
#[must_use]
pub fn color_for(label: &str) -> &'static str {
    Category::try_from(label)
        .unwrap_or(Category::Other)
        .color()
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| EngineError::KeyNotFound(format!("category {value}")))
    }
}

impl core::str::FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::try_from(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(Category::try_from("food").is_err());
        assert!(Category::try_from("Bogus").is_err());
    }

    #[test]
    fn unknown_labels_use_other_color() {
        assert_eq!(color_for("Food"), "#06b6d4");
        assert_eq!(color_for("Test"), "#94a3b8");
        assert_eq!(color_for(""), Category::Other.color());
    }
}
