use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of interview categories a session can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Technical,
    Behavioral,
    SystemDesign,
    Leadership,
    Product,
}

/// Returned when a category id is not one of the supported values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Technical,
        Category::Behavioral,
        Category::SystemDesign,
        Category::Leadership,
        Category::Product,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Behavioral => "behavioral",
            Category::SystemDesign => "system-design",
            Category::Leadership => "leadership",
            Category::Product => "product",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Technical => "Technical Interview",
            Category::Behavioral => "Behavioral Interview",
            Category::SystemDesign => "System Design",
            Category::Leadership => "Leadership",
            Category::Product => "Product Management",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Technical => "💻",
            Category::Behavioral => "🤝",
            Category::SystemDesign => "🏗️",
            Category::Leadership => "👑",
            Category::Product => "📱",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| UnknownCategory(wanted.to_string()))
    }
}

/// Display entry for category pickers.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub value: Category,
    pub label: &'static str,
    pub icon: &'static str,
}

pub fn catalog() -> Vec<CategoryInfo> {
    Category::ALL
        .into_iter()
        .map(|c| CategoryInfo {
            value: c,
            label: c.label(),
            icon: c.icon(),
        })
        .collect()
}
