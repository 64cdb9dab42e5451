use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Masterclass {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub instructor: Instructor,
    #[serde(default)]
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl Masterclass {
    fn matches_query(&self, query_lower: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(query_lower);
        hit(&self.title)
            || hit(&self.short_description)
            || hit(&self.instructor.name)
            || self.tags.iter().any(|t| hit(t))
    }
}

/// The static list of masterclasses shown on the listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub masterclasses: Vec<Masterclass>,
}

impl Catalog {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Unique categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for mc in &self.masterclasses {
            if !out.contains(&mc.category.as_str()) {
                out.push(&mc.category);
            }
        }
        out
    }

    pub fn filter(&self, query: &str, category: Option<&str>) -> Vec<&Masterclass> {
        let query = query.trim().to_lowercase();
        self.masterclasses
            .iter()
            .filter(|mc| query.is_empty() || mc.matches_query(&query))
            .filter(|mc| category.is_none_or(|c| mc.category == c))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Masterclass> {
        self.masterclasses.iter().find(|mc| mc.id == id)
    }

    pub fn featured(&self) -> impl Iterator<Item = &Masterclass> {
        self.masterclasses.iter().filter(|mc| mc.is_featured)
    }
}
