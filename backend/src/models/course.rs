use serde::{Deserialize, Serialize};

/// Course as shown in the catalog. Owned by the ERP; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Sellable product linked to the course, when the ERP has one.
    pub product_id: Option<i64>,
    #[serde(default)]
    pub sections: Vec<CourseSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSection {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<String>,
}

/// Builds a URL slug the same way the ERP's website module does:
/// lowercase ASCII words joined by dashes, suffixed with the record id.
pub fn slugify(title: &str, id: i64) -> String {
    let mut slug = String::with_capacity(title.len() + 8);
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        id.to_string()
    } else {
        format!("{}-{}", slug, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_joins_words_and_appends_id() {
        assert_eq!(slugify("Data Science  Fundamentals", 3), "data-science-fundamentals-3");
        assert_eq!(slugify("  Python: 101! ", 12), "python-101-12");
        assert_eq!(slugify("¿Qué?", 5), "qu-5");
        assert_eq!(slugify("***", 8), "8");
    }

    #[test]
    fn course_serializes_camel_case() {
        let course = Course {
            id: 1,
            slug: "intro-1".into(),
            title: "Intro".into(),
            description: String::new(),
            price: 49.0,
            product_id: Some(10),
            sections: vec![],
        };
        let json = serde_json::to_value(&course).expect("json");
        assert_eq!(json["productId"], 10);
        assert!(json["sections"].as_array().expect("array").is_empty());
    }
}
