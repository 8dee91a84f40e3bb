use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// One page of `GET /vacancies` search results.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<SearchHit>,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub found: u64,
}

/// A search hit carries only what the detail fetch needs.
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub id: String,
}

/// Full vacancy payload from `GET /vacancies/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VacancyDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub employer: Option<Employer>,
    #[serde(default)]
    pub area: Option<Named>,
    #[serde(default)]
    pub salary: Option<Salary>,
    #[serde(default)]
    pub experience: Option<Named>,
    #[serde(default)]
    pub schedule: Option<Named>,
    #[serde(default)]
    pub employment: Option<Named>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub key_skills: Vec<Named>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub published_at: Option<String>,
}

impl VacancyDetail {
    /// hh.ru emits offsets without a colon ("+0300"), which strict RFC 3339
    /// parsing rejects, so fall back to `%z`.
    pub fn published_datetime(&self) -> Option<NaiveDateTime> {
        let raw = self.published_at.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
            .ok()
            .map(|dt| dt.naive_utc())
    }

    /// Title, description and key skills joined into the text the
    /// technology extractor runs over.
    pub fn full_text(&self) -> String {
        let description = self.description.as_deref().unwrap_or_default();
        let skills = self
            .key_skills
            .iter()
            .map(|skill| skill.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {} {}", self.name, description, skills)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Employer {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Salary {
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
}

impl Salary {
    /// Midpoint when both bounds are present, otherwise whichever bound
    /// is given. Integer division truncates an odd-sum midpoint's half
    /// ruble; the warehouse stores salaries as whole rubles anyway.
    pub fn average(&self) -> Option<i64> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some((from + to) / 2),
            (Some(from), None) => Some(from),
            (None, Some(to)) => Some(to),
            (None, None) => None,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_detail_payload() {
        let raw = r#"{
            "id": "100500",
            "name": "Python разработчик",
            "employer": { "name": "Яндекс" },
            "area": { "name": "Москва" },
            "salary": { "from": 200000, "to": 300000, "currency": "RUR", "gross": true },
            "experience": { "name": "От 1 года до 3 лет" },
            "schedule": { "name": "Удаленная работа" },
            "employment": { "name": "Полная занятость" },
            "description": "<p>Пишем на Python и SQL</p>",
            "key_skills": [{ "name": "Python" }, { "name": "Docker" }],
            "published_at": "2025-08-14T10:30:00+0300"
        }"#;

        let detail: VacancyDetail = serde_json::from_str(raw).expect("payload parses");
        assert_eq!(detail.id, "100500");
        assert_eq!(detail.salary.and_then(|s| s.average()), Some(250_000));
        assert_eq!(detail.key_skills.len(), 2);
        let text = detail.full_text();
        assert!(text.contains("Python разработчик"));
        assert!(text.contains("Docker"));

        let published = detail.published_datetime().expect("offset without colon parses");
        assert_eq!(published.format("%Y-%m-%d %H:%M").to_string(), "2025-08-14 07:30");
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let detail: VacancyDetail =
            serde_json::from_str(r#"{ "id": "1", "name": "Стажер", "salary": null }"#)
                .expect("minimal payload parses");
        assert!(detail.salary.is_none());
        assert!(detail.published_datetime().is_none());
        assert_eq!(detail.full_text().trim(), "Стажер");
    }

    #[test]
    fn salary_average_uses_single_bound() {
        let only_from = Salary {
            from: Some(150_000),
            to: None,
        };
        assert_eq!(only_from.average(), Some(150_000));
        let only_to = Salary {
            from: None,
            to: Some(90_000),
        };
        assert_eq!(only_to.average(), Some(90_000));
    }

    #[test]
    fn salary_average_truncates_odd_midpoints() {
        let salary = Salary {
            from: Some(100_000),
            to: Some(100_001),
        };
        assert_eq!(salary.average(), Some(100_000));
    }

    #[test]
    fn search_page_defaults_to_empty() {
        let page: SearchPage = serde_json::from_str(r#"{}"#).expect("empty object parses");
        assert!(page.items.is_empty());
        assert_eq!(page.pages, 0);
    }
}
