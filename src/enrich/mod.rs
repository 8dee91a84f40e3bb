//! Turns raw hh.ru vacancy payloads into the enriched records the CSV
//! exporter and warehouse loader consume: technology mentions, role and
//! domain classification, experience mapping, competency rollups.

mod catalog;
mod extractor;

pub use catalog::{Technology, TECHNOLOGIES};
pub use extractor::{map_experience_level, TechnologyExtractor, TechnologyMention};

use crate::hh::VacancyDetail;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// A fully processed vacancy, ready for export.
#[derive(Debug, Clone)]
pub struct VacancyRecord {
    pub vacancy_id: String,
    pub title: String,
    pub company: Option<String>,
    pub company_size: Option<&'static str>,
    pub area: Option<String>,
    pub published_date: Option<NaiveDateTime>,
    pub experience_raw: Option<String>,
    pub experience_level: &'static str,
    pub role: &'static str,
    pub domain: &'static str,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub avg_salary: Option<i64>,
    pub skills_count: usize,
    pub technologies: Vec<TechnologyMention>,
    pub fgos_competencies: BTreeSet<&'static str>,
    pub prof_standards: BTreeSet<&'static str>,
}

impl VacancyRecord {
    pub fn from_detail(detail: &VacancyDetail, extractor: &TechnologyExtractor) -> Self {
        let full_text = detail.full_text();
        let technologies = extractor.extract(&full_text);

        let mut fgos_competencies = BTreeSet::new();
        let mut prof_standards = BTreeSet::new();
        for mention in &technologies {
            fgos_competencies.extend(mention.technology.fgos_competencies.iter().copied());
            prof_standards.extend(mention.technology.prof_standards.iter().copied());
        }

        let company = detail
            .employer
            .as_ref()
            .and_then(|employer| employer.name.clone());
        let experience_raw = detail.experience.as_ref().map(|exp| exp.name.clone());
        let experience_level = experience_raw
            .as_deref()
            .map(map_experience_level)
            .unwrap_or("unknown");

        Self {
            vacancy_id: detail.id.clone(),
            title: detail.name.clone(),
            company_size: company.as_deref().map(company_size),
            company,
            area: detail.area.as_ref().map(|area| area.name.clone()),
            published_date: detail.published_datetime(),
            experience_raw,
            experience_level,
            role: extractor.determine_role(&full_text),
            domain: extractor.determine_domain(&full_text),
            salary_from: detail.salary.and_then(|s| s.from),
            salary_to: detail.salary.and_then(|s| s.to),
            avg_salary: detail.salary.and_then(|s| s.average()),
            skills_count: detail.key_skills.len(),
            technologies,
            fgos_competencies,
            prof_standards,
        }
    }

    pub fn tech_count(&self) -> usize {
        self.technologies.len()
    }
}

/// Crude size bucket: only the handful of well-known large employers are
/// tagged, everything else stays unknown.
fn company_size(name: &str) -> &'static str {
    let lowered = name.to_lowercase();
    const LARGE: [&str; 4] = ["яндекс", "сбер", "mail", "vk"];
    if LARGE.iter().any(|marker| lowered.contains(marker)) {
        "large"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detail() -> VacancyDetail {
        serde_json::from_str(
            r#"{
                "id": "42",
                "name": "Backend разработчик (Python)",
                "employer": { "name": "Сбер" },
                "area": { "name": "Москва" },
                "salary": { "from": 150000, "to": 250000 },
                "experience": { "name": "От 3 до 6 лет" },
                "description": "Python сервисы, Docker, PostgreSQL. Пишем backend api.",
                "key_skills": [{ "name": "Python" }, { "name": "Git" }],
                "published_at": "2025-08-01T09:00:00+0300"
            }"#,
        )
        .expect("fixture parses")
    }

    #[test]
    fn builds_enriched_record() {
        let extractor = TechnologyExtractor::new();
        let record = VacancyRecord::from_detail(&sample_detail(), &extractor);

        assert_eq!(record.vacancy_id, "42");
        assert_eq!(record.company.as_deref(), Some("Сбер"));
        assert_eq!(record.company_size, Some("large"));
        assert_eq!(record.experience_level, "middle");
        assert_eq!(record.role, "backend");
        assert_eq!(record.avg_salary, Some(200_000));
        assert_eq!(record.skills_count, 2);

        let names: Vec<_> = record
            .technologies
            .iter()
            .map(|m| m.technology.name)
            .collect();
        assert!(names.contains(&"Python"));
        assert!(names.contains(&"Docker"));
        assert!(names.contains(&"PostgreSQL"));
        assert!(names.contains(&"Git"));

        // Union over matched technologies, deduplicated.
        assert!(record.fgos_competencies.contains("ПК-1"));
        assert!(record.prof_standards.contains("06.001_C"));
    }

    #[test]
    fn no_matches_still_yields_a_record() {
        let extractor = TechnologyExtractor::new();
        let detail: VacancyDetail =
            serde_json::from_str(r#"{ "id": "7", "name": "Курьер" }"#).expect("fixture parses");
        let record = VacancyRecord::from_detail(&detail, &extractor);

        assert_eq!(record.tech_count(), 0);
        assert!(record.fgos_competencies.is_empty());
        assert_eq!(record.role, "general");
        assert_eq!(record.experience_level, "unknown");
    }
}
