use crate::enrich::VacancyRecord;
use std::collections::BTreeMap;

/// Per-technology market aggregate across one scrape run.
#[derive(Debug, Clone)]
pub struct TechnologySummary {
    pub technology: &'static str,
    pub total_mentions: usize,
    pub vacancy_count: usize,
    pub avg_salary: Option<f64>,
    pub top_role: Option<&'static str>,
    pub top_experience: Option<&'static str>,
    pub top_domain: Option<&'static str>,
}

#[derive(Default)]
struct Accumulator {
    total_mentions: usize,
    vacancy_count: usize,
    salaries: Vec<i64>,
    roles: BTreeMap<&'static str, usize>,
    experience_levels: BTreeMap<&'static str, usize>,
    domains: BTreeMap<&'static str, usize>,
}

/// Aggregate technology statistics over a set of enriched vacancies,
/// sorted by technology name.
pub fn summarize_technologies(records: &[VacancyRecord]) -> Vec<TechnologySummary> {
    let mut stats: BTreeMap<&'static str, Accumulator> = BTreeMap::new();

    for record in records {
        for mention in &record.technologies {
            let acc = stats.entry(mention.technology.name).or_default();
            acc.total_mentions += mention.frequency;
            acc.vacancy_count += 1;
            if let Some(salary) = record.avg_salary {
                acc.salaries.push(salary);
            }
            *acc.roles.entry(record.role).or_default() += 1;
            *acc.experience_levels.entry(record.experience_level).or_default() += 1;
            *acc.domains.entry(record.domain).or_default() += 1;
        }
    }

    stats
        .into_iter()
        .map(|(technology, acc)| {
            let avg_salary = if acc.salaries.is_empty() {
                None
            } else {
                Some(acc.salaries.iter().sum::<i64>() as f64 / acc.salaries.len() as f64)
            };

            TechnologySummary {
                technology,
                total_mentions: acc.total_mentions,
                vacancy_count: acc.vacancy_count,
                avg_salary,
                top_role: mode(&acc.roles),
                top_experience: mode(&acc.experience_levels),
                top_domain: mode(&acc.domains),
            }
        })
        .collect()
}

/// Most frequent key; ties resolve to the lexicographically first one.
fn mode(counts: &BTreeMap<&'static str, usize>) -> Option<&'static str> {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(key, _)| *key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::{TechnologyExtractor, VacancyRecord};
    use crate::hh::VacancyDetail;

    fn record(id: &str, text: &str, salary: Option<(i64, i64)>, experience: &str) -> VacancyRecord {
        let salary_json = match salary {
            Some((from, to)) => format!(r#", "salary": {{ "from": {from}, "to": {to} }}"#),
            None => String::new(),
        };
        let raw = format!(
            r#"{{ "id": "{id}", "name": "{text}",
                 "experience": {{ "name": "{experience}" }}{salary_json} }}"#
        );
        let detail: VacancyDetail = serde_json::from_str(&raw).expect("fixture parses");
        VacancyRecord::from_detail(&detail, &TechnologyExtractor::new())
    }

    #[test]
    fn aggregates_across_vacancies() {
        let records = vec![
            record("1", "Python и Docker backend", Some((100_000, 200_000)), "От 3 до 6 лет"),
            record("2", "Python backend api", None, "От 3 до 6 лет"),
            record("3", "Docker девопс инфраструктура", Some((200_000, 300_000)), "Более 6 лет"),
        ];

        let summaries = summarize_technologies(&records);
        let python = summaries
            .iter()
            .find(|s| s.technology == "Python")
            .expect("python aggregated");
        assert_eq!(python.vacancy_count, 2);
        assert_eq!(python.total_mentions, 2);
        // Only vacancy 1 has a salary.
        assert_eq!(python.avg_salary, Some(150_000.0));
        assert_eq!(python.top_experience, Some("middle"));

        let docker = summaries
            .iter()
            .find(|s| s.technology == "Docker")
            .expect("docker aggregated");
        assert_eq!(docker.vacancy_count, 2);
        assert_eq!(docker.avg_salary, Some(200_000.0));
    }

    #[test]
    fn salary_is_none_when_never_reported() {
        let records = vec![record("1", "Git", None, "Нет опыта")];
        let summaries = summarize_technologies(&records);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].avg_salary, None);
        assert_eq!(summaries[0].top_experience, Some("junior"));
    }

    #[test]
    fn output_is_sorted_by_technology() {
        let records = vec![record("1", "SQL и Docker и Git", None, "Нет опыта")];
        let names: Vec<_> = summarize_technologies(&records)
            .iter()
            .map(|s| s.technology)
            .collect();
        assert_eq!(names, vec!["Docker", "Git", "SQL"]);
    }
}
