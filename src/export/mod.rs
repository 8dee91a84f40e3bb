//! Timestamped CSV exports: one vacancies file, one (vacancy, technology)
//! detail file, and one analytics summary per scrape run. These files are
//! the interchange format the warehouse loader reads back.

mod analytics;

pub use analytics::{summarize_technologies, TechnologySummary};

use crate::enrich::VacancyRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const VACANCIES_PREFIX: &str = "hh_vacancies_enhanced_";
pub const TECHNOLOGIES_PREFIX: &str = "hh_technologies_detailed_";
pub const ANALYTICS_PREFIX: &str = "hh_analytics_";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to prepare export directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub vacancies: PathBuf,
    pub technologies: PathBuf,
    pub analytics: PathBuf,
}

/// `YYYYmmdd_HHMMSS`, lexicographic order equals chronological order so
/// the loader can pick the newest pair by name.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[derive(Debug, Serialize)]
struct VacancyRow<'a> {
    vacancy_id: &'a str,
    title: &'a str,
    company: Option<&'a str>,
    company_size: Option<&'a str>,
    area: Option<&'a str>,
    published_date: Option<String>,
    experience_raw: Option<&'a str>,
    experience_level: &'a str,
    role: &'a str,
    domain: &'a str,
    salary_from: Option<i64>,
    salary_to: Option<i64>,
    avg_salary: Option<i64>,
    tech_count: usize,
    skills_count: usize,
    fgos_competencies_count: usize,
    prof_competencies_count: usize,
}

#[derive(Debug, Serialize)]
struct TechnologyRow<'a> {
    vacancy_id: &'a str,
    technology: &'a str,
    frequency: usize,
    category: &'a str,
    level: &'a str,
    domain: &'a str,
    fgos_competencies: String,
    prof_standards: String,
}

#[derive(Debug, Serialize)]
struct AnalyticsRow<'a> {
    technology: &'a str,
    total_mentions: usize,
    vacancy_count: usize,
    avg_salary: Option<f64>,
    top_role: Option<&'a str>,
    top_experience: Option<&'a str>,
    top_domain: Option<&'a str>,
}

/// Write all three export files for one scrape run.
pub fn export_all(
    records: &[VacancyRecord],
    dir: &Path,
    timestamp: &str,
) -> Result<ExportPaths, ExportError> {
    std::fs::create_dir_all(dir)?;

    let paths = ExportPaths {
        vacancies: dir.join(format!("{VACANCIES_PREFIX}{timestamp}.csv")),
        technologies: dir.join(format!("{TECHNOLOGIES_PREFIX}{timestamp}.csv")),
        analytics: dir.join(format!("{ANALYTICS_PREFIX}{timestamp}.csv")),
    };

    write_vacancies(records, &paths.vacancies)?;
    write_technologies(records, &paths.technologies)?;
    write_analytics(records, &paths.analytics)?;

    Ok(paths)
}

fn write_vacancies(records: &[VacancyRecord], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(VacancyRow {
            vacancy_id: &record.vacancy_id,
            title: &record.title,
            company: record.company.as_deref(),
            company_size: record.company_size,
            area: record.area.as_deref(),
            published_date: record.published_date.map(format_datetime),
            experience_raw: record.experience_raw.as_deref(),
            experience_level: record.experience_level,
            role: record.role,
            domain: record.domain,
            salary_from: record.salary_from,
            salary_to: record.salary_to,
            avg_salary: record.avg_salary,
            tech_count: record.tech_count(),
            skills_count: record.skills_count,
            fgos_competencies_count: record.fgos_competencies.len(),
            prof_competencies_count: record.prof_standards.len(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_technologies(records: &[VacancyRecord], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        for mention in &record.technologies {
            let tech = mention.technology;
            writer.serialize(TechnologyRow {
                vacancy_id: &record.vacancy_id,
                technology: tech.name,
                frequency: mention.frequency,
                category: tech.category,
                level: tech.level,
                domain: tech.domain,
                fgos_competencies: tech.fgos_competencies.join(","),
                prof_standards: tech.prof_standards.join(","),
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_analytics(records: &[VacancyRecord], path: &Path) -> Result<(), ExportError> {
    let summaries = summarize_technologies(records);
    let mut writer = csv::Writer::from_path(path)?;
    for summary in &summaries {
        writer.serialize(AnalyticsRow {
            technology: summary.technology,
            total_mentions: summary.total_mentions,
            vacancy_count: summary.vacancy_count,
            avg_salary: summary.avg_salary,
            top_role: summary.top_role,
            top_experience: summary.top_experience,
            top_domain: summary.top_domain,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn format_datetime(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}
