use crate::export::{TECHNOLOGIES_PREFIX, VACANCIES_PREFIX};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Salaries above this are treated as data-entry noise and clamped.
const SALARY_CAP: i64 = 10_000_000;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid csv in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("no scraped export pair found in {0} (expected {VACANCIES_PREFIX}*.csv and {TECHNOLOGIES_PREFIX}*.csv)")]
    MissingExports(PathBuf),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Newest vacancy/technology export pair by file name; timestamps sort
/// lexicographically.
pub fn latest_export_pair(dir: &Path) -> Result<(PathBuf, PathBuf), LoadError> {
    let vacancies = latest_with_prefix(dir, VACANCIES_PREFIX)?;
    let technologies = latest_with_prefix(dir, TECHNOLOGIES_PREFIX)?;
    match (vacancies, technologies) {
        (Some(v), Some(t)) => Ok((v, t)),
        _ => Err(LoadError::MissingExports(dir.to_path_buf())),
    }
}

fn latest_with_prefix(dir: &Path, prefix: &str) -> Result<Option<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut best: Option<String> = None;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(prefix) && name.ends_with(".csv") {
            if best.as_deref().map_or(true, |current| name.as_str() > current) {
                best = Some(name);
            }
        }
    }
    Ok(best.map(|name| dir.join(name)))
}

// Cleaning helpers mirror what the warehouse columns expect: blank
// strings become NULL, strings are truncated to column width, numbers
// arrive as either integers or float-formatted text.

pub fn clean_text(raw: Option<&str>, max_chars: Option<usize>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let result = match max_chars {
        Some(limit) => trimmed.chars().take(limit).collect(),
        None => trimmed.to_string(),
    };
    Some(result)
}

pub fn clean_int(raw: Option<&str>) -> Option<i32> {
    let value = raw?.trim().parse::<f64>().ok()?;
    if value.is_nan() || value.is_infinite() {
        return None;
    }
    if value >= i32::MAX as f64 {
        return Some(i32::MAX);
    }
    Some(value as i32)
}

pub fn clean_salary(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim().parse::<f64>().ok()?;
    if value.is_nan() || value.is_infinite() || value < 0.0 {
        return None;
    }
    if value > SALARY_CAP as f64 {
        return Some(SALARY_CAP);
    }
    Some(value as i64)
}

pub fn clean_timestamp(raw: Option<&str>) -> Option<NaiveDateTime> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%z")
        .ok()
        .map(|dt| dt.naive_utc())
}

#[derive(Debug, Deserialize)]
struct FgosRow {
    direction_code: Option<String>,
    direction_name: Option<String>,
    competency_code: Option<String>,
    competency_name: Option<String>,
    competency_description: Option<String>,
    competency_type: Option<String>,
    category: Option<String>,
    level_description: Option<String>,
}

/// Load the FGOS competency reference table. Returns inserted-row count.
pub async fn load_fgos(pool: &PgPool, path: &Path) -> Result<u64, LoadError> {
    info!(path = %path.display(), "loading FGOS competencies");
    let mut reader = open_csv(path)?;

    let mut loaded = 0u64;
    for record in reader.deserialize::<FgosRow>() {
        let row = match record {
            Ok(row) => row,
            Err(err) => {
                warn!(%err, "skipping malformed FGOS row");
                continue;
            }
        };

        let result = sqlx::query(
            r#"
            INSERT INTO fgos_competencies (
                direction_code, direction_name, competency_code,
                competency_name, competency_description, competency_type,
                category, level_description
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (direction_code, competency_code) DO NOTHING
            "#,
        )
        .bind(clean_text(row.direction_code.as_deref(), Some(20)))
        .bind(clean_text(row.direction_name.as_deref(), Some(500)))
        .bind(clean_text(row.competency_code.as_deref(), Some(20)))
        .bind(clean_text(row.competency_name.as_deref(), None))
        .bind(clean_text(row.competency_description.as_deref(), None))
        .bind(clean_text(row.competency_type.as_deref(), Some(20)))
        .bind(clean_text(row.category.as_deref(), Some(100)))
        .bind(clean_text(row.level_description.as_deref(), None))
        .execute(pool)
        .await;

        match result {
            Ok(done) => loaded += done.rows_affected(),
            Err(err) => warn!(%err, "skipping FGOS row"),
        }
    }

    info!(loaded, "FGOS competencies loaded");
    Ok(loaded)
}

#[derive(Debug, Deserialize)]
struct OtfTdRow {
    #[serde(rename = "Стандарт")]
    standard: Option<String>,
    #[serde(rename = "OTF_код")]
    otf_code: Option<String>,
    #[serde(rename = "OTF_наименование")]
    otf_name: Option<String>,
    #[serde(rename = "TD_код")]
    td_code: Option<String>,
    #[serde(rename = "TD_наименование")]
    td_name: Option<String>,
}

/// Load the OTF/TD professional-standards reference table.
pub async fn load_otf_td(pool: &PgPool, path: &Path) -> Result<u64, LoadError> {
    info!(path = %path.display(), "loading OTF/TD standards");
    let mut reader = open_csv(path)?;

    let mut loaded = 0u64;
    for record in reader.deserialize::<OtfTdRow>() {
        let row = match record {
            Ok(row) => row,
            Err(err) => {
                warn!(%err, "skipping malformed OTF/TD row");
                continue;
            }
        };

        let result = sqlx::query(
            r#"
            INSERT INTO otf_td_standards (
                standard_code, otf_code, otf_name, td_code, td_name
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (standard_code, td_code) DO NOTHING
            "#,
        )
        .bind(clean_text(row.standard.as_deref(), Some(20)))
        .bind(clean_text(row.otf_code.as_deref(), Some(10)))
        .bind(clean_text(row.otf_name.as_deref(), Some(500)))
        .bind(clean_text(row.td_code.as_deref(), Some(20)))
        .bind(clean_text(row.td_name.as_deref(), None))
        .execute(pool)
        .await;

        match result {
            Ok(done) => loaded += done.rows_affected(),
            Err(err) => warn!(%err, "skipping OTF/TD row"),
        }
    }

    info!(loaded, "OTF/TD standards loaded");
    Ok(loaded)
}

#[derive(Debug, Deserialize)]
struct VacancyCsvRow {
    vacancy_id: Option<String>,
    title: Option<String>,
    company: Option<String>,
    company_size: Option<String>,
    area: Option<String>,
    published_date: Option<String>,
    experience_raw: Option<String>,
    experience_level: Option<String>,
    role: Option<String>,
    domain: Option<String>,
    salary_from: Option<String>,
    salary_to: Option<String>,
    avg_salary: Option<String>,
    tech_count: Option<String>,
    skills_count: Option<String>,
    fgos_competencies_count: Option<String>,
    prof_competencies_count: Option<String>,
}

/// Load the scraped vacancy export. Rows that fail insert are logged and
/// skipped; the rest of the file still loads.
pub async fn load_vacancies(pool: &PgPool, path: &Path) -> Result<u64, LoadError> {
    info!(path = %path.display(), "loading vacancies");
    let mut reader = open_csv(path)?;

    let mut loaded = 0u64;
    for record in reader.deserialize::<VacancyCsvRow>() {
        let row = match record {
            Ok(row) => row,
            Err(err) => {
                warn!(%err, "skipping malformed vacancy row");
                continue;
            }
        };

        let result = sqlx::query(
            r#"
            INSERT INTO vacancy_details (
                vacancy_id, title, company, company_size, area,
                published_date, experience_raw, experience_level,
                role, domain, salary_from, salary_to, avg_salary,
                tech_count, skills_count, fgos_competencies_count, prof_competencies_count
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (vacancy_id) DO NOTHING
            "#,
        )
        .bind(clean_text(row.vacancy_id.as_deref(), Some(50)))
        .bind(clean_text(row.title.as_deref(), None))
        .bind(clean_text(row.company.as_deref(), Some(500)))
        .bind(clean_text(row.company_size.as_deref(), Some(50)))
        .bind(clean_text(row.area.as_deref(), Some(100)))
        .bind(clean_timestamp(row.published_date.as_deref()))
        .bind(clean_text(row.experience_raw.as_deref(), Some(100)))
        .bind(clean_text(row.experience_level.as_deref(), Some(50)))
        .bind(clean_text(row.role.as_deref(), Some(50)))
        .bind(clean_text(row.domain.as_deref(), Some(50)))
        .bind(clean_salary(row.salary_from.as_deref()))
        .bind(clean_salary(row.salary_to.as_deref()))
        .bind(clean_salary(row.avg_salary.as_deref()))
        .bind(clean_int(row.tech_count.as_deref()).unwrap_or(0))
        .bind(clean_int(row.skills_count.as_deref()).unwrap_or(0))
        .bind(clean_int(row.fgos_competencies_count.as_deref()).unwrap_or(0))
        .bind(clean_int(row.prof_competencies_count.as_deref()).unwrap_or(0))
        .execute(pool)
        .await;

        match result {
            Ok(done) => loaded += done.rows_affected(),
            Err(err) => warn!(%err, "skipping vacancy row"),
        }
    }

    info!(loaded, "vacancies loaded");
    Ok(loaded)
}

#[derive(Debug, Deserialize)]
struct TechnologyCsvRow {
    vacancy_id: Option<String>,
    technology: Option<String>,
    frequency: Option<String>,
    category: Option<String>,
    level: Option<String>,
    domain: Option<String>,
    fgos_competencies: Option<String>,
    prof_standards: Option<String>,
}

/// Load the (vacancy, technology) detail export. Rows whose parent
/// vacancy is absent are skipped rather than violating the FK.
pub async fn load_technologies(pool: &PgPool, path: &Path) -> Result<u64, LoadError> {
    info!(path = %path.display(), "loading vacancy technologies");
    let mut reader = open_csv(path)?;

    let mut loaded = 0u64;
    for record in reader.deserialize::<TechnologyCsvRow>() {
        let row = match record {
            Ok(row) => row,
            Err(err) => {
                warn!(%err, "skipping malformed technology row");
                continue;
            }
        };

        let Some(vacancy_id) = clean_text(row.vacancy_id.as_deref(), Some(50)) else {
            continue;
        };

        let parent_exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM vacancy_details WHERE vacancy_id = $1")
                .bind(&vacancy_id)
                .fetch_optional(pool)
                .await?;
        if parent_exists.is_none() {
            continue;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO vacancy_technologies_detailed (
                vacancy_id, technology, frequency, category, level,
                domain, fgos_competencies, prof_standards
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&vacancy_id)
        .bind(clean_text(row.technology.as_deref(), Some(100)))
        .bind(clean_int(row.frequency.as_deref()).unwrap_or(1))
        .bind(clean_text(row.category.as_deref(), Some(100)))
        .bind(clean_text(row.level.as_deref(), Some(50)))
        .bind(clean_text(row.domain.as_deref(), Some(50)))
        .bind(clean_text(row.fgos_competencies.as_deref(), None))
        .bind(clean_text(row.prof_standards.as_deref(), None))
        .execute(pool)
        .await;

        match result {
            Ok(done) => loaded += done.rows_affected(),
            Err(err) => warn!(%err, "skipping technology row"),
        }
    }

    info!(loaded, "vacancy technologies loaded");
    Ok(loaded)
}

fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_trims_truncates_and_nulls() {
        assert_eq!(clean_text(Some("  hello  "), None).as_deref(), Some("hello"));
        assert_eq!(clean_text(Some("   "), None), None);
        assert_eq!(clean_text(None, None), None);
        assert_eq!(clean_text(Some("abcdef"), Some(3)).as_deref(), Some("abc"));
        // Truncation is by characters, not bytes.
        assert_eq!(clean_text(Some("Яндекс"), Some(4)).as_deref(), Some("Янде"));
    }

    #[test]
    fn clean_int_accepts_float_formatted_counts() {
        assert_eq!(clean_int(Some("5")), Some(5));
        assert_eq!(clean_int(Some("5.0")), Some(5));
        assert_eq!(clean_int(Some("")), None);
        assert_eq!(clean_int(Some("NaN")), None);
        assert_eq!(clean_int(Some("9999999999")), Some(i32::MAX));
        assert_eq!(clean_int(None), None);
    }

    #[test]
    fn clean_salary_clamps_and_rejects_negatives() {
        assert_eq!(clean_salary(Some("150000.0")), Some(150_000));
        assert_eq!(clean_salary(Some("99999999")), Some(SALARY_CAP));
        assert_eq!(clean_salary(Some("-1")), None);
        assert_eq!(clean_salary(Some("junk")), None);
    }

    #[test]
    fn clean_timestamp_accepts_export_and_api_formats() {
        let exported = clean_timestamp(Some("2025-08-01 09:00:00")).expect("export format");
        assert_eq!(exported.format("%H:%M").to_string(), "09:00");

        let api = clean_timestamp(Some("2025-08-01T09:00:00+0300")).expect("api format");
        assert_eq!(api.format("%H:%M").to_string(), "06:00");

        assert_eq!(clean_timestamp(Some("not a date")), None);
        assert_eq!(clean_timestamp(Some("")), None);
    }

    #[test]
    fn latest_pair_picks_lexical_maximum() {
        let dir = std::env::temp_dir().join(format!("competency-etl-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        for name in [
            "hh_vacancies_enhanced_20250101_000000.csv",
            "hh_vacancies_enhanced_20250814_103000.csv",
            "hh_technologies_detailed_20250101_000000.csv",
            "hh_technologies_detailed_20250814_103000.csv",
            "hh_analytics_20250814_103000.csv",
            "unrelated.txt",
        ] {
            std::fs::write(dir.join(name), "x").expect("fixture file");
        }

        let (vacancies, technologies) = latest_export_pair(&dir).expect("pair found");
        assert!(vacancies
            .to_string_lossy()
            .ends_with("hh_vacancies_enhanced_20250814_103000.csv"));
        assert!(technologies
            .to_string_lossy()
            .ends_with("hh_technologies_detailed_20250814_103000.csv"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_exports_is_an_error() {
        let dir = std::env::temp_dir().join(format!("competency-etl-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let err = latest_export_pair(&dir).expect_err("no exports present");
        assert!(matches!(err, LoadError::MissingExports(_)));
        std::fs::remove_dir_all(&dir).ok();
    }
}
