use competency_etl::db::loader;
use competency_etl::enrich::{TechnologyExtractor, VacancyRecord};
use competency_etl::export;
use competency_etl::hh::VacancyDetail;
use std::fs;
use std::path::PathBuf;

fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "competency-etl-{label}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

fn sample_details() -> Vec<VacancyDetail> {
    let backend = serde_json::from_str::<VacancyDetail>(
        r#"{
            "id": "101",
            "name": "Python разработчик",
            "employer": { "name": "Яндекс" },
            "area": { "name": "Москва" },
            "salary": { "from": 200000, "to": 300000 },
            "experience": { "name": "От 3 до 6 лет" },
            "description": "Backend на Python и Django, данные в PostgreSQL, деплой через Docker.",
            "key_skills": [{ "name": "Python" }, { "name": "SQL" }],
            "published_at": "2025-08-14T10:30:00+0300"
        }"#,
    )
    .expect("backend fixture parses");

    let frontend = serde_json::from_str::<VacancyDetail>(
        r#"{
            "id": "102",
            "name": "Frontend developer",
            "employer": { "name": "Маленькая студия" },
            "area": { "name": "Санкт-Петербург" },
            "experience": { "name": "Нет опыта" },
            "description": "Верстка и React, JavaScript, TypeScript.",
            "key_skills": [],
            "published_at": "2025-08-15T12:00:00+0300"
        }"#,
    )
    .expect("frontend fixture parses");

    vec![backend, frontend]
}

fn enrich(details: &[VacancyDetail]) -> Vec<VacancyRecord> {
    let extractor = TechnologyExtractor::new();
    details
        .iter()
        .map(|detail| VacancyRecord::from_detail(detail, &extractor))
        .collect()
}

#[test]
fn export_writes_all_three_files_with_expected_rows() {
    let dir = temp_dir("export-roundtrip");
    let records = enrich(&sample_details());

    let paths = export::export_all(&records, &dir, "20250815_120000").expect("export succeeds");

    assert!(paths.vacancies.ends_with("hh_vacancies_enhanced_20250815_120000.csv"));
    assert!(paths.technologies.ends_with("hh_technologies_detailed_20250815_120000.csv"));
    assert!(paths.analytics.ends_with("hh_analytics_20250815_120000.csv"));

    let mut reader = csv::Reader::from_path(&paths.vacancies).expect("vacancies csv opens");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(&headers[0], "vacancy_id");
    assert!(headers.iter().any(|h| h == "avg_salary"));
    assert!(headers.iter().any(|h| h == "fgos_competencies_count"));

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("vacancy rows parse");
    assert_eq!(rows.len(), 2);

    let backend = rows
        .iter()
        .find(|row| &row[0] == "101")
        .expect("backend row present");
    let salary_idx = headers
        .iter()
        .position(|h| h == "avg_salary")
        .expect("avg_salary column");
    assert_eq!(&backend[salary_idx], "250000");

    let role_idx = headers.iter().position(|h| h == "role").expect("role column");
    assert_eq!(&backend[role_idx], "backend");

    let junior = rows.iter().find(|row| &row[0] == "102").expect("frontend row");
    let level_idx = headers
        .iter()
        .position(|h| h == "experience_level")
        .expect("experience_level column");
    assert_eq!(&junior[level_idx], "junior");

    let mut tech_reader =
        csv::Reader::from_path(&paths.technologies).expect("technologies csv opens");
    let tech_rows: Vec<csv::StringRecord> = tech_reader
        .records()
        .collect::<Result<_, _>>()
        .expect("technology rows parse");
    // Backend fixture mentions Python, Django, PostgreSQL, Docker, SQL;
    // frontend mentions React, JavaScript, TypeScript.
    assert!(tech_rows.len() >= 7);
    assert!(tech_rows
        .iter()
        .any(|row| &row[0] == "101" && &row[1] == "Python"));
    assert!(tech_rows
        .iter()
        .any(|row| &row[0] == "102" && &row[1] == "React"));
    // Whole-word matching: "JavaScript" must not also count as "Java".
    assert!(!tech_rows.iter().any(|row| &row[1] == "Java"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn analytics_file_aggregates_across_vacancies() {
    let dir = temp_dir("analytics");
    let records = enrich(&sample_details());

    let paths = export::export_all(&records, &dir, "20250815_120000").expect("export succeeds");

    let mut reader = csv::Reader::from_path(&paths.analytics).expect("analytics csv opens");
    let headers = reader.headers().expect("headers").clone();
    let tech_idx = headers
        .iter()
        .position(|h| h == "technology")
        .expect("technology column");
    let count_idx = headers
        .iter()
        .position(|h| h == "vacancy_count")
        .expect("vacancy_count column");

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("analytics rows parse");

    let python = rows
        .iter()
        .find(|row| &row[tech_idx] == "Python")
        .expect("Python summarized");
    assert_eq!(&python[count_idx], "1");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn loader_picks_newest_export_pair_by_name() {
    let dir = temp_dir("latest-pair");

    for timestamp in ["20250101_000000", "20250815_120000", "20250301_090000"] {
        let records: Vec<VacancyRecord> = Vec::new();
        export::export_all(&records, &dir, timestamp).expect("export succeeds");
    }

    let (vacancies, technologies) = loader::latest_export_pair(&dir).expect("pair found");
    assert!(vacancies.ends_with("hh_vacancies_enhanced_20250815_120000.csv"));
    assert!(technologies.ends_with("hh_technologies_detailed_20250815_120000.csv"));

    fs::remove_dir_all(&dir).ok();
}
