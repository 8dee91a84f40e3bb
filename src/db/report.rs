use super::schema::{DATA_TABLES, OLAP_VIEWS};
use sqlx::{PgPool, Row};

/// Console overview of the warehouse: per-table row counts, analytics
/// highlights, OLAP readiness, and data-quality ratios. Read-only.
pub async fn print_full_report(pool: &PgPool) -> Result<(), sqlx::Error> {
    print_table_summaries(pool).await?;
    print_analytics(pool).await?;
    print_olap_readiness(pool).await?;
    print_data_quality(pool).await?;
    Ok(())
}

pub async fn list_tables(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT table_name
        FROM information_schema.tables
        WHERE table_schema = 'public'
        AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(|row| row.get("table_name")).collect())
}

pub async fn list_views(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT table_name
        FROM information_schema.views
        WHERE table_schema = 'public'
        ORDER BY table_name
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(|row| row.get("table_name")).collect())
}

async fn count_rows(pool: &PgPool, table: &str) -> Result<i64, sqlx::Error> {
    // Identifiers cannot be bound; every name passed here comes from our
    // own constants or information_schema.
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
}

async fn print_table_summaries(pool: &PgPool) -> Result<(), sqlx::Error> {
    println!("Warehouse tables");
    println!("{}", "=".repeat(60));

    let existing = list_tables(pool).await?;

    for table in DATA_TABLES {
        if existing.iter().any(|name| name == table) {
            let rows = count_rows(pool, table).await?;
            println!("  {table}: {rows} rows");
        } else {
            println!("  {table}: MISSING");
        }
    }

    let extra: Vec<_> = existing
        .iter()
        .filter(|name| !DATA_TABLES.contains(&name.as_str()))
        .collect();
    if !extra.is_empty() {
        println!("\nOther tables:");
        for table in extra {
            let rows = count_rows(pool, table).await?;
            println!("  {table}: {rows} rows");
        }
    }

    Ok(())
}

async fn print_analytics(pool: &PgPool) -> Result<(), sqlx::Error> {
    println!("\nAnalytics");
    println!("{}", "=".repeat(60));

    let top_technologies = sqlx::query(
        r#"
        SELECT technology, COUNT(*) as vacancy_count, SUM(frequency) as total_mentions
        FROM vacancy_technologies_detailed
        GROUP BY technology
        ORDER BY vacancy_count DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("\nTop technologies:");
    for (i, row) in top_technologies.iter().enumerate() {
        let technology: String = row.get("technology");
        let vacancies: i64 = row.get("vacancy_count");
        let mentions: Option<i64> = row.get("total_mentions");
        println!(
            "  {:2}. {technology}: {vacancies} vacancies, {} mentions",
            i + 1,
            mentions.unwrap_or(0)
        );
    }

    let roles = sqlx::query(
        r#"
        SELECT role, COUNT(*) as vacancy_count, AVG(avg_salary)::float8 as avg_salary
        FROM vacancy_details
        WHERE role IS NOT NULL
        GROUP BY role
        ORDER BY vacancy_count DESC
        LIMIT 8
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("\nRole distribution:");
    for row in &roles {
        let role: String = row.get("role");
        let count: i64 = row.get("vacancy_count");
        match row.get::<Option<f64>, _>("avg_salary") {
            Some(salary) => println!("  - {role}: {count} vacancies (avg salary {salary:.0})"),
            None => println!("  - {role}: {count} vacancies"),
        }
    }

    let companies = sqlx::query(
        r#"
        SELECT company, COUNT(*) as vacancy_count
        FROM vacancy_details
        WHERE company IS NOT NULL
        GROUP BY company
        ORDER BY vacancy_count DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("\nTop companies:");
    for row in &companies {
        let company: String = row.get("company");
        let count: i64 = row.get("vacancy_count");
        println!("  - {company}: {count} vacancies");
    }

    let fgos_types = sqlx::query(
        r#"
        SELECT competency_type, COUNT(*) as type_count
        FROM fgos_competencies
        WHERE competency_type IS NOT NULL
        GROUP BY competency_type
        ORDER BY type_count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("\nFGOS competencies by type:");
    for row in &fgos_types {
        let competency_type: String = row.get("competency_type");
        let count: i64 = row.get("type_count");
        println!("  - {competency_type}: {count}");
    }

    let standards = sqlx::query(
        r#"
        SELECT standard_code, COUNT(*) as otf_count
        FROM otf_td_standards
        GROUP BY standard_code
        ORDER BY otf_count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("\nProfessional standards:");
    for row in &standards {
        let code: String = row.get("standard_code");
        let count: i64 = row.get("otf_count");
        println!("  - {code}: {count} OTF/TD entries");
    }

    let coverage = sqlx::query(
        r#"
        SELECT
            COUNT(*) as total,
            COUNT(CASE WHEN fgos_competencies IS NOT NULL THEN 1 END) as with_fgos,
            COUNT(CASE WHEN prof_standards IS NOT NULL THEN 1 END) as with_prof
        FROM vacancy_technologies_detailed
        "#,
    )
    .fetch_one(pool)
    .await?;

    let total: i64 = coverage.get("total");
    let with_fgos: i64 = coverage.get("with_fgos");
    let with_prof: i64 = coverage.get("with_prof");
    println!("\nCompetency coverage:");
    if total > 0 {
        println!(
            "  - FGOS: {with_fgos}/{total} ({:.1}%)",
            with_fgos as f64 * 100.0 / total as f64
        );
        println!(
            "  - Professional standards: {with_prof}/{total} ({:.1}%)",
            with_prof as f64 * 100.0 / total as f64
        );
    } else {
        println!("  - no technology rows loaded");
    }

    Ok(())
}

async fn print_olap_readiness(pool: &PgPool) -> Result<(), sqlx::Error> {
    println!("\nOLAP readiness");
    println!("{}", "=".repeat(60));

    let views = list_views(pool).await?;
    for view in OLAP_VIEWS {
        if views.iter().any(|name| name == view) {
            let rows = count_rows(pool, view).await?;
            println!("  [ok] {view}: {rows} rows");
        } else {
            println!("  [missing] {view}");
        }
    }

    // Smoke-test that CUBE rollups work against the fact view.
    let cube = sqlx::query(
        r#"
        SELECT role, tech_category, COUNT(*) as vacancy_count
        FROM olap_competency_analysis
        WHERE role IS NOT NULL AND tech_category IS NOT NULL
        GROUP BY CUBE(role, tech_category)
        LIMIT 5
        "#,
    )
    .fetch_all(pool)
    .await;

    match cube {
        Ok(rows) => println!("  [ok] GROUP BY CUBE ({} sample rows)", rows.len()),
        Err(err) => println!("  [failed] GROUP BY CUBE: {err}"),
    }

    Ok(())
}

async fn print_data_quality(pool: &PgPool) -> Result<(), sqlx::Error> {
    println!("\nData quality");
    println!("{}", "=".repeat(60));

    let salaries = sqlx::query(
        r#"
        SELECT COUNT(*) as total, COUNT(avg_salary) as with_salary
        FROM vacancy_details
        "#,
    )
    .fetch_one(pool)
    .await?;
    let total: i64 = salaries.get("total");
    let with_salary: i64 = salaries.get("with_salary");
    if total > 0 {
        println!(
            "  - vacancies with salary: {with_salary}/{total} ({:.1}%)",
            with_salary as f64 * 100.0 / total as f64
        );
    } else {
        println!("  - no vacancies loaded");
    }

    let tech_density = sqlx::query(
        r#"
        SELECT
            COUNT(DISTINCT technology) as unique_technologies,
            COUNT(*) as total_rows,
            COUNT(DISTINCT vacancy_id) as vacancies
        FROM vacancy_technologies_detailed
        "#,
    )
    .fetch_one(pool)
    .await?;
    let unique: i64 = tech_density.get("unique_technologies");
    let rows: i64 = tech_density.get("total_rows");
    let vacancies: i64 = tech_density.get("vacancies");
    if vacancies > 0 {
        println!(
            "  - {unique} distinct technologies, {:.1} per vacancy on average",
            rows as f64 / vacancies as f64
        );
    }

    Ok(())
}
