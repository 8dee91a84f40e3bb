use sqlx::PgPool;
use tracing::info;

/// Data tables in child-first drop order.
pub const DATA_TABLES: [&str; 4] = [
    "vacancy_technologies_detailed",
    "vacancy_details",
    "fgos_competencies",
    "otf_td_standards",
];

/// Views built by the loader.
pub const OLAP_VIEWS: [&str; 3] = [
    "olap_competency_analysis",
    "tech_market_summary",
    "role_tech_salary_cube",
];

/// Drop and recreate the four warehouse tables and their indexes.
pub async fn create_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("recreating warehouse tables");

    for table in DATA_TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table} CASCADE"))
            .execute(pool)
            .await?;
    }

    sqlx::query(
        r#"
        CREATE TABLE fgos_competencies (
            id SERIAL PRIMARY KEY,
            direction_code VARCHAR(20) NOT NULL,
            direction_name VARCHAR(500) NOT NULL,
            competency_code VARCHAR(20) NOT NULL,
            competency_name TEXT NOT NULL,
            competency_description TEXT,
            competency_type VARCHAR(20),
            category VARCHAR(100),
            level_description TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,

            UNIQUE(direction_code, competency_code)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE otf_td_standards (
            id SERIAL PRIMARY KEY,
            standard_code VARCHAR(20) NOT NULL,
            otf_code VARCHAR(10) NOT NULL,
            otf_name VARCHAR(500) NOT NULL,
            td_code VARCHAR(20) NOT NULL,
            td_name TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,

            UNIQUE(standard_code, td_code)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE vacancy_details (
            id SERIAL PRIMARY KEY,
            vacancy_id VARCHAR(50) UNIQUE NOT NULL,
            title TEXT NOT NULL,
            company VARCHAR(500),
            company_size VARCHAR(50),
            area VARCHAR(100),
            published_date TIMESTAMP,
            experience_raw VARCHAR(100),
            experience_level VARCHAR(50),
            role VARCHAR(50),
            domain VARCHAR(50),
            salary_from BIGINT,
            salary_to BIGINT,
            avg_salary BIGINT,
            tech_count INTEGER DEFAULT 0,
            skills_count INTEGER DEFAULT 0,
            fgos_competencies_count INTEGER DEFAULT 0,
            prof_competencies_count INTEGER DEFAULT 0,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE vacancy_technologies_detailed (
            id SERIAL PRIMARY KEY,
            vacancy_id VARCHAR(50) NOT NULL,
            technology VARCHAR(100) NOT NULL,
            frequency INTEGER DEFAULT 1,
            category VARCHAR(100),
            level VARCHAR(50),
            domain VARCHAR(50),
            fgos_competencies TEXT,
            prof_standards TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,

            FOREIGN KEY (vacancy_id) REFERENCES vacancy_details(vacancy_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX idx_vac_role ON vacancy_details(role)",
        "CREATE INDEX idx_vac_domain ON vacancy_details(domain)",
        "CREATE INDEX idx_vac_exp_level ON vacancy_details(experience_level)",
        "CREATE INDEX idx_vac_salary ON vacancy_details(avg_salary)",
        "CREATE INDEX idx_tech_technology ON vacancy_technologies_detailed(technology)",
        "CREATE INDEX idx_tech_category ON vacancy_technologies_detailed(category)",
        "CREATE INDEX idx_fgos_direction ON fgos_competencies(direction_code)",
        "CREATE INDEX idx_fgos_competency ON fgos_competencies(competency_code)",
        "CREATE INDEX idx_otf_standard ON otf_td_standards(standard_code)",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("warehouse tables ready");
    Ok(())
}

/// (Re)create the three OLAP views the downstream analysis reads.
pub async fn create_olap_views(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("creating OLAP views");

    sqlx::query(
        r#"
        CREATE OR REPLACE VIEW olap_competency_analysis AS
        SELECT
            vd.vacancy_id,
            vd.title,
            vd.company,
            vd.role,
            vd.domain,
            vd.experience_level,
            vd.avg_salary,
            vd.area,

            vtd.technology,
            vtd.category as tech_category,
            vtd.level as tech_level,
            vtd.frequency,

            CASE WHEN vtd.fgos_competencies IS NOT NULL
                 THEN string_to_array(vtd.fgos_competencies, ',')
                 ELSE ARRAY[]::text[]
            END as fgos_competencies_array,

            CASE WHEN vtd.prof_standards IS NOT NULL
                 THEN string_to_array(vtd.prof_standards, ',')
                 ELSE ARRAY[]::text[]
            END as prof_standards_array,

            CASE
                WHEN vd.avg_salary IS NULL THEN 'Не указана'
                WHEN vd.avg_salary < 100000 THEN 'До 100к'
                WHEN vd.avg_salary < 200000 THEN '100-200к'
                WHEN vd.avg_salary < 300000 THEN '200-300к'
                ELSE '300к+'
            END as salary_range,

            EXTRACT(YEAR FROM vd.published_date) as publish_year,
            EXTRACT(MONTH FROM vd.published_date) as publish_month

        FROM vacancy_details vd
        LEFT JOIN vacancy_technologies_detailed vtd ON vd.vacancy_id = vtd.vacancy_id
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE OR REPLACE VIEW tech_market_summary AS
        SELECT
            technology,
            tech_category,
            COUNT(DISTINCT vacancy_id) as vacancy_count,
            SUM(frequency) as total_mentions,
            AVG(avg_salary) as avg_salary,
            COUNT(DISTINCT company) as company_count,
            COUNT(DISTINCT role) as role_count,

            MODE() WITHIN GROUP (ORDER BY role) as top_role,
            MODE() WITHIN GROUP (ORDER BY experience_level) as top_experience_level

        FROM olap_competency_analysis
        WHERE technology IS NOT NULL
        GROUP BY technology, tech_category
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE OR REPLACE VIEW role_tech_salary_cube AS
        SELECT
            role,
            technology,
            salary_range,
            COUNT(*) as vacancy_count,
            AVG(avg_salary) as avg_salary,
            MIN(avg_salary) as min_salary,
            MAX(avg_salary) as max_salary
        FROM olap_competency_analysis
        WHERE role IS NOT NULL AND technology IS NOT NULL
        GROUP BY role, technology, salary_range
        "#,
    )
    .execute(pool)
    .await?;

    info!("OLAP views ready");
    Ok(())
}
