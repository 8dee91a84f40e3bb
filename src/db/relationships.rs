use sqlx::{PgPool, Row};
use tracing::info;

/// Views derived from the relationship table.
pub const RELATIONSHIP_VIEWS: [&str; 3] = [
    "technology_relationships_extended",
    "top_technology_relationships",
    "technology_network_stats",
];

/// Curated technology pairs that keyword co-occurrence alone would miss.
/// Pairs are inserted only when both names actually appear in the scraped
/// data, and sorted before insert so the uniqueness constraint holds.
const PREDEFINED_PAIRS: &[(&str, &str, &str, f64, &str)] = &[
    ("React", "JavaScript", "complementary", 0.9, "React основан на JavaScript"),
    ("Vue", "JavaScript", "complementary", 0.9, "Vue основан на JavaScript"),
    ("Angular", "TypeScript", "complementary", 0.8, "Angular использует TypeScript"),
    ("HTML", "CSS", "complementary", 0.9, "HTML и CSS работают вместе"),
    ("React", "Redux", "complementary", 0.7, "Redux часто используется с React"),
    ("Python", "Django", "complementary", 0.8, "Django - фреймворк Python"),
    ("Python", "Flask", "complementary", 0.7, "Flask - фреймворк Python"),
    ("JavaScript", "Node.js", "complementary", 0.8, "Node.js выполняет JavaScript"),
    ("Java", "Spring", "complementary", 0.8, "Spring - фреймворк Java"),
    ("SQL", "PostgreSQL", "complementary", 0.8, "PostgreSQL использует SQL"),
    ("SQL", "MySQL", "complementary", 0.8, "MySQL использует SQL"),
    ("Python", "PostgreSQL", "complementary", 0.7, "Python часто работает с PostgreSQL"),
    ("Docker", "Kubernetes", "complementary", 0.8, "Kubernetes оркестрирует Docker"),
    ("Git", "GitHub", "complementary", 0.8, "GitHub использует Git"),
    ("Docker", "CI/CD", "complementary", 0.7, "Docker используется в CI/CD"),
    ("React", "Vue", "alternative", 0.6, "React и Vue - альтернативные фреймворки"),
    ("PostgreSQL", "MySQL", "alternative", 0.5, "PostgreSQL и MySQL - альтернативные СУБД"),
    ("Docker", "Podman", "alternative", 0.7, "Podman - альтернатива Docker"),
    ("JavaScript", "TypeScript", "prerequisite", 0.7, "TypeScript расширяет JavaScript"),
    ("HTML", "React", "prerequisite", 0.6, "Знание HTML полезно для React"),
    ("SQL", "Database", "prerequisite", 0.8, "SQL нужен для работы с БД"),
];

/// Drop and recreate the relationship table with its type check and
/// indexes.
pub async fn create_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("recreating technology_relationships");

    sqlx::query("DROP TABLE IF EXISTS technology_relationships CASCADE")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE technology_relationships (
            id SERIAL PRIMARY KEY,
            technology_1 VARCHAR(100) NOT NULL,
            technology_2 VARCHAR(100) NOT NULL,
            relationship_type VARCHAR(50) NOT NULL,
            strength DECIMAL(3,2) DEFAULT 0.5,
            frequency INTEGER DEFAULT 1,
            description TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,

            UNIQUE(technology_1, technology_2, relationship_type),

            CONSTRAINT valid_relationship_type
            CHECK (relationship_type IN ('cooccurrence', 'complementary', 'same_category', 'prerequisite', 'alternative'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX idx_tech_rel_tech1 ON technology_relationships(technology_1)",
        "CREATE INDEX idx_tech_rel_tech2 ON technology_relationships(technology_2)",
        "CREATE INDEX idx_tech_rel_type ON technology_relationships(relationship_type)",
        "CREATE INDEX idx_tech_rel_strength ON technology_relationships(strength)",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// Edges for technologies that appear in the same vacancy at least three
/// times, strength normalized against a 50-vacancy ceiling.
pub async fn build_cooccurrence(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let done = sqlx::query(
        r#"
        INSERT INTO technology_relationships (technology_1, technology_2, relationship_type, strength, frequency, description)
        SELECT
            t1.technology as tech1,
            t2.technology as tech2,
            'cooccurrence' as relationship_type,
            LEAST(1.0, COUNT(*) / 50.0) as strength,
            COUNT(*) as frequency,
            'Технологии часто используются вместе в ' || COUNT(*) || ' вакансиях'
        FROM vacancy_technologies_detailed t1
        JOIN vacancy_technologies_detailed t2 ON t1.vacancy_id = t2.vacancy_id
        WHERE t1.technology < t2.technology
            AND t1.technology IS NOT NULL
            AND t2.technology IS NOT NULL
            AND t1.technology != t2.technology
        GROUP BY t1.technology, t2.technology
        HAVING COUNT(*) >= 3
        ON CONFLICT (technology_1, technology_2, relationship_type) DO NOTHING
        "#,
    )
    .execute(pool)
    .await?;

    info!(edges = done.rows_affected(), "co-occurrence edges created");
    Ok(done.rows_affected())
}

/// Flat-strength edges between technologies sharing a category.
pub async fn build_same_category(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let done = sqlx::query(
        r#"
        INSERT INTO technology_relationships (technology_1, technology_2, relationship_type, strength, description)
        SELECT DISTINCT
            t1.technology as tech1,
            t2.technology as tech2,
            'same_category' as relationship_type,
            0.4 as strength,
            'Обе технологии относятся к категории: ' || COALESCE(t1.category, 'Unknown')
        FROM vacancy_technologies_detailed t1
        JOIN vacancy_technologies_detailed t2 ON t1.category = t2.category
        WHERE t1.technology < t2.technology
            AND t1.category IS NOT NULL
            AND t2.category IS NOT NULL
            AND t1.category != ''
            AND t1.technology != t2.technology
        ON CONFLICT (technology_1, technology_2, relationship_type) DO NOTHING
        "#,
    )
    .execute(pool)
    .await?;

    info!(edges = done.rows_affected(), "same-category edges created");
    Ok(done.rows_affected())
}

/// Insert the curated pair list for technologies present in the data.
pub async fn build_predefined(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let mut created = 0u64;

    for &(tech1, tech2, rel_type, strength, description) in PREDEFINED_PAIRS {
        let present: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT technology) FROM vacancy_technologies_detailed WHERE technology IN ($1, $2)",
        )
        .bind(tech1)
        .bind(tech2)
        .fetch_one(pool)
        .await?;

        if present != 2 {
            continue;
        }

        let (first, second) = if tech1 <= tech2 {
            (tech1, tech2)
        } else {
            (tech2, tech1)
        };

        let done = sqlx::query(
            r#"
            INSERT INTO technology_relationships (technology_1, technology_2, relationship_type, strength, description)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (technology_1, technology_2, relationship_type) DO NOTHING
            "#,
        )
        .bind(first)
        .bind(second)
        .bind(rel_type)
        .bind(strength)
        .bind(description)
        .execute(pool)
        .await?;

        if done.rows_affected() > 0 {
            created += 1;
            info!(tech1, tech2, rel_type, "predefined edge created");
        }
    }

    info!(created, "predefined edges done");
    Ok(created)
}

/// Views for exploring the relationship graph.
pub async fn create_analysis_views(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("creating relationship analysis views");

    sqlx::query(
        r#"
        CREATE OR REPLACE VIEW technology_relationships_extended AS
        SELECT
            tr.id,
            tr.technology_1,
            tr.technology_2,
            tr.relationship_type,
            tr.strength,
            tr.frequency,
            tr.description,

            t1_stats.vacancy_count as tech1_vacancy_count,
            t1_stats.category as tech1_category,

            t2_stats.vacancy_count as tech2_vacancy_count,
            t2_stats.category as tech2_category,

            tr.created_at
        FROM technology_relationships tr
        LEFT JOIN (
            SELECT
                technology,
                COUNT(DISTINCT vacancy_id) as vacancy_count,
                MODE() WITHIN GROUP (ORDER BY category) as category
            FROM vacancy_technologies_detailed
            GROUP BY technology
        ) t1_stats ON tr.technology_1 = t1_stats.technology
        LEFT JOIN (
            SELECT
                technology,
                COUNT(DISTINCT vacancy_id) as vacancy_count,
                MODE() WITHIN GROUP (ORDER BY category) as category
            FROM vacancy_technologies_detailed
            GROUP BY technology
        ) t2_stats ON tr.technology_2 = t2_stats.technology
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE OR REPLACE VIEW top_technology_relationships AS
        SELECT
            technology_1,
            technology_2,
            relationship_type,
            strength,
            frequency,
            description,
            tech1_category,
            tech2_category
        FROM technology_relationships_extended
        ORDER BY strength DESC, frequency DESC
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE OR REPLACE VIEW technology_network_stats AS
        SELECT
            technology,
            COUNT(*) as total_relationships,
            COUNT(CASE WHEN relationship_type = 'cooccurrence' THEN 1 END) as cooccurrence_links,
            COUNT(CASE WHEN relationship_type = 'complementary' THEN 1 END) as complementary_links,
            COUNT(CASE WHEN relationship_type = 'same_category' THEN 1 END) as category_links,
            AVG(strength) as avg_relationship_strength,
            MAX(strength) as max_relationship_strength
        FROM (
            SELECT technology_1 as technology, relationship_type, strength FROM technology_relationships
            UNION ALL
            SELECT technology_2 as technology, relationship_type, strength FROM technology_relationships
        ) all_relationships
        GROUP BY technology
        ORDER BY total_relationships DESC
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Console summary of the relationship graph.
pub async fn print_summary(pool: &PgPool) -> Result<(), sqlx::Error> {
    println!("\nTechnology relationship summary");
    println!("{}", "=".repeat(60));

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM technology_relationships")
        .fetch_one(pool)
        .await?;
    println!("Total edges: {total}");

    let by_type = sqlx::query(
        r#"
        SELECT relationship_type, COUNT(*) as edge_count, AVG(strength)::float8 as avg_strength
        FROM technology_relationships
        GROUP BY relationship_type
        ORDER BY COUNT(*) DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("\nBy relationship type:");
    for row in &by_type {
        let rel_type: String = row.get("relationship_type");
        let count: i64 = row.get("edge_count");
        let avg: Option<f64> = row.get("avg_strength");
        println!(
            "  - {rel_type}: {count} edges (avg strength {:.2})",
            avg.unwrap_or(0.0)
        );
    }

    let top_connected = sqlx::query(
        r#"
        SELECT technology, total_relationships, cooccurrence_links, complementary_links
        FROM technology_network_stats
        ORDER BY total_relationships DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("\nMost connected technologies:");
    for (i, row) in top_connected.iter().enumerate() {
        let technology: String = row.get("technology");
        let total: i64 = row.get("total_relationships");
        let cooc: i64 = row.get("cooccurrence_links");
        let compl: i64 = row.get("complementary_links");
        println!("  {:2}. {technology}: {total} edges ({cooc} co-occurrence, {compl} complementary)", i + 1);
    }

    let strongest = sqlx::query(
        r#"
        SELECT technology_1, technology_2, relationship_type, strength::float8 as strength, frequency
        FROM technology_relationships
        ORDER BY strength DESC, frequency DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("\nStrongest edges:");
    for (i, row) in strongest.iter().enumerate() {
        let tech1: String = row.get("technology_1");
        let tech2: String = row.get("technology_2");
        let rel_type: String = row.get("relationship_type");
        let strength: f64 = row.get("strength");
        let frequency: Option<i32> = row.get("frequency");
        let freq_note = match frequency {
            Some(f) if f > 1 => format!(", frequency {f}"),
            _ => String::new(),
        };
        println!("  {:2}. {tech1} <-> {tech2} ({rel_type}, strength {strength:.2}{freq_note})", i + 1);
    }

    Ok(())
}

/// Full relationship build: table, three edge sources, analysis views,
/// summary.
pub async fn build_all(pool: &PgPool) -> Result<(), sqlx::Error> {
    create_table(pool).await?;
    build_cooccurrence(pool).await?;
    build_same_category(pool).await?;
    build_predefined(pool).await?;
    create_analysis_views(pool).await?;
    print_summary(pool).await?;
    Ok(())
}
