use super::relationships::RELATIONSHIP_VIEWS;
use super::schema::{DATA_TABLES, OLAP_VIEWS};
use std::io::{self, BufRead, Write};
use sqlx::{PgPool, Row};
use tracing::{info, warn};

/// Ask the operator to type the literal confirmation phrase. Returns
/// false on any other input, including EOF.
pub fn confirm_destructive(action: &str) -> Result<bool, io::Error> {
    println!("About to {action}. This cannot be undone.");
    print!("Type 'yes' to continue: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

/// Drop everything the pipeline creates, in dependency order, leaving
/// the schema itself intact. Missing objects are skipped silently via
/// IF EXISTS.
pub async fn soft_clean(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("soft clean: dropping pipeline views and tables");

    for view in OLAP_VIEWS.iter().chain(RELATIONSHIP_VIEWS.iter()) {
        sqlx::query(&format!("DROP VIEW IF EXISTS {view} CASCADE"))
            .execute(pool)
            .await?;
    }

    sqlx::query("DROP TABLE IF EXISTS technology_relationships CASCADE")
        .execute(pool)
        .await?;

    for table in DATA_TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table} CASCADE"))
            .execute(pool)
            .await?;
    }

    info!("soft clean complete");
    Ok(())
}

/// Nuke the public schema and recreate it empty. Removes objects the
/// pipeline never created too, so this is only for resetting a
/// dedicated analysis database.
pub async fn hard_clean(pool: &PgPool) -> Result<(), sqlx::Error> {
    warn!("hard clean: dropping the entire public schema");

    sqlx::query("DROP SCHEMA public CASCADE").execute(pool).await?;
    sqlx::query("CREATE SCHEMA public").execute(pool).await?;
    sqlx::query("GRANT ALL ON SCHEMA public TO public")
        .execute(pool)
        .await?;

    info!("public schema recreated");
    Ok(())
}

/// Print what is currently in the database so the operator can see the
/// effect of a clean.
pub async fn print_status(pool: &PgPool) -> Result<(), sqlx::Error> {
    let tables = sqlx::query(
        r#"
        SELECT table_name, table_type
        FROM information_schema.tables
        WHERE table_schema = 'public'
        ORDER BY table_type, table_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    if tables.is_empty() {
        println!("Database is empty.");
        return Ok(());
    }

    println!("Current database objects:");
    for row in &tables {
        let name: String = row.get("table_name");
        let kind: String = row.get("table_type");
        let label = if kind == "VIEW" { "view" } else { "table" };
        println!("  - {name} ({label})");
    }

    Ok(())
}
