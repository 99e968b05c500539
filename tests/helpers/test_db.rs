use wa_templates::database::Database;

pub async fn setup_test_db() -> Database {
    // Install drivers for AnyPool (required for tests)
    sqlx::any::install_default_drivers();

    // Use file-based SQLite for tests (unique UUID per test for parallel execution)
    use uuid::Uuid;
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    setup_schema(&db).await;

    db
}

async fn setup_schema(db: &Database) {
    let pool = db.pool();

    sqlx::query(
        "CREATE TABLE templates (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            name TEXT NOT NULL,
            template_type TEXT NOT NULL CHECK(template_type IN ('TEXT', 'IMAGE', 'VIDEO', 'DOCUMENT', 'CAROUSEL', 'CATALOG')),
            language_code TEXT NOT NULL DEFAULT 'en',
            category TEXT NOT NULL DEFAULT 'MARKETING' CHECK(category IN ('MARKETING', 'UTILITY', 'AUTHENTICATION')),
            content TEXT,
            payload TEXT NOT NULL DEFAULT '{}',
            status TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft', 'pending', 'approved', 'rejected', 'failed')),
            provider_reference TEXT,
            last_error TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create templates table");

    sqlx::query("CREATE INDEX idx_templates_tenant ON templates(tenant_id)")
        .execute(pool)
        .await
        .ok();

    sqlx::query("CREATE INDEX idx_templates_tenant_status ON templates(tenant_id, status)")
        .execute(pool)
        .await
        .ok();

    sqlx::query(
        "CREATE TABLE jobs (
            id TEXT PRIMARY KEY,
            job_type TEXT NOT NULL,
            payload TEXT NOT NULL DEFAULT 'null',
            status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'processing', 'completed', 'failed')),
            run_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 0,
            max_attempts INTEGER NOT NULL DEFAULT 3,
            last_error TEXT,
            locked_until TEXT
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create jobs table");

    sqlx::query("CREATE INDEX idx_jobs_status_run_at ON jobs(status, run_at)")
        .execute(pool)
        .await
        .ok();
}
