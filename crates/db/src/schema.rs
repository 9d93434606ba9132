use eyre::{Result, WrapErr};
use sqlx::{Pool, Postgres};
use tracing::info;

const STATEMENTS: &[&str] = &[
    // Coordination schedules, soft-deleted through status
    r#"
    CREATE TABLE IF NOT EXISTS schedules (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        title VARCHAR(255) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        event_id UUID NULL,
        public_token VARCHAR(64) NOT NULL UNIQUE,
        status VARCHAR(16) NOT NULL,
        deadline TIMESTAMP WITH TIME ZONE NULL,
        decided_candidate_id UUID NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_schedule_status CHECK (status IN ('open', 'closed', 'decided', 'deleted'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS candidate_dates (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        schedule_id UUID NOT NULL REFERENCES schedules(id),
        date DATE NOT NULL,
        start_time TIME NULL,
        end_time TIME NULL,
        display_order INTEGER NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS schedule_group_assignments (
        tenant_id UUID NOT NULL,
        schedule_id UUID NOT NULL REFERENCES schedules(id),
        group_id UUID NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        PRIMARY KEY (schedule_id, group_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS schedule_responses (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        schedule_id UUID NOT NULL REFERENCES schedules(id),
        member_id UUID NOT NULL,
        candidate_id UUID NOT NULL REFERENCES candidate_dates(id) ON DELETE CASCADE,
        availability VARCHAR(16) NOT NULL,
        note TEXT NOT NULL DEFAULT '',
        responded_at TIMESTAMP WITH TIME ZONE NOT NULL,
        CONSTRAINT unique_schedule_response UNIQUE (schedule_id, member_id, candidate_id),
        CONSTRAINT valid_availability CHECK (availability IN ('available', 'unavailable', 'maybe'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance_collections (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        title VARCHAR(255) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        target_type VARCHAR(16) NOT NULL,
        target_id UUID NULL,
        public_token VARCHAR(64) NOT NULL UNIQUE,
        deadline TIMESTAMP WITH TIME ZONE NULL,
        status VARCHAR(16) NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_collection_status CHECK (status IN ('open', 'closed'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS target_dates (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        collection_id UUID NOT NULL REFERENCES attendance_collections(id),
        date DATE NOT NULL,
        start_time TIME NULL,
        end_time TIME NULL,
        display_order INTEGER NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collection_group_assignments (
        tenant_id UUID NOT NULL,
        collection_id UUID NOT NULL REFERENCES attendance_collections(id),
        group_id UUID NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        PRIMARY KEY (collection_id, group_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance_responses (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        collection_id UUID NOT NULL REFERENCES attendance_collections(id),
        member_id UUID NOT NULL,
        target_date_id UUID NOT NULL REFERENCES target_dates(id) ON DELETE CASCADE,
        response VARCHAR(16) NOT NULL,
        note TEXT NOT NULL DEFAULT '',
        available_from TIME NULL,
        available_to TIME NULL,
        responded_at TIMESTAMP WITH TIME ZONE NOT NULL,
        CONSTRAINT unique_attendance_response UNIQUE (collection_id, member_id, target_date_id),
        CONSTRAINT valid_response CHECK (response IN ('attending', 'absent', 'undecided'))
    );
    "#,
    // Group directory read by conversion
    r#"
    CREATE TABLE IF NOT EXISTS member_group_members (
        tenant_id UUID NOT NULL,
        group_id UUID NOT NULL,
        member_id UUID NOT NULL,
        PRIMARY KEY (group_id, member_id)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_schedules_tenant_id ON schedules(tenant_id);",
    "CREATE INDEX IF NOT EXISTS idx_candidate_dates_schedule_id ON candidate_dates(schedule_id);",
    "CREATE INDEX IF NOT EXISTS idx_schedule_responses_schedule_id ON schedule_responses(schedule_id);",
    "CREATE INDEX IF NOT EXISTS idx_schedule_responses_candidate_id ON schedule_responses(candidate_id);",
    "CREATE INDEX IF NOT EXISTS idx_target_dates_collection_id ON target_dates(collection_id);",
    "CREATE INDEX IF NOT EXISTS idx_attendance_responses_collection_id ON attendance_responses(collection_id);",
    "CREATE INDEX IF NOT EXISTS idx_member_group_members_tenant_group ON member_group_members(tenant_id, group_id);",
];

/// Creates every table and index that does not exist yet.
pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .wrap_err("Failed to apply schema statement")?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
