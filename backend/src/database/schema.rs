//! Schema bootstrap for the environment-prefixed tables.
//!
//! Table names depend on the runtime environment, so the DDL is rendered at
//! startup instead of living in static migration files. Every statement is
//! idempotent (`IF NOT EXISTS`).

use super::DatabaseError;
use crate::store::{Table, TableNames};
use sqlx::PgPool;
use tracing::{debug, info};

/// DDL statements for one table, in execution order
pub fn table_statements(table: Table, names: &TableNames) -> Vec<String> {
    let t = names.get(table);
    let users = names.get(Table::Users);
    let groups = names.get(Table::Groups);
    let expenses = names.get(Table::Expenses);

    match table {
        Table::Users => vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS "{t}" (
                    id UUID PRIMARY KEY,
                    email VARCHAR(254) NOT NULL UNIQUE,
                    firebase_id VARCHAR(255) NOT NULL UNIQUE,
                    name VARCHAR(255),
                    credit_score INTEGER CHECK (credit_score BETWEEN 300 AND 850),
                    date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )"#
            ),
        ],
        Table::Groups => vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS "{t}" (
                    id UUID PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    description TEXT,
                    created_by UUID NOT NULL REFERENCES "{users}"(id) ON DELETE CASCADE,
                    total_budget NUMERIC(14, 2),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )"#
            ),
            format!(r#"CREATE INDEX IF NOT EXISTS "{t}_created_by_idx" ON "{t}"(created_by)"#),
        ],
        Table::GroupMemberships => vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS "{t}" (
                    group_id UUID NOT NULL REFERENCES "{groups}"(id) ON DELETE CASCADE,
                    user_id UUID NOT NULL REFERENCES "{users}"(id) ON DELETE CASCADE,
                    joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    PRIMARY KEY (group_id, user_id)
                )"#
            ),
            format!(r#"CREATE INDEX IF NOT EXISTS "{t}_user_id_idx" ON "{t}"(user_id)"#),
        ],
        Table::Expenses => vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS "{t}" (
                    id UUID PRIMARY KEY,
                    title VARCHAR(255) NOT NULL,
                    total_amount NUMERIC(14, 2) NOT NULL CHECK (total_amount > 0),
                    created_by UUID NOT NULL REFERENCES "{users}"(id) ON DELETE CASCADE,
                    group_id UUID REFERENCES "{groups}"(id) ON DELETE SET NULL,
                    due_date TIMESTAMPTZ,
                    category VARCHAR(64),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )"#
            ),
            format!(r#"CREATE INDEX IF NOT EXISTS "{t}_created_by_idx" ON "{t}"(created_by)"#),
            format!(r#"CREATE INDEX IF NOT EXISTS "{t}_group_id_idx" ON "{t}"(group_id)"#),
        ],
        Table::Splits => vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS "{t}" (
                    id UUID PRIMARY KEY,
                    expense_id UUID NOT NULL REFERENCES "{expenses}"(id) ON DELETE CASCADE,
                    user_id UUID NOT NULL REFERENCES "{users}"(id) ON DELETE CASCADE,
                    amount_owed NUMERIC(14, 2) NOT NULL CHECK (amount_owed >= 0),
                    paid_request TIMESTAMPTZ,
                    paid_confirmed TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )"#
            ),
            format!(r#"CREATE INDEX IF NOT EXISTS "{t}_expense_id_idx" ON "{t}"(expense_id)"#),
            format!(r#"CREATE INDEX IF NOT EXISTS "{t}_user_id_idx" ON "{t}"(user_id)"#),
        ],
        Table::FriendRequests => vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS "{t}" (
                    id UUID PRIMARY KEY,
                    from_user UUID NOT NULL REFERENCES "{users}"(id) ON DELETE CASCADE,
                    to_user UUID NOT NULL REFERENCES "{users}"(id) ON DELETE CASCADE,
                    request_completed BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (from_user, to_user),
                    CHECK (from_user <> to_user)
                )"#
            ),
            format!(r#"CREATE INDEX IF NOT EXISTS "{t}_to_user_idx" ON "{t}"(to_user)"#),
        ],
        Table::Notifications => vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS "{t}" (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES "{users}"(id) ON DELETE CASCADE,
                    message TEXT NOT NULL,
                    processed BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )"#
            ),
            format!(
                r#"CREATE INDEX IF NOT EXISTS "{t}_unprocessed_idx" ON "{t}"(user_id) WHERE NOT processed"#
            ),
        ],
    }
}

/// Create every table (parents first) if it does not exist yet
pub async fn ensure_schema(pool: &PgPool, names: &TableNames) -> Result<(), DatabaseError> {
    info!(
        "Ensuring schema for environment '{}' (table prefix '{}')",
        names.environment(),
        names.prefix()
    );

    for table in Table::ALL {
        let name = names.get(table);
        for statement in table_statements(table, names) {
            debug!("{}", statement);
            sqlx::query(&statement)
                .execute(pool)
                .await
                .map_err(|source| DatabaseError::Schema {
                    table: name.clone(),
                    source,
                })?;
        }
    }

    info!("Schema ready ({} tables)", Table::ALL.len());
    Ok(())
}
