//! Initial database migration.
//!
//! Creates the currencies, groups, users, and user_approvers tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(GROUPS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(USER_APPROVERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r"
            DROP TABLE IF EXISTS user_approvers CASCADE;
            DROP TABLE IF EXISTS users CASCADE;
            DROP TABLE IF EXISTS groups CASCADE;
            DROP TABLE IF EXISTS currencies CASCADE;
            ",
        )
        .await?;

        Ok(())
    }
}

const CURRENCIES_SQL: &str = r"
-- Currencies and their exchange rates against EUR
CREATE TABLE currencies (
    code VARCHAR(3) PRIMARY KEY,
    rate NUMERIC(15,6) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_currency_code CHECK (code = upper(code) AND char_length(code) = 3),
    CONSTRAINT chk_currency_rate_positive CHECK (rate > 0)
);
";

const GROUPS_SQL: &str = r"
CREATE TABLE groups (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    invite_code VARCHAR(64) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    username VARCHAR(150) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    -- RESTRICT: a currency referenced by any user cannot be deleted
    reporting_currency VARCHAR(3) NOT NULL REFERENCES currencies(code) ON DELETE RESTRICT,
    balance_amount NUMERIC(15,2) NOT NULL DEFAULT 0,
    group_id UUID REFERENCES groups(id) ON DELETE SET NULL,
    is_group_admin BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Single-admin invariant: at most one admin per group. Racing admin
-- transfers serialize on this index even across transactions.
CREATE UNIQUE INDEX uq_users_group_admin ON users(group_id) WHERE is_group_admin;

CREATE INDEX idx_users_group ON users(group_id);
";

const USER_APPROVERS_SQL: &str = r"
-- Approver relation: who may authorize requests on a user's behalf
CREATE TABLE user_approvers (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    approver_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, approver_id)
);

-- Reverse lookup for the derived reporters view
CREATE INDEX idx_user_approvers_approver ON user_approvers(approver_id);
";
