//! Crossover context database schema.
//!
//! Mirrors the workspace `migrations/` directory for tools that create
//! the tables directly.

/// SQL to create the crossover tables.
pub const CREATE_CROSSOVER_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS crossover_requests (
    id                      UUID PRIMARY KEY,
    requester_id            UUID NOT NULL,
    target_user_id          UUID NOT NULL,
    requester_mythology_id  UUID NOT NULL,
    target_mythology_id     UUID NOT NULL,
    request_type            VARCHAR(32) NOT NULL,
    status                  VARCHAR(32) NOT NULL DEFAULT 'pending',
    response_message        TEXT,
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    responded_at            TIMESTAMPTZ,
    completed_at            TIMESTAMPTZ,
    CHECK (requester_id <> target_user_id),
    CHECK (requester_mythology_id <> target_mythology_id)
);

CREATE INDEX IF NOT EXISTS idx_crossover_requests_target
    ON crossover_requests (target_user_id, created_at);

CREATE INDEX IF NOT EXISTS idx_crossover_requests_requester
    ON crossover_requests (requester_id, created_at);

CREATE TABLE IF NOT EXISTS mythology_alliances (
    id                      UUID PRIMARY KEY,
    mythology1_id           UUID NOT NULL,
    mythology2_id           UUID NOT NULL,
    relationship_type       VARCHAR(32) NOT NULL,
    is_active               BOOLEAN NOT NULL DEFAULT TRUE,
    formed_from_request_id  UUID NOT NULL,
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (mythology1_id, mythology2_id),
    CHECK (mythology1_id <= mythology2_id)
);

CREATE TABLE IF NOT EXISTS crossover_stories (
    id             UUID PRIMARY KEY,
    title          VARCHAR(255) NOT NULL,
    story_type     VARCHAR(32) NOT NULL,
    status         VARCHAR(32) NOT NULL,
    mythology1_id  UUID NOT NULL,
    mythology2_id  UUID NOT NULL,
    author1_id     UUID NOT NULL,
    author2_id     UUID NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_crossover_stories_mythologies
    ON crossover_stories (mythology1_id, mythology2_id);
";
