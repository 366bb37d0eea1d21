//! Idempotent Postgres schema bootstrap.

/// Applied with `sqlx::raw_sql` at startup; every statement is `IF NOT EXISTS`.
pub(super) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stores (
    id          UUID PRIMARY KEY,
    seller_id   UUID NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    description TEXT,
    logo_url    TEXT,
    banner_url  TEXT,
    visibility  TEXT NOT NULL,
    status      TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id          UUID PRIMARY KEY,
    store_id    UUID NOT NULL REFERENCES stores (id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    description TEXT,
    price       DOUBLE PRECISION NOT NULL CHECK (price >= 0),
    images      TEXT[] NOT NULL DEFAULT '{}',
    status      TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS products_store_idx ON products (store_id, created_at DESC);

CREATE TABLE IF NOT EXISTS social_accounts (
    id           UUID PRIMARY KEY,
    store_id     UUID NOT NULL REFERENCES stores (id) ON DELETE CASCADE,
    platform     TEXT NOT NULL,
    account_name TEXT NOT NULL,
    profile_url  TEXT,
    connected_at TIMESTAMPTZ NOT NULL,
    UNIQUE (store_id, platform)
);

CREATE TABLE IF NOT EXISTS reviews (
    id              UUID PRIMARY KEY,
    product_id      UUID NOT NULL,
    seller_id       UUID NOT NULL,
    buyer_id        UUID NOT NULL,
    rating          SMALLINT NOT NULL CHECK (rating BETWEEN 1 AND 5),
    title           TEXT,
    comment         TEXT,
    status          TEXT NOT NULL,
    seller_response TEXT,
    responded_at    TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL,
    updated_at      TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS reviews_seller_idx ON reviews (seller_id, created_at DESC);

CREATE TABLE IF NOT EXISTS product_questions (
    id          UUID PRIMARY KEY,
    product_id  UUID NOT NULL,
    asker_id    UUID NOT NULL,
    question    TEXT NOT NULL,
    answer      TEXT,
    answered_at TIMESTAMPTZ,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS review_requests (
    id             UUID PRIMARY KEY,
    seller_id      UUID NOT NULL,
    transaction_id UUID NOT NULL UNIQUE,
    buyer_id       UUID NOT NULL,
    product_id     UUID NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS review_auto_request_configs (
    seller_id  UUID PRIMARY KEY,
    enabled    BOOLEAN NOT NULL,
    delay_days INTEGER NOT NULL CHECK (delay_days BETWEEN 0 AND 90),
    message    TEXT,
    updated_at TIMESTAMPTZ
);

CREATE TABLE IF NOT EXISTS chat_conversations (
    id              UUID PRIMARY KEY,
    seller_id       UUID NOT NULL,
    customer_id     UUID NOT NULL,
    subject         TEXT,
    last_message_at TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_messages (
    id              UUID PRIMARY KEY,
    conversation_id UUID NOT NULL REFERENCES chat_conversations (id) ON DELETE CASCADE,
    sender_id       UUID NOT NULL,
    content         TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS support_tickets (
    id         UUID PRIMARY KEY,
    user_id    UUID NOT NULL,
    subject    TEXT NOT NULL,
    category   TEXT,
    priority   TEXT NOT NULL,
    status     TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS support_messages (
    id         UUID PRIMARY KEY,
    ticket_id  UUID NOT NULL REFERENCES support_tickets (id) ON DELETE CASCADE,
    sender_id  UUID NOT NULL,
    message    TEXT NOT NULL,
    is_staff   BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id            UUID PRIMARY KEY,
    seller_id     UUID NOT NULL,
    buyer_id      UUID NOT NULL,
    product_id    UUID,
    amount        DOUBLE PRECISION NOT NULL,
    seller_payout DOUBLE PRECISION,
    platform_fee  DOUBLE PRECISION,
    status        TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS transactions_seller_idx ON transactions (seller_id, created_at);

CREATE TABLE IF NOT EXISTS seller_expenses (
    id           UUID PRIMARY KEY,
    seller_id    UUID NOT NULL,
    amount       DOUBLE PRECISION NOT NULL CHECK (amount > 0),
    category     TEXT NOT NULL,
    description  TEXT,
    expense_date DATE NOT NULL,
    status       TEXT NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL,
    updated_at   TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS seller_expenses_seller_idx ON seller_expenses (seller_id, status, expense_date DESC);
"#;
