//! SQL schema for the Acta SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS customers (
    customer_id                  TEXT PRIMARY KEY,
    full_name                    TEXT NOT NULL,
    address                      TEXT,
    phone                        TEXT,
    email                        TEXT,
    kind                         TEXT NOT NULL,  -- 'individual' | 'business'
    business_name                TEXT,
    document_id                  TEXT,
    passport_id                  TEXT,
    business_registration_number TEXT,
    created_at                   TEXT NOT NULL,  -- ISO 8601 UTC
    updated_at                   TEXT NOT NULL
);

-- Natural-key uniqueness is a schema constraint, not a caller-side
-- check-then-create. Partial indexes: NULL means 'no key issued'.
CREATE UNIQUE INDEX IF NOT EXISTS customers_document_id_key
    ON customers(document_id) WHERE document_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS customers_passport_id_key
    ON customers(passport_id) WHERE passport_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS customers_business_registration_number_key
    ON customers(business_registration_number)
    WHERE business_registration_number IS NOT NULL;

CREATE TABLE IF NOT EXISTS documents (
    document_id      TEXT PRIMARY KEY,
    transaction_code TEXT NOT NULL,
    secretary        TEXT,
    notary_public    TEXT,
    document_type    TEXT,
    description      TEXT,
    created_date     TEXT NOT NULL,  -- business date, 'YYYY-MM-DD'
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS documents_transaction_code_key
    ON documents(transaction_code);
CREATE INDEX IF NOT EXISTS documents_created_date_idx
    ON documents(created_date);

-- One edge per (document, customer) pair; role changes are unlink+relink.
CREATE TABLE IF NOT EXISTS party_links (
    document_id      TEXT NOT NULL
        REFERENCES documents(document_id) ON DELETE CASCADE,
    customer_id      TEXT NOT NULL REFERENCES customers(customer_id),
    role             TEXT NOT NULL,  -- 'party_a' | 'party_b' | 'witness'
    signature_status TEXT NOT NULL DEFAULT 'pending',
    notary_date      TEXT NOT NULL,  -- 'YYYY-MM-DD'
    created_at       TEXT NOT NULL,
    PRIMARY KEY (document_id, customer_id)
);

CREATE INDEX IF NOT EXISTS party_links_customer_idx
    ON party_links(customer_id);
CREATE INDEX IF NOT EXISTS party_links_notary_date_idx
    ON party_links(notary_date);

CREATE TABLE IF NOT EXISTS document_files (
    file_id      TEXT PRIMARY KEY,
    document_id  TEXT NOT NULL
        REFERENCES documents(document_id) ON DELETE CASCADE,
    file_name    TEXT NOT NULL,
    file_size    INTEGER NOT NULL,
    content_type TEXT NOT NULL,
    bucket       TEXT NOT NULL,
    object_key   TEXT NOT NULL,
    content_hash TEXT NOT NULL,     -- SHA-256 hex of the bytes
    signature    TEXT,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS document_files_document_idx
    ON document_files(document_id);

PRAGMA user_version = 1;
";
