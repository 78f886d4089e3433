//! A small seeded inventory shared by the integration tests.
//!
//! ```text
//! entity 1: Room A (10) > Shelf A1 (11) > Box A1a (12)
//! entity 2: Room B (20)
//!
//! product  name          classes      storages
//! 1        ACETONE       ketone       100 (Room A, borrowed by 42), 101 (Shelf A1), 102 (Box A1a)
//! 2        BENZENE       aromatic     103 (Room B)
//! 3        ETHANOL       alcohol      104 (Box A1a, archived)
//! 4        TOLUENE       aromatic     105 (Shelf A1, to destroy)
//! 5        BENZOATE      aromatic, ketone
//! 6        SECRETOL                   restricted
//! 7        AMINOBENZENE  aromatic
//! ```
#![allow(dead_code)]

use std::sync::Arc;

use chemcat_catalog::backends::sqlite::SqliteBackend;
use chemcat_catalog::caller::{CallerContext, Permission};
use chemcat_catalog::search::{InMemorySessionStore, SearchEngine, SearchSettings};
use chemcat_catalog::types::{RawRequest, ResultPage, SearchOutcome};

/// The engine type exercised by the tests.
pub type TestEngine = SearchEngine<SqliteBackend, InMemorySessionStore>;

const SEED: &str = "
INSERT INTO entity (id, role) VALUES (1, 'lab'), (2, 'lab');

INSERT INTO store_location (id, label, entity, parent) VALUES
    (10, 'Room A', 1, NULL),
    (11, 'Shelf A1', 1, 10),
    (12, 'Box A1a', 1, 11),
    (20, 'Room B', 2, NULL);

INSERT INTO name (id, label, label_nost) VALUES
    (1, 'ACETONE', 'ACETONE'),
    (2, 'BENZENE', 'BENZENE'),
    (3, 'ETHANOL', 'ETHANOL'),
    (4, 'TOLUENE', 'TOLUENE'),
    (5, 'BENZOATE', 'BENZOATE'),
    (6, 'PROPANONE', 'PROPANONE'),
    (7, 'SECRETOL', 'SECRETOL'),
    (8, 'AMINOBENZENE', 'AMINOBENZENE');

INSERT INTO class_of_compounds (id, label) VALUES
    (1, 'ketone'), (2, 'aromatic'), (3, 'alcohol');

INSERT INTO product (id, name, restricted_access, creation_datetime, cas_number, is_cmr) VALUES
    (1, 1, 0, '2023-05-01 10:00:00', '67-64-1', 0),
    (2, 2, 0, '2023-05-01 10:00:00', '71-43-2', 1),
    (3, 3, 0, '2024-03-01 09:00:00', '64-17-5', 0),
    (4, 4, 0, '2024-03-01 09:00:00', '108-88-3', 1),
    (5, 5, 0, '2024-03-01 09:00:00', NULL, 0),
    (6, 7, 1, '2024-03-01 09:00:00', NULL, 0),
    (7, 8, 0, '2023-05-01 10:00:00', NULL, 0);

INSERT INTO product_synonym (product_id, value_id) VALUES (1, 6);

INSERT INTO product_class_of_compounds (product_id, value_id) VALUES
    (1, 1), (2, 2), (3, 3), (4, 2), (5, 2), (5, 1), (7, 2);

INSERT INTO storage (id, product, store_location, barecode, archive, to_destroy, entry_datetime) VALUES
    (100, 1, 10, 'A-100', 0, 0, '2024-01-10 08:00:00'),
    (101, 1, 11, 'A-101', 0, 0, '2024-01-11 08:00:00'),
    (102, 1, 12, 'A-102', 0, 0, '2024-01-12 08:00:00'),
    (103, 2, 20, 'B-103', 0, 0, '2024-01-13 08:00:00'),
    (104, 3, 12, 'A-104', 1, 0, '2024-01-14 08:00:00'),
    (105, 4, 11, 'A-105', 0, 1, '2024-01-15 08:00:00');

INSERT INTO borrow (id, storage, borrower, person) VALUES (500, 100, 42, 7);

INSERT INTO bookmark (id, product, person) VALUES (1, 3, 7), (2, 4, 99);
";

/// Creates a seeded in-memory backend.
pub fn create_backend() -> SqliteBackend {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to initialize schema");
    backend.execute_batch(SEED).expect("Failed to seed catalog");
    backend
}

/// Creates an engine over the seeded backend with default settings.
pub fn create_engine() -> TestEngine {
    SearchEngine::new(
        Arc::new(create_backend()),
        Arc::new(InMemorySessionStore::new()),
        SearchSettings::default(),
    )
}

/// A member of entity 1 allowed to filter by entity and store location.
pub fn member() -> CallerContext {
    CallerContext::builder(7)
        .entities(vec![1])
        .permission(Permission::SelectSc)
        .permission(Permission::ReadSc)
        .build()
}

/// A caller with no permissions at all.
pub fn visitor() -> CallerContext {
    CallerContext::builder(8).entities(vec![2]).build()
}

/// Builds a request from key/value pairs.
pub fn request(pairs: &[(&str, &str)]) -> RawRequest {
    RawRequest::from_pairs(pairs.iter().copied())
}

/// Unwraps a page outcome.
pub fn expect_page(outcome: SearchOutcome) -> ResultPage {
    match outcome {
        SearchOutcome::Page(page) => page,
        SearchOutcome::Export(_) => panic!("expected a result page, got an export"),
    }
}

/// Product ids of a page, in row order.
pub fn product_ids(page: &ResultPage) -> Vec<i64> {
    column_ints(page, "product.id")
}

/// Integer values of `column`, in row order.
pub fn column_ints(page: &ResultPage, column: &str) -> Vec<i64> {
    page.rows
        .iter()
        .map(|row| {
            row.get(column)
                .and_then(|v| v.as_i64())
                .unwrap_or_else(|| panic!("row has no integer {}", column))
        })
        .collect()
}

/// Name labels of a page, in row order.
pub fn labels(page: &ResultPage) -> Vec<String> {
    page.rows
        .iter()
        .map(|row| {
            row.get("name.label_nost")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}
