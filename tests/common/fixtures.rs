//! Owner fixtures and database helpers

use petclinic::{Database, NewOwner};
use tempfile::TempDir;

/// The classic sample owners as (first, last, address, city, telephone)
pub const SAMPLE_OWNERS: &[(&str, &str, &str, &str, &str)] = &[
    ("George", "Franklin", "110 W. Liberty St.", "Madison", "6085551023"),
    ("Betty", "Davis", "638 Cardinal Ave.", "Sun Prairie", "6085551749"),
    ("Eduardo", "Rodriquez", "2693 Commerce St.", "McFarland", "6085558763"),
    ("Harold", "Davis", "563 Friendly St.", "Windsor", "6085553198"),
    ("Peter", "McTavish", "2387 S. Fair Way", "Madison", "6085552765"),
    ("Jean", "Coleman", "105 N. Lake St.", "Monona", "6085552654"),
    ("Jeff", "Black", "1450 Oak Blvd.", "Monona", "6085555387"),
    ("Maria", "Escobito", "345 Maple St.", "Madison", "6085557683"),
    ("David", "Schroeder", "2749 Blackhawk Trail", "Madison", "6085559435"),
    ("Carlos", "Estaban", "2335 Independence La.", "Waunakee", "6085555487"),
];

/// Open a fresh database inside a temp directory
pub async fn open_database() -> (Database, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db = Database::new(&temp_dir.path().join("petclinic.db"))
        .await
        .unwrap();
    (db, temp_dir)
}

/// Insert every sample owner, returning their IDs in insertion order
pub async fn seed_sample_owners(db: &Database) -> Vec<i64> {
    let mut ids = Vec::with_capacity(SAMPLE_OWNERS.len());
    for (first, last, address, city, telephone) in SAMPLE_OWNERS {
        let id = db
            .insert_owner(&NewOwner {
                first_name: first.to_string(),
                last_name: last.to_string(),
                address: Some(address.to_string()),
                city: Some(city.to_string()),
                telephone: Some(telephone.to_string()),
            })
            .await
            .unwrap();
        ids.push(id);
    }
    ids
}

/// Insert `count` generated owners sharing the last name `last`
///
/// One set-based statement, so thousands of rows stay fast. The case-folded
/// search columns are filled the same way the registry fills them.
pub async fn seed_generated_owners(db: &Database, last: &str, count: usize) {
    if count == 0 {
        return;
    }
    sqlx::query(
        r#"
        WITH RECURSIVE seq(i) AS (
            SELECT 0
            UNION ALL
            SELECT i + 1 FROM seq WHERE i + 1 < ?
        )
        INSERT INTO owners (
            first_name, last_name, address, city, telephone,
            first_name_lc, last_name_lc, city_lc
        )
        SELECT 'Owner' || i, ?, i || ' Test Road', 'Testville', printf('%010d', i),
               'owner' || i, ?, 'testville'
        FROM seq
        "#,
    )
    .bind(count as i64)
    .bind(last)
    .bind(last.to_lowercase())
    .execute(db.pool())
    .await
    .unwrap();
}
