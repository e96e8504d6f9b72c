//! Owner persistence: CRUD, search, duplicate detection and export queries.

use crate::csv::OwnerRecord;
use crate::export::OwnerSource;
use crate::types::{Owner, OwnerSearch};
use crate::{Error, Result};
use async_trait::async_trait;

use super::{Database, NewOwner, fold_case, like_prefix, map_unique_violation};

fn duplicate_message(owner: &NewOwner) -> String {
    format!(
        "{} {} with telephone {} is already registered",
        owner.first_name,
        owner.last_name,
        owner.telephone.as_deref().unwrap_or("(none)")
    )
}

impl Database {
    /// Insert a new owner, returning its ID
    ///
    /// Fails with [`Error::Duplicate`] when an owner with the same names
    /// (ignoring case) and telephone already exists.
    pub async fn insert_owner(&self, owner: &NewOwner) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO owners (
                first_name, last_name, address, city, telephone,
                first_name_lc, last_name_lc, city_lc
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&owner.first_name)
        .bind(&owner.last_name)
        .bind(&owner.address)
        .bind(&owner.city)
        .bind(&owner.telephone)
        .bind(fold_case(&owner.first_name))
        .bind(fold_case(&owner.last_name))
        .bind(owner.city.as_deref().map(fold_case))
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || duplicate_message(owner)))?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrite every field of an existing owner
    ///
    /// Returns `false` if no owner has the given ID, and [`Error::Duplicate`]
    /// if the new details collide with another owner.
    pub async fn update_owner(&self, id: i64, owner: &NewOwner) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE owners
            SET first_name = ?, last_name = ?, address = ?, city = ?, telephone = ?,
                first_name_lc = ?, last_name_lc = ?, city_lc = ?
            WHERE id = ?
            "#,
        )
        .bind(&owner.first_name)
        .bind(&owner.last_name)
        .bind(&owner.address)
        .bind(&owner.city)
        .bind(&owner.telephone)
        .bind(fold_case(&owner.first_name))
        .bind(fold_case(&owner.last_name))
        .bind(owner.city.as_deref().map(fold_case))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || duplicate_message(owner)))?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a single owner by ID
    pub async fn get_owner(&self, id: i64) -> Result<Option<Owner>> {
        sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, first_name, last_name, address, city, telephone
            FROM owners
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// All owners whose last name starts with `prefix`, ignoring case
    ///
    /// Unpaginated and ordered by ID. An empty prefix returns every owner.
    pub async fn find_owners_by_last_name_prefix(&self, prefix: &str) -> Result<Vec<Owner>> {
        sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, first_name, last_name, address, city, telephone
            FROM owners
            WHERE last_name_lc LIKE ? ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(like_prefix(&fold_case(prefix)))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// One page of owners matching every criterion present in `search`
    ///
    /// - last name: case-insensitive prefix
    /// - telephone: prefix
    /// - city: case-insensitive exact match
    pub async fn search_owners(
        &self,
        search: &OwnerSearch,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Owner>> {
        let last_name = search.last_name.as_deref().map(|n| like_prefix(&fold_case(n)));
        let telephone = search.telephone.as_deref().map(like_prefix);
        let city = search.city.as_deref().map(fold_case);

        sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, first_name, last_name, address, city, telephone
            FROM owners
            WHERE (? IS NULL OR last_name_lc LIKE ? ESCAPE '\')
              AND (? IS NULL OR telephone LIKE ? ESCAPE '\')
              AND (? IS NULL OR city_lc = ?)
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&last_name)
        .bind(&last_name)
        .bind(&telephone)
        .bind(&telephone)
        .bind(&city)
        .bind(&city)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Count owners matching `search`; pairs with [`Database::search_owners`]
    pub async fn count_owners(&self, search: &OwnerSearch) -> Result<i64> {
        let last_name = search.last_name.as_deref().map(|n| like_prefix(&fold_case(n)));
        let telephone = search.telephone.as_deref().map(like_prefix);
        let city = search.city.as_deref().map(fold_case);

        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM owners
            WHERE (? IS NULL OR last_name_lc LIKE ? ESCAPE '\')
              AND (? IS NULL OR telephone LIKE ? ESCAPE '\')
              AND (? IS NULL OR city_lc = ?)
            "#,
        )
        .bind(&last_name)
        .bind(&last_name)
        .bind(&telephone)
        .bind(&telephone)
        .bind(&city)
        .bind(&city)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Owners with the same names (ignoring case) and the exact telephone
    pub async fn find_duplicate_owners(
        &self,
        first_name: &str,
        last_name: &str,
        telephone: &str,
    ) -> Result<Vec<Owner>> {
        sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, first_name, last_name, address, city, telephone
            FROM owners
            WHERE first_name_lc = ?
              AND last_name_lc = ?
              AND telephone = ?
            ORDER BY id
            "#,
        )
        .bind(fold_case(first_name))
        .bind(fold_case(last_name))
        .bind(telephone)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }
}

#[async_trait]
impl OwnerSource for Database {
    async fn fetch_by_last_name_prefix(&self, prefix: &str) -> Result<Vec<OwnerRecord>> {
        let owners = self.find_owners_by_last_name_prefix(prefix).await?;
        Ok(owners.into_iter().map(OwnerRecord::from).collect())
    }
}
