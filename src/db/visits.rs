//! Pet types, pets, visits and the upcoming-visits schedule.

use crate::types::{Pet, PetType, UpcomingVisit, UpcomingVisitFilter, Visit};
use crate::{Error, Result};

use super::{Database, NewPet, NewVisit, fold_case, like_contains};

impl Database {
    /// All pet types, alphabetically
    pub async fn list_pet_types(&self) -> Result<Vec<PetType>> {
        sqlx::query_as::<_, PetType>("SELECT id, name FROM pet_types ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Sqlx)
    }

    /// Insert a pet for an existing owner, returning its ID
    ///
    /// Fails with [`Error::Validation`] when the pet type is not known.
    pub async fn insert_pet(&self, owner_id: i64, pet: &NewPet) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO pets (owner_id, type_id, name, birth_date)
            SELECT ?, id, ?, ?
            FROM pet_types
            WHERE name = ?
            "#,
        )
        .bind(owner_id)
        .bind(&pet.name)
        .bind(pet.birth_date)
        .bind(&pet.pet_type)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(Error::Validation(format!(
                "unknown pet type: {}",
                pet.pet_type
            )));
        }

        Ok(result.last_insert_rowid())
    }

    /// Pets of one owner, in the order they were added
    pub async fn list_pets(&self, owner_id: i64) -> Result<Vec<Pet>> {
        sqlx::query_as::<_, Pet>(
            r#"
            SELECT p.id, p.owner_id, p.name, p.birth_date, t.name AS pet_type
            FROM pets p
            JOIN pet_types t ON t.id = p.type_id
            WHERE p.owner_id = ?
            ORDER BY p.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// A pet, but only if it belongs to the given owner
    pub async fn get_pet(&self, owner_id: i64, pet_id: i64) -> Result<Option<Pet>> {
        sqlx::query_as::<_, Pet>(
            r#"
            SELECT p.id, p.owner_id, p.name, p.birth_date, t.name AS pet_type
            FROM pets p
            JOIN pet_types t ON t.id = p.type_id
            WHERE p.owner_id = ? AND p.id = ?
            "#,
        )
        .bind(owner_id)
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Insert a visit for an existing pet, returning its ID
    pub async fn insert_visit(&self, pet_id: i64, visit: &NewVisit) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO visits (pet_id, visit_date, description) VALUES (?, ?, ?)",
        )
        .bind(pet_id)
        .bind(visit.date)
        .bind(&visit.description)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(result.last_insert_rowid())
    }

    /// Visits of one pet, oldest first
    pub async fn list_visits(&self, pet_id: i64) -> Result<Vec<Visit>> {
        sqlx::query_as::<_, Visit>(
            r#"
            SELECT id, pet_id, visit_date AS date, description
            FROM visits
            WHERE pet_id = ?
            ORDER BY visit_date, id
            "#,
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Visits on or after `filter.from`, earliest first, joined with pet and owner
    ///
    /// `to` bounds the range inclusively. The pet type must match exactly and
    /// the owner's last name must contain the fragment, both ignoring case.
    pub async fn find_upcoming_visits(
        &self,
        filter: &UpcomingVisitFilter,
    ) -> Result<Vec<UpcomingVisit>> {
        let pet_type = filter.pet_type.as_deref().map(fold_case);
        let owner_last_name = filter
            .owner_last_name
            .as_deref()
            .map(|name| like_contains(&fold_case(name)));

        sqlx::query_as::<_, UpcomingVisit>(
            r#"
            SELECT v.id AS visit_id, v.visit_date AS date, v.description,
                   p.id AS pet_id, p.name AS pet_name, t.name AS pet_type,
                   o.id AS owner_id, o.first_name AS owner_first_name,
                   o.last_name AS owner_last_name
            FROM visits v
            JOIN pets p ON p.id = v.pet_id
            JOIN pet_types t ON t.id = p.type_id
            JOIN owners o ON o.id = p.owner_id
            WHERE v.visit_date >= ?
              AND (? IS NULL OR v.visit_date <= ?)
              AND (? IS NULL OR t.name = ?)
              AND (? IS NULL OR o.last_name_lc LIKE ? ESCAPE '\')
            ORDER BY v.visit_date, v.id
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.to)
        .bind(&pet_type)
        .bind(&pet_type)
        .bind(&owner_last_name)
        .bind(&owner_last_name)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }
}
