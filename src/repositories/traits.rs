//! Common repository traits
//!
//! Generic interfaces for database operations. Repositories implement
//! the subset that makes sense for their aggregate; append-only stores
//! have no Update/Delete.

/// Trait for creating new entities in the database
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with id assigned by the database)
/// * `CreateDTO` - DTO for creation (without generated fields)
pub trait Create<Entity, CreateDTO> {
    /// Creates a new entity and returns it with its assigned id.
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for reading a single entity by primary key
///
/// # Type Parameters
/// * `Entity` - Type of the entity to read
/// * `Id` - Type of the primary key (e.g. `String`, `(String, String)`)
pub trait Read<Entity, Id> {
    /// Reads an entity by primary key; `Ok(None)` when absent.
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Trait for updating existing entities
///
/// # Type Parameters
/// * `Entity` - Type of the updated entity
/// * `UpdateDTO` - DTO for updating (optional fields for partial updates)
/// * `Id` - Type of the primary key
pub trait Update<Entity, UpdateDTO, Id> {
    /// Applies the `Some(_)` fields of `data` and returns the updated
    /// entity. Errors with `RowNotFound` if the entity does not exist.
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for deleting entities
///
/// # Type Parameters
/// * `Id` - Type of the primary key
pub trait Delete<Id> {
    /// Deletes an entity; deleting an absent entity is not an error.
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
