use crate::{result::MutationResultList, CoreResult};
use async_trait::async_trait;
use content_value::ContentValue;
use query_structure::{DataInput, Entity, Relation, UniqueWhere};

/// Row level writes and lookups the relation input processors are built on.
///
/// Writes report their outcome as results. An `Err` is reserved for failures the caller cannot
/// recover from; classifiable database errors are turned into results further up.
#[async_trait]
pub trait Mapper: Send + Sync {
    /// Inserts a row together with its nested relation inputs. The create result comes first.
    async fn insert(&self, entity: &Entity, data: &DataInput) -> CoreResult<MutationResultList>;

    async fn update(&self, entity: &Entity, by: &UniqueWhere, data: &DataInput) -> CoreResult<MutationResultList>;

    async fn delete(&self, entity: &Entity, by: &UniqueWhere) -> CoreResult<MutationResultList>;

    /// Current value of a column or of the joining column of an owning relation.
    /// `None` when the row does not exist or the value is null.
    async fn select_field(&self, entity: &Entity, by: &UniqueWhere, field: &str) -> CoreResult<Option<ContentValue>>;

    async fn get_primary_value(&self, entity: &Entity, by: &UniqueWhere) -> CoreResult<Option<ContentValue>>;

    /// Links two rows through the junction table of the owning many-to-many `relation`.
    async fn connect_junction(
        &self,
        owner: &Entity,
        relation: &Relation,
        owner_primary: &ContentValue,
        inversed_primary: &ContentValue,
    ) -> CoreResult<MutationResultList>;

    async fn disconnect_junction(
        &self,
        owner: &Entity,
        relation: &Relation,
        owner_primary: &ContentValue,
        inversed_primary: &ContentValue,
    ) -> CoreResult<MutationResultList>;
}
