mod store_entity;

use proc_macro::TokenStream;

/// Derive macro for the `StoreEntity` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, StoreEntity)]
/// #[entity(kind = "comment")]
/// struct Comment {
///     #[entity(id)]
///     pub id: EntityId,
///     pub content: serde_json::Value,
/// }
/// ```
///
/// - `#[entity(kind = "...")]` names the entity kind used in log fields.
///   If omitted, defaults to the snake_case struct name.
/// - `#[entity(id)]` marks the `EntityId` field that identifies the entity.
///   If omitted, defaults to a field named `id`.
#[proc_macro_derive(StoreEntity, attributes(entity))]
pub fn derive_store_entity(input: TokenStream) -> TokenStream {
    store_entity::derive_store_entity(input)
}
