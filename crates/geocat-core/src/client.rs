use crate::Result;

use serde_json::Value as Json;

/// Transport to the remote catalog service.
///
/// Every method exchanges JSON:API resource objects of the shape
/// `{"type": ..., "id": ..., "attributes": {...}}`. Implementations report
/// transport failures with [`Error::client`](crate::Error::client).
pub trait Client {
    /// Fetches a resource by id. Returns `None` when the service does not
    /// know the id.
    fn get_resource(&self, type_name: &str, id: &str) -> Result<Option<Json>>;

    /// Creates or updates a resource and returns the service's view of it.
    ///
    /// A resource without an `id` is created; otherwise only the attributes
    /// present in the document are updated.
    fn save_resource(&self, type_name: &str, resource: Json) -> Result<Json>;

    /// Deletes a resource. Returns `false` when the service does not know the
    /// id.
    fn delete_resource(&self, type_name: &str, id: &str) -> Result<bool>;
}
