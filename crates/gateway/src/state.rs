use std::sync::Arc;

use {crate::services::GatewayServices, petrel_config::PetrelConfig};

/// Shared app state. Cheap to clone; nothing in here is mutable. Each
/// request constructs and discards everything it needs.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PetrelConfig>,
    pub services: GatewayServices,
}
