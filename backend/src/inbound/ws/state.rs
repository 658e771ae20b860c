//! Shared WebSocket adapter state.
//!
//! Socket handlers depend on domain ports rather than concrete services so
//! sessions can be driven by test doubles.

use std::sync::Arc;

use crate::domain::ports::{AccountQuery, NotificationCommand, NotificationQuery};
use crate::inbound::ws::hub::ConnectionHub;
use crate::inbound::ws::origin::OriginAllowList;

/// Dependency bundle for the `/ws` endpoint and its sessions.
#[derive(Clone)]
pub struct WsState {
    pub accounts: Arc<dyn AccountQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
    pub hub: Arc<ConnectionHub>,
    pub origins: Arc<OriginAllowList>,
}

impl WsState {
    pub fn new(
        accounts: Arc<dyn AccountQuery>,
        notifications: Arc<dyn NotificationCommand>,
        notifications_query: Arc<dyn NotificationQuery>,
        hub: Arc<ConnectionHub>,
        origins: OriginAllowList,
    ) -> Self {
        Self {
            accounts,
            notifications,
            notifications_query,
            hub,
            origins: Arc::new(origins),
        }
    }
}
