use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use domain::DomainError;
use domain::transport::{Notification, NotificationKind, TransportValue};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::context::BridgeContext;
use crate::discovery::DiscoveryPipeline;
use crate::lifecycle::DeviceLifecycleManager;
use crate::router::{UpdateRoute, ValueUpdateRouter};

/// What to do with a notification kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    DiscoverValue,
    UpdateValue,
    DiscoverNode,
    UpdateNode,
    RemoveNode,
    DiscoverController,
    NodeStatus,
    ControllerCommand,
    Groups,
    DriverFailed,
    Ignore,
}

/// The fixed notification kind to handler table
pub fn dispatch_table() -> HashMap<NotificationKind, Handler> {
    use NotificationKind as K;

    let mut table: HashMap<NotificationKind, Handler> = NotificationKind::ALL
        .into_iter()
        .map(|kind| (kind, Handler::Ignore))
        .collect();

    let entries = [
        (K::ValueAdded, Handler::DiscoverValue),
        (K::ValueChanged, Handler::UpdateValue),
        (K::ValueRefreshed, Handler::UpdateValue),
        (K::ButtonOn, Handler::UpdateValue),
        (K::ButtonOff, Handler::UpdateValue),
        (K::NodeNew, Handler::DiscoverNode),
        (K::NodeAdded, Handler::DiscoverNode),
        (K::NodeProtocolInfo, Handler::DiscoverNode),
        (K::NodeQueriesComplete, Handler::DiscoverNode),
        (K::CreateButton, Handler::DiscoverNode),
        (K::NodeNaming, Handler::UpdateNode),
        (K::NodeRemoved, Handler::RemoveNode),
        (K::DeleteButton, Handler::RemoveNode),
        (K::DriverReady, Handler::DiscoverController),
        (K::AwakeNodesQueried, Handler::DiscoverController),
        (K::AllNodesQueried, Handler::DiscoverController),
        (K::AllNodesQueriedSomeDead, Handler::DiscoverController),
        (K::Notification, Handler::NodeStatus),
        (K::ControllerCommand, Handler::ControllerCommand),
        (K::Group, Handler::Groups),
        (K::DriverFailed, Handler::DriverFailed),
    ];
    table.extend(entries);
    table
}

/// Single consumer of the controller notification stream.
///
/// Failures are logged where they happen and never leave the loop.
pub struct NotificationDispatcher {
    table: HashMap<NotificationKind, Handler>,
    ignore_labels: HashSet<String>,
    discovery: DiscoveryPipeline,
    router: ValueUpdateRouter,
    lifecycle: DeviceLifecycleManager,
}

impl NotificationDispatcher {
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        let router = ValueUpdateRouter::new(ctx.clone());
        Self {
            table: dispatch_table(),
            ignore_labels: ctx.options.ignore_labels.iter().cloned().collect(),
            discovery: DiscoveryPipeline::new(ctx.clone(), router.clone()),
            router,
            lifecycle: DeviceLifecycleManager::new(ctx),
        }
    }

    pub fn handler_for(&self, kind: NotificationKind) -> Handler {
        self.table.get(&kind).copied().unwrap_or(Handler::Ignore)
    }

    /// Consume notifications in order until cancelled or the stream ends
    pub async fn run(
        self,
        mut notifications: mpsc::UnboundedReceiver<Notification>,
        cancel: CancellationToken,
    ) {
        info!("Notification dispatcher started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
                received = notifications.recv() => match received {
                    Some(notification) => {
                        self.dispatch(notification).await;
                    }
                    None => {
                        warn!("Notification stream closed");
                        break;
                    }
                }
            }
        }
    }

    /// Handles one notification. Returns the handler that ran.
    pub async fn dispatch(&self, notification: Notification) -> Handler {
        if let Some(label) = notification.label() {
            if self.ignore_labels.contains(label) {
                debug!(kind = %notification.kind, label = %label, "Ignored label");
                return Handler::Ignore;
            }
        }

        let handler = self.handler_for(notification.kind);
        if let Err(e) = self.execute(handler, &notification).await {
            match e {
                DomainError::UnclassifiedIdentifier(_) => debug!(
                    kind = %notification.kind,
                    node_id = notification.node_id,
                    error = %e,
                    "Notification dropped"
                ),
                _ => error!(
                    kind = %notification.kind,
                    node_id = notification.node_id,
                    handler = ?handler,
                    error = %e,
                    "Notification handling failed"
                ),
            }
        }
        handler
    }

    async fn execute(&self, handler: Handler, n: &Notification) -> Result<(), DomainError> {
        match handler {
            Handler::DiscoverValue => {
                let value = expect_value(n)?;
                self.discovery.discover(value).await.map(|_| ())
            }
            Handler::UpdateValue => {
                let Some(value) = n.value.as_ref() else {
                    debug!(kind = %n.kind, node_id = n.node_id, "Update without a value ignored");
                    return Ok(());
                };
                match self.router.route(value).await? {
                    UpdateRoute::Dropped => Err(DomainError::UnclassifiedIdentifier(value.id)),
                    _ => Ok(()),
                }
            }
            Handler::DiscoverNode => self
                .lifecycle
                .discover_node(n.home_id, n.node_id)
                .await
                .map(|_| ()),
            Handler::UpdateNode => self.lifecycle.update_node(n.home_id, n.node_id).await,
            Handler::RemoveNode => self.lifecycle.remove_node(n.node_id).await,
            Handler::DiscoverController => {
                self.lifecycle
                    .discover_controller(n.home_id, n.node_id)
                    .await
            }
            Handler::NodeStatus => match n.code {
                Some(code) => self.lifecycle.apply_code(n.node_id, code).await.map(|_| ()),
                None => Ok(()),
            },
            Handler::ControllerCommand => {
                self.lifecycle
                    .controller_command(n.node_id, n.code)
                    .await
            }
            Handler::Groups => self.lifecycle.update_groups(n.home_id, n.node_id).await,
            Handler::DriverFailed => {
                error!(home_id = n.home_id, "Controller driver failed");
                Ok(())
            }
            Handler::Ignore => {
                debug!(kind = %n.kind, node_id = n.node_id, "Notification ignored");
                Ok(())
            }
        }
    }
}

fn expect_value(n: &Notification) -> Result<&TransportValue, DomainError> {
    n.value.as_ref().ok_or_else(|| {
        DomainError::DriverError(format!("{} notification without a value", n.kind))
    })
}
