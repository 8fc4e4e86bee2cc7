use std::collections::BTreeMap;
use std::sync::Arc;

use domain::registry::{
    ATTR_DESCRIPTION, ATTR_LOCATION_NAME, ATTR_MANUFACTURER, ATTR_MODEL, ATTR_NAME,
    ATTR_SECURITY_NODE, ATTR_SOFTWARE_VERSION, ATTR_TYPE,
};
use domain::transport::{NodeInfo, NotificationCode};
use domain::{DomainError, PointKind, RunState};
use tracing::{debug, info, warn};

use crate::command::ControllerButton;
use crate::context::BridgeContext;

/// Keeps devices and their run state in line with the controller's view
/// of the network.
#[derive(Clone)]
pub struct DeviceLifecycleManager {
    ctx: Arc<BridgeContext>,
}

impl DeviceLifecycleManager {
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        Self { ctx }
    }

    /// Creates the device if needed, refreshes its attributes and derives
    /// its run state from the node interview.
    pub async fn discover_node(&self, home_id: u32, node_id: u8) -> Result<RunState, DomainError> {
        let address = node_id.to_string();
        if self.ctx.registry.get_device(&address).await?.is_none() {
            info!(device = %address, "New node");
            self.ctx.registry.create_device(&address).await?;
        }

        let info = self.refresh_node(home_id, node_id).await?;
        let run_state = RunState::from_node_info(&info);
        self.ctx
            .registry
            .update_status(&address, run_state, None)
            .await?;
        info!(
            device = %address,
            manufacturer = %info.manufacturer,
            model = %info.product_name,
            run_state = %run_state,
            "Node updated"
        );
        Ok(run_state)
    }

    /// Re-reads node attributes, leaving the run state alone
    pub async fn update_node(&self, home_id: u32, node_id: u8) -> Result<(), DomainError> {
        let address = node_id.to_string();
        if self.ctx.registry.get_device(&address).await?.is_none() {
            debug!(device = %address, "Naming update for unknown node ignored");
            return Ok(());
        }
        self.refresh_node(home_id, node_id).await.map(|_| ())
    }

    async fn refresh_node(&self, home_id: u32, node_id: u8) -> Result<NodeInfo, DomainError> {
        let address = node_id.to_string();
        let controller = &self.ctx.controller;
        let info = controller.node_info(home_id, node_id).await?;

        let mut attributes = BTreeMap::from([
            (ATTR_MANUFACTURER.to_string(), info.manufacturer.clone()),
            (ATTR_MODEL.to_string(), info.product_name.clone()),
            (ATTR_NAME.to_string(), info.name.clone()),
            (ATTR_TYPE.to_string(), info.device_type_name.clone()),
            (ATTR_DESCRIPTION.to_string(), info.node_type.clone()),
            (ATTR_SOFTWARE_VERSION.to_string(), controller.version()),
            (ATTR_LOCATION_NAME.to_string(), info.location.clone()),
            (ATTR_SECURITY_NODE.to_string(), info.security_device.to_string()),
        ]);

        if self.ctx.options.include_zw_info {
            let controller_info = controller.controller_info(home_id).await?;
            attributes.extend(zw_node_details(
                &info,
                controller_info.controller_node_id,
                home_id,
                &controller.version(),
            ));
            if let Some(groups) = self.group_attribute(home_id, node_id).await? {
                attributes.insert("zwGroups".to_string(), groups);
            }
        }

        self.ctx
            .registry
            .update_attributes(&address, attributes)
            .await?;
        Ok(info)
    }

    /// Refreshes the association group labels of a node
    pub async fn update_groups(&self, home_id: u32, node_id: u8) -> Result<(), DomainError> {
        if !self.ctx.options.include_zw_info {
            return Ok(());
        }
        let address = node_id.to_string();
        if self.ctx.registry.get_device(&address).await?.is_none() {
            return Ok(());
        }
        if let Some(groups) = self.group_attribute(home_id, node_id).await? {
            self.ctx
                .registry
                .update_attributes(&address, BTreeMap::from([("zwGroups".to_string(), groups)]))
                .await?;
        }
        Ok(())
    }

    async fn group_attribute(&self, home_id: u32, node_id: u8) -> Result<Option<String>, DomainError> {
        let labels = self.ctx.controller.group_labels(home_id, node_id).await?;
        if labels.is_empty() {
            return Ok(None);
        }
        Ok(Some(labels.join(",")))
    }

    /// Deletes the device and every correlation that points at it
    pub async fn remove_node(&self, node_id: u8) -> Result<(), DomainError> {
        let address = node_id.to_string();
        let existed = self.ctx.registry.delete_device(&address).await?;
        let purged = self.ctx.correlations.purge_device(&address);
        warn!(device = %address, existed = existed, purged = purged, "Node removed");
        Ok(())
    }

    /// Applies a notification code to a known device.
    /// Returns the new state, or `None` when nothing changed.
    pub async fn apply_code(
        &self,
        node_id: u8,
        code: NotificationCode,
    ) -> Result<Option<RunState>, DomainError> {
        let address = node_id.to_string();
        if self.ctx.registry.get_device(&address).await?.is_none() {
            debug!(device = %address, code = ?code, "Status code for unknown node ignored");
            return Ok(None);
        }
        let Some(run_state) = RunState::on_notification(code) else {
            return Ok(None);
        };

        let last_error = match run_state {
            RunState::Error | RunState::Lost => Some(format!("{:?}", code)),
            _ => None,
        };
        self.ctx
            .registry
            .update_status(&address, run_state, last_error)
            .await?;
        info!(device = %address, code = ?code, run_state = %run_state, "Node status");
        Ok(Some(run_state))
    }

    /// A controller command timing out puts the device into error
    pub async fn controller_command(
        &self,
        node_id: u8,
        code: Option<NotificationCode>,
    ) -> Result<(), DomainError> {
        if code == Some(NotificationCode::Timeout) {
            self.apply_code(node_id, NotificationCode::Timeout).await?;
        }
        Ok(())
    }

    /// Publishes the controller itself as a device with its management buttons
    pub async fn discover_controller(&self, home_id: u32, node_id: u8) -> Result<(), DomainError> {
        let address = node_id.to_string();
        info!(device = %address, home_id = %format!("{:x}", home_id), "Controller discovered");

        self.ctx.set_home_id(home_id);
        self.discover_node(home_id, node_id).await?;

        let controller = &self.ctx.controller;
        let mut attributes = BTreeMap::from([
            (ATTR_SOFTWARE_VERSION.to_string(), controller.version()),
            (ATTR_NAME.to_string(), self.ctx.options.controller_name.clone()),
        ]);
        if self.ctx.options.include_zw_info {
            let info = controller.controller_info(home_id).await?;
            attributes.extend([
                ("zwControllerNodeID".to_string(), info.controller_node_id.to_string()),
                ("zwHomeID".to_string(), format!("{:x}", home_id)),
                ("zwIsPrimaryController".to_string(), info.is_primary.to_string()),
                ("zwIsSUC".to_string(), info.is_static_update_controller.to_string()),
                ("zwLibraryTypeName".to_string(), info.library_type_name),
                ("zwLibraryVersion".to_string(), info.library_version),
                ("zwSucNodeId".to_string(), info.suc_node_id.to_string()),
            ]);
        }
        self.ctx
            .registry
            .update_attributes(&address, attributes)
            .await?;

        self.create_buttons(&address).await?;

        self.ctx
            .registry
            .update_status(&address, RunState::Ready, None)
            .await
    }

    /// Creates the push buttons once; later discoveries leave them alone
    async fn create_buttons(&self, address: &str) -> Result<(), DomainError> {
        let registry = &self.ctx.registry;
        let first = ControllerButton::AddNode.instance();
        if registry
            .get_input(address, PointKind::PushButton, first)
            .await?
            .is_some()
        {
            return Ok(());
        }

        for button in ControllerButton::ALL {
            let mut input = registry
                .create_input(address, PointKind::PushButton, button.instance())
                .await?;
            input.description = Some(button.description().to_string());
            registry.update_input(input).await?;
        }
        info!(device = %address, count = ControllerButton::ALL.len(), "Created controller buttons");
        Ok(())
    }
}

fn zw_node_details(
    info: &NodeInfo,
    controller_node_id: u8,
    home_id: u32,
    version: &str,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("zwIsNodeFailed".to_string(), info.failed.to_string()),
        ("zwBasicType".to_string(), info.basic_type.to_string()),
        (
            "zwDeviceType".to_string(),
            format!("{} (0x{:04X})", info.device_type, info.device_type),
        ),
        ("zwControllerNodeID".to_string(), controller_node_id.to_string()),
        ("zwHomeID".to_string(), format!("{:x}", home_id)),
        ("zwIsAwake".to_string(), info.awake.to_string()),
        ("zwIsBeamingDevice".to_string(), info.beaming.to_string()),
        (
            "zwIsFrequentListeningDevice".to_string(),
            info.frequent_listening.to_string(),
        ),
        ("zwIsInfoReceived".to_string(), info.info_received.to_string()),
        ("zwIsRoutingDevice".to_string(), info.routing.to_string()),
        ("zwGenericType".to_string(), info.generic_type.to_string()),
        ("zwSpecificType".to_string(), info.specific_type.to_string()),
        ("zwPlusType".to_string(), info.plus_type_name.clone()),
        ("zwIsZWavePlus".to_string(), info.zwave_plus.to_string()),
        ("zwQueryStage".to_string(), info.query_stage.clone()),
        ("zwVersion".to_string(), version.to_string()),
        ("zwMaxBaudRate".to_string(), info.max_baud_rate.to_string()),
    ])
}
