//! Data bridge: owns the panel connection and the list controller.
//!
//! Runs as a background task. Connects, loads the first page, then serves
//! [`Command`]s from the UI and forwards notification changes, sending
//! results back as [`Action`]s. Logs out on cancellation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hostdeck_core::{
    CoreError, EntityListController, EntityPage, EntitySource, FlashLevel, Location,
    Notifications, Panel, PanelConfig, PreferenceStore,
};

use crate::action::{Action, Command};

const CONNECTION_SCOPE: &str = "connection";

pub async fn spawn_data_bridge(
    config: PanelConfig,
    location: Location,
    preferences: Arc<PreferenceStore>,
    notifications: Notifications,
    action_tx: mpsc::UnboundedSender<Action>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
) {
    let mut flashes = notifications.subscribe();
    let _ = action_tx.send(Action::Connecting);

    let connected = tokio::select! {
        () = cancel.cancelled() => return,
        result = Panel::connect(config, &notifications) => result,
    };
    let panel = match connected {
        Ok(panel) => Arc::new(panel),
        Err(e) => {
            warn!(error = %e, "failed to connect to panel");
            if notifications.snapshot().is_empty() {
                notifications.add(CONNECTION_SCOPE, FlashLevel::Error, e.flash_message());
            }
            let _ = action_tx.send(Action::FlashesChanged(notifications.snapshot()));
            let _ = action_tx.send(Action::ConnectFailed(e.to_string()));
            return;
        }
    };
    let _ = action_tx.send(Action::Connected(Arc::clone(&panel)));

    let mut controller = EntityListController::new(
        Arc::clone(&panel),
        panel.user().clone(),
        preferences,
        notifications.clone(),
        &location,
    );
    let result = controller.refresh().await;
    send_page(&action_tx, &controller, result);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(command) = commands.recv() => {
                debug!(?command, "bridge command");
                match command {
                    Command::SelectPage(page) => {
                        let result = controller.select_page(page).await;
                        send_page(&action_tx, &controller, result);
                    }
                    Command::Refresh => {
                        let result = controller.refresh().await;
                        send_page(&action_tx, &controller, result);
                    }
                    Command::ToggleScope => match controller.toggle_scope_and_refresh().await {
                        Ok(Some(page)) => send_page(&action_tx, &controller, Ok(page)),
                        Ok(None) => {}
                        Err(e) => send_page(&action_tx, &controller, Err(e)),
                    },
                }
            }

            Ok(()) = flashes.changed() => {
                let current = flashes.borrow_and_update().clone();
                let _ = action_tx.send(Action::FlashesChanged(current));
            }
        }
    }

    panel.disconnect().await;
    info!("data bridge shut down");
}

fn send_page<S: EntitySource>(
    action_tx: &mpsc::UnboundedSender<Action>,
    controller: &EntityListController<S>,
    result: Result<Arc<EntityPage>, CoreError>,
) {
    let action = match result {
        Ok(page) => Action::PageLoaded {
            page,
            admin_scope: controller.admin_scope(),
            location: controller.location().to_string(),
        },
        Err(e) => {
            debug!(error = %e, "page request failed");
            Action::PageFailed {
                location: controller.location().to_string(),
            }
        }
    };
    let _ = action_tx.send(action);
}
