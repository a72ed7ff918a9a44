// Communication channels between the click engine and its shell
use super::types::{ClickerCommand, ClickerEvent};
use tokio::sync::mpsc;

/// Helper function to create the engine's command and event channels
pub fn create_clicker_channels() -> (
    mpsc::Sender<ClickerCommand>,
    mpsc::Receiver<ClickerCommand>,
    mpsc::Sender<ClickerEvent>,
    mpsc::Receiver<ClickerEvent>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::channel(32);
    (cmd_tx, cmd_rx, event_tx, event_rx)
}
