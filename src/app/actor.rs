//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Connections
            UiEvent::ListConnections => self.state.list_connections(),
            UiEvent::AddConnection(connection) => self.state.add_connection(connection),
            UiEvent::UseConnection(id) => self.state.use_connection(id),
            UiEvent::DeleteConnection(id) => self.state.delete_connection(id),

            // Query builder
            UiEvent::SetMethod(method) => self.state.set_method(method),
            UiEvent::SetPath(path) => self.state.set_path(path),
            UiEvent::AddParam(param) => self.state.add_param(param),
            UiEvent::AddHeader(header) => self.state.add_header(header),
            UiEvent::SetBody(body) => self.state.set_body(body),
            UiEvent::ClearQuery => self.state.clear_query(),
            UiEvent::ExecuteQuery => {
                if let Some(cmd) = self.state.prepare_query() {
                    let _ = self.network_tx.send(cmd);
                }
            }

            // Column manager
            UiEvent::ShowColumns => self.state.show_columns(),
            UiEvent::ToggleColumn(key) => self.state.toggle_column(&key),
            UiEvent::SetColumnVisibility { key, visible } => self.state.set_column_visibility(&key, visible),
            UiEvent::RenameColumn { key, name } => self.state.rename_column(&key, name),
            UiEvent::MoveColumn { key, direction } => self.state.move_column(&key, direction),

            // Export and reports
            UiEvent::Export(format) => self.state.export(&format),
            UiEvent::RunReport(input) => {
                if let Some(cmd) = self.state.prepare_report(input) {
                    let _ = self.network_tx.send(cmd);
                }
            }

            // Popups
            UiEvent::ToggleHelp => self.state.toggle_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
