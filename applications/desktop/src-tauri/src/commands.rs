//! Tauri commands called by the panel frontend

use tauri::{AppHandle, State};
use tracing::debug;

use crate::panel::{PanelState, PanelView};

#[tauri::command]
pub fn get_panel(panel: State<'_, PanelState>) -> Result<PanelView, String> {
    panel.view().map_err(|e| e.to_string())
}

/// Radio button handler: light `label`, turn the others off
#[tauri::command]
pub fn select_led(label: String, panel: State<'_, PanelState>) -> Result<PanelView, String> {
    debug!(label = %label, "select_led");
    panel.select_led(&label).map_err(|e| e.to_string())
}

/// Slider handler: `index` is the slider that moved, `value` its percent
#[tauri::command]
pub fn set_duty(index: usize, value: f64, panel: State<'_, PanelState>) -> Result<f64, String> {
    debug!(index, value, "set_duty");
    panel.set_duty(index, value).map_err(|e| e.to_string())
}

/// Exit button: release the pins, then quit
#[tauri::command]
pub fn exit_app(app: AppHandle, panel: State<'_, PanelState>) -> Result<(), String> {
    let result = panel.shutdown().map(|_| ()).map_err(|e| e.to_string());
    app.exit(0);
    result
}
