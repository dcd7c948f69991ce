//! Status overlay drawn over the scene.

use market_scene::LifecycleState;

/// Text shown for a lifecycle state. `None` while idle.
pub fn status_line(state: &LifecycleState) -> Option<String> {
    match state {
        LifecycleState::Idle => None,
        LifecycleState::Loading => Some("Loading...".to_string()),
        LifecycleState::Error(message) => Some(format!("Error: {message}")),
        LifecycleState::Empty => Some("No data available.".to_string()),
        LifecycleState::Active(scene) => {
            let count = scene.entities().len();
            let noun = if count == 1 { "entity" } else { "entities" };
            Some(format!("{count} {noun}"))
        }
    }
}

/// Draws the status HUD in the top-left corner.
pub fn draw_hud(ctx: &egui::Context, state: &LifecycleState, icons_pending: usize) {
    let Some(status) = status_line(state) else {
        return;
    };

    egui::Area::new(egui::Id::new("status_hud"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                let color = match state {
                    LifecycleState::Error(_) => egui::Color32::from_rgb(255, 110, 110),
                    _ => egui::Color32::WHITE,
                };
                ui.label(egui::RichText::new(status).color(color).monospace());
                if state.is_active() && icons_pending > 0 {
                    ui.label(
                        egui::RichText::new(format!("loading {icons_pending} icons"))
                            .small()
                            .weak(),
                    );
                }
            });
        });
}
