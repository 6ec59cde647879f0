//! Panel rendering
//!
//! Applies the view-models computed by the selection core to egui surfaces:
//! the fixed primary info panel, the secondary details panel positioned right
//! below it (height-clamped to the viewport), and the hover tooltip. All
//! content comes from the models; no selection logic lives here.

use crate::app::plugin::PointerProbe;
use crate::app::state::AppState;
use egui::{Color32, RichText};
use senda_lib::RouteKind;
use senda_lib::panel::{
    DOWNLOAD_CENTER_URL, PrimaryPanelModel, SecondaryPanelModel, fragment_to_text,
};

const PANEL_LEFT: f32 = 10.0;
const PANEL_TOP: f32 = 78.0;
const PANEL_GAP: f32 = 10.0;
const PANEL_WIDTH: f32 = 300.0;

const HEADER_COLOR: Color32 = Color32::from_rgb(13, 110, 253);

/// Hand cursor and route-code label near the pointer. Purely reactive to the
/// latest pointer sample; independent of selection.
pub fn render_tooltip(ctx: &egui::Context, probe: &PointerProbe) {
    let Some(pos) = probe.hover_pos else {
        return;
    };
    let Some(top) = probe.hover.first() else {
        return;
    };

    ctx.set_cursor_icon(egui::CursorIcon::PointingHand);

    let code = top.route_code();
    if code.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("route-tooltip"))
        .order(egui::Order::Tooltip)
        .fixed_pos(egui::pos2(pos[0] + 10.0, pos[1] - 25.0))
        .show(ctx, |ui| {
            egui::Frame::popup(&ctx.style()).show(ui, |ui| {
                ui.label(RichText::new(code).strong().size(12.0));
            });
        });
}

/// Render both info panels with their current fade alpha
pub fn render_selection_panels(ctx: &egui::Context, state: &mut AppState) {
    state.panels.tick();

    let mut secondary_top = PANEL_TOP;
    if let Some(model) = &state.panels.primary {
        let alpha = state.panels.primary_fade.alpha();
        if alpha > 0.0 {
            secondary_top = primary_panel(ctx, model, alpha) + PANEL_GAP;
        }
    }

    if let Some(model) = &state.panels.secondary {
        let alpha = state.panels.secondary_fade.alpha();
        if alpha > 0.0 {
            secondary_panel(ctx, model, alpha, secondary_top);
        }
    }
}

/// Primary panel: title, badge, structured fields and download buttons.
/// Returns its bottom edge so the secondary panel can sit below it.
fn primary_panel(ctx: &egui::Context, model: &PrimaryPanelModel, alpha: f32) -> f32 {
    let response = egui::Area::new(egui::Id::new("route-info-panel"))
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(PANEL_LEFT, PANEL_TOP))
        .show(ctx, |ui| {
            ui.set_opacity(alpha);
            egui::Frame::window(&ctx.style()).show(ui, |ui| {
                ui.set_width(PANEL_WIDTH);

                ui.horizontal(|ui| {
                    if let Some(kind) = model.badge {
                        badge_chip(ui, kind);
                    }
                    ui.label(
                        RichText::new(&model.heading)
                            .heading()
                            .color(HEADER_COLOR)
                            .size(16.0),
                    );
                });

                for field in &model.fields {
                    ui.add_space(4.0);
                    ui.label(RichText::new(format!("{}:", field.label)).weak().size(11.0));
                    ui.label(RichText::new(&field.value).strong());
                }

                ui.separator();
                ui.horizontal_wrapped(|ui| {
                    for button in &model.downloads {
                        ui.hyperlink_to(format!("⬇ {}", button.label), &button.url);
                    }
                    if let Some(url) = &model.street_view_url {
                        ui.hyperlink_to("Inicio 3D", url);
                    }
                    if let Some(url) = &model.info_url {
                        ui.hyperlink_to("INFO", url);
                    }
                });

                if model.needs_download_fallback() {
                    ui.add_space(4.0);
                    ui.label(RichText::new("Enlace directo no disponible").weak().size(11.0));
                    ui.hyperlink_to("Centro de Descargas CNIG", DOWNLOAD_CENTER_URL);
                }
            });
        })
        .response;

    response.rect.max.y
}

/// Secondary panel: enrichment content, positioned below the primary panel
/// and height-clamped to the viewport
fn secondary_panel(ctx: &egui::Context, model: &SecondaryPanelModel, alpha: f32, top: f32) {
    let max_height = (ctx.screen_rect().height() - top - PANEL_GAP).max(60.0);

    egui::Area::new(egui::Id::new("route-details-panel"))
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(PANEL_LEFT, top))
        .show(ctx, |ui| {
            ui.set_opacity(alpha);
            egui::Frame::window(&ctx.style()).show(ui, |ui| {
                ui.set_width(PANEL_WIDTH);
                ui.set_max_height(max_height);

                match model {
                    SecondaryPanelModel::Loading => {
                        ui.vertical_centered(|ui| {
                            ui.add(egui::Spinner::new());
                            ui.label(
                                RichText::new("Cargando información adicional…")
                                    .weak()
                                    .size(11.0),
                            );
                        });
                    }
                    SecondaryPanelModel::Content {
                        image_url,
                        detail_html,
                    } => {
                        egui::ScrollArea::vertical()
                            .max_height(max_height - 20.0)
                            .show(ui, |ui| {
                                if let Some(url) = image_url {
                                    ui.add(
                                        egui::Image::from_uri(url)
                                            .max_width(PANEL_WIDTH - 20.0)
                                            .max_height(180.0),
                                    );
                                }
                                if let Some(html) = detail_html {
                                    if image_url.is_some() {
                                        ui.separator();
                                    }
                                    ui.label(RichText::new(fragment_to_text(html)).size(12.0));
                                }
                            });
                    }
                    SecondaryPanelModel::NoDetails => {
                        ui.vertical_centered(|ui| {
                            ui.label(
                                RichText::new("No se pudieron cargar detalles ni imagen")
                                    .weak()
                                    .size(11.0),
                            );
                            ui.hyperlink_to("Centro de Descargas CNIG", DOWNLOAD_CENTER_URL);
                        });
                    }
                }
            });
        });
}

/// Small colored route-type badge (GR red, PR yellow, SL green)
fn badge_chip(ui: &mut egui::Ui, kind: RouteKind) {
    let (background, foreground) = match kind {
        RouteKind::Gr => (Color32::from_rgb(196, 48, 43), Color32::WHITE),
        RouteKind::Pr => (Color32::from_rgb(240, 200, 8), Color32::BLACK),
        RouteKind::Sl => (Color32::from_rgb(60, 140, 60), Color32::WHITE),
    };

    egui::Frame::NONE
        .fill(background)
        .inner_margin(egui::Margin::symmetric(4, 2))
        .show(ui, |ui| {
            ui.label(
                RichText::new(kind.short_name())
                    .color(foreground)
                    .strong()
                    .size(11.0),
            );
        });
}
