use eframe::egui::{self, Color32, ScrollArea};

use crate::binder::Dashboard;
use crate::regions::MapView;
use crate::selection::ControlEvent;
use crate::ui::table::TableState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TourismApp {
    dashboard: Dashboard,
    table: TableState,
    /// Framing last applied to the map plot.
    framed: Option<MapView>,
    status_message: Option<String>,
}

impl TourismApp {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            table: TableState::default(),
            framed: None,
            status_message: None,
        }
    }
}

impl eframe::App for TourismApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events: Vec<ControlEvent> = Vec::new();

        // ---- Top panel: menu and status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.dashboard, self.status_message.as_deref());
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(
                    ui,
                    self.dashboard.dataset(),
                    self.dashboard.selection(),
                    &mut events,
                );
            });

        // ---- Central panel: map, side charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                let hovered = plot::geo_map(ui, &self.dashboard.geo, &mut self.framed, 450.0);
                if let Some(market) = hovered {
                    if self.dashboard.selection().hovered.as_deref() != Some(market.as_str()) {
                        events.push(ControlEvent::MapHover(market));
                    }
                }
                ui.separator();

                ui.columns(2, |cols| {
                    plot::box_chart(
                        &mut cols[0],
                        "x_time_series",
                        &self.dashboard.year_series,
                        Color32::from_rgb(0x1f, 0x77, 0xb4),
                        300.0,
                    );
                    plot::box_chart(
                        &mut cols[1],
                        "x_duration_series",
                        &self.dashboard.duration_series,
                        Color32::from_rgb(0xff, 0x7f, 0x0e),
                        300.0,
                    );
                });
                ui.separator();

                if let Some(msg) = table::data_table(ui, &self.dashboard.table, &mut self.table) {
                    self.status_message = Some(msg);
                }
            });
        });

        // Events are applied one at a time, in the order the widgets
        // produced them.
        for event in events {
            self.dashboard.apply(event);
        }
    }
}
