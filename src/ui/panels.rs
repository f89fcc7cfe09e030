use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::binder::Dashboard;
use crate::data::model::{Dataset, Purpose, TransportMode};
use crate::regions::{MapStyle, REGIONS};
use crate::selection::{ControlEvent, Selection};

const DESCRIPTION: &str = "London is one of the world's most visited cities. \
Visitors entering the UK for long stays have a higher probability of staying \
beyond the legally determined length of visit. Each marker shows a market's \
probability of staying 15 or more days; hover one to follow that market in \
the charts and the table below.";

// ---------------------------------------------------------------------------
// Left side panel – control widgets
// ---------------------------------------------------------------------------

/// Render the control panel. Changed values are pushed to `events`.
pub fn side_panel(
    ui: &mut Ui,
    dataset: &Dataset,
    selection: &Selection,
    events: &mut Vec<ControlEvent>,
) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Map style");
            egui::ComboBox::from_id_salt("dropdown_map_style")
                .selected_text(selection.map_style.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for style in MapStyle::ALL {
                        if ui
                            .selectable_label(selection.map_style == style, style.label())
                            .clicked()
                            && selection.map_style != style
                        {
                            events.push(ControlEvent::MapStyle(style));
                        }
                    }
                });
            ui.add_space(6.0);

            ui.strong("Region");
            egui::ComboBox::from_id_salt("dropdown_region")
                .selected_text(selection.region.as_str())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for (name, _) in REGIONS {
                        if ui.selectable_label(selection.region == name, name).clicked()
                            && selection.region != name
                        {
                            events.push(ControlEvent::Region(name.to_string()));
                        }
                    }
                });
            ui.add_space(6.0);

            ui.strong("Transport mode");
            egui::ComboBox::from_id_salt("dropdown_mode")
                .selected_text(selection.mode.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for mode in TransportMode::ALL {
                        if ui.selectable_label(selection.mode == mode, mode.label()).clicked()
                            && selection.mode != mode
                        {
                            events.push(ControlEvent::Mode(mode));
                        }
                    }
                });
            ui.add_space(6.0);

            ui.strong("Purpose");
            egui::ComboBox::from_id_salt("dropdown_purpose")
                .selected_text(selection.purpose.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for purpose in Purpose::ALL {
                        if ui
                            .selectable_label(selection.purpose == purpose, purpose.label())
                            .clicked()
                            && selection.purpose != purpose
                        {
                            events.push(ControlEvent::Purpose(purpose));
                        }
                    }
                });
            ui.separator();

            year_slider(ui, dataset, selection, events);
            ui.separator();

            egui::CollapsingHeader::new(RichText::new("About").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label(DESCRIPTION);
                });
        });
}

/// Year slider over the dataset's range, snapping to years present in the
/// data. Marks list the available years.
fn year_slider(ui: &mut Ui, dataset: &Dataset, selection: &Selection, events: &mut Vec<ControlEvent>) {
    ui.strong("Year");
    let Some((first, last)) = dataset.year_range() else {
        ui.label("No years in dataset.");
        return;
    };

    let mut year = selection.year;
    let response = ui.add(egui::Slider::new(&mut year, first..=last).step_by(1.0));
    if response.changed() {
        if let Some(snapped) = dataset.nearest_year(year) {
            if snapped != selection.year {
                events.push(ControlEvent::Year(snapped));
            }
        }
    }

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for y in &dataset.years {
            let text = RichText::new(y.to_string()).small();
            let text = if *y == selection.year { text.strong() } else { text.weak() };
            ui.label(text);
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, dashboard: &Dashboard, status: Option<&str>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("London Tourism");
        ui.separator();

        let geo = &dashboard.geo;
        ui.label(format!(
            "{} rows loaded, {} markers shown",
            dashboard.dataset().len(),
            geo.markers.len()
        ));
        if geo.excluded > 0 {
            ui.label(
                RichText::new(format!("({} without probability or coordinates)", geo.excluded))
                    .weak(),
            );
        }

        if let Some(msg) = status {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask for the dataset once at startup when no path was configured.
pub fn pick_dataset_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open London tourism data")
        .add_filter("Supported files", &["xlsx", "xls", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Spreadsheet", &["xlsx", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
