/*!
 * MacroViz dashboard - World Bank indicators as chart, table and CSV
 *
 * A single window:
 * - Query panel: countries, indicator, year range, "Load data"
 * - Trend chart (one line per country), raw data table, CSV download
 *
 * Fetches run on a worker thread so the spinner keeps animating; repeated
 * queries are answered from the in-memory cache owned by the app.
 */

use anyhow::Result;
use eframe::egui;
use macro_viz::pipeline::{self, Dataset, RunOutcome};
use macro_viz::query::{DEFAULT_COUNTRIES, DEFAULT_YEARS, MAX_YEAR, MIN_YEAR};
use macro_viz::{CachedFetcher, Client, INDICATORS, storage, viz};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 480;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("MacroViz v0.1"),
        ..Default::default()
    };

    eframe::run_native(
        "MacroViz",
        options,
        Box::new(|_cc| {
            let client = Client::new()?;
            Ok(Box::new(MacroVizApp::new(client)))
        }),
    )
}

/// Main application state
struct MacroVizApp {
    // Query inputs
    countries: String,
    indicator_idx: usize,
    start_year: i32,
    end_year: i32,

    // Lives as long as the window; shared with the worker thread.
    fetcher: Arc<CachedFetcher<Client>>,

    // Results of the last run
    has_run: bool,
    dataset: Option<Dataset>,
    chart: Option<egui::TextureHandle>,
    warnings: Vec<String>,

    // UI state
    is_loading: bool,
    status_message: String,
    error_message: String,
    empty_message: String,

    operation_receiver: Option<mpsc::Receiver<RunOutcome>>,
}

impl MacroVizApp {
    fn new(client: Client) -> Self {
        Self {
            countries: DEFAULT_COUNTRIES.to_string(),
            indicator_idx: 0,
            start_year: DEFAULT_YEARS.start,
            end_year: DEFAULT_YEARS.end,

            fetcher: Arc::new(CachedFetcher::new(client)),

            has_run: false,
            dataset: None,
            chart: None,
            warnings: Vec::new(),

            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            empty_message: String::new(),
            operation_receiver: None,
        }
    }

    fn clear_results(&mut self) {
        self.dataset = None;
        self.chart = None;
        self.warnings.clear();
        self.status_message.clear();
        self.error_message.clear();
        self.empty_message.clear();
    }

    fn start_run(&mut self) {
        self.clear_results();
        self.has_run = true;

        let indicator = &INDICATORS[self.indicator_idx];
        let query = match pipeline::validate(
            &self.countries,
            indicator,
            self.start_year,
            self.end_year,
        ) {
            Ok(q) => q,
            Err(err) => {
                self.error_message = err.to_string();
                return;
            }
        };

        self.is_loading = true;
        let (sender, receiver) = mpsc::channel();
        self.operation_receiver = Some(receiver);

        let fetcher = Arc::clone(&self.fetcher);
        thread::spawn(move || {
            let outcome = pipeline::run_query(fetcher.as_ref(), query);
            let _ = sender.send(outcome);
        });
    }

    fn check_operation_result(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.operation_receiver else {
            return;
        };
        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.is_loading = false;
                self.operation_receiver = None;
                self.error_message = "The fetch worker stopped unexpectedly.".to_string();
                return;
            }
        };
        self.is_loading = false;
        self.operation_receiver = None;
        self.warnings = outcome.warnings().iter().map(|w| w.to_string()).collect();

        match outcome {
            RunOutcome::Rejected(err) => self.error_message = err.to_string(),
            RunOutcome::Empty { .. } => {
                self.empty_message =
                    "No data returned. Try another indicator, country code, or year range."
                        .to_string();
            }
            RunOutcome::Rendered(ds) => {
                let ind = ds.query.indicator;
                let title = format!("{} ({})", ind.name, ind.code);
                match viz::render_rgb(&ds.table, CHART_WIDTH, CHART_HEIGHT, &title) {
                    Ok(rgb) => {
                        let image = egui::ColorImage::from_rgb(
                            [CHART_WIDTH as usize, CHART_HEIGHT as usize],
                            &rgb,
                        );
                        self.chart = Some(ctx.load_texture(
                            "trend-chart",
                            image,
                            egui::TextureOptions::LINEAR,
                        ));
                    }
                    Err(err) => self.error_message = format!("Failed to draw chart: {}", err),
                }
                self.dataset = Some(ds);
            }
        }
    }

    fn save_csv(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let mut dialog = rfd::FileDialog::new()
            .set_file_name(ds.export_file_name())
            .add_filter("CSV", &["csv"]);
        if let Some(dir) = dirs::download_dir().or_else(dirs::home_dir) {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };
        match storage::save_csv(&ds.table, &path) {
            Ok(()) => {
                self.status_message =
                    format!("Saved {} rows to {}", ds.table.len(), path.display());
            }
            Err(err) => self.error_message = format!("Failed to save CSV: {}", err),
        }
    }

    fn query_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Query");
        ui.add_space(8.0);

        ui.label("Countries (ISO3, comma-separated)");
        ui.text_edit_singleline(&mut self.countries)
            .on_hover_text("Example: DEU,BRA,USA");
        ui.add_space(8.0);

        egui::ComboBox::from_label("Indicator")
            .selected_text(INDICATORS[self.indicator_idx].name)
            .width(240.0)
            .show_ui(ui, |ui| {
                for (idx, ind) in INDICATORS.iter().enumerate() {
                    ui.selectable_value(&mut self.indicator_idx, idx, ind.name);
                }
            });
        ui.add_space(8.0);

        ui.label("Year range");
        let from = ui.add(egui::Slider::new(&mut self.start_year, MIN_YEAR..=MAX_YEAR).text("from"));
        if from.changed() && self.start_year > self.end_year {
            self.end_year = self.start_year;
        }
        let to = ui.add(egui::Slider::new(&mut self.end_year, MIN_YEAR..=MAX_YEAR).text("to"));
        if to.changed() && self.end_year < self.start_year {
            self.start_year = self.end_year;
        }
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.is_loading, egui::Button::new("Load data"))
                .clicked()
            {
                self.start_run();
            }
            if self.is_loading {
                ui.spinner();
                ui.label("Fetching data from World Bank...");
            }
        });
    }

    fn results(&mut self, ui: &mut egui::Ui) {
        let Some(ds) = &self.dataset else {
            return;
        };

        ui.heading("Trend");
        if let Some(tex) = &self.chart {
            ui.add(egui::Image::new(tex).max_width(ui.available_width()));
        }
        ui.add_space(10.0);

        ui.heading("Data");
        egui::ScrollArea::vertical()
            .id_salt("data-table")
            .max_height(320.0)
            .show(ui, |ui| {
                egui::Grid::new("data-grid")
                    .striped(true)
                    .num_columns(storage::CSV_HEADER.len())
                    .show(ui, |ui| {
                        for col in storage::CSV_HEADER {
                            ui.strong(col);
                        }
                        ui.end_row();
                        for row in &ds.table {
                            ui.label(&row.iso3);
                            ui.label(&row.country);
                            ui.label(&row.indicator);
                            ui.label(row.year.to_string());
                            ui.label(row.value.map(|v| v.to_string()).unwrap_or_default());
                            ui.end_row();
                        }
                    });
            });
        ui.add_space(10.0);

        if ui.button("Download CSV").clicked() {
            self.save_csv();
        }
    }
}

impl eframe::App for MacroVizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_operation_result(ctx);

        // Request repaint if loading (for spinner animation)
        if self.is_loading {
            ctx.request_repaint();
        }

        egui::SidePanel::left("query-panel")
            .resizable(false)
            .min_width(280.0)
            .show(ctx, |ui| self.query_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("MacroViz v0.1");
                ui.label("World Bank API → charts + table + CSV export (proof of concept)");
                ui.horizontal(|ui| {
                    ui.strong("Source:");
                    ui.label("World Bank API ·");
                    ui.strong("Indicator code:");
                    ui.code(INDICATORS[self.indicator_idx].code);
                });
                ui.add_space(10.0);

                if !self.has_run {
                    ui.label("Configure inputs and click Load data.");
                    return;
                }

                if !self.error_message.is_empty() {
                    ui.colored_label(egui::Color32::RED, &self.error_message);
                }
                for w in &self.warnings {
                    ui.colored_label(egui::Color32::from_rgb(200, 140, 0), w);
                }
                if !self.empty_message.is_empty() {
                    ui.colored_label(egui::Color32::from_rgb(200, 140, 0), &self.empty_message);
                }
                if !self.status_message.is_empty() {
                    ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
                }

                self.results(ui);
            });
        });
    }
}
