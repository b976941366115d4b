//! MusicGen Desk window: egui/eframe presentation layer.
//!
//! # Architecture
//!
//! [`MusicApp`] is the top-level [`eframe::App`].  It owns the
//! [`Dispatcher`] and, once per frame:
//!
//! 1. calls [`Dispatcher::poll`] so queued worker events reach the
//!    [`ViewState`](crate::pipeline::ViewState) on the tick cadence,
//! 2. renders the splash screen or the main form from that state,
//! 3. asks egui to repaint after one tick interval so polling continues
//!    while the window is idle.
//!
//! | Model state | Visual |
//! |-------------|--------|
//! | `Loading` | Splash: title, loading text, spinner |
//! | `Ready` | Form: prompt, duration slider, output path, generate button |
//! | `Failed` | Form with the button disabled and the failure in red |

use std::path::{Path, PathBuf};
use std::time::Instant;

use eframe::egui;

use crate::config::AppConfig;
use crate::pipeline::{Dispatcher, GenerationRequest, ModelState, Notice, DURATION_RANGE};

/// Common install locations of a font with Japanese glyphs.
const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "C:\\Windows\\Fonts\\meiryo.ttc",
    "C:\\Windows\\Fonts\\msgothic.ttc",
];

// ---------------------------------------------------------------------------
// MusicApp
// ---------------------------------------------------------------------------

pub struct MusicApp {
    dispatcher: Dispatcher,

    // ── Form ─────────────────────────────────────────────────────────────
    prompt: String,
    duration_secs: u32,
    output: String,

    /// Dialog currently on screen, dismissed with OK.
    dialog: Option<Notice>,
}

impl MusicApp {
    /// Create the app.  Call from the eframe creation closure so fonts can
    /// be installed on the real context.
    pub fn new(cc: &eframe::CreationContext<'_>, dispatcher: Dispatcher, config: &AppConfig) -> Self {
        install_fonts(&cc.egui_ctx, config.ui.cjk_font.as_deref());

        let duration_secs = config
            .model
            .default_duration_secs
            .clamp(*DURATION_RANGE.start(), *DURATION_RANGE.end());

        Self {
            dispatcher,
            prompt: String::new(),
            duration_secs,
            output: config.output.default_path().display().to_string(),
            dialog: None,
        }
    }

    fn submit(&mut self) {
        let request = match GenerationRequest::new(&self.prompt, &self.output, self.duration_secs) {
            Ok(request) => request,
            Err(e) => {
                self.dialog = Some(Notice::Error(e.to_string()));
                return;
            }
        };
        // Rejections already left a notice on the view state.
        if let Err(e) = self.dispatcher.submit(request) {
            log::debug!("submit rejected: {e}");
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_splash(&self, ui: &mut egui::Ui) {
        let state = self.dispatcher.state();
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.heading("MusicGen Desk");
            ui.add_space(12.0);
            ui.label(
                egui::RichText::new(state.model_status.as_str())
                    .color(egui::Color32::from_rgb(160, 160, 160)),
            );
            ui.add_space(8.0);
            ui.add(egui::Spinner::new());
        });
    }

    fn draw_form(&mut self, ui: &mut egui::Ui) {
        let can_submit = self.dispatcher.state().can_submit();

        ui.label("Describe the music");
        ui.add(
            egui::TextEdit::multiline(&mut self.prompt)
                .desired_rows(3)
                .desired_width(f32::INFINITY)
                .hint_text("静かな夜"),
        );

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("Length");
            ui.add(egui::Slider::new(&mut self.duration_secs, DURATION_RANGE).suffix(" s"));
        });

        ui.add_space(6.0);
        ui.label("Save to");
        ui.add(egui::TextEdit::singleline(&mut self.output).desired_width(f32::INFINITY));

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_submit, egui::Button::new("Generate"))
                .clicked()
            {
                self.submit();
            }
            if self.dispatcher.state().spinning {
                ui.add(egui::Spinner::new());
            }
        });

        ui.add_space(6.0);
        let state = self.dispatcher.state();
        match &state.model {
            ModelState::Failed(reason) => {
                ui.label(
                    egui::RichText::new(reason.as_str())
                        .color(egui::Color32::from_rgb(255, 100, 100))
                        .size(12.0),
                );
            }
            _ => {
                ui.label(
                    egui::RichText::new(state.status.as_str())
                        .color(egui::Color32::from_rgb(160, 160, 160))
                        .size(12.0),
                );
            }
        }
    }

    fn draw_dialog(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.dialog else {
            return;
        };
        let (title, text, color) = match notice {
            Notice::Info(text) => ("Done", text, egui::Color32::from_rgb(80, 200, 120)),
            Notice::Error(text) => ("Error", text, egui::Color32::from_rgb(255, 136, 68)),
        };

        let mut dismissed = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(text.as_str()).color(color));
                ui.add_space(6.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.dialog = None;
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for MusicApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dispatcher.poll(Instant::now());
        if self.dialog.is_none() {
            self.dialog = self.dispatcher.take_notice();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.dispatcher.state().model == ModelState::Loading {
                self.draw_splash(ui);
            } else {
                self.draw_form(ui);
            }
        });
        self.draw_dialog(ctx);

        ctx.request_repaint_after(self.dispatcher.tick_interval());
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!(
            "MusicGen Desk closing (last output: {:?})",
            self.dispatcher.state().last_output
        );
    }
}

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

/// The configured font if it exists, else the first installed candidate.
fn find_cjk_font(configured: Option<&Path>) -> Option<PathBuf> {
    configured
        .filter(|p| p.is_file())
        .map(Path::to_path_buf)
        .or_else(|| {
            CJK_FONT_CANDIDATES
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file())
        })
}

/// Append a CJK fallback font so Japanese prompts render.  Without one the
/// default fonts are kept and a warning is logged.
fn install_fonts(ctx: &egui::Context, configured: Option<&Path>) {
    let Some(path) = find_cjk_font(configured) else {
        log::warn!("no CJK font found; Japanese text may not render");
        return;
    };
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("could not read font {}: {e}", path.display());
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), egui::FontData::from_owned(bytes).into());
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("cjk".to_owned());
    }
    ctx.set_fonts(fonts);
    log::info!("loaded CJK font {}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn configured_font_wins_when_present() {
        let dir = tempdir().expect("temp dir");
        let font = dir.path().join("custom.ttf");
        std::fs::write(&font, b"not really a font").expect("write");

        assert_eq!(find_cjk_font(Some(&font)), Some(font));
    }

    #[test]
    fn missing_configured_font_falls_back_to_candidates() {
        let dir = tempdir().expect("temp dir");
        let missing = dir.path().join("missing.ttf");

        let found = find_cjk_font(Some(&missing));
        assert_ne!(found.as_deref(), Some(missing.as_path()));
        if let Some(path) = found {
            assert!(CJK_FONT_CANDIDATES.iter().any(|c| Path::new(c) == path));
        }
    }
}
