//! CodeFlow Studio - Query-to-Diagram Explorer
//! Built with egui for native Wayland support

use eframe::egui::{self, Color32, RichText, Stroke};
use std::sync::mpsc::Receiver;

use codeflow_studio::api::completion::CompletionConfig;
use codeflow_studio::api::context::ContextConfig;
use codeflow_studio::api::gitlab::{GitLabClient, GitLabConfig};
use codeflow_studio::api::{CompletionClient, CompletionParams, ContextClient, Repository};
use codeflow_studio::config::AppConfig;
use codeflow_studio::diagram::{DiagramViewer, RenderConfig};
use codeflow_studio::error::{AnalyzeError, ApiError};
use codeflow_studio::pipeline::{AnalysisMode, Analyzer};
use codeflow_studio::voice::{self, Transcriber, TranscriptEvent, UnsupportedTranscriber};

/// Standard spacing between sections
const SECTION_SPACING: f32 = 12.0;
/// Standard spacing between elements within a section
const ELEMENT_SPACING: f32 = 8.0;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("CodeFlow Studio"),
        ..Default::default()
    };

    eframe::run_native(
        "CodeFlow Studio",
        options,
        Box::new(|cc| {
            let mut style = (*cc.egui_ctx.style()).clone();
            style.visuals.widgets.inactive.bg_fill = Color32::from_rgb(60, 60, 60);
            style.visuals.widgets.hovered.bg_fill = Color32::from_rgb(80, 80, 90);
            style.visuals.widgets.active.bg_fill = Color32::from_rgb(0, 120, 212);
            style.visuals.widgets.hovered.bg_stroke =
                Stroke::new(1.0, Color32::from_rgb(0, 120, 212));
            cc.egui_ctx.set_style(style);

            Ok(Box::new(CodeFlowStudio::new()))
        }),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    RepositoryFlow,
    SnippetFlow,
}

struct CodeFlowStudio {
    config: AppConfig,
    tab: Tab,

    // Query input
    query: String,
    voice_partial: String,
    transcriber: UnsupportedTranscriber,
    voice_receiver: Option<Receiver<TranscriptEvent>>,

    // Repository selector
    repo_search: String,
    repositories: Vec<Repository>,
    selected_repo: Option<Repository>,
    repo_loading: bool,
    repo_receiver: Option<Receiver<Result<Vec<Repository>, ApiError>>>,

    // Analysis
    loading: bool,
    error: Option<String>,
    /// Generation of the in-flight submission; results tagged with an
    /// older generation are discarded.
    analyze_generation: u64,
    analyze_receiver: Option<Receiver<(u64, Result<String, AnalyzeError>)>>,

    viewer: DiagramViewer,
}

impl CodeFlowStudio {
    fn new() -> Self {
        let config = AppConfig::load();
        let mut viewer = DiagramViewer::new();
        if let Err(e) = viewer.initialize(RenderConfig::default()) {
            log::error!("Diagram renderer init failed: {}", e);
        }

        Self {
            config,
            tab: Tab::RepositoryFlow,
            query: String::new(),
            voice_partial: String::new(),
            transcriber: UnsupportedTranscriber,
            voice_receiver: None,
            repo_search: String::new(),
            repositories: Vec::new(),
            selected_repo: None,
            repo_loading: false,
            repo_receiver: None,
            loading: false,
            error: None,
            analyze_generation: 0,
            analyze_receiver: None,
            viewer,
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        // A new mode starts from a clean slate.
        self.viewer.clear();
        self.error = None;
    }

    fn start_repo_search(&mut self) {
        if self.repo_loading {
            return;
        }
        self.repo_loading = true;
        self.error = None;

        let (tx, rx) = std::sync::mpsc::channel();
        self.repo_receiver = Some(rx);

        let client = GitLabClient::new(GitLabConfig {
            base_url: self.config.gitlab_base_url().to_owned(),
            token: self.config.gitlab_token.clone(),
        });
        let search = self.repo_search.clone();

        std::thread::spawn(move || {
            let _ = tx.send(client.list_repositories(&search));
        });
    }

    fn check_repo_search(&mut self) {
        let Some(rx) = self.repo_receiver.as_ref() else {
            return;
        };
        if let Ok(result) = rx.try_recv() {
            self.repo_receiver = None;
            self.repo_loading = false;
            match result {
                Ok(repos) => {
                    log::info!("Repository search returned {} projects", repos.len());
                    self.repositories = repos;
                }
                Err(e) => self.error = Some(e.to_string()),
            }
        }
    }

    fn start_analysis(&mut self) {
        if self.loading || self.query.trim().is_empty() {
            return;
        }

        let mode = match self.tab {
            Tab::SnippetFlow => AnalysisMode::Snippet,
            Tab::RepositoryFlow => {
                let Some(repo) = self.selected_repo.as_ref() else {
                    self.error = Some("Select a repository first".to_owned());
                    return;
                };
                AnalysisMode::Repository {
                    repository: repo.path_with_namespace.clone(),
                }
            }
        };

        self.loading = true;
        self.error = None;
        self.analyze_generation += 1;
        let generation = self.analyze_generation;

        let (tx, rx) = std::sync::mpsc::channel();
        self.analyze_receiver = Some(rx);

        let context = ContextClient::new(ContextConfig {
            endpoint: self.config.context_url().to_owned(),
            token: self.config.sourcegraph_token.clone(),
            repo_url_prefix: self.config.repo_url_prefix().to_owned(),
        });
        let completion = CompletionClient::new(CompletionConfig {
            endpoint: self.config.completion_url().to_owned(),
            token: self.config.sourcegraph_token.clone(),
        });
        let params = CompletionParams::for_model(self.config.model());
        let query = self.query.clone();

        std::thread::spawn(move || {
            let analyzer = Analyzer::new(context, completion, params);
            let _ = tx.send((generation, analyzer.run(&query, &mode)));
        });
    }

    fn check_analysis(&mut self) {
        let Some(rx) = self.analyze_receiver.as_ref() else {
            return;
        };
        if let Ok((generation, result)) = rx.try_recv() {
            self.analyze_receiver = None;
            if generation != self.analyze_generation {
                log::debug!("Discarding superseded analysis result");
                return;
            }
            self.loading = false;
            match result {
                Ok(markup) => {
                    if let Err(e) = self.viewer.set_diagram(&markup) {
                        self.error = Some(e.to_string());
                    }
                }
                Err(e) => self.error = Some(e.to_string()),
            }
        }
    }

    fn start_voice_capture(&mut self) {
        match self.transcriber.start() {
            Ok(rx) => self.voice_receiver = Some(rx),
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn check_voice(&mut self) {
        let Some(rx) = self.voice_receiver.as_ref() else {
            return;
        };
        let mut done = false;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    let finished = matches!(event, TranscriptEvent::Final(_));
                    voice::fold_event(&mut self.query, &mut self.voice_partial, event);
                    if finished {
                        done = true;
                        break;
                    }
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => break,
                Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                    done = true;
                    break;
                }
            }
        }
        if done {
            self.voice_receiver = None;
            self.voice_partial.clear();
        }
    }

    fn show_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("CodeFlow Studio");
            ui.separator();
            if ui
                .selectable_label(self.tab == Tab::RepositoryFlow, "Repository Flow")
                .clicked()
            {
                self.switch_tab(Tab::RepositoryFlow);
            }
            if ui
                .selectable_label(self.tab == Tab::SnippetFlow, "Snippet Flow")
                .clicked()
            {
                self.switch_tab(Tab::SnippetFlow);
            }
        });
    }

    fn show_repo_panel(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Repository").strong());
        ui.add_space(ELEMENT_SPACING);

        if !self.config.has_gitlab_token() {
            ui.colored_label(
                Color32::from_rgb(230, 180, 80),
                "No GitLab token configured.\nSet GITLAB_TOKEN or add\n\"gitlab_token\" to config.json.",
            );
            return;
        }

        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(&mut self.repo_search);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Search").clicked() || submitted {
                self.start_repo_search();
            }
        });

        if self.repo_loading {
            ui.add_space(ELEMENT_SPACING);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Searching...");
            });
        }

        ui.add_space(ELEMENT_SPACING);
        egui::ScrollArea::vertical().show(ui, |ui| {
            let mut clicked = None;
            for repo in &self.repositories {
                let selected = self
                    .selected_repo
                    .as_ref()
                    .map(|r| r.id == repo.id)
                    .unwrap_or(false);
                if ui.selectable_label(selected, &repo.path_with_namespace).clicked() {
                    clicked = Some(repo.clone());
                }
            }
            if let Some(repo) = clicked {
                log::info!("Selected repository {}", repo.path_with_namespace);
                self.selected_repo = Some(repo);
            }
        });
    }

    fn show_query_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let hint = match self.tab {
                Tab::RepositoryFlow => "Ask about the selected repository...",
                Tab::SnippetFlow => "Paste a code snippet or describe a flow...",
            };
            ui.add_sized(
                [ui.available_width() - 170.0, 24.0],
                egui::TextEdit::singleline(&mut self.query).hint_text(hint),
            );

            let mic_enabled = self.transcriber.available() && self.voice_receiver.is_none();
            if ui
                .add_enabled(mic_enabled, egui::Button::new("🎤"))
                .on_disabled_hover_text("Voice capture is not available on this system")
                .clicked()
            {
                self.start_voice_capture();
            }

            let can_generate = !self.loading && !self.query.trim().is_empty();
            if ui
                .add_enabled(can_generate, egui::Button::new("Generate"))
                .clicked()
            {
                self.start_analysis();
            }
        });

        if !self.voice_partial.is_empty() {
            ui.label(
                RichText::new(format!("listening: {}", self.voice_partial))
                    .italics()
                    .weak(),
            );
        }

        if self.loading {
            ui.add_space(ELEMENT_SPACING);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Generating diagram...");
            });
        }

        if let Some(ref error) = self.error {
            ui.add_space(ELEMENT_SPACING);
            ui.colored_label(Color32::from_rgb(240, 100, 100), format!("⚠ {}", error));
        }
    }

    fn show_token_hint(&self, ui: &mut egui::Ui) {
        ui.colored_label(
            Color32::from_rgb(230, 180, 80),
            "No Sourcegraph token configured. Set SOURCEGRAPH_TOKEN or add \
             \"sourcegraph_token\" to config.json to enable diagram generation.",
        );
    }
}

impl eframe::App for CodeFlowStudio {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_repo_search();
        self.check_analysis();
        self.check_voice();

        // Keep polling while background work is in flight.
        if self.loading || self.repo_loading || self.voice_receiver.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.show_top_bar(ui);
            ui.add_space(4.0);
        });

        if self.tab == Tab::RepositoryFlow {
            egui::SidePanel::left("repo_panel")
                .default_width(280.0)
                .show(ctx, |ui| {
                    ui.add_space(ELEMENT_SPACING);
                    self.show_repo_panel(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(ELEMENT_SPACING);
            if !self.config.has_sourcegraph_token() {
                self.show_token_hint(ui);
                ui.add_space(ELEMENT_SPACING);
            }
            self.show_query_row(ui);
            ui.add_space(SECTION_SPACING);
            ui.separator();
            self.viewer.ui(ui);
        });
    }
}
