use super::*;
use crate::app::{Message, Model, ToastLevel, update};
use crate::config::ThemeMode;
use crate::document::Document;
use crate::pipeline::ViewMode;
use ratatui::Terminal;
use ratatui::backend::TestBackend;

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(80, 40);
    Terminal::new(backend).unwrap()
}

fn model_with(text: &str) -> Model {
    Model::new(Document::from_text(text), (80, 40))
}

fn draw(model: &Model) -> Terminal<TestBackend> {
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(model, frame)).unwrap();
    terminal
}

fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol())
        .collect()
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let height = terminal.backend().buffer().area.height;
    (0..height)
        .map(|y| row_text(terminal, y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_render_shows_document_with_left_padding() {
    let model = model_with("# Title\n\nHello world");
    let terminal = draw(&model);
    assert!(row_text(&terminal, 0).starts_with("  # Title"));
    assert!(row_text(&terminal, 2).starts_with("  Hello world"));
}

#[test]
fn test_status_bar_is_last_row() {
    let model = model_with("# Title\n\nHello world");
    let terminal = draw(&model);
    let status = row_text(&terminal, 39);
    assert!(status.contains("untitled"));
    assert!(status.contains("[Rendered]"));
    assert!(status.contains("Line 1/3"));
    assert!(status.contains("?:help"));
}

#[test]
fn test_status_bar_shows_raw_label() {
    let model = model_with("text").with_mode(ViewMode::Raw);
    assert!(status_bar_text(&model).contains("[Raw]"));
}

#[test]
fn test_status_bar_watch_indicator_needs_a_backing_file() {
    let mut model = model_with("text");
    model.watch_enabled = true;
    assert!(!status_bar_text(&model).contains("[watching]"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# Notes").unwrap();
    let mut model = Model::new(Document::load(&path), (80, 40));
    model.watch_enabled = true;
    let status = status_bar_text(&model);
    assert!(status.contains("notes.md"));
    assert!(status.contains("[watching]"));
}

#[test]
fn test_rendered_mode_shows_diagram_placeholder() {
    let model = model_with("# Chart\n\n```mermaid\ngraph TD\nA-->B\n```\nafter");
    let screen = screen_text(&draw(&model));
    assert!(screen.contains("MERMAID DIAGRAM"));
    assert!(screen.contains("after"));
}

#[test]
fn test_raw_mode_shows_diagram_source() {
    let model = model_with("```mermaid\ngraph TD\nA-->B\n```").with_mode(ViewMode::Raw);
    let screen = screen_text(&draw(&model));
    assert!(!screen.contains("MERMAID DIAGRAM"));
    assert!(screen.contains("graph TD"));
}

#[test]
fn test_toc_sidebar_lists_headers_with_selection_marker() {
    let model = update(
        model_with("# Intro\n\ntext\n\n## Details\n\nmore"),
        Message::ToggleToc,
    );
    let screen = screen_text(&draw(&model));
    assert!(screen.contains("Table of Contents"));
    assert!(screen.contains("> Intro"));
    assert!(screen.contains("  Details"));
}

#[test]
fn test_toc_sidebar_without_headers() {
    let model = update(model_with("just text"), Message::ToggleToc);
    let screen = screen_text(&draw(&model));
    assert!(screen.contains("No headers found"));
}

#[test]
fn test_file_browser_marks_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("guides")).unwrap();
    std::fs::write(dir.path().join("readme.md"), "# Readme").unwrap();

    let mut model = update(model_with("text"), Message::ToggleFileBrowser);
    model.load_directory(dir.path()).unwrap();
    let screen = screen_text(&draw(&model));
    assert!(screen.contains("> .."));
    assert!(screen.contains("guides/"));
    assert!(screen.contains("readme.md"));
}

#[test]
fn test_search_bar_shows_position() {
    let model = update(model_with("foo bar foo"), Message::StartSearch);
    let model = update(model, Message::SearchInput("foo".to_string()));
    let terminal = draw(&model);
    let bar = row_text(&terminal, 38);
    assert!(bar.starts_with("/foo  [1/2]"));
    assert!(row_text(&terminal, 39).contains("Search: foo (1/2)"));
}

#[test]
fn test_search_bar_without_matches() {
    let model = update(model_with("foo bar"), Message::StartSearch);
    let model = update(model, Message::SearchInput("zzz".to_string()));
    assert!(search_bar_text(&model).contains("[no matches]"));
}

#[test]
fn test_search_bar_before_typing_has_no_position() {
    let model = update(model_with("foo"), Message::StartSearch);
    assert_eq!(
        search_bar_text(&model),
        "/  Enter: next  Shift+Enter: prev  Esc: close"
    );
}

#[test]
fn test_current_match_is_highlighted() {
    let model = update(model_with("foo bar"), Message::StartSearch);
    let model = update(model, Message::SearchInput("bar".to_string()));
    let theme = style::Theme::for_mode(model.theme);
    let terminal = draw(&model);
    let buffer = terminal.backend().buffer();
    // Two columns of padding, then "foo "
    let cell = &buffer[(6, 0)];
    assert_eq!(cell.symbol(), "b");
    assert_eq!(cell.bg, theme.current_match.bg.unwrap());
    assert_ne!(buffer[(2, 0)].bg, theme.current_match.bg.unwrap());
}

#[test]
fn test_toast_renders_above_status_bar() {
    let mut model = model_with("text");
    model.show_toast(ToastLevel::Warning, "Watch stopped");
    let terminal = draw(&model);
    assert!(row_text(&terminal, 38).starts_with("[warn] Watch stopped"));
}

#[test]
fn test_toast_sits_above_search_bar() {
    let mut model = update(model_with("text"), Message::StartSearch);
    model.show_toast(ToastLevel::Info, "hello");
    let terminal = draw(&model);
    assert!(row_text(&terminal, 37).starts_with("[info] hello"));
    assert!(row_text(&terminal, 38).starts_with('/'));
}

#[test]
fn test_help_overlay_lists_bindings_and_config() {
    let mut model = model_with("text");
    model.config_global_path = Some("/tmp/mdlens/config".into());
    let model = update(model, Message::ToggleHelp);
    let mut terminal = Terminal::new(TestBackend::new(80, 60)).unwrap();
    terminal.draw(|frame| render(&model, frame)).unwrap();
    let screen = screen_text(&terminal);
    assert!(screen.contains("Help"));
    assert!(screen.contains("Raw / rendered"));
    assert!(screen.contains("Global: /tmp/mdlens/config"));
}

#[test]
fn test_light_theme_status_colors() {
    let model = update(model_with("text"), Message::ToggleTheme);
    assert_eq!(model.theme, ThemeMode::Light);
    let terminal = draw(&model);
    let cell = &terminal.backend().buffer()[(0, 39)];
    assert_eq!(cell.bg, style::Theme::light().status_bg);
}

#[test]
fn test_scrolled_view_starts_at_offset() {
    let text: String = (0..100).map(|i| format!("row {i}\n")).collect();
    let model = update(model_with(&text), Message::ScrollDown(10));
    let terminal = draw(&model);
    assert!(row_text(&terminal, 0).starts_with("  row 10"));
    assert_eq!(model.viewport.offset(), 10);
}

#[test]
fn test_centered_popup_rect_clamps_to_area() {
    let area = ratatui::layout::Rect::new(0, 0, 40, 10);
    let popup = centered_popup_rect(20, 4, area);
    assert_eq!(popup, ratatui::layout::Rect::new(10, 3, 20, 4));
    let clamped = centered_popup_rect(100, 100, area);
    assert_eq!(clamped, area);
}
