use iced::widget::{button, column, row, scrollable, text};
use iced::{Alignment, Element, Length, Task, Theme};

mod gemini;
mod ingest;
mod state;
mod ui;

use gemini::{AnalysisError, RequestImage};
use ingest::IngestError;
use state::analysis::GalleryAnalysis;
use state::slots::{SlotImage, SlotStore};

/// Main application state
///
/// The view mode is implicit: no analysis means the composing screen, an
/// analysis means the reviewing screen. `analyzing` is an orthogonal
/// sub-state that shows the loading screen and blocks a second concurrent
/// analysis call. The controller is the only owner of the slots, the
/// current analysis, and the hotspot selection.
struct LensLink {
    /// The nine upload slots
    slots: SlotStore,
    /// Latest analysis result; None = composing, Some = reviewing
    analysis: Option<GalleryAnalysis>,
    /// Index of the selected connection, if a detail card is open
    selected: Option<usize>,
    /// True while an analysis call is outstanding
    analyzing: bool,
    /// Status message to display to the user
    status: String,
    /// Gemini API key, loaded once at startup
    api_key: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the bulk import button
    PickBulk,
    /// Bulk pick finished; an empty batch means the dialog was cancelled
    BulkIngested(Result<Vec<SlotImage>, IngestError>),
    /// User clicked the "+" on one empty slot
    PickSlot(usize),
    /// Single pick finished; None means the dialog was cancelled
    SlotIngested(usize, Option<Result<SlotImage, IngestError>>),
    /// User removed one slot's image
    ClearSlot(usize),
    /// User reset the whole grid
    ClearAll,
    /// User asked for the gallery analysis
    Analyze,
    /// The model call resolved
    AnalysisComplete(Result<GalleryAnalysis, AnalysisError>),
    /// User clicked a hotspot
    SelectConnection(usize),
    /// User closed the detail card
    DismissDetail,
    /// User went back from the annotated post to the composer
    BackToComposer,
}

impl LensLink {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let api_key = gemini::load_api_key();
        if api_key.is_none() {
            eprintln!("⚠️  No Gemini API key found (GEMINI_API_KEY or config file)");
        }

        println!("📸 LensLink initialized with {} slots", state::slots::SLOT_COUNT);

        (
            LensLink {
                slots: SlotStore::new(),
                analysis: None,
                selected: None,
                analyzing: false,
                status: "上传照片，开启 AI 叙事分析".to_string(),
                api_key,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickBulk => {
                Task::perform(ingest::pick_and_ingest_bulk(), Message::BulkIngested)
            }
            Message::BulkIngested(Ok(images)) => {
                if !images.is_empty() {
                    let count = images.len();
                    self.slots.bulk_set(images);
                    self.status = format!("已导入 {} 张照片", count);
                }
                Task::none()
            }
            Message::BulkIngested(Err(e)) => {
                // The whole batch is dropped so the grid is never half-updated
                eprintln!("⚠️  Bulk import failed: {}", e);
                self.status = "哎呀，有照片读取失败了，格子保持原样，请再试一次～".to_string();
                Task::none()
            }
            Message::PickSlot(index) => Task::perform(
                ingest::pick_and_ingest_single(),
                move |result| Message::SlotIngested(index, result),
            ),
            Message::SlotIngested(index, Some(Ok(image))) => {
                self.slots.set(index, image);
                Task::none()
            }
            Message::SlotIngested(_, Some(Err(e))) => {
                eprintln!("⚠️  Import failed: {}", e);
                self.status = "这张照片读取失败了，请换一张试试～".to_string();
                Task::none()
            }
            Message::SlotIngested(_, None) => Task::none(),
            Message::ClearSlot(index) => {
                self.slots.clear(index);
                Task::none()
            }
            Message::ClearAll => {
                self.slots.clear_all();
                Task::none()
            }
            Message::Analyze => self.start_analysis(),
            Message::AnalysisComplete(result) => {
                self.analyzing = false;
                match result {
                    Ok(analysis) => {
                        println!(
                            "✅ Analysis complete: cover {} with {} connections",
                            analysis.main_photo_index,
                            analysis.connections.len()
                        );
                        self.selected = None;
                        self.analysis = Some(analysis);
                        self.status = "分析完成！点击红点查看氛围感细节".to_string();
                    }
                    Err(e) => {
                        // Composing state and slots stay untouched
                        eprintln!("⚠️  Analysis failed: {}", e);
                        self.status = "哎呀，服务器走丢了，请重新尝试一下吧～".to_string();
                    }
                }
                Task::none()
            }
            Message::SelectConnection(index) => {
                // Reselecting replaces the current selection directly; there
                // is no intermediate dismissed state
                if let Some(analysis) = &self.analysis {
                    if index < analysis.connections.len() {
                        self.selected = Some(index);
                    }
                }
                Task::none()
            }
            Message::DismissDetail => {
                self.selected = None;
                Task::none()
            }
            Message::BackToComposer => {
                // Slots persist so the user can re-run without re-uploading
                self.analysis = None;
                self.selected = None;
                self.status = "上传照片，开启 AI 叙事分析".to_string();
                Task::none()
            }
        }
    }

    /// Guarded Composing -> Analyzing transition.
    ///
    /// Requires at least two populated slots and no outstanding call;
    /// refusals surface a notice without entering the loading state.
    fn start_analysis(&mut self) -> Task<Message> {
        if self.analyzing {
            return Task::none();
        }
        if self.slots.populated_count() < 2 {
            self.status = "亲，至少上传两张照片才能开启奇妙关联之旅哦！✨".to_string();
            return Task::none();
        }
        let Some(api_key) = self.api_key.clone() else {
            self.status = "未找到 Gemini API Key，请设置 GEMINI_API_KEY 后重启".to_string();
            return Task::none();
        };

        let images: Vec<RequestImage> = self
            .slots
            .populated()
            .into_iter()
            .map(|img| RequestImage {
                mime_type: img.mime_type.clone(),
                data: img.encoded.clone(),
            })
            .collect();

        self.analyzing = true;
        self.status = "分析中...".to_string();

        Task::perform(
            gemini::analyze_gallery(images, api_key),
            Message::AnalysisComplete,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        if self.analyzing {
            return ui::loading::view();
        }

        let mut header = row![text("LensLink 影迹联动").size(22)]
            .spacing(16)
            .padding(12)
            .align_y(Alignment::Center);
        if self.analysis.is_some() {
            header = header.push(
                button(text("← 返回").size(14)).on_press(Message::BackToComposer),
            );
        }

        let populated = self.slots.populated();
        let body = match &self.analysis {
            Some(analysis) => ui::dashboard::view(&populated, analysis, self.selected),
            None => ui::composer::view(&self.slots),
        };

        column![
            header,
            scrollable(body).height(Length::Fill),
            text(&self.status).size(13),
        ]
        .spacing(8)
        .padding(8)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application(
        "LensLink 影迹联动",
        LensLink::update,
        LensLink::view,
    )
    .theme(LensLink::theme)
    .centered()
    .run_with(LensLink::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use state::analysis::Connection;

    fn app() -> LensLink {
        LensLink {
            slots: SlotStore::new(),
            analysis: None,
            selected: None,
            analyzing: false,
            status: String::new(),
            api_key: Some("test-key".to_string()),
        }
    }

    fn slot_image(name: &str) -> SlotImage {
        SlotImage {
            file_name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            encoded: "aGVsbG8=".to_string(),
            dimensions: (1200, 800),
            preview: iced::widget::image::Handle::from_bytes(vec![0u8; 4]),
        }
    }

    fn connection(target_index: usize) -> Connection {
        Connection {
            target_index,
            x: 42.5,
            y: 10.0,
            focus_x: 80.0,
            focus_y: 15.0,
            relationship: "特写".to_string(),
            interpretation: "细节氛围感".to_string(),
        }
    }

    fn analysis_of_three() -> GalleryAnalysis {
        GalleryAnalysis {
            main_photo_index: 1,
            summary: "家人们谁懂啊，绝绝子 ✨ #摄影".to_string(),
            connections: vec![connection(0), connection(2)],
        }
    }

    #[test]
    fn test_analyze_guard_rejects_underfilled_grid() {
        // Zero and one populated slots both refuse the transition
        for count in 0..2 {
            let mut app = app();
            for index in 0..count {
                app.slots.set(index, slot_image("a.jpg"));
            }
            let _ = app.update(Message::Analyze);
            assert!(!app.analyzing, "guard must not enter the loading state");
            assert!(app.status.contains("两张"));
        }
    }

    #[test]
    fn test_analyze_guard_passes_with_two_slots() {
        let mut app = app();
        app.slots.set(0, slot_image("a.jpg"));
        app.slots.set(1, slot_image("b.jpg"));
        let _ = app.update(Message::Analyze);
        assert!(app.analyzing);
    }

    #[test]
    fn test_second_analyze_while_outstanding_is_ignored() {
        let mut app = app();
        app.slots.set(0, slot_image("a.jpg"));
        app.slots.set(1, slot_image("b.jpg"));
        let _ = app.update(Message::Analyze);
        app.status = "分析中...".to_string();

        let _ = app.update(Message::Analyze);
        assert!(app.analyzing);
        assert_eq!(app.status, "分析中...");
    }

    #[test]
    fn test_missing_api_key_refuses_without_loading_state() {
        let mut app = app();
        app.api_key = None;
        app.slots.set(0, slot_image("a.jpg"));
        app.slots.set(1, slot_image("b.jpg"));
        let _ = app.update(Message::Analyze);
        assert!(!app.analyzing);
        assert!(app.status.contains("API Key"));
    }

    #[test]
    fn test_successful_analysis_enters_reviewing() {
        let mut app = app();
        for (index, name) in ["0.jpg", "1.jpg", "2.jpg"].iter().enumerate() {
            app.slots.set(index, slot_image(name));
        }
        app.analyzing = true;

        let _ = app.update(Message::AnalysisComplete(Ok(analysis_of_three())));

        assert!(!app.analyzing);
        let analysis = app.analysis.as_ref().unwrap();
        // One hotspot per connection, backdrop is the second submitted image
        assert_eq!(analysis.connections.len(), 2);
        assert_eq!(
            app.slots.populated()[analysis.main_photo_index].file_name,
            "1.jpg"
        );
        assert_eq!(app.selected, None);
    }

    #[test]
    fn test_failed_analysis_stays_in_composing() {
        let mut app = app();
        app.slots.set(0, slot_image("a.jpg"));
        app.slots.set(1, slot_image("b.jpg"));
        app.analyzing = true;
        app.status = "分析中...".to_string();

        let _ = app.update(Message::AnalysisComplete(Err(AnalysisError::Parse(
            "bad shape".to_string(),
        ))));

        assert!(!app.analyzing);
        assert!(app.analysis.is_none());
        assert_eq!(app.slots.populated_count(), 2);
        assert!(app.status.contains("重新尝试"));
    }

    #[test]
    fn test_selection_is_idempotent_across_dismiss() {
        let mut app = app();
        app.analysis = Some(analysis_of_three());

        let _ = app.update(Message::SelectConnection(0));
        let first = app.selected;
        let _ = app.update(Message::DismissDetail);
        assert_eq!(app.selected, None);
        let _ = app.update(Message::SelectConnection(0));

        assert_eq!(app.selected, first);
        assert_eq!(app.selected, Some(0));
        let conn = &app.analysis.as_ref().unwrap().connections[0];
        assert_eq!(conn.target_index, 0);
        assert_eq!((conn.focus_x, conn.focus_y), (80.0, 15.0));
    }

    #[test]
    fn test_switching_selection_replaces_directly() {
        let mut app = app();
        app.analysis = Some(analysis_of_three());

        let _ = app.update(Message::SelectConnection(0));
        assert_eq!(app.selected, Some(0));
        // Selecting another hotspot replaces the selection in one step
        let _ = app.update(Message::SelectConnection(1));
        assert_eq!(app.selected, Some(1));
    }

    #[test]
    fn test_selection_out_of_range_is_ignored() {
        let mut app = app();
        app.analysis = Some(analysis_of_three());
        let _ = app.update(Message::SelectConnection(7));
        assert_eq!(app.selected, None);
    }

    #[test]
    fn test_selection_without_analysis_is_ignored() {
        let mut app = app();
        let _ = app.update(Message::SelectConnection(0));
        assert_eq!(app.selected, None);
    }

    #[test]
    fn test_back_to_composer_keeps_slots() {
        let mut app = app();
        for (index, name) in ["0.jpg", "1.jpg", "2.jpg"].iter().enumerate() {
            app.slots.set(index, slot_image(name));
        }
        app.analysis = Some(analysis_of_three());
        app.selected = Some(1);

        let _ = app.update(Message::BackToComposer);

        assert!(app.analysis.is_none());
        assert_eq!(app.selected, None);
        assert_eq!(app.slots.populated_count(), 3);
        let names: Vec<&str> = app
            .slots
            .populated()
            .iter()
            .map(|img| img.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["0.jpg", "1.jpg", "2.jpg"]);
    }

    #[test]
    fn test_bulk_ingested_fills_in_order() {
        let mut app = app();
        let _ = app.update(Message::BulkIngested(Ok(vec![
            slot_image("first.jpg"),
            slot_image("second.jpg"),
        ])));
        let names: Vec<&str> = app
            .slots
            .populated()
            .iter()
            .map(|img| img.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["first.jpg", "second.jpg"]);
        assert!(app.status.contains("2"));
    }

    #[test]
    fn test_bulk_ingest_error_leaves_slots_unchanged() {
        let mut app = app();
        app.slots.set(3, slot_image("keep.jpg"));

        let _ = app.update(Message::BulkIngested(Err(IngestError::Unreadable {
            path: "x.jpg".to_string(),
            reason: "io".to_string(),
        })));

        assert_eq!(app.slots.populated_count(), 1);
        assert!(app.status.contains("请再试一次"));
    }

    #[test]
    fn test_cancelled_single_pick_changes_nothing() {
        let mut app = app();
        let _ = app.update(Message::SlotIngested(4, None));
        assert_eq!(app.slots.populated_count(), 0);
    }

    #[test]
    fn test_single_pick_targets_its_slot() {
        let mut app = app();
        let _ = app.update(Message::SlotIngested(4, Some(Ok(slot_image("one.jpg")))));
        assert!(app.slots.iter().nth(4).unwrap().content().is_some());
        assert_eq!(app.slots.populated_count(), 1);
    }
}
