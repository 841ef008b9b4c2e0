/// Reviewing screen: the annotated post
///
/// The cover image chosen by the model is rendered with one clickable red
/// hotspot per connection, followed by the narrative summary styled as a
/// social post. Selecting a hotspot opens a detail card that frames the
/// target image around its model-reported subject center.

use iced::widget::{button, canvas::Canvas, column, container, row, text, Column};
use iced::{Alignment, Element, Length};

use super::overlay::{AnnotationOverlay, FocusView};
use crate::state::analysis::{Connection, GalleryAnalysis};
use crate::state::slots::SlotImage;
use crate::Message;

const BACKDROP_HEIGHT: f32 = 420.0;
const FOCUS_VIEWPORT: f32 = 300.0;

/// Render the annotated post. `images` is the submitted image list (the
/// populated slots in slot order) that the analysis indices refer to.
pub fn view<'a>(
    images: &[&'a SlotImage],
    analysis: &'a GalleryAnalysis,
    selected: Option<usize>,
) -> Element<'a, Message> {
    let Some(main_image) = images.get(analysis.main_photo_index) else {
        // Validation makes this unreachable; render a plain notice anyway
        return container(text("分析结果与照片对不上，请返回重试")).padding(40).into();
    };

    let overlay = Canvas::new(AnnotationOverlay::new(
        main_image.preview.clone(),
        main_image.dimensions,
        analysis.connections.clone(),
    ))
    .width(Length::Fill)
    .height(Length::Fixed(BACKDROP_HEIGHT));

    let mut content: Column<'a, Message> = column![
        overlay,
        text("点击主图上的【红色圆点】探索更多氛围感细节").size(12),
        post_body(&analysis.summary),
    ]
    .spacing(16)
    .padding(20)
    .align_x(Alignment::Center);

    if let Some(conn) = selected.and_then(|i| analysis.connections.get(i)) {
        content = content.push(detail_card(images, conn));
    }

    container(content)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

/// The XiaoHongShu-style post body under the cover image.
fn post_body(summary: &str) -> Element<'_, Message> {
    container(
        column![
            text("LensLink AI 博主").size(14),
            text(summary).size(16),
        ]
        .spacing(10),
    )
    .padding(20)
    .width(Length::Fixed(640.0))
    .into()
}

/// Detail card for the selected connection: the target image framed on its
/// subject, the relationship badge, and the interpretation text.
fn detail_card<'a>(images: &[&'a SlotImage], conn: &'a Connection) -> Element<'a, Message> {
    let Some(target) = images.get(conn.target_index) else {
        return container(text("找不到这张关联图")).padding(20).into();
    };

    let focus = Canvas::new(FocusView::new(
        target.preview.clone(),
        target.dimensions,
        conn.focus_x,
        conn.focus_y,
    ))
    .width(Length::Fixed(FOCUS_VIEWPORT))
    .height(Length::Fixed(FOCUS_VIEWPORT));

    let notes = column![
        text(&conn.relationship).size(14),
        text("氛围感笔记 ✨").size(22),
        text(&conn.interpretation).size(15),
        button(text("知道啦，绝绝子！").size(14))
            .on_press(Message::DismissDetail)
            .padding([10.0, 24.0]),
    ]
    .spacing(12)
    .width(Length::Fixed(320.0));

    container(row![focus, notes].spacing(24).align_y(Alignment::Center))
        .padding(20)
        .into()
}
