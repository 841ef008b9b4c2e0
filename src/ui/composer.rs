/// Composing screen: the nine-grid uploader
///
/// Bulk import button, the 3x3 slot grid (previews with a remove button,
/// or a "+" picker for empty slots), and the analyze button. The analyze
/// button only arms once two slots are populated; the controller re-checks
/// the same guard when the message arrives.

use iced::widget::{button, column, container, image, text, Column};
use iced::{Alignment, ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::state::slots::{ImageSlot, SlotStore};
use crate::Message;

/// Edge length of one slot cell in the grid
const CELL_SIZE: f32 = 150.0;

pub fn view(store: &SlotStore) -> Element<'_, Message> {
    let populated = store.populated_count();

    let mut actions = Column::new()
        .push(
            button(text("一键导入 9 宫格素材").size(18))
                .on_press(Message::PickBulk)
                .padding([12.0, 24.0]),
        )
        .spacing(10)
        .align_x(Alignment::Center);

    if populated > 0 {
        actions = actions.push(
            button(text("重置所有格子").size(14))
                .on_press(Message::ClearAll)
                .padding([6.0, 16.0]),
        );
    }

    let grid = Wrap::with_elements(store.iter().map(slot_cell).collect())
        .spacing(8.0)
        .line_spacing(8.0);

    let analyze = button(text("开始氛围感分析 ✨").size(20))
        .on_press_maybe((populated >= 2).then_some(Message::Analyze))
        .padding([16.0, 40.0]);

    let content: Column<Message> = column![
        text("定格瞬间，串联美好").size(36),
        text("✨ 姐妹们，快来上传你的 9 宫格，开启 AI 电影级叙事分析 ✨").size(14),
        actions,
        container(grid).width(Length::Fixed(CELL_SIZE * 3.0 + 16.0)),
        analyze,
    ]
    .spacing(24)
    .padding(30)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

/// One cell of the grid: a preview with a remove button, or a picker.
fn slot_cell(slot: &ImageSlot) -> Element<'_, Message> {
    let index = slot.index();

    match slot.content() {
        Some(slot_image) => column![
            image(slot_image.preview.clone())
                .width(Length::Fixed(CELL_SIZE))
                .height(Length::Fixed(CELL_SIZE - 28.0))
                .content_fit(ContentFit::Cover),
            button(text("移除").size(12))
                .on_press(Message::ClearSlot(index))
                .padding([2.0, 10.0]),
        ]
        .spacing(4)
        .align_x(Alignment::Center)
        .into(),
        None => button(
            container(text("+").size(28))
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .on_press(Message::PickSlot(index))
        .width(Length::Fixed(CELL_SIZE))
        .height(Length::Fixed(CELL_SIZE))
        .into(),
    }
}
