/// Loading screen shown while the analysis call is outstanding.
///
/// There is no cancel action: once issued, the call runs to completion.

use iced::widget::{column, container, text};
use iced::{Alignment, Element, Length};

use crate::Message;

pub fn view() -> Element<'static, Message> {
    let content = column![
        text("AI 正在深度分析你的九宫格...").size(28),
        text("正在寻找最有封面感的那一张 ✨").size(16),
        text("大概需要十几秒，宝子们稍等一下～").size(13),
    ]
    .spacing(16)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
