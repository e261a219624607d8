use iced::widget::{
    button, column, container, horizontal_space, mouse_area, row, scrollable, text, text_input,
};
use iced::{Alignment, Color, Element, Fill, Length};
use uuid::Uuid;

use shelfcore_search::SearchHit;
use shelfcore_store::{FileEntry, FileGroup, FileKind};

use crate::{App, Message};

const ENTRY_NAME_SIZE: u32 = 13;
const ENTRY_PATH_SIZE: u32 = 10;
const ENTRY_PATH_MAX_CHARS: usize = 38;

pub(crate) fn view(app: &App) -> Element<'_, Message> {
    let search_box = text_input("Search files...", &app.query)
        .id(app.search_input_id.clone())
        .on_input(Message::QueryChanged)
        .padding(8)
        .size(14)
        .width(Fill);

    let mut content = column![].spacing(4);

    let searching = !app.query.trim().is_empty();
    if searching {
        content = content.push(section_header("Results"));
        if app.bridge.is_searching() {
            content = content.push(text("Searching...").size(12).color(dim_color()));
        } else if app.bridge.results().is_empty() {
            content = content.push(text("No matches").size(12).color(dim_color()));
        }
        for hit in app.bridge.results() {
            content = content.push(hit_row(hit));
        }
    }

    for group in app.service.store.groups_ordered_with_ungrouped() {
        let target = if group.is_ungrouped() {
            None
        } else {
            Some(group.id)
        };
        let members = app.service.store.files_in(target);
        if group.is_ungrouped() && members.is_empty() && app.drag_payload.is_none() {
            continue;
        }

        let count = members.len();
        content = content.push(group_header(app, &group, target, count));

        if group.is_expanded {
            for entry in members {
                content = content.push(entry_row(entry));
            }
        }
    }

    if !searching && !app.bridge.recent().is_empty() {
        content = content.push(section_header("Recent"));
        for hit in app.bridge.recent() {
            content = content.push(hit_row(hit));
        }
    }

    let new_group = row![
        text_input("New group...", &app.new_group_name)
            .on_input(Message::NewGroupNameChanged)
            .on_submit(Message::SubmitNewGroup)
            .padding(6)
            .size(12)
            .width(Fill),
        button(text("+").size(12))
            .padding(6)
            .on_press(Message::SubmitNewGroup),
    ]
    .spacing(6)
    .align_y(Alignment::Center);

    let footer = text(format!(
        "{} files on the shelf",
        app.service.store.files().len()
    ))
    .size(11)
    .color(dim_color());

    container(
        column![
            search_box,
            scrollable(content).height(Fill),
            new_group,
            footer,
        ]
        .spacing(8)
        .padding(10),
    )
    .width(Fill)
    .height(Fill)
    .into()
}

fn section_header(label: &str) -> Element<'_, Message> {
    text(label)
        .size(11)
        .color(Color::from_rgb8(255, 213, 128))
        .into()
}

fn group_header<'a>(
    app: &'a App,
    group: &FileGroup,
    target: Option<Uuid>,
    count: usize,
) -> Element<'a, Message> {
    let arrow = if group.is_expanded { "▾" } else { "▸" };

    let mut header = row![].spacing(6).align_y(Alignment::Center);

    if group.is_ungrouped() {
        header = header.push(text(arrow).size(12).color(dim_color()));
    } else {
        header = header.push(
            button(text(arrow).size(12))
                .style(button::text)
                .padding(2)
                .on_press(Message::ToggleGroup(group.id)),
        );
    }

    let renaming = app
        .rename_draft
        .as_ref()
        .filter(|(id, _)| *id == group.id)
        .map(|(_, draft)| draft);

    if let Some(draft) = renaming {
        header = header.push(
            text_input("Group name", draft)
                .on_input(Message::RenameDraftChanged)
                .on_submit(Message::SubmitRenameGroup)
                .padding(4)
                .size(12)
                .width(Fill),
        );
    } else {
        header = header.push(text(group.name.clone()).size(13).width(Fill));
    }

    header = header.push(text(format!("{count}")).size(11).color(dim_color()));

    if !group.is_ungrouped() && renaming.is_none() {
        header = header.push(
            button(text("✎").size(11))
                .style(button::text)
                .padding(2)
                .on_press(Message::BeginRenameGroup(group.id, group.name.clone())),
        );
        header = header.push(
            button(text("✕").size(11))
                .style(button::text)
                .padding(2)
                .on_press(Message::RemoveGroup(group.id)),
        );
    }

    let highlight = app.drag_payload.is_some() && app.drop_hover == Some(target);
    let styled = container(header)
        .padding(4)
        .width(Fill)
        .style(move |_theme| {
            if highlight {
                drop_target_style()
            } else {
                container::Style::default()
            }
        });

    mouse_area(styled)
        .on_enter(Message::GroupHoverChanged(Some(target)))
        .on_exit(Message::GroupHoverChanged(None))
        .on_release(Message::DropOnGroup(target))
        .into()
}

fn entry_row(entry: &FileEntry) -> Element<'_, Message> {
    let name_color = if entry.exists() {
        kind_color(entry.kind())
    } else {
        missing_color()
    };

    let grip = mouse_area(text("⠿").size(12).color(dim_color()))
        .on_press(Message::BeginDrag(entry.id));

    let body = column![
        text(entry.name.as_str()).size(ENTRY_NAME_SIZE).color(name_color),
        text(truncate_middle(&entry.path, ENTRY_PATH_MAX_CHARS))
            .size(ENTRY_PATH_SIZE)
            .color(dim_color()),
    ]
    .spacing(1)
    .width(Fill);

    let inner = row![
        grip,
        body,
        button(text("⌖").size(11))
            .style(button::text)
            .padding(2)
            .on_press(Message::RevealEntry(entry.id)),
        button(text("✕").size(11))
            .style(button::text)
            .padding(2)
            .on_press(Message::RemoveEntry(entry.id)),
    ]
    .spacing(6)
    .align_y(Alignment::Center)
    .padding(4);

    mouse_area(container(inner).width(Fill))
        .on_press(Message::OpenEntry(entry.id))
        .into()
}

fn hit_row(hit: &SearchHit) -> Element<'_, Message> {
    let inner = row![
        horizontal_space().width(Length::Fixed(12.0)),
        column![
            text(hit.name.as_str())
                .size(ENTRY_NAME_SIZE)
                .color(name_color(&hit.name)),
            text(truncate_middle(&hit.path, ENTRY_PATH_MAX_CHARS))
                .size(ENTRY_PATH_SIZE)
                .color(dim_color()),
        ]
        .spacing(1)
        .width(Fill),
    ]
    .spacing(6)
    .align_y(Alignment::Center)
    .padding(4);

    mouse_area(container(inner).width(Fill))
        .on_press(Message::OpenHit(hit.path.clone()))
        .into()
}

fn kind_color(kind: FileKind) -> Color {
    match kind {
        FileKind::Pdf => Color::from_rgb8(235, 111, 111),
        FileKind::Word => Color::from_rgb8(99, 141, 237),
        FileKind::Excel => Color::from_rgb8(104, 211, 145),
        FileKind::Powerpoint => Color::from_rgb8(255, 153, 85),
        FileKind::Text => Color::from_rgb8(220, 220, 220),
        FileKind::Image => Color::from_rgb8(180, 178, 255),
        FileKind::Video => Color::from_rgb8(237, 137, 189),
        FileKind::Audio => Color::from_rgb8(96, 211, 211),
        FileKind::Archive => Color::from_rgb8(214, 188, 127),
        FileKind::Code => Color::from_rgb8(99, 179, 237),
        FileKind::Folder => Color::from_rgb8(125, 207, 255),
        FileKind::Other => Color::from_rgb8(200, 200, 200),
    }
}

fn name_color(name: &str) -> Color {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Color::from_rgb8(235, 111, 111)
    } else if lower.ends_with(".doc") || lower.ends_with(".docx") {
        Color::from_rgb8(99, 141, 237)
    } else if lower.ends_with(".xls") || lower.ends_with(".xlsx") {
        Color::from_rgb8(104, 211, 145)
    } else if lower.ends_with(".md") || lower.ends_with(".txt") {
        Color::from_rgb8(220, 220, 220)
    } else if lower.ends_with(".png") || lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        Color::from_rgb8(180, 178, 255)
    } else if lower.ends_with(".zip") || lower.ends_with(".7z") {
        Color::from_rgb8(214, 188, 127)
    } else {
        Color::from_rgb8(200, 200, 200)
    }
}

fn dim_color() -> Color {
    Color::from_rgb8(145, 150, 160)
}

fn missing_color() -> Color {
    Color::from_rgb8(100, 105, 112)
}

fn drop_target_style() -> container::Style {
    container::Style {
        background: Some(Color::from_rgb8(58, 84, 122).into()),
        border: iced::Border {
            color: Color::from_rgb8(255, 213, 128),
            width: 1.0,
            radius: 2.0.into(),
        },
        ..container::Style::default()
    }
}

fn truncate_middle(input: &str, max_chars: usize) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= max_chars {
        return input.to_string();
    }

    if max_chars <= 3 {
        return "...".to_string();
    }

    let keep = max_chars - 3;
    let left = keep / 2;
    let right = keep - left;

    let head: String = chars[..left].iter().collect();
    let tail: String = chars[chars.len() - right..].iter().collect();
    format!("{head}...{tail}")
}
