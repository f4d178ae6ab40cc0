//! Administration screen: one panel's folder tree with imports and
//! per-node actions.

use iced::widget::{button, column, container, row, scrollable, text, text_input, Space};
use iced::{Alignment, Element, Length};

use crate::state::data::{FileRecord, ALL_PANELS};
use crate::state::tree::TreeNode;
use crate::ui::display_size;
use crate::{Dialog, DocuDesk, Message, Screen};

/// Pixels of indentation per tree depth level.
const INDENT: f32 = 24.0;

/// Build the admin screen.
pub fn view(app: &DocuDesk) -> Element<Message> {
    let header = row![
        text(format!(
            "{} Gestion - {}",
            app.panel.icon(),
            app.panel.display_name()
        ))
        .size(24),
        iced::widget::horizontal_space(),
        button("🔍 Recherche").on_press(Message::SwitchScreen(Screen::Search)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let mut panels = row![].spacing(6);
    for panel in ALL_PANELS {
        let label = text(format!("{} {}", panel.icon(), panel.display_name())).size(13);
        let styled = if panel == app.panel {
            button(label).style(button::primary)
        } else {
            button(label).style(button::secondary)
        };
        panels = panels.push(styled.on_press(Message::SelectPanel(panel)));
    }

    let drop_zone = container(
        column![
            text("📦 Zone Drag & Drop Universelle").size(16),
            text(
                "Glissez-déposez des fichiers ou dossiers sur la fenêtre,\n\
                 ou collez leurs chemins ci-dessous.\n\
                 Formats acceptés: .docx, .pdf, .xlsx"
            )
            .size(12),
            text_input("{/chemin/un.pdf} {/chemin/deux.docx}", &app.drop_payload)
                .on_input(Message::DropPayloadChanged)
                .on_submit(Message::DropPayloadSubmitted)
                .size(13),
        ]
        .spacing(8),
    )
    .style(container::rounded_box)
    .padding(14)
    .width(Length::Fill);

    let busy = app.importing;
    let toolbar = row![
        button("➕ Nouveau Dossier").on_press(Message::NewFolder),
        button("📂 Importer Dossier").on_press_maybe((!busy).then_some(Message::PickImportFolder)),
        button("📄 Importer Fichiers").on_press_maybe((!busy).then_some(Message::PickImportFiles)),
        button("🔄 Rafraîchir").on_press(Message::Refresh),
    ]
    .spacing(6);

    let mut content = column![].spacing(4);

    if app.tree.is_empty() {
        content = content.push(
            container(
                text(format!(
                    "📭 Aucun contenu dans {}\n\nCommencez par créer ou importer un dossier",
                    app.panel.display_name()
                ))
                .size(15),
            )
            .width(Length::Fill)
            .center_x(Length::Fill)
            .padding(60),
        );
    } else {
        if !app.tree.root_files.is_empty() {
            content = content.push(text("📄 Fichiers à la racine").size(14));
            for file in &app.tree.root_files {
                content = content.push(file_card(app, file, 0));
            }
        }
        if !app.tree.roots.is_empty() {
            content = content.push(text("📁 Dossiers").size(14));
            for node in &app.tree.roots {
                content = content.push(folder_node(app, node, 0));
            }
        }
    }

    let mut screen = column![header, panels, drop_zone, toolbar].spacing(12);
    if let Some(dialog) = &app.dialog {
        screen = screen.push(dialog_view(app, dialog));
    }
    screen = screen.push(scrollable(content).height(Length::Fill));
    screen = screen.push(text(&app.status).size(13));

    container(screen.padding(16))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// One folder card plus, when expanded, its files and subfolders.
fn folder_node<'a>(app: &'a DocuDesk, node: &'a TreeNode, depth: u16) -> Element<'a, Message> {
    let folder_id = node.folder.id;

    let chevron: Element<Message> = if node.is_expandable() {
        button(text(if node.expanded { "▼" } else { "▶" }).size(14))
            .style(button::text)
            .on_press(Message::ToggleFolder(folder_id))
            .into()
    } else {
        Space::with_width(Length::Fixed(26.0)).into()
    };

    let annotation = format!(
        "{} fichier{} • ID: {}",
        node.file_count,
        if node.file_count > 1 { "s" } else { "" },
        folder_id
    );

    let card = container(
        row![
            chevron,
            text("📁").size(18),
            column![
                text(&node.folder.name).size(14),
                text(annotation).size(11),
            ]
            .spacing(2)
            .width(Length::Fill),
            button(text("➕").size(12)).on_press(Message::AddSubfolder(folder_id)),
            button(text("✏️").size(12)).on_press(Message::RenameFolderRequested(folder_id)),
            button(text("📄").size(12)).on_press(Message::AddFilesToFolder(folder_id)),
            button(text("🗑️").size(12)).on_press(Message::DeleteFolderRequested(folder_id)),
        ]
        .spacing(6)
        .align_y(Alignment::Center),
    )
    .style(container::rounded_box)
    .padding(8)
    .width(Length::Fill);

    let indented_card = row![
        Space::with_width(Length::Fixed(f32::from(depth) * INDENT)),
        card
    ];

    let mut block = column![indented_card].spacing(4);
    if node.expanded {
        // Files first, then subfolders, both in store order.
        for file in &node.files {
            block = block.push(file_card(app, file, depth + 1));
        }
        for child in &node.children {
            block = block.push(folder_node(app, child, depth + 1));
        }
    }
    block.into()
}

/// One file card with open/delete actions.
fn file_card<'a>(app: &'a DocuDesk, file: &'a FileRecord, depth: u16) -> Element<'a, Message> {
    let extension = file.extension();
    let icon = app.handler.file_icon(&extension);
    let type_tag = if app.handler.is_pdf(&file.filename) {
        "🔒 PDF"
    } else {
        "💾 Téléchargeable"
    };
    let meta = format!(
        "{} • {}",
        display_size(file.file_size, &file.filepath),
        type_tag
    );

    let card = container(
        row![
            text(icon).size(18),
            column![text(&file.filename).size(13), text(meta).size(10)]
                .spacing(2)
                .width(Length::Fill),
            button(text("👁️").size(12)).on_press(Message::OpenFile(file.id)),
            button(text("🗑️").size(12)).on_press(Message::DeleteFileRequested(file.id)),
        ]
        .spacing(6)
        .align_y(Alignment::Center),
    )
    .style(container::rounded_box)
    .padding(6)
    .width(Length::Fill);

    row![
        Space::with_width(Length::Fixed(f32::from(depth) * INDENT + 20.0)),
        card
    ]
    .into()
}

/// Inline modal: name prompts, destructive confirmations, import flows.
fn dialog_view<'a>(app: &'a DocuDesk, dialog: &'a Dialog) -> Element<'a, Message> {
    let body: Element<Message> = match dialog {
        Dialog::CreateFolder { parent, name } => {
            let title = match parent {
                None => format!("Nouveau dossier dans {}", app.panel.display_name()),
                Some(_) => "Nouveau sous-dossier".to_string(),
            };
            column![
                text(title).size(15),
                text_input("Nom du dossier", name)
                    .on_input(Message::DialogInput)
                    .on_submit(Message::DialogConfirm),
                row![
                    button("✅ Créer").on_press(Message::DialogConfirm),
                    button("❌ Annuler").on_press(Message::DialogCancel),
                ]
                .spacing(6),
            ]
            .spacing(8)
            .into()
        }
        Dialog::RenameFolder { name, .. } => column![
            text("Renommer le dossier").size(15),
            text_input("Nouveau nom", name)
                .on_input(Message::DialogInput)
                .on_submit(Message::DialogConfirm),
            row![
                button("✅ Renommer").on_press(Message::DialogConfirm),
                button("❌ Annuler").on_press(Message::DialogCancel),
            ]
            .spacing(6),
        ]
        .spacing(8)
        .into(),
        Dialog::DeleteFolder { name, .. } => column![
            text(format!("⚠️ Supprimer '{}' ?", name)).size(15),
            text("Les sous-dossiers et fichiers seront supprimés aussi.").size(12),
            row![
                button("🗑️ Supprimer").on_press(Message::DialogConfirm),
                button("❌ Annuler").on_press(Message::DialogCancel),
            ]
            .spacing(6),
        ]
        .spacing(8)
        .into(),
        Dialog::DeleteFile { filename, .. } => column![
            text(format!("⚠️ Supprimer le fichier '{}' ?", filename)).size(15),
            row![
                button("🗑️ Supprimer").on_press(Message::DialogConfirm),
                button("❌ Annuler").on_press(Message::DialogCancel),
            ]
            .spacing(6),
        ]
        .spacing(8)
        .into(),
        Dialog::ImportFolders { queue } => {
            let current = queue
                .first()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            column![
                text(format!("📁 Importer le dossier '{}' ?", current)).size(15),
                text(format!(
                    "Panel: {} • Tous les fichiers • L'arborescence complète",
                    app.panel.display_name()
                ))
                .size(12),
                row![
                    button("✅ Importer").on_press(Message::DialogConfirm),
                    button("❌ Ignorer").on_press(Message::DialogCancel),
                ]
                .spacing(6),
            ]
            .spacing(8)
            .into()
        }
        Dialog::ChooseDestination { paths, folders } => {
            let mut destinations = column![
                button(text(format!("🏠 Racine de {}", app.panel.display_name())).size(13))
                    .on_press(Message::DestinationChosen(None))
                    .width(Length::Fill),
            ]
            .spacing(4);
            for folder in folders {
                destinations = destinations.push(
                    button(text(format!("📁 {}", folder.name)).size(13))
                        .style(button::secondary)
                        .on_press(Message::DestinationChosen(Some(folder.id)))
                        .width(Length::Fill),
                );
            }
            column![
                text(format!("📌 Destination pour {} fichier(s)", paths.len())).size(15),
                scrollable(destinations).height(Length::Fixed(180.0)),
                button("❌ Annuler").on_press(Message::DialogCancel),
            ]
            .spacing(8)
            .into()
        }
    };

    container(body)
        .style(container::rounded_box)
        .padding(14)
        .width(Length::Fill)
        .into()
}
