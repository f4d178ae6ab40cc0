//! Search screen: filter the whole catalog by filename and document type.

use iced::widget::{button, column, container, pick_list, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};

use crate::ui::display_size;
use crate::{DocuDesk, Message, Screen, SearchHit};

/// Document-type filter of the search screen. Maps to one concrete
/// extension per family, the way the catalog stores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Pdf,
    Word,
    Excel,
    Text,
    Image,
}

impl TypeFilter {
    pub const ALL: [TypeFilter; 6] = [
        TypeFilter::All,
        TypeFilter::Pdf,
        TypeFilter::Word,
        TypeFilter::Excel,
        TypeFilter::Text,
        TypeFilter::Image,
    ];

    /// Extension passed to the store; empty means no extension criterion.
    pub fn extension(&self) -> &'static str {
        match self {
            TypeFilter::All => "",
            TypeFilter::Pdf => "pdf",
            TypeFilter::Word => "docx",
            TypeFilter::Excel => "xlsx",
            TypeFilter::Text => "txt",
            TypeFilter::Image => "png",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TypeFilter::All => "Tous",
            TypeFilter::Pdf => "PDF",
            TypeFilter::Word => "Word",
            TypeFilter::Excel => "Excel",
            TypeFilter::Text => "Texte",
            TypeFilter::Image => "Image",
        }
    }
}

impl std::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Build the search screen.
pub fn view(app: &DocuDesk) -> Element<Message> {
    let header = row![
        text("🔍 Recherche de Fichiers").size(24),
        iced::widget::horizontal_space(),
        button("📁 Administration").on_press(Message::SwitchScreen(Screen::Admin)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let criteria = row![
        text_input("Nom du fichier...", &app.search.name)
            .on_input(Message::SearchNameChanged)
            .on_submit(Message::SearchSubmitted)
            .width(Length::Fill),
        pick_list(
            TypeFilter::ALL,
            Some(app.search.kind),
            Message::SearchTypeSelected
        ),
        button("🔍 Rechercher").on_press(Message::SearchSubmitted),
        button("🧹 Effacer").on_press(Message::SearchCleared),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let shortcuts = row![
        text("🚀 Filtres rapides:").size(13),
        button(text("📕 PDF").size(13)).on_press(Message::SearchTypeSelected(TypeFilter::Pdf)),
        button(text("📘 Word").size(13)).on_press(Message::SearchTypeSelected(TypeFilter::Word)),
        button(text("📗 Excel").size(13)).on_press(Message::SearchTypeSelected(TypeFilter::Excel)),
        button(text("🌐 Tous").size(13)).on_press(Message::SearchCleared),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let results_label = text(format!("Résultats - {} fichier(s)", app.search.hits.len())).size(16);

    let results: Element<Message> = if app.search.hits.is_empty() {
        container(
            column![
                text("📭").size(48),
                text("Aucun fichier trouvé").size(16),
                text("Modifiez vos critères de recherche").size(12),
            ]
            .spacing(6)
            .align_x(Alignment::Center),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(40)
        .into()
    } else {
        let mut cards = column![].spacing(4);
        for hit in &app.search.hits {
            cards = cards.push(hit_card(app, hit));
        }
        scrollable(cards).height(Length::Fill).into()
    };

    let content = column![
        header,
        criteria,
        shortcuts,
        results_label,
        results,
        text(&app.status).size(13),
    ]
    .spacing(12)
    .padding(16);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// One result card: glyph, filename, parent folder, open/locate actions.
fn hit_card<'a>(app: &'a DocuDesk, hit: &'a SearchHit) -> Element<'a, Message> {
    let extension = hit.file.extension();
    let icon = app.handler.file_icon(&extension);
    let is_pdf = extension == "pdf";

    let folder_name = hit.folder_name.as_deref().unwrap_or("Dossier supprimé");
    let panel_name = hit.panel.map(|p| p.display_name()).unwrap_or("?");
    let type_tag = if is_pdf { "🔒 PDF" } else { "💾 Téléchargeable" };
    let meta = format!(
        "📁 {} ({}) • {} • {}",
        folder_name,
        panel_name,
        display_size(hit.file.file_size, &hit.file.filepath),
        type_tag
    );

    let open_label = if is_pdf { "👁️ Voir" } else { "📥 Ouvrir" };

    container(
        row![
            text(icon).size(24),
            column![
                text(&hit.file.filename).size(14),
                text(meta).size(11),
            ]
            .spacing(2)
            .width(Length::Fill),
            button(text(open_label).size(12)).on_press(Message::OpenFile(hit.file.id)),
            button(text("📍").size(12)).on_press(Message::LocateFile(hit.file.id)),
        ]
        .spacing(10)
        .align_y(Alignment::Center),
    )
    .style(container::rounded_box)
    .padding(10)
    .width(Length::Fill)
    .into()
}
