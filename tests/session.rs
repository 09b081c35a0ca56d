use twinmark::document::{EditorMode, FormattingCommand};
use twinmark::selection::{self, Selection};
use twinmark::session::{CommandOutcome, EditorSession};
use twinmark::view::{Boundary, NodeId, ViewRange, ViewSurface, ViewTree};

fn first_text(view: &ViewTree) -> NodeId {
    view.descendants(view.root())
        .into_iter()
        .find(|n| view.is_text(*n))
        .unwrap()
}

#[test]
fn test_caret_inside_twenty_chars_survives_command() {
    let mut session = EditorSession::load("abcdefghijklmnopqrst");
    session.set_mode(EditorMode::RichText);
    let node = first_text(session.document().view());
    assert!(session.remember_selection(ViewRange::collapsed(Boundary::new(node, 5))));

    session.apply_command(&FormattingCommand::italic());

    let view = session.document().view();
    let range = session.stored_selection().unwrap();
    assert_eq!(range, ViewRange::collapsed(Boundary::new(first_text(view), 5)));
    assert_eq!(
        selection::capture_offsets(view, &range),
        Some(Selection::caret(5))
    );
}

#[test]
fn test_rich_then_markdown_editing_round_trip() {
    let mut session = EditorSession::load("# Notes\n\nfirst line");
    session.set_mode(EditorMode::RichText);

    let view = session.document().view();
    let nodes: Vec<NodeId> = view
        .descendants(view.root())
        .into_iter()
        .filter(|n| view.text(*n) == Some("first line"))
        .collect();
    let range = ViewRange::new(Boundary::new(nodes[0], 0), Boundary::new(nodes[0], 5));
    assert!(session.remember_selection(range));
    assert_eq!(
        session.apply_command(&FormattingCommand::bold()),
        CommandOutcome::Native
    );
    assert_eq!(session.markdown(), "# Notes\n\n**first** line");

    session.set_mode(EditorMode::Markdown);
    let end = session.document().source().len_chars();
    session.select_source(Selection::caret(end));
    session.apply_command(&FormattingCommand::link("https://x.io"));
    assert_eq!(session.markdown(), "# Notes\n\n**first** line[](https://x.io)");
    assert!(
        session
            .document()
            .view()
            .inner_html()
            .contains("<strong>first</strong> line")
    );
}

#[test]
fn test_disabled_native_commands_fall_back_for_bold() {
    let mut session = EditorSession::load("one two three");
    session.set_mode(EditorMode::RichText);
    session.document_mut().view_mut().set_native_commands(false);
    let node = first_text(session.document().view());
    session.remember_selection(ViewRange::new(Boundary::new(node, 4), Boundary::new(node, 7)));

    assert_eq!(
        session.apply_command(&FormattingCommand::bold()),
        CommandOutcome::Wrapped
    );
    assert_eq!(session.markdown(), "one **two** three");

    let range = session.stored_selection().unwrap();
    assert_eq!(session.document().view().range_text(&range), "two");
}
