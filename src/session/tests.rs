use chrono::{TimeZone, Utc};

use crate::document::{BlockStyle, EditorMode, FormattingCommand};
use crate::post::{PostForm, PostMeta, SaveResponse};
use crate::selection::Selection;
use crate::view::{Boundary, NodeId, ViewRange, ViewSurface, ViewTree};

use super::{CommandOutcome, EditorSession};

fn text_nodes(view: &ViewTree) -> Vec<NodeId> {
    view.descendants(view.root())
        .into_iter()
        .filter(|n| view.is_text(*n))
        .collect()
}

fn rich_session(markdown: &str) -> EditorSession {
    let mut session = EditorSession::load(markdown);
    session.set_mode(EditorMode::RichText);
    session
}

/// Select `start..end` inside the first text node of the view.
fn select_in_first_text(session: &mut EditorSession, start: usize, end: usize) {
    let node = text_nodes(session.document().view())[0];
    let range = ViewRange::new(Boundary::new(node, start), Boundary::new(node, end));
    assert!(session.remember_selection(range));
}

fn stored_text(session: &EditorSession) -> String {
    let range = session.stored_selection().unwrap();
    session.document().view().range_text(&range)
}

#[test]
fn test_load_starts_in_markdown_mode() {
    let session = EditorSession::load("# Title\n\nbody");
    assert_eq!(session.mode(), EditorMode::Markdown);
    assert_eq!(
        session.document().view().inner_html(),
        "<h1>Title</h1>\n<p>body</p>"
    );
    assert!(session.stored_selection().is_none());
}

#[test]
fn test_switch_to_rich_puts_caret_at_end() {
    let mut session = rich_session("hello");
    let view = session.document().view();
    let root = view.root();
    let expected = ViewRange::collapsed(Boundary::new(root, view.children(root).len()));
    assert_eq!(session.stored_selection(), Some(expected));

    session.set_mode(EditorMode::RichText);
    assert_eq!(session.stored_selection(), Some(expected));
}

#[test]
fn test_switch_to_markdown_serializes_view() {
    let mut session = rich_session("plain");
    session
        .document_mut()
        .view_mut()
        .set_inner_html("<p><em>changed</em></p>");
    session.set_mode(EditorMode::Markdown);
    assert_eq!(session.markdown(), "*changed*");
}

#[test]
fn test_on_view_input_resyncs_markdown() {
    let mut session = rich_session("x");
    session
        .document_mut()
        .view_mut()
        .set_inner_html("<h2>typed</h2>");
    session.on_view_input();
    assert_eq!(session.markdown(), "## typed");
}

#[test]
fn test_bold_native_keeps_selection() {
    let mut session = rich_session("hello world");
    select_in_first_text(&mut session, 6, 11);

    let outcome = session.apply_command(&FormattingCommand::bold());

    assert_eq!(outcome, CommandOutcome::Native);
    assert_eq!(session.markdown(), "hello **world**");
    assert_eq!(
        session.document().view().inner_html(),
        "<p>hello <strong>world</strong></p>"
    );
    assert_eq!(stored_text(&session), "world");
}

#[test]
fn test_italic_falls_back_without_native_support() {
    let mut session = rich_session("hello world");
    session.document_mut().view_mut().set_native_commands(false);
    select_in_first_text(&mut session, 0, 5);

    let outcome = session.apply_command(&FormattingCommand::italic());

    assert_eq!(outcome, CommandOutcome::Wrapped);
    assert_eq!(session.markdown(), "*hello* world");
    assert_eq!(stored_text(&session), "hello");
}

#[test]
fn test_fallback_ignores_other_commands() {
    let mut session = rich_session("hello");
    session.document_mut().view_mut().set_native_commands(false);
    select_in_first_text(&mut session, 0, 5);

    let outcome = session.apply_command(&FormattingCommand::heading(1));

    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(session.markdown(), "hello");
}

#[test]
fn test_collapsed_fallback_is_a_no_op() {
    let mut session = rich_session("hello");
    session.document_mut().view_mut().set_native_commands(false);
    select_in_first_text(&mut session, 2, 2);

    let outcome = session.apply_command(&FormattingCommand::bold());

    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(session.markdown(), "hello");
    assert!(!session.document().is_dirty());
}

#[test]
fn test_heading_command_keeps_caret() {
    let mut session = rich_session("title text");
    select_in_first_text(&mut session, 3, 3);

    let outcome = session.apply_command(&FormattingCommand::heading(2));

    assert_eq!(outcome, CommandOutcome::Native);
    assert_eq!(session.markdown(), "## title text");
    let range = session.stored_selection().unwrap();
    assert!(range.is_collapsed());
    let node = text_nodes(session.document().view())[0];
    assert_eq!(range.start, Boundary::new(node, 3));
}

#[test]
fn test_stale_range_is_replaced_after_rerender() {
    let mut session = rich_session("some text");
    select_in_first_text(&mut session, 0, 4);
    let old = session.stored_selection().unwrap();

    session.document_mut().sync_view();

    assert!(!session.remember_selection(old));
    let restored = session.restore_selection();
    let view = session.document().view();
    let root = view.root();
    assert_eq!(
        restored,
        ViewRange::collapsed(Boundary::new(root, view.children(root).len()))
    );
    assert_eq!(session.stored_selection(), Some(restored));
}

#[test]
fn test_command_on_stale_selection_uses_end_caret() {
    let mut session = rich_session("some text");
    select_in_first_text(&mut session, 0, 4);
    session.document_mut().sync_view();

    let outcome = session.apply_command(&FormattingCommand::bold());

    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(session.markdown(), "some text");
}

#[test]
fn test_markdown_mode_wraps_source_selection() {
    let mut session = EditorSession::load("hello there");
    session.select_source(Selection::new(0, 5));

    let outcome = session.apply_command(&FormattingCommand::bold());

    assert_eq!(outcome, CommandOutcome::Inserted);
    assert_eq!(session.markdown(), "**hello** there");
    assert_eq!(
        session.document().source().selection(),
        Selection::caret(9)
    );
    assert_eq!(
        session.document().view().inner_html(),
        "<p><strong>hello</strong> there</p>"
    );
}

#[test]
fn test_markdown_mode_block_markers() {
    let mut session = EditorSession::load("text");
    session.select_source(Selection::caret(0));
    session.apply_command(&FormattingCommand::heading(3));
    assert_eq!(session.markdown(), "### text");

    let mut session = EditorSession::load("a");
    session.select_source(Selection::new(0, 1));
    session.apply_command(&FormattingCommand::link("https://x.io"));
    assert_eq!(session.markdown(), "[a](https://x.io)");

    let mut session = EditorSession::load("a");
    let outcome = session.apply_command(&FormattingCommand::Block(BlockStyle::Paragraph));
    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(session.markdown(), "a");
}

#[test]
fn test_sessions_are_independent() {
    let mut first = rich_session("one");
    let second = EditorSession::load("two");
    select_in_first_text(&mut first, 0, 3);
    first.apply_command(&FormattingCommand::bold());
    assert_eq!(first.markdown(), "**one**");
    assert_eq!(second.markdown(), "two");
    assert_eq!(second.mode(), EditorMode::Markdown);
}

#[test]
fn test_save_request_from_form() {
    let mut session = rich_session("body");
    session
        .document_mut()
        .view_mut()
        .set_inner_html("<p><strong>body</strong></p>");
    let form = PostForm {
        content_dir: "src/content/blog".to_string(),
        slug: "my-post".to_string(),
        title: "  My Post ".to_string(),
        description: " about ".to_string(),
        cover_url: "   ".to_string(),
        pub_date: "2024-05-01T10:30".to_string(),
        draft: true,
        tags_input: "rust, web\nnotes".to_string(),
        ..PostForm::default()
    };

    let request = session.save_request(&form);

    assert_eq!(request.path.as_deref(), Some("src/content/blog/my-post.md"));
    assert_eq!(request.title.as_deref(), Some("My Post"));
    assert_eq!(request.description.as_deref(), Some("about"));
    assert_eq!(request.cover_url, None);
    assert_eq!(request.pub_date.as_deref(), Some("2024-05-01T10:30:00.000Z"));
    assert_eq!(request.draft, Some(true));
    assert_eq!(
        request.tags.as_deref(),
        Some(&["rust".to_string(), "web".to_string(), "notes".to_string()][..])
    );
    assert_eq!(request.content_markdown, "**body**");
}

#[test]
fn test_apply_save_response_updates_form() {
    let mut session = EditorSession::load("x");
    session.select_source(Selection::caret(1));
    session.apply_command(&FormattingCommand::bold());
    assert!(session.document().is_dirty());

    let mut form = PostForm::default();
    let when = Utc.with_ymd_and_hms(2024, 7, 8, 9, 10, 0).unwrap();
    let response = SaveResponse {
        updated: true,
        renamed: true,
        filename: "renamed.md".to_string(),
        path: "blog/renamed.md".to_string(),
        meta: PostMeta {
            title: "T".to_string(),
            description: "D".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            draft: true,
            cover_url: "c.png".to_string(),
            pub_date: Some(crate::frontmatter::to_iso(&when)),
            updated_date: None,
        },
    };

    session.apply_save_response(&mut form, &response);

    assert_eq!(form.filename, "renamed.md");
    assert_eq!(form.slug, "renamed");
    assert_eq!(form.title, "T");
    assert_eq!(form.tags_input, "a, b");
    assert_eq!(form.pub_date, "2024-07-08T09:10");
    assert!(form.draft);
    assert_eq!(form.cover_url, "c.png");
    assert!(!session.document().is_dirty());
}
