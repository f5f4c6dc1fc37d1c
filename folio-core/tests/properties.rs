mod common;

use std::sync::Arc;

use common::{completed, session, FakeDocument};
use folio_core::{
    Admission, LoadedDocument, Locator, RenderJob, RenderPipeline, RenderRequest, StatusMessage,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Next,
    Previous,
    GoTo(u32),
    ZoomIn,
    ZoomOut,
    /// The outstanding render, if any, finishes.
    Complete,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Next),
        3 => Just(Op::Previous),
        1 => (0u32..12).prop_map(Op::GoTo),
        2 => Just(Op::ZoomIn),
        2 => Just(Op::ZoomOut),
        3 => Just(Op::Complete),
    ]
}

fn document(pages: u32) -> LoadedDocument {
    LoadedDocument {
        locator: Locator::Local("assets/pdf/generated.pdf".into()),
        title: "Generated".to_string(),
        document: Arc::new(FakeDocument::new(pages)),
    }
}

proptest! {
    #[test]
    fn session_invariants_hold_for_any_input(pages in 1u32..8, ops in prop::collection::vec(op(), 0..60)) {
        let mut session = session();
        let mut outstanding: Option<RenderJob> = Some(session.install(document(pages)));

        for op in ops {
            let zoom_before = session.status().zoom_percent;
            let started = match op {
                Op::Next => session.next_page(),
                Op::Previous => session.previous_page(),
                Op::GoTo(page) => session.go_to_page(page),
                Op::ZoomIn => session.zoom_in(),
                Op::ZoomOut => session.zoom_out(),
                Op::Complete => match outstanding.take() {
                    Some(job) => session.finish_render(completed(&job)),
                    None => None,
                },
            };

            if let Some(job) = started {
                // Single flight: nothing may start while a job is outstanding.
                prop_assert!(outstanding.is_none());
                outstanding = Some(job);
            }
            prop_assert_eq!(session.status().rendering, outstanding.is_some());

            let page = session.current_page();
            prop_assert!((1..=pages).contains(&page));

            let zoom = session.status().zoom_percent;
            prop_assert!((50..=300).contains(&zoom));
            let step = zoom.abs_diff(zoom_before);
            prop_assert!(step == 0 || step == 20 || zoom == 50 || zoom == 300);
        }

        // Draining converges on whatever was asked for last.
        while let Some(job) = outstanding.take() {
            outstanding = session.finish_render(completed(&job));
        }
        prop_assert_eq!(session.drawn_page(), Some(session.current_page()));
        prop_assert_eq!(session.status().page, Some(session.current_page()));
        let width = session.surface().buffer().width();
        prop_assert_eq!(width, (10.0 * session.scale()).round() as u32);
        prop_assert_eq!(session.message(), &StatusMessage::None);
    }

    #[test]
    fn busy_requests_yield_exactly_one_follow_up(first in 1u32..50, later in prop::collection::vec(1u32..50, 1..20)) {
        let mut pipeline = RenderPipeline::new();
        let request = |page| RenderRequest { page, scale: 1.2 };
        prop_assert_eq!(pipeline.submit(request(first)), Admission::Start(request(first)));

        for &page in &later {
            prop_assert_eq!(pipeline.submit(request(page)), Admission::Coalesced);
        }

        let last = *later.last().unwrap();
        prop_assert_eq!(pipeline.complete(), Some(request(last)));
        prop_assert_eq!(pipeline.complete(), None);
        prop_assert!(pipeline.is_idle());
    }
}
