//! Reframe over realistic queue fixtures

use comfyq_doc::{FieldPath, QueueDocument};
use comfyq_edit::{reframe, FieldIssue, FrameCount};
use comfyq_test_utils::{mixed_video_queue, JobBuilder, QueueBuilder};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn at<'a>(doc: &'a QueueDocument, pointer: &str) -> &'a Value {
    let path: FieldPath = pointer.parse().unwrap();
    doc.get(&path).unwrap_or_else(|| panic!("nothing at {pointer}"))
}

fn frames(n: u64) -> FrameCount {
    FrameCount::new(n).unwrap()
}

#[test]
fn test_reframe_updates_length_and_ui_mirror() {
    let mut doc = QueueDocument::new(mixed_video_queue());
    reframe(&mut doc, frames(145));

    for job in ["/queue_running/0", "/queue_pending/0", "/queue_pending/1"] {
        assert_eq!(at(&doc, &format!("{job}/2/5/inputs/length")), &json!(145));
        assert_eq!(
            at(&doc, &format!("{job}/3/extra_pnginfo/workflow/nodes/0/widgets_values/2")),
            &json!(145)
        );
    }
}

#[test]
fn test_reframe_rewrites_prefixes_in_graph_and_ui() {
    let mut doc = QueueDocument::new(mixed_video_queue());
    reframe(&mut doc, frames(145));

    let expected = [
        ("/queue_running/0", "clips/hero-145f", "clips/hero-145f-still"),
        ("/queue_pending/0", "clips/v2-145f-final", "clips/v2-145f-final-still"),
        ("/queue_pending/1", "clips/plain-145f", "clips/plain-still-145f"),
    ];
    for (job, video, image) in expected {
        assert_eq!(at(&doc, &format!("{job}/2/9/inputs/filename_prefix")), &json!(video));
        assert_eq!(at(&doc, &format!("{job}/2/10/inputs/filename_prefix")), &json!(image));
        let ui = format!("{job}/3/extra_pnginfo/workflow/nodes");
        assert_eq!(at(&doc, &format!("{ui}/2/widgets_values/0")), &json!(video));
        assert_eq!(at(&doc, &format!("{ui}/3/widgets_values/0")), &json!(image));
    }
}

#[test]
fn test_reframe_change_set_counts() {
    let mut doc = QueueDocument::new(mixed_video_queue());
    let changes = reframe(&mut doc, frames(145));

    assert_eq!(changes.changes().len(), 18);
    assert_eq!(changes.effective_count(), 18);
    assert_eq!(changes.nodes_touched(), 9);
    assert!(changes.warnings().is_empty());
    assert_eq!(changes.orphan_ui(), 0);
}

#[test]
fn test_reframe_leaves_other_fields_alone() {
    let original = QueueDocument::new(mixed_video_queue());
    let mut doc = original.clone();
    reframe(&mut doc, frames(145));

    assert_eq!(at(&doc, "/exported_by"), at(&original, "/exported_by"));
    assert_eq!(at(&doc, "/queue_running/0/2/3"), at(&original, "/queue_running/0/2/3"));
    assert_eq!(
        at(&doc, "/queue_pending/0/3/extra_pnginfo/workflow/nodes/1"),
        at(&original, "/queue_pending/0/3/extra_pnginfo/workflow/nodes/1")
    );
    assert_eq!(at(&doc, "/queue_pending/1/2/5/inputs/width"), &json!(848));
}

#[test]
fn test_reframe_twice_is_a_no_op() {
    let mut doc = QueueDocument::new(mixed_video_queue());
    reframe(&mut doc, frames(97));
    let once = doc.clone();

    let second = reframe(&mut doc, frames(97));
    assert_eq!(doc, once);
    assert!(second.is_empty_run());
    assert_eq!(second.changes().len(), 18);
}

#[test]
fn test_reframe_skips_linked_and_malformed_fields() {
    let job = JobBuilder::new(1, "odd")
        .node("5", "EmptyHunyuanLatentVideo", json!({"length": ["20", 0]}))
        .ui("EmptyHunyuanLatentVideo", json!([848, 480, 89, 1]))
        .node("9", "SaveVideo", json!({"filename_prefix": 12}))
        .ui("SaveVideo", json!([]))
        .node("10", "SaveImage", json!({}))
        .ui("SaveImage", json!(["still-89f"]))
        .build();
    let mut doc = QueueDocument::new(QueueBuilder::new().pending(job).build());
    let changes = reframe(&mut doc, frames(145));

    let issues: Vec<(String, FieldIssue)> = changes
        .warnings()
        .iter()
        .map(|w| (w.field.to_string(), w.issue))
        .collect();
    assert_eq!(
        issues,
        vec![
            ("/queue_pending/0/2/5/inputs/length".to_string(), FieldIssue::Linked),
            ("/queue_pending/0/2/9/inputs/filename_prefix".to_string(), FieldIssue::NotString),
            (
                "/queue_pending/0/3/extra_pnginfo/workflow/nodes/1/widgets_values/0".to_string(),
                FieldIssue::SlotOutOfRange
            ),
            ("/queue_pending/0/2/10/inputs/filename_prefix".to_string(), FieldIssue::Missing),
        ]
    );

    assert_eq!(at(&doc, "/queue_pending/0/2/5/inputs/length"), &json!(["20", 0]));
    assert_eq!(
        at(&doc, "/queue_pending/0/3/extra_pnginfo/workflow/nodes/0/widgets_values/2"),
        &json!(145)
    );
    assert_eq!(
        at(&doc, "/queue_pending/0/3/extra_pnginfo/workflow/nodes/2/widgets_values/0"),
        &json!("still-145f")
    );
}

#[test]
fn test_reframe_rewrites_orphan_ui_nodes() {
    let job = JobBuilder::new(1, "orphan")
        .latent_video("5", 89)
        .ui("SaveVideo", json!(["clips/ghost-89f", "auto", "auto"]))
        .build();
    let mut doc = QueueDocument::new(QueueBuilder::new().pending(job).build());
    let changes = reframe(&mut doc, frames(33));

    assert_eq!(changes.orphan_ui(), 1);
    assert_eq!(
        at(&doc, "/queue_pending/0/3/extra_pnginfo/workflow/nodes/1/widgets_values/0"),
        &json!("clips/ghost-33f")
    );
    let orphan = changes.changes().last().unwrap();
    assert_eq!(orphan.node.node_id, "ui:1");
    assert_eq!(orphan.node.node_type, "SaveVideo");
}

#[test]
fn test_reframe_without_ui_mirror() {
    let job = JobBuilder::new(1, "bare")
        .latent_video("5", 89)
        .save_video("9", "bare-89f")
        .without_ui()
        .build();
    let mut doc = QueueDocument::new(QueueBuilder::new().failed(job).build());
    let changes = reframe(&mut doc, frames(21));

    assert_eq!(at(&doc, "/queue_failed/0/2/5/inputs/length"), &json!(21));
    assert_eq!(at(&doc, "/queue_failed/0/2/9/inputs/filename_prefix"), &json!("bare-21f"));
    assert_eq!(changes.changes().len(), 2);
    assert!(changes.warnings().is_empty());
}

#[test]
fn test_reframe_implicit_document() {
    let mut doc = QueueDocument::new(json!({
        "prompt": {
            "5": {"class_type": "EmptyHunyuanLatentVideo", "inputs": {"length": 89}},
            "9": {"class_type": "SaveVideo", "inputs": {"filename_prefix": "solo-89f"}}
        },
        "extra_data": {"extra_pnginfo": {"workflow": {"nodes": [
            {"type": "SaveVideo", "widgets_values": ["solo-89f"]},
            {"type": "EmptyHunyuanLatentVideo", "widgets_values": [848, 480, 89, 1]}
        ]}}}
    }));
    reframe(&mut doc, frames(49));

    assert_eq!(at(&doc, "/prompt/5/inputs/length"), &json!(49));
    assert_eq!(at(&doc, "/prompt/9/inputs/filename_prefix"), &json!("solo-49f"));
    assert_eq!(at(&doc, "/extra_data/extra_pnginfo/workflow/nodes/0/widgets_values/0"), &json!("solo-49f"));
    assert_eq!(at(&doc, "/extra_data/extra_pnginfo/workflow/nodes/1/widgets_values/2"), &json!(49));
}

#[test]
fn test_reframe_graphless_job_rewrites_ui_mirror() {
    let mut doc = QueueDocument::new(json!({
        "queue_pending": [[1, "x", null, {"extra_pnginfo": {"workflow": {"nodes": [
            {"type": "EmptyHunyuanLatentVideo", "widgets_values": [848, 480, 89, 1]},
            {"type": "SaveVideo", "widgets_values": ["clips/ui-89f"]}
        ]}}}]]
    }));
    let changes = reframe(&mut doc, frames(145));

    let nodes = "/queue_pending/0/3/extra_pnginfo/workflow/nodes";
    assert_eq!(at(&doc, &format!("{nodes}/0/widgets_values/2")), &json!(145));
    assert_eq!(at(&doc, &format!("{nodes}/1/widgets_values/0")), &json!("clips/ui-145f"));
    assert_eq!(changes.effective_count(), 2);
    assert!(at(&doc, "/queue_pending/0/2").is_null());
}
