//! Testing utilities for comfyq workspace
//!
//! Builders for saved-queue fixtures. Everything here produces plain
//! `serde_json::Value`s so any crate can use it without a dependency cycle.

#![allow(missing_docs)]

use serde_json::{json, Map, Value};

/// Builds one job envelope in the `[number, prompt_id, graph, meta, outputs]` shape
#[derive(Debug, Clone)]
pub struct JobBuilder {
    number: u64,
    prompt_id: String,
    graph: Map<String, Value>,
    ui_nodes: Option<Vec<Value>>,
}

impl JobBuilder {
    pub fn new(number: u64, prompt_id: &str) -> Self {
        Self {
            number,
            prompt_id: prompt_id.to_string(),
            graph: Map::new(),
            ui_nodes: Some(Vec::new()),
        }
    }

    /// Graph node with arbitrary inputs
    #[must_use]
    pub fn node(mut self, id: &str, class_type: &str, inputs: Value) -> Self {
        self.graph.insert(
            id.to_string(),
            json!({"inputs": inputs, "class_type": class_type, "_meta": {"title": class_type}}),
        );
        self
    }

    /// UI mirror node with positional widget values
    #[must_use]
    pub fn ui(mut self, node_type: &str, widgets_values: Value) -> Self {
        let nodes = self.ui_nodes.get_or_insert_with(Vec::new);
        let id = nodes.len() + 1;
        nodes.push(json!({
            "id": id,
            "type": node_type,
            "pos": [100 * id, 200],
            "widgets_values": widgets_values,
        }));
        self
    }

    /// Drop the `extra_pnginfo` metadata entirely
    #[must_use]
    pub fn without_ui(mut self) -> Self {
        self.ui_nodes = None;
        self
    }

    /// Sampler in the graph and in the UI mirror
    #[must_use]
    pub fn sampler(self, id: &str, seed: u64) -> Self {
        self.node(
            id,
            "KSampler",
            json!({"seed": seed, "steps": 20, "cfg": 7.5, "model": ["4", 0]}),
        )
        .ui("KSampler", json!([seed, "randomize", 20, 7.5, "euler", "normal", 1.0]))
    }

    /// Latent video source in the graph and in the UI mirror
    #[must_use]
    pub fn latent_video(self, id: &str, length: u64) -> Self {
        self.node(
            id,
            "EmptyHunyuanLatentVideo",
            json!({"width": 848, "height": 480, "length": length, "batch_size": 1}),
        )
        .ui("EmptyHunyuanLatentVideo", json!([848, 480, length, 1]))
    }

    /// Video output in the graph and in the UI mirror
    #[must_use]
    pub fn save_video(self, id: &str, prefix: &str) -> Self {
        self.node(
            id,
            "SaveVideo",
            json!({"filename_prefix": prefix, "format": "auto", "codec": "auto", "video": ["8", 0]}),
        )
        .ui("SaveVideo", json!([prefix, "auto", "auto"]))
    }

    /// Image output in the graph and in the UI mirror
    #[must_use]
    pub fn save_image(self, id: &str, prefix: &str) -> Self {
        self.node(id, "SaveImage", json!({"filename_prefix": prefix, "images": ["8", 0]}))
            .ui("SaveImage", json!([prefix]))
    }

    pub fn build(self) -> Value {
        let meta = match self.ui_nodes {
            Some(nodes) => json!({
                "extra_pnginfo": {
                    "workflow": {
                        "last_node_id": nodes.len(),
                        "nodes": nodes,
                        "links": [],
                        "version": 0.4
                    }
                },
                "client_id": "fixture-client"
            }),
            None => json!({"client_id": "fixture-client"}),
        };
        let outputs: Vec<String> = self.graph.keys().cloned().collect();
        json!([self.number, self.prompt_id, Value::Object(self.graph), meta, outputs])
    }
}

/// Builds a saved queue document
#[derive(Debug, Clone, Default)]
pub struct QueueBuilder {
    running: Option<Vec<Value>>,
    pending: Option<Vec<Value>>,
    failed: Option<Vec<Value>>,
}

impl QueueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn running(mut self, job: Value) -> Self {
        self.running.get_or_insert_with(Vec::new).push(job);
        self
    }

    #[must_use]
    pub fn pending(mut self, job: Value) -> Self {
        self.pending.get_or_insert_with(Vec::new).push(job);
        self
    }

    #[must_use]
    pub fn failed(mut self, job: Value) -> Self {
        self.failed.get_or_insert_with(Vec::new).push(job);
        self
    }

    pub fn build(self) -> Value {
        let mut root = Map::new();
        if let Some(jobs) = self.running {
            root.insert("queue_running".to_string(), Value::Array(jobs));
        }
        if let Some(jobs) = self.pending {
            root.insert("queue_pending".to_string(), Value::Array(jobs));
        }
        if let Some(jobs) = self.failed {
            root.insert("queue_failed".to_string(), Value::Array(jobs));
        }
        root.insert("exported_by".to_string(), json!({"tool": "fixture", "note": "keep me"}));
        Value::Object(root)
    }
}

/// Job with two samplers seeded `a` and `b`
pub fn two_sampler_job(number: u64, prompt_id: &str, a: u64, b: u64) -> Value {
    JobBuilder::new(number, prompt_id)
        .sampler("3", a)
        .node("6", "CLIPTextEncode", json!({"text": "a cat", "clip": ["4", 1]}))
        .sampler("12", b)
        .build()
}

/// Job that renders `length` frames to a video and a preview image
pub fn video_job(number: u64, prompt_id: &str, length: u64, prefix: &str) -> Value {
    JobBuilder::new(number, prompt_id)
        .latent_video("5", length)
        .sampler("3", 42)
        .save_video("9", prefix)
        .save_image("10", &format!("{prefix}-still"))
        .build()
}

/// Three pending jobs with two samplers each
pub fn three_job_queue() -> Value {
    QueueBuilder::new()
        .pending(two_sampler_job(1, "job-a", 11, 12))
        .pending(two_sampler_job(2, "job-b", 21, 22))
        .pending(two_sampler_job(3, "job-c", 31, 32))
        .build()
}

/// One running and two pending video jobs
pub fn mixed_video_queue() -> Value {
    QueueBuilder::new()
        .running(video_job(1, "run-1", 89, "clips/hero-89f"))
        .pending(video_job(2, "pend-1", 89, "clips/v2-89f-final"))
        .pending(video_job(3, "pend-2", 61, "clips/plain"))
        .build()
}
