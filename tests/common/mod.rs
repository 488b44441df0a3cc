//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

pub const ID_A: &str = "aaaaaaaa-1111-4111-8111-111111111111";
pub const ID_B: &str = "bbbbbbbb-2222-4222-8222-222222222222";
pub const ID_C: &str = "cccccccc-3333-4333-8333-333333333333";
pub const ID_D: &str = "dddddddd-4444-4444-8444-444444444444";

/// Builder for test storage roots (the `projects` directory)
pub struct StoreBuilder {
    temp_dir: TempDir,
}

impl StoreBuilder {
    /// Create a new builder with an empty storage root
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the storage root
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a project directory with the given raw name and transcripts
    pub fn with_project_dir(self, dir_name: &str, transcripts: &[TranscriptBuilder]) -> Self {
        let project_dir = self.temp_dir.path().join(dir_name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");

        for transcript in transcripts {
            transcript.create_in(&project_dir);
        }

        self
    }

    /// Add a project directory named by encoding `project_path`
    pub fn with_project(self, project_path: &str, transcripts: &[TranscriptBuilder]) -> Self {
        let dir_name = claude_bushwack::encode_path(Path::new(project_path)).expect("Failed to encode project path");
        self.with_project_dir(&dir_name, transcripts)
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `<id>.jsonl` transcript
pub struct TranscriptBuilder {
    id: String,
    lines: Vec<String>,
}

impl TranscriptBuilder {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), lines: Vec::new() }
    }

    pub fn with_record(mut self, record: RecordBuilder) -> Self {
        self.lines.push(record.to_json());
        self
    }

    /// Append a raw line, e.g. deliberately malformed JSON
    pub fn with_raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.jsonl", self.id))
    }

    pub fn create_in(&self, dir: &Path) {
        let mut content = self.lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(self.path_in(dir), content).expect("Failed to write transcript");
    }
}

/// Builder for transcript records
pub struct RecordBuilder {
    fields: Map<String, Value>,
}

impl RecordBuilder {
    fn with_type(record_type: &str, role: &str, text: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("type".to_string(), json!(record_type));
        fields.insert("message".to_string(), json!({ "role": role, "content": text }));
        Self { fields }
    }

    /// A user message
    pub fn user(text: &str) -> Self {
        Self::with_type("user", "user", text)
    }

    /// An assistant message
    pub fn assistant(text: &str) -> Self {
        Self::with_type("assistant", "assistant", text)
    }

    /// A leading summary record
    pub fn summary(text: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("type".to_string(), json!("summary"));
        fields.insert("summary".to_string(), json!(text));
        Self { fields }
    }

    pub fn parent(self, parent: &str) -> Self {
        self.field("parentUuid", json!(parent))
    }

    pub fn session(self, session_id: &str) -> Self {
        self.field("sessionId", json!(session_id))
    }

    pub fn cwd(self, cwd: &str) -> Self {
        self.field("cwd", json!(cwd))
    }

    pub fn git_branch(self, branch: &str) -> Self {
        self.field("gitBranch", json!(branch))
    }

    /// RFC 3339 timestamp
    pub fn timestamp(self, timestamp: &str) -> Self {
        self.field("timestamp", json!(timestamp))
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.fields).expect("Failed to serialize record")
    }
}

/// Parse every line of a transcript that is valid JSON
pub fn read_records(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("Failed to read transcript")
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// `/home/u/proj` with `A` and `B (parent A)`, each a short exchange
pub fn example_store() -> TempDir {
    StoreBuilder::new()
        .with_project(
            "/home/u/proj",
            &[
                TranscriptBuilder::new(ID_A)
                    .with_record(
                        RecordBuilder::user("Set up the parser")
                            .session(ID_A)
                            .cwd("/home/u/proj")
                            .git_branch("main")
                            .timestamp("2024-03-01T10:00:00Z"),
                    )
                    .with_record(
                        RecordBuilder::assistant("Done")
                            .session(ID_A)
                            .cwd("/home/u/proj")
                            .timestamp("2024-03-01T10:05:00Z"),
                    ),
                TranscriptBuilder::new(ID_B)
                    .with_record(
                        RecordBuilder::user("Try another approach")
                            .parent(ID_A)
                            .session(ID_B)
                            .cwd("/home/u/proj")
                            .timestamp("2024-03-02T09:00:00Z"),
                    )
                    .with_record(
                        RecordBuilder::assistant("Sure")
                            .session(ID_B)
                            .cwd("/home/u/proj")
                            .timestamp("2024-03-02T09:01:00Z"),
                    ),
            ],
        )
        .build()
}
