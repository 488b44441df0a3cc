use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use super::commit::PendingTranscript;
use super::git::detect_git_branch;
use super::rewrite::{ParentLink, Relocation, RewritePlan, rewrite_transcript};
use crate::config::RewriteConfig;
use crate::error::BranchError;
use crate::models::{Catalog, ConversationRecord, IdRegistry};
use crate::parsers::parse_conversation_file;
use crate::utils::{encode_path, legacy_dir_name, safe_open_file};

/// Identifier attempts before giving up with a conflict
pub const DEFAULT_MAX_ID_ATTEMPTS: usize = 16;

type IdGenerator<'a> = Box<dyn FnMut() -> String + 'a>;

/// Creates branches and copies of conversations
///
/// New identifiers must be unknown to the injected [`IdRegistry`] and unused as a
/// file name in the destination directory. The source transcript is only ever
/// opened for reading.
pub struct BranchEngine<'a> {
    storage_root: PathBuf,
    registry: &'a dyn IdRegistry,
    config: RewriteConfig,
    id_generator: IdGenerator<'a>,
    max_id_attempts: usize,
}

impl<'a> BranchEngine<'a> {
    pub fn new(storage_root: impl Into<PathBuf>, registry: &'a dyn IdRegistry) -> Self {
        Self {
            storage_root: storage_root.into(),
            registry,
            config: RewriteConfig::default(),
            id_generator: Box::new(|| Uuid::new_v4().to_string()),
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
        }
    }

    pub fn with_config(mut self, config: RewriteConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the UUID v4 generator, e.g. to force collisions in tests
    pub fn with_id_generator(mut self, generator: impl FnMut() -> String + 'a) -> Self {
        self.id_generator = Box::new(generator);
        self
    }

    pub fn with_max_id_attempts(mut self, attempts: usize) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    /// Create a branch of `source`, optionally relocated to `target_project`
    ///
    /// Without a target the branch is written next to the source. The first record
    /// of the new transcript names the source as its parent.
    ///
    /// # Errors
    ///
    /// - [`BranchError::SourceNotFound`] if the source transcript is gone
    /// - [`BranchError::Codec`] if the target is not a valid absolute path
    /// - [`BranchError::BranchConflict`] if no unused identifier could be found or
    ///   the final file name appeared during the write
    /// - [`BranchError::Io`] / [`BranchError::Serialize`] for write failures
    ///
    /// No partial file is left under a final name on any error.
    pub fn branch(
        &mut self,
        source: &ConversationRecord,
        target_project: Option<&Path>,
    ) -> Result<ConversationRecord, BranchError> {
        self.duplicate(source, target_project, ParentLink::Source)
    }

    /// Copy `source` into `target_project` as a stand-alone conversation
    ///
    /// Same as [`branch`](Self::branch) except the copy records no parent.
    ///
    /// # Errors
    ///
    /// See [`branch`](Self::branch).
    pub fn copy_to(
        &mut self,
        source: &ConversationRecord,
        target_project: &Path,
    ) -> Result<ConversationRecord, BranchError> {
        self.duplicate(source, Some(target_project), ParentLink::Detached)
    }

    fn duplicate(
        &mut self,
        source: &ConversationRecord,
        target_project: Option<&Path>,
        parent: ParentLink,
    ) -> Result<ConversationRecord, BranchError> {
        let source_bytes = read_source(source)?;

        let (dest_dir, project_path) = match target_project {
            Some(target) => (self.destination_dir(source, target)?, target.to_path_buf()),
            None => (source.project_dir.clone(), source.project_path.clone()),
        };
        fs::create_dir_all(&dest_dir).map_err(|e| BranchError::io(&dest_dir, e))?;

        let new_id = self.generate_id(source, &dest_dir)?;
        let final_path = dest_dir.join(transcript_file_name(&new_id));

        let relocation = target_project.map(|target| Relocation {
            from_path: source.project_path.clone(),
            to_path: target.to_path_buf(),
            from_dir: source.project_dir.clone(),
            to_dir: dest_dir.clone(),
            git_branch: detect_git_branch(target),
        });
        let plan = RewritePlan { config: &self.config, source_id: source.id.clone(), new_id, parent, relocation };

        let contents = rewrite_transcript(&source_bytes, &plan)
            .map_err(|e| BranchError::Serialize { path: final_path.clone(), source: e })?;

        let mut pending = PendingTranscript::create(&final_path)?;
        pending.write_all(&contents)?;
        let committed = pending.commit()?;

        let record = parse_conversation_file(&committed, &project_path).map_err(|e| BranchError::io(&committed, e))?;

        info!(
            source = %source.id,
            new = %record.id,
            path = %committed.display(),
            detached = parent == ParentLink::Detached,
            "created conversation"
        );

        Ok(record)
    }

    /// Storage directory for conversations of `target`
    ///
    /// A directory the project already uses wins: the source's own when the
    /// target is the source project, one known to the registry, or an existing
    /// directory under the upstream tool's name. Otherwise the encoded name.
    fn destination_dir(&self, source: &ConversationRecord, target: &Path) -> Result<PathBuf, BranchError> {
        let encoded = self.storage_root.join(encode_path(target)?);

        if target == source.project_path {
            return Ok(source.project_dir.clone());
        }
        if let Some(dir) = self.registry.project_dir(target) {
            return Ok(dir);
        }

        let legacy = self.storage_root.join(legacy_dir_name(target));
        if legacy != encoded && fs::symlink_metadata(&legacy).is_ok_and(|m| m.is_dir()) {
            debug!(dir = %legacy.display(), "using existing project directory");
            return Ok(legacy);
        }

        Ok(encoded)
    }

    fn generate_id(&mut self, source: &ConversationRecord, dest_dir: &Path) -> Result<String, BranchError> {
        let mut candidate_path = dest_dir.to_path_buf();

        for _ in 0..self.max_id_attempts {
            let candidate = (self.id_generator)();
            candidate_path = dest_dir.join(transcript_file_name(&candidate));

            let taken = candidate == source.id
                || self.registry.is_known(&candidate)
                || fs::symlink_metadata(&candidate_path).is_ok();
            if !taken {
                return Ok(candidate);
            }
            debug!(id = %candidate, "generated identifier already in use, retrying");
        }

        Err(BranchError::BranchConflict { path: candidate_path })
    }
}

fn transcript_file_name(id: &str) -> String {
    format!("{id}.jsonl")
}

fn read_source(source: &ConversationRecord) -> Result<Vec<u8>, BranchError> {
    let mut file = safe_open_file(&source.file_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BranchError::SourceNotFound { id: source.id.clone() },
        _ => BranchError::io(&source.file_path, e),
    })?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| BranchError::io(&source.file_path, e))?;
    Ok(bytes)
}

/// Branch `source` with a default [`BranchEngine`]
///
/// # Errors
///
/// See [`BranchEngine::branch`].
pub fn branch(
    storage_root: &Path,
    registry: &dyn IdRegistry,
    source: &ConversationRecord,
    target_project: Option<&Path>,
) -> Result<ConversationRecord, BranchError> {
    BranchEngine::new(storage_root, registry).branch(source, target_project)
}

/// Branch the conversation matching `query` (full id or unique prefix)
///
/// The catalog both resolves the query and serves as the identifier registry.
///
/// # Errors
///
/// Identifier resolution errors from [`Catalog::resolve`], then anything
/// [`BranchEngine::branch`] returns.
pub fn branch_conversation(
    storage_root: &Path,
    catalog: &Catalog,
    query: &str,
    target_project: Option<&Path>,
) -> Result<ConversationRecord, BranchError> {
    let source = catalog.resolve(query)?;
    branch(storage_root, catalog, source, target_project)
}

/// Copy the conversation matching `query` into another project without a parent link
///
/// # Errors
///
/// See [`branch_conversation`].
pub fn copy_conversation(
    storage_root: &Path,
    catalog: &Catalog,
    query: &str,
    target_project: &Path,
) -> Result<ConversationRecord, BranchError> {
    let source = catalog.resolve(query)?;
    BranchEngine::new(storage_root, catalog).copy_to(source, target_project)
}
