//! Batched commits of dirty proxies.
//!
//! [`CommitManager`] owns the pending set. [`CommitManager::flush`] drains it with
//! a bounded worklist: each round snapshots and clears the pending set, commits
//! every dirty member, and collects proxies dirtied as a side effect into the
//! next round.
//!
//! Commit order within a round is unspecified. A [`Commitable`] must not depend
//! on a sibling having committed first, and must not keep re-dirtying itself or
//! another object in a cycle; such cycles end in [`CommitError::Divergence`].
//!
//! # Failure
//!
//! A failed native commit aborts the flush and is not retried. The failed proxy,
//! every proxy not yet committed in that round, and any marks already produced
//! stay pending, so dirty proxies remain registered.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::native::{NativeDocument, NativeError};
use crate::proxy::OwnerKey;

/// Default upper bound on worklist rounds per flush.
pub const DEFAULT_MAX_FLUSH_ROUNDS: usize = 16;

/// Something the commit manager can push to the native document.
pub trait Commitable {
	fn is_dirty(&self) -> bool;

	/// Writes pending changes. Side-effect dirtying goes through [`CommitContext::mark_dirty`].
	fn commit(&mut self, cx: &mut CommitContext<'_>) -> Result<(), NativeError>;

	/// Drops pending changes without writing them.
	fn discard(&mut self);
}

/// Registration token produced by the clean-to-dirty transition of a proxy.
#[must_use = "a dirty mark must be registered with the commit manager"]
pub struct DirtyMark {
	key: OwnerKey,
	target: Rc<RefCell<dyn Commitable>>,
}

impl DirtyMark {
	pub fn new(key: OwnerKey, target: Rc<RefCell<dyn Commitable>>) -> Self {
		Self { key, target }
	}

	pub fn key(&self) -> OwnerKey {
		self.key
	}
}

impl fmt::Debug for DirtyMark {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DirtyMark").field("key", &self.key).finish_non_exhaustive()
	}
}

/// Native access and side-effect registration during one flush round.
pub struct CommitContext<'a> {
	native: &'a mut dyn NativeDocument,
	round: usize,
	marks: Vec<DirtyMark>,
}

impl<'a> CommitContext<'a> {
	fn new(native: &'a mut dyn NativeDocument, round: usize) -> Self {
		Self {
			native,
			round,
			marks: Vec::new(),
		}
	}

	pub fn native(&mut self) -> &mut (dyn NativeDocument + 'a) {
		&mut *self.native
	}

	/// One-based round number within the current flush.
	pub fn round(&self) -> usize {
		self.round
	}

	/// Queues a proxy dirtied by this commit for the next round.
	pub fn mark_dirty(&mut self, mark: DirtyMark) {
		self.marks.push(mark);
	}

	fn into_marks(self) -> Vec<DirtyMark> {
		self.marks
	}
}

/// Flush failures. Each one aborts the flush and is never retried.
#[derive(Debug, Error)]
pub enum CommitError {
	#[error("native commit of {key} failed: {source}")]
	Native {
		key: OwnerKey,
		#[source]
		source: NativeError,
	},
	#[error("flush did not settle after {rounds} rounds ({pending} proxies still dirty); a commit keeps re-dirtying proxies")]
	Divergence { rounds: usize, pending: usize },
	#[error("{key} was re-entered while committing")]
	Reentrant { key: OwnerKey },
}

/// Summary of a successful flush.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
	pub rounds: usize,
	pub committed: usize,
	/// Pending entries that were already clean when their round came.
	pub skipped: usize,
}

/// Registry of dirty proxies, drained at flush points.
pub struct CommitManager {
	pending: FxHashMap<OwnerKey, Rc<RefCell<dyn Commitable>>>,
	max_rounds: usize,
}

impl Default for CommitManager {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for CommitManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<_> = self.pending.keys().collect();
		keys.sort();
		f.debug_struct("CommitManager")
			.field("pending", &keys)
			.field("max_rounds", &self.max_rounds)
			.finish()
	}
}

impl CommitManager {
	pub fn new() -> Self {
		Self::with_max_rounds(DEFAULT_MAX_FLUSH_ROUNDS)
	}

	pub fn with_max_rounds(max_rounds: usize) -> Self {
		Self {
			pending: FxHashMap::default(),
			max_rounds: max_rounds.max(1),
		}
	}

	pub fn max_rounds(&self) -> usize {
		self.max_rounds
	}

	/// Adds a proxy to the pending set. Idempotent per owner key.
	///
	/// Returns `true` if the key was not pending yet.
	pub fn mark_dirty(&mut self, mark: DirtyMark) -> bool {
		let DirtyMark { key, target } = mark;
		if self.pending.contains_key(&key) {
			return false;
		}
		trace!(%key, "commit.mark_dirty");
		self.pending.insert(key, target);
		true
	}

	pub fn is_pending(&self, key: &OwnerKey) -> bool {
		self.pending.contains_key(key)
	}

	pub fn pending_len(&self) -> usize {
		self.pending.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	/// Removes a pending proxy and drops its local edits.
	pub fn discard(&mut self, key: &OwnerKey) -> bool {
		let Some(target) = self.pending.remove(key) else {
			return false;
		};
		target.borrow_mut().discard();
		debug!(%key, "commit.discard");
		true
	}

	/// Commits every pending proxy, including ones dirtied while committing.
	pub fn flush(&mut self, native: &mut dyn NativeDocument) -> Result<FlushStats, CommitError> {
		let mut stats = FlushStats::default();

		while !self.pending.is_empty() {
			if stats.rounds == self.max_rounds {
				let pending = self.pending.len();
				warn!(rounds = stats.rounds, pending, "commit.flush.divergence");
				return Err(CommitError::Divergence { rounds: stats.rounds, pending });
			}
			stats.rounds += 1;

			let batch = mem::take(&mut self.pending);
			trace!(round = stats.rounds, size = batch.len(), "commit.flush.round");
			let mut cx = CommitContext::new(&mut *native, stats.rounds);
			let mut entries = batch.into_iter();

			while let Some((key, target)) = entries.next() {
				let result = match target.try_borrow_mut() {
					Ok(proxy) if !proxy.is_dirty() => {
						stats.skipped += 1;
						continue;
					}
					Ok(mut proxy) => proxy.commit(&mut cx).map_err(|source| CommitError::Native { key, source }),
					Err(_) => Err(CommitError::Reentrant { key }),
				};

				if let Err(error) = result {
					warn!(%key, round = stats.rounds, %error, "commit.flush.failed");
					self.pending.insert(key, target);
					self.pending.extend(entries);
					self.requeue(cx.into_marks());
					return Err(error);
				}
				stats.committed += 1;
			}

			self.requeue(cx.into_marks());
		}

		if stats.rounds > 0 {
			debug!(rounds = stats.rounds, committed = stats.committed, skipped = stats.skipped, "commit.flush.done");
		}
		Ok(stats)
	}

	fn requeue(&mut self, marks: Vec<DirtyMark>) {
		for DirtyMark { key, target } in marks {
			self.pending.entry(key).or_insert(target);
		}
	}
}
