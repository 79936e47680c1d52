// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! No space left on device: rebuild a directory tree from a shell transcript
//! and total up directory sizes.

use thiserror::Error;
use tracing::{debug, info, warn};
use crate::cli::Challenge;

pub use parsing::{TranscriptError, TranscriptErrorKind};


/// Index of a directory in its [`Fs`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirId(usize);

#[derive(Debug)]
struct File<'s> {
	name: &'s str,
	size: u64,
}

#[derive(Debug)]
pub struct Dir<'s> {
	name: &'s str,
	parent: Option<DirId>,
	subdirs: Vec<DirId>,
	files: Vec<File<'s>>,
}

impl<'s> Dir<'s> {
	fn new(name: &'s str, parent: Option<DirId>) -> Self {
		Dir { name, parent, subdirs: vec![], files: vec![] }
	}

	pub fn name(&self) -> &'s str {
		self.name
	}
}

/// Directory tree owning every [`Dir`]. Children are owned through the arena;
/// `parent` links are plain indices only followed for `cd ..`.
#[derive(Debug)]
pub struct Fs<'s> {
	dirs: Vec<Dir<'s>>,
}

impl<'s> Fs<'s> {
	pub fn new() -> Self {
		Fs { dirs: vec![Dir::new("/", None)] }
	}

	pub fn root(&self) -> DirId {
		DirId(0)
	}

	pub fn dir(&self, id: DirId) -> &Dir<'s> {
		&self.dirs[id.0]
	}

	pub fn parent(&self, id: DirId) -> Option<DirId> {
		self.dir(id).parent
	}

	pub fn subdir(&self, id: DirId, name: &str) -> Option<DirId> {
		self.dir(id).subdirs.iter().copied().find(|&sub| self.dir(sub).name == name)
	}

	fn has_file(&self, id: DirId, name: &str) -> bool {
		self.dir(id).files.iter().any(|file| file.name == name)
	}

	/// Registers `name` as a subdirectory of `id`. Known names are left alone.
	pub fn add_dir(&mut self, id: DirId, name: &'s str) {
		if self.subdir(id, name).is_some() { return }
		if self.has_file(id, name) {
			warn!(dir = self.dir(id).name, name, "ignoring directory shadowing a file");
			return
		}
		let sub = DirId(self.dirs.len());
		self.dirs.push(Dir::new(name, Some(id)));
		self.dirs[id.0].subdirs.push(sub);
	}

	/// Registers a file of `size` bytes in `id`. Known names are left alone.
	pub fn add_file(&mut self, id: DirId, name: &'s str, size: u64) {
		if self.has_file(id, name) { return }
		if self.subdir(id, name).is_some() {
			warn!(dir = self.dir(id).name, name, "ignoring file shadowing a directory");
			return
		}
		self.dirs[id.0].files.push(File { name, size });
	}

	/// Computes every directory's total size in post-order, handing each to
	/// `visit`, and returns the size of the root.
	pub fn fold_sizes<F: FnMut(&Dir<'s>, u64)>(&self, mut visit: F) -> Result<u64, SizeOverflow> {
		let overflow = |id: DirId| SizeOverflow { dir: self.dir(id).name.to_owned() };

		// Open directories with the index of their next subdirectory and the
		// sizes gathered so far; nesting depth stays off the call stack.
		let mut stack = vec![(self.root(), 0, 0_u64)];
		let mut total = 0;
		while let Some((id, next, size)) = stack.last_mut() {
			let dir = self.dir(*id);
			if let Some(&sub) = dir.subdirs.get(*next) {
				*next += 1;
				stack.push((sub, 0, 0));
				continue
			}
			let (id, size) = (*id, *size);
			let size = dir.files.iter()
				.try_fold(size, |acc, file| acc.checked_add(file.size))
				.ok_or_else(|| overflow(id))?;
			visit(dir, size);
			_ = stack.pop();
			match stack.last_mut() {
				Some((parent, _, parent_size)) => *parent_size = parent_size.checked_add(size)
					.ok_or_else(|| overflow(*parent))?,
				None => total = size,
			}
		}
		Ok(total)
	}

	pub fn total_size(&self) -> Result<u64, SizeOverflow> {
		self.fold_sizes(|_, _| ())
	}

	/// Sum of the sizes of all directories of at most `threshold` bytes,
	/// the root included.
	pub fn sum_at_most(&self, threshold: u64) -> Result<u64, SizeOverflow> {
		let mut sum = Some(0_u64);
		self.fold_sizes(|dir, size| {
			debug!(dir = dir.name, size);
			if size <= threshold { sum = sum.and_then(|sum| sum.checked_add(size)) }
		})?;
		sum.ok_or_else(|| SizeOverflow { dir: self.dir(self.root()).name.to_owned() })
	}

	/// Size of the smallest directory over `limit` bytes, or the total size
	/// when there is none.
	pub fn smallest_above(&self, limit: u64) -> Result<u64, SizeOverflow> {
		let mut smallest = None::<u64>;
		let total = self.fold_sizes(|dir, size| {
			if size > limit && smallest.map_or(true, |s| size < s) {
				debug!(dir = dir.name, size, "new smallest candidate");
				smallest = Some(size)
			}
		})?;
		Ok(smallest.unwrap_or(total))
	}
}

#[derive(Debug, Error)]
#[error("sizes under {dir:?} add up to more than {max} bytes", max = u64::MAX)]
pub struct SizeOverflow { pub dir: String }

impl Default for Fs<'_> {
	fn default() -> Self {
		Fs::new()
	}
}


const DISK_CAPACITY: u64 = 70_000_000;
const SPACE_NEEDED: u64 = 30_000_000;

fn part1_impl(fs: &Fs<'_>) -> Result<u64, SizeOverflow> {
	fs.sum_at_most(100_000)
}

fn part2_impl(fs: &Fs<'_>) -> Result<u64, SizeOverflow> {
	let total = fs.total_size()?;
	match total.checked_sub(DISK_CAPACITY - SPACE_NEEDED) {
		Some(limit) if limit > 0 => {
			info!(total, limit, "looking for a directory to delete");
			fs.smallest_above(limit)
		}
		_ => Ok(0),
	}
}

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Transcript(#[from] TranscriptError),
	#[error(transparent)]
	SizeOverflow(#[from] SizeOverflow),
}

pub fn solve(challenge: Challenge, input: &str) -> Result<u64, Error> {
	let fs = parsing::fs_from_str(input)?;
	info!(dirs = fs.dirs.len(), "rebuilt directory tree");
	Ok(match challenge {
		Challenge::First => part1_impl(&fs)?,
		Challenge::Second => part2_impl(&fs)?,
	})
}


mod parsing {
	use either::Either;
	use thiserror::Error;
	use tracing::trace;
	use super::Fs;

	#[derive(Debug, Error)]
	pub enum TranscriptErrorKind {
		#[error("invalid command {0:?}")]
		InvalidCommand(String),
		#[error("output {0:?} without a preceding `ls`")]
		DanglingOutput(String),
		#[error("{name:?} is not a subdirectory of {dir:?}")]
		NotADirectory { name: String, dir: String },
		#[error("cannot leave the root directory")]
		NoParent,
		#[error("invalid file size {0:?}")]
		MalformedSize(String),
		#[error("malformed listing entry {0:?}")]
		MalformedListing(String),
	}

	#[derive(Debug, Error)]
	#[error("line {line}: {kind}")]
	pub struct TranscriptError { pub line: usize, pub kind: TranscriptErrorKind }

	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	enum State {
		AwaitingCommand,
		InListing,
	}

	enum Command<'s> {
		Cd(&'s str),
		Ls,
	}

	fn command_from_str(line: &str) -> Result<Command<'_>, TranscriptErrorKind> {
		let mut tokens = line.split(' ');
		match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
			(Some("$"), Some("ls"), None, _) => Ok(Command::Ls),
			(Some("$"), Some("cd"), Some(name), None) if !name.is_empty() => Ok(Command::Cd(name)),
			_ => Err(TranscriptErrorKind::InvalidCommand(line.to_owned())),
		}
	}

	/// A directory name on the left, a file's size and name on the right.
	fn entry_from_str(line: &str) -> Result<Either<&str, (u64, &str)>, TranscriptErrorKind> {
		use TranscriptErrorKind::*;
		let mut tokens = line.split(' ');
		match (tokens.next(), tokens.next(), tokens.next()) {
			(Some("dir"), Some(name), None) if !name.is_empty() => Ok(Either::Left(name)),
			(Some(size), Some(name), None) if !name.is_empty() => size.parse()
				.map(|size| Either::Right((size, name)))
				.map_err(|_| MalformedSize(size.to_owned())),
			_ => Err(MalformedListing(line.to_owned())),
		}
	}

	pub(super) fn fs_from_str(s: &str) -> Result<Fs<'_>, TranscriptError> {
		use {State::*, TranscriptErrorKind::*};

		let mut fs = Fs::new();
		let mut cwd = fs.root();
		let mut state = AwaitingCommand;

		for (l, line) in s.lines().enumerate() {
			let line = line.trim();
			if line.is_empty() { continue }
			let line_err = |kind| TranscriptError { line: l + 1, kind };
			trace!(line = l + 1, ?state, "{line}");

			if line.starts_with('$') {
				state = AwaitingCommand;
				match command_from_str(line).map_err(line_err)? {
					Command::Ls => state = InListing,
					Command::Cd("/") => cwd = fs.root(),
					Command::Cd("..") => cwd = fs.parent(cwd).ok_or(line_err(NoParent))?,
					Command::Cd(name) => cwd = fs.subdir(cwd, name)
						.ok_or_else(|| line_err(NotADirectory {
							name: name.to_owned(),
							dir: fs.dir(cwd).name().to_owned(),
						}))?,
				}
			} else {
				if state != InListing { return Err(line_err(DanglingOutput(line.to_owned()))) }
				match entry_from_str(line).map_err(line_err)? {
					Either::Left(name) => fs.add_dir(cwd, name),
					Either::Right((size, name)) => fs.add_file(cwd, name, size),
				}
			}
		}

		Ok(fs)
	}
}
