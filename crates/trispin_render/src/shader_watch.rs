//! Shader source hot-reload detection
//!
//! The watcher keeps one last-observed modification timestamp per tracked
//! file. A file whose modification time moves past its watermark reports
//! "changed" exactly once; the watermark then absorbs the new time.
//!
//! Failure policy is fail-safe by contract: a file that cannot be stat'd is
//! reported as unchanged and never surfaces an error, and a file that cannot
//! be read during a rebuild contributes an empty source string, which is
//! handed to the compiler as-is.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The vertex/fragment source file pair for one shader program.
/// Fixed for the process lifetime.
#[derive(Clone, Debug)]
pub struct ShaderSources {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Read both source files. An unreadable file logs a warning and yields
    /// an empty string.
    pub fn load(&self) -> (String, String) {
        (read_source(&self.vertex), read_source(&self.fragment))
    }
}

fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) => {
            log::warn!("Failed to read shader source {}: {}", path.display(), err);
            String::new()
        }
    }
}

/// The compile-and-link collaborator: turns a pair of source strings into a
/// program. Implemented against the GPU by [`crate::pipeline::ProgramBuilder`]
/// and by stubs in tests.
pub trait ProgramFactory {
    /// `Default` is the released/empty program state
    type Program: Default;

    fn create_program(&mut self, vertex_src: &str, fragment_src: &str) -> Self::Program;
}

/// Per-file modification-time watermarks for a shader source pair
pub struct ShaderWatcher {
    vertex_seen: SystemTime,
    fragment_seen: SystemTime,
}

impl Default for ShaderWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderWatcher {
    /// Create a watcher with epoch watermarks, so the first poll against any
    /// existing file reports a change. Initial compilation rides the same
    /// path as every later reload.
    pub fn new() -> Self {
        Self {
            vertex_seen: SystemTime::UNIX_EPOCH,
            fragment_seen: SystemTime::UNIX_EPOCH,
        }
    }

    /// Stat one file against its watermark. Advances the watermark and
    /// reports true when the modification time moved past it. A stat failure
    /// reports false.
    fn file_changed(path: &Path, watermark: &mut SystemTime) -> bool {
        let modified = match fs::metadata(path) {
            Ok(meta) => match meta.modified() {
                Ok(time) => time,
                Err(_) => return false,
            },
            Err(_) => return false,
        };

        if modified > *watermark {
            *watermark = modified;
            true
        } else {
            false
        }
    }

    /// Check both tracked files. Both are always checked, so both watermarks
    /// stay current even when only one file changed.
    pub fn poll(&mut self, sources: &ShaderSources) -> bool {
        let vertex_changed = Self::file_changed(&sources.vertex, &mut self.vertex_seen);
        let fragment_changed = Self::file_changed(&sources.fragment, &mut self.fragment_seen);
        vertex_changed || fragment_changed
    }

    /// If either source file changed, release the current program and build a
    /// replacement from disk. Returns true when a rebuild happened.
    ///
    /// The old program is dropped before compilation starts, so a failed
    /// rebuild leaves the empty program installed, not a stale one. Whatever
    /// the factory returns is installed unconditionally; there is no retry
    /// and no fallback.
    pub fn reload_if_changed<F: ProgramFactory>(
        &mut self,
        sources: &ShaderSources,
        factory: &mut F,
        current: &mut F::Program,
    ) -> bool {
        if !self.poll(sources) {
            return false;
        }

        drop(std::mem::take(current));

        let (vertex_src, fragment_src) = sources.load();
        log::info!(
            "Rebuilding shader program from {} and {}",
            sources.vertex.display(),
            sources.fragment.display()
        );
        *current = factory.create_program(&vertex_src, &fragment_src);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use std::rc::Rc;

    /// Helper to create a temp file with given content, returning its path.
    fn create_temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("trispin_shader_tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cleanup_temp_file(path: &Path) {
        let _ = fs::remove_file(path);
    }

    /// Stub program: flips its shared flag when dropped.
    #[derive(Default)]
    struct StubProgram {
        id: u32,
        dropped: Option<Rc<Cell<bool>>>,
    }

    impl Drop for StubProgram {
        fn drop(&mut self) {
            if let Some(flag) = &self.dropped {
                flag.set(true);
            }
        }
    }

    /// Stub factory recording every build request.
    #[derive(Default)]
    struct StubFactory {
        builds: u32,
        last_sources: Option<(String, String)>,
        /// Shared drop flag of the previously installed program, observed at
        /// build time.
        old_drop_flag: Option<Rc<Cell<bool>>>,
        old_was_dropped_first: bool,
    }

    impl ProgramFactory for StubFactory {
        type Program = StubProgram;

        fn create_program(&mut self, vertex_src: &str, fragment_src: &str) -> StubProgram {
            self.builds += 1;
            self.last_sources = Some((vertex_src.to_string(), fragment_src.to_string()));
            if let Some(flag) = &self.old_drop_flag {
                self.old_was_dropped_first = flag.get();
            }
            StubProgram {
                id: self.builds,
                dropped: None,
            }
        }
    }

    #[test]
    fn test_first_poll_reports_change_then_settles() {
        let vert = create_temp_file("first_poll.vert", "v");
        let frag = create_temp_file("first_poll.frag", "f");
        let sources = ShaderSources::new(&vert, &frag);

        let mut watcher = ShaderWatcher::new();
        assert!(watcher.poll(&sources));
        assert!(!watcher.poll(&sources));
        assert!(!watcher.poll(&sources));

        cleanup_temp_file(&vert);
        cleanup_temp_file(&frag);
    }

    #[test]
    fn test_missing_files_never_report_change() {
        let sources = ShaderSources::new("/nonexistent/a.vert", "/nonexistent/a.frag");
        let mut watcher = ShaderWatcher::new();
        assert!(!watcher.poll(&sources));
        assert!(!watcher.poll(&sources));
    }

    #[test]
    fn test_rewrite_triggers_second_change() {
        let vert = create_temp_file("rewrite.vert", "v1");
        let frag = create_temp_file("rewrite.frag", "f1");
        let sources = ShaderSources::new(&vert, &frag);

        let mut watcher = ShaderWatcher::new();
        assert!(watcher.poll(&sources));
        assert!(!watcher.poll(&sources));

        // Make sure the filesystem timestamp actually advances
        std::thread::sleep(std::time::Duration::from_millis(50));
        fs::write(&vert, "v2").unwrap();

        assert!(watcher.poll(&sources));
        assert!(!watcher.poll(&sources));

        cleanup_temp_file(&vert);
        cleanup_temp_file(&frag);
    }

    #[test]
    fn test_single_changed_file_updates_both_watermarks() {
        let vert = create_temp_file("both_marks.vert", "v1");
        let frag = create_temp_file("both_marks.frag", "f1");
        let sources = ShaderSources::new(&vert, &frag);

        let mut watcher = ShaderWatcher::new();
        assert!(watcher.poll(&sources));

        std::thread::sleep(std::time::Duration::from_millis(50));
        fs::write(&frag, "f2").unwrap();

        // Only the fragment changed; the vertex watermark must stay settled
        assert!(watcher.poll(&sources));
        assert!(!watcher.poll(&sources));

        cleanup_temp_file(&vert);
        cleanup_temp_file(&frag);
    }

    #[test]
    fn test_reload_unchanged_keeps_program_and_skips_factory() {
        let vert = create_temp_file("keep.vert", "v");
        let frag = create_temp_file("keep.frag", "f");
        let sources = ShaderSources::new(&vert, &frag);

        let mut watcher = ShaderWatcher::new();
        watcher.poll(&sources); // settle the watermarks

        let mut factory = StubFactory::default();
        let mut program = StubProgram {
            id: 42,
            dropped: None,
        };

        assert!(!watcher.reload_if_changed(&sources, &mut factory, &mut program));
        assert_eq!(factory.builds, 0);
        assert_eq!(program.id, 42);

        cleanup_temp_file(&vert);
        cleanup_temp_file(&frag);
    }

    #[test]
    fn test_reload_drops_old_program_before_building() {
        let vert = create_temp_file("drop_order.vert", "v");
        let frag = create_temp_file("drop_order.frag", "f");
        let sources = ShaderSources::new(&vert, &frag);

        let flag = Rc::new(Cell::new(false));
        let mut factory = StubFactory {
            old_drop_flag: Some(flag.clone()),
            ..StubFactory::default()
        };
        let mut program = StubProgram {
            id: 7,
            dropped: Some(flag),
        };

        // Epoch watermarks: the first reload fires immediately
        let mut watcher = ShaderWatcher::new();
        assert!(watcher.reload_if_changed(&sources, &mut factory, &mut program));
        assert_eq!(factory.builds, 1);
        assert!(factory.old_was_dropped_first);
        assert_eq!(program.id, 1);

        cleanup_temp_file(&vert);
        cleanup_temp_file(&frag);
    }

    #[test]
    fn test_reload_passes_sources_through() {
        let vert = create_temp_file("passthrough.vert", "vertex body");
        let frag = create_temp_file("passthrough.frag", "fragment body");
        let sources = ShaderSources::new(&vert, &frag);

        let mut watcher = ShaderWatcher::new();
        let mut factory = StubFactory::default();
        let mut program = StubProgram::default();

        assert!(watcher.reload_if_changed(&sources, &mut factory, &mut program));
        let (v, f) = factory.last_sources.clone().unwrap();
        assert_eq!(v, "vertex body");
        assert_eq!(f, "fragment body");

        cleanup_temp_file(&vert);
        cleanup_temp_file(&frag);
    }

    #[test]
    fn test_unreadable_source_becomes_empty_string() {
        // Vertex file exists so the reload fires; fragment file is missing.
        let vert = create_temp_file("half_pair.vert", "vertex body");
        let sources = ShaderSources::new(&vert, "/nonexistent/half_pair.frag");

        let mut watcher = ShaderWatcher::new();
        let mut factory = StubFactory::default();
        let mut program = StubProgram::default();

        assert!(watcher.reload_if_changed(&sources, &mut factory, &mut program));
        let (v, f) = factory.last_sources.clone().unwrap();
        assert_eq!(v, "vertex body");
        assert_eq!(f, "");

        cleanup_temp_file(&vert);
    }
}
