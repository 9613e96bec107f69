// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session state.
//!
//! A `Session` owns the live project, the file it is associated with and
//! the dirty flag. Every edit goes through the session so the flag stays
//! accurate; saving and opening go through the export/import façade and
//! failures are handed to a [`Reporter`].

use crate::config::Settings;
use crate::error::{ExportError, ImportError, ModelError};
use crate::io::serialization::{export_with, import_with, resolve_target};
use crate::io::Format;
use crate::models::group::{normalize_group_name, palette_color};
use crate::models::{Group, ProjectFile, TranslationLabel};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};

/// Channel for failures the user should see.
pub trait Reporter {
    fn report(&self, error: &dyn Error);
}

/// Reporter that writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, error: &dyn Error) {
        log::error!("{}", error);
        let mut source = error.source();
        while let Some(cause) = source {
            log::error!("  caused by: {}", cause);
            source = cause.source();
        }
    }
}

/// Result of a background save.
struct SaveOutcome {
    path: PathBuf,
    format: Format,
    generation: u64,
    result: Result<(), ExportError>,
}

/// Editing session for one project.
pub struct Session {
    /// Live, editable project
    project: ProjectFile,

    /// File the project was last opened from or saved to
    path: Option<PathBuf>,

    /// Format of `path`
    format: Option<Format>,

    /// Unsaved changes exist
    dirty: bool,

    /// Bumped on every successful edit
    generation: u64,

    settings: Settings,

    reporter: Box<dyn Reporter>,

    /// Receiver for an in-flight background save
    pending_save: Option<Receiver<SaveOutcome>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Session {
    /// Create a session with a fresh, empty project.
    pub fn new(settings: Settings) -> Self {
        let project = ProjectFile::with_version(Default::default(), settings.default_comment.clone());
        Self {
            project,
            path: None,
            format: None,
            dirty: false,
            generation: 0,
            settings,
            reporter: Box::new(LogReporter),
            pending_save: None,
        }
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn project(&self) -> &ProjectFile {
        &self.project
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Discard the current project and start an empty one.
    pub fn new_project(&mut self) {
        self.project = ProjectFile::with_version(Default::default(), self.settings.default_comment.clone());
        self.path = None;
        self.format = None;
        self.dirty = false;
        self.generation += 1;
        log::info!("Started new project");
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    /// Run an edit; mark dirty on success, report on failure.
    fn edit<T>(&mut self, f: impl FnOnce(&mut ProjectFile) -> Result<T, ModelError>) -> Result<T, ModelError> {
        match f(&mut self.project) {
            Ok(value) => {
                self.touch();
                Ok(value)
            }
            Err(e) => {
                self.reporter.report(&e);
                Err(e)
            }
        }
    }

    // ----- Edits ----- //

    pub fn set_comment(&mut self, comment: &str) {
        self.project.set_comment(comment);
        self.touch();
    }

    /// Add a group; spaces in the name become underscores and the color
    /// comes from the palette.
    pub fn add_group(&mut self, name: &str) -> Result<usize, ModelError> {
        let name = normalize_group_name(name);
        let palette = self.settings.group_colors.clone();
        let id = self.edit(|p| {
            let color = palette_color(&palette, p.group_count());
            p.add_group(Group::new(name, color)?)
        })?;
        log::info!("Added group {}, total: {}", id, self.project.group_count());
        Ok(id)
    }

    pub fn rename_group(&mut self, group_id: usize, name: &str) -> Result<(), ModelError> {
        let name = normalize_group_name(name);
        self.edit(|p| p.rename_group(group_id, &name))
    }

    pub fn recolor_group(&mut self, group_id: usize, color: &str) -> Result<(), ModelError> {
        self.edit(|p| p.recolor_group(group_id, color))
    }

    pub fn remove_group(&mut self, group_id: usize) -> Result<Group, ModelError> {
        let group = self.edit(|p| p.remove_group(group_id))?;
        log::info!("Removed group {}, total: {}", group.name(), self.project.group_count());
        Ok(group)
    }

    pub fn add_picture(&mut self, picture: &str) -> Result<(), ModelError> {
        self.edit(|p| p.add_picture(picture))
    }

    pub fn remove_picture(&mut self, picture: &str) -> Result<Vec<TranslationLabel>, ModelError> {
        self.edit(|p| p.remove_picture(picture))
    }

    /// Place a new label with the next free index and return the index.
    pub fn add_label(
        &mut self,
        picture: &str,
        x: f64,
        y: f64,
        group_id: usize,
        text: &str,
    ) -> Result<u32, ModelError> {
        let index = self.edit(|p| {
            let next = p.labels(picture)?.iter().map(|l| l.index).max().unwrap_or(0) + 1;
            p.add_label(picture, TranslationLabel::new(next, x, y, group_id, text))?;
            Ok(next)
        })?;
        log::info!("Added label {} to {}", index, picture);
        Ok(index)
    }

    pub fn move_label(&mut self, picture: &str, index: u32, x: f64, y: f64) -> Result<(), ModelError> {
        self.edit(|p| p.move_label(picture, index, x, y))
    }

    pub fn set_label_text(&mut self, picture: &str, index: u32, text: &str) -> Result<(), ModelError> {
        self.edit(|p| p.set_label_text(picture, index, text))
    }

    pub fn set_label_group(&mut self, picture: &str, index: u32, group_id: usize) -> Result<(), ModelError> {
        self.edit(|p| p.set_label_group(picture, index, group_id))
    }

    pub fn remove_label(&mut self, picture: &str, index: u32) -> Result<TranslationLabel, ModelError> {
        self.edit(|p| p.remove_label(picture, index))
    }

    // ----- Files ----- //

    /// Save to `path`, or to the associated file if `None`.
    pub fn save(&mut self, path: Option<&Path>) -> Result<(), ExportError> {
        self.settle_pending_save();
        let (target, format) = match self.save_target(path) {
            Ok(target) => target,
            Err(e) => {
                self.reporter.report(&e);
                return Err(e);
            }
        };
        let result = export_with(&self.project, &target, format, &self.settings.codec_options());
        let generation = self.generation;
        self.finish_save(SaveOutcome {
            path: target,
            format,
            generation,
            result,
        })
    }

    /// Save on a worker thread.
    ///
    /// The snapshot is taken before this returns, so edits made while the
    /// write is in flight are not part of it. Collect the outcome with
    /// [`Session::poll_save`] or [`Session::wait_for_save`]. A save still in
    /// flight is waited for and applied first, as in [`Session::save`].
    pub fn save_in_background(&mut self, path: Option<&Path>) -> Result<(), ExportError> {
        self.settle_pending_save();
        let (target, format) = match self.save_target(path) {
            Ok(target) => target,
            Err(e) => {
                self.reporter.report(&e);
                return Err(e);
            }
        };
        let snapshot = self.project.snapshot();
        let options = self.settings.codec_options();
        let generation = self.generation;

        let (sender, receiver) = channel();
        self.pending_save = Some(receiver);
        log::info!("Saving {} in background", target.display());

        std::thread::spawn(move || {
            let result = export_with(&snapshot, &target, format, &options);
            let outcome = SaveOutcome {
                path: target,
                format,
                generation,
                result,
            };
            // The session is gone; the log is the only place left to report.
            if let Err(unsent) = sender.send(outcome) {
                let SaveOutcome { path, result, .. } = unsent.0;
                if let Err(e) = result {
                    log::error!("Background save of {} failed: {}", path.display(), e);
                }
            }
        });
        Ok(())
    }

    /// Check whether a background save finished.
    pub fn poll_save(&mut self) -> Option<Result<(), ExportError>> {
        let received = self.pending_save.as_ref()?.try_recv();
        let outcome = match received {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                self.pending_save = None;
                log::error!("Background save thread exited without a result");
                return None;
            }
        };
        self.pending_save = None;
        Some(self.finish_save(outcome))
    }

    /// Block until a background save finishes.
    pub fn wait_for_save(&mut self) -> Option<Result<(), ExportError>> {
        let receiver = self.pending_save.take()?;
        match receiver.recv() {
            Ok(outcome) => Some(self.finish_save(outcome)),
            Err(_) => {
                log::error!("Background save thread exited without a result");
                None
            }
        }
    }

    /// Replace the project with the contents of `path`.
    ///
    /// On failure the current project is left as it was.
    pub fn open(&mut self, path: &Path) -> Result<(), ImportError> {
        let format = self.settings.format_for(path);
        match import_with(path, format, &self.settings.codec_options()) {
            Ok(project) => {
                self.project = project;
                self.path = Some(path.to_path_buf());
                self.format = Some(format);
                self.dirty = false;
                self.generation += 1;
                Ok(())
            }
            Err(e) => {
                self.reporter.report(&e);
                Err(e)
            }
        }
    }

    /// Apply an in-flight background save before starting another.
    fn settle_pending_save(&mut self) {
        if self.pending_save.is_some() {
            log::info!("Waiting for previous background save");
            // Failures are already reported by `finish_save`.
            let _previous = self.wait_for_save();
        }
    }

    fn save_target(&self, path: Option<&Path>) -> Result<(PathBuf, Format), ExportError> {
        let target = resolve_target(path, self.path.as_deref())?;
        let format = match (path, self.format) {
            (None, Some(format)) => format,
            _ => self.settings.format_for(&target),
        };
        Ok((target, format))
    }

    fn finish_save(&mut self, outcome: SaveOutcome) -> Result<(), ExportError> {
        match outcome.result {
            Ok(()) => {
                self.path = Some(outcome.path);
                self.format = Some(outcome.format);
                // Edits made during a background save are still unsaved.
                self.dirty = self.generation != outcome.generation;
                Ok(())
            }
            Err(e) => {
                self.reporter.report(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct Collect(Rc<RefCell<Vec<String>>>);

    impl Reporter for Collect {
        fn report(&self, error: &dyn Error) {
            self.0.borrow_mut().push(error.to_string());
        }
    }

    fn session() -> (Session, Collect) {
        let reports = Collect::default();
        let session = Session::default().with_reporter(reports.clone());
        (session, reports)
    }

    #[test]
    fn test_edits_mark_dirty() {
        let (mut session, reports) = session();
        assert!(!session.is_dirty());

        let id = session.add_group("in frame").unwrap();
        assert!(session.is_dirty());
        assert_eq!(session.project().group(id).unwrap().name(), "in_frame");
        assert_eq!(session.project().group(id).unwrap().color(), "FF0000");

        session.add_picture("1.png").unwrap();
        assert_eq!(session.add_label("1.png", 0.5, 0.5, 0, "a").unwrap(), 1);
        assert_eq!(session.add_label("1.png", 0.2, 0.5, 0, "b").unwrap(), 2);
        session.remove_label("1.png", 1).unwrap();
        assert_eq!(session.add_label("1.png", 0.3, 0.5, 0, "c").unwrap(), 3);
        assert!(reports.0.borrow().is_empty());
    }

    #[test]
    fn test_failed_edit_is_reported() {
        let (mut session, reports) = session();
        assert!(session.add_label("nope.png", 0.5, 0.5, 0, "a").is_err());
        assert!(!session.is_dirty());
        assert_eq!(reports.0.borrow().len(), 1);
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.json");
        let (mut live, _) = session();
        live.add_group("A").unwrap();
        live.add_picture("1.png").unwrap();
        live.add_label("1.png", 0.1, 0.1, 0, "hi").unwrap();

        assert!(matches!(live.save(None), Err(ExportError::NoTargetPath)));
        live.save(Some(path.as_path())).unwrap();
        assert!(!live.is_dirty());
        assert_eq!(live.path(), Some(path.as_path()));
        assert_eq!(live.format(), Some(Format::Meo));

        live.set_label_text("1.png", 1, "changed").unwrap();
        live.save(None).unwrap();

        let (mut other, _) = session();
        other.open(&path).unwrap();
        assert_eq!(other.project(), live.project());
        assert!(!other.is_dirty());
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.txt");
        let (mut session, reports) = session();
        for i in 0..10 {
            session.add_group(&format!("G{i}")).unwrap();
        }
        let err = session.save(Some(path.as_path())).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Validation(ValidationError::TooManyGroups { .. })
        ));
        assert!(session.is_dirty());
        assert_eq!(session.path(), None);
        assert!(!path.exists());
        assert_eq!(reports.0.borrow().len(), 1);
    }

    #[test]
    fn test_failed_open_keeps_project() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{}").unwrap();

        let (mut session, reports) = session();
        session.add_group("Keep").unwrap();
        assert!(session.open(&path).is_err());
        assert_eq!(session.project().group_names(), ["Keep"]);
        assert!(session.is_dirty());
        assert_eq!(reports.0.borrow().len(), 1);
    }

    #[test]
    fn test_background_save_uses_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.json");
        let (mut session, _) = session();
        session.add_group("A").unwrap();
        session.add_picture("1.png").unwrap();

        session.save_in_background(Some(path.as_path())).unwrap();
        session.add_picture("2.png").unwrap();
        session.wait_for_save().unwrap().unwrap();

        // The edit after the snapshot is not saved.
        assert!(session.is_dirty());
        let saved = crate::io::serialization::import(&path, Format::Meo).unwrap();
        assert!(saved.has_picture("1.png"));
        assert!(!saved.has_picture("2.png"));
        assert!(session.poll_save().is_none());
    }

    #[test]
    fn test_second_background_save_applies_first() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.txt");
        let (mut session, reports) = session();
        session.add_group("A").unwrap();

        session.save_in_background(Some(first.as_path())).unwrap();
        session.save_in_background(Some(second.as_path())).unwrap();
        session.wait_for_save().unwrap().unwrap();

        assert!(first.exists());
        assert!(second.exists());
        assert_eq!(session.path(), Some(second.as_path()));
        assert_eq!(session.format(), Some(Format::Lp));
        assert!(!session.is_dirty());
        assert!(session.wait_for_save().is_none());
        assert!(reports.0.borrow().is_empty());
    }

    #[test]
    fn test_failed_background_save_reported_before_next() {
        let dir = tempdir().unwrap();
        let unwritable = dir.path().join("no_such_dir").join("a.json");
        let path = dir.path().join("b.json");
        let (mut session, reports) = session();
        session.add_group("A").unwrap();

        session.save_in_background(Some(unwritable.as_path())).unwrap();
        session.save_in_background(Some(path.as_path())).unwrap();
        assert_eq!(reports.0.borrow().len(), 1);

        session.wait_for_save().unwrap().unwrap();
        assert_eq!(session.path(), Some(path.as_path()));
    }

    #[test]
    fn test_set_comment_marks_dirty() {
        let (mut session, _) = session();
        session.set_comment("notes");
        assert_eq!(session.project().comment(), "notes");
        assert!(session.is_dirty());
    }

    #[test]
    fn test_new_project_resets() {
        let (mut session, _) = session();
        session.add_group("A").unwrap();
        session.new_project();
        assert!(!session.is_dirty());
        assert_eq!(session.project().group_count(), 0);
        assert_eq!(session.project().comment(), session.settings().default_comment);
    }
}
