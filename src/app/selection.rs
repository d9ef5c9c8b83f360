// selection.rs
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    path: PathBuf,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> String {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.path.to_string_lossy().into_owned(),
        }
    }

    // only the final extension goes
    pub fn base_name(&self) -> String {
        match self.path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => self.display_name(),
        }
    }

    pub fn output_name(&self) -> String {
        format!("{}.jpg", self.base_name())
    }

    pub fn output_path(&self, destination: &Path) -> PathBuf {
        destination.join(self.output_name())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Selection {
    input_files: Vec<InputFile>,
    destination: Option<PathBuf>,
}

impl Selection {
    // Paths are not checked until conversion
    pub fn set_input_files<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.input_files.clear();
        self.input_files
            .extend(paths.into_iter().map(InputFile::new));
    }

    pub fn set_destination(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return false;
        }
        self.destination = Some(path);
        true
    }

    pub fn can_convert(&self) -> bool {
        !self.input_files.is_empty() && self.destination.is_some()
    }

    pub fn input_files(&self) -> &[InputFile] {
        &self.input_files
    }

    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.input_files.iter().map(InputFile::display_name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_strips_extension_once() {
        let file = InputFile::new("/photos/holiday/photo.avif");
        assert_eq!(file.display_name(), "photo.avif");
        assert_eq!(file.base_name(), "photo");
        assert_eq!(file.output_path(Path::new("/out")), PathBuf::from("/out/photo.jpg"));
    }

    #[test]
    fn only_final_extension_is_removed() {
        let file = InputFile::new("shots/archive.v2.avif");
        assert_eq!(file.output_name(), "archive.v2.jpg");
    }

    #[test]
    fn file_without_extension_keeps_name() {
        let file = InputFile::new("/tmp/scan");
        assert_eq!(file.output_name(), "scan.jpg");
    }

    #[test]
    fn new_selection_replaces_previous_list() {
        let mut selection = Selection::default();
        selection.set_input_files(["a.avif", "b.avif"]);
        selection.set_input_files(["c.avif"]);
        assert_eq!(selection.display_names(), vec!["c.avif".to_string()]);
    }

    #[test]
    fn convert_needs_files_and_destination() {
        let mut selection = Selection::default();
        assert!(!selection.can_convert());

        selection.set_input_files(["a.avif"]);
        assert!(!selection.can_convert());

        assert!(selection.set_destination("/out"));
        assert!(selection.can_convert());

        selection.set_input_files(Vec::<PathBuf>::new());
        assert!(!selection.can_convert());
    }

    #[test]
    fn empty_destination_is_ignored() {
        let mut selection = Selection::default();
        selection.set_destination("/out");
        assert!(!selection.set_destination(""));
        assert_eq!(selection.destination(), Some(Path::new("/out")));
    }
}
