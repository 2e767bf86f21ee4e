//! Font discovery shared by the PDF builder and the chart renderer.
//!
//! The bundled Roboto family is searched first (explicit directory, the
//! `LEGO_REPORT_FONTS_DIR` environment variable, `assets/fonts` next to the binary and in
//! the crate root). When it is missing, common system families are tried instead.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Environment variable pointing at a directory with the bundled font files.
pub const FONTS_DIR_ENV: &str = "LEGO_REPORT_FONTS_DIR";

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

struct FaceNames {
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const BUNDLED_FACES: FaceNames = FaceNames {
    regular: "Roboto-Regular.ttf",
    bold: "Roboto-Bold.ttf",
    italic: "Roboto-Italic.ttf",
    bold_italic: "Roboto-BoldItalic.ttf",
};

struct SystemFamily {
    name: &'static str,
    directories: &'static [&'static str],
    faces: FaceNames,
}

const SYSTEM_FAMILIES: &[SystemFamily] = &[
    SystemFamily {
        name: "DejaVu Sans",
        directories: &[
            "/usr/share/fonts/truetype/dejavu",
            "/usr/share/fonts/dejavu",
            "/usr/share/fonts/TTF",
        ],
        faces: FaceNames {
            regular: "DejaVuSans.ttf",
            bold: "DejaVuSans-Bold.ttf",
            italic: "DejaVuSans-Oblique.ttf",
            bold_italic: "DejaVuSans-BoldOblique.ttf",
        },
    },
    SystemFamily {
        name: "Liberation Sans",
        directories: &[
            "/usr/share/fonts/truetype/liberation",
            "/usr/share/fonts/liberation",
            "/usr/share/fonts/liberation-sans",
        ],
        faces: FaceNames {
            regular: "LiberationSans-Regular.ttf",
            bold: "LiberationSans-Bold.ttf",
            italic: "LiberationSans-Italic.ttf",
            bold_italic: "LiberationSans-BoldItalic.ttf",
        },
    },
];

const WINDOWS_FACES: FaceNames = FaceNames {
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

/// Locations of the four faces of one font family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFiles {
    pub family: String,
    pub regular: PathBuf,
    pub bold: PathBuf,
    pub italic: PathBuf,
    pub bold_italic: PathBuf,
}

impl FontFiles {
    fn in_directory(family: &str, directory: &Path, faces: &FaceNames) -> Self {
        Self {
            family: family.to_string(),
            regular: directory.join(faces.regular),
            bold: directory.join(faces.bold),
            italic: directory.join(faces.italic),
            bold_italic: directory.join(faces.bold_italic),
        }
    }

    fn faces(&self) -> [(&'static str, &Path); 4] {
        [
            ("regular", self.regular.as_path()),
            ("bold", self.bold.as_path()),
            ("italic", self.italic.as_path()),
            ("bold italic", self.bold_italic.as_path()),
        ]
    }

    fn missing(&self) -> Vec<&Path> {
        self.faces()
            .into_iter()
            .map(|(_, path)| path)
            .filter(|path| !path.is_file())
            .collect()
    }

    /// Loads the four faces as a `genpdf` font family.
    pub fn load_family(&self) -> Result<FontFamily<FontData>, Error> {
        let [regular, bold, italic, bold_italic] = self.faces().map(|(style, path)| {
            FontData::load(path, None).map_err(|err| {
                Error::new(
                    format!(
                        "Failed to load {} {} font at {}: {}",
                        self.family,
                        style,
                        path.display(),
                        err
                    ),
                    io::Error::new(io::ErrorKind::Other, err.to_string()),
                )
            })
        });

        Ok(FontFamily {
            regular: regular?,
            bold: bold?,
            italic: italic?,
            bold_italic: bold_italic?,
        })
    }
}

fn font_directory_candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidate.as_os_str().is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = preferred {
        push(path.to_path_buf());
    }

    if let Some(path) = env::var_os(FONTS_DIR_ENV) {
        push(PathBuf::from(path));
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push(bin_dir.join("assets/fonts"));
        }
    }

    push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));

    candidates
}

fn system_candidates() -> Vec<FontFiles> {
    let mut candidates: Vec<FontFiles> = SYSTEM_FAMILIES
        .iter()
        .flat_map(|family| {
            family.directories.iter().map(move |directory| {
                FontFiles::in_directory(family.name, Path::new(directory), &family.faces)
            })
        })
        .collect();

    for var in ["WINDIR", "SystemRoot"] {
        if let Some(root) = env::var_os(var).filter(|value| !value.is_empty()) {
            let directory = PathBuf::from(root).join("Fonts");
            candidates.push(FontFiles::in_directory("Arial", &directory, &WINDOWS_FACES));
        }
    }

    candidates
}

/// Finds a complete font family, preferring the bundled Roboto files.
///
/// `preferred` is searched before every other location.
pub fn resolve_font_files(preferred: Option<&Path>) -> Result<FontFiles, Error> {
    let mut attempts = Vec::new();

    for directory in font_directory_candidates(preferred) {
        let files = FontFiles::in_directory(DEFAULT_FONT_FAMILY_NAME, &directory, &BUNDLED_FACES);
        if !directory.is_dir() {
            attempts.push(format!("{} (directory missing)", directory.display()));
            continue;
        }

        let missing = files.missing();
        if missing.is_empty() {
            debug!("using bundled fonts from {}", directory.display());
            return Ok(files);
        }

        let missing_list = missing
            .iter()
            .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
            .collect::<Vec<_>>()
            .join(", ");
        attempts.push(format!(
            "{} (missing files [{}])",
            directory.display(),
            missing_list
        ));
    }

    if let Some(fallback) = system_candidates()
        .into_iter()
        .find(|files| files.missing().is_empty())
    {
        warn!(
            "Bundled fonts unavailable; falling back to system '{}' family.",
            fallback.family
        );
        return Ok(fallback);
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate a font family. Checked: {}. Set {} to a directory with the Roboto files.",
            summary, FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "no usable font family found"),
    ))
}

/// Loads the resolved font family for `genpdf`.
pub fn font_family(preferred: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    resolve_font_files(preferred)?.load_family()
}

/// Returns whether a font failure means the files are absent rather than broken.
pub fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Indicates whether any usable font family can be found.
pub fn default_fonts_available() -> bool {
    resolve_font_files(None).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_directory_is_searched_first() {
        let preferred = Path::new("/opt/report-fonts");
        let candidates = font_directory_candidates(Some(preferred));
        assert_eq!(candidates.first().map(PathBuf::as_path), Some(preferred));
    }

    #[test]
    fn incomplete_directory_reports_missing_faces() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Roboto-Regular.ttf"), b"not a font").unwrap();
        let files = FontFiles::in_directory(DEFAULT_FONT_FAMILY_NAME, dir.path(), &BUNDLED_FACES);

        let missing = files.missing();
        assert_eq!(missing.len(), 3);
        assert!(missing.iter().all(|path| !path.ends_with("Roboto-Regular.ttf")));
    }
}
