use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::info;

pub const INDEX_FILE: &str = "index.md";

/// A post written to the staging area.
#[derive(Debug)]
pub struct Staged {
    pub dir: PathBuf,
    pub dir_name: String,
    pub files: Vec<String>,
}

pub fn dir_name(date: NaiveDate, slug: &str) -> String {
    format!("{}-{slug}", date.format("%Y-%m-%d"))
}

/// Write `index.md` and copy images into `<root>/<date>-<slug>/`.
///
/// Re-staging the same post overwrites its own files; a directory holding
/// anything else is refused.
pub fn stage_post(
    root: &Path,
    date: NaiveDate,
    slug: &str,
    document: &str,
    images: &[PathBuf],
) -> Result<Staged> {
    let name = dir_name(date, slug);
    ensure_single_component(slug, &name)?;
    let dir = root.join(&name);

    let mut files = vec![INDEX_FILE.to_string()];
    for image in images {
        let file_name = image
            .file_name()
            .with_context(|| format!("Image path has no file name: {}", image.display()))?
            .to_string_lossy()
            .into_owned();
        if files.contains(&file_name) {
            bail!(
                "Two staged files would share the name {file_name} ({}); rename one",
                image.display()
            );
        }
        files.push(file_name);
    }

    if dir.is_dir() {
        let ours: HashSet<OsString> = files.iter().map(OsString::from).collect();
        let entries = fs::read_dir(&dir).with_context(|| format!("Failed to read {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            if !ours.contains(&entry.file_name()) {
                bail!(
                    "{} already contains unrelated content ({}); move it aside or pick another slug",
                    dir.display(),
                    entry.file_name().to_string_lossy()
                );
            }
        }
    }
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let index = dir.join(INDEX_FILE);
    fs::write(&index, document).with_context(|| format!("Failed to write {}", index.display()))?;
    for (image, file_name) in images.iter().zip(files.iter().skip(1)) {
        fs::copy(image, dir.join(file_name))
            .with_context(|| format!("Failed to copy {}", image.display()))?;
    }
    info!("Staged {} files in {}", files.len(), dir.display());

    Ok(Staged {
        dir,
        dir_name: name,
        files,
    })
}

/// The staging directory name must stay a single path component under the root.
fn ensure_single_component(slug: &str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || slug.contains(['/', '\\']) {
        bail!("Slug {slug:?} is not usable as a directory name");
    }
    Ok(())
}

impl Staged {
    pub fn summary(&self, content_dir: &Path) -> String {
        let mut lines = vec![format!("\nPost created at: {}/", self.dir.display())];
        lines.extend(self.files.iter().map(|f| format!("  - {f}")));
        lines.push(format!(
            "\nTo publish, move the directory to {}/:",
            content_dir.display()
        ));
        lines.push(format!(
            "  mv {} {}",
            self.dir.display(),
            content_dir.join(&self.dir_name).display()
        ));
        lines.join("\n")
    }
}
