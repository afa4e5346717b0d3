use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{ProfileError, Result};
use crate::grid::FieldSource;
use crate::model::ProfileMetadata;
use crate::profile::aggregate::FieldValues;
use crate::profile::events::{ProfileEvent, ProfileObserver};
use crate::profile::interpolate::{InterpolationSummary, interpolate};
use crate::profile::path::{ControlPoint, Profile};

pub const DEFAULT_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failures: Vec<LoadFailure>,
}

/// Owns every profile, keyed by sample id then profile name.
pub struct ProfileStore {
    profiles: BTreeMap<String, BTreeMap<String, Profile>>,
    /// Names dropped since the last save; their files go on the next `save_all`.
    removed: BTreeMap<String, BTreeSet<String>>,
    observer: Option<Box<dyn ProfileObserver>>,
    extension: String,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("profiles", &self.profiles)
            .field("removed", &self.removed)
            .field("observer", &self.observer.is_some())
            .field("extension", &self.extension)
            .finish()
    }
}

impl ProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: BTreeMap::new(),
            removed: BTreeMap::new(),
            observer: None,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn set_observer(&mut self, observer: Box<dyn ProfileObserver>) {
        self.observer = Some(observer);
    }

    fn emit(&mut self, event: ProfileEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.notify(&event);
        }
    }

    /// Registers a sample so that it shows up in `samples()` with no profiles yet.
    pub fn open_sample(&mut self, sample_id: &str) {
        self.profiles.entry(sample_id.to_string()).or_default();
    }

    pub fn samples(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn names(&self, sample_id: &str) -> Vec<String> {
        self.profiles
            .get(sample_id)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn create(
        &mut self,
        sample_id: &str,
        name: &str,
        metadata: ProfileMetadata,
    ) -> Result<&mut Profile> {
        check_name(name)?;
        let profile = Profile::new(name, metadata)?;
        let by_name = self.profiles.entry(sample_id.to_string()).or_default();
        if by_name.contains_key(name) {
            return Err(ProfileError::DuplicateName {
                sample_id: sample_id.to_string(),
                name: name.to_string(),
            });
        }
        by_name.insert(name.to_string(), profile);
        crate::info!("created profile '{}' for sample '{}'", name, sample_id);
        self.emit(ProfileEvent::ProfileAdded {
            sample_id: sample_id.to_string(),
            profile: name.to_string(),
        });
        self.get_mut(sample_id, name)
    }

    pub fn get(&self, sample_id: &str, name: &str) -> Result<&Profile> {
        self.profiles
            .get(sample_id)
            .and_then(|p| p.get(name))
            .ok_or_else(|| not_found(sample_id, name))
    }

    fn get_mut(&mut self, sample_id: &str, name: &str) -> Result<&mut Profile> {
        self.profiles
            .get_mut(sample_id)
            .and_then(|p| p.get_mut(name))
            .ok_or_else(|| not_found(sample_id, name))
    }

    pub fn delete(&mut self, sample_id: &str, name: &str) -> Result<Profile> {
        let removed = self
            .profiles
            .get_mut(sample_id)
            .and_then(|p| p.remove(name))
            .ok_or_else(|| not_found(sample_id, name))?;
        self.mark_removed(sample_id, name);
        crate::info!("deleted profile '{}' of sample '{}'", name, sample_id);
        self.emit(ProfileEvent::ProfileRemoved {
            sample_id: sample_id.to_string(),
            profile: name.to_string(),
        });
        Ok(removed)
    }

    pub fn rename(&mut self, sample_id: &str, old: &str, new: &str) -> Result<()> {
        check_name(new)?;
        let by_name = self
            .profiles
            .get_mut(sample_id)
            .ok_or_else(|| not_found(sample_id, old))?;
        if !by_name.contains_key(old) {
            return Err(not_found(sample_id, old));
        }
        if old == new {
            return Ok(());
        }
        if by_name.contains_key(new) {
            return Err(ProfileError::DuplicateName {
                sample_id: sample_id.to_string(),
                name: new.to_string(),
            });
        }
        if let Some(mut profile) = by_name.remove(old) {
            profile.name = new.to_string();
            by_name.insert(new.to_string(), profile);
        }
        self.mark_removed(sample_id, old);
        crate::info!("renamed profile '{}' of sample '{}' to '{}'", old, sample_id, new);
        self.emit(ProfileEvent::ProfileRemoved {
            sample_id: sample_id.to_string(),
            profile: old.to_string(),
        });
        self.emit(ProfileEvent::ProfileAdded {
            sample_id: sample_id.to_string(),
            profile: new.to_string(),
        });
        Ok(())
    }

    fn mark_removed(&mut self, sample_id: &str, name: &str) {
        self.removed
            .entry(sample_id.to_string())
            .or_default()
            .insert(name.to_string());
    }

    /// Drops every profile of the sample, e.g. when the active sample changes.
    pub fn clear_sample(&mut self, sample_id: &str) {
        if let Some(by_name) = self.profiles.get_mut(sample_id) {
            let names = std::mem::take(by_name).into_keys();
            self.removed
                .entry(sample_id.to_string())
                .or_default()
                .extend(names);
        }
        self.emit(ProfileEvent::SampleCleared {
            sample_id: sample_id.to_string(),
        });
    }

    pub fn update_metadata(
        &mut self,
        sample_id: &str,
        name: &str,
        metadata: ProfileMetadata,
    ) -> Result<()> {
        self.get_mut(sample_id, name)?.set_metadata(metadata)
    }

    pub fn add_point(
        &mut self,
        sample_id: &str,
        name: &str,
        x: f64,
        y: f64,
        aggregated: FieldValues,
        at_index: Option<usize>,
    ) -> Result<usize> {
        let index = self
            .get_mut(sample_id, name)?
            .add_point(x, y, aggregated, at_index)?;
        self.emit(ProfileEvent::PointAdded {
            sample_id: sample_id.to_string(),
            profile: name.to_string(),
            index,
            x,
            y,
        });
        Ok(index)
    }

    pub fn move_point(
        &mut self,
        sample_id: &str,
        name: &str,
        index: usize,
        x: f64,
        y: f64,
        aggregated: FieldValues,
    ) -> Result<()> {
        self.get_mut(sample_id, name)?
            .move_point(index, x, y, aggregated)?;
        self.emit(ProfileEvent::PointMoved {
            sample_id: sample_id.to_string(),
            profile: name.to_string(),
            index,
            x,
            y,
        });
        Ok(())
    }

    pub fn remove_point(
        &mut self,
        sample_id: &str,
        name: &str,
        index: usize,
    ) -> Result<ControlPoint> {
        let point = self.get_mut(sample_id, name)?.remove_point(index)?;
        self.emit(ProfileEvent::PointRemoved {
            sample_id: sample_id.to_string(),
            profile: name.to_string(),
            index,
        });
        Ok(point)
    }

    pub fn clear_points(&mut self, sample_id: &str, name: &str) -> Result<()> {
        self.get_mut(sample_id, name)?.clear();
        self.emit(ProfileEvent::Cleared {
            sample_id: sample_id.to_string(),
            profile: name.to_string(),
        });
        Ok(())
    }

    pub fn interpolate(
        &mut self,
        sample_id: &str,
        name: &str,
        source: &dyn FieldSource,
    ) -> Result<InterpolationSummary> {
        let summary = interpolate(self.get_mut(sample_id, name)?, source)?;
        self.emit(ProfileEvent::Interpolated {
            sample_id: sample_id.to_string(),
            profile: name.to_string(),
            points: summary.total_points,
        });
        Ok(summary)
    }

    pub fn sample_dir(&self, project_dir: &Path, sample_id: &str) -> PathBuf {
        project_dir.join(sample_id)
    }

    fn profile_path(&self, sample_dir: &Path, name: &str) -> PathBuf {
        sample_dir.join(format!("{}.{}", name, self.extension))
    }

    /// Writes `<project_dir>/<sample_id>/<name>.<ext>` for every profile of the sample
    /// and deletes the files of profiles deleted or renamed since the last save.
    pub fn save_all(&mut self, sample_id: &str, project_dir: &Path) -> Result<Vec<PathBuf>> {
        let Some(by_name) = self.profiles.get(sample_id) else {
            return Ok(Vec::new());
        };
        let dir = self.sample_dir(project_dir, sample_id);
        fs::create_dir_all(&dir)?;

        let stale = self.removed.get(sample_id).into_iter().flatten();
        for name in stale.filter(|name| !by_name.contains_key(*name)) {
            let path = self.profile_path(&dir, name);
            match fs::remove_file(&path) {
                Ok(()) => crate::debug!("removed stale profile file {}", path.display()),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        let mut written = Vec::with_capacity(by_name.len());
        for (name, profile) in by_name {
            let path = self.profile_path(&dir, name);
            let mut w = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut w, profile)?;
            w.write_all(b"\n")?;
            w.flush()?;
            written.push(path);
        }
        self.removed.remove(sample_id);
        crate::info!(
            "saved {} profiles for sample '{}' to {}",
            written.len(),
            sample_id,
            dir.display()
        );
        Ok(written)
    }

    /// Reads every `*.<ext>` file of the sample directory. Unreadable files are
    /// reported in the returned `LoadReport` and skipped.
    pub fn load_all(&mut self, sample_id: &str, project_dir: &Path) -> Result<LoadReport> {
        let dir = self.sample_dir(project_dir, sample_id);
        let mut report = LoadReport::default();
        self.open_sample(sample_id);
        if !dir.is_dir() {
            crate::info!("no saved profiles for sample '{}' in {}", sample_id, dir.display());
            return Ok(report);
        }

        let mut paths = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file() && p.extension().is_some_and(|ext| ext == self.extension.as_str())
            })
            .collect::<Vec<_>>();
        paths.sort();

        let mut loaded = Vec::new();
        for path in paths {
            match read_profile(&path) {
                Ok(profile) => loaded.push(profile),
                Err(err) => {
                    crate::warn!("skipping profile file {}: {}", path.display(), err);
                    report.failures.push(LoadFailure {
                        path,
                        message: err.to_string(),
                    });
                }
            }
        }

        for profile in loaded {
            let name = profile.name.clone();
            let by_name = self.profiles.entry(sample_id.to_string()).or_default();
            if by_name.insert(name.clone(), profile).is_some() {
                crate::warn!("replaced in-memory profile '{}' with the saved copy", name);
                self.emit(ProfileEvent::ProfileRemoved {
                    sample_id: sample_id.to_string(),
                    profile: name.clone(),
                });
            }
            self.emit(ProfileEvent::ProfileAdded {
                sample_id: sample_id.to_string(),
                profile: name.clone(),
            });
            report.loaded.push(name);
        }
        crate::info!(
            "loaded {} profiles for sample '{}' ({} skipped)",
            report.loaded.len(),
            sample_id,
            report.failures.len()
        );
        Ok(report)
    }
}

fn read_profile(path: &Path) -> Result<Profile> {
    let reader = BufReader::new(File::open(path)?);
    let profile: Profile = serde_json::from_reader(reader)?;
    check_name(&profile.name)?;
    profile.metadata().validate()?;
    Ok(profile)
}

fn not_found(sample_id: &str, name: &str) -> ProfileError {
    ProfileError::NotFound {
        sample_id: sample_id.to_string(),
        name: name.to_string(),
    }
}

/// Names double as file stems.
fn check_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return Err(ProfileError::InvalidParameter(format!(
            "invalid profile name '{name}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/profile/store.rs"]
mod tests;
